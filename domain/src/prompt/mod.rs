//! Prompt domain
//!
//! Text of the anonymized ranking request. Refinement-round prompts are built
//! by each agent adapter from the structured request it receives.

mod template;

pub use template::PromptTemplate;
