//! Prompt templates for the ranking phase

/// Templates for the ranking request sent to every agent
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the ranking phase
    pub fn ranking_system() -> &'static str {
        r#"You are an impartial judge comparing anonymous answers to the same question.
Judge only the content: accuracy, completeness, clarity and practical usefulness.
Do not answer the question yourself."#
    }

    /// User prompt asking for a best-to-worst ordering of labelled answers
    ///
    /// `answers` pairs each anonymous label with the answer shown under it.
    pub fn ranking_prompt(question: &str, answers: &[(char, &str)]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

The following answers were written by different participants.
They are shown under anonymous labels.
"#,
            question
        );

        for (label, answer) in answers {
            prompt.push_str(&format!("\n--- Response {} ---\n{}\n", label, answer));
        }

        let labels: Vec<String> = answers.iter().map(|(l, _)| l.to_string()).collect();
        prompt.push_str(&format!(
            r#"
Rank every response from best to worst.
Reply with a section headed "Ranking:" followed by one label per line, best first.
Use only these labels: {}"#,
            labels.join(", ")
        ));

        prompt
    }
}
