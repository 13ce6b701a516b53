//! Normalization of free-text discussion targets to agent identities.
//!
//! Models address each other by whatever name they saw in the prompt, often
//! with different casing or only part of it ("Claude", "gpt-5.2", "@gemini").
//! [`resolve_target`] maps such a name onto the closed set of active agents.
//!
//! Matching runs in passes and stops at the first pass that yields a
//! candidate other than the sender:
//!
//! | Pass | Rule (case-insensitive) |
//! |------|-------------------------|
//! | 1 | exact match on `family/variant` or `variant` |
//! | 2 | exact match on `family`, only when that family is unique |
//! | 3 | containment in either direction against `variant` |
//! | 4 | containment in either direction against `family` |

use crate::core::agent::AgentId;
use thiserror::Error;

/// A discussion target that could not be mapped to another agent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedTarget {
    #[error("no agent matches discussion target '{name}'")]
    NoMatch { name: String },

    #[error("discussion target '{name}' refers to the sender itself")]
    SelfAddressed { name: String },
}

impl UnresolvedTarget {
    pub fn name(&self) -> &str {
        match self {
            UnresolvedTarget::NoMatch { name } | UnresolvedTarget::SelfAddressed { name } => name,
        }
    }
}

/// Resolve `name` (as written by `sender`) to one of `agents`
pub fn resolve_target<'a>(
    name: &str,
    sender: &AgentId,
    agents: &'a [AgentId],
) -> Result<&'a AgentId, UnresolvedTarget> {
    let needle = name.trim().trim_start_matches('@').trim().to_lowercase();
    if needle.is_empty() {
        return Err(UnresolvedTarget::NoMatch {
            name: name.to_string(),
        });
    }

    let family_is_unique = |family: &str| {
        agents
            .iter()
            .filter(|a| a.family().eq_ignore_ascii_case(family))
            .count()
            == 1
    };
    let contains_either = |candidate: &str| {
        let candidate = candidate.to_lowercase();
        !candidate.is_empty() && (candidate.contains(&needle) || needle.contains(&candidate))
    };

    let passes: [&dyn Fn(&AgentId) -> bool; 4] = [
        &|a| a.display_name().to_lowercase() == needle || a.variant().to_lowercase() == needle,
        &|a| a.family().to_lowercase() == needle && family_is_unique(a.family()),
        &|a| contains_either(a.variant()),
        &|a| contains_either(a.family()),
    ];

    let mut hit_sender = false;
    for matches in passes {
        for candidate in agents.iter().filter(|a| matches(a)) {
            if candidate == sender {
                hit_sender = true;
            } else {
                return Ok(candidate);
            }
        }
        if hit_sender {
            break;
        }
    }

    if hit_sender {
        Err(UnresolvedTarget::SelfAddressed {
            name: name.to_string(),
        })
    } else {
        Err(UnresolvedTarget::NoMatch {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents() -> Vec<AgentId> {
        vec![
            AgentId::new("anthropic", "claude-sonnet-4.5"),
            AgentId::new("openai", "gpt-5.2"),
            AgentId::new("openai", "gpt-5-mini"),
            AgentId::new("google", "gemini-3-pro"),
        ]
    }

    #[test]
    fn test_exact_variant_case_insensitive() {
        let agents = agents();
        let sender = &agents[0];
        assert_eq!(resolve_target("GPT-5.2", sender, &agents), Ok(&agents[1]));
        assert_eq!(resolve_target("@gpt-5-mini", sender, &agents), Ok(&agents[2]));
    }

    #[test]
    fn test_exact_display_name() {
        let agents = agents();
        assert_eq!(
            resolve_target("google/Gemini-3-Pro", &agents[0], &agents),
            Ok(&agents[3])
        );
    }

    #[test]
    fn test_unique_family_matches() {
        let agents = agents();
        assert_eq!(
            resolve_target("Anthropic", &agents[1], &agents),
            Ok(&agents[0])
        );
    }

    #[test]
    fn test_containment_fallback() {
        let agents = agents();
        // needle contained in the variant
        assert_eq!(resolve_target("Claude", &agents[1], &agents), Ok(&agents[0]));
        // variant contained in the needle
        assert_eq!(
            resolve_target("the gemini-3-pro model", &agents[0], &agents),
            Ok(&agents[3])
        );
    }

    #[test]
    fn test_shared_family_prefers_other_agent() {
        let agents = agents();
        // "gpt" is contained in both openai variants; the sender is skipped
        assert_eq!(resolve_target("gpt", &agents[1], &agents), Ok(&agents[2]));
    }

    #[test]
    fn test_unknown_target() {
        let agents = agents();
        assert_eq!(
            resolve_target("llama", &agents[0], &agents),
            Err(UnresolvedTarget::NoMatch {
                name: "llama".to_string()
            })
        );
        assert!(resolve_target("  ", &agents[0], &agents).is_err());
    }

    #[test]
    fn test_self_addressed() {
        let agents = agents();
        let err = resolve_target("gemini", &agents[3], &agents).unwrap_err();
        assert_eq!(
            err,
            UnresolvedTarget::SelfAddressed {
                name: "gemini".to_string()
            }
        );
        assert_eq!(err.name(), "gemini");
    }
}
