//! Console output formatter for council outcomes

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::{AgentId, CouncilOutcome, OutputFormat, Podium, Tier};

/// Formats council outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Enable or disable ANSI colors for everything formatted afterwards
    pub fn set_color(enabled: bool) {
        if enabled {
            colored::control::unset_override();
        } else {
            colored::control::set_override(false);
        }
    }

    /// Render `outcome` in the requested format
    pub fn render(outcome: &CouncilOutcome, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(outcome),
            OutputFormat::Podium => Self::format_podium_only(outcome),
            OutputFormat::Json => Self::format_json(outcome),
        }
    }

    /// Format the complete outcome
    pub fn format(outcome: &CouncilOutcome) -> String {
        let summary = &outcome.summary;
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            summary.question
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Agents:".cyan().bold(),
            names(&summary.agents)
        ));
        output.push_str(&format!(
            "{} {}/{}\n",
            "Rounds:".cyan().bold(),
            summary.completed_rounds,
            summary.total_rounds
        ));

        for round in 1..=summary.completed_rounds {
            output.push_str(&Self::section_header(&format!("Round {}", round)));
            for record in outcome.round(round) {
                match (&record.reply, &record.error) {
                    (Some(reply), _) => {
                        output.push_str(&format!(
                            "\n{}\n{}\n",
                            format!("── {} ──", record.agent).yellow().bold(),
                            reply.answer
                        ));
                        if let Some(rationale) = &reply.rationale {
                            output.push_str(&format!(
                                "{}\n",
                                Self::indent(rationale, "  > ").dimmed()
                            ));
                        }
                        for (target, message) in &reply.discussion {
                            output.push_str(&format!(
                                "  {} {}: {}\n",
                                "@".cyan(),
                                target,
                                message
                            ));
                        }
                    }
                    (None, error) => {
                        output.push_str(&format!(
                            "\n{}\nError: {} ({} attempts)\n",
                            format!("── {} ──", record.agent).red().bold(),
                            error.as_deref().unwrap_or("Unknown"),
                            record.attempts
                        ));
                    }
                }
            }
        }

        let ranking = &outcome.ranking;
        output.push_str(&Self::section_header("Ranking"));
        let labels = ranking
            .labels
            .assignments()
            .iter()
            .map(|a| format!("{} = {}", a.label, a.agent))
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!("{} {}\n", "Labels:".dimmed(), labels));

        for ballot in &ranking.ballots {
            let order = ballot
                .ranking
                .iter()
                .map(|agent| {
                    ranking
                        .labels
                        .label_of(agent)
                        .map(String::from)
                        .unwrap_or_else(|| "?".to_string())
                })
                .collect::<Vec<_>>()
                .join(" > ");
            output.push_str(&format!("  {} {}\n", format!("{}:", ballot.voter).bold(), order));
        }
        for abstention in &ranking.abstentions {
            output.push_str(&format!(
                "  {} abstained ({})\n",
                abstention.voter.to_string().dimmed(),
                abstention.reason
            ));
        }

        if !ranking.scores.is_empty() {
            output.push_str(&format!("\n{}\n", "Borda scores:".cyan().bold()));
            for score in ranking.leaderboard() {
                output.push_str(&format!(
                    "  {:>3}  {} ({} first place{})\n",
                    score.points,
                    score.agent,
                    score.first_places,
                    if score.first_places == 1 { "" } else { "s" }
                ));
            }
        }
        if ranking.fallback_used {
            output.push_str(&format!(
                "\n{}\n",
                "No valid ballots; podium chosen by fallback.".yellow()
            ));
        }

        output.push_str(&Self::section_header("Podium"));
        output.push_str(&Self::podium(&summary.podium));
        output.push_str(&format!(
            "\n{}\n{}\n",
            "Winning answer:".green().bold(),
            summary.winning_answer
        ));

        output.push_str(&format!(
            "\n{} {} in / {} out, {} ms\n",
            "Tokens:".dimmed(),
            summary.total_tokens.input,
            summary.total_tokens.output,
            summary.duration_ms()
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &CouncilOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the podium and winning answer only (concise output)
    pub fn format_podium_only(outcome: &CouncilOutcome) -> String {
        let summary = &outcome.summary;
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== LLM Council Verdict ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), summary.question));
        output.push_str(&Self::podium(&summary.podium));
        output.push('\n');
        output.push_str(&summary.winning_answer);
        output.push('\n');

        output
    }

    fn podium(podium: &Podium) -> String {
        if podium.is_empty() {
            return format!("  {}\n", "(no winner)".dimmed());
        }
        [
            (Tier::Gold, &podium.gold),
            (Tier::Silver, &podium.silver),
            (Tier::Bronze, &podium.bronze),
        ]
        .into_iter()
        .filter(|(_, agents)| !agents.is_empty())
        .map(|(tier, agents)| {
            let label = format!("{:<7}", tier.to_string());
            let label = match tier {
                Tier::Gold => label.yellow().bold(),
                Tier::Silver => label.white().bold(),
                Tier::Bronze => label.red(),
            };
            format!("  {} {}\n", label, names(agents))
        })
        .collect()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn names(agents: &[AgentId]) -> String {
    agents
        .iter()
        .map(AgentId::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &CouncilOutcome) -> String {
        Self::format(outcome)
    }

    fn format_json(&self, outcome: &CouncilOutcome) -> String {
        Self::format_json(outcome)
    }

    fn format_podium_only(&self, outcome: &CouncilOutcome) -> String {
        Self::format_podium_only(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use council_domain::{
        AnonymizationMap, Ballot, CouncilSummary, DiscussionState, RankingOutcome, Reply,
        RequestId, RoundRecord, TokenUsage,
    };
    use council_domain::ranking::borda_scores;
    use std::collections::BTreeMap;

    fn outcome() -> CouncilOutcome {
        colored::control::set_override(false);
        let a = AgentId::new("openai", "gpt-5.2");
        let b = AgentId::new("google", "gemini-3-pro");
        let agents = vec![a.clone(), b.clone()];
        let ballots = vec![
            Ballot::new(a.clone(), vec![a.clone(), b.clone()]),
            Ballot::new(b.clone(), vec![a.clone(), b.clone()]),
        ];
        let scores = borda_scores(&agents, &ballots);
        let podium = Podium::from_scores(&scores);
        CouncilOutcome {
            summary: CouncilSummary {
                request_id: RequestId::new("r"),
                question: "Best sorting algorithm?".to_string(),
                agents: agents.clone(),
                total_rounds: 1,
                completed_rounds: 1,
                podium: podium.clone(),
                winning_answer: "Timsort".to_string(),
                fallback_used: false,
                tokens: BTreeMap::new(),
                total_tokens: TokenUsage::new(100, 20),
                started_at: Utc::now(),
                finished_at: Utc::now(),
            },
            records: vec![
                RoundRecord::success(
                    1,
                    a.clone(),
                    Reply::new("Timsort").with_rationale("Adaptive"),
                    TokenUsage::new(50, 10),
                    10,
                    1,
                ),
                RoundRecord::failure(1, b, "context deadline exceeded", 120_000, 1),
            ],
            ranking: RankingOutcome {
                labels: AnonymizationMap::sequential(&agents).unwrap(),
                ballots,
                abstentions: Vec::new(),
                scores,
                podium,
                fallback_used: false,
            },
            discussion: DiscussionState::default(),
        }
    }

    #[test]
    fn test_full_format_lists_rounds_ballots_and_podium() {
        let text = ConsoleFormatter::format(&outcome());
        assert!(text.contains("Round 1"));
        assert!(text.contains("Timsort"));
        assert!(text.contains("  > Adaptive"));
        assert!(text.contains("Error: context deadline exceeded (1 attempts)"));
        assert!(text.contains("A = openai/gpt-5.2"));
        assert!(text.contains("openai/gpt-5.2: A > B"));
        assert!(text.contains("    4  openai/gpt-5.2 (2 first places)"));
        assert!(text.contains("Gold    openai/gpt-5.2"));
    }

    #[test]
    fn test_podium_only_format() {
        let text = ConsoleFormatter::render(&outcome(), OutputFormat::Podium);
        assert!(text.contains("Q: Best sorting algorithm?"));
        assert!(text.contains("Silver  google/gemini-3-pro"));
        assert!(text.trim_end().ends_with("Timsort"));
        assert!(!text.contains("Round 1"));
    }

    #[test]
    fn test_json_format_round_trips() {
        let outcome = outcome();
        let text = ConsoleFormatter::render(&outcome, OutputFormat::Json);
        let parsed: CouncilOutcome = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, outcome);
    }
}
