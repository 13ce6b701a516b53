//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every round, the ballots and the podium
    Full,
    /// Only the podium and the winning answer
    Podium,
    /// JSON output
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Podium => council_domain::OutputFormat::Podium,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about = "LLM Council - Agents refine their answers, then rank each other anonymously")]
#[command(long_about = r#"
LLM Council runs a panel of agents over a question.

The process has two stages:
1. Refinement: every agent answers in parallel for R rounds, seeing the
   latest answers and discussion messages of the others
2. Ranking: every agent ranks the anonymized final answers; Borda scores
   decide the gold, silver and bronze tiers

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/llm-council/config.toml   Global config

Example:
  council --fixture council.fixture.toml "Is P equal to NP?"
  council --fixture council.fixture.toml --rounds 1 -o podium "Tabs or spaces?"
"#)]
pub struct Cli {
    /// The question to ask the council
    pub question: Option<String>,

    /// Scripted agent fixture (TOML) describing the council members
    #[arg(short, long, value_name = "PATH")]
    pub fixture: Option<PathBuf>,

    /// Number of refinement rounds (overrides config)
    #[arg(short, long, value_name = "N")]
    pub rounds: Option<u32>,

    /// Seed for the anonymization labels (overrides config)
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Directory for JSONL records and snapshots (overrides config)
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "council",
            "--fixture",
            "f.toml",
            "-r",
            "2",
            "-o",
            "podium",
            "-vv",
            "Why?",
        ])
        .unwrap();
        assert_eq!(cli.question.as_deref(), Some("Why?"));
        assert_eq!(cli.rounds, Some(2));
        assert_eq!(cli.output, Some(OutputFormat::Podium));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_output_maps_to_domain_format() {
        assert_eq!(
            council_domain::OutputFormat::from(OutputFormat::Json),
            council_domain::OutputFormat::Json
        );
    }
}
