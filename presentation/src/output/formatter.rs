//! Output formatter trait

use council_domain::CouncilOutcome;

/// Trait for formatting council outcomes
pub trait OutputFormatter {
    /// Format the complete outcome
    fn format(&self, outcome: &CouncilOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &CouncilOutcome) -> String;

    /// Format the podium and winning answer only (concise output)
    fn format_podium_only(&self, outcome: &CouncilOutcome) -> String;
}
