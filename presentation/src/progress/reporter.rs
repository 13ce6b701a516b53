//! Progress reporting for council execution

use colored::Colorize;
use council_application::Broadcaster;
use council_domain::{CouncilEvent, EventEnvelope};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Reports progress during council execution with fancy progress bars
///
/// One bar per refinement round, then a spinner while the ranking runs.
pub struct ProgressReporter {
    multi: MultiProgress,
    agents: u64,
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new(agents: usize) -> Self {
        Self::with_target(agents, ProgressDrawTarget::stderr())
    }

    /// Reporter drawing to `target` (hidden in tests)
    pub fn with_target(agents: usize, target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            agents: agents as u64,
            bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start(&self, bar: ProgressBar) {
        let mut current = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = current.take()
            && !previous.is_finished()
        {
            previous.finish();
        }
        *current = Some(self.multi.add(bar));
    }

    fn tick(&self, status: String) {
        if let Some(pb) = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            pb.set_message(status);
            pb.inc(1);
            if pb.length() == Some(pb.position()) {
                pb.finish_with_message(format!("{}", "complete!".green()));
            }
        }
    }

    fn finish(&self, message: String) {
        if let Some(pb) = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_with_message(message);
        }
    }

    /// Position and length of the active bar
    pub fn position(&self) -> Option<(u64, Option<u64>)> {
        self.bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|pb| (pb.position(), pb.length()))
    }
}

impl Broadcaster for ProgressReporter {
    fn broadcast(&self, envelope: &EventEnvelope) {
        match &envelope.event {
            CouncilEvent::Clear => {}
            CouncilEvent::RoundStart { round, total } => {
                let pb = ProgressBar::new(self.agents);
                pb.set_style(Self::round_style());
                pb.set_prefix(format!("Round {}/{}", round, total));
                pb.set_message("Starting...");
                self.start(pb);
            }
            CouncilEvent::Response { model, .. } => {
                self.tick(format!("{} {}", "v".green(), model));
            }
            CouncilEvent::Error { model, .. } => {
                self.tick(format!("{} {}", "x".red(), model));
            }
            CouncilEvent::RankingStart => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.set_prefix("Ranking");
                pb.set_message("Collecting anonymized ballots...");
                pb.enable_steady_tick(Duration::from_millis(100));
                self.start(pb);
            }
            CouncilEvent::Winner { gold, .. } => {
                let names = gold
                    .iter()
                    .map(|a| a.display_name())
                    .collect::<Vec<_>>()
                    .join(", ");
                self.finish(format!("{} {}", "Gold:".yellow().bold(), names));
            }
        }
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl Broadcaster for SimpleProgress {
    fn broadcast(&self, envelope: &EventEnvelope) {
        match &envelope.event {
            CouncilEvent::Clear => {}
            CouncilEvent::RoundStart { round, total } => {
                eprintln!("{} {}", "->".cyan(), format!("Round {}/{}", round, total).bold());
            }
            CouncilEvent::Response { model, .. } => eprintln!("  {} {}", "v".green(), model),
            CouncilEvent::Error { model, error, .. } => {
                eprintln!("  {} {} ({})", "x".red(), model, error)
            }
            CouncilEvent::RankingStart => eprintln!("{} {}", "->".cyan(), "Ranking".bold()),
            CouncilEvent::Winner { .. } => eprintln!(),
        }
    }
}
