//! Progress reporting for deliberation runs

use colored::Colorize;
use deliberation_application::DeliberationProgress;
use deliberation_domain::{AgentId, DiscussionGroup, Phase, ThemeCluster, preview};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};

/// Reports progress with indicatif bars
pub struct ProgressReporter {
    multi: MultiProgress,
    think_bar: Mutex<Option<ProgressBar>>,
    show_lines: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            think_bar: Mutex::new(None),
            show_lines: true,
        }
    }

    /// Hide individual discussion lines (phase bars stay)
    pub fn without_discussion_lines(mut self) -> Self {
        self.show_lines = false;
        self
    }

    fn think_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.think_bar.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn println(&self, line: String) {
        if self.multi.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }

    fn leading(themes: &[ThemeCluster]) -> Option<String> {
        themes
            .iter()
            .max_by_key(|t| t.count)
            .map(|t| format!("{} ({})", t.label, t.count))
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliberationProgress for ProgressReporter {
    fn on_phase_change(&self, phase: Phase) {
        if let Some(pb) = self.bar().take() {
            pb.finish_and_clear();
        }
        self.println(format!("{} {}", phase.emoji(), phase.label().bold()));
    }

    fn on_think_start(&self, total_agents: usize, follow_up: bool) {
        let pb = self.multi.add(ProgressBar::new(total_agents as u64));
        pb.set_style(Self::think_style());
        pb.set_prefix(if follow_up { "Follow-up" } else { "Thinking" });
        pb.set_message("Starting...");
        if let Some(previous) = self.bar().replace(pb) {
            previous.finish_and_clear();
        }
    }

    fn on_agent_thought(&self, agent: &AgentId, success: bool) {
        if let Some(pb) = self.bar().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), agent)
            } else {
                format!("{} {}", "x".red(), agent)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_groups_formed(&self, groups: &[DiscussionGroup]) {
        let members: usize = groups.iter().map(DiscussionGroup::len).sum();
        self.println(format!(
            "  {} {} group(s), {} agents talking",
            "->".cyan(),
            groups.len(),
            members
        ));
    }

    fn on_discussion_line(&self, group_index: usize, line: &str) {
        if self.show_lines {
            self.println(format!(
                "  {} {}",
                format!("[{}]", group_index + 1).dimmed(),
                preview(line, 120)
            ));
        }
    }

    fn on_provisional_results(&self, themes: &[ThemeCluster]) {
        if let Some(leading) = Self::leading(themes) {
            let message = format!("leading: {}", leading);
            match self.bar().as_ref() {
                Some(pb) => pb.set_message(message),
                None => self.println(format!("  {} {}", "~".dimmed(), message.dimmed())),
            }
        }
    }

    fn on_results(&self, themes: &[ThemeCluster]) {
        if let Some(leading) = Self::leading(themes) {
            self.println(format!("  {} Most common view: {}", "v".green(), leading.bold()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl DeliberationProgress for SimpleProgress {
    fn on_phase_change(&self, phase: Phase) {
        println!("{} {}", "->".cyan(), phase.label().bold());
    }

    fn on_think_start(&self, total_agents: usize, follow_up: bool) {
        let kind = if follow_up { "follow-up" } else { "think" };
        println!("  {} {} calls", total_agents, kind);
    }

    fn on_agent_thought(&self, agent: &AgentId, success: bool) {
        if !success {
            println!("  {} {} (failed)", "x".red(), agent);
        }
    }

    fn on_groups_formed(&self, groups: &[DiscussionGroup]) {
        println!("  {} group(s) formed", groups.len());
    }

    fn on_discussion_line(&self, group_index: usize, line: &str) {
        println!("  [{}] {}", group_index + 1, line);
    }

    fn on_group_complete(&self, group_index: usize) {
        println!("  [{}] done", group_index + 1);
    }

    fn on_results(&self, themes: &[ThemeCluster]) {
        if let Some(leading) = ProgressReporter::leading(themes) {
            println!("  {} Most common view: {}", "v".green(), leading);
        }
    }
}
