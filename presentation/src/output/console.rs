//! Console output formatter for deliberation results

use colored::Colorize;
use deliberation_domain::{
    AgentRecord, DeliberationSummary, HistoryRecord, OutputFormat, Phase, ThemeCluster, TraceEntry,
    preview,
};
use serde_json::json;

const BAR_WIDTH: usize = 30;

/// Formats deliberation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a finished run in the requested format
    pub fn render(format: OutputFormat, summary: &DeliberationSummary, agents: &[AgentRecord]) -> String {
        match format {
            OutputFormat::Full => Self::format(summary, agents),
            OutputFormat::Themes => Self::format_themes(summary),
            OutputFormat::Json => Self::format_json(summary, agents),
        }
    }

    /// Themes, run statistics and every agent's final answer
    pub fn format(summary: &DeliberationSummary, agents: &[AgentRecord]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Crowd Deliberation Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            summary.question
        ));
        output.push_str(&format!(
            "{} {} of {} answered, {} groups, {} follow-up(s)",
            "Crowd:".cyan().bold(),
            summary.answered,
            summary.total_agents,
            summary.groups_formed,
            summary.follow_ups
        ));
        if summary.failed_calls > 0 {
            output.push_str(&format!(
                ", {}",
                format!("{} failed call(s)", summary.failed_calls).yellow()
            ));
        }
        output.push('\n');
        if summary.short_circuited {
            output.push_str(&format!(
                "{}\n",
                "Discussion skipped for a follow-up".dimmed()
            ));
        }

        output.push_str(&Self::section_header("Themes"));
        output.push_str(&Self::themes_block(&summary.themes, summary.total_agents));

        let answered: Vec<&AgentRecord> = agents.iter().filter(|a| a.answer().is_some()).collect();
        if !answered.is_empty() {
            output.push_str(&Self::section_header("Answers"));
            for agent in answered {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", agent.display_name()).yellow().bold(),
                    Self::indent(agent.answer().unwrap_or_default(), "  ")
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Themes only (concise output)
    pub fn format_themes(summary: &DeliberationSummary) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n\n",
            "=== What the crowd thinks ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), summary.question));
        output.push_str(&Self::themes_block(&summary.themes, summary.total_agents));
        output
    }

    /// Summary plus per-agent answers and traces as pretty JSON
    pub fn format_json(summary: &DeliberationSummary, agents: &[AgentRecord]) -> String {
        let agents: Vec<_> = agents
            .iter()
            .map(|agent| {
                json!({
                    "id": agent.id(),
                    "name": agent.display_name(),
                    "answer": agent.answer(),
                    "trace": agent.rendered_trace(),
                })
            })
            .collect();
        let value = json!({
            "summary": summary,
            "agents": agents,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// One-line phase status, as shown by `/phase`
    pub fn format_phase(phase: Phase, pending: usize) -> String {
        let mut line = format!("{} {}", phase.emoji(), phase.label().bold());
        if pending > 0 {
            line.push_str(&format!(" ({} follow-up(s) queued)", pending));
        }
        line
    }

    /// Current themes, flagged when they are only an interim summary
    pub fn format_results(themes: &[ThemeCluster], total: usize, provisional: bool) -> String {
        if themes.is_empty() {
            return "No results yet.".dimmed().to_string();
        }
        let title = if provisional {
            "Interim themes (still deliberating)"
        } else {
            "Themes"
        };
        format!("{}\n{}", title.cyan().bold(), Self::themes_block(themes, total))
    }

    /// Compact roster, as shown by `/agents`
    pub fn format_agents(agents: &[AgentRecord]) -> String {
        agents
            .iter()
            .map(|agent| {
                let answer = agent
                    .answer()
                    .map(|a| preview(a, 60))
                    .unwrap_or_else(|| "-".to_string());
                format!(
                    "  {} {:<20} {}",
                    agent.id().as_str().dimmed(),
                    agent.display_name(),
                    answer
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Full detail of one agent, as shown by `/agent <id>`
    pub fn format_agent(agent: &AgentRecord) -> String {
        let mut output = format!(
            "{} {}\n{}\n",
            agent.display_name().yellow().bold(),
            format!("({})", agent.id()).dimmed(),
            Self::indent(agent.persona(), "  ")
        );
        if let Some(answer) = agent.answer() {
            output.push_str(&format!("\n{}\n{}\n", "Answer:".cyan().bold(), Self::indent(answer, "  ")));
        }
        if !agent.trace().is_empty() {
            output.push_str(&format!("\n{}\n", "Trace:".cyan().bold()));
            for (i, entry) in agent.trace().iter().enumerate() {
                let tag = match entry {
                    TraceEntry::Reasoning(_) => "thought",
                    TraceEntry::FollowUp(_) => "follow-up",
                    TraceEntry::Discussion(_) => "discussion",
                };
                let text = match entry {
                    TraceEntry::Reasoning(text)
                    | TraceEntry::FollowUp(text)
                    | TraceEntry::Discussion(text) => text,
                };
                output.push_str(&format!(
                    "  [{}] {}\n{}\n",
                    i + 1,
                    tag.dimmed(),
                    Self::indent(text.trim_end(), "      ")
                ));
            }
        }
        output
    }

    /// Past questions, newest first
    pub fn format_history(records: &[HistoryRecord]) -> String {
        if records.is_empty() {
            return "No past questions.".dimmed().to_string();
        }
        records
            .iter()
            .map(|record| {
                let leading = record
                    .themes
                    .iter()
                    .max_by_key(|t| t.count)
                    .map(|t| format!("{} ({} of {})", t.label, t.count, record.total_agents))
                    .unwrap_or_else(|| "no themes".to_string());
                format!(
                    "  {} {}\n      {}",
                    record.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                    record.question,
                    leading
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn themes_block(themes: &[ThemeCluster], total: usize) -> String {
        if themes.is_empty() {
            return format!("{}\n", "No themes.".dimmed());
        }
        let width = themes.iter().map(|t| t.label.chars().count()).max().unwrap_or(0);
        themes
            .iter()
            .map(|theme| {
                let percent = theme.share(total);
                format!(
                    "  {:<width$}  {} {:>3} ({:>5.1}%)\n",
                    theme.label,
                    Self::bar(percent / 100.0).green(),
                    theme.count,
                    percent,
                    width = width
                )
            })
            .collect()
    }

    fn bar(share: f64) -> String {
        let filled = ((share.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
        format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
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

#[cfg(test)]
mod tests {
    use super::*;
    use deliberation_domain::{AgentId, AgentProfile};

    fn summary() -> DeliberationSummary {
        DeliberationSummary {
            question: "Should I move?".to_string(),
            themes: vec![
                ThemeCluster::new("Yes", vec![AgentId::new("a1"), AgentId::new("a3")]),
                ThemeCluster::new("No", vec![AgentId::new("a2")]),
            ],
            total_agents: 3,
            answered: 3,
            groups_formed: 1,
            ..Default::default()
        }
    }

    fn agent(id: &str, name: &str, answer: Option<&str>) -> AgentRecord {
        let mut record = AgentRecord::new(AgentProfile::new(id, name, "A baker."));
        if let Some(answer) = answer {
            record.push_trace(TraceEntry::reasoning("Bread travels."));
            record.set_answer(answer);
        }
        record
    }

    #[test]
    fn test_bar() {
        assert_eq!(ConsoleFormatter::bar(0.0), "░".repeat(BAR_WIDTH));
        assert_eq!(ConsoleFormatter::bar(1.0), "█".repeat(BAR_WIDTH));
        assert_eq!(ConsoleFormatter::bar(0.5).chars().filter(|c| *c == '█').count(), 15);
    }

    #[test]
    fn test_format_full_lists_themes_and_answers() {
        let agents = vec![agent("a1", "Ada", Some("Go for it.")), agent("a2", "Bruno", None)];
        let output = ConsoleFormatter::format(&summary(), &agents);
        assert!(output.contains("Should I move?"));
        assert!(output.contains("66.7%"));
        assert!(output.contains("33.3%"));
        assert!(output.contains("Go for it."));
        assert!(!output.contains("Bruno"));
    }

    #[test]
    fn test_format_json_is_valid() {
        let agents = vec![agent("a1", "Ada", Some("Go for it."))];
        let output = ConsoleFormatter::format_json(&summary(), &agents);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["summary"]["total_agents"], 3);
        assert_eq!(value["summary"]["themes"][0]["agentIds"][1], "a3");
        assert_eq!(value["agents"][0]["answer"], "Go for it.");
        assert_eq!(value["agents"][0]["trace"][0], "Bread travels.");
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let themes = ConsoleFormatter::render(OutputFormat::Themes, &summary(), &[]);
        assert!(themes.contains("What the crowd thinks"));
        let json = ConsoleFormatter::render(OutputFormat::Json, &summary(), &[]);
        assert!(json.trim_start().starts_with('{'));
    }

    #[test]
    fn test_format_results_states() {
        assert!(ConsoleFormatter::format_results(&[], 3, false).contains("No results yet."));
        let provisional = ConsoleFormatter::format_results(&summary().themes, 3, true);
        assert!(provisional.contains("Interim themes"));
    }

    #[test]
    fn test_format_agent_shows_trace() {
        let mut record = agent("a1", "Ada", Some("Go for it."));
        record.push_trace(TraceEntry::follow_up("Costs matter."));
        let output = ConsoleFormatter::format_agent(&record);
        assert!(output.contains("A baker."));
        assert!(output.contains("Bread travels."));
        assert!(output.contains("Costs matter."));
    }

    #[test]
    fn test_format_history() {
        let records = vec![HistoryRecord::new("local", "Should I move?", summary().themes, 3)];
        let output = ConsoleFormatter::format_history(&records);
        assert!(output.contains("Should I move?"));
        assert!(output.contains("Yes (2 of 3)"));
        assert!(ConsoleFormatter::format_history(&[]).contains("No past questions."));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
