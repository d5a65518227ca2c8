//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for deliberation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Themes plus every agent's answer
    Full,
    /// Only the final themes
    Themes,
    /// JSON output
    Json,
}

impl From<OutputFormat> for deliberation_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => deliberation_domain::OutputFormat::Full,
            OutputFormat::Themes => deliberation_domain::OutputFormat::Themes,
            OutputFormat::Json => deliberation_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for crowd-deliberation
#[derive(Parser, Debug)]
#[command(name = "crowd-deliberation")]
#[command(author, version, about = "Crowd deliberation - a crowd of personas thinks, talks and votes on your question")]
#[command(long_about = r#"
Crowd Deliberation asks a crowd of AI personas for advice and summarizes what they think.

A question goes through five phases:
1. Thinking:     every agent forms an opinion on its own
2. Discussing:   agents standing close together talk it over in small groups
3. Re-thinking:  agents who discussed revise their opinion
4. Clustering:   all answers are grouped into themes
5. Complete:     the themes are final; follow-up messages start a new round

Configuration files are loaded from (in priority order):
1. DELIBERATION_* environment variables
2. --config <path>            Explicit config file
3. ./deliberation.toml        Project-level config
4. ~/.config/crowd-deliberation/config.toml   Global config

Example:
  crowd-deliberation "Should I move abroad for a job offer?"
  crowd-deliberation -n 20 -o themes "Is it worth learning to sail at 50?"
  crowd-deliberation --interactive
"#)]
pub struct Cli {
    /// The question to ask the crowd (not required in interactive mode)
    pub question: Option<String>,

    /// Start interactive mode: follow-ups, chat with agents, new questions
    #[arg(short, long)]
    pub interactive: bool,

    /// Number of agents in the crowd
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub agents: Option<usize>,

    /// Characters JSON to draw personas from
    #[arg(long, value_name = "PATH")]
    pub personas: Option<PathBuf>,

    /// Seed for grouping, speaking order and persona selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List your recent questions and exit
    #[arg(long)]
    pub history: bool,

    /// Keep history in memory only for this run
    #[arg(long)]
    pub no_history: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Log filter for the `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_one_shot() {
        let cli = Cli::parse_from([
            "crowd-deliberation",
            "-n",
            "12",
            "-o",
            "themes",
            "--seed",
            "9",
            "-vv",
            "Should I move?",
        ]);
        assert_eq!(cli.question.as_deref(), Some("Should I move?"));
        assert_eq!(cli.agents, Some(12));
        assert_eq!(cli.output, Some(OutputFormat::Themes));
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.log_level(), "debug");
        assert!(!cli.interactive);
    }

    #[test]
    fn test_parse_interactive_defaults() {
        let cli = Cli::parse_from(["crowd-deliberation", "--interactive"]);
        assert!(cli.interactive);
        assert!(cli.question.is_none());
        assert!(cli.output.is_none());
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_output_format_into_domain() {
        let format: deliberation_domain::OutputFormat = OutputFormat::Json.into();
        assert_eq!(format, deliberation_domain::OutputFormat::Json);
    }
}
