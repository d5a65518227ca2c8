//! Slash-command parsing

use deliberation_domain::AgentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Phase,
    Results,
    Agents,
    Agent(AgentId),
    Chat { agent: AgentId, message: String },
    New,
    History,
    Quit,
    /// Plain text: the question or a follow-up
    Submit(String),
    /// Malformed or unknown command, with a hint for the user
    Invalid(String),
}

impl ReplCommand {
    pub const HELP: &'static str = "\
Commands:
  /help, /h, /?          - Show this help
  /phase                 - Show the current phase
  /results               - Show the current themes
  /agents                - List agents and their answers
  /agent <id>            - Show one agent's persona, answer and trace
  /chat <id> <message>   - Talk to one agent
  /new                   - Start over with a new question
  /history               - List your recent questions
  /quit, /exit, /q       - Exit

Anything else is sent to the crowd: the first line is the question,
later lines are follow-ups.";

    /// Parse one input line; `None` for a blank line
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('/') {
            return Some(Self::Submit(line.to_string()));
        }

        let mut parts = line.splitn(3, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let first = parts.next().map(str::trim).filter(|s| !s.is_empty());
        let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

        let command = match (name, first, rest) {
            ("/help" | "/h" | "/?", _, _) => Self::Help,
            ("/phase", _, _) => Self::Phase,
            ("/results", _, _) => Self::Results,
            ("/agents", _, _) => Self::Agents,
            ("/agent", Some(id), _) => Self::Agent(AgentId::new(id)),
            ("/agent", None, _) => Self::Invalid("Usage: /agent <id>".to_string()),
            ("/chat", Some(id), Some(message)) => Self::Chat {
                agent: AgentId::new(id),
                message: message.to_string(),
            },
            ("/chat", _, _) => Self::Invalid("Usage: /chat <id> <message>".to_string()),
            ("/new", _, _) => Self::New,
            ("/history", _, _) => Self::History,
            ("/quit" | "/exit" | "/q", _, _) => Self::Quit,
            (other, _, _) => Self::Invalid(format!(
                "Unknown command: {}\nType /help for available commands",
                other
            )),
        };
        Some(command)
    }
}
