//! Interactive session loop

use super::command::ReplCommand;
use crate::config::OutputConfig;
use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use deliberation_application::{
    ChatWithAgentUseCase, DeliberationController, DeliberationError, DeliberationGateway,
    HistoryRepository, PhaseReader, SubmitOutcome,
};
use deliberation_domain::AgentId;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::warn;

const HISTORY_LIMIT: usize = 50;

type SubmitResult = Result<SubmitOutcome, DeliberationError>;

pub struct InteractiveSession<G: DeliberationGateway + 'static> {
    controller: Arc<DeliberationController<G>>,
    chat: ChatWithAgentUseCase<G>,
    history: Arc<dyn HistoryRepository>,
    output: OutputConfig,
}

impl<G: DeliberationGateway + 'static> InteractiveSession<G> {
    pub fn new(
        controller: Arc<DeliberationController<G>>,
        chat: ChatWithAgentUseCase<G>,
        history: Arc<dyn HistoryRepository>,
        output: OutputConfig,
    ) -> Self {
        Self {
            controller,
            chat,
            history,
            output,
        }
    }

    /// Read commands from `input` until `/quit` or end of input.
    ///
    /// Runs started from input keep going while more lines are read. At end
    /// of input the loop waits for them; `/quit` abandons them.
    pub async fn run<R: AsyncBufRead + Unpin>(&self, input: R) -> std::io::Result<()> {
        let mut lines = input.lines();
        let mut runs: JoinSet<SubmitResult> = JoinSet::new();

        self.print_welcome();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let Some(command) = ReplCommand::parse(&line) else { continue };
                    if command == ReplCommand::Quit {
                        println!("Bye!");
                        runs.abort_all();
                        return Ok(());
                    }
                    self.handle(command, &mut runs).await;
                }
                Some(joined) = runs.join_next(), if !runs.is_empty() => {
                    self.report(joined);
                }
            }
        }

        while let Some(joined) = runs.join_next().await {
            self.report(joined);
        }
        Ok(())
    }

    fn print_welcome(&self) {
        let context = self.controller.context();
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│      Crowd Deliberation - Interactive       │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("{} agents are listening. Ask your question.", context.agent_count());
        println!();
        println!("{}", ReplCommand::HELP);
        println!();
    }

    async fn handle(&self, command: ReplCommand, runs: &mut JoinSet<SubmitResult>) {
        let context = self.controller.context();
        match command {
            ReplCommand::Submit(text) => {
                let controller = self.controller.clone();
                runs.spawn(async move { controller.submit(&text).await });
            }
            ReplCommand::Help => println!("{}", ReplCommand::HELP),
            ReplCommand::Phase => {
                println!(
                    "{}",
                    ConsoleFormatter::format_phase(context.phase(), context.pending_count())
                );
            }
            ReplCommand::Results => {
                println!(
                    "{}",
                    ConsoleFormatter::format_results(
                        &context.results(),
                        context.agent_count(),
                        context.results_are_provisional()
                    )
                );
            }
            ReplCommand::Agents => println!("{}", ConsoleFormatter::format_agents(&context.agents())),
            ReplCommand::Agent(id) => match context.agent(&id) {
                Some(agent) => println!("{}", ConsoleFormatter::format_agent(&agent)),
                None => println!("{} {}", "No such agent:".red(), id),
            },
            ReplCommand::Chat { agent, message } => self.chat_with(&agent, &message).await,
            ReplCommand::New => match self.controller.new_question().await {
                Ok(()) => println!("Session cleared. Ask a new question."),
                Err(DeliberationError::Busy) => {
                    println!("{}", "Still deliberating; try /new once it completes.".yellow())
                }
                Err(e) => eprintln!("{} {}", "Error:".red(), e),
            },
            ReplCommand::History => {
                let user_id = self.controller.orchestrator().user_id();
                match self.history.recent(user_id, HISTORY_LIMIT).await {
                    Ok(records) => println!("{}", ConsoleFormatter::format_history(&records)),
                    Err(e) => eprintln!("{} {}", "Could not read history:".red(), e),
                }
            }
            ReplCommand::Invalid(message) => println!("{}", message),
            ReplCommand::Quit => {}
        }
    }

    async fn chat_with(&self, agent: &AgentId, message: &str) {
        match self.chat.execute(agent, message).await {
            Ok(reply) => {
                let name = self
                    .controller
                    .context()
                    .agent(agent)
                    .map(|a| a.display_name())
                    .unwrap_or_else(|| agent.to_string());
                println!("{} {}", format!("{}:", name).yellow().bold(), reply);
            }
            Err(e) => eprintln!("{} {}", "Chat failed:".red(), e),
        }
    }

    fn report(&self, joined: Result<SubmitResult, tokio::task::JoinError>) {
        match joined {
            Ok(Ok(SubmitOutcome::Completed(summary))) => {
                let agents = self.controller.context().agents();
                println!();
                println!(
                    "{}",
                    ConsoleFormatter::render(self.output.format, &summary, &agents)
                );
            }
            Ok(Ok(SubmitOutcome::Queued)) => {
                println!("{}", "Noted; the crowd will take that into account shortly.".dimmed());
            }
            Ok(Err(e)) => eprintln!("{} {}", "Error:".red(), e),
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!("Deliberation task failed: {}", e),
        }
    }
}
