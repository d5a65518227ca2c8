//! CLI entrypoint for Crowd Deliberation
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use deliberation_application::{
    ChatWithAgentUseCase, ConversationLogger, DeliberationController, DeliberationGateway,
    DeliberationOrchestrator, DeliberationProgress, HistoryRepository, MemoryAccess,
    MemoryGateway, NoConversationLogger, NoProgress, SessionContext, SubmitOutcome, WorldPort,
};
use deliberation_domain::{RandomSource, StdRandom};
use deliberation_infrastructure::{
    AccessTokens, ConfigLoader, FileConfig, InMemoryHistoryRepository, JsonlEventLogger,
    JsonlHistoryRepository, LocalMemoryService, MemoryThresholds, OpenAiClient,
    OpenAiDeliberationGateway, PersonaCatalog, ProviderKind, RemoteDeliberationGateway,
    SimulatedWorld, VectorMemoryStore,
};
use deliberation_presentation::{
    Cli, ConsoleFormatter, InteractiveSession, OutputConfig, ProgressReporter,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Everything a session needs besides the gateway
struct SessionParts {
    config: FileConfig,
    output: OutputConfig,
    context: Arc<SessionContext>,
    world: Arc<dyn WorldPort>,
    random: Arc<dyn RandomSource>,
    history: Arc<dyn HistoryRepository>,
    memory: Option<Arc<MemoryAccess>>,
    progress: Arc<dyn DeliberationProgress>,
    logger: Arc<dyn ConversationLogger>,
}

fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::new(cli.log_level());

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("Invalid configuration: {}", e))?
    };

    if let Some(agents) = cli.agents {
        config.session.agents = agents;
    }
    if let Some(seed) = cli.seed {
        config.session.seed = Some(seed);
    }
    if let Some(personas) = &cli.personas {
        config.session.personas_file = Some(personas.display().to_string());
    }

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        eprintln!("warning: {}", issue);
    }
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.to_string())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(config)
}

fn build_history(cli: &Cli, config: &FileConfig) -> Arc<dyn HistoryRepository> {
    if cli.no_history || !config.history.enabled {
        return Arc::new(InMemoryHistoryRepository::new());
    }
    match config.history.resolved_path() {
        Some(path) => {
            debug!("History file: {}", path.display());
            Arc::new(JsonlHistoryRepository::new(path))
        }
        None => {
            warn!("No data directory available; history is kept in memory only");
            Arc::new(InMemoryHistoryRepository::new())
        }
    }
}

fn openai_client(config: &FileConfig) -> Result<OpenAiClient> {
    let provider = &config.provider;
    let base_url = match (provider.kind, &provider.base_url) {
        (ProviderKind::OpenAi, Some(url)) => url.clone(),
        _ => deliberation_infrastructure::config::FileProviderConfig::OPENAI_BASE_URL.to_string(),
    };
    Ok(OpenAiClient::from_env(
        &provider.api_key_env,
        base_url,
        &provider.model,
        &provider.embedding_model,
        Duration::from_secs(provider.timeout_secs),
    )?)
}

fn build_memory(config: &FileConfig) -> Option<Arc<MemoryAccess>> {
    let memory = &config.memory;
    if !memory.enabled {
        return None;
    }
    let token = memory.access_token.clone().filter(|t| !t.trim().is_empty())?;

    let client = match openai_client(config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!("Memory disabled: {}", e);
            return None;
        }
    };
    let store = match &memory.store_path {
        Some(path) => match VectorMemoryStore::open(path) {
            Ok(store) => store,
            Err(e) => {
                warn!("Memory disabled: {}", e);
                return None;
            }
        },
        None => VectorMemoryStore::in_memory(),
    };

    let service = LocalMemoryService::new(
        Arc::new(store),
        AccessTokens::new(memory.tokens.clone()),
        client.clone(),
        client,
    )
    .with_thresholds(MemoryThresholds {
        dedup: memory.dedup_threshold,
        recall: memory.recall_threshold,
        recall_limit: memory.recall_limit,
    });
    info!("Memory enabled");
    Some(Arc::new(MemoryAccess::new(
        Arc::new(service) as Arc<dyn MemoryGateway>,
        token,
    )))
}

fn build_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    match config
        .logging
        .events_file
        .as_ref()
        .and_then(JsonlEventLogger::open)
    {
        Some(logger) => {
            info!("Writing deliberation events to {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}

async fn run_session<G: DeliberationGateway + 'static>(
    gateway: Arc<G>,
    parts: SessionParts,
    cli: &Cli,
) -> Result<()> {
    let orchestrator = DeliberationOrchestrator::new(gateway.clone(), parts.context.clone(), parts.world)
        .with_history(parts.history.clone())
        .with_random(parts.random)
        .with_progress(parts.progress)
        .with_logger(parts.logger)
        .with_pipeline(parts.config.pipeline.to_params())
        .with_grouping(parts.config.discussion.to_grouping())
        .with_user_id(parts.config.session.user_id.clone());
    let orchestrator = match parts.memory {
        Some(memory) => orchestrator.with_memory(memory),
        None => orchestrator,
    };
    let controller = Arc::new(DeliberationController::new(orchestrator));

    if cli.interactive {
        let chat = ChatWithAgentUseCase::new(gateway, parts.context.clone());
        let session = InteractiveSession::new(controller.clone(), chat, parts.history, parts.output);
        session
            .run(BufReader::new(tokio::io::stdin()))
            .await
            .context("failed to read input")?;
    } else {
        let Some(question) = &cli.question else {
            bail!("Question is required. Use --interactive for interactive mode.");
        };
        match controller.submit(question).await? {
            SubmitOutcome::Completed(summary) => {
                let agents = parts.context.agents();
                println!(
                    "{}",
                    ConsoleFormatter::render(parts.output.format, &summary, &agents)
                );
            }
            SubmitOutcome::Queued => bail!("A deliberation is already running"),
        }
    }

    // Hands the finished conversation to memory extraction
    if let Err(e) = controller.new_question().await {
        debug!("Skipped end-of-session cleanup: {}", e);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = load_config(&cli)?;
    info!("Starting Crowd Deliberation");

    let history = build_history(&cli, &config);
    if cli.history {
        let records = history
            .recent(&config.session.user_id, 50)
            .await
            .context("failed to read history")?;
        println!("{}", ConsoleFormatter::format_history(&records));
        return Ok(());
    }

    if !cli.interactive && cli.question.is_none() {
        bail!("Question is required. Use --interactive for interactive mode.");
    }

    // === Dependency Injection ===
    let random: Arc<dyn RandomSource> = match config.session.seed {
        Some(seed) => Arc::new(StdRandom::seeded(seed)),
        None => Arc::new(StdRandom::from_entropy()),
    };

    let catalog = match &config.session.personas_file {
        Some(path) => PersonaCatalog::load(path)
            .with_context(|| format!("failed to load personas from {}", path))?,
        None => PersonaCatalog::builtin(),
    };
    let profiles = catalog.select(config.session.agents, random.as_ref());
    if profiles.is_empty() {
        bail!("No agents to deliberate with");
    }
    let context = Arc::new(SessionContext::new(profiles));

    let world = SimulatedWorld::new(config.world.width, config.world.height, random.clone());
    world.spawn(&context.agent_ids());

    let output = OutputConfig::resolve(
        cli.output.map(Into::into),
        config.output.format,
        config.output.color,
        cli.quiet,
    );
    output.apply_color();
    let progress: Arc<dyn DeliberationProgress> = if output.show_progress {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(NoProgress)
    };

    let parts = SessionParts {
        memory: build_memory(&config),
        logger: build_logger(&config),
        output,
        context,
        world: Arc::new(world),
        random,
        history,
        progress,
        config,
    };

    match parts.config.provider.kind {
        ProviderKind::OpenAi => {
            let client = openai_client(&parts.config)?;
            info!("Using OpenAI-compatible provider, model {}", client.model());
            run_session(Arc::new(OpenAiDeliberationGateway::new(client)), parts, &cli).await
        }
        ProviderKind::Endpoint => {
            let provider = &parts.config.provider;
            let Some(base_url) = provider.resolved_base_url() else {
                bail!("provider.base_url is required for the endpoint provider");
            };
            info!("Using deliberation endpoint at {}", base_url);
            let gateway = RemoteDeliberationGateway::new(base_url, Duration::from_secs(provider.timeout_secs));
            run_session(Arc::new(gateway), parts, &cli).await
        }
    }
}
