//! Background clusterer
//!
//! While the pipeline runs, periodically clusters whatever answers exist so
//! far (overlap mode) and publishes them as provisional results. The
//! orchestrator cancels it right before the authoritative clustering.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::deliberation_gateway::{ClusterRequest, DeliberationGateway};
use crate::ports::progress::DeliberationProgress;
use crate::session::{ProvisionalWriter, SessionContext};
use deliberation_domain::ClusterMode;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Handle to a running background clusterer.
///
/// Dropping the handle cancels the task.
pub struct BackgroundHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl BackgroundHandle {
    /// Stop the task. Any in-flight cluster call is abandoned.
    pub fn cancel(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for BackgroundHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub(crate) struct BackgroundClusterer<G: DeliberationGateway + 'static> {
    pub(crate) gateway: Arc<G>,
    pub(crate) context: Arc<SessionContext>,
    pub(crate) progress: Arc<dyn DeliberationProgress>,
    pub(crate) logger: Arc<dyn ConversationLogger>,
    pub(crate) period: Duration,
}

impl<G: DeliberationGateway + 'static> BackgroundClusterer<G> {
    /// Spawn the periodic task. The first tick fires one period from now.
    pub(crate) fn spawn(self) -> BackgroundHandle {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let task = tokio::spawn(async move { self.run(task_token).await });
        BackgroundHandle {
            token,
            task: Some(task),
        }
    }

    async fn run(self, token: CancellationToken) {
        let period = self.period.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let writer = ProvisionalWriter::new(Arc::clone(&self.context));

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = self.tick(&writer, &token) => {}
                    }
                }
            }
        }
        debug!("Background clusterer stopped");
    }

    async fn tick(&self, writer: &ProvisionalWriter, token: &CancellationToken) {
        let answers = self.context.answers();
        if answers.len() < 2 {
            debug!("Background clustering skipped: {} answers", answers.len());
            return;
        }
        let Some(question) = self.context.question() else {
            return;
        };

        let request = ClusterRequest {
            answers,
            question: question.content().to_string(),
            mode: ClusterMode::Overlap,
        };
        match self.gateway.cluster(&request).await {
            Ok(response) => {
                let themes = response.themes;
                if writer.publish(themes.clone(), token) {
                    debug!("Published {} provisional themes", themes.len());
                    self.progress.on_provisional_results(&themes);
                    self.logger.log(ConversationEvent::new(
                        "provisional_results",
                        json!({
                            "answers": request.answers.len(),
                            "themes": themes,
                        }),
                    ));
                }
            }
            Err(e) => warn!("Background clustering failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::conversation_logger::NoConversationLogger;
    use crate::session::{PhaseReader, PhaseWriter};
    use crate::test_support::{RecordingProgress, ScriptedGateway, profiles};
    use deliberation_domain::{AgentId, Phase, Question, ThemeCluster};

    fn answered_context(n: usize) -> Arc<SessionContext> {
        let context = Arc::new(SessionContext::new(profiles(n)));
        context.set_question(Question::parse("Move?").unwrap());
        for id in context.agent_ids() {
            context.update_agent(&id, |r| r.set_answer("yes"));
        }
        context
    }

    fn clusterer(
        gateway: Arc<ScriptedGateway>,
        context: Arc<SessionContext>,
        progress: Arc<RecordingProgress>,
    ) -> BackgroundClusterer<ScriptedGateway> {
        BackgroundClusterer {
            gateway,
            context,
            progress,
            logger: Arc::new(NoConversationLogger),
            period: Duration::from_secs(5),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_provisional_results() {
        let gateway = Arc::new(
            ScriptedGateway::new().with_overlap_themes(vec![ThemeCluster::new(
                "Early yes",
                vec![AgentId::from("character_0001")],
            )]),
        );
        let context = answered_context(3);
        PhaseWriter::new(Arc::clone(&context)).set(Phase::Thinking);
        let progress = Arc::new(RecordingProgress::default());

        let handle = clusterer(Arc::clone(&gateway), Arc::clone(&context), Arc::clone(&progress)).spawn();
        tokio::time::sleep(Duration::from_millis(5100)).await;
        handle.cancel();

        assert_eq!(context.results()[0].label, "Early yes");
        assert!(context.results_are_provisional());
        assert_eq!(progress.provisional_count(), 1);
        assert_eq!(gateway.cluster_modes(), vec![ClusterMode::Overlap]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skips_with_fewer_than_two_answers() {
        let gateway = Arc::new(ScriptedGateway::new());
        let context = answered_context(1);
        let progress = Arc::new(RecordingProgress::default());

        let handle = clusterer(Arc::clone(&gateway), context, progress).spawn();
        tokio::time::sleep(Duration::from_secs(16)).await;
        handle.cancel();

        assert!(gateway.cluster_modes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_write_after_clustering_begins() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_overlap_themes(vec![ThemeCluster::new("Late", vec![])])
                .with_cluster_delay(Duration::from_secs(3)),
        );
        let context = answered_context(2);
        let phases = PhaseWriter::new(Arc::clone(&context));
        phases.set(Phase::Discussing);
        let progress = Arc::new(RecordingProgress::default());

        let _handle = clusterer(Arc::clone(&gateway), Arc::clone(&context), Arc::clone(&progress)).spawn();
        // tick at 5s, response due at 8s; clustering starts in between
        tokio::time::sleep(Duration::from_secs(6)).await;
        phases.set(Phase::Clustering);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(gateway.cluster_modes(), vec![ClusterMode::Overlap]);
        assert!(context.results().is_empty());
        assert_eq!(progress.provisional_count(), 0);
        assert_eq!(context.phase(), Phase::Clustering);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let gateway = Arc::new(ScriptedGateway::new());
        let context = answered_context(2);
        let progress = Arc::new(RecordingProgress::default());

        let handle = clusterer(Arc::clone(&gateway), context, progress).spawn();
        handle.cancel();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(gateway.cluster_modes().is_empty());
    }
}
