//! Deliberation controller
//!
//! Entry point for user input. The first message of a session becomes the
//! question; anything sent while a run is in flight is queued for the next
//! phase boundary; anything sent after completion runs as a follow-up.

use crate::ports::deliberation_gateway::DeliberationGateway;
use crate::session::SessionContext;
use crate::use_cases::orchestrator::{DeliberationError, DeliberationOrchestrator};
use deliberation_domain::{ConversationMessage, DeliberationSummary, Question};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// What happened to a submitted message
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A run finished (the question itself, or follow-ups)
    Completed(DeliberationSummary),
    /// A run was in flight; the message waits for the next boundary
    Queued,
}

/// Clears the busy flag on drop
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DeliberationController<G: DeliberationGateway + 'static> {
    orchestrator: DeliberationOrchestrator<G>,
    busy: AtomicBool,
}

impl<G: DeliberationGateway + 'static> DeliberationController<G> {
    pub fn new(orchestrator: DeliberationOrchestrator<G>) -> Self {
        Self {
            orchestrator,
            busy: AtomicBool::new(false),
        }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        self.orchestrator.context()
    }

    pub fn orchestrator(&self) -> &DeliberationOrchestrator<G> {
        &self.orchestrator
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    /// Handle one line of user input
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome, DeliberationError> {
        let message = Question::parse(text)?;
        let context = self.context();
        context.record_message(ConversationMessage::user(message.content()));

        let Some(guard) = self.try_acquire() else {
            debug!("Pipeline busy; queueing message");
            context.queue_message(message.into_content());
            return Ok(SubmitOutcome::Queued);
        };

        let mut summary = if context.question().is_none() {
            self.orchestrator.run(message).await
        } else {
            context.queue_message(message.into_content());
            self.orchestrator.process_follow_ups().await
        };
        drop(guard);

        // messages queued after the last drain but before the flag cleared
        while context.pending_count() > 0 {
            let Some(guard) = self.try_acquire() else {
                break;
            };
            info!("Picking up follow-ups queued at the end of the run");
            summary = self.orchestrator.process_follow_ups().await;
            drop(guard);
        }

        summary.map(SubmitOutcome::Completed)
    }

    /// Start over with a new question.
    ///
    /// Refused while a run is in flight. Memory extraction for the finished
    /// conversation is attempted first; its failure does not block the reset.
    pub async fn new_question(&self) -> Result<(), DeliberationError> {
        let Some(_guard) = self.try_acquire() else {
            return Err(DeliberationError::Busy);
        };
        let context = self.context();

        if let (Some(memory), Some(question)) = (self.orchestrator.memory(), context.question()) {
            let thread = context.conversation();
            if !thread.is_empty() {
                // errors are logged by MemoryAccess
                let _ = memory.extract(&thread, question.content()).await;
            }
        }

        self.orchestrator.reset();
        Ok(())
    }
}
