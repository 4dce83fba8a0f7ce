//! Conversation orchestrator
//!
//! Owns the append-only message log and runs one turn at a time: append the
//! user message, call the backend with the windowed history, dispatch any
//! requested tools and append the composed reply.

use super::window::backend_history;
use super::ConversationMessage;
use crate::dispatch::ToolDispatcher;
use crate::entitlement::CredentialState;
use crate::llm::{LlmMessage, LlmRequest, LlmService, SystemContent};
use crate::parser::{extract_invocations, extract_text};
use crate::state_machine::{transition, TransitionError, TurnEvent, TurnPhase};
use crate::system_prompt::build_system_prompt;
use crate::tools::RemoteToolService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::RwLock;

/// Control command that switches on holiday mode
pub const HOLIDAY_COMMAND: &str = "init_holiday_protocol";

const HOLIDAY_NOTICE: &str = "🎅 HOLIDAY PROTOCOL ENGAGED. GIFT_OS ONLINE. MERRY CHRISTMAS.";
const LINK_UNSTABLE_NOTICE: &str = "ERROR: Neural Link Unstable. Please check connection.";
const WELCOME_TEXT: &str = "Welcome to MINI MOE META OS. System initialized.\n\nTry these commands:\n> \"Price of PS5\" (AMAZON CLI)\n> \"Analyze Bitcoin sentiment\"\n> \"Startup idea for AI\" (BUSINESS GEN)\n> \"Hire React Dev\" (TALENT SCOUT)\n> \"Learn Day Trading\" (SKILL INJECTOR)";

/// How a submitted turn ended
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Assistant reply appended
    Reply(ConversationMessage),
    /// Backend failed; system notice appended
    Failed(ConversationMessage),
    /// Control command handled locally; system notice appended
    Notice(ConversationMessage),
}

impl TurnOutcome {
    pub fn message(&self) -> &ConversationMessage {
        match self {
            TurnOutcome::Reply(m) | TurnOutcome::Failed(m) | TurnOutcome::Notice(m) => m,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TurnOutcome::Reply(_) => "reply",
            TurnOutcome::Failed(_) => "failed",
            TurnOutcome::Notice(_) => "notice",
        }
    }
}

/// A submission that was ignored; the conversation is unchanged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnRejected {
    #[error("Message is empty")]
    EmptyInput,
    #[error("A turn is already in progress")]
    Busy,
}

impl From<TransitionError> for TurnRejected {
    fn from(_: TransitionError) -> Self {
        TurnRejected::Busy
    }
}

fn lock_phase(phase: &Mutex<TurnPhase>) -> MutexGuard<'_, TurnPhase> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the conversation for one turn; settles back to idle when dropped
struct TurnGuard<'a> {
    phase: &'a Mutex<TurnPhase>,
}

impl<'a> TurnGuard<'a> {
    fn claim(phase: &'a Mutex<TurnPhase>) -> Result<Self, TurnRejected> {
        let mut current = lock_phase(phase);
        *current = transition(*current, TurnEvent::Submit)?;
        Ok(Self { phase })
    }

    fn advance(&self, event: TurnEvent) {
        let mut current = lock_phase(self.phase);
        match transition(*current, event) {
            Ok(next) => *current = next,
            Err(e) => tracing::error!(error = %e, "Unexpected turn transition"),
        }
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        let mut current = lock_phase(self.phase);
        *current = transition(*current, TurnEvent::Settle).unwrap_or_default();
    }
}

/// Orchestrator over type-erased backends, as served by the API
pub type SharedOrchestrator = Orchestrator<Arc<dyn LlmService>, Arc<dyn RemoteToolService>>;

pub struct Orchestrator<L, R>
where
    L: LlmService,
    R: RemoteToolService,
{
    llm: L,
    dispatcher: ToolDispatcher<R>,
    messages: RwLock<Vec<ConversationMessage>>,
    phase: Mutex<TurnPhase>,
    holiday_mode: AtomicBool,
}

impl<L, R> Orchestrator<L, R>
where
    L: LlmService,
    R: RemoteToolService,
{
    /// New conversation, seeded with the welcome notice
    pub fn new(llm: L, dispatcher: ToolDispatcher<R>) -> Self {
        Self::with_history(llm, dispatcher, vec![ConversationMessage::system(WELCOME_TEXT)])
    }

    /// Conversation resuming from existing messages
    pub fn with_history(
        llm: L,
        dispatcher: ToolDispatcher<R>,
        messages: Vec<ConversationMessage>,
    ) -> Self {
        Self {
            llm,
            dispatcher,
            messages: RwLock::new(messages),
            phase: Mutex::new(TurnPhase::Idle),
            holiday_mode: AtomicBool::new(false),
        }
    }

    /// Snapshot of the full conversation
    pub async fn messages(&self) -> Vec<ConversationMessage> {
        self.messages.read().await.clone()
    }

    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }

    pub fn is_busy(&self) -> bool {
        lock_phase(&self.phase).is_in_flight()
    }

    pub fn holiday_mode(&self) -> bool {
        self.holiday_mode.load(Ordering::Relaxed)
    }

    /// Run one turn.
    ///
    /// Empty input or an overlapping submission is rejected without touching
    /// the conversation. Every accepted turn appends the user message and
    /// then exactly one assistant or system message.
    pub async fn submit_turn(
        &self,
        user_text: &str,
        credential: &CredentialState,
    ) -> Result<TurnOutcome, TurnRejected> {
        if user_text.trim().is_empty() {
            return Err(TurnRejected::EmptyInput);
        }
        let guard = TurnGuard::claim(&self.phase)?;

        if user_text.trim() == HOLIDAY_COMMAND {
            self.holiday_mode.store(true, Ordering::Relaxed);
            let notice = ConversationMessage::system(HOLIDAY_NOTICE);
            self.append(notice.clone()).await;
            tracing::info!("Holiday protocol engaged");
            return Ok(TurnOutcome::Notice(notice));
        }

        let history = {
            let mut messages = self.messages.write().await;
            let history = backend_history(&messages);
            messages.push(ConversationMessage::user(user_text));
            history
        };

        let request = self.build_request(user_text, history);
        let response = match self.llm.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind, "Turn failed at backend");
                guard.advance(TurnEvent::BackendFailed);
                let notice = ConversationMessage::system(LINK_UNSTABLE_NOTICE);
                self.append(notice.clone()).await;
                return Ok(TurnOutcome::Failed(notice));
            }
        };

        let invocations = extract_invocations(&response);
        let mut text = extract_text(&response);
        let results = if invocations.is_empty() {
            Vec::new()
        } else {
            tracing::info!(count = invocations.len(), "Dispatching tool invocations");
            self.dispatcher.resolve(&invocations, credential).await
        };

        if text.is_none() && !results.is_empty() {
            text = Some(format!(
                "Process complete. {} operations executed.",
                results.len()
            ));
        }

        let reply = ConversationMessage::assistant(text, results);
        self.append(reply.clone()).await;
        guard.advance(TurnEvent::BackendReplied);
        Ok(TurnOutcome::Reply(reply))
    }

    fn build_request(&self, user_text: &str, history: Vec<LlmMessage>) -> LlmRequest {
        let registry = self.dispatcher.registry();
        let mut messages = history;
        messages.push(LlmMessage::user(user_text));

        LlmRequest {
            system: vec![SystemContent::new(build_system_prompt(
                registry,
                self.holiday_mode(),
            ))],
            messages,
            tools: registry.definitions(),
        }
    }

    async fn append(&self, message: ConversationMessage) {
        self.messages.write().await.push(message);
    }
}
