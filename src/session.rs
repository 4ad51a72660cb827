//! Chat session state and the one-shot title trigger
//!
//! Sessions are in-memory conversation threads. Each holds an append-only
//! message log and a title that starts at a default value and is replaced at
//! most once by a backend-generated title. The store also hands out turn
//! tickets so an answer that resolves after the user moved on is discarded
//! instead of being applied to the wrong place.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::types::SourceInfo;

/// Title given to every new session until generation replaces it.
pub const DEFAULT_SESSION_TITLE: &str = "New session";

/// Message count at which a session becomes eligible for title generation.
const TITLE_ELIGIBLE_LEN: usize = 2;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One entry in a session's message log.
///
/// Messages are append-only and never mutated after creation. Assistant
/// messages carry the source chunks their answer was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    /// A question typed by the user.
    User {
        /// Unique id within the session.
        id: Uuid,
        /// Question text.
        content: String,
    },
    /// An answer produced by the backend.
    Assistant {
        /// Unique id within the session.
        id: Uuid,
        /// Answer text.
        content: String,
        /// Cited chunks, in relevance order.
        sources: Vec<SourceInfo>,
    },
}

impl ChatMessage {
    /// Creates a user message with a fresh id.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            id: Uuid::new_v4(),
            content: content.into(),
        }
    }

    /// Creates an assistant message with a fresh id.
    pub fn assistant(content: impl Into<String>, sources: Vec<SourceInfo>) -> Self {
        Self::Assistant {
            id: Uuid::new_v4(),
            content: content.into(),
            sources,
        }
    }

    /// Message id.
    pub fn id(&self) -> Uuid {
        match self {
            Self::User { id, .. } | Self::Assistant { id, .. } => *id,
        }
    }

    /// Message text.
    pub fn content(&self) -> &str {
        match self {
            Self::User { content, .. } | Self::Assistant { content, .. } => content,
        }
    }

    /// Role label as used in title contexts and transcript rendering.
    pub fn role(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
        }
    }

    /// Cited sources; empty for user messages.
    pub fn sources(&self) -> &[SourceInfo] {
        match self {
            Self::User { .. } => &[],
            Self::Assistant { sources, .. } => sources,
        }
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Title lifecycle of a session.
///
/// `Requested` is deliberately sticky: an empty or failed generation leaves
/// the session effectively untitled but never re-arms the trigger, so the
/// backend is asked for a title at most once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TitleState {
    /// Default title, generation not requested yet.
    Untitled,
    /// Generation dispatched; awaiting a usable result.
    Requested,
    /// Title fixed. Terminal.
    Titled,
}

/// A single conversation thread.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    title: String,
    messages: Vec<ChatMessage>,
    created_at: DateTime<Utc>,
    title_state: TitleState,
    turn_seq: u64,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
            title_state: TitleState::Untitled,
            turn_seq: 0,
        }
    }

    /// Session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current title; the default until generation replaces it.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Message log, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Local creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether a generated title has been applied.
    pub fn is_titled(&self) -> bool {
        self.title_state == TitleState::Titled
    }

    /// Appends a message and arms the title trigger when the log reaches
    /// eligibility while the title is still the default.
    ///
    /// The state flips to `Requested` in the same call that emits the job,
    /// so a second append can never produce a duplicate request.
    fn push(&mut self, message: ChatMessage) -> Option<TitleJob> {
        self.messages.push(message);

        if self.title_state == TitleState::Untitled
            && self.title == DEFAULT_SESSION_TITLE
            && self.messages.len() >= TITLE_ELIGIBLE_LEN
        {
            self.title_state = TitleState::Requested;
            return Some(TitleJob {
                session_id: self.id,
                context: self.title_context(),
            });
        }
        None
    }

    /// Renders the log as one `role: content` line per message, the shape
    /// the title endpoint expects as context.
    fn title_context(&self) -> String {
        self.messages
            .iter()
            .map(|message| format!("{}: {}", message.role(), message.content()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A title-generation request emitted by the state machine.
///
/// The session id is captured at emission time so the resulting title is
/// applied to the session that asked for it, not whichever is active when
/// the call resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleJob {
    /// Session the title belongs to.
    pub session_id: Uuid,
    /// Transcript rendered for the title endpoint.
    pub context: String,
}

/// Handle for one submitted question.
///
/// Carries the session identity and that session's turn sequence at
/// submission time; both must still match for the answer to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTicket {
    session_id: Uuid,
    seq: u64,
}

impl TurnTicket {
    /// Session the question was submitted to.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Result of submitting a question to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Ticket to redeem when the answer arrives.
    pub ticket: TurnTicket,
    /// Title job, when the user message itself made the session eligible.
    pub title_job: Option<TitleJob>,
}

/// Outcome of redeeming a turn ticket.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Answer appended; the append may have armed the title trigger.
    Applied(Option<TitleJob>),
    /// Ticket superseded or session gone; nothing was applied.
    Stale,
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// All chat sessions of one client run, with exactly one active.
///
/// # Examples
///
/// ```
/// use askdocs::session::{ApplyOutcome, SessionStore, DEFAULT_SESSION_TITLE};
///
/// let mut store = SessionStore::new();
/// let id = store.active_id();
/// assert_eq!(store.get(id).map(|s| s.title()), Some(DEFAULT_SESSION_TITLE));
///
/// let submission = store.submit_question(id, "What is X?").expect("session exists");
/// match store.apply_answer(submission.ticket, "X is...", Vec::new()) {
///     ApplyOutcome::Applied(title_job) => assert!(title_job.is_some()),
///     ApplyOutcome::Stale => unreachable!("ticket is current"),
/// }
/// ```
#[derive(Debug)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    active_id: Uuid,
}

impl SessionStore {
    /// Creates a store holding one fresh session, which is active.
    pub fn new() -> Self {
        let session = ChatSession::new();
        let active_id = session.id;
        Self {
            sessions: vec![session],
            active_id,
        }
    }

    /// Id of the active session.
    pub fn active_id(&self) -> Uuid {
        self.active_id
    }

    /// The active session, when it still exists.
    pub fn active(&self) -> Option<&ChatSession> {
        self.get(self.active_id)
    }

    /// All sessions in creation order.
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Looks up a session by id.
    pub fn get(&self, id: Uuid) -> Option<&ChatSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|session| session.id == id)
    }

    /// Creates a fresh untitled session and makes it active.
    pub fn create_session(&mut self) -> Uuid {
        let session = ChatSession::new();
        let id = session.id;
        self.sessions.push(session);
        self.active_id = id;
        id
    }

    /// Makes the given session active. Returns `false` for unknown ids.
    pub fn switch_to(&mut self, id: Uuid) -> bool {
        if self.get(id).is_some() {
            self.active_id = id;
            true
        } else {
            false
        }
    }

    /// Appends the user's question and opens a new turn.
    ///
    /// Returns `None` for unknown sessions. The returned ticket supersedes
    /// any earlier ticket for the same session.
    pub fn submit_question(&mut self, session_id: Uuid, question: &str) -> Option<Submission> {
        let session = match self.get_mut(session_id) {
            Some(session) => session,
            None => return None,
        };

        session.turn_seq += 1;
        let ticket = TurnTicket {
            session_id,
            seq: session.turn_seq,
        };
        let title_job = session.push(ChatMessage::user(question));

        Some(Submission { ticket, title_job })
    }

    /// Applies an answer to the session and turn the ticket was issued for.
    ///
    /// Stale tickets (a newer question was submitted to the session, or the
    /// session no longer exists) are discarded without touching any state.
    pub fn apply_answer(
        &mut self,
        ticket: TurnTicket,
        answer: impl Into<String>,
        sources: Vec<SourceInfo>,
    ) -> ApplyOutcome {
        let session = match self.get_mut(ticket.session_id) {
            Some(session) => session,
            None => return ApplyOutcome::Stale,
        };
        if ticket.seq != session.turn_seq {
            tracing::debug!(
                "Discarding stale answer for session {} (turn {} superseded)",
                ticket.session_id,
                ticket.seq
            );
            return ApplyOutcome::Stale;
        }

        let title_job = session.push(ChatMessage::assistant(answer, sources));
        ApplyOutcome::Applied(title_job)
    }

    /// Applies a generated title to the session that requested it.
    ///
    /// Empty and whitespace-only titles are ignored, keeping the prior title
    /// without re-arming generation. A session that never requested a title,
    /// or is already titled, is left untouched. Returns `true` when the
    /// title was applied.
    pub fn apply_title(&mut self, session_id: Uuid, title: &str) -> bool {
        let session = match self.get_mut(session_id) {
            Some(session) => session,
            None => return false,
        };
        if session.title_state != TitleState::Requested {
            return false;
        }

        let title = title.trim();
        if title.is_empty() {
            tracing::debug!("Ignoring empty generated title for session {}", session_id);
            return false;
        }

        session.title = title.to_string();
        session.title_state = TitleState::Titled;
        true
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
