//! Conversation engine - the listening/feedback state machine.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::support::analysis::TextAnalyzer;
use crate::support::database::{Database, NewResponse};
use crate::support::replies::{self, RandomSource};
use crate::support::techniques::{GENERAL_SUPPORT, match_techniques};

/// Where a session is in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Collecting what the user shares.
    Listening,
    /// Waiting for a yes/no answer about the last suggestions.
    Feedback,
}

/// A yes/no answer to "Did you find this helpful?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Yes,
    No,
}

impl Feedback {
    /// Parse a case-insensitive "yes"/"no", ignoring surrounding whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

/// An inbound event for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Start,
    Advice,
    Cancel,
    Text(&'a str),
}

/// Keyboard affordance attached to a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave the client keyboard as it is.
    Unchanged,
    /// Offer one-tap "yes" / "no" buttons.
    YesNo,
    /// Remove any custom keyboard.
    Remove,
}

/// An outbound text reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), keyboard: Keyboard::Unchanged }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self { text: text.into(), keyboard }
    }
}

/// Per-user conversation context, owned by the dispatch layer.
#[derive(Debug, Clone)]
pub struct Session {
    user_id: i64,
    state: State,
    utterances: Vec<String>,
    sentiment_score: f64,
    techniques: String,
    feedback: Option<Feedback>,
}

impl Session {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            state: State::Listening,
            utterances: Vec::new(),
            sentiment_score: 0.0,
            techniques: String::new(),
            feedback: None,
        }
    }

    #[cfg(test)]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    #[cfg(test)]
    pub fn state(&self) -> State {
        self.state
    }

    #[cfg(test)]
    pub fn utterances(&self) -> &[String] {
        &self.utterances
    }

    /// Everything the user shared this cycle, joined with single spaces.
    pub fn conversation_text(&self) -> String {
        self.utterances.join(" ")
    }

    #[cfg(test)]
    pub fn sentiment_score(&self) -> f64 {
        self.sentiment_score
    }

    #[cfg(test)]
    pub fn techniques(&self) -> &str {
        &self.techniques
    }

    #[cfg(test)]
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }
}

/// Sessions keyed by user id.
pub type Sessions = HashMap<i64, Session>;

/// The conversation engine.
///
/// Holds only read-only collaborators; all mutable state lives in the
/// [`Session`] passed to each call.
pub struct ConversationEngine {
    analyzer: Arc<dyn TextAnalyzer>,
    random: Arc<dyn RandomSource>,
    database: Database,
}

impl ConversationEngine {
    pub fn new(
        analyzer: Arc<dyn TextAnalyzer>,
        random: Arc<dyn RandomSource>,
        database: Database,
    ) -> Self {
        Self { analyzer, random, database }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Route one input for `user_id` given the user's current session, if any.
    ///
    /// Returns the session to keep (`None` once it ends) and the replies to send,
    /// in order. Inputs with no transition from the user's current position
    /// produce no replies.
    pub fn step(
        &self,
        session: Option<Session>,
        user_id: i64,
        input: Input<'_>,
    ) -> (Option<Session>, Vec<Reply>) {
        let Some(mut session) = session else {
            if input == Input::Start {
                let (session, replies) = self.start(user_id);
                return (Some(session), replies);
            }
            debug!("No active session for user {}, ignoring {:?}", user_id, input);
            return (None, Vec::new());
        };

        let replies = match input {
            Input::Cancel => return (None, self.cancel(session)),
            Input::Advice => self.advise(&mut session),
            Input::Text(text) => match session.state {
                State::Listening => self.listen(&mut session, text),
                State::Feedback => self.record_feedback(&mut session, text),
            },
            Input::Start => {
                debug!("User {} sent /start mid-conversation, ignoring", user_id);
                Vec::new()
            }
        };
        (Some(session), replies)
    }

    /// [`step`](Self::step) against a session map.
    #[cfg(test)]
    pub fn handle(&self, sessions: &mut Sessions, user_id: i64, input: Input<'_>) -> Vec<Reply> {
        let (session, replies) = self.step(sessions.remove(&user_id), user_id, input);
        if let Some(session) = session {
            sessions.insert(user_id, session);
        }
        replies
    }

    /// Open a fresh session and greet the user.
    pub fn start(&self, user_id: i64) -> (Session, Vec<Reply>) {
        info!("💬 Conversation started for user {}", user_id);
        (Session::new(user_id), vec![Reply::text(replies::GREETING)])
    }

    /// Accumulate a message and answer with a question or an acknowledgment.
    pub fn listen(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        session.utterances.push(text.trim().to_string());
        debug!("User {} has shared {} message(s)", session.user_id, session.utterances.len());
        vec![Reply::text(replies::listening_reply(self.random.as_ref()))]
    }

    /// Analyze the conversation so far and suggest matching techniques.
    pub fn advise(&self, session: &mut Session) -> Vec<Reply> {
        let text = session.conversation_text();
        let analysis = self.analyzer.analyze(&text);
        session.sentiment_score = analysis.sentiment;

        let matched = match_techniques(&analysis.tokens);
        let suggestion = if matched.is_empty() {
            session.techniques = GENERAL_SUPPORT.to_string();
            Reply::text(replies::GENERAL_SUPPORT_MESSAGE)
        } else {
            session.techniques = matched.join("; ");
            Reply::text(replies::techniques_message(&matched))
        };

        info!(
            "🧭 Advice for user {}: sentiment {:.4}, {} technique(s)",
            session.user_id,
            session.sentiment_score,
            matched.len()
        );

        session.state = State::Feedback;
        vec![
            suggestion,
            Reply::with_keyboard(replies::FEEDBACK_PROMPT, Keyboard::YesNo),
        ]
    }

    /// Accept a yes/no answer, persist the cycle and go back to listening.
    pub fn record_feedback(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        let Some(feedback) = Feedback::parse(text) else {
            return vec![Reply::with_keyboard(replies::FEEDBACK_RETRY, Keyboard::YesNo)];
        };
        session.feedback = Some(feedback);
        self.persist(session);

        session.utterances.clear();
        session.state = State::Listening;
        vec![Reply::with_keyboard(replies::FEEDBACK_THANKS, Keyboard::Remove)]
    }

    /// End the session.
    pub fn cancel(&self, session: Session) -> Vec<Reply> {
        info!("👋 Conversation ended for user {}", session.user_id);
        vec![Reply::with_keyboard(replies::FAREWELL, Keyboard::Remove)]
    }

    fn persist(&self, session: &Session) {
        let feedback = session.feedback.map(Feedback::as_str).unwrap_or_default();
        let user_input = session.conversation_text();
        let response = NewResponse {
            user_id: session.user_id,
            user_input: &user_input,
            sentiment_score: session.sentiment_score,
            selected_techniques: &session.techniques,
            feedback,
        };
        match self.database.save_response(&response) {
            Ok(id) => info!("💾 User {} responses saved to database (row {})", session.user_id, id),
            Err(e) => error!("Failed to save responses for user {}: {}", session.user_id, e),
        }
    }
}
