use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;
use uuid::Uuid;

/// Key of one client's conversation. Supplied by the client, or minted
/// for the first request of a new conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4().to_string())
    }

    pub fn from_client(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => SessionId(raw.to_string()),
            _ => SessionId::generate(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory message history per session. Only the newest `max_turns`
/// exchanges of each session are kept, and only the `max_sessions` most
/// recently used sessions.
pub struct ConversationStore<M> {
    state: RwLock<StoreState<M>>,
    max_turns: usize,
    max_sessions: usize,
}

struct StoreState<M> {
    sessions: HashMap<SessionId, SessionHistory<M>>,
    clock: u64,
}

struct SessionHistory<M> {
    turns: VecDeque<Vec<M>>,
    last_used: u64,
}

impl<M: Clone> ConversationStore<M> {
    pub fn new(max_turns: usize, max_sessions: usize) -> Self {
        ConversationStore {
            state: RwLock::new(StoreState {
                sessions: HashMap::new(),
                clock: 0,
            }),
            max_turns,
            max_sessions,
        }
    }

    pub async fn history(&self, session: &SessionId) -> Vec<M> {
        self.state
            .read()
            .await
            .sessions
            .get(session)
            .map(|history| history.turns.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn append_turn(&self, session: &SessionId, messages: Vec<M>) {
        if self.max_turns == 0 || self.max_sessions == 0 {
            return;
        }

        let mut state = self.state.write().await;
        state.clock += 1;
        let now = state.clock;

        if !state.sessions.contains_key(session) && state.sessions.len() >= self.max_sessions {
            let oldest = state
                .sessions
                .iter()
                .min_by_key(|(_, history)| history.last_used)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                log::info!("Evicting conversation history for session {}", oldest);
                state.sessions.remove(&oldest);
            }
        }

        let history = state
            .sessions
            .entry(session.clone())
            .or_insert_with(|| SessionHistory {
                turns: VecDeque::new(),
                last_used: now,
            });
        history.last_used = now;
        history.turns.push_back(messages);
        while history.turns.len() > self.max_turns {
            history.turns.pop_front();
        }
    }

    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }
}
