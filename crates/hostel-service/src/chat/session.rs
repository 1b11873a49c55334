//! Per-user chat session.
//!
//! Holds the ordered message history, persists every message, and produces
//! bot replies on detached tasks after a simulated typing delay. Front ends
//! follow the session through [`ChatEvent`]s.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hostel_core::assistant::{self, greeting};
use hostel_core::chat::{Message, SuggestedAction};
use hostel_core::config::AssistantConfig;
use hostel_store::{ChatRecord, ChatStore, SharedStore, Store};
use rand::RngExt;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::AuthSession;
use crate::error::{ServiceError, ServiceResult};

/// What changed in a session.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    MessageAdded(Message),
    /// Reactions or helpfulness changed.
    MessageUpdated(Message),
    MessageDeleted(String),
    Typing(bool),
    /// A background write failed; the local history still has the change.
    Error(String),
}

/// Session tuning, usually taken from [`AssistantConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatOptions {
    pub typing_delay_min_ms: u64,
    pub typing_delay_max_ms: u64,
    pub history_limit: u32,
    pub event_capacity: usize,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

impl From<&AssistantConfig> for ChatOptions {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            typing_delay_min_ms: config.typing_delay_min_ms,
            typing_delay_max_ms: config.typing_delay_max_ms,
            history_limit: config.history_limit,
            event_capacity: config.event_capacity,
        }
    }
}

impl ChatOptions {
    /// No typing delay (tests and one-shot questions).
    #[must_use]
    pub const fn instant(mut self) -> Self {
        self.typing_delay_min_ms = 0;
        self.typing_delay_max_ms = 0;
        self
    }

    fn typing_delay(&self) -> Duration {
        let (min, max) = (self.typing_delay_min_ms, self.typing_delay_max_ms);
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

/// A bot reply still being "typed".
///
/// Dropping it does not cancel the reply.
#[derive(Debug)]
pub struct PendingReply {
    user_message: Message,
    handle: JoinHandle<Message>,
}

impl PendingReply {
    pub const fn user_message(&self) -> &Message {
        &self.user_message
    }

    /// Wait for the bot reply.
    pub async fn wait(self) -> ServiceResult<Message> {
        self.handle
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))
    }
}

struct SessionInner {
    store: SharedStore,
    auth: AuthSession,
    session_id: String,
    history: RwLock<Vec<Message>>,
    pending: AtomicUsize,
    events: broadcast::Sender<ChatEvent>,
    options: ChatOptions,
}

impl SessionInner {
    fn emit(&self, event: ChatEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn persist(&self, msg: &Message) {
        let record = ChatRecord::from_message(self.auth.user_id(), msg);
        if let Err(e) = self.store.insert_chat(&record).await {
            warn!(message_id = %msg.id, error = %e, "Failed to save chat message");
            self.emit(ChatEvent::Error(format!("Failed to save message: {e}")));
        }
    }

    async fn append(&self, msg: Message) {
        self.history.write().await.push(msg.clone());
        self.emit(ChatEvent::MessageAdded(msg));
    }
}

/// Chat history and reply generation for one signed-in user.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

impl ChatSession {
    /// Load the latest history; an empty history starts with a greeting that is not saved.
    pub async fn open(store: SharedStore, auth: AuthSession, options: ChatOptions) -> Self {
        let mut messages = match store
            .load_history(auth.user_id(), options.history_limit)
            .await
        {
            Ok(records) => records
                .into_iter()
                .map(ChatRecord::into_message)
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!(user_id = %auth.user_id(), error = %e, "Failed to load chat history");
                Vec::new()
            }
        };

        if !messages.is_empty() {
            let ids: Vec<String> = messages.iter().map(|m| m.id.clone()).collect();
            match store.reactions_for(&ids).await {
                Ok(reactions) => {
                    for reaction in reactions {
                        if let Some(msg) = messages.iter_mut().find(|m| m.id == reaction.message_id) {
                            msg.apply_reaction(reaction);
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Failed to load reactions"),
            }
        }

        if messages.is_empty() {
            messages.push(Message::bot(greeting(auth.display_name()), Vec::new()));
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        info!(
            user_id = %auth.user_id(),
            %session_id,
            messages = messages.len(),
            backend = store.backend_name(),
            "Chat session opened"
        );

        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        Self {
            inner: Arc::new(SessionInner {
                store,
                auth,
                session_id,
                history: RwLock::new(messages),
                pending: AtomicUsize::new(0),
                events,
                options,
            }),
        }
    }

    /// Identifies this session in helpfulness votes.
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn auth(&self) -> &AuthSession {
        &self.inner.auth
    }

    pub(crate) fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: ChatEvent) {
        self.inner.emit(event);
    }

    /// Snapshot of the history, oldest first.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.history.read().await.clone()
    }

    pub async fn message(&self, id: &str) -> Option<Message> {
        self.inner
            .history
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    /// Whether any reply is still pending.
    pub fn is_typing(&self) -> bool {
        self.inner.pending.load(Ordering::SeqCst) > 0
    }

    /// Send user text and start the reply.
    ///
    /// The user message is in the history when this returns; the bot reply
    /// follows after the typing delay.
    pub async fn send_message(&self, text: &str) -> ServiceResult<PendingReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::validation("message is empty"));
        }

        let user_message = Message::user(text);
        self.inner.append(user_message.clone()).await;
        self.inner.persist(&user_message).await;

        if self.inner.pending.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.emit(ChatEvent::Typing(true));
        }

        let delay = self.inner.options.typing_delay();
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let reply = assistant::respond(&text, inner.auth.role(), inner.auth.display_name());
            let bot = Message::bot(reply.text, reply.actions).with_query_type(reply.query_type);
            debug!(query_type = reply.query_type, delay_ms = delay.as_millis(), "Reply ready");

            inner.append(bot.clone()).await;
            inner.persist(&bot).await;

            if inner.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                inner.emit(ChatEvent::Typing(false));
            }
            bot
        });

        Ok(PendingReply {
            user_message,
            handle,
        })
    }

    /// Delete one of this user's messages from storage, then from the history.
    /// Reactions and votes stay.
    pub async fn delete_message(&self, id: &str) -> ServiceResult<()> {
        if !self.inner.history.read().await.iter().any(|m| m.id == id) {
            return Err(ServiceError::NotFound(format!("Message {id}")));
        }

        let removed = self
            .inner
            .store
            .delete_chat(self.inner.auth.user_id(), id)
            .await?;
        if !removed {
            debug!(message_id = %id, "Message was not in storage");
        }

        self.inner.history.write().await.retain(|m| m.id != id);
        info!(message_id = %id, "Message deleted; its reactions are kept");
        self.inner.emit(ChatEvent::MessageDeleted(id.to_string()));
        Ok(())
    }

    /// Apply `f` to a message in the history and broadcast the result.
    pub(crate) async fn update_message(
        &self,
        id: &str,
        f: impl FnOnce(&mut Message),
    ) -> Option<Message> {
        let mut history = self.inner.history.write().await;
        let msg = history.iter_mut().find(|m| m.id == id)?;
        f(msg);
        let updated = msg.clone();
        drop(history);
        self.inner.emit(ChatEvent::MessageUpdated(updated.clone()));
        Some(updated)
    }

    /// Case-insensitive substring search over message text.
    pub async fn search(&self, query: &str) -> Vec<Message> {
        let needle = query.to_lowercase();
        self.inner
            .history
            .read()
            .await
            .iter()
            .filter(|m| m.text.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Write the history as `Sender,Message,Timestamp` CSV.
    pub async fn export_csv<W: Write>(&self, writer: W) -> ServiceResult<()> {
        let messages = self.messages().await;
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["Sender", "Message", "Timestamp"])?;
        for msg in &messages {
            csv.write_record([
                msg.sender.as_str(),
                msg.text.as_str(),
                &msg.created_at.to_rfc3339(),
            ])?;
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn suggested_replies(&self) -> Vec<SuggestedAction> {
        assistant::suggested_replies(self.inner.auth.role())
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("session_id", &self.inner.session_id)
            .field("user_id", &self.inner.auth.user_id())
            .finish_non_exhaustive()
    }
}
