//! Archive of past blessings, mirrored in memory and written back whole on
//! every change.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::Message;
use crate::storage::{self, KeyValueStore};

pub const ARCHIVE_KEY: &str = "archived_messages";

const LOAD_FAILED: &str = "Failed to load archived messages";
const ARCHIVE_FAILED: &str = "Failed to archive message";
const FAVORITE_FAILED: &str = "Failed to update favorite status";

pub struct ArchiveStore {
    store: Arc<dyn KeyValueStore>,
    messages: Vec<Message>,
    loading: bool,
    error: Option<String>,
}

impl ArchiveStore {
    /// Store that has not loaded yet
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            messages: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// Create and load. A load failure is kept in `error()` and leaves the archive empty.
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let mut archive = Self::new(store);
        let _ = archive.load().await;
        archive
    }

    pub async fn load(&mut self) -> Result<(), StoreError> {
        let result = storage::read_list::<Message>(self.store.as_ref(), ARCHIVE_KEY).await;
        self.loading = false;
        match result {
            Ok(messages) => {
                debug!(count = messages.len(), "archive loaded");
                self.messages = messages;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "archive load failed");
                self.messages.clear();
                Err(self.fail(StoreError::load(LOAD_FAILED, e)))
            }
        }
    }

    /// Put `message` in front of every existing entry
    pub async fn archive(&mut self, message: Message) -> Result<(), StoreError> {
        let mut staged = Vec::with_capacity(self.messages.len() + 1);
        staged.push(message);
        staged.extend(self.messages.iter().cloned());
        self.commit(staged, ARCHIVE_FAILED).await
    }

    /// Flip `isFavorite` on the matching entry; unknown ids still rewrite the list
    pub async fn toggle_favorite(&mut self, id: &str) -> Result<(), StoreError> {
        let staged = self
            .messages
            .iter()
            .map(|msg| {
                if msg.id == id {
                    Message {
                        is_favorite: Some(!msg.is_favorite()),
                        ..msg.clone()
                    }
                } else {
                    msg.clone()
                }
            })
            .collect();
        self.commit(staged, FAVORITE_FAILED).await
    }

    async fn commit(
        &mut self,
        staged: Vec<Message>,
        context: &'static str,
    ) -> Result<(), StoreError> {
        if let Err(e) = storage::write_list(self.store.as_ref(), ARCHIVE_KEY, &staged).await {
            warn!(error = %e, context, "archive write failed");
            return Err(self.fail(StoreError::write(context, e)));
        }
        self.messages = staged;
        Ok(())
    }

    fn fail(&mut self, error: StoreError) -> StoreError {
        self.error = Some(error.message().to_string());
        error
    }

    /// Newest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn filtered<'a>(
        &'a self,
        query: &'a str,
        category: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Message> + 'a {
        filter_messages(&self.messages, query, category)
    }

    /// Distinct categories in list order
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for message in &self.messages {
            if !categories.contains(&message.category.as_str()) {
                categories.push(&message.category);
            }
        }
        categories
    }
}

/// Messages whose text or category contains `query` (case-insensitive),
/// restricted to an exact `category` when one is given
pub fn filter_messages<'a>(
    messages: &'a [Message],
    query: &'a str,
    category: Option<&'a str>,
) -> impl Iterator<Item = &'a Message> + 'a {
    messages.iter().filter(move |msg| {
        msg.matches_search(query) && category.is_none_or(|c| msg.category == c)
    })
}
