//! Correlation of answer events with the turns waiting for them.
//!
//! An entry exists exactly while a prompt is outstanding. Whichever of the
//! answer path ([`CorrelationTable::resolve`]) and the timeout path removes
//! the entry first decides the outcome; the other finds nothing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;
use trivia_duel_core::error::DomainError;
use trivia_duel_core::messenger::PromptId;
use trivia_duel_core::player::PlayerId;
use uuid::Uuid;

#[derive(Debug)]
struct Waiting {
    duel_id: Uuid,
    responder: PlayerId,
    sender: oneshot::Sender<usize>,
}

/// Process-wide map from outstanding prompt to the duel awaiting it.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    entries: Mutex<HashMap<PromptId, Waiting>>,
}

impl CorrelationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<PromptId, Waiting>>, DomainError> {
        self.entries
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("correlation table poisoned: {e}")))
    }

    /// Registers a freshly delivered prompt and returns the handle the turn
    /// waits on.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the duel already has an
    /// outstanding prompt or the table's lock is poisoned.
    pub fn register(
        &self,
        prompt: PromptId,
        duel_id: Uuid,
        responder: PlayerId,
    ) -> Result<PendingAnswer<'_>, DomainError> {
        let mut entries = self.lock()?;
        if entries.values().any(|w| w.duel_id == duel_id) {
            return Err(DomainError::Infrastructure(format!(
                "duel {duel_id} already has an outstanding prompt"
            )));
        }
        let (sender, receiver) = oneshot::channel();
        entries.insert(
            prompt.clone(),
            Waiting {
                duel_id,
                responder,
                sender,
            },
        );
        Ok(PendingAnswer {
            table: self,
            prompt,
            receiver,
        })
    }

    /// Delivers an answer event. Returns `true` if it resolved a waiting
    /// turn; unknown prompts and answers from anyone but the expected
    /// responder are dropped, leaving the entry in place.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the table's lock is poisoned.
    pub fn resolve(
        &self,
        prompt: &PromptId,
        responder: &PlayerId,
        option: usize,
    ) -> Result<bool, DomainError> {
        let waiting = {
            let mut entries = self.lock()?;
            let expected = entries.get(prompt).map(|w| w.responder == *responder);
            match expected {
                Some(true) => entries.remove(prompt),
                Some(false) => {
                    debug!(prompt_id = %prompt, responder = %responder, "answer from unexpected responder dropped");
                    None
                }
                None => {
                    debug!(prompt_id = %prompt, "answer for unknown prompt dropped");
                    None
                }
            }
        };
        Ok(waiting.is_some_and(|w| w.sender.send(option).is_ok()))
    }

    /// Removes an entry without resolving it. Returns whether it was present.
    fn expire(&self, prompt: &PromptId) -> bool {
        self.entries
            .lock()
            .map(|mut entries| entries.remove(prompt).is_some())
            .unwrap_or(false)
    }

    /// Whether a turn of `duel_id` is waiting on a prompt.
    #[must_use]
    pub fn is_waiting(&self, duel_id: Uuid) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.values().any(|w| w.duel_id == duel_id))
            .unwrap_or(false)
    }

    /// Number of outstanding prompts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether no prompt is outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A registered prompt a turn is waiting on. Dropping it removes the entry.
#[derive(Debug)]
pub struct PendingAnswer<'a> {
    table: &'a CorrelationTable,
    prompt: PromptId,
    receiver: oneshot::Receiver<usize>,
}

impl PendingAnswer<'_> {
    /// Waits up to `limit` for the answer. Returns the selected option, or
    /// `None` on timeout.
    pub async fn wait(mut self, limit: Duration) -> Option<usize> {
        match tokio::time::timeout(limit, &mut self.receiver).await {
            Ok(answer) => answer.ok(),
            // The answer path may have removed the entry between the timer
            // firing and this point; its value then wins.
            Err(_) if !self.table.expire(&self.prompt) => self.receiver.try_recv().ok(),
            Err(_) => None,
        }
    }
}

impl Drop for PendingAnswer<'_> {
    fn drop(&mut self) {
        self.table.expire(&self.prompt);
    }
}
