//! Test messenger: records every outbound message and prompt.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use trivia_duel_core::messenger::{
    ChoicePrompt, DeliveryError, MessageAction, MessageRef, Messenger, PromptId,
};
use trivia_duel_core::player::PlayerId;

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    /// A plain message.
    Message {
        /// Recipient.
        to: PlayerId,
        /// Text.
        text: String,
        /// Attached buttons.
        actions: Vec<MessageAction>,
    },
    /// An edit of an earlier message.
    Edit {
        /// Recipient.
        to: PlayerId,
        /// Edited message.
        message: MessageRef,
        /// New text.
        text: String,
    },
    /// A timed choice prompt.
    Prompt {
        /// Recipient.
        to: PlayerId,
        /// Prompt as sent.
        prompt: ChoicePrompt,
        /// Identifier handed back to the engine.
        id: PromptId,
    },
}

type PromptHook = Box<dyn Fn(&PlayerId, &ChoicePrompt, &PromptId) + Send + Sync>;

/// A messenger that records all calls and hands out sequential ids
/// (`msg-1`, `prompt-1`, ...). Deliveries to players marked with
/// [`RecordingMessenger::fail_deliveries_to`] fail. A prompt hook lets tests
/// react to each delivered prompt, e.g. by answering it.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    failing: Mutex<HashSet<PlayerId>>,
    failing_prompts_after: Mutex<Option<usize>>,
    counter: Mutex<u64>,
    hook: Mutex<Option<PromptHook>>,
}

impl std::fmt::Debug for RecordingMessenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingMessenger")
            .field("sent", &self.sent)
            .finish_non_exhaustive()
    }
}

impl RecordingMessenger {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delivery to `player` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_deliveries_to(&self, player: &PlayerId) {
        self.failing.lock().unwrap().insert(player.clone());
    }

    /// Makes every prompt after the first `n` delivered prompts fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_prompts_after(&self, n: usize) {
        *self.failing_prompts_after.lock().unwrap() = Some(n);
    }

    /// Installs a callback run for every successfully delivered prompt.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn on_prompt<F>(&self, hook: F)
    where
        F: Fn(&PlayerId, &ChoicePrompt, &PromptId) + Send + Sync + 'static,
    {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    /// Snapshot of everything sent so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts of plain messages sent to `player`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn messages_to(&self, player: &PlayerId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Message { to, text, .. } if to == player => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Plain messages sent to `player` together with their buttons.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn messages_with_actions_to(&self, player: &PlayerId) -> Vec<(String, Vec<MessageAction>)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Message { to, text, actions } if to == player => {
                    Some((text.clone(), actions.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Prompts sent to `player`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts_to(&self, player: &PlayerId) -> Vec<ChoicePrompt> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Prompt { to, prompt, .. } if to == player => Some(prompt.clone()),
                _ => None,
            })
            .collect()
    }

    /// Edits sent to `player`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn edits_to(&self, player: &PlayerId) -> Vec<(MessageRef, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Edit { to, message, text } if to == player => {
                    Some((message.clone(), text.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn next_id(&self) -> u64 {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        *counter
    }

    fn check(&self, to: &PlayerId) -> Result<(), DeliveryError> {
        if self.failing.lock().unwrap().contains(to) {
            return Err(DeliveryError(format!("recipient {to} unreachable")));
        }
        Ok(())
    }

    fn prompt_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| matches!(s, Sent::Prompt { .. }))
            .count()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(
        &self,
        to: &PlayerId,
        text: &str,
        actions: &[MessageAction],
    ) -> Result<MessageRef, DeliveryError> {
        self.check(to)?;
        let id = MessageRef(format!("msg-{}", self.next_id()));
        self.sent.lock().unwrap().push(Sent::Message {
            to: to.clone(),
            text: text.to_owned(),
            actions: actions.to_vec(),
        });
        Ok(id)
    }

    async fn edit_message(
        &self,
        to: &PlayerId,
        message: &MessageRef,
        text: &str,
    ) -> Result<(), DeliveryError> {
        self.check(to)?;
        self.sent.lock().unwrap().push(Sent::Edit {
            to: to.clone(),
            message: message.clone(),
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn send_timed_choice_prompt(
        &self,
        to: &PlayerId,
        prompt: &ChoicePrompt,
    ) -> Result<PromptId, DeliveryError> {
        self.check(to)?;
        if let Some(limit) = *self.failing_prompts_after.lock().unwrap() {
            if self.prompt_count() >= limit {
                return Err(DeliveryError("prompt rejected".to_owned()));
            }
        }
        let id = PromptId(format!("prompt-{}", self.next_id()));
        self.sent.lock().unwrap().push(Sent::Prompt {
            to: to.clone(),
            prompt: prompt.clone(),
            id: id.clone(),
        });
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(to, prompt, &id);
        }
        Ok(id)
    }
}
