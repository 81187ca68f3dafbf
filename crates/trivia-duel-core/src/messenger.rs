//! Outbound messaging port.
//!
//! The transport layer renders messages and choice prompts to players. The
//! engine only sees identifiers: a [`MessageRef`] for plain messages and a
//! [`PromptId`] for timed choice prompts, which answer events carry back.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::player::PlayerId;

/// A message could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Transport-assigned identifier of a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageRef(pub String);

/// Transport-assigned identifier of a delivered choice prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(pub String);

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A button attached to a plain message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageAction {
    /// Start the recipient's turn in a duel.
    PlayTurn {
        /// Target duel.
        duel_id: Uuid,
    },
    /// Accept a named challenge.
    AcceptChallenge {
        /// Pending duel.
        duel_id: Uuid,
    },
    /// Ignore a named challenge.
    DeclineChallenge {
        /// Pending duel.
        duel_id: Uuid,
    },
    /// Challenge the given alias to a new duel.
    PlayAgain {
        /// Opponent alias.
        alias: String,
    },
}

/// A single-choice prompt that closes after `open_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoicePrompt {
    /// Prompt text.
    pub text: String,
    /// Options in presentation order.
    pub options: Vec<String>,
    /// Index of the correct option for quiz-style prompts; `None` for a
    /// plain poll such as a category choice.
    pub correct: Option<usize>,
    /// How long the transport keeps the prompt open.
    pub open_seconds: u32,
}

/// Outbound transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a plain message, optionally with buttons.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` if the transport did not accept the message.
    async fn send_message(
        &self,
        to: &PlayerId,
        text: &str,
        actions: &[MessageAction],
    ) -> Result<MessageRef, DeliveryError>;

    /// Replaces the text of an earlier message and drops its buttons.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` if the transport did not accept the edit.
    async fn edit_message(
        &self,
        to: &PlayerId,
        message: &MessageRef,
        text: &str,
    ) -> Result<(), DeliveryError>;

    /// Sends a timed choice prompt and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` if the prompt could not be delivered; the
    /// caller must treat it as never answerable.
    async fn send_timed_choice_prompt(
        &self,
        to: &PlayerId,
        prompt: &ChoicePrompt,
    ) -> Result<PromptId, DeliveryError>;
}
