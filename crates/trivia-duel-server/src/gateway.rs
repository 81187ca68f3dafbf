//! Outbound `Messenger` that posts to the transport gateway.
//!
//! The gateway owns the chat transport. It renders messages, buttons and
//! timed polls, and reports poll answers back to `POST /api/v1/answers`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trivia_duel_core::messenger::{
    ChoicePrompt, DeliveryError, MessageAction, MessageRef, Messenger, PromptId,
};
use trivia_duel_core::player::PlayerId;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `POST /messages`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Recipient.
    pub to: PlayerId,
    /// HTML-formatted text.
    pub text: String,
    /// Buttons to attach.
    pub actions: Vec<MessageAction>,
}

/// Response of `POST /messages`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// Transport id of the delivered message.
    pub message_id: MessageRef,
}

/// Body of `POST /messages/edit`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditMessageRequest {
    /// Chat holding the message.
    pub to: PlayerId,
    /// Message to replace.
    pub message_id: MessageRef,
    /// New text; buttons are dropped.
    pub text: String,
}

/// Body of `POST /prompts`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendPromptRequest {
    /// Recipient.
    pub to: PlayerId,
    /// The prompt to render.
    #[serde(flatten)]
    pub prompt: ChoicePrompt,
}

/// Response of `POST /prompts`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendPromptResponse {
    /// Id answers will carry.
    pub prompt_id: PromptId,
}

/// `Messenger` backed by the gateway's HTTP API.
#[derive(Clone)]
pub struct HttpMessenger {
    client: Client,
    base_url: String,
}

impl HttpMessenger {
    /// Creates a messenger for the gateway at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, DeliveryError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| DeliveryError(format!("{path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DeliveryError(format!("{path}: HTTP {status} {detail}")));
        }
        Ok(response)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DeliveryError> {
        self.post(path, body)
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError(format!("{path}: malformed response: {e}")))
    }
}

#[async_trait]
impl Messenger for HttpMessenger {
    async fn send_message(
        &self,
        to: &PlayerId,
        text: &str,
        actions: &[MessageAction],
    ) -> Result<MessageRef, DeliveryError> {
        let body = SendMessageRequest {
            to: to.clone(),
            text: text.to_owned(),
            actions: actions.to_vec(),
        };
        let sent: SendMessageResponse = self.post_json("/messages", &body).await?;
        debug!(player_id = %to, message_id = %sent.message_id.0, "message sent");
        Ok(sent.message_id)
    }

    async fn edit_message(
        &self,
        to: &PlayerId,
        message: &MessageRef,
        text: &str,
    ) -> Result<(), DeliveryError> {
        let body = EditMessageRequest {
            to: to.clone(),
            message_id: message.clone(),
            text: text.to_owned(),
        };
        self.post("/messages/edit", &body).await?;
        Ok(())
    }

    async fn send_timed_choice_prompt(
        &self,
        to: &PlayerId,
        prompt: &ChoicePrompt,
    ) -> Result<PromptId, DeliveryError> {
        let body = SendPromptRequest {
            to: to.clone(),
            prompt: prompt.clone(),
        };
        let sent: SendPromptResponse = self.post_json("/prompts", &body).await?;
        debug!(player_id = %to, prompt_id = %sent.prompt_id, "prompt sent");
        Ok(sent.prompt_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use uuid::Uuid;

    use super::*;

    #[derive(Clone, Default)]
    struct Gateway {
        messages: Arc<Mutex<Vec<SendMessageRequest>>>,
        edits: Arc<Mutex<Vec<EditMessageRequest>>>,
        prompts: Arc<Mutex<Vec<SendPromptRequest>>>,
    }

    async fn messages(
        State(gateway): State<Gateway>,
        Json(body): Json<SendMessageRequest>,
    ) -> Result<Json<SendMessageResponse>, StatusCode> {
        if body.to.as_str() == "blocked" {
            return Err(StatusCode::FORBIDDEN);
        }
        gateway.messages.lock().unwrap().push(body);
        Ok(Json(SendMessageResponse {
            message_id: MessageRef("m-1".to_owned()),
        }))
    }

    async fn edits(State(gateway): State<Gateway>, Json(body): Json<EditMessageRequest>) {
        gateway.edits.lock().unwrap().push(body);
    }

    async fn prompts(
        State(gateway): State<Gateway>,
        Json(body): Json<SendPromptRequest>,
    ) -> Json<SendPromptResponse> {
        gateway.prompts.lock().unwrap().push(body);
        Json(SendPromptResponse {
            prompt_id: PromptId("p-1".to_owned()),
        })
    }

    async fn serve(gateway: Gateway) -> String {
        let app = Router::new()
            .route("/messages", post(messages))
            .route("/messages/edit", post(edits))
            .route("/prompts", post(prompts))
            .with_state(gateway);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_send_message_posts_text_and_actions() {
        // Arrange
        let gateway = Gateway::default();
        let messenger = HttpMessenger::new(&serve(gateway.clone()).await);
        let duel_id = Uuid::new_v4();

        // Act
        let sent = messenger
            .send_message(
                &PlayerId::new("a"),
                "Your turn!",
                &[MessageAction::PlayTurn { duel_id }],
            )
            .await
            .unwrap();

        // Assert
        assert_eq!(sent, MessageRef("m-1".to_owned()));
        let recorded = gateway.messages.lock().unwrap();
        assert_eq!(recorded[0].text, "Your turn!");
        assert_eq!(recorded[0].actions, vec![MessageAction::PlayTurn { duel_id }]);
    }

    #[tokio::test]
    async fn test_prompt_returns_gateway_prompt_id() {
        // Arrange
        let gateway = Gateway::default();
        let messenger = HttpMessenger::new(&serve(gateway.clone()).await);
        let prompt = ChoicePrompt {
            text: "Pick one".to_owned(),
            options: vec!["A".to_owned(), "B".to_owned()],
            correct: Some(1),
            open_seconds: 15,
        };

        // Act
        let id = messenger
            .send_timed_choice_prompt(&PlayerId::new("a"), &prompt)
            .await
            .unwrap();

        // Assert
        assert_eq!(id, PromptId("p-1".to_owned()));
        assert_eq!(gateway.prompts.lock().unwrap()[0].prompt, prompt);
    }

    #[tokio::test]
    async fn test_edit_message_posts_reference() {
        let gateway = Gateway::default();
        let messenger = HttpMessenger::new(&serve(gateway.clone()).await);

        messenger
            .edit_message(&PlayerId::new("a"), &MessageRef("m-9".to_owned()), "done")
            .await
            .unwrap();

        let edits = gateway.edits.lock().unwrap();
        assert_eq!(edits[0].message_id, MessageRef("m-9".to_owned()));
        assert_eq!(edits[0].text, "done");
    }

    #[tokio::test]
    async fn test_rejected_delivery_is_an_error() {
        let messenger = HttpMessenger::new(&serve(Gateway::default()).await);

        let result = messenger
            .send_message(&PlayerId::new("blocked"), "hi", &[])
            .await;

        assert!(result.is_err());
    }
}
