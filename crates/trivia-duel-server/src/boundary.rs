//! Error boundary for inbound requests.
//!
//! Nothing a single request does may take the process down. Rule
//! violations are told to the player who caused them; anything unexpected
//! is logged and forwarded to the operator chat, and the request is
//! dropped.

use std::future::Future;

use tracing::{Instrument, error, info, warn};
use trivia_duel_core::error::DomainError;
use trivia_duel_core::player::PlayerId;
use trivia_duel_turns::application::services::notify;

use crate::state::AppState;

/// Told to a player whose duel no longer exists.
pub const GAME_EXPIRED: &str = "This game has already expired!";

/// Told to a player whose turn could not fetch its questions.
pub const CONTENT_UNAVAILABLE: &str =
    "Sorry, I couldn't load the trivia questions right now. Please press Play again in a little while!";

/// Reports a failed request to whoever should hear about it.
pub async fn report(state: &AppState, player: &PlayerId, err: &DomainError) {
    let messenger = state.services.messenger.as_ref();
    match err {
        DomainError::Rejected(rejection) => {
            info!(player_id = %player, %rejection, "request rejected");
            notify(messenger, player, &rejection.to_string(), &[]).await;
        }
        DomainError::DuelNotFound(duel_id) => {
            info!(player_id = %player, %duel_id, "duel no longer exists");
            notify(messenger, player, GAME_EXPIRED, &[]).await;
        }
        DomainError::PlayerNotFound(_) | DomainError::Validation(_) => {
            warn!(player_id = %player, error = %err, "request dropped");
        }
        DomainError::ContentUnavailable(_) => {
            error!(player_id = %player, error = %err, "question provider failed");
            notify(messenger, player, CONTENT_UNAVAILABLE, &[]).await;
            alert_operator(state, player, err).await;
        }
        DomainError::DeliveryFailed(_) | DomainError::Infrastructure(_) => {
            error!(player_id = %player, error = %err, "request failed");
            alert_operator(state, player, err).await;
        }
    }
}

async fn alert_operator(state: &AppState, player: &PlayerId, err: &DomainError) {
    if let Some(operator) = &state.operator_chat {
        let text = format!("Unexpected error while serving {player}: {err}");
        notify(state.services.messenger.as_ref(), operator, &text, &[]).await;
    }
}

/// Runs `work` in the background and routes its failure through
/// [`report`].
pub fn spawn_reported<F, T>(state: AppState, player: PlayerId, work: F)
where
    F: Future<Output = Result<T, DomainError>> + Send + 'static,
    T: Send + 'static,
{
    let span = tracing::Span::current();
    tokio::spawn(
        async move {
            if let Err(e) = work.await {
                report(&state, &player, &e).await;
            }
        }
        .instrument(span),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use trivia_duel_core::error::Rejection;
    use trivia_duel_test_support::RecordingMessenger;
    use uuid::Uuid;

    use super::*;
    use crate::test_state;

    #[tokio::test]
    async fn test_rejection_is_told_to_the_player() {
        // Arrange
        let messenger = Arc::new(RecordingMessenger::new());
        let state = test_state(messenger.clone(), Some(PlayerId::new("ops")));
        let player = PlayerId::new("a");

        // Act
        report(&state, &player, &Rejection::NotYourTurn.into()).await;

        // Assert
        assert_eq!(
            messenger.messages_to(&player),
            vec![Rejection::NotYourTurn.to_string()]
        );
        assert!(messenger.messages_to(&PlayerId::new("ops")).is_empty());
    }

    #[tokio::test]
    async fn test_missing_duel_reads_as_expired() {
        let messenger = Arc::new(RecordingMessenger::new());
        let state = test_state(messenger.clone(), None);
        let player = PlayerId::new("a");

        report(&state, &player, &DomainError::DuelNotFound(Uuid::new_v4())).await;

        assert_eq!(messenger.messages_to(&player), vec![GAME_EXPIRED]);
    }

    #[tokio::test]
    async fn test_unexpected_error_goes_to_operator_only() {
        // Arrange
        let messenger = Arc::new(RecordingMessenger::new());
        let state = test_state(messenger.clone(), Some(PlayerId::new("ops")));
        let player = PlayerId::new("a");

        // Act
        report(&state, &player, &DomainError::Infrastructure("db down".into())).await;

        // Assert
        assert!(messenger.messages_to(&player).is_empty());
        let alerts = messenger.messages_to(&PlayerId::new("ops"));
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("db down"));
    }

    #[tokio::test]
    async fn test_content_failure_tells_player_and_operator() {
        let messenger = Arc::new(RecordingMessenger::new());
        let state = test_state(messenger.clone(), Some(PlayerId::new("ops")));
        let player = PlayerId::new("a");

        report(&state, &player, &DomainError::ContentUnavailable("no results".into())).await;

        assert_eq!(messenger.messages_to(&player), vec![CONTENT_UNAVAILABLE]);
        assert_eq!(messenger.messages_to(&PlayerId::new("ops")).len(), 1);
    }
}
