//! Command handlers for the Players context.

use tracing::{info, instrument, warn};
use trivia_duel_core::error::{DomainError, Rejection};
use trivia_duel_core::messenger::Messenger;
use trivia_duel_core::player::Player;
use trivia_duel_core::repository::PlayerRepository;

use crate::domain::alias::validate_alias;
use crate::domain::commands::{RegisterPlayer, SetAlias};

/// Handles the `RegisterPlayer` command: creates the player on first
/// contact and refreshes the handle afterwards. Alias and score are never
/// touched.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty handle and
/// `DomainError::Infrastructure` if the store fails.
#[instrument(skip(repo, command), fields(player_id = %command.player_id, correlation_id = %command.correlation_id))]
pub async fn handle_register_player(
    command: &RegisterPlayer,
    repo: &dyn PlayerRepository,
) -> Result<Player, DomainError> {
    let handle = command.handle.trim();
    if handle.is_empty() {
        return Err(DomainError::Validation("handle must not be empty".to_owned()));
    }

    match repo.get(&command.player_id).await? {
        Some(player) if player.handle == handle => Ok(player),
        Some(mut player) => {
            player.handle = handle.to_owned();
            repo.save(&player).await?;
            Ok(player)
        }
        None => {
            let player = Player::new(command.player_id.clone(), handle);
            repo.save(&player).await?;
            info!("player registered");
            Ok(player)
        }
    }
}

/// Handles the `SetAlias` command.
///
/// # Errors
///
/// Returns `DomainError::PlayerNotFound` for an unregistered player and
/// `DomainError::Rejected` if the alias is malformed or held by someone
/// else (compared case-insensitively).
#[instrument(skip(repo, messenger, command), fields(player_id = %command.player_id, correlation_id = %command.correlation_id))]
pub async fn handle_set_alias(
    command: &SetAlias,
    repo: &dyn PlayerRepository,
    messenger: &dyn Messenger,
) -> Result<Player, DomainError> {
    let mut player = repo
        .get(&command.player_id)
        .await?
        .ok_or_else(|| DomainError::PlayerNotFound(command.player_id.clone()))?;

    let alias = command.alias.trim();
    validate_alias(alias)?;
    if let Some(holder) = repo.find_by_alias(alias).await? {
        if holder.id != player.id {
            return Err(Rejection::AliasTaken.into());
        }
    }

    player.alias = Some(alias.to_owned());
    repo.save(&player).await?;

    let text = format!("Success! Your alias is now <b>{alias}</b>");
    if let Err(e) = messenger.send_message(&player.id, &text, &[]).await {
        warn!(error = %e, "alias confirmation not delivered");
    }
    info!(alias, "alias set");
    Ok(player)
}
