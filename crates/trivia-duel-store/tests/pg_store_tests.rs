//! Integration tests for `PgStore`.
//!
//! These need a live database (`DATABASE_URL`) and are ignored by default:
//! `cargo test -p trivia-duel-store -- --ignored`.

use chrono::TimeDelta;
use sqlx::PgPool;
use trivia_duel_core::duel::{DuelRecord, RoundContent, WarningLevel};
use trivia_duel_core::error::{DomainError, Rejection};
use trivia_duel_core::finished::{FinishedGame, GameOutcome};
use trivia_duel_core::player::{DuelResult, Player, PlayerId};
use trivia_duel_core::questions::TriviaQuestion;
use trivia_duel_core::repository::{DuelRepository, FinishedGameRepository, PlayerRepository};
use trivia_duel_store::pg_store::PgStore;
use trivia_duel_test_support::{participant, player, t0};
use uuid::Uuid;

fn question(n: u32) -> TriviaQuestion {
    TriviaQuestion {
        text: format!("Question {n}"),
        correct_answer: format!("right {n}"),
        incorrect_answers: [
            format!("wrong {n}.1"),
            format!("wrong {n}.2"),
            format!("wrong {n}.3"),
        ],
    }
}

fn open_request_at(id: &str, alias: &str, minutes: i64) -> DuelRecord {
    DuelRecord::open_request(
        Uuid::new_v4(),
        participant(id, alias),
        t0() + TimeDelta::minutes(minutes),
    )
}

// --- duels ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_get_returns_none_for_missing_duel(pool: PgPool) {
    let store = PgStore::new(pool);

    let loaded = DuelRepository::get(&store, Uuid::new_v4()).await.unwrap();

    assert!(loaded.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_save_and_load_started_duel(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    let mut duel = DuelRecord::started(
        Uuid::new_v4(),
        participant("a", "Astra"),
        participant("b", "Borealis"),
        t0(),
    );
    duel.cursor = 3;
    duel.pending_played = false;
    duel.set_category(1, 9);
    duel.set_category(2, 15);
    duel.open_round = Some(RoundContent {
        questions: [question(1), question(2), question(3)],
    });
    duel.first_correct.mark(1, 2);
    duel.second_correct.mark(2, 3);
    duel.warning_level = WarningLevel::First;

    // Act
    DuelRepository::save(&store, &duel).await.unwrap();
    let loaded = DuelRepository::get(&store, duel.id).await.unwrap();

    // Assert
    assert_eq!(loaded, Some(duel));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_save_overwrites_existing_duel(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    let mut duel = DuelRecord::started(
        Uuid::new_v4(),
        participant("a", "Astra"),
        participant("b", "Borealis"),
        t0(),
    );
    DuelRepository::save(&store, &duel).await.unwrap();

    // Act
    duel.advance(t0() + TimeDelta::hours(1));
    DuelRepository::save(&store, &duel).await.unwrap();

    // Assert
    let loaded = DuelRepository::get(&store, duel.id).await.unwrap().unwrap();
    assert_eq!(loaded.cursor, 2);
    assert!(!loaded.pending_played);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_delete_is_idempotent(pool: PgPool) {
    let store = PgStore::new(pool);
    let duel = open_request_at("a", "Astra", 0);
    DuelRepository::save(&store, &duel).await.unwrap();

    store.delete(duel.id).await.unwrap();
    store.delete(duel.id).await.unwrap();

    assert!(DuelRepository::get(&store, duel.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_involving_and_between_include_invitations(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    let invitation = DuelRecord::invitation(
        Uuid::new_v4(),
        participant("a", "Astra"),
        participant("b", "Borealis"),
        t0(),
    );
    let unrelated = open_request_at("c", "Cygnus", 1);
    DuelRepository::save(&store, &invitation).await.unwrap();
    DuelRepository::save(&store, &unrelated).await.unwrap();

    // Act
    let involving_b = store.involving(&PlayerId::new("b")).await.unwrap();
    let between = store
        .between(&PlayerId::new("b"), &PlayerId::new("a"))
        .await
        .unwrap();

    // Assert
    assert_eq!(involving_b.len(), 1);
    assert_eq!(between.map(|d| d.id), Some(invitation.id));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_claim_takes_oldest_eligible_request(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    let own = open_request_at("c", "Cygnus", 0);
    let current_opponent = open_request_at("b", "Borealis", 1);
    let oldest_other = open_request_at("d", "Draco", 2);
    let newer = open_request_at("e", "Eridanus", 3);
    let running = DuelRecord::started(
        Uuid::new_v4(),
        participant("b", "Borealis"),
        participant("c", "Cygnus"),
        t0(),
    );
    for duel in [&own, &current_opponent, &oldest_other, &newer, &running] {
        DuelRepository::save(&store, duel).await.unwrap();
    }
    let now = t0() + TimeDelta::hours(1);

    // Act
    let claimed = store
        .claim_open_request(&participant("c", "Cygnus"), now)
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert_eq!(claimed.id, oldest_other.id);
    assert_eq!(claimed.cursor, 1);
    assert_eq!(claimed.second.map(|p| p.alias), Some("Cygnus".to_owned()));
    assert_eq!(claimed.started_at, Some(now));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_concurrent_claims_never_share_a_request(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    let only = open_request_at("a", "Astra", 0);
    DuelRepository::save(&store, &only).await.unwrap();

    // Act
    let borealis = participant("b", "Borealis");
    let cygnus = participant("c", "Cygnus");
    let (x, y) = tokio::join!(
        store.claim_open_request(&borealis, t0()),
        store.claim_open_request(&cygnus, t0()),
    );

    // Assert
    let winners = [x.unwrap(), y.unwrap()]
        .into_iter()
        .flatten()
        .count();
    assert_eq!(winners, 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_open_request_delete_leaves_claimed_duel_alone(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    let claimed = open_request_at("a", "Astra", 0);
    let lapsed = open_request_at("c", "Cygnus", 1);
    DuelRepository::save(&store, &claimed).await.unwrap();
    DuelRepository::save(&store, &lapsed).await.unwrap();
    store
        .claim_open_request(&participant("b", "Borealis"), t0())
        .await
        .unwrap();

    // Act
    let claimed_deleted = store.delete_open_request(claimed.id).await.unwrap();
    let lapsed_deleted = store.delete_open_request(lapsed.id).await.unwrap();

    // Assert
    assert!(!claimed_deleted);
    assert!(lapsed_deleted);
    let kept = DuelRepository::get(&store, claimed.id).await.unwrap().unwrap();
    assert_eq!(kept.cursor, 1);
    assert!(DuelRepository::get(&store, lapsed.id).await.unwrap().is_none());
}

// --- players ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_player_round_trip_and_alias_lookup(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    let mut astra = player("a", "Astra");
    astra.score = 12;
    astra.flawless_duels = 2;

    // Act
    PlayerRepository::save(&store, &astra).await.unwrap();
    let by_id = PlayerRepository::get(&store, &PlayerId::new("a")).await.unwrap();
    let by_alias = store.find_by_alias("ASTRA").await.unwrap();

    // Assert
    assert_eq!(by_id, Some(astra.clone()));
    assert_eq!(by_alias, Some(astra));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_alias_is_unique_case_insensitively(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    PlayerRepository::save(&store, &player("a", "Astra")).await.unwrap();
    let mut other = Player::new(PlayerId::new("b"), "borealis");
    other.alias = Some("astra".to_owned());

    // Act
    let result = PlayerRepository::save(&store, &other).await;

    // Assert
    assert!(matches!(
        result,
        Err(DomainError::Rejected(Rejection::AliasTaken))
    ));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_players_without_alias_do_not_collide(pool: PgPool) {
    let store = PgStore::new(pool);

    PlayerRepository::save(&store, &Player::new(PlayerId::new("a"), "ann"))
        .await
        .unwrap();
    PlayerRepository::save(&store, &Player::new(PlayerId::new("b"), "ben"))
        .await
        .unwrap();

    assert!(store.find_by_alias("ann").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_save_of_existing_player_keeps_settled_score(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    let astra = player("a", "Astra");
    PlayerRepository::save(&store, &astra).await.unwrap();
    let mut renamed = astra.clone();
    renamed.handle = "astra_renamed".to_owned();

    // Act
    let applied = store
        .apply_result(&PlayerId::new("a"), DuelResult::Win, true)
        .await
        .unwrap();
    PlayerRepository::save(&store, &renamed).await.unwrap();

    // Assert
    assert!(applied);
    let stored = PlayerRepository::get(&store, &PlayerId::new("a"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.handle, "astra_renamed");
    assert_eq!(stored.score, 3);
    assert_eq!(stored.flawless_duels, 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_concurrent_results_all_count_and_loss_floors_at_zero(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    PlayerRepository::save(&store, &player("a", "Astra")).await.unwrap();
    let id = PlayerId::new("a");

    // Act
    let (loss, win, draw) = tokio::join!(
        store.apply_result(&id, DuelResult::Loss, false),
        store.apply_result(&id, DuelResult::Win, false),
        store.apply_result(&id, DuelResult::Draw, false),
    );
    let missing = store
        .apply_result(&PlayerId::new("ghost"), DuelResult::Win, false)
        .await
        .unwrap();

    // Assert
    assert!(loss.unwrap() && win.unwrap() && draw.unwrap());
    assert!(!missing);
    let score = PlayerRepository::get(&store, &id).await.unwrap().unwrap().score;
    assert!(score == 3 || score == 4);
}

// --- finished games ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a database"]
async fn test_finished_game_round_trip(pool: PgPool) {
    // Arrange
    let store = PgStore::new(pool);
    let mut duel = DuelRecord::started(
        Uuid::new_v4(),
        participant("a", "Astra"),
        participant("b", "Borealis"),
        t0(),
    );
    duel.cursor = 4;
    duel.set_category(1, 9);
    let game = FinishedGame::forfeited(&duel, t0() + TimeDelta::hours(49)).unwrap();

    // Act
    store.insert(&game).await.unwrap();
    let loaded = FinishedGameRepository::get(&store, game.id).await.unwrap();

    // Assert
    assert_eq!(loaded.as_ref(), Some(&game));
    assert_eq!(
        loaded.map(|g| g.outcome),
        Some(GameOutcome::Forfeited {
            winner: PlayerId::new("b")
        })
    );
}
