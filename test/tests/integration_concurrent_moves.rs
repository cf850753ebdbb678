//! The optimistic-concurrency guarantee for moves: the conditional write is
//! the sole mutation path, so a duplicate tap from a flaky client (or a
//! second device on the same identity) can lose a race but never corrupt a
//! session. A lost race yields a conflict, the engine re-reads and retries
//! up to its bound, and the move count advances by exactly the number of
//! writes that actually landed.

use std::sync::Arc;

use siphon_server::{EngineConfig, SessionEngine, SessionStore};
use siphon_shared::{GameError, LevelId, LevelLayout, SessionStatus};

use siphon_test::helpers::{
    registered_user, seeded_store, tube, ConflictingSessions, DuplicateTapSessions,
};

/// One pour available from tube 1 into tube 0; the mixed third tube keeps
/// the level unfinished so completion effects stay out of the picture.
fn mid_game_level(id: u32) -> LevelLayout {
    LevelLayout::new(
        LevelId::new(id),
        vec![
            tube(&[3, 3, -1, -1]),
            tube(&[3, -1, -1, -1]),
            tube(&[5, 6, -1, -1]),
        ],
    )
}

#[tokio::test]
async fn a_duplicate_tap_lands_exactly_one_move() {
    let store = seeded_store(vec![mid_game_level(1)]);
    let user = registered_user(&store, "1").await;
    let sessions = Arc::new(DuplicateTapSessions::new(store.clone(), 1, 0));
    let engine = SessionEngine::new(
        store.clone(),
        sessions.clone(),
        store.clone(),
        EngineConfig::default(),
    );
    engine.start_level(user, LevelId::new(1)).await.unwrap();

    // The rival tap commits first with the same expected move count; this
    // call loses the race, re-reads, and finds its pour no longer legal.
    let result = engine.apply_move(user, LevelId::new(1), 1, 0).await;
    assert_eq!(result.unwrap_err(), GameError::IllegalMove);

    let session = sessions.get(user, LevelId::new(1)).await.unwrap().unwrap();
    assert_eq!(session.move_count, 1);
    assert_eq!(session.status, SessionStatus::InProgress);
    assert_eq!(session.tubes[0], tube(&[3, 3, 3, -1]));
    assert_eq!(session.tubes[1], tube(&[-1, -1, -1, -1]));
}

#[tokio::test]
async fn a_single_lost_race_is_retried_transparently() {
    let store = seeded_store(vec![mid_game_level(1)]);
    let user = registered_user(&store, "1").await;
    let sessions = Arc::new(ConflictingSessions::new(store.clone(), 1));
    let engine = SessionEngine::new(
        store.clone(),
        sessions.clone(),
        store.clone(),
        EngineConfig::default(),
    );
    engine.start_level(user, LevelId::new(1)).await.unwrap();

    let outcome = engine.apply_move(user, LevelId::new(1), 1, 0).await.unwrap();
    assert_eq!(outcome.session.move_count, 1);
    // First write conflicted, the retry landed.
    assert_eq!(sessions.cas_calls(), 2);
}

#[tokio::test]
async fn exhausted_retries_surface_busy_without_side_effects() {
    let store = seeded_store(vec![mid_game_level(1)]);
    let user = registered_user(&store, "1").await;
    let config = EngineConfig::default();
    let sessions = Arc::new(ConflictingSessions::new(
        store.clone(),
        config.cas_attempt_limit,
    ));
    let engine = SessionEngine::new(store.clone(), sessions.clone(), store.clone(), config);
    engine.start_level(user, LevelId::new(1)).await.unwrap();

    let result = engine.apply_move(user, LevelId::new(1), 1, 0).await;
    assert_eq!(result.unwrap_err(), GameError::Busy);

    let session = sessions.get(user, LevelId::new(1)).await.unwrap().unwrap();
    assert_eq!(session.move_count, 0);
    assert_eq!(session.tubes, mid_game_level(1).initial);
}
