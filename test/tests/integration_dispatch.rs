//! End-to-end dispatch through the server façade: handshake, channel
//! registration, rate limiting ahead of everything else, and the mapping
//! from engine outcomes to protocol responses.

use std::sync::Arc;
use std::time::Duration;

use siphon_server::{ChannelKey, MemoryStore, RateLimitConfig, Server, ServerConfig};
use siphon_shared::{GameError, LevelId, MoveStep, Request, Response, SessionStatus};

use siphon_test::helpers::{one_pour_level, seeded_store, sign_assertion, ScriptedSolver};

const SECRET: &[u8] = b"server-secret";

type TestServer = Server<MemoryStore, MemoryStore, MemoryStore, ScriptedSolver>;

fn server_with(config: ServerConfig, store: &Arc<MemoryStore>) -> TestServer {
    Server::new(
        config,
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(ScriptedSolver::solvable(vec![MoveStep { from: 1, to: 0 }])),
    )
}

fn server(store: &Arc<MemoryStore>) -> TestServer {
    server_with(ServerConfig::new(SECRET), store)
}

fn assertion() -> Vec<u8> {
    sign_assertion(SECRET, &[("id", "12345"), ("username", "casey")])
}

#[tokio::test]
async fn a_channel_plays_a_level_to_completion() {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = seeded_store(vec![one_pour_level(1).with_optimal_steps(1), one_pour_level(2)]);
    let server = server(&store);

    let (channel, _verified) = server.open_channel(&assertion()).await.unwrap();

    let response = server
        .handle(channel, Request::SessionStart { level_id: LevelId::new(1) })
        .await;
    let view = match response {
        Response::Session(view) => view,
        other => panic!("expected a session view, got {other:?}"),
    };
    assert_eq!(view.move_count, 0);
    assert_eq!(view.status, SessionStatus::InProgress);

    let response = server
        .handle(
            channel,
            Request::SessionMove {
                level_id: LevelId::new(1),
                from: 1,
                to: 0,
            },
        )
        .await;
    let (session, reward) = match response {
        Response::Move { session, reward } => (session, reward),
        other => panic!("expected a move result, got {other:?}"),
    };
    assert_eq!(session.status, SessionStatus::Completed);
    let reward = reward.expect("completing move carries the reward");
    assert_eq!(reward.coins_granted, 2);
    assert_eq!(reward.message, "Level completed!");

    // The profile reflects the credit on the same channel.
    let response = server.handle(channel, Request::UserGet).await;
    let profile = match response {
        Response::User(profile) => profile,
        other => panic!("expected a profile, got {other:?}"),
    };
    assert_eq!(profile.coin_balance, 2);

    // And the provisioned next level is the active one to resume.
    let response = server.handle(channel, Request::SessionGetActive).await;
    let active = match response {
        Response::Session(active) => active,
        other => panic!("expected the active session, got {other:?}"),
    };
    assert_eq!(active.level_id, LevelId::new(2));
}

#[tokio::test]
async fn unknown_channels_must_rehandshake() {
    let store = seeded_store(vec![one_pour_level(1)]);
    let server = server(&store);

    let response = server
        .handle(ChannelKey::from_u64(999), Request::SessionGetActive)
        .await;
    assert_eq!(response, Response::Error(GameError::TokenExpired));
}

#[tokio::test]
async fn over_budget_channels_are_rate_limited() {
    let store = seeded_store(vec![one_pour_level(1)]);
    let mut config = ServerConfig::new(SECRET);
    config.rate_limit = RateLimitConfig {
        max_events: 2,
        window: Duration::from_secs(3600),
    };
    let server = server_with(config, &store);
    let (channel, _) = server.open_channel(&assertion()).await.unwrap();

    for _ in 0..2 {
        let response = server.handle(channel, Request::UserGet).await;
        assert!(matches!(response, Response::User(_)));
    }
    let response = server
        .handle(channel, Request::SessionStart { level_id: LevelId::new(1) })
        .await;
    assert_eq!(response, Response::Error(GameError::RateLimited));

    // The rejected start mutated nothing.
    let response = server.handle(channel, Request::SessionGetActive).await;
    assert_eq!(response, Response::Error(GameError::RateLimited));
}

#[tokio::test]
async fn the_daily_gift_grants_then_cools_down() {
    let store = seeded_store(vec![]);
    let server = server(&store);
    let (channel, _) = server.open_channel(&assertion()).await.unwrap();

    let response = server.handle(channel, Request::UserDaily).await;
    let gift = match response {
        Response::DailyGift(gift) => gift,
        other => panic!("expected the gift, got {other:?}"),
    };
    assert_eq!(gift.coin_balance, 500);

    let response = server.handle(channel, Request::UserDaily).await;
    assert_eq!(response, Response::Error(GameError::OnCooldown));
}

#[tokio::test]
async fn levels_are_served_from_the_catalog() {
    let store = seeded_store(vec![one_pour_level(3).with_optimal_steps(7)]);
    let server = server(&store);
    let (channel, _) = server.open_channel(&assertion()).await.unwrap();

    let response = server
        .handle(channel, Request::LevelGet { level_id: LevelId::new(3) })
        .await;
    let level = match response {
        Response::Level(level) => level,
        other => panic!("expected a level view, got {other:?}"),
    };
    assert_eq!(level.optimal_steps, Some(7));
    assert_eq!(level.tubes, one_pour_level(3).initial);

    let response = server
        .handle(channel, Request::LevelGet { level_id: LevelId::new(4) })
        .await;
    assert_eq!(response, Response::Error(GameError::LevelNotFound));
}

#[tokio::test]
async fn tokens_reopen_channels_without_a_signature() {
    let store = seeded_store(vec![one_pour_level(1)]);
    let server = server(&store);
    let (first, verified) = server.open_channel(&assertion()).await.unwrap();
    server.close_channel(first);

    // Closed channels answer nothing.
    let response = server.handle(first, Request::UserGet).await;
    assert_eq!(response, Response::Error(GameError::TokenExpired));

    let (second, user_id) = server.open_channel_with_token(&verified.token).unwrap();
    assert_eq!(user_id, verified.user.id);
    let response = server.handle(second, Request::UserGet).await;
    assert!(matches!(response, Response::User(_)));
}

#[tokio::test]
async fn assistant_requests_flow_through_dispatch() {
    let store = seeded_store(vec![one_pour_level(1)]);
    let server = server(&store);
    let (channel, _) = server.open_channel(&assertion()).await.unwrap();

    server
        .handle(channel, Request::SessionStart { level_id: LevelId::new(1) })
        .await;
    let response = server.handle(channel, Request::UserDaily).await;
    assert!(matches!(response, Response::DailyGift(_)));

    let response = server
        .handle(
            channel,
            Request::AssistantHint {
                level_id: LevelId::new(1),
                tubes: one_pour_level(1).initial,
                moves_so_far: 0,
            },
        )
        .await;
    let hint = match response {
        Response::Hint(hint) => hint,
        other => panic!("expected a hint, got {other:?}"),
    };
    assert_eq!(hint.step, Some(MoveStep { from: 1, to: 0 }));
    assert_eq!(hint.coin_balance, 490);
}
