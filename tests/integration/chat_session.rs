//! Chat sessions replayed through the application state
//!
//! Each test feeds a scripted conversation into `AppState::run` and checks the
//! replies each chat received.

use roll_call::config::AppConfig;
use roll_call::service::AppState;
use roll_call::transport::{IncomingMessage, ParseMode};
use roll_call::types::Identity;

use crate::fixtures::{user_message, ScriptedTransport};

const GROUP: i64 = -100;
const OTHER_GROUP: i64 = -200;

async fn started_app() -> AppState {
    let mut config = AppConfig::default();
    config.service.enable_health_server = false;

    let mut app_state = AppState::new(config).await.unwrap();
    app_state.start().await.unwrap();
    app_state
}

#[tokio::test]
async fn test_full_evening_session() {
    let app_state = started_app().await;
    let transport = ScriptedTransport::new(vec![
        user_message(GROUP, 1, "alice", "/create Friday Game"),
        user_message(GROUP, 2, "bob", "/in@rollcall_bot bringing snacks"),
        user_message(GROUP, 3, "carol", "/maybe"),
        user_message(GROUP, 1, "alice", "/set_in_for Uncle Joe"),
        user_message(GROUP, 3, "carol", "/in"),
        user_message(GROUP, 1, "alice", "/notify starting now"),
        user_message(GROUP, 1, "alice", "/end"),
        user_message(GROUP, 1, "alice", "/current"),
    ]);

    app_state.run(&transport).await.unwrap();

    let texts = transport.texts_for(GROUP);
    assert_eq!(
        texts,
        vec![
            "Lobby created".to_string(),
            "Friday Game\n1. bob (bringing snacks)".to_string(),
            "Friday Game\n1. bob (bringing snacks)\n\nMaybe:\n1. carol".to_string(),
            "Friday Game\n1. bob (bringing snacks)\n2. Uncle Joe\n\nMaybe:\n1. carol".to_string(),
            "Friday Game\n1. bob (bringing snacks)\n2. Uncle Joe\n3. carol".to_string(),
            "starting now [bob](tg://user?id=2) [carol](tg://user?id=3)".to_string(),
            "Lobby finished".to_string(),
            "There's no lobby created".to_string(),
        ]
    );

    let notify = &transport.sent()[5].1;
    assert_eq!(notify.parse_mode, ParseMode::MarkdownV2);
}

#[tokio::test]
async fn test_chats_do_not_share_lobbies() {
    let app_state = started_app().await;
    let transport = ScriptedTransport::new(vec![
        user_message(GROUP, 1, "alice", "/create"),
        user_message(OTHER_GROUP, 1, "alice", "/in"),
        user_message(OTHER_GROUP, 1, "alice", "/create"),
        user_message(GROUP, 1, "alice", "/create"),
    ]);

    app_state.run(&transport).await.unwrap();

    assert_eq!(
        transport.texts_for(GROUP),
        vec![
            "Lobby created".to_string(),
            "A lobby is already created. Finish it before creating a new one".to_string(),
        ]
    );
    assert_eq!(
        transport.texts_for(OTHER_GROUP),
        vec![
            "There's no lobby created".to_string(),
            "Lobby created".to_string(),
        ]
    );
    assert_eq!(app_state.lobby_manager().active_lobbies().await.unwrap(), 2);
}

#[tokio::test]
async fn test_chatter_gets_no_reply() {
    let app_state = started_app().await;
    let transport = ScriptedTransport::new(vec![
        user_message(GROUP, 1, "alice", "who's coming tonight?"),
        user_message(GROUP, 1, "alice", "/weather"),
        IncomingMessage {
            chat_id: GROUP,
            sender: Identity::named("Guest"),
            text: "/create".to_string(),
        },
    ]);

    app_state.run(&transport).await.unwrap();

    assert_eq!(transport.texts_for(GROUP), vec!["Lobby created".to_string()]);
}

#[tokio::test]
async fn test_unreachable_chat_does_not_stop_others() {
    let app_state = started_app().await;
    let transport = ScriptedTransport::new(vec![
        user_message(OTHER_GROUP, 1, "alice", "/create"),
        user_message(GROUP, 1, "alice", "/create"),
        user_message(GROUP, 2, "bob", "/in"),
    ])
    .failing_sends_to(OTHER_GROUP);

    app_state.run(&transport).await.unwrap();

    assert!(transport.texts_for(OTHER_GROUP).is_empty());
    assert_eq!(
        transport.texts_for(GROUP),
        vec!["Lobby created".to_string(), "1. bob".to_string()]
    );
    // The unreachable chat's command still took effect
    assert!(app_state
        .lobby_manager()
        .get_lobby(OTHER_GROUP)
        .await
        .unwrap()
        .is_some());
}
