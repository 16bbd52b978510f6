//! Store outages seen through the command dispatcher

use roll_call::command::CommandDispatcher;
use roll_call::lobby::LobbyManager;
use roll_call::metrics::MetricsCollector;
use std::sync::Arc;

use crate::fixtures::{shared_flaky_store, user_message};

const GROUP: i64 = -300;

#[tokio::test]
async fn test_outage_reports_generic_error_and_recovers() {
    let store = shared_flaky_store();
    let metrics_collector = Arc::new(MetricsCollector::new().unwrap());
    let manager = LobbyManager::with_metrics(store.clone(), metrics_collector.clone());
    let dispatcher = CommandDispatcher::with_metrics(manager.clone(), metrics_collector.clone());

    let reply = dispatcher
        .handle(&user_message(GROUP, 1, "alice", "/create"))
        .await
        .unwrap();
    assert_eq!(reply.text, "Lobby created");

    store.set_failing(true);
    let reply = dispatcher
        .handle(&user_message(GROUP, 1, "alice", "/in"))
        .await
        .unwrap();
    assert_eq!(reply.text, "Unexpected error when trying to join a lobby");

    let reply = dispatcher
        .handle(&user_message(GROUP, 1, "alice", "/end"))
        .await
        .unwrap();
    assert_eq!(reply.text, "Unexpected error when trying to end the lobby");

    // Failed writes leave the stored lobby untouched
    let lobby = manager.get_lobby(GROUP).await.unwrap().unwrap();
    assert_eq!(lobby.participant_count(), 0);

    store.set_failing(false);
    let reply = dispatcher
        .handle(&user_message(GROUP, 1, "alice", "/in"))
        .await
        .unwrap();
    assert_eq!(reply.text, "1. alice");

    let errors = &metrics_collector.command().command_errors_total;
    assert_eq!(errors.with_label_values(&["in", "store"]).get(), 1);
    assert_eq!(errors.with_label_values(&["end", "store"]).get(), 1);
}
