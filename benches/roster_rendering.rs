//! Performance benchmarks for roster rendering and joins

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use roll_call::command::TelegramMarkdownV2;
use roll_call::lobby::{
    format_roster, notification_text, InMemoryLobbyStore, Lobby, LobbyManager,
};
use roll_call::types::{Identity, ListType};
use std::sync::Arc;

fn create_bench_lobby(participants: usize) -> Lobby {
    let mut lobby = Lobby::new(1, Some("Friday Game".to_string()));
    for i in 0..participants {
        let list_type = ListType::ALL[i % 3];
        let description = (i % 4 == 0).then(|| format!("note {}", i));
        let identity = if i % 5 == 0 {
            Identity::named(format!("guest_{}", i))
        } else {
            Identity::user(i as i64, Some(format!("player_{}", i)), None)
        };
        lobby.place(list_type, identity, description);
    }
    lobby
}

fn bench_format_roster(c: &mut Criterion) {
    let small = create_bench_lobby(12);
    let large = create_bench_lobby(300);

    c.bench_function("format_roster_12_participants", |b| {
        b.iter(|| black_box(format_roster(black_box(&small))))
    });

    c.bench_function("format_roster_300_participants", |b| {
        b.iter(|| black_box(format_roster(black_box(&large))))
    });
}

fn bench_notification_text(c: &mut Criterion) {
    let lobby = create_bench_lobby(60);

    c.bench_function("notification_text_60_participants", |b| {
        b.iter(|| {
            black_box(notification_text(
                black_box(&lobby),
                "Kickoff at 8.30, be on time!",
                &TelegramMarkdownV2,
            ))
        })
    });
}

fn bench_join(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("join_existing_lobby", |b| {
        b.iter(|| {
            rt.block_on(async {
                let lobby_manager = LobbyManager::new(Arc::new(InMemoryLobbyStore::new()));
                let _ = lobby_manager.create_lobby(1, None).await;

                for i in 0..10 {
                    let identity = Identity::user(i, Some(format!("player_{}", i)), None);
                    let _ = lobby_manager
                        .join(1, ListType::ALL[i as usize % 3], identity, None)
                        .await;
                }

                black_box(lobby_manager.get_lobby(1).await)
            })
        })
    });
}

criterion_group!(
    benches,
    bench_format_roster,
    bench_notification_text,
    bench_join
);
criterion_main!(benches);
