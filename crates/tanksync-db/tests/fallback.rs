//! A client whose shared store cannot be reached keeps working locally.

mod common;

use tanksync_core::{Collection, NewsItem, StoreBackend, WatchlistRecord, wall_clock_ms};
use tanksync_db::{SqliteLocalStore, setup_local_store};

use common::stranded_client;

#[tokio::test]
async fn unreachable_remote_selects_local_store() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = stranded_client(dir.path()).await;

    assert_eq!(ctx.selected_backend(), Some(StoreBackend::Local));

    ctx.facade().add_remark("offline remark", "cli").await.unwrap();
    let remarks = ctx.facade().load_remarks().await.unwrap();
    assert_eq!(remarks.len(), 1);
    assert_eq!(remarks[0].text, "offline remark");
}

#[tokio::test]
async fn local_records_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let ctx = stranded_client(dir.path()).await;
        ctx.facade().add_to_watchlist("sol").await.unwrap();
        ctx.facade().add_to_watchlist("btc").await.unwrap();
    }

    let ctx = stranded_client(dir.path()).await;
    let watchlist: WatchlistRecord = ctx.facade().load_watchlist().await.unwrap();
    assert_eq!(watchlist.symbols, vec!["btc", "sol"]);
}

#[tokio::test]
async fn news_is_deduplicated_on_title_and_source() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = stranded_client(dir.path()).await;
    let now = wall_clock_ms();

    let first = ctx
        .facade()
        .save_news(vec![
            NewsItem::new("BTC breaks out", "Wire").published(now),
            NewsItem::new("ETH upgrade", "Wire").published(now),
        ])
        .await
        .unwrap();
    let second = ctx
        .facade()
        .save_news(vec![
            NewsItem::new(" BTC breaks out ", "Wire").published(now),
            NewsItem::new("BTC breaks out", "Other desk").published(now),
        ])
        .await
        .unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, 1);
    assert_eq!(ctx.facade().load_news().await.unwrap().len(), 3);
}

#[tokio::test]
async fn status_scalars_are_written_to_their_own_keys() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = stranded_client(dir.path()).await;

    let status = tanksync_core::StatusRecord {
        temp: -31.0,
        snow_state: "blizzard".to_string(),
        ..Default::default()
    };
    ctx.facade().save_status(status).await.unwrap();

    // Re-open the same file to read the raw keys
    let local: SqliteLocalStore =
        setup_local_store(&dir.path().join("local.db"), ctx.settings()).await.unwrap();
    assert_eq!(
        local.read_key("arcticTemp").await.unwrap(),
        Some(serde_json::json!(-31.0))
    );
    assert_eq!(
        local.read_key("arcticSnow").await.unwrap(),
        Some(serde_json::json!("blizzard"))
    );
    assert!(local.read_key(Collection::Status.local_key()).await.unwrap().is_some());
}
