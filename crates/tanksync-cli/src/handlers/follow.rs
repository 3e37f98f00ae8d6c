//! Follow command handler.
//!
//! Subscribes to one collection and prints each delivery until Ctrl-C. The
//! first delivery is printed as a summary; later ones as their changes.
//! News and knowledge deliveries also pass through a scrollback, so items
//! the store prunes while following stay listed. With `--announce`, new
//! items are also queued for speech on the console.

use std::sync::Arc;

use anyhow::Result;

use tanksync_core::{Collection, Delivery, Record, ScrollbackCache, SpeechPort, TypedFeed};
use tanksync_voice::{Announceable, Announcer, VoiceService};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::records::{
    knowledge_line, market_lines, news_line, remark_line, spoken_line, status_lines,
    watchlist_line,
};
use crate::speaker::ConsoleSpeaker;

/// Records kept on screen for a followed news or knowledge feed.
const SCROLLBACK_CAPACITY: usize = 200;

pub async fn execute(ctx: &CliContext, collection: &str, announce: bool) -> Result<()> {
    let collection: Collection = collection.parse().map_err(CliError::from)?;
    let facade = ctx.facade();

    let voice = announce.then(|| {
        let speaker: Arc<dyn SpeechPort> = Arc::new(ConsoleSpeaker::new());
        VoiceService::from_context(&ctx.sync, speaker).0
    });
    let announcer = voice.as_ref().map(VoiceService::announcer);
    if announce && !matches!(collection, Collection::News | Collection::Knowledge) {
        println!("Only news and knowledge items are announced; following without voice.");
    }

    println!("Following {collection} (Ctrl-C to stop)");
    match collection {
        Collection::News => announced(facade.watch_news().await, news_line, announcer).await,
        Collection::Knowledge => {
            announced(facade.watch_knowledge().await, knowledge_line, announcer).await;
        }
        Collection::Remarks => plain(facade.watch_remarks().await, remark_line).await,
        Collection::SpokenNews => plain(facade.watch_spoken_markers().await, spoken_line).await,
        Collection::Market => {
            plain(facade.watch_market().await, |m| market_lines(m).join("\n")).await;
        }
        Collection::Status => {
            plain(facade.watch_status().await, |s| status_lines(s).join("\n")).await;
        }
        Collection::Watchlist => plain(facade.watch_watchlist().await, watchlist_line).await,
    }

    if let Some(voice) = voice {
        voice.set_enabled(false).await;
    }
    Ok(())
}

async fn plain<T: Record>(mut feed: TypedFeed<T>, render: fn(&T) -> String) {
    loop {
        tokio::select! {
            delivery = feed.next() => match delivery {
                Some(delivery) => print_delivery(&delivery, render),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    feed.unsubscribe();
}

async fn announced<T: Announceable>(
    mut feed: TypedFeed<T>,
    render: fn(&T) -> String,
    announcer: Option<Announcer>,
) {
    let mut scrollback = ScrollbackCache::new(SCROLLBACK_CAPACITY);
    loop {
        tokio::select! {
            delivery = feed.next() => match delivery {
                Some(delivery) => {
                    print_with_scrollback(&delivery, &mut scrollback, render);
                    if let Some(announcer) = &announcer {
                        announcer.announce(&delivery).await;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    feed.unsubscribe();
    println!("{} record(s) in scrollback", scrollback.len());
}

/// Print a delivery, keeping records the store dropped in `scrollback`.
fn print_with_scrollback<T: Record>(
    delivery: &Delivery<T>,
    scrollback: &mut ScrollbackCache<T>,
    render: fn(&T) -> String,
) {
    scrollback.merge(&delivery.items);
    if delivery.is_initial_load {
        println!("{} record(s)", delivery.items.len());
        for item in scrollback.items().iter().take(5) {
            println!("  {}", render(item));
        }
        return;
    }

    let changes = &delivery.changes;
    for item in &changes.added {
        println!("+ {}", render(item));
    }
    for item in &changes.modified {
        println!("~ {}", render(item));
    }
    for item in &changes.removed {
        println!("- {} (kept in scrollback)", render(item));
    }
}

fn print_delivery<T>(delivery: &Delivery<T>, render: fn(&T) -> String) {
    if delivery.is_initial_load {
        println!("{} record(s)", delivery.items.len());
        for item in delivery.items.iter().rev().take(5) {
            println!("  {}", render(item));
        }
        return;
    }

    let changes = &delivery.changes;
    for item in &changes.added {
        println!("+ {}", render(item));
    }
    for item in &changes.modified {
        println!("~ {}", render(item));
    }
    for item in &changes.removed {
        println!("- {}", render(item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanksync_core::{ChangeSet, NewsItem};

    fn news(id: &str, at: i64) -> NewsItem {
        let mut item = NewsItem::new(format!("Headline {id}"), "Wire").published(at);
        item.id = id.to_string();
        item
    }

    #[test]
    fn pruned_news_stays_in_scrollback() {
        let mut scrollback = ScrollbackCache::new(SCROLLBACK_CAPACITY);
        let initial = Delivery {
            items: vec![news("a", 1), news("b", 2)],
            is_initial_load: true,
            changes: ChangeSet::empty(),
        };
        print_with_scrollback(&initial, &mut scrollback, news_line);

        let pruned = Delivery {
            items: vec![news("b", 2), news("c", 3)],
            is_initial_load: false,
            changes: ChangeSet {
                added: vec![news("c", 3)],
                modified: Vec::new(),
                removed: vec![news("a", 1)],
            },
        };
        print_with_scrollback(&pruned, &mut scrollback, news_line);

        let ids: Vec<String> = scrollback.items().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }
}
