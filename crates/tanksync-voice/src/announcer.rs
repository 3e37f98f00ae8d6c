//! Announcer — feeds deliveries from a typed feed into the speech queue.
//!
//! The first delivery of a subscription is the bulk historical load: its
//! newest items are offered as initial-load announcements and the queue
//! accepts only a few. Later deliveries offer each added item.

use tokio::task::JoinHandle;

use tanksync_core::{Delivery, KnowledgeItem, NewsItem, Record, TypedFeed};

use crate::queue::{EnqueueOutcome, RejectReason, SpeechQueue};
use crate::text_utils::prepare_announcement;

/// A record that can be read out.
pub trait Announceable: Record {
    fn announcement(&self) -> String;
}

impl Announceable for NewsItem {
    fn announcement(&self) -> String {
        prepare_announcement(&self.title, &self.content)
    }
}

impl Announceable for KnowledgeItem {
    fn announcement(&self) -> String {
        prepare_announcement(&self.title, &self.content)
    }
}

#[derive(Debug, Clone)]
pub struct Announcer {
    queue: SpeechQueue,
}

impl Announcer {
    pub const fn new(queue: SpeechQueue) -> Self {
        Self { queue }
    }

    /// Offer a delivery's items to the queue. Returns how many were accepted.
    pub async fn announce<T: Announceable>(&self, delivery: &Delivery<T>) -> usize {
        if delivery.is_initial_load {
            let mut newest_first: Vec<&T> = delivery.items.iter().collect();
            newest_first.sort_by_key(|item| std::cmp::Reverse(item.timestamp()));
            return self.offer(newest_first, true).await;
        }

        self.offer(delivery.changes.added.iter(), false).await
    }

    async fn offer<'a, T, I>(&self, items: I, is_initial_load: bool) -> usize
    where
        T: Announceable,
        I: IntoIterator<Item = &'a T>,
    {
        let mut accepted = 0;
        for item in items {
            match self
                .queue
                .enqueue(item.announcement(), item.id(), is_initial_load)
                .await
            {
                EnqueueOutcome::Accepted => accepted += 1,
                EnqueueOutcome::Rejected(
                    RejectReason::InitialLoadLimit | RejectReason::Disabled,
                ) => break,
                EnqueueOutcome::Rejected(_) => {}
            }
        }
        accepted
    }

    /// Announce every delivery of `feed` until it ends.
    pub fn spawn<T: Announceable>(self, mut feed: TypedFeed<T>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let collection = feed.collection();
            tracing::info!(%collection, "Announcer started");
            while let Some(delivery) = feed.next().await {
                let accepted = self.announce(&delivery).await;
                if accepted > 0 {
                    tracing::debug!(%collection, accepted, "Queued announcements");
                }
            }
            tracing::info!(%collection, "Announcer stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use tanksync_core::{
        ChangeSet, Collection, Document, NoopEmitter, SnapshotHub, SpeechPort, SpeechPortError,
        SpokenLedgerPort, Subscription,
    };

    use crate::queue::SpeechQueueConfig;

    #[derive(Default)]
    struct Ledger(Mutex<HashSet<String>>);

    #[async_trait]
    impl SpokenLedgerPort for Ledger {
        async fn was_spoken(&self, id: &str) -> bool {
            self.0.lock().await.contains(id)
        }

        async fn mark_spoken(&self, id: &str) {
            self.0.lock().await.insert(id.to_string());
        }
    }

    #[derive(Default)]
    struct Speaker(Mutex<Vec<String>>);

    #[async_trait]
    impl SpeechPort for Speaker {
        async fn speak(&self, text: &str) -> Result<(), SpeechPortError> {
            self.0.lock().await.push(text.to_string());
            Ok(())
        }

        async fn cancel_all(&self) {}
    }

    fn news(id: &str, at: i64) -> NewsItem {
        let mut item = NewsItem::new(format!("Headline {id}"), "Wire").published(at);
        item.id = id.to_string();
        item
    }

    fn announcer() -> (Announcer, SpeechQueue, Arc<Speaker>) {
        let speaker = Arc::new(Speaker::default());
        let (queue, _) = SpeechQueue::new(
            SpeechQueueConfig::default(),
            Arc::new(Ledger::default()),
            Arc::clone(&speaker) as Arc<dyn SpeechPort>,
        );
        (Announcer::new(queue.clone()), queue, speaker)
    }

    #[tokio::test(start_paused = true)]
    async fn initial_load_announces_the_newest_three() {
        let (announcer, queue, speaker) = announcer();
        let delivery = Delivery {
            items: (1..=6).map(|i| news(&format!("n{i}"), i)).collect(),
            is_initial_load: true,
            changes: ChangeSet::empty(),
        };

        assert_eq!(announcer.announce(&delivery).await, 3);
        queue.wait_idle().await;

        assert_eq!(
            *speaker.0.lock().await,
            vec!["Headline n6.", "Headline n5.", "Headline n4."]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn steady_delivery_announces_added_items_only() {
        let (announcer, queue, speaker) = announcer();
        let delivery = Delivery {
            items: vec![news("old", 1), news("new", 2)],
            is_initial_load: false,
            changes: ChangeSet {
                added: vec![news("new", 2)],
                modified: vec![news("old", 1)],
                removed: Vec::new(),
            },
        };

        assert_eq!(announcer.announce(&delivery).await, 1);
        queue.wait_idle().await;
        assert_eq!(*speaker.0.lock().await, vec!["Headline new."]);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_announcer_follows_a_feed() {
        let (announcer, queue, speaker) = announcer();
        let docs = |items: &[NewsItem]| -> Vec<Document> {
            items.iter().map(|n| Document::from_record(n).unwrap()).collect()
        };

        let mut items: Vec<NewsItem> = (1..=6).map(|i| news(&format!("n{i}"), i)).collect();
        let hub = SnapshotHub::new();
        let subscription =
            Subscription::live(Collection::News, docs(&items), hub.subscribe(Collection::News));
        let feed = TypedFeed::<NewsItem>::new(subscription, Arc::new(NoopEmitter));

        items.push(news("n7", 7));
        hub.publish(Collection::News, docs(&items));
        drop(hub);

        announcer.spawn(feed).await.unwrap();
        queue.wait_idle().await;

        assert_eq!(
            *speaker.0.lock().await,
            vec!["Headline n6.", "Headline n5.", "Headline n4.", "Headline n7."]
        );
    }
}
