// Query Debouncing
//
// *L'Anti-Rebond* (The Debounce) - Single-slot, latest-wins query requests

use crate::startup::Engine;
use lerecherche::SearchResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A submitted query and the generation it was submitted at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    query: String,
}

impl QueryTicket {
    /// Query text as typed
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Submission generation; later submissions have larger values
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Latest-wins request slot sitting between keystrokes and the engine
///
/// Every [`submit`](QuerySlot::submit) supersedes all earlier tickets. A
/// ticket is only worth running if it is still current after the quiet
/// window, and its results are only worth showing if it is still current
/// when they come back. Superseded work is dropped, never queued.
#[derive(Debug)]
pub struct QuerySlot {
    generation: AtomicU64,
    quiet: Duration,
}

impl QuerySlot {
    /// Slot with the given quiet window
    pub fn new(quiet: Duration) -> Self {
        Self {
            generation: AtomicU64::new(0),
            quiet,
        }
    }

    /// Quiet window a ticket must survive before running
    pub fn quiet_window(&self) -> Duration {
        self.quiet
    }

    /// Submit a query, invalidating every earlier ticket
    pub fn submit(&self, query: impl Into<String>) -> QueryTicket {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        QueryTicket {
            generation,
            query: query.into(),
        }
    }

    /// Whether no newer query has been submitted since `ticket`
    pub fn is_current(&self, ticket: &QueryTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.generation
    }

    /// Wait out the quiet window; `None` if the ticket was superseded meanwhile
    pub async fn settle(&self, ticket: QueryTicket) -> Option<QueryTicket> {
        tokio::time::sleep(self.quiet).await;
        self.is_current(&ticket).then_some(ticket)
    }
}

/// Settle a ticket, run it, and keep the results only if still current
pub async fn settle_and_search(
    slot: &QuerySlot,
    engine: &Engine,
    ticket: QueryTicket,
) -> Option<(QueryTicket, Vec<SearchResult>)> {
    let ticket = slot.settle(ticket).await?;
    let results = engine.search(ticket.query());

    if !slot.is_current(&ticket) {
        tracing::trace!(generation = ticket.generation, "dropping superseded results");
        return None;
    }
    Some((ticket, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use lecatalogue::{CatalogItem, ResolvedItem};
    use std::sync::Arc;

    fn engine() -> Engine {
        let mut config = EngineConfig::default();
        config.cache.enabled = false;
        Engine::from_items(
            vec![
                ResolvedItem::available(CatalogItem::new("display", "Display")),
                ResolvedItem::available(CatalogItem::new("sound", "Sound")),
            ],
            &config,
        )
    }

    #[test]
    fn test_submit_supersedes() {
        let slot = QuerySlot::new(Duration::from_millis(50));
        let first = slot.submit("d");
        assert!(slot.is_current(&first));

        let second = slot.submit("di");
        assert!(!slot.is_current(&first));
        assert!(slot.is_current(&second));
        assert!(second.generation() > first.generation());
        assert_eq!(second.query(), "di");
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_waits_quiet_window() {
        let slot = QuerySlot::new(Duration::from_millis(50));
        let started = tokio::time::Instant::now();

        let ticket = slot.submit("display");
        let settled = slot.settle(ticket.clone()).await;

        assert_eq!(settled, Some(ticket));
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_burst_query_survives() {
        let slot = Arc::new(QuerySlot::new(Duration::from_millis(50)));
        let engine = Arc::new(engine());

        let mut handles = Vec::new();
        for query in ["s", "so", "sou", "soun"] {
            let ticket = slot.submit(query);
            let (slot, engine) = (slot.clone(), engine.clone());
            handles.push(tokio::spawn(async move {
                settle_and_search(&slot, &engine, ticket).await
            }));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let mut survivors = Vec::new();
        for handle in handles {
            if let Some((ticket, results)) = handle.await.expect("task") {
                survivors.push((ticket.query().to_string(), results));
            }
        }

        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].0, "soun");
        assert_eq!(survivors[0].1[0].item.id(), "sound");
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_after_quiet_window_runs() {
        let slot = QuerySlot::new(Duration::from_millis(50));
        let engine = engine();

        let first = slot.submit("disp");
        let first = settle_and_search(&slot, &engine, first).await;
        assert!(first.is_some());

        let second = slot.submit("sound");
        let second = settle_and_search(&slot, &engine, second).await;
        assert_eq!(second.expect("current").1[0].item.id(), "sound");
    }
}
