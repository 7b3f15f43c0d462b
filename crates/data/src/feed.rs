//! Tick sources feeding the engine loop.
//!
//! `ChannelFeed` adapts a bounded mpsc channel so a producer task (market
//! data client, test harness) can push ticks to the single consumer.
//! `ReplayFeed` walks a recorded price file in timestamp order.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::info;

use survivor_core::traits::TickSource;
use survivor_core::types::Tick;

/// Receiving half of a tick channel. Senders decide the pace; the feed just
/// hands out whatever arrives, in arrival order.
pub struct ChannelFeed {
    rx: mpsc::Receiver<Tick>,
}

impl ChannelFeed {
    #[must_use]
    pub fn new(rx: mpsc::Receiver<Tick>) -> Self {
        Self { rx }
    }

    /// Creates a bounded channel and the feed reading from it.
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<Tick>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl TickSource for ChannelFeed {
    async fn next_tick(&mut self) -> Result<Option<Tick>> {
        // recv() returns None once every sender is dropped.
        Ok(self.rx.recv().await)
    }
}

/// Replays a recorded tick file. Rows are sorted by timestamp on load so an
/// unordered dump still replays in market order.
pub struct ReplayFeed {
    ticks: Vec<Tick>,
    cursor: usize,
}

impl ReplayFeed {
    /// Loads ticks from a CSV file with `timestamp,price` columns
    /// (RFC 3339 timestamps).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a row fails to parse.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open tick file: {}", path.display()))?;

        let mut ticks = Vec::new();
        for record in reader.records() {
            let record = record.context("Malformed tick row")?;
            let timestamp: DateTime<Utc> = record
                .get(0)
                .context("Missing timestamp column")?
                .parse()
                .context("Invalid timestamp")?;
            let price = Decimal::from_str(record.get(1).context("Missing price column")?)
                .context("Invalid price")?;
            ticks.push(Tick { price, timestamp });
        }
        ticks.sort_by_key(|t| t.timestamp);

        info!(path = %path.display(), count = ticks.len(), "Loaded tick replay");
        Ok(Self { ticks, cursor: 0 })
    }

    /// Builds an in-order feed from bare prices, with synthetic one-second
    /// timestamps. Test harness convenience.
    #[must_use]
    pub fn from_prices(prices: Vec<Decimal>) -> Self {
        let base = Utc::now();
        let ticks = prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| Tick {
                price,
                timestamp: base + Duration::seconds(i as i64),
            })
            .collect();
        Self { ticks, cursor: 0 }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

#[async_trait]
impl TickSource for ReplayFeed {
    async fn next_tick(&mut self) -> Result<Option<Tick>> {
        if self.cursor >= self.ticks.len() {
            return Ok(None);
        }
        let tick = self.ticks[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(tick))
    }
}
