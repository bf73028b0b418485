//! Feed processing loop
//!
//! Parses each line, prices it and hands the emissions to the publisher.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{error, info, warn};

use super::{FeedLine, FeedReader};
use crate::error::Result;
use crate::parser::Event;
use crate::pricer::Pricer;
use crate::publisher::Publisher;

/// Counters for one run over a feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub lines_read: u64,
    pub events_applied: u64,
    pub malformed_skipped: u64,
    pub emissions: u64,
}

/// Drives events from a feed through the pricer
pub struct FeedRunner<W: AsyncWrite + Unpin> {
    pricer: Pricer,
    publisher: Publisher<W>,
    strict: bool,
    stats: RunStats,
}

impl<W: AsyncWrite + Unpin> FeedRunner<W> {
    /// Create a new runner
    ///
    /// With `strict`, a malformed line aborts the run instead of being skipped.
    pub fn new(pricer: Pricer, publisher: Publisher<W>, strict: bool) -> Self {
        Self {
            pricer,
            publisher,
            strict,
            stats: RunStats::default(),
        }
    }

    /// Process the feed until it ends or a fatal error occurs
    ///
    /// Output produced before a fatal error is still flushed.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, reader: &mut FeedReader<R>) -> Result<RunStats> {
        info!(
            source = reader.source(),
            target_size = self.pricer.target_size(),
            strict = self.strict,
            "Starting pricer"
        );

        let outcome = self.process_feed(reader).await;
        self.publisher.flush().await?;
        outcome?;

        let metrics = self.pricer.metrics();
        info!(
            stats = ?self.stats,
            best_bid = ?metrics.best_bid,
            best_ask = ?metrics.best_ask,
            spread = ?metrics.spread(),
            bid_depth = metrics.bid_depth,
            ask_depth = metrics.ask_depth,
            "Feed processed"
        );
        Ok(self.stats)
    }

    async fn process_feed<R: AsyncBufRead + Unpin>(&mut self, reader: &mut FeedReader<R>) -> Result<()> {
        while let Some(line) = reader.recv().await? {
            self.stats.lines_read += 1;
            if line.text.trim().is_empty() {
                continue;
            }
            self.process_line(&line).await?;
        }
        Ok(())
    }

    async fn process_line(&mut self, line: &FeedLine) -> Result<()> {
        let event = match line.text.parse::<Event>() {
            Ok(event) => event,
            Err(e) if self.strict => {
                error!(line = line.number, error = %e, "Malformed feed line");
                return Err(e);
            }
            Err(e) => {
                warn!(line = line.number, error = %e, "Skipping malformed feed line");
                self.stats.malformed_skipped += 1;
                return Ok(());
            }
        };

        let emissions = self.pricer.process(&event).map_err(|e| {
            let reason = if e.is_protocol_violation() {
                "Feed violates order protocol, halting"
            } else {
                "Pricing failed, halting"
            };
            error!(
                line = line.number,
                timestamp = event.timestamp,
                order_id = %event.order_id,
                error = %e,
                "{}",
                reason
            );
            e
        })?;
        self.stats.events_applied += 1;

        for emission in &emissions {
            self.publisher.publish(emission).await?;
            self.stats.emissions += 1;
        }
        Ok(())
    }

    pub fn pricer(&self) -> &Pricer {
        &self.pricer
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Flush and hand back the output writer
    pub async fn into_writer(self) -> Result<W> {
        self.publisher.into_inner().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricerError;
    use crate::publisher::OutputFormat;

    fn runner(target_size: u64, strict: bool) -> FeedRunner<Vec<u8>> {
        FeedRunner::new(
            Pricer::new(target_size).unwrap(),
            Publisher::new(Vec::new(), OutputFormat::Text),
            strict,
        )
    }

    #[tokio::test]
    async fn test_run_emits_changes() {
        let feed = "1 A a S 10.00 100\n2 A b S 9.00 50\n\n3 R b 50\n";
        let mut reader = FeedReader::new(feed.as_bytes(), "memory");
        let mut runner = runner(120, false);

        let stats = runner.run(&mut reader).await.unwrap();
        assert_eq!(
            stats,
            RunStats { lines_read: 4, events_applied: 3, malformed_skipped: 0, emissions: 2 }
        );

        let out = String::from_utf8(runner.into_writer().await.unwrap()).unwrap();
        assert_eq!(out, "2 B 1150.00\n3 B NA\n");
    }

    #[tokio::test]
    async fn test_malformed_lines_skipped_by_default() {
        let feed = "1 A a B 10.00 5\ngarbage\n2 A b B 9.00 5\n";
        let mut reader = FeedReader::new(feed.as_bytes(), "memory");
        let mut runner = runner(10, false);

        let stats = runner.run(&mut reader).await.unwrap();
        assert_eq!(stats.malformed_skipped, 1);
        assert_eq!(stats.events_applied, 2);

        let out = String::from_utf8(runner.into_writer().await.unwrap()).unwrap();
        assert_eq!(out, "2 S 95.00\n");
    }

    #[tokio::test]
    async fn test_strict_mode_aborts_on_malformed() {
        let feed = "1 A a B 10.00 5\ngarbage\n2 A b B 9.00 5\n";
        let mut reader = FeedReader::new(feed.as_bytes(), "memory");
        let mut runner = runner(10, true);

        let err = runner.run(&mut reader).await.unwrap_err();
        assert!(matches!(err, PricerError::ParseError(_)));
        assert_eq!(runner.stats().events_applied, 1);
    }

    #[tokio::test]
    async fn test_protocol_violation_halts_and_flushes() {
        let feed = "1 A a B 10.00 5\n2 A b B 9.00 5\n3 R zz 1\n4 A c B 8.00 5\n";
        let mut reader = FeedReader::new(feed.as_bytes(), "memory");
        let mut runner = runner(10, false);

        let err = runner.run(&mut reader).await.unwrap_err();
        assert!(matches!(err, PricerError::UnknownOrder(_)));
        assert_eq!(runner.pricer().books().bids().order_count(), 2);

        let out = String::from_utf8(runner.into_writer().await.unwrap()).unwrap();
        assert_eq!(out, "2 S 95.00\n");
    }

    #[tokio::test]
    async fn test_notional_overflow_halts_and_flushes() {
        let feed = "1 A a S 10.00 5\n2 A b S 79228162514264337593543950335 5\n";
        let mut reader = FeedReader::new(feed.as_bytes(), "memory");
        let mut runner = runner(5, false);

        // Level b sits behind a, so the walk only overflows once a is gone
        let stats = runner.run(&mut reader).await.unwrap();
        assert_eq!(stats.emissions, 1);

        let feed = "4 R a 5\n";
        let mut reader = FeedReader::new(feed.as_bytes(), "memory");
        let err = runner.run(&mut reader).await.unwrap_err();
        assert!(matches!(err, PricerError::NotionalOverflow { .. }));
        assert!(!err.is_protocol_violation());

        let out = String::from_utf8(runner.into_writer().await.unwrap()).unwrap();
        assert_eq!(out, "1 B 50.00\n");
    }
}
