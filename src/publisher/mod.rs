//! Publisher module for emission output
//!
//! Renders emissions as text or JSON lines onto an async writer.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::Result;
use crate::orderbook::Notional;
use crate::pricer::{Emission, Quantity, AMOUNT_SCALE};

/// Output line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `<timestamp> <B|S> <amount|NA>`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Writes emissions to a sink
pub struct Publisher<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
    format: OutputFormat,
    published: u64,
}

impl<W: AsyncWrite + Unpin> Publisher<W> {
    /// Create a new publisher
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer: BufWriter::new(writer),
            format,
            published: 0,
        }
    }

    /// Publish one emission
    pub async fn publish(&mut self, emission: &Emission) -> Result<()> {
        let mut line = match self.format {
            OutputFormat::Text => render_text(emission),
            OutputFormat::Json => serde_json::to_string(emission)?,
        };
        line.push('\n');

        self.writer.write_all(line.as_bytes()).await?;
        self.published += 1;

        debug!(
            timestamp = emission.timestamp,
            quantity = ?emission.quantity,
            "Published emission"
        );
        Ok(())
    }

    /// Flush buffered output
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Number of emissions written so far
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Flush and hand back the underlying writer
    pub async fn into_inner(mut self) -> Result<W> {
        self.flush().await?;
        Ok(self.writer.into_inner())
    }
}

/// Text rendering: buy cost is tagged `B`, sell proceeds `S`
pub fn render_text(emission: &Emission) -> String {
    let tag = match emission.quantity {
        Quantity::BuyCost => 'B',
        Quantity::SellProceeds => 'S',
    };
    match emission.value.amount() {
        Some(amount) => format!("{} {} {}", emission.timestamp, tag, format_amount(amount)),
        None => format!("{} {} NA", emission.timestamp, tag),
    }
}

fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", AMOUNT_SCALE as usize, rounded)
}
