//! Instrument catalog: the tradable option contracts for one underlying
//! series, queried by side and strike.
//!
//! The catalog is a static snapshot for the session, filtered out of a venue
//! instrument dump (CSV). Strike spacing is derived once from the listed
//! strikes unless the configuration pins it.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use survivor_core::types::{Instrument, OptionSide};

/// Raw row of a venue instrument dump. Columns not named here are ignored.
#[derive(Debug, Deserialize)]
struct InstrumentRow {
    tradingsymbol: String,
    strike: String,
    instrument_type: String,
    segment: String,
}

/// Static snapshot of the option contracts tradable this session.
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
}

impl InstrumentCatalog {
    #[must_use]
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// Loads a catalog from an instrument dump, keeping only option rows in
    /// `segment` whose trading symbol starts with `series_prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a matching row has an
    /// unparseable strike.
    pub fn from_csv(path: impl AsRef<Path>, series_prefix: &str, segment: &str) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open instruments file: {}", path.display()))?;

        let mut instruments = Vec::new();
        for row in reader.deserialize() {
            let row: InstrumentRow = row.context("Malformed instrument row")?;
            if row.segment != segment || !row.tradingsymbol.starts_with(series_prefix) {
                continue;
            }
            let Some(side) = OptionSide::from_venue_code(&row.instrument_type) else {
                continue;
            };
            let strike = Decimal::from_str(&row.strike)
                .with_context(|| format!("Invalid strike for {}", row.tradingsymbol))?;
            instruments.push(Instrument {
                symbol: row.tradingsymbol,
                strike,
                side,
                segment: row.segment,
                series_prefix: series_prefix.to_string(),
            });
        }

        info!(
            path = %path.display(),
            series = series_prefix,
            count = instruments.len(),
            "Loaded instrument catalog"
        );
        Ok(Self::new(instruments))
    }

    /// All contracts on one side.
    pub fn side(&self, side: OptionSide) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(move |i| i.side == side)
    }

    #[must_use]
    pub fn side_count(&self, side: OptionSide) -> usize {
        self.side(side).count()
    }

    /// Sorted, deduplicated strikes listed on one side.
    #[must_use]
    pub fn distinct_strikes(&self, side: OptionSide) -> Vec<Decimal> {
        let mut strikes: Vec<Decimal> = self.side(side).map(|i| i.strike).collect();
        strikes.sort_unstable();
        strikes.dedup();
        strikes
    }

    /// Natural interval between adjacent listed strikes, derived from the
    /// call subset (puts as fallback). `None` when no side lists two strikes.
    #[must_use]
    pub fn strike_spacing(&self) -> Option<Decimal> {
        Self::spacing_of(&self.distinct_strikes(OptionSide::Call))
            .or_else(|| Self::spacing_of(&self.distinct_strikes(OptionSide::Put)))
    }

    fn spacing_of(strikes: &[Decimal]) -> Option<Decimal> {
        strikes.windows(2).map(|pair| pair[1] - pair[0]).min()
    }

    /// Contract on `side` nearest to `target_strike`, with its distance.
    ///
    /// Ties resolve to the lowest strike, then the lexically smallest symbol,
    /// so repeated runs over the same dump pick the same contract.
    #[must_use]
    pub fn nearest(&self, side: OptionSide, target_strike: Decimal) -> Option<(&Instrument, Decimal)> {
        self.side(side)
            .map(|inst| (inst, (inst.strike - target_strike).abs()))
            .min_by(|(a, da), (b, db)| {
                da.cmp(db)
                    .then(a.strike.cmp(&b.strike))
                    .then(a.symbol.cmp(&b.symbol))
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
