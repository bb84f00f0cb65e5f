//! Date-keyed price series in stored order.
//!
//! A [`PriceSeries`] holds the records of one symbol at one granularity exactly
//! as they appeared in the backing file. It is never sorted or de-duplicated in
//! place; consumers that need chronological order take a sorted copy.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::types::{Granularity, PriceField, PriceRecord};

/// Immutable price series for one symbol at one granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    granularity: Granularity,
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// Canonical label of the time key column.
    pub const KEY_LABEL: &'static str = "Date";

    pub fn new(granularity: Granularity, records: Vec<PriceRecord>) -> Self {
        Self {
            granularity,
            records,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Records in stored order.
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record as stored, before any sorting.
    pub fn first_stored(&self) -> Option<&PriceRecord> {
        self.records.first()
    }

    /// Most recent timestamp in the series.
    pub fn latest(&self) -> Option<NaiveDateTime> {
        self.records.iter().map(|r| r.timestamp).max()
    }

    /// Earliest timestamp in the series.
    pub fn earliest(&self) -> Option<NaiveDateTime> {
        self.records.iter().map(|r| r.timestamp).min()
    }

    /// Calendar date range covered by the series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.earliest()
            .zip(self.latest())
            .map(|(a, b)| (a.date(), b.date()))
    }

    /// Whether the stored order is already ascending by timestamp.
    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }

    /// Number of records sharing a timestamp with an earlier record.
    pub fn duplicate_count(&self) -> usize {
        let mut stamps: Vec<NaiveDateTime> = self.records.iter().map(|r| r.timestamp).collect();
        stamps.sort();
        stamps.windows(2).filter(|w| w[0] == w[1]).count()
    }

    /// Copy of the records sorted ascending by timestamp.
    ///
    /// The sort is stable, so records with equal timestamps keep their stored
    /// relative order.
    pub fn sorted_records(&self) -> Vec<PriceRecord> {
        let mut records = self.records.clone();
        records.sort_by_key(|r| r.timestamp);
        records
    }

    /// Values of one field in stored order.
    pub fn values(&self, field: PriceField) -> Vec<f64> {
        self.records.iter().map(|r| field.value(r)).collect()
    }
}
