//! Deterministic state-to-row mapping for the Q-table.
//!
//! Each dimension is clipped to `[low, high]` and cut into `bins` equal-width
//! buckets. Bucket indices are folded into a single mixed-radix number, reduced
//! modulo the table size at every step. When `rows >= bins^dims` no reduction
//! ever happens and the mapping is injective over bucket tuples; otherwise
//! distinct tuples may share a row, and which ones do is fixed by the formula.

use serde::{Deserialize, Serialize};

use crate::config::RlParams;
use crate::indicators::error::IndicatorError;

/// Upper bound on derived table sizes.
pub const MAX_TABLE_ROWS: usize = 1 << 16;

/// Deserialized quantizers pass through [`StateQuantizer::new`], so a
/// snapshot cannot smuggle in an empty table or zero bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuantizerFields")]
pub struct StateQuantizer {
    bins: usize,
    low: f64,
    high: f64,
    dims: usize,
    rows: usize,
}

impl StateQuantizer {
    pub fn new(
        bins: usize,
        low: f64,
        high: f64,
        dims: usize,
        rows: Option<usize>,
    ) -> Result<Self, IndicatorError> {
        if bins == 0 {
            return Err(IndicatorError::invalid("bins_per_dim", "must be at least 1"));
        }
        if dims == 0 {
            return Err(IndicatorError::invalid("state_size", "must be at least 1"));
        }
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(IndicatorError::invalid(
                "state_low/state_high",
                format!("range [{low}, {high}] is empty or non-finite"),
            ));
        }

        let rows = match rows {
            Some(0) => return Err(IndicatorError::invalid("table_rows", "must be at least 1")),
            Some(rows) => rows,
            None => u32::try_from(dims)
                .ok()
                .and_then(|d| bins.checked_pow(d))
                .map_or(MAX_TABLE_ROWS, |full| full.min(MAX_TABLE_ROWS)),
        };
        // index() computes row * bins + bin with row < rows.
        if rows.checked_mul(bins).is_none() {
            return Err(IndicatorError::invalid(
                "table_rows",
                format!("{rows} rows with {bins} bins overflows the row index"),
            ));
        }

        Ok(Self {
            bins,
            low,
            high,
            dims,
            rows,
        })
    }

    pub fn from_params(params: &RlParams) -> Result<Self, IndicatorError> {
        Self::new(
            params.bins_per_dim,
            params.state_low,
            params.state_high,
            params.state_size,
            params.table_rows,
        )
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// True when no two bucket tuples share a row.
    pub fn is_injective(&self) -> bool {
        u32::try_from(self.dims)
            .ok()
            .and_then(|d| self.bins.checked_pow(d))
            .is_some_and(|full| full <= self.rows)
    }

    /// Bucket of a single coordinate. NaN lands in the lowest bucket.
    pub fn bin(&self, value: f64) -> usize {
        let clipped = if value.is_nan() {
            self.low
        } else {
            value.clamp(self.low, self.high)
        };
        let fraction = (clipped - self.low) / (self.high - self.low);
        ((fraction * self.bins as f64) as usize).min(self.bins - 1)
    }

    /// Row for `state`. Missing coordinates read as zero, extra ones are ignored.
    pub fn index(&self, state: &[f64]) -> usize {
        (0..self.dims).fold(0, |row, dim| {
            let bin = self.bin(state.get(dim).copied().unwrap_or(0.0));
            (row * self.bins + bin) % self.rows
        })
    }
}

#[derive(Deserialize)]
struct QuantizerFields {
    bins: usize,
    low: f64,
    high: f64,
    dims: usize,
    rows: usize,
}

impl TryFrom<QuantizerFields> for StateQuantizer {
    type Error = IndicatorError;

    fn try_from(fields: QuantizerFields) -> Result<Self, Self::Error> {
        Self::new(fields.bins, fields.low, fields.high, fields.dims, Some(fields.rows))
    }
}
