//! Top-N / bottom-N selection by percent change.
//!
//! # Ordering
//!
//! Candidates compare by `(percent_change, position in the sorted symbol
//! list)`, so equal changes are tie-broken by symbol order: `worst` lists
//! the earlier symbol first, `best` the later one. The key is total, so:
//! - the outcome equals a stable ascending sort of the whole universe, with
//!   `worst` its head and `best` its tail reversed;
//! - equal changes never make the result depend on how the partition step
//!   happened to shuffle the slice;
//! - with `2n <= available` the two lists never share a symbol.
//!
//! Only the `n` selected candidates are sorted; the rest of the universe is
//! partitioned with `select_nth_unstable_by` in expected linear time.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DataError;
use crate::matrix::PriceMatrix;

/// One ranked symbol. `price` is the session close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub symbol: String,
    pub price: f64,
    pub percent_change: f64,
}

/// Output of one ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingResult {
    /// Requested count (lists may be shorter).
    pub n: usize,
    /// Descending by percent change.
    pub best: Vec<RankedEntry>,
    /// Ascending by percent change.
    pub worst: Vec<RankedEntry>,
    /// Symbols dropped before selection, with the reason.
    pub excluded: Vec<DataError>,
}

#[derive(Clone, Copy)]
struct Candidate {
    index: usize,
    pct: f64,
}

fn ascending(a: &Candidate, b: &Candidate) -> Ordering {
    a.pct
        .total_cmp(&b.pct)
        .then_with(|| a.index.cmp(&b.index))
}

/// `(close - open) * 100 / open`, refusing zero opens and non-finite results.
pub fn percent_change(symbol: &str, open: f64, close: f64) -> Result<f64, DataError> {
    if open == 0.0 {
        return Err(DataError::ZeroOpenPrice {
            symbol: symbol.to_string(),
        });
    }
    let pct = (close - open) * 100.0 / open;
    if !pct.is_finite() {
        return Err(DataError::NonFinite {
            symbol: symbol.to_string(),
            open,
            close,
        });
    }
    Ok(pct)
}

/// Rank parallel sequences. Symbols need not be pre-sorted; they are sorted
/// together with their prices before ranking.
pub fn rank(
    symbols: &[String],
    open_prices: &[f64],
    close_prices: &[f64],
    n: usize,
) -> Result<RankingResult, DataError> {
    let matrix = PriceMatrix::new(symbols.to_vec(), open_prices.to_vec(), close_prices.to_vec())?;
    rank_matrix(&matrix, n)
}

/// Rank an already-aligned matrix.
pub fn rank_matrix(matrix: &PriceMatrix, n: usize) -> Result<RankingResult, DataError> {
    if n == 0 {
        return Err(DataError::InvalidCount);
    }

    let symbols = matrix.symbols();
    let opens = matrix.open_prices();
    let closes = matrix.close_prices();

    let mut pool: Vec<Candidate> = Vec::with_capacity(matrix.len());
    let mut excluded = Vec::new();
    for (index, symbol) in symbols.iter().enumerate() {
        match percent_change(symbol, opens[index], closes[index]) {
            Ok(pct) => pool.push(Candidate { index, pct }),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "excluded from ranking");
                excluded.push(e);
            }
        }
    }

    let available = pool.len();
    let k = n.min(available);
    if k == 0 {
        return Ok(RankingResult {
            n,
            best: Vec::new(),
            worst: Vec::new(),
            excluded,
        });
    }

    if k < available {
        pool.select_nth_unstable_by(k - 1, ascending);
    }
    let mut worst: Vec<Candidate> = pool[..k].to_vec();

    let rest: &mut [Candidate] = if available >= 2 * k {
        &mut pool[k..]
    } else {
        &mut pool[..]
    };
    let len = rest.len();
    if k < len {
        rest.select_nth_unstable_by(len - k, ascending);
    }
    let mut best: Vec<Candidate> = rest[len - k..].to_vec();

    worst.sort_by(ascending);
    best.sort_by(|a, b| ascending(b, a));

    let entry = |c: &Candidate| RankedEntry {
        symbol: symbols[c.index].clone(),
        price: closes[c.index],
        percent_change: c.pct,
    };

    Ok(RankingResult {
        n,
        best: best.iter().map(entry).collect(),
        worst: worst.iter().map(entry).collect(),
        excluded,
    })
}
