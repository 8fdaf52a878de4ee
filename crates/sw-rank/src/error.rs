use std::fmt;

/// Errors produced while shaping or ranking session prices.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// Price sequences do not line up with the symbol list.
    ShapeMismatch {
        symbols: usize,
        opens: usize,
        closes: usize,
    },
    /// The same symbol appears twice in the price matrix.
    DuplicateSymbol { symbol: String },
    /// The price feed returned nothing for a requested symbol.
    MissingQuote { symbol: String },
    /// Open price of exactly zero; percent change is undefined.
    ZeroOpenPrice { symbol: String },
    /// Percent change came out NaN or infinite.
    NonFinite { symbol: String, open: f64, close: f64 },
    /// Requested result count was zero.
    InvalidCount,
}

impl DataError {
    /// Symbol this error is about, if it is a per-symbol diagnostic.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            DataError::DuplicateSymbol { symbol }
            | DataError::MissingQuote { symbol }
            | DataError::ZeroOpenPrice { symbol }
            | DataError::NonFinite { symbol, .. } => Some(symbol),
            DataError::ShapeMismatch { .. } | DataError::InvalidCount => None,
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::ShapeMismatch {
                symbols,
                opens,
                closes,
            } => write!(
                f,
                "price matrix shape mismatch: symbols={symbols} opens={opens} closes={closes}"
            ),
            DataError::DuplicateSymbol { symbol } => {
                write!(f, "duplicate symbol in price matrix: {symbol}")
            }
            DataError::MissingQuote { symbol } => {
                write!(f, "no session quote returned for {symbol}")
            }
            DataError::ZeroOpenPrice { symbol } => {
                write!(f, "{symbol}: open price is zero")
            }
            DataError::NonFinite {
                symbol,
                open,
                close,
            } => write!(
                f,
                "{symbol}: percent change is not finite (open={open} close={close})"
            ),
            DataError::InvalidCount => write!(f, "result count must be at least 1"),
        }
    }
}

impl std::error::Error for DataError {}
