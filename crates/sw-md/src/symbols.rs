//! Ticker normalization between universe listings and price feeds.
//!
//! Listings publish share classes with a dot (`BRK.B`); feeds expect a dash
//! (`BRK-B`).

pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().replace('.', "-")
}

/// Normalize every symbol, drop blanks, then sort and de-duplicate.
pub fn normalize_universe<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = raw
        .into_iter()
        .map(|s| normalize_symbol(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_becomes_dash() {
        assert_eq!(normalize_symbol("BRK.B"), "BRK-B");
        assert_eq!(normalize_symbol(" BF.B "), "BF-B");
        assert_eq!(normalize_symbol("AAPL"), "AAPL");
    }

    #[test]
    fn universe_is_sorted_and_unique() {
        let u = normalize_universe(["MSFT", "BRK.B", "", "AAPL", "BRK-B"]);
        assert_eq!(u, vec!["AAPL", "BRK-B", "MSFT"]);
    }
}
