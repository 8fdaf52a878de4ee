//! Text rendering for ranking results.
//!
//! # Rounding
//!
//! Prices and percentages render with exactly two decimals, rounded
//! half-away-from-zero on the value's shortest round-trip decimal form (the
//! digits `{}` prints). `1.005` prints as `1.005`, so it renders `1.01`, even
//! though the nearest binary double is slightly below 1.005.

use chrono::NaiveDate;

use crate::rank::{RankedEntry, RankingResult};

/// Two-decimal rendering, half away from zero. `-0.001` renders `0.00`.
pub fn format_2dp(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    // Integer digits followed by exactly two fractional digits.
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(2).is_some_and(|&b| b >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let render = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let int_s = render(&digits[..split]);
    let int_s = match int_s.trim_start_matches('0') {
        "" => "0",
        s => s,
    };
    let frac_s = render(&digits[split..]);

    let negative = value.is_sign_negative() && digits.iter().any(|&d| d != 0);
    format!("{}{}.{}", if negative { "-" } else { "" }, int_s, frac_s)
}

/// `SYMBOL $PRICE PERCENT%`
pub fn render_entry(entry: &RankedEntry) -> String {
    format!(
        "{} ${} {}%",
        entry.symbol,
        format_2dp(entry.price),
        format_2dp(entry.percent_change)
    )
}

/// Full report block for one session.
pub fn render_report(session: NaiveDate, result: &RankingResult) -> String {
    let day = session.format("%Y-%m-%d");
    let mut out = format!(
        "{day}'s {} best performing stocks:\n",
        result.best.len()
    );
    for e in &result.best {
        out.push_str(&render_entry(e));
        out.push('\n');
    }
    out.push_str(&format!(
        "\n{day}'s {} worst performing stocks:\n",
        result.worst.len()
    ));
    for e in &result.worst {
        out.push_str(&render_entry(e));
        out.push('\n');
    }
    out
}
