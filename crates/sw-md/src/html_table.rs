//! First `<table>` of an HTML page as header + text rows.
//!
//! Covers the plain tables the holiday calendar and index-constituent pages
//! publish. Cell text has tags stripped, common entities decoded and
//! whitespace collapsed. `colspan`/`rowspan` are not expanded.

use anyhow::{anyhow, Context, Result};
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HtmlTable {
    /// Values of the column whose header equals `name` (case-insensitive).
    /// Rows too short for the column are skipped.
    pub fn column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self
            .headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                anyhow!(
                    "table has no '{name}' column (headers: {:?})",
                    self.headers
                )
            })?;
        Ok(self
            .rows
            .iter()
            .filter_map(|r| r.get(idx).cloned())
            .collect())
    }
}

/// Parse the first table in `html`. The first row is the header row.
pub fn first_table(html: &str) -> Result<HtmlTable> {
    let table_re = Regex::new(r"(?is)<table\b[^>]*>(.*?)</table>").context("table regex")?;
    let row_re = Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").context("row regex")?;
    let cell_re = Regex::new(r"(?is)<t[hd]\b[^>]*>(.*?)</t[hd]>").context("cell regex")?;
    let tag_re = Regex::new(r"(?s)<[^>]*>").context("tag regex")?;

    let body = table_re
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or_else(|| anyhow!("page has no <table>"))?
        .as_str();

    let mut rows = row_re.captures_iter(body).filter_map(|row| {
        let inner = row.get(1)?.as_str();
        let cells: Vec<String> = cell_re
            .captures_iter(inner)
            .filter_map(|c| c.get(1))
            .map(|c| cell_text(&tag_re, c.as_str()))
            .collect();
        (!cells.is_empty()).then_some(cells)
    });

    let headers = rows.next().ok_or_else(|| anyhow!("table has no rows"))?;
    Ok(HtmlTable {
        headers,
        rows: rows.collect(),
    })
}

fn cell_text(tag_re: &Regex, raw: &str) -> String {
    let stripped = tag_re.replace_all(raw, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
