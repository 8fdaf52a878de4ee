//! Shared GET helper for the page-scraping sources.

use anyhow::{anyhow, Context, Result};

pub(crate) const USER_AGENT: &str = concat!("stockwatch/", env!("CARGO_PKG_VERSION"));

/// GET `url` and return the body. The status is checked before the body is
/// read so an error page surfaces as its status code.
pub(crate) async fn get_text(http: &reqwest::Client, url: &str, what: &str) -> Result<String> {
    let resp = http
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .with_context(|| format!("{what} request failed"))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("{what} http error: status={}", status.as_u16()));
    }
    resp.text()
        .await
        .with_context(|| format!("{what} body read failed"))
}
