//! Published holiday calendar and constituents listing, served locally.

use httpmock::prelude::*;
use sw_md::{HolidaySource, HttpHolidaySource, HttpUniverse, UniverseSource};

const CALENDAR_PAGE: &str = r#"<!doctype html>
<html><body>
<h2>Holidays &amp; Trading Hours</h2>
<table class="table-data w-full">
  <thead>
    <tr><th>Holiday</th><th>2026</th><th>2027</th><th>2028</th></tr>
  </thead>
  <tbody>
    <tr><td>New Years Day</td><td>Thursday, January 1</td><td>Friday, January 1</td><td>—</td></tr>
    <tr><td>Martin Luther King, Jr. Day</td><td>Monday, January 19</td><td>Monday, January 18</td><td>Monday, January 17</td></tr>
    <tr><td>Independence Day</td><td>Friday, July 3**</td><td>Monday, July 5**</td><td>Tuesday, July 4</td></tr>
  </tbody>
</table>
</body></html>"#;

#[tokio::test]
async fn holiday_source_reads_the_year_column() {
    let server = MockServer::start_async().await;
    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/markets/hours-calendars");
            then.status(200)
                .header("content-type", "text/html")
                .body(CALENDAR_PAGE);
        })
        .await;

    let src = HttpHolidaySource::new_with_base_url(server.url("/markets/hours-calendars"));
    assert_eq!(
        src.holiday_records(2027).await.unwrap(),
        vec!["Friday, January 1", "Monday, January 18", "Monday, July 5**"]
    );
    page.assert_async().await;
}

#[tokio::test]
async fn holiday_source_refuses_unlisted_year() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cal");
            then.status(200).body(CALENDAR_PAGE);
        })
        .await;

    let src = HttpHolidaySource::new_with_base_url(server.url("/cal"));
    let err = format!("{:#}", src.holiday_records(2031).await.unwrap_err());
    assert!(err.contains("2031"), "{err}");
}

#[tokio::test]
async fn holiday_source_surfaces_http_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cal");
            then.status(503).body("<html>down for maintenance</html>");
        })
        .await;

    let src = HttpHolidaySource::new_with_base_url(server.url("/cal"));
    let err = format!("{:#}", src.holiday_records(2026).await.unwrap_err());
    assert!(err.contains("status=503"), "{err}");
}

#[tokio::test]
async fn universe_reads_symbol_column_from_html() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/wiki/sp500");
            then.status(200).body(
                r#"<html><body>
                <table class="wikitable sortable" id="constituents">
                <tbody>
                <tr><th>Symbol</th><th>Security</th><th>GICS Sector</th></tr>
                <tr><td><a rel="nofollow" class="external text" href="https://www.nyse.com/quote/XNYS:MMM">MMM</a></td><td><a href="/wiki/3M">3M</a></td><td>Industrials</td></tr>
                <tr><td><a rel="nofollow" class="external text" href="https://www.nyse.com/quote/XNYS:BRK.B">BRK.B</a></td><td>Berkshire Hathaway</td><td>Financials</td></tr>
                </tbody></table>
                <table><tr><th>Date</th><th>Added</th></tr></table>
                </body></html>"#,
            );
        })
        .await;

    let src = HttpUniverse::new_with_base_url(server.url("/wiki/sp500"));
    assert_eq!(src.symbols().await.unwrap(), vec!["MMM", "BRK.B"]);
}

#[tokio::test]
async fn universe_reads_csv_export() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/constituents.csv");
            then.status(200)
                .header("content-type", "text/csv")
                .body("Symbol,Security\nAAPL,\"Apple, Inc.\"\nMSFT,Microsoft\n");
        })
        .await;

    let src = HttpUniverse::new_with_base_url(server.url("/constituents.csv"));
    assert_eq!(src.symbols().await.unwrap(), vec!["AAPL", "MSFT"]);
}

#[tokio::test]
async fn universe_without_symbol_column_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/list");
            then.status(200)
                .body("<table><tr><th>Ticker</th></tr><tr><td>AAPL</td></tr></table>");
        })
        .await;

    let src = HttpUniverse::new_with_base_url(server.url("/list"));
    assert!(src.symbols().await.is_err());
    let src = HttpUniverse::new_with_base_url(server.url("/list")).with_column("Ticker");
    assert_eq!(src.symbols().await.unwrap(), vec!["AAPL"]);
}
