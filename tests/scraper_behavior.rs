//! Behavior-driven tests for the PSX page orchestrator.
//!
//! Upstream pages are served by a scripted in-memory transport so every
//! fallback path can be exercised without network access.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use psx_core::{
    HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse, MarketSource,
    PsxScraper, ScrapeError, ScraperConfig,
};
use time::macros::date;

const BASE: &str = "https://psx.test";

// =============================================================================
// Scripted transport
// =============================================================================

#[derive(Default)]
struct ScriptedHttpClient {
    routes: Mutex<HashMap<String, Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn page(self, route: &str, html: impl Into<String>) -> Self {
        self.respond(route, Ok(HttpResponse::ok_html(html)))
    }

    fn respond(self, route: &str, response: Result<HttpResponse, HttpError>) -> Self {
        self.routes
            .lock()
            .expect("route table should not be poisoned")
            .insert(route.to_owned(), response);
        self
    }

    fn recorded(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .clone()
    }

    fn route_of(request: &HttpRequest) -> String {
        match request.method {
            HttpMethod::Get => format!("GET {}", request.url),
            HttpMethod::Post => format!(
                "POST {} date={}",
                request.url,
                request.form_value("date").unwrap_or_default()
            ),
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let route = Self::route_of(&request);
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .push(request);
        let response = self
            .routes
            .lock()
            .expect("route table should not be poisoned")
            .get(&route)
            .cloned()
            .unwrap_or_else(|| Ok(HttpResponse::with_status(404)));
        Box::pin(async move { response })
    }
}

fn scraper(client: &Arc<ScriptedHttpClient>) -> PsxScraper {
    let config = ScraperConfig::default().with_base_url(BASE);
    PsxScraper::new(client.clone(), config)
}

// =============================================================================
// Page fixtures
// =============================================================================

fn indices_page() -> String {
    r#"<html><body>
        <table class="market-status"><thead><tr><th>Market</th><th>State</th></tr></thead>
          <tbody><tr><td>REG</td><td>Closed</td></tr></tbody></table>
        <table>
          <thead><tr><th>INDEX</th><th>HIGH</th><th>LOW</th><th>CURRENT</th><th>CHANGE</th><th>% CHANGE</th></tr></thead>
          <tbody>
            <tr><td><a href="/indices/KSE100">KSE100</a></td><td>81,200.10</td><td>80,100.00</td>
                <td>81,000.50</td><td>500.50</td><td>0.62%</td></tr>
            <tr><td><a href="/indices/KSE30">KSE30</a></td><td>25,500</td><td>25,100</td>
                <td>25,400</td><td>-100</td><td>-0.39%</td></tr>
            <tr><td><a href="/indices/ALLSHR">ALLSHR</a></td><td>N/A</td><td>N/A</td>
                <td>52,000</td><td>N/A</td><td>N/A</td></tr>
            <tr><td><a href="/indices/KMI30">KMI30</a></td><td>130,000</td><td>129,000</td>
                <td>129,500</td><td>250</td><td>0.19%</td></tr>
          </tbody>
        </table>
    </body></html>"#
        .to_owned()
}

/// Constituent page rows: (symbol, current, volume).
fn constituent_page(rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(symbol, current, volume)| {
            format!(
                "<tr><td><a href=\"/company/{symbol}\">{symbol}</a></td><td>{symbol} Limited</td>\
                 <td>1.00</td><td>{current}</td><td>0.5</td><td>0.5%</td><td>{volume}</td></tr>"
            )
        })
        .collect();
    format!(
        "<table><thead><tr><th>SYMBOL</th><th>NAME</th><th>LDCP</th><th>CURRENT</th>\
         <th>CHANGE</th><th>CHANGE (%)</th><th>VOLUME</th></tr></thead><tbody>{body}</tbody></table>"
    )
}

/// Historical page rows: (symbol, close).
fn historical_page(rows: &[(&str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(symbol, close)| {
            format!(
                "<tr><td><a href=\"/company/{symbol}\">{symbol}</a></td><td>9</td><td>10</td>\
                 <td>11</td><td>8</td><td>{close}</td><td>1,000</td></tr>"
            )
        })
        .collect();
    format!(
        "<table><thead><tr><th>SYMBOL</th><th>LDCP</th><th>OPEN</th><th>HIGH</th><th>LOW</th>\
         <th>CLOSE</th><th>VOLUME</th></tr></thead><tbody>{body}</tbody></table>"
    )
}

fn empty_historical_page() -> String {
    historical_page(&[])
}

// =============================================================================
// Indices
// =============================================================================

#[tokio::test]
async fn when_one_constituent_page_fails_other_indices_still_get_volume() {
    // Given: KSE30's constituent page fails at the transport level
    let client = Arc::new(
        ScriptedHttpClient::default()
            .page(&format!("GET {BASE}/indices"), indices_page())
            .page(
                &format!("GET {BASE}/indices/KSE100"),
                constituent_page(&[("HBL", "100", "1,000"), ("UBL", "200", "2,500")]),
            )
            .respond(
                &format!("GET {BASE}/indices/KSE30"),
                Err(HttpError::other("connection reset")),
            )
            .page(
                &format!("GET {BASE}/indices/ALLSHR"),
                constituent_page(&[("HBL", "100", "1,000"), ("TINY", "2", "10")]),
            ),
    );

    // When: indices are retrieved
    let indices = scraper(&client).get_indices().await.expect("indices page is up");

    // Then: KSE100 and ALLSHR carry summed volumes, others stay unknown
    assert_eq!(indices.len(), 4);
    let volume_of = |symbol: &str| {
        indices
            .iter()
            .find(|record| record.symbol.as_str() == symbol)
            .and_then(|record| record.volume)
    };
    assert_eq!(volume_of("KSE100"), Some(3_500.0));
    assert_eq!(volume_of("ALLSHR"), Some(1_010.0));
    assert_eq!(volume_of("KSE30"), None);
    assert_eq!(volume_of("KMI30"), None);

    let requested: Vec<String> = client.recorded().into_iter().map(|r| r.url).collect();
    assert_eq!(
        requested,
        vec![
            format!("{BASE}/indices"),
            format!("{BASE}/indices/KSE100"),
            format!("{BASE}/indices/KSE30"),
            format!("{BASE}/indices/ALLSHR"),
        ]
    );
}

#[tokio::test]
async fn index_rows_derive_open_and_default_high_low() {
    let client = Arc::new(
        ScriptedHttpClient::default().page(&format!("GET {BASE}/indices"), indices_page()),
    );

    let indices = scraper(&client).get_indices().await.expect("indices page is up");

    let kse100 = &indices[0];
    assert_eq!(kse100.close, 81_000.5);
    assert_eq!(kse100.open, Some(80_500.0));
    assert_eq!(kse100.high, 81_200.1);
    assert_eq!(kse100.change_percent, Some(0.62));

    let kse30 = &indices[1];
    assert_eq!(kse30.open, Some(25_500.0));

    let allshr = &indices[2];
    assert_eq!(allshr.open, None);
    assert_eq!(allshr.high, 52_000.0);
    assert_eq!(allshr.low, 52_000.0);
}

#[tokio::test]
async fn when_indices_page_is_down_retrieval_fails() {
    let client = Arc::new(
        ScriptedHttpClient::default()
            .respond(&format!("GET {BASE}/indices"), Ok(HttpResponse::with_status(503))),
    );

    let error = scraper(&client).get_indices().await.expect_err("no fallback for indices");

    assert!(matches!(error, ScrapeError::Status { status: 503, .. }));
    assert_eq!(client.recorded().len(), 1, "enrichment must not run");
}

#[tokio::test]
async fn when_indices_transport_fails_error_names_the_url() {
    let client = Arc::new(ScriptedHttpClient::default().respond(
        &format!("GET {BASE}/indices"),
        Err(HttpError::other("dns failure")),
    ));

    let error = scraper(&client).indices().await.expect_err("transport failure");

    assert!(matches!(error, ScrapeError::Transport { .. }));
    assert!(error.to_string().contains("/indices"));
}

// =============================================================================
// Stocks: historical lookback
// =============================================================================

#[tokio::test]
async fn lookback_stops_at_first_date_with_rows() {
    // Given: 2024-03-10 back to 2024-03-04 are empty or time out, two rows on 2024-03-03
    let mut client = ScriptedHttpClient::default();
    for day in 4..=10 {
        let route = format!("POST {BASE}/historical date=2024-03-{day:02}");
        client = if day % 2 == 0 {
            client.page(&route, empty_historical_page())
        } else {
            client.respond(
                &route,
                Err(HttpError::new(HttpErrorKind::Timeout, "request timeout")),
            )
        };
    }
    let client = Arc::new(
        client
            .page(
                &format!("POST {BASE}/historical date=2024-03-03"),
                historical_page(&[("HBL", "103.2"), ("UBL", "201")]),
            )
            .page(
                &format!("POST {BASE}/historical date=2024-03-02"),
                historical_page(&[("OLD", "1")]),
            ),
    );

    // When: stocks are retrieved starting on 2024-03-10
    let stocks = scraper(&client).get_stocks_from(date!(2024 - 03 - 10)).await;

    // Then: the 2024-03-03 rows are returned after exactly eight POSTs
    let symbols: Vec<&str> = stocks.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["HBL", "UBL"]);
    assert_eq!(stocks[0].high, Some(11.0));
    assert_eq!(stocks[0].low, Some(8.0));

    let requests = client.recorded();
    assert_eq!(requests.len(), 8);
    assert!(requests.iter().all(|r| r.method == HttpMethod::Post));
    let dates: Vec<String> = requests
        .iter()
        .filter_map(|r| r.form_value("date"))
        .collect();
    assert_eq!(dates.first().map(String::as_str), Some("2024-03-10"));
    assert_eq!(dates.last().map(String::as_str), Some("2024-03-03"));
}

#[tokio::test]
async fn historical_post_carries_form_and_origin_headers() {
    let client = Arc::new(ScriptedHttpClient::default().page(
        &format!("POST {BASE}/historical date=2024-01-02"),
        historical_page(&[("HBL", "100")]),
    ));

    let scraper = scraper(&client);
    assert_eq!(scraper.config().base_url, BASE);

    let stocks = scraper.get_stocks_from(date!(2024 - 01 - 02)).await;
    assert_eq!(stocks.len(), 1);

    let requests = client.recorded();
    assert_eq!(requests.len(), 1);
    let post = &requests[0];
    assert_eq!(post.body.as_deref(), Some("date=2024-01-02"));
    let header = |name: &str| post.headers.get(name).map(String::as_str);
    assert_eq!(header("content-type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(header("referer"), Some("https://psx.test/historical"));
    assert_eq!(header("origin"), Some(BASE));
    assert_eq!(header("user-agent"), Some("PSX-API/1.0"));
    assert!(post.timeout_ms > 0);
}

// =============================================================================
// Stocks: constituent fallback
// =============================================================================

#[tokio::test]
async fn fallback_merges_constituents_keeping_first_occurrence() {
    // Given: the historical page never has data; KSE100 {A,B}, KSE30 {B,C}
    let client = Arc::new(
        ScriptedHttpClient::default()
            .page(
                &format!("GET {BASE}/indices/KSE100"),
                constituent_page(&[("A", "10", "100"), ("B", "20", "200")]),
            )
            .page(
                &format!("GET {BASE}/indices/KSE30"),
                constituent_page(&[("b", "99", "999"), ("C", "30", "300")]),
            )
            .respond(
                &format!("GET {BASE}/indices/ALLSHR"),
                Err(HttpError::other("connection refused")),
            ),
    );

    // When: stocks are retrieved
    let stocks = scraper(&client).get_stocks_from(date!(2024 - 03 - 10)).await;

    // Then: A, B (KSE100 values) and C, nothing else
    let symbols: Vec<&str> = stocks.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["A", "B", "C"]);
    assert_eq!(stocks[1].close, 20.0);
    assert_eq!(stocks[1].volume, Some(200.0));
    assert!(stocks.iter().all(|s| s.high.is_none() && s.low.is_none()));
    assert_eq!(stocks[0].open, Some(1.0));
    assert_eq!(stocks[0].name.as_deref(), Some("A Limited"));

    let requests = client.recorded();
    let posts = requests.iter().filter(|r| r.method == HttpMethod::Post).count();
    let gets = requests.iter().filter(|r| r.method == HttpMethod::Get).count();
    assert_eq!(posts, 8);
    assert_eq!(gets, 3);
}

#[tokio::test]
async fn when_every_source_fails_stocks_are_empty_not_an_error() {
    let client = Arc::new(ScriptedHttpClient::default());

    let stocks = scraper(&client)
        .stocks()
        .await
        .expect("stock retrieval does not fail on upstream outages");

    assert!(stocks.is_empty());
    assert_eq!(client.recorded().len(), 8 + 3);
}

#[tokio::test]
async fn unrecognized_historical_layout_falls_through_to_constituents() {
    let mut client = ScriptedHttpClient::default();
    for day in 3..=10 {
        client = client.page(
            &format!("POST {BASE}/historical date=2024-03-{day:02}"),
            "<table><thead><tr><th>Notice</th></tr></thead><tbody><tr><td>Maintenance</td></tr></tbody></table>",
        );
    }
    let client = Arc::new(client.page(
        &format!("GET {BASE}/indices/KSE100"),
        constituent_page(&[("HBL", "100", "1")]),
    ));

    let stocks = scraper(&client).get_stocks_from(date!(2024 - 03 - 10)).await;

    assert_eq!(stocks.len(), 1);
    assert_eq!(stocks[0].symbol.as_str(), "HBL");
}
