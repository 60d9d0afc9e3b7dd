use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use time::{Date, Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::extract::{extract_constituents, extract_historical, extract_indices, total_volume};
use crate::http_client::{HttpClient, HttpError, HttpRequest, ReqwestHttpClient};
use crate::parse::{parse_tables, HtmlTable};
use crate::source::{MarketSource, SourceFuture};
use crate::{IndexRecord, ScrapeError, StockRecord};

/// Scraper for the PSX data portal.
///
/// All upstream calls are made one after another; the exchange host never
/// sees concurrent requests from a single retrieval.
#[derive(Clone)]
pub struct PsxScraper {
    http_client: Arc<dyn HttpClient>,
    config: ScraperConfig,
}

impl PsxScraper {
    pub fn new(http_client: Arc<dyn HttpClient>, config: ScraperConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Scraper backed by a reqwest client configured from `config`.
    pub fn from_config(config: ScraperConfig) -> Result<Self, HttpError> {
        let client = ReqwestHttpClient::new(&config.user_agent)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Current calendar date on the exchange.
    pub fn today(&self) -> Date {
        OffsetDateTime::now_utc()
            .to_offset(self.config.utc_offset)
            .date()
    }

    /// Indices listing enriched with constituent volumes.
    ///
    /// # Errors
    ///
    /// Fails only when the listing page itself cannot be fetched; there is
    /// no other source for indices.
    pub async fn get_indices(&self) -> Result<Vec<IndexRecord>, ScrapeError> {
        let url = self.config.indices_url();
        let body = self.fetch(self.page_request(&url)).await?;
        let mut records = extract_indices(&parse_tables(&body));
        debug!(count = records.len(), "extracted indices");

        let volumes = self.constituent_volumes().await;
        for record in &mut records {
            if let Some(total) = volumes.get(&record.symbol.key()) {
                record.volume = Some(*total);
            }
        }

        Ok(records)
    }

    /// Summed member volume per constituent index, keyed by uppercase id.
    ///
    /// Best effort: an index whose page fails is missing from the map.
    pub async fn constituent_volumes(&self) -> HashMap<String, f64> {
        let mut volumes = HashMap::new();
        for index in &self.config.constituent_indices {
            match self.constituent_tables(index).await {
                Ok(tables) => {
                    if let Some(total) = total_volume(&tables) {
                        volumes.insert(index.to_ascii_uppercase(), total);
                    } else {
                        debug!(%index, "no volume column on constituent page");
                    }
                }
                Err(error) => {
                    warn!(%index, %error, "skipping volume enrichment");
                }
            }
        }
        volumes
    }

    /// Stocks as of today, see [`PsxScraper::get_stocks_from`].
    pub async fn get_stocks(&self) -> Vec<StockRecord> {
        self.get_stocks_from(self.today()).await
    }

    /// Historical page for `start` and up to `lookback_days` earlier dates,
    /// then the constituent pages.
    ///
    /// Never fails: an exhausted chain yields an empty list.
    pub async fn get_stocks_from(&self, start: Date) -> Vec<StockRecord> {
        for days_back in 0..=self.config.lookback_days {
            let Some(date) = start.checked_sub(Duration::days(i64::from(days_back))) else {
                break;
            };

            match self.historical_for(date).await {
                Ok(records) if !records.is_empty() => {
                    info!(date = %format_trade_date(date), count = records.len(), "using historical page");
                    return records;
                }
                Ok(_) => debug!(date = %format_trade_date(date), "historical page has no rows"),
                Err(error) if error.is_timeout() => {
                    warn!(date = %format_trade_date(date), timeout_ms = self.config.timeout_ms, "historical page timed out")
                }
                Err(error) => {
                    debug!(date = %format_trade_date(date), %error, "historical page unavailable")
                }
            }
        }

        info!("historical page exhausted, falling back to constituent pages");
        self.constituent_stocks().await
    }

    async fn historical_for(&self, date: Date) -> Result<Vec<StockRecord>, ScrapeError> {
        let url = self.config.historical_url();
        let trade_date = format_trade_date(date);
        let request = HttpRequest::post(&url)
            .with_header("user-agent", &self.config.user_agent)
            .with_header("referer", &url)
            .with_header("origin", &self.config.base_url)
            .with_form_body(&[("date", trade_date.as_str())])
            .with_timeout_ms(self.config.timeout_ms);

        let body = self.fetch(request).await?;
        Ok(extract_historical(&parse_tables(&body)))
    }

    /// Members of every constituent index, first occurrence of a symbol wins.
    async fn constituent_stocks(&self) -> Vec<StockRecord> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for index in &self.config.constituent_indices {
            let tables = match self.constituent_tables(index).await {
                Ok(tables) => tables,
                Err(error) => {
                    warn!(%index, %error, "skipping constituent page");
                    continue;
                }
            };

            for record in extract_constituents(&tables) {
                if seen.insert(record.symbol.key()) {
                    merged.push(record);
                }
            }
        }

        if merged.is_empty() {
            warn!("no stock source returned data");
        }
        merged
    }

    async fn constituent_tables(&self, index: &str) -> Result<Vec<HtmlTable>, ScrapeError> {
        let url = self.config.constituent_url(index);
        let body = self.fetch(self.page_request(&url)).await?;
        Ok(parse_tables(&body))
    }

    fn page_request(&self, url: &str) -> HttpRequest {
        HttpRequest::get(url)
            .with_header("user-agent", &self.config.user_agent)
            .with_timeout_ms(self.config.timeout_ms)
    }

    async fn fetch(&self, request: HttpRequest) -> Result<String, ScrapeError> {
        let url = request.url.clone();
        debug!(%url, method = ?request.method, "fetching upstream page");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| ScrapeError::transport(&url, error))?;

        if !response.is_success() {
            return Err(ScrapeError::Status {
                url,
                status: response.status,
            });
        }
        Ok(response.body)
    }
}

impl MarketSource for PsxScraper {
    fn indices<'a>(&'a self) -> SourceFuture<'a, Vec<IndexRecord>> {
        Box::pin(self.get_indices())
    }

    fn stocks<'a>(&'a self) -> SourceFuture<'a, Vec<StockRecord>> {
        Box::pin(async move { Ok(self.get_stocks().await) })
    }
}

/// `YYYY-MM-DD`, the format the historical form expects.
pub fn format_trade_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
