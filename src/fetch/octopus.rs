use super::{RateFetcher, extract_results};
use crate::config::TariffConfig;
use crate::error::FetchError;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use reqwest::header::{ACCEPT, USER_AGENT};

/// Octopus Energy standard-unit-rates client
pub struct OctopusClient {
    client: reqwest::Client,
    url: String,
    page_size: u32,
    logger: StructuredLogger,
}

impl OctopusClient {
    /// Create a client for the configured tariff
    pub fn new(cfg: &TariffConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(cfg.timeout()).build()?;
        Ok(Self {
            client,
            url: rates_url(cfg),
            page_size: cfg.page_size,
            logger: get_logger_with_context(
                LogContext::new("octopus").with_tariff(&cfg.tariff_code),
            ),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Standard unit rates endpoint for a product/tariff pair
pub fn rates_url(cfg: &TariffConfig) -> String {
    format!(
        "{}/products/{}/electricity-tariffs/{}/standard-unit-rates/",
        cfg.api_base.trim_end_matches('/'),
        cfg.product_code.trim(),
        cfg.tariff_code.trim()
    )
}

#[async_trait::async_trait]
impl RateFetcher for OctopusClient {
    async fn fetch_rates(&self) -> Result<Vec<serde_json::Value>, FetchError> {
        self.logger.debug(&format!("Fetching rates from {}", self.url));
        let resp = self
            .client
            .get(&self.url)
            .query(&[("page_size", self.page_size)])
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("agile-tracker/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .map_err(|e| {
                self.logger.error(&format!("Rates request failed: {}", e));
                FetchError::network(e.to_string())
            })?;

        if !resp.status().is_success() {
            self.logger
                .error(&format!("Rates API error: {}", resp.status()));
            return Err(FetchError::status(resp.status().as_u16()));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| FetchError::malformed(e.to_string()))?;
        let records = extract_results(body)?;
        self.logger
            .info(&format!("Fetched {} rate records", records.len()));
        Ok(records)
    }
}
