use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use spdlog::{debug, warn};

use crate::config::SourceConfig;
use crate::source::{ContentSource, Cursor, Document, Predicate, QueryOptions, SearchPage, SourceError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

#[derive(Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// [`ContentSource`] backed by the Prismic REST API (v2).
pub struct PrismicSource {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    retries: u32,
}

impl PrismicSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(PrismicSource {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            retries: config.retries,
        })
    }

    fn with_token(&self, url: &str) -> String {
        match self.access_token {
            Some(ref token) if !url.contains("access_token=") => {
                let separator = if url.contains('?') { '&' } else { '?' };
                let encoded = serde_urlencoded::to_string(&[("access_token", token.as_str())]).unwrap_or_default();
                format!("{}{}{}", url, separator, encoded)
            }
            _ => url.to_string(),
        }
    }

    pub fn search_url(&self, reference: &str, predicates: &[Predicate], options: &QueryOptions) -> String {
        let mut params: Vec<(&str, String)> = vec![("ref", reference.to_string())];

        if !predicates.is_empty() {
            let q: String = predicates.iter().map(|p| p.to_query()).collect();
            params.push(("q", format!("[{}]", q)));
        }
        if options.page_size > 0 {
            params.push(("pageSize", options.page_size.to_string()));
        }
        if !options.orderings.is_empty() {
            let orderings: Vec<String> = options.orderings.iter().map(|o| o.to_query()).collect();
            params.push(("orderings", format!("[{}]", orderings.join(","))));
        }
        if let Some(ref after) = options.after {
            params.push(("after", after.clone()));
        }
        if !options.fetch.is_empty() {
            params.push(("fetch", options.fetch.join(",")));
        }

        let query_string = serde_urlencoded::to_string(&params).unwrap_or_default();
        let url = format!("{}/documents/search?{}", self.endpoint, query_string);
        self.with_token(&url)
    }

    async fn master_ref(&self) -> Result<String, SourceError> {
        let url = self.with_token(&self.endpoint);
        let api: ApiInfo = self.get_json(&url).await?;
        api.refs.into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(SourceError::NoMasterRef)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let mut attempt = 0;
        loop {
            match self.try_get(url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retries && is_retryable(&e) => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                    attempt += 1;
                    warn!("Content source request failed (attempt {}), retrying in {:?}: {}", attempt, delay, e);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.json::<T>().await?)
    }
}

fn is_retryable(error: &SourceError) -> bool {
    match error {
        SourceError::Request(_) => true,
        SourceError::HttpStatus(status) => *status == 429 || *status >= 500,
        _ => false,
    }
}

impl ContentSource for PrismicSource {
    async fn query(&self, predicates: &[Predicate], options: &QueryOptions) -> Result<SearchPage, SourceError> {
        let reference = match options.reference {
            Some(ref preview) => preview.clone(),
            None => self.master_ref().await?,
        };
        let url = self.search_url(&reference, predicates, options);
        self.get_json(&url).await
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, SourceError> {
        let predicates = [Predicate::Uid {
            doc_type: doc_type.to_string(),
            uid: uid.to_string(),
        }];
        let page = self.query(&predicates, &QueryOptions::page_size(1)).await?;
        page.results.into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(uid.to_string()))
    }

    async fn follow(&self, cursor: &Cursor) -> Result<SearchPage, SourceError> {
        let url = self.with_token(&cursor.0);
        self.get_json(&url).await
    }
}
