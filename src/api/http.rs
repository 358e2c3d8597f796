//! Implements the `Backend` trait against the lead-generation REST API.

use crate::api::Backend;
use crate::model::{Campaign, DateRange, Niche, Transaction};
use crate::{utils, Config, Result};
use anyhow::{anyhow, bail, Context};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

const TRANSACTIONS: &str = "transactions";
const CAMPAIGNS: &str = "campaigns";
const NICHES: &str = "niches";

/// The longest slice of an error response body that is included in an error message.
const ERROR_BODY_LIMIT: usize = 200;

/// Talks to the backend over HTTP. When a token file exists, its contents are sent as a bearer
/// token with every request.
pub(crate) struct HttpBackend {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub(crate) async fn new(config: &Config) -> Result<Self> {
        let token_path = config.token_path();
        let token = if token_path.is_file() {
            let token = utils::read(&token_path).await?.trim().to_string();
            (!token.is_empty()).then_some(token)
        } else {
            debug!(
                "No API token found at {}, sending unauthenticated requests",
                token_path.display()
            );
            None
        };
        Ok(Self {
            client: reqwest::Client::new(),
            base: config.api_url().clone(),
            token,
        })
    }

    async fn get_list<T>(&self, url: Url) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        trace!("GET {url}");
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("The request to {url} failed"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Unable to read the response body from {url}"))?;
        if !status.is_success() {
            let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            bail!("{url} responded with {status}: {excerpt}");
        }
        parse_list(&body).with_context(|| format!("Unable to parse the response from {url}"))
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn transactions(&self, range: DateRange) -> Result<Vec<Transaction>> {
        let mut url = endpoint(&self.base, TRANSACTIONS)?;
        url.query_pairs_mut()
            .append_pair("startDate", &range.start().to_string())
            .append_pair("endDate", &range.end().to_string());
        self.get_list(url).await
    }

    async fn campaigns(&self) -> Result<Vec<Campaign>> {
        self.get_list(endpoint(&self.base, CAMPAIGNS)?).await
    }

    async fn niches(&self) -> Result<Vec<Niche>> {
        self.get_list(endpoint(&self.base, NICHES)?).await
    }
}

/// Appends `path` as a final segment of `base`, whether or not `base` ends with a slash.
fn endpoint(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("The API URL '{base}' cannot have paths appended to it"))?
        .pop_if_empty()
        .push(path);
    Ok(url)
}

/// List endpoints return either a bare array or an array wrapped in `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

fn parse_list<T>(body: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let list: ListResponse<T> = serde_json::from_str(body)?;
    Ok(match list {
        ListResponse::Bare(items) => items,
        ListResponse::Wrapped { data } => data,
    })
}
