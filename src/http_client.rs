use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::ProviderConfig;

const API_KEY_HEADER: &str = "x-rapidapi-key";
const API_HOST_HEADER: &str = "x-rapidapi-host";

pub fn http_client(cfg: &ProviderConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("football-stats-api/0.1"));
    let mut key = HeaderValue::from_str(&cfg.api_key).context("api key is not a valid header")?;
    key.set_sensitive(true);
    headers.insert(API_KEY_HEADER, key);
    headers.insert(
        API_HOST_HEADER,
        HeaderValue::from_str(&cfg.api_host).context("api host is not a valid header")?,
    );

    Client::builder()
        .timeout(cfg.timeout)
        .default_headers(headers)
        .build()
        .context("failed to build http client")
}
