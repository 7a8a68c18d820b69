use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::DEFAULT_CEP_BASE_URL,
    model::{CityLookupResult, PostalCode},
    provider::{UpstreamError, read_body, truncate_body},
};

use super::PostalCodeResolver;

/// Postal code resolver backed by ViaCEP (`/ws/<cep>/json/`).
#[derive(Debug, Clone)]
pub struct ViaCepResolver {
    base_url: String,
    http: Client,
}

impl ViaCepResolver {
    pub fn new(http: Client) -> Self {
        Self { base_url: DEFAULT_CEP_BASE_URL.to_string(), http }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn lookup_url(&self, code: &PostalCode) -> String {
        format!("{}/ws/{}/json/", self.base_url, urlencoding::encode(code.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    erro: Option<ErroFlag>,
}

/// ViaCEP has reported the flag both as a boolean and as the string `"true"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErroFlag {
    Bool(bool),
    Text(String),
}

impl ErroFlag {
    fn is_set(&self) -> bool {
        match self {
            ErroFlag::Bool(b) => *b,
            ErroFlag::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

pub(crate) fn parse_lookup(body: &[u8]) -> Result<CityLookupResult, UpstreamError> {
    let parsed: ViaCepResponse = serde_json::from_slice(body)?;

    if parsed.erro.as_ref().is_some_and(ErroFlag::is_set) || parsed.localidade.is_empty() {
        return Ok(CityLookupResult::not_found());
    }

    Ok(CityLookupResult::found(parsed.localidade))
}

#[async_trait]
impl PostalCodeResolver for ViaCepResolver {
    async fn resolve(&self, code: &PostalCode) -> Result<CityLookupResult, UpstreamError> {
        let url = self.lookup_url(code);

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(Box::new(e)))?;

        let status = res.status();
        let body = read_body(res).await?;
        debug!(cep = %code, %status, body = %truncate_body(&body), "ViaCEP response");

        parse_lookup(&body)
    }
}
