use crate::models::Catalog;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to fetch catalog: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to load catalog ({0})")]
    Status(u16),
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog document: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("translation endpoint answered {0}")]
    Status(u16),
    #[error("translation response carried no translated text")]
    MissingText,
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<Catalog, CatalogError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;
}

/// Catalog served by a remote host.
#[derive(Clone)]
pub struct HttpCatalogSource {
    url: String,
    client: Client,
}

impl HttpCatalogSource {
    pub fn new(url: String, client: Client) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        Ok(Catalog::from_json(&body)?)
    }
}

/// Catalog document on local disk, next to the binary.
#[derive(Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        Ok(Catalog::from_json(&body)?)
    }
}

pub fn catalog_source_for(location: &str, client: Client) -> Box<dyn CatalogSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpCatalogSource::new(location.to_string(), client))
    } else {
        Box::new(FileCatalogSource::new(location))
    }
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    #[serde(rename = "responseData")]
    response_data: Option<TranslationResponseData>,
}

#[derive(Debug, Deserialize)]
struct TranslationResponseData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

#[derive(Clone)]
pub struct HttpTranslator {
    endpoint: String,
    client: Client,
}

impl HttpTranslator {
    pub fn new(endpoint: String, client: Client) -> Self {
        Self { endpoint, client }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError> {
        let langpair = format!("{}|{}", source, target);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", text),
                ("source", source),
                ("target", target),
                ("langpair", langpair.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslateError::Status(response.status().as_u16()));
        }

        let data = response.json::<TranslationResponse>().await?;
        data.translated_text
            .or_else(|| data.response_data.and_then(|d| d.translated_text))
            .filter(|t| !t.trim().is_empty())
            .ok_or(TranslateError::MissingText)
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
