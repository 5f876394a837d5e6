use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::Config;
use crate::data::Dataset;
use crate::logging::{log_config_error, log_fetch, log_fetch_failure};

pub mod retry;

use retry::{is_retryable_http_error, is_retryable_network_error, retry_async, RetryConfig};

/// Anything that goes wrong between asking for the dataset and holding a
/// validated `Dataset`.
#[derive(Debug)]
pub enum FetchFailure {
    Network(reqwest::Error),
    Status(u16),
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl FetchFailure {
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchFailure::Network(e) => is_retryable_network_error(e),
            FetchFailure::Status(code) => is_retryable_http_error(*code),
            _ => false,
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Network(e) => write!(f, "network error: {}", e),
            FetchFailure::Status(code) => write!(f, "unexpected HTTP status {}", code),
            FetchFailure::Io(e) => write!(f, "read error: {}", e),
            FetchFailure::Parse(e) => write!(f, "malformed dataset JSON: {}", e),
            FetchFailure::Invalid(msg) => write!(f, "invalid dataset: {}", msg),
        }
    }
}

impl std::error::Error for FetchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchFailure::Network(e) => Some(e),
            FetchFailure::Io(e) => Some(e),
            FetchFailure::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Supplies the raw dataset bytes.
#[async_trait]
pub trait DataSource {
    fn describe(&self) -> String;
    async fn fetch_raw(&self) -> Result<Vec<u8>, FetchFailure>;
}

pub struct HttpSource {
    client: Client,
    url: Url,
    retry: RetryConfig,
}

impl HttpSource {
    pub fn new(url: Url, timeout_secs: u64, retry: RetryConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
            url,
            retry,
        }
    }

    async fn get_once(&self) -> Result<Vec<u8>, FetchFailure> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(FetchFailure::Network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }
        let body = resp.bytes().await.map_err(FetchFailure::Network)?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch_raw(&self) -> Result<Vec<u8>, FetchFailure> {
        retry_async(
            &self.retry,
            "fetch_dataset",
            || self.get_once(),
            FetchFailure::is_retryable,
        )
        .await
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_raw(&self) -> Result<Vec<u8>, FetchFailure> {
        std::fs::read(&self.path).map_err(FetchFailure::Io)
    }
}

/// `DATA_FILE` wins over `DATA_URL`. A bad URL is logged before it is returned.
pub fn source_from_config(cfg: &Config) -> Result<Box<dyn DataSource + Send + Sync>> {
    match &cfg.data_file {
        Some(path) => Ok(Box::new(FileSource::new(path.clone()))),
        None => {
            let url = cfg.data_url().map_err(|err| {
                log_config_error(&format!("{:#}", err));
                err
            })?;
            Ok(Box::new(HttpSource::new(
                url,
                cfg.fetch_timeout_secs,
                RetryConfig::with_retries(cfg.fetch_retries),
            )))
        }
    }
}

pub fn decode(raw: &[u8]) -> Result<Dataset, FetchFailure> {
    let dataset = Dataset::from_slice(raw).map_err(FetchFailure::Parse)?;
    dataset.validate().map_err(FetchFailure::Invalid)?;
    Ok(dataset)
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub source: String,
    pub raw: Vec<u8>,
    pub dataset: Dataset,
}

/// Fetch and decode in one step. Failures are logged once here.
pub async fn load(source: &(dyn DataSource + Send + Sync)) -> Result<LoadedDataset, FetchFailure> {
    let name = source.describe();
    let started = Instant::now();
    let result = match source.fetch_raw().await {
        Ok(raw) => {
            log_fetch(&name, raw.len(), started.elapsed().as_secs_f64() * 1000.0);
            decode(&raw).map(|dataset| LoadedDataset {
                source: name.clone(),
                raw,
                dataset,
            })
        }
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        log_fetch_failure(&name, &e.to_string());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(&'static str);

    #[async_trait]
    impl DataSource for StaticSource {
        fn describe(&self) -> String {
            "static".to_string()
        }

        async fn fetch_raw(&self) -> Result<Vec<u8>, FetchFailure> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn test_load_decodes() {
        let src = StaticSource(
            r#"{"baseTemperature":8.0,"monthlyVariance":[{"year":1900,"month":1,"variance":-0.5}]}"#,
        );
        let loaded = load(&src).await.unwrap();
        assert_eq!(loaded.source, "static");
        assert_eq!(loaded.dataset.records.len(), 1);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_json() {
        let src = StaticSource("{not json");
        let err = load(&src).await.unwrap_err();
        assert!(matches!(err, FetchFailure::Parse(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_records() {
        let src = StaticSource(r#"{"baseTemperature":8.0,"monthlyVariance":[]}"#);
        let err = load(&src).await.unwrap_err();
        assert!(matches!(err, FetchFailure::Invalid(_)));
        assert!(err.to_string().contains("no records"));
    }

    #[test]
    fn test_status_retry_classification() {
        assert!(FetchFailure::Status(503).is_retryable());
        assert!(!FetchFailure::Status(404).is_retryable());
        assert!(!FetchFailure::Invalid("x".to_string()).is_retryable());
    }

    #[test]
    fn test_source_selection() {
        let cfg = Config {
            data_file: Some(PathBuf::from("/tmp/data.json")),
            ..Config::default()
        };
        let src = source_from_config(&cfg).unwrap();
        assert_eq!(src.describe(), "/tmp/data.json");

        let src = source_from_config(&Config::default()).unwrap();
        assert!(src.describe().starts_with("https://raw.githubusercontent.com/"));
    }

    #[test]
    fn test_bad_data_url_is_config_error() {
        let cfg = Config {
            data_url: "not a url".to_string(),
            ..Config::default()
        };
        let err = source_from_config(&cfg).err().unwrap();
        assert!(format!("{:#}", err).contains("invalid DATA_URL"));

        // a data file bypasses the URL entirely
        let cfg = Config {
            data_url: "not a url".to_string(),
            data_file: Some(PathBuf::from("/tmp/data.json")),
            ..Config::default()
        };
        assert!(source_from_config(&cfg).is_ok());
    }
}
