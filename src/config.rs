use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

use crate::legend::{BreakpointTable, LegendLayout};
use crate::scale::{ChartLayout, DEFAULT_BUCKETS};

pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/freeCodeCamp/ProjectReferenceData/master/global-temperature.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_url: String,
    pub data_file: Option<PathBuf>,
    pub out_path: PathBuf,
    pub chart_width: f64,
    pub chart_height: f64,
    pub legend_width: f64,
    pub legend_height: f64,
    pub buckets: usize,
    pub breakpoints: BreakpointTable,
    pub fetch_timeout_secs: u64,
    pub fetch_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            data_file: None,
            out_path: PathBuf::from("heatmap.html"),
            chart_width: 1200.0,
            chart_height: 600.0,
            legend_width: 1200.0,
            legend_height: 120.0,
            buckets: DEFAULT_BUCKETS,
            breakpoints: BreakpointTable::default(),
            fetch_timeout_secs: 10,
            fetch_retries: 0,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            data_url: std::env::var("DATA_URL").unwrap_or(d.data_url),
            data_file: std::env::var("DATA_FILE").ok().map(PathBuf::from),
            out_path: std::env::var("OUT_PATH").map(PathBuf::from).unwrap_or(d.out_path),
            chart_width: env_parse("CHART_WIDTH").unwrap_or(d.chart_width),
            chart_height: env_parse("CHART_HEIGHT").unwrap_or(d.chart_height),
            legend_width: env_parse("LEGEND_WIDTH").unwrap_or(d.legend_width),
            legend_height: env_parse("LEGEND_HEIGHT").unwrap_or(d.legend_height),
            buckets: env_parse::<usize>("BUCKETS")
                .filter(|n| *n >= 1)
                .unwrap_or(d.buckets),
            breakpoints: d.breakpoints,
            fetch_timeout_secs: env_parse("FETCH_TIMEOUT_SECS").unwrap_or(d.fetch_timeout_secs),
            fetch_retries: env_parse("FETCH_RETRIES").unwrap_or(d.fetch_retries),
        }
    }

    /// First positional argument overrides `OUT_PATH`.
    pub fn with_args(mut self, mut args: impl Iterator<Item = String>) -> Self {
        if let Some(path) = args.nth(1) {
            self.out_path = PathBuf::from(path);
        }
        self
    }

    pub fn data_url(&self) -> Result<Url> {
        Url::parse(&self.data_url).with_context(|| format!("invalid DATA_URL: {}", self.data_url))
    }

    pub fn chart_layout(&self) -> ChartLayout {
        ChartLayout::new(self.chart_width, self.chart_height)
    }

    pub fn legend_layout(&self) -> LegendLayout {
        LegendLayout::new(self.legend_width, self.legend_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.buckets, 9);
        assert_eq!(cfg.fetch_retries, 0);
        assert!(cfg.data_url().is_ok());
        assert_eq!(cfg.chart_layout().plot_width(), 1040.0);
        assert_eq!(cfg.legend_layout().height, 120.0);
    }

    #[test]
    fn test_args_override_out_path() {
        let cfg = Config::default().with_args(
            vec!["tempgrid".to_string(), "out/chart.html".to_string()].into_iter(),
        );
        assert_eq!(cfg.out_path, PathBuf::from("out/chart.html"));
        let cfg = Config::default().with_args(vec!["tempgrid".to_string()].into_iter());
        assert_eq!(cfg.out_path, PathBuf::from("heatmap.html"));
    }

    #[test]
    fn test_bad_url_rejected() {
        let cfg = Config {
            data_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(cfg.data_url().is_err());
    }
}
