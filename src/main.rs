use anyhow::Result;
use serde_json::json;

use tempgrid::config::Config;
use tempgrid::data::build_manifest;
use tempgrid::feed::{self, source_from_config};
use tempgrid::logging::{log, log_dataset, log_render, obj, v_str, Domain, Level};
use tempgrid::render::build_heatmap;
use tempgrid::render::page::write_page;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env().with_args(std::env::args());
    // A bad DATA_URL is logged by source_from_config.
    let source = match source_from_config(&cfg) {
        Ok(source) => source,
        Err(_) => std::process::exit(2),
    };
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("source", v_str(&source.describe())),
            ("out_path", v_str(&cfg.out_path.display().to_string())),
            ("buckets", json!(cfg.buckets)),
            ("chart", json!([cfg.chart_width, cfg.chart_height])),
            ("legend", json!([cfg.legend_width, cfg.legend_height])),
        ]),
    );

    // Already logged by the loader; nothing is rendered on failure.
    let loaded = match feed::load(source.as_ref()).await {
        Ok(loaded) => loaded,
        Err(_) => std::process::exit(1),
    };

    let manifest = build_manifest(&loaded.dataset, &loaded.raw, &loaded.source, cfg.buckets);
    log_dataset(
        &loaded.source,
        loaded.dataset.records.len(),
        loaded.dataset.base_temperature,
        &manifest.warnings,
    );

    let heatmap = build_heatmap(&loaded.dataset, &cfg)?;
    write_page(&cfg.out_path, &heatmap.html)?;
    log_render(
        &cfg.out_path.display().to_string(),
        heatmap.cells.len(),
        &heatmap.bucket_counts(),
        heatmap.html.len(),
    );
    Ok(())
}
