use serde_json::json;

use tempgrid::config::Config;
use tempgrid::data::build_manifest;
use tempgrid::feed::{self, source_from_config};
use tempgrid::logging::{log, obj, v_str, Domain, Level};
use tempgrid::scale::ScaleSet;

/// Prints a JSON manifest for the configured dataset without rendering it.
#[tokio::main]
async fn main() {
    let cfg = Config::from_env();
    let source = match source_from_config(&cfg) {
        Ok(s) => s,
        Err(_) => std::process::exit(2),
    };
    let loaded = match feed::load(source.as_ref()).await {
        Ok(l) => l,
        Err(_) => std::process::exit(1),
    };

    let manifest = build_manifest(&loaded.dataset, &loaded.raw, &loaded.source, cfg.buckets);
    let layout = ScaleSet::build(&loaded.dataset, cfg.chart_layout(), cfg.buckets)
        .map(|s| json!({ "cell": s.cell, "x_range": s.x.range, "thresholds": s.color.thresholds() }))
        .unwrap_or(serde_json::Value::Null);
    let payload = json!({
        "manifest": manifest,
        "layout": layout,
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(text) => println!("{}", text),
        Err(err) => {
            log(
                Level::Error,
                Domain::System,
                "serialize_error",
                obj(&[("msg", v_str(&err.to_string()))]),
            );
            std::process::exit(3);
        }
    }
}
