pub mod chart;
pub mod page;
pub mod svg;

use anyhow::Result;
use serde_json::json;

use crate::color::ColorRamp;
use crate::config::Config;
use crate::data::Dataset;
use crate::grid::{build_cells, Cell};
use crate::legend::Legend;
use crate::logging::{log, obj, v_num, Domain, Level, ProfileScope};
use crate::scale::ScaleSet;

pub const TITLE: &str = "Monthly Global Land-Surface Temperature";

/// Everything derived from one dataset, plus the finished page.
#[derive(Debug, Clone)]
pub struct HeatMap {
    pub scales: ScaleSet,
    pub cells: Vec<Cell>,
    pub legend: Legend,
    pub html: String,
}

impl HeatMap {
    pub fn bucket_counts(&self) -> Vec<u64> {
        let mut counts = vec![0u64; self.scales.bucket_count()];
        for c in &self.cells {
            counts[c.bucket] += 1;
        }
        counts
    }
}

/// Scales, cells and legend in one pass, then the HTML page.
pub fn build_heatmap(dataset: &Dataset, cfg: &Config) -> Result<HeatMap> {
    let _scope = ProfileScope::new("render", "build_heatmap");

    let ramp = ColorRamp::new(cfg.buckets);
    let scales = ScaleSet::build(dataset, cfg.chart_layout(), cfg.buckets)?;
    log(
        Level::Debug,
        Domain::Scale,
        "scales_built",
        obj(&[
            ("year_min", json!(scales.years.min)),
            ("year_max", json!(scales.years.max)),
            ("variance_min", v_num(scales.color.domain.0)),
            ("variance_max", v_num(scales.color.domain.1)),
            ("degenerate", json!(scales.color.is_degenerate())),
            ("cell_width", json!(scales.cell.width)),
            ("cell_height", json!(scales.cell.height)),
        ]),
    );

    let cells = build_cells(dataset, &scales, &ramp);
    let legend = Legend::build(dataset, cfg.legend_layout(), &cfg.breakpoints, &ramp)?;

    let description = format!(
        "{} - {}: base temperature {}°C",
        scales.years.min, scales.years.max, dataset.base_temperature
    );
    let html = page::render_page(
        TITLE,
        &description,
        &chart::render_chart(&scales, &cells),
        &chart::render_legend(&legend),
    );

    Ok(HeatMap {
        scales,
        cells,
        legend,
        html,
    })
}
