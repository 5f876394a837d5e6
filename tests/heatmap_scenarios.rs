//! End-to-end properties of the scale → color → legend pipeline.

use tempgrid::color::{bucket_to_color, ColorRamp};
use tempgrid::config::Config;
use tempgrid::data::{Dataset, VarianceRecord};
use tempgrid::grid::{build_cells, format_temp};
use tempgrid::legend::{BreakpointTable, Legend, LegendLayout};
use tempgrid::render::build_heatmap;
use tempgrid::scale::{CellSize, ChartLayout, ScaleSet};

/// Deterministic, roughly seasonal dataset spanning several decades.
fn synthetic(years: std::ops::RangeInclusive<i32>) -> Dataset {
    let mut records = Vec::new();
    for year in years {
        for month in 1..=12u8 {
            let trend = (year - 1900) as f64 * 0.01;
            let season = ((month as f64) * 0.5).sin() * 0.8;
            let wobble = ((year * 31 + month as i32 * 7) % 13) as f64 / 13.0 - 0.5;
            records.push(VarianceRecord::new(year, month, trend + season + wobble));
        }
    }
    Dataset::new(8.66, records)
}

#[test]
fn two_record_scenario() {
    let ds = Dataset::new(
        8.0,
        vec![
            VarianceRecord::new(1900, 1, -0.5),
            VarianceRecord::new(2000, 1, 1.2),
        ],
    );
    let cfg = Config::default();
    let heatmap = build_heatmap(&ds, &cfg).unwrap();

    assert_eq!(heatmap.cells.len(), 2);
    assert_eq!(heatmap.scales.x.domain, (1900.0, 2000.0));
    assert_eq!(heatmap.scales.bucket_count(), 9);
    let b_cold = heatmap.scales.color.bucket(-0.5);
    let b_warm = heatmap.scales.color.bucket(1.2);
    assert!(b_cold < b_warm);
    assert_eq!(heatmap.bucket_counts(), vec![1, 0, 0, 0, 0, 0, 0, 0, 1]);
}

#[test]
fn constant_variance_is_well_defined() {
    let ds = Dataset::new(
        8.0,
        vec![
            VarianceRecord::new(1900, 1, 0.0),
            VarianceRecord::new(1900, 2, 0.0),
            VarianceRecord::new(1901, 3, 0.0),
        ],
    );
    let heatmap = build_heatmap(&ds, &Config::default()).unwrap();
    assert!(heatmap.scales.color.is_degenerate());
    for cell in &heatmap.cells {
        assert_eq!(cell.bucket, 4);
        assert_eq!(cell.color, bucket_to_color(4, 9));
        assert!(cell.x.is_finite() && cell.y.is_finite());
    }
    assert!(heatmap.legend.swatches.iter().all(|s| s.x.is_finite()));
}

#[test]
fn single_year_dataset() {
    let ds = Dataset::new(
        8.0,
        vec![
            VarianceRecord::new(1990, 1, -0.2),
            VarianceRecord::new(1990, 6, 0.4),
        ],
    );
    let heatmap = build_heatmap(&ds, &Config::default()).unwrap();
    // whole plot width for one column, plus the 1px overdraw
    assert_eq!(heatmap.scales.cell.width, 1041);
    assert_eq!(heatmap.cells[0].x, heatmap.cells[1].x);
}

#[test]
fn buckets_stay_in_range() {
    let ds = synthetic(1850..=2015);
    let scales = ScaleSet::build(&ds, ChartLayout::new(1200.0, 600.0), 9).unwrap();
    for r in &ds.records {
        assert!(scales.color.bucket(r.variance) < 9);
    }
    let cells = build_cells(&ds, &scales, &ColorRamp::new(9));
    assert_eq!(cells.len(), ds.records.len());
    for cell in &cells {
        assert!(cell.bucket < 9, "bucket {} out of range", cell.bucket);
        assert_eq!(cell.color, bucket_to_color(cell.bucket, 9));
    }
    // the extremes land in the end buckets
    assert!(cells.iter().any(|c| c.bucket == 0));
    assert!(cells.iter().any(|c| c.bucket == 8));
}

#[test]
fn legend_colors_match_chart_colors() {
    let ds = synthetic(1900..=1960);
    let ramp = ColorRamp::new(9);
    let scales = ScaleSet::build(&ds, ChartLayout::new(1200.0, 600.0), 9).unwrap();
    let cells = build_cells(&ds, &scales, &ramp);
    let legend = Legend::build(
        &ds,
        LegendLayout::new(1200.0, 120.0),
        &BreakpointTable::default(),
        &ramp,
    )
    .unwrap();

    for cell in &cells {
        let swatch = &legend.swatches[cell.bucket];
        assert_eq!(swatch.color, cell.color);
        // the cell's temperature lies in that swatch's interval (up to rounding)
        assert!(cell.temperature >= swatch.start - 1e-9);
        assert!(cell.temperature <= swatch.end + 1e-9);
    }
}

#[test]
fn tooltip_temperature_round_trip() {
    let ds = synthetic(1900..=1905);
    let heatmap = build_heatmap(&ds, &Config::default()).unwrap();
    for (cell, r) in heatmap.cells.iter().zip(&ds.records) {
        let expected = format_temp(ds.base_temperature + r.variance);
        let parts: Vec<&str> = cell.tooltip.split("<br>").collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], format!("{}°C", expected));
        assert_eq!(parts[2], format!("{}°C", format_temp(r.variance)));
    }
}

#[test]
fn cell_sizes_positive_across_spans() {
    for span in [1u32, 2, 12, 101, 263, 1000, 5000] {
        for (w, h) in [(300.0, 200.0), (1200.0, 600.0), (1920.0, 1080.0)] {
            let cell = CellSize::compute(&ChartLayout::new(w, h), span);
            assert!(cell.width >= 1, "span {} width {}", span, w);
            assert!(cell.height >= 1, "span {} height {}", span, h);
        }
    }
}
