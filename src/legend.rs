//! Color legend: one swatch per bucket laid along a temperature axis.
//!
//! The legend width steps down through a breakpoint table, evaluated once
//! when the legend is built. Later container resizes are not tracked.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::color::{ColorRamp, Hsl};
use crate::data::Dataset;
use crate::grid::format_temp;
use crate::scale::{LinearScale, Padding};

pub const SWATCH_HEIGHT: f64 = 20.0;
const SWATCH_OFFSET: f64 = 70.0;
const AXIS_OFFSET: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakpoint {
    /// Applies when the container is narrower than this.
    pub below: f64,
    pub divisor: f64,
}

/// Container width → divisor for the legend's usable width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakpointTable {
    steps: Vec<Breakpoint>,
    fallback: f64,
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self::new(
            vec![
                Breakpoint {
                    below: 500.0,
                    divisor: 1.0,
                },
                Breakpoint {
                    below: 800.0,
                    divisor: 2.0,
                },
            ],
            4.0,
        )
    }
}

impl BreakpointTable {
    /// Steps are sorted ascending by `below`.
    pub fn new(mut steps: Vec<Breakpoint>, fallback: f64) -> Self {
        steps.sort_by(|a, b| a.below.total_cmp(&b.below));
        Self { steps, fallback }
    }

    pub fn divisor(&self, width: f64) -> f64 {
        self.steps
            .iter()
            .find(|s| width < s.below)
            .map(|s| s.divisor)
            .unwrap_or(self.fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendLayout {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
}

impl LegendLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding: Padding::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Swatch {
    pub index: usize,
    /// Temperature interval covered, `[start, end)`.
    pub start: f64,
    pub end: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Hsl,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendTick {
    pub value: f64,
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub layout: LegendLayout,
    pub min_t: f64,
    pub max_t: f64,
    pub step: f64,
    pub scale: LinearScale,
    pub axis_y: f64,
    pub swatches: Vec<Swatch>,
    pub ticks: Vec<LegendTick>,
}

impl Legend {
    pub fn build(
        dataset: &Dataset,
        layout: LegendLayout,
        breakpoints: &BreakpointTable,
        ramp: &ColorRamp,
    ) -> Result<Self> {
        let t = dataset
            .temperature_extent()
            .ok_or_else(|| anyhow!("cannot build a legend for an empty dataset"))?;
        let n = ramp.len();
        let step = t.width() / n as f64;

        let p = layout.padding;
        let divisor = breakpoints.divisor(layout.width);
        let range_end = ((layout.width - p.right) / divisor).floor();
        let scale = LinearScale::new((t.min, t.max), (p.left, range_end));
        let swatch_width = (range_end - p.left) / n as f64;

        let swatches = (0..n)
            .map(|i| {
                let start = t.min + i as f64 * step;
                Swatch {
                    index: i,
                    start,
                    end: start + step,
                    x: scale.apply(start),
                    y: layout.height - SWATCH_OFFSET,
                    width: swatch_width,
                    height: SWATCH_HEIGHT,
                    color: ramp.color(i),
                }
            })
            .collect();

        let ticks = (0..=n)
            .map(|i| {
                let value = t.min + i as f64 * step;
                LegendTick {
                    value,
                    x: scale.apply(value),
                    label: format_temp(value),
                }
            })
            .collect();

        Ok(Self {
            layout,
            min_t: t.min,
            max_t: t.max,
            step,
            scale,
            axis_y: layout.height - AXIS_OFFSET,
            swatches,
            ticks,
        })
    }

    /// Swatch whose interval holds `temperature`; the top edge belongs to
    /// the last swatch.
    pub fn swatch_for(&self, temperature: f64) -> Option<&Swatch> {
        if self.swatches.is_empty() {
            return None;
        }
        if self.step == 0.0 {
            return self.swatches.get((self.swatches.len() - 1) / 2);
        }
        let raw = ((temperature - self.min_t) / self.step).floor();
        let idx = raw.clamp(0.0, (self.swatches.len() - 1) as f64) as usize;
        self.swatches.get(idx)
    }
}
