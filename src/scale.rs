//! Axis and color scales derived from dataset extents.
//!
//! Scales are small immutable values; evaluation is pure.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::data::{Dataset, Extent, MONTHS_PER_YEAR};

pub const DEFAULT_BUCKETS: usize = 9;

/// Continuous → continuous linear map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps `x` into the range. A zero-width domain maps everything to
    /// the middle of the range.
    pub fn apply(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (x - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Roughly `count` human-friendly ticks (multiples of 1, 2 or 5 × 10^k)
    /// inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        nice_ticks(d0.min(d1), d0.max(d1), count as f64)
    }
}

fn tick_spec(start: f64, stop: f64, count: f64) -> (i64, i64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    // Negative `inc` means "divide by -inc"; keeps sub-unit steps exact.
    let (i1, i2, inc) = if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        let mut i1 = (start * inv).round() as i64;
        let mut i2 = (stop * inv).round() as i64;
        if (i1 as f64) / inv < start {
            i1 += 1;
        }
        if (i2 as f64) / inv > stop {
            i2 -= 1;
        }
        (i1, i2, -inv)
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round() as i64;
        let mut i2 = (stop / inc).round() as i64;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
        (i1, i2, inc)
    };
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

fn nice_ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if count <= 0.0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (i1, i2, inc) = tick_spec(start, stop, count);
    if i2 < i1 || !inc.is_finite() {
        return Vec::new();
    }
    (i1..=i2)
        .map(|i| {
            if inc < 0.0 {
                i as f64 / -inc
            } else {
                i as f64 * inc
            }
        })
        .collect()
}

/// Continuous → bucket index in `[0, n)` with equal-width buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantizeScale {
    pub domain: (f64, f64),
    pub buckets: usize,
    thresholds: Vec<f64>,
}

impl QuantizeScale {
    pub fn new(min: f64, max: f64, buckets: usize) -> Self {
        let n = buckets.max(1);
        let last = (n - 1) as f64;
        let thresholds = (0..n - 1)
            .map(|i| {
                let i = i as f64;
                ((i + 1.0) * max - (i - last) * min) / (last + 1.0)
            })
            .collect();
        Self {
            domain: (min, max),
            buckets: n,
            thresholds,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.domain.0 == self.domain.1
    }

    /// Bucket for `x`. A value on a threshold goes to the upper bucket;
    /// values outside the domain clamp to the end buckets. A zero-width
    /// domain sends everything to the neutral middle bucket.
    pub fn bucket(&self, x: f64) -> usize {
        if self.is_degenerate() {
            return (self.buckets - 1) / 2;
        }
        self.thresholds.partition_point(|t| *t <= x)
    }

    /// `[lo, hi)` interval of the domain that lands in `bucket`.
    pub fn bucket_bounds(&self, bucket: usize) -> (f64, f64) {
        let (min, max) = self.domain;
        let b = bucket.min(self.buckets - 1);
        let lo = if b == 0 { min } else { self.thresholds[b - 1] };
        let hi = if b == self.buckets - 1 {
            max
        } else {
            self.thresholds[b]
        };
        (lo, hi)
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 60.0,
            bottom: 120.0,
            left: 100.0,
        }
    }
}

/// Canvas size plus padding, i.e. what the chart container reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
}

impl ChartLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding: Padding::default(),
        }
    }

    pub fn plot_width(&self) -> f64 {
        self.width - self.padding.left - self.padding.right
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.padding.top - self.padding.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    /// The +1 / +3 pixel overdraw closes the hairline gaps that flooring
    /// leaves between neighbouring cells. Never smaller than one pixel.
    pub fn compute(layout: &ChartLayout, year_span: u32) -> Self {
        let cols = f64::from(year_span.max(1));
        let rows = f64::from(MONTHS_PER_YEAR);
        let width = (layout.plot_width() / cols + 1.0).floor();
        let height = (layout.plot_height() / rows + 3.0).floor();
        Self {
            width: width.max(1.0) as u32,
            height: height.max(1.0) as u32,
        }
    }
}

/// Month index (0 = January) → vertical pixel position of the row center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthScale {
    linear: LinearScale,
}

impl MonthScale {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self {
            linear: LinearScale::new((0.0, f64::from(MONTHS_PER_YEAR - 1)), (top, bottom)),
        }
    }

    pub fn position(&self, month_index: usize) -> f64 {
        self.linear.apply(month_index as f64)
    }

    pub fn linear(&self) -> &LinearScale {
        &self.linear
    }
}

/// Everything the grid needs to place and color a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleSet {
    pub layout: ChartLayout,
    pub years: Extent<i32>,
    pub x: LinearScale,
    pub y: MonthScale,
    pub color: QuantizeScale,
    pub cell: CellSize,
}

impl ScaleSet {
    pub fn build(dataset: &Dataset, layout: ChartLayout, buckets: usize) -> Result<Self> {
        let years = dataset
            .year_extent()
            .ok_or_else(|| anyhow!("cannot build scales for an empty dataset"))?;
        let variance = dataset
            .variance_extent()
            .ok_or_else(|| anyhow!("cannot build scales for an empty dataset"))?;

        let p = layout.padding;
        let x = LinearScale::new(
            (f64::from(years.min), f64::from(years.max)),
            (p.left, layout.width - p.right),
        );
        let y = MonthScale::new(p.top, layout.height - p.bottom);
        let color = QuantizeScale::new(variance.min, variance.max, buckets);
        let cell = CellSize::compute(&layout, years.span());

        Ok(Self {
            layout,
            years,
            x,
            y,
            color,
            cell,
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.color.buckets
    }
}
