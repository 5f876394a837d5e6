//! Per-record cell geometry, color and tooltip content.

use chrono::Month;
use serde::Serialize;

use crate::color::{ColorRamp, Hsl};
use crate::data::{Dataset, VarianceRecord};
use crate::scale::ScaleSet;

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// English month name for a zero-based month index.
pub fn month_name(month_index: usize) -> &'static str {
    MONTHS.get(month_index).map(|m| m.name()).unwrap_or("")
}

/// One decimal place, the way every temperature is shown to the reader.
///
/// Rounds on the exact binary value with ties away from zero (0.25 →
/// "0.3"), so the output matches JavaScript's `toFixed(1)`.
pub fn format_temp(value: f64) -> String {
    if !value.is_finite() || value.abs() >= 1e21 {
        return value.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let tenths = round_tenths(value.abs());
    format!("{}{}.{}", sign, tenths / 10, tenths % 10)
}

/// `round(x * 10)` for finite `0 <= x < 1e21`, computed from the exact
/// mantissa/exponent so halfway cases are real ties.
fn round_tenths(x: f64) -> u128 {
    let bits = x.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let frac = bits & ((1u64 << 52) - 1);
    let (mantissa, exp) = if exp_bits == 0 {
        (frac, -1074)
    } else {
        (frac | (1u64 << 52), exp_bits - 1075)
    };
    let scaled = u128::from(mantissa) * 10;
    if exp >= 0 {
        return scaled << exp;
    }
    let shift = exp.unsigned_abs();
    // scaled < 2^57, so anything shifted this far is below one half
    if shift >= 64 {
        return 0;
    }
    let q = scaled >> shift;
    let r = scaled - (q << shift);
    if r >= 1u128 << (shift - 1) {
        q + 1
    } else {
        q
    }
}

/// `"<year> - <Month><br><temp>°C<br><variance>°C"`
pub fn tooltip_text(year: i32, month_index: usize, temperature: f64, variance: f64) -> String {
    format!(
        "{} - {}<br>{}°C<br>{}°C",
        year,
        month_name(month_index),
        format_temp(temperature),
        format_temp(variance)
    )
}

/// Where the tooltip box goes relative to a hovered cell. Mixes pixel
/// offsets from the scales with rem offsets sized to the month name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TooltipPlacement {
    pub left_px: f64,
    pub left_rem: f64,
    pub top_px: f64,
    pub top_rem: f64,
    pub width_rem: u32,
}

impl TooltipPlacement {
    pub fn for_record(scales: &ScaleSet, record: &VarianceRecord) -> Self {
        let name_len = month_name(record.month_index()).len() as f64;
        let width_rem = (5.0 + name_len / 2.0).floor();
        Self {
            left_px: scales.x.apply(f64::from(record.year) - 1.0),
            left_rem: width_rem / 2.0,
            top_px: scales.y.position(record.month_index()) - 8.0 * 2.0 - 28.0,
            top_rem: 3.0,
            width_rem: width_rem as u32,
        }
    }

    pub fn css_left(&self) -> String {
        format!("calc({}px - {}rem)", self.left_px, self.left_rem)
    }

    pub fn css_top(&self) -> String {
        format!("calc({}px - {}rem)", self.top_px, self.top_rem)
    }

    pub fn css_width(&self) -> String {
        format!("{}rem", self.width_rem)
    }
}

/// Derived per record; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    pub width: u32,
    pub height: u32,
    pub bucket: usize,
    pub color: Hsl,
    pub year: i32,
    pub month_index: usize,
    pub temperature: f64,
    pub variance: f64,
    pub tooltip: String,
    pub placement: TooltipPlacement,
}

impl Cell {
    pub fn from_record(
        dataset: &Dataset,
        scales: &ScaleSet,
        ramp: &ColorRamp,
        record: &VarianceRecord,
    ) -> Self {
        let month_index = record.month_index();
        let temperature = dataset.temperature(record);
        let bucket = scales.color.bucket(record.variance);
        let half_height = f64::from(scales.cell.height) / 2.0;
        Self {
            x: scales.x.apply(f64::from(record.year)),
            y: (scales.y.position(month_index) - half_height).floor(),
            width: scales.cell.width,
            height: scales.cell.height,
            bucket,
            color: ramp.color(bucket),
            year: record.year,
            month_index,
            temperature,
            variance: record.variance,
            tooltip: tooltip_text(record.year, month_index, temperature, record.variance),
            placement: TooltipPlacement::for_record(scales, record),
        }
    }
}

pub fn build_cells(dataset: &Dataset, scales: &ScaleSet, ramp: &ColorRamp) -> Vec<Cell> {
    dataset
        .records
        .iter()
        .map(|r| Cell::from_record(dataset, scales, ramp, r))
        .collect()
}
