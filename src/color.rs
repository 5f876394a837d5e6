//! Bucket → color mapping shared by chart cells and legend swatches.
//!
//! The ramp runs cold (hue 240, blue) through a bright neutral midpoint
//! (hue 120, lightness 100) to warm (hue ~0, red). Saturation is fixed at 80%.

use serde::Serialize;
use std::fmt;

pub const SATURATION_PCT: u8 = 80;
const COLD_HUE: f64 = 240.0;
const WARM_HUE: f64 = 60.0;
const HUE_SPAN: f64 = 120.0;
const NEUTRAL_HUE: i32 = 120;
const NEUTRAL_LIGHTNESS: u8 = 100;
const DEFAULT_LIGHTNESS: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hsl {
    pub hue: i32,
    pub lightness: u8,
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, SATURATION_PCT, self.lightness)
    }
}

/// Piecewise hue/lightness rule for `bucket` out of `bucket_count` buckets.
///
/// Buckets strictly below the midpoint are cold, the bucket at
/// `floor(mid)` is neutral, the rest are warm. With an even bucket count
/// the neutral branch is never reached.
pub fn bucket_to_color(bucket: usize, bucket_count: usize) -> Hsl {
    let n = bucket_count.max(1) as f64;
    let b = bucket as f64;
    let mid = (n - 1.0) / 2.0;
    let per_bucket = HUE_SPAN / n;

    if b < mid {
        Hsl {
            hue: (COLD_HUE - b * per_bucket).floor() as i32,
            lightness: DEFAULT_LIGHTNESS,
        }
    } else if b == mid.floor() {
        Hsl {
            hue: NEUTRAL_HUE,
            lightness: NEUTRAL_LIGHTNESS,
        }
    } else {
        Hsl {
            hue: (WARM_HUE - (b - mid) * per_bucket).floor() as i32,
            lightness: DEFAULT_LIGHTNESS,
        }
    }
}

/// Precomputed colors for every bucket. Chart and legend both read from
/// the same ramp.
#[derive(Debug, Clone)]
pub struct ColorRamp {
    colors: Vec<Hsl>,
}

impl ColorRamp {
    pub fn new(bucket_count: usize) -> Self {
        let n = bucket_count.max(1);
        Self {
            colors: (0..n).map(|b| bucket_to_color(b, n)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for `bucket`; indices past the end clamp to the warmest color.
    pub fn color(&self, bucket: usize) -> Hsl {
        let idx = bucket.min(self.colors.len() - 1);
        self.colors[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hsl> {
        self.colors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_bucket_ramp() {
        let hues: Vec<i32> = (0..9).map(|b| bucket_to_color(b, 9).hue).collect();
        assert_eq!(hues, vec![240, 226, 213, 200, 120, 46, 33, 20, 6]);
    }

    #[test]
    fn test_midpoint_is_neutral() {
        let c = bucket_to_color(4, 9);
        assert_eq!(c, Hsl { hue: 120, lightness: 100 });
        let c = bucket_to_color(2, 5);
        assert_eq!(c, Hsl { hue: 120, lightness: 100 });
    }

    #[test]
    fn test_extremes_are_opposite() {
        let cold = bucket_to_color(0, 9);
        let warm = bucket_to_color(8, 9);
        assert_eq!(cold.hue, 240);
        assert!(warm.hue < 10);
        assert_eq!(cold.lightness, 60);
        assert_eq!(warm.lightness, 60);
    }

    #[test]
    fn test_even_count_skips_neutral() {
        let colors: Vec<Hsl> = (0..4).map(|b| bucket_to_color(b, 4)).collect();
        assert!(colors.iter().all(|c| c.lightness == 60));
        assert_eq!(colors[1].hue, 210);
        assert_eq!(colors[2].hue, 45);
    }

    #[test]
    fn test_css_string() {
        assert_eq!(bucket_to_color(0, 9).to_string(), "hsl(240, 80%, 60%)");
        assert_eq!(bucket_to_color(4, 9).to_string(), "hsl(120, 80%, 100%)");
    }

    #[test]
    fn test_ramp_matches_function() {
        let ramp = ColorRamp::new(9);
        assert_eq!(ramp.len(), 9);
        for (b, c) in ramp.iter().enumerate() {
            assert_eq!(*c, bucket_to_color(b, 9));
        }
        assert_eq!(ramp.color(42), bucket_to_color(8, 9));
    }
}
