use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::scale::QuantizeScale;

pub const MONTHS_PER_YEAR: u8 = 12;

/// One month's deviation from the dataset's base temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceRecord {
    pub year: i32,
    /// Calendar month, 1 = January.
    pub month: u8,
    pub variance: f64,
}

impl VarianceRecord {
    pub fn new(year: i32, month: u8, variance: f64) -> Self {
        Self { year, month, variance }
    }

    /// Zero-based month index (0 = January).
    pub fn month_index(&self) -> usize {
        usize::from(self.month.saturating_sub(1))
    }
}

/// Wire shape: `{ "baseTemperature": f64, "monthlyVariance": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "baseTemperature")]
    pub base_temperature: f64,
    #[serde(rename = "monthlyVariance")]
    pub records: Vec<VarianceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent<T> {
    pub min: T,
    pub max: T,
}

impl Extent<f64> {
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

impl Extent<i32> {
    /// Number of distinct integers covered, inclusive of both ends.
    /// Saturates at `u32::MAX` for the full `i32` range.
    pub fn span(&self) -> u32 {
        let width = i64::from(self.max) - i64::from(self.min) + 1;
        u32::try_from(width.max(0)).unwrap_or(u32::MAX)
    }
}

fn extent_f64(values: impl Iterator<Item = f64>) -> Option<Extent<f64>> {
    values.fold(None, |acc, v| match acc {
        None => Some(Extent { min: v, max: v }),
        Some(e) => Some(Extent {
            min: e.min.min(v),
            max: e.max.max(v),
        }),
    })
}

impl Dataset {
    pub fn new(base_temperature: f64, records: Vec<VarianceRecord>) -> Self {
        Self {
            base_temperature,
            records,
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Checks the invariants every downstream computation relies on.
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_temperature.is_finite() {
            return Err(format!(
                "base temperature is not finite: {}",
                self.base_temperature
            ));
        }
        if self.records.is_empty() {
            return Err("dataset has no records".to_string());
        }
        for (i, r) in self.records.iter().enumerate() {
            if r.month < 1 || r.month > MONTHS_PER_YEAR {
                return Err(format!("record {}: month {} outside 1-12", i, r.month));
            }
            if !r.variance.is_finite() {
                return Err(format!("record {}: variance is not finite", i));
            }
        }
        Ok(())
    }

    /// Absolute temperature for a record.
    pub fn temperature(&self, record: &VarianceRecord) -> f64 {
        self.base_temperature + record.variance
    }

    pub fn year_extent(&self) -> Option<Extent<i32>> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some(Extent { min, max })
    }

    pub fn variance_extent(&self) -> Option<Extent<f64>> {
        extent_f64(self.records.iter().map(|r| r.variance))
    }

    pub fn temperature_extent(&self) -> Option<Extent<f64>> {
        extent_f64(self.records.iter().map(|r| self.temperature(r)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetManifest {
    pub source: String,
    pub hash_sha256: String,
    pub record_count: u64,
    pub base_temperature: f64,
    pub years: Option<Extent<i32>>,
    pub variance: Option<Extent<f64>>,
    pub temperature: Option<Extent<f64>>,
    /// (year, month) slots inside the year extent with no record.
    pub missing_slots: u64,
    /// Records sharing a (year, month) slot with an earlier record.
    pub duplicate_slots: u64,
    pub bucket_counts: Vec<u64>,
    pub warnings: Vec<String>,
    pub generated_at: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn build_manifest(
    dataset: &Dataset,
    raw: &[u8],
    source: &str,
    bucket_count: usize,
) -> DatasetManifest {
    let mut warnings = Vec::new();
    let years = dataset.year_extent();
    let variance = dataset.variance_extent();

    let mut seen = HashSet::new();
    let mut duplicate_slots = 0u64;
    for r in &dataset.records {
        if !seen.insert((r.year, r.month)) {
            duplicate_slots += 1;
        }
    }
    if duplicate_slots > 0 {
        warnings.push(format!("duplicate_slots: {}", duplicate_slots));
    }

    let missing_slots = years
        .map(|y| {
            let expected = u64::from(y.span()) * u64::from(MONTHS_PER_YEAR);
            expected.saturating_sub(seen.len() as u64)
        })
        .unwrap_or(0);
    if missing_slots > 0 {
        warnings.push(format!("missing_slots: {}", missing_slots));
    }

    let mut bucket_counts = vec![0u64; bucket_count.max(1)];
    if let Some(v) = variance {
        let quantize = QuantizeScale::new(v.min, v.max, bucket_count);
        if quantize.is_degenerate() {
            warnings.push("constant_variance".to_string());
        }
        for r in &dataset.records {
            bucket_counts[quantize.bucket(r.variance)] += 1;
        }
    }

    DatasetManifest {
        source: source.to_string(),
        hash_sha256: sha256_hex(raw),
        record_count: dataset.records.len() as u64,
        base_temperature: dataset.base_temperature,
        years,
        variance,
        temperature: dataset.temperature_extent(),
        missing_slots,
        duplicate_slots,
        bucket_counts,
        warnings,
        generated_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            8.0,
            vec![
                VarianceRecord::new(1900, 1, -0.5),
                VarianceRecord::new(2000, 1, 1.2),
            ],
        )
    }

    #[test]
    fn test_decodes_wire_shape() {
        let raw = br#"{"baseTemperature":8.66,"monthlyVariance":[{"year":1753,"month":1,"variance":-1.366}]}"#;
        let ds = Dataset::from_slice(raw).unwrap();
        assert_eq!(ds.base_temperature, 8.66);
        assert_eq!(ds.records, vec![VarianceRecord::new(1753, 1, -1.366)]);
        assert!(ds.validate().is_ok());
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let raw = br#"{"baseTemperature":8.66,"monthlyVariance":[{"year":1753,"variance":-1.3}]}"#;
        assert!(Dataset::from_slice(raw).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_month() {
        let ds = Dataset::new(8.0, vec![VarianceRecord::new(1900, 13, 0.0)]);
        let err = ds.validate().unwrap_err();
        assert!(err.contains("month 13"));
        let ds = Dataset::new(8.0, vec![VarianceRecord::new(1900, 0, 0.0)]);
        assert!(ds.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let ds = Dataset::new(8.0, vec![]);
        assert!(ds.validate().is_err());
        assert!(ds.year_extent().is_none());
        assert!(ds.variance_extent().is_none());
    }

    #[test]
    fn test_extents() {
        let ds = sample();
        assert_eq!(ds.year_extent(), Some(Extent { min: 1900, max: 2000 }));
        assert_eq!(ds.year_extent().unwrap().span(), 101);
        assert_eq!(ds.variance_extent(), Some(Extent { min: -0.5, max: 1.2 }));
        let t = ds.temperature_extent().unwrap();
        assert_eq!(t.min, 7.5);
        assert!((t.max - 9.2).abs() < 1e-12);
    }

    #[test]
    fn test_span_at_i32_limits() {
        assert_eq!(Extent { min: i32::MIN, max: i32::MAX }.span(), u32::MAX);
        assert_eq!(Extent { min: i32::MIN, max: 0 }.span(), 2_147_483_649);
        assert_eq!(Extent { min: 2000, max: 2000 }.span(), 1);
    }

    #[test]
    fn test_manifest_with_extreme_years() {
        let ds = Dataset::new(
            8.0,
            vec![
                VarianceRecord::new(i32::MIN, 1, -0.5),
                VarianceRecord::new(i32::MAX, 12, 0.5),
            ],
        );
        assert!(ds.validate().is_ok());
        let m = build_manifest(&ds, b"raw", "test", 9);
        assert_eq!(m.record_count, 2);
        assert_eq!(m.missing_slots, u64::from(u32::MAX) * 12 - 2);
    }

    #[test]
    fn test_manifest_counts() {
        let mut ds = sample();
        ds.records.push(VarianceRecord::new(2000, 1, 1.0));
        let m = build_manifest(&ds, b"raw", "test", 9);
        assert_eq!(m.record_count, 3);
        assert_eq!(m.duplicate_slots, 1);
        assert_eq!(m.missing_slots, 101 * 12 - 2);
        assert_eq!(m.bucket_counts.len(), 9);
        assert_eq!(m.bucket_counts.iter().sum::<u64>(), 3);
        assert_eq!(m.bucket_counts[0], 1);
        assert_eq!(m.bucket_counts[8], 1);
        assert_eq!(m.hash_sha256.len(), 64);
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5daae2223b00361a396177a9cb410ff61f20015a"
        );
    }
}
