//! Binned-count histogram
//!
//! Wire layout: `min, max, bin_count, below_range, above_range,
//! bins[0..bin_count)`. The histogram carries its own shape, so a decoder
//! does not need to know `bin_count` in advance.

use crate::error::{DatamonError, DecodeError, Result};
use crate::metric::Metric;
use crate::wire::{push_array, WireScalar, Word, WordReader};

/// Words before the bin array
const HEADER_WORDS: usize = 5;

/// Fixed-range histogram over `[min, max)`
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: i32,
    max: i32,
    bin_width: f64,
    bins: Vec<u32>,
    below_range: u32,
    above_range: u32,
}

impl Default for Histogram {
    /// One bin over `[0, 1)`, the placeholder shape used before decoding
    fn default() -> Self {
        Self {
            min: 0,
            max: 1,
            bin_width: 1.0,
            bins: vec![0],
            below_range: 0,
            above_range: 0,
        }
    }
}

/// Decoded header before it is committed
struct Shape {
    min: i32,
    max: i32,
    bin_count: usize,
    below_range: u32,
    above_range: u32,
}

impl Histogram {
    /// Create an empty histogram with `bin_count` equal bins over `[min, max)`
    pub fn new(min: i32, max: i32, bin_count: usize) -> Result<Self> {
        if max <= min || bin_count == 0 || bin_count > i32::MAX as usize {
            return Err(DatamonError::InvalidRange {
                min: min as i64,
                max: max as i64,
                bin_count: bin_count as i64,
            });
        }
        Ok(Self {
            min,
            max,
            bin_width: Self::width(min, max, bin_count),
            bins: vec![0; bin_count],
            below_range: 0,
            above_range: 0,
        })
    }

    fn width(min: i32, max: i32, bin_count: usize) -> f64 {
        (max as f64 - min as f64) / bin_count as f64
    }

    /// Count one value
    ///
    /// Exactly one of {a bin, below_range, above_range} is incremented.
    pub fn fill(&mut self, value: i32) {
        if value < self.min {
            self.below_range = self.below_range.saturating_add(1);
        } else if value >= self.max {
            self.above_range = self.above_range.saturating_add(1);
        } else {
            let offset = value as f64 - self.min as f64;
            let index = (offset / self.bin_width).floor() as usize;
            // Rounding in bin_width can push the last value one bin too far
            let index = index.min(self.bins.len() - 1);
            self.bins[index] = self.bins[index].saturating_add(1);
        }
    }

    /// Lower edge (inclusive)
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Upper edge (exclusive)
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Number of bins
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Derived bin width, `(max - min) / bin_count`
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Bin contents
    pub fn bins(&self) -> &[u32] {
        &self.bins
    }

    /// Values below `min`
    pub fn below_range(&self) -> u32 {
        self.below_range
    }

    /// Values at or above `max`
    pub fn above_range(&self) -> u32 {
        self.above_range
    }

    /// Total number of fills, including overflow
    pub fn entries(&self) -> u64 {
        self.bins.iter().map(|&b| b as u64).sum::<u64>()
            + self.below_range as u64
            + self.above_range as u64
    }

    /// `[low, high)` edges of bin `index`
    pub fn bin_edges(&self, index: usize) -> Option<(f64, f64)> {
        if index >= self.bins.len() {
            return None;
        }
        let low = self.min as f64 + index as f64 * self.bin_width;
        Some((low, low + self.bin_width))
    }

    /// Read and validate the five header words
    fn read_shape(reader: &mut WordReader<'_>) -> Result<Shape> {
        let header = reader.take(Self::NAME, HEADER_WORDS)?;
        let min = i32::from_word(header[0]);
        let max = i32::from_word(header[1]);
        let bin_count = i32::from_word(header[2]);
        if max <= min || bin_count <= 0 {
            return Err(DecodeError::InvalidRange {
                min: min as i64,
                max: max as i64,
                bin_count: bin_count as i64,
            }
            .into());
        }
        Ok(Shape {
            min,
            max,
            bin_count: bin_count as usize,
            below_range: header[3],
            above_range: header[4],
        })
    }

    /// Advance past one encoded histogram, validating it without decoding
    pub(crate) fn skip(reader: &mut WordReader<'_>) -> Result<()> {
        let shape = Self::read_shape(reader)?;
        reader.take(Self::NAME, shape.bin_count)?;
        Ok(())
    }
}

impl Metric for Histogram {
    const NAME: &'static str = "Histogram";

    fn wire_len(&self) -> usize {
        HEADER_WORDS + self.bins.len()
    }

    fn serialize_into(&self, out: &mut Vec<Word>) {
        out.reserve(self.wire_len());
        out.push(self.min.to_word());
        out.push(self.max.to_word());
        out.push((self.bins.len() as i32).to_word());
        out.push(self.below_range);
        out.push(self.above_range);
        push_array(out, &self.bins);
    }

    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()> {
        let mut probe = reader.clone();
        let shape = Self::read_shape(&mut probe)?;
        let bins = probe.take(Self::NAME, shape.bin_count)?;

        self.min = shape.min;
        self.max = shape.max;
        self.bin_width = Self::width(shape.min, shape.max, shape.bin_count);
        self.below_range = shape.below_range;
        self.above_range = shape.above_range;
        self.bins.clear();
        self.bins.extend_from_slice(bins);

        *reader = probe;
        Ok(())
    }

    fn clear(&mut self) {
        self.bins.fill(0);
        self.below_range = 0;
        self.above_range = 0;
    }

    fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("--- Histogram ---\n");
        report.push_str(&format!(
            "Range: [{}, {}), Bins: {}\n",
            self.min,
            self.max,
            self.bins.len()
        ));
        report.push_str(&format!("Values below range: {}\n", self.below_range));
        for (i, count) in self.bins.iter().enumerate() {
            let low = self.min as f64 + i as f64 * self.bin_width;
            report.push_str(&format!(
                "  Bin {} [{}, {}): {}\n",
                i,
                low,
                low + self.bin_width,
                count
            ));
        }
        report.push_str(&format!("Values above range: {}\n", self.above_range));

        report
    }
}

#[cfg(feature = "config-view")]
impl crate::view::DictView for Histogram {
    fn to_dict(&self) -> crate::view::MetricDict {
        let mut dict = crate::view::MetricDict::new();
        dict.insert("min_value".into(), self.min.into());
        dict.insert("max_value".into(), self.max.into());
        dict.insert("num_bins".into(), self.bins.len().into());
        dict.insert("bins".into(), self.bins.clone().into());
        dict.insert("below_range_count".into(), self.below_range.into());
        dict.insert("above_range_count".into(), self.above_range.into());
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fill_and_serialize() {
        let mut hist = Histogram::new(0, 10, 5).unwrap();
        hist.fill(0);
        hist.fill(9);
        hist.fill(10);
        hist.fill(-1);

        assert_eq!(hist.bins(), &[1, 0, 0, 0, 1]);
        assert_eq!(hist.serialize(), vec![0, 10, 5, 1, 1, 1, 0, 0, 0, 1]);
        assert_eq!(hist.entries(), 4);
    }

    #[test]
    fn test_boundaries() {
        let mut hist = Histogram::new(-3, 7, 4).unwrap();
        hist.fill(-3);
        assert_eq!(hist.bins()[0], 1);
        hist.fill(7);
        assert_eq!(hist.above_range(), 1);
        hist.fill(-4);
        assert_eq!(hist.below_range(), 1);
        hist.fill(6);
        assert_eq!(hist.bins()[3], 1);
    }

    #[test]
    fn test_bin_width_not_integral() {
        let mut hist = Histogram::new(1024, 4096, 16).unwrap();
        assert_relative_eq!(hist.bin_width(), 192.0);

        let mut hist3 = Histogram::new(0, 10, 3).unwrap();
        assert_relative_eq!(hist3.bin_width(), 10.0 / 3.0);
        hist3.fill(9);
        assert_eq!(hist3.bins(), &[0, 0, 1]);

        // Top edge of the last bin
        hist.fill(4095);
        assert_eq!(hist.bins()[15], 1);
        assert_eq!(hist.above_range(), 0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(matches!(
            Histogram::new(5, 5, 3),
            Err(DatamonError::InvalidRange { .. })
        ));
        assert!(matches!(
            Histogram::new(5, 1, 3),
            Err(DatamonError::InvalidRange { .. })
        ));
        assert!(matches!(
            Histogram::new(0, 10, 0),
            Err(DatamonError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_clear_keeps_shape() {
        let mut hist = Histogram::new(0, 8, 4).unwrap();
        for v in [-1, 0, 3, 8, 9] {
            hist.fill(v);
        }
        hist.clear();
        assert_eq!(hist.bins(), &[0, 0, 0, 0]);
        assert_eq!(hist.below_range(), 0);
        assert_eq!(hist.above_range(), 0);
        assert_eq!(hist.min(), 0);
        assert_eq!(hist.max(), 8);
        assert_eq!(hist.bin_count(), 4);
    }

    #[test]
    fn test_roundtrip_reshapes_target() {
        let mut source = Histogram::new(-100, 100, 8).unwrap();
        for v in (-120..120).step_by(7) {
            source.fill(v);
        }

        let mut target = Histogram::default();
        let words = source.serialize();
        let rest = target.deserialize(&words).unwrap();
        assert!(rest.is_empty());
        assert_eq!(target, source);
        assert_relative_eq!(target.bin_width(), 25.0);
    }

    #[test]
    fn test_deserialize_invalid_metadata() {
        let mut hist = Histogram::default();
        let err = hist.deserialize(&[10, 0, 5, 0, 0, 0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            DatamonError::Decode(DecodeError::InvalidRange { min: 10, max: 0, .. })
        ));

        // Negative bin count
        let err = hist.deserialize(&[0, 10, 0xFFFF_FFFF, 0, 0]).unwrap_err();
        assert!(matches!(err, DatamonError::Decode(DecodeError::InvalidRange { .. })));
        assert_eq!(hist, Histogram::default());
    }

    #[test]
    fn test_deserialize_truncated() {
        let mut hist = Histogram::default();
        assert!(hist.deserialize(&[0, 10, 5]).unwrap_err().is_truncated());

        // Header fine, bins short
        let err = hist.deserialize(&[0, 10, 5, 0, 0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            DatamonError::Decode(DecodeError::TruncatedInput {
                metric: "Histogram",
                needed: 5,
                available: 2
            })
        );
        assert_eq!(hist, Histogram::default());
    }

    #[test]
    fn test_bin_edges() {
        let hist = Histogram::new(0, 10, 5).unwrap();
        assert_eq!(hist.bin_edges(1), Some((2.0, 4.0)));
        assert_eq!(hist.bin_edges(5), None);
    }

    #[test]
    fn test_report() {
        let mut hist = Histogram::new(0, 10, 2).unwrap();
        hist.fill(3);
        let report = hist.report();
        assert!(report.contains("Range: [0, 10), Bins: 2"));
        assert!(report.contains("Bin 0 [0, 5): 1"));
    }
}
