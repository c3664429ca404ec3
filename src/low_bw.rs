//! Low-bandwidth TPC summary
//!
//! Per-channel baseline, RMS and activity values, truncated to 16 bits and
//! packed two per word. Wire layout: `error_bit_word`, then the three charge
//! arrays, then the three light arrays, each `ceil(channels / 2)` words.

use crate::bits::{assign_bit, get_bit, packed_len, packed_sample, set_packed_sample, unpack_exact};
use crate::error::{DatamonError, Result};
use crate::fields;
use crate::metric::Metric;
use crate::profile::Profile;
use crate::tpc_monitor::ChannelClass;
use crate::wire::{deserialize_fields, serialize_fields, Schema, Word, WordReader};
use std::fmt;

/// One packed summary array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Summary {
    ChargeBaseline,
    ChargeRms,
    ChargeAvgNumHits,
    LightBaseline,
    LightRms,
    LightAvgNumRois,
}

impl Summary {
    /// Wire order
    pub const ALL: [Summary; 6] = [
        Summary::ChargeBaseline,
        Summary::ChargeRms,
        Summary::ChargeAvgNumHits,
        Summary::LightBaseline,
        Summary::LightRms,
        Summary::LightAvgNumRois,
    ];

    /// Channel class the array covers
    pub fn class(&self) -> ChannelClass {
        match self {
            Summary::ChargeBaseline | Summary::ChargeRms | Summary::ChargeAvgNumHits => {
                ChannelClass::Charge
            }
            _ => ChannelClass::Light,
        }
    }

    /// Key in reports and the dictionary view
    ///
    /// These are the keys ground tooling reads; the light ROI count is
    /// exported as `light_avg_num_hits`.
    pub fn name(&self) -> &'static str {
        match self {
            Summary::ChargeBaseline => "charge_baseline",
            Summary::ChargeRms => "charge_rms",
            Summary::ChargeAvgNumHits => "charge_avg_num_hits",
            Summary::LightBaseline => "light_baseline",
            Summary::LightRms => "light_rms",
            Summary::LightAvgNumRois => "light_avg_num_hits",
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Packed per-channel summary of the TPC
#[derive(Debug, Clone, PartialEq)]
pub struct LowBwTpcMonitor {
    error_bit_word: i32,
    num_charge_channels: usize,
    num_light_channels: usize,
    // Indexed by Summary discriminant
    packed: [Vec<Word>; 6],
}

/// Scalar members in wire order
pub const SCHEMA: Schema<LowBwTpcMonitor> = Schema::new(fields!(LowBwTpcMonitor {
    error_bit_word: i32,
}));

impl Default for LowBwTpcMonitor {
    fn default() -> Self {
        Self::new(&Profile::default())
    }
}

impl LowBwTpcMonitor {
    /// Zeroed summary sized by the profile's channel counts
    pub fn new(profile: &Profile) -> Self {
        let charge = vec![0; packed_len(profile.num_charge_channels)];
        let light = vec![0; packed_len(profile.num_light_channels)];
        Self {
            error_bit_word: 0,
            num_charge_channels: profile.num_charge_channels,
            num_light_channels: profile.num_light_channels,
            packed: [
                charge.clone(),
                charge.clone(),
                charge,
                light.clone(),
                light.clone(),
                light,
            ],
        }
    }

    /// Logical channel count of a class
    pub fn num_channels(&self, class: ChannelClass) -> usize {
        match class {
            ChannelClass::Charge => self.num_charge_channels,
            ChannelClass::Light => self.num_light_channels,
        }
    }

    fn check_channel(&self, summary: Summary, channel: usize) -> Result<()> {
        let bound = self.num_channels(summary.class());
        if channel >= bound {
            return Err(DatamonError::IndexOutOfRange {
                index: channel,
                bound,
            });
        }
        Ok(())
    }

    /// Store one channel's value (low 16 bits kept)
    pub fn set_value(&mut self, summary: Summary, channel: usize, value: u32) -> Result<()> {
        self.check_channel(summary, channel)?;
        set_packed_sample(&mut self.packed[summary as usize], channel, value)
    }

    /// One channel's value
    pub fn value(&self, summary: Summary, channel: usize) -> Result<u32> {
        self.check_channel(summary, channel)?;
        packed_sample(&self.packed[summary as usize], channel)
    }

    /// Store values for channels `0..values.len()`
    ///
    /// Fails without writing if more values are given than channels exist.
    pub fn set_values(&mut self, summary: Summary, values: &[u32]) -> Result<()> {
        let bound = self.num_channels(summary.class());
        if values.len() > bound {
            return Err(DatamonError::IndexOutOfRange {
                index: values.len() - 1,
                bound,
            });
        }
        let words = &mut self.packed[summary as usize];
        for (channel, &value) in values.iter().enumerate() {
            set_packed_sample(words, channel, value)?;
        }
        Ok(())
    }

    /// Unpacked values, one per channel
    pub fn values(&self, summary: Summary) -> Vec<u32> {
        unpack_exact(
            &self.packed[summary as usize],
            self.num_channels(summary.class()),
        )
    }

    /// Packed words as they travel on the wire
    pub fn packed(&self, summary: Summary) -> &[Word] {
        &self.packed[summary as usize]
    }

    pub fn set_charge_baseline(&mut self, channel: usize, value: u32) -> Result<()> {
        self.set_value(Summary::ChargeBaseline, channel, value)
    }

    pub fn set_charge_rms(&mut self, channel: usize, value: u32) -> Result<()> {
        self.set_value(Summary::ChargeRms, channel, value)
    }

    pub fn set_charge_avg_num_hits(&mut self, channel: usize, value: u32) -> Result<()> {
        self.set_value(Summary::ChargeAvgNumHits, channel, value)
    }

    pub fn set_light_baseline(&mut self, channel: usize, value: u32) -> Result<()> {
        self.set_value(Summary::LightBaseline, channel, value)
    }

    pub fn set_light_rms(&mut self, channel: usize, value: u32) -> Result<()> {
        self.set_value(Summary::LightRms, channel, value)
    }

    pub fn set_light_avg_num_rois(&mut self, channel: usize, value: u32) -> Result<()> {
        self.set_value(Summary::LightAvgNumRois, channel, value)
    }

    pub fn charge_baselines(&self) -> Vec<u32> {
        self.values(Summary::ChargeBaseline)
    }

    pub fn charge_rms(&self) -> Vec<u32> {
        self.values(Summary::ChargeRms)
    }

    pub fn charge_avg_num_hits(&self) -> Vec<u32> {
        self.values(Summary::ChargeAvgNumHits)
    }

    pub fn light_baselines(&self) -> Vec<u32> {
        self.values(Summary::LightBaseline)
    }

    pub fn light_rms(&self) -> Vec<u32> {
        self.values(Summary::LightRms)
    }

    pub fn light_avg_num_rois(&self) -> Vec<u32> {
        self.values(Summary::LightAvgNumRois)
    }

    /// Set or clear an error bit; out-of-range bits are logged and ignored
    pub fn set_error_bit(&mut self, bit: u32, active: bool) {
        let _ = assign_bit(&mut self.error_bit_word, bit, active);
    }

    pub fn error_bit(&self, bit: u32) -> Result<bool> {
        get_bit(self.error_bit_word, bit)
    }

    pub fn error_bit_word(&self) -> i32 {
        self.error_bit_word
    }
}

impl Metric for LowBwTpcMonitor {
    const NAME: &'static str = "LowBwTpcMonitor";

    fn wire_len(&self) -> usize {
        SCHEMA.len() + self.packed.iter().map(Vec::len).sum::<usize>()
    }

    fn serialize_into(&self, out: &mut Vec<Word>) {
        out.reserve(self.wire_len());
        serialize_fields(&SCHEMA, self, out);
        for words in &self.packed {
            out.extend_from_slice(words);
        }
    }

    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()> {
        reader.require(Self::NAME, self.wire_len())?;
        deserialize_fields(&SCHEMA, self, Self::NAME, reader)?;
        for words in self.packed.iter_mut() {
            let n = words.len();
            words.copy_from_slice(reader.take(Self::NAME, n)?);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.error_bit_word = 0;
        for words in self.packed.iter_mut() {
            words.fill(0);
        }
    }

    fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== LowBwTpcMonitor ===\n");
        report.push_str(&format!("  error_bit_word: {:032b}\n", self.error_bit_word));
        for summary in Summary::ALL {
            report.push_str(&format!("  {}: {:?}\n", summary, self.values(summary)));
        }

        report
    }
}

#[cfg(feature = "config-view")]
impl crate::view::DictView for LowBwTpcMonitor {
    fn to_dict(&self) -> crate::view::MetricDict {
        let mut dict = crate::view::MetricDict::new();
        crate::view::export_scalars(&SCHEMA, self, &mut dict);
        for summary in Summary::ALL {
            dict.insert(summary.name().into(), self.values(summary).into());
        }
        dict
    }
}
