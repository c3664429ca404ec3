//! Single-channel waveform snapshots
//!
//! Samples are at most 16 bits wide and travel packed two per word.
//! A charge event has a fixed frame length; a light event carries its own
//! packed word count.

use crate::bits::{pack, packed_len, unpack, unpack_exact};
use crate::error::{DatamonError, Result};
use crate::fields;
use crate::metric::Metric;
use crate::profile::Profile;
use crate::wire::{deserialize_fields, serialize_fields, Schema, Word, WordReader};

/// One charge channel's frame
#[derive(Debug, Clone, PartialEq)]
pub struct TpcMonitorChargeEvent {
    channel_number: u32,
    num_samples: usize,
    charge_samples: Vec<Word>,
}

/// Scalar members of [`TpcMonitorChargeEvent`]
pub const CHARGE_SCHEMA: Schema<TpcMonitorChargeEvent> =
    Schema::new(fields!(TpcMonitorChargeEvent { channel_number: u32 }));

impl Default for TpcMonitorChargeEvent {
    fn default() -> Self {
        Self::new(&Profile::default())
    }
}

impl TpcMonitorChargeEvent {
    /// Empty frame of `profile.num_charge_samples` samples
    pub fn new(profile: &Profile) -> Self {
        Self {
            channel_number: 0,
            num_samples: profile.num_charge_samples,
            charge_samples: vec![0; packed_len(profile.num_charge_samples)],
        }
    }

    pub fn channel_number(&self) -> u32 {
        self.channel_number
    }

    pub fn set_channel_number(&mut self, channel: u32) {
        self.channel_number = channel;
    }

    /// Samples per frame
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Pack a frame; a short frame leaves the tail zeroed
    pub fn set_charge_samples(&mut self, samples: &[u32]) -> Result<()> {
        if samples.len() > self.num_samples {
            return Err(DatamonError::IndexOutOfRange {
                index: samples.len() - 1,
                bound: self.num_samples,
            });
        }
        let packed = pack(samples);
        self.charge_samples.fill(0);
        self.charge_samples[..packed.len()].copy_from_slice(&packed);
        Ok(())
    }

    /// Unpacked frame, `num_samples` long
    pub fn charge_samples(&self) -> Vec<u32> {
        unpack_exact(&self.charge_samples, self.num_samples)
    }

    /// Packed words as they travel on the wire
    pub fn packed_samples(&self) -> &[Word] {
        &self.charge_samples
    }
}

impl Metric for TpcMonitorChargeEvent {
    const NAME: &'static str = "TpcMonitorChargeEvent";

    fn wire_len(&self) -> usize {
        CHARGE_SCHEMA.len() + self.charge_samples.len()
    }

    fn serialize_into(&self, out: &mut Vec<Word>) {
        out.reserve(self.wire_len());
        serialize_fields(&CHARGE_SCHEMA, self, out);
        out.extend_from_slice(&self.charge_samples);
    }

    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()> {
        reader.require(Self::NAME, self.wire_len())?;
        deserialize_fields(&CHARGE_SCHEMA, self, Self::NAME, reader)?;
        let words = reader.take(Self::NAME, self.charge_samples.len())?;
        self.charge_samples.copy_from_slice(words);
        Ok(())
    }

    fn clear(&mut self) {
        self.channel_number = 0;
        self.charge_samples.fill(0);
    }

    fn report(&self) -> String {
        let samples = self.charge_samples();
        let mut report = String::new();

        report.push_str("=== TpcMonitorChargeEvent ===\n");
        report.push_str(&format!("  channel_number: {}\n", self.channel_number));
        report.push_str(&format!(
            "  charge_samples ({}): {:?}\n",
            samples.len(),
            &samples[..samples.len().min(10)]
        ));

        report
    }
}

#[cfg(feature = "config-view")]
impl crate::view::DictView for TpcMonitorChargeEvent {
    fn to_dict(&self) -> crate::view::MetricDict {
        let mut dict = crate::view::MetricDict::new();
        crate::view::export_scalars(&CHARGE_SCHEMA, self, &mut dict);
        dict.insert("charge_samples".into(), self.charge_samples().into());
        dict
    }
}

/// One light channel's region of interest
///
/// The ROI length is not fixed, so the packed word count is sent ahead of
/// the samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TpcMonitorLightEvent {
    channel_number: u32,
    run_number: u32,
    file_number: u32,
    evt_number: u32,
    light_samples: Vec<Word>,
}

/// Scalar members of [`TpcMonitorLightEvent`], followed on the wire by the
/// packed word count
pub const LIGHT_SCHEMA: Schema<TpcMonitorLightEvent> = Schema::new(fields!(TpcMonitorLightEvent {
    channel_number: u32,
    run_number: u32,
    file_number: u32,
    evt_number: u32,
}));

impl TpcMonitorLightEvent {
    /// Empty event
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty event with room for the profile's nominal ROI
    ///
    /// Longer ROIs are still accepted; the length travels on the wire.
    pub fn with_profile(profile: &Profile) -> Self {
        Self {
            light_samples: Vec::with_capacity(packed_len(profile.num_light_samples)),
            ..Self::default()
        }
    }

    pub fn channel_number(&self) -> u32 {
        self.channel_number
    }

    pub fn set_channel_number(&mut self, channel: u32) {
        self.channel_number = channel;
    }

    pub fn run_number(&self) -> u32 {
        self.run_number
    }

    pub fn set_run_number(&mut self, run: u32) {
        self.run_number = run;
    }

    pub fn file_number(&self) -> u32 {
        self.file_number
    }

    pub fn set_file_number(&mut self, file: u32) {
        self.file_number = file;
    }

    pub fn evt_number(&self) -> u32 {
        self.evt_number
    }

    pub fn set_evt_number(&mut self, evt: u32) {
        self.evt_number = evt;
    }

    /// Packed word count, as sent on the wire
    pub fn num_samples(&self) -> usize {
        self.light_samples.len()
    }

    /// Pack an ROI of any length
    pub fn set_light_samples(&mut self, roi: &[u32]) {
        self.light_samples = pack(roi);
    }

    /// Unpacked ROI; an odd-length ROI comes back with a trailing zero
    pub fn light_samples(&self) -> Vec<u32> {
        unpack(&self.light_samples)
    }

    pub fn packed_samples(&self) -> &[Word] {
        &self.light_samples
    }
}

impl Metric for TpcMonitorLightEvent {
    const NAME: &'static str = "TpcMonitorLightEvent";

    fn wire_len(&self) -> usize {
        LIGHT_SCHEMA.len() + 1 + self.light_samples.len()
    }

    fn serialize_into(&self, out: &mut Vec<Word>) {
        out.reserve(self.wire_len());
        serialize_fields(&LIGHT_SCHEMA, self, out);
        out.push(self.light_samples.len() as Word);
        out.extend_from_slice(&self.light_samples);
    }

    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()> {
        let mut probe = reader.clone();
        let header = probe.take(Self::NAME, LIGHT_SCHEMA.len())?;
        let num_samples = probe.next_word(Self::NAME)? as usize;
        let samples = probe.take(Self::NAME, num_samples)?;

        for (field, &word) in LIGHT_SCHEMA.fields().iter().zip(header) {
            (field.set)(self, word);
        }
        self.light_samples.clear();
        self.light_samples.extend_from_slice(samples);

        *reader = probe;
        Ok(())
    }

    fn clear(&mut self) {
        self.channel_number = 0;
        self.run_number = 0;
        self.file_number = 0;
        self.evt_number = 0;
        self.light_samples.clear();
    }

    fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== TpcMonitorLightEvent ===\n");
        report.push_str(&format!("  channel_number: {}\n", self.channel_number));
        report.push_str(&format!("  run_number: {}\n", self.run_number));
        report.push_str(&format!("  file_number: {}\n", self.file_number));
        report.push_str(&format!("  evt_number: {}\n", self.evt_number));
        report.push_str(&format!("  num_samples: {}\n", self.light_samples.len()));
        report.push_str(&format!("  light_samples: {:?}\n", self.light_samples()));

        report
    }
}

#[cfg(feature = "config-view")]
impl crate::view::DictView for TpcMonitorLightEvent {
    fn to_dict(&self) -> crate::view::MetricDict {
        let mut dict = crate::view::MetricDict::new();
        crate::view::export_scalars(&LIGHT_SCHEMA, self, &mut dict);
        dict.insert("num_samples".into(), self.light_samples.len().into());
        dict.insert("light_samples".into(), self.light_samples().into());
        dict
    }
}
