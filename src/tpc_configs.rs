//! Trigger and ROI configuration sent from the ground
//!
//! Wire layout: fifteen scalar words (see [`SCHEMA`]), then
//! `prescale[num_prescales]`, `disc_threshold_0[num_light_channels]` and
//! `disc_threshold_1[num_light_channels]`.
//!
//! Only the cosmic multiplicity and summed-amplitude triggers are
//! configurable here; the beam-gated trigger parameters are not carried.

use crate::error::{DatamonError, Result};
use crate::fields;
use crate::metric::Metric;
use crate::profile::Profile;
use crate::wire::{deserialize_fields, push_array, serialize_fields, Schema, Word, WordReader};
use std::fmt;

const DEFAULT_ENABLE_BOTTOM: u32 = 0xFFFF;
const DEFAULT_NUM_ROI_WORDS: i32 = 30;
const DEFAULT_ROI_DEADTIME: i32 = 240;
const DEFAULT_FIFO_BLOCKSIZE: u32 = 0xFFFF;
const DEFAULT_DISC_THRESHOLD_0: i32 = 100;
const DEFAULT_DISC_THRESHOLD_1: i32 = 250;

/// Trigger source selected by `trigger_source`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    Light = 0,
    Software = 1,
    External = 2,
}

impl TriggerSource {
    /// Decode a trigger-source code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TriggerSource::Light),
            1 => Some(TriggerSource::Software),
            2 => Some(TriggerSource::External),
            _ => None,
        }
    }

    /// User-facing label
    pub fn label(&self) -> &'static str {
        match self {
            TriggerSource::Light => "light",
            TriggerSource::Software => "software",
            TriggerSource::External => "external",
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for a trigger-source code, `"unknown"` when unrecognised
pub fn to_trigger_source_string(code: i32) -> &'static str {
    TriggerSource::from_code(code).map_or("unknown", |s| s.label())
}

/// TPC trigger and ROI configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TpcConfigs {
    /// Summed peak amplitude of 5 adjacent channels
    summed_peak_thresh: i32,
    /// Adjacent 5-channel groups above the disc 1 threshold
    channel_multiplicity: i32,
    roi_delay_0: i32,
    roi_delay_1: i32,
    /// Samples before the disc 0 crossing included in the ROI
    roi_precount: i32,
    roi_peak_window: i32,
    enable_top: u32,
    enable_middle: u32,
    enable_bottom: u32,
    num_roi_words: i32,
    /// Enforced dead samples after an ROI
    roi_deadtime: i32,
    fifo_blocksize: u32,
    trigger_source: i32,
    software_trigger_rate_hz: i32,
    tpc_dead_time: i32,
    prescale: Vec<i32>,
    disc_threshold_0: Vec<i32>,
    disc_threshold_1: Vec<i32>,
}

/// Scalar members in wire order
pub const SCHEMA: Schema<TpcConfigs> = Schema::new(fields!(TpcConfigs {
    summed_peak_thresh: i32,
    channel_multiplicity: i32,
    roi_delay_0: i32,
    roi_delay_1: i32,
    roi_precount: i32,
    roi_peak_window: i32,
    enable_top: u32,
    enable_middle: u32,
    enable_bottom: u32,
    num_roi_words: i32,
    roi_deadtime: i32,
    fifo_blocksize: u32,
    trigger_source: i32,
    software_trigger_rate_hz: i32,
    tpc_dead_time: i32,
}));

impl Default for TpcConfigs {
    fn default() -> Self {
        Self::new(&Profile::default())
    }
}

impl TpcConfigs {
    /// Default configuration sized by the profile
    pub fn new(profile: &Profile) -> Self {
        let mut configs = Self {
            summed_peak_thresh: 0,
            channel_multiplicity: 0,
            roi_delay_0: 0,
            roi_delay_1: 0,
            roi_precount: 0,
            roi_peak_window: 0,
            enable_top: 0,
            enable_middle: 0,
            enable_bottom: 0,
            num_roi_words: 0,
            roi_deadtime: 0,
            fifo_blocksize: 0,
            trigger_source: 0,
            software_trigger_rate_hz: 0,
            tpc_dead_time: 0,
            prescale: vec![0; profile.num_prescales],
            disc_threshold_0: vec![0; profile.num_light_channels],
            disc_threshold_1: vec![0; profile.num_light_channels],
        };
        configs.reset();
        configs
    }

    /// Restore defaults in place
    fn reset(&mut self) {
        for field in SCHEMA.fields() {
            (field.set)(self, 0);
        }
        self.enable_bottom = DEFAULT_ENABLE_BOTTOM;
        self.num_roi_words = DEFAULT_NUM_ROI_WORDS;
        self.roi_deadtime = DEFAULT_ROI_DEADTIME;
        self.fifo_blocksize = DEFAULT_FIFO_BLOCKSIZE;
        self.prescale.fill(0);
        self.disc_threshold_0.fill(DEFAULT_DISC_THRESHOLD_0);
        self.disc_threshold_1.fill(DEFAULT_DISC_THRESHOLD_1);
    }

    /// Label of the configured trigger source
    pub fn trigger_source_label(&self) -> &'static str {
        to_trigger_source_string(self.trigger_source)
    }

    pub fn summed_peak_thresh(&self) -> i32 {
        self.summed_peak_thresh
    }

    pub fn set_summed_peak_thresh(&mut self, value: i32) {
        self.summed_peak_thresh = value;
    }

    pub fn channel_multiplicity(&self) -> i32 {
        self.channel_multiplicity
    }

    pub fn set_channel_multiplicity(&mut self, value: i32) {
        self.channel_multiplicity = value;
    }

    pub fn roi_delay_0(&self) -> i32 {
        self.roi_delay_0
    }

    pub fn set_roi_delay_0(&mut self, value: i32) {
        self.roi_delay_0 = value;
    }

    pub fn roi_delay_1(&self) -> i32 {
        self.roi_delay_1
    }

    pub fn set_roi_delay_1(&mut self, value: i32) {
        self.roi_delay_1 = value;
    }

    pub fn roi_precount(&self) -> i32 {
        self.roi_precount
    }

    pub fn set_roi_precount(&mut self, value: i32) {
        self.roi_precount = value;
    }

    pub fn roi_peak_window(&self) -> i32 {
        self.roi_peak_window
    }

    pub fn set_roi_peak_window(&mut self, value: i32) {
        self.roi_peak_window = value;
    }

    /// Channel enable mask, top connector
    pub fn enable_top(&self) -> u32 {
        self.enable_top
    }

    pub fn set_enable_top(&mut self, mask: u32) {
        self.enable_top = mask;
    }

    /// Channel enable mask, middle connector
    pub fn enable_middle(&self) -> u32 {
        self.enable_middle
    }

    pub fn set_enable_middle(&mut self, mask: u32) {
        self.enable_middle = mask;
    }

    /// Channel enable mask, bottom connector
    pub fn enable_bottom(&self) -> u32 {
        self.enable_bottom
    }

    pub fn set_enable_bottom(&mut self, mask: u32) {
        self.enable_bottom = mask;
    }

    pub fn num_roi_words(&self) -> i32 {
        self.num_roi_words
    }

    pub fn set_num_roi_words(&mut self, value: i32) {
        self.num_roi_words = value;
    }

    pub fn roi_deadtime(&self) -> i32 {
        self.roi_deadtime
    }

    pub fn set_roi_deadtime(&mut self, value: i32) {
        self.roi_deadtime = value;
    }

    pub fn fifo_blocksize(&self) -> u32 {
        self.fifo_blocksize
    }

    pub fn set_fifo_blocksize(&mut self, value: u32) {
        self.fifo_blocksize = value;
    }

    /// Raw trigger-source code
    pub fn trigger_source(&self) -> i32 {
        self.trigger_source
    }

    pub fn set_trigger_source(&mut self, source: TriggerSource) {
        self.trigger_source = source as i32;
    }

    /// Store a raw code, including ones without a label
    pub fn set_trigger_source_code(&mut self, code: i32) {
        self.trigger_source = code;
    }

    pub fn software_trigger_rate_hz(&self) -> i32 {
        self.software_trigger_rate_hz
    }

    pub fn set_software_trigger_rate_hz(&mut self, rate: i32) {
        self.software_trigger_rate_hz = rate;
    }

    pub fn tpc_dead_time(&self) -> i32 {
        self.tpc_dead_time
    }

    pub fn set_tpc_dead_time(&mut self, value: i32) {
        self.tpc_dead_time = value;
    }

    pub fn prescale(&self) -> &[i32] {
        &self.prescale
    }

    pub fn set_prescale(&mut self, values: &[i32]) -> Result<()> {
        copy_exact(&mut self.prescale, values)
    }

    pub fn disc_threshold_0(&self) -> &[i32] {
        &self.disc_threshold_0
    }

    pub fn set_disc_threshold_0(&mut self, values: &[i32]) -> Result<()> {
        copy_exact(&mut self.disc_threshold_0, values)
    }

    pub fn disc_threshold_1(&self) -> &[i32] {
        &self.disc_threshold_1
    }

    pub fn set_disc_threshold_1(&mut self, values: &[i32]) -> Result<()> {
        copy_exact(&mut self.disc_threshold_1, values)
    }
}

/// Arrays have a fixed size; anything else is rejected without writing
fn copy_exact(dest: &mut [i32], values: &[i32]) -> Result<()> {
    if values.len() != dest.len() {
        return Err(DatamonError::SizeMismatch {
            expected: dest.len(),
            actual: values.len(),
        });
    }
    dest.copy_from_slice(values);
    Ok(())
}

impl Metric for TpcConfigs {
    const NAME: &'static str = "TpcConfigs";

    fn wire_len(&self) -> usize {
        SCHEMA.len() + self.prescale.len() + self.disc_threshold_0.len() + self.disc_threshold_1.len()
    }

    fn serialize_into(&self, out: &mut Vec<Word>) {
        out.reserve(self.wire_len());
        serialize_fields(&SCHEMA, self, out);
        push_array(out, &self.prescale);
        push_array(out, &self.disc_threshold_0);
        push_array(out, &self.disc_threshold_1);
    }

    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()> {
        reader.require(Self::NAME, self.wire_len())?;
        deserialize_fields(&SCHEMA, self, Self::NAME, reader)?;
        reader.read_array(Self::NAME, &mut self.prescale)?;
        reader.read_array(Self::NAME, &mut self.disc_threshold_0)?;
        reader.read_array(Self::NAME, &mut self.disc_threshold_1)?;
        Ok(())
    }

    /// Back to the documented defaults, not to zero
    fn clear(&mut self) {
        self.reset();
    }

    fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== TpcConfigs ===\n");
        for field in SCHEMA.fields() {
            let word = (field.get)(self);
            match field.kind {
                crate::wire::ScalarKind::U32 | crate::wire::ScalarKind::U64 => {
                    report.push_str(&format!("  {}: {:#x}\n", field.name, word))
                }
                _ => report.push_str(&format!("  {}: {}\n", field.name, word as i32)),
            }
        }
        report.push_str(&format!("  trigger: {}\n", self.trigger_source_label()));
        report.push_str(&format!("  prescale: {:?}\n", self.prescale));
        report.push_str(&format!("  disc_threshold_0: {:?}\n", self.disc_threshold_0));
        report.push_str(&format!("  disc_threshold_1: {:?}\n", self.disc_threshold_1));

        report
    }
}

#[cfg(feature = "config-view")]
mod dict_view {
    use super::{TpcConfigs, SCHEMA};
    use crate::error::Result;
    use crate::view::{commit_scalars, export_scalars, i32_array, import_scalars, DictView, MetricDict};

    impl DictView for TpcConfigs {
        fn to_dict(&self) -> MetricDict {
            let mut dict = MetricDict::new();
            export_scalars(&SCHEMA, self, &mut dict);
            dict.insert("prescale".into(), self.prescale.clone().into());
            dict.insert("disc_threshold_0".into(), self.disc_threshold_0.clone().into());
            dict.insert("disc_threshold_1".into(), self.disc_threshold_1.clone().into());
            dict
        }
    }

    impl TpcConfigs {
        /// Populate from a key-value view
        ///
        /// Every key is checked (presence, type, array size) before any
        /// field is written.
        pub fn apply_dict(&mut self, dict: &MetricDict) -> Result<()> {
            let scalars = import_scalars(&SCHEMA, dict)?;
            let prescale = i32_array(dict, "prescale", self.prescale.len())?;
            let disc_0 = i32_array(dict, "disc_threshold_0", self.disc_threshold_0.len())?;
            let disc_1 = i32_array(dict, "disc_threshold_1", self.disc_threshold_1.len())?;

            commit_scalars(&SCHEMA, self, &scalars);
            self.prescale.copy_from_slice(&prescale);
            self.disc_threshold_0.copy_from_slice(&disc_0);
            self.disc_threshold_1.copy_from_slice(&disc_1);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let configs = TpcConfigs::default();
        assert_eq!(configs.enable_bottom(), 0xFFFF);
        assert_eq!(configs.enable_top(), 0);
        assert_eq!(configs.num_roi_words(), 30);
        assert_eq!(configs.roi_deadtime(), 240);
        assert_eq!(configs.fifo_blocksize(), 0xFFFF);
        assert_eq!(configs.prescale(), &[0; 9]);
        assert!(configs.disc_threshold_0().iter().all(|&t| t == 100));
        assert!(configs.disc_threshold_1().iter().all(|&t| t == 250));
        assert_eq!(configs.disc_threshold_1().len(), 36);
        assert_eq!(configs.wire_len(), 15 + 9 + 36 + 36);
    }

    #[test]
    fn test_wire_layout() {
        let mut configs = TpcConfigs::new(&Profile::compact());
        configs.set_summed_peak_thresh(-7);
        configs.set_trigger_source(TriggerSource::External);
        configs.set_prescale(&[1, 2, 3]).unwrap();

        let words = configs.serialize();
        assert_eq!(words.len(), 15 + 3 + 3 + 3);
        assert_eq!(words[0], (-7i32) as u32);
        assert_eq!(words[8], 0xFFFF);
        assert_eq!(words[12], 2);
        assert_eq!(&words[15..18], &[1, 2, 3]);
        assert_eq!(&words[18..21], &[100, 100, 100]);
        assert_eq!(&words[21..], &[250, 250, 250]);
    }

    #[test]
    fn test_roundtrip() {
        let mut source = TpcConfigs::default();
        source.set_channel_multiplicity(3);
        source.set_roi_precount(5);
        source.set_enable_top(0xFFFF_0000);
        source.set_software_trigger_rate_hz(10);
        source.set_tpc_dead_time(1200);
        source.set_disc_threshold_0(&[120; 36]).unwrap();

        let mut target = TpcConfigs::default();
        let words = source.serialize();
        let rest = target.deserialize(&words).unwrap();
        assert!(rest.is_empty());
        assert_eq!(target, source);
    }

    #[test]
    fn test_short_array_is_truncated() {
        let words = TpcConfigs::default().serialize();
        let mut target = TpcConfigs::default();
        target.set_roi_delay_0(4);
        let err = target.deserialize(&words[..words.len() - 1]).unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(target.roi_delay_0(), 4);
    }

    #[test]
    fn test_clear_restores_defaults() {
        let mut configs = TpcConfigs::default();
        configs.set_enable_bottom(0);
        configs.set_num_roi_words(12);
        configs.set_disc_threshold_1(&[1; 36]).unwrap();
        configs.clear();
        assert_eq!(configs, TpcConfigs::default());
    }

    #[test]
    fn test_array_setters_require_exact_size() {
        let mut configs = TpcConfigs::default();
        assert!(matches!(
            configs.set_prescale(&[1, 2]),
            Err(DatamonError::SizeMismatch { expected: 9, actual: 2 })
        ));
        assert_eq!(configs.prescale(), &[0; 9]);

        assert_eq!(
            configs.set_disc_threshold_1(&[1; 37]),
            Err(DatamonError::SizeMismatch { expected: 36, actual: 37 })
        );
        assert_eq!(configs.disc_threshold_1(), &[DEFAULT_DISC_THRESHOLD_1; 36]);
    }

    #[test]
    fn test_trigger_source_labels() {
        assert_eq!(to_trigger_source_string(0), "light");
        assert_eq!(to_trigger_source_string(1), "software");
        assert_eq!(to_trigger_source_string(2), "external");
        assert_eq!(to_trigger_source_string(3), "unknown");
        assert_eq!(to_trigger_source_string(-1), "unknown");

        let mut configs = TpcConfigs::default();
        configs.set_trigger_source_code(9);
        assert_eq!(configs.trigger_source_label(), "unknown");
    }

    #[cfg(feature = "config-view")]
    mod dict {
        use super::*;
        use crate::error::ConfigError;
        use crate::view::DictView;
        use serde_json::json;

        #[test]
        fn test_dict_roundtrip() {
            let mut source = TpcConfigs::new(&Profile::compact());
            source.set_roi_peak_window(6);
            source.set_enable_middle(0xF0F0_F0F0);
            let dict = source.to_dict();
            assert_eq!(dict["enable_middle"], json!(0xF0F0_F0F0u32));
            assert_eq!(dict["disc_threshold_0"], json!([100, 100, 100]));

            let mut target = TpcConfigs::new(&Profile::compact());
            target.apply_dict(&dict).unwrap();
            assert_eq!(target, source);
        }

        #[test]
        fn test_missing_key_rejected() {
            let mut dict = TpcConfigs::new(&Profile::compact()).to_dict();
            dict.remove("roi_deadtime");

            let mut target = TpcConfigs::new(&Profile::compact());
            let err = target.apply_dict(&dict).unwrap_err();
            assert_eq!(
                err,
                DatamonError::Config(ConfigError::MissingKey("roi_deadtime".to_string()))
            );
            assert_eq!(err.to_string(), "Config error: Missing key [roi_deadtime]");
        }

        #[test]
        fn test_size_mismatch_leaves_configs() {
            let mut dict = TpcConfigs::new(&Profile::compact()).to_dict();
            dict.insert("summed_peak_thresh".into(), json!(44));
            dict.insert("disc_threshold_1".into(), json!([1, 2]));

            let mut target = TpcConfigs::new(&Profile::compact());
            let err = target.apply_dict(&dict).unwrap_err();
            assert_eq!(
                err,
                DatamonError::Config(ConfigError::SizeMismatch {
                    key: "disc_threshold_1".to_string(),
                    expected: 3,
                    actual: 2
                })
            );
            // Scalars validated first, still not committed
            assert_eq!(target.summed_peak_thresh(), 0);
        }

        #[test]
        fn test_type_mismatch() {
            let mut dict = TpcConfigs::new(&Profile::compact()).to_dict();
            dict.insert("enable_top".into(), json!(-1));

            let mut target = TpcConfigs::new(&Profile::compact());
            assert!(matches!(
                target.apply_dict(&dict),
                Err(DatamonError::Config(ConfigError::TypeMismatch { .. }))
            ));
        }
    }
}
