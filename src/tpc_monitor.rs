//! Per-channel histogram monitor
//!
//! One [`Histogram`] per charge channel followed by one per light channel.
//! The payload is the concatenation of the child encodings in ascending
//! channel order, with no length prefixes between them.

use crate::error::{DatamonError, Result};
use crate::histogram::Histogram;
use crate::metric::Metric;
use crate::profile::Profile;
use crate::wire::{Word, WordReader};
use log::trace;
use std::fmt;

/// Channel class of a histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelClass {
    /// Wire-plane channels
    Charge,
    /// SiPM channels
    Light,
}

impl fmt::Display for ChannelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelClass::Charge => write!(f, "charge"),
            ChannelClass::Light => write!(f, "light"),
        }
    }
}

/// Amplitude histograms for every channel of the TPC
#[derive(Debug, Clone, PartialEq)]
pub struct TpcMonitor {
    charge: Vec<Histogram>,
    light: Vec<Histogram>,
}

impl TpcMonitor {
    /// Empty histograms shaped by the profile's ranges and bin counts
    pub fn new(profile: &Profile) -> Result<Self> {
        let (charge_min, charge_max) = profile.charge_range;
        let (light_min, light_max) = profile.light_range;
        let charge = Histogram::new(charge_min, charge_max, profile.charge_bins)?;
        let light = Histogram::new(light_min, light_max, profile.light_bins)?;

        Ok(Self {
            charge: vec![charge; profile.num_charge_channels],
            light: vec![light; profile.num_light_channels],
        })
    }

    fn class(&self, class: ChannelClass) -> &[Histogram] {
        match class {
            ChannelClass::Charge => &self.charge,
            ChannelClass::Light => &self.light,
        }
    }

    fn channel_mut(&mut self, class: ChannelClass, index: usize) -> Result<&mut Histogram> {
        let hists = match class {
            ChannelClass::Charge => &mut self.charge,
            ChannelClass::Light => &mut self.light,
        };
        let bound = hists.len();
        hists
            .get_mut(index)
            .ok_or(DatamonError::IndexOutOfRange { index, bound })
    }

    /// Count one value on channel `index`
    pub fn fill_channel(&mut self, class: ChannelClass, index: usize, value: i32) -> Result<()> {
        self.channel_mut(class, index)?.fill(value);
        Ok(())
    }

    /// Zero the histogram of channel `index`
    pub fn clear_channel(&mut self, class: ChannelClass, index: usize) -> Result<()> {
        self.channel_mut(class, index)?.clear();
        Ok(())
    }

    pub fn fill_charge(&mut self, index: usize, value: i32) -> Result<()> {
        self.fill_channel(ChannelClass::Charge, index, value)
    }

    pub fn fill_light(&mut self, index: usize, value: i32) -> Result<()> {
        self.fill_channel(ChannelClass::Light, index, value)
    }

    /// Histogram of one channel
    pub fn channel(&self, class: ChannelClass, index: usize) -> Option<&Histogram> {
        self.class(class).get(index)
    }

    pub fn charge_histograms(&self) -> &[Histogram] {
        &self.charge
    }

    pub fn light_histograms(&self) -> &[Histogram] {
        &self.light
    }

    /// Number of channels in a class
    pub fn num_channels(&self, class: ChannelClass) -> usize {
        self.class(class).len()
    }
}

impl Metric for TpcMonitor {
    const NAME: &'static str = "TpcMonitor";

    fn wire_len(&self) -> usize {
        self.charge
            .iter()
            .chain(&self.light)
            .map(Metric::wire_len)
            .sum()
    }

    fn serialize_into(&self, out: &mut Vec<Word>) {
        out.reserve(self.wire_len());
        for hist in self.charge.iter().chain(&self.light) {
            hist.serialize_into(out);
        }
    }

    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()> {
        // Validate every child first so a bad one cannot leave earlier
        // channels overwritten
        let children = self.charge.len() + self.light.len();
        let mut probe = reader.clone();
        for _ in 0..children {
            Histogram::skip(&mut probe)?;
        }
        trace!(
            "{} decoding {} histograms from {} words",
            Self::NAME,
            children,
            probe.position() - reader.position()
        );

        for hist in self.charge.iter_mut().chain(&mut self.light) {
            hist.read_from(reader)?;
        }
        Ok(())
    }

    fn clear(&mut self) {
        for hist in self.charge.iter_mut().chain(&mut self.light) {
            hist.clear();
        }
    }

    fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== TpcMonitor ===\n");
        for (class, hists) in [
            (ChannelClass::Charge, &self.charge),
            (ChannelClass::Light, &self.light),
        ] {
            report.push_str(&format!("{} channels: {}\n", class, hists.len()));
            for (i, hist) in hists.iter().enumerate() {
                report.push_str(&format!("[{} {}]\n", class, i));
                report.push_str(&hist.report());
            }
        }

        report
    }
}

#[cfg(feature = "config-view")]
impl crate::view::DictView for TpcMonitor {
    fn to_dict(&self) -> crate::view::MetricDict {
        let export = |hists: &[Histogram]| -> serde_json::Value {
            hists
                .iter()
                .map(|h| serde_json::Value::Object(crate::view::DictView::to_dict(h)))
                .collect::<Vec<_>>()
                .into()
        };
        let mut dict = crate::view::MetricDict::new();
        dict.insert("charge_histograms".into(), export(&self.charge[..]));
        dict.insert("light_histograms".into(), export(&self.light[..]));
        dict
    }
}
