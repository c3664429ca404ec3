//! Metric contract
//!
//! Every telemetry object implements [`Metric`]: it knows its wire length,
//! appends itself to a word stream, and rebuilds itself from one. Composite
//! metrics call their children through the same trait, so a payload is the
//! depth-first concatenation of child encodings.
//!
//! [`AnyMetric`] is the closed set of concrete metrics for code that picks
//! the type at run time (e.g. from a telemetry code).

use crate::daq_comp::DaqCompMonitor;
use crate::error::Result;
use crate::event::{TpcMonitorChargeEvent, TpcMonitorLightEvent};
use crate::histogram::Histogram;
use crate::low_bw::LowBwTpcMonitor;
use crate::profile::Profile;
use crate::query::TpcMonitorQuery;
use crate::readout::TpcReadoutMonitor;
use crate::tpc_configs::TpcConfigs;
use crate::tpc_monitor::TpcMonitor;
use crate::wire::{Word, WordReader};
use log::debug;
use std::fmt;

/// Encode/decode contract shared by all metrics
pub trait Metric {
    /// Metric name used in diagnostics
    const NAME: &'static str;

    /// Exact number of words [`serialize`](Metric::serialize) produces
    fn wire_len(&self) -> usize;

    /// Append the encoding to `out`
    fn serialize_into(&self, out: &mut Vec<Word>);

    /// Rebuild from the reader, consuming exactly this metric's words
    ///
    /// On error the metric is left as it was.
    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()>;

    /// Reset to defaults, keeping the configured shape
    fn clear(&mut self);

    /// Human-readable dump
    fn report(&self) -> String;

    /// Encode into a fresh vector
    fn serialize(&self) -> Vec<Word> {
        let mut out = Vec::with_capacity(self.wire_len());
        self.serialize_into(&mut out);
        out
    }

    /// Decode from the front of `words`, returning the unconsumed tail
    fn deserialize<'a>(&mut self, words: &'a [Word]) -> Result<&'a [Word]> {
        let mut reader = WordReader::new(words);
        if let Err(e) = self.read_from(&mut reader) {
            debug!("{} rejected {}-word stream: {}", Self::NAME, words.len(), e);
            return Err(e);
        }
        Ok(reader.rest())
    }
}

/// Tag naming a concrete metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Histogram,
    TpcMonitor,
    LowBwTpcMonitor,
    TpcConfigs,
    DaqCompMonitor,
    TpcReadoutMonitor,
    TpcMonitorChargeEvent,
    TpcMonitorLightEvent,
    TpcMonitorQuery,
}

impl MetricKind {
    /// All kinds, in declaration order
    pub const ALL: [MetricKind; 9] = [
        MetricKind::Histogram,
        MetricKind::TpcMonitor,
        MetricKind::LowBwTpcMonitor,
        MetricKind::TpcConfigs,
        MetricKind::DaqCompMonitor,
        MetricKind::TpcReadoutMonitor,
        MetricKind::TpcMonitorChargeEvent,
        MetricKind::TpcMonitorLightEvent,
        MetricKind::TpcMonitorQuery,
    ];

    /// Metric name
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Histogram => Histogram::NAME,
            MetricKind::TpcMonitor => TpcMonitor::NAME,
            MetricKind::LowBwTpcMonitor => LowBwTpcMonitor::NAME,
            MetricKind::TpcConfigs => TpcConfigs::NAME,
            MetricKind::DaqCompMonitor => DaqCompMonitor::NAME,
            MetricKind::TpcReadoutMonitor => TpcReadoutMonitor::NAME,
            MetricKind::TpcMonitorChargeEvent => TpcMonitorChargeEvent::NAME,
            MetricKind::TpcMonitorLightEvent => TpcMonitorLightEvent::NAME,
            MetricKind::TpcMonitorQuery => TpcMonitorQuery::NAME,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any concrete metric
#[derive(Debug, Clone, PartialEq)]
pub enum AnyMetric {
    Histogram(Histogram),
    TpcMonitor(TpcMonitor),
    LowBwTpcMonitor(LowBwTpcMonitor),
    TpcConfigs(TpcConfigs),
    DaqCompMonitor(DaqCompMonitor),
    TpcReadoutMonitor(TpcReadoutMonitor),
    TpcMonitorChargeEvent(TpcMonitorChargeEvent),
    TpcMonitorLightEvent(TpcMonitorLightEvent),
    TpcMonitorQuery(TpcMonitorQuery),
}

macro_rules! dispatch {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            AnyMetric::Histogram($m) => $body,
            AnyMetric::TpcMonitor($m) => $body,
            AnyMetric::LowBwTpcMonitor($m) => $body,
            AnyMetric::TpcConfigs($m) => $body,
            AnyMetric::DaqCompMonitor($m) => $body,
            AnyMetric::TpcReadoutMonitor($m) => $body,
            AnyMetric::TpcMonitorChargeEvent($m) => $body,
            AnyMetric::TpcMonitorLightEvent($m) => $body,
            AnyMetric::TpcMonitorQuery($m) => $body,
        }
    };
}

impl AnyMetric {
    /// Default-constructed metric of the given kind
    pub fn new(kind: MetricKind, profile: &Profile) -> Result<Self> {
        Ok(match kind {
            MetricKind::Histogram => AnyMetric::Histogram(Histogram::default()),
            MetricKind::TpcMonitor => AnyMetric::TpcMonitor(TpcMonitor::new(profile)?),
            MetricKind::LowBwTpcMonitor => {
                AnyMetric::LowBwTpcMonitor(LowBwTpcMonitor::new(profile))
            }
            MetricKind::TpcConfigs => AnyMetric::TpcConfigs(TpcConfigs::new(profile)),
            MetricKind::DaqCompMonitor => AnyMetric::DaqCompMonitor(DaqCompMonitor::new(profile)),
            MetricKind::TpcReadoutMonitor => {
                AnyMetric::TpcReadoutMonitor(TpcReadoutMonitor::new(profile))
            }
            MetricKind::TpcMonitorChargeEvent => {
                AnyMetric::TpcMonitorChargeEvent(TpcMonitorChargeEvent::new(profile))
            }
            MetricKind::TpcMonitorLightEvent => {
                AnyMetric::TpcMonitorLightEvent(TpcMonitorLightEvent::with_profile(profile))
            }
            MetricKind::TpcMonitorQuery => {
                AnyMetric::TpcMonitorQuery(TpcMonitorQuery::new(profile))
            }
        })
    }

    /// Construct a metric of `kind` and decode it from the front of `words`
    pub fn decode<'a>(
        kind: MetricKind,
        profile: &Profile,
        words: &'a [Word],
    ) -> Result<(Self, &'a [Word])> {
        let mut metric = Self::new(kind, profile)?;
        let rest = metric.deserialize(words)?;
        Ok((metric, rest))
    }

    /// Kind tag of this metric
    pub fn kind(&self) -> MetricKind {
        match self {
            AnyMetric::Histogram(_) => MetricKind::Histogram,
            AnyMetric::TpcMonitor(_) => MetricKind::TpcMonitor,
            AnyMetric::LowBwTpcMonitor(_) => MetricKind::LowBwTpcMonitor,
            AnyMetric::TpcConfigs(_) => MetricKind::TpcConfigs,
            AnyMetric::DaqCompMonitor(_) => MetricKind::DaqCompMonitor,
            AnyMetric::TpcReadoutMonitor(_) => MetricKind::TpcReadoutMonitor,
            AnyMetric::TpcMonitorChargeEvent(_) => MetricKind::TpcMonitorChargeEvent,
            AnyMetric::TpcMonitorLightEvent(_) => MetricKind::TpcMonitorLightEvent,
            AnyMetric::TpcMonitorQuery(_) => MetricKind::TpcMonitorQuery,
        }
    }

    /// See [`Metric::wire_len`]
    pub fn wire_len(&self) -> usize {
        dispatch!(self, m => m.wire_len())
    }

    /// See [`Metric::serialize`]
    pub fn serialize(&self) -> Vec<Word> {
        dispatch!(self, m => m.serialize())
    }

    /// See [`Metric::deserialize`]
    pub fn deserialize<'a>(&mut self, words: &'a [Word]) -> Result<&'a [Word]> {
        dispatch!(self, m => m.deserialize(words))
    }

    /// See [`Metric::clear`]
    pub fn clear(&mut self) {
        dispatch!(self, m => m.clear())
    }

    /// See [`Metric::report`]
    pub fn report(&self) -> String {
        dispatch!(self, m => m.report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_roundtrips_default() {
        let profile = Profile::compact();
        for kind in MetricKind::ALL {
            let metric = AnyMetric::new(kind, &profile).unwrap();
            assert_eq!(metric.kind(), kind);

            let words = metric.serialize();
            assert_eq!(words.len(), metric.wire_len(), "{}", kind);

            let (decoded, rest) = AnyMetric::decode(kind, &profile, &words).unwrap();
            assert!(rest.is_empty());
            assert_eq!(decoded, metric, "{}", kind);
        }
    }

    #[test]
    fn test_deserialize_returns_tail() {
        let profile = Profile::compact();
        let mut words = AnyMetric::new(MetricKind::TpcMonitorQuery, &profile)
            .unwrap()
            .serialize();
        words.extend([42, 43]);

        let (_, rest) = AnyMetric::decode(MetricKind::TpcMonitorQuery, &profile, &words).unwrap();
        assert_eq!(rest, &[42, 43]);
    }

    #[test]
    fn test_empty_stream_is_truncated() {
        let profile = Profile::compact();
        for kind in MetricKind::ALL {
            let err = AnyMetric::decode(kind, &profile, &[]).unwrap_err();
            assert!(err.is_truncated(), "{}: {}", kind, err);
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MetricKind::TpcConfigs.to_string(), "TpcConfigs");
        assert!(AnyMetric::new(MetricKind::Histogram, &Profile::compact())
            .unwrap()
            .report()
            .contains("Histogram"));
    }
}
