//! # datamon - DAQ telemetry metrics
//!
//! Fixed-format integer word encoding for the monitoring and configuration
//! metrics exchanged between the TPC readout, the DAQ computer and the
//! ground over a low-bandwidth command/telemetry link.
//!
//! ## Key Features
//!
//! - **One contract**: every metric implements [`Metric`] (`serialize`, `deserialize`, `clear`)
//! - **Order is the format**: scalar members are declared once in a [`wire::Schema`]
//! - **Packing**: bit flags, 64-bit split counters and two 16-bit samples per word
//! - **Atomic decode**: a rejected stream leaves the target metric unchanged
//! - **Profiles**: channel counts and histogram shapes come from a [`Profile`]
//!
//! ## Quick Start
//!
//! ```rust
//! use datamon::{Histogram, Metric, Profile, TpcMonitor};
//!
//! // Fill a histogram and put it on the wire
//! let mut hist = Histogram::new(0, 10, 5).unwrap();
//! hist.fill(0);
//! hist.fill(9);
//! hist.fill(10);
//! hist.fill(-1);
//! let words = hist.serialize();
//! assert_eq!(words, vec![0, 10, 5, 1, 1, 1, 0, 0, 0, 1]);
//!
//! // Decode on the other side
//! let mut decoded = Histogram::default();
//! let rest = decoded.deserialize(&words).unwrap();
//! assert!(rest.is_empty());
//! assert_eq!(decoded, hist);
//!
//! // Composite metrics are shaped by the profile
//! let profile = Profile::compact();
//! let mut monitor = TpcMonitor::new(&profile).unwrap();
//! monitor.fill_charge(0, 3).unwrap();
//! assert_eq!(monitor.serialize().len(), monitor.wire_len());
//! ```
//!
//! ## Modules
//!
//! - [`wire`]: Word type, cursor and field schema
//! - [`bits`]: Bit words, split words and sample packing
//! - [`metric`]: The [`Metric`] contract and [`AnyMetric`]
//! - [`histogram`], [`tpc_monitor`], [`low_bw`]: Channel amplitude monitoring
//! - [`tpc_configs`]: Trigger and ROI configuration
//! - [`daq_comp`], [`readout`]: Host health and readout state
//! - [`event`], [`query`]: Waveform snapshots and FEM slot query
//! - [`codes`]: Command code space
//! - `view`: Key-value view for host tooling (feature `config-view`)

// Modules
pub mod bits;
pub mod codes;
pub mod daq_comp;
pub mod error;
pub mod event;
pub mod histogram;
pub mod low_bw;
pub mod metric;
pub mod profile;
pub mod query;
pub mod readout;
pub mod tpc_configs;
pub mod tpc_monitor;
#[cfg(feature = "config-view")]
pub mod view;
pub mod wire;

// Re-exports for convenient access
pub use daq_comp::{DaqCompMonitor, DaqRunningBit, DaqRunningFlags};
pub use error::{ConfigError, DatamonError, DecodeError, Result};
pub use event::{TpcMonitorChargeEvent, TpcMonitorLightEvent};
pub use histogram::Histogram;
pub use low_bw::{LowBwTpcMonitor, Summary};
pub use metric::{AnyMetric, Metric, MetricKind};
pub use profile::Profile;
pub use query::TpcMonitorQuery;
pub use readout::{ReadoutErrorBit, ReadoutState, TpcReadoutMonitor};
pub use tpc_configs::{to_trigger_source_string, TpcConfigs, TriggerSource};
pub use tpc_monitor::{ChannelClass, TpcMonitor};
#[cfg(feature = "config-view")]
pub use view::{DictView, MetricDict};
pub use wire::{Word, WordReader};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire protocol version
///
/// Bumped whenever a schema is reordered or a member added or removed.
pub const PROTOCOL_VERSION: u8 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_roundtrip() {
        let profile = Profile::default();
        let mut source = DaqCompMonitor::new(&profile);
        source.set_running(DaqRunningBit::TpcMonitor);
        source.set_cpu_usage(12);

        let words = source.serialize();
        let (decoded, rest) =
            AnyMetric::decode(MetricKind::DaqCompMonitor, &profile, &words).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, AnyMetric::DaqCompMonitor(source));
    }
}
