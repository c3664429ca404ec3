//! Protocol profile
//!
//! Channel counts, array sizes and histogram ranges are part of the wire
//! contract. They live in an explicit record handed to every metric
//! constructor so several protocol shapes can coexist (e.g. a compact one in
//! tests next to the deployed one).

use crate::error::{DatamonError, Result};

/// Shape constants for one protocol version
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-view", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config-view", serde(default))]
pub struct Profile {
    /// CPUs reported by the DAQ computer monitor
    pub num_cpus: usize,
    /// Front-end modules in the readout crate
    pub num_fems: usize,
    /// Boards with a status word (FEMs + XMIT + trigger)
    pub num_boards: usize,
    /// Trigger prescale slots
    pub num_prescales: usize,
    /// Charge (wire) channels
    pub num_charge_channels: usize,
    /// Light (SiPM) channels
    pub num_light_channels: usize,
    /// Samples in one charge frame
    pub num_charge_samples: usize,
    /// Nominal samples in one light ROI
    ///
    /// Only sizes the initial buffer of a light event; the ROI itself is
    /// length-prefixed on the wire and may be longer.
    pub num_light_samples: usize,
    /// Bins per charge-channel histogram
    pub charge_bins: usize,
    /// Bins per light-channel histogram
    pub light_bins: usize,
    /// Charge histogram range `[min, max)`
    pub charge_range: (i32, i32),
    /// Light histogram range `[min, max)`
    pub light_range: (i32, i32),
}

impl Default for Profile {
    fn default() -> Self {
        let num_fems = 4;
        Self {
            num_cpus: 6,
            num_fems,
            num_boards: num_fems + 2,
            num_prescales: 9,
            num_charge_channels: 192,
            num_light_channels: 36,
            num_charge_samples: 763,
            num_light_samples: 30,
            charge_bins: 16,
            light_bins: 20,
            charge_range: (1024, 4096),
            light_range: (1596, 4096),
        }
    }
}

impl Profile {
    /// Small profile for bench-top tests and unit tests
    pub fn compact() -> Self {
        Self {
            num_cpus: 2,
            num_fems: 1,
            num_boards: 3,
            num_prescales: 3,
            num_charge_channels: 4,
            num_light_channels: 3,
            num_charge_samples: 7,
            num_light_samples: 5,
            charge_bins: 4,
            light_bins: 5,
            charge_range: (0, 16),
            light_range: (0, 20),
        }
    }

    /// Override the channel counts
    pub fn with_channels(mut self, charge: usize, light: usize) -> Self {
        self.num_charge_channels = charge;
        self.num_light_channels = light;
        self
    }

    /// Override the FEM count; the board count follows (FEMs + 2)
    pub fn with_fems(mut self, num_fems: usize) -> Self {
        self.num_fems = num_fems;
        self.num_boards = num_fems + 2;
        self
    }

    /// Override the charge histogram shape
    pub fn with_charge_histogram(mut self, min: i32, max: i32, bins: usize) -> Self {
        self.charge_range = (min, max);
        self.charge_bins = bins;
        self
    }

    /// Override the light histogram shape
    pub fn with_light_histogram(mut self, min: i32, max: i32, bins: usize) -> Self {
        self.light_range = (min, max);
        self.light_bins = bins;
        self
    }

    /// Check that both histogram classes describe a usable shape
    pub fn validate(&self) -> Result<()> {
        for ((min, max), bins) in [
            (self.charge_range, self.charge_bins),
            (self.light_range, self.light_bins),
        ] {
            if max <= min || bins == 0 {
                return Err(DatamonError::InvalidRange {
                    min: min as i64,
                    max: max as i64,
                    bin_count: bins as i64,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = Profile::default();
        assert_eq!(profile.num_boards, profile.num_fems + 2);
        assert_eq!(profile.num_charge_channels, 192);
        assert_eq!(profile.num_light_channels, 36);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let profile = Profile::compact()
            .with_channels(10, 6)
            .with_fems(3)
            .with_charge_histogram(-5, 5, 10);
        assert_eq!(profile.num_charge_channels, 10);
        assert_eq!(profile.num_boards, 5);
        assert_eq!(profile.charge_range, (-5, 5));
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_range() {
        let profile = Profile::compact().with_light_histogram(10, 10, 4);
        assert!(matches!(
            profile.validate(),
            Err(DatamonError::InvalidRange { min: 10, max: 10, .. })
        ));

        let profile = Profile::compact().with_charge_histogram(0, 10, 0);
        assert!(profile.validate().is_err());
    }
}
