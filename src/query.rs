//! FEM slot query answered by the readout

use crate::error::{DatamonError, Result};
use crate::metric::Metric;
use crate::profile::Profile;
use crate::wire::{push_array, Word, WordReader};

/// Crate slot of each front-end module
#[derive(Debug, Clone, PartialEq)]
pub struct TpcMonitorQuery {
    fem_slots: Vec<i32>,
}

impl Default for TpcMonitorQuery {
    fn default() -> Self {
        Self::new(&Profile::default())
    }
}

impl TpcMonitorQuery {
    /// Zeroed slots for `profile.num_fems` modules
    pub fn new(profile: &Profile) -> Self {
        Self {
            fem_slots: vec![0; profile.num_fems],
        }
    }

    pub fn fem_slots(&self) -> &[i32] {
        &self.fem_slots
    }

    pub fn set_fem_slot(&mut self, fem: usize, slot: i32) -> Result<()> {
        let bound = self.fem_slots.len();
        let entry = self
            .fem_slots
            .get_mut(fem)
            .ok_or(DatamonError::IndexOutOfRange { index: fem, bound })?;
        *entry = slot;
        Ok(())
    }

    /// Copy slots for modules `0..slots.len()`
    pub fn set_fem_slots(&mut self, slots: &[i32]) -> Result<()> {
        if slots.len() > self.fem_slots.len() {
            return Err(DatamonError::IndexOutOfRange {
                index: slots.len() - 1,
                bound: self.fem_slots.len(),
            });
        }
        self.fem_slots[..slots.len()].copy_from_slice(slots);
        Ok(())
    }
}

impl Metric for TpcMonitorQuery {
    const NAME: &'static str = "TpcMonitorQuery";

    fn wire_len(&self) -> usize {
        self.fem_slots.len()
    }

    fn serialize_into(&self, out: &mut Vec<Word>) {
        push_array(out, &self.fem_slots);
    }

    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()> {
        reader.read_array(Self::NAME, &mut self.fem_slots)?;
        Ok(())
    }

    fn clear(&mut self) {
        self.fem_slots.fill(0);
    }

    fn report(&self) -> String {
        format!("=== TpcMonitorQuery ===\n  fem_slots: {:?}\n", self.fem_slots)
    }
}

#[cfg(feature = "config-view")]
impl crate::view::DictView for TpcMonitorQuery {
    fn to_dict(&self) -> crate::view::MetricDict {
        let mut dict = crate::view::MetricDict::new();
        dict.insert("fem_slots".into(), self.fem_slots.clone().into());
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots() {
        let mut query = TpcMonitorQuery::default();
        query.set_fem_slot(2, 14).unwrap();
        assert_eq!(query.fem_slots(), &[0, 0, 14, 0]);
        assert_eq!(
            query.set_fem_slot(4, 1),
            Err(DatamonError::IndexOutOfRange { index: 4, bound: 4 })
        );
        assert!(query.set_fem_slots(&[1, 2, 3, 4, 5]).is_err());
    }

    #[test]
    fn test_roundtrip() {
        let mut source = TpcMonitorQuery::default();
        source.set_fem_slots(&[11, 12, -1, 16]).unwrap();
        let words = source.serialize();
        assert_eq!(words, vec![11, 12, 0xFFFF_FFFF, 16]);

        let mut target = TpcMonitorQuery::default();
        target.deserialize(&words).unwrap();
        assert_eq!(target, source);

        target.clear();
        assert_eq!(target, TpcMonitorQuery::default());
    }

    #[test]
    fn test_truncated() {
        let mut target = TpcMonitorQuery::default();
        target.set_fem_slot(0, 5).unwrap();
        assert!(target.deserialize(&[1, 2, 3]).unwrap_err().is_truncated());
        assert_eq!(target.fem_slots()[0], 5);
    }
}
