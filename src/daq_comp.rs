//! DAQ computer health monitor
//!
//! Wire layout: ten scalar words (see [`SCHEMA`]) followed by
//! `cpu_temp[num_cpus]`.

use crate::bits::{clear_bit, get_bit, set_bit};
use crate::error::Result;
use crate::fields;
use crate::metric::Metric;
use crate::profile::Profile;
use crate::wire::{deserialize_fields, push_array, serialize_fields, Schema, Word, WordReader};

/// Bits of `daq_bit_word`, one per DAQ process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DaqRunningBit {
    Tpc = 0,
    TpcMonitor = 1,
    Tof = 2,
    TofMonitor = 3,
}

/// Decoded view of `daq_bit_word`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DaqRunningFlags {
    pub tpc: bool,
    pub tpc_monitor: bool,
    pub tof: bool,
    pub tof_monitor: bool,
}

impl DaqRunningFlags {
    /// Decode the running flags from a raw word
    pub fn from_word(word: i32) -> Self {
        let bit = |b: DaqRunningBit| get_bit(word, b as u32).unwrap_or(false);
        Self {
            tpc: bit(DaqRunningBit::Tpc),
            tpc_monitor: bit(DaqRunningBit::TpcMonitor),
            tof: bit(DaqRunningBit::Tof),
            tof_monitor: bit(DaqRunningBit::TofMonitor),
        }
    }
}

/// Host health of the DAQ computer
#[derive(Debug, Clone, PartialEq)]
pub struct DaqCompMonitor {
    error_bit_word: i32,
    last_command: i32,
    last_command_status: i32,
    daq_bit_word: i32,
    tpc_disk: i32,
    tof_disk: i32,
    sys_disk: i32,
    cpu_usage: i32,
    memory_usage: i32,
    disk_temp: i32,
    cpu_temp: Vec<i32>,
}

/// Scalar members in wire order
pub const SCHEMA: Schema<DaqCompMonitor> = Schema::new(fields!(DaqCompMonitor {
    error_bit_word: i32,
    last_command: i32,
    last_command_status: i32,
    daq_bit_word: i32,
    tpc_disk: i32,
    tof_disk: i32,
    sys_disk: i32,
    cpu_usage: i32,
    memory_usage: i32,
    disk_temp: i32,
}));

impl Default for DaqCompMonitor {
    fn default() -> Self {
        Self::new(&Profile::default())
    }
}

impl DaqCompMonitor {
    /// Zeroed monitor sized for `profile.num_cpus`
    pub fn new(profile: &Profile) -> Self {
        Self {
            error_bit_word: 0,
            last_command: 0,
            last_command_status: 0,
            daq_bit_word: 0,
            tpc_disk: 0,
            tof_disk: 0,
            sys_disk: 0,
            cpu_usage: 0,
            memory_usage: 0,
            disk_temp: 0,
            cpu_temp: vec![0; profile.num_cpus],
        }
    }

    /// Mark a DAQ process as running
    pub fn set_running(&mut self, daq: DaqRunningBit) {
        // Discriminants are all < 32
        let _ = set_bit(&mut self.daq_bit_word, daq as u32);
    }

    /// Mark a DAQ process as stopped
    pub fn unset_running(&mut self, daq: DaqRunningBit) {
        let _ = clear_bit(&mut self.daq_bit_word, daq as u32);
    }

    /// Decoded running flags
    pub fn running(&self) -> DaqRunningFlags {
        DaqRunningFlags::from_word(self.daq_bit_word)
    }

    /// Set an error bit; out-of-range bits are logged and ignored
    pub fn set_error_bit(&mut self, bit: u32) {
        let _ = set_bit(&mut self.error_bit_word, bit);
    }

    /// Clear an error bit; out-of-range bits are logged and ignored
    pub fn unset_error_bit(&mut self, bit: u32) {
        let _ = clear_bit(&mut self.error_bit_word, bit);
    }

    /// Read an error bit
    pub fn error_bit(&self, bit: u32) -> Result<bool> {
        get_bit(self.error_bit_word, bit)
    }

    pub fn error_bit_word(&self) -> i32 {
        self.error_bit_word
    }

    pub fn daq_bit_word(&self) -> i32 {
        self.daq_bit_word
    }

    pub fn last_command(&self) -> i32 {
        self.last_command
    }

    /// Command codes are stored as opaque integers
    pub fn set_last_command(&mut self, code: i32, status: i32) {
        self.last_command = code;
        self.last_command_status = status;
    }

    pub fn last_command_status(&self) -> i32 {
        self.last_command_status
    }

    pub fn tpc_disk(&self) -> i32 {
        self.tpc_disk
    }

    pub fn set_tpc_disk(&mut self, disk: i32) {
        self.tpc_disk = disk;
    }

    pub fn tof_disk(&self) -> i32 {
        self.tof_disk
    }

    pub fn set_tof_disk(&mut self, disk: i32) {
        self.tof_disk = disk;
    }

    pub fn sys_disk(&self) -> i32 {
        self.sys_disk
    }

    pub fn set_sys_disk(&mut self, disk: i32) {
        self.sys_disk = disk;
    }

    pub fn cpu_usage(&self) -> i32 {
        self.cpu_usage
    }

    pub fn set_cpu_usage(&mut self, usage: i32) {
        self.cpu_usage = usage;
    }

    pub fn memory_usage(&self) -> i32 {
        self.memory_usage
    }

    pub fn set_memory_usage(&mut self, usage: i32) {
        self.memory_usage = usage;
    }

    pub fn disk_temp(&self) -> i32 {
        self.disk_temp
    }

    pub fn set_disk_temp(&mut self, temp: i32) {
        self.disk_temp = temp;
    }

    pub fn cpu_temp(&self) -> &[i32] {
        &self.cpu_temp
    }

    /// Copy per-CPU temperatures; extra values are dropped, missing ones kept
    pub fn set_cpu_temp(&mut self, temps: &[i32]) {
        for (slot, &t) in self.cpu_temp.iter_mut().zip(temps) {
            *slot = t;
        }
    }
}

impl Metric for DaqCompMonitor {
    const NAME: &'static str = "DaqCompMonitor";

    fn wire_len(&self) -> usize {
        SCHEMA.len() + self.cpu_temp.len()
    }

    fn serialize_into(&self, out: &mut Vec<Word>) {
        serialize_fields(&SCHEMA, self, out);
        push_array(out, &self.cpu_temp);
    }

    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()> {
        reader.require(Self::NAME, self.wire_len())?;
        deserialize_fields(&SCHEMA, self, Self::NAME, reader)?;
        reader.read_array(Self::NAME, &mut self.cpu_temp)?;
        Ok(())
    }

    fn clear(&mut self) {
        for field in SCHEMA.fields() {
            (field.set)(self, 0);
        }
        self.cpu_temp.fill(0);
    }

    fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== DaqCompMonitor ===\n");
        report.push_str(&format!("  error_bit_word: {:032b}\n", self.error_bit_word));
        report.push_str(&format!("  last_command: {:#06x}\n", self.last_command));
        report.push_str(&format!(
            "  last_command_status: {}\n",
            self.last_command_status
        ));
        report.push_str(&format!("  daq_bit_word: {:032b}\n", self.daq_bit_word));
        report.push_str(&format!("  tpc_disk: {}\n", self.tpc_disk));
        report.push_str(&format!("  tof_disk: {}\n", self.tof_disk));
        report.push_str(&format!("  sys_disk: {}\n", self.sys_disk));
        report.push_str(&format!("  cpu_usage: {}\n", self.cpu_usage));
        report.push_str(&format!("  memory_usage: {}\n", self.memory_usage));
        report.push_str(&format!("  disk_temp: {}\n", self.disk_temp));
        report.push_str(&format!("  cpu_temp: {:?}\n", self.cpu_temp));

        report
    }
}

#[cfg(feature = "config-view")]
impl crate::view::DictView for DaqCompMonitor {
    fn to_dict(&self) -> crate::view::MetricDict {
        let mut dict = crate::view::MetricDict::new();
        crate::view::export_scalars(&SCHEMA, self, &mut dict);
        dict.insert("cpu_temp".into(), self.cpu_temp.clone().into());
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::DatamonError;

    fn populated() -> DaqCompMonitor {
        let mut monitor = DaqCompMonitor::new(&Profile::default());
        monitor.set_running(DaqRunningBit::Tpc);
        monitor.set_running(DaqRunningBit::TofMonitor);
        monitor.set_error_bit(3);
        monitor.set_last_command(0x4001, 1);
        monitor.set_tpc_disk(71);
        monitor.set_tof_disk(12);
        monitor.set_sys_disk(40);
        monitor.set_cpu_usage(33);
        monitor.set_memory_usage(58);
        monitor.set_disk_temp(-4);
        monitor.set_cpu_temp(&[45, 46, 47, 48, 49, 50]);
        monitor
    }

    #[test]
    fn test_wire_layout() {
        let words = populated().serialize();
        assert_eq!(words.len(), 10 + 6);
        assert_eq!(&words[..4], &[1 << 3, 0x4001, 1, 0b1001]);
        assert_eq!(words[9], (-4i32) as u32);
        assert_eq!(&words[10..], &[45, 46, 47, 48, 49, 50]);
    }

    #[test]
    fn test_roundtrip() {
        let source = populated();
        let mut target = DaqCompMonitor::default();
        target.deserialize(&source.serialize()).unwrap();
        assert_eq!(target, source);
        assert_eq!(
            target.running(),
            DaqRunningFlags {
                tpc: true,
                tpc_monitor: false,
                tof: false,
                tof_monitor: true
            }
        );
    }

    #[test]
    fn test_running_flags_toggle() {
        let mut monitor = DaqCompMonitor::default();
        monitor.set_running(DaqRunningBit::Tof);
        monitor.set_running(DaqRunningBit::TpcMonitor);
        monitor.unset_running(DaqRunningBit::Tof);
        assert_eq!(monitor.daq_bit_word(), 0b0010);
    }

    #[test]
    fn test_error_bit_out_of_range_is_ignored() {
        let mut monitor = DaqCompMonitor::default();
        monitor.set_error_bit(2);
        monitor.set_error_bit(32);
        assert_eq!(monitor.error_bit_word(), 0b100);
        assert!(matches!(
            monitor.error_bit(32),
            Err(DatamonError::IndexOutOfRange { index: 32, bound: 32 })
        ));
        assert!(monitor.error_bit(2).unwrap());
    }

    #[test]
    fn test_truncated_array_leaves_state() {
        let source = populated();
        let words = source.serialize();
        let mut target = DaqCompMonitor::default();
        let err = target.deserialize(&words[..words.len() - 1]).unwrap_err();
        assert_eq!(
            err,
            DatamonError::Decode(DecodeError::TruncatedInput {
                metric: "DaqCompMonitor",
                needed: 16,
                available: 15
            })
        );
        assert_eq!(target, DaqCompMonitor::default());
    }

    #[test]
    fn test_clear() {
        let mut monitor = populated();
        monitor.clear();
        assert_eq!(monitor, DaqCompMonitor::default());
    }
}
