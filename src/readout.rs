//! TPC readout state monitor
//!
//! Wire layout: six scalar words, seven 64-bit counters as (upper, lower)
//! word pairs, then `board_status[num_boards]`. Counters are held as `u64`
//! and only split at the schema boundary.

use crate::bits::{assign_bit, get_bit, join, split};
use crate::error::Result;
use crate::metric::Metric;
use crate::profile::Profile;
use crate::wire::{
    deserialize_fields, push_array, serialize_fields, Field, ScalarKind, Schema, WireScalar, Word,
    WordReader,
};
use std::fmt;

/// Error bits of `error_bit_word`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ReadoutErrorBit {
    DaqStateCmd = 1,
    PcieLicense = 2,
    ConfigLoad = 3,
    CommsConfigLoad = 4,
    PcieLibInit = 5,
    PcieCardOpen = 6,
    PcieControlBuff = 7,
    XmitGetConfig = 8,
    LightFemGetConfig = 9,
    ChargeFemGetConfig = 10,
    TriggerGetConfig = 11,
    DataHandlerGetConfig = 12,
}

/// Readout state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadoutState {
    Idle = 0,
    Configured = 1,
    Running = 2,
    Stopped = 3,
}

impl ReadoutState {
    /// Convert from the raw state word
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(ReadoutState::Idle),
            1 => Some(ReadoutState::Configured),
            2 => Some(ReadoutState::Running),
            3 => Some(ReadoutState::Stopped),
            _ => None,
        }
    }
}

impl fmt::Display for ReadoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadoutState::Idle => write!(f, "idle"),
            ReadoutState::Configured => write!(f, "configured"),
            ReadoutState::Running => write!(f, "running"),
            ReadoutState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Readout counters and status
#[derive(Debug, Clone, PartialEq)]
pub struct TpcReadoutMonitor {
    error_bit_word: i32,
    num_rw_buffer_overflow: i32,
    readout_state: i32,
    last_command: i32,
    last_command_status: i32,
    run_number: i32,
    num_events: u64,
    num_dma_loops: u64,
    received_mbytes: u64,
    avg_event_size: u64,
    num_files: u64,
    num_event_start_marker: u64,
    num_event_end_marker: u64,
    board_status: Vec<i32>,
}

macro_rules! scalar {
    ($name:ident) => {
        Field::<TpcReadoutMonitor> {
            name: stringify!($name),
            kind: ScalarKind::I32,
            get: |m: &TpcReadoutMonitor| m.$name.to_word(),
            set: |m: &mut TpcReadoutMonitor, w: Word| m.$name = i32::from_word(w),
        }
    };
}

macro_rules! upper {
    ($name:ident, $key:literal) => {
        Field::<TpcReadoutMonitor> {
            name: $key,
            kind: ScalarKind::U32,
            get: |m: &TpcReadoutMonitor| split(m.$name).0,
            set: |m: &mut TpcReadoutMonitor, w: Word| m.$name = join(w, split(m.$name).1),
        }
    };
}

macro_rules! lower {
    ($name:ident, $key:literal) => {
        Field::<TpcReadoutMonitor> {
            name: $key,
            kind: ScalarKind::U32,
            get: |m: &TpcReadoutMonitor| split(m.$name).1,
            set: |m: &mut TpcReadoutMonitor, w: Word| m.$name = join(split(m.$name).0, w),
        }
    };
}

/// Scalar members in wire order (20 words)
pub const SCHEMA: Schema<TpcReadoutMonitor> = Schema::new(&[
    scalar!(error_bit_word),
    scalar!(num_rw_buffer_overflow),
    scalar!(readout_state),
    scalar!(last_command),
    scalar!(last_command_status),
    scalar!(run_number),
    upper!(num_events, "num_events_upper"),
    lower!(num_events, "num_events_lower"),
    upper!(num_dma_loops, "num_dma_loops_upper"),
    lower!(num_dma_loops, "num_dma_loops_lower"),
    upper!(received_mbytes, "received_mbytes_upper"),
    lower!(received_mbytes, "received_mbytes_lower"),
    upper!(avg_event_size, "avg_event_size_upper"),
    lower!(avg_event_size, "avg_event_size_lower"),
    upper!(num_files, "num_files_upper"),
    lower!(num_files, "num_files_lower"),
    upper!(num_event_start_marker, "num_event_start_marker_upper"),
    lower!(num_event_start_marker, "num_event_start_marker_lower"),
    upper!(num_event_end_marker, "num_event_end_marker_upper"),
    lower!(num_event_end_marker, "num_event_end_marker_lower"),
]);

impl Default for TpcReadoutMonitor {
    fn default() -> Self {
        Self::new(&Profile::default())
    }
}

impl TpcReadoutMonitor {
    /// Zeroed monitor sized for `profile.num_boards`
    pub fn new(profile: &Profile) -> Self {
        Self {
            error_bit_word: 0,
            num_rw_buffer_overflow: 0,
            readout_state: 0,
            last_command: 0,
            last_command_status: 0,
            run_number: 0,
            num_events: 0,
            num_dma_loops: 0,
            received_mbytes: 0,
            avg_event_size: 0,
            num_files: 0,
            num_event_start_marker: 0,
            num_event_end_marker: 0,
            board_status: vec![0; profile.num_boards],
        }
    }

    /// Set or clear a named error bit
    pub fn set_error(&mut self, bit: ReadoutErrorBit, active: bool) {
        // Named bits are all < 32
        let _ = assign_bit(&mut self.error_bit_word, bit as u32, active);
    }

    /// Set or clear an error bit by number; out-of-range bits are logged and ignored
    pub fn set_error_bit(&mut self, bit: u32, active: bool) {
        let _ = assign_bit(&mut self.error_bit_word, bit, active);
    }

    /// Read an error bit
    pub fn error_bit(&self, bit: u32) -> Result<bool> {
        get_bit(self.error_bit_word, bit)
    }

    /// True if the named error is flagged
    pub fn has_error(&self, bit: ReadoutErrorBit) -> bool {
        get_bit(self.error_bit_word, bit as u32).unwrap_or(false)
    }

    pub fn error_bit_word(&self) -> i32 {
        self.error_bit_word
    }

    pub fn num_rw_buffer_overflow(&self) -> i32 {
        self.num_rw_buffer_overflow
    }

    pub fn set_num_rw_buffer_overflow(&mut self, count: i32) {
        self.num_rw_buffer_overflow = count;
    }

    /// Raw state word
    pub fn readout_state(&self) -> i32 {
        self.readout_state
    }

    /// Decoded state, `None` for codes outside the state machine
    pub fn state(&self) -> Option<ReadoutState> {
        ReadoutState::from_i32(self.readout_state)
    }

    pub fn set_readout_state(&mut self, state: ReadoutState) {
        self.readout_state = state as i32;
    }

    pub fn last_command(&self) -> i32 {
        self.last_command
    }

    pub fn last_command_status(&self) -> i32 {
        self.last_command_status
    }

    /// Command codes are stored as opaque integers
    pub fn set_last_command(&mut self, code: i32, status: i32) {
        self.last_command = code;
        self.last_command_status = status;
    }

    pub fn run_number(&self) -> i32 {
        self.run_number
    }

    pub fn set_run_number(&mut self, run_number: i32) {
        self.run_number = run_number;
    }

    pub fn num_events(&self) -> u64 {
        self.num_events
    }

    pub fn set_num_events(&mut self, count: u64) {
        self.num_events = count;
    }

    pub fn num_dma_loops(&self) -> u64 {
        self.num_dma_loops
    }

    pub fn set_num_dma_loops(&mut self, count: u64) {
        self.num_dma_loops = count;
    }

    pub fn received_mbytes(&self) -> u64 {
        self.received_mbytes
    }

    pub fn set_received_mbytes(&mut self, mbytes: u64) {
        self.received_mbytes = mbytes;
    }

    pub fn avg_event_size(&self) -> u64 {
        self.avg_event_size
    }

    pub fn set_avg_event_size(&mut self, size: u64) {
        self.avg_event_size = size;
    }

    pub fn num_files(&self) -> u64 {
        self.num_files
    }

    pub fn set_num_files(&mut self, count: u64) {
        self.num_files = count;
    }

    pub fn num_start_markers(&self) -> u64 {
        self.num_event_start_marker
    }

    pub fn set_start_markers(&mut self, count: u64) {
        self.num_event_start_marker = count;
    }

    pub fn num_end_markers(&self) -> u64 {
        self.num_event_end_marker
    }

    pub fn set_end_markers(&mut self, count: u64) {
        self.num_event_end_marker = count;
    }

    pub fn board_status(&self) -> &[i32] {
        &self.board_status
    }

    /// Copy board status words; fails if more are given than boards exist
    pub fn set_board_status(&mut self, status: &[i32]) -> Result<()> {
        if status.len() > self.board_status.len() {
            return Err(crate::DatamonError::IndexOutOfRange {
                index: status.len() - 1,
                bound: self.board_status.len(),
            });
        }
        self.board_status[..status.len()].copy_from_slice(status);
        Ok(())
    }
}

impl Metric for TpcReadoutMonitor {
    const NAME: &'static str = "TpcReadoutMonitor";

    fn wire_len(&self) -> usize {
        SCHEMA.len() + self.board_status.len()
    }

    fn serialize_into(&self, out: &mut Vec<Word>) {
        serialize_fields(&SCHEMA, self, out);
        push_array(out, &self.board_status);
    }

    fn read_from(&mut self, reader: &mut WordReader<'_>) -> Result<()> {
        reader.require(Self::NAME, self.wire_len())?;
        deserialize_fields(&SCHEMA, self, Self::NAME, reader)?;
        reader.read_array(Self::NAME, &mut self.board_status)?;
        Ok(())
    }

    fn clear(&mut self) {
        for field in SCHEMA.fields() {
            (field.set)(self, 0);
        }
        self.board_status.fill(0);
    }

    fn report(&self) -> String {
        let state = self
            .state()
            .map_or_else(|| format!("unknown ({})", self.readout_state), |s| s.to_string());
        let mut report = String::new();

        report.push_str("=== TpcReadoutMonitor ===\n");
        report.push_str(&format!("  error_bit_word: {:032b}\n", self.error_bit_word));
        report.push_str(&format!(
            "  num_rw_buffer_overflow: {}\n",
            self.num_rw_buffer_overflow
        ));
        report.push_str(&format!("  readout_state: {}\n", state));
        report.push_str(&format!("  last_command: {:#06x}\n", self.last_command));
        report.push_str(&format!(
            "  last_command_status: {}\n",
            self.last_command_status
        ));
        report.push_str(&format!("  run_number: {}\n", self.run_number));
        report.push_str(&format!("  num_events: {}\n", self.num_events));
        report.push_str(&format!("  num_dma_loops: {}\n", self.num_dma_loops));
        report.push_str(&format!("  received_mbytes: {}\n", self.received_mbytes));
        report.push_str(&format!("  avg_event_size: {}\n", self.avg_event_size));
        report.push_str(&format!("  num_files: {}\n", self.num_files));
        report.push_str(&format!(
            "  num_start_markers: {}\n",
            self.num_event_start_marker
        ));
        report.push_str(&format!("  num_end_markers: {}\n", self.num_event_end_marker));
        report.push_str(&format!("  board_status: {:x?}\n", self.board_status));

        report
    }
}

#[cfg(feature = "config-view")]
impl crate::view::DictView for TpcReadoutMonitor {
    fn to_dict(&self) -> crate::view::MetricDict {
        let mut dict = crate::view::MetricDict::new();
        dict.insert("error_bit_word".into(), self.error_bit_word.into());
        dict.insert(
            "num_rw_buffer_overflow".into(),
            self.num_rw_buffer_overflow.into(),
        );
        dict.insert("readout_state".into(), self.readout_state.into());
        dict.insert("last_command".into(), self.last_command.into());
        dict.insert(
            "last_command_status".into(),
            self.last_command_status.into(),
        );
        dict.insert("run_number".into(), self.run_number.into());
        dict.insert("num_events".into(), self.num_events.into());
        dict.insert("num_dma_loops".into(), self.num_dma_loops.into());
        dict.insert("received_mbytes".into(), self.received_mbytes.into());
        dict.insert("avg_event_size".into(), self.avg_event_size.into());
        dict.insert("num_files".into(), self.num_files.into());
        dict.insert(
            "num_start_markers".into(),
            self.num_event_start_marker.into(),
        );
        dict.insert("num_end_markers".into(), self.num_event_end_marker.into());
        dict.insert("board_status".into(), self.board_status.clone().into());
        dict
    }
}
