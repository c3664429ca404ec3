//! Command and telemetry code space
//!
//! Codes are 16-bit: the upper nibble names the subsystem, the low 12 bits
//! are the per-subsystem code. Metrics never interpret them; they are
//! stored as opaque integers (e.g. `last_command`).

use std::fmt;

/// Subsystem bits of a code
pub const SUBSYSTEM_MASK: u16 = 0xF000;

/// Reserved heartbeat code, outside every subsystem
pub const HEARTBEAT: u16 = 0xFFFF;

/// Subsystem owning a code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Subsystem {
    /// Hub computer
    Hub = 0x1000,
    /// Power distribution unit
    Pdu = 0x2000,
    Orchestrator = 0x3000,
    /// TPC readout
    ColumbiaReadout = 0x4000,
    /// Time-of-flight DAQ
    Tof = 0x5000,
    TofBias = 0x6000,
}

impl Subsystem {
    /// All subsystems
    pub const ALL: [Subsystem; 6] = [
        Subsystem::Hub,
        Subsystem::Pdu,
        Subsystem::Orchestrator,
        Subsystem::ColumbiaReadout,
        Subsystem::Tof,
        Subsystem::TofBias,
    ];

    /// Mask value of this subsystem
    pub fn mask(self) -> u16 {
        self as u16
    }

    /// Subsystem of a code, `None` for unassigned nibbles and the heartbeat
    pub fn of(code: u16) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| code & SUBSYSTEM_MASK == s.mask())
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Subsystem::Hub => "hub",
            Subsystem::Pdu => "pdu",
            Subsystem::Orchestrator => "orchestrator",
            Subsystem::ColumbiaReadout => "columbia readout",
            Subsystem::Tof => "tof",
            Subsystem::TofBias => "tof bias",
        };
        f.write_str(name)
    }
}

/// Place a per-subsystem code in its subsystem's range
pub const fn construct_code(code: u16, subsystem: Subsystem) -> u16 {
    code.wrapping_add(subsystem as u16)
}

/// True if `code` belongs to `subsystem`
pub fn is_subsystem(code: u16, subsystem: Subsystem) -> bool {
    code & SUBSYSTEM_MASK == subsystem.mask()
}

/// TPC readout commands
pub mod readout {
    use super::{construct_code, Subsystem};

    pub const CONFIGURE: u16 = construct_code(0x0, Subsystem::ColumbiaReadout);
    pub const START_RUN: u16 = construct_code(0x1, Subsystem::ColumbiaReadout);
    pub const STOP_RUN: u16 = construct_code(0x2, Subsystem::ColumbiaReadout);
    pub const RESET_RUN: u16 = construct_code(0x3, Subsystem::ColumbiaReadout);
    pub const BOOT_DAQ: u16 = construct_code(0x4, Subsystem::ColumbiaReadout);
    pub const BOOT_MONITOR: u16 = construct_code(0x5, Subsystem::ColumbiaReadout);
    pub const QUERY_HARDWARE_STATUS: u16 = construct_code(0x6, Subsystem::ColumbiaReadout);
    // Status link
    pub const HARDWARE_STATUS: u16 = construct_code(0x20, Subsystem::ColumbiaReadout);
    pub const CALLBACK: u16 = construct_code(0x21, Subsystem::ColumbiaReadout);
}

/// Orchestrator commands acting on the DAQ computer
pub mod orchestrator {
    use super::{construct_code, Subsystem};

    pub const EXEC_CPU_RESTART: u16 = construct_code(0x0, Subsystem::Orchestrator);
    pub const EXEC_CPU_SHUTDOWN: u16 = construct_code(0x1, Subsystem::Orchestrator);
    pub const BOOT_ALL_DAQ: u16 = construct_code(0x2, Subsystem::Orchestrator);
    pub const SHUTDOWN_ALL_DAQ: u16 = construct_code(0x3, Subsystem::Orchestrator);
    pub const START_COMPUTER_STATUS: u16 = construct_code(0x4, Subsystem::Orchestrator);
    pub const STOP_COMPUTER_STATUS: u16 = construct_code(0x5, Subsystem::Orchestrator);
    pub const INIT_PCIE_DRIVER: u16 = construct_code(0x6, Subsystem::Orchestrator);
}
