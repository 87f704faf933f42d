use serde::{Deserialize, Serialize};

use crate::control_port::ControlPortState;

/// Observable state of the board glue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct InternalState {
    // port 0x61
    pub latch: u8,
    pub speaker_data: bool,

    // driven lines
    pub speaker_level: bool,
    pub timer_gate: bool,

    pub iochck: bool,
}

/// What a save state carries. Everything else is rebuilt from the
/// configuration or owned by the peripherals themselves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct SaveState {
    pub version: u32,
    pub control_port: ControlPortState,
}

impl SaveState {
    pub const VERSION: u32 = 1;

    pub fn new(control_port: ControlPortState) -> Self {
        Self {
            version: Self::VERSION,
            control_port,
        }
    }
}

pub trait ReportState {
    fn report_state(&mut self) -> anyhow::Result<InternalState>;
}
