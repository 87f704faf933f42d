use serde::{Deserialize, Serialize};

/// Latch value before firmware initialises the port.
pub const POWER_ON_VALUE: u8 = 0xFF;

pub const TIMER_GATE_BIT: u8 = 0x01;
pub const SPEAKER_ENABLE_BIT: u8 = 0x02;

/// Effect of a control-port write on the speaker, keyed on bit 1 of the old
/// and new latch values.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GateTransition {
    /// 0 -> 1: drive the speaker with the live data bit.
    Enable,
    /// 1 -> 0: force the speaker low.
    Disable,
    /// 0 -> 0 or 1 -> 1: leave the speaker alone.
    Hold,
}

impl GateTransition {
    pub fn from_bits(old: bool, new: bool) -> Self {
        match (old, new) {
            (false, true) => GateTransition::Enable,
            (true, false) => GateTransition::Disable,
            (false, false) | (true, true) => GateTransition::Hold,
        }
    }

    pub fn speaker_level(self, speaker_data: bool) -> Option<bool> {
        match self {
            GateTransition::Enable => Some(speaker_data),
            GateTransition::Disable => Some(false),
            GateTransition::Hold => None,
        }
    }
}

/// Line changes produced by one operation on the port, to be applied by the
/// owner before anything else observes the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PortEffects {
    pub timer_gate: bool,
    pub speaker: Option<bool>,
}

/// The part of the port that survives a save state.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlPortState {
    pub latch: u8,
    pub speaker_data: bool,
}

/// Port 0x61. Bit 0 gates CPU timer 2, bit 1 gates timer 2's output onto
/// the speaker. Bits 2-7 are latched and read back but drive nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPort {
    latch: u8,
    speaker_data: bool,
    speaker_level: bool,
}

impl ControlPort {
    pub fn new() -> Self {
        ControlPort::default()
    }

    pub fn reset(&mut self) -> PortEffects {
        self.write(0)
    }

    pub fn read(&self) -> u8 {
        tracing::trace!("[PORT61] [RD] = {:02X}", self.latch);
        self.latch
    }

    pub fn write(&mut self, value: u8) -> PortEffects {
        let transition = GateTransition::from_bits(
            self.latch & SPEAKER_ENABLE_BIT != 0,
            value & SPEAKER_ENABLE_BIT != 0,
        );
        let speaker = transition.speaker_level(self.speaker_data);
        if let Some(level) = speaker {
            self.speaker_level = level;
        }

        tracing::trace!(
            "[PORT61] [WR] {:02X} -> {:02X} ({:?})",
            self.latch,
            value,
            transition
        );
        self.latch = value;

        PortEffects {
            timer_gate: value & TIMER_GATE_BIT != 0,
            speaker,
        }
    }

    /// Timer 2 output changed. Returns the level to drive onto the speaker
    /// when the gate is open.
    pub fn on_speaker_data_changed(&mut self, bit: bool) -> Option<bool> {
        self.speaker_data = bit;
        if self.speaker_enabled() {
            self.speaker_level = bit;
            Some(bit)
        } else {
            None
        }
    }

    pub fn speaker_enabled(&self) -> bool {
        self.latch & SPEAKER_ENABLE_BIT != 0
    }

    pub fn timer_gate(&self) -> bool {
        self.latch & TIMER_GATE_BIT != 0
    }

    pub fn speaker_data(&self) -> bool {
        self.speaker_data
    }

    /// Level last driven onto the speaker.
    pub fn speaker_level(&self) -> bool {
        self.speaker_level
    }

    pub fn state(&self) -> ControlPortState {
        ControlPortState {
            latch: self.latch,
            speaker_data: self.speaker_data,
        }
    }

    /// Reloads a saved latch and re-derives both lines from it.
    pub fn restore(&mut self, state: ControlPortState) -> PortEffects {
        self.latch = state.latch;
        self.speaker_data = state.speaker_data;
        self.speaker_level = self.speaker_enabled() && self.speaker_data;

        PortEffects {
            timer_gate: self.timer_gate(),
            speaker: Some(self.speaker_level),
        }
    }
}

impl Default for ControlPort {
    fn default() -> Self {
        ControlPort {
            latch: POWER_ON_VALUE,
            speaker_data: false,
            speaker_level: false,
        }
    }
}
