use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Board options that do not change the wiring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoardConfig {
    /// Value returned by reads nothing answers.
    pub open_bus: u8,
    /// Port of the speaker/timer-gate control latch.
    pub control_port: u16,
}

impl BoardConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid board configuration")
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            open_bus: 0xFF,
            control_port: 0x61,
        }
    }
}
