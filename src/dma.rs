use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{devices::Peripherals, error::ConfigError};

/// The three DMA channels of the V40's on-chip controller.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum DmaChannel {
    Channel0,
    Channel1,
    Channel2,
}

impl DmaChannel {
    pub const ALL: [DmaChannel; 3] = [Self::Channel0, Self::Channel1, Self::Channel2];

    pub fn index(self) -> usize {
        match self {
            DmaChannel::Channel0 => 0,
            DmaChannel::Channel1 => 1,
            DmaChannel::Channel2 => 2,
        }
    }
}

impl TryFrom<u8> for DmaChannel {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DmaChannel::Channel0),
            1 => Ok(DmaChannel::Channel1),
            2 => Ok(DmaChannel::Channel2),
            other => Err(other),
        }
    }
}

impl fmt::Display for DmaChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum DmaTarget {
    /// ISA slot, acknowledged on DACK line 0 of the bus.
    ExpansionBus,
    Floppy,
    Scsi,
}

impl DmaTarget {
    pub fn index(self) -> usize {
        match self {
            DmaTarget::ExpansionBus => 0,
            DmaTarget::Floppy => 1,
            DmaTarget::Scsi => 2,
        }
    }
}

/// DACK line of the expansion bus that channel 0 acknowledges (the slot's
/// DRQ1/DACK1 pair is numbered 0 on the bus side).
pub const EXPANSION_DACK_LINE: u8 = 0;

/// Fixed channel to peripheral routing for DMA acknowledge cycles. The
/// router only dispatches; it keeps no transfer state of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmaRouter {
    bindings: [DmaTarget; 3],
    // indexed by target
    channels: [DmaChannel; 3],
}

impl DmaRouter {
    pub fn new(bindings: [DmaTarget; 3]) -> Result<Self, ConfigError> {
        for (i, target) in bindings.iter().enumerate() {
            if bindings[i + 1..].contains(target) {
                return Err(ConfigError::DuplicateDmaBinding { target: *target });
            }
        }
        // three distinct targets over three channels: every target is bound
        let mut channels = [DmaChannel::Channel0; 3];
        for channel in DmaChannel::ALL {
            channels[bindings[channel.index()].index()] = channel;
        }

        Ok(Self { bindings, channels })
    }

    pub fn little_board() -> Result<Self, ConfigError> {
        Self::new([DmaTarget::ExpansionBus, DmaTarget::Floppy, DmaTarget::Scsi])
    }

    pub fn target(&self, channel: DmaChannel) -> DmaTarget {
        self.bindings[channel.index()]
    }

    /// DREQ input driven by a peripheral's DRQ line.
    pub fn channel_for(&self, target: DmaTarget) -> DmaChannel {
        self.channels[target.index()]
    }

    pub fn dma_read(&self, channel: DmaChannel, devices: &mut Peripherals) -> u8 {
        let data = match self.target(channel) {
            DmaTarget::ExpansionBus => devices.expansion_bus.dack_read(EXPANSION_DACK_LINE),
            DmaTarget::Floppy => devices.floppy.dma_read(),
            DmaTarget::Scsi => devices.scsi.dma_read(),
        };
        tracing::trace!("[DMA] [RD] [CH{}] = {:02X}", channel, data);
        data
    }

    pub fn dma_write(&self, channel: DmaChannel, data: u8, devices: &mut Peripherals) {
        tracing::trace!("[DMA] [WR] [CH{}] = {:02X}", channel, data);
        match self.target(channel) {
            DmaTarget::ExpansionBus => devices.expansion_bus.dack_write(EXPANSION_DACK_LINE, data),
            DmaTarget::Floppy => devices.floppy.dma_write(data),
            DmaTarget::Scsi => devices.scsi.dma_write(data),
        }
    }
}
