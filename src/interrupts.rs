use serde::{Deserialize, Serialize};

/// Request lines wired to the V40's interrupt controller.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum IrqSource {
    /// ISA IRQ2
    ExpansionIrq2,
    /// ISA IRQ3
    ExpansionIrq3,
    Uart,
    /// ISA IRQ5
    ExpansionIrq5,
    Floppy,
}

impl IrqSource {
    pub const ALL: [IrqSource; 5] = [
        Self::ExpansionIrq2,
        Self::ExpansionIrq3,
        Self::Uart,
        Self::ExpansionIrq5,
        Self::Floppy,
    ];

    /// CPU interrupt input the source is wired to.
    pub fn line(self) -> u8 {
        match self {
            IrqSource::ExpansionIrq2 => 2,
            IrqSource::ExpansionIrq3 => 3,
            IrqSource::Uart => 4,
            IrqSource::ExpansionIrq5 => 5,
            IrqSource::Floppy => 6,
        }
    }
}
