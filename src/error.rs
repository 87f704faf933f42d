use thiserror::Error;

use crate::{
    decoder::{IoWindow, MemoryRegion},
    dma::{DmaChannel, DmaTarget},
};

/// Errors raised while wiring the board together. Any of these means the
/// machine must not start.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("memory regions overlap: {first} and {second}")]
    OverlappingRegions {
        first: MemoryRegion,
        second: MemoryRegion,
    },

    #[error("I/O windows overlap: {first} and {second}")]
    OverlappingWindows { first: IoWindow, second: IoWindow },

    #[error("memory region has no size or leaves the 1 MiB address space: {0}")]
    InvalidRegion(MemoryRegion),

    #[error("I/O window has no size or leaves the 64 KiB port space: {0}")]
    InvalidWindow(IoWindow),

    #[error("control port {port:#06X} falls inside {window}")]
    ControlPortConflict { port: u16, window: IoWindow },

    #[error("{target:?} is bound to more than one DMA channel")]
    DuplicateDmaBinding { target: DmaTarget },

    #[error("DMA channel {0} has no peripheral bound")]
    UnboundDmaChannel(DmaChannel),

    #[error("no {0} was supplied")]
    MissingPeripheral(&'static str),

    #[error("ROM image is {size:#X} bytes, the socket holds {capacity:#X}")]
    RomTooLarge { size: usize, capacity: usize },
}
