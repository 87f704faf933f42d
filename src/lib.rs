pub mod bus;
pub mod config;
pub mod control_port;
pub mod decoder;
pub mod devices;
pub mod dma;
pub mod error;
pub mod interrupts;
pub mod machine;
pub mod memory;
pub mod state;
pub mod utils;

pub use config::BoardConfig;
pub use control_port::{ControlPort, GateTransition, PortEffects};
pub use decoder::{AddressDecoder, IoTarget, IoWindow, MemoryKind, MemoryRegion};
pub use devices::{CpuLines, DmaDevice, ExpansionBus, IoDevice, Speaker, SystemBus};
pub use dma::{DmaChannel, DmaRouter, DmaTarget};
pub use error::ConfigError;
pub use interrupts::IrqSource;
pub use machine::{Machine, MachineBuilder};
pub use state::{InternalState, ReportState};
pub use utils::hexdump;

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `tracing` subscriber filtered by `RUST_LOG`. Does
/// nothing if one is already set.
pub fn init_logging() {
    let _ = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
