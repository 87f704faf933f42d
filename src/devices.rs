//! Contracts for the collaborators the board glue is wired to. The devices
//! themselves (UART, floppy and SCSI controllers, ISA slot, speaker and the
//! CPU's own input lines) are implemented elsewhere.

use std::fmt::Debug;

use crate::dma::DmaChannel;

/// A peripheral with a register window on the I/O bus. `offset` is relative
/// to the base of the window the decoder matched.
pub trait IoDevice: Debug {
    fn read(&mut self, offset: u16) -> u8;
    fn write(&mut self, offset: u16, data: u8);

    fn reset(&mut self) {}

    fn name(&self) -> &'static str;
}

/// A peripheral that also takes part in DMA transfers. Acknowledges are
/// forwarded whether or not the device has a transfer armed.
pub trait DmaDevice: IoDevice {
    fn dma_read(&mut self) -> u8;
    fn dma_write(&mut self, data: u8);
}

/// The 8-bit ISA expansion bus.
pub trait ExpansionBus: Debug {
    fn dack_read(&mut self, line: u8) -> u8;
    fn dack_write(&mut self, line: u8, data: u8);

    fn reset(&mut self) {}
}

pub trait Speaker: Debug {
    fn set_level(&mut self, level: bool);
}

/// Input lines of the host CPU that the board drives.
pub trait CpuLines: Debug {
    /// TCTL2: gate input of the CPU's internal timer channel 2.
    fn set_timer_gate(&mut self, level: bool);

    fn set_irq(&mut self, line: u8, level: bool);

    fn set_dma_request(&mut self, channel: DmaChannel, level: bool);
}

/// The view of the board seen by the CPU.
pub trait SystemBus {
    fn read_byte(&mut self, address: u32) -> u8;
    fn write_byte(&mut self, address: u32, data: u8);
    fn port_in(&mut self, port: u16) -> u8;
    fn port_out(&mut self, port: u16, data: u8);
    fn dma_read(&mut self, channel: DmaChannel) -> u8;
    fn dma_write(&mut self, channel: DmaChannel, data: u8);
}

/// Every peripheral the board routes cycles to.
#[derive(Debug)]
pub struct Peripherals {
    pub expansion_bus: Box<dyn ExpansionBus>,
    pub floppy: Box<dyn DmaDevice>,
    pub scsi: Box<dyn DmaDevice>,
    pub uart: Box<dyn IoDevice>,
}

impl Peripherals {
    /// Names of the devices with register windows, in decode order.
    pub fn names(&self) -> [&'static str; 3] {
        [self.scsi.name(), self.floppy.name(), self.uart.name()]
    }

    pub fn reset(&mut self) {
        self.expansion_bus.reset();
        self.floppy.reset();
        self.scsi.reset();
        self.uart.reset();
    }
}
