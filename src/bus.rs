use crate::{
    config::BoardConfig,
    control_port::{ControlPort, PortEffects},
    decoder::{AddressDecoder, IoTarget, MemoryKind, ADDRESS_MASK},
    devices::{CpuLines, Peripherals, Speaker},
    dma::{DmaChannel, DmaRouter},
    memory::{Area, RamArea, RomArea},
};

/// Routes CPU cycles to memory and peripherals and owns the port 0x61 latch
/// together with the two lines it drives.
#[derive(Debug)]
pub struct Bus {
    pub decoder: AddressDecoder,
    pub dma: DmaRouter,
    pub control_port: ControlPort,
    pub devices: Peripherals,

    ram: RamArea,
    rom: RomArea,

    speaker: Box<dyn Speaker>,
    cpu: Box<dyn CpuLines>,

    config: BoardConfig,
}

impl Bus {
    pub fn new(
        decoder: AddressDecoder,
        dma: DmaRouter,
        devices: Peripherals,
        rom: RomArea,
        speaker: Box<dyn Speaker>,
        cpu: Box<dyn CpuLines>,
        config: BoardConfig,
    ) -> Self {
        Self {
            decoder,
            dma,
            control_port: ControlPort::new(),
            devices,
            ram: RamArea::default(),
            rom,
            speaker,
            cpu,
            config,
        }
    }

    pub fn cpu_mut(&mut self) -> &mut dyn CpuLines {
        self.cpu.as_mut()
    }

    pub fn read_byte(&self, addr: u32) -> u8 {
        let region = self.decoder.decode_memory(addr);
        let offset = region.offset(addr & ADDRESS_MASK);
        match region.kind {
            MemoryKind::Ram => self.ram.read(offset),
            MemoryKind::Rom => self.rom.read(offset),
            MemoryKind::Unmapped => self.config.open_bus,
        }
    }

    pub fn write_byte(&mut self, addr: u32, data: u8) {
        let region = self.decoder.decode_memory(addr);
        let offset = region.offset(addr & ADDRESS_MASK);
        match region.kind {
            MemoryKind::Ram => self.ram.write(offset, data),
            MemoryKind::Rom => self.rom.write(offset, data),
            MemoryKind::Unmapped => {
                tracing::trace!("[BUS] Write to unmapped address {:05X} = {:02X}", addr, data);
            }
        }
    }

    pub fn input(&mut self, port: u16) -> u8 {
        if port == self.config.control_port {
            return self.control_port.read();
        }

        let window = self.decoder.decode_io(port);
        let offset = window.offset(port);
        let (name, value) = match window.target {
            IoTarget::Scsi => (self.devices.scsi.name(), self.devices.scsi.read(offset)),
            IoTarget::Floppy => (self.devices.floppy.name(), self.devices.floppy.read(offset)),
            IoTarget::Uart => (self.devices.uart.name(), self.devices.uart.read(offset)),
            IoTarget::Unmapped => {
                tracing::trace!("[BUS] Invalid port {:04X} read", port);
                return self.config.open_bus;
            }
        };
        tracing::trace!("[BUS] [RD] [{}+{}] [{:04X}] = {:02X}", name, offset, port, value);
        value
    }

    pub fn output(&mut self, port: u16, data: u8) {
        if port == self.config.control_port {
            let effects = self.control_port.write(data);
            self.apply(effects);
            return;
        }

        let window = self.decoder.decode_io(port);
        let offset = window.offset(port);
        let name = match window.target {
            IoTarget::Scsi => {
                self.devices.scsi.write(offset, data);
                self.devices.scsi.name()
            }
            IoTarget::Floppy => {
                self.devices.floppy.write(offset, data);
                self.devices.floppy.name()
            }
            IoTarget::Uart => {
                self.devices.uart.write(offset, data);
                self.devices.uart.name()
            }
            IoTarget::Unmapped => {
                tracing::trace!("[BUS] Invalid port {:04X} write = {:02X}", port, data);
                return;
            }
        };
        tracing::trace!("[BUS] [WR] [{}+{}] [{:04X}] = {:02X}", name, offset, port, data);
    }

    pub fn dma_read(&mut self, channel: DmaChannel) -> u8 {
        self.dma.dma_read(channel, &mut self.devices)
    }

    pub fn dma_write(&mut self, channel: DmaChannel, data: u8) {
        self.dma.dma_write(channel, data, &mut self.devices);
    }

    /// Timer 2 output, the speaker data line.
    pub fn set_speaker_data(&mut self, level: bool) {
        if let Some(level) = self.control_port.on_speaker_data_changed(level) {
            self.speaker.set_level(level);
        }
    }

    /// Drives the timer gate and, when the port asks for it, the speaker.
    pub fn apply(&mut self, effects: PortEffects) {
        self.cpu.set_timer_gate(effects.timer_gate);
        if let Some(level) = effects.speaker {
            self.speaker.set_level(level);
        }
    }

    pub fn reset_control_port(&mut self) {
        let effects = self.control_port.reset();
        self.apply(effects);
    }
}
