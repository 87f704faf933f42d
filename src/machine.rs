use anyhow::{bail, Context};

use crate::{
    bus::Bus,
    config::BoardConfig,
    decoder::{AddressDecoder, ADDRESS_MASK, ROM_SIZE},
    devices::{CpuLines, DmaDevice, ExpansionBus, IoDevice, Peripherals, Speaker, SystemBus},
    dma::{DmaChannel, DmaRouter, DmaTarget},
    error::ConfigError,
    interrupts::IrqSource,
    memory::RomArea,
    state::{InternalState, ReportState, SaveState},
    utils::hexdump,
};

/// Ampro Little Board/PC: a V40 with on-chip interrupt, DMA and timer
/// blocks, glued to a WD37C65C floppy controller, an NCR 53C80 SCSI
/// controller, an INS8250 UART and one 8-bit ISA slot.
#[derive(Debug)]
pub struct Machine {
    pub bus: Bus,
    iochck: bool,
}

impl Machine {
    pub fn builder() -> MachineBuilder {
        MachineBuilder::new()
    }

    /// Brings the board to its defined baseline. Port 0x61 is cleared, and
    /// its lines driven, before any peripheral sees its own reset.
    pub fn reset(&mut self) {
        tracing::info!("[MACHINE] Reset");
        self.bus.reset_control_port();
        self.bus.devices.reset();
        self.iochck = false;
    }

    pub fn decoder(&self) -> &AddressDecoder {
        &self.bus.decoder
    }

    /// CPU timer 2 output (OUT2), which feeds the speaker gate.
    pub fn on_speaker_data_changed(&mut self, level: bool) {
        self.bus.set_speaker_data(level);
    }

    pub fn set_irq(&mut self, source: IrqSource, level: bool) {
        tracing::trace!("[MACHINE] {:?} -> IRQ{} = {}", source, source.line(), level);
        self.bus.cpu_mut().set_irq(source.line(), level);
    }

    pub fn set_dma_request(&mut self, target: DmaTarget, level: bool) {
        let channel = self.bus.dma.channel_for(target);
        tracing::trace!("[MACHINE] {:?} -> DREQ{} = {}", target, channel, level);
        self.bus.cpu_mut().set_dma_request(channel, level);
    }

    /// I/O channel check from the expansion bus. Latched for inspection;
    /// nothing on the board acts on it.
    pub fn set_iochck(&mut self, level: bool) {
        if level != self.iochck {
            tracing::warn!("[MACHINE] IOCHCK {}", if level { "asserted" } else { "released" });
        }
        self.iochck = level;
    }

    pub fn iochck(&self) -> bool {
        self.iochck
    }

    pub fn speaker_level(&self) -> bool {
        self.bus.control_port.speaker_level()
    }

    pub fn save_state(&self) -> anyhow::Result<String> {
        let state = SaveState::new(self.bus.control_port.state());
        serde_json::to_string(&state).context("could not encode save state")
    }

    pub fn load_state(&mut self, json: &str) -> anyhow::Result<()> {
        let state: SaveState = serde_json::from_str(json).context("could not decode save state")?;
        if state.version != SaveState::VERSION {
            bail!(
                "save state version {} is not supported (expected {})",
                state.version,
                SaveState::VERSION
            );
        }

        tracing::info!("[MACHINE] Restoring port 0x61 = {:02X}", state.control_port.latch);
        let effects = self.bus.control_port.restore(state.control_port);
        self.bus.apply(effects);
        Ok(())
    }

    /// Dumps `start..=end` as the CPU sees it. Both ends are clamped to the
    /// 20-bit bus.
    pub fn memory_dump(&self, start: u32, end: u32) -> String {
        hexdump(
            |addr| self.bus.read_byte(addr),
            start.min(ADDRESS_MASK),
            end.min(ADDRESS_MASK),
        )
    }
}

impl SystemBus for Machine {
    fn read_byte(&mut self, address: u32) -> u8 {
        self.bus.read_byte(address)
    }

    fn write_byte(&mut self, address: u32, data: u8) {
        self.bus.write_byte(address, data);
    }

    fn port_in(&mut self, port: u16) -> u8 {
        self.bus.input(port)
    }

    fn port_out(&mut self, port: u16, data: u8) {
        self.bus.output(port, data);
    }

    fn dma_read(&mut self, channel: DmaChannel) -> u8 {
        self.bus.dma_read(channel)
    }

    fn dma_write(&mut self, channel: DmaChannel, data: u8) {
        self.bus.dma_write(channel, data);
    }
}

impl ReportState for Machine {
    fn report_state(&mut self) -> anyhow::Result<InternalState> {
        let port = &self.bus.control_port;
        Ok(InternalState {
            latch: port.read(),
            speaker_data: port.speaker_data(),
            speaker_level: port.speaker_level(),
            timer_gate: port.timer_gate(),
            iochck: self.iochck,
        })
    }
}

#[derive(Default)]
pub struct MachineBuilder {
    expansion_bus: Option<Box<dyn ExpansionBus>>,
    floppy: Option<Box<dyn DmaDevice>>,
    scsi: Option<Box<dyn DmaDevice>>,
    uart: Option<Box<dyn IoDevice>>,
    speaker: Option<Box<dyn Speaker>>,
    cpu: Option<Box<dyn CpuLines>>,
    rom: Vec<u8>,
    config: BoardConfig,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expansion_bus(&mut self, bus: impl ExpansionBus + 'static) -> &mut Self {
        self.expansion_bus = Some(Box::new(bus));
        self
    }

    pub fn floppy(&mut self, fdc: impl DmaDevice + 'static) -> &mut Self {
        self.floppy = Some(Box::new(fdc));
        self
    }

    pub fn scsi(&mut self, scsi: impl DmaDevice + 'static) -> &mut Self {
        self.scsi = Some(Box::new(scsi));
        self
    }

    pub fn uart(&mut self, uart: impl IoDevice + 'static) -> &mut Self {
        self.uart = Some(Box::new(uart));
        self
    }

    pub fn speaker(&mut self, speaker: impl Speaker + 'static) -> &mut Self {
        self.speaker = Some(Box::new(speaker));
        self
    }

    pub fn cpu(&mut self, cpu: impl CpuLines + 'static) -> &mut Self {
        self.cpu = Some(Box::new(cpu));
        self
    }

    pub fn rom(&mut self, image: &[u8]) -> &mut Self {
        self.rom = image.to_vec();
        self
    }

    pub fn config(&mut self, config: BoardConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Wires the board. The returned machine is in its power-on state:
    /// call [`Machine::reset`] before running the CPU.
    pub fn build(&mut self) -> Result<Machine, ConfigError> {
        let decoder = AddressDecoder::little_board()?;
        let dma = DmaRouter::little_board()?;

        if let Some(window) = decoder.window_at(self.config.control_port) {
            return Err(ConfigError::ControlPortConflict {
                port: self.config.control_port,
                window,
            });
        }

        let expansion_bus = self
            .expansion_bus
            .take()
            .ok_or(ConfigError::UnboundDmaChannel(dma.channel_for(DmaTarget::ExpansionBus)))?;
        let floppy = self
            .floppy
            .take()
            .ok_or(ConfigError::UnboundDmaChannel(dma.channel_for(DmaTarget::Floppy)))?;
        let scsi = self
            .scsi
            .take()
            .ok_or(ConfigError::UnboundDmaChannel(dma.channel_for(DmaTarget::Scsi)))?;
        let uart = self.uart.take().ok_or(ConfigError::MissingPeripheral("UART"))?;
        let speaker = self
            .speaker
            .take()
            .ok_or(ConfigError::MissingPeripheral("speaker"))?;
        let cpu = self.cpu.take().ok_or(ConfigError::MissingPeripheral("CPU"))?;

        let rom = RomArea::new(&self.rom, ROM_SIZE)?;

        let devices = Peripherals {
            expansion_bus,
            floppy,
            scsi,
            uart,
        };
        tracing::info!(
            "[MACHINE] Little Board/PC: {} regions, I/O windows {:?}, control port {:#06X}",
            decoder.regions().len(),
            devices.names(),
            self.config.control_port
        );
        let bus = Bus::new(decoder, dma, devices, rom, speaker, cpu, self.config);

        Ok(Machine { bus, iochck: false })
    }
}
