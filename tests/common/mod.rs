#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use littleboard::{
    CpuLines, DmaChannel, DmaDevice, ExpansionBus, IoDevice, Machine, MachineBuilder, Speaker,
};

/// Everything the mock collaborators observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Read(&'static str, u16),
    Write(&'static str, u16, u8),
    DmaRead(&'static str),
    DmaWrite(&'static str, u8),
    DackRead(u8),
    DackWrite(u8, u8),
    Reset(&'static str),
    Speaker(bool),
    TimerGate(bool),
    Irq(u8, bool),
    Dreq(DmaChannel, bool),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

#[derive(Debug)]
pub struct MockDevice {
    pub name: &'static str,
    pub log: Log,
    pub value: u8,
}

impl IoDevice for MockDevice {
    fn read(&mut self, offset: u16) -> u8 {
        self.log.borrow_mut().push(Event::Read(self.name, offset));
        self.value.wrapping_add(offset as u8)
    }

    fn write(&mut self, offset: u16, data: u8) {
        self.log
            .borrow_mut()
            .push(Event::Write(self.name, offset, data));
    }

    fn reset(&mut self) {
        self.log.borrow_mut().push(Event::Reset(self.name));
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl DmaDevice for MockDevice {
    fn dma_read(&mut self) -> u8 {
        self.log.borrow_mut().push(Event::DmaRead(self.name));
        self.value
    }

    fn dma_write(&mut self, data: u8) {
        self.log.borrow_mut().push(Event::DmaWrite(self.name, data));
    }
}

#[derive(Debug)]
pub struct MockIsa {
    pub log: Log,
}

impl ExpansionBus for MockIsa {
    fn dack_read(&mut self, line: u8) -> u8 {
        self.log.borrow_mut().push(Event::DackRead(line));
        0xE0
    }

    fn dack_write(&mut self, line: u8, data: u8) {
        self.log.borrow_mut().push(Event::DackWrite(line, data));
    }

    fn reset(&mut self) {
        self.log.borrow_mut().push(Event::Reset("isa"));
    }
}

#[derive(Debug)]
pub struct MockSpeaker {
    pub log: Log,
}

impl Speaker for MockSpeaker {
    fn set_level(&mut self, level: bool) {
        self.log.borrow_mut().push(Event::Speaker(level));
    }
}

#[derive(Debug)]
pub struct MockCpu {
    pub log: Log,
}

impl CpuLines for MockCpu {
    fn set_timer_gate(&mut self, level: bool) {
        self.log.borrow_mut().push(Event::TimerGate(level));
    }

    fn set_irq(&mut self, line: u8, level: bool) {
        self.log.borrow_mut().push(Event::Irq(line, level));
    }

    fn set_dma_request(&mut self, channel: DmaChannel, level: bool) {
        self.log.borrow_mut().push(Event::Dreq(channel, level));
    }
}

/// Builder with every collaborator wired to `log`.
pub fn builder(log: &Log) -> MachineBuilder {
    let mut builder = MachineBuilder::new();
    builder
        .expansion_bus(MockIsa { log: log.clone() })
        .floppy(MockDevice {
            name: "fdc",
            log: log.clone(),
            value: 0x10,
        })
        .scsi(MockDevice {
            name: "scsi",
            log: log.clone(),
            value: 0x20,
        })
        .uart(MockDevice {
            name: "uart",
            log: log.clone(),
            value: 0x30,
        })
        .speaker(MockSpeaker { log: log.clone() })
        .cpu(MockCpu { log: log.clone() });
    builder
}

pub fn machine(log: &Log) -> Machine {
    builder(log).build().unwrap()
}

pub fn speaker_events(log: &Log) -> Vec<bool> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Speaker(level) => Some(*level),
            _ => None,
        })
        .collect()
}

/// Last level driven onto the speaker, if any.
pub fn speaker(log: &Log) -> Option<bool> {
    speaker_events(log).last().copied()
}
