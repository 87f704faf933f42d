use std::fmt::Debug;

use derivative::Derivative;

use crate::{decoder::RAM_SIZE, error::ConfigError};

/// Backing storage behind a decoded memory region. Addresses are offsets
/// into the region.
pub trait Area: Debug {
    fn read(&self, offset: u32) -> u8;
    fn write(&mut self, offset: u32, value: u8);
    fn size(&self) -> u32;
}

#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub struct RamArea {
    pub size: u32,
    #[derivative(Debug = "ignore")]
    pub data: Vec<u8>,
}

impl RamArea {
    pub fn new(size: u32) -> Self {
        RamArea {
            size,
            data: vec![0x00; size as usize],
        }
    }
}

impl Default for RamArea {
    fn default() -> Self {
        Self::new(RAM_SIZE)
    }
}

impl Area for RamArea {
    fn read(&self, offset: u32) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0xFF)
    }

    fn write(&mut self, offset: u32, value: u8) {
        if let Some(cell) = self.data.get_mut(offset as usize) {
            *cell = value;
        }
    }

    fn size(&self) -> u32 {
        self.size
    }
}

#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub struct RomArea {
    pub size: u32,
    #[derivative(Debug = "ignore")]
    pub data: Vec<u8>,
}

impl RomArea {
    /// Places `image` in a socket of `size` bytes. Images smaller than the
    /// socket repeat through it, as they would on the unconnected upper
    /// address lines.
    pub fn new(image: &[u8], size: u32) -> Result<Self, ConfigError> {
        if image.len() > size as usize {
            return Err(ConfigError::RomTooLarge {
                size: image.len(),
                capacity: size as usize,
            });
        }

        let data = if image.is_empty() {
            vec![0xFF; size as usize]
        } else {
            image.iter().copied().cycle().take(size as usize).collect()
        };

        Ok(RomArea { size, data })
    }
}

impl Area for RomArea {
    fn read(&self, offset: u32) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0xFF)
    }

    fn write(&mut self, offset: u32, value: u8) {
        tracing::trace!(
            "Attempt to write {:02X} to ROM offset {:#06X}",
            value,
            offset
        );
    }

    fn size(&self) -> u32 {
        self.size
    }
}
