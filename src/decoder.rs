use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Size of the 20-bit physical address space.
pub const ADDRESS_SPACE: u32 = 0x10_0000;
pub const ADDRESS_MASK: u32 = ADDRESS_SPACE - 1;

/// Size of the 16-bit I/O port space.
pub const PORT_SPACE: u32 = 0x1_0000;

pub const RAM_BASE: u32 = 0x00000;
pub const RAM_SIZE: u32 = 0xA0000;
pub const ROM_BASE: u32 = 0xF8000;
pub const ROM_SIZE: u32 = 0x08000;

pub const SCSI_PORT: u16 = 0x330;
pub const FDC_PORT: u16 = 0x370;
pub const UART_PORT: u16 = 0x3F8;

// +-----------------+---------------------------------------------+
// | Range           | Description                                 |
// +-----------------+---------------------------------------------+
// | 0x00000-0x9FFFF | DRAM (256K, 512K or 768K fitted)            |
// | 0xE0000-0xEFFFF | Empty socket                                |
// | 0xF0000-0xF7FFF | Empty socket                                |
// | 0xF8000-0xFFFFF | BIOS ROM                                    |
// +-----------------+---------------------------------------------+
// | 0x0330-0x0337   | NCR 53C80 SCSI controller                   |
// | 0x0370-0x0377   | WD37C65C floppy controller                  |
// | 0x03F8-0x03FF   | INS8250 UART                                |
// +-----------------+---------------------------------------------+

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum MemoryKind {
    Ram,
    Rom,
    Unmapped,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct MemoryRegion {
    pub base: u32,
    pub size: u32,
    pub kind: MemoryKind,
}

impl MemoryRegion {
    pub fn new(base: u32, size: u32, kind: MemoryKind) -> Self {
        Self { base, size, kind }
    }

    /// First address past the region.
    pub fn end(&self) -> u32 {
        self.base.saturating_add(self.size)
    }

    fn fits(&self) -> bool {
        self.size != 0
            && self
                .base
                .checked_add(self.size)
                .is_some_and(|end| end <= ADDRESS_SPACE)
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.base && address < self.end()
    }

    pub fn offset(&self, address: u32) -> u32 {
        address - self.base
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:05X} - 0x{:05X} ({:?})",
            self.base,
            self.end().saturating_sub(1),
            self.kind
        )
    }
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum IoTarget {
    Scsi,
    Floppy,
    Uart,
    Unmapped,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct IoWindow {
    pub base: u16,
    /// Widened past u16 so a window can cover the whole port space.
    pub size: u32,
    pub target: IoTarget,
}

impl IoWindow {
    pub fn new(base: u16, size: u32, target: IoTarget) -> Self {
        Self { base, size, target }
    }

    /// First port past the window.
    pub fn end(&self) -> u32 {
        (self.base as u32).saturating_add(self.size)
    }

    fn fits(&self) -> bool {
        self.size != 0
            && (self.base as u32)
                .checked_add(self.size)
                .is_some_and(|end| end <= PORT_SPACE)
    }

    pub fn contains(&self, port: u16) -> bool {
        (port as u32) >= self.base as u32 && (port as u32) < self.end()
    }

    pub fn offset(&self, port: u16) -> u16 {
        port - self.base
    }
}

impl fmt::Display for IoWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:04X} - 0x{:04X} ({:?})",
            self.base,
            self.end().saturating_sub(1),
            self.target
        )
    }
}

/// Resolves CPU memory and I/O cycles to the region or register window that
/// services them. Both lookups are total: a miss yields an `Unmapped` region
/// covering the gap the address fell into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDecoder {
    regions: Vec<MemoryRegion>,
    windows: Vec<IoWindow>,
}

impl AddressDecoder {
    pub fn new(
        mut regions: Vec<MemoryRegion>,
        mut windows: Vec<IoWindow>,
    ) -> Result<Self, ConfigError> {
        for region in &regions {
            if !region.fits() {
                return Err(ConfigError::InvalidRegion(*region));
            }
        }
        for window in &windows {
            if !window.fits() {
                return Err(ConfigError::InvalidWindow(*window));
            }
        }

        regions.sort_by_key(|r| r.base);
        windows.sort_by_key(|w| w.base);

        if let Some(pair) = regions.windows(2).find(|p| p[0].end() > p[1].base) {
            return Err(ConfigError::OverlappingRegions {
                first: pair[0],
                second: pair[1],
            });
        }
        if let Some(pair) = windows
            .windows(2)
            .find(|p| p[0].end() > p[1].base as u32)
        {
            return Err(ConfigError::OverlappingWindows {
                first: pair[0],
                second: pair[1],
            });
        }

        Ok(Self { regions, windows })
    }

    /// The Little Board/PC map.
    pub fn little_board() -> Result<Self, ConfigError> {
        Self::new(
            vec![
                MemoryRegion::new(RAM_BASE, RAM_SIZE, MemoryKind::Ram),
                MemoryRegion::new(0xE0000, 0x10000, MemoryKind::Unmapped),
                MemoryRegion::new(0xF0000, 0x08000, MemoryKind::Unmapped),
                MemoryRegion::new(ROM_BASE, ROM_SIZE, MemoryKind::Rom),
            ],
            vec![
                IoWindow::new(SCSI_PORT, 8, IoTarget::Scsi),
                IoWindow::new(FDC_PORT, 8, IoTarget::Floppy),
                IoWindow::new(UART_PORT, 8, IoTarget::Uart),
            ],
        )
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    pub fn windows(&self) -> &[IoWindow] {
        &self.windows
    }

    pub fn decode_memory(&self, address: u32) -> MemoryRegion {
        let address = address & ADDRESS_MASK;
        let next = self.regions.partition_point(|r| r.base <= address);

        let gap_start = match next.checked_sub(1).map(|i| self.regions[i]) {
            Some(region) if region.contains(address) => return region,
            Some(region) => region.end(),
            None => 0,
        };
        let gap_end = self
            .regions
            .get(next)
            .map_or(ADDRESS_SPACE, |r| r.base);

        MemoryRegion::new(gap_start, gap_end - gap_start, MemoryKind::Unmapped)
    }

    pub fn decode_io(&self, port: u16) -> IoWindow {
        let next = self.windows.partition_point(|w| w.base <= port);

        let gap_start = match next.checked_sub(1).map(|i| self.windows[i]) {
            Some(window) if window.contains(port) => return window,
            Some(window) => window.end(),
            None => 0,
        };
        let gap_end = self
            .windows
            .get(next)
            .map_or(PORT_SPACE, |w| w.base as u32);

        IoWindow::new(gap_start as u16, gap_end - gap_start, IoTarget::Unmapped)
    }

    /// Window containing `port`, if it is claimed by a peripheral.
    pub fn window_at(&self, port: u16) -> Option<IoWindow> {
        let window = self.decode_io(port);
        (window.target != IoTarget::Unmapped).then_some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> AddressDecoder {
        AddressDecoder::little_board().unwrap()
    }

    #[test]
    fn test_memory_map() {
        let decoder = decoder();

        for address in (0x00000..=0x9FFFF).step_by(0x101).chain([0x9FFFF]) {
            assert_eq!(decoder.decode_memory(address).kind, MemoryKind::Ram);
        }
        for address in 0xF8000..=0xFFFFF {
            assert_eq!(decoder.decode_memory(address).kind, MemoryKind::Rom);
        }
        for address in [0xA0000, 0xB8000, 0xDFFFF, 0xE0000, 0xEFFFF, 0xF0000, 0xF7FFF] {
            assert_eq!(
                decoder.decode_memory(address).kind,
                MemoryKind::Unmapped,
                "{:#07X}",
                address
            );
        }
    }

    #[test]
    fn test_unmapped_gap_is_reported() {
        let region = decoder().decode_memory(0xB8000);
        assert_eq!(region.base, 0xA0000);
        assert_eq!(region.end(), 0xE0000);

        let socket = decoder().decode_memory(0xE1234);
        assert_eq!(socket, MemoryRegion::new(0xE0000, 0x10000, MemoryKind::Unmapped));
    }

    #[test]
    fn test_address_is_masked_to_20_bits() {
        assert_eq!(decoder().decode_memory(0x1FFFF0).kind, MemoryKind::Rom);
        assert_eq!(decoder().decode_memory(0x100010).kind, MemoryKind::Ram);
    }

    #[test]
    fn test_io_map() {
        let decoder = decoder();

        for port in 0..=0xFFFFu16 {
            let expected = match port {
                0x330..=0x337 => IoTarget::Scsi,
                0x370..=0x377 => IoTarget::Floppy,
                0x3F8..=0x3FF => IoTarget::Uart,
                _ => IoTarget::Unmapped,
            };
            assert_eq!(decoder.decode_io(port).target, expected, "{:#06X}", port);
        }

        let uart = decoder.decode_io(0x3FD);
        assert_eq!(uart.base, 0x3F8);
        assert_eq!(uart.offset(0x3FD), 5);
    }

    #[test]
    fn test_io_gap() {
        let gap = decoder().decode_io(0x61);
        assert_eq!(gap.base, 0);
        assert_eq!(gap.end(), 0x330);

        let tail = decoder().decode_io(0xFFFF);
        assert_eq!(tail.base, 0x400);
        assert_eq!(tail.target, IoTarget::Unmapped);
    }

    #[test]
    fn test_overlapping_regions_rejected() {
        let result = AddressDecoder::new(
            vec![
                MemoryRegion::new(0xF8000, 0x8000, MemoryKind::Rom),
                MemoryRegion::new(0x00000, 0xF9000, MemoryKind::Ram),
            ],
            vec![],
        );
        assert!(matches!(result, Err(ConfigError::OverlappingRegions { .. })));
    }

    #[test]
    fn test_overlapping_windows_rejected() {
        let result = AddressDecoder::new(
            vec![],
            vec![
                IoWindow::new(0x370, 8, IoTarget::Floppy),
                IoWindow::new(0x374, 8, IoTarget::Scsi),
            ],
        );
        assert_eq!(
            result,
            Err(ConfigError::OverlappingWindows {
                first: IoWindow::new(0x370, 8, IoTarget::Floppy),
                second: IoWindow::new(0x374, 8, IoTarget::Scsi),
            })
        );
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        let empty = AddressDecoder::new(vec![MemoryRegion::new(0, 0, MemoryKind::Ram)], vec![]);
        assert!(matches!(empty, Err(ConfigError::InvalidRegion(_))));

        let too_far = AddressDecoder::new(
            vec![MemoryRegion::new(0xF8000, 0x10000, MemoryKind::Rom)],
            vec![],
        );
        assert!(matches!(too_far, Err(ConfigError::InvalidRegion(_))));

        let window = AddressDecoder::new(vec![], vec![IoWindow::new(0xFFFC, 8, IoTarget::Uart)]);
        assert!(matches!(window, Err(ConfigError::InvalidWindow(_))));
    }

    #[test]
    fn test_region_past_32_bits_rejected() {
        let region = MemoryRegion::new(0xFFFF_F000, 0x2000, MemoryKind::Ram);
        let result = AddressDecoder::new(vec![region], vec![]);
        assert_eq!(result, Err(ConfigError::InvalidRegion(region)));

        let beyond = MemoryRegion::new(ADDRESS_SPACE, 0x10, MemoryKind::Rom);
        let result = AddressDecoder::new(vec![beyond], vec![]);
        assert_eq!(result, Err(ConfigError::InvalidRegion(beyond)));
        assert!(ConfigError::InvalidRegion(region).to_string().contains("0xFFFFF000"));

        let window = IoWindow::new(0x10, u32::MAX, IoTarget::Scsi);
        let result = AddressDecoder::new(vec![], vec![window]);
        assert_eq!(result, Err(ConfigError::InvalidWindow(window)));
    }

    #[test]
    fn test_empty_decoder_is_all_open_bus() {
        let decoder = AddressDecoder::new(vec![], vec![]).unwrap();
        let region = decoder.decode_memory(0x12345);
        assert_eq!(region, MemoryRegion::new(0, ADDRESS_SPACE, MemoryKind::Unmapped));
        assert_eq!(decoder.decode_io(0x1234).target, IoTarget::Unmapped);

        let whole = decoder.decode_io(0xFFFF);
        assert_eq!(whole, IoWindow::new(0, PORT_SPACE, IoTarget::Unmapped));
        assert!(whole.contains(0xFFFF));
    }
}
