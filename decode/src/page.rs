// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fixed 256-byte memory pages of an SFF-8472 module.

/// The size in bytes of each memory page.
pub const PAGE_SIZE: usize = 256;

/// One of the two I2C pages an SFP module exposes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PageId {
    /// The identification page at I2C address 0xA0.
    A0,
    /// The diagnostics page at I2C address 0xA2.
    A2,
}

impl PageId {
    /// The I2C address of this page.
    pub const fn address(&self) -> u8 {
        match self {
            PageId::A0 => 0xa0,
            PageId::A2 => 0xa2,
        }
    }

    /// The page number carried in register-list frames for this page.
    ///
    /// The wire uses the 7-bit form of the I2C address.
    pub const fn wire_page(&self) -> u16 {
        match self {
            PageId::A0 => 0x50,
            PageId::A2 => 0x51,
        }
    }

    /// Map a wire page number to a page, accepting both the 7-bit and
    /// 8-bit addressing conventions.
    pub fn from_wire_page(page: u16) -> Option<Self> {
        match page {
            0x50 | 0xa0 => Some(PageId::A0),
            0x51 | 0xa2 => Some(PageId::A2),
            _ => None,
        }
    }
}

/// A single 256-byte memory page, registers addressed `0..=255`.
///
/// Pages are filled incrementally as register values arrive from a remote
/// device, so any register not yet written reads as zero.
#[derive(Clone, Eq, PartialEq)]
pub struct MemoryPage([u8; PAGE_SIZE]);

impl MemoryPage {
    pub const fn new() -> Self {
        Self([0; PAGE_SIZE])
    }

    /// Read the register at `index`.
    pub fn get(&self, index: u8) -> u8 {
        self.0[usize::from(index)]
    }

    /// Write the register at `index`.
    pub fn set(&mut self, index: u8, value: u8) {
        self.0[usize::from(index)] = value;
    }

    /// The full page contents.
    pub fn bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.0
    }

    /// Read the big-endian `u16` at registers `index` and `index + 1`.
    ///
    /// Returns `None` for index 255, where no second register exists; no
    /// defined field straddles the page end.
    pub fn word(&self, index: u8) -> Option<u16> {
        let i = usize::from(index);
        let hi = *self.0.get(i)?;
        let lo = *self.0.get(i + 1)?;
        Some(u16::from_be_bytes([hi, lo]))
    }

    /// Interpret the inclusive register range `start..=end` as an ASCII
    /// string, byte for byte.
    ///
    /// SFF-8472 pads its text fields with trailing spaces, and those are
    /// part of the field. No trimming is done here.
    pub fn ascii(&self, start: u8, end: u8) -> String {
        self.0[usize::from(start)..=usize::from(end)]
            .iter()
            .map(|&b| char::from(b))
            .collect()
    }

    /// The low 8 bits of the byte sum over the inclusive register range
    /// `start..=end`, as used by the map's checksum fields.
    pub fn checksum(&self, start: u8, end: u8) -> u8 {
        self.0[usize::from(start)..=usize::from(end)]
            .iter()
            .fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b))) as u8
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[u8; PAGE_SIZE]> for MemoryPage {
    fn from(bytes: [u8; PAGE_SIZE]) -> Self {
        Self(bytes)
    }
}

impl core::fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("MemoryPage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryPage;
    use super::PageId;
    use super::PAGE_SIZE;

    #[test]
    fn test_page_id() {
        assert_eq!(PageId::A0.address(), 0xa0);
        assert_eq!(PageId::A2.address(), 0xa2);
        assert_eq!(PageId::A0.wire_page(), 0x50);
        assert_eq!(PageId::A2.wire_page(), 0x51);
        for id in [PageId::A0, PageId::A2] {
            assert_eq!(PageId::from_wire_page(id.wire_page()), Some(id));
            assert_eq!(PageId::from_wire_page(u16::from(id.address())), Some(id));
        }
        assert_eq!(PageId::from_wire_page(0x52), None);
    }

    #[test]
    fn test_get_set() {
        let mut page = MemoryPage::new();
        assert_eq!(page.get(0), 0);
        assert_eq!(page.get(255), 0);
        page.set(96, 0x1f);
        page.set(255, 0xff);
        assert_eq!(page.get(96), 0x1f);
        assert_eq!(page.get(255), 0xff);
    }

    #[test]
    fn test_word() {
        let mut page = MemoryPage::new();
        page.set(60, 0x03);
        page.set(61, 0x52);
        assert_eq!(page.word(60), Some(850));
        assert_eq!(page.word(254), Some(0));
        // No register pairs with the last one.
        assert_eq!(page.word(255), None);
    }

    #[test]
    fn test_ascii_preserves_padding() {
        let mut bytes = [0u8; PAGE_SIZE];
        bytes[20..36].copy_from_slice(b"MENARA NETWORKS ");
        let page = MemoryPage::from(bytes);
        assert_eq!(page.ascii(20, 35), "MENARA NETWORKS ");
    }

    #[test]
    fn test_checksum() {
        let mut page = MemoryPage::new();
        page.set(0, 0xff);
        page.set(1, 0x02);
        assert_eq!(page.checksum(0, 62), 0x01);
        assert_eq!(page.checksum(1, 62), 0x02);
    }
}
