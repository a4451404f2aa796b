// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The in-host model of an SFF-8472 module's memory map.

use crate::convert;
use crate::ident;
use crate::ident::ConnectorType;
use crate::ident::Identifier;
use crate::page::MemoryPage;
use crate::page::PageId;

// Register offsets in page 0xA0 referenced from several places.
const DIAGNOSTIC_MONITORING_TYPE: u8 = 92;

/// Whether a module's diagnostics are reported in final units or as raw
/// ADC codes that need external calibration applied.
///
/// Derived from the diagnostic monitoring type in byte 92 of page 0xA0.
/// Until that register has arrived, the mode is `Unknown` and calibrated
/// readings are unavailable.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CalibrationMode {
    #[default]
    Unknown,
    /// Diagnostics are already in final units.
    Internal,
    /// Diagnostics are raw ADC codes; the constants in page 0xA2 apply.
    External,
}

/// Supported link lengths from bytes 14..=19 of page 0xA0.
///
/// Each field is zero when the corresponding medium is unsupported. The
/// copper alternates noted per field follow SFF-8472 Table 6-1.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LinkLengths {
    /// Single-mode fiber, in km, or copper attenuation in dB at 12.9 GHz.
    pub smf_km: u8,
    /// Single-mode fiber, in units of 100 m, or copper attenuation in dB
    /// at 25.78 GHz.
    pub smf_100m: u8,
    /// 50 µm OM2 fiber, in units of 10 m.
    pub om2_10m: u8,
    /// 62.5 µm OM1 fiber, in units of 10 m.
    pub om1_10m: u8,
    /// 50 µm OM4 fiber in units of 10 m, or copper/direct-attach length
    /// in m.
    pub om4_10m: u8,
    /// 50 µm OM3 fiber in units of 10 m, or the copper/direct-attach
    /// multiplier and base value.
    pub om3_10m: u8,
}

/// An SFP or SFP+ module's memory map, assembled from register reads.
///
/// Holds both pages and tracks the calibration mode, which is re-derived
/// whenever the diagnostic monitoring register changes.
#[derive(Clone, Debug)]
pub struct SfpModule {
    a0: MemoryPage,
    a2: MemoryPage,
    calibration: CalibrationMode,
}

impl Default for SfpModule {
    fn default() -> Self {
        Self::new(MemoryPage::new(), MemoryPage::new())
    }
}

impl SfpModule {
    pub fn new(a0: impl Into<MemoryPage>, a2: impl Into<MemoryPage>) -> Self {
        let mut module = Self {
            a0: a0.into(),
            a2: a2.into(),
            calibration: CalibrationMode::Unknown,
        };
        module.derive_calibration_mode();
        module
    }

    pub fn page(&self, id: PageId) -> &MemoryPage {
        match id {
            PageId::A0 => &self.a0,
            PageId::A2 => &self.a2,
        }
    }

    /// Write a single register, re-deriving the calibration mode if the
    /// diagnostic monitoring register changed.
    pub fn set_byte(&mut self, id: PageId, index: u8, value: u8) {
        match id {
            PageId::A0 => {
                self.a0.set(index, value);
                if index == DIAGNOSTIC_MONITORING_TYPE {
                    self.derive_calibration_mode();
                }
            }
            PageId::A2 => self.a2.set(index, value),
        }
    }

    /// Install a batch of `(index, value)` register pairs, as paired up
    /// from a register-list request and its acknowledgement.
    pub fn install(&mut self, id: PageId, registers: impl IntoIterator<Item = (u8, u8)>) {
        for (index, value) in registers {
            self.set_byte(id, index, value);
        }
    }

    pub fn calibration_mode(&self) -> CalibrationMode {
        self.calibration
    }

    // Internal calibration wins if a map claims both.
    fn derive_calibration_mode(&mut self) {
        let code = self.a0.get(DIAGNOSTIC_MONITORING_TYPE);
        self.calibration = if code & 0x20 != 0 {
            CalibrationMode::Internal
        } else if code & 0x10 != 0 {
            CalibrationMode::External
        } else {
            CalibrationMode::Unknown
        };
    }

    /// The SFF-8024 identifier from byte 0.
    pub fn identifier(&self) -> Identifier {
        Identifier::from(self.a0.get(0))
    }

    /// The extended identifier from byte 1.
    pub fn extended_identifier(&self) -> &'static str {
        ident::extended_identifier(self.a0.get(1))
    }

    /// The connector type from byte 2.
    pub fn connector_type(&self) -> ConnectorType {
        ConnectorType::from(self.a0.get(2))
    }

    /// The electronic/optical compatibility codes set in bytes 3..=10.
    pub fn transceiver_compliance(&self) -> Vec<&'static str> {
        let mut bytes = [0u8; 8];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.a0.get(3 + i as u8);
        }
        ident::transceiver_compliance(&bytes)
    }

    /// The serial encoding mechanism from byte 11.
    pub fn encoding(&self) -> &'static str {
        ident::encoding(self.a0.get(11))
    }

    /// The nominal signaling rate from byte 12, in units of 100 MBd.
    pub fn signaling_rate_nominal(&self) -> u8 {
        self.a0.get(12)
    }

    /// The rate-select behavior from byte 13.
    pub fn rate_identifier(&self) -> &'static str {
        ident::rate_identifier(self.a0.get(13))
    }

    /// The supported link lengths from bytes 14..=19.
    pub fn link_lengths(&self) -> LinkLengths {
        LinkLengths {
            smf_km: self.a0.get(14),
            smf_100m: self.a0.get(15),
            om2_10m: self.a0.get(16),
            om1_10m: self.a0.get(17),
            om4_10m: self.a0.get(18),
            om3_10m: self.a0.get(19),
        }
    }

    /// The vendor name from bytes 20..=35, space padding included.
    pub fn vendor_name(&self) -> String {
        self.a0.ascii(20, 35)
    }

    /// The extended compliance code from byte 36.
    pub fn extended_compliance(&self) -> &'static str {
        ident::extended_compliance(self.a0.get(36))
    }

    /// The vendor's IEEE company ID from bytes 37..=39.
    pub fn vendor_oui(&self) -> [u8; 3] {
        [self.a0.get(37), self.a0.get(38), self.a0.get(39)]
    }

    /// The vendor part number from bytes 40..=55, space padding included.
    pub fn vendor_part_number(&self) -> String {
        self.a0.ascii(40, 55)
    }

    /// The part revision level from bytes 56..=59.
    pub fn vendor_revision(&self) -> String {
        self.a0.ascii(56, 59)
    }

    /// The laser wavelength in nm from bytes 60..=61.
    pub fn wavelength(&self) -> u16 {
        self.a0.word(60).unwrap_or_default()
    }

    /// The Fibre Channel speed 2 byte, byte 62.
    pub fn fibre_channel_speed2(&self) -> u8 {
        self.a0.get(62)
    }

    /// The vendor serial number from bytes 68..=83, space padding included.
    pub fn vendor_serial_number(&self) -> String {
        self.a0.ascii(68, 83)
    }

    /// The manufacturing date code from bytes 84..=91, formatted as
    /// `mm/dd/yy` followed by the vendor lot code.
    pub fn date_code(&self) -> String {
        let year = self.a0.ascii(84, 85);
        let month = self.a0.ascii(86, 87);
        let day = self.a0.ascii(88, 89);
        let lot = self.a0.ascii(90, 91);
        format!("{month}/{day}/{year}\t{lot}")
    }

    /// True if digital diagnostic monitoring is implemented (byte 92 bit 6).
    pub fn diagnostics_implemented(&self) -> bool {
        self.a0.get(DIAGNOSTIC_MONITORING_TYPE) & 0x40 != 0
    }

    /// True if received power is reported as average power rather than OMA
    /// (byte 92 bit 3).
    pub fn rx_power_is_average(&self) -> bool {
        self.a0.get(DIAGNOSTIC_MONITORING_TYPE) & 0x08 != 0
    }

    /// The optional enhanced features set in byte 93.
    pub fn enhanced_options(&self) -> Vec<&'static str> {
        ident::enhanced_options(self.a0.get(93))
    }

    /// The SFF-8472 revision the module complies with, from byte 94.
    pub fn sff8472_revision(&self) -> &'static str {
        ident::sff8472_revision(self.a0.get(94))
    }

    /// The CC_BASE checksum computed over bytes 0..=62 of page 0xA0.
    pub fn computed_cc_base(&self) -> u8 {
        self.a0.checksum(0, 62)
    }

    /// The CC_BASE checksum stored in byte 63 of page 0xA0.
    pub fn stored_cc_base(&self) -> u8 {
        self.a0.get(63)
    }

    /// The CC_EXT checksum computed over bytes 64..=94 of page 0xA0.
    pub fn computed_cc_ext(&self) -> u8 {
        self.a0.checksum(64, 94)
    }

    /// The CC_EXT checksum stored in byte 95 of page 0xA0.
    pub fn stored_cc_ext(&self) -> u8 {
        self.a0.get(95)
    }

    /// The CC_DMI checksum computed over bytes 0..=94 of page 0xA2.
    pub fn computed_cc_dmi(&self) -> u8 {
        self.a2.checksum(0, 94)
    }

    /// The CC_DMI checksum stored in byte 95 of page 0xA2.
    pub fn stored_cc_dmi(&self) -> u8 {
        self.a2.get(95)
    }

    /// True if every stored checksum matches its computed value.
    pub fn checksums_consistent(&self) -> bool {
        self.computed_cc_base() == self.stored_cc_base()
            && self.computed_cc_ext() == self.stored_cc_ext()
            && self.computed_cc_dmi() == self.stored_cc_dmi()
    }

    pub(crate) fn a0(&self) -> &MemoryPage {
        &self.a0
    }

    pub(crate) fn a2(&self) -> &MemoryPage {
        &self.a2
    }
}

// Q7.8 temperature decode used by both pages.
pub(crate) fn temperature_at(page: &MemoryPage, index: u8) -> f64 {
    convert::decode_signed_q7_8(page.get(index), page.get(index + 1))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::page::PAGE_SIZE;

    /// An A0 page modeled on a MENARA NETWORKS 850nm SFP+, with checksums
    /// consistent with the contents.
    pub(crate) fn menara_a0() -> [u8; PAGE_SIZE] {
        let mut a0 = [0u8; PAGE_SIZE];
        a0[0] = 0x03; // SFP/SFP+/SFP28
        a0[1] = 0x04; // 2-wire interface ID only
        a0[2] = 0x07; // LC
        a0[3] = 0x10; // 10GBASE-SR
        a0[6] = 0x01; // 1000BASE-SX
        a0[11] = 0x06; // 64B/66B
        a0[12] = 103; // 10.3 GBd
        a0[16] = 0x08; // OM2
        a0[17] = 0x03; // OM1
        a0[18] = 0x0c;
        a0[19] = 0x0a; // OM3
        a0[20..36].copy_from_slice(b"MENARA NETWORKS ");
        a0[37..40].copy_from_slice(&[0x00, 0x26, 0x1c]);
        a0[40..56].copy_from_slice(b"5SR0P2U-0850    ");
        a0[56..60].copy_from_slice(b"A   ");
        a0[60] = 0x03;
        a0[61] = 0x52; // 850 nm
        a0[63] = checksum(&a0[0..=62]);
        a0[64] = 0x00;
        a0[65] = 0x1a;
        a0[68..84].copy_from_slice(b"MEN5SR071500012 ");
        a0[84..92].copy_from_slice(b"150630  ");
        a0[92] = 0x68; // diagnostics, internally calibrated, average power
        a0[93] = 0xf0;
        a0[94] = 0x08; // Rev 12.3
        a0[95] = checksum(&a0[64..=94]);
        a0
    }

    pub(crate) fn checksum(bytes: &[u8]) -> u8 {
        bytes.iter().fold(0u32, |acc, &b| acc + u32::from(b)) as u8
    }

    #[test]
    fn test_menara_identity() {
        let module = SfpModule::new(menara_a0(), [0u8; PAGE_SIZE]);
        assert_eq!(module.identifier(), Identifier::Sfp);
        assert_eq!(module.identifier().to_string(), "SFP/SFP+/SFP28 and later");
        assert_eq!(module.connector_type(), ConnectorType::Lc);
        assert_eq!(module.connector_type().to_string(), "LC (Lucent Connector)");
        assert_eq!(module.vendor_name(), "MENARA NETWORKS ");
        assert_eq!(module.vendor_part_number(), "5SR0P2U-0850    ");
        assert_eq!(module.vendor_serial_number(), "MEN5SR071500012 ");
        assert_eq!(module.vendor_revision(), "A   ");
        assert_eq!(module.wavelength(), 850);
        assert_eq!(module.signaling_rate_nominal(), 103);
        assert_eq!(module.vendor_oui(), [0x00, 0x26, 0x1c]);
        assert_eq!(module.date_code(), "06/30/15\t  ");
        assert_eq!(module.sff8472_revision(), "Rev 12.3");
    }

    #[test]
    fn test_menara_compliance() {
        let module = SfpModule::new(menara_a0(), [0u8; PAGE_SIZE]);
        assert_eq!(
            module.transceiver_compliance(),
            vec!["10GBASE-SR", "1000BASE-SX"]
        );
        assert_eq!(module.encoding(), "64B/66B (8472) or Manchester (8436/8636)");
        assert_eq!(module.rate_identifier(), "Unspecified");
        assert_eq!(module.extended_compliance(), "Unspecified");
    }

    #[test]
    fn test_link_lengths() {
        let module = SfpModule::new(menara_a0(), [0u8; PAGE_SIZE]);
        let lengths = module.link_lengths();
        assert_eq!(lengths.smf_km, 0);
        assert_eq!(lengths.om2_10m, 0x08);
        assert_eq!(lengths.om1_10m, 0x03);
        assert_eq!(lengths.om4_10m, 0x0c);
        assert_eq!(lengths.om3_10m, 0x0a);
    }

    #[test]
    fn test_calibration_mode_from_byte_92() {
        let mut a0 = [0u8; PAGE_SIZE];
        a0[92] = 0x60;
        let module = SfpModule::new(a0, [0u8; PAGE_SIZE]);
        assert_eq!(module.calibration_mode(), CalibrationMode::Internal);

        a0[92] = 0x50;
        let module = SfpModule::new(a0, [0u8; PAGE_SIZE]);
        assert_eq!(module.calibration_mode(), CalibrationMode::External);

        // Internal wins if both bits are set.
        a0[92] = 0x70;
        let module = SfpModule::new(a0, [0u8; PAGE_SIZE]);
        assert_eq!(module.calibration_mode(), CalibrationMode::Internal);

        a0[92] = 0x40;
        let module = SfpModule::new(a0, [0u8; PAGE_SIZE]);
        assert_eq!(module.calibration_mode(), CalibrationMode::Unknown);
    }

    #[test]
    fn test_calibration_mode_rederived_on_write() {
        let mut module = SfpModule::default();
        assert_eq!(module.calibration_mode(), CalibrationMode::Unknown);
        module.set_byte(PageId::A0, 92, 0x60);
        assert_eq!(module.calibration_mode(), CalibrationMode::Internal);
        module.set_byte(PageId::A0, 92, 0x10);
        assert_eq!(module.calibration_mode(), CalibrationMode::External);
        // Writes elsewhere leave the mode alone.
        module.set_byte(PageId::A0, 0, 0x03);
        assert_eq!(module.calibration_mode(), CalibrationMode::External);
    }

    #[test]
    fn test_install_pairs() {
        let mut module = SfpModule::default();
        module.install(PageId::A0, [(0u8, 0x03u8), (2, 0x07), (92, 0x60)]);
        module.install(PageId::A2, [(96u8, 0x1fu8), (97, 0x00)]);
        assert_eq!(module.identifier(), Identifier::Sfp);
        assert_eq!(module.calibration_mode(), CalibrationMode::Internal);
        assert_eq!(module.page(PageId::A2).get(96), 0x1f);
    }

    #[test]
    fn test_checksums() {
        let module = SfpModule::new(menara_a0(), [0u8; PAGE_SIZE]);
        assert_eq!(module.computed_cc_base(), module.stored_cc_base());
        assert_eq!(module.computed_cc_ext(), module.stored_cc_ext());
        assert_eq!(module.computed_cc_dmi(), module.stored_cc_dmi());
        assert!(module.checksums_consistent());

        // Corrupting a covered byte breaks the stored checksum.
        let mut a0 = menara_a0();
        a0[40] ^= 0xff;
        let module = SfpModule::new(a0, [0u8; PAGE_SIZE]);
        assert_ne!(module.computed_cc_base(), module.stored_cc_base());
        assert!(!module.checksums_consistent());
    }

    #[test]
    fn test_diagnostic_monitoring_bits() {
        let module = SfpModule::new(menara_a0(), [0u8; PAGE_SIZE]);
        assert!(module.diagnostics_implemented());
        assert!(module.rx_power_is_average());
        assert_eq!(module.enhanced_options().len(), 4);
    }
}
