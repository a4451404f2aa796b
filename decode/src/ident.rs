// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identification tables for the base ID fields of page 0xA0.
//!
//! The single-byte codes here come from SFF-8024, which SFF-8472 references
//! for the identifier, connector, encoding, and compliance fields. Codes
//! outside the defined tables are preserved in `Reserved` or
//! `VendorSpecific` catch-all variants so nothing is lost on a round trip.

use std::fmt;

/// The SFF-8024 identifier for a transceiver module, from byte 0 of page
/// 0xA0.
///
/// This is the main description of the kind of module, and indicates the
/// standard the rest of the memory map should conform to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Identifier {
    Unknown,
    Gbic,
    Soldered,
    Sfp,
    Xbi,
    Xenpak,
    Xfp,
    Xff,
    XfpE,
    Xpak,
    X2,
    DwdmSfp,
    Qsfp,
    QsfpPlusSff8636,
    Cxp,
    ShieldedMultiLane4,
    ShieldedMultiLane8,
    Qsfp28,
    Cxp2,
    Cdfp,
    ShieldedMultiLane4Fanout,
    ShieldedMultiLane8Fanout,
    Cdfp3,
    MicroQsfp,
    QsfpDD,
    Qsfp8,
    SfpDD,
    Dsfp,
    X4MiniLink,
    X8MiniLink,
    QsfpPlusCmis,
    Reserved(u8),
    VendorSpecific(u8),
}

impl From<u8> for Identifier {
    fn from(x: u8) -> Self {
        use Identifier::*;
        match x {
            0x00 => Unknown,
            0x01 => Gbic,
            0x02 => Soldered,
            0x03 => Sfp,
            0x04 => Xbi,
            0x05 => Xenpak,
            0x06 => Xfp,
            0x07 => Xff,
            0x08 => XfpE,
            0x09 => Xpak,
            0x0a => X2,
            0x0b => DwdmSfp,
            0x0c => Qsfp,
            0x0d => QsfpPlusSff8636,
            0x0e => Cxp,
            0x0f => ShieldedMultiLane4,
            0x10 => ShieldedMultiLane8,
            0x11 => Qsfp28,
            0x12 => Cxp2,
            0x13 => Cdfp,
            0x14 => ShieldedMultiLane4Fanout,
            0x15 => ShieldedMultiLane8Fanout,
            0x16 => Cdfp3,
            0x17 => MicroQsfp,
            0x18 => QsfpDD,
            0x19 => Qsfp8,
            0x1a => SfpDD,
            0x1b => Dsfp,
            0x1c => X4MiniLink,
            0x1d => X8MiniLink,
            0x1e => QsfpPlusCmis,
            0x1f..=0x7f => Reserved(x),
            0x80.. => VendorSpecific(x),
        }
    }
}

impl From<Identifier> for u8 {
    fn from(id: Identifier) -> Self {
        use Identifier::*;
        match id {
            Unknown => 0x00,
            Gbic => 0x01,
            Soldered => 0x02,
            Sfp => 0x03,
            Xbi => 0x04,
            Xenpak => 0x05,
            Xfp => 0x06,
            Xff => 0x07,
            XfpE => 0x08,
            Xpak => 0x09,
            X2 => 0x0a,
            DwdmSfp => 0x0b,
            Qsfp => 0x0c,
            QsfpPlusSff8636 => 0x0d,
            Cxp => 0x0e,
            ShieldedMultiLane4 => 0x0f,
            ShieldedMultiLane8 => 0x10,
            Qsfp28 => 0x11,
            Cxp2 => 0x12,
            Cdfp => 0x13,
            ShieldedMultiLane4Fanout => 0x14,
            ShieldedMultiLane8Fanout => 0x15,
            Cdfp3 => 0x16,
            MicroQsfp => 0x17,
            QsfpDD => 0x18,
            Qsfp8 => 0x19,
            SfpDD => 0x1a,
            Dsfp => 0x1b,
            X4MiniLink => 0x1c,
            X8MiniLink => 0x1d,
            QsfpPlusCmis => 0x1e,
            Reserved(x) | VendorSpecific(x) => x,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Identifier::*;
        match self {
            Unknown => write!(f, "Unknown or unspecified"),
            Gbic => write!(f, "GBIC"),
            Soldered => write!(f, "Module/connector soldered to motherboard"),
            Sfp => write!(f, "SFP/SFP+/SFP28 and later"),
            Xbi => write!(f, "300 pin XBI"),
            Xenpak => write!(f, "XENPAK"),
            Xfp => write!(f, "XFP"),
            Xff => write!(f, "XFF"),
            XfpE => write!(f, "XFP-E"),
            Xpak => write!(f, "XPAK"),
            X2 => write!(f, "X2"),
            DwdmSfp => write!(f, "DWDM-SFP/SFP+ (not using SFF-8472)"),
            Qsfp => write!(f, "QSFP (INF-8438)"),
            QsfpPlusSff8636 => write!(
                f,
                "QSFP+ or later with SFF-8636 or SFF-8436 management interface"
            ),
            Cxp => write!(f, "CXP or later"),
            ShieldedMultiLane4 => write!(f, "Shielded Mini Multilane HD 4X"),
            ShieldedMultiLane8 => write!(f, "Shielded Mini Multilane HD 8X"),
            Qsfp28 => {
                write!(f, "QSFP28 or later with SFF-8636 management interface")
            }
            Cxp2 => write!(f, "CXP2 (aka CXP28) or later"),
            Cdfp => write!(f, "CDFP (Style 1 / Style 2)"),
            ShieldedMultiLane4Fanout => {
                write!(f, "Shielded Mini Multilane HD 4X Fanout Cable")
            }
            ShieldedMultiLane8Fanout => {
                write!(f, "Shielded Mini Multilane HD 8X Fanout Cable")
            }
            Cdfp3 => write!(f, "CDFP (Style 3)"),
            MicroQsfp => write!(f, "microQSFP"),
            QsfpDD => write!(
                f,
                "QSFP-DD Double Density 8X Pluggable Transceiver (INF-8628)"
            ),
            Qsfp8 => write!(f, "QSFP 8X Pluggable Transceiver"),
            SfpDD => write!(f, "SFP-DD Double Density 2X Pluggable Transceiver"),
            Dsfp => write!(f, "DSFP Dual Small Form Factor Pluggable Transceiver"),
            X4MiniLink => write!(f, "x4 MiniLink/OcuLink"),
            X8MiniLink => write!(f, "x8 MiniLink"),
            QsfpPlusCmis => write!(f, "QSFP+ or later with CMIS"),
            Reserved(_) => write!(f, "Reserved"),
            VendorSpecific(_) => write!(f, "Vendor specific"),
        }
    }
}

/// The connector type of a module, from byte 2 of page 0xA0 (SFF-8024
/// Table 4-3).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ConnectorType {
    Unknown,
    Sc,
    FibreChannelStyle1,
    FibreChannelStyle2,
    Bnc,
    FibreChannelCoax,
    FibreJack,
    Lc,
    MtRj,
    Mu,
    Sg,
    OpticalPigtail,
    Mpo1x12,
    Mpo2x16,
    Hssdc2,
    CopperPigtail,
    Rj45,
    NoSeparableConnector,
    Mxc2x16,
    Cs,
    Sn,
    Mpo2x12,
    Mpo1x16,
    Reserved(u8),
    VendorSpecific(u8),
}

impl From<u8> for ConnectorType {
    fn from(x: u8) -> Self {
        use ConnectorType::*;
        match x {
            0x00 => Unknown,
            0x01 => Sc,
            0x02 => FibreChannelStyle1,
            0x03 => FibreChannelStyle2,
            0x04 => Bnc,
            0x05 => FibreChannelCoax,
            0x06 => FibreJack,
            0x07 => Lc,
            0x08 => MtRj,
            0x09 => Mu,
            0x0a => Sg,
            0x0b => OpticalPigtail,
            0x0c => Mpo1x12,
            0x0d => Mpo2x16,
            0x20 => Hssdc2,
            0x21 => CopperPigtail,
            0x22 => Rj45,
            0x23 => NoSeparableConnector,
            0x24 => Mxc2x16,
            0x25 => Cs,
            0x26 => Sn,
            0x27 => Mpo2x12,
            0x28 => Mpo1x16,
            0x0e..=0x1f | 0x29..=0x7f => Reserved(x),
            0x80.. => VendorSpecific(x),
        }
    }
}

impl From<ConnectorType> for u8 {
    fn from(c: ConnectorType) -> Self {
        use ConnectorType::*;
        match c {
            Unknown => 0x00,
            Sc => 0x01,
            FibreChannelStyle1 => 0x02,
            FibreChannelStyle2 => 0x03,
            Bnc => 0x04,
            FibreChannelCoax => 0x05,
            FibreJack => 0x06,
            Lc => 0x07,
            MtRj => 0x08,
            Mu => 0x09,
            Sg => 0x0a,
            OpticalPigtail => 0x0b,
            Mpo1x12 => 0x0c,
            Mpo2x16 => 0x0d,
            Hssdc2 => 0x20,
            CopperPigtail => 0x21,
            Rj45 => 0x22,
            NoSeparableConnector => 0x23,
            Mxc2x16 => 0x24,
            Cs => 0x25,
            Sn => 0x26,
            Mpo2x12 => 0x27,
            Mpo1x16 => 0x28,
            Reserved(x) | VendorSpecific(x) => x,
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ConnectorType::*;
        match self {
            Unknown => write!(f, "Unknown or unspecified"),
            Sc => write!(f, "SC (Subscriber Connector)"),
            FibreChannelStyle1 => {
                write!(f, "Fibre Channel Style 1 copper connector")
            }
            FibreChannelStyle2 => {
                write!(f, "Fibre Channel Style 2 copper connector")
            }
            Bnc => write!(f, "BNC/TNC (Bayonet/Threaded Neill-Concelman)"),
            FibreChannelCoax => write!(f, "Fibre Channel coax headers"),
            FibreJack => write!(f, "Fibre Jack"),
            Lc => write!(f, "LC (Lucent Connector)"),
            MtRj => write!(f, "MT-RJ (Mechanical Transfer - Registered Jack)"),
            Mu => write!(f, "MU (Multiple Optical)"),
            Sg => write!(f, "SG"),
            OpticalPigtail => write!(f, "Optical Pigtail"),
            Mpo1x12 => write!(f, "MPO 1x12 (Multifiber Parallel Optic)"),
            Mpo2x16 => write!(f, "MPO 2x16"),
            Hssdc2 => write!(f, "HSSDC II (High Speed Serial Data Connector)"),
            CopperPigtail => write!(f, "Copper Pigtail"),
            Rj45 => write!(f, "RJ45 (Registered Jack)"),
            NoSeparableConnector => write!(f, "No separable connector"),
            Mxc2x16 => write!(f, "MXC 2x16"),
            Cs => write!(f, "CS optical connector"),
            Sn => write!(f, "SN (previously Mini CS) optical connector"),
            Mpo2x12 => write!(f, "MPO 2x12"),
            Mpo1x16 => write!(f, "MPO 1x16"),
            Reserved(_) => write!(f, "Reserved"),
            VendorSpecific(_) => write!(f, "Vendor specific"),
        }
    }
}

/// The extended identifier from byte 1 of page 0xA0 (SFF-8472 Table 5-2).
pub fn extended_identifier(code: u8) -> &'static str {
    const MOD_DEFS: [&str; 8] = [
        "GBIC Definition not specified/not compliant with a defined MOD_DEF",
        "Compliant with MOD_DEF1",
        "Compliant with MOD_DEF2",
        "Compliant with MOD_DEF3",
        "Function defined by 2-wire interface ID only",
        "Compliant with MOD_DEF5",
        "Compliant with MOD_DEF6",
        "Compliant with MOD_DEF7",
    ];
    match usize::from(code) {
        c if c < MOD_DEFS.len() => MOD_DEFS[c],
        _ => "Reserved",
    }
}

/// The serial encoding mechanism from byte 11 of page 0xA0 (SFF-8024
/// Table 4-2).
pub fn encoding(code: u8) -> &'static str {
    const ENCODINGS: [&str; 9] = [
        "Unspecified",
        "8B/10B",
        "4B/5B",
        "NRZ",
        "Manchester (8472) or SONET Scrambled (8436/8636)",
        "SONET Scrambled (8472) or 64B/66B (8436/8636)",
        "64B/66B (8472) or Manchester (8436/8636)",
        "256B/257B (transcoded FEC-enabled data)",
        "PAM4",
    ];
    match usize::from(code) {
        c if c < ENCODINGS.len() => ENCODINGS[c],
        _ => "Reserved",
    }
}

/// The rate-select behavior from byte 13 of page 0xA0 (SFF-8472 Table 5-6).
pub fn rate_identifier(code: u8) -> &'static str {
    const RATES: [&str; 16] = [
        "Unspecified",
        "SFF-8079 (4/2/1G Rate_Select & AS0/AS1)",
        "SFF-8431 (8/4/2G Rx Rate_Select only)",
        "Unspecified",
        "SFF-8431 (8/4/2G Tx Rate_Select only)",
        "Unspecified",
        "SFF-8431 (8/4/2G Independent Rx & Tx Rate_Select)",
        "Unspecified",
        "FC-PI-5 (16/8/4G Independent Rx, Tx Rate_Select) High=16G only, \
        Low=8G/4G",
        "Unspecified",
        "FC-PI-6 (32/16/8G Independent Rx, Tx Rate_Select) High=32G only, \
        Low=16G/8G",
        "Unspecified",
        "10/8G Rx and Tx Rate_Select",
        "Unspecified",
        "FC-PI-7 (64/32/16G Independent Rx, Tx Rate Select) High = 32GFC \
        and 64GFC. Low = 16GFC",
        "Unspecified",
    ];
    if usize::from(code) < RATES.len() {
        RATES[usize::from(code)]
    } else if code == 0x20 {
        "Rate select based on PMDs as defined by 0xA0, byte 36 and 0xA2, \
        byte 67"
    } else {
        "Reserved"
    }
}

/// The extended specification compliance code from byte 36 of page 0xA0
/// (SFF-8024 Table 4-4).
pub fn extended_compliance(code: u8) -> &'static str {
    const CODES: [&str; 0x4d] = [
        "Unspecified",
        "100G AOC or 25GAUI C2M AOC. Providing a worst BER of 5 x 10^-5",
        "100GBASE-SR4 or 25GBASE-SR",
        "100GBASE-LR4 or 25GBASE-LR",
        "100GBASE-ER4 or 25GBASE-ER",
        "100GBASE-SR10",
        "100G CWDM4",
        "100G PSM4 Parallel SMF",
        "100G ACC or 25GAUI C2M ACC. Providing a worst BER of 5 x 10^-5",
        "Obsolete",
        "Reserved",
        "100GBASE-CR4, 25GBASE-CR CA-25G-L or 50GBASE-CR2 with RS \
        (Clause 91) FEC",
        "25GBASE-CR CA-25G-S or 50GBASE-CR2 with BASE_R (Clause 74 Fire \
        code) FEC",
        "25GBASE-CR CA-25G-N or 50GBASE-CR2 with no FEC",
        "10 Mb/s Single Pair Ethernet (802.3cg, Clause 146/147, 1000m copper)",
        "Reserved",
        "40GBASE-ER4",
        "4 x 10GBASE-SR",
        "40G PSM4 Parallel SMF",
        "G959.1 profile P1I1-2D1 (10709 MBd, 2km, 1310 nm SM)",
        "G959.1 profile P1S1-2D2 (10709 MBd, 40km, 1550 nm SM)",
        "G959.1 profile P1L1-2D2 (10709 MBd, 80km, 1550 nm SM)",
        "10GBASE-T with SFI electrical interface",
        "100G CLR4",
        "100G AOC or 25GAUI C2M AOC. Providing a worst BER of 10^-12 or below",
        "100G ACC or 25GAUI C2M ACC. Providing a worst BER of 10^-12 or below",
        "100GE-DWDM2",
        "100G 1550nm WDM (4 wavelengths)",
        "10GBASE-T Short Reach (30 meters)",
        "5GBASE-T",
        "2.5GBASE-T",
        "40G SWDM4",
        "100G SWDM4",
        "100G PAM4 BiDi",
        "4WDM-10 MSA",
        "4WDM-20 MSA",
        "4WDM-40 MSA",
        "100GBASE-DR (Clause 140), CAUI-4 (no FEC)",
        "100G-FR or 100GBASE-FR1 (Clause 140), CAUI-4 (no FEC)",
        "100G-LR or 100GBASE-LR1 (Clause 140), CAUI-4 (no FEC)",
        "100GBASE-SR (P802.3db, Clause 167), CAUI-4 (no FEC)",
        "100GBASE-SR, 200GBASE-SR2 or 400GBASE-SR4 (P802.3db, Clause 167)",
        "100GBASE-FR1 (P802.3cu, Clause 140)",
        "100GBASE-LR1 (P802.3cu, Clause 140)",
        "100G-LR1-20 MSA, CAUI-4 (no FEC)",
        "100G-ER1-30 MSA, CAUI-4 (no FEC)",
        "100G-ER1-40 MSA, CAUI-4 (no FEC)",
        "100G-LR1-20 MSA",
        "ACC with 50GAUI, 100GAUI-2 or 200GAUI-4 C2M",
        "AOC with 50GAUI, 100GAUI-2 or 200GAUI-4 C2M",
        "ACC with 50GAUI, 100GAUI-2 or 200GAUI-4 C2M",
        "AOC with 50GAUI, 100GAUI-2 or 200GAUI-4 C2M",
        "100G-ER1-30 MSA",
        "100G-ER1-40 MSA",
        "100GBASE-VR, 200GBASE-VR2 or 400GBASE-VR4 (P802.3db, Clause 167)",
        "10GBASE-BR (Clause 158)",
        "25GBASE-BR (Clause 159)",
        "50GBASE-BR (Clause 160)",
        "100GBASE-VR (P802.3db, Clause 167), CAUI-4 (no FEC)",
        "Reserved",
        "Reserved",
        "Reserved",
        "Reserved",
        "100GBASE-CR1, 200GBASE-CR2 or 400GBASE-CR4 (P802.3ck, Clause 162)",
        "50GBASE-CR, 100GBASE-CR2, or 200GBASE-CR4",
        "50GBASE-SR, 100GBASE-SR2, or 200GBASE-SR4",
        "50GBASE-FR or 200GBASE-DR4",
        "200GBASE-FR4",
        "200G 1550nm PSM4",
        "50GBASE-LR",
        "200GBASE-LR4",
        "400GBASE-DR4 (802.3, Clause 124), 100GAUI-1 C2M (Annex 120G)",
        "400GBASE-FR4 (802.3cu, Clause 151)",
        "400GBASE-LR4-6 (802.3cu, Clause 151)",
        "50GBASE-ER (IEEE 802.3cn, Clause 139)",
        "400G-LR4-10",
        "400GBASE-ZR (802.3cw, Clause 156)",
    ];
    match usize::from(code) {
        c if c < CODES.len() => CODES[c],
        0x7f => "256GFC-SW4 (FC-PI-7P)",
        0x80 => "64GFC (FC-PI-7)",
        0x81 => "128GFC (FC-PI-8)",
        _ => "Reserved",
    }
}

/// The SFF-8472 revision the module complies with, from byte 94 of page
/// 0xA0 (Table 8-8).
pub fn sff8472_revision(code: u8) -> &'static str {
    const REVISIONS: [&str; 10] = [
        "Not specified",
        "Rev 9.3",
        "Rev 9.5",
        "Rev 10.2",
        "Rev 10.4",
        "Rev 11.0",
        "Rev 11.3",
        "Rev 11.4",
        "Rev 12.3",
        "Rev 12.4",
    ];
    match usize::from(code) {
        c if c < REVISIONS.len() => REVISIONS[c],
        _ => "Reserved as of SFF-8472 Rev 12.4",
    }
}

// One table per compliance byte, entry `i` naming bit `i` (Table 5-3).
const TRANSCEIVER_COMPLIANCE: [[&str; 8]; 8] = [
    // Byte 3, 10G Ethernet and Infiniband.
    [
        "1X Copper Passive",
        "1X Copper Active",
        "1X LX",
        "1X SX",
        "10GBASE-SR",
        "10GBASE-LR",
        "10GBASE-LRM",
        "10GBASE-ER",
    ],
    // Byte 4, SONET and ESCON.
    [
        "OC-48 short reach",
        "OC-48 intermediate reach",
        "OC-48 long reach",
        "SONET reach specifier bit 2",
        "SONET reach specifier bit 1",
        "OC-192, short reach",
        "ESCON SMF, 1310nm Laser",
        "ESCON MMF, 1310nm LED",
    ],
    // Byte 5, SONET.
    [
        "OC-3, short reach",
        "OC-3, single mode, intermediate reach",
        "OC-3, single mode, long reach",
        "Reserved",
        "OC-12, short reach",
        "OC-12, single mode, intermediate reach",
        "OC-12, single mode, long reach",
        "Reserved",
    ],
    // Byte 6, Ethernet.
    [
        "1000BASE-SX",
        "1000BASE-LX",
        "1000BASE-CX",
        "1000BASE-T",
        "100BASE-LX/LX10",
        "100BASE-FX",
        "BASE-BX10",
        "BASE-PX",
    ],
    // Byte 7, Fibre Channel link length and transmitter technology.
    [
        "Electrical inter-enclosure (EL)",
        "Longwave laser (LC)",
        "Shortwave laser, linear Rx (SA)",
        "medium distance (M)",
        "long distance (L)",
        "intermediate distance (I)",
        "short distance (S)",
        "very long distance (V)",
    ],
    // Byte 8, Fibre Channel transmitter technology and cable.
    [
        "Reserved",
        "Reserved",
        "Passive Cable",
        "Active Cable",
        "Longwave laser (LL)",
        "Shortwave laser with OFC (SL)",
        "Shortwave laser w/o OFC (SN)",
        "Electrical intra-enclosure (EL)",
    ],
    // Byte 9, Fibre Channel transmission media.
    [
        "Single Mode (SM)",
        "Reserved",
        "Multimode, 50um (M5, M5E)",
        "Multimode, 62.5um (M6)",
        "Video Coax (TV)",
        "Miniature Coax (MI)",
        "Twisted Pair (TP)",
        "Twin Axial Pair (TW)",
    ],
    // Byte 10, Fibre Channel speed.
    [
        "100 MBytes/sec",
        "See byte 62 \"Fibre Channel Speed 2\"",
        "200 MBytes/sec",
        "3200 MBytes/sec",
        "400 MBytes/sec",
        "1600 MBytes/sec",
        "800 MBytes/sec",
        "1200 MBytes/sec",
    ],
];

/// Scan the electronic/optical compatibility bitmap in bytes 3..=10 of
/// page 0xA0, returning one entry per set bit.
///
/// Results are ordered byte 3 through byte 10, bit 7 down to bit 0 within
/// each byte.
pub fn transceiver_compliance(bytes: &[u8; 8]) -> Vec<&'static str> {
    let mut compliant_with = Vec::new();
    for (byte, table) in bytes.iter().zip(TRANSCEIVER_COMPLIANCE.iter()) {
        for bit in (0..8).rev() {
            if byte & (1 << bit) != 0 {
                compliant_with.push(table[bit]);
            }
        }
    }
    compliant_with
}

// Enhanced options from byte 93, listed bit 7 first (Table 8-6).
const ENHANCED_OPTIONS: [&str; 8] = [
    "Optional Alarm/warning flags implemented for all monitored quantities",
    "Optional soft TX_DISABLE control and monitoring implemented",
    "Optional soft TX_FAULT monitoring implemented",
    "Optional soft RX_LOS monitoring implemented",
    "Optional soft RATE_SELECT control and monitoring implemented",
    "Optional Application Select control implemented per SFF-8079",
    "Optional soft Rate Select control implemented per SFF-8431",
    "Reserved",
];

/// Scan the enhanced-options bitmap in byte 93 of page 0xA0, returning
/// one entry per set bit, bit 7 first.
pub fn enhanced_options(code: u8) -> Vec<&'static str> {
    (0..8)
        .rev()
        .filter(|bit| code & (1u8 << bit) != 0)
        .map(|bit| ENHANCED_OPTIONS[7 - bit])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_round_trip() {
        for code in 0..=0xffu8 {
            let id = Identifier::from(code);
            assert_eq!(u8::from(id), code);
        }
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(Identifier::from(0x03).to_string(), "SFP/SFP+/SFP28 and later");
        assert_eq!(Identifier::from(0x00).to_string(), "Unknown or unspecified");
        assert_eq!(Identifier::from(0x1f).to_string(), "Reserved");
        assert_eq!(Identifier::from(0x7f).to_string(), "Reserved");
        assert_eq!(Identifier::from(0x80).to_string(), "Vendor specific");
    }

    #[test]
    fn test_connector_round_trip() {
        for code in 0..=0xffu8 {
            let connector = ConnectorType::from(code);
            assert_eq!(u8::from(connector), code);
        }
    }

    #[test]
    fn test_connector_display() {
        assert_eq!(ConnectorType::from(0x07).to_string(), "LC (Lucent Connector)");
        assert_eq!(ConnectorType::from(0x22).to_string(), "RJ45 (Registered Jack)");
        assert_eq!(ConnectorType::from(0x0e).to_string(), "Reserved");
        assert_eq!(ConnectorType::from(0x29).to_string(), "Reserved");
        assert_eq!(ConnectorType::from(0x80).to_string(), "Vendor specific");
    }

    #[test]
    fn test_encoding() {
        assert_eq!(encoding(0x01), "8B/10B");
        assert_eq!(encoding(0x08), "PAM4");
        assert_eq!(encoding(0x09), "Reserved");
    }

    #[test]
    fn test_rate_identifier() {
        assert_eq!(rate_identifier(0x00), "Unspecified");
        assert_eq!(rate_identifier(0x02), "SFF-8431 (8/4/2G Rx Rate_Select only)");
        assert_eq!(rate_identifier(0x10), "Reserved");
        assert!(rate_identifier(0x20).starts_with("Rate select based on PMDs"));
        assert_eq!(rate_identifier(0x21), "Reserved");
    }

    #[test]
    fn test_extended_compliance() {
        assert_eq!(extended_compliance(0x00), "Unspecified");
        assert_eq!(extended_compliance(0x06), "100G CWDM4");
        assert_eq!(extended_compliance(0x4c), "400GBASE-ZR (802.3cw, Clause 156)");
        assert_eq!(extended_compliance(0x4d), "Reserved");
        assert_eq!(extended_compliance(0x7f), "256GFC-SW4 (FC-PI-7P)");
        assert_eq!(extended_compliance(0x80), "64GFC (FC-PI-7)");
        assert_eq!(extended_compliance(0x81), "128GFC (FC-PI-8)");
        assert_eq!(extended_compliance(0x82), "Reserved");
    }

    #[test]
    fn test_transceiver_compliance() {
        let mut bytes = [0u8; 8];
        assert!(transceiver_compliance(&bytes).is_empty());

        // Byte 3 bit 4 and byte 6 bit 0.
        bytes[0] = 0x10;
        bytes[3] = 0x01;
        assert_eq!(
            transceiver_compliance(&bytes),
            vec!["10GBASE-SR", "1000BASE-SX"]
        );

        // Within one byte, higher bits come first.
        bytes = [0u8; 8];
        bytes[0] = 0x90;
        assert_eq!(
            transceiver_compliance(&bytes),
            vec!["10GBASE-ER", "10GBASE-SR"]
        );
    }

    #[test]
    fn test_enhanced_options() {
        assert!(enhanced_options(0x00).is_empty());
        assert_eq!(
            enhanced_options(0x80),
            vec!["Optional Alarm/warning flags implemented for all monitored quantities"]
        );
        // Bits 6 and 4 are soft TX_DISABLE and soft RX_LOS.
        assert_eq!(
            enhanced_options(0x50),
            vec![
                "Optional soft TX_DISABLE control and monitoring implemented",
                "Optional soft RX_LOS monitoring implemented",
            ]
        );
    }

    #[test]
    fn test_sff8472_revision() {
        assert_eq!(sff8472_revision(0x05), "Rev 11.0");
        assert_eq!(sff8472_revision(0x09), "Rev 12.4");
        assert_eq!(sff8472_revision(0x0a), "Reserved as of SFF-8472 Rev 12.4");
    }
}
