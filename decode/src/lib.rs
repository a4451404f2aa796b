// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decode SFP and SFP+ transceiver memory maps and diagnostic data.
//!
//! Modules managed here follow SFF-8472: a 256-byte identification page at
//! I2C address 0xA0 and a 256-byte diagnostics page at 0xA2. This crate
//! models those pages, decodes their fixed-point and floating-point field
//! formats, and applies the module's calibration constants to its real-time
//! diagnostic readings.

pub mod calib;
pub mod convert;
pub mod ident;
pub mod page;
pub mod sfp;

pub use calib::CalibrationConstants;
pub use ident::ConnectorType;
pub use ident::Identifier;
pub use page::MemoryPage;
pub use page::PageId;
pub use sfp::CalibrationMode;
pub use sfp::SfpModule;

use thiserror::Error;

/// An error related to decoding a transceiver memory map.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum Error {
    /// A value that cannot be represented in the target field format.
    #[error("value {value} is outside the representable range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    /// A calibrated reading was requested before the module's calibration
    /// mode could be determined from its memory map.
    #[error("calibration mode has not been determined from the memory map")]
    UndeterminedCalibration,
}
