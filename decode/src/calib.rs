// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Calibration constants, alarm thresholds, and calibrated real-time
//! diagnostics from page 0xA2.
//!
//! Internally calibrated modules report diagnostics that only need unit
//! scaling. Externally calibrated modules report raw ADC codes, and the
//! constants in bytes 56..=91 must be applied first. Until the calibration
//! mode is known, every real-time getter fails rather than guess.

use crate::convert;
use crate::page::MemoryPage;
use crate::sfp::temperature_at;
use crate::sfp::CalibrationMode;
use crate::sfp::SfpModule;
use crate::Error;

// Unit scale factors for the diagnostic ADC fields (SFF-8472 Table 9-11).
const VOLTS_PER_LSB: f64 = 100e-6;
const BIAS_MA_PER_LSB: f64 = 2e-3;
const POWER_UW_PER_LSB: f64 = 0.1;

/// A slope and offset for one linearly calibrated quantity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearCalibration {
    /// Unsigned Q8.8 slope. Internally calibrated modules store 1.
    pub slope: f64,
    /// Signed 16-bit offset. Internally calibrated modules store 0.
    pub offset: f64,
}

impl LinearCalibration {
    fn apply(&self, raw: f64) -> f64 {
        self.slope * raw + self.offset
    }
}

/// The external-calibration constants from bytes 56..=91 of page 0xA2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationConstants {
    /// Receive-power polynomial coefficients, `rx_pwr[i]` multiplying the
    /// i-th power of the raw ADC value. On the wire RX_PWR(4) is stored
    /// first, at byte 56.
    pub rx_pwr: [f64; 5],
    /// Laser bias current calibration.
    pub tx_bias: LinearCalibration,
    /// Transmitter coupled output power calibration.
    pub tx_power: LinearCalibration,
    /// Module temperature calibration, also applied to the optional laser
    /// temperature.
    pub temperature: LinearCalibration,
    /// Supply voltage calibration.
    pub voltage: LinearCalibration,
}

impl CalibrationConstants {
    fn rx_power_polynomial(&self, raw: f64) -> f64 {
        self.rx_pwr
            .iter()
            .enumerate()
            .map(|(i, c)| c * raw.powi(i as i32))
            .sum()
    }
}

/// The four alarm and warning levels stored for each monitored quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThresholdSet<T> {
    pub high_alarm: T,
    pub low_alarm: T,
    pub high_warning: T,
    pub low_warning: T,
}

/// The alarm and warning thresholds from bytes 0..=55 of page 0xA2.
///
/// Thresholds are stored uncalibrated. Temperature-shaped fields are
/// decoded from Q7.8 and TEC current from its 0.1 mA units; the remaining
/// quantities are the raw 16-bit values, to be compared against raw
/// readings before calibration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thresholds {
    /// Module temperature, in degrees C.
    pub temperature: ThresholdSet<f64>,
    /// Supply voltage, raw.
    pub voltage: ThresholdSet<u16>,
    /// Laser bias current, raw.
    pub tx_bias: ThresholdSet<u16>,
    /// Transmit power, raw.
    pub tx_power: ThresholdSet<u16>,
    /// Receive power, raw.
    pub rx_power: ThresholdSet<u16>,
    /// Optional laser temperature, in degrees C.
    pub laser_temperature: ThresholdSet<f64>,
    /// Optional TEC current, in mA.
    pub tec_current: ThresholdSet<f64>,
}

fn threshold_q7_8(page: &MemoryPage, base: u8) -> ThresholdSet<f64> {
    ThresholdSet {
        high_alarm: temperature_at(page, base),
        low_alarm: temperature_at(page, base + 2),
        high_warning: temperature_at(page, base + 4),
        low_warning: temperature_at(page, base + 6),
    }
}

fn threshold_u16(page: &MemoryPage, base: u8) -> ThresholdSet<u16> {
    let word = |index| page.word(index).unwrap_or_default();
    ThresholdSet {
        high_alarm: word(base),
        low_alarm: word(base + 2),
        high_warning: word(base + 4),
        low_warning: word(base + 6),
    }
}

fn threshold_tec(page: &MemoryPage, base: u8) -> ThresholdSet<f64> {
    let tec = |index| convert::decode_tec_current(page.get(index), page.get(index + 1));
    ThresholdSet {
        high_alarm: tec(base),
        low_alarm: tec(base + 2),
        high_warning: tec(base + 4),
        low_warning: tec(base + 6),
    }
}

impl SfpModule {
    /// The alarm and warning thresholds from bytes 0..=55 of page 0xA2.
    pub fn thresholds(&self) -> Thresholds {
        let a2 = self.a2();
        Thresholds {
            temperature: threshold_q7_8(a2, 0),
            voltage: threshold_u16(a2, 8),
            tx_bias: threshold_u16(a2, 16),
            tx_power: threshold_u16(a2, 24),
            rx_power: threshold_u16(a2, 32),
            laser_temperature: threshold_q7_8(a2, 40),
            tec_current: threshold_tec(a2, 48),
        }
    }

    /// The external-calibration constants from bytes 56..=91 of page 0xA2.
    pub fn calibration_constants(&self) -> CalibrationConstants {
        let a2 = self.a2();
        let ieee = |index: u8| {
            convert::decode_ieee754_single(
                a2.get(index),
                a2.get(index + 1),
                a2.get(index + 2),
                a2.get(index + 3),
            )
        };
        let linear = |slope_index: u8, offset_index: u8| LinearCalibration {
            slope: convert::decode_unsigned_q8_8(
                a2.get(slope_index),
                a2.get(slope_index + 1),
            ),
            offset: f64::from(convert::decode_i16(
                a2.get(offset_index),
                a2.get(offset_index + 1),
            )),
        };
        CalibrationConstants {
            rx_pwr: [ieee(72), ieee(68), ieee(64), ieee(60), ieee(56)],
            tx_bias: linear(76, 78),
            tx_power: linear(80, 82),
            temperature: linear(84, 86),
            voltage: linear(88, 90),
        }
    }

    /// The module temperature from bytes 96..=97 of page 0xA2, in
    /// degrees C.
    pub fn temperature(&self) -> Result<f64, Error> {
        self.calibrated_temperature(96)
    }

    /// The supply voltage from bytes 98..=99 of page 0xA2, in Volts.
    pub fn supply_voltage(&self) -> Result<f64, Error> {
        let raw = f64::from(self.a2().word(98).unwrap_or_default());
        let calibrated = match self.calibration_mode() {
            CalibrationMode::Unknown => return Err(Error::UndeterminedCalibration),
            CalibrationMode::Internal => raw,
            CalibrationMode::External => {
                self.calibration_constants().voltage.apply(raw)
            }
        };
        Ok(calibrated * VOLTS_PER_LSB)
    }

    /// The laser bias current from bytes 100..=101 of page 0xA2, in mA.
    pub fn tx_bias_current(&self) -> Result<f64, Error> {
        let raw = f64::from(self.a2().word(100).unwrap_or_default());
        let calibrated = match self.calibration_mode() {
            CalibrationMode::Unknown => return Err(Error::UndeterminedCalibration),
            CalibrationMode::Internal => raw,
            CalibrationMode::External => {
                self.calibration_constants().tx_bias.apply(raw)
            }
        };
        Ok(calibrated * BIAS_MA_PER_LSB)
    }

    /// The transmitter output power from bytes 102..=103 of page 0xA2,
    /// in microwatts.
    pub fn tx_power(&self) -> Result<f64, Error> {
        let raw = f64::from(self.a2().word(102).unwrap_or_default());
        let calibrated = match self.calibration_mode() {
            CalibrationMode::Unknown => return Err(Error::UndeterminedCalibration),
            CalibrationMode::Internal => raw,
            CalibrationMode::External => {
                self.calibration_constants().tx_power.apply(raw)
            }
        };
        Ok(calibrated * POWER_UW_PER_LSB)
    }

    /// The received optical power from bytes 104..=105 of page 0xA2, in
    /// microwatts.
    ///
    /// External calibration evaluates the full RX_PWR polynomial over the
    /// raw ADC value.
    pub fn rx_power(&self) -> Result<f64, Error> {
        let raw = f64::from(self.a2().word(104).unwrap_or_default());
        let calibrated = match self.calibration_mode() {
            CalibrationMode::Unknown => return Err(Error::UndeterminedCalibration),
            CalibrationMode::Internal => raw,
            CalibrationMode::External => {
                self.calibration_constants().rx_power_polynomial(raw)
            }
        };
        Ok(calibrated * POWER_UW_PER_LSB)
    }

    /// The optional laser temperature from bytes 106..=107 of page 0xA2,
    /// in degrees C.
    ///
    /// Externally calibrated modules apply the module temperature
    /// constants, which SFF-8472 shares between the two fields.
    pub fn laser_temperature(&self) -> Result<f64, Error> {
        self.calibrated_temperature(106)
    }

    /// The optional TEC current from bytes 108..=109 of page 0xA2, in mA.
    ///
    /// No calibration constants exist for this field, so internal and
    /// external modules decode identically.
    pub fn tec_current(&self) -> Result<f64, Error> {
        if self.calibration_mode() == CalibrationMode::Unknown {
            return Err(Error::UndeterminedCalibration);
        }
        let a2 = self.a2();
        Ok(convert::decode_tec_current(a2.get(108), a2.get(109)))
    }

    fn calibrated_temperature(&self, index: u8) -> Result<f64, Error> {
        let decoded = temperature_at(self.a2(), index);
        match self.calibration_mode() {
            CalibrationMode::Unknown => Err(Error::UndeterminedCalibration),
            CalibrationMode::Internal => Ok(decoded),
            CalibrationMode::External => {
                Ok(self.calibration_constants().temperature.apply(decoded))
            }
        }
    }
}
