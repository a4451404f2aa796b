// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversions between SFF-8472 field formats and host numeric types.
//!
//! The memory map stores multi-byte fields big-endian. Calibration slopes
//! are unsigned Q8.8 fixed point, temperatures are signed Q7.8 two's
//! complement, calibration offsets are plain `i16`, and the receive-power
//! calibration coefficients are IEEE-754 single-precision floats.

use crate::Error;

/// The largest value representable in unsigned Q8.8, 255 + 255/256.
pub const UNSIGNED_Q8_8_MAX: f64 = 255.99609375;

/// The magnitude bound of signed Q7.8, 127 + 255/256.
pub const SIGNED_Q7_8_MAX: f64 = 127.99609375;

/// Decode a big-endian IEEE-754 single-precision float.
///
/// `b3` is the most significant byte. The value is widened to `f64` for
/// use in calibration arithmetic.
pub fn decode_ieee754_single(b3: u8, b2: u8, b1: u8, b0: u8) -> f64 {
    f64::from(f32::from_be_bytes([b3, b2, b1, b0]))
}

/// Decode an unsigned Q8.8 fixed-point value, `b1` the integer byte and
/// `b0` the fractional byte. The result is in `[0, 255.996]`.
pub fn decode_unsigned_q8_8(b1: u8, b0: u8) -> f64 {
    f64::from(u16::from_be_bytes([b1, b0])) / 256.0
}

/// Decode a signed Q7.8 two's-complement value, `b1` the integer byte and
/// `b0` the fractional byte. The result is in `[-128, 127.996]`.
pub fn decode_signed_q7_8(b1: u8, b0: u8) -> f64 {
    f64::from(i16::from_be_bytes([b1, b0])) / 256.0
}

/// Decode a big-endian two's-complement 16-bit integer.
pub fn decode_i16(b1: u8, b0: u8) -> i32 {
    i32::from(i16::from_be_bytes([b1, b0]))
}

/// Decode a TEC current reading, in mA.
///
/// The field is a signed 16-bit count of 0.1 mA, so the result is in
/// `[-3276.8, 3276.7]`. Positive values indicate cooling.
pub fn decode_tec_current(b1: u8, b0: u8) -> f64 {
    f64::from(i16::from_be_bytes([b1, b0])) / 10.0
}

/// Encode a value as unsigned Q8.8 fixed point, returning `[b1, b0]`.
///
/// Values outside `[0, 255.996]` are rejected before any bit manipulation.
pub fn encode_unsigned_q8_8(value: f64) -> Result<[u8; 2], Error> {
    if !(0.0..=UNSIGNED_Q8_8_MAX).contains(&value) {
        return Err(Error::OutOfRange { value, min: 0.0, max: UNSIGNED_Q8_8_MAX });
    }
    let scaled = (value * 256.0).round() as u16;
    Ok(scaled.to_be_bytes())
}

/// Encode a value as signed Q7.8 two's complement, returning `[b1, b0]`.
///
/// Values outside `[-127.996, 127.996]` are rejected before any bit
/// manipulation.
pub fn encode_signed_q7_8(value: f64) -> Result<[u8; 2], Error> {
    if !(-SIGNED_Q7_8_MAX..=SIGNED_Q7_8_MAX).contains(&value) {
        return Err(Error::OutOfRange {
            value,
            min: -SIGNED_Q7_8_MAX,
            max: SIGNED_Q7_8_MAX,
        });
    }
    let scaled = (value * 256.0).round() as i16;
    Ok(scaled.to_be_bytes())
}

/// Encode a value as an unsigned 16-bit integer, returning `[b1, b0]`.
///
/// The fractional part is truncated. Values outside `[0, 65535]` are
/// rejected.
pub fn encode_u16(value: f64) -> Result<[u8; 2], Error> {
    if !(0.0..=65535.0).contains(&value) {
        return Err(Error::OutOfRange { value, min: 0.0, max: 65535.0 });
    }
    let truncated = value.trunc() as u16;
    Ok(truncated.to_be_bytes())
}
