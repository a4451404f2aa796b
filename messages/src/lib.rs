// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messaging formats for managing remote SFP docking stations over the
//! network.

pub mod message;

pub use message::MessageCode;
pub use message::ProtocolMessage;
pub use message::REGISTER_LIST_CODES;

use thiserror::Error;

/// The exact size of every frame exchanged on the wire.
///
/// Frames are never shorter or longer. A `Simple` message zero-pads its text
/// and a `RegisterList` message zero-pads its register bytes out to this size.
pub const FRAME_SIZE: usize = 256;

/// The port on which both sides should listen.
///
/// Discovery probes are broadcast over UDP to this port, and devices connect
/// back to the host over TCP on the same port.
pub const PORT: u16 = 20100;

/// The size in bytes of each big-endian `u16` header field.
const SIZEOF_U16: usize = 2;

/// The maximum text payload of a [`ProtocolMessage::Simple`] frame.
///
/// The frame is the message code followed by the text, zero-padded out to
/// [`FRAME_SIZE`].
pub const MAX_TEXT: usize = FRAME_SIZE - SIZEOF_U16;

/// The maximum number of register values in a [`ProtocolMessage::RegisterList`]
/// frame.
///
/// The frame is the message code, the page number, and the register count,
/// followed by one byte per register, zero-padded out to [`FRAME_SIZE`].
pub const MAX_REGISTERS: usize = FRAME_SIZE - 3 * SIZEOF_U16;

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// A text payload that cannot fit in a single frame.
    #[error("text payload of {0} bytes exceeds the {MAX_TEXT}-byte frame capacity")]
    PayloadTooLong(usize),

    /// A register list that cannot fit in a single frame.
    #[error(
        "register list of {0} entries exceeds the \
        {MAX_REGISTERS}-register frame capacity"
    )]
    TooManyRegisters(usize),

    /// Received bytes that do not form a valid frame, either because the
    /// length is wrong or the declared register count is inconsistent.
    #[error("received bytes do not form a valid {FRAME_SIZE}-byte frame")]
    MalformedFrame,
}
