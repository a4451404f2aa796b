// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message formats and definitions.

use super::Error;
use super::FRAME_SIZE;
use super::MAX_REGISTERS;
use super::MAX_TEXT;
use super::SIZEOF_U16;

/// The code identifying the purpose of a frame.
///
/// Every frame opens with one of these, as a big-endian `u16`. Codes the
/// protocol does not define are preserved as [`MessageCode::Other`], so a
/// round trip through the wire never loses the raw value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MessageCode {
    /// Broadcast probe asking devices on the network to identify themselves.
    Discover,
    /// A docking station's reply to [`MessageCode::Discover`].
    DockDiscoverAck,
    /// Ask a docking station to read back the entire memory map of its module.
    CloneMemory,
    /// The clone could not be completed.
    CloneMemoryError,
    /// The clone completed.
    CloneMemorySuccess,
    /// Read a specific set of registers from one memory page.
    ReadRegisters,
    /// The values for a [`MessageCode::ReadRegisters`] request.
    ReadRegistersAck,
    /// Request the identification registers needed to seed page 0xA0.
    DiagnosticInitA0,
    /// The values for a [`MessageCode::DiagnosticInitA0`] request.
    DiagnosticInitA0Ack,
    /// Request the calibration and threshold registers of page 0xA2.
    DiagnosticInitA2,
    /// The values for a [`MessageCode::DiagnosticInitA2`] request.
    DiagnosticInitA2Ack,
    /// Request a refresh of the real-time diagnostic registers.
    RealTimeRefresh,
    /// The values for a [`MessageCode::RealTimeRefresh`] request.
    RealTimeRefreshAck,
    /// The remote side failed to access its module over I2C.
    RemoteIoError,
    /// A plug device's reply to [`MessageCode::Discover`].
    PlugDiscoverAck,
    /// Ask a plug device to reprogram itself with a previously cloned map.
    Reprogram,
    /// The reprogramming completed.
    ReprogramSuccess,
    /// The reprogramming could not be completed.
    ReprogramFail,
    /// Periodic liveness check sent to plug devices.
    Heartbeat,
    /// A code this protocol version does not define.
    Other(u16),
}

impl From<u16> for MessageCode {
    fn from(x: u16) -> Self {
        use MessageCode::*;
        match x {
            0 => Discover,
            100 => DockDiscoverAck,
            101 => CloneMemory,
            102 => CloneMemoryError,
            103 => CloneMemorySuccess,
            125 => ReadRegisters,
            126 => ReadRegistersAck,
            127 => DiagnosticInitA0,
            128 => DiagnosticInitA0Ack,
            129 => DiagnosticInitA2,
            130 => DiagnosticInitA2Ack,
            131 => RealTimeRefresh,
            132 => RealTimeRefreshAck,
            150 => RemoteIoError,
            200 => PlugDiscoverAck,
            201 => Reprogram,
            202 => ReprogramSuccess,
            203 => ReprogramFail,
            210 => Heartbeat,
            other => Other(other),
        }
    }
}

impl From<MessageCode> for u16 {
    fn from(x: MessageCode) -> u16 {
        use MessageCode::*;
        match x {
            Discover => 0,
            DockDiscoverAck => 100,
            CloneMemory => 101,
            CloneMemoryError => 102,
            CloneMemorySuccess => 103,
            ReadRegisters => 125,
            ReadRegistersAck => 126,
            DiagnosticInitA0 => 127,
            DiagnosticInitA0Ack => 128,
            DiagnosticInitA2 => 129,
            DiagnosticInitA2Ack => 130,
            RealTimeRefresh => 131,
            RealTimeRefreshAck => 132,
            RemoteIoError => 150,
            PlugDiscoverAck => 200,
            Reprogram => 201,
            ReprogramSuccess => 202,
            ReprogramFail => 203,
            Heartbeat => 210,
            Other(other) => other,
        }
    }
}

/// The codes whose frames carry the register-list shape.
///
/// Every other code carries the simple text shape. Decoding consults this
/// table to decide how to interpret the bytes after the code.
pub const REGISTER_LIST_CODES: [MessageCode; 8] = [
    MessageCode::ReadRegisters,
    MessageCode::ReadRegistersAck,
    MessageCode::DiagnosticInitA0,
    MessageCode::DiagnosticInitA0Ack,
    MessageCode::DiagnosticInitA2,
    MessageCode::DiagnosticInitA2Ack,
    MessageCode::RealTimeRefresh,
    MessageCode::RealTimeRefreshAck,
];

impl MessageCode {
    /// Return true if frames with this code carry the register-list shape.
    pub fn is_register_list(&self) -> bool {
        REGISTER_LIST_CODES.contains(self)
    }
}

/// A single frame of the docking-station protocol.
///
/// Both shapes encode to exactly [`FRAME_SIZE`] bytes. A `Simple` frame is
/// the code followed by UTF-8 text, zero-padded. A `RegisterList` frame is
/// the code, a page number, a register count, and that many register bytes,
/// zero-padded. Requests put register indices in `registers`;
/// acknowledgements put the values read back, in the order requested.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProtocolMessage {
    Simple {
        code: MessageCode,
        text: String,
    },
    RegisterList {
        code: MessageCode,
        page: u16,
        registers: Vec<u8>,
    },
}

impl ProtocolMessage {
    /// Construct a simple text frame.
    pub fn simple(code: MessageCode, text: impl Into<String>) -> Self {
        Self::Simple { code, text: text.into() }
    }

    /// Construct a register-list frame.
    pub fn register_list(code: MessageCode, page: u16, registers: Vec<u8>) -> Self {
        Self::RegisterList { code, page, registers }
    }

    /// The message code of this frame.
    pub fn code(&self) -> MessageCode {
        match self {
            Self::Simple { code, .. } => *code,
            Self::RegisterList { code, .. } => *code,
        }
    }

    /// Encode this message into a wire frame.
    ///
    /// Fails with [`Error::PayloadTooLong`] or [`Error::TooManyRegisters`] if
    /// the payload cannot fit. Encoding never truncates.
    pub fn encode(&self) -> Result<[u8; FRAME_SIZE], Error> {
        let mut buf = [0u8; FRAME_SIZE];
        match self {
            Self::Simple { code, text } => {
                let bytes = text.as_bytes();
                if bytes.len() > MAX_TEXT {
                    return Err(Error::PayloadTooLong(bytes.len()));
                }
                buf[..SIZEOF_U16].copy_from_slice(&u16::from(*code).to_be_bytes());
                buf[SIZEOF_U16..SIZEOF_U16 + bytes.len()].copy_from_slice(bytes);
            }
            Self::RegisterList { code, page, registers } => {
                if registers.len() > MAX_REGISTERS {
                    return Err(Error::TooManyRegisters(registers.len()));
                }
                let count = registers.len() as u16;
                buf[..2].copy_from_slice(&u16::from(*code).to_be_bytes());
                buf[2..4].copy_from_slice(&page.to_be_bytes());
                buf[4..6].copy_from_slice(&count.to_be_bytes());
                buf[6..6 + registers.len()].copy_from_slice(registers);
            }
        }
        Ok(buf)
    }

    /// Decode a wire frame.
    ///
    /// The input must be exactly [`FRAME_SIZE`] bytes and, for register-list
    /// codes, must declare a register count that fits in the frame. Anything
    /// else is [`Error::MalformedFrame`]. Trailing NUL padding is stripped
    /// from simple-frame text.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() != FRAME_SIZE {
            return Err(Error::MalformedFrame);
        }
        let code = MessageCode::from(u16::from_be_bytes([buf[0], buf[1]]));
        if code.is_register_list() {
            let page = u16::from_be_bytes([buf[2], buf[3]]);
            let count = usize::from(u16::from_be_bytes([buf[4], buf[5]]));
            if count > MAX_REGISTERS {
                return Err(Error::MalformedFrame);
            }
            let registers = buf[6..6 + count].to_vec();
            Ok(Self::RegisterList { code, page, registers })
        } else {
            let text = String::from_utf8_lossy(&buf[SIZEOF_U16..])
                .trim_end_matches('\0')
                .to_string();
            Ok(Self::Simple { code, text })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use super::MessageCode;
    use super::ProtocolMessage;
    use super::FRAME_SIZE;
    use super::MAX_REGISTERS;
    use super::MAX_TEXT;
    use super::REGISTER_LIST_CODES;

    #[test]
    fn test_message_code_round_trip() {
        for raw in 0..=u16::MAX {
            let code = MessageCode::from(raw);
            assert_eq!(u16::from(code), raw);
        }
    }

    #[test]
    fn test_undefined_code_is_other() {
        assert_eq!(MessageCode::from(42), MessageCode::Other(42));
        assert_eq!(u16::from(MessageCode::Other(42)), 42);
    }

    #[test]
    fn test_register_list_codes_table() {
        for code in REGISTER_LIST_CODES {
            assert!(code.is_register_list());
        }
        assert!(!MessageCode::Discover.is_register_list());
        assert!(!MessageCode::Heartbeat.is_register_list());
        assert!(!MessageCode::Other(9999).is_register_list());
    }

    #[test]
    fn test_simple_round_trip() {
        let message = ProtocolMessage::simple(MessageCode::Discover, "DISCOVER");
        let buf = message.encode().unwrap();
        assert_eq!(buf.len(), FRAME_SIZE);
        assert_eq!(&buf[..2], &[0x00, 0x00]);
        assert_eq!(&buf[2..10], b"DISCOVER");
        assert!(buf[10..].iter().all(|&b| b == 0));
        assert_eq!(ProtocolMessage::decode(&buf).unwrap(), message);
    }

    #[test]
    fn test_simple_empty_text() {
        let message = ProtocolMessage::simple(MessageCode::Heartbeat, "");
        let buf = message.encode().unwrap();
        assert_eq!(ProtocolMessage::decode(&buf).unwrap(), message);
    }

    #[test]
    fn test_simple_max_text() {
        let text = "x".repeat(MAX_TEXT);
        let message = ProtocolMessage::simple(MessageCode::RemoteIoError, &text);
        let buf = message.encode().unwrap();
        assert_eq!(ProtocolMessage::decode(&buf).unwrap(), message);
    }

    #[test]
    fn test_payload_too_long() {
        let text = "x".repeat(MAX_TEXT + 1);
        let message = ProtocolMessage::simple(MessageCode::RemoteIoError, text);
        assert_eq!(message.encode(), Err(Error::PayloadTooLong(MAX_TEXT + 1)));
    }

    #[test]
    fn test_register_list_round_trip() {
        let registers: Vec<u8> = (96..116).collect();
        let message = ProtocolMessage::register_list(
            MessageCode::RealTimeRefresh,
            0x51,
            registers.clone(),
        );
        let buf = message.encode().unwrap();
        assert_eq!(&buf[..2], &131u16.to_be_bytes());
        assert_eq!(&buf[2..4], &[0x00, 0x51]);
        assert_eq!(&buf[4..6], &[0x00, 20]);
        assert_eq!(&buf[6..26], registers.as_slice());
        assert!(buf[26..].iter().all(|&b| b == 0));
        assert_eq!(ProtocolMessage::decode(&buf).unwrap(), message);
    }

    #[test]
    fn test_register_list_empty() {
        let message =
            ProtocolMessage::register_list(MessageCode::ReadRegistersAck, 0x50, vec![]);
        let buf = message.encode().unwrap();
        assert_eq!(ProtocolMessage::decode(&buf).unwrap(), message);
    }

    #[test]
    fn test_register_list_max_registers() {
        let registers = vec![0xab; MAX_REGISTERS];
        let message =
            ProtocolMessage::register_list(MessageCode::ReadRegisters, 0x50, registers);
        let buf = message.encode().unwrap();
        assert_eq!(ProtocolMessage::decode(&buf).unwrap(), message);
    }

    #[test]
    fn test_too_many_registers() {
        let registers = vec![0u8; MAX_REGISTERS + 1];
        let message =
            ProtocolMessage::register_list(MessageCode::ReadRegisters, 0x50, registers);
        assert_eq!(
            message.encode(),
            Err(Error::TooManyRegisters(MAX_REGISTERS + 1))
        );
    }

    #[test]
    fn test_decode_wrong_length() {
        assert_eq!(
            ProtocolMessage::decode(&[0u8; FRAME_SIZE - 1]),
            Err(Error::MalformedFrame)
        );
        assert_eq!(
            ProtocolMessage::decode(&[0u8; FRAME_SIZE + 1]),
            Err(Error::MalformedFrame)
        );
        assert_eq!(ProtocolMessage::decode(&[]), Err(Error::MalformedFrame));
    }

    #[test]
    fn test_decode_inconsistent_register_count() {
        let mut buf = [0u8; FRAME_SIZE];
        buf[..2].copy_from_slice(&u16::from(MessageCode::ReadRegisters).to_be_bytes());
        buf[4..6].copy_from_slice(&(MAX_REGISTERS as u16 + 1).to_be_bytes());
        assert_eq!(ProtocolMessage::decode(&buf), Err(Error::MalformedFrame));
    }

    #[test]
    fn test_decode_unknown_code_is_simple() {
        let mut buf = [0u8; FRAME_SIZE];
        buf[..2].copy_from_slice(&9999u16.to_be_bytes());
        buf[2..7].copy_from_slice(b"hello");
        let message = ProtocolMessage::decode(&buf).unwrap();
        assert_eq!(
            message,
            ProtocolMessage::simple(MessageCode::Other(9999), "hello")
        );
    }
}
