//! Mock docking station that dummies up a basic SFP memory map.

use dock_decode::page::PAGE_SIZE;
use dock_decode::PageId;
use dock_messages::MessageCode;
use dock_messages::ProtocolMessage;
use dock_messages::FRAME_SIZE;
use dock_messages::PORT;
use std::net::Ipv4Addr;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::UdpSocket;

// Build an identification page with a plausible module and valid checksums.
fn mock_a0() -> [u8; PAGE_SIZE] {
    let mut page = [0u8; PAGE_SIZE];
    page[0] = 0x03; // SFP/SFP+/SFP28
    page[2] = 0x07; // LC connector
    page[3] = 0x10; // 10GBASE-SR
    page[6] = 0x01; // 1000BASE-SX
    page[11] = 0x06; // 64B/66B
    page[12] = 103;
    page[20..28].copy_from_slice(b"MOCKDOCK");
    page[40..48].copy_from_slice(b"SFP-MOCK");
    page[60..62].copy_from_slice(&850u16.to_be_bytes());
    page[68..76].copy_from_slice(b"MD000001");
    page[84..90].copy_from_slice(b"250101");
    page[92] = 0x68; // internally calibrated, DDM implemented
    page[94] = 0x08;
    page[63] = checksum(&page[..=62]);
    page[95] = checksum(&page[64..=94]);
    page
}

// Build a diagnostics page with mild readings for internal calibration.
fn mock_a2() -> [u8; PAGE_SIZE] {
    let mut page = [0u8; PAGE_SIZE];
    page[96..98].copy_from_slice(&[0x28, 0x40]); // 40.25 C
    page[98..100].copy_from_slice(&33000u16.to_be_bytes()); // 3.3 V
    page[100..102].copy_from_slice(&3100u16.to_be_bytes()); // 6.2 mA
    page[102..104].copy_from_slice(&6131u16.to_be_bytes()); // 613.1 uW
    page[104..106].copy_from_slice(&5421u16.to_be_bytes()); // 542.1 uW
    page[95] = checksum(&page[..=94]);
    page
}

fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

// Answer a register-list request with the values at the requested indices.
fn registers_reply(
    pages: &[[u8; PAGE_SIZE]; 2],
    ack: MessageCode,
    page: u16,
    indices: &[u8],
) -> ProtocolMessage {
    let source = match PageId::from_wire_page(page) {
        Some(PageId::A0) => &pages[0],
        Some(PageId::A2) => &pages[1],
        None => {
            return ProtocolMessage::simple(
                MessageCode::RemoteIoError,
                format!("no such page 0x{page:02x}"),
            )
        }
    };
    let values = indices.iter().map(|&ix| source[usize::from(ix)]).collect();
    ProtocolMessage::register_list(ack, page, values)
}

async fn serve_session(mut stream: TcpStream, pages: [[u8; PAGE_SIZE]; 2]) {
    // Identify ourselves so the host classifies this connection.
    let ack = ProtocolMessage::simple(MessageCode::DockDiscoverAck, "MOCK-DOCK");
    stream.write_all(&ack.encode().unwrap()).await.unwrap();

    let mut frame = [0u8; FRAME_SIZE];
    loop {
        if stream.read_exact(&mut frame).await.is_err() {
            return;
        }
        let message = match ProtocolMessage::decode(&frame) {
            Ok(message) => message,
            Err(e) => {
                println!("dropping malformed frame: {e}");
                continue;
            }
        };
        println!("=> {message:?}");
        use MessageCode::*;
        let reply = match message {
            ProtocolMessage::RegisterList { code: ReadRegisters, page, registers } => {
                registers_reply(&pages, ReadRegistersAck, page, &registers)
            }
            ProtocolMessage::RegisterList {
                code: DiagnosticInitA0, page, registers
            } => registers_reply(&pages, DiagnosticInitA0Ack, page, &registers),
            ProtocolMessage::RegisterList {
                code: DiagnosticInitA2, page, registers
            } => registers_reply(&pages, DiagnosticInitA2Ack, page, &registers),
            ProtocolMessage::RegisterList {
                code: RealTimeRefresh, page, registers
            } => registers_reply(&pages, RealTimeRefreshAck, page, &registers),
            ProtocolMessage::Simple { code: CloneMemory, .. } => {
                ProtocolMessage::simple(CloneMemorySuccess, "cloned")
            }
            ProtocolMessage::Simple { code: Heartbeat, .. } => continue,
            _ => continue,
        };
        println!("<= {reply:?}");
        stream.write_all(&reply.encode().unwrap()).await.unwrap();
    }
}

#[tokio::main]
async fn main() {
    let sock = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, PORT)).await.unwrap();
    let pages = [mock_a0(), mock_a2()];

    let mut buf = [0u8; FRAME_SIZE];
    loop {
        let (n, peer) = sock.recv_from(&mut buf).await.unwrap();
        match ProtocolMessage::decode(&buf[..n]) {
            Ok(message) if message.code() == MessageCode::Discover => {
                println!("probed by {peer}");
                let ack =
                    ProtocolMessage::simple(MessageCode::DockDiscoverAck, "MOCK-DOCK");
                sock.send_to(&ack.encode().unwrap(), peer).await.unwrap();
                // The session runs over TCP on the shared port.
                let host = (peer.ip(), PORT);
                match TcpStream::connect(host).await {
                    Ok(stream) => {
                        tokio::spawn(serve_session(stream, pages));
                    }
                    Err(e) => {
                        println!("failed to connect back to {}: {e:?}", peer.ip());
                    }
                }
            }
            Ok(message) => println!("ignoring {:?}", message.code()),
            Err(e) => println!("dropping malformed datagram: {e}"),
        }
    }
}
