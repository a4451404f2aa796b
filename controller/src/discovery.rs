// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery of docking stations and plug devices by UDP broadcast.
//!
//! The broadcaster periodically sends a discovery probe to the broadcast
//! address and drains any acknowledgements that arrive shortly after.
//! Devices answer the probe's source address directly, then connect back
//! to the host over TCP for the actual session.

use crate::Config;
use crate::Error;
use crate::CHANNEL_CAPACITY;
use dock_messages::MessageCode;
use dock_messages::ProtocolMessage;
use dock_messages::FRAME_SIZE;
use slog::error;
use slog::trace;
use slog::warn;
use slog::Logger;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio::time::timeout;

// How long to wait for further acknowledgements after each probe.
const REPLY_POLL: Duration = Duration::from_millis(50);

/// The text carried in each discovery probe.
pub const DISCOVER_TEXT: &str = "DISCOVER";

/// An acknowledgement received in response to a discovery probe.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DiscoveryReply {
    /// The source address of the acknowledgement.
    pub addr: SocketAddr,
    /// The acknowledgement code, identifying the kind of device.
    pub code: MessageCode,
}

/// Periodically probes the broadcast domain for devices.
#[derive(Debug)]
pub struct DiscoveryBroadcaster {
    log: Logger,
    socket: UdpSocket,
    local_addr: SocketAddr,
    target: SocketAddr,
    probe: [u8; FRAME_SIZE],
    probe_interval: Duration,
    reply_tx: mpsc::Sender<DiscoveryReply>,
}

impl DiscoveryBroadcaster {
    /// Bind a broadcast-capable UDP socket on an ephemeral port.
    ///
    /// Devices acknowledge to the probe's source address, so the socket
    /// need not share the session port. Returns the broadcaster and the
    /// receiving end of the reply channel.
    pub async fn new(
        config: &Config,
        log: Logger,
    ) -> Result<(Self, mpsc::Receiver<DiscoveryReply>), Error> {
        let socket = UdpSocket::bind((config.address, 0)).await?;
        socket.set_broadcast(true)?;
        let local_addr = socket.local_addr()?;
        let probe =
            ProtocolMessage::simple(MessageCode::Discover, DISCOVER_TEXT).encode()?;
        let (reply_tx, reply_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let broadcaster = Self {
            log,
            socket,
            local_addr,
            target: SocketAddr::from((config.broadcast, config.port)),
            probe,
            probe_interval: config.discovery_interval,
            reply_tx,
        };
        Ok((broadcaster, reply_rx))
    }

    /// The address the probe socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Probe on each interval tick, forwarding acknowledgements in
    /// arrival order until the reply channel is dropped.
    pub async fn run(mut self) {
        let mut probes = interval(self.probe_interval);
        loop {
            probes.tick().await;
            if let Err(e) = self.socket.send_to(&self.probe, self.target).await {
                error!(
                    self.log,
                    "failed to send discovery probe";
                    "target" => %self.target,
                    "reason" => ?e,
                );
                continue;
            }
            trace!(self.log, "sent discovery probe"; "target" => %self.target);
            if !self.drain_replies().await {
                return;
            }
        }
    }

    // Receive acknowledgements until the line goes quiet. Returns false
    // once the reply channel is closed.
    async fn drain_replies(&mut self) -> bool {
        let mut buf = [0u8; FRAME_SIZE];
        loop {
            let (n, peer) =
                match timeout(REPLY_POLL, self.socket.recv_from(&mut buf)).await {
                    Err(_) => return true,
                    Ok(Err(e)) => {
                        error!(self.log, "failed to receive reply"; "reason" => ?e);
                        return true;
                    }
                    Ok(Ok(received)) => received,
                };
            // A broadcast probe can be delivered back to its sender.
            if peer == self.local_addr {
                continue;
            }
            let code = match ProtocolMessage::decode(&buf[..n]) {
                Ok(message) => message.code(),
                Err(e) => {
                    warn!(
                        self.log,
                        "dropping malformed reply";
                        "peer" => %peer,
                        "reason" => %e,
                    );
                    continue;
                }
            };
            trace!(self.log, "discovery reply"; "peer" => %peer, "code" => ?code);
            if self.reply_tx.send(DiscoveryReply { addr: peer, code }).await.is_err() {
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigBuilder;
    use slog::o;
    use std::net::Ipv4Addr;

    fn test_log() -> Logger {
        Logger::root(slog::Discard, o!())
    }

    #[tokio::test]
    async fn test_probe_and_replies() {
        // A mock device listening where probes will be sent.
        let device = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let device_addr = device.local_addr().unwrap();

        let config = ConfigBuilder::new()
            .address(Ipv4Addr::LOCALHOST)
            .port(device_addr.port())
            .broadcast(Ipv4Addr::LOCALHOST)
            .discovery_interval(Duration::from_millis(50))
            .build()
            .unwrap();
        let (broadcaster, mut reply_rx) =
            DiscoveryBroadcaster::new(&config, test_log()).await.unwrap();
        tokio::spawn(broadcaster.run());

        // The device sees a well-formed probe.
        let mut buf = [0u8; FRAME_SIZE];
        let (n, host) = timeout(Duration::from_secs(5), device.recv_from(&mut buf))
            .await
            .expect("timed out waiting for probe")
            .unwrap();
        assert_eq!(
            ProtocolMessage::decode(&buf[..n]).unwrap(),
            ProtocolMessage::simple(MessageCode::Discover, DISCOVER_TEXT),
        );

        // Garbage is dropped, acknowledgements are forwarded in order.
        device.send_to(&[0xab; 10], host).await.unwrap();
        let dock = ProtocolMessage::simple(MessageCode::DockDiscoverAck, "DOCK");
        device.send_to(&dock.encode().unwrap(), host).await.unwrap();
        let plug = ProtocolMessage::simple(MessageCode::PlugDiscoverAck, "PLUG");
        device.send_to(&plug.encode().unwrap(), host).await.unwrap();

        let reply = timeout(Duration::from_secs(5), reply_rx.recv())
            .await
            .expect("timed out waiting for reply")
            .unwrap();
        assert_eq!(reply.addr, device_addr);
        assert_eq!(reply.code, MessageCode::DockDiscoverAck);

        let reply = timeout(Duration::from_secs(5), reply_rx.recv())
            .await
            .expect("timed out waiting for reply")
            .unwrap();
        assert_eq!(reply.addr, device_addr);
        assert_eq!(reply.code, MessageCode::PlugDiscoverAck);
    }
}
