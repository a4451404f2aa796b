// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The session manager: a single task owning all device connections.
//!
//! Devices connect to us over TCP after answering a discovery probe. Each
//! accepted connection gets a small read task that reassembles fixed-size
//! frames and forwards them to the session task, which owns the registry
//! and dispatches by message code. Callers talk to the task through a
//! command channel and receive [`Event`]s on a bounded event channel; a
//! lagging consumer applies backpressure rather than losing events.

use crate::registry::Registry;
use crate::Config;
use crate::DeviceKind;
use crate::Error;
use crate::CHANNEL_CAPACITY;
use dock_messages::MessageCode;
use dock_messages::ProtocolMessage;
use dock_messages::FRAME_SIZE;
use itertools::Itertools;
use slog::debug;
use slog::error;
use slog::info;
use slog::o;
use slog::trace;
use slog::warn;
use slog::Logger;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio::time::timeout;
use tokio::time::Instant;

/// An event surfaced by the session manager.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// A device identified itself and was classified.
    DeviceConnected { kind: DeviceKind, addr: String },
    /// A device's connection closed.
    DeviceDisconnected { kind: DeviceKind, addr: String },
    /// A device returned register values.
    RegisterData {
        addr: String,
        code: MessageCode,
        page: u16,
        values: Vec<u8>,
    },
    /// A device reported the outcome of a requested operation.
    OperationResult { addr: String, code: MessageCode },
    /// A device failed to access its module over I2C.
    RemoteIoError { addr: String, text: String },
    /// A device showed no traffic within the liveness window and was
    /// dropped from the registry.
    DeviceUnresponsive { addr: String },
}

// A request from a handle to the session task.
#[derive(Debug)]
enum Command {
    Send {
        addr: String,
        message: ProtocolMessage,
        reply_tx: oneshot::Sender<Result<(), Error>>,
    },
    Shutdown,
}

// An item forwarded from a per-connection read task. `conn` identifies
// the connection the item came from, so traffic and teardown from a
// stale connection cannot affect a reconnect's record.
#[derive(Debug)]
enum Inbound {
    Frame { addr: String, conn: u64, frame: [u8; FRAME_SIZE] },
    Closed { addr: String, conn: u64 },
}

/// A handle to the session task.
///
/// Dropping the handle aborts the task and closes every connection.
#[derive(Debug)]
pub struct SessionManager {
    command_tx: mpsc::Sender<Command>,
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl SessionManager {
    /// Bind the listener and spawn the session task.
    ///
    /// Returns the handle and the receiving end of the event channel.
    pub async fn new(
        config: &Config,
        log: Logger,
    ) -> Result<(Self, mpsc::Receiver<Event>), Error> {
        let listener = TcpListener::bind((config.address, config.port)).await?;
        let local_addr = listener.local_addr()?;
        info!(log, "session manager listening"; "local_addr" => %local_addr);
        let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (inbound_tx, inbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task = SessionTask {
            log,
            listener,
            registry: Registry::default(),
            command_rx,
            event_tx,
            inbound_tx,
            inbound_rx,
            heartbeat_interval: config.heartbeat_interval,
            liveness_timeout: config.liveness_timeout,
            write_timeout: config.write_timeout,
            next_conn: 0,
        };
        let task = tokio::spawn(task.run());
        Ok((Self { command_tx, local_addr, task }, event_rx))
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send a message to a connected device.
    ///
    /// Fails with [`Error::UnknownDestination`] if no live connection
    /// exists for `addr`.
    pub async fn send(
        &self,
        addr: impl Into<String>,
        message: ProtocolMessage,
    ) -> Result<(), Error> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = Command::Send { addr: addr.into(), message, reply_tx };
        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::SessionClosed)?;
        reply_rx.await.map_err(|_| Error::SessionClosed)?
    }

    /// Ask the session task to exit, closing every connection.
    pub async fn shutdown(&self) -> Result<(), Error> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| Error::SessionClosed)
    }
}

struct SessionTask {
    log: Logger,
    listener: TcpListener,
    registry: Registry,
    command_rx: mpsc::Receiver<Command>,
    event_tx: mpsc::Sender<Event>,
    inbound_tx: mpsc::Sender<Inbound>,
    inbound_rx: mpsc::Receiver<Inbound>,
    heartbeat_interval: Duration,
    liveness_timeout: Duration,
    write_timeout: Duration,
    // Identity for the next accepted connection.
    next_conn: u64,
}

impl SessionTask {
    async fn run(mut self) {
        let mut heartbeat = interval(self.heartbeat_interval);
        loop {
            tokio::select! {
                result = self.listener.accept() => match result {
                    Ok((stream, peer)) => self.handle_accept(stream, peer),
                    Err(e) => {
                        error!(self.log, "failed to accept connection"; "reason" => ?e);
                    }
                },
                Some(inbound) = self.inbound_rx.recv() => match inbound {
                    Inbound::Frame { addr, conn, frame } => {
                        self.handle_frame(addr, conn, &frame).await;
                    }
                    Inbound::Closed { addr, conn } => {
                        self.handle_closed(&addr, conn).await;
                    }
                },
                command = self.command_rx.recv() => match command {
                    Some(Command::Send { addr, message, reply_tx }) => {
                        let result = self.send_frame(&addr, &message).await;
                        // A dropped caller just means nobody wants the result.
                        let _ = reply_tx.send(result);
                    }
                    Some(Command::Shutdown) | None => {
                        debug!(self.log, "session manager shutting down");
                        return;
                    }
                },
                _ = heartbeat.tick() => self.handle_heartbeat().await,
            }
        }
    }

    fn handle_accept(&mut self, stream: TcpStream, peer: SocketAddr) {
        let conn = self.next_conn;
        self.next_conn += 1;
        let addr = peer.ip().to_string();
        debug!(self.log, "accepted connection"; "peer" => &addr, "conn" => conn);
        let (reader, writer) = stream.into_split();
        self.registry.insert(addr.clone(), writer, conn);
        let log = self.log.new(o!("peer" => addr.clone()));
        tokio::spawn(read_task(log, addr, conn, reader, self.inbound_tx.clone()));
    }

    async fn handle_frame(&mut self, addr: String, conn: u64, frame: &[u8; FRAME_SIZE]) {
        if !self.registry.is_current(&addr, conn) {
            debug!(self.log, "dropping frame from stale connection"; "peer" => &addr);
            return;
        }
        self.registry.touch(&addr, Instant::now() + self.liveness_timeout);
        let message = match ProtocolMessage::decode(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    self.log,
                    "dropping malformed frame";
                    "peer" => &addr,
                    "reason" => %e,
                );
                return;
            }
        };
        trace!(self.log, "received message"; "peer" => &addr, "code" => ?message.code());
        use MessageCode::*;
        match message {
            ProtocolMessage::Simple { code: DockDiscoverAck, .. } => {
                self.classify(addr, DeviceKind::DockingStation).await;
            }
            ProtocolMessage::Simple { code: PlugDiscoverAck, .. } => {
                self.classify(addr, DeviceKind::PlugDevice).await;
            }
            ProtocolMessage::Simple {
                code:
                    code @ (CloneMemorySuccess | CloneMemoryError | ReprogramSuccess
                    | ReprogramFail),
                ..
            } => {
                self.emit(Event::OperationResult { addr, code }).await;
            }
            ProtocolMessage::Simple { code: RemoteIoError, text } => {
                warn!(self.log, "device reported I/O error"; "peer" => &addr, "detail" => &text);
                self.emit(Event::RemoteIoError { addr, text }).await;
            }
            ProtocolMessage::RegisterList { code, page, registers } => {
                self.emit(Event::RegisterData { addr, code, page, values: registers })
                    .await;
            }
            ProtocolMessage::Simple { code, .. } => {
                debug!(self.log, "unhandled message"; "peer" => &addr, "code" => ?code);
            }
        }
    }

    async fn classify(&mut self, addr: String, kind: DeviceKind) {
        // Only plug devices receive heartbeats, so only they carry a
        // liveness deadline.
        let deadline = match kind {
            DeviceKind::PlugDevice => Some(Instant::now() + self.liveness_timeout),
            _ => None,
        };
        match self.registry.classify(&addr, kind, deadline) {
            Some(_) => {
                info!(self.log, "device classified"; "peer" => &addr, "kind" => ?kind);
                self.emit(Event::DeviceConnected { kind, addr }).await;
            }
            None => {
                warn!(
                    self.log,
                    "discovery acknowledgement from unconnected peer";
                    "peer" => &addr,
                );
            }
        }
    }

    async fn handle_closed(&mut self, addr: &str, conn: u64) {
        // A record replaced by a reconnect belongs to the new connection;
        // the stale connection's teardown must leave it alone.
        if !self.registry.is_current(addr, conn) {
            debug!(self.log, "stale connection closed"; "peer" => addr, "conn" => conn);
            return;
        }
        if let Some(record) = self.registry.remove(addr) {
            debug!(self.log, "device disconnected"; "peer" => addr, "kind" => ?record.kind);
            self.emit(Event::DeviceDisconnected {
                kind: record.kind,
                addr: addr.to_string(),
            })
            .await;
        }
    }

    async fn send_frame(
        &mut self,
        addr: &str,
        message: &ProtocolMessage,
    ) -> Result<(), Error> {
        let frame = message.encode()?;
        let writer = self.registry.writer_mut(addr)?;
        // A peer that stops reading must not stall the session task for
        // longer than the write timeout.
        match timeout(self.write_timeout, writer.write_all(&frame)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Io(std::io::ErrorKind::TimedOut.into()));
            }
        }
        Ok(())
    }

    async fn handle_heartbeat(&mut self) {
        let now = Instant::now();
        for addr in self.registry.expired(now) {
            warn!(self.log, "device unresponsive"; "peer" => &addr);
            self.registry.remove(&addr);
            self.emit(Event::DeviceUnresponsive { addr }).await;
        }

        let plugs = self.registry.plug_devices().map(String::from).collect_vec();
        for addr in plugs {
            let message = ProtocolMessage::simple(MessageCode::Heartbeat, "");
            if let Err(e) = self.send_frame(&addr, &message).await {
                warn!(self.log, "failed to send heartbeat"; "peer" => &addr, "reason" => ?e);
            }
        }
    }

    async fn emit(&self, event: Event) {
        // The receiver dropping means the caller no longer cares.
        let _ = self.event_tx.send(event).await;
    }
}

// Reassemble fixed-size frames from one connection and forward them.
async fn read_task(
    log: Logger,
    addr: String,
    conn: u64,
    mut reader: OwnedReadHalf,
    inbound_tx: mpsc::Sender<Inbound>,
) {
    let mut frame = [0u8; FRAME_SIZE];
    loop {
        match reader.read_exact(&mut frame).await {
            Ok(_) => {
                let item = Inbound::Frame { addr: addr.clone(), conn, frame };
                if inbound_tx.send(item).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::UnexpectedEof {
                    debug!(log, "read failed"; "reason" => ?e);
                }
                let _ = inbound_tx.send(Inbound::Closed { addr, conn }).await;
                return;
            }
        }
    }
}
