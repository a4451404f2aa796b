// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A host-side control interface for remote SFP docking stations and
//! plug devices.

pub mod config;
pub mod discovery;
pub mod registry;
pub mod session;

pub use config::Config;
pub use config::ConfigBuilder;
pub use discovery::DiscoveryBroadcaster;
pub use discovery::DiscoveryReply;
pub use registry::DeviceKind;
pub use session::Event;
pub use session::SessionManager;

use thiserror::Error;

/// Capacity of the channels between the session task and its callers.
pub(crate) const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum Error {
    /// A send was requested to an address with no live connection.
    #[error("no live connection for destination address '{0}'")]
    UnknownDestination(String),

    /// An interface with no usable IPv4 broadcast address.
    #[error("no IPv4 broadcast address on interface '{0}'")]
    BadInterface(String),

    #[error("wire framing error")]
    Frame(#[from] dock_messages::Error),

    #[error("network or I/O error")]
    Io(#[from] std::io::Error),

    /// The session task is no longer running.
    #[error("session manager has shut down")]
    SessionClosed,
}
