// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration of the docking-station controller.

use crate::Error;
use dock_messages::PORT;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Return the default interval between discovery broadcasts.
pub const fn default_discovery_interval() -> Duration {
    Duration::from_secs(1)
}

/// Return the default interval between heartbeats to plug devices.
pub const fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(5)
}

/// Return the default window in which a device must show traffic before
/// it is considered unresponsive.
pub const fn default_liveness_timeout() -> Duration {
    Duration::from_secs(15)
}

/// Return the default time allowed for one frame write to a device.
pub const fn default_write_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Return the default port on which we listen and to which we send.
pub const fn default_port() -> u16 {
    PORT
}

/// Configuration for the session manager and discovery broadcaster.
///
/// The [`ConfigBuilder`] constructs this with defaults that work for a
/// flat LAN where devices and host share one port.
#[derive(Clone, Debug)]
pub struct Config {
    /// The address on which to listen, for both TCP sessions and UDP
    /// discovery replies.
    pub address: Ipv4Addr,

    /// The port used both for listening and as the destination of
    /// discovery probes.
    pub port: u16,

    /// The address to which discovery probes are broadcast.
    pub broadcast: Ipv4Addr,

    /// The interval between discovery broadcasts.
    pub discovery_interval: Duration,

    /// The interval between heartbeats to classified plug devices.
    pub heartbeat_interval: Duration,

    /// The window in which a device must show inbound traffic before it
    /// is reported unresponsive.
    pub liveness_timeout: Duration,

    /// The time allowed for one frame write before the send fails. Keeps
    /// a device that stops reading from stalling the session task.
    pub write_timeout: Duration,
}

// Yield the broadcast address of the interface, if its name matches
// `name` and it carries an IPv4 broadcast address.
fn interface_broadcast(name: &str, iface: nix::ifaddrs::InterfaceAddress) -> Option<Ipv4Addr> {
    if name == iface.interface_name {
        iface.broadcast.and_then(|s| s.as_sockaddr_in().map(|x| x.ip()))
    } else {
        None
    }
}

/// Return the first IPv4 broadcast address on an interface.
///
/// If no such interface or address exists, an `Err` is returned.
pub fn find_interface_broadcast_addr(name: &str) -> Result<Ipv4Addr, Error> {
    let mut interfaces =
        nix::ifaddrs::getifaddrs().map_err(|_| Error::BadInterface(name.to_string()))?;
    interfaces
        .find_map(|iface| interface_broadcast(name, iface))
        .ok_or_else(|| Error::BadInterface(name.to_string()))
}

/// A builder interface for generating controller configuration.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    interface: Option<String>,
    address: Option<Ipv4Addr>,
    port: Option<u16>,
    broadcast: Option<Ipv4Addr>,
    discovery_interval: Option<Duration>,
    heartbeat_interval: Option<Duration>,
    liveness_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the broadcast address from a named IP interface, unless one
    /// is set explicitly.
    pub fn interface(mut self, interface: impl AsRef<str>) -> Self {
        self.interface = Some(String::from(interface.as_ref()));
        self
    }

    /// Set the address on which to listen.
    pub fn address(mut self, address: impl Into<Ipv4Addr>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the port used for listening and for discovery probes.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the discovery broadcast address explicitly.
    pub fn broadcast(mut self, broadcast: impl Into<Ipv4Addr>) -> Self {
        self.broadcast = Some(broadcast.into());
        self
    }

    /// Set the interval between discovery broadcasts.
    pub fn discovery_interval(mut self, interval: Duration) -> Self {
        self.discovery_interval = Some(interval);
        self
    }

    /// Set the interval between heartbeats to plug devices.
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Set the window in which a device must show inbound traffic.
    pub fn liveness_timeout(mut self, timeout: Duration) -> Self {
        self.liveness_timeout = Some(timeout);
        self
    }

    /// Set the time allowed for one frame write to a device.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Build a `Config` from `self`.
    ///
    /// The broadcast address is taken explicitly if set; otherwise looked
    /// up from the named interface; otherwise the limited broadcast
    /// address is used.
    pub fn build(self) -> Result<Config, Error> {
        let broadcast = match (self.broadcast, &self.interface) {
            (Some(b), _) => b,
            (None, Some(interface)) => find_interface_broadcast_addr(interface)?,
            (None, None) => Ipv4Addr::BROADCAST,
        };
        Ok(Config {
            address: self.address.unwrap_or(Ipv4Addr::UNSPECIFIED),
            port: self.port.unwrap_or_else(default_port),
            broadcast,
            discovery_interval: self
                .discovery_interval
                .unwrap_or_else(default_discovery_interval),
            heartbeat_interval: self
                .heartbeat_interval
                .unwrap_or_else(default_heartbeat_interval),
            liveness_timeout: self
                .liveness_timeout
                .unwrap_or_else(default_liveness_timeout),
            write_timeout: self.write_timeout.unwrap_or_else(default_write_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigBuilder;
    use dock_messages::PORT;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    #[test]
    fn test_config_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.address, Ipv4Addr::UNSPECIFIED);
        assert_eq!(config.port, PORT);
        assert_eq!(config.broadcast, Ipv4Addr::BROADCAST);
        assert_eq!(config.discovery_interval, Duration::from_secs(1));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(config.liveness_timeout, Duration::from_secs(15));
        assert_eq!(config.write_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_builder_explicit() {
        let config = ConfigBuilder::new()
            .address(Ipv4Addr::LOCALHOST)
            .port(0)
            .broadcast(Ipv4Addr::LOCALHOST)
            .discovery_interval(Duration::from_millis(100))
            .build()
            .unwrap();
        assert_eq!(config.address, Ipv4Addr::LOCALHOST);
        assert_eq!(config.port, 0);
        assert_eq!(config.broadcast, Ipv4Addr::LOCALHOST);
        assert_eq!(config.discovery_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_bad_interface() {
        assert!(ConfigBuilder::new().interface("nosuchif0").build().is_err());
        // An explicit broadcast address short-circuits the lookup.
        assert!(ConfigBuilder::new()
            .interface("nosuchif0")
            .broadcast(Ipv4Addr::LOCALHOST)
            .build()
            .is_ok());
    }
}
