// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bookkeeping for connected remote devices.

use crate::Error;
use std::collections::HashMap;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::time::Instant;

/// The classification of a remote device.
///
/// Devices connect before they identify themselves, so each starts as
/// `Unknown` and is classified by its discovery acknowledgement.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DeviceKind {
    /// Connected but not yet classified.
    #[default]
    Unknown,
    /// A station holding a physical SFP module whose memory we can read.
    DockingStation,
    /// A reprogrammable plug device.
    PlugDevice,
}

/// State for one connected remote device.
#[derive(Debug)]
pub(crate) struct DeviceRecord {
    pub kind: DeviceKind,
    pub writer: OwnedWriteHalf,
    /// When set, the device must show inbound traffic before this
    /// deadline or be reported unresponsive. Armed at classification for
    /// plug devices.
    pub deadline: Option<Instant>,
    /// The connection this record belongs to. A reconnect from the same
    /// address gets a new value, so a stale connection's teardown cannot
    /// touch the replacement record.
    pub conn: u64,
}

/// The set of connected devices, keyed by peer address.
///
/// There is at most one record per address; a reconnect from the same
/// address replaces the stale record.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    devices: HashMap<String, DeviceRecord>,
}

impl Registry {
    /// Insert a newly accepted, unclassified connection.
    pub fn insert(&mut self, addr: String, writer: OwnedWriteHalf, conn: u64) {
        let record =
            DeviceRecord { kind: DeviceKind::Unknown, writer, deadline: None, conn };
        self.devices.insert(addr, record);
    }

    /// Whether `conn` is still the connection backing the record for
    /// `addr`. False once the address has reconnected or been removed.
    pub fn is_current(&self, addr: &str, conn: u64) -> bool {
        self.devices.get(addr).is_some_and(|record| record.conn == conn)
    }

    /// Classify a connected device, returning its previous kind, or
    /// `None` if the address is not connected.
    pub fn classify(
        &mut self,
        addr: &str,
        kind: DeviceKind,
        deadline: Option<Instant>,
    ) -> Option<DeviceKind> {
        let record = self.devices.get_mut(addr)?;
        let previous = record.kind;
        record.kind = kind;
        record.deadline = deadline;
        Some(previous)
    }

    /// Restart the liveness deadline for a device, if one is armed.
    pub fn touch(&mut self, addr: &str, deadline: Instant) {
        if let Some(record) = self.devices.get_mut(addr) {
            if record.deadline.is_some() {
                record.deadline = Some(deadline);
            }
        }
    }

    pub fn remove(&mut self, addr: &str) -> Option<DeviceRecord> {
        self.devices.remove(addr)
    }

    pub fn kind(&self, addr: &str) -> Option<DeviceKind> {
        self.devices.get(addr).map(|record| record.kind)
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.devices.contains_key(addr)
    }

    /// The write half for a connected address.
    pub fn writer_mut(&mut self, addr: &str) -> Result<&mut OwnedWriteHalf, Error> {
        self.devices
            .get_mut(addr)
            .map(|record| &mut record.writer)
            .ok_or_else(|| Error::UnknownDestination(addr.to_string()))
    }

    /// Addresses whose armed liveness deadline has passed.
    pub fn expired(&self, now: Instant) -> Vec<String> {
        self.devices
            .iter()
            .filter(|(_, record)| matches!(record.deadline, Some(deadline) if deadline <= now))
            .map(|(addr, _)| addr.clone())
            .collect()
    }

    /// Addresses of all classified plug devices.
    pub fn plug_devices(&self) -> impl Iterator<Item = &str> {
        self.devices
            .iter()
            .filter(|(_, record)| record.kind == DeviceKind::PlugDevice)
            .map(|(addr, _)| addr.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::DeviceKind;
    use super::Registry;
    use crate::Error;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::net::TcpStream;
    use tokio::net::tcp::OwnedWriteHalf;
    use tokio::time::Instant;

    // Build a real write half over loopback, since records own one.
    async fn loopback_writer() -> OwnedWriteHalf {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, _) = tokio::join!(TcpStream::connect(addr), listener.accept());
        let (_, writer) = client.unwrap().into_split();
        writer
    }

    #[tokio::test]
    async fn test_registry_lifecycle() {
        let mut registry = Registry::default();
        let addr = String::from("192.168.1.20");
        assert!(!registry.contains(&addr));
        assert!(matches!(
            registry.writer_mut(&addr),
            Err(Error::UnknownDestination(_))
        ));

        registry.insert(addr.clone(), loopback_writer().await, 0);
        assert_eq!(registry.kind(&addr), Some(DeviceKind::Unknown));
        assert!(registry.writer_mut(&addr).is_ok());

        let previous = registry.classify(&addr, DeviceKind::DockingStation, None);
        assert_eq!(previous, Some(DeviceKind::Unknown));
        assert_eq!(registry.kind(&addr), Some(DeviceKind::DockingStation));
        assert_eq!(registry.plug_devices().count(), 0);

        assert!(registry.remove(&addr).is_some());
        assert!(!registry.contains(&addr));
    }

    #[tokio::test]
    async fn test_one_record_per_address() {
        let mut registry = Registry::default();
        let addr = String::from("192.168.1.21");
        registry.insert(addr.clone(), loopback_writer().await, 0);
        registry.classify(&addr, DeviceKind::PlugDevice, None);

        // A reconnect replaces the record, classification included.
        registry.insert(addr.clone(), loopback_writer().await, 1);
        assert_eq!(registry.kind(&addr), Some(DeviceKind::Unknown));
    }

    #[tokio::test]
    async fn test_connection_identity() {
        let mut registry = Registry::default();
        let addr = String::from("192.168.1.23");
        assert!(!registry.is_current(&addr, 0));

        registry.insert(addr.clone(), loopback_writer().await, 0);
        assert!(registry.is_current(&addr, 0));

        // A reconnect invalidates the old connection's claim on the
        // record without disturbing the new one.
        registry.insert(addr.clone(), loopback_writer().await, 1);
        assert!(!registry.is_current(&addr, 0));
        assert!(registry.is_current(&addr, 1));

        registry.remove(&addr);
        assert!(!registry.is_current(&addr, 1));
    }

    #[tokio::test]
    async fn test_liveness_deadlines() {
        let mut registry = Registry::default();
        let addr = String::from("192.168.1.22");
        registry.insert(addr.clone(), loopback_writer().await, 0);

        // Unclassified devices carry no deadline.
        let now = Instant::now();
        assert!(registry.expired(now + Duration::from_secs(3600)).is_empty());

        registry.classify(&addr, DeviceKind::PlugDevice, Some(now));
        assert_eq!(registry.plug_devices().collect::<Vec<_>>(), vec![addr.as_str()]);
        assert_eq!(registry.expired(now), vec![addr.clone()]);

        // Inbound traffic restarts the window.
        registry.touch(&addr, now + Duration::from_secs(10));
        assert!(registry.expired(now + Duration::from_secs(5)).is_empty());
        assert_eq!(
            registry.expired(now + Duration::from_secs(10)),
            vec![addr.clone()]
        );
    }
}
