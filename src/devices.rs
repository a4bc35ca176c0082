//! Paired device registry
//!
//! Tracks which wearables are marked as connected. There is no real device
//! link; toggling only flips the stored status.

use crate::error::DashboardError;
use crate::store::{read_json, write_json, KeyValueStore, StorageKey};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Watch,
    Smartphone,
    Monitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub status: ConnectionStatus,
    /// Battery level (0-100)
    pub battery: u8,
    pub last_sync: String,
}

/// Devices paired out of the box
pub fn default_devices() -> Vec<Device> {
    vec![
        Device {
            id: "1".to_string(),
            name: "Flora Watch Pro".to_string(),
            kind: DeviceKind::Watch,
            status: ConnectionStatus::Connected,
            battery: 78,
            last_sync: "2 mins ago".to_string(),
        },
        Device {
            id: "2".to_string(),
            name: "Health Monitor X1".to_string(),
            kind: DeviceKind::Monitor,
            status: ConnectionStatus::Connected,
            battery: 92,
            last_sync: "5 mins ago".to_string(),
        },
        Device {
            id: "3".to_string(),
            name: "Smartphone App".to_string(),
            kind: DeviceKind::Smartphone,
            status: ConnectionStatus::Disconnected,
            battery: 45,
            last_sync: "3 hours ago".to_string(),
        },
    ]
}

/// Device list stored under `devices`
pub struct DeviceRegistry<'s, S: KeyValueStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: KeyValueStore + ?Sized> DeviceRegistry<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<Device> {
        match read_json(&*self.store, StorageKey::Devices) {
            Ok(Some(devices)) => devices,
            Ok(None) => default_devices(),
            Err(e) => {
                warn!(error = %e, "stored devices are malformed, using defaults");
                default_devices()
            }
        }
    }

    /// Flip the connection status of a device. Connecting resets its sync label.
    pub fn toggle(&mut self, id: &str) -> Result<Device, DashboardError> {
        let mut devices = self.list();
        let device = devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| DashboardError::UnknownDevice(id.to_string()))?;

        device.status = match device.status {
            ConnectionStatus::Connected => ConnectionStatus::Disconnected,
            ConnectionStatus::Disconnected => {
                device.last_sync = "Just now".to_string();
                ConnectionStatus::Connected
            }
        };
        let updated = device.clone();

        write_json(&mut *self.store, StorageKey::Devices, &devices)?;
        info!(device = %updated.name, status = ?updated.status, "toggled device");
        Ok(updated)
    }

    pub fn connected(&self) -> Vec<Device> {
        self.list()
            .into_iter()
            .filter(|d| d.status == ConnectionStatus::Connected)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_unset() {
        let mut kv = MemoryStore::new();
        let registry = DeviceRegistry::new(&mut kv);
        assert_eq!(registry.list(), default_devices());
        assert_eq!(registry.connected().len(), 2);
    }

    #[test]
    fn test_toggle_connects_and_disconnects() {
        let mut kv = MemoryStore::new();
        let mut registry = DeviceRegistry::new(&mut kv);

        let phone = registry.toggle("3").unwrap();
        assert_eq!(phone.status, ConnectionStatus::Connected);
        assert_eq!(phone.last_sync, "Just now");

        let watch = registry.toggle("1").unwrap();
        assert_eq!(watch.status, ConnectionStatus::Disconnected);
        assert_eq!(watch.last_sync, "2 mins ago");

        let names: Vec<String> = registry.connected().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Health Monitor X1", "Smartphone App"]);
    }

    #[test]
    fn test_unknown_device() {
        let mut kv = MemoryStore::new();
        let mut registry = DeviceRegistry::new(&mut kv);
        assert!(matches!(
            registry.toggle("42"),
            Err(DashboardError::UnknownDevice(id)) if id == "42"
        ));
    }
}
