//! User preferences
//!
//! Boolean switches in four groups (notification, privacy, device, ai),
//! persisted under `settings`. Keys use the stored camelCase names, e.g.
//! `notification.weeklyReport`.

use crate::error::DashboardError;
use crate::store::{read_json, write_json, KeyValueStore, StorageKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsGroup {
    Notification,
    Privacy,
    Device,
    Ai,
}

impl SettingsGroup {
    pub const ALL: [SettingsGroup; 4] = [
        SettingsGroup::Notification,
        SettingsGroup::Privacy,
        SettingsGroup::Device,
        SettingsGroup::Ai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsGroup::Notification => "notification",
            SettingsGroup::Privacy => "privacy",
            SettingsGroup::Device => "device",
            SettingsGroup::Ai => "ai",
        }
    }
}

impl FromStr for SettingsGroup {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DashboardError::UnknownSetting {
                group: s.to_string(),
                key: String::new(),
            })
    }
}

impl fmt::Display for SettingsGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub health_alerts: bool,
    pub weekly_report: bool,
    pub goal_achievements: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            health_alerts: true,
            weekly_report: true,
            goal_achievements: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettings {
    pub share_data_with_partners: bool,
    pub anonymous_analytics: bool,
    pub allow_location_tracking: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            share_data_with_partners: false,
            anonymous_analytics: true,
            allow_location_tracking: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceSettings {
    pub auto_sync: bool,
    pub background_sync: bool,
    pub low_power_mode: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            auto_sync: true,
            background_sync: true,
            low_power_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub enable_ai_assistant: bool,
    pub personalized_recommendations: bool,
    pub voice_interactions: bool,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enable_ai_assistant: true,
            personalized_recommendations: true,
            voice_interactions: false,
        }
    }
}

/// All preference groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub notification: NotificationSettings,
    pub privacy: PrivacySettings,
    pub device: DeviceSettings,
    pub ai: AiSettings,
}

impl Settings {
    /// Switches of one group with their stored names
    pub fn flags(&self, group: SettingsGroup) -> Vec<(&'static str, bool)> {
        match group {
            SettingsGroup::Notification => {
                let n = &self.notification;
                vec![
                    ("emailNotifications", n.email_notifications),
                    ("pushNotifications", n.push_notifications),
                    ("healthAlerts", n.health_alerts),
                    ("weeklyReport", n.weekly_report),
                    ("goalAchievements", n.goal_achievements),
                ]
            }
            SettingsGroup::Privacy => {
                let p = &self.privacy;
                vec![
                    ("shareDataWithPartners", p.share_data_with_partners),
                    ("anonymousAnalytics", p.anonymous_analytics),
                    ("allowLocationTracking", p.allow_location_tracking),
                ]
            }
            SettingsGroup::Device => {
                let d = &self.device;
                vec![
                    ("autoSync", d.auto_sync),
                    ("backgroundSync", d.background_sync),
                    ("lowPowerMode", d.low_power_mode),
                ]
            }
            SettingsGroup::Ai => {
                let a = &self.ai;
                vec![
                    ("enableAiAssistant", a.enable_ai_assistant),
                    ("personalizedRecommendations", a.personalized_recommendations),
                    ("voiceInteractions", a.voice_interactions),
                ]
            }
        }
    }

    pub fn get(&self, group: SettingsGroup, key: &str) -> Option<bool> {
        self.flags(group)
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    /// Flip one switch and return its new value
    pub fn toggle(&mut self, group: SettingsGroup, key: &str) -> Result<bool, DashboardError> {
        let flag = self
            .flag_mut(group, key)
            .ok_or_else(|| DashboardError::UnknownSetting {
                group: group.as_str().to_string(),
                key: key.to_string(),
            })?;
        *flag = !*flag;
        Ok(*flag)
    }

    fn flag_mut(&mut self, group: SettingsGroup, key: &str) -> Option<&mut bool> {
        match group {
            SettingsGroup::Notification => {
                let n = &mut self.notification;
                match key {
                    "emailNotifications" => Some(&mut n.email_notifications),
                    "pushNotifications" => Some(&mut n.push_notifications),
                    "healthAlerts" => Some(&mut n.health_alerts),
                    "weeklyReport" => Some(&mut n.weekly_report),
                    "goalAchievements" => Some(&mut n.goal_achievements),
                    _ => None,
                }
            }
            SettingsGroup::Privacy => {
                let p = &mut self.privacy;
                match key {
                    "shareDataWithPartners" => Some(&mut p.share_data_with_partners),
                    "anonymousAnalytics" => Some(&mut p.anonymous_analytics),
                    "allowLocationTracking" => Some(&mut p.allow_location_tracking),
                    _ => None,
                }
            }
            SettingsGroup::Device => {
                let d = &mut self.device;
                match key {
                    "autoSync" => Some(&mut d.auto_sync),
                    "backgroundSync" => Some(&mut d.background_sync),
                    "lowPowerMode" => Some(&mut d.low_power_mode),
                    _ => None,
                }
            }
            SettingsGroup::Ai => {
                let a = &mut self.ai;
                match key {
                    "enableAiAssistant" => Some(&mut a.enable_ai_assistant),
                    "personalizedRecommendations" => Some(&mut a.personalized_recommendations),
                    "voiceInteractions" => Some(&mut a.voice_interactions),
                    _ => None,
                }
            }
        }
    }
}

/// Preferences stored under `settings`
pub struct SettingsStore<'s, S: KeyValueStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: KeyValueStore + ?Sized> SettingsStore<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Settings {
        match read_json(&*self.store, StorageKey::Settings) {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "stored settings are malformed, using defaults");
                Settings::default()
            }
        }
    }

    /// Flip one switch, persist, and return its new value
    pub fn toggle(&mut self, group: SettingsGroup, key: &str) -> Result<bool, DashboardError> {
        let mut settings = self.load();
        let value = settings.toggle(group, key)?;

        write_json(&mut *self.store, StorageKey::Settings, &settings)?;
        info!(group = %group, key, value, "toggled setting");
        Ok(value)
    }

    /// Restore every switch to its default
    pub fn reset(&mut self) -> Result<(), DashboardError> {
        self.store.remove(StorageKey::Settings)
    }
}
