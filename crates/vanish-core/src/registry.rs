//! Vanish modes and groups loaded from config.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{GroupConfig, ModeConfig, VanishConfig};
use crate::settings::SettingsBag;

/// `visible_to` entry that matches every viewer group.
pub const WILDCARD: &str = "*";

/// A named bundle of gameplay toggles applied while vanished.
#[derive(Debug, Clone, PartialEq)]
pub struct VanishMode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permission: String,
    pub settings: SettingsBag,
}

impl VanishMode {
    pub fn from_config(id: &str, config: &ModeConfig) -> Self {
        Self {
            id: id.to_string(),
            name: config.name.clone().unwrap_or_else(|| id.to_string()),
            description: config.description.clone(),
            permission: config
                .permission
                .clone()
                .unwrap_or_else(|| format!("vanish.mode.{id}")),
            settings: config.settings.clone(),
        }
    }

    pub fn setting(&self, key: &str) -> Option<bool> {
        self.settings.bool(key)
    }
}

/// A visibility tier: which viewer groups may perceive a vanished member.
#[derive(Debug, Clone, PartialEq)]
pub struct VanishGroup {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permission: String,
    pub visible_to: BTreeSet<String>,
    pub settings: SettingsBag,
}

impl VanishGroup {
    pub fn from_config(id: &str, config: &GroupConfig) -> Self {
        Self {
            id: id.to_string(),
            name: config.name.clone().unwrap_or_else(|| id.to_string()),
            description: config.description.clone(),
            permission: config
                .permission
                .clone()
                .unwrap_or_else(|| format!("vanish.group.{id}")),
            visible_to: config.visible_to.iter().cloned().collect(),
            settings: config.settings.clone(),
        }
    }

    pub fn is_visible_to(&self, viewer_group: &str) -> bool {
        self.visible_to.contains(viewer_group) || self.visible_to.contains(WILDCARD)
    }
}

/// Immutable lookup of every configured mode and group.
#[derive(Debug, Clone)]
pub struct Registry {
    modes: BTreeMap<String, VanishMode>,
    groups: BTreeMap<String, VanishGroup>,
    default_mode: String,
    default_group: String,
}

impl Registry {
    pub fn from_config(config: &VanishConfig) -> Self {
        let modes = config
            .modes
            .iter()
            .map(|(id, m)| (id.clone(), VanishMode::from_config(id, m)))
            .collect();
        let groups = config
            .groups
            .iter()
            .map(|(id, g)| (id.clone(), VanishGroup::from_config(id, g)))
            .collect();
        Self {
            modes,
            groups,
            default_mode: config.default_mode.clone(),
            default_group: config.default_group.clone(),
        }
    }

    pub fn mode(&self, id: &str) -> Option<&VanishMode> {
        self.modes.get(id)
    }

    pub fn group(&self, id: &str) -> Option<&VanishGroup> {
        self.groups.get(id)
    }

    pub fn modes(&self) -> impl Iterator<Item = &VanishMode> {
        self.modes.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &VanishGroup> {
        self.groups.values()
    }

    pub fn default_mode(&self) -> &str {
        &self.default_mode
    }

    pub fn default_group(&self) -> &str {
        &self.default_group
    }
}
