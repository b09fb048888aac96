//! Per-player mode/group assignment and preferences.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Notification preference controlling staff broadcasts about a player.
pub const NOTIFY_STAFF: &str = "notify_staff";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAssignment {
    pub mode: String,
    pub group: String,
    pub auto_vanish: bool,
    pub notifications: BTreeMap<String, bool>,
}

/// On-disk shape of `player_settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub modes: BTreeMap<String, String>,
    #[serde(default)]
    pub groups: BTreeMap<String, String>,
    #[serde(default)]
    pub auto_vanish: Vec<String>,
    #[serde(default)]
    pub notifications: BTreeMap<String, BTreeMap<String, bool>>,
}

/// Assignment records keyed by player name. Records are created with the
/// registry defaults the first time they are mutated; reads of unknown
/// players return the defaults without creating anything.
#[derive(Debug, Clone)]
pub struct AssignmentTable {
    default_mode: String,
    default_group: String,
    players: HashMap<String, PlayerAssignment>,
}

impl AssignmentTable {
    pub fn new(default_mode: &str, default_group: &str) -> Self {
        Self {
            default_mode: default_mode.to_string(),
            default_group: default_group.to_string(),
            players: HashMap::new(),
        }
    }

    pub fn from_file(file: SettingsFile, default_mode: &str, default_group: &str) -> Self {
        let mut table = Self::new(default_mode, default_group);
        for (name, mode) in file.modes {
            table.entry(&name).mode = mode;
        }
        for (name, group) in file.groups {
            table.entry(&name).group = group;
        }
        for name in file.auto_vanish {
            table.entry(&name).auto_vanish = true;
        }
        for (name, prefs) in file.notifications {
            table.entry(&name).notifications = prefs;
        }
        table
    }

    pub fn to_file(&self) -> SettingsFile {
        let mut file = SettingsFile::default();
        let auto: BTreeSet<&String> = self
            .players
            .iter()
            .filter(|(_, a)| a.auto_vanish)
            .map(|(n, _)| n)
            .collect();
        for (name, a) in &self.players {
            file.modes.insert(name.clone(), a.mode.clone());
            file.groups.insert(name.clone(), a.group.clone());
            if !a.notifications.is_empty() {
                file.notifications.insert(name.clone(), a.notifications.clone());
            }
        }
        file.auto_vanish = auto.into_iter().cloned().collect();
        file
    }

    pub fn get(&self, name: &str) -> Option<&PlayerAssignment> {
        self.players.get(name)
    }

    /// Record for `name`, created with defaults if missing.
    pub fn entry(&mut self, name: &str) -> &mut PlayerAssignment {
        let (mode, group) = (&self.default_mode, &self.default_group);
        self.players
            .entry(name.to_string())
            .or_insert_with(|| PlayerAssignment {
                mode: mode.clone(),
                group: group.clone(),
                auto_vanish: false,
                notifications: BTreeMap::new(),
            })
    }

    pub fn mode(&self, name: &str) -> &str {
        self.players
            .get(name)
            .map_or(self.default_mode.as_str(), |a| a.mode.as_str())
    }

    pub fn group(&self, name: &str) -> &str {
        self.players
            .get(name)
            .map_or(self.default_group.as_str(), |a| a.group.as_str())
    }

    pub fn auto_vanish(&self, name: &str) -> bool {
        self.players.get(name).is_some_and(|a| a.auto_vanish)
    }

    pub fn notification(&self, name: &str, key: &str, default: bool) -> bool {
        self.players
            .get(name)
            .and_then(|a| a.notifications.get(key).copied())
            .unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
