//! The vanish state machine and the state it owns.
//!
//! [`VanishManager`] is the single owner of the visibility state, player
//! assignments and stats. Every operation takes the host as a parameter and
//! runs to completion synchronously.

mod lifecycle;
mod reconcile;
mod transitions;

#[cfg(test)]
mod tests;

pub use lifecycle::JoinOutcome;
pub use reconcile::SweepReport;

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::assignment::AssignmentTable;
use crate::clock::Clock;
use crate::config::VanishConfig;
use crate::error::{StoreError, VanishError};
use crate::host::{permission, Host, PlayerDirectory, PlayerHandle};
use crate::notify::Notifier;
use crate::persistence::{Blob, PersistenceStore};
use crate::policy::GroupVisibilityPolicy;
use crate::registry::{Registry, VanishGroup, VanishMode};
use crate::state::VisibilityState;
use crate::stats::{LogAction, LogEntry, StatsFile, StatsRecorder};

pub struct VanishManager {
    config: VanishConfig,
    registry: Registry,
    state: VisibilityState,
    assignments: AssignmentTable,
    stats: StatsRecorder,
    store: Box<dyn PersistenceStore>,
    clock: Box<dyn Clock>,
    persistence_errors: Vec<StoreError>,
    /// Blobs that failed to load and could not be moved aside. Saving them
    /// would replace data that is still on disk.
    read_only: BTreeSet<Blob>,
}

impl VanishManager {
    /// Build the manager and load persisted data. Load failures are logged
    /// and queued; the affected data starts empty.
    pub fn new(
        config: VanishConfig,
        store: Box<dyn PersistenceStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let registry = Registry::from_config(&config);
        let assignments = AssignmentTable::new(registry.default_mode(), registry.default_group());
        let stats = StatsRecorder::new(config.stats.max_logs);
        let mut manager = Self {
            config,
            registry,
            state: VisibilityState::new(),
            assignments,
            stats,
            store,
            clock,
            persistence_errors: Vec::new(),
            read_only: BTreeSet::new(),
        };
        manager.load();
        manager
    }

    fn load(&mut self) {
        match self.store.load_settings() {
            Ok(file) => {
                self.assignments = AssignmentTable::from_file(
                    file,
                    self.registry.default_mode(),
                    self.registry.default_group(),
                );
            }
            Err(e) => self.load_failed(Blob::Settings, e),
        }

        let stats_file = match self.store.load_stats() {
            Ok(file) => file,
            Err(e) => {
                self.load_failed(Blob::Stats, e);
                StatsFile::default()
            }
        };
        let logs = match self.store.load_logs() {
            Ok(logs) => logs,
            Err(e) => {
                self.load_failed(Blob::Logs, e);
                Vec::new()
            }
        };
        let (stats, trimmed) = StatsRecorder::from_parts(stats_file, logs, self.config.stats.max_logs);
        self.stats = stats;
        if trimmed {
            self.persist_logs();
        }

        if !self.config.settings.unvanish_after_restart {
            match self.store.load_vanished() {
                Ok(names) => {
                    for name in &names {
                        self.state.add_vanished(name);
                    }
                    if !names.is_empty() {
                        info!("Restored {} vanished players", names.len());
                    }
                }
                Err(e) => self.load_failed(Blob::Vanished, e),
            }
        }
        if self.writable(Blob::Vanished) {
            if let Err(e) = self.store.save_vanished(&[]) {
                self.record_failure("clear vanished players", e);
            }
        }
    }

    /// Keep an unreadable blob from being overwritten: move it aside, or
    /// stop saving it when that fails too.
    fn load_failed(&mut self, blob: Blob, error: StoreError) {
        self.record_failure(&format!("load {}", blob.file_name()), error);
        if let Err(e) = self.store.quarantine(blob) {
            self.record_failure(&format!("move aside {}", blob.file_name()), e);
            warn!("Not saving {} until it loads again", blob.file_name());
            self.read_only.insert(blob);
        }
    }

    fn writable(&self, blob: Blob) -> bool {
        !self.read_only.contains(&blob)
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &VanishConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> &VisibilityState {
        &self.state
    }

    pub fn assignments(&self) -> &AssignmentTable {
        &self.assignments
    }

    pub fn stats(&self) -> &StatsRecorder {
        &self.stats
    }

    pub fn store(&self) -> &dyn PersistenceStore {
        self.store.as_ref()
    }

    /// Current time in seconds according to the manager's clock.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn is_vanished(&self, name: &str) -> bool {
        self.state.is_vanished(name)
    }

    pub fn vanished_players(&self) -> Vec<String> {
        self.state.vanished().map(str::to_string).collect()
    }

    /// Online players that are not vanished.
    pub fn online_players(&self) -> Vec<String> {
        self.state.online_visible().map(str::to_string).collect()
    }

    pub fn player_mode(&self, name: &str) -> &str {
        self.assignments.mode(name)
    }

    pub fn player_group(&self, name: &str) -> &str {
        self.assignments.group(name)
    }

    pub fn has_auto_vanish(&self, name: &str) -> bool {
        self.assignments.auto_vanish(name)
    }

    pub fn notification_setting(&self, name: &str, key: &str, default: bool) -> bool {
        self.assignments.notification(name, key, default)
    }

    // ─── Policy ─────────────────────────────────────────────────────────────

    pub fn can_see<D: PlayerDirectory + ?Sized>(
        &self,
        directory: &D,
        viewer: &str,
        target: &str,
    ) -> bool {
        let policy = GroupVisibilityPolicy::new(&self.registry, &self.assignments);
        let viewer = policy.viewer(viewer, directory.has_permission(viewer, permission::SEE));
        policy.can_see(&viewer, target)
    }

    /// Player count `viewer` should be shown: everyone for `vanish.see`
    /// holders, otherwise the visible players plus any vanished players the
    /// viewer's group may see.
    pub fn visible_count_for<D: PlayerDirectory + ?Sized>(&self, directory: &D, viewer: &str) -> usize {
        let online = directory.online();
        if directory.has_permission(viewer, permission::SEE) {
            return online.len();
        }
        let seen_vanished = online
            .iter()
            .filter(|p| self.state.is_vanished(&p.name) && self.can_see(directory, viewer, &p.name))
            .count();
        self.state.online_visible_count() + seen_vanished
    }

    /// A mode setting wins over the global flag of the same key.
    pub fn effective_flag(&self, name: &str, key: &str) -> bool {
        self.registry
            .mode(self.assignments.mode(name))
            .and_then(|m| m.setting(key))
            .or_else(|| self.config.settings.flag(key))
            .unwrap_or(false)
    }

    /// Flight is granted when either the global switch or the mode asks.
    pub fn flight_requested(&self, name: &str) -> bool {
        self.config.settings.enable_fly
            || self
                .registry
                .mode(self.assignments.mode(name))
                .and_then(|m| m.setting("fly"))
                .unwrap_or(false)
    }

    /// A mode-only restriction such as `no_break`.
    pub fn mode_blocks(&self, name: &str, key: &str) -> bool {
        self.registry
            .mode(self.assignments.mode(name))
            .is_some_and(|m| m.settings.is_enabled(key))
    }

    pub fn available_modes<D: PlayerDirectory + ?Sized>(
        &self,
        directory: &D,
        player: &str,
    ) -> Vec<&VanishMode> {
        self.registry
            .modes()
            .filter(|m| directory.has_permission(player, &m.permission))
            .collect()
    }

    pub fn available_groups<D: PlayerDirectory + ?Sized>(
        &self,
        directory: &D,
        player: &str,
    ) -> Vec<&VanishGroup> {
        self.registry
            .groups()
            .filter(|g| directory.has_permission(player, &g.permission))
            .collect()
    }

    // ─── Assignment ─────────────────────────────────────────────────────────

    pub fn set_player_mode(
        &mut self,
        host: &mut dyn Host,
        player: &str,
        mode: &str,
    ) -> Result<(), VanishError> {
        let required = self
            .registry
            .mode(mode)
            .ok_or_else(|| VanishError::UnknownMode(mode.to_string()))?
            .permission
            .clone();
        self.check_actor(host, player, &required)?;

        let old = self.assignments.mode(player).to_string();
        self.assignments.entry(player).mode = mode.to_string();
        self.persist_settings();

        let entry = LogEntry::new(self.clock.now(), LogAction::ModeChange, player)
            .with_mode(Some(mode))
            .with_extra("old_mode", &old);
        self.log(entry);

        Notifier::new(&self.config.messages, &self.assignments).mode_change(host, player, &old, mode);
        info!("{player} changed vanish mode from {old} to {mode}");

        if self.state.is_vanished(player) {
            self.refresh_presentation(host, player);
        }
        Ok(())
    }

    pub fn set_player_group(
        &mut self,
        host: &mut dyn Host,
        player: &str,
        group: &str,
    ) -> Result<(), VanishError> {
        let required = self
            .registry
            .group(group)
            .ok_or_else(|| VanishError::UnknownGroup(group.to_string()))?
            .permission
            .clone();
        self.check_actor(host, player, &required)?;

        let old = self.assignments.group(player).to_string();
        self.assignments.entry(player).group = group.to_string();
        self.persist_settings();

        let entry = LogEntry::new(self.clock.now(), LogAction::GroupChange, player)
            .with_group(Some(group))
            .with_extra("old_group", &old);
        self.log(entry);

        Notifier::new(&self.config.messages, &self.assignments)
            .group_change(host, player, &old, group);
        info!("{player} changed vanish group from {old} to {group}");

        // Group decides both who sees this player while vanished and which
        // vanished players this player sees.
        if let Some(handle) = host.player(player) {
            let online = host.online();
            let mut report = SweepReport::default();
            if self.state.is_vanished(player) {
                self.reconcile_pairs(host, &online, std::slice::from_ref(&handle), &mut report);
            }
            let targets: Vec<PlayerHandle> = online
                .into_iter()
                .filter(|p| p.name != player && self.state.is_vanished(&p.name))
                .collect();
            self.reconcile_pairs(host, std::slice::from_ref(&handle), &targets, &mut report);
        }
        Ok(())
    }

    fn check_actor(
        &self,
        host: &dyn Host,
        player: &str,
        required: &str,
    ) -> Result<(), VanishError> {
        if !host.is_connected(player) {
            return Err(VanishError::PlayerNotFound(player.to_string()));
        }
        if !host.has_permission(player, required) {
            return Err(VanishError::PermissionDenied {
                player: player.to_string(),
                permission: required.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_auto_vanish(&mut self, player: &str, enabled: bool) {
        self.assignments.entry(player).auto_vanish = enabled;
        self.persist_settings();
    }

    pub fn set_notification_setting(&mut self, player: &str, key: &str, enabled: bool) {
        self.assignments
            .entry(player)
            .notifications
            .insert(key.to_string(), enabled);
        self.persist_settings();
    }

    // ─── Persistence ────────────────────────────────────────────────────────

    /// Drain store failures since the last call.
    pub fn take_persistence_errors(&mut self) -> Vec<StoreError> {
        std::mem::take(&mut self.persistence_errors)
    }

    fn record_failure(&mut self, what: &str, error: StoreError) {
        warn!("Failed to {what}: {error}");
        self.persistence_errors.push(error);
    }

    fn persist_settings(&mut self) {
        if let Err(e) = self.save_settings() {
            self.record_failure("save player settings", e);
        }
    }

    fn persist_stats(&mut self) {
        if let Err(e) = self.save_stats() {
            self.record_failure("save stats", e);
        }
    }

    fn persist_logs(&mut self) {
        if let Err(e) = self.save_logs() {
            self.record_failure("save logs", e);
        }
    }

    fn save_settings(&mut self) -> Result<(), StoreError> {
        if !self.writable(Blob::Settings) {
            return Ok(());
        }
        self.store.save_settings(&self.assignments.to_file())
    }

    fn save_stats(&mut self) -> Result<(), StoreError> {
        if !self.writable(Blob::Stats) {
            return Ok(());
        }
        self.store.save_stats(&self.stats.to_file())
    }

    fn save_logs(&mut self) -> Result<(), StoreError> {
        if !self.writable(Blob::Logs) {
            return Ok(());
        }
        self.store.save_logs(&self.stats.logs().to_vec())
    }

    fn save_vanished(&mut self, names: &[String]) -> Result<(), StoreError> {
        if !self.writable(Blob::Vanished) {
            return Ok(());
        }
        self.store.save_vanished(names)
    }

    fn log(&mut self, entry: LogEntry) {
        self.stats.log_action(entry);
        self.persist_logs();
    }
}
