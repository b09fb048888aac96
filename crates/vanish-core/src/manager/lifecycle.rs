use tracing::{debug, info};

use super::{SweepReport, VanishManager};
use crate::error::VanishError;
use crate::host::{permission, Host, PlayerHandle};
use crate::stats::{LogAction, LogEntry};

/// How a joining player entered the vanish state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Visible,
    /// Was still vanished from before a restart or reconnect.
    Restored,
    AutoVanished,
}

impl VanishManager {
    pub fn handle_join(&mut self, host: &mut dyn Host, name: &str) -> JoinOutcome {
        let player = host.player(name).unwrap_or_else(|| {
            debug!("{name} joined but is not in the player directory yet");
            PlayerHandle::new(name)
        });
        let mut report = SweepReport::default();

        let outcome = if self.state.is_vanished(name) {
            host.set_vanish_marker(name, true);
            if self.flight_requested(name) && player.survival {
                host.set_flight(name, true);
                self.state.grant_flight(name);
            }
            self.refresh_presentation(host, name);
            let online = host.online();
            self.reconcile_pairs(host, &online, std::slice::from_ref(&player), &mut report);
            JoinOutcome::Restored
        } else if self.assignments.auto_vanish(name) && host.has_permission(name, permission::USE)
        {
            self.enter_vanish(host, &player, None);
            JoinOutcome::AutoVanished
        } else {
            self.state.add_online(name);
            JoinOutcome::Visible
        };

        let targets: Vec<PlayerHandle> = host
            .online()
            .into_iter()
            .filter(|p| p.name != name && self.state.is_vanished(&p.name))
            .collect();
        self.reconcile_pairs(host, std::slice::from_ref(&player), &targets, &mut report);
        outcome
    }

    pub fn handle_quit(&mut self, name: &str) {
        if self.state.is_vanished(name) && self.config.settings.unvanish_after_leaving {
            self.state.forget_vanished(name);
            let now = self.clock.now();
            self.stats.record_unvanish(name, now);
            self.persist_stats();
            self.log(LogEntry::new(now, LogAction::Unvanish, name));
            info!("{name} left while vanished and was unvanished");
        }
        self.state.remove_online(name);
        self.state.forget_player(name);
    }

    /// Flush everything to the store. Every blob is attempted; the first
    /// failure is returned and the rest are queued. The vanished set is only
    /// written when vanish survives restarts.
    pub fn shutdown(&mut self) -> Result<(), VanishError> {
        let mut failures = Vec::new();
        if let Err(e) = self.save_settings() {
            failures.push(e);
        }
        if let Err(e) = self.save_stats() {
            failures.push(e);
        }
        if let Err(e) = self.save_logs() {
            failures.push(e);
        }
        if !self.config.settings.unvanish_after_restart {
            let names = self.vanished_players();
            match self.save_vanished(&names) {
                Ok(()) => info!("Saved {} vanished players", names.len()),
                Err(e) => failures.push(e),
            }
        }

        let mut failures = failures.into_iter();
        let Some(first) = failures.next() else {
            return Ok(());
        };
        for e in failures {
            self.record_failure("save on shutdown", e);
        }
        Err(first.into())
    }
}
