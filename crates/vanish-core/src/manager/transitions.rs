use tracing::info;

use super::{SweepReport, VanishManager};
use crate::config::format_message;
use crate::error::VanishError;
use crate::host::{Host, PlayerHandle, StatusEffect};
use crate::notify::Notifier;
use crate::stats::{LogAction, LogEntry};

impl VanishManager {
    /// Vanish a connected player. `Ok(false)` if already vanished.
    pub fn vanish(&mut self, host: &mut dyn Host, name: &str) -> Result<bool, VanishError> {
        let player = connected(host, name)?;
        if self.state.is_vanished(&player.name) {
            return Ok(false);
        }
        self.enter_vanish(host, &player, None);
        Ok(true)
    }

    /// Unvanish a connected player. `Ok(false)` if not vanished.
    pub fn unvanish(&mut self, host: &mut dyn Host, name: &str) -> Result<bool, VanishError> {
        let player = connected(host, name)?;
        if !self.state.is_vanished(&player.name) {
            return Ok(false);
        }
        self.leave_vanish(host, &player, None);
        Ok(true)
    }

    /// Flip the player's state. Returns whether they are now vanished.
    pub fn toggle(&mut self, host: &mut dyn Host, name: &str) -> Result<bool, VanishError> {
        if self.state.is_vanished(name) {
            self.unvanish(host, name)?;
            Ok(false)
        } else {
            self.vanish(host, name)?;
            Ok(true)
        }
    }

    /// Vanish `target` on behalf of `actor`.
    pub fn vanish_other(
        &mut self,
        host: &mut dyn Host,
        actor: &str,
        target: &str,
    ) -> Result<bool, VanishError> {
        let player = connected(host, target)?;
        if self.state.is_vanished(&player.name) {
            return Ok(false);
        }
        self.enter_vanish(host, &player, Some(actor));
        Ok(true)
    }

    pub fn unvanish_other(
        &mut self,
        host: &mut dyn Host,
        actor: &str,
        target: &str,
    ) -> Result<bool, VanishError> {
        let player = connected(host, target)?;
        if !self.state.is_vanished(&player.name) {
            return Ok(false);
        }
        self.leave_vanish(host, &player, Some(actor));
        Ok(true)
    }

    pub fn toggle_other(
        &mut self,
        host: &mut dyn Host,
        actor: &str,
        target: &str,
    ) -> Result<bool, VanishError> {
        if self.state.is_vanished(target) {
            self.unvanish_other(host, actor, target)?;
            Ok(false)
        } else {
            self.vanish_other(host, actor, target)?;
            Ok(true)
        }
    }

    pub(crate) fn enter_vanish(
        &mut self,
        host: &mut dyn Host,
        player: &PlayerHandle,
        actor: Option<&str>,
    ) {
        let name = player.name.as_str();
        self.state.add_vanished(name);
        host.set_vanish_marker(name, true);
        if self.flight_requested(name) && player.survival {
            host.set_flight(name, true);
            self.state.grant_flight(name);
        }
        if self.config.settings.enable_leave {
            host.broadcast(&format_message(&self.config.messages.fake_leave, &[("%name", name)]));
        }

        let mode = self.assignments.mode(name).to_string();
        let group = self.assignments.group(name).to_string();
        let notifier = Notifier::new(&self.config.messages, &self.assignments);
        match actor {
            None => notifier.vanish(host, name, Some(&mode), Some(&group)),
            Some(actor) => notifier.vanish_other(host, actor, name, Some(&mode), Some(&group)),
        }

        let now = self.clock.now();
        self.stats.record_vanish(name, Some(&mode), Some(&group), now);
        self.persist_stats();
        let entry = match actor {
            None => LogEntry::new(now, LogAction::Vanish, name),
            Some(actor) => LogEntry::new(now, LogAction::VanishOther, actor).with_target(name),
        };
        self.log(entry.with_mode(Some(&mode)).with_group(Some(&group)));

        self.refresh_presentation(host, name);
        let online = host.online();
        let mut report = SweepReport::default();
        self.reconcile_pairs(host, &online, std::slice::from_ref(player), &mut report);

        match actor {
            None => info!("{name} vanished"),
            Some(actor) => info!("{actor} vanished {name}"),
        }
    }

    pub(crate) fn leave_vanish(
        &mut self,
        host: &mut dyn Host,
        player: &PlayerHandle,
        actor: Option<&str>,
    ) {
        let name = player.name.as_str();
        self.state.remove_vanished(name);
        host.set_vanish_marker(name, false);
        host.set_silent(name, false);
        host.set_xp_attraction(name, true);
        for viewer in host.online() {
            if viewer.name == name {
                continue;
            }
            host.show_player(&viewer.name, name);
            host.roster_add(&viewer.name, name);
        }
        self.state.forget_target(name);
        if self.state.take_flight_grant(name) && player.survival {
            host.set_flight(name, false);
        }
        if self.state.take_night_vision(name) {
            host.remove_effect(name, StatusEffect::NightVision);
        }
        if self.config.settings.enable_join {
            host.broadcast(&format_message(&self.config.messages.fake_join, &[("%name", name)]));
        }

        let notifier = Notifier::new(&self.config.messages, &self.assignments);
        match actor {
            None => notifier.unvanish(host, name),
            Some(actor) => notifier.unvanish_other(host, actor, name),
        }

        let now = self.clock.now();
        self.stats.record_unvanish(name, now);
        self.persist_stats();
        let entry = match actor {
            None => LogEntry::new(now, LogAction::Unvanish, name),
            Some(actor) => LogEntry::new(now, LogAction::UnvanishOther, actor).with_target(name),
        };
        self.log(entry);

        match actor {
            None => info!("{name} unvanished"),
            Some(actor) => info!("{actor} unvanished {name}"),
        }
    }

    /// Re-apply the effects the host may reset while a player is vanished.
    pub(crate) fn refresh_presentation(&mut self, host: &mut dyn Host, name: &str) {
        host.send_tip(name, &self.config.messages.hud_message);
        host.set_silent(name, true);
        host.set_xp_attraction(name, false);
        if self.effective_flag(name, "night_vision") {
            host.add_effect(name, StatusEffect::NightVision);
            self.state.grant_night_vision(name);
        } else if self.state.take_night_vision(name) {
            host.remove_effect(name, StatusEffect::NightVision);
        }
    }
}

fn connected(host: &dyn Host, name: &str) -> Result<PlayerHandle, VanishError> {
    host.player(name)
        .ok_or_else(|| VanishError::PlayerNotFound(name.to_string()))
}
