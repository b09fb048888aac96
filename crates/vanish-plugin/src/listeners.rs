//! Event guards for vanished players.

use std::collections::HashMap;

use vanish_core::config::format_message;
use vanish_core::host::permission;
use vanish_core::VanishManager;
use vanish_plugin_api::{
    EventResult, InteractAction, PluginBlockPos, PluginEvent, PluginPlayer, ServerApi,
};

use crate::bridge::{ApiDirectory, HostBridge};
use crate::{hud, VanishPlugin, HUD_REFRESH_DELAY, HUD_REFRESH_TASK, PLUGIN_NAME};

/// Private-message commands whose first argument is the receiver.
const MESSAGE_COMMANDS: [&str; 3] = ["tell", "msg", "w"];

/// Block positions whose sounds are suppressed until a tick.
#[derive(Debug, Default)]
pub(crate) struct SilentPositions(HashMap<PluginBlockPos, u64>);

impl SilentPositions {
    pub(crate) fn mark(&mut self, position: PluginBlockPos, until_tick: u64) {
        let until = self.0.entry(position).or_insert(until_tick);
        *until = (*until).max(until_tick);
    }

    pub(crate) fn is_silent(&self, position: &PluginBlockPos, now: u64) -> bool {
        self.0.get(position).is_some_and(|&until| now <= until)
    }

    pub(crate) fn purge(&mut self, now: u64) {
        self.0.retain(|_, until| now <= *until);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl VanishPlugin {
    pub(crate) fn handle_event(
        &mut self,
        event: &PluginEvent,
        api: &mut dyn ServerApi,
    ) -> EventResult {
        let Some(manager) = self.manager.as_mut() else {
            return EventResult::Continue;
        };
        match event {
            PluginEvent::PlayerJoin { player } => on_join(manager, player, api),
            PluginEvent::PlayerQuit { player } => on_quit(manager, player, api),
            PluginEvent::PlayerDamage {
                player, attacker, ..
            } => on_damage(manager, player, attacker.as_ref(), api),
            PluginEvent::PlayerCombust { player } => cancel_if(
                manager.is_vanished(&player.name)
                    && manager.effective_flag(&player.name, "disable_damage"),
            ),
            PluginEvent::PlayerExhaust { player, .. } => cancel_if(
                manager.is_vanished(&player.name) && !manager.effective_flag(&player.name, "hunger"),
            ),
            PluginEvent::ItemPickup { player, .. } => cancel_if(manager.is_vanished(&player.name)),
            PluginEvent::BlockBreak {
                player, position, ..
            } => on_block_break(manager, player, *position, api),
            PluginEvent::BlockPlace {
                player,
                position,
                block_id,
            } => on_block_place(manager, player, *position, *block_id, api),
            PluginEvent::PlayerInteract {
                player,
                position,
                action,
                container,
                sneaking,
                break_ticks,
            } => {
                let click = Click {
                    position: *position,
                    action: *action,
                    container: *container,
                    sneaking: *sneaking,
                    break_ticks: *break_ticks,
                };
                on_interact(manager, &mut self.silent_positions, player, click, api)
            }
            PluginEvent::WorldSound { position } => {
                cancel_if(self.silent_positions.is_silent(position, api.get_tick()))
            }
            PluginEvent::PlayerCommand {
                player,
                command,
                args,
            } => on_player_command(manager, player, command, args, api),
            PluginEvent::QueryRegenerate { players, count } => {
                on_query(manager, players, *count, api);
                EventResult::Continue
            }
            PluginEvent::ServerStarted | PluginEvent::ServerStopping => EventResult::Continue,
        }
    }
}

fn cancel_if(cancel: bool) -> EventResult {
    if cancel {
        EventResult::Cancelled
    } else {
        EventResult::Continue
    }
}

// ─── Join / quit ────────────────────────────────────────────────────────────

fn silenced(manager: &VanishManager, api: &dyn ServerApi, name: &str, enabled: bool) -> bool {
    let cfg = &manager.config().silent_join_leave;
    enabled
        && api.has_permission(name, permission::SILENT)
        && (!cfg.vanished_only || manager.is_vanished(name))
}

fn on_join(manager: &mut VanishManager, player: &PluginPlayer, api: &mut dyn ServerApi) -> EventResult {
    manager.handle_join(&mut HostBridge::new(api), &player.name);
    hud::refresh(manager, api);
    let join = manager.config().silent_join_leave.join;
    if silenced(manager, api, &player.name, join) {
        EventResult::Silenced
    } else {
        EventResult::Continue
    }
}

fn on_quit(manager: &mut VanishManager, player: &PluginPlayer, api: &mut dyn ServerApi) -> EventResult {
    let leave = manager.config().silent_join_leave.leave;
    let silent = silenced(manager, api, &player.name, leave);
    let was_visible = manager.state().is_online_visible(&player.name);
    manager.handle_quit(&player.name);
    if was_visible {
        api.schedule_delayed(PLUGIN_NAME, HUD_REFRESH_DELAY, HUD_REFRESH_TASK);
    }
    if silent {
        EventResult::Silenced
    } else {
        EventResult::Continue
    }
}

// ─── Combat ─────────────────────────────────────────────────────────────────

fn on_damage(
    manager: &VanishManager,
    victim: &PluginPlayer,
    attacker: Option<&PluginPlayer>,
    api: &mut dyn ServerApi,
) -> EventResult {
    if let Some(attacker) = attacker {
        if manager.is_vanished(&attacker.name)
            && !api.has_permission(&attacker.name, permission::ATTACK)
        {
            let messages = &manager.config().messages;
            api.send_message(
                &attacker.name,
                &format!("{}{}", messages.prefix, messages.hit_no_permission),
            );
            return EventResult::Cancelled;
        }
    }
    cancel_if(
        manager.is_vanished(&victim.name) && manager.effective_flag(&victim.name, "disable_damage"),
    )
}

// ─── Blocks ─────────────────────────────────────────────────────────────────

fn on_block_break(
    manager: &VanishManager,
    player: &PluginPlayer,
    position: PluginBlockPos,
    api: &mut dyn ServerApi,
) -> EventResult {
    if !manager.is_vanished(&player.name) {
        return EventResult::Continue;
    }
    if !manager.mode_blocks(&player.name, "no_break") {
        api.break_block_silently(&player.name, position);
    }
    EventResult::Cancelled
}

fn on_block_place(
    manager: &VanishManager,
    player: &PluginPlayer,
    position: PluginBlockPos,
    block_id: u32,
    api: &mut dyn ServerApi,
) -> EventResult {
    if !manager.is_vanished(&player.name) {
        return EventResult::Continue;
    }
    if !manager.mode_blocks(&player.name, "no_place") {
        api.place_block_silently(&player.name, position, block_id);
    }
    EventResult::Cancelled
}

struct Click {
    position: PluginBlockPos,
    action: InteractAction,
    container: bool,
    sneaking: bool,
    break_ticks: u64,
}

fn on_interact(
    manager: &VanishManager,
    silent: &mut SilentPositions,
    player: &PluginPlayer,
    click: Click,
    api: &mut dyn ServerApi,
) -> EventResult {
    let name = player.name.as_str();
    if !manager.is_vanished(name) {
        return EventResult::Continue;
    }
    if manager.mode_blocks(name, "no_interact") {
        return EventResult::Cancelled;
    }
    if click.action == InteractAction::LeftClickBlock {
        silent.mark(click.position, api.get_tick() + click.break_ticks);
    }
    if !click.container || !manager.effective_flag(name, "silent_chest") {
        return EventResult::Continue;
    }
    if click.action == InteractAction::RightClickBlock && !click.sneaking {
        api.open_container_readonly(name, click.position);
    }
    EventResult::Cancelled
}

// ─── Messaging ──────────────────────────────────────────────────────────────

fn on_player_command(
    manager: &VanishManager,
    sender: &PluginPlayer,
    command: &str,
    args: &[String],
    api: &mut dyn ServerApi,
) -> EventResult {
    let config = manager.config();
    if config.settings.can_send_msg {
        return EventResult::Continue;
    }
    let command = command.to_lowercase();
    let Some(receiver) = args.first().and_then(|a| api.find_player(a)) else {
        return EventResult::Continue;
    };
    if receiver.name == sender.name || !manager.is_vanished(&receiver.name) {
        return EventResult::Continue;
    }
    if manager.can_see(&ApiDirectory::new(&*api), &sender.name, &receiver.name) {
        return EventResult::Continue;
    }

    let (sender_error, notice) = if MESSAGE_COMMANDS.contains(&command.as_str()) {
        let message = args[1..].join(" ");
        if message.trim().is_empty() {
            return EventResult::Continue;
        }
        let notice = format_message(
            &config.messages.receiver_message,
            &[("%sender", &sender.name), ("%message", &message)],
        );
        (config.messages.sender_error.clone(), notice)
    } else if let Some(extra) = config.additional_commands.get(&command) {
        let notice = format_message(&extra.receiver_message, &[("%sender", &sender.name)]);
        (extra.sender_error.clone(), notice)
    } else {
        return EventResult::Continue;
    };

    api.send_message(&sender.name, &sender_error);
    api.send_message(
        &receiver.name,
        &format!("{}{notice}", config.messages.prefix),
    );
    EventResult::Cancelled
}

fn on_query(manager: &VanishManager, players: &[String], count: u32, api: &mut dyn ServerApi) {
    let visible: Vec<String> = players
        .iter()
        .filter(|p| !manager.is_vanished(p))
        .cloned()
        .collect();
    let hidden = (players.len() - visible.len()) as u32;
    api.set_query_info(visible, count.saturating_sub(hidden));
}
