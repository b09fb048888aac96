//! The development server: simulated world, plugins, and console commands.

use tracing::{debug, info, warn};
use vanish_plugin_api::{
    DamageCause, EventResult, GameMode, InteractAction, PluginBlockPos, PluginEvent, CONSOLE_SENDER,
};

use crate::permissions::PermissionStore;
use crate::plugin_manager::{PendingAction, PluginManager, ServerSnapshot};
use crate::world::{SimPlayer, SimWorld};

/// Whether the console loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutcome {
    Continue,
    Stop,
}

const HELP: &[&str] = &[
    "join <name> [gamemode]      connect a simulated player",
    "quit <name>                 disconnect a player",
    "as <name> <command...>      run a command as a player",
    "gm <name> <gamemode>        change a player's gamemode",
    "perm <name> [grant|revoke <node>]",
    "op <name> / deop <name>",
    "view <name>                 what a player's client shows",
    "players                     list connected players",
    "damage <victim> [attacker]  deal 1 damage",
    "break|place|open <name> <x> <y> <z>",
    "query                       rebuild the query response",
    "placeholder <id_params> [player]",
    "tick [n]                    advance n ticks",
    "say <message>               broadcast a message",
    "stop                        shut down",
];

pub struct DevServer {
    world: SimWorld,
    plugins: PluginManager,
    permissions: PermissionStore,
    max_players: usize,
}

impl DevServer {
    pub fn new(plugins: PluginManager, permissions: PermissionStore, max_players: usize) -> Self {
        Self {
            world: SimWorld::new(),
            plugins,
            permissions,
            max_players,
        }
    }

    #[cfg(test)]
    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    fn snapshot(&self) -> ServerSnapshot {
        self.world.snapshot(&self.permissions)
    }

    fn apply(&mut self, actions: Vec<PendingAction>) {
        self.world.apply_all(actions, &self.permissions);
    }

    fn dispatch(&mut self, event: PluginEvent) -> EventResult {
        let snapshot = self.snapshot();
        let (result, actions) = self.plugins.dispatch(&event, &snapshot);
        self.apply(actions);
        result
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    pub fn start(&mut self) {
        let snapshot = self.snapshot();
        let actions = self.plugins.enable_all(&snapshot);
        self.apply(actions);
        self.dispatch(PluginEvent::ServerStarted);
        info!(
            "{} plugins enabled, {} plugin commands",
            self.plugins.plugin_count(),
            self.plugins.plugin_commands.len()
        );
    }

    pub fn tick(&mut self) {
        self.world.tick += 1;
        let snapshot = self.snapshot();
        let actions = self.plugins.tick_scheduler(&snapshot);
        self.apply(actions);
    }

    pub fn stop(&mut self) {
        self.dispatch(PluginEvent::ServerStopping);
        self.plugins.disable_all();
        info!("Plugins disabled");
    }

    pub fn join(&mut self, name: &str, gamemode: GameMode) -> Result<EventResult, String> {
        if self.world.players().len() >= self.max_players {
            return Err("Server is full".into());
        }
        let player = SimPlayer::new(name, gamemode);
        let plugin_player = player.to_plugin();
        if !self.world.add_player(player) {
            return Err(format!("{name} is already online"));
        }
        let result = self.dispatch(PluginEvent::PlayerJoin {
            player: plugin_player,
        });
        if result != EventResult::Silenced {
            self.world.broadcast(&format!("§e{name} joined the game"));
        }
        info!("{name} joined ({result:?})");
        Ok(result)
    }

    pub fn quit(&mut self, name: &str) -> Result<EventResult, String> {
        let player = self
            .world
            .player(name)
            .map(SimPlayer::to_plugin)
            .ok_or_else(|| format!("{name} is not online"))?;
        let result = self.dispatch(PluginEvent::PlayerQuit { player });
        self.world.remove_player(name);
        if result != EventResult::Silenced {
            self.world.broadcast(&format!("§e{name} left the game"));
        }
        info!("{name} left ({result:?})");
        Ok(result)
    }

    /// Run `line` as `sender`. Player commands pass through the
    /// `PlayerCommand` event first so plugins can cancel them.
    pub fn run_command(&mut self, sender: &str, line: &str) -> Vec<String> {
        let mut parts = line.trim().trim_start_matches('/').split_whitespace();
        let Some(command) = parts.next().map(str::to_lowercase) else {
            return Vec::new();
        };
        let args: Vec<String> = parts.map(String::from).collect();

        if sender != CONSOLE_SENDER {
            let Some(player) = self.world.player(sender).map(SimPlayer::to_plugin) else {
                return vec![format!("{sender} is not online")];
            };
            let event = PluginEvent::PlayerCommand {
                player,
                command: command.clone(),
                args: args.clone(),
            };
            if self.dispatch(event) == EventResult::Cancelled {
                debug!("/{command} from {sender} cancelled by a plugin");
                return Vec::new();
            }
        }

        let snapshot = self.snapshot();
        if let Some((response, actions)) =
            self.plugins
                .handle_command(&command, &args, sender, &snapshot)
        {
            self.apply(actions);
            if let Some(response) = response {
                self.world.deliver(sender, &response);
            }
            return Vec::new();
        }

        match command.as_str() {
            "tell" | "msg" | "w" => self.whisper(sender, &args),
            _ => vec![format!(
                "Unknown command: {command}. Type help for a list of commands."
            )],
        }
    }

    fn whisper(&mut self, sender: &str, args: &[String]) -> Vec<String> {
        let Some(target) = args.first() else {
            return vec!["Usage: tell <player> <message>".into()];
        };
        let snapshot = self.snapshot();
        let needle = target.to_lowercase();
        let receiver = snapshot
            .players
            .iter()
            .filter(|p| p.name.to_lowercase().starts_with(&needle))
            .min_by_key(|p| (p.name.to_lowercase() != needle, p.name.len()))
            .map(|p| p.name.clone());
        let Some(receiver) = receiver else {
            self.world.deliver(sender, "§cPlayer not found");
            return Vec::new();
        };
        let message = args[1..].join(" ");
        self.world
            .deliver(&receiver, &format!("§7[{sender} -> you] {message}"));
        self.world
            .deliver(sender, &format!("§7[you -> {receiver}] {message}"));
        Vec::new()
    }

    pub fn regenerate_query(&mut self) -> (Vec<String>, u32) {
        let players = self.world.online_names();
        let count = players.len() as u32;
        self.world.query = (players.clone(), count);
        self.dispatch(PluginEvent::QueryRegenerate { players, count });
        self.world.query.clone()
    }

    pub fn placeholder(&mut self, token: &str, player: Option<&str>) -> Option<String> {
        let (identifier, params) = token.split_once('_')?;
        let snapshot = self.snapshot();
        self.plugins
            .resolve_placeholder(identifier, params, player, &snapshot)
    }

    /// Drain lines plugins addressed to the console.
    pub fn take_console(&mut self) -> Vec<String> {
        std::mem::take(&mut self.world.console)
    }

    // ─── Console ────────────────────────────────────────────────────────────

    /// Execute one console line.
    pub fn handle_line(&mut self, line: &str) -> (ConsoleOutcome, Vec<String>) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, rest)) = parts.split_first() else {
            return (ConsoleOutcome::Continue, Vec::new());
        };
        let mut out = match head.to_lowercase().as_str() {
            "help" => HELP.iter().map(|s| s.to_string()).collect(),
            "stop" => {
                self.stop();
                return (ConsoleOutcome::Stop, vec!["Stopping server...".into()]);
            }
            "join" => match rest {
                [name, ..] => {
                    let gamemode = rest
                        .get(1)
                        .and_then(|g| GameMode::parse(g))
                        .unwrap_or_default();
                    match self.join(name, gamemode) {
                        Ok(result) => vec![format!("{name} joined ({result:?})")],
                        Err(e) => vec![e],
                    }
                }
                [] => vec!["Usage: join <name> [gamemode]".into()],
            },
            "quit" => match rest.first() {
                Some(name) => match self.resolve(name).and_then(|n| self.quit(&n)) {
                    Ok(result) => vec![format!("{name} left ({result:?})")],
                    Err(e) => vec![e],
                },
                None => vec!["Usage: quit <name>".into()],
            },
            "as" => match rest {
                [name, command @ ..] if !command.is_empty() => match self.resolve(name) {
                    Ok(name) => self.run_command(&name, &command.join(" ")),
                    Err(e) => vec![e],
                },
                _ => vec!["Usage: as <name> <command...>".into()],
            },
            "gm" => self.set_gamemode(rest),
            "perm" => self.perm(rest),
            "op" | "deop" => match rest.first() {
                Some(name) => {
                    let op = head.eq_ignore_ascii_case("op");
                    self.permissions.set_op(name, op);
                    vec![format!("{name} op: {op}")]
                }
                None => vec![format!("Usage: {head} <name>")],
            },
            "view" => match rest.first() {
                Some(name) => self.view(name),
                None => vec!["Usage: view <name>".into()],
            },
            "players" => self.list_players(),
            "damage" => self.damage(rest),
            "break" | "place" | "open" => self.block_action(head, rest),
            "query" => {
                let (players, count) = self.regenerate_query();
                vec![format!("Query: {count} players [{}]", players.join(", "))]
            }
            "placeholder" => match rest.first() {
                Some(token) => {
                    let player = match rest.get(1) {
                        Some(name) => self.resolve(name).ok(),
                        None => None,
                    };
                    let value = self.placeholder(token, player.as_deref());
                    vec![format!("%{token}% = {}", value.unwrap_or_else(|| "<none>".into()))]
                }
                None => vec!["Usage: placeholder <identifier_params> [player]".into()],
            },
            "tick" => {
                let n = rest.first().and_then(|n| n.parse().ok()).unwrap_or(1u64);
                for _ in 0..n {
                    self.tick();
                }
                vec![format!("Advanced {n} ticks (now {})", self.world.tick)]
            }
            "say" => {
                let message = rest.join(" ");
                self.world.broadcast(&format!("[Server] {message}"));
                Vec::new()
            }
            _ => self.run_command(CONSOLE_SENDER, line),
        };
        out.extend(self.take_console());
        (ConsoleOutcome::Continue, out)
    }

    fn resolve(&self, name: &str) -> Result<String, String> {
        self.world
            .find(name)
            .map(|p| p.name.clone())
            .ok_or_else(|| format!("{name} is not online"))
    }

    fn set_gamemode(&mut self, rest: &[&str]) -> Vec<String> {
        let [name, mode] = rest else {
            return vec!["Usage: gm <name> <gamemode>".into()];
        };
        let Some(gamemode) = GameMode::parse(mode) else {
            return vec![format!("Unknown gamemode: {mode}")];
        };
        let name = match self.resolve(name) {
            Ok(name) => name,
            Err(e) => return vec![e],
        };
        if let Some(p) = self.world.player_mut(&name) {
            p.gamemode = gamemode;
            p.can_fly = gamemode != GameMode::Survival;
        }
        vec![format!("{name} is now {gamemode:?}")]
    }

    fn perm(&mut self, rest: &[&str]) -> Vec<String> {
        match rest {
            [name] => {
                let nodes: Vec<String> = self.permissions.nodes_for(name).into_iter().collect();
                vec![format!("{name}: [{}]", nodes.join(", "))]
            }
            [name, action, node] => match action.to_lowercase().as_str() {
                "grant" | "add" => {
                    self.permissions.grant(name, node);
                    vec![format!("Granted {node} to {name}")]
                }
                "revoke" | "remove" => {
                    if self.permissions.revoke(name, node) {
                        vec![format!("Revoked {node} from {name}")]
                    } else {
                        vec![format!("{name} does not have {node}")]
                    }
                }
                _ => vec!["Usage: perm <name> [grant|revoke <node>]".into()],
            },
            _ => vec!["Usage: perm <name> [grant|revoke <node>]".into()],
        }
    }

    fn view(&self, name: &str) -> Vec<String> {
        let Some(viewer) = self.world.find(name) else {
            return vec![format!("{name} is not online")];
        };
        let (visible, hidden): (Vec<&SimPlayer>, Vec<&SimPlayer>) = self
            .world
            .players()
            .iter()
            .filter(|p| p.name != viewer.name)
            .partition(|p| viewer.sees(&p.name));
        let names = |list: &[&SimPlayer]| {
            list.iter()
                .map(|p| p.name_tag.clone())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let roster: Vec<&str> = self
            .world
            .players()
            .iter()
            .filter(|p| !viewer.off_roster.contains(&p.name))
            .map(|p| p.name.as_str())
            .collect();
        let mut out = vec![
            format!("{} sees: [{}]", viewer.name, names(&visible[..])),
            format!("hidden: [{}]", names(&hidden[..])),
            format!("player list: [{}]", roster.join(", ")),
        ];
        for (tag, value) in &viewer.score_tags {
            out.push(format!("score {tag} = {value}"));
        }
        if let Some(tip) = &viewer.tip {
            out.push(format!("tip: {tip}"));
        }
        out.extend(viewer.inbox.iter().rev().take(5).rev().map(|m| format!("> {m}")));
        out
    }

    fn list_players(&self) -> Vec<String> {
        let mut out = vec![format!(
            "{}/{} players online",
            self.world.players().len(),
            self.max_players
        )];
        for p in self.world.players() {
            out.push(format!(
                "{} ({:?}) tag={} silent={} fly={} effects={:?}",
                p.name, p.gamemode, p.name_tag, p.silent, p.can_fly, p.effects
            ));
        }
        out
    }

    fn damage(&mut self, rest: &[&str]) -> Vec<String> {
        let Some(victim) = rest.first() else {
            return vec!["Usage: damage <victim> [attacker]".into()];
        };
        let Some(player) = self.world.find(victim).map(SimPlayer::to_plugin) else {
            return vec![format!("{victim} is not online")];
        };
        let attacker = match rest.get(1) {
            Some(name) => match self.world.find(name) {
                Some(p) => Some(p.to_plugin()),
                None => return vec![format!("{name} is not online")],
            },
            None => None,
        };
        let cause = if attacker.is_some() {
            DamageCause::Attack
        } else {
            DamageCause::Other
        };
        let name = player.name.clone();
        let result = self.dispatch(PluginEvent::PlayerDamage {
            player,
            damage: 1.0,
            cause,
            attacker,
        });
        vec![format!("Damage to {name}: {result:?}")]
    }

    fn block_action(&mut self, action: &str, rest: &[&str]) -> Vec<String> {
        let usage = || vec![format!("Usage: {action} <name> <x> <y> <z>")];
        let [name, x, y, z] = rest else {
            return usage();
        };
        let (Ok(x), Ok(y), Ok(z)) = (x.parse::<i32>(), y.parse::<i32>(), z.parse::<i32>()) else {
            return usage();
        };
        let position = PluginBlockPos::new(x, y, z);
        let Some(player) = self.world.find(name).map(SimPlayer::to_plugin) else {
            return vec![format!("{name} is not online")];
        };
        let event = match action {
            "break" => PluginEvent::BlockBreak {
                player,
                position,
                block_id: self.world.blocks.get(&position).copied().unwrap_or(1),
            },
            "place" => PluginEvent::BlockPlace {
                player,
                position,
                block_id: 1,
            },
            _ => PluginEvent::PlayerInteract {
                player,
                position,
                action: InteractAction::RightClickBlock,
                container: true,
                sneaking: false,
                break_ticks: 0,
            },
        };
        let result = self.dispatch(event);
        if result == EventResult::Continue {
            match action {
                "break" => {
                    self.world.blocks.remove(&position);
                }
                "place" => {
                    self.world.blocks.insert(position, 1);
                }
                _ => warn!("{name} opened a container with animation"),
            }
        }
        vec![format!("{action} at {x} {y} {z}: {result:?}")]
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
