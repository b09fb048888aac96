//! Text commands of the vanish plugin.

use vanish_core::assignment::NOTIFY_STAFF;
use vanish_core::permission;
use vanish_core::stats::{format_duration, LogAction, LogEntry};
use vanish_core::{VanishError, VanishManager};
use vanish_plugin_api::{ServerApi, CONSOLE_SENDER};

use crate::bridge::{ApiDirectory, HostBridge};

/// `(name, description)` of every command the plugin registers.
pub const COMMANDS: [(&str, &str); 7] = [
    ("vanish", "Toggle vanish for yourself or another player"),
    ("vanishlist", "List vanished players"),
    ("vanishstats", "Show vanish statistics"),
    ("vanishmode", "List or select your vanish mode"),
    ("vanishgroup", "List or select your vanish group"),
    ("vanishlogs", "Show recent vanish activity"),
    ("vanishsettings", "Change your vanish preferences"),
];

const DEFAULT_LOG_COUNT: usize = 10;
const TOP_LIMIT: usize = 5;

/// Run `command` for `sender`. `None` means nothing to reply; the manager
/// has already messaged the players involved.
pub(crate) fn execute(
    manager: &mut VanishManager,
    command: &str,
    args: &[String],
    sender: &str,
    api: &mut dyn ServerApi,
) -> Option<String> {
    match command {
        "vanish" => vanish(manager, args, sender, api),
        "vanishlist" => vanish_list(manager, sender, api),
        "vanishstats" => vanish_stats(manager, args, sender, api),
        "vanishmode" => vanish_mode(manager, args.first(), sender, api),
        "vanishgroup" => vanish_group(manager, args.first(), sender, api),
        "vanishlogs" => vanish_logs(manager, args, sender, api),
        "vanishsettings" => vanish_settings(manager, args, sender, api),
        _ => None,
    }
}

fn allowed(api: &dyn ServerApi, sender: &str, node: &str) -> bool {
    sender == CONSOLE_SENDER || api.has_permission(sender, node)
}

fn prefixed(manager: &VanishManager, message: &str) -> Option<String> {
    Some(format!("{}{message}", manager.config().messages.prefix))
}

fn error_reply(manager: &VanishManager, error: &VanishError) -> Option<String> {
    let messages = &manager.config().messages;
    let text = match error {
        VanishError::PlayerNotFound(_) => messages.player_not_found.clone(),
        VanishError::PermissionDenied { .. } => messages.no_permission.clone(),
        VanishError::UnknownMode(id) => format!("§cUnknown mode: {id}"),
        VanishError::UnknownGroup(id) => format!("§cUnknown group: {id}"),
        VanishError::Store(e) => format!("§c{e}"),
    };
    prefixed(manager, &text)
}

// ─── /vanish ────────────────────────────────────────────────────────────────

fn vanish(
    manager: &mut VanishManager,
    args: &[String],
    sender: &str,
    api: &mut dyn ServerApi,
) -> Option<String> {
    let Some(target) = args.first() else {
        if sender == CONSOLE_SENDER {
            return prefixed(manager, &manager.config().messages.in_game_only);
        }
        if !allowed(api, sender, permission::USE) {
            return prefixed(manager, &manager.config().messages.no_permission);
        }
        return match manager.toggle(&mut HostBridge::new(api), sender) {
            Ok(_) => None,
            Err(e) => error_reply(manager, &e),
        };
    };

    if !allowed(api, sender, permission::USE_OTHER) {
        return prefixed(manager, &manager.config().messages.no_permission_other);
    }
    let Some(player) = api.find_player(target) else {
        return prefixed(manager, &manager.config().messages.player_not_found);
    };
    let result = if player.name == sender {
        manager.toggle(&mut HostBridge::new(api), sender)
    } else {
        manager.toggle_other(&mut HostBridge::new(api), sender, &player.name)
    };
    match result {
        Ok(_) => None,
        Err(e) => error_reply(manager, &e),
    }
}

// ─── /vanishlist ────────────────────────────────────────────────────────────

fn vanish_list(manager: &VanishManager, sender: &str, api: &dyn ServerApi) -> Option<String> {
    if !allowed(api, sender, permission::LIST) {
        return prefixed(manager, &manager.config().messages.no_permission);
    }
    let mut names = manager.vanished_players();
    if names.is_empty() {
        return prefixed(manager, "§7No players are vanished.");
    }
    names.sort();
    prefixed(
        manager,
        &format!("§aVanished players ({}): §f{}", names.len(), names.join(", ")),
    )
}

// ─── /vanishstats ───────────────────────────────────────────────────────────

fn vanish_stats(
    manager: &VanishManager,
    args: &[String],
    sender: &str,
    api: &dyn ServerApi,
) -> Option<String> {
    if !allowed(api, sender, permission::STATS) {
        return prefixed(manager, &manager.config().messages.no_permission);
    }
    let stats = manager.stats();

    if let Some(arg) = args.first() {
        let name = api.find_player(arg).map_or_else(|| arg.clone(), |p| p.name);
        let Some(record) = stats.player(&name) else {
            return prefixed(manager, &format!("§cNo vanish stats for {name}"));
        };
        let mut lines = vec![
            format!("§6Vanish stats for {name}"),
            format!("§7Vanished: §f{} times", record.vanish_count),
            format!("§7Unvanished: §f{} times", record.unvanish_count),
            format!("§7Time vanished: §f{}", format_duration(record.time_vanished)),
        ];
        if let Some((mode, count)) = record.modes.iter().max_by_key(|(_, c)| **c) {
            lines.push(format!("§7Favourite mode: §f{mode} ({count})"));
        }
        return Some(lines.join("\n"));
    }

    let total = stats.total();
    let mut lines = vec![
        "§6Vanish stats".to_string(),
        format!(
            "§7Vanishes: §f{} §7Unvanishes: §f{} §7Time: §f{}",
            total.vanish_count,
            total.unvanish_count,
            format_duration(total.time_vanished)
        ),
    ];
    let top = stats.top_vanished_players(TOP_LIMIT);
    if !top.is_empty() {
        lines.push("§6Most vanishes:".to_string());
        for (rank, p) in top.iter().enumerate() {
            lines.push(format!("§7{}. §f{} §7- {}", rank + 1, p.name, p.record.vanish_count));
        }
    }
    let top_time = stats.top_vanished_time_players(TOP_LIMIT);
    if !top_time.is_empty() {
        lines.push("§6Longest vanished:".to_string());
        for (rank, p) in top_time.iter().enumerate() {
            lines.push(format!(
                "§7{}. §f{} §7- {}",
                rank + 1,
                p.name,
                format_duration(p.record.time_vanished)
            ));
        }
    }
    let modes: Vec<String> = stats
        .mode_stats()
        .iter()
        .map(|(mode, count)| format!("{mode}={count}"))
        .collect();
    if !modes.is_empty() {
        lines.push(format!("§7Modes: §f{}", modes.join(", ")));
    }
    Some(lines.join("\n"))
}

// ─── /vanishmode, /vanishgroup ──────────────────────────────────────────────

fn vanish_mode(
    manager: &mut VanishManager,
    choice: Option<&String>,
    sender: &str,
    api: &mut dyn ServerApi,
) -> Option<String> {
    if sender == CONSOLE_SENDER {
        return prefixed(manager, &manager.config().messages.in_game_only);
    }
    let Some(choice) = choice else {
        let current = manager.player_mode(sender);
        let directory = ApiDirectory::new(&*api);
        let lines: Vec<String> = manager
            .available_modes(&directory, sender)
            .into_iter()
            .map(|m| choice_line(m.id == current, &m.id, &m.name, &m.description))
            .collect();
        return listing(manager, "§6Vanish modes:", lines);
    };
    match manager.set_player_mode(&mut HostBridge::new(api), sender, &choice.to_lowercase()) {
        Ok(()) => None,
        Err(e) => error_reply(manager, &e),
    }
}

fn vanish_group(
    manager: &mut VanishManager,
    choice: Option<&String>,
    sender: &str,
    api: &mut dyn ServerApi,
) -> Option<String> {
    if sender == CONSOLE_SENDER {
        return prefixed(manager, &manager.config().messages.in_game_only);
    }
    let Some(choice) = choice else {
        let current = manager.player_group(sender);
        let directory = ApiDirectory::new(&*api);
        let lines: Vec<String> = manager
            .available_groups(&directory, sender)
            .into_iter()
            .map(|g| choice_line(g.id == current, &g.id, &g.name, &g.description))
            .collect();
        return listing(manager, "§6Vanish groups:", lines);
    };
    match manager.set_player_group(&mut HostBridge::new(api), sender, &choice.to_lowercase()) {
        Ok(()) => None,
        Err(e) => error_reply(manager, &e),
    }
}

fn choice_line(current: bool, id: &str, name: &str, description: &str) -> String {
    let marker = if current { "§a> " } else { "§7  " };
    if description.is_empty() {
        format!("{marker}{id} §7({name})")
    } else {
        format!("{marker}{id} §7({name}) - {description}")
    }
}

fn listing(manager: &VanishManager, header: &str, lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        return prefixed(manager, &manager.config().messages.no_permission);
    }
    let mut out = vec![header.to_string()];
    out.extend(lines);
    Some(out.join("\n"))
}

// ─── /vanishlogs ────────────────────────────────────────────────────────────

enum LogFilter {
    All,
    Player(String),
    Action(LogAction),
}

fn parse_log_args(args: &[String]) -> (LogFilter, usize) {
    let mut filter = LogFilter::All;
    let mut count = DEFAULT_LOG_COUNT;
    for arg in args.iter().take(2) {
        if let Ok(n) = arg.parse::<usize>() {
            count = n.max(1);
        } else if let Ok(action) = arg.parse::<LogAction>() {
            filter = LogFilter::Action(action);
        } else {
            filter = LogFilter::Player(arg.clone());
        }
    }
    (filter, count)
}

fn vanish_logs(
    manager: &VanishManager,
    args: &[String],
    sender: &str,
    api: &dyn ServerApi,
) -> Option<String> {
    if !allowed(api, sender, permission::LOGS) {
        return prefixed(manager, &manager.config().messages.no_permission);
    }
    let (filter, count) = parse_log_args(args);
    let stats = manager.stats();
    let entries = match &filter {
        LogFilter::All => stats.recent_logs(count),
        LogFilter::Player(name) => stats.player_logs(name),
        LogFilter::Action(action) => stats.action_logs(*action),
    };
    if entries.is_empty() {
        return prefixed(manager, "§7No vanish logs found.");
    }

    let now = manager.now();
    let mut lines = vec![format!("§6Vanish logs ({}):", entries.len().min(count))];
    lines.extend(
        entries
            .iter()
            .rev()
            .take(count)
            .map(|e| log_line(e, now)),
    );
    Some(lines.join("\n"))
}

fn log_line(entry: &LogEntry, now: u64) -> String {
    let mut line = format!(
        "§7{} ago §f{} §e{}",
        format_duration(now.saturating_sub(entry.time)),
        entry.player,
        entry.action
    );
    if let Some(target) = &entry.target {
        line.push_str(&format!(" §f{target}"));
    }
    if let Some(mode) = &entry.mode {
        line.push_str(&format!(" §7mode=§b{mode}"));
    }
    if let Some(group) = &entry.group {
        line.push_str(&format!(" §7group=§b{group}"));
    }
    line
}

// ─── /vanishsettings ────────────────────────────────────────────────────────

fn vanish_settings(
    manager: &mut VanishManager,
    args: &[String],
    sender: &str,
    api: &dyn ServerApi,
) -> Option<String> {
    if sender == CONSOLE_SENDER {
        return prefixed(manager, &manager.config().messages.in_game_only);
    }
    if !allowed(api, sender, permission::USE) {
        return prefixed(manager, &manager.config().messages.no_permission);
    }
    let usage = "§cUsage: /vanishsettings <autovanish|notify> <on|off>";
    let (Some(key), Some(value)) = (args.first(), args.get(1)) else {
        return prefixed(manager, usage);
    };
    let enabled = match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => true,
        "off" | "false" | "no" => false,
        _ => return prefixed(manager, usage),
    };
    let state = if enabled { "§aenabled" } else { "§cdisabled" };
    match key.to_lowercase().as_str() {
        "autovanish" => {
            manager.set_auto_vanish(sender, enabled);
            prefixed(manager, &format!("§7Auto-vanish {state}"))
        }
        "notify" => {
            manager.set_notification_setting(sender, NOTIFY_STAFF, enabled);
            prefixed(manager, &format!("§7Staff notifications {state}"))
        }
        _ => prefixed(manager, usage),
    }
}
