//! `%vanish_<param>%` placeholders.

use vanish_core::VanishManager;

pub const IDENTIFIER: &str = "vanish";

pub(crate) fn resolve(manager: &VanishManager, params: &str, player: Option<&str>) -> Option<String> {
    match params {
        "fake_count" => Some(manager.online_players().len().to_string()),
        "vanished_count" => Some(manager.vanished_players().len().to_string()),
        "is_vanished" => Some(player.is_some_and(|p| manager.is_vanished(p)).to_string()),
        "mode" => player.map(|p| manager.player_mode(p).to_string()),
        "group" => player.map(|p| manager.player_group(p).to_string()),
        _ => None,
    }
}
