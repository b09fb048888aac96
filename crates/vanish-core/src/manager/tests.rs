use super::*;
use crate::assignment::NOTIFY_STAFF;
use crate::clock::ManualClock;
use crate::config::GroupConfig;
use crate::host::StatusEffect;
use crate::persistence::{
    Blob, JsonFileStore, MemoryStore, QUARANTINE_SUFFIX, SETTINGS_FILE, VANISHED_FILE,
};
use crate::testing::{Op, RecordingHost};

const START: u64 = 1_700_000_000;

fn manager_with(config: VanishConfig, store: MemoryStore) -> (VanishManager, ManualClock) {
    let clock = ManualClock::new(START);
    let manager = VanishManager::new(config, Box::new(store), Box::new(clock.clone()));
    (manager, clock)
}

fn manager() -> (VanishManager, ManualClock) {
    manager_with(VanishConfig::default(), MemoryStore::new())
}

/// Config where the default group is only visible to staff groups.
fn strict_config() -> VanishConfig {
    let mut config = VanishConfig::default();
    config.groups.insert(
        "default".into(),
        GroupConfig {
            visible_to: vec!["admin".into(), "mod".into()],
            ..GroupConfig::default()
        },
    );
    config
}

fn join(m: &mut VanishManager, host: &mut RecordingHost, name: &str, perms: &[&str]) {
    host.join(name, perms);
    m.handle_join(host, name);
}

fn disjoint(m: &VanishManager) -> bool {
    m.vanished_players()
        .iter()
        .all(|n| !m.online_players().contains(n))
}

#[test]
fn steve_vanishes_and_returns_ten_seconds_later() {
    let (mut m, clock) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);

    assert!(m.vanish(&mut host, "Steve").unwrap());
    assert!(m.is_vanished("Steve"));
    assert!(!m.online_players().contains(&"Steve".to_string()));
    assert_eq!(m.stats().player("Steve").unwrap().vanish_count, 1);
    assert!(disjoint(&m));

    clock.advance(10);
    assert!(m.unvanish(&mut host, "Steve").unwrap());
    let steve = m.stats().player("Steve").unwrap();
    assert_eq!(steve.time_vanished, 10);
    assert_eq!(steve.unvanish_count, 1);
    assert!(!m.is_vanished("Steve"));
    assert!(m.online_players().contains(&"Steve".to_string()));
    assert!(disjoint(&m));
}

#[test]
fn vanish_twice_is_a_noop() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    assert!(m.vanish(&mut host, "Steve").unwrap());
    let logs = m.stats().logs().len();
    assert!(!m.vanish(&mut host, "Steve").unwrap());
    assert_eq!(m.stats().player("Steve").unwrap().vanish_count, 1);
    assert_eq!(m.stats().logs().len(), logs);
    assert!(m.unvanish(&mut host, "Bob").is_err());
}

#[test]
fn unknown_player_is_not_found() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    assert!(matches!(
        m.vanish(&mut host, "Nobody"),
        Err(VanishError::PlayerNotFound(_))
    ));
    assert!(m.vanished_players().is_empty());
}

#[test]
fn vanish_applies_presentation_in_order() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    host.clear();
    m.vanish(&mut host, "Steve").unwrap();

    let marker = host.ops.iter().position(|o| *o == Op::Marker("Steve".into(), true));
    let flight = host.ops.iter().position(|o| *o == Op::Flight("Steve".into(), true));
    assert!(marker.unwrap() < flight.unwrap());
    assert!(host.has_op(&Op::Silent("Steve".into(), true)));
    assert!(host.has_op(&Op::XpAttraction("Steve".into(), false)));
    assert!(host.has_op(&Op::AddEffect("Steve".into(), StatusEffect::NightVision)));
    assert_eq!(host.inbox("Steve")[0], "§9Vanish §8» §r§aYou are now vanished.");
}

#[test]
fn flight_only_granted_in_survival() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    host.set_creative("Steve");
    m.vanish(&mut host, "Steve").unwrap();
    assert!(!host.has_op(&Op::Flight("Steve".into(), true)));
    m.unvanish(&mut host, "Steve").unwrap();
    assert!(!host.has_op(&Op::Flight("Steve".into(), false)));
}

#[test]
fn unvanish_revokes_granted_flight_and_shows_everyone() {
    let (mut m, _) = manager_with(strict_config(), MemoryStore::new());
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    join(&mut m, &mut host, "Bob", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    assert!(host.has_op(&Op::Hide("Bob".into(), "Steve".into())));
    host.clear();

    m.unvanish(&mut host, "Steve").unwrap();
    assert!(host.has_op(&Op::Marker("Steve".into(), false)));
    assert!(host.has_op(&Op::Silent("Steve".into(), false)));
    assert!(host.has_op(&Op::XpAttraction("Steve".into(), true)));
    assert!(host.has_op(&Op::Show("Bob".into(), "Steve".into())));
    assert!(host.has_op(&Op::RosterAdd("Bob".into(), "Steve".into())));
    assert!(host.has_op(&Op::Flight("Steve".into(), false)));
    assert!(host.has_op(&Op::RemoveEffect("Steve".into(), StatusEffect::NightVision)));
    assert_eq!(m.state().hidden_pair_count(), 0);
}

#[test]
fn fake_messages_follow_settings() {
    let mut config = VanishConfig::default();
    config.settings.enable_leave = true;
    config.settings.enable_join = true;
    let (mut m, _) = manager_with(config, MemoryStore::new());
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    m.unvanish(&mut host, "Steve").unwrap();
    assert_eq!(
        host.broadcasts,
        ["§eSteve left the game", "§eSteve joined the game"]
    );
}

#[test]
fn staff_notified_except_subject() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[permission::SEE]);
    join(&mut m, &mut host, "Root", &[permission::SEE]);
    join(&mut m, &mut host, "Bob", &[]);
    m.vanish(&mut host, "Steve").unwrap();

    let root = host.inbox("Root");
    assert_eq!(root.len(), 1);
    assert!(root[0].starts_with("§7§o[Steve: Vanished]"));
    assert!(root[0].contains("(Mode: §bdefault"));
    assert!(host.inbox("Bob").is_empty());
    assert_eq!(host.inbox("Steve").len(), 1);
}

#[test]
fn staff_notifications_can_be_muted() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    join(&mut m, &mut host, "Root", &[permission::SEE]);
    m.set_notification_setting("Steve", NOTIFY_STAFF, false);
    m.vanish(&mut host, "Steve").unwrap();
    assert!(host.inbox("Root").is_empty());
}

#[test]
fn root_vanishes_steve_and_bob_still_sees_him_by_group() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Root", &[permission::SEE, permission::USE_OTHER]);
    join(&mut m, &mut host, "Steve", &[]);
    join(&mut m, &mut host, "Bob", &[]);

    assert!(m.vanish_other(&mut host, "Root", "Steve").unwrap());
    assert!(m.is_vanished("Steve"));
    assert!(m.can_see(&host, "Bob", "Steve"));
    assert!(m.can_see(&host, "Root", "Steve"));

    let report = m.reconcile(&mut host);
    assert!(!host.has_op(&Op::Hide("Bob".into(), "Steve".into())));
    assert!(report.hidden.is_empty());
    assert_eq!(report.refreshed, ["Steve"]);

    let logs = m.stats().action_logs(LogAction::VanishOther);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].player, "Root");
    assert_eq!(logs[0].target.as_deref(), Some("Steve"));
    assert!(m.stats().action_logs(LogAction::Vanish).is_empty());
    assert_eq!(host.inbox("Steve").last().unwrap(), &"§9Vanish §8» §r§aYou were vanished by Root.");
}

#[test]
fn strict_group_hides_from_ordinary_viewers() {
    let (mut m, _) = manager_with(strict_config(), MemoryStore::new());
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    join(&mut m, &mut host, "Bob", &[]);
    join(&mut m, &mut host, "Root", &[permission::SEE]);
    m.vanish(&mut host, "Steve").unwrap();

    assert!(host.has_op(&Op::Hide("Bob".into(), "Steve".into())));
    assert!(host.has_op(&Op::RosterRemove("Bob".into(), "Steve".into())));
    assert!(!host.has_op(&Op::Hide("Root".into(), "Steve".into())));
    assert!(!host.has_op(&Op::Hide("Steve".into(), "Steve".into())));
    assert!(!m.can_see(&host, "Bob", "Steve"));
}

#[test]
fn sweep_emits_only_deltas() {
    let (mut m, _) = manager_with(strict_config(), MemoryStore::new());
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    join(&mut m, &mut host, "Bob", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    host.clear();

    let report = m.reconcile(&mut host);
    assert!(!report.changed());
    assert!(!host.ops.iter().any(|o| matches!(o, Op::Hide(..))));
    // Presentation is refreshed every sweep regardless.
    assert!(host.has_op(&Op::Tip("Steve".into(), "§aYou are currently vanished".into())));

    // Bob gains the bypass: next sweep shows Steve to him.
    host.permissions
        .get_mut("Bob")
        .unwrap()
        .insert(permission::SEE.into());
    let report = m.reconcile(&mut host);
    assert_eq!(report.shown, [("Bob".to_string(), "Steve".to_string())]);
    assert!(host.has_op(&Op::Show("Bob".into(), "Steve".into())));
}

#[test]
fn sweep_skips_when_nobody_vanished() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    host.clear();
    assert_eq!(m.reconcile(&mut host), SweepReport::default());
    assert!(host.ops.is_empty());
}

#[test]
fn sweep_skips_unspawned_refresh() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    host.players[0].spawned = false;
    host.clear();
    let report = m.reconcile(&mut host);
    assert!(report.refreshed.is_empty());
}

#[test]
fn set_mode_round_trip_and_denial() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &["vanish.mode.staff"]);

    m.set_player_mode(&mut host, "Steve", "staff").unwrap();
    assert_eq!(m.player_mode("Steve"), "staff");
    let entry = m.stats().action_logs(LogAction::ModeChange)[0].clone();
    assert_eq!(entry.mode.as_deref(), Some("staff"));
    assert_eq!(entry.extra["old_mode"], "default");
    assert_eq!(m.store().load_settings().unwrap().modes["Steve"], "staff");

    let err = m.set_player_mode(&mut host, "Steve", "spectator").unwrap_err();
    assert!(matches!(err, VanishError::PermissionDenied { .. }));
    assert_eq!(m.player_mode("Steve"), "staff");

    let err = m.set_player_mode(&mut host, "Steve", "nope").unwrap_err();
    assert!(matches!(err, VanishError::UnknownMode(_)));
    assert_eq!(m.stats().action_logs(LogAction::ModeChange).len(), 1);
}

#[test]
fn set_group_rechecks_visibility_of_vanished_player() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &["vanish.group.admin"]);
    join(&mut m, &mut host, "Bob", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    assert!(!host.has_op(&Op::Hide("Bob".into(), "Steve".into())));

    m.set_player_group(&mut host, "Steve", "admin").unwrap();
    assert_eq!(m.player_group("Steve"), "admin");
    assert!(host.has_op(&Op::Hide("Bob".into(), "Steve".into())));
    assert!(matches!(
        m.set_player_group(&mut host, "Steve", "missing"),
        Err(VanishError::UnknownGroup(_))
    ));
}

#[test]
fn set_group_rechecks_what_the_player_sees() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &["vanish.group.admin"]);
    join(&mut m, &mut host, "Bob", &["vanish.group.admin"]);
    m.set_player_group(&mut host, "Steve", "admin").unwrap();
    m.vanish(&mut host, "Steve").unwrap();
    assert!(m.state().is_hidden("Bob", "Steve"));

    host.clear();
    m.set_player_group(&mut host, "Bob", "admin").unwrap();
    assert!(!m.state().is_hidden("Bob", "Steve"));
    assert!(host.has_op(&Op::Show("Bob".into(), "Steve".into())));
}

#[test]
fn night_vision_from_an_old_mode_is_removed() {
    let mut config = VanishConfig::default();
    config.settings.night_vision = false;
    config
        .modes
        .get_mut("default")
        .unwrap()
        .settings
        .insert("night_vision", false);
    let (mut m, _) = manager_with(config, MemoryStore::new());
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &["vanish.mode.default", "vanish.mode.staff"]);
    m.set_player_mode(&mut host, "Steve", "staff").unwrap();
    m.vanish(&mut host, "Steve").unwrap();
    let granted = Op::AddEffect("Steve".into(), StatusEffect::NightVision);
    assert!(host.has_op(&granted));

    m.set_player_mode(&mut host, "Steve", "default").unwrap();
    m.unvanish(&mut host, "Steve").unwrap();
    let last = host.ops.iter().rev().find(|op| {
        matches!(op, Op::AddEffect(name, StatusEffect::NightVision)
            | Op::RemoveEffect(name, StatusEffect::NightVision) if name == "Steve")
    });
    assert_eq!(last, Some(&Op::RemoveEffect("Steve".into(), StatusEffect::NightVision)));
}

#[test]
fn effective_flag_prefers_mode() {
    let mut config = VanishConfig::default();
    config.settings.hunger = false;
    config
        .modes
        .get_mut("staff")
        .unwrap()
        .settings
        .insert("hunger", true);
    let (mut m, _) = manager_with(config, MemoryStore::new());
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &["vanish.mode.staff"]);
    assert!(!m.effective_flag("Steve", "hunger"));
    m.set_player_mode(&mut host, "Steve", "staff").unwrap();
    assert!(m.effective_flag("Steve", "hunger"));
    assert!(m.effective_flag("Steve", "disable_damage"));
    assert!(!m.effective_flag("Steve", "no_such_flag"));
}

#[test]
fn available_modes_filtered_by_permission() {
    let (m, _) = manager();
    let mut host = RecordingHost::new();
    host.join("Steve", &["vanish.mode.default", "vanish.mode.spectator"]);
    let ids: Vec<&str> = m
        .available_modes(&host, "Steve")
        .iter()
        .map(|mode| mode.id.as_str())
        .collect();
    assert_eq!(ids, ["default", "spectator"]);
    assert!(m.available_groups(&host, "Steve").is_empty());
}

#[test]
fn vanished_set_survives_restart() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    m.shutdown().unwrap();

    let mut store = MemoryStore::new();
    store.vanished = vec!["Steve".into()];
    let (mut m, _) = manager_with(VanishConfig::default(), store);
    assert!(m.is_vanished("Steve"));
    // The file is cleared once loaded.
    assert!(m.store().load_vanished().unwrap().is_empty());

    let mut host = RecordingHost::new();
    host.join("Steve", &[]);
    assert_eq!(m.handle_join(&mut host, "Steve"), JoinOutcome::Restored);
    assert!(host.has_op(&Op::Marker("Steve".into(), true)));
    assert!(!m.online_players().contains(&"Steve".to_string()));
}

#[test]
fn unvanish_after_restart_discards_set() {
    let mut config = VanishConfig::default();
    config.settings.unvanish_after_restart = true;
    let mut store = MemoryStore::new();
    store.vanished = vec!["Steve".into()];
    let (mut m, _) = manager_with(config, store);
    assert!(!m.is_vanished("Steve"));

    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    m.shutdown().unwrap();
    assert!(m.store().load_vanished().unwrap().is_empty());
}

#[test]
fn auto_vanish_on_join_requires_permission() {
    let mut store = MemoryStore::new();
    store.settings.auto_vanish = vec!["Root".into(), "Bob".into()];
    let (mut m, _) = manager_with(VanishConfig::default(), store);
    let mut host = RecordingHost::new();

    host.join("Root", &[permission::USE]);
    assert_eq!(m.handle_join(&mut host, "Root"), JoinOutcome::AutoVanished);
    host.join("Bob", &[]);
    assert_eq!(m.handle_join(&mut host, "Bob"), JoinOutcome::Visible);
    assert!(m.is_vanished("Root"));
    assert!(!m.is_vanished("Bob"));
}

#[test]
fn joining_viewer_is_reconciled_immediately() {
    let (mut m, _) = manager_with(strict_config(), MemoryStore::new());
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    host.clear();

    join(&mut m, &mut host, "Bob", &[]);
    assert!(host.has_op(&Op::Hide("Bob".into(), "Steve".into())));
    join(&mut m, &mut host, "Root", &[permission::SEE]);
    assert!(!host.has_op(&Op::Hide("Root".into(), "Steve".into())));
}

#[test]
fn quit_with_unvanish_after_leaving_records_stats() {
    let mut config = strict_config();
    config.settings.unvanish_after_leaving = true;
    let (mut m, clock) = manager_with(config, MemoryStore::new());
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    join(&mut m, &mut host, "Bob", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    clock.advance(30);

    host.leave("Steve");
    m.handle_quit("Steve");
    assert!(!m.is_vanished("Steve"));
    assert!(!m.online_players().contains(&"Steve".to_string()));
    assert_eq!(m.stats().player("Steve").unwrap().time_vanished, 30);
    assert_eq!(m.state().hidden_pair_count(), 0);
}

#[test]
fn quit_keeps_vanish_by_default() {
    let (mut m, _) = manager();
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    host.leave("Steve");
    m.handle_quit("Steve");
    assert!(m.is_vanished("Steve"));
}

#[test]
fn hud_count_depends_on_viewer() {
    let (mut m, _) = manager_with(strict_config(), MemoryStore::new());
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    join(&mut m, &mut host, "Bob", &[]);
    join(&mut m, &mut host, "Root", &[permission::SEE]);
    m.vanish(&mut host, "Steve").unwrap();
    assert_eq!(m.visible_count_for(&host, "Root"), 3);
    assert_eq!(m.visible_count_for(&host, "Bob"), 2);
}

#[test]
fn persistence_failures_are_queued_not_fatal() {
    let store = MemoryStore {
        fail_writes: true,
        ..MemoryStore::default()
    };
    let (mut m, _) = manager_with(VanishConfig::default(), store);
    // Clearing the vanished list on startup already failed once.
    assert_eq!(m.take_persistence_errors().len(), 1);

    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    assert!(m.vanish(&mut host, "Steve").unwrap());
    assert!(m.is_vanished("Steve"));
    let errors = m.take_persistence_errors();
    assert_eq!(errors.len(), 2);
    assert!(m.take_persistence_errors().is_empty());
    assert!(matches!(m.shutdown(), Err(VanishError::Store(_))));
}

#[test]
fn shutdown_saves_remaining_blobs_after_a_failure() {
    let store = MemoryStore {
        fail_blobs: [Blob::Stats].into(),
        ..MemoryStore::default()
    };
    let (mut m, _) = manager_with(VanishConfig::default(), store);
    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    m.vanish(&mut host, "Steve").unwrap();
    m.set_auto_vanish("Steve", true);
    m.take_persistence_errors();

    assert!(matches!(m.shutdown(), Err(VanishError::Store(_))));
    assert_eq!(m.store().load_vanished().unwrap(), ["Steve"]);
    assert_eq!(m.store().load_settings().unwrap().auto_vanish, ["Steve"]);
    assert_eq!(m.store().load_logs().unwrap().len(), m.stats().logs().len());
    // Only the stats blob failed; it is the error returned.
    assert!(m.take_persistence_errors().is_empty());
}

#[test]
fn unreadable_settings_file_is_kept_aside() {
    let dir = std::env::temp_dir().join(format!("vanish_manager_test_{}", rand::random::<u64>()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(SETTINGS_FILE), r#"{"modes":{"Steve":"staff",}}"#).unwrap();
    std::fs::write(dir.join(VANISHED_FILE), "Root\n").unwrap();

    let mut m = VanishManager::new(
        VanishConfig::default(),
        Box::new(JsonFileStore::new(&dir)),
        Box::new(ManualClock::new(START)),
    );
    assert_eq!(m.take_persistence_errors().len(), 1);
    assert_eq!(m.player_mode("Steve"), "default");
    assert!(m.is_vanished("Root"));

    m.set_auto_vanish("Bob", true);
    assert!(m.take_persistence_errors().is_empty());
    let kept = std::fs::read_to_string(dir.join(format!("{SETTINGS_FILE}{QUARANTINE_SUFFIX}"))).unwrap();
    assert!(kept.contains(r#""Steve":"staff""#));
    assert_eq!(m.store().load_settings().unwrap().auto_vanish, ["Bob"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unreadable_blob_that_cannot_move_is_never_written() {
    let store = MemoryStore {
        vanished: vec!["Root".into()],
        corrupt: [Blob::Settings, Blob::Vanished].into(),
        fail_blobs: [Blob::Settings, Blob::Vanished].into(),
        ..MemoryStore::default()
    };
    let (mut m, _) = manager_with(VanishConfig::default(), store);
    // A load failure and a failed move for each blob, no clear of the list.
    assert_eq!(m.take_persistence_errors().len(), 4);
    assert!(m.vanished_players().is_empty());

    let mut host = RecordingHost::new();
    join(&mut m, &mut host, "Steve", &[]);
    m.set_auto_vanish("Steve", true);
    m.vanish(&mut host, "Steve").unwrap();
    assert!(m.take_persistence_errors().is_empty());
    assert!(m.shutdown().is_ok());
    assert!(m.store().load_settings().is_err());
    assert!(m.store().load_vanished().is_err());
}

#[test]
fn oversized_log_is_trimmed_on_load() {
    let mut config = VanishConfig::default();
    config.stats.max_logs = 2;
    let mut store = MemoryStore::new();
    store.logs = (0..5)
        .map(|i| LogEntry::new(i, LogAction::Vanish, "Steve"))
        .collect();
    let (m, _) = manager_with(config, store);
    assert_eq!(m.stats().logs().len(), 2);
    assert_eq!(m.store().load_logs().unwrap().len(), 2);
}
