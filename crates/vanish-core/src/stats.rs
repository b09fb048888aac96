//! Vanish usage counters and the bounded action log.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─── Counters ───────────────────────────────────────────────────────────────

/// Per-player (or global) counters. Every field except `last_vanish` only
/// ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    #[serde(default)]
    pub vanish_count: u64,
    #[serde(default)]
    pub unvanish_count: u64,
    /// Accumulated seconds spent vanished.
    #[serde(default)]
    pub time_vanished: u64,
    /// Unix seconds of the most recent vanish, 0 if never.
    #[serde(default)]
    pub last_vanish: u64,
    #[serde(default)]
    pub modes: BTreeMap<String, u64>,
    #[serde(default)]
    pub groups: BTreeMap<String, u64>,
}

impl StatsRecord {
    fn count_usage(&mut self, mode: Option<&str>, group: Option<&str>) {
        if let Some(mode) = mode {
            *self.modes.entry(mode.to_string()).or_insert(0) += 1;
        }
        if let Some(group) = group {
            *self.groups.entry(group.to_string()).or_insert(0) += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub name: String,
    #[serde(flatten)]
    pub record: StatsRecord,
}

/// On-disk shape of `stats.json`. Players keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsFile {
    #[serde(default)]
    pub total: StatsRecord,
    #[serde(default)]
    pub players: Vec<PlayerStats>,
}

// ─── Log ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    Vanish,
    Unvanish,
    VanishOther,
    UnvanishOther,
    ModeChange,
    GroupChange,
}

impl LogAction {
    pub const ALL: [LogAction; 6] = [
        LogAction::Vanish,
        LogAction::Unvanish,
        LogAction::VanishOther,
        LogAction::UnvanishOther,
        LogAction::ModeChange,
        LogAction::GroupChange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogAction::Vanish => "vanish",
            LogAction::Unvanish => "unvanish",
            LogAction::VanishOther => "vanish_other",
            LogAction::UnvanishOther => "unvanish_other",
            LogAction::ModeChange => "mode_change",
            LogAction::GroupChange => "group_change",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogAction::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: u64,
    pub action: LogAction,
    /// The acting player (or console).
    pub player: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl LogEntry {
    pub fn new(time: u64, action: LogAction, player: &str) -> Self {
        Self {
            time,
            action,
            player: player.to_string(),
            target: None,
            mode: None,
            group: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn with_mode(mut self, mode: Option<&str>) -> Self {
        self.mode = mode.map(str::to_string);
        self
    }

    pub fn with_group(mut self, group: Option<&str>) -> Self {
        self.group = group.map(str::to_string);
        self
    }

    pub fn with_extra(mut self, key: &str, value: &str) -> Self {
        self.extra.insert(key.to_string(), value.to_string());
        self
    }

    pub fn involves(&self, name: &str) -> bool {
        self.player == name || self.target.as_deref() == Some(name)
    }
}

/// FIFO ring buffer of log entries.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl ActionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Build from persisted entries, keeping the newest `capacity`. Returns
    /// whether anything was dropped.
    pub fn from_entries(entries: Vec<LogEntry>, capacity: usize) -> (Self, bool) {
        let mut log = Self::new(capacity);
        let skip = entries.len().saturating_sub(log.capacity);
        log.entries = entries.into_iter().skip(skip).collect();
        (log, skip > 0)
    }

    /// Append, evicting the oldest entry once full.
    pub fn push(&mut self, entry: LogEntry) -> Option<LogEntry> {
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&LogEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    pub fn for_player(&self, name: &str) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.involves(name)).collect()
    }

    pub fn for_action(&self, action: LogAction) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.action == action).collect()
    }
}

// ─── Recorder ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StatsRecorder {
    total: StatsRecord,
    players: Vec<PlayerStats>,
    index: HashMap<String, usize>,
    log: ActionLog,
}

impl StatsRecorder {
    pub fn new(max_logs: usize) -> Self {
        Self {
            total: StatsRecord::default(),
            players: Vec::new(),
            index: HashMap::new(),
            log: ActionLog::new(max_logs),
        }
    }

    /// Restore from persisted data. The second value is `true` when the log
    /// had to be trimmed to `max_logs`.
    pub fn from_parts(file: StatsFile, logs: Vec<LogEntry>, max_logs: usize) -> (Self, bool) {
        let (log, trimmed) = ActionLog::from_entries(logs, max_logs);
        let mut recorder = Self {
            total: file.total,
            players: Vec::with_capacity(file.players.len()),
            index: HashMap::new(),
            log,
        };
        for player in file.players {
            if recorder.index.contains_key(&player.name) {
                continue;
            }
            recorder
                .index
                .insert(player.name.clone(), recorder.players.len());
            recorder.players.push(player);
        }
        (recorder, trimmed)
    }

    fn player_mut(&mut self, name: &str) -> &mut StatsRecord {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.players.len();
                self.players.push(PlayerStats {
                    name: name.to_string(),
                    record: StatsRecord::default(),
                });
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.players[idx].record
    }

    pub fn record_vanish(&mut self, name: &str, mode: Option<&str>, group: Option<&str>, now: u64) {
        self.total.vanish_count += 1;
        self.total.count_usage(mode, group);
        let record = self.player_mut(name);
        record.vanish_count += 1;
        record.last_vanish = now;
        record.count_usage(mode, group);
    }

    /// Count an unvanish. Time is only credited when a vanish timestamp
    /// exists; a clock that moved backwards credits nothing.
    pub fn record_unvanish(&mut self, name: &str, now: u64) {
        self.total.unvanish_count += 1;
        let Some(&idx) = self.index.get(name) else {
            return;
        };
        let record = &mut self.players[idx].record;
        record.unvanish_count += 1;
        if record.last_vanish > 0 {
            let elapsed = now.saturating_sub(record.last_vanish);
            record.time_vanished += elapsed;
            self.total.time_vanished += elapsed;
        }
    }

    pub fn log_action(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }

    pub fn total(&self) -> &StatsRecord {
        &self.total
    }

    pub fn player(&self, name: &str) -> Option<&StatsRecord> {
        self.index.get(name).map(|&idx| &self.players[idx].record)
    }

    pub fn players(&self) -> &[PlayerStats] {
        &self.players
    }

    pub fn mode_stats(&self) -> &BTreeMap<String, u64> {
        &self.total.modes
    }

    pub fn group_stats(&self) -> &BTreeMap<String, u64> {
        &self.total.groups
    }

    pub fn top_vanished_players(&self, limit: usize) -> Vec<&PlayerStats> {
        self.top_by(limit, |r| r.vanish_count)
    }

    pub fn top_vanished_time_players(&self, limit: usize) -> Vec<&PlayerStats> {
        self.top_by(limit, |r| r.time_vanished)
    }

    fn top_by(&self, limit: usize, key: impl Fn(&StatsRecord) -> u64) -> Vec<&PlayerStats> {
        let mut sorted: Vec<&PlayerStats> = self.players.iter().collect();
        // sort_by is stable: ties keep first-seen order.
        sorted.sort_by(|a, b| key(&b.record).cmp(&key(&a.record)));
        sorted.truncate(limit);
        sorted
    }

    pub fn logs(&self) -> &ActionLog {
        &self.log
    }

    pub fn player_logs(&self, name: &str) -> Vec<&LogEntry> {
        self.log.for_player(name)
    }

    pub fn action_logs(&self, action: LogAction) -> Vec<&LogEntry> {
        self.log.for_action(action)
    }

    pub fn recent_logs(&self, n: usize) -> Vec<&LogEntry> {
        self.log.recent(n)
    }

    pub fn to_file(&self) -> StatsFile {
        StatsFile {
            total: self.total.clone(),
            players: self.players.clone(),
        }
    }
}

/// Render seconds as `1d 2h 3m 4s`, omitting leading zero units.
pub fn format_duration(secs: u64) -> String {
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (minutes, seconds) = (rem / 60, rem % 60);

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}d "));
    }
    if hours > 0 || days > 0 {
        out.push_str(&format!("{hours}h "));
    }
    if minutes > 0 || hours > 0 || days > 0 {
        out.push_str(&format!("{minutes}m "));
    }
    out.push_str(&format!("{seconds}s"));
    out
}
