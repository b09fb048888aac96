//! Player and staff notifications for vanish transitions.

use crate::assignment::{AssignmentTable, NOTIFY_STAFF};
use crate::config::{format_message, Messages};
use crate::host::{permission, BroadcastSink};

/// Formats and sends the messages a transition produces. Player messages
/// carry the configured prefix; staff messages go to `vanish.see` holders
/// other than the subject.
pub struct Notifier<'a> {
    messages: &'a Messages,
    assignments: &'a AssignmentTable,
}

impl<'a> Notifier<'a> {
    pub fn new(messages: &'a Messages, assignments: &'a AssignmentTable) -> Self {
        Self {
            messages,
            assignments,
        }
    }

    pub fn to_player<S: BroadcastSink + ?Sized>(&self, sink: &mut S, player: &str, message: &str) {
        sink.send_message(player, &format!("{}{message}", self.messages.prefix));
    }

    /// Staff broadcast about `subject`, unless the subject opted out.
    pub fn to_staff<S: BroadcastSink + ?Sized>(&self, sink: &mut S, subject: &str, message: &str) {
        if !self.assignments.notification(subject, NOTIFY_STAFF, true) {
            return;
        }
        sink.broadcast_permission(permission::SEE, message, Some(subject));
    }

    pub fn vanish<S: BroadcastSink + ?Sized>(
        &self,
        sink: &mut S,
        player: &str,
        mode: Option<&str>,
        group: Option<&str>,
    ) {
        self.to_player(sink, player, &self.messages.vanish);
        let staff = format_message(&self.messages.vanish_notify, &[("%name", player)]);
        self.to_staff(sink, player, &decorate(staff, mode, group));
    }

    pub fn unvanish<S: BroadcastSink + ?Sized>(&self, sink: &mut S, player: &str) {
        self.to_player(sink, player, &self.messages.unvanish);
        let staff = format_message(&self.messages.unvanish_notify, &[("%name", player)]);
        self.to_staff(sink, player, &staff);
    }

    pub fn vanish_other<S: BroadcastSink + ?Sized>(
        &self,
        sink: &mut S,
        actor: &str,
        target: &str,
        mode: Option<&str>,
        group: Option<&str>,
    ) {
        let m = format_message(&self.messages.vanish_other, &[("%name", target)]);
        self.to_player(sink, actor, &m);
        let m = format_message(&self.messages.vanished_other, &[("%other-name", actor)]);
        self.to_player(sink, target, &m);
        let staff = format!("§7{actor} vanished {target}");
        self.to_staff(sink, target, &decorate(staff, mode, group));
    }

    pub fn unvanish_other<S: BroadcastSink + ?Sized>(&self, sink: &mut S, actor: &str, target: &str) {
        let m = format_message(&self.messages.unvanish_other, &[("%name", target)]);
        self.to_player(sink, actor, &m);
        let m = format_message(&self.messages.unvanished_other, &[("%other-name", actor)]);
        self.to_player(sink, target, &m);
        self.to_staff(sink, target, &format!("§7{actor} unvanished {target}"));
    }

    pub fn mode_change<S: BroadcastSink + ?Sized>(
        &self,
        sink: &mut S,
        player: &str,
        old: &str,
        new: &str,
    ) {
        let m = format!("§aYour vanish mode has been changed from §e{old}§a to §e{new}");
        self.to_player(sink, player, &m);
        let staff = format!("§7{player} changed vanish mode from §e{old}§7 to §e{new}");
        self.to_staff(sink, player, &staff);
    }

    pub fn group_change<S: BroadcastSink + ?Sized>(
        &self,
        sink: &mut S,
        player: &str,
        old: &str,
        new: &str,
    ) {
        let m = format!("§aYour vanish group has been changed from §e{old}§a to §e{new}");
        self.to_player(sink, player, &m);
        let staff = format!("§7{player} changed vanish group from §e{old}§7 to §e{new}");
        self.to_staff(sink, player, &staff);
    }
}

fn decorate(mut message: String, mode: Option<&str>, group: Option<&str>) -> String {
    if let Some(mode) = mode {
        message.push_str(&format!("§7 (Mode: §b{mode}§7)"));
    }
    if let Some(group) = group {
        message.push_str(&format!("§7 (Group: §e{group}§7)"));
    }
    message
}
