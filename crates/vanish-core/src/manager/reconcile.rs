use super::VanishManager;
use crate::host::{permission, Host, PlayerHandle};
use crate::policy::GroupVisibilityPolicy;

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Vanished players whose presentation was re-applied.
    pub refreshed: Vec<String>,
    /// (viewer, target) pairs newly shown.
    pub shown: Vec<(String, String)>,
    /// (viewer, target) pairs newly hidden.
    pub hidden: Vec<(String, String)>,
}

impl SweepReport {
    pub fn changed(&self) -> bool {
        !self.shown.is_empty() || !self.hidden.is_empty()
    }
}

impl VanishManager {
    /// Periodic sweep: refresh every vanished player's presentation and
    /// bring each (viewer, vanished target) pair in line with the policy.
    ///
    /// Only vanished targets are visited, so the cost is online × vanished.
    /// Show/hide and roster updates are emitted only for pairs whose state
    /// changed since the last pass.
    pub fn reconcile(&mut self, host: &mut dyn Host) -> SweepReport {
        let mut report = SweepReport::default();
        if self.state.vanished_count() == 0 {
            return report;
        }
        let online = host.online();
        let targets: Vec<PlayerHandle> = online
            .iter()
            .filter(|p| self.state.is_vanished(&p.name))
            .cloned()
            .collect();
        if targets.is_empty() {
            return report;
        }

        for target in targets.iter().filter(|t| t.spawned) {
            self.refresh_presentation(host, &target.name);
            report.refreshed.push(target.name.clone());
        }
        self.reconcile_pairs(host, &online, &targets, &mut report);
        report
    }

    pub(crate) fn reconcile_pairs(
        &mut self,
        host: &mut dyn Host,
        viewers: &[PlayerHandle],
        targets: &[PlayerHandle],
        report: &mut SweepReport,
    ) {
        let policy = GroupVisibilityPolicy::new(&self.registry, &self.assignments);
        for viewer in viewers {
            let bypass = host.has_permission(&viewer.name, permission::SEE);
            let ctx = policy.viewer(&viewer.name, bypass);
            for target in targets {
                if target.name == viewer.name {
                    continue;
                }
                if policy.can_see(&ctx, &target.name) {
                    if self.state.mark_shown(&viewer.name, &target.name) {
                        host.show_player(&viewer.name, &target.name);
                        host.roster_add(&viewer.name, &target.name);
                        report
                            .shown
                            .push((viewer.name.clone(), target.name.clone()));
                    }
                } else if self.state.mark_hidden(&viewer.name, &target.name) {
                    host.hide_player(&viewer.name, &target.name);
                    host.roster_remove(&viewer.name, &target.name);
                    report
                        .hidden
                        .push((viewer.name.clone(), target.name.clone()));
                }
            }
        }
    }
}
