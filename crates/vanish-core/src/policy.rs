//! Group visibility policy.

use crate::assignment::AssignmentTable;
use crate::registry::Registry;

/// A viewer resolved once per sweep: bypass holders see everything, others
/// go through group visibility.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub name: &'a str,
    pub bypass: bool,
    pub group: &'a str,
}

/// Decides whether a viewer perceives a vanished target.
///
/// A target is shown when the viewer is the target, holds the bypass
/// capability, or belongs to a group the target's group is visible to. An
/// unknown target group hides the target.
#[derive(Debug, Clone, Copy)]
pub struct GroupVisibilityPolicy<'a> {
    registry: &'a Registry,
    assignments: &'a AssignmentTable,
}

impl<'a> GroupVisibilityPolicy<'a> {
    pub fn new(registry: &'a Registry, assignments: &'a AssignmentTable) -> Self {
        Self {
            registry,
            assignments,
        }
    }

    pub fn viewer<'n>(&self, name: &'n str, bypass: bool) -> Viewer<'n>
    where
        'a: 'n,
    {
        Viewer {
            name,
            bypass,
            group: self.assignments.group(name),
        }
    }

    /// Group-only check, ignoring bypass.
    pub fn group_allows(&self, viewer_group: &str, target: &str) -> bool {
        match self.registry.group(self.assignments.group(target)) {
            Some(group) => group.is_visible_to(viewer_group),
            None => false,
        }
    }

    pub fn can_see(&self, viewer: &Viewer<'_>, target: &str) -> bool {
        viewer.name == target || viewer.bypass || self.group_allows(viewer.group, target)
    }
}
