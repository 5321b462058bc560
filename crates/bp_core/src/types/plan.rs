use serde::{Deserialize, Serialize};

use super::road::{RoadOption, Waypoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub waypoint: Waypoint,
    pub option: RoadOption,
}

impl PlanEntry {
    pub fn new(waypoint: Waypoint, option: RoadOption) -> Self {
        Self { waypoint, option }
    }
}

/// Ordered (waypoint, road option) path handed to the path follower.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManeuverPlan {
    entries: Vec<PlanEntry>,
}

impl ManeuverPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, waypoint: Waypoint, option: RoadOption) {
        self.entries.push(PlanEntry::new(waypoint, option));
    }

    pub fn extend_from_slice(&mut self, entries: &[PlanEntry]) {
        self.entries.extend_from_slice(entries);
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<PlanEntry> {
        self.entries
    }

    pub fn last(&self) -> Option<&PlanEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanEntry> {
        self.entries.iter()
    }

    /// Road options in order, handy for checking the maneuver shape.
    pub fn options(&self) -> Vec<RoadOption> {
        self.entries.iter().map(|e| e.option).collect()
    }
}

impl<'a> IntoIterator for &'a ManeuverPlan {
    type Item = &'a PlanEntry;
    type IntoIter = std::slice::Iter<'a, PlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
