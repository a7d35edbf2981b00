use gtfs::TripID;

use crate::split::RouteDirectionSpec;

/// How a route's trips get their direction label
#[derive(Clone, Debug)]
pub enum DirectionPolicy {
    /// The feed's direction flag can't be trusted; the anchor stops decide, and the label comes
    /// with the chosen direction.
    Split(RouteDirectionSpec),
    /// One literal label per feed direction flag
    StaticLabels([String; 2]),
    Compass([Compass; 2]),
    /// The cleaned feed headsign, under the feed's direction flag
    DefaultClean,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Compass {
    North,
    South,
    East,
    West,
}

impl Compass {
    pub fn label(self) -> &'static str {
        match self {
            Compass::North => "North",
            Compass::South => "South",
            Compass::East => "East",
            Compass::West => "West",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Headsign {
    /// 0 or 1
    pub direction: u8,
    pub label: String,
}

impl Headsign {
    pub fn new<S: Into<String>>(direction: u8, label: S) -> Self {
        Self {
            direction,
            label: label.into(),
        }
    }
}

/// A trip after headsign assignment, as merging sees it
#[derive(Clone, Debug)]
pub struct AssignedTrip {
    pub trip_id: TripID,
    pub headsign: Headsign,
}

/// Any two different labels from `labels` collapse into `merged`.
#[derive(Clone, Debug)]
pub struct MergeRule {
    pub labels: Vec<String>,
    pub merged: String,
}

impl MergeRule {
    pub fn new(labels: &[&str], merged: &str) -> Self {
        Self {
            labels: labels.iter().map(|x| x.to_string()).collect(),
            merged: merged.to_string(),
        }
    }

    pub fn accepts(&self, first: &str, second: &str) -> bool {
        self.labels.iter().any(|x| x == first) && self.labels.iter().any(|x| x == second)
    }
}

/// Used when no rule covers a pair and near enough is good enough: keep the more specific label if
/// one includes the other, otherwise show both.
pub fn default_merge(first: &str, second: &str) -> String {
    if first.contains(second) {
        return first.to_string();
    }
    if second.contains(first) {
        return second.to_string();
    }
    format!("{first} / {second}")
}
