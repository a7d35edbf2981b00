//! Direction splitting for routes whose feed doesn't separate directions cleanly. Each direction
//! is described by a few hand-picked anchor stops, in the order a bus visits them.

use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DirectionKind {
    Clockwise,
    Counterclockwise,
    Outbound,
}

impl DirectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectionKind::Clockwise => "clockwise",
            DirectionKind::Counterclockwise => "counterclockwise",
            DirectionKind::Outbound => "outbound",
        }
    }
}

#[derive(Clone, Debug)]
pub struct DirectionSpec {
    pub label: String,
    /// Stop codes. The first and last are often shared with the other direction on a loop.
    pub anchors: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct RouteDirectionSpec {
    pub kind: DirectionKind,
    /// Indexed by direction
    pub directions: [DirectionSpec; 2],
}

impl RouteDirectionSpec {
    pub fn new(
        kind: DirectionKind,
        (label0, anchors0): (&str, &[&str]),
        (label1, anchors1): (&str, &[&str]),
    ) -> Self {
        let direction = |label: &str, anchors: &[&str]| DirectionSpec {
            label: label.to_string(),
            anchors: anchors.iter().map(|x| x.to_string()).collect(),
        };
        Self {
            kind,
            directions: [direction(label0, anchors0), direction(label1, anchors1)],
        }
    }

    pub fn label(&self, direction: u8) -> &str {
        &self.directions[usize::from(direction)].label
    }

    pub fn anchors(&self, direction: u8) -> &[String] {
        &self.directions[usize::from(direction)].anchors
    }

    /// Picks the direction whose anchors the trip follows most closely, counting the longest run
    /// of anchors visited in order. Ties go to the feed's own direction flag. None if that's still
    /// ambiguous, or if the trip touches no anchors at all.
    pub fn assign_direction(&self, stop_codes: &[&str], feed_direction: Option<u8>) -> Option<u8> {
        let score0 = longest_common_subsequence(self.anchors(0), stop_codes);
        let score1 = longest_common_subsequence(self.anchors(1), stop_codes);
        if score0 == 0 && score1 == 0 {
            return None;
        }
        match score0.cmp(&score1) {
            Ordering::Greater => Some(0),
            Ordering::Less => Some(1),
            Ordering::Equal => feed_direction,
        }
    }

    /// Only anchors have a known order; everything else is up to the trips.
    pub fn compare_early(&self, direction: u8, stop1: &str, stop2: &str) -> Option<Ordering> {
        let anchors = self.anchors(direction);
        let idx1 = anchors.iter().position(|x| x == stop1)?;
        let idx2 = anchors.iter().position(|x| x == stop2)?;
        Some(idx1.cmp(&idx2))
    }
}

fn longest_common_subsequence(anchors: &[String], stops: &[&str]) -> usize {
    // Rolling single row of the usual table
    let mut row = vec![0; stops.len() + 1];
    for anchor in anchors {
        let mut diagonal = 0;
        for (idx, stop) in stops.iter().enumerate() {
            let above = row[idx + 1];
            row[idx + 1] = if anchor == stop {
                diagonal + 1
            } else {
                above.max(row[idx])
            };
            diagonal = above;
        }
    }
    row[stops.len()]
}

/// Builds one stop order for a route direction out of every trip's stop list. Longer trips go
/// first, so short-turns slot into the full pattern. A new stop goes right after the stop the trip
/// visited before it; a stop with no placed predecessor goes by the comparator, before the first
/// stop that must come after it, or after the last one that must come before it.
pub fn merge_stop_sequences<F: Fn(&str, &str) -> Option<Ordering>>(
    mut sequences: Vec<Vec<String>>,
    compare: F,
) -> Vec<String> {
    sequences.sort_by_key(|seq| std::cmp::Reverse(seq.len()));

    let mut result: Vec<String> = Vec::new();
    for seq in sequences {
        let mut previous: Option<usize> = None;
        for stop in seq {
            if let Some(idx) = result.iter().position(|x| *x == stop) {
                previous = Some(idx);
                continue;
            }
            let idx = match previous {
                Some(idx) => idx + 1,
                None => result
                    .iter()
                    .position(|x| compare(&stop, x) == Some(Ordering::Less))
                    .or_else(|| {
                        result
                            .iter()
                            .rposition(|x| compare(&stop, x) == Some(Ordering::Greater))
                            .map(|idx| idx + 1)
                    })
                    .unwrap_or(0),
            };
            result.insert(idx, stop);
            previous = Some(idx);
        }
    }
    result
}
