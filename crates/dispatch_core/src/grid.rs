//! Grid geometry: Manhattan distance and bounded single-step movement on an
//! integer grid.

use serde::{Deserialize, Serialize};

/// Integer coordinate on the simulation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
}

impl GridPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i64, i64)> for GridPoint {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Accepted coordinate domain: `0..=width` by `0..=height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: i64,
    pub height: i64,
}

impl GridBounds {
    pub const fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        (0..=self.width).contains(&point.x) && (0..=self.height).contains(&point.y)
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::new(1000, 1000)
    }
}

/// Manhattan distance between two grid points.
pub fn distance(a: GridPoint, b: GridPoint) -> u64 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// Move from `from` toward `to`, spending at most `budget` grid units.
///
/// The x axis is consumed first, the remaining budget goes to the y axis.
/// Neither axis ever passes the target coordinate.
pub fn step_toward(from: GridPoint, to: GridPoint, budget: u64) -> GridPoint {
    if from == to || budget == 0 {
        return from;
    }

    let x_step = from.x.abs_diff(to.x).min(budget);
    let y_step = from.y.abs_diff(to.y).min(budget - x_step);

    GridPoint {
        x: approach(from.x, to.x, x_step),
        y: approach(from.y, to.y, y_step),
    }
}

fn approach(current: i64, target: i64, step: u64) -> i64 {
    // step never exceeds |target - current|, so the cast cannot wrap.
    let step = step as i64;
    if current < target {
        current + step
    } else {
        current - step
    }
}
