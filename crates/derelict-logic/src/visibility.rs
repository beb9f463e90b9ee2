//! Line of sight, fog of war and sensor overlays.
//!
//! Rays are stepped along the dominant axis one cell at a time with the
//! minor axis advanced by the slope and floored. Only cells strictly between
//! viewer and target can block; the target itself is revealed even when it
//! is opaque, which is how walls become visible at all.

use std::ops::RangeInclusive;

use crate::field::ScalarField;
use crate::grid::{Coord, Grid};

/// Whether nothing opaque lies strictly between `from` and `to`.
///
/// A zero-length ray is always clear.
pub fn cast_ray(grid: &Grid, from: Coord, to: Coord) -> bool {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        return true;
    }

    // floor(d * i / steps) in integers, so long rays never drift
    (1..steps).all(|i| {
        let at = from.offset((dx * i).div_euclid(steps), (dy * i).div_euclid(steps));
        grid.get(at).map_or(true, |cell| !cell.opaque())
    })
}

/// Coordinate ranges of the square of `radius` around `center`, cut to a
/// `width` × `height` grid.
fn window(
    center: Coord,
    radius: i32,
    width: usize,
    height: usize,
) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
    let span = |c: i32, len: usize| {
        let last = i64::try_from(len).unwrap_or(i64::MAX) - 1;
        let lo = (i64::from(c) - i64::from(radius)).max(0);
        let hi = (i64::from(c) + i64::from(radius)).min(last);
        // empty when the center sits more than `radius` off the grid
        let lo = i32::try_from(lo).unwrap_or(i32::MAX);
        let hi = i32::try_from(hi).unwrap_or(i32::MAX);
        lo..=hi
    };
    (span(center.x, width), span(center.y, height))
}

/// Fog-of-war cache: what the player currently sees and what they remember.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenMap {
    width: usize,
    height: usize,
    visible: Vec<bool>,
    remembered: Vec<Option<char>>,
}

impl SeenMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            visible: vec![false; width * height],
            remembered: vec![None; width * height],
        }
    }

    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.width(), grid.height())
    }

    fn index(&self, at: Coord) -> Option<usize> {
        if at.x >= 0 && at.y >= 0 && (at.x as usize) < self.width && (at.y as usize) < self.height
        {
            Some(at.y as usize * self.width + at.x as usize)
        } else {
            None
        }
    }

    /// Recompute the live visible set from `viewer` and fold it into memory.
    /// Returns how many cells are visible.
    pub fn reveal(&mut self, grid: &Grid, viewer: Coord, radius: i32) -> usize {
        self.visible.iter_mut().for_each(|v| *v = false);
        let radius = radius.max(0);
        let radius_sq = i64::from(radius) * i64::from(radius);
        let (xs, ys) = window(viewer, radius, self.width, self.height);
        let mut count = 0;

        for y in ys {
            for x in xs.clone() {
                let at = Coord::new(x, y);
                if viewer.distance_sq(at) > radius_sq {
                    continue;
                }
                let (Some(i), Some(cell)) = (self.index(at), grid.get(at)) else {
                    continue;
                };
                if cast_ray(grid, viewer, at) {
                    self.visible[i] = true;
                    self.remembered[i] = Some(cell.glyph());
                    count += 1;
                }
            }
        }
        count
    }

    /// In the live set from the last [`SeenMap::reveal`].
    pub fn is_visible(&self, at: Coord) -> bool {
        self.index(at).is_some_and(|i| self.visible[i])
    }

    /// Revealed at least once.
    pub fn is_seen(&self, at: Coord) -> bool {
        self.remembered_glyph(at).is_some()
    }

    /// Glyph as it looked when last seen.
    pub fn remembered_glyph(&self, at: Coord) -> Option<char> {
        self.index(at).and_then(|i| self.remembered[i])
    }

    pub fn seen_count(&self) -> usize {
        self.remembered.iter().filter(|g| g.is_some()).count()
    }
}

/// One digit of a sensor overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub at: Coord,
    pub value: f64,
    pub digit: char,
}

/// Field readings within `radius` of `center`. Sensors see through walls.
pub fn sensor_overlay(field: &ScalarField, center: Coord, radius: i32) -> Vec<SensorReading> {
    let radius = radius.max(0);
    let radius_sq = i64::from(radius) * i64::from(radius);
    let (xs, ys) = window(center, radius, field.width(), field.height());

    ys.flat_map(|y| xs.clone().map(move |x| Coord::new(x, y)))
        .filter(|at| center.distance_sq(*at) <= radius_sq)
        .map(|at| {
            let value = field.get(at);
            SensorReading {
                at,
                value,
                digit: ScalarField::digit(value),
            }
        })
        .collect()
}
