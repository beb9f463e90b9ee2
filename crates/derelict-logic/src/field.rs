//! Double-buffered scalar field.
//!
//! Readers only ever see `current`. A pass writes into `next` and then calls
//! [`ScalarField::swap`], so no cell observes a value written earlier in the
//! same pass.

use crate::grid::{Coord, Grid};

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    width: usize,
    height: usize,
    current: Vec<f64>,
    next: Vec<f64>,
}

impl ScalarField {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            current: vec![0.0; width * height],
            next: vec![0.0; width * height],
        }
    }

    /// A zeroed field shaped like `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.width(), grid.height())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, at: Coord) -> Option<usize> {
        if at.x >= 0 && at.y >= 0 && (at.x as usize) < self.width && (at.y as usize) < self.height
        {
            Some(at.y as usize * self.width + at.x as usize)
        } else {
            None
        }
    }

    /// Committed value at `at`; zero outside the field.
    pub fn get(&self, at: Coord) -> f64 {
        self.index(at).map_or(0.0, |i| self.current[i])
    }

    /// Overwrite a committed value directly. Negative input is clamped to zero.
    pub fn set(&mut self, at: Coord, value: f64) {
        if let Some(i) = self.index(at) {
            self.current[i] = value.max(0.0);
        }
    }

    /// Committed values, row-major.
    pub fn values(&self) -> &[f64] {
        &self.current
    }

    /// Committed buffer for reading and the scratch buffer for writing.
    pub(crate) fn split(&mut self) -> (&[f64], &mut [f64]) {
        (&self.current, &mut self.next)
    }

    /// Publish the scratch buffer as the committed state.
    pub(crate) fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Largest committed value.
    pub fn max(&self) -> f64 {
        self.current.iter().copied().fold(0.0, f64::max)
    }

    pub fn total(&self) -> f64 {
        self.current.iter().sum()
    }

    /// Sensor digit for a value: `0`..=`9`, saturating at nine.
    pub fn digit(value: f64) -> char {
        if value >= 9.0 {
            '9'
        } else {
            // value is non-negative and below 9 here
            char::from(b'0' + value.max(0.0) as u8)
        }
    }
}
