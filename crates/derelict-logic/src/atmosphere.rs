//! Air diffusion — one synchronous 3×3 averaging pass per tick.
//!
//! Each cell that currently lets air through takes the mean of itself and its
//! in-bounds neighbors that also let air through, then applies its own
//! sink/source response. Cells that block air keep their previous value and
//! contribute nothing to their neighbors, which makes walls and closed doors
//! hard boundaries.
//!
//! The pass reads only the committed buffer and writes only the scratch
//! buffer, so processing order never affects the result.

use crate::diag::Diagnostics;
use crate::field::ScalarField;
use crate::grid::{Coord, Grid};

/// Mean committed air over the air-carrying members of the 3×3 block at `at`.
///
/// Returns zero when no member carries air or when they are all empty.
pub fn local_average(grid: &Grid, values: &[f64], at: Coord) -> f64 {
    let mut total = 0.0;
    let mut count = 0u32;
    for member in grid.block(at) {
        let Some(i) = grid.index(member) else {
            continue;
        };
        if grid.cells()[i].air_flows() {
            total += values[i];
            count += 1;
        }
    }
    if count == 0 || total == 0.0 {
        0.0
    } else {
        total / f64::from(count)
    }
}

/// Run one diffusion pass over `air` and commit it.
pub fn diffuse(grid: &Grid, air: &mut ScalarField, diag: &dyn Diagnostics) {
    let (current, next) = air.split();
    let mut active = 0usize;

    for (i, cell) in grid.cells().iter().enumerate() {
        if !cell.air_flows() {
            next[i] = current[i];
            continue;
        }
        active += 1;
        let average = local_average(grid, current, grid.coord(i));
        next[i] = cell.air_response(average).max(0.0);
    }

    air.swap();
    diag.event(format_args!(
        "air pass: {} active cells, total {:.3}",
        active,
        air.total()
    ));
}
