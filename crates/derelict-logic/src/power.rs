//! Energy propagation — directed flood from generators through conduits.
//!
//! Unlike air, energy is rebuilt from scratch every tick:
//!
//! 1. Every cell answers its energy response to zero input. Anything that
//!    comes back positive is a source and seeds the work queue.
//! 2. Sources flood outward breadth-first. A neighbor that carries energy and
//!    has not been visited this tick is visited once; if the feeding cell
//!    holds more energy than it, the neighbor takes its response to the
//!    feeding value and, if still positive, feeds onward.
//!
//! The visited set bounds the work by the grid size, so conduit loops
//! terminate. A flood step only ever raises a value.

use std::collections::VecDeque;

use crate::diag::Diagnostics;
use crate::field::ScalarField;
use crate::grid::Grid;

/// Bookkeeping from one propagation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    /// Cells that emitted energy on their own.
    pub sources: usize,
    /// Cells reached by the flood (sources excluded).
    pub visited: usize,
    /// Queue pops; equals `sources` plus the cells that fed onward.
    pub expansions: usize,
}

/// Run one propagation pass over `energy` and commit it.
///
/// Takes the grid mutably so air generators can record the energy delivered
/// to them.
pub fn propagate(
    grid: &mut Grid,
    energy: &mut ScalarField,
    diag: &dyn Diagnostics,
) -> PropagationStats {
    let mut stats = PropagationStats::default();
    let mut visited = vec![false; grid.len()];
    let mut queue = VecDeque::new();

    {
        let (_, next) = energy.split();

        for (i, cell) in grid.cells_mut().iter_mut().enumerate() {
            next[i] = cell.energy_response(0.0).max(0.0);
            cell.absorb_energy(0.0);
            if next[i] > 0.0 {
                visited[i] = true;
                queue.push_back(i);
                stats.sources += 1;
            }
        }

        while let Some(from) = queue.pop_front() {
            stats.expansions += 1;
            let feed = next[from];
            let at = grid.coord(from);
            let targets: Vec<usize> = grid
                .neighbors(at)
                .filter_map(|n| grid.index(n))
                .collect();

            for to in targets {
                if visited[to] || !grid.cells()[to].energy_flows() {
                    continue;
                }
                visited[to] = true;
                stats.visited += 1;

                if feed > next[to] {
                    let cell = &mut grid.cells_mut()[to];
                    let out = cell.energy_response(feed).max(0.0);
                    cell.absorb_energy(feed);
                    if out > next[to] {
                        next[to] = out;
                    }
                    if next[to] > 0.0 {
                        queue.push_back(to);
                    }
                }
            }
        }
    }

    energy.swap();
    diag.event(format_args!(
        "energy pass: {} sources, {} reached, peak {:.3}",
        stats.sources,
        stats.visited,
        energy.max()
    ));
    stats
}
