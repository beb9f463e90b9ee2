//! Cell taxonomy — the closed set of structural variants a grid is built from.
//!
//! Every variant answers every capability query (traversable, opaque, air and
//! energy participation, the two field responses) through one exhaustive
//! `match` per capability, so adding a variant is a compile error until each
//! behavior is decided for it.
//!
//! | Variant | Walk | Opaque | Air | Energy |
//! |---------|------|--------|-----|--------|
//! | Empty space | yes | no | drains to 0 | inert |
//! | Floor | yes | no | passes | — |
//! | Wall | no | yes | only if damaged | — |
//! | Door | if open | if closed | if open or damaged | — |
//! | Conduit | yes | no | passes | conducts unless damaged |
//! | Wall conduit | no | yes | only if damaged | conducts unless damaged |
//! | Power generator | no | yes | — | emits 9 unless damaged |
//! | Air generator | no | yes | emits 9 when powered | draws power |
//! | Ship entrance | yes | no | forces 9 | forces 0 |

use serde::{Deserialize, Serialize};

use crate::constants::{air, energy};
use crate::economy::{self, ActionContext, Costs};

/// One grid-addressable structural unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Cell {
    #[default]
    EmptySpace,
    Floor,
    Wall { damaged: bool },
    Door { open: bool, damaged: bool },
    Conduit { damaged: bool },
    WallConduit { damaged: bool },
    PowerGenerator { damaged: bool },
    AirGenerator { damaged: bool, stored_energy: f64 },
    ShipEntrance,
}

/// Variant tag without per-cell state. Used for build menus and cost lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    EmptySpace,
    Floor,
    Wall,
    Door,
    Conduit,
    WallConduit,
    PowerGenerator,
    AirGenerator,
    ShipEntrance,
}

/// Result of running an operator action against a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellOutcome {
    /// Turns consumed. Zero means the simulation does not advance.
    pub turns: u32,
    /// Cell to install at the target, if the action replaces it.
    pub replacement: Option<Cell>,
}

impl CellOutcome {
    pub fn turns(turns: u32) -> Self {
        Self {
            turns,
            replacement: None,
        }
    }

    pub fn replace(turns: u32, cell: Cell) -> Self {
        Self {
            turns,
            replacement: Some(cell),
        }
    }

    pub fn nothing() -> Self {
        Self::turns(0)
    }
}

impl CellKind {
    /// Variants offered by the build menu, in menu order.
    pub const BUILDABLE: [CellKind; 5] = [
        CellKind::Floor,
        CellKind::Wall,
        CellKind::Door,
        CellKind::Conduit,
        CellKind::WallConduit,
    ];

    pub const ALL: [CellKind; 9] = [
        CellKind::EmptySpace,
        CellKind::Floor,
        CellKind::Wall,
        CellKind::Door,
        CellKind::Conduit,
        CellKind::WallConduit,
        CellKind::PowerGenerator,
        CellKind::AirGenerator,
        CellKind::ShipEntrance,
    ];

    /// Short name used in messages and menus.
    pub fn name(self) -> &'static str {
        match self {
            CellKind::EmptySpace => "vacuum",
            CellKind::Floor => "floor",
            CellKind::Wall => "wall",
            CellKind::Door => "door",
            CellKind::Conduit => "conduit",
            CellKind::WallConduit => "wall conduit",
            CellKind::PowerGenerator => "power plant",
            CellKind::AirGenerator => "air plant",
            CellKind::ShipEntrance => "ship entrance",
        }
    }

    /// A freshly built, undamaged cell of this kind.
    pub fn pristine(self) -> Cell {
        match self {
            CellKind::EmptySpace => Cell::EmptySpace,
            CellKind::Floor => Cell::Floor,
            CellKind::Wall => Cell::Wall { damaged: false },
            CellKind::Door => Cell::Door {
                open: false,
                damaged: false,
            },
            CellKind::Conduit => Cell::Conduit { damaged: false },
            CellKind::WallConduit => Cell::WallConduit { damaged: false },
            CellKind::PowerGenerator => Cell::PowerGenerator { damaged: false },
            CellKind::AirGenerator => Cell::AirGenerator {
                damaged: false,
                stored_energy: 0.0,
            },
            CellKind::ShipEntrance => Cell::ShipEntrance,
        }
    }

    /// Maximum yields and turns for tearing this kind down.
    pub fn salvage_costs(self) -> Option<Costs> {
        match self {
            CellKind::Floor | CellKind::Wall => Some(Costs::new(10, 0, 10)),
            CellKind::Door | CellKind::WallConduit => Some(Costs::new(10, 10, 15)),
            CellKind::Conduit => Some(Costs::new(0, 10, 10)),
            CellKind::PowerGenerator | CellKind::AirGenerator => Some(Costs::new(10, 10, 20)),
            CellKind::EmptySpace | CellKind::ShipEntrance => None,
        }
    }

    /// Maximum material and turn cost of a repair.
    pub fn repair_costs(self) -> Option<Costs> {
        match self {
            CellKind::Wall => Some(Costs::new(5, 0, 5)),
            CellKind::Door => Some(Costs::new(5, 5, 10)),
            CellKind::Conduit => Some(Costs::new(0, 10, 5)),
            CellKind::WallConduit | CellKind::PowerGenerator | CellKind::AirGenerator => {
                Some(Costs::new(10, 10, 15))
            }
            CellKind::EmptySpace | CellKind::Floor | CellKind::ShipEntrance => None,
        }
    }

    /// Maximum material and turn cost of building from raw materials.
    pub fn create_costs(self) -> Option<Costs> {
        match self {
            CellKind::Floor | CellKind::Wall => Some(Costs::new(10, 0, 10)),
            CellKind::Door => Some(Costs::new(10, 10, 15)),
            CellKind::Conduit => Some(Costs::new(0, 15, 10)),
            CellKind::WallConduit => Some(Costs::new(15, 15, 15)),
            CellKind::EmptySpace
            | CellKind::PowerGenerator
            | CellKind::AirGenerator
            | CellKind::ShipEntrance => None,
        }
    }
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::EmptySpace => CellKind::EmptySpace,
            Cell::Floor => CellKind::Floor,
            Cell::Wall { .. } => CellKind::Wall,
            Cell::Door { .. } => CellKind::Door,
            Cell::Conduit { .. } => CellKind::Conduit,
            Cell::WallConduit { .. } => CellKind::WallConduit,
            Cell::PowerGenerator { .. } => CellKind::PowerGenerator,
            Cell::AirGenerator { .. } => CellKind::AirGenerator,
            Cell::ShipEntrance => CellKind::ShipEntrance,
        }
    }

    /// Whether the cell is damaged. Variants without a damage flag answer false.
    pub fn is_damaged(&self) -> bool {
        match *self {
            Cell::Wall { damaged }
            | Cell::Door { damaged, .. }
            | Cell::Conduit { damaged }
            | Cell::WallConduit { damaged }
            | Cell::PowerGenerator { damaged }
            | Cell::AirGenerator { damaged, .. } => damaged,
            Cell::EmptySpace | Cell::Floor | Cell::ShipEntrance => false,
        }
    }

    /// Returns a copy with the damage flag set. No-op for undamageable variants.
    pub fn damaged(mut self) -> Self {
        self.set_damaged(true);
        self
    }

    fn set_damaged(&mut self, value: bool) {
        match self {
            Cell::Wall { damaged }
            | Cell::Door { damaged, .. }
            | Cell::Conduit { damaged }
            | Cell::WallConduit { damaged }
            | Cell::PowerGenerator { damaged }
            | Cell::AirGenerator { damaged, .. } => *damaged = value,
            Cell::EmptySpace | Cell::Floor | Cell::ShipEntrance => {}
        }
    }

    /// Energy held by an air generator from the last propagation pass.
    pub fn stored_energy(&self) -> f64 {
        match *self {
            Cell::AirGenerator { stored_energy, .. } => stored_energy,
            _ => 0.0,
        }
    }

    pub fn traversable(&self) -> bool {
        match *self {
            Cell::EmptySpace | Cell::Floor | Cell::Conduit { .. } | Cell::ShipEntrance => true,
            Cell::Door { open, .. } => open,
            Cell::Wall { .. }
            | Cell::WallConduit { .. }
            | Cell::PowerGenerator { .. }
            | Cell::AirGenerator { .. } => false,
        }
    }

    pub fn opaque(&self) -> bool {
        match *self {
            Cell::EmptySpace | Cell::Floor | Cell::Conduit { .. } | Cell::ShipEntrance => false,
            Cell::Door { open, .. } => !open,
            Cell::Wall { .. }
            | Cell::WallConduit { .. }
            | Cell::PowerGenerator { .. }
            | Cell::AirGenerator { .. } => true,
        }
    }

    /// Whether this cell takes part in air diffusion right now.
    pub fn air_flows(&self) -> bool {
        match *self {
            Cell::EmptySpace | Cell::Floor | Cell::Conduit { .. } | Cell::ShipEntrance => true,
            Cell::Wall { damaged } | Cell::WallConduit { damaged } => damaged,
            Cell::Door { open, damaged } => open || damaged,
            Cell::AirGenerator { damaged, .. } => !damaged,
            Cell::PowerGenerator { .. } => false,
        }
    }

    /// Air sink/source: maps the local average to this cell's new air value.
    pub fn air_response(&self, average: f64) -> f64 {
        match *self {
            Cell::EmptySpace => 0.0,
            Cell::ShipEntrance => air::ENTRANCE_OUTPUT,
            Cell::AirGenerator {
                damaged,
                stored_energy,
            } => {
                if !damaged && stored_energy > air::GENERATOR_ENERGY_THRESHOLD {
                    air::GENERATOR_OUTPUT
                } else {
                    average
                }
            }
            Cell::Floor
            | Cell::Wall { .. }
            | Cell::Door { .. }
            | Cell::Conduit { .. }
            | Cell::WallConduit { .. }
            | Cell::PowerGenerator { .. } => average,
        }
    }

    /// Whether energy can be carried into this cell right now.
    pub fn energy_flows(&self) -> bool {
        match *self {
            Cell::Conduit { damaged }
            | Cell::WallConduit { damaged }
            | Cell::PowerGenerator { damaged } => !damaged,
            Cell::AirGenerator { .. } => true,
            Cell::EmptySpace
            | Cell::Floor
            | Cell::Wall { .. }
            | Cell::Door { .. }
            | Cell::ShipEntrance => false,
        }
    }

    /// Energy sink/source: maps incoming energy to this cell's new value.
    pub fn energy_response(&self, input: f64) -> f64 {
        match *self {
            Cell::PowerGenerator { damaged: false } => energy::GENERATOR_OUTPUT,
            Cell::Conduit { damaged: false } | Cell::WallConduit { damaged: false } => {
                (input - energy::CONDUIT_LOSS).max(0.0)
            }
            Cell::AirGenerator { .. } => {
                if input > energy::AIR_GENERATOR_DRAW_THRESHOLD {
                    input
                        - (input - energy::AIR_GENERATOR_DRAW_THRESHOLD)
                            * energy::AIR_GENERATOR_DRAW_FRACTION
                } else {
                    input
                }
            }
            Cell::ShipEntrance => 0.0,
            Cell::EmptySpace
            | Cell::Floor
            | Cell::Wall { .. }
            | Cell::Door { .. }
            | Cell::Conduit { damaged: true }
            | Cell::WallConduit { damaged: true }
            | Cell::PowerGenerator { damaged: true } => input,
        }
    }

    /// Record the energy delivered to this cell during a propagation pass.
    pub fn absorb_energy(&mut self, input: f64) {
        if let Cell::AirGenerator { stored_energy, .. } = self {
            *stored_energy = input;
        }
    }

    /// Character used by the renderer.
    pub fn glyph(&self) -> char {
        match *self {
            Cell::EmptySpace => ' ',
            Cell::Floor | Cell::ShipEntrance => '.',
            Cell::Wall { .. } => '#',
            Cell::Door { open: true, .. } => '/',
            Cell::Door { open: false, .. } => '+',
            Cell::Conduit { damaged: false } => '-',
            Cell::Conduit { damaged: true } => '~',
            Cell::WallConduit { damaged: false } => '*',
            Cell::WallConduit { damaged: true } => '%',
            Cell::PowerGenerator { damaged: false } => 'P',
            Cell::PowerGenerator { damaged: true } => 'p',
            Cell::AirGenerator { damaged: false, .. } => 'A',
            Cell::AirGenerator { damaged: true, .. } => 'a',
        }
    }

    /// Look-mode description.
    pub fn description(&self) -> &'static str {
        match *self {
            Cell::EmptySpace => "The cold vacuum of space",
            Cell::Floor => "The floor",
            Cell::Wall { damaged: false } => "A wall",
            Cell::Wall { damaged: true } => "A cracked wall, air whistles through it",
            Cell::Door { damaged: true, .. } => "A buckled door",
            Cell::Door { .. } => "A door",
            Cell::Conduit { damaged: false } => "An energy conduit",
            Cell::Conduit { damaged: true } => "A burned out energy conduit",
            Cell::WallConduit { damaged: false } => "An energy conduit passes through a wall here",
            Cell::WallConduit { damaged: true } => {
                "A burned out energy conduit passes through a wall here"
            }
            Cell::PowerGenerator { .. } => "An energy generator",
            Cell::AirGenerator { .. } => "An air generator",
            Cell::ShipEntrance => "Your ship, safety",
        }
    }

    /// Tear the cell down for raw materials.
    pub fn salvage(&self, ctx: &mut ActionContext<'_>) -> CellOutcome {
        match self {
            Cell::EmptySpace => {
                ctx.messages.push("There is nothing to salvage in a vacuum");
                CellOutcome::nothing()
            }
            Cell::ShipEntrance => {
                ctx.messages.push("Why would you salvage your own ship?");
                CellOutcome::nothing()
            }
            Cell::Floor => match ctx.prompter.confirm("Salvage floor?") {
                Some(true) => {
                    let turns = economy::salvage(Costs::new(10, 0, 10), ctx);
                    CellOutcome::replace(turns, Cell::EmptySpace)
                }
                Some(false) | None => CellOutcome::nothing(),
            },
            _ => match self.kind().salvage_costs() {
                Some(costs) => CellOutcome::replace(economy::salvage(costs, ctx), Cell::Floor),
                None => CellOutcome::nothing(),
            },
        }
    }

    /// Spend materials to clear the damage flag.
    pub fn repair(&mut self, ctx: &mut ActionContext<'_>) -> CellOutcome {
        let kind = self.kind();
        let Some(costs) = kind.repair_costs() else {
            ctx.messages.push(match kind {
                CellKind::EmptySpace => "You cannot repair a vacuum",
                CellKind::ShipEntrance => "Your own ship does not need repair",
                _ => "The floor does not need to be repaired",
            });
            return CellOutcome::nothing();
        };

        let mut damaged = self.is_damaged();
        let turns = economy::repair(&mut damaged, costs, kind.name(), ctx);
        self.set_damaged(damaged);
        CellOutcome::turns(turns)
    }

    /// Build a cell of `kind` from raw materials. On success the outcome
    /// carries the new cell; on a shortfall the turns are spent but nothing
    /// is installed.
    pub fn create(kind: CellKind, ctx: &mut ActionContext<'_>) -> CellOutcome {
        let Some(costs) = kind.create_costs() else {
            ctx.messages.push(match kind {
                CellKind::EmptySpace => "Nature abhors a vacuum",
                CellKind::ShipEntrance => "You cannot build another ship out here",
                _ => "That cannot be built from scratch",
            });
            return CellOutcome::nothing();
        };

        let build = economy::build(costs, kind.name(), ctx);
        if build.complete {
            CellOutcome::replace(build.turns, kind.pristine())
        } else {
            CellOutcome::turns(build.turns)
        }
    }

    /// Variant-specific activation. Doors toggle; everything else reports.
    pub fn activate(&mut self, ctx: &mut ActionContext<'_>) -> CellOutcome {
        match self {
            Cell::Door { damaged: true, .. } => {
                ctx.messages.push("The door is damaged and will not move");
                CellOutcome::turns(1)
            }
            Cell::Door { open, .. } => {
                ctx.messages.push(if *open {
                    "The door closes"
                } else {
                    "The door opens"
                });
                *open = !*open;
                CellOutcome::turns(1)
            }
            Cell::EmptySpace => {
                ctx.messages
                    .push("You activate the vacuum, the universe is re-created in a flash");
                CellOutcome::turns(1)
            }
            Cell::Floor | Cell::Wall { .. } => {
                ctx.messages.push("Nothing happens");
                CellOutcome::nothing()
            }
            Cell::Conduit { .. }
            | Cell::WallConduit { .. }
            | Cell::PowerGenerator { .. }
            | Cell::AirGenerator { .. }
            | Cell::ShipEntrance => {
                ctx.messages.push("Nothing happens");
                CellOutcome::turns(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_variant() -> Vec<Cell> {
        let mut cells: Vec<Cell> = CellKind::ALL.iter().map(|k| k.pristine()).collect();
        cells.extend(CellKind::ALL.iter().map(|k| k.pristine().damaged()));
        cells.push(Cell::Door {
            open: true,
            damaged: false,
        });
        cells.push(Cell::AirGenerator {
            damaged: false,
            stored_energy: 8.0,
        });
        cells
    }

    #[test]
    fn test_walkable_cells_are_never_opaque() {
        for cell in every_variant() {
            if cell.traversable() {
                assert!(!cell.opaque(), "{:?} is walkable but blocks sight", cell);
            }
        }
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in CellKind::ALL {
            assert_eq!(kind.pristine().kind(), kind);
        }
    }

    #[test]
    fn test_vacuum_drains_air() {
        assert_eq!(Cell::EmptySpace.air_response(7.5), 0.0);
        assert!(Cell::EmptySpace.air_flows());
    }

    #[test]
    fn test_floor_passes_air() {
        assert_eq!(Cell::Floor.air_response(4.25), 4.25);
        assert!(!Cell::Floor.energy_flows());
    }

    #[test]
    fn test_wall_blocks_air_unless_damaged() {
        let wall = CellKind::Wall.pristine();
        assert!(!wall.air_flows());
        assert!(wall.damaged().air_flows());
        assert!(wall.damaged().opaque());
    }

    #[test]
    fn test_door_state_controls_everything() {
        let closed = Cell::Door {
            open: false,
            damaged: false,
        };
        let open = Cell::Door {
            open: true,
            damaged: false,
        };
        let jammed = Cell::Door {
            open: false,
            damaged: true,
        };
        assert!(!closed.traversable() && closed.opaque() && !closed.air_flows());
        assert!(open.traversable() && !open.opaque() && open.air_flows());
        assert!(jammed.air_flows());
        assert_eq!(closed.glyph(), '+');
        assert_eq!(open.glyph(), '/');
    }

    #[test]
    fn test_damaged_conduit_is_inert() {
        let conduit = CellKind::Conduit.pristine();
        assert!(conduit.energy_flows());
        assert!(!conduit.damaged().energy_flows());
        assert_eq!(conduit.glyph(), '-');
        assert_eq!(conduit.damaged().glyph(), '~');
    }

    #[test]
    fn test_conduit_loses_energy_per_hop() {
        let conduit = CellKind::Conduit.pristine();
        let out = conduit.energy_response(9.0);
        assert!(out < 9.0 && out > 8.0);
        assert_eq!(conduit.energy_response(0.05), 0.0);
    }

    #[test]
    fn test_power_generator_emits_unless_damaged() {
        let plant = CellKind::PowerGenerator.pristine();
        assert_eq!(plant.energy_response(0.0), energy::GENERATOR_OUTPUT);
        assert_eq!(plant.damaged().energy_response(0.0), 0.0);
        assert!(!plant.air_flows());
    }

    #[test]
    fn test_air_generator_needs_power() {
        let unpowered = CellKind::AirGenerator.pristine();
        assert_eq!(unpowered.air_response(1.5), 1.5);

        let mut powered = unpowered;
        powered.absorb_energy(8.0);
        assert_eq!(powered.stored_energy(), 8.0);
        assert_eq!(powered.air_response(1.5), air::GENERATOR_OUTPUT);
        assert_eq!(powered.damaged().air_response(1.5), 1.5);
    }

    #[test]
    fn test_air_generator_draws_above_threshold() {
        let plant = CellKind::AirGenerator.pristine();
        assert_eq!(plant.energy_response(4.0), 4.0);
        let residual = plant.energy_response(9.0);
        assert!((residual - (9.0 - 4.0 / 50.0)).abs() < 1e-12);
    }

    #[test]
    fn test_ship_entrance_is_a_boundary() {
        assert_eq!(Cell::ShipEntrance.air_response(0.0), air::ENTRANCE_OUTPUT);
        assert_eq!(Cell::ShipEntrance.energy_response(5.0), 0.0);
        assert!(Cell::ShipEntrance.traversable());
    }

    #[test]
    fn test_responses_never_negative() {
        for cell in every_variant() {
            for input in [0.0, 0.01, 1.0, 5.0, 9.0, 20.0] {
                assert!(cell.air_response(input) >= 0.0);
                assert!(cell.energy_response(input) >= 0.0);
            }
        }
    }

    #[test]
    fn test_cost_tables() {
        assert!(CellKind::EmptySpace.salvage_costs().is_none());
        assert!(CellKind::ShipEntrance.repair_costs().is_none());
        assert!(CellKind::PowerGenerator.create_costs().is_none());
        for kind in CellKind::BUILDABLE {
            assert!(kind.create_costs().is_some(), "{:?} must be buildable", kind);
        }
        for kind in CellKind::ALL {
            if let Some(costs) = kind.salvage_costs() {
                assert!(costs.turns >= 2, "{:?} needs a turn range", kind);
            }
        }
    }
}
