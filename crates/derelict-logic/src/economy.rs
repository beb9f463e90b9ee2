//! Resource economy — randomized material yields, repair and build costs.
//!
//! All sampling goes through the injected RNG in [`ActionContext`], so a
//! seeded generator makes every salvage, repair and build reproducible.
//! Costs are upper bounds: materials are drawn uniformly from `[0, max)` and
//! turns from `[1, max_turns)`.
//!
//! Shortfalls never fail loudly. The ledger is clamped at zero, a message is
//! queued, and the sampled turns are still spent.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::actions::Prompter;
use crate::diag::Diagnostics;
use crate::messages::MessageLog;

/// Upper bounds for one salvage, repair or build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Costs {
    /// Maximum steel (exclusive). Zero means steel is never involved.
    pub steel: u32,
    /// Maximum copper (exclusive). Zero means copper is never involved.
    pub copper: u32,
    /// Maximum turns (exclusive). Always at least one turn is spent.
    pub turns: u32,
}

impl Costs {
    pub const fn new(steel: u32, copper: u32, turns: u32) -> Self {
        Self {
            steel,
            copper,
            turns,
        }
    }
}

/// The player's raw materials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub steel: u32,
    pub copper: u32,
}

/// Which materials ran out during a debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortage {
    None,
    Steel,
    Copper,
    Both,
}

impl Ledger {
    pub fn new(steel: u32, copper: u32) -> Self {
        Self { steel, copper }
    }

    pub fn credit(&mut self, steel: u32, copper: u32) {
        self.steel = self.steel.saturating_add(steel);
        self.copper = self.copper.saturating_add(copper);
    }

    /// Debit both materials. Whatever cannot be paid is clamped to zero and
    /// reported; the part that could be paid is still gone.
    pub fn debit(&mut self, steel: u32, copper: u32) -> Shortage {
        let steel_short = steel > self.steel;
        let copper_short = copper > self.copper;
        self.steel = self.steel.saturating_sub(steel);
        self.copper = self.copper.saturating_sub(copper);
        match (steel_short, copper_short) {
            (false, false) => Shortage::None,
            (true, false) => Shortage::Steel,
            (false, true) => Shortage::Copper,
            (true, true) => Shortage::Both,
        }
    }
}

/// Everything a cell operation may touch besides the cell itself.
pub struct ActionContext<'a> {
    pub ledger: &'a mut Ledger,
    pub rng: &'a mut dyn RngCore,
    pub prompter: &'a mut dyn Prompter,
    pub messages: &'a mut MessageLog,
    pub diag: &'a dyn Diagnostics,
}

/// Result of a build attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub turns: u32,
    /// False when materials ran out; the cell must not be installed.
    pub complete: bool,
}

/// A sampled draw of materials and turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub steel: u32,
    pub copper: u32,
    pub turns: u32,
}

/// Sample materials in `[0, max)` and turns in `[1, max_turns)`.
pub fn sample(costs: Costs, rng: &mut dyn RngCore) -> Draw {
    let steel = if costs.steel > 0 {
        rng.gen_range(0..costs.steel)
    } else {
        0
    };
    let copper = if costs.copper > 0 {
        rng.gen_range(0..costs.copper)
    } else {
        0
    };
    let turns = if costs.turns > 1 {
        rng.gen_range(1..costs.turns)
    } else {
        1
    };
    Draw {
        steel,
        copper,
        turns,
    }
}

/// Tear down for materials. Returns the turns spent.
pub fn salvage(costs: Costs, ctx: &mut ActionContext<'_>) -> u32 {
    let draw = sample(costs, ctx.rng);
    ctx.ledger.credit(draw.steel, draw.copper);
    ctx.diag.event(format_args!(
        "salvage: +{} steel +{} copper in {} turns",
        draw.steel, draw.copper, draw.turns
    ));

    let message = match (draw.steel, draw.copper) {
        (0, 0) => format!("You fail to salvage any useful metals in {} turns", draw.turns),
        (st, 0) => format!("You salvage {} steel in {} turns", st, draw.turns),
        (0, cu) => format!("You salvage {} copper in {} turns", cu, draw.turns),
        (st, cu) => format!(
            "You salvage {} steel and {} copper in {} turns",
            st, cu, draw.turns
        ),
    };
    ctx.messages.push(message);
    draw.turns
}

/// Repair a damaged part. Leaves `damaged` set if materials run out.
///
/// Returns zero turns when there is nothing to repair.
pub fn repair(damaged: &mut bool, costs: Costs, name: &str, ctx: &mut ActionContext<'_>) -> u32 {
    if !*damaged {
        ctx.messages
            .push(format!("The {} does not need to be repaired", name));
        return 0;
    }

    let draw = sample(costs, ctx.rng);
    let shortage = ctx.ledger.debit(draw.steel, draw.copper);
    ctx.diag.event(format_args!(
        "repair {}: -{} steel -{} copper, {:?}",
        name, draw.steel, draw.copper, shortage
    ));

    match shortage {
        Shortage::None => {
            *damaged = false;
            ctx.messages.push(format!(
                "Used {} steel and {} copper to repair the {} in {} turns",
                draw.steel, draw.copper, name, draw.turns
            ));
        }
        short => ctx.messages.push(shortage_message(short, draw.turns)),
    }
    draw.turns
}

/// Build a new section from raw materials.
pub fn build(costs: Costs, name: &str, ctx: &mut ActionContext<'_>) -> BuildReport {
    let draw = sample(costs, ctx.rng);
    let shortage = ctx.ledger.debit(draw.steel, draw.copper);
    ctx.diag.event(format_args!(
        "build {}: -{} steel -{} copper, {:?}",
        name, draw.steel, draw.copper, shortage
    ));

    let complete = shortage == Shortage::None;
    if complete {
        ctx.messages.push(format!(
            "Used {} steel and {} copper to create a {} section in {} turns",
            draw.steel, draw.copper, name, draw.turns
        ));
    } else {
        ctx.messages.push(shortage_message(shortage, draw.turns));
    }
    BuildReport {
        turns: draw.turns,
        complete,
    }
}

fn shortage_message(shortage: Shortage, turns: u32) -> String {
    let what = match shortage {
        Shortage::Both => "both steel and copper",
        Shortage::Steel => "steel",
        Shortage::Copper => "copper",
        Shortage::None => "nothing",
    };
    format!("You run out of {} after {} turns", what, turns)
}
