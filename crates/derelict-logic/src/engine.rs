//! Simulation engine — main entry point for running a derelict.
//!
//! Owns the grid, both fields, the player and the fog-of-war cache, and
//! sequences one resolved action into that many ticks:
//!
//! 1. air diffusion pass
//! 2. energy propagation pass
//! 3. player breathes the air at their cell
//!
//! The visible set is recomputed after every action, once all its ticks ran.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::actions::{self, ActionKind, Prompter};
use crate::atmosphere;
use crate::config::SimConfig;
use crate::diag::{Diagnostics, NullDiagnostics};
use crate::economy::ActionContext;
use crate::field::ScalarField;
use crate::grid::{Coord, Direction, Grid};
use crate::level::Level;
use crate::messages::MessageLog;
use crate::player::{Player, SensorMode};
use crate::power;
use crate::visibility::{self, SensorReading, SeenMap};

/// Main simulation engine
pub struct Simulation {
    grid: Grid,
    air: ScalarField,
    energy: ScalarField,
    player: Player,
    seen: SeenMap,
    messages: MessageLog,
    rng: StdRng,
    diag: Box<dyn Diagnostics>,
    config: SimConfig,
    ticks: u64,
}

impl Simulation {
    /// Start a run on `level`. Both fields start empty; the economy RNG is
    /// seeded from `config.seed`.
    pub fn new(level: Level, config: SimConfig) -> Self {
        let Level { grid, spawn } = level;
        let mut player = Player::spawn(spawn, &config);
        if let Some(cell) = grid.get(spawn) {
            player.move_to(spawn, cell);
        }

        let mut sim = Self {
            air: ScalarField::for_grid(&grid),
            energy: ScalarField::for_grid(&grid),
            seen: SeenMap::for_grid(&grid),
            grid,
            player,
            messages: MessageLog::new(),
            rng: StdRng::seed_from_u64(config.seed),
            diag: Box::new(NullDiagnostics),
            config,
            ticks: 0,
        };
        sim.refresh_view();
        sim
    }

    /// Replace the diagnostics sink.
    pub fn with_diagnostics(mut self, diag: impl Diagnostics + 'static) -> Self {
        self.diag = Box::new(diag);
        self
    }

    /// Step one cell. `Direction::Here` waits in place.
    ///
    /// Returns the turns spent: one on success, zero when the way is blocked
    /// or the player is dead.
    pub fn walk(&mut self, dir: Direction) -> u32 {
        if self.reject_if_dead() {
            return 0;
        }
        let to = self.player.position.step(dir);
        let Some(cell) = self.grid.get(to) else {
            return 0;
        };
        if !cell.traversable() {
            return 0;
        }

        self.player.move_to(to, cell);
        self.advance(1);
        self.refresh_view();
        1
    }

    /// Resolve an action, asking `prompter` for anything not given, then run
    /// the turns it cost. `kind == None` opens the action menu.
    pub fn act(&mut self, kind: Option<ActionKind>, prompter: &mut dyn Prompter) -> u32 {
        if self.reject_if_dead() {
            return 0;
        }

        let mut ctx = ActionContext {
            ledger: &mut self.player.ledger,
            rng: &mut self.rng,
            prompter,
            messages: &mut self.messages,
            diag: self.diag.as_ref(),
        };
        let turns = actions::resolve(kind, &mut self.grid, self.player.position, &mut ctx);

        self.advance(turns);
        self.refresh_view();
        turns
    }

    fn reject_if_dead(&mut self) -> bool {
        if self.player.is_dead() {
            self.messages.push("You are dead");
        }
        self.player.is_dead()
    }

    /// Run `turns` ticks, one at a time.
    pub fn advance(&mut self, turns: u32) {
        for _ in 0..turns {
            self.tick();
        }
    }

    /// One full tick: air, then energy, then breathing.
    pub fn tick(&mut self) {
        atmosphere::diffuse(&self.grid, &mut self.air, self.diag.as_ref());
        power::propagate(&mut self.grid, &mut self.energy, self.diag.as_ref());

        let was_dead = self.player.is_dead();
        let local = self.air.get(self.player.position);
        self.player.breathe(local, &self.config);
        if self.player.is_dead() && !was_dead {
            self.messages.push("You have run out of air");
            self.diag.event(format_args!(
                "player died at {} on tick {}",
                self.player.position, self.ticks
            ));
        }
        self.ticks += 1;
    }

    /// Recompute what the player can see. Returns the visible cell count.
    pub fn refresh_view(&mut self) -> usize {
        self.seen
            .reveal(&self.grid, self.player.position, self.player.vision_radius)
    }

    pub fn toggle_sensor(&mut self, mode: SensorMode) {
        self.player.toggle_sensor(mode);
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Live glyph of the cell at `at`.
    pub fn glyph_at(&self, at: Coord) -> Option<char> {
        self.grid.get(at).map(|c| c.glyph())
    }

    /// Glyph as the player last saw it.
    pub fn remembered_glyph(&self, at: Coord) -> Option<char> {
        self.seen.remembered_glyph(at)
    }

    pub fn is_visible(&self, at: Coord) -> bool {
        self.seen.is_visible(at)
    }

    pub fn is_seen(&self, at: Coord) -> bool {
        self.seen.is_seen(at)
    }

    pub fn air_at(&self, at: Coord) -> f64 {
        self.air.get(at)
    }

    pub fn energy_at(&self, at: Coord) -> f64 {
        self.energy.get(at)
    }

    /// Look-mode text for the cell at `at`.
    pub fn describe(&self, at: Coord) -> Option<&'static str> {
        self.grid.get(at).map(|c| c.description())
    }

    /// Readings of the active sensor around the player; empty when off.
    pub fn sensor_overlay(&self) -> Vec<SensorReading> {
        let field = match self.player.sensor() {
            SensorMode::None => return Vec::new(),
            SensorMode::Pressure => &self.air,
            SensorMode::Energy => &self.energy,
        };
        let radius = self.player.sensor_radius().unwrap_or(0);
        visibility::sensor_overlay(field, self.player.position, radius)
    }

    /// Take every queued message, most recent first.
    pub fn drain_messages(&mut self) -> Vec<String> {
        self.messages.drain()
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn is_dead(&self) -> bool {
        self.player.is_dead()
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn air(&self) -> &ScalarField {
        &self.air
    }

    pub fn energy(&self) -> &ScalarField {
        &self.energy
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The map as the player knows it: live glyphs where visible, memory
    /// elsewhere, blanks where never seen, `@` for the player.
    pub fn render_view(&self) -> Vec<String> {
        (0..self.grid.height() as i32)
            .map(|y| {
                (0..self.grid.width() as i32)
                    .map(|x| {
                        let at = Coord::new(x, y);
                        if at == self.player.position {
                            '@'
                        } else if self.is_visible(at) {
                            self.glyph_at(at).unwrap_or(' ')
                        } else {
                            self.remembered_glyph(at).unwrap_or(' ')
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
