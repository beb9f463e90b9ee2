//! Pure simulation logic for Derelict.
//!
//! A player explores a derelict ship, salvaging and repairing it while
//! breathable air and generator power spread across a grid of cells. This
//! crate holds the whole simulation and nothing else: no terminal, no file
//! I/O, no global state. Input comes in through [`actions::Prompter`],
//! randomness through a seeded RNG, traces through [`diag::Diagnostics`].
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actions`] | Action menu, direction prompts, Salvage/Repair/Create/Activate dispatch |
//! | [`atmosphere`] | Per-tick 3×3 air diffusion |
//! | [`cells`] | Closed cell taxonomy and per-variant capabilities |
//! | [`config`] | Launch-time tuning and validation |
//! | [`constants`] | Field outputs, survival thresholds, player defaults |
//! | [`diag`] | Injected diagnostics sinks |
//! | [`economy`] | Material ledger, randomized yields and costs |
//! | [`engine`] | `Simulation`: actions to ticks, queries for the renderer |
//! | [`field`] | Double-buffered scalar field |
//! | [`grid`] | Coordinates, directions and the dense cell grid |
//! | [`level`] | ASCII layouts and the reference ship |
//! | [`messages`] | Newest-first player message queue |
//! | [`player`] | Position, senses, air reserve |
//! | [`power`] | Breadth-first energy flood from generators |
//! | [`visibility`] | Ray casting, fog of war, sensor overlays |

pub mod actions;
pub mod atmosphere;
pub mod cells;
pub mod config;
pub mod constants;
pub mod diag;
pub mod economy;
pub mod engine;
pub mod field;
pub mod grid;
pub mod level;
pub mod messages;
pub mod player;
pub mod power;
pub mod visibility;

pub use actions::{ActionKind, Prompter, ScriptedPrompter};
pub use cells::{Cell, CellKind};
pub use config::{validate_config, ConfigError, SimConfig};
pub use engine::Simulation;
pub use grid::{Coord, Direction, Grid, LevelError};
pub use level::{parse_layout, reference_level, Level};
pub use player::SensorMode;
