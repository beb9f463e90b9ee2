//! Simulation constants — field outputs, survival thresholds, player defaults.
//!
//! Plain `const` values grouped by concern. Anything a player might want to
//! tune at launch lives in [`crate::config::SimConfig`] instead; these are the
//! fixed physics of the ship.

/// Air field constants.
pub mod air {
    /// Air pushed out by a working air generator.
    pub const GENERATOR_OUTPUT: f64 = 9.0;
    /// Breathable air forced at the ship entrance (the player's own ship).
    pub const ENTRANCE_OUTPUT: f64 = 9.0;
    /// Stored energy an air generator needs before it produces anything.
    pub const GENERATOR_ENERGY_THRESHOLD: f64 = 5.0;
}

/// Energy field constants.
pub mod energy {
    /// Output of an undamaged power generator.
    pub const GENERATOR_OUTPUT: f64 = 9.0;
    /// Input above which an air generator starts drawing power.
    pub const AIR_GENERATOR_DRAW_THRESHOLD: f64 = 5.0;
    /// Fraction of the excess over the threshold an air generator consumes.
    pub const AIR_GENERATOR_DRAW_FRACTION: f64 = 1.0 / 50.0;
    /// Energy lost per conduit hop.
    pub const CONDUIT_LOSS: f64 = 0.1;
}

/// Survival thresholds and rates (defaults for [`crate::config::SimConfig`]).
pub mod survival {
    /// Below this local air value the player loses air every tick.
    pub const LOW_AIR: f64 = 3.0;
    /// At or above this local air value the player recovers air.
    pub const MEDIUM_AIR: f64 = 6.0;
    /// Air lost per tick in hard vacuum, divided by `1 + local air`.
    pub const VACUUM_DRAIN: f64 = 0.1;
    /// Local air divided by this is regained per tick in good air.
    pub const RECOVERY_DIVISOR: f64 = 50.0;
}

/// Player defaults at spawn.
pub mod player {
    pub const VISION_RADIUS: i32 = 5;
    pub const PRESSURE_SENSOR_RADIUS: i32 = 2;
    pub const ENERGY_SENSOR_RADIUS: i32 = 1;
    pub const AIR_CAPACITY: f64 = 10.0;
    pub const STARTING_STEEL: u32 = 0;
    pub const STARTING_COPPER: u32 = 0;
    /// Largest vision or sensor radius a configuration may ask for.
    pub const MAX_SENSE_RADIUS: i32 = 128;
}

/// Reference level dimensions.
pub mod level {
    pub const WIDTH: usize = 69;
    pub const HEIGHT: usize = 23;
}
