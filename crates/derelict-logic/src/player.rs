//! The player — position, senses, material ledger and air reserve.

use serde::{Deserialize, Serialize};

use crate::cells::Cell;
use crate::config::SimConfig;
use crate::economy::Ledger;
use crate::grid::Coord;

/// Which field, if any, the sensor overlay exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorMode {
    #[default]
    None,
    Pressure,
    Energy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Coord,
    pub vision_radius: i32,
    pub pressure_sensor_radius: i32,
    pub energy_sensor_radius: i32,
    pub ledger: Ledger,
    air_left: f64,
    air_capacity: f64,
    dead: bool,
    left_ship: bool,
    sensor: SensorMode,
}

impl Player {
    /// A fresh player at `position` with a full air reserve.
    pub fn spawn(position: Coord, config: &SimConfig) -> Self {
        Self {
            position,
            vision_radius: config.vision_radius,
            pressure_sensor_radius: config.pressure_sensor_radius,
            energy_sensor_radius: config.energy_sensor_radius,
            ledger: Ledger::new(config.starting_steel, config.starting_copper),
            air_left: config.air_capacity,
            air_capacity: config.air_capacity,
            dead: false,
            left_ship: false,
            sensor: SensorMode::None,
        }
    }

    pub fn air_left(&self) -> f64 {
        self.air_left
    }

    pub fn air_capacity(&self) -> f64 {
        self.air_capacity
    }

    /// Terminal. Once set it is never cleared.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether the player has ever stood somewhere other than their ship.
    pub fn has_left_ship(&self) -> bool {
        self.left_ship
    }

    pub fn sensor(&self) -> SensorMode {
        self.sensor
    }

    /// Select a sensor. Selecting the active one switches sensing off.
    pub fn toggle_sensor(&mut self, mode: SensorMode) {
        self.sensor = if self.sensor == mode {
            SensorMode::None
        } else {
            mode
        };
    }

    /// Radius of the active sensor, `None` when sensing is off.
    pub fn sensor_radius(&self) -> Option<i32> {
        match self.sensor {
            SensorMode::None => None,
            SensorMode::Pressure => Some(self.pressure_sensor_radius),
            SensorMode::Energy => Some(self.energy_sensor_radius),
        }
    }

    /// Move to `to`, which holds `cell`.
    pub fn move_to(&mut self, to: Coord, cell: &Cell) {
        self.position = to;
        if !matches!(cell, Cell::ShipEntrance) {
            self.left_ship = true;
        }
    }

    /// One tick of breathing at a cell holding `local_air`.
    ///
    /// Thin air drains the reserve faster the harder the vacuum; good air
    /// refills it. Between the two thresholds nothing changes.
    pub fn breathe(&mut self, local_air: f64, config: &SimConfig) {
        if self.dead {
            return;
        }
        let local_air = local_air.max(0.0);
        if local_air < config.low_air {
            self.air_left -= config.vacuum_drain / (1.0 + local_air);
        } else if local_air >= config.medium_air {
            self.air_left += local_air / config.recovery_divisor;
        }
        // clamp() would panic on a negative or NaN capacity
        self.air_left = self.air_left.max(0.0).min(self.air_capacity);
        if self.air_left <= 0.0 {
            self.dead = true;
        }
    }
}
