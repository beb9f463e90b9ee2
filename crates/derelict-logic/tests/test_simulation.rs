//! Integration tests for the simulation through its public API.
//!
//! Exercises: Level → Simulation → actions → ticks → fields → survival,
//! plus the field passes on hand-built grids.
//!
//! All tests are pure logic: no terminal, no files.

use derelict_logic::atmosphere::diffuse;
use derelict_logic::diag::NullDiagnostics;
use derelict_logic::field::ScalarField;
use derelict_logic::power::propagate;
use derelict_logic::visibility::cast_ray;
use derelict_logic::{
    parse_layout, reference_level, ActionKind, Cell, CellKind, Coord, Direction, Grid,
    ScriptedPrompter, SimConfig, Simulation,
};

// ── Helpers ────────────────────────────────────────────────────────────

fn reference_sim() -> Simulation {
    Simulation::new(reference_level().unwrap(), SimConfig::default())
}

fn walk_all(sim: &mut Simulation, dirs: &[Direction]) {
    for dir in dirs {
        assert_eq!(sim.walk(*dir), 1, "blocked walking {:?} from {}", dir, sim.player().position);
    }
}

// ── Field scenarios ────────────────────────────────────────────────────

#[test]
fn test_single_pocket_of_air_spreads_to_all_neighbors() {
    let grid = Grid::filled(3, 3, Cell::Floor).unwrap();
    let mut air = ScalarField::for_grid(&grid);
    air.set(Coord::new(1, 1), 9.0);

    diffuse(&grid, &mut air, &NullDiagnostics);

    for at in grid.coords() {
        let value = air.get(at);
        assert!(value > 0.0);
        if at != Coord::new(1, 1) {
            assert!(value < 9.0);
        }
    }
}

#[test]
fn test_generator_feeds_conduits_and_wall_cuts_them() {
    let plant = CellKind::PowerGenerator.pristine();
    let conduit = CellKind::Conduit.pristine();

    let mut grid = Grid::from_cells(4, 1, vec![plant, conduit, conduit, conduit]).unwrap();
    let mut energy = ScalarField::for_grid(&grid);
    propagate(&mut grid, &mut energy, &NullDiagnostics);
    let e = |x| energy.get(Coord::new(x, 0));
    assert!(e(1) > e(2) && e(2) > e(3) && e(3) > 0.0);

    let mut grid = Grid::from_cells(
        5,
        1,
        vec![plant, conduit, CellKind::Wall.pristine(), conduit, conduit],
    )
    .unwrap();
    let mut energy = ScalarField::for_grid(&grid);
    propagate(&mut grid, &mut energy, &NullDiagnostics);
    assert_eq!(energy.get(Coord::new(3, 0)), 0.0);
    assert_eq!(energy.get(Coord::new(4, 0)), 0.0);
}

#[test]
fn test_repaired_conduit_brings_the_air_plant_online() {
    let level = reference_level().unwrap();
    let mut grid = level.grid;
    let mut air = ScalarField::for_grid(&grid);
    let mut energy = ScalarField::for_grid(&grid);
    let beside_air_plant = Coord::new(35, 18);

    for _ in 0..5 {
        diffuse(&grid, &mut air, &NullDiagnostics);
        propagate(&mut grid, &mut energy, &NullDiagnostics);
    }
    assert_eq!(air.get(beside_air_plant), 0.0);
    assert_eq!(energy.get(Coord::new(37, 18)), 0.0);

    grid.set(Coord::new(38, 14), CellKind::Conduit.pristine());
    for _ in 0..5 {
        diffuse(&grid, &mut air, &NullDiagnostics);
        propagate(&mut grid, &mut energy, &NullDiagnostics);
    }
    assert!(grid.get(Coord::new(37, 18)).unwrap().stored_energy() > 5.0);
    assert!(air.get(beside_air_plant) > 0.0);
}

#[test]
fn test_fields_stay_non_negative_on_reference_ship() {
    let mut sim = reference_sim();
    for _ in 0..40 {
        sim.tick();
        assert!(sim.air().values().iter().all(|v| *v >= 0.0));
        assert!(sim.energy().values().iter().all(|v| *v >= 0.0));
    }
}

// ── Visibility ─────────────────────────────────────────────────────────

#[test]
fn test_airlock_door_blocks_sight_until_opened() {
    let mut sim = reference_sim();
    let outside = Coord::new(3, 6);
    assert!(sim.is_visible(sim.player().position));
    assert!(!cast_ray(sim.grid(), Coord::new(0, 6), outside));
    assert!(!sim.is_seen(outside));

    let mut prompter = ScriptedPrompter::new().with_direction(Direction::East);
    sim.act(Some(ActionKind::Activate), &mut prompter);
    assert!(sim.is_visible(outside));
    assert_eq!(sim.remembered_glyph(outside), Some(' '));
}

// ── Economy ────────────────────────────────────────────────────────────

#[test]
fn test_repair_without_steel_reports_shortage() {
    let mut saw_shortage = false;
    for seed in 0..50 {
        let level = parse_layout(&[".D"], Coord::new(0, 0)).unwrap();
        let mut sim = Simulation::new(level, SimConfig::default().with_seed(seed));
        let mut prompter = ScriptedPrompter::new().with_direction(Direction::East);

        let turns = sim.act(Some(ActionKind::Repair), &mut prompter);
        assert!(turns > 0);
        assert_eq!(sim.player().ledger.steel, 0);

        if sim.grid().get(Coord::new(1, 0)).is_some_and(Cell::is_damaged) {
            assert!(sim
                .messages()
                .latest()
                .is_some_and(|m| m.contains("run out of steel")));
            saw_shortage = true;
            break;
        }
    }
    assert!(saw_shortage);
}

#[test]
fn test_salvage_then_rebuild() {
    let level = parse_layout(&["..#"], Coord::new(0, 0)).unwrap();
    let mut sim = Simulation::new(level, SimConfig::default().with_seed(3));

    // menu entry 0 is Salvage
    let mut prompter = ScriptedPrompter::new().with_choice(0).with_direction(Direction::East);
    walk_all(&mut sim, &[Direction::East]);
    assert!(sim.act(None, &mut prompter) > 0);
    assert_eq!(sim.glyph_at(Coord::new(2, 0)), Some('.'));

    let steel = sim.player().ledger.steel;
    let mut prompter = ScriptedPrompter::new()
        .with_direction(Direction::East)
        .with_choice(0);
    let turns = sim.act(Some(ActionKind::Create), &mut prompter);
    assert!(turns > 0);
    assert!(sim.player().ledger.steel <= steel);
}

#[test]
fn test_same_seed_reproduces_the_economy() {
    let play = |seed| {
        let level = parse_layout(&["#.#", "#.#", "#.#"], Coord::new(1, 1)).unwrap();
        let mut sim = Simulation::new(level, SimConfig::default().with_seed(seed));
        for dir in [Direction::West, Direction::East, Direction::NorthWest] {
            let mut prompter = ScriptedPrompter::new().with_direction(dir);
            sim.act(Some(ActionKind::Salvage), &mut prompter);
        }
        (sim.player().ledger, sim.tick_count(), sim.drain_messages())
    };
    assert_eq!(play(9), play(9));
}

// ── Survival ───────────────────────────────────────────────────────────

#[test]
fn test_crossing_to_the_derelict() {
    let mut sim = reference_sim();

    let mut prompter = ScriptedPrompter::new().with_direction(Direction::East);
    assert_eq!(sim.act(Some(ActionKind::Activate), &mut prompter), 1);
    walk_all(&mut sim, &[Direction::East; 8]);
    walk_all(&mut sim, &[Direction::NorthEast, Direction::North]);
    assert_eq!(sim.player().position, Coord::new(9, 4));
    assert!(sim.player().air_left() < sim.player().air_capacity());

    let mut prompter = ScriptedPrompter::new().with_direction(Direction::East);
    assert_eq!(sim.act(Some(ActionKind::Activate), &mut prompter), 1);
    walk_all(&mut sim, &[Direction::East, Direction::East]);

    assert_eq!(sim.player().position, Coord::new(11, 4));
    assert!(sim.player().has_left_ship());
    assert!(!sim.is_dead());
    assert_eq!(sim.tick_count(), 14);
}

#[test]
fn test_low_air_is_fatal_and_final() {
    let level = parse_layout(&["E.   "], Coord::new(4, 0)).unwrap();
    let mut sim = Simulation::new(level, SimConfig::default());
    let mut last = sim.player().air_left();

    while !sim.is_dead() {
        sim.walk(Direction::Here);
        assert!(sim.player().air_left() < last);
        last = sim.player().air_left();
    }
    assert_eq!(sim.player().air_left(), 0.0);

    for _ in 0..20 {
        sim.tick();
    }
    assert!(sim.is_dead());
    assert_eq!(sim.walk(Direction::West), 0);
}

#[test]
fn test_breathing_at_the_entrance_keeps_air_full() {
    let mut sim = reference_sim();
    for _ in 0..30 {
        assert_eq!(sim.walk(Direction::Here), 1);
    }
    assert_eq!(sim.player().air_left(), sim.player().air_capacity());
}
