//! Action resolver — dispatches Salvage/Repair/Create/Activate at a target.
//!
//! The resolver asks the input collaborator for whatever it still needs
//! (action, direction, build choice) through the [`Prompter`] trait. Every
//! prompt may be aborted; an abort unwinds the action before any ledger,
//! grid or RNG state is touched and costs zero turns.

use std::collections::VecDeque;

use crate::cells::{Cell, CellKind, CellOutcome};
use crate::economy::ActionContext;
use crate::grid::{Coord, Direction, Grid};

/// Interactive questions the core may ask. `None` means the player aborted.
pub trait Prompter {
    /// Pick a direction relative to the player.
    fn direction(&mut self) -> Option<Direction>;
    /// Yes/no question.
    fn confirm(&mut self, question: &str) -> Option<bool>;
    /// Pick one of `options` by index.
    fn choose(&mut self, title: &str, options: &[&str]) -> Option<usize>;
}

/// Replays canned answers in order. An exhausted queue answers as an abort.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    directions: VecDeque<Option<Direction>>,
    confirms: VecDeque<Option<bool>>,
    choices: VecDeque<Option<usize>>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, dir: Direction) -> Self {
        self.directions.push_back(Some(dir));
        self
    }

    pub fn with_confirm(mut self, answer: bool) -> Self {
        self.confirms.push_back(Some(answer));
        self
    }

    pub fn with_choice(mut self, index: usize) -> Self {
        self.choices.push_back(Some(index));
        self
    }

    /// Queue an aborted direction prompt.
    pub fn with_aborted_direction(mut self) -> Self {
        self.directions.push_back(None);
        self
    }

    /// Queue an aborted menu.
    pub fn with_aborted_choice(mut self) -> Self {
        self.choices.push_back(None);
        self
    }

    /// Every question and menu title asked so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// True once every queued answer has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.directions.is_empty() && self.confirms.is_empty() && self.choices.is_empty()
    }
}

impl Prompter for ScriptedPrompter {
    fn direction(&mut self) -> Option<Direction> {
        self.asked.push("direction".to_string());
        self.directions.pop_front().flatten()
    }

    fn confirm(&mut self, question: &str) -> Option<bool> {
        self.asked.push(question.to_string());
        self.confirms.pop_front().flatten()
    }

    fn choose(&mut self, title: &str, _options: &[&str]) -> Option<usize> {
        self.asked.push(title.to_string());
        self.choices.pop_front().flatten()
    }
}

/// Operator actions offered by the action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Salvage,
    Repair,
    Create,
    Activate,
}

impl ActionKind {
    /// Menu order.
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Salvage,
        ActionKind::Repair,
        ActionKind::Create,
        ActionKind::Activate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Salvage => "Salvage",
            ActionKind::Repair => "Repair",
            ActionKind::Create => "Create",
            ActionKind::Activate => "Activate",
        }
    }
}

/// Resolve one action from `origin`, returning the turns it consumed.
///
/// With `kind == None` the player is first asked to pick from the action
/// menu. Replacements are installed only when the cell operation produced
/// one, so a failed build leaves the grid untouched.
///
/// A positive turn count does not mean success: a Create or Repair that runs
/// short of materials still spends its sampled turns. Check the grid.
pub fn resolve(
    kind: Option<ActionKind>,
    grid: &mut Grid,
    origin: Coord,
    ctx: &mut ActionContext<'_>,
) -> u32 {
    let kind = match kind {
        Some(kind) => kind,
        None => {
            let names = ActionKind::ALL.map(ActionKind::name);
            match ctx
                .prompter
                .choose("Action", &names)
                .and_then(|i| ActionKind::ALL.get(i).copied())
            {
                Some(kind) => kind,
                None => return 0,
            }
        }
    };

    let Some(dir) = ctx.prompter.direction() else {
        return 0;
    };
    let target = origin.step(dir);
    let Some(cell) = grid.get_mut(target) else {
        ctx.messages.push("There is nothing there");
        return 0;
    };

    let outcome = match kind {
        ActionKind::Salvage => cell.salvage(ctx),
        ActionKind::Repair => cell.repair(ctx),
        ActionKind::Activate => cell.activate(ctx),
        ActionKind::Create => choose_and_build(ctx),
    };

    if let Some(replacement) = outcome.replacement {
        *cell = replacement;
    }
    ctx.diag.event(format_args!(
        "{} at {}: {} turns, now {:?}",
        kind.name(),
        target,
        outcome.turns,
        cell.kind()
    ));
    outcome.turns
}

fn choose_and_build(ctx: &mut ActionContext<'_>) -> CellOutcome {
    let names = CellKind::BUILDABLE.map(CellKind::name);
    match ctx
        .prompter
        .choose("Create", &names)
        .and_then(|i| CellKind::BUILDABLE.get(i).copied())
    {
        Some(kind) => Cell::create(kind, ctx),
        None => CellOutcome::nothing(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::NullDiagnostics;
    use crate::economy::Ledger;
    use crate::messages::MessageLog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Bench {
        grid: Grid,
        ledger: Ledger,
        rng: StdRng,
        messages: MessageLog,
    }

    impl Bench {
        fn new(steel: u32, copper: u32) -> Self {
            Self {
                grid: Grid::filled(3, 3, Cell::Floor).unwrap(),
                ledger: Ledger::new(steel, copper),
                rng: StdRng::seed_from_u64(11),
                messages: MessageLog::default(),
            }
        }

        fn run(&mut self, kind: Option<ActionKind>, prompter: &mut ScriptedPrompter) -> u32 {
            let mut ctx = ActionContext {
                ledger: &mut self.ledger,
                rng: &mut self.rng,
                prompter,
                messages: &mut self.messages,
                diag: &NullDiagnostics,
            };
            resolve(kind, &mut self.grid, Coord::new(1, 1), &mut ctx)
        }
    }

    #[test]
    fn test_aborted_menu_is_free() {
        let mut bench = Bench::new(5, 5);
        let before = bench.grid.clone();
        let mut prompter = ScriptedPrompter::new().with_aborted_choice();
        assert_eq!(bench.run(None, &mut prompter), 0);
        assert_eq!(bench.grid, before);
        assert_eq!(bench.ledger, Ledger::new(5, 5));
        assert!(bench.messages.is_empty());
    }

    #[test]
    fn test_aborted_direction_is_free() {
        let mut bench = Bench::new(5, 5);
        bench.grid.set(Coord::new(2, 1), CellKind::Wall.pristine());
        let before = bench.grid.clone();
        let mut prompter = ScriptedPrompter::new().with_aborted_direction();
        assert_eq!(bench.run(Some(ActionKind::Salvage), &mut prompter), 0);
        assert_eq!(bench.grid, before);
        assert_eq!(bench.ledger, Ledger::new(5, 5));
    }

    #[test]
    fn test_aborted_build_choice_spends_nothing() {
        let mut bench = Bench::new(50, 50);
        let before = bench.grid.clone();
        let mut prompter = ScriptedPrompter::new()
            .with_direction(Direction::East)
            .with_aborted_choice();
        assert_eq!(bench.run(Some(ActionKind::Create), &mut prompter), 0);
        assert_eq!(bench.grid, before);
        assert_eq!(bench.ledger, Ledger::new(50, 50));
    }

    #[test]
    fn test_out_of_bounds_target() {
        let mut bench = Bench::new(0, 0);
        bench.grid = Grid::filled(2, 2, Cell::Floor).unwrap();
        let mut prompter = ScriptedPrompter::new().with_direction(Direction::SouthEast);
        assert_eq!(bench.run(Some(ActionKind::Activate), &mut prompter), 0);
        assert_eq!(bench.messages.latest(), Some("There is nothing there"));
    }

    #[test]
    fn test_menu_selects_action() {
        let mut bench = Bench::new(0, 0);
        bench.grid.set(
            Coord::new(1, 0),
            Cell::Door {
                open: false,
                damaged: false,
            },
        );
        // index 3 is Activate
        let mut prompter = ScriptedPrompter::new()
            .with_choice(3)
            .with_direction(Direction::North);
        assert_eq!(bench.run(None, &mut prompter), 1);
        assert_eq!(
            bench.grid.get(Coord::new(1, 0)),
            Some(&Cell::Door {
                open: true,
                damaged: false
            })
        );
        assert_eq!(prompter.asked(), &["Action".to_string(), "direction".to_string()]);
    }

    #[test]
    fn test_jammed_door_does_not_toggle() {
        let mut bench = Bench::new(0, 0);
        let jammed = Cell::Door {
            open: false,
            damaged: true,
        };
        bench.grid.set(Coord::new(0, 1), jammed);
        let mut prompter = ScriptedPrompter::new().with_direction(Direction::West);
        assert_eq!(bench.run(Some(ActionKind::Activate), &mut prompter), 1);
        assert_eq!(bench.grid.get(Coord::new(0, 1)), Some(&jammed));
    }

    #[test]
    fn test_salvage_wall_leaves_floor() {
        let mut bench = Bench::new(0, 0);
        bench.grid.set(Coord::new(2, 1), CellKind::Wall.pristine());
        let mut prompter = ScriptedPrompter::new().with_direction(Direction::East);
        let turns = bench.run(Some(ActionKind::Salvage), &mut prompter);
        assert!((1..10).contains(&turns));
        assert_eq!(bench.grid.get(Coord::new(2, 1)), Some(&Cell::Floor));
        assert_eq!(bench.ledger.copper, 0);
    }

    #[test]
    fn test_declined_floor_salvage_is_free() {
        let mut bench = Bench::new(0, 0);
        let mut prompter = ScriptedPrompter::new()
            .with_direction(Direction::Here)
            .with_confirm(false);
        assert_eq!(bench.run(Some(ActionKind::Salvage), &mut prompter), 0);
        assert_eq!(bench.grid.get(Coord::new(1, 1)), Some(&Cell::Floor));
        assert_eq!(bench.ledger, Ledger::new(0, 0));
    }

    #[test]
    fn test_confirmed_floor_salvage_opens_to_space() {
        let mut bench = Bench::new(0, 0);
        let mut prompter = ScriptedPrompter::new()
            .with_direction(Direction::South)
            .with_confirm(true);
        assert!(bench.run(Some(ActionKind::Salvage), &mut prompter) >= 1);
        assert_eq!(bench.grid.get(Coord::new(1, 2)), Some(&Cell::EmptySpace));
    }

    #[test]
    fn test_repair_damaged_wall_without_steel() {
        let mut bench = Bench::new(0, 0);
        let mut saw_shortage = false;
        for _ in 0..50 {
            bench.grid.set(Coord::new(2, 1), CellKind::Wall.pristine().damaged());
            let mut prompter = ScriptedPrompter::new().with_direction(Direction::East);
            let turns = bench.run(Some(ActionKind::Repair), &mut prompter);
            assert!(turns > 0);
            assert_eq!(bench.ledger, Ledger::new(0, 0));
            if bench.grid.get(Coord::new(2, 1)).is_some_and(Cell::is_damaged) {
                assert!(bench
                    .messages
                    .latest()
                    .is_some_and(|m| m.contains("run out of steel")));
                saw_shortage = true;
                break;
            }
        }
        assert!(saw_shortage);
    }

    #[test]
    fn test_create_installs_when_affordable() {
        let mut bench = Bench::new(100, 100);
        bench.grid.set(Coord::new(1, 0), Cell::EmptySpace);
        // index 1 is Wall
        let mut prompter = ScriptedPrompter::new()
            .with_direction(Direction::North)
            .with_choice(1);
        let turns = bench.run(Some(ActionKind::Create), &mut prompter);
        assert!(turns >= 1);
        assert_eq!(
            bench.grid.get(Coord::new(1, 0)),
            Some(&CellKind::Wall.pristine())
        );
        assert!(bench.ledger.steel <= 100);
    }

    #[test]
    fn test_failed_create_installs_nothing() {
        let mut bench = Bench::new(0, 0);
        let mut saw_failure = false;
        for _ in 0..50 {
            bench.grid.set(Coord::new(1, 0), Cell::EmptySpace);
            // index 4 is Wall conduit, needs both metals
            let mut prompter = ScriptedPrompter::new()
                .with_direction(Direction::North)
                .with_choice(4);
            let turns = bench.run(Some(ActionKind::Create), &mut prompter);
            assert!(turns >= 1);
            if bench.grid.get(Coord::new(1, 0)) == Some(&Cell::EmptySpace) {
                assert!(bench
                    .messages
                    .latest()
                    .is_some_and(|m| m.contains("run out of")));
                saw_failure = true;
                break;
            }
        }
        assert!(saw_failure);
        assert_eq!(bench.ledger, Ledger::new(0, 0));
    }

    #[test]
    fn test_exhausted_script_aborts() {
        let mut prompter = ScriptedPrompter::new();
        assert!(prompter.is_exhausted());
        assert_eq!(prompter.direction(), None);
        assert_eq!(prompter.confirm("sure?"), None);
        assert_eq!(prompter.choose("menu", &["a"]), None);
    }
}
