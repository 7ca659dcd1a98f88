use std::collections::VecDeque;

use crate::constants::{chaser_starts, player_start, CHASER_COUNT, PIP_RATE, POWER_PIP_COUNT};
use crate::rng::Rng;
use crate::types::{Cell, Direction, Pos};

/// The game grid plus its designated spawn cells. Cells only ever transition
/// `Pip`/`PowerPip` -> `Empty` after generation, so the reachability
/// guarantee established here holds for the lifetime of the maze.
#[derive(Clone, Debug)]
pub struct Maze {
    rows: i32,
    cols: i32,
    cells: Vec<Vec<Cell>>,
    player_start: Pos,
    chaser_starts: [Pos; CHASER_COUNT],
}

impl Maze {
    /// Generates a random maze. Every non-wall cell of the result is
    /// reachable from the player start.
    ///
    /// Borders are walls, each interior cell is a pip with probability
    /// `PIP_RATE`, the spawn cells are forced open, then a flood fill from
    /// the player start walls off everything it cannot reach. Finally up to
    /// `POWER_PIP_COUNT` of the surviving pips are upgraded to power pips.
    pub fn generate(rows: i32, cols: i32, rng: &mut Rng) -> Maze {
        let rows = rows.max(3);
        let cols = cols.max(3);
        let mut cells = vec![vec![Cell::Wall; cols as usize]; rows as usize];

        for row in 1..rows - 1 {
            for col in 1..cols - 1 {
                cells[row as usize][col as usize] = if rng.chance(PIP_RATE) {
                    Cell::Pip
                } else {
                    Cell::Wall
                };
            }
        }

        let start = player_start();
        let spawns = chaser_starts(rows, cols);
        for pos in std::iter::once(start).chain(spawns) {
            if pos.row > 0 && pos.row < rows - 1 && pos.col > 0 && pos.col < cols - 1 {
                cells[pos.row as usize][pos.col as usize] = Cell::Pip;
            }
        }

        let mut maze = Maze {
            rows,
            cols,
            cells,
            player_start: start,
            chaser_starts: spawns,
        };

        let reachable = maze.reachable_from(start);
        for row in 0..rows {
            for col in 0..cols {
                let pos = Pos { row, col };
                if maze.cell(pos).is_collectible() && !reachable[row as usize][col as usize] {
                    maze.cells[row as usize][col as usize] = Cell::Wall;
                }
            }
        }

        maze.place_power_pips(rng);
        maze
    }

    /// Builds a maze from glyph rows (`#`, `.`, `o`, space). Used to inject
    /// hand-written grids in tests and tools. Panics on malformed input.
    pub fn parse(rows: &[&str]) -> Maze {
        assert!(!rows.is_empty(), "invariant violation: empty maze layout");
        let cols = rows[0].chars().count();
        let cells: Vec<Vec<Cell>> = rows
            .iter()
            .map(|line| {
                assert_eq!(
                    line.chars().count(),
                    cols,
                    "invariant violation: ragged maze layout"
                );
                line.chars()
                    .map(|glyph| {
                        Cell::from_glyph(glyph).unwrap_or_else(|| {
                            panic!("invariant violation: unknown maze glyph {glyph:?}")
                        })
                    })
                    .collect()
            })
            .collect();

        Maze {
            rows: rows.len() as i32,
            cols: cols as i32,
            cells,
            player_start: player_start(),
            chaser_starts: chaser_starts(rows.len() as i32, cols as i32),
        }
    }

    fn place_power_pips(&mut self, rng: &mut Rng) {
        let mut candidates: Vec<Pos> = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let pos = Pos { row, col };
                if self.cell(pos) == Cell::Pip {
                    candidates.push(pos);
                }
            }
        }
        for _ in 0..POWER_PIP_COUNT {
            if candidates.is_empty() {
                break;
            }
            let idx = rng.pick_index(candidates.len());
            let pos = candidates.swap_remove(idx);
            self.cells[pos.row as usize][pos.col as usize] = Cell::PowerPip;
        }
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn player_start(&self) -> Pos {
        self.player_start
    }

    pub fn chaser_starts(&self) -> [Pos; CHASER_COUNT] {
        self.chaser_starts
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    pub fn cell(&self, pos: Pos) -> Cell {
        assert!(
            self.in_bounds(pos),
            "invariant violation: cell ({}, {}) outside {}x{} maze",
            pos.row,
            pos.col,
            self.rows,
            self.cols
        );
        self.cells[pos.row as usize][pos.col as usize]
    }

    pub fn set_cell(&mut self, pos: Pos, cell: Cell) {
        assert!(
            self.in_bounds(pos),
            "invariant violation: cell ({}, {}) outside {}x{} maze",
            pos.row,
            pos.col,
            self.rows,
            self.cols
        );
        self.cells[pos.row as usize][pos.col as usize] = cell;
    }

    /// Open means an entity may stand there. Out of bounds counts as closed
    /// so movement legality never indexes outside the grid.
    pub fn is_open(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.cell(pos).is_open()
    }

    /// Consumes a collectible at `pos`, returning what was there.
    pub fn consume(&mut self, pos: Pos) -> Option<Cell> {
        let cell = self.cell(pos);
        if cell.is_collectible() {
            self.cells[pos.row as usize][pos.col as usize] = Cell::Empty;
            Some(cell)
        } else {
            None
        }
    }

    pub fn remaining_pips(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_collectible())
            .count()
    }

    /// BFS over non-wall cells, 4-directional.
    pub fn reachable_from(&self, start: Pos) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.cols as usize]; self.rows as usize];
        if !self.is_open(start) {
            return seen;
        }
        let mut queue = VecDeque::new();
        seen[start.row as usize][start.col as usize] = true;
        queue.push_back(start);
        while let Some(pos) = queue.pop_front() {
            for dir in Direction::ALL {
                let next = pos.step(dir);
                if !self.is_open(next) {
                    continue;
                }
                let slot = &mut seen[next.row as usize][next.col as usize];
                if !*slot {
                    *slot = true;
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    pub fn render_rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.glyph()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    #[test]
    fn borders_are_always_walls() {
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let maze = Maze::generate(15, 15, &mut rng);
            for row in 0..maze.rows() {
                for col in 0..maze.cols() {
                    if row == 0 || col == 0 || row == maze.rows() - 1 || col == maze.cols() - 1 {
                        assert_eq!(maze.cell(Pos { row, col }), Cell::Wall);
                    }
                }
            }
        }
    }

    #[test]
    fn every_open_cell_is_reachable_from_start() {
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let maze = Maze::generate(15, 15, &mut rng);
            let reachable = maze.reachable_from(maze.player_start());
            for row in 0..maze.rows() {
                for col in 0..maze.cols() {
                    let pos = Pos { row, col };
                    assert_eq!(
                        maze.cell(pos).is_open(),
                        reachable[row as usize][col as usize],
                        "seed={seed}, pos=({row},{col})"
                    );
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let mut a = Rng::new(424_242);
        let mut b = Rng::new(424_242);
        let first = Maze::generate(15, 15, &mut a);
        let second = Maze::generate(15, 15, &mut b);
        assert_eq!(first.render_rows(), second.render_rows());
    }

    #[test]
    fn four_power_pips_when_enough_pips_exist() {
        for seed in 0..100u32 {
            let mut rng = Rng::new(seed);
            let maze = Maze::generate(15, 15, &mut rng);
            let power = maze
                .cells
                .iter()
                .flatten()
                .filter(|cell| **cell == Cell::PowerPip)
                .count();
            assert_eq!(power, POWER_PIP_COUNT, "seed={seed}");
        }
    }

    #[test]
    fn player_start_survives_generation() {
        for seed in 0..100u32 {
            let mut rng = Rng::new(seed);
            let maze = Maze::generate(15, 15, &mut rng);
            assert!(maze.cell(maze.player_start()).is_open(), "seed={seed}");
        }
    }

    #[test]
    fn tiny_maze_generates_without_panic() {
        let mut rng = Rng::new(1);
        let maze = Maze::generate(3, 3, &mut rng);
        // Single interior cell: forced open, upgraded to a power pip.
        assert_eq!(maze.cell(Pos { row: 1, col: 1 }), Cell::PowerPip);
        assert_eq!(maze.remaining_pips(), 1);
    }

    #[test]
    fn parse_and_render_round_trip() {
        let layout = ["#####", "#.o #", "#####"];
        let maze = Maze::parse(&layout);
        assert_eq!(maze.rows(), 3);
        assert_eq!(maze.cols(), 5);
        assert_eq!(maze.cell(Pos { row: 1, col: 2 }), Cell::PowerPip);
        assert_eq!(maze.render_rows(), layout);
    }

    #[test]
    fn consume_only_touches_collectibles() {
        let mut maze = Maze::parse(&["#####", "#. o#", "#####"]);
        assert_eq!(maze.consume(Pos { row: 1, col: 1 }), Some(Cell::Pip));
        assert_eq!(maze.consume(Pos { row: 1, col: 1 }), None);
        assert_eq!(maze.consume(Pos { row: 1, col: 2 }), None);
        assert_eq!(maze.consume(Pos { row: 1, col: 3 }), Some(Cell::PowerPip));
        assert_eq!(maze.remaining_pips(), 0);
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn out_of_bounds_cell_access_fails_fast() {
        let maze = Maze::parse(&["###", "#.#", "###"]);
        maze.cell(Pos { row: 5, col: 1 });
    }
}
