use crate::types::Pos;

pub const TICK_MS: u64 = 150;

pub const DEFAULT_ROWS: i32 = 15;
pub const DEFAULT_COLS: i32 = 15;

pub const PIP_RATE: f32 = 0.7;
pub const POWER_PIP_COUNT: usize = 4;

pub const PIP_SCORE: i32 = 10;
pub const POWER_PIP_SCORE: i32 = 50;
pub const CHASER_SCORE: i32 = 200;

pub const CHASER_COUNT: usize = 4;
pub const POWER_DURATION_MS: u64 = 10_000;

// Probability per tick that a chaser re-rolls its direction.
pub const CHASER_TURN_RATE: f32 = 0.25;
pub const FRIGHTENED_TURN_RATE: f32 = 0.5;

pub fn player_start() -> Pos {
    Pos { row: 1, col: 1 }
}

/// The four chaser spawn cells: thirds of the grid crossed with each other.
/// On the default 15x15 grid these are (5,5), (5,10), (10,5), (10,10).
pub fn chaser_starts(rows: i32, cols: i32) -> [Pos; CHASER_COUNT] {
    let r1 = rows / 3;
    let r2 = 2 * rows / 3;
    let c1 = cols / 3;
    let c2 = 2 * cols / 3;
    [
        Pos { row: r1, col: c1 },
        Pos { row: r1, col: c2 },
        Pos { row: r2, col: c1 },
        Pos { row: r2, col: c2 },
    ]
}

/// Respawn target for caught chasers.
pub fn center(rows: i32, cols: i32) -> Pos {
    Pos {
        row: rows / 2,
        col: cols / 2,
    }
}
