use crate::constants::{
    center, CHASER_SCORE, CHASER_TURN_RATE, DEFAULT_COLS, DEFAULT_ROWS, FRIGHTENED_TURN_RATE,
    PIP_SCORE, POWER_DURATION_MS, POWER_PIP_SCORE, TICK_MS,
};
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Cell, ChaserView, Direction, PlayerView, Pos, Snapshot};

#[derive(Clone, Copy, Debug)]
struct PlayerInternal {
    pos: Pos,
    dir: Direction,
    pending_dir: Direction,
}

#[derive(Clone, Copy, Debug)]
struct ChaserInternal {
    pos: Pos,
    dir: Direction,
    frightened: bool,
    color: [u8; 3],
}

#[derive(Clone, Debug)]
pub struct GameOptions {
    pub rows: i32,
    pub cols: i32,
    pub power_duration_ms_override: Option<u64>,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            power_duration_ms_override: None,
        }
    }
}

/// The whole simulation. One instance owns its maze, entities, score and
/// terminal flags exclusively; everything advances through [`tick`].
///
/// [`tick`]: GameEngine::tick
#[derive(Clone, Debug)]
pub struct GameEngine {
    maze: Maze,
    rng: Rng,
    player: PlayerInternal,
    chasers: Vec<ChaserInternal>,
    score: i32,
    power_ms_left: u64,
    power_duration_ms: u64,
    won: bool,
    lost: bool,
    paused: bool,
    tick_counter: u64,
}

impl GameEngine {
    pub fn new(seed: u32, options: GameOptions) -> Self {
        let mut rng = Rng::new(seed);
        let maze = Maze::generate(options.rows, options.cols, &mut rng);
        Self::from_parts(
            maze,
            rng,
            options.power_duration_ms_override.unwrap_or(POWER_DURATION_MS),
        )
    }

    /// Builds an engine around an injected grid, e.g. a hand-written test
    /// layout. Entities spawn at the maze's designated cells.
    pub fn with_maze(maze: Maze, seed: u32) -> Self {
        Self::from_parts(maze, Rng::new(seed), POWER_DURATION_MS)
    }

    fn from_parts(maze: Maze, mut rng: Rng, power_duration_ms: u64) -> Self {
        let player = spawn_player(&maze);
        let chasers = spawn_chasers(&maze, &mut rng);
        Self {
            maze,
            rng,
            player,
            chasers,
            score: 0,
            power_ms_left: 0,
            power_duration_ms,
            won: false,
            lost: false,
            paused: false,
            tick_counter: 0,
        }
    }

    /// Discards all state and starts a fresh game on a newly generated maze.
    /// The RNG stream continues, so a reset sequence is still reproducible
    /// from the original seed.
    pub fn reset(&mut self) {
        self.maze = Maze::generate(self.maze.rows(), self.maze.cols(), &mut self.rng);
        self.player = spawn_player(&self.maze);
        self.chasers = spawn_chasers(&self.maze, &mut self.rng);
        self.score = 0;
        self.power_ms_left = 0;
        self.won = false;
        self.lost = false;
        self.paused = false;
        self.tick_counter = 0;
    }

    /// Queues a turn request. It persists until it becomes legal or is
    /// overridden by a newer request.
    pub fn set_pending_direction(&mut self, dir: Direction) {
        self.player.pending_dir = dir;
    }

    /// Freezes or unfreezes ticking. Ignored once the game is over.
    pub fn toggle_pause(&mut self) {
        if !self.is_over() {
            self.paused = !self.paused;
        }
    }

    /// Advances the simulation one step: player movement, chaser movement,
    /// collisions, collection, power decay, win check, in that order. No-op
    /// while paused or after the game ends.
    pub fn tick(&mut self) {
        if self.paused || self.is_over() {
            return;
        }
        self.tick_counter += 1;
        self.advance_player();
        self.advance_chasers();
        if self.resolve_collisions() {
            // Lost: the tick ends here so no collection or win check can
            // run against a terminal state.
            return;
        }
        let rearmed = self.collect();
        self.decay_power(rearmed);
        self.check_win();
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        self.won || self.lost
    }

    pub fn power_active(&self) -> bool {
        self.power_ms_left > 0
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player_pos(&self) -> Pos {
        self.player.pos
    }

    pub fn build_snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            rows: self.maze.rows(),
            cols: self.maze.cols(),
            cells: self.maze.render_rows(),
            player: PlayerView {
                row: self.player.pos.row,
                col: self.player.pos.col,
                dir: self.player.dir,
                angle_deg: self.player.dir.angle_deg(),
            },
            chasers: self
                .chasers
                .iter()
                .map(|chaser| ChaserView {
                    row: chaser.pos.row,
                    col: chaser.pos.col,
                    dir: chaser.dir,
                    frightened: chaser.frightened,
                    color: chaser.color,
                })
                .collect(),
            score: self.score,
            power_active: self.power_active(),
            power_ms_left: self.power_ms_left,
            won: self.won,
            lost: self.lost,
            paused: self.paused,
            pips_left: self.maze.remaining_pips(),
        }
    }

    fn advance_player(&mut self) {
        if self.maze.is_open(self.player.pos.step(self.player.pending_dir)) {
            self.player.dir = self.player.pending_dir;
        }
        let next = self.player.pos.step(self.player.dir);
        if self.maze.is_open(next) {
            self.player.pos = next;
        }
    }

    fn advance_chasers(&mut self) {
        for idx in 0..self.chasers.len() {
            let pos = self.chasers[idx].pos;
            let turn_rate = if self.chasers[idx].frightened {
                FRIGHTENED_TURN_RATE
            } else {
                CHASER_TURN_RATE
            };
            if self.rng.chance(turn_rate) {
                let legal: Vec<Direction> = Direction::ALL
                    .into_iter()
                    .filter(|dir| self.maze.is_open(pos.step(*dir)))
                    .collect();
                if !legal.is_empty() {
                    self.chasers[idx].dir = legal[self.rng.pick_index(legal.len())];
                }
            }
            let next = pos.step(self.chasers[idx].dir);
            if self.maze.is_open(next) {
                self.chasers[idx].pos = next;
            }
        }
    }

    /// Returns true when the game was just lost.
    fn resolve_collisions(&mut self) -> bool {
        let respawn = center(self.maze.rows(), self.maze.cols());
        for idx in 0..self.chasers.len() {
            if self.chasers[idx].pos != self.player.pos {
                continue;
            }
            if self.power_active() {
                self.chasers[idx].pos = respawn;
                self.chasers[idx].frightened = false;
                self.score += CHASER_SCORE;
            } else {
                self.lost = true;
                return true;
            }
        }
        false
    }

    /// Returns true when a power pip armed (or re-armed) power mode.
    fn collect(&mut self) -> bool {
        match self.maze.consume(self.player.pos) {
            Some(Cell::Pip) => {
                self.score += PIP_SCORE;
                false
            }
            Some(Cell::PowerPip) => {
                self.score += POWER_PIP_SCORE;
                self.power_ms_left = self.power_duration_ms;
                for chaser in &mut self.chasers {
                    chaser.frightened = true;
                }
                true
            }
            _ => false,
        }
    }

    /// A countdown armed this very tick keeps its full duration; otherwise
    /// it loses one tick interval, and power mode ends on reaching zero.
    fn decay_power(&mut self, rearmed: bool) {
        if self.power_ms_left == 0 || rearmed {
            return;
        }
        self.power_ms_left = self.power_ms_left.saturating_sub(TICK_MS);
        if self.power_ms_left == 0 {
            for chaser in &mut self.chasers {
                chaser.frightened = false;
            }
        }
    }

    fn check_win(&mut self) {
        if self.maze.remaining_pips() == 0 {
            self.won = true;
        }
    }
}

fn spawn_player(maze: &Maze) -> PlayerInternal {
    PlayerInternal {
        pos: maze.player_start(),
        dir: Direction::Right,
        pending_dir: Direction::Right,
    }
}

fn spawn_chasers(maze: &Maze, rng: &mut Rng) -> Vec<ChaserInternal> {
    maze.chaser_starts()
        .into_iter()
        .map(|pos| {
            let color = [
                rng.int(0, 255) as u8,
                rng.int(0, 255) as u8,
                rng.int(0, 255) as u8,
            ];
            ChaserInternal {
                pos,
                dir: Direction::ALL[rng.pick_index(Direction::ALL.len())],
                frightened: false,
                color,
            }
        })
        .collect()
}
