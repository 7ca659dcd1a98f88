use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// (row, col) offset of one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Facing angle for renderers, degrees clockwise from "right".
    pub fn angle_deg(self) -> i32 {
        match self {
            Self::Right => 0,
            Self::Down => 90,
            Self::Left => 180,
            Self::Up => 270,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Wall,
    Empty,
    Pip,
    PowerPip,
}

impl Cell {
    pub fn is_open(self) -> bool {
        self != Cell::Wall
    }

    pub fn is_collectible(self) -> bool {
        matches!(self, Cell::Pip | Cell::PowerPip)
    }

    pub fn glyph(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Empty => ' ',
            Cell::Pip => '.',
            Cell::PowerPip => 'o',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' => Some(Cell::Wall),
            ' ' => Some(Cell::Empty),
            '.' => Some(Cell::Pip),
            'o' => Some(Cell::PowerPip),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    pub fn step(self, dir: Direction) -> Pos {
        let (dr, dc) = dir.delta();
        Pos {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PlayerView {
    pub row: i32,
    pub col: i32,
    pub dir: Direction,
    #[serde(rename = "angleDeg")]
    pub angle_deg: i32,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ChaserView {
    pub row: i32,
    pub col: i32,
    pub dir: Direction,
    pub frightened: bool,
    pub color: [u8; 3],
}

/// Read-only view handed to renderers once per tick. Never feeds back into
/// the simulation.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub rows: i32,
    pub cols: i32,
    pub cells: Vec<String>,
    pub player: PlayerView,
    pub chasers: Vec<ChaserView>,
    pub score: i32,
    #[serde(rename = "powerActive")]
    pub power_active: bool,
    #[serde(rename = "powerMsLeft")]
    pub power_ms_left: u64,
    pub won: bool,
    pub lost: bool,
    pub paused: bool,
    #[serde(rename = "pipsLeft")]
    pub pips_left: usize,
}

#[cfg(test)]
mod tests {
    use super::{Cell, Direction, Pos};

    #[test]
    fn direction_parse_round_trips() {
        for dir in Direction::ALL {
            let name = match dir {
                Direction::Up => "up",
                Direction::Down => "down",
                Direction::Left => "left",
                Direction::Right => "right",
            };
            assert_eq!(Direction::parse_move(name), Some(dir));
        }
        assert_eq!(Direction::parse_move("diagonal"), None);
    }

    #[test]
    fn deltas_are_unit_and_exhaustive() {
        let mut seen = std::collections::HashSet::new();
        for dir in Direction::ALL {
            let (dr, dc) = dir.delta();
            assert_eq!(dr.abs() + dc.abs(), 1);
            seen.insert((dr, dc));
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn angles_match_render_table() {
        assert_eq!(Direction::Right.angle_deg(), 0);
        assert_eq!(Direction::Down.angle_deg(), 90);
        assert_eq!(Direction::Left.angle_deg(), 180);
        assert_eq!(Direction::Up.angle_deg(), 270);
    }

    #[test]
    fn cell_glyphs_round_trip() {
        for cell in [Cell::Wall, Cell::Empty, Cell::Pip, Cell::PowerPip] {
            assert_eq!(Cell::from_glyph(cell.glyph()), Some(cell));
        }
        assert_eq!(Cell::from_glyph('x'), None);
    }

    #[test]
    fn step_moves_one_cell() {
        let pos = Pos { row: 3, col: 4 };
        assert_eq!(pos.step(Direction::Up), Pos { row: 2, col: 4 });
        assert_eq!(pos.step(Direction::Right), Pos { row: 3, col: 5 });
    }
}
