use std::io::{self, Write};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use maze_chase::clock::TickClock;
use maze_chase::constants::TICK_MS;
use maze_chase::engine::{GameEngine, GameOptions};
use maze_chase::types::{Direction, Snapshot};

/// Play in the terminal. Arrow keys or hjkl to steer, p to pause, r to
/// restart, q to quit.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Maze seed. Defaults to a random seed.
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 15)]
    rows: i32,
    #[arg(long, default_value_t = 15)]
    cols: i32,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(|| {
        use rand::Rng as _;
        rand::rng().random()
    });
    let mut engine = GameEngine::new(
        seed,
        GameOptions {
            rows: cli.rows,
            cols: cli.cols,
            power_duration_ms_override: None,
        },
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    let result = run(&mut stdout, &mut engine, seed);
    execute!(stdout, Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    result
}

fn run(stdout: &mut io::Stdout, engine: &mut GameEngine, seed: u32) -> io::Result<()> {
    let mut clock = TickClock::new(Duration::from_millis(TICK_MS));
    draw(stdout, &engine.build_snapshot(), seed)?;

    loop {
        let wait = clock.time_until_due(Instant::now());
        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if !handle_key(key, engine, &mut clock) {
                        return Ok(());
                    }
                    draw(stdout, &engine.build_snapshot(), seed)?;
                }
                _ => {}
            }
        }
        if clock.tick_due(Instant::now()) {
            engine.tick();
            draw(stdout, &engine.build_snapshot(), seed)?;
        }
    }
}

/// Returns false when the player asked to quit.
fn handle_key(key: KeyEvent, engine: &mut GameEngine, clock: &mut TickClock) -> bool {
    match key.code {
        KeyCode::Char('q') => return false,
        KeyCode::Up | KeyCode::Char('k') => engine.set_pending_direction(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => engine.set_pending_direction(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => engine.set_pending_direction(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => engine.set_pending_direction(Direction::Right),
        KeyCode::Char('p') | KeyCode::Esc => {
            let was_paused = engine.is_paused();
            engine.toggle_pause();
            if was_paused && !engine.is_paused() {
                clock.restart(Instant::now());
            }
        }
        KeyCode::Char('r') => {
            engine.reset();
            clock.restart(Instant::now());
        }
        _ => {}
    }
    true
}

fn draw(stdout: &mut io::Stdout, snapshot: &Snapshot, seed: u32) -> io::Result<()> {
    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0), ResetColor)?;

    // Two columns per cell keeps the aspect ratio roughly square.
    for (row, line) in snapshot.cells.iter().enumerate() {
        queue!(stdout, MoveTo(0, row as u16))?;
        for glyph in line.chars() {
            let (text, color) = match glyph {
                '#' => ("##", Color::DarkBlue),
                '.' => (". ", Color::White),
                'o' => ("o ", Color::Yellow),
                _ => ("  ", Color::Reset),
            };
            queue!(stdout, SetForegroundColor(color), Print(text))?;
        }
    }

    for chaser in &snapshot.chasers {
        let color = if chaser.frightened {
            Color::Cyan
        } else {
            Color::Rgb {
                r: chaser.color[0],
                g: chaser.color[1],
                b: chaser.color[2],
            }
        };
        queue!(
            stdout,
            MoveTo(chaser.col as u16 * 2, chaser.row as u16),
            SetForegroundColor(color),
            Print("M ")
        )?;
    }

    queue!(
        stdout,
        MoveTo(snapshot.player.col as u16 * 2, snapshot.player.row as u16),
        SetForegroundColor(Color::Yellow),
        Print("C ")
    )?;

    let hud_row = snapshot.rows as u16 + 1;
    queue!(
        stdout,
        MoveTo(0, hud_row),
        ResetColor,
        Print(format!(
            "score {:>6}   pips left {:>3}   seed {}",
            snapshot.score, snapshot.pips_left, seed
        ))
    )?;
    let status = if snapshot.won {
        "you win! r to play again, q to quit"
    } else if snapshot.lost {
        "caught! r to retry, q to quit"
    } else if snapshot.paused {
        "paused, p to resume"
    } else if snapshot.power_active {
        "power mode!"
    } else {
        "arrows/hjkl move, p pause, r restart, q quit"
    };
    queue!(stdout, MoveTo(0, hud_row + 1), Clear(ClearType::CurrentLine))?;
    if snapshot.power_active && !snapshot.won && !snapshot.lost {
        queue!(
            stdout,
            SetForegroundColor(Color::Cyan),
            Print(format!("{status} {}ms", snapshot.power_ms_left)),
            ResetColor
        )?;
    } else {
        queue!(stdout, Print(status))?;
    }

    stdout.flush()
}
