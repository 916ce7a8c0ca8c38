//! Plain terminal front end: draws snapshots, turns keys and clicks into commands.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use tokio::sync::mpsc;

use tetrecs::core::{GameSnapshot, LeaderboardEntry, PieceSnapshot};
use tetrecs::engine::{EngineCommand, EngineHandle};
use tetrecs::input::{handle_key_event, should_quit};
use tetrecs::types::{CURSOR_SENTINEL, EMPTY};

const BOARD_X: u16 = 2;
const BOARD_Y: u16 = 2;
const CELL_W: u16 = 3;
const SIDE_X: u16 = 24;

/// Raw mode and alternate screen for as long as it lives
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            ResetColor,
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Run until the engine stops; returns the final snapshot
pub async fn run(mut engine: EngineHandle) -> Result<GameSnapshot> {
    let _guard = TerminalGuard::enter()?;
    let mut input_rx = spawn_input_reader();
    let mut snapshots = engine.subscribe_snapshot();
    let mut leaderboard = engine.subscribe_leaderboard();
    let mut stdout = io::stdout();

    draw(&mut stdout, &engine.snapshot(), &engine.leaderboard())?;

    // Once the engine stops, the last screen stays up until a quit key.
    let mut stopped = false;
    loop {
        tokio::select! {
            Some(ev) = input_rx.recv() => match command_for(&ev) {
                Some(EngineCommand::Cancel) if stopped => break,
                Some(cmd) if !stopped => {
                    engine.send(cmd);
                }
                _ => {}
            },
            event = engine.next_event(), if !stopped => {
                if event.is_none() {
                    stopped = true;
                    draw(&mut stdout, &engine.snapshot(), &engine.leaderboard())?;
                }
            }
            Ok(()) = snapshots.changed() => {
                let snap = snapshots.borrow_and_update().clone();
                draw(&mut stdout, &snap, &leaderboard.borrow())?;
            }
            Ok(()) = leaderboard.changed() => {
                let board = leaderboard.borrow_and_update().clone();
                draw(&mut stdout, &engine.snapshot(), &board)?;
            }
            else => break,
        }
    }

    let last = engine.snapshot();
    engine.shutdown().await;
    Ok(last)
}

/// Blocking crossterm reads on their own thread
fn spawn_input_reader() -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || loop {
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Terminal read failed: {}", e);
                    break;
                }
            },
            Ok(false) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(e) => {
                log::error!("Terminal poll failed: {}", e);
                break;
            }
        }
    });
    rx
}

fn command_for(ev: &Event) -> Option<EngineCommand> {
    match ev {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            if should_quit(*key) {
                Some(EngineCommand::Cancel)
            } else {
                handle_key_event(*key).map(EngineCommand::Action)
            }
        }
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            cell_at(mouse.column, mouse.row).map(|(x, y)| EngineCommand::PlaceAt { x, y })
        }
        _ => None,
    }
}

/// Board cell under a terminal position
fn cell_at(column: u16, row: u16) -> Option<(i32, i32)> {
    if column < BOARD_X || row < BOARD_Y {
        return None;
    }
    let x = (column - BOARD_X) / CELL_W;
    let y = row - BOARD_Y;
    Some((i32::from(x), i32::from(y)))
}

fn color_for(value: u8) -> Color {
    const PALETTE: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
    ];
    PALETTE[usize::from(value) % PALETTE.len()]
}

fn draw_cell(out: &mut impl Write, value: u8) -> io::Result<()> {
    match value {
        EMPTY => queue!(out, Print(" . ")),
        CURSOR_SENTINEL => queue!(out, SetForegroundColor(Color::White), Print("[ ]"), ResetColor),
        v => queue!(out, SetForegroundColor(color_for(v)), Print("[#]"), ResetColor),
    }
}

fn draw_piece(out: &mut impl Write, x: u16, y: u16, label: &str, piece: Option<&PieceSnapshot>) -> io::Result<()> {
    queue!(out, cursor::MoveTo(x, y), Print(label))?;
    let Some(piece) = piece else {
        return queue!(out, cursor::MoveTo(x, y + 1), Print("(waiting)"));
    };
    queue!(out, Print(" "), Print(piece.name))?;
    for row in 0..3 {
        queue!(out, cursor::MoveTo(x, y + 1 + row as u16))?;
        for col in 0..3 {
            let v = if piece.blocks[col][row] != 0 { piece.value } else { EMPTY };
            draw_cell(out, v)?;
        }
    }
    Ok(())
}

fn draw(out: &mut impl Write, snap: &GameSnapshot, board: &[LeaderboardEntry]) -> io::Result<()> {
    queue!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(BOARD_X, 0), Print("TetrECS"))?;

    for y in 0..snap.rows {
        queue!(out, cursor::MoveTo(BOARD_X, BOARD_Y + y as u16))?;
        for x in 0..snap.cols {
            draw_cell(out, snap.cell(x, y).unwrap_or(EMPTY))?;
        }
    }

    let stats = [
        format!("Score      {}", snap.score),
        format!("High score {}", snap.high_score),
        format!("Level      {}", snap.level),
        format!("Lives      {}", snap.lives),
        format!("Multiplier x{}", snap.multiplier),
        format!("Turn       {}s", snap.timer_delay_ms / 1000),
    ];
    for (i, line) in stats.iter().enumerate() {
        queue!(out, cursor::MoveTo(SIDE_X, BOARD_Y + i as u16), Print(line))?;
    }

    let pieces_y = BOARD_Y + snap.rows as u16 + 1;
    draw_piece(out, BOARD_X, pieces_y, "Current", snap.current.as_ref())?;
    draw_piece(out, SIDE_X, pieces_y, "Next", snap.following.as_ref())?;

    if !board.is_empty() {
        let top = pieces_y + 5;
        queue!(out, cursor::MoveTo(BOARD_X, top), Print("Leaderboard"))?;
        for (i, entry) in board.iter().enumerate() {
            queue!(
                out,
                cursor::MoveTo(BOARD_X, top + 1 + i as u16),
                Print(format!("{:<12} {:>7} {}", entry.name, entry.score, entry.status))
            )?;
        }
    }

    let footer = if snap.is_ended() {
        "Game over - press Esc"
    } else {
        "Arrows move  Enter place  Q/E rotate  Space swap  Esc quit"
    };
    queue!(out, cursor::MoveTo(BOARD_X, 1), Print(footer))?;
    out.flush()
}
