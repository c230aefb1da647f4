use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};
use towerblocks_ai::{Match, MatchConfig, MatchState, PlayerMovement};
use towerblocks_engine::PlayerType;

use crate::ui::widgets::MatchDisplay;

/// Human against the agent in the terminal.
#[derive(Debug)]
pub struct PlayApp {
    game: Match,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(config: MatchConfig) -> Self {
        let mut game = Match::new(config);
        game.start();
        Self {
            game,
            is_exiting: false,
        }
    }

    pub fn winner(&self) -> Option<PlayerType> {
        self.game.winner()
    }

    pub fn should_exit(&self) -> bool {
        self.is_exiting
    }

    pub fn step(&mut self, elapsed: Duration) {
        self.game.step(elapsed);
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let movement = match code {
            KeyCode::Left => Some(PlayerMovement::Left),
            KeyCode::Right => Some(PlayerMovement::Right),
            KeyCode::Down => Some(PlayerMovement::Down),
            KeyCode::Up => Some(PlayerMovement::Drop),
            KeyCode::Char('x') => Some(PlayerMovement::RotateClockwise),
            KeyCode::Char('p') => {
                self.game.toggle_pause();
                None
            }
            KeyCode::Char('q') => {
                self.is_exiting = true;
                None
            }
            _ => None,
        };
        if let Some(movement) = movement
            && let Err(err) = self.game.handle_player_movement(PlayerType::Human, movement)
        {
            tracing::trace!(%movement, %err, "move refused");
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let help_text = match self.game.state() {
            MatchState::Playing => {
                "Controls: ← → (Move) | ↓ (Soft Drop) | ↑ (Drop) | X (Rotate) | P (Pause) | Q (Quit)"
            }
            MatchState::Paused => "Controls: P (Resume) | Q (Quit)",
            MatchState::Ready | MatchState::Finished { .. } => "Controls: Q (Quit)",
        };
        let help_text = Text::from(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(22), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(MatchDisplay::new(&self.game), main_area);
        frame.render_widget(help_text, help_area);
    }
}
