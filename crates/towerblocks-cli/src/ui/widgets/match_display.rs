use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};
use towerblocks_ai::{Match, MatchState};
use towerblocks_engine::PlayerType;

use crate::ui::widgets::{BoardDisplay, PlayerPanel, color, style};

/// Both boards side by side, each with its panel on the outer edge.
#[derive(Debug)]
pub struct MatchDisplay<'a> {
    game: &'a Match,
}

impl<'a> MatchDisplay<'a> {
    pub fn new(game: &'a Match) -> Self {
        Self { game }
    }

    fn border_color(&self, player: PlayerType) -> Color {
        match self.game.state() {
            MatchState::Finished { winner } if winner == player => color::GREEN,
            MatchState::Finished { .. } => color::RED,
            MatchState::Paused => color::YELLOW,
            _ if self.game.is_recovering(player) => color::ORANGE,
            _ => color::WHITE,
        }
    }

    fn board_display(&self, player: PlayerType) -> BoardDisplay<'a> {
        let board = self.game.board(player);
        let title = match player {
            PlayerType::Human => "YOU",
            PlayerType::Ai => "AI",
        };
        let mut widget = BoardDisplay::new(board.grid()).block(
            Block::bordered()
                .title(Line::from(title).centered())
                .border_style(self.border_color(player))
                .style(style::DEFAULT),
        );
        if board.state().is_playing() {
            widget = widget.falling_piece(board.falling_piece());
            if player == PlayerType::Human {
                widget = widget.ghost(board.simulate_drop_position());
            }
        }
        widget
    }

    fn panel(&self, player: PlayerType) -> PlayerPanel<'a> {
        PlayerPanel::new(self.game, player).block(
            Block::bordered()
                .padding(Padding::horizontal(1))
                .border_style(self.border_color(player))
                .style(style::DEFAULT),
        )
    }
}

impl Widget for MatchDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &MatchDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let human_panel = self.panel(PlayerType::Human);
        let human_board = self.board_display(PlayerType::Human);
        let ai_board = self.board_display(PlayerType::Ai);
        let ai_panel = self.panel(PlayerType::Ai);

        let [human_panel_area, human_board_area, ai_board_area, ai_panel_area] =
            Layout::horizontal([
                Constraint::Length(human_panel.width()),
                Constraint::Length(human_board.width()),
                Constraint::Length(ai_board.width()),
                Constraint::Length(ai_panel.width()),
            ])
            .flex(Flex::Center)
            .spacing(1)
            .areas(area);

        let panel_height = Constraint::Length(human_panel.height());
        let board_height = Constraint::Length(human_board.height());
        let [human_panel_area] = Layout::vertical([panel_height]).areas(human_panel_area);
        let [ai_panel_area] = Layout::vertical([panel_height]).areas(ai_panel_area);
        let [human_board_area] = Layout::vertical([board_height]).areas(human_board_area);
        let [ai_board_area] = Layout::vertical([board_height]).areas(ai_board_area);

        human_panel.render(human_panel_area, buf);
        human_board.render(human_board_area, buf);
        ai_board.render(ai_board_area, buf);
        ai_panel.render(ai_panel_area, buf);

        let popup = match self.game.state() {
            MatchState::Playing => None,
            MatchState::Ready => Some((
                "READY".to_string(),
                Style::new().fg(color::BLACK).bg(color::WHITE),
            )),
            MatchState::Paused => Some((
                "PAUSED".to_string(),
                Style::new().fg(color::BLACK).bg(color::YELLOW),
            )),
            MatchState::Finished { winner } => {
                let text = match winner {
                    PlayerType::Human => "YOU WIN!!",
                    PlayerType::Ai => "YOU LOSE",
                };
                Some((
                    text.to_string(),
                    Style::new().fg(color::WHITE).bg(color::RED),
                ))
            }
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let width = human_board_area.width + ai_board_area.width + 1;
            let boards_area = Rect::new(
                human_board_area.x,
                human_board_area.y,
                width,
                human_board_area.height,
            );
            let area = boards_area.centered(Constraint::Length(width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
