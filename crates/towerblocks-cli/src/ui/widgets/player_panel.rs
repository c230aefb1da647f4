use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use towerblocks_ai::Match;
use towerblocks_engine::PlayerType;

use crate::ui::widgets::{piece_style, style};

/// Hit points, counters and the next shape of one player.
pub struct PlayerPanel<'a> {
    game: &'a Match,
    player: PlayerType,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PlayerPanel<'a> {
    pub fn new(game: &'a Match, player: PlayerType) -> Self {
        Self {
            game,
            player,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        18 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        u16::try_from(ROWS.len()).unwrap_or(u16::MAX)
            + super::block_vertical_margin(self.block.as_ref())
    }
}

type Value = &'static dyn Fn(&Match, PlayerType) -> String;

#[derive(Clone, Copy)]
enum Row {
    Empty,
    HitPoints,
    NextPiece,
    LabelValue(&'static str, Value),
}

const ROWS: &[Row] = &[
    Row::HitPoints,
    Row::Empty,
    Row::LabelValue("PIECES:", &|game, player| {
        game.board(player).stats().completed_pieces().to_string()
    }),
    Row::LabelValue("LINES:", &|game, player| {
        game.board(player).stats().total_cleared_lines().to_string()
    }),
    Row::LabelValue("JUNK:", &|game, player| {
        game.board(player).stats().junk_rows_received().to_string()
    }),
    Row::LabelValue("TOP-OUTS:", &|game, player| {
        game.board(player).stats().top_outs().to_string()
    }),
    Row::Empty,
    Row::NextPiece,
    Row::LabelValue("STATUS:", &|game, player| status(game, player).to_string()),
];

fn status(game: &Match, player: PlayerType) -> &'static str {
    if game.is_recovering(player) {
        "recover"
    } else if game.winner() == Some(player) {
        "winner"
    } else if game.board(player).state().is_playing() {
        "play"
    } else {
        "-"
    }
}

impl Widget for PlayerPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;
        let rows_areas =
            Layout::vertical((0..ROWS.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(ROWS.iter().copied(), rows_areas.iter().copied()) {
            match row {
                Row::Empty => {}
                Row::HitPoints => {
                    let hp = usize::from(self.game.hp(self.player));
                    let max_hp = usize::from(self.game.config().max_hp);
                    Line::from(vec![
                        Span::styled("HP ", style),
                        Span::styled("♥".repeat(hp), style::HP_FULL),
                        Span::styled("♡".repeat(max_hp.saturating_sub(hp)), style::HP_EMPTY),
                    ])
                    .left_aligned()
                    .render(area, buf);
                }
                Row::NextPiece => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled("NEXT:", style)
                        .left_aligned()
                        .render(label_area, buf);
                    if let Some(kind) = self.game.board(self.player).next_pieces().next() {
                        Line::from(vec![
                            Span::styled(kind.as_char().to_string(), style),
                            Span::raw(" "),
                            Span::styled("  ", piece_style(kind)),
                        ])
                        .right_aligned()
                        .render(value_area, buf);
                    }
                }
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value(self.game, self.player), style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use towerblocks_ai::{AgentConfig, MatchConfig};

    use super::*;

    fn started() -> Match {
        let mut game = Match::new(MatchConfig {
            agent: AgentConfig {
                seed: Some(5),
                ..AgentConfig::default()
            },
            ..MatchConfig::default()
        });
        game.start();
        game
    }

    #[test]
    fn test_status_labels() {
        let game = Match::new(MatchConfig::default());
        assert_eq!(status(&game, PlayerType::Human), "-");

        let game = started();
        assert_eq!(status(&game, PlayerType::Human), "play");
        assert_eq!(status(&game, PlayerType::Ai), "play");
    }

    #[test]
    fn test_renders_hit_points() {
        let game = started();
        let panel = PlayerPanel::new(&game, PlayerType::Human);
        let area = Rect::new(0, 0, panel.width(), panel.height());
        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf);

        let first_line: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert_eq!(first_line.trim_end(), "HP ♥♥♥♥♥♥♥");
    }
}
