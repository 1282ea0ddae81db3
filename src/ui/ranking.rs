use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::RankingState;
use crate::leaderboard::ScoreEntry;

const ROW_WIDTH: usize = 36;

/// Whole-number score text; rounding small negatives never shows `-0`
pub fn display_score(score: f64) -> String {
    let rounded = score.round();
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

/// `"1. bob ........ 9500"` style row, padded by display width so wide names line up
pub fn format_row(rank: usize, entry: &ScoreEntry) -> String {
    let left = format!("{}. {}", rank, entry.player_name);
    let right = display_score(entry.score);
    let used = left.width() + right.width();
    let pad = ROW_WIDTH.saturating_sub(used).max(1);
    format!("{}{}{}", left, " ".repeat(pad), right)
}

pub fn render_ranking(
    ranking: &RankingState,
    submit_error: Option<&str>,
    player: &str,
    area: Rect,
    buf: &mut Buffer,
) {
    let block = Block::default()
        .borders(Borders::TOP)
        .title(Span::styled(
            "Ranking",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let mut lines: Vec<Line> = submit_error
        .map(|message| {
            Line::from(Span::styled(
                format!("Score not saved: {message}"),
                Style::default().fg(Color::Yellow),
            ))
        })
        .into_iter()
        .collect();

    let ranking_lines: Vec<Line> = match ranking {
        RankingState::Idle => Vec::new(),
        RankingState::Pending => vec![Line::from(Span::styled(
            "Loading scores...",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::SLOW_BLINK),
        ))],
        RankingState::Failed(message) => vec![Line::from(Span::styled(
            format!("Could not load ranking: {message}"),
            Style::default().fg(Color::Yellow),
        ))],
        RankingState::Loaded(entries) if entries.is_empty() => {
            vec![Line::from(Span::styled(
                "No scores yet",
                Style::default().add_modifier(Modifier::DIM),
            ))]
        }
        RankingState::Loaded(entries) => entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let style = if entry.player_name == player {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format_row(idx + 1, entry), style))
            })
            .collect(),
    };
    lines.extend(ranking_lines);

    Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_fixed_width() {
        let a = format_row(1, &ScoreEntry::new("bob", 9500.0));
        let b = format_row(10, &ScoreEntry::new("alice", -250.4));
        assert_eq!(a.width(), ROW_WIDTH);
        assert_eq!(b.width(), ROW_WIDTH);
        assert!(a.starts_with("1. bob"));
        assert!(a.ends_with("9500"));
        assert!(b.ends_with("-250"));
    }

    #[test]
    fn long_names_still_keep_a_gap() {
        let name = "x".repeat(50);
        let row = format_row(2, &ScoreEntry::new(name, 1.0));
        assert!(row.ends_with(" 1"));
    }

    #[test]
    fn render_does_not_panic_in_tiny_areas() {
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        let ranking = RankingState::Loaded(vec![ScoreEntry::new("bob", 9500.0)]);
        render_ranking(&ranking, None, "bob", area, &mut buf);
    }

    #[test]
    fn near_zero_scores_print_as_zero() {
        assert_eq!(display_score(-0.4), "0");
        assert_eq!(display_score(0.0), "0");
        assert_eq!(display_score(-0.6), "-1");
        assert_eq!(display_score(9499.5), "9500");
        assert!(format_row(1, &ScoreEntry::new("bob", -0.3)).ends_with(" 0"));
    }

    fn rendered(ranking: &RankingState, submit_error: Option<&str>) -> String {
        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);
        render_ranking(ranking, submit_error, "alice", area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn submit_error_is_shown_above_the_ranking() {
        let ranking = RankingState::Loaded(vec![ScoreEntry::new("bob", 9500.0)]);
        let text = rendered(&ranking, Some("Invalid input"));
        assert!(text.contains("Score not saved: Invalid input"));
        assert!(text.contains("1. bob"));

        assert!(!rendered(&ranking, None).contains("Score not saved"));
    }
}
