pub mod ranking;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::app::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Start => render_start(self, area, buf),
            AppState::Playing => render_playing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn red_bold() -> Style {
    bold().fg(Color::Red)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn centered(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}

fn render_start(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled("Typing Game", red_bold())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter your name: ", dim()),
            Span::styled(app.name_input.clone(), red_bold()),
            Span::styled("_", red_bold().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
    ];

    if let Some(alert) = &app.alert {
        lines.push(Line::from(Span::styled(
            alert.clone(),
            bold().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "(enter) start game / (esc)ape",
        italic(),
    )));

    let height = lines.len() as u16;
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(centered(area, height), buf);
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let game = &app.game;
    let (typed, rest) = game.split_current();
    let total = game.questions().len();
    let caption = game
        .current_question()
        .map(|q| q.image_ref.clone())
        .unwrap_or_default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // question counter
            Constraint::Length(1),
            Constraint::Length(1), // prompt
            Constraint::Length(1), // caption
            Constraint::Length(1),
            Constraint::Length(1), // timer
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!("Question {} / {}", game.state.question_index + 1, total),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    // typed characters turn red, the rest stays white
    Paragraph::new(Line::from(vec![
        Span::styled(typed, red_bold()),
        Span::styled(rest, bold().fg(Color::White)),
    ]))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: false })
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(caption, dim().patch(italic())))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    Paragraph::new(Span::styled(
        format!(
            "{:.1}s   {} miss",
            game.elapsed_ms() as f64 / 1000.0,
            game.state.mistypes
        ),
        dim(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[6], buf);

    Paragraph::new(Span::styled("(esc) give up", italic())).render(chunks[8], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1),
            Constraint::Length(4), // summary
            Constraint::Length(1),
            Constraint::Min(3), // ranking
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("Result", red_bold()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if let Some(result) = &app.last_result {
        let summary = vec![
            Line::from(format!("Player: {}", result.player_name)),
            Line::from(vec![
                Span::raw("Time "),
                Span::styled(format!("{:.2}", result.elapsed_secs()), red_bold()),
                Span::raw(" seconds"),
            ]),
            Line::from(vec![
                Span::raw("Score: "),
                Span::styled(ranking::display_score(result.score), red_bold()),
            ]),
            Line::from(Span::styled(format!("{} mistyped keys", result.mistypes), dim())),
        ];
        Paragraph::new(summary)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    let player = app
        .last_result
        .as_ref()
        .map(|r| r.player_name.as_str())
        .unwrap_or_default();
    ranking::render_ranking(
        &app.ranking,
        app.submit_error.as_deref(),
        player,
        chunks[4],
        buf,
    );

    Paragraph::new(Span::styled("(n)ew game / (esc)ape", italic())).render(chunks[5], buf);
}
