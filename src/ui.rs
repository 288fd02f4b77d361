pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;
use wordrush::{
    metrics::{AccuracyRating, WpmRating},
    session::SessionSnapshot,
    Phase,
};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Words shown at once; the view flips to the next page when the cursor leaves it
const WORDS_PER_PAGE: usize = 36;

/// How a character of a word relates to what was typed for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Correct,
    Incorrect,
    /// Typed beyond the end of the target word
    Extra,
    /// Not typed (yet)
    Pending,
}

/// Pair each char of `target` with its outcome against `typed`, followed by
/// any extra typed chars.
pub fn mark_word(target: &str, typed: &str) -> Vec<(char, Mark)> {
    let mut marks = Vec::with_capacity(target.len().max(typed.len()));
    let mut target_chars = target.chars();
    let mut typed_chars = typed.chars();

    loop {
        match (target_chars.next(), typed_chars.next()) {
            (Some(t), Some(c)) if t == c => marks.push((t, Mark::Correct)),
            (Some(t), Some(_)) => marks.push((t, Mark::Incorrect)),
            (Some(t), None) => marks.push((t, Mark::Pending)),
            (None, Some(c)) => marks.push((c, Mark::Extra)),
            (None, None) => break,
        }
    }

    marks
}

pub fn page_start(word_index: usize) -> usize {
    word_index / WORDS_PER_PAGE * WORDS_PER_PAGE
}

struct Styles {
    bold: Style,
    correct: Style,
    incorrect: Style,
    extra: Style,
    missed: Style,
    upcoming: Style,
    cursor: Style,
    italic: Style,
}

impl Styles {
    fn new() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold = bold.add_modifier(Modifier::DIM);

        Self {
            bold,
            correct: bold.fg(Color::Green),
            incorrect: bold.fg(Color::Red),
            extra: Style::default().fg(Color::Red).add_modifier(Modifier::DIM),
            missed: dim_bold.add_modifier(Modifier::CROSSED_OUT),
            upcoming: dim_bold,
            cursor: dim_bold.add_modifier(Modifier::UNDERLINED),
            italic: Style::default().add_modifier(Modifier::ITALIC),
        }
    }
}

fn word_spans<'a>(snap: &SessionSnapshot<'_>, idx: usize, styles: &Styles) -> Vec<Span<'a>> {
    let target = snap.words[idx].as_str();
    let current = snap.cursor.word_index;

    if idx > current {
        return vec![Span::styled(target.to_string(), styles.upcoming)];
    }

    let typed = if idx == current {
        snap.input
    } else {
        snap.typed_words.get(&idx).map(String::as_str).unwrap_or("")
    };

    mark_word(target, typed)
        .into_iter()
        .enumerate()
        .map(|(pos, (c, mark))| {
            let style = match mark {
                Mark::Correct => styles.correct,
                Mark::Incorrect => styles.incorrect,
                Mark::Extra => styles.extra,
                Mark::Pending if idx == current && pos == snap.cursor.char_index => styles.cursor,
                Mark::Pending if idx == current => styles.upcoming,
                Mark::Pending => styles.missed,
            };
            Span::styled(c.to_string(), style)
        })
        .collect()
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::History => render_history(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let styles = Styles::new();
    let snap = app.session.snapshot();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // timer
            Constraint::Length(1), // padding
            Constraint::Min(3),    // words
            Constraint::Length(1), // live stats
            Constraint::Length(1), // legend
        ])
        .split(area);

    let timer_text = if snap.phase == Phase::NotStarted {
        format!(
            "{}   (←/→) {}",
            snap.seconds_remaining,
            app.session.duration()
        )
    } else {
        snap.seconds_remaining.to_string()
    };
    Paragraph::new(Span::styled(timer_text, styles.upcoming))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let start = page_start(snap.cursor.word_index);
    let end = (start + WORDS_PER_PAGE).min(snap.words.len());

    let mut spans = Vec::new();
    for idx in start..end {
        if idx > start {
            spans.push(Span::raw(" "));
        }
        spans.extend(word_spans(&snap, idx, &styles));
    }

    let page_width: usize = snap.words[start..end].iter().map(|w| w.width() + 1).sum();
    let words = Paragraph::new(Line::from(spans))
        .alignment(if page_width <= chunks[2].width as usize {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    words.render(chunks[2], buf);

    if snap.phase == Phase::Active {
        let live = app.session.live_metrics();
        Paragraph::new(Span::styled(
            format!("{} wpm   {}% acc", live.wpm, live.accuracy),
            styles.upcoming,
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    } else if snap.phase == Phase::NotStarted {
        let strip = match app.summary {
            Some(ref s) => format!(
                "best {} wpm   avg {} wpm   {} tests   (F2) history",
                s.best_wpm, s.avg_wpm, s.total_tests
            ),
            None => "no saved results yet   (F2) history".to_string(),
        };
        Paragraph::new(Span::styled(strip, styles.upcoming))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }

    Paragraph::new(Span::styled("(tab) restart / (esc)ape", styles.italic))
        .render(chunks[4], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let styles = Styles::new();
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // headline stats
            Constraint::Length(1), // ratings and char counts
            Constraint::Length(1), // comparison with saved history
            Constraint::Length(1), // status
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let Some(record) = app.session.result() else {
        Paragraph::new("no result").render(chunks[1], buf);
        return;
    };

    let samples = app.session.wpm_samples();
    let (overall_duration, highest_wpm) =
        charting::compute_chart_params(samples, record.duration_secs());
    let tuples: Vec<(f64, f64)> = samples.iter().copied().map(Into::into).collect();

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&tuples)];

    let (session_area, trend_area) = if app.trend.is_empty() {
        (chunks[0], None)
    } else {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(30)])
            .split(chunks[0]);
        (halves[0], Some(halves[1]))
    };

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", styles.bold),
                    Span::styled(charting::format_label(overall_duration), styles.bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", styles.bold),
                    Span::styled(charting::format_label(highest_wpm), styles.bold),
                ]),
        )
        .render(session_area, buf);

    if let Some(trend_area) = trend_area {
        render_trend(&app.trend, record.wpm(), trend_area, buf, &styles);
    }

    Paragraph::new(Span::styled(
        format!("{} wpm   {}% acc", record.wpm(), record.accuracy()),
        styles.bold,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} / {}   {}/{} chars in {}s",
            WpmRating::of(record.wpm()),
            AccuracyRating::of(record.accuracy()),
            record.correct_chars(),
            record.total_chars(),
            record.duration_secs()
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let comparison = match app.baseline {
        Some(ref b) => format!(
            "vs {} saved: best {} wpm   avg {} wpm   ({:+} wpm on avg)",
            b.total_tests,
            b.best_wpm,
            b.avg_wpm,
            i64::from(record.wpm()) - i64::from(b.avg_wpm)
        ),
        None => "first test, nothing saved to compare with".to_string(),
    };
    Paragraph::new(Span::styled(comparison, styles.upcoming))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    if let Some(ref status) = app.status {
        Paragraph::new(Span::styled(status.clone(), styles.upcoming))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    let legend = if app.saved {
        "(r)etry / (h)istory / (esc)ape"
    } else {
        "(s)ave / (r)etry / (h)istory / (esc)ape"
    };
    Paragraph::new(Span::styled(legend, styles.italic)).render(chunks[6], buf);
}

/// Saved wpm trend with the finished test as the last point
fn render_trend(previous: &[u32], current: u32, area: Rect, buf: &mut Buffer, styles: &Styles) {
    let (series, this_test) = charting::trend_series(previous, current);
    let this_test = [this_test];
    let x_max = this_test[0].0.max(2.0);
    let y_max = previous
        .iter()
        .copied()
        .chain([current])
        .max()
        .map_or(1.0, |m| f64::from(m).max(1.0));

    let datasets = vec![
        Dataset::default()
            .name("saved")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::Cyan))
            .graph_type(GraphType::Line)
            .data(&series),
        Dataset::default()
            .name("this")
            .marker(ratatui::symbols::Marker::Dot)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Scatter)
            .data(&this_test),
    ];

    Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("trend"))
        .x_axis(Axis::default().bounds([1.0, x_max]))
        .y_axis(
            Axis::default().bounds([0.0, y_max]).labels(vec![
                Span::styled("0", styles.bold),
                Span::styled(charting::format_label(y_max), styles.bold),
            ]),
        )
        .render(area, buf);
}

fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let styles = Styles::new();
    let table_rows = app.recent.len().min(8) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),              // summary
            Constraint::Min(5),                 // trend chart
            Constraint::Length(table_rows + 3), // recent results
            Constraint::Length(1),              // status
            Constraint::Length(1),              // legend
        ])
        .split(area);

    let legend = Paragraph::new(Span::styled("(b)ack / (x) clear / (esc)ape", styles.italic));

    let Some(ref summary) = app.summary else {
        Paragraph::new(Span::styled("no saved results yet", styles.upcoming))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
        if let Some(ref status) = app.status {
            Paragraph::new(status.clone()).render(chunks[3], buf);
        }
        legend.render(chunks[4], buf);
        return;
    };

    Paragraph::new(Span::styled(
        format!(
            "best {} wpm   avg {} wpm   best {}% acc   avg {}% acc   {} tests",
            summary.best_wpm,
            summary.avg_wpm,
            summary.best_accuracy,
            summary.avg_accuracy,
            summary.total_tests
        ),
        styles.bold,
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let (wpm_series, accuracy_series) = charting::history_series(&app.recent);
    let x_max = (app.recent.len() as f64).max(2.0);
    let y_max = f64::from(summary.best_wpm).max(100.0);

    let datasets = vec![
        Dataset::default()
            .name("wpm")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Line)
            .data(&wpm_series),
        Dataset::default()
            .name("acc %")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::Cyan))
            .graph_type(GraphType::Line)
            .data(&accuracy_series),
    ];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("test")
                .bounds([1.0, x_max])
                .labels(vec![
                    Span::styled("1", styles.bold),
                    Span::styled(charting::format_label(x_max), styles.bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::styled("0", styles.bold),
                    Span::styled(charting::format_label(y_max), styles.bold),
                ]),
        )
        .render(chunks[1], buf);

    let rows: Vec<Row> = app
        .recent
        .iter()
        .rev()
        .take(table_rows as usize)
        .map(|r| {
            Row::new(vec![
                Cell::from(r.completed_at().format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(format!("{} wpm", r.wpm())),
                Cell::from(format!("{}%", r.accuracy())),
                Cell::from(format!("{}s", r.duration_secs())),
            ])
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(6),
        ],
    )
    .header(Row::new(vec!["completed", "speed", "acc", "time"]).style(styles.bold.fg(Color::Yellow)))
    .block(Block::default().borders(Borders::ALL).title("recent"))
    .render(chunks[2], buf);

    if let Some(ref status) = app.status {
        Paragraph::new(status.clone()).render(chunks[3], buf);
    }
    legend.render(chunks[4], buf);
}
