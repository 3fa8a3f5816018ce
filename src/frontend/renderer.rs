//! 画面描画
//!
//! 上から文書領域・補完ウィンドウ・ステータスバー・インプットバーの順に並べる。

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::document::{self, PageRect};
use crate::error::ErrorLevel;
use crate::viewer::{ViewKind, Viewer, Viewport};

/// 各領域の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub document: Rect,
    pub completion: Rect,
    pub status: Rect,
    pub inputbar: Rect,
}

impl Areas {
    /// 文書領域の大きさ（ビューアのスクロール計算に使う）
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.document.width.max(1),
            height: self.document.height.max(1),
        }
    }
}

/// 画面を分割する
pub fn layout(area: Rect, viewer: &Viewer) -> Areas {
    let inputbar = viewer.inputbar();
    let completion_rows = viewer.completion().session().map_or(0, |session| {
        session
            .visible_range(viewer.settings().n_completion_items.max(0) as usize)
            .len()
    });
    let status_rows = u16::from(viewer.is_statusbar_visible());
    let inputbar_rows = u16::from(
        inputbar.is_visible() || inputbar.is_focused() || inputbar.notification().is_some(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(completion_rows.min(u16::MAX as usize) as u16),
            Constraint::Length(status_rows),
            Constraint::Length(inputbar_rows),
        ])
        .split(area);

    Areas {
        document: chunks[0],
        completion: chunks[1],
        status: chunks[2],
        inputbar: chunks[3],
    }
}

/// 1 フレーム分を描く
pub fn render(frame: &mut Frame<'_>, viewer: &Viewer) {
    let areas = layout(frame.area(), viewer);

    match viewer.view() {
        ViewKind::Document => render_page(frame, areas.document, viewer),
        ViewKind::Index => render_index(frame, areas.document, viewer),
        ViewKind::Info => render_info(frame, areas.document, viewer),
    }
    if areas.completion.height > 0 {
        render_completion(frame, areas.completion, viewer);
    }
    if areas.status.height > 0 {
        render_status_line(frame, areas.status, viewer);
    }
    if areas.inputbar.height > 0 {
        if let Some((x, y)) = render_inputbar(frame, areas.inputbar, viewer) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

fn page_style(viewer: &Viewer) -> Style {
    if viewer.settings().recolor {
        Style::default().fg(Color::Black).bg(Color::White)
    } else {
        Style::default()
    }
}

/// 現在ページを描く。検索結果の行には目印を付け、一致部分を反転する
fn render_page(frame: &mut Frame<'_>, area: Rect, viewer: &Viewer) {
    let style = page_style(viewer);
    let Some(opened) = viewer.document() else {
        frame.render_widget(Paragraph::new("").style(style), area);
        return;
    };

    let lines = match document::lock(&opened.engine) {
        Ok(engine) => engine.page_lines(opened.page).unwrap_or_default(),
        Err(err) => {
            log::error!("render: {}", err);
            Vec::new()
        }
    };

    let matches = viewer.search_state().matches_on(opened.page);
    let marker = viewer.settings().search_highlight;
    let top = opened.position.y.max(0.0) as usize;
    let left = opened.position.x.max(0.0) as usize;

    let rendered: Vec<Line<'static>> = lines
        .iter()
        .enumerate()
        .skip(top)
        .take(area.height as usize)
        .map(|(index, text)| page_line(index, text, left, matches, marker))
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(rendered).style(style), area);
}

fn page_line(
    index: usize,
    text: &str,
    left: usize,
    matches: &[PageRect],
    marker: char,
) -> Line<'static> {
    let on_line: Vec<&PageRect> = matches.iter().filter(|rect| rect.line == index).collect();
    let gutter = if on_line.is_empty() {
        "  ".to_string()
    } else {
        format!("{} ", marker)
    };

    let mut spans = vec![Span::styled(gutter, Style::default().fg(Color::Yellow))];
    let mut current = String::new();
    let mut current_hit = false;

    for (column, c) in text.chars().enumerate().skip(left) {
        let hit = on_line
            .iter()
            .any(|rect| (rect.start_column..rect.end_column).contains(&column));
        if hit != current_hit && !current.is_empty() {
            spans.push(match_span(std::mem::take(&mut current), current_hit));
        }
        current_hit = hit;
        current.push(c);
    }
    if !current.is_empty() {
        spans.push(match_span(current, current_hit));
    }
    Line::from(spans)
}

fn match_span(text: String, hit: bool) -> Span<'static> {
    if hit {
        Span::styled(text, Style::default().add_modifier(Modifier::REVERSED))
    } else {
        Span::raw(text)
    }
}

fn render_index(frame: &mut Frame<'_>, area: Rect, viewer: &Viewer) {
    let Some(index) = viewer.index() else {
        return;
    };
    let rows = index.rows();
    let selected = rows.iter().position(|row| row.selected).unwrap_or(0);
    let height = area.height as usize;
    let skip = selected.saturating_sub(height.saturating_sub(1));

    let lines: Vec<Line<'_>> = rows
        .iter()
        .skip(skip)
        .take(height)
        .map(|row| {
            let marker = match (row.has_children, row.expanded) {
                (true, true) => "- ",
                (true, false) => "+ ",
                _ => "  ",
            };
            let text = format!(
                "{}{}{}  {}",
                "  ".repeat(row.depth),
                marker,
                row.title,
                row.page + 1
            );
            let style = if row.selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::styled(text, style)
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_info(frame: &mut Frame<'_>, area: Rect, viewer: &Viewer) {
    let Some(opened) = viewer.document() else {
        return;
    };
    let metadata = match document::lock(&opened.engine) {
        Ok(engine) => engine.metadata(),
        Err(err) => {
            log::error!("render: {}", err);
            Vec::new()
        }
    };

    let width = metadata
        .iter()
        .map(|(name, _)| UnicodeWidthStr::width(name.as_str()))
        .max()
        .unwrap_or(0);
    let lines: Vec<Line<'_>> = metadata
        .into_iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<width$}  ", name, width = width),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(value),
            ])
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_completion(frame: &mut Frame<'_>, area: Rect, viewer: &Viewer) {
    let Some(session) = viewer.completion().session() else {
        return;
    };
    let range = session.visible_range(viewer.settings().n_completion_items.max(0) as usize);
    let current = session.current();
    // コマンド名は短いので説明の列を詰める
    let width = if session.is_command_mode() { 16 } else { 30 };

    let lines: Vec<Line<'_>> = session.rows()[range.clone()]
        .iter()
        .zip(range)
        .map(|(row, index)| {
            let style = if row.is_group {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if Some(index) == current {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            let text = match &row.description {
                Some(description) => format!("{:<width$} {}", row.value, description, width = width),
                None => row.value.clone(),
            };
            Line::styled(text, style)
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines), area);
}

fn notification_line(viewer: &Viewer) -> Option<Line<'static>> {
    let notification = viewer.inputbar().notification()?;
    let color = match notification.level {
        ErrorLevel::Info => Color::Green,
        ErrorLevel::Warning => Color::Yellow,
        ErrorLevel::Error | ErrorLevel::Fatal => Color::Red,
    };
    Some(Line::styled(
        notification.message.clone(),
        Style::default().fg(color),
    ))
}

fn render_status_line(frame: &mut Frame<'_>, area: Rect, viewer: &Viewer) {
    let style = Style::default().fg(Color::White).bg(Color::DarkGray);

    // 入力中の通知はステータスバー側に出す
    if viewer.inputbar().is_focused() {
        if let Some(line) = notification_line(viewer) {
            frame.render_widget(Paragraph::new(line).style(style), area);
            return;
        }
    }

    let status = viewer.status_line();
    let left = format!(" {} {}", status.file, status.buffer);
    let right = format!("{} ", status.state);
    let padding = (area.width as usize)
        .saturating_sub(UnicodeWidthStr::width(left.as_str()))
        .saturating_sub(UnicodeWidthStr::width(right.as_str()));
    let text = format!("{}{}{}", left, " ".repeat(padding), right);

    frame.render_widget(Paragraph::new(text).style(style), area);
}

/// インプットバーを描き、入力中ならカーソル位置を返す
fn render_inputbar(frame: &mut Frame<'_>, area: Rect, viewer: &Viewer) -> Option<(u16, u16)> {
    let inputbar = viewer.inputbar();
    frame.render_widget(Clear, area);

    if inputbar.is_focused() {
        let text = inputbar.text();
        let before: String = text.chars().take(inputbar.cursor()).collect();
        let column = UnicodeWidthStr::width(before.as_str()).min(area.width.saturating_sub(1) as usize);
        frame.render_widget(
            Paragraph::new(text.to_string()).style(Style::default().fg(Color::Cyan)),
            area,
        );
        return Some((area.x + column as u16, area.y));
    }

    if let Some(line) = notification_line(viewer) {
        frame.render_widget(Paragraph::new(line), area);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::MemoryBookmarkStore;
    use crate::document::TextLoader;
    use crate::settings::Settings;

    fn viewer() -> Viewer {
        Viewer::new(
            Settings::default(),
            Box::new(TextLoader),
            Box::new(MemoryBookmarkStore::new()),
        )
        .unwrap()
    }

    #[test]
    fn layout_reserves_bars() {
        let viewer = viewer();
        let areas = layout(Rect::new(0, 0, 80, 24), &viewer);
        assert_eq!(areas.document.height, 22);
        assert_eq!(areas.status.height, 1);
        assert_eq!(areas.inputbar.height, 1);
        assert_eq!(areas.completion.height, 0);
        assert_eq!(areas.viewport(), Viewport { width: 80, height: 22 });
    }

    #[test]
    fn page_line_marks_matches() {
        let rect = PageRect {
            line: 0,
            start_column: 4,
            end_column: 7,
        };
        let line = page_line(0, "the cat sat", 0, &[rect], '>');
        let texts: Vec<&str> = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(texts, vec!["> ", "the ", "cat", " sat"]);

        let plain = page_line(1, "no match", 0, &[rect], '>');
        assert_eq!(plain.spans[0].content.as_ref(), "  ");
    }
}
