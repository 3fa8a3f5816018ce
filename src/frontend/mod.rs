//! 端末フロントエンド
//!
//! crossterm でキーを読み、ratatui で描画する。検索ワーカーの結果は
//! イベント待ちの合間に取り込む。

pub mod renderer;

use std::io::stdout;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::error::{FolioError, Result, UiError};
use crate::input::KeyEvent;
use crate::viewer::Viewer;

/// イベント待ちの間隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct TuiApplication {
    viewer: Viewer,
}

impl TuiApplication {
    pub fn new(viewer: Viewer) -> Self {
        Self { viewer }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn run(&mut self) -> Result<()> {
        enter_terminal()?;

        let backend = CrosstermBackend::new(stdout());
        let mut terminal = Terminal::new(backend).map_err(|err| terminal_error("terminal init", err))?;
        terminal.hide_cursor().map_err(|err| terminal_error("hide cursor", err))?;

        let loop_result = self.event_loop(&mut terminal);
        let show_cursor_result = terminal.show_cursor().map_err(|err| terminal_error("show cursor", err));
        drop(terminal);
        let cleanup_result = leave_terminal();

        loop_result.and(show_cursor_result).and(cleanup_result)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.viewer.should_quit() {
            self.viewer.poll_search();
            self.render(terminal)?;

            if event::poll(POLL_INTERVAL).map_err(|err| terminal_error("event poll", err))? {
                match event::read().map_err(|err| terminal_error("event read", err))? {
                    Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                        let handled = self.viewer.handle_key(KeyEvent::from(key_event));
                        if !handled {
                            log::trace!("unhandled key {:?}", key_event);
                        }
                    }
                    Event::Resize(_, _) => {}
                    Event::Key(_) | Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
                }
            }
        }

        Ok(())
    }

    fn render<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let size = terminal.size().map_err(|err| terminal_error("size", err))?;
        let area = ratatui::layout::Rect::new(0, 0, size.width, size.height);
        let viewport = renderer::layout(area, &self.viewer).viewport();
        if viewport != self.viewer.viewport() {
            self.viewer.resize(viewport);
        }

        let viewer = &self.viewer;
        terminal
            .draw(|frame| renderer::render(frame, viewer))
            .map_err(|err| terminal_error("render", err))?;
        Ok(())
    }
}

fn enter_terminal() -> Result<()> {
    enable_raw_mode().map_err(|err| terminal_error("enable raw mode", err))?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen).map_err(|err| terminal_error("enter alternate screen", err))?;
    Ok(())
}

fn leave_terminal() -> Result<()> {
    let mut out = stdout();
    execute!(out, LeaveAlternateScreen).map_err(|err| terminal_error("leave alternate screen", err))?;
    disable_raw_mode().map_err(|err| terminal_error("disable raw mode", err))?;
    Ok(())
}

/// パニック時などに端末を元へ戻す（失敗は無視）
pub fn restore_terminal() {
    let _ = execute!(stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    let _ = disable_raw_mode();
}

fn terminal_error(context: &str, err: impl std::fmt::Display) -> FolioError {
    FolioError::Ui(UiError::RenderingFailed {
        component: format!("{}: {}", context, err),
    })
}
