pub mod app;
pub mod ui;

use std::io;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::error;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::Config;
use crate::storage::Storage;
use app::{App, InputMode};
use ui::ui;

pub fn run_tui(storage: Storage, config: &Config) -> Result<()> {
    let mut app = App::new(storage, config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);
    app.search.dispose();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("TUI exited with error: {}", err);
    }
    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Wake up in time for a pending search to settle.
        if !event::poll(app.poll_timeout(Instant::now()))? {
            app.tick(Instant::now());
            continue;
        }

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char('/') => app.start_search(),
                KeyCode::Char('s') => app.cycle_status(),
                KeyCode::Char('p') => app.cycle_priority(),
                KeyCode::Char('g') => app.cycle_category(),
                KeyCode::Char('r') => app.cycle_date_range(),
                KeyCode::Char('x') => app.clear_search(),
                KeyCode::Char(' ') => app.complete_selected(),
                KeyCode::Char('f') => app.favorite_selected(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                KeyCode::Char('a') => app.start_add(),
                KeyCode::Char('t') => app.toggle_theme(),
                _ => {}
            },
            InputMode::Search => match key.code {
                KeyCode::Enter => app.finish_search(),
                KeyCode::Esc => app.cancel_search(),
                KeyCode::Char(c) => app.search_push(c),
                KeyCode::Backspace => app.search_pop(),
                _ => {}
            },
            InputMode::Adding => match key.code {
                KeyCode::Enter => app.handle_input(),
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Char(c) => app.input_buffer.push(c),
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            },
        }
        app.tick(Instant::now());
    }
}
