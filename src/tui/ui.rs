use chrono::{Local, NaiveTime};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, InputMode};
use crate::models::{TaskPriority, TaskStatus};
use crate::theme::ResolvedTheme;

/// Colors for one theme.
struct Palette {
    fg: Color,
    bg: Color,
    accent: Color,
    muted: Color,
    highlight: Color,
}

fn palette(theme: ResolvedTheme) -> Palette {
    match theme {
        ResolvedTheme::Light => Palette {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            muted: Color::DarkGray,
            highlight: Color::Gray,
        },
        ResolvedTheme::Dark => Palette {
            fg: Color::White,
            bg: Color::Black,
            accent: Color::Cyan,
            muted: Color::Gray,
            highlight: Color::DarkGray,
        },
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let colors = palette(app.themes.resolved());
    f.render_widget(
        Block::default().style(Style::default().fg(colors.fg).bg(colors.bg)),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    render_search_bar(f, app, &colors, chunks[0]);
    render_tasks(f, app, &colors, chunks[1]);
    render_help(f, app, &colors, chunks[2]);

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let title = match app.add_state.step {
            0 => "Add Task: Enter Title",
            1 => "Add Task: Enter Due Date (YYYY-MM-DD [HH:MM], optional)",
            2 => "Add Task: Enter Priority (low/medium/high, optional)",
            _ => "Add Task",
        };
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }
}

fn render_search_bar(f: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let filters = app.search.filters();
    let category = match filters.category.value() {
        Some(id) => app
            .categories
            .get(id)
            .map_or_else(|| id.clone(), |c| c.name.clone()),
        None => "all".to_string(),
    };
    let mut title = format!(
        " Search | status: {} | priority: {} | category: {} | due: {} ",
        filters.status, filters.priority, category, filters.date_range
    );
    let active = app.search.active_filters_count();
    if active > 0 {
        title.push_str(&format!("({} active) ", active));
    }
    if app.search.is_settling() {
        title.push_str("… ");
    }

    let border = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(colors.muted)
    };
    let search = Paragraph::new(app.search.live_query())
        .style(Style::default().fg(colors.fg))
        .block(Block::default().borders(Borders::ALL).border_style(border).title(title));
    f.render_widget(search, area);
}

fn render_tasks(f: &mut Frame, app: &mut App, colors: &Palette, area: Rect) {
    let today = Local::now().date_naive().and_time(NaiveTime::MIN);

    let rows: Vec<Row> = app
        .visible
        .iter()
        .map(|t| {
            let due = t
                .due_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            let overdue = t.status != TaskStatus::Done && t.due_date.is_some_and(|d| d < today);
            let style = match t.status {
                TaskStatus::Done => Style::default().fg(Color::Green),
                TaskStatus::Missed => Style::default().fg(Color::Red),
                TaskStatus::Pending if overdue => Style::default().fg(Color::Red),
                TaskStatus::Pending => match t.priority {
                    TaskPriority::High => Style::default().fg(Color::Yellow),
                    _ => Style::default().fg(colors.fg),
                },
            };
            let categories: Vec<&str> = t.categories.iter().map(|c| c.name.as_str()).collect();

            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(if t.is_favorite { "★" } else { "" }),
                Cell::from(t.title.clone()),
                Cell::from(t.status.label()),
                Cell::from(t.priority.as_str()),
                Cell::from(due),
                Cell::from(categories.join(", ")),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(2),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(17),
        Constraint::Length(20),
    ];

    let title = format!("Taskscope - {} of {} tasks", app.visible.len(), app.search.tasks().len());
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["ID", "★", "Title", "Status", "Priority", "Due", "Categories"])
                .style(Style::default().fg(colors.accent).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(colors.highlight))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_help(f: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let help_text = match (&app.message, app.input_mode) {
        (Some(msg), InputMode::Normal) => msg.as_str(),
        (_, InputMode::Normal) => {
            "q: Quit | /: Search | s: Status | p: Priority | g: Category | r: Due | x: Clear | a: Add | Space: Done | f: Fav | d: Del | t: Theme"
        }
        (_, InputMode::Search) => "Type to search | Enter: Apply | Esc: Clear",
        (_, InputMode::Adding) => "Enter: Next Step | Esc: Cancel",
    };
    let style = if app.message.is_some() && app.input_mode == InputMode::Normal {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(colors.muted)
    };
    let help = Paragraph::new(help_text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
