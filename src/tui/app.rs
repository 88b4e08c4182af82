use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use log::warn;
use ratatui::widgets::TableState;

use crate::categories::CategoryStore;
use crate::commands::parse_due;
use crate::config::Config;
use crate::models::{Task, TaskPriority, TaskRequest, TaskStatus};
use crate::search::{DateRange, Filter, FilterField, TaskSearch};
use crate::storage::Storage;
use crate::tasks::TaskStore;
use crate::theme::ThemeStore;
use crate::validation::validate_task;

/// How long the event loop waits for input when no search is settling.
const IDLE_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the search box.
    Search,
    Adding,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Debug, Default)]
pub struct AddState {
    pub title: String,
    pub due: Option<NaiveDateTime>,
    pub step: usize, // 0: Title, 1: Due, 2: Priority
}

pub struct App {
    storage: Storage,
    pub store: TaskStore,
    pub categories: CategoryStore,
    pub search: TaskSearch,
    pub themes: ThemeStore,
    /// The rows currently on screen.
    pub visible: Rc<Vec<Task>>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    /// One-line feedback shown in the help bar, e.g. a validation error.
    pub message: Option<String>,
    /// Calendar day the visible rows were computed for.
    refreshed_on: NaiveDate,
}

/// Next value in `values` after `current`, wrapping through `Filter::All`.
fn cycle<T: Copy + PartialEq>(current: &Filter<T>, values: &[T]) -> Filter<T> {
    match current {
        Filter::All => values.first().map_or(Filter::All, |v| Filter::Only(*v)),
        Filter::Only(v) => match values.iter().position(|x| x == v) {
            Some(i) if i + 1 < values.len() => Filter::Only(values[i + 1]),
            _ => Filter::All,
        },
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl App {
    /// Loads tasks, categories and the theme preference from `storage`.
    pub fn new(storage: Storage, config: &Config) -> Result<App> {
        let store = TaskStore::load(storage.clone())?;
        let categories = CategoryStore::load(storage.clone())?;
        let settings = storage.load_settings()?;

        let mut search = TaskSearch::new(store.tasks());
        search.set_categories(categories.ids().map(str::to_string));

        let mut app = App {
            storage,
            visible: store.tasks(),
            store,
            categories,
            search,
            themes: ThemeStore::new(settings.theme, config.system_theme),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            message: None,
            refreshed_on: NaiveDate::MIN,
        };
        app.refresh();
        Ok(app)
    }

    /// Recomputes the visible rows and keeps the selection in range.
    pub fn refresh(&mut self) {
        self.refresh_at(now());
    }

    /// [`App::refresh`] against an explicit clock.
    pub fn refresh_at(&mut self, now: NaiveDateTime) {
        self.refreshed_on = now.date();
        self.visible = self.search.filtered_tasks(now);
        if self.visible.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.visible.len() {
                self.state.select(Some(self.visible.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Hands the search the store's latest snapshot after a mutation.
    fn sync_tasks(&mut self) {
        self.search.set_tasks(self.store.tasks());
        self.refresh();
    }

    /// Lets a pending search query settle and rolls the view over at
    /// midnight. Returns `true` if the view was recomputed.
    pub fn tick(&mut self, instant: Instant) -> bool {
        self.tick_at(instant, now())
    }

    /// [`App::tick`] against an explicit wall clock.
    pub fn tick_at(&mut self, instant: Instant, clock: NaiveDateTime) -> bool {
        let settled = self.search.poll(instant);
        if settled || clock.date() != self.refreshed_on {
            self.refresh_at(clock);
            true
        } else {
            false
        }
    }

    /// How long the event loop may block before the next [`App::tick`].
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.search
            .query_buffer()
            .time_until_settle(now)
            .map_or(IDLE_TICK, |d| d.min(IDLE_TICK))
    }

    pub fn next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn selected_id(&self) -> Option<u64> {
        self.state
            .selected()
            .and_then(|i| self.visible.get(i))
            .map(|t| t.id)
    }

    fn report<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) {
        match result {
            Ok(_) => self.message = None,
            Err(e) => {
                warn!("{}", e);
                self.message = Some(e.to_string());
            }
        }
    }

    /// Marks the selected task as done, or back to pending if it already is.
    pub fn complete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let next = match self.store.get(id).map(|t| t.status) {
            Some(TaskStatus::Done) => TaskStatus::Pending,
            _ => TaskStatus::Done,
        };
        let result = self.store.change_status(id, next);
        self.report(result);
        self.sync_tasks();
    }

    pub fn favorite_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let result = self.store.toggle_favorite(id);
        self.report(result);
        self.sync_tasks();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let result = self.store.delete(id);
        self.report(result);
        self.sync_tasks();
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn search_push(&mut self, c: char) {
        self.search.push_query_char(c, Instant::now());
    }

    pub fn search_pop(&mut self) {
        self.search.pop_query_char(Instant::now());
    }

    /// Leaves the search box, applying whatever was typed without waiting.
    pub fn finish_search(&mut self) {
        let query = self.search.live_query().to_string();
        self.search.set_query_immediate(query);
        self.input_mode = InputMode::Normal;
        self.refresh();
    }

    /// Leaves the search box and drops the query.
    pub fn cancel_search(&mut self) {
        self.search.clear_query();
        self.input_mode = InputMode::Normal;
        self.refresh();
    }

    pub fn cycle_status(&mut self) {
        let next = cycle(&self.search.filters().status, &TaskStatus::ALL);
        self.search.set_status_filter(next);
        self.refresh();
    }

    pub fn cycle_priority(&mut self) {
        let next = cycle(&self.search.filters().priority, &TaskPriority::ALL);
        self.search.set_priority_filter(next);
        self.refresh();
    }

    pub fn cycle_category(&mut self) {
        let ids: Vec<&str> = self.categories.ids().collect();
        let next = match &self.search.filters().category {
            Filter::All => ids.first().copied(),
            Filter::Only(current) => ids
                .iter()
                .position(|id| *id == current.as_str())
                .and_then(|i| ids.get(i + 1).copied()),
        }
        .unwrap_or("all")
        .to_string();
        let result = self.search.update_filter(FilterField::Category, &next);
        self.report(result);
        self.refresh();
    }

    pub fn cycle_date_range(&mut self) {
        let current = self.search.filters().date_range;
        let i = DateRange::ALL.iter().position(|r| *r == current).unwrap_or(0);
        self.search.set_date_range(DateRange::ALL[(i + 1) % DateRange::ALL.len()]);
        self.refresh();
    }

    /// Clears the query and every filter.
    pub fn clear_search(&mut self) {
        self.search.clear_search();
        self.refresh();
    }

    pub fn toggle_theme(&mut self) {
        self.themes.toggle();
        let result = self.storage.load_settings().and_then(|mut settings| {
            settings.theme = self.themes.theme();
            self.storage.save_settings(&settings)
        });
        self.report(result);
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles Enter for the "Add Task" wizard.
    pub fn handle_input(&mut self) {
        let input = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => {
                // Title
                if !input.is_empty() {
                    self.add_state.title = input;
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            1 => {
                // Due date, optional
                if input.is_empty() {
                    self.add_state.due = None;
                } else {
                    match parse_due(&input) {
                        Ok(due) => self.add_state.due = Some(due),
                        Err(e) => {
                            self.message = Some(e.to_string());
                            return;
                        }
                    }
                }
                self.message = None;
                self.add_state.step += 1;
                self.input_buffer.clear();
            }
            2 => {
                // Priority, optional
                let priority = if input.is_empty() {
                    TaskPriority::default()
                } else {
                    match input.parse() {
                        Ok(p) => p,
                        Err(e) => {
                            self.message = Some(format!("{}", e));
                            return;
                        }
                    }
                };
                self.finish_add(priority);
            }
            _ => {}
        }
    }

    fn finish_add(&mut self, priority: TaskPriority) {
        let request = TaskRequest {
            title: std::mem::take(&mut self.add_state.title),
            due_date: self.add_state.due,
            priority,
            ..TaskRequest::default()
        };
        if let Err(errors) = validate_task(&request, now()) {
            self.message = Some(errors.to_string());
            self.input_mode = InputMode::Normal;
            self.input_buffer.clear();
            return;
        }
        let result = self.store.create(request, self.categories.list());
        self.report(result);
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.sync_tasks();
    }
}
