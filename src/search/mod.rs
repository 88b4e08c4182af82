//! Task search: a debounced text query plus four categorical filters over a
//! shared task list, with the filtered view memoized until an input changes.

pub mod date_range;
pub mod debounce;
pub mod filters;

use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::error::FilterError;
use crate::models::{Task, TaskPriority, TaskStatus};
pub use date_range::{matches_date_range, DateRange};
pub use debounce::{QueryBuffer, DEBOUNCE_WINDOW};
pub use filters::{Filter, FilterField, FilterState};

/// Whether `task` passes the text query and every filter.
///
/// `query_lower` must already be lower-cased; an empty query matches all.
pub fn matches_task(task: &Task, query_lower: &str, filters: &FilterState, now: NaiveDateTime) -> bool {
    let matches_text = query_lower.is_empty()
        || task.title.to_lowercase().contains(query_lower)
        || task
            .content
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(query_lower));

    matches_text
        && filters.status.matches(&task.status)
        && filters.priority.matches(&task.priority)
        && match &filters.category {
            Filter::All => true,
            Filter::Only(id) => task.has_category(id),
        }
        && matches_date_range(task, filters.date_range, now)
}

/// Filters `tasks` in order, keeping those that match `query` and `filters`.
pub fn filter_tasks(tasks: &[Task], query: &str, filters: &FilterState, now: NaiveDateTime) -> Vec<Task> {
    let query_lower = query.to_lowercase();
    tasks
        .iter()
        .filter(|t| matches_task(t, &query_lower, filters, now))
        .cloned()
        .collect()
}

/// Search state over a task list owned elsewhere.
///
/// The filtered view is recomputed lazily on read after any of its inputs
/// (task snapshot, settled query, filters, calendar day) changed.
#[derive(Debug)]
pub struct TaskSearch {
    tasks: Rc<Vec<Task>>,
    known_categories: BTreeSet<String>,
    query: QueryBuffer,
    filters: FilterState,
    cached: Option<(NaiveDate, Rc<Vec<Task>>)>,
}

impl TaskSearch {
    pub fn new(tasks: Rc<Vec<Task>>) -> Self {
        TaskSearch::with_query_buffer(tasks, QueryBuffer::new())
    }

    pub fn with_query_buffer(tasks: Rc<Vec<Task>>, query: QueryBuffer) -> Self {
        TaskSearch {
            tasks,
            known_categories: BTreeSet::new(),
            query,
            filters: FilterState::default(),
            cached: None,
        }
    }

    fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Hands the search a new task snapshot.
    pub fn set_tasks(&mut self, tasks: Rc<Vec<Task>>) {
        if !Rc::ptr_eq(&self.tasks, &tasks) {
            self.tasks = tasks;
            self.invalidate();
        }
    }

    pub fn tasks(&self) -> &Rc<Vec<Task>> {
        &self.tasks
    }

    /// Replaces the set of category ids the category filter may hold.
    ///
    /// A category filter pointing at an id that is no longer known falls back to "all".
    pub fn set_categories<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_categories = ids.into_iter().map(Into::into).collect();
        if let Filter::Only(id) = &self.filters.category {
            if !self.known_categories.contains(id) {
                debug!("category filter '{}' no longer exists, clearing it", id);
                self.filters.category = Filter::All;
                self.invalidate();
            }
        }
    }

    pub fn known_categories(&self) -> &BTreeSet<String> {
        &self.known_categories
    }

    pub fn live_query(&self) -> &str {
        self.query.live()
    }

    pub fn settled_query(&self) -> &str {
        self.query.settled()
    }

    pub fn is_settling(&self) -> bool {
        self.query.is_pending()
    }

    pub fn query_buffer(&self) -> &QueryBuffer {
        &self.query
    }

    /// Replaces the live query; it takes effect once the debounce window passes.
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        self.query.set(query, now);
    }

    pub fn push_query_char(&mut self, c: char, now: Instant) {
        self.query.push(c, now);
    }

    pub fn pop_query_char(&mut self, now: Instant) {
        self.query.pop(now);
    }

    /// Sets the query and applies it at once, bypassing the debounce.
    pub fn set_query_immediate(&mut self, query: impl Into<String>) {
        let before = self.query.settled().to_string();
        self.query.commit(query);
        if before != self.query.settled() {
            self.invalidate();
        }
    }

    /// Drives the debounce; returns `true` if the settled query changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let changed = self.query.poll(now);
        if changed {
            debug!("search query settled to '{}'", self.query.settled());
            self.invalidate();
        }
        changed
    }

    /// Clears the query immediately, leaving the filters alone.
    pub fn clear_query(&mut self) {
        if !self.query.settled().is_empty() {
            self.invalidate();
        }
        self.query.clear();
    }

    /// Clears the query and resets every filter.
    pub fn clear_search(&mut self) {
        self.clear_query();
        self.reset_filters();
    }

    /// Drops any pending debounce deadline. Call when tearing the view down.
    pub fn dispose(&mut self) {
        self.query.cancel();
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn update_filter(&mut self, field: FilterField, value: &str) -> Result<(), FilterError> {
        let mut next = self.filters.clone();
        next.update(field, value, &self.known_categories)?;
        debug!("filter {} set to '{}'", field.as_str(), value);
        self.replace_filters(next);
        Ok(())
    }

    pub fn set_status_filter(&mut self, status: Filter<TaskStatus>) {
        let next = FilterState { status, ..self.filters.clone() };
        self.replace_filters(next);
    }

    pub fn set_priority_filter(&mut self, priority: Filter<TaskPriority>) {
        let next = FilterState { priority, ..self.filters.clone() };
        self.replace_filters(next);
    }

    pub fn set_date_range(&mut self, date_range: DateRange) {
        let next = FilterState { date_range, ..self.filters.clone() };
        self.replace_filters(next);
    }

    /// Resets all four filters to "all".
    pub fn reset_filters(&mut self) {
        self.replace_filters(FilterState::default());
    }

    fn replace_filters(&mut self, next: FilterState) {
        if next != self.filters {
            self.filters = next;
            self.invalidate();
        }
    }

    pub fn is_default(&self) -> bool {
        self.filters.is_default()
    }

    pub fn active_filters_count(&self) -> usize {
        self.filters.active_count()
    }

    /// The tasks matching the settled query and the filters, in input order.
    ///
    /// With an empty query and default filters the input snapshot itself is
    /// returned, not a copy.
    pub fn filtered_tasks(&mut self, now: NaiveDateTime) -> Rc<Vec<Task>> {
        if self.query.settled().is_empty() && self.filters.is_default() {
            return Rc::clone(&self.tasks);
        }
        let today = now.date();
        if let Some((day, view)) = &self.cached {
            if *day == today {
                return Rc::clone(view);
            }
        }
        let view = Rc::new(filter_tasks(&self.tasks, self.query.settled(), &self.filters, now));
        debug!("filtered {} of {} tasks", view.len(), self.tasks.len());
        self.cached = Some((today, Rc::clone(&view)));
        view
    }
}
