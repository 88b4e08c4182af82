use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::categories::{CategoryStore, DEFAULT_COLOR, DEFAULT_ICON};
use crate::chat::{format_date, format_time, ChatSession, Sender};
use crate::config::Config;
use crate::models::{CategoryRequest, Task, TaskPriority, TaskRequest, TaskStatus};
use crate::search::{FilterField, TaskSearch};
use crate::storage::Storage;
use crate::tasks::TaskStore;
use crate::theme::{Theme, ThemeStore};
use crate::validation::validate_task;

/// Search text and filters for `list`, as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub query: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Category id or name.
    pub category: Option<String>,
    pub range: Option<String>,
    pub favorites: bool,
}

/// Field changes for `edit`; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due: Option<String>,
    pub clear_due: bool,
    /// Replaces the task's categories (ids or names).
    pub categories: Option<Vec<String>>,
}

/// Which part of the chat history `chat clear` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatClear {
    All,
    Messages,
    Summaries,
}

/// Parses a due date given as `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM`.
///
/// A bare date means the start of that day.
pub fn parse_due(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|e| anyhow!("Invalid due date '{}': {}. Use YYYY-MM-DD or YYYY-MM-DD HH:MM.", input, e))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Resolves category ids or names to ids, failing on the first unknown one.
fn resolve_category_ids(categories: &CategoryStore, wanted: &[String]) -> Result<Vec<String>> {
    wanted
        .iter()
        .map(|w| {
            categories
                .find(w)
                .map(|c| c.id.clone())
                .ok_or_else(|| anyhow!("Category '{}' not found.", w))
        })
        .collect()
}

/// Adds a new task and returns its id.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    storage: &Storage,
    title: String,
    content: Option<String>,
    priority: Option<TaskPriority>,
    due: Option<String>,
    categories: Vec<String>,
    favorite: bool,
    silent: bool,
) -> Result<u64> {
    let category_store = CategoryStore::load(storage.clone())?;
    let request = TaskRequest {
        title,
        content,
        status: TaskStatus::Pending,
        priority: priority.unwrap_or_default(),
        due_date: due.as_deref().map(parse_due).transpose()?,
        category_ids: resolve_category_ids(&category_store, &categories)?,
        is_favorite: favorite,
    };
    validate_task(&request, now())?;

    let mut store = TaskStore::load(storage.clone())?;
    let task = store.create(request, category_store.list())?;
    if !silent {
        println!("Task added (id = {})", task.id);
    }
    Ok(task.id)
}

/// Runs the search engine once over the stored tasks.
pub fn search_tasks(storage: &Storage, query: &ListQuery, now: NaiveDateTime) -> Result<Vec<Task>> {
    let store = TaskStore::load(storage.clone())?;
    let categories = CategoryStore::load(storage.clone())?;

    let mut search = TaskSearch::new(store.tasks());
    search.set_categories(categories.ids().map(str::to_string));
    if let Some(q) = &query.query {
        search.set_query_immediate(q.as_str());
    }
    if let Some(v) = &query.status {
        search.update_filter(FilterField::Status, v)?;
    }
    if let Some(v) = &query.priority {
        search.update_filter(FilterField::Priority, v)?;
    }
    if let Some(v) = &query.category {
        let id = categories.find(v).map(|c| c.id.as_str()).unwrap_or(v);
        search.update_filter(FilterField::Category, id)?;
    }
    if let Some(v) = &query.range {
        search.update_filter(FilterField::DateRange, v)?;
    }

    let filtered = search.filtered_tasks(now);
    Ok(filtered
        .iter()
        .filter(|t| !query.favorites || t.is_favorite)
        .cloned()
        .collect())
}

fn format_due(task: &Task) -> String {
    match task.due_date {
        Some(d) if d.time() == NaiveTime::MIN => d.format("%Y-%m-%d").to_string(),
        Some(d) => d.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::Done => Color::Green,
        TaskStatus::Missed => Color::Red,
    }
}

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::Low => Color::Grey,
        TaskPriority::Medium => Color::Blue,
        TaskPriority::High => Color::Red,
    }
}

fn task_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Categories").add_attribute(Attribute::Bold),
            Cell::new("★").add_attribute(Attribute::Bold),
        ]);

    let today = now().date().and_time(NaiveTime::MIN);
    for t in tasks {
        let overdue = t.status != TaskStatus::Done && t.due_date.is_some_and(|d| d < today);
        let categories: Vec<&str> = t.categories.iter().map(|c| c.name.as_str()).collect();
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.title),
            Cell::new(t.status.label()).fg(status_color(t.status)),
            Cell::new(t.priority.as_str()).fg(priority_color(t.priority)),
            Cell::new(format_due(t)).fg(if overdue { Color::Red } else { Color::Reset }),
            Cell::new(categories.join(", ")),
            Cell::new(if t.is_favorite { "★" } else { "" }),
        ]);
    }
    table
}

/// Lists tasks matching the query and filters, in stored order.
pub fn cmd_list(storage: &Storage, query: &ListQuery) -> Result<()> {
    let tasks = search_tasks(storage, query, now())?;
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    println!("{}", task_table(&tasks));
    Ok(())
}

/// Lists the tasks due today.
pub fn cmd_today(storage: &Storage) -> Result<()> {
    let store = TaskStore::load(storage.clone())?;
    let tasks: Vec<Task> = store.today_tasks(now()).into_iter().cloned().collect();
    if tasks.is_empty() {
        println!("Nothing due today.");
        return Ok(());
    }
    println!("{}", task_table(&tasks));
    Ok(())
}

pub fn cmd_status(storage: &Storage, id: u64, status: TaskStatus, silent: bool) -> Result<()> {
    let mut store = TaskStore::load(storage.clone())?;
    let task = store.change_status(id, status)?;
    if !silent {
        println!("Task {} is now {}.", task.id, task.status.label());
    }
    Ok(())
}

/// Marks a task as done.
pub fn cmd_done(storage: &Storage, id: u64, silent: bool) -> Result<()> {
    cmd_status(storage, id, TaskStatus::Done, silent)
}

pub fn cmd_priority(storage: &Storage, id: u64, priority: TaskPriority, silent: bool) -> Result<()> {
    let mut store = TaskStore::load(storage.clone())?;
    let task = store.change_priority(id, priority)?;
    if !silent {
        println!("Task {} priority set to {}.", task.id, task.priority.label());
    }
    Ok(())
}

pub fn cmd_favorite(storage: &Storage, id: u64, silent: bool) -> Result<()> {
    let mut store = TaskStore::load(storage.clone())?;
    let task = store.toggle_favorite(id)?;
    if !silent {
        if task.is_favorite {
            println!("Task {} marked as favorite!", task.id);
        } else {
            println!("Task {} removed from favorites!", task.id);
        }
    }
    Ok(())
}

pub fn cmd_remove(storage: &Storage, id: u64, silent: bool) -> Result<()> {
    let mut store = TaskStore::load(storage.clone())?;
    store.delete(id)?;
    if !silent {
        println!("Task {} removed.", id);
    }
    Ok(())
}

/// Edits an existing task's details.
///
/// The due date is only checked against today when it is being changed.
pub fn cmd_edit(storage: &Storage, id: u64, args: EditArgs, silent: bool) -> Result<()> {
    let category_store = CategoryStore::load(storage.clone())?;
    let mut store = TaskStore::load(storage.clone())?;
    let current = store
        .get(id)
        .ok_or_else(|| anyhow!("Task {} not found.", id))?;

    let mut request = TaskRequest::from(current);
    if let Some(title) = args.title {
        request.title = title;
    }
    if let Some(content) = args.content {
        request.content = Some(content);
    }
    if let Some(status) = args.status {
        request.status = status;
    }
    if let Some(priority) = args.priority {
        request.priority = priority;
    }
    let due_changed = args.due.is_some() || args.clear_due;
    if let Some(due) = args.due.as_deref() {
        request.due_date = Some(parse_due(due)?);
    } else if args.clear_due {
        request.due_date = None;
    }
    if let Some(categories) = &args.categories {
        request.category_ids = resolve_category_ids(&category_store, categories)?;
    }

    let to_check = if due_changed {
        request.clone()
    } else {
        TaskRequest { due_date: None, ..request.clone() }
    };
    validate_task(&to_check, now())?;

    store.update(id, request, category_store.list())?;
    if !silent {
        println!("Task {} updated.", id);
    }
    Ok(())
}

pub fn cmd_category_add(
    storage: &Storage,
    name: String,
    color: Option<String>,
    icon: Option<String>,
    silent: bool,
) -> Result<String> {
    let mut categories = CategoryStore::load(storage.clone())?;
    let category = categories.create(CategoryRequest {
        name,
        color: color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        icon: icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
    })?;
    if !silent {
        println!("Category '{}' added (id = {}).", category.name, category.id);
    }
    Ok(category.id)
}

/// Lists categories with their task counts, optionally filtered by name.
pub fn cmd_category_list(storage: &Storage, search: Option<String>) -> Result<()> {
    let categories = CategoryStore::load(storage.clone())?;
    let store = TaskStore::load(storage.clone())?;
    let matching: Vec<String> = categories
        .search(search.as_deref().unwrap_or_default())
        .into_iter()
        .map(|c| c.id.clone())
        .collect();
    let counts: Vec<_> = categories
        .with_task_counts(&store.tasks())
        .into_iter()
        .filter(|c| matching.contains(&c.category.id))
        .collect();
    if counts.is_empty() {
        println!("No categories found.");
        return Ok(());
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Icon", "Color", "Tasks"]);
    for c in counts {
        table.add_row(vec![
            c.category.id,
            c.category.name,
            c.category.icon,
            c.category.color,
            c.task_count.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn cmd_category_edit(
    storage: &Storage,
    id_or_name: String,
    name: Option<String>,
    color: Option<String>,
    icon: Option<String>,
    silent: bool,
) -> Result<()> {
    let mut categories = CategoryStore::load(storage.clone())?;
    let current = categories
        .find(&id_or_name)
        .cloned()
        .ok_or_else(|| anyhow!("Category '{}' not found.", id_or_name))?;
    let updated = categories.update(
        &current.id,
        CategoryRequest {
            name: name.unwrap_or(current.name),
            color: color.unwrap_or(current.color),
            icon: icon.unwrap_or(current.icon),
        },
    )?;

    // keep the names embedded in tasks in step
    let mut store = TaskStore::load(storage.clone())?;
    let tagged: Vec<u64> = store.tasks_in_category(&updated.id).iter().map(|t| t.id).collect();
    for id in tagged {
        if let Some(task) = store.get(id) {
            let refs = task
                .categories
                .iter()
                .map(|c| if c.id == updated.id { updated.to_ref() } else { c.clone() })
                .collect();
            store.set_categories(id, refs)?;
        }
    }

    if !silent {
        println!("Category '{}' updated.", updated.name);
    }
    Ok(())
}

/// Removes a category and detaches it from every task.
pub fn cmd_category_remove(storage: &Storage, id_or_name: String, silent: bool) -> Result<()> {
    let mut categories = CategoryStore::load(storage.clone())?;
    let id = categories
        .find(&id_or_name)
        .map(|c| c.id.clone())
        .ok_or_else(|| anyhow!("Category '{}' not found.", id_or_name))?;
    let removed = categories.delete(&id)?;
    let mut store = TaskStore::load(storage.clone())?;
    let detached = store.detach_category(&id)?;
    if !silent {
        println!("Category '{}' removed ({} tasks updated).", removed.name, detached);
    }
    Ok(())
}

/// Prints the saved assistant conversation, or the saved summaries.
pub fn cmd_chat_history(storage: &Storage, summaries: bool) -> Result<()> {
    let session = ChatSession::load(storage);
    let now = Local::now();
    if summaries {
        let recent = session.recent_summaries();
        if recent.is_empty() {
            println!("No summaries yet.");
        }
        for s in recent {
            println!("== {} ({} {})", s.title, format_date(s.timestamp, now), format_time(s.timestamp));
            println!("{}\n", s.content);
        }
        return Ok(());
    }
    if !session.has_messages() {
        println!("No messages yet.");
    }
    for m in session.messages() {
        let who = match m.sender {
            Sender::User => "you",
            Sender::Ai => "assistant",
        };
        let marker = if m.error { " (error)" } else { "" };
        println!(
            "[{} {}] {}{}: {}",
            format_date(m.timestamp, now),
            format_time(m.timestamp),
            who,
            marker,
            m.content
        );
    }
    Ok(())
}

pub fn cmd_chat_clear(storage: &Storage, what: ChatClear, silent: bool) -> Result<()> {
    let mut session = ChatSession::load(storage);
    match what {
        ChatClear::All => session.clear_all(),
        ChatClear::Messages => session.clear_chat(),
        ChatClear::Summaries => session.clear_summaries(),
    }
    session.save(storage)?;
    if !silent {
        println!("Chat history cleared.");
    }
    Ok(())
}

/// Shows, sets, or toggles the theme preference. Returns the resulting store.
pub fn cmd_theme(
    storage: &Storage,
    config: &Config,
    set: Option<Theme>,
    toggle: bool,
    silent: bool,
) -> Result<ThemeStore> {
    let mut settings = storage.load_settings()?;
    let mut themes = ThemeStore::new(settings.theme, config.system_theme);
    if let Some(theme) = set {
        themes.set_theme(theme);
    } else if toggle {
        themes.toggle();
    }
    if themes.theme() != settings.theme {
        settings.theme = themes.theme();
        storage.save_settings(&settings)?;
    }
    if !silent {
        println!("Theme: {} (applied: {})", themes.theme(), themes.resolved());
    }
    Ok(themes)
}

/// Deletes every data file after confirmation.
pub fn cmd_reset(storage: &Storage, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all tasks, categories and chat history? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }

    storage.delete_all().context("Failed to reset database")?;
    println!("Database reset successfully.");
    Ok(())
}
