use std::rc::Rc;

use chrono::{Local, NaiveDateTime, NaiveTime};
use log::debug;

use crate::error::StoreError;
use crate::models::{Category, CategoryRef, Task, TaskPriority, TaskRequest, TaskStatus};
use crate::storage::Storage;

/// Owner of the task list, persisted to `tasks.json`.
///
/// The list is shared as an `Rc` snapshot. Mutations build the next list,
/// save it, and only then replace the snapshot, so a snapshot handed out
/// earlier keeps its contents and a failed save changes nothing.
#[derive(Debug)]
pub struct TaskStore {
    storage: Storage,
    tasks: Rc<Vec<Task>>,
}

impl TaskStore {
    pub fn load(storage: Storage) -> Result<Self, StoreError> {
        let tasks = storage.load_tasks()?;
        Ok(TaskStore { storage, tasks: Rc::new(tasks) })
    }

    /// Current snapshot of the task list.
    pub fn tasks(&self) -> Rc<Vec<Task>> {
        Rc::clone(&self.tasks)
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Saves `next` and makes it the current list. On a failed save the
    /// store keeps its previous contents.
    fn commit(&mut self, next: Vec<Task>) -> Result<(), StoreError> {
        self.storage.save_tasks(&next)?;
        self.tasks = Rc::new(next);
        Ok(())
    }

    /// Applies `f` to the task with `id`, saves, and returns the updated task.
    fn modify<F>(&mut self, id: u64, f: F) -> Result<Task, StoreError>
    where
        F: FnOnce(&mut Task),
    {
        let mut next = (*self.tasks).clone();
        let task = next
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;
        f(task);
        let updated = task.clone();
        self.commit(next)?;
        Ok(updated)
    }

    /// Creates a task from `request`. Category ids are resolved against `categories`;
    /// unknown ids are dropped.
    pub fn create(&mut self, request: TaskRequest, categories: &[Category]) -> Result<Task, StoreError> {
        let next_id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let task = Task {
            id: next_id,
            title: request.title,
            content: request.content.filter(|c| !c.is_empty()),
            status: request.status,
            priority: request.priority,
            due_date: request.due_date,
            categories: resolve_categories(&request.category_ids, categories),
            is_favorite: request.is_favorite,
            created_at: Local::now(),
        };
        let mut next = (*self.tasks).clone();
        next.push(task.clone());
        self.commit(next)?;
        debug!("created task {}", next_id);
        Ok(task)
    }

    pub fn update(&mut self, id: u64, request: TaskRequest, categories: &[Category]) -> Result<Task, StoreError> {
        let refs = resolve_categories(&request.category_ids, categories);
        self.modify(id, |t| {
            t.title = request.title;
            t.content = request.content.filter(|c| !c.is_empty());
            t.status = request.status;
            t.priority = request.priority;
            t.due_date = request.due_date;
            t.categories = refs;
            t.is_favorite = request.is_favorite;
        })
    }

    pub fn delete(&mut self, id: u64) -> Result<Task, StoreError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;
        let mut next = (*self.tasks).clone();
        let removed = next.remove(idx);
        self.commit(next)?;
        debug!("deleted task {}", id);
        Ok(removed)
    }

    pub fn change_status(&mut self, id: u64, status: TaskStatus) -> Result<Task, StoreError> {
        self.modify(id, |t| t.status = status)
    }

    pub fn change_priority(&mut self, id: u64, priority: TaskPriority) -> Result<Task, StoreError> {
        self.modify(id, |t| t.priority = priority)
    }

    pub fn toggle_favorite(&mut self, id: u64) -> Result<Task, StoreError> {
        self.modify(id, |t| t.is_favorite = !t.is_favorite)
    }

    pub fn set_categories(&mut self, id: u64, categories: Vec<CategoryRef>) -> Result<Task, StoreError> {
        self.modify(id, |t| t.categories = categories)
    }

    /// Removes a deleted category from every task. Returns how many tasks changed.
    pub fn detach_category(&mut self, category_id: &str) -> Result<usize, StoreError> {
        if !self.tasks.iter().any(|t| t.has_category(category_id)) {
            return Ok(0);
        }
        let mut next = (*self.tasks).clone();
        let mut changed = 0;
        for t in next.iter_mut() {
            let before = t.categories.len();
            t.categories.retain(|c| c.id != category_id);
            if t.categories.len() != before {
                changed += 1;
            }
        }
        self.commit(next)?;
        Ok(changed)
    }

    /// Tasks due at any time during the calendar day of `now`.
    pub fn today_tasks(&self, now: NaiveDateTime) -> Vec<&Task> {
        let start = now.date().and_time(NaiveTime::MIN);
        let end = start + chrono::Duration::days(1);
        self.tasks
            .iter()
            .filter(|t| t.due_date.is_some_and(|d| d >= start && d < end))
            .collect()
    }

    pub fn favorite_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_favorite).collect()
    }

    pub fn tasks_in_category(&self, category_id: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.has_category(category_id)).collect()
    }
}

fn resolve_categories(ids: &[String], categories: &[Category]) -> Vec<CategoryRef> {
    ids.iter()
        .filter_map(|id| categories.iter().find(|c| &c.id == id))
        .map(Category::to_ref)
        .collect()
}
