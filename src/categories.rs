use chrono::Local;
use log::debug;

use crate::error::StoreError;
use crate::models::{Category, CategoryRequest, Task};
use crate::storage::Storage;
use crate::validation::validate_category;

/// Icon names a category may use.
pub const ALLOWED_ICONS: [&str; 10] = [
    "briefcase",
    "user",
    "shopping-cart",
    "heart",
    "home",
    "car",
    "book",
    "music",
    "camera",
    "phone",
];

pub const PREDEFINED_COLORS: [&str; 10] = [
    "#3B82F6", // Blue
    "#10B981", // Green
    "#F59E0B", // Yellow
    "#EF4444", // Red
    "#8B5CF6", // Purple
    "#F97316", // Orange
    "#06B6D4", // Cyan
    "#84CC16", // Lime
    "#EC4899", // Pink
    "#6B7280", // Gray
];

pub const DEFAULT_ICON: &str = "briefcase";
pub const DEFAULT_COLOR: &str = PREDEFINED_COLORS[0];

/// A category together with how many tasks reference it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub category: Category,
    pub task_count: usize,
}

/// The user's categories, persisted to `categories.json`.
#[derive(Debug)]
pub struct CategoryStore {
    storage: Storage,
    categories: Vec<Category>,
}

impl CategoryStore {
    pub fn load(storage: Storage) -> Result<Self, StoreError> {
        let categories = storage.load_categories()?;
        Ok(CategoryStore { storage, categories })
    }

    pub fn list(&self) -> &[Category] {
        &self.categories
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Looks a category up by id, then by case-insensitive name.
    pub fn find(&self, id_or_name: &str) -> Option<&Category> {
        self.get(id_or_name).or_else(|| {
            let lower = id_or_name.to_lowercase();
            self.categories.iter().find(|c| c.name.to_lowercase() == lower)
        })
    }

    /// Saves `next` and makes it the current list only if the save succeeds.
    fn commit(&mut self, next: Vec<Category>) -> Result<(), StoreError> {
        self.storage.save_categories(&next)?;
        self.categories = next;
        Ok(())
    }

    fn next_id(&self) -> String {
        let next = self
            .categories
            .iter()
            .filter_map(|c| c.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        next.to_string()
    }

    pub fn create(&mut self, request: CategoryRequest) -> Result<Category, StoreError> {
        validate_category(&request, &self.categories, None)?;
        let category = Category {
            id: self.next_id(),
            name: request.name,
            color: request.color,
            icon: request.icon,
            created_at: Local::now(),
        };
        let mut next = self.categories.clone();
        next.push(category.clone());
        self.commit(next)?;
        debug!("created category {} '{}'", category.id, category.name);
        Ok(category)
    }

    pub fn update(&mut self, id: &str, request: CategoryRequest) -> Result<Category, StoreError> {
        validate_category(&request, &self.categories, Some(id))?;
        let mut next = self.categories.clone();
        let category = next
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::CategoryNotFound(id.to_string()))?;
        category.name = request.name;
        category.color = request.color;
        category.icon = request.icon;
        let updated = category.clone();
        self.commit(next)?;
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<Category, StoreError> {
        let idx = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::CategoryNotFound(id.to_string()))?;
        let mut next = self.categories.clone();
        let removed = next.remove(idx);
        self.commit(next)?;
        debug!("deleted category {}", id);
        Ok(removed)
    }

    /// Categories whose name contains `needle`, ignoring case. Empty needle yields all.
    pub fn search(&self, needle: &str) -> Vec<&Category> {
        if needle.is_empty() {
            return self.categories.iter().collect();
        }
        let lower = needle.to_lowercase();
        self.categories
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&lower))
            .collect()
    }

    pub fn with_task_counts(&self, tasks: &[Task]) -> Vec<CategoryCount> {
        self.categories
            .iter()
            .map(|c| CategoryCount {
                category: c.clone(),
                task_count: tasks.iter().filter(|t| t.has_category(&c.id)).count(),
            })
            .collect()
    }
}
