#![allow(dead_code)]

use chrono::{Local, NaiveDate, NaiveDateTime};
use taskscope::models::{CategoryRef, Task, TaskPriority, TaskStatus};

/// 2024-03-15 10:00, a Friday.
pub fn fixed_now() -> NaiveDateTime {
    at(2024, 3, 15, 10, 0)
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn task(id: u64, title: &str) -> Task {
    Task {
        id,
        title: title.to_string(),
        content: None,
        status: TaskStatus::Pending,
        priority: TaskPriority::Medium,
        due_date: None,
        categories: Vec::new(),
        is_favorite: false,
        created_at: Local::now(),
    }
}

pub fn with_due(mut t: Task, due: NaiveDateTime) -> Task {
    t.due_date = Some(due);
    t
}

pub fn in_category(mut t: Task, id: &str, name: &str) -> Task {
    t.categories.push(CategoryRef { id: id.to_string(), name: name.to_string() });
    t
}
