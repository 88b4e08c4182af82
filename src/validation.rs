//! Form validation for the task, category, account and profile forms.
//!
//! Each validator returns every failing field with a user-facing message,
//! at most one message per field.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::categories::ALLOWED_ICONS;
use crate::models::{Category, CategoryRequest, TaskRequest};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid username regex"));
static RESET_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("valid reset code regex"));

const STRENGTH_LABELS: [&str; 5] = ["Very Weak", "Weak", "Fair", "Good", "Strong"];

/// Field name to error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn add(&mut self, field: &'static str, message: &str) {
        self.fields.entry(field).or_insert_with(|| message.to_string());
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Scores a password from 0 to 4.
///
/// One point each for length of at least 8, a lowercase letter, an
/// uppercase letter, a digit, and any other character; capped at 4.
pub fn password_strength(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }
    let checks = [
        password.chars().count() >= 8,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().filter(|c| **c).count() as u8;
    score.min(4)
}

pub fn password_strength_label(strength: u8) -> &'static str {
    STRENGTH_LABELS.get(strength as usize).copied().unwrap_or("")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !EMAIL_RE.is_match(email) {
        errors.add("email", "Please enter a valid email address");
    }
}

fn check_username(errors: &mut ValidationErrors, username: &str) {
    if username.is_empty() {
        errors.add("username", "Username is required");
    } else if char_len(username) < 3 {
        errors.add("username", "Username must be at least 3 characters");
    } else if char_len(username) > 20 {
        errors.add("username", "Username must be less than 20 characters");
    } else if !USERNAME_RE.is_match(username) {
        errors.add("username", "Username can only contain letters, numbers, and underscores");
    }
}

fn check_new_password(errors: &mut ValidationErrors, field: &'static str, password: &str, required: &str) {
    if password.is_empty() {
        errors.add(field, required);
    } else if char_len(password) < 8 {
        errors.add(field, "Password must be at least 8 characters");
    } else if password_strength(password) < 2 {
        errors.add(field, "Password is too weak. Include uppercase, lowercase, numbers, and symbols");
    }
}

fn check_confirmation(errors: &mut ValidationErrors, field: &'static str, password: &str, confirm: &str, required: &str) {
    if confirm.is_empty() {
        errors.add(field, required);
    } else if password != confirm {
        errors.add(field, "Passwords do not match");
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

pub fn validate_login(form: &LoginForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, &form.email);
    if form.password.is_empty() {
        errors.add("password", "Password is required");
    } else if char_len(&form.password) < 6 {
        errors.add("password", "Password must be at least 6 characters");
    }
    errors.finish()
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_to_terms: bool,
}

pub fn validate_register(form: &RegisterForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_username(&mut errors, &form.username);
    check_email(&mut errors, &form.email);
    check_new_password(&mut errors, "password", &form.password, "Password is required");
    check_confirmation(
        &mut errors,
        "confirmPassword",
        &form.password,
        &form.confirm_password,
        "Please confirm your password",
    );
    if !form.agree_to_terms {
        errors.add("agreeToTerms", "You must agree to the terms and conditions");
    }
    errors.finish()
}

pub fn validate_forgot_password(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, email);
    errors.finish()
}

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    /// The six-digit code from the reset email.
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub fn validate_reset_password(form: &ResetPasswordForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if form.token.is_empty() {
        errors.add("token", "Reset code is required");
    } else if !RESET_CODE_RE.is_match(&form.token) {
        errors.add("token", "Reset code must be a 6-digit number");
    }
    if form.new_password.is_empty() {
        errors.add("newPassword", "Password is required");
    } else if char_len(&form.new_password) < 8 {
        errors.add("newPassword", "Password must be at least 8 characters");
    }
    check_confirmation(
        &mut errors,
        "confirmPassword",
        &form.new_password,
        &form.confirm_password,
        "Please confirm your password",
    );
    errors.finish()
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
}

pub fn validate_profile(form: &ProfileForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_username(&mut errors, &form.username);
    check_email(&mut errors, &form.email);
    errors.finish()
}

#[derive(Debug, Clone, Default)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

pub fn validate_password_change(form: &PasswordChangeForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if form.old_password.is_empty() {
        errors.add("oldPassword", "Current password is required");
    }
    check_new_password(&mut errors, "newPassword", &form.new_password, "New password is required");
    check_confirmation(
        &mut errors,
        "confirmNewPassword",
        &form.new_password,
        &form.confirm_new_password,
        "Please confirm your new password",
    );
    errors.finish()
}

/// Validates a task form. Due dates before the start of `now`'s day are rejected.
pub fn validate_task(request: &TaskRequest, now: NaiveDateTime) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = &request.title;
    if title.trim().is_empty() {
        errors.add("title", "Task title is required");
    } else if char_len(title) < 3 {
        errors.add("title", "Task title must be at least 3 characters");
    } else if char_len(title) > 200 {
        errors.add("title", "Task title must be less than 200 characters");
    }

    if request.content.as_deref().is_some_and(|c| char_len(c) > 1000) {
        errors.add("content", "Description must be less than 1000 characters");
    }

    if let Some(due) = request.due_date {
        if due < now.date().and_time(NaiveTime::MIN) {
            errors.add("dueDate", "Due date cannot be in the past");
        }
    }
    errors.finish()
}

/// Validates a category form against the existing categories.
///
/// `editing_id` is the id of the category being edited, excluded from the
/// duplicate-name check.
pub fn validate_category(
    request: &CategoryRequest,
    existing: &[Category],
    editing_id: Option<&str>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let name = &request.name;
    if name.is_empty() {
        errors.add("name", "Category name is required");
    } else if char_len(name) < 2 {
        errors.add("name", "Category name must be at least 2 characters");
    } else if char_len(name) > 50 {
        errors.add("name", "Category name must be less than 50 characters");
    } else {
        let lower = name.to_lowercase();
        let duplicate = existing
            .iter()
            .any(|c| c.name.to_lowercase() == lower && Some(c.id.as_str()) != editing_id);
        if duplicate {
            errors.add("name", "A category with this name already exists");
        }
    }

    if request.color.is_empty() {
        errors.add("color", "Please select a color");
    }
    if request.icon.is_empty() {
        errors.add("icon", "Please select an icon");
    } else if !ALLOWED_ICONS.contains(&request.icon.as_str()) {
        errors.add("icon", "Please select one of the available icons");
    }
    errors.finish()
}
