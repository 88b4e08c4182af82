mod common;

use chrono::Local;
use rstest::rstest;

use common::{at, fixed_now};
use taskscope::models::{Category, CategoryRequest, TaskRequest};
use taskscope::validation::*;

fn titled(title: &str) -> TaskRequest {
    TaskRequest { title: title.to_string(), ..TaskRequest::default() }
}

#[rstest]
#[case("", Some("Task title is required"))]
#[case("   ", Some("Task title is required"))]
#[case("ab", Some("Task title must be at least 3 characters"))]
#[case("abc", None)]
#[case("ééé", None)]
fn test_task_title_rules(#[case] title: &str, #[case] expected: Option<&str>) {
    let result = validate_task(&titled(title), fixed_now());
    assert_eq!(result.err().and_then(|e| e.get("title").map(str::to_string)).as_deref(), expected);
}

#[test]
fn test_task_title_and_description_limits() {
    let long_title = "x".repeat(201);
    let errors = validate_task(&titled(&long_title), fixed_now()).unwrap_err();
    assert_eq!(errors.get("title"), Some("Task title must be less than 200 characters"));

    let request = TaskRequest { content: Some("y".repeat(1001)), ..titled("Fine title") };
    let errors = validate_task(&request, fixed_now()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("content"), Some("Description must be less than 1000 characters"));

    let request = TaskRequest { content: Some("y".repeat(1000)), ..titled("Fine title") };
    assert!(validate_task(&request, fixed_now()).is_ok());
}

#[rstest]
#[case(at(2024, 3, 14, 23, 59), false)]
#[case(at(2024, 3, 15, 0, 0), true)]
#[case(at(2024, 3, 15, 8, 0), true)]
#[case(at(2025, 1, 1, 0, 0), true)]
fn test_due_date_cannot_be_before_today(#[case] due: chrono::NaiveDateTime, #[case] ok: bool) {
    let request = TaskRequest { due_date: Some(due), ..titled("Dated task") };
    let result = validate_task(&request, fixed_now());
    assert_eq!(result.is_ok(), ok);
    if !ok {
        assert_eq!(result.unwrap_err().get("dueDate"), Some("Due date cannot be in the past"));
    }
}

#[test]
fn test_errors_display_every_field() {
    let request = TaskRequest { due_date: Some(at(2020, 1, 1, 0, 0)), ..titled("") };
    let errors = validate_task(&request, fixed_now()).unwrap_err();
    assert_eq!(errors.to_string(), "dueDate: Due date cannot be in the past; title: Task title is required");
}

fn existing() -> Vec<Category> {
    vec![Category {
        id: "1".to_string(),
        name: "Work".to_string(),
        color: "#3B82F6".to_string(),
        icon: "briefcase".to_string(),
        created_at: Local::now(),
    }]
}

#[rstest]
#[case("", "#fff", "home", "name")]
#[case("W", "#fff", "home", "name")]
#[case("work", "#fff", "home", "name")]
#[case("Home", "", "home", "color")]
#[case("Home", "#fff", "", "icon")]
#[case("Home", "#fff", "rocket", "icon")]
fn test_category_rules(#[case] name: &str, #[case] color: &str, #[case] icon: &str, #[case] field: &str) {
    let request = CategoryRequest { name: name.to_string(), color: color.to_string(), icon: icon.to_string() };
    let errors = validate_category(&request, &existing(), None).unwrap_err();
    assert!(errors.get(field).is_some(), "expected an error on {field}, got {errors}");
}

#[test]
fn test_category_name_limit_and_edit_exclusion() {
    let request = CategoryRequest { name: "n".repeat(51), color: "#fff".into(), icon: "home".into() };
    let errors = validate_category(&request, &[], None).unwrap_err();
    assert_eq!(errors.get("name"), Some("Category name must be less than 50 characters"));

    let request = CategoryRequest { name: "WORK".into(), color: "#fff".into(), icon: "book".into() };
    assert!(validate_category(&request, &existing(), Some("1")).is_ok());
}

#[rstest]
#[case("", 0)]
#[case("abc", 1)]
#[case("abcdefgh", 2)]
#[case("Abcdefgh", 3)]
#[case("Abcdefg1", 4)]
#[case("Abcdef1!", 4)]
#[case("!!!!", 1)]
fn test_password_strength(#[case] password: &str, #[case] expected: u8) {
    assert_eq!(password_strength(password), expected);
}

#[test]
fn test_password_strength_labels() {
    assert_eq!(password_strength_label(0), "Very Weak");
    assert_eq!(password_strength_label(4), "Strong");
    assert_eq!(password_strength_label(9), "");
}

#[test]
fn test_login_form() {
    let form = LoginForm { email: "user@example.com".into(), password: "secret".into(), remember_me: false };
    assert!(validate_login(&form).is_ok());

    let form = LoginForm { email: "not-an-email".into(), password: "12345".into(), remember_me: true };
    let errors = validate_login(&form).unwrap_err();
    assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
    assert_eq!(errors.get("password"), Some("Password must be at least 6 characters"));
}

#[test]
fn test_register_form() {
    let good = RegisterForm {
        username: "jane_doe".into(),
        email: "jane@example.com".into(),
        password: "Sunshine1".into(),
        confirm_password: "Sunshine1".into(),
        agree_to_terms: true,
    };
    assert!(validate_register(&good).is_ok());

    let bad = RegisterForm {
        username: "jane doe".into(),
        password: "sunshine".into(),
        confirm_password: "sunshine2".into(),
        agree_to_terms: false,
        ..good.clone()
    };
    let errors = validate_register(&bad).unwrap_err();
    assert_eq!(
        errors.get("username"),
        Some("Username can only contain letters, numbers, and underscores")
    );
    assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
    assert!(errors.get("agreeToTerms").is_some());
    assert!(errors.get("password").is_none());
}

#[test]
fn test_short_password_is_rejected_on_register() {
    let form = RegisterForm {
        username: "bob".into(),
        email: "bob@example.com".into(),
        password: "Ab1!".into(),
        confirm_password: "Ab1!".into(),
        agree_to_terms: true,
    };
    let errors = validate_register(&form).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("password"), Some("Password must be at least 8 characters"));
}

#[test]
fn test_reset_password_form() {
    let form = ResetPasswordForm {
        token: "12345a".into(),
        new_password: "short".into(),
        confirm_password: String::new(),
    };
    let errors = validate_reset_password(&form).unwrap_err();
    assert_eq!(errors.get("token"), Some("Reset code must be a 6-digit number"));
    assert_eq!(errors.get("newPassword"), Some("Password must be at least 8 characters"));
    assert_eq!(errors.get("confirmPassword"), Some("Please confirm your password"));

    let form = ResetPasswordForm {
        token: "123456".into(),
        new_password: "longenough".into(),
        confirm_password: "longenough".into(),
    };
    assert!(validate_reset_password(&form).is_ok());
}

#[test]
fn test_profile_and_password_change_forms() {
    assert!(validate_forgot_password("a@b.co").is_ok());
    assert!(validate_forgot_password("").is_err());

    let profile = ProfileForm { username: "ab".into(), email: "ab@example.com".into() };
    let errors = validate_profile(&profile).unwrap_err();
    assert_eq!(errors.get("username"), Some("Username must be at least 3 characters"));

    let change = PasswordChangeForm {
        old_password: String::new(),
        new_password: "NewPass12".into(),
        confirm_new_password: "NewPass12".into(),
    };
    let errors = validate_password_change(&change).unwrap_err();
    assert_eq!(errors.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["oldPassword"]);
}
