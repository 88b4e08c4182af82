use std::cell::Cell;

use chrono::Local;
use rstest::rstest;

use taskscope::auth::{AuthApi, AuthStore};
use taskscope::error::ApiError;
use taskscope::models::{Role, User};
use taskscope::theme::{ResolvedTheme, Theme, ThemeStore};

#[rstest]
#[case(Theme::Light, ResolvedTheme::Dark, ResolvedTheme::Light)]
#[case(Theme::Dark, ResolvedTheme::Light, ResolvedTheme::Dark)]
#[case(Theme::System, ResolvedTheme::Dark, ResolvedTheme::Dark)]
#[case(Theme::System, ResolvedTheme::Light, ResolvedTheme::Light)]
fn test_theme_resolution(#[case] theme: Theme, #[case] system: ResolvedTheme, #[case] expected: ResolvedTheme) {
    assert_eq!(ThemeStore::new(theme, system).resolved(), expected);
}

#[test]
fn test_toggle_flips_applied_theme() {
    let mut themes = ThemeStore::new(Theme::System, ResolvedTheme::Dark);
    themes.toggle();
    assert_eq!(themes.theme(), Theme::Light);
    assert_eq!(themes.resolved(), ResolvedTheme::Light);
    themes.toggle();
    assert_eq!(themes.theme(), Theme::Dark);
}

#[test]
fn test_system_change_only_matters_when_following_it() {
    let mut themes = ThemeStore::new(Theme::Light, ResolvedTheme::Light);
    themes.system_changed(ResolvedTheme::Dark);
    assert_eq!(themes.resolved(), ResolvedTheme::Light);

    themes.set_theme(Theme::System);
    assert_eq!(themes.resolved(), ResolvedTheme::Dark);
    themes.system_changed(ResolvedTheme::Light);
    assert_eq!(themes.resolved(), ResolvedTheme::Light);
}

#[rstest]
#[case(Some("dark"), Theme::Dark)]
#[case(Some("SYSTEM"), Theme::System)]
#[case(Some("purple"), Theme::Light)]
#[case(None, Theme::Light)]
fn test_stored_preference_parsing(#[case] stored: Option<&str>, #[case] expected: Theme) {
    assert_eq!(ThemeStore::from_stored(stored, ResolvedTheme::Light).theme(), expected);
}

fn user(username: &str, role: Role) -> User {
    User {
        id: "u1".to_string(),
        email: "someone@example.com".to_string(),
        username: username.to_string(),
        role,
        created_at: Local::now(),
        enabled: true,
    }
}

/// Auth service that accepts one password.
struct FakeAuth {
    password: &'static str,
    logout_fails: bool,
    logouts: Cell<usize>,
}

impl FakeAuth {
    fn new() -> Self {
        FakeAuth { password: "hunter22", logout_fails: false, logouts: Cell::new(0) }
    }
}

impl AuthApi for FakeAuth {
    fn login(&self, _email: &str, password: &str) -> Result<User, ApiError> {
        if password == self.password {
            Ok(user("Ada Lovelace", Role::Admin))
        } else {
            Err(ApiError::new(401, ""))
        }
    }

    fn register(&self, username: &str, _email: &str, _password: &str) -> Result<User, ApiError> {
        if username == "taken" {
            Err(ApiError::new(409, "Username already exists"))
        } else {
            Ok(user(username, Role::User))
        }
    }

    fn logout(&self) -> Result<(), ApiError> {
        self.logouts.set(self.logouts.get() + 1);
        if self.logout_fails {
            Err(ApiError::new(500, "server down"))
        } else {
            Ok(())
        }
    }

    fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        if email.ends_with("@example.com") {
            Ok(())
        } else {
            Err(ApiError::new(404, ""))
        }
    }

    fn reset_password(&self, token: &str, _new_password: &str) -> Result<(), ApiError> {
        if token == "123456" {
            Ok(())
        } else {
            Err(ApiError::new(400, "Invalid or expired code"))
        }
    }

    fn current_user(&self) -> Result<User, ApiError> {
        Err(ApiError::new(401, "not signed in"))
    }
}

#[test]
fn test_login_success_and_roles() {
    let mut auth = AuthStore::new(FakeAuth::new());
    assert!(!auth.is_authenticated());
    assert_eq!(auth.user_initials(), "U");

    auth.login("ada@example.com", "hunter22").unwrap();
    assert!(auth.is_authenticated());
    assert!(auth.is_admin());
    assert_eq!(auth.user_initials(), "AL");
    assert_eq!(auth.error(), None);
}

#[test]
fn test_login_failure_uses_fallback_message() {
    let mut auth = AuthStore::new(FakeAuth::new());
    let err = auth.login("ada@example.com", "wrong").unwrap_err();
    assert_eq!(err.status, 401);
    assert_eq!(auth.error(), Some("Login failed"));
    assert!(!auth.is_authenticated());
}

#[test]
fn test_register_reports_service_message() {
    let mut auth = AuthStore::new(FakeAuth::new());
    assert!(auth.register("taken", "x@example.com", "Secret123").is_err());
    assert_eq!(auth.error(), Some("Username already exists"));

    auth.register("grace", "grace@example.com", "Secret123").unwrap();
    assert_eq!(auth.error(), None);
    assert!(!auth.is_admin());
    assert_eq!(auth.user_initials(), "G");
}

#[test]
fn test_logout_clears_session_even_on_failure() {
    let api = FakeAuth { logout_fails: true, ..FakeAuth::new() };
    let mut auth = AuthStore::new(api);
    auth.set_user(user("ada", Role::User));
    auth.logout();
    assert!(!auth.is_authenticated());
    assert_eq!(auth.error(), None);
}

#[test]
fn test_password_reset_flow() {
    let mut auth = AuthStore::new(FakeAuth::new());
    assert!(auth.forgot_password("nobody@elsewhere.org").is_err());
    assert_eq!(auth.error(), Some("Request failed"));
    auth.forgot_password("ada@example.com").unwrap();
    assert_eq!(auth.error(), None);

    assert!(auth.reset_password("000000", "NewSecret1").is_err());
    assert_eq!(auth.error(), Some("Invalid or expired code"));
    auth.reset_password("123456", "NewSecret1").unwrap();
}

#[test]
fn test_refresh_without_session_signs_out() {
    let mut auth = AuthStore::new(FakeAuth::new());
    auth.set_user(user("ada", Role::User));
    auth.refresh_current_user();
    assert!(auth.user().is_none());
}
