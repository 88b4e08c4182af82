use log::warn;

use crate::error::ApiError;
use crate::models::{Role, User};

/// The remote authentication service.
pub trait AuthApi {
    fn login(&self, email: &str, password: &str) -> Result<User, ApiError>;
    fn register(&self, username: &str, email: &str, password: &str) -> Result<User, ApiError>;
    fn logout(&self) -> Result<(), ApiError>;
    fn forgot_password(&self, email: &str) -> Result<(), ApiError>;
    fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError>;
    fn current_user(&self) -> Result<User, ApiError>;
}

/// Session state: who is signed in and the last auth error to show.
#[derive(Debug)]
pub struct AuthStore<A> {
    api: A,
    user: Option<User>,
    error: Option<String>,
}

fn message_or(err: &ApiError, fallback: &str) -> String {
    if err.message.is_empty() {
        fallback.to_string()
    } else {
        err.message.clone()
    }
}

impl<A: AuthApi> AuthStore<A> {
    pub fn new(api: A) -> Self {
        AuthStore { api, user: None, error: None }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Replaces the cached user, e.g. after a profile update.
    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    /// Up to two upper-cased initials of the username, `"U"` when signed out.
    pub fn user_initials(&self) -> String {
        match &self.user {
            Some(u) if !u.username.is_empty() => u
                .username
                .split(' ')
                .filter_map(|w| w.chars().next())
                .flat_map(char::to_uppercase)
                .take(2)
                .collect(),
            _ => "U".to_string(),
        }
    }

    /// Reloads the signed-in user; any failure leaves nobody signed in.
    pub fn refresh_current_user(&mut self) {
        self.error = None;
        self.user = self.api.current_user().ok();
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        self.error = None;
        match self.api.login(email, password) {
            Ok(user) => {
                self.user = Some(user);
                Ok(())
            }
            Err(e) => {
                self.error = Some(message_or(&e, "Login failed"));
                self.user = None;
                Err(e)
            }
        }
    }

    pub fn register(&mut self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        self.error = None;
        match self.api.register(username, email, password) {
            Ok(user) => {
                self.user = Some(user);
                Ok(())
            }
            Err(e) => {
                self.error = Some(message_or(&e, "Registration failed"));
                self.user = None;
                Err(e)
            }
        }
    }

    /// Signs out. The local session is cleared even if the service call fails.
    pub fn logout(&mut self) {
        self.error = None;
        if let Err(e) = self.api.logout() {
            warn!("logout failed: {}", e);
        }
        self.user = None;
    }

    pub fn forgot_password(&mut self, email: &str) -> Result<(), ApiError> {
        self.error = None;
        self.api.forgot_password(email).inspect_err(|e| {
            self.error = Some(message_or(e, "Request failed"));
        })
    }

    pub fn reset_password(&mut self, token: &str, new_password: &str) -> Result<(), ApiError> {
        self.error = None;
        self.api.reset_password(token, new_password).inspect_err(|e| {
            self.error = Some(message_or(e, "Reset failed"));
        })
    }
}
