use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Theme preference as chosen by the user.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the system preference.
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(ParseError::new("theme", s)),
        }
    }
}

/// The theme actually applied.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    #[default]
    Light,
    Dark,
}

impl ResolvedTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolvedTheme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(ResolvedTheme::Light),
            "dark" => Ok(ResolvedTheme::Dark),
            _ => Err(ParseError::new("theme", s)),
        }
    }
}

/// Theme preference plus its resolution against the system setting.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    theme: Theme,
    resolved: ResolvedTheme,
    system: ResolvedTheme,
}

impl ThemeStore {
    pub fn new(theme: Theme, system: ResolvedTheme) -> Self {
        ThemeStore { theme, resolved: resolve(theme, system), system }
    }

    /// Builds the store from a stored preference string; anything unrecognized means light.
    pub fn from_stored(stored: Option<&str>, system: ResolvedTheme) -> Self {
        let theme = stored.and_then(|s| s.parse().ok()).unwrap_or_default();
        ThemeStore::new(theme, system)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn resolved(&self) -> ResolvedTheme {
        self.resolved
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.resolved = resolve(theme, self.system);
    }

    /// Switches to the opposite of the currently applied theme.
    pub fn toggle(&mut self) {
        let next = match self.resolved {
            ResolvedTheme::Light => Theme::Dark,
            ResolvedTheme::Dark => Theme::Light,
        };
        self.set_theme(next);
    }

    /// Records a change of the system preference; only matters while following it.
    pub fn system_changed(&mut self, system: ResolvedTheme) {
        self.system = system;
        if self.theme == Theme::System {
            self.resolved = system;
        }
    }
}

fn resolve(theme: Theme, system: ResolvedTheme) -> ResolvedTheme {
    match theme {
        Theme::Light => ResolvedTheme::Light,
        Theme::Dark => ResolvedTheme::Dark,
        Theme::System => system,
    }
}
