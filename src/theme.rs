//! Theme names, the observed system scheme and the public state snapshot.
//!
//! Theme names are opaque strings chosen by the host application. The only
//! name with meaning to this crate is [`SYSTEM_THEME`], which stands for
//! "follow the operating system" and is never applied to the document as-is
//! while system resolution is enabled.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved pseudo-theme that resolves to the OS color-scheme preference.
pub const SYSTEM_THEME: &str = "system";

/// Media query reporting the OS dark-mode preference.
pub const DARK_MEDIA_QUERY: &str = "(prefers-color-scheme: dark)";

/// The two themes that map onto the native `color-scheme` CSS property.
pub const COLOR_SCHEMES: [&str; 2] = ["light", "dark"];

/// OS color-scheme preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemTheme {
    #[default]
    Light,
    Dark,
}

impl SystemTheme {
    /// Map the `matches` flag of the dark-mode media query.
    #[must_use]
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }

    /// Theme name used when this preference is applied.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for SystemTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `theme` is one of the native color schemes.
#[must_use]
pub fn is_color_scheme(theme: &str) -> bool {
    COLOR_SCHEMES.contains(&theme)
}

/// Resolve the `system` pseudo-theme against an observed preference.
#[must_use]
pub fn resolve_theme(theme: &str, system: SystemTheme) -> String {
    if theme == SYSTEM_THEME { system.as_str().to_owned() } else { theme.to_owned() }
}

/// Point-in-time view of a provider's theme state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSnapshot {
    /// Requested theme, possibly [`SYSTEM_THEME`].
    pub theme: String,
    /// Theme actually in effect for the user's selection; never [`SYSTEM_THEME`].
    pub resolved_theme: String,
    /// Last observed OS preference; `None` when system resolution is disabled.
    pub system_theme: Option<SystemTheme>,
    /// Page-level override applied to the document instead of `theme`.
    pub forced_theme: Option<String>,
    /// Selectable themes, including [`SYSTEM_THEME`] when enabled.
    pub themes: Vec<String>,
}
