//! Theme selection for Leptos apps: system-preference resolution,
//! persistence, cross-tab sync, and flash-free application before hydration.
//!
//! The crate tracks which named theme is active and writes it onto the
//! document root. It does not define the themes themselves; those live in the
//! host application's CSS, keyed by the attribute or class this crate sets.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Provider options, defaults and validation |
//! | [`controller`] | Theme state machine reconciling every update source |
//! | [`dom`] | Writing the resolved theme onto the document root |
//! | [`script`] | Pre-hydration bootstrap script |
//! | [`storage`] | Persistence adapters and cross-tab notification |
//! | [`system`] | OS color-scheme preference observer |
//! | [`env`] | Browser, prerender and headless environments |
//! | [`headless`] | In-memory browser stand-ins for prerendering and tests |
//! | [`provider`] | Leptos provider, context, hook and script element |
//! | [`theme`] | Theme names and the public state snapshot |
//! | [`cleanup`] | Scoped release of listeners and subscriptions |
//!
//! ## Features
//!
//! - `hydrate`: browser backends (`localStorage`, `sessionStorage`,
//!   `document.cookie`, `BroadcastChannel`, `matchMedia`, the document root).
//! - `ssr`: server rendering through Leptos.

pub mod cleanup;
pub mod config;
pub mod controller;
pub mod dom;
pub mod env;
pub mod headless;
pub mod provider;
pub mod script;
pub mod storage;
pub mod system;
pub mod theme;

pub use cleanup::Cleanup;
pub use config::{Attribute, BuiltInStorage, ConfigError, ThemeConfig, ThemeOptions};
pub use controller::ThemeController;
pub use env::ThemeEnv;
pub use provider::{ThemeContext, ThemeProvider, ThemeScript, UseTheme, provide_theme, provide_theme_with, use_theme};
pub use script::{BootstrapScript, bootstrap_script};
pub use storage::ThemeStorage;
pub use theme::{SYSTEM_THEME, SystemTheme, ThemeSnapshot};
