//! Leptos integration: provider component, context, hook and script element.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`ThemeProvider`] mounts one [`ThemeController`] for its subtree and
//! mirrors the controller's snapshots into an `RwSignal`, so components read
//! theme state reactively through [`use_theme`]. A provider nested inside
//! another one finds the outer context and passes its children through.
//!
//! [`ThemeScript`] belongs in the server shell's `<head>`: the script removes
//! itself after running, so it must not be part of the hydrated tree.

#[cfg(test)]
#[path = "provider_test.rs"]
mod provider_test;

use leptos::prelude::*;
use leptos::tachys::html::InertElement;

use crate::cleanup::Cleanup;
use crate::config::ThemeConfig;
use crate::controller::ThemeController;
use crate::env::ThemeEnv;
use crate::script::bootstrap_script;
use crate::theme::{SystemTheme, ThemeSnapshot};

struct Mounted {
    controller: ThemeController,
    _subscription: Cleanup,
}

/// Live theme state of the nearest provider.
#[derive(Clone, Copy)]
pub struct ThemeContext {
    state: RwSignal<ThemeSnapshot>,
    mounted: StoredValue<Option<Mounted>, LocalStorage>,
}

impl ThemeContext {
    /// Reactive snapshot of the provider's state.
    pub fn state(&self) -> ReadSignal<ThemeSnapshot> {
        self.state.read_only()
    }

    /// The controller, until the provider is torn down.
    pub fn controller(&self) -> Option<ThemeController> {
        self.mounted
            .try_with_value(|mounted| mounted.as_ref().map(|m| m.controller.clone()))
            .flatten()
    }

    fn dispose(&self) {
        let mounted = self.mounted.try_update_value(Option::take).flatten();
        if let Some(mounted) = mounted {
            mounted.controller.dispose();
        }
    }
}

/// Provide theme state for the current owner using the page environment.
/// Returns the existing context when an ancestor already provides one.
pub fn provide_theme(config: ThemeConfig) -> ThemeContext {
    provide_theme_with(config, &ThemeEnv::browser())
}

/// [`provide_theme`] with an explicit environment.
pub fn provide_theme_with(config: ThemeConfig, env: &ThemeEnv) -> ThemeContext {
    if let Some(existing) = use_context::<ThemeContext>() {
        return existing;
    }

    let controller = ThemeController::mount(config, env);
    let state = RwSignal::new(controller.snapshot());
    let subscription = controller.subscribe(move |snapshot| {
        state.try_update(|current| current.clone_from(snapshot));
    });
    let context = ThemeContext {
        state,
        mounted: StoredValue::new_local(Some(Mounted {
            controller,
            _subscription: subscription,
        })),
    };

    provide_context(context);
    on_cleanup(move || context.dispose());
    context
}

/// Theme provider. Nested providers render their children unchanged.
#[component]
pub fn ThemeProvider(
    /// Validated configuration; defaults apply when omitted.
    #[prop(optional)]
    config: Option<ThemeConfig>,
    children: Children,
) -> impl IntoView {
    provide_theme(config.unwrap_or_default());
    children()
}

/// Inline bootstrap script for the document `<head>`, carrying the nonce and
/// any extra script attributes. Renders nothing for a custom storage adapter.
#[component]
pub fn ThemeScript(config: ThemeConfig) -> impl IntoView {
    bootstrap_script(&config).map(|script| InertElement::new(script.to_html()))
}

/// Theme accessors returned by [`use_theme`].
///
/// Outside a provider every reader reports nothing and every setter is a
/// no-op.
#[derive(Clone, Copy)]
pub struct UseTheme {
    context: Option<ThemeContext>,
}

/// Read and update the nearest provider's theme.
pub fn use_theme() -> UseTheme {
    UseTheme { context: use_context::<ThemeContext>() }
}

impl UseTheme {
    pub fn is_provided(&self) -> bool {
        self.context.is_some()
    }

    fn read<T>(&self, f: impl FnOnce(&ThemeSnapshot) -> T) -> Option<T> {
        self.context.map(|context| context.state.with(f))
    }

    pub fn snapshot(&self) -> Option<ThemeSnapshot> {
        self.read(Clone::clone)
    }

    pub fn theme(&self) -> Option<String> {
        self.read(|s| s.theme.clone())
    }

    pub fn resolved_theme(&self) -> Option<String> {
        self.read(|s| s.resolved_theme.clone())
    }

    pub fn system_theme(&self) -> Option<SystemTheme> {
        self.read(|s| s.system_theme).flatten()
    }

    pub fn forced_theme(&self) -> Option<String> {
        self.read(|s| s.forced_theme.clone()).flatten()
    }

    pub fn themes(&self) -> Vec<String> {
        self.read(|s| s.themes.clone()).unwrap_or_default()
    }

    fn controller(&self) -> Option<ThemeController> {
        self.context.and_then(|context| context.controller())
    }

    pub fn set_theme(&self, theme: impl Into<String>) {
        if let Some(controller) = self.controller() {
            controller.set_theme(theme);
        }
    }

    /// Set the theme from the latest committed one.
    pub fn update_theme(&self, update: impl FnOnce(&str) -> String) {
        if let Some(controller) = self.controller() {
            controller.update_theme(update);
        }
    }

    /// Pin the page to a theme, or unpin with `None`.
    pub fn force_theme(&self, forced: Option<String>) {
        if let Some(controller) = self.controller() {
            controller.set_forced_theme(forced);
        }
    }
}
