//! Theme state machine.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`ThemeController`] exists per top-level provider. It owns the
//! requested theme, the last observed OS preference and the optional forced
//! theme, and reconciles four update sources:
//!
//! - host calls ([`ThemeController::set_theme`], [`ThemeController::update_theme`]),
//! - OS preference changes from the [`ColorSchemeSource`],
//! - writes made by other tabs, delivered by the storage adapter,
//! - runtime pinning through [`ThemeController::set_forced_theme`].
//!
//! Every source funnels into one commit path that persists (for host calls
//! only), re-applies the DOM, and notifies subscribers.
//!
//! INVARIANTS
//! ==========
//! - The DOM shows the forced theme when one is set, else the requested theme
//!   resolved against the OS preference.
//! - Storage is written on host calls only, never for preference changes,
//!   values received from other tabs, or while a theme is forced.
//! - Subscribers always end on the latest snapshot, even when one of them
//!   commits from inside its callback.
//! - No `RefCell` borrow is held while user code (updaters, subscribers) or
//!   backend callbacks run.
//! - Listener callbacks hold `Weak` references, so dropping the last handle
//!   releases every listener.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use leptos::logging::log;

use crate::cleanup::Cleanup;
use crate::config::ThemeConfig;
use crate::dom::{ThemeRoot, apply_theme};
use crate::env::ThemeEnv;
use crate::storage::{ChangeHandler, ThemeStorage};
use crate::system::{ColorSchemeSource, PreferenceHandler};
use crate::theme::{SYSTEM_THEME, SystemTheme, ThemeSnapshot, resolve_theme};

/// Subscriber receiving the state after each committed change.
pub type SnapshotListener = Rc<dyn Fn(&ThemeSnapshot)>;

struct State {
    theme: String,
    system: SystemTheme,
    forced: Option<String>,
}

struct Inner {
    config: ThemeConfig,
    storage: Rc<dyn ThemeStorage>,
    preference: Rc<dyn ColorSchemeSource>,
    root: Rc<dyn ThemeRoot>,
    interactive: bool,
    state: RefCell<State>,
    listeners: RefCell<Vec<(u64, SnapshotListener)>>,
    next_listener: Cell<u64>,
    revision: Cell<u64>,
    applied_class: RefCell<Option<String>>,
    attachments: RefCell<Vec<Cleanup>>,
    disposed: Cell<bool>,
}

/// Shared handle to one provider's theme state.
#[derive(Clone)]
pub struct ThemeController {
    inner: Rc<Inner>,
}

impl ThemeController {
    /// Create the controller for `config` in `env`.
    ///
    /// The initial theme comes from storage when the environment allows it,
    /// else from the configured default. Interactive environments get the
    /// theme applied and the preference and storage listeners attached.
    pub fn mount(config: ThemeConfig, env: &ThemeEnv) -> Self {
        let storage = env.storage_for(&config);
        let preference = env.preference();
        let stored = if env.reads_storage(&config) {
            storage.get_item(config.storage_key()).filter(|t| !t.is_empty())
        } else {
            None
        };
        let theme = stored.unwrap_or_else(|| config.default_theme().to_owned());
        let state = State {
            theme,
            system: preference.current(),
            forced: config.forced_theme().map(str::to_owned),
        };

        let controller = Self {
            inner: Rc::new(Inner {
                config,
                storage,
                preference,
                root: env.root(),
                interactive: env.is_interactive(),
                state: RefCell::new(state),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                revision: Cell::new(0),
                applied_class: RefCell::new(None),
                attachments: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        };
        if controller.inner.interactive {
            controller.reapply();
            controller.attach();
        }
        controller
    }

    fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn attach(&self) {
        let weak = Rc::downgrade(&self.inner);
        let on_system: PreferenceHandler = Rc::new(move |system| {
            if let Some(controller) = Self::from_weak(&weak) {
                controller.on_system_change(system);
            }
        });
        let mut attachments = vec![self.inner.preference.watch(on_system)];

        let weak = Rc::downgrade(&self.inner);
        let on_storage: ChangeHandler = Rc::new(move |value| {
            if let Some(controller) = Self::from_weak(&weak) {
                controller.on_storage_change(value);
            }
        });
        if let Some(subscription) = self.inner.storage.subscribe(self.inner.config.storage_key(), on_storage) {
            attachments.push(subscription);
        }

        self.inner.attachments.borrow_mut().extend(attachments);
    }

    /// Request `theme` and persist it.
    pub fn set_theme(&self, theme: impl Into<String>) {
        self.commit(theme.into(), true);
    }

    /// Request the theme computed from the latest committed one.
    pub fn update_theme(&self, update: impl FnOnce(&str) -> String) {
        let previous = self.inner.state.borrow().theme.clone();
        self.commit(update(&previous), true);
    }

    /// Pin the document to `forced`, or unpin with `None`. The requested
    /// theme keeps being tracked underneath.
    pub fn set_forced_theme(&self, forced: Option<String>) {
        if self.inner.disposed.get() {
            return;
        }
        let forced = forced.filter(|t| !t.is_empty());
        {
            let mut state = self.inner.state.borrow_mut();
            if state.forced == forced {
                return;
            }
            state.forced = forced;
        }
        self.reapply();
        self.notify();
    }

    fn commit(&self, next: String, persist: bool) {
        if self.inner.disposed.get() {
            return;
        }
        let forced = self.inner.state.borrow().forced.is_some();
        if persist && !forced && self.inner.interactive {
            self.inner.storage.set_item(self.inner.config.storage_key(), &next);
        }
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            if state.theme == next {
                false
            } else {
                state.theme = next;
                true
            }
        };
        if changed {
            self.reapply();
            self.notify();
        }
    }

    fn on_system_change(&self, system: SystemTheme) {
        let follows_system = {
            let mut state = self.inner.state.borrow_mut();
            if state.system == system {
                return;
            }
            state.system = system;
            state.theme == SYSTEM_THEME && state.forced.is_none() && self.inner.config.enable_system()
        };
        if follows_system {
            self.reapply();
        }
        self.notify();
    }

    fn on_storage_change(&self, value: Option<String>) {
        match value.filter(|v| !v.is_empty()) {
            None => self.set_theme(self.inner.config.default_theme()),
            Some(theme) => {
                log!("theme synced from another document: key={} theme={theme}", self.inner.config.storage_key());
                self.commit(theme, false);
            }
        }
    }

    fn reapply(&self) {
        if !self.inner.interactive {
            return;
        }
        let (target, system) = {
            let state = self.inner.state.borrow();
            (state.forced.clone().unwrap_or_else(|| state.theme.clone()), state.system)
        };
        let stale = self.inner.applied_class.borrow_mut().take();
        let applied = apply_theme(self.inner.root.as_ref(), &target, system, &self.inner.config, stale.as_deref());
        *self.inner.applied_class.borrow_mut() = applied;
    }

    /// A subscriber that commits starts a nested pass with a newer snapshot;
    /// the outer pass stops there so nobody is left holding the older one.
    fn notify(&self) {
        let revision = self.inner.revision.get() + 1;
        self.inner.revision.set(revision);
        let snapshot = self.snapshot();
        let listeners: Vec<SnapshotListener> =
            self.inner.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            if self.inner.revision.get() != revision {
                return;
            }
            listener(&snapshot);
        }
    }

    /// Current public state.
    #[must_use]
    pub fn snapshot(&self) -> ThemeSnapshot {
        let state = self.inner.state.borrow();
        let config = &self.inner.config;
        ThemeSnapshot {
            theme: state.theme.clone(),
            resolved_theme: resolve_theme(&state.theme, state.system),
            system_theme: config.enable_system().then_some(state.system),
            forced_theme: state.forced.clone(),
            themes: config.exposed_themes(),
        }
    }

    /// Call `listener` after every committed change until the guard drops.
    pub fn subscribe(&self, listener: impl Fn(&ThemeSnapshot) + 'static) -> Cleanup {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        let weak = Rc::downgrade(&self.inner);
        Cleanup::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(listener, _)| *listener != id);
            }
        })
    }

    /// Detach every listener and subscriber. Later updates are ignored.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let attachments = std::mem::take(&mut *self.inner.attachments.borrow_mut());
        drop(attachments);
        self.inner.listeners.borrow_mut().clear();
    }

    #[must_use]
    pub fn config(&self) -> &ThemeConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn theme(&self) -> String {
        self.inner.state.borrow().theme.clone()
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.inner.interactive
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeController")
            .field("snapshot", &self.snapshot())
            .field("interactive", &self.inner.interactive)
            .finish_non_exhaustive()
    }
}
