use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::cleanup::Cleanup;
use crate::system::{ColorSchemeSource, PreferenceHandler};
use crate::theme::SystemTheme;

#[derive(Default)]
struct PreferenceState {
    current: Cell<SystemTheme>,
    watchers: RefCell<Vec<(u64, PreferenceHandler)>>,
    next_watcher: Cell<u64>,
}

/// Preference set by hand. Changes notify watchers synchronously, like the
/// media query `change` event.
#[derive(Clone, Default)]
pub struct ManualPreference {
    state: Rc<PreferenceState>,
}

impl ManualPreference {
    pub fn new(initial: SystemTheme) -> Self {
        let preference = Self::default();
        preference.state.current.set(initial);
        preference
    }

    /// Change the preference. Watchers hear about actual changes only.
    pub fn set(&self, theme: SystemTheme) {
        if self.state.current.replace(theme) == theme {
            return;
        }
        let handlers: Vec<PreferenceHandler> =
            self.state.watchers.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            handler(theme);
        }
    }

    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.state.watchers.borrow().len()
    }
}

impl ColorSchemeSource for ManualPreference {
    fn current(&self) -> SystemTheme {
        self.state.current.get()
    }

    fn watch(&self, on_change: PreferenceHandler) -> Cleanup {
        let id = self.state.next_watcher.get();
        self.state.next_watcher.set(id + 1);
        self.state.watchers.borrow_mut().push((id, Rc::clone(&on_change)));
        on_change(self.current());

        let state = Rc::downgrade(&self.state);
        Cleanup::new(move || {
            if let Some(state) = state.upgrade() {
                state.watchers.borrow_mut().retain(|(watcher, _)| *watcher != id);
            }
        })
    }
}
