use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::cleanup::Cleanup;
use crate::dom::ThemeRoot;
use crate::headless::TaskQueue;

struct SuppressionStyle {
    id: u64,
    nonce: Option<String>,
}

#[derive(Default)]
struct RootState {
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    color_scheme: Option<String>,
    styles: Vec<SuppressionStyle>,
    next_style: u64,
    restyles: u32,
}

/// Recorded document root. Suppression styles are removed when the task
/// queue runs, mirroring the browser's next-tick removal.
#[derive(Clone, Default)]
pub struct MemoryRoot {
    state: Rc<RefCell<RootState>>,
    queue: TaskQueue,
}

impl MemoryRoot {
    pub fn new(queue: TaskQueue) -> Self {
        Self { state: Rc::default(), queue }
    }

    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.state.borrow().classes.clone()
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().attributes.get(name).cloned()
    }

    #[must_use]
    pub fn attributes(&self) -> BTreeMap<String, String> {
        self.state.borrow().attributes.clone()
    }

    #[must_use]
    pub fn color_scheme(&self) -> Option<String> {
        self.state.borrow().color_scheme.clone()
    }

    /// Nonces of the suppression style elements still attached.
    #[must_use]
    pub fn suppression_styles(&self) -> Vec<Option<String>> {
        self.state.borrow().styles.iter().map(|s| s.nonce.clone()).collect()
    }

    /// Forced restyles so far.
    #[must_use]
    pub fn restyles(&self) -> u32 {
        self.state.borrow().restyles
    }
}

impl ThemeRoot for MemoryRoot {
    fn remove_classes(&self, tokens: &[String]) {
        self.state.borrow_mut().classes.retain(|c| !tokens.contains(c));
    }

    fn add_class(&self, token: &str) {
        let mut state = self.state.borrow_mut();
        if !state.classes.iter().any(|c| c == token) {
            state.classes.push(token.to_owned());
        }
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.state.borrow_mut().attributes.insert(name.to_owned(), value.to_owned());
    }

    fn remove_attribute(&self, name: &str) {
        self.state.borrow_mut().attributes.remove(name);
    }

    fn set_color_scheme(&self, scheme: Option<&str>) {
        self.state.borrow_mut().color_scheme = scheme.map(str::to_owned);
    }

    fn suppress_transitions(&self, nonce: Option<&str>) -> Cleanup {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_style;
            state.next_style += 1;
            state.styles.push(SuppressionStyle { id, nonce: nonce.map(str::to_owned) });
            id
        };
        let state = Rc::downgrade(&self.state);
        let queue = self.queue.clone();
        Cleanup::new(move || {
            let Some(strong) = state.upgrade() else { return };
            strong.borrow_mut().restyles += 1;
            queue.push(move || {
                if let Some(state) = state.upgrade() {
                    state.borrow_mut().styles.retain(|s| s.id != id);
                }
            });
        })
    }
}
