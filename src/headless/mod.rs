//! Browser stand-ins for prerendering and tests.
//!
//! SYSTEM CONTEXT
//! ==============
//! A [`HeadlessOrigin`] models one web origin with any number of open tabs.
//! Tabs share the persistent area, the cookie jar and the broadcast hub; each
//! tab has its own session area, preference and document root. Everything
//! asynchronous in a browser (storage events, channel messages, the next-tick
//! removal of suppression styles) is pushed onto one [`TaskQueue`] and runs
//! when the test calls [`HeadlessOrigin::run_until_idle`].

mod preference;
mod root;
mod storage;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::env::ThemeEnv;
use crate::storage::StorageBackends;

pub use self::preference::ManualPreference;
pub use self::root::MemoryRoot;
pub use self::storage::{MemoryArea, MemoryBroadcast, MemoryStorage};

type Task = Box<dyn FnOnce()>;

/// FIFO of deferred callbacks standing in for the event loop.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn push(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Run tasks, including ones queued while running, until none are left.
    /// Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else { return ran };
            task();
            ran += 1;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

/// Tab id used for writes made outside any open tab.
const EXTERNAL_TAB: u32 = 0;

/// One simulated origin.
pub struct HeadlessOrigin {
    queue: TaskQueue,
    local: MemoryArea,
    cookies: MemoryArea,
    broadcast: MemoryBroadcast,
    next_tab: Cell<u32>,
}

impl Default for HeadlessOrigin {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessOrigin {
    pub fn new() -> Self {
        let queue = TaskQueue::default();
        Self {
            local: MemoryArea::with_events(queue.clone()),
            cookies: MemoryArea::new(),
            broadcast: MemoryBroadcast::new(queue.clone()),
            queue,
            next_tab: Cell::new(EXTERNAL_TAB + 1),
        }
    }

    /// Open a tab with a light OS preference.
    pub fn open_tab(&self) -> HeadlessTab {
        let id = self.next_tab.get();
        self.next_tab.set(id + 1);
        HeadlessTab {
            local: self.local.view_for_tab(id),
            session: MemoryArea::new(),
            cookies: self.cookies.view_for_tab(id),
            broadcast: self.broadcast.view_for_tab(id),
            preference: ManualPreference::default(),
            root: MemoryRoot::new(self.queue.clone()),
        }
    }

    pub fn run_until_idle(&self) -> usize {
        self.queue.run_until_idle()
    }

    #[must_use]
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// The persistent area as seen by a writer outside every tab, e.g. a
    /// user clearing site data. Its writes raise events in all tabs.
    #[must_use]
    pub fn local_area(&self) -> MemoryArea {
        self.local.view_for_tab(EXTERNAL_TAB)
    }

    #[must_use]
    pub fn cookie_area(&self) -> MemoryArea {
        self.cookies.view_for_tab(EXTERNAL_TAB)
    }

    #[must_use]
    pub fn broadcast(&self) -> &MemoryBroadcast {
        &self.broadcast
    }
}

/// One simulated tab of a [`HeadlessOrigin`].
pub struct HeadlessTab {
    local: MemoryArea,
    session: MemoryArea,
    cookies: MemoryArea,
    broadcast: MemoryBroadcast,
    preference: ManualPreference,
    root: MemoryRoot,
}

impl HeadlessTab {
    /// Interactive environment bound to this tab.
    #[must_use]
    pub fn env(&self) -> ThemeEnv {
        let backends = StorageBackends {
            local: Rc::new(self.local.clone()),
            session: Rc::new(self.session.clone()),
            cookie: Rc::new(self.cookies.clone()),
            broadcast: Rc::new(self.broadcast.clone()),
        };
        ThemeEnv::new(backends, Rc::new(self.preference.clone()), Rc::new(self.root.clone()))
    }

    #[must_use]
    pub fn preference(&self) -> &ManualPreference {
        &self.preference
    }

    #[must_use]
    pub fn root(&self) -> &MemoryRoot {
        &self.root
    }

    #[must_use]
    pub fn local_area(&self) -> &MemoryArea {
        &self.local
    }

    #[must_use]
    pub fn session_area(&self) -> &MemoryArea {
        &self.session
    }
}
