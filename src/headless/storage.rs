//! In-memory storage areas, broadcast hub and custom adapter.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::cleanup::Cleanup;
use crate::headless::{EXTERNAL_TAB, TaskQueue};
use crate::storage::{Broadcast, ChangeHandler, StorageArea, StorageError, ThemeStorage};

struct Watcher {
    id: u64,
    tab: u32,
    key: String,
    on_change: ChangeHandler,
}

#[derive(Default)]
struct AreaShared {
    entries: RefCell<BTreeMap<String, String>>,
    unavailable: Cell<bool>,
    events: Option<TaskQueue>,
    watchers: RefCell<Vec<Watcher>>,
    next_watcher: Cell<u64>,
    writes: Cell<u32>,
}

impl AreaShared {
    /// Queue a change event for every watcher of `key` outside tab `origin`.
    /// Delivery is skipped if the watcher detached in the meantime.
    fn notify(self: &Rc<Self>, origin: u32, key: &str, value: Option<&str>) {
        let Some(queue) = &self.events else { return };
        let targets: Vec<u64> = self
            .watchers
            .borrow()
            .iter()
            .filter(|w| w.tab != origin && w.key == key)
            .map(|w| w.id)
            .collect();
        for id in targets {
            let shared = Rc::downgrade(self);
            let value = value.map(str::to_owned);
            queue.push(move || {
                let Some(shared) = shared.upgrade() else { return };
                let handler = shared
                    .watchers
                    .borrow()
                    .iter()
                    .find(|w| w.id == id)
                    .map(|w| Rc::clone(&w.on_change));
                if let Some(handler) = handler {
                    handler(value);
                }
            });
        }
    }
}

/// Key/value area held in memory.
///
/// Clones and [`MemoryArea::view_for_tab`] views share one set of entries.
/// An area created with [`MemoryArea::with_events`] raises change events on
/// the task queue for watchers in other tabs, like `localStorage`.
#[derive(Clone, Default)]
pub struct MemoryArea {
    shared: Rc<AreaShared>,
    tab: u32,
}

impl MemoryArea {
    /// Area without change events (`sessionStorage`, cookies).
    pub fn new() -> Self {
        Self::default()
    }

    /// Area raising cross-tab change events on `queue`.
    pub fn with_events(queue: TaskQueue) -> Self {
        Self {
            shared: Rc::new(AreaShared { events: Some(queue), ..AreaShared::default() }),
            tab: EXTERNAL_TAB,
        }
    }

    /// The same entries as seen from tab `tab`.
    #[must_use]
    pub fn view_for_tab(&self, tab: u32) -> Self {
        Self { shared: Rc::clone(&self.shared), tab }
    }

    /// Make every operation fail with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.shared.unavailable.set(!available);
    }

    /// Store a value without raising events or counting a write.
    pub fn seed(&self, key: &str, value: &str) {
        self.shared.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    /// Current value, regardless of availability.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.shared.entries.borrow().get(key).cloned()
    }

    /// Number of successful writes and deletes.
    #[must_use]
    pub fn writes(&self) -> u32 {
        self.shared.writes.get()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.shared.unavailable.get() { Err(StorageError::Unavailable) } else { Ok(()) }
    }
}

impl StorageArea for MemoryArea {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.peek(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        let previous = self.shared.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        self.shared.writes.set(self.shared.writes.get() + 1);
        if previous.as_deref() != Some(value) {
            self.shared.notify(self.tab, key, Some(value));
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        let previous = self.shared.entries.borrow_mut().remove(key);
        self.shared.writes.set(self.shared.writes.get() + 1);
        if previous.is_some() {
            self.shared.notify(self.tab, key, None);
        }
        Ok(())
    }

    fn watch(&self, key: &str, on_change: ChangeHandler) -> Option<Cleanup> {
        self.shared.events.as_ref()?;
        let id = self.shared.next_watcher.get();
        self.shared.next_watcher.set(id + 1);
        self.shared.watchers.borrow_mut().push(Watcher {
            id,
            tab: self.tab,
            key: key.to_owned(),
            on_change,
        });
        let shared = Rc::downgrade(&self.shared);
        Some(Cleanup::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.watchers.borrow_mut().retain(|w| w.id != id);
            }
        }))
    }
}

struct ChannelListener {
    id: u64,
    endpoint: u32,
    channel: String,
    on_message: Rc<dyn Fn(String)>,
}

struct Hub {
    queue: TaskQueue,
    listeners: RefCell<Vec<ChannelListener>>,
    next_listener: Cell<u64>,
}

/// Broadcast hub shared by every simulated tab of an origin. Messages are
/// delivered through the task queue to the channel's listeners in other tabs.
#[derive(Clone)]
pub struct MemoryBroadcast {
    hub: Rc<Hub>,
    endpoint: u32,
}

impl MemoryBroadcast {
    /// Hub seen from outside every tab.
    pub fn new(queue: TaskQueue) -> Self {
        Self {
            hub: Rc::new(Hub {
                queue,
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
            endpoint: EXTERNAL_TAB,
        }
    }

    /// The same hub as seen from tab `tab`.
    #[must_use]
    pub fn view_for_tab(&self, tab: u32) -> Self {
        Self {
            hub: Rc::clone(&self.hub),
            endpoint: tab,
        }
    }

    /// Live listeners on `channel`.
    #[must_use]
    pub fn listener_count(&self, channel: &str) -> usize {
        self.hub.listeners.borrow().iter().filter(|l| l.channel == channel).count()
    }
}

impl Broadcast for MemoryBroadcast {
    fn post(&self, channel: &str, message: &str) -> Result<(), StorageError> {
        let targets: Vec<u64> = self
            .hub
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.channel == channel && l.endpoint != self.endpoint)
            .map(|l| l.id)
            .collect();
        for id in targets {
            let hub = Rc::downgrade(&self.hub);
            let message = message.to_owned();
            self.hub.queue.push(move || deliver(&hub, id, message));
        }
        Ok(())
    }

    fn listen(&self, channel: &str, on_message: Rc<dyn Fn(String)>) -> Result<Cleanup, StorageError> {
        let id = self.hub.next_listener.get();
        self.hub.next_listener.set(id + 1);
        self.hub.listeners.borrow_mut().push(ChannelListener {
            id,
            endpoint: self.endpoint,
            channel: channel.to_owned(),
            on_message,
        });
        let hub = Rc::downgrade(&self.hub);
        Ok(Cleanup::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.listeners.borrow_mut().retain(|l| l.id != id);
            }
        }))
    }
}

fn deliver(hub: &Weak<Hub>, id: u64, message: String) {
    let Some(hub) = hub.upgrade() else { return };
    let handler = hub
        .listeners
        .borrow()
        .iter()
        .find(|l| l.id == id)
        .map(|l| Rc::clone(&l.on_message));
    if let Some(handler) = handler {
        handler(message);
    }
}

/// Minimal host-supplied adapter: a private map with no change notification.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl ThemeStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    fn remove_item(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}
