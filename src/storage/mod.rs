//! Theme persistence and cross-tab change notification.
//!
//! SYSTEM CONTEXT
//! ==============
//! The controller only talks to [`ThemeStorage`]: four operations over a
//! string key. The three built-in adapters are strategies layered over two
//! raw seams supplied by the environment:
//!
//! - [`StorageArea`]: a synchronous key/value area that may fail
//!   (`localStorage`, `sessionStorage`, `document.cookie`, or memory).
//! - [`Broadcast`]: named message channels between documents of one origin.
//!
//! ERROR HANDLING
//! ==============
//! Areas report failures as [`StorageError`]. Adapters log them and degrade to
//! "no value" / no-op, so a disabled or full store never breaks the page.

pub mod area;
pub mod broadcast;
pub mod cookie;
mod persistent;
mod session;
#[cfg(feature = "hydrate")]
pub mod web;

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::rc::Rc;

use leptos::logging::warn;

use crate::cleanup::Cleanup;
use crate::config::{BuiltInStorage, StorageChoice};

pub use self::area::{StorageArea, StorageError};
pub use self::broadcast::{Broadcast, CHANNEL_PREFIX, channel_name};
pub use self::cookie::CookieStorage;
pub use self::persistent::PersistentStorage;
pub use self::session::SessionStorage;

/// Callback receiving a changed value, or `None` when the key was removed.
pub type ChangeHandler = Rc<dyn Fn(Option<String>)>;

/// Storage contract used by the theme controller.
///
/// Implementations must not panic or surface backend failures; an
/// unreadable value is reported as `None`.
pub trait ThemeStorage {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str);

    fn remove_item(&self, key: &str);

    /// Observe writes made by other documents. `None` means the backend
    /// cannot notify.
    fn subscribe(&self, _key: &str, _on_change: ChangeHandler) -> Option<Cleanup> {
        None
    }
}

/// Raw backends the built-in adapters are assembled from.
#[derive(Clone)]
pub struct StorageBackends {
    pub local: Rc<dyn StorageArea>,
    pub session: Rc<dyn StorageArea>,
    pub cookie: Rc<dyn StorageArea>,
    pub broadcast: Rc<dyn Broadcast>,
}

impl StorageBackends {
    /// Browser storage areas and `BroadcastChannel`.
    #[cfg(feature = "hydrate")]
    pub fn browser() -> Self {
        Self {
            local: Rc::new(web::WebStorageArea::local()),
            session: Rc::new(web::WebStorageArea::session()),
            cookie: Rc::new(web::WebCookieJar),
            broadcast: Rc::new(web::WebBroadcast::default()),
        }
    }

    /// Build the adapter selected by `choice`.
    #[must_use]
    pub fn adapter(&self, choice: &StorageChoice) -> Rc<dyn ThemeStorage> {
        match choice {
            StorageChoice::Custom(adapter) => Rc::clone(adapter),
            StorageChoice::BuiltIn(BuiltInStorage::LocalStorage) => {
                Rc::new(PersistentStorage::new(Rc::clone(&self.local)))
            }
            StorageChoice::BuiltIn(BuiltInStorage::SessionStorage) => Rc::new(SessionStorage::new(
                Rc::clone(&self.session),
                Rc::clone(&self.broadcast),
            )),
            StorageChoice::BuiltIn(BuiltInStorage::Cookie) => Rc::new(CookieStorage::new(Rc::clone(&self.cookie))),
        }
    }
}

/// Read through an area, logging and discarding failures.
fn read_or_warn(area: &dyn StorageArea, key: &str) -> Option<String> {
    match area.read(key) {
        Ok(value) => value,
        Err(err) => {
            warn!("theme storage read failed: key={key} err={err}");
            None
        }
    }
}

fn write_or_warn(area: &dyn StorageArea, key: &str, value: &str) -> bool {
    match area.write(key, value) {
        Ok(()) => true,
        Err(err) => {
            warn!("theme storage write failed: key={key} err={err}");
            false
        }
    }
}

fn delete_or_warn(area: &dyn StorageArea, key: &str) {
    if let Err(err) = area.delete(key) {
        warn!("theme storage delete failed: key={key} err={err}");
    }
}
