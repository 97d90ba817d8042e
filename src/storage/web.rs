//! Browser storage areas and broadcast transport. Requires a browser
//! environment.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::logging::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::cleanup::Cleanup;
use crate::storage::cookie::{expire_cookie_string, read_cookie, set_cookie_string};
use crate::storage::{Broadcast, ChangeHandler, StorageArea, StorageError};

fn js_error(err: &JsValue) -> StorageError {
    StorageError::Backend(format!("{err:?}"))
}

/// Which Web Storage area to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebStore {
    Local,
    Session,
}

/// `window.localStorage` or `window.sessionStorage`.
pub struct WebStorageArea {
    store: WebStore,
}

impl WebStorageArea {
    pub fn local() -> Self {
        Self { store: WebStore::Local }
    }

    pub fn session() -> Self {
        Self { store: WebStore::Session }
    }

    fn storage(&self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = match self.store {
            WebStore::Local => window.local_storage(),
            WebStore::Session => window.session_storage(),
        };
        match storage {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(StorageError::Unavailable),
            Err(err) => Err(js_error(&err)),
        }
    }
}

impl StorageArea for WebStorageArea {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(|err| js_error(&err))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(|err| js_error(&err))
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(|err| js_error(&err))
    }

    /// `storage` events only fire across documents for `localStorage`.
    fn watch(&self, key: &str, on_change: ChangeHandler) -> Option<Cleanup> {
        if self.store != WebStore::Local {
            return None;
        }
        let window = web_sys::window()?;
        let key = key.to_owned();
        let listener = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(move |event: web_sys::StorageEvent| {
            if event.key().as_deref() == Some(key.as_str()) {
                on_change(event.new_value());
            }
        });
        if let Err(err) = window.add_event_listener_with_callback("storage", listener.as_ref().unchecked_ref()) {
            warn!("theme storage listener failed: {err:?}");
            return None;
        }
        Some(Cleanup::new(move || {
            if let Err(err) =
                window.remove_event_listener_with_callback("storage", listener.as_ref().unchecked_ref())
            {
                warn!("theme storage listener removal failed: {err:?}");
            }
            drop(listener);
        }))
    }
}

/// `document.cookie`.
pub struct WebCookieJar;

impl WebCookieJar {
    fn document() -> Result<web_sys::HtmlDocument, StorageError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(StorageError::Unavailable)?;
        document
            .dyn_into::<web_sys::HtmlDocument>()
            .map_err(|_| StorageError::Unavailable)
    }
}

impl StorageArea for WebCookieJar {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let cookies = Self::document()?.cookie().map_err(|err| js_error(&err))?;
        Ok(read_cookie(&cookies, key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::document()?
            .set_cookie(&set_cookie_string(key, value))
            .map_err(|err| js_error(&err))
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        Self::document()?
            .set_cookie(&expire_cookie_string(key))
            .map_err(|err| js_error(&err))
    }
}

struct OpenChannel {
    id: u64,
    name: String,
    channel: web_sys::BroadcastChannel,
}

/// `BroadcastChannel` transport for one document. Posts go through the
/// channel this document listens on, which the browser never delivers back
/// to itself; with no listener a short-lived channel is opened instead.
#[derive(Default)]
pub struct WebBroadcast {
    open: Rc<RefCell<Vec<OpenChannel>>>,
    next_id: Cell<u64>,
}

impl Broadcast for WebBroadcast {
    fn post(&self, channel: &str, message: &str) -> Result<(), StorageError> {
        let message = JsValue::from_str(message);
        let listening = self
            .open
            .borrow()
            .iter()
            .find(|open| open.name == channel)
            .map(|open| open.channel.clone());
        if let Some(listening) = listening {
            return listening.post_message(&message).map_err(|err| js_error(&err));
        }
        let channel = web_sys::BroadcastChannel::new(channel).map_err(|err| js_error(&err))?;
        let posted = channel.post_message(&message).map_err(|err| js_error(&err));
        channel.close();
        posted
    }

    fn listen(&self, channel: &str, on_message: Rc<dyn Fn(String)>) -> Result<Cleanup, StorageError> {
        let name = channel.to_owned();
        let channel = web_sys::BroadcastChannel::new(channel).map_err(|err| js_error(&err))?;
        let listener = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |event: web_sys::MessageEvent| {
            if let Some(message) = event.data().as_string() {
                on_message(message);
            }
        });
        channel.set_onmessage(Some(listener.as_ref().unchecked_ref()));

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.open.borrow_mut().push(OpenChannel {
            id,
            name,
            channel: channel.clone(),
        });
        let open = Rc::downgrade(&self.open);
        Ok(Cleanup::new(move || {
            if let Some(open) = open.upgrade() {
                open.borrow_mut().retain(|entry| entry.id != id);
            }
            channel.set_onmessage(None);
            channel.close();
            drop(listener);
        }))
    }
}
