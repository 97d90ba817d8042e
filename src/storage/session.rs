use std::rc::Rc;

use leptos::logging::warn;

use crate::cleanup::Cleanup;
use crate::storage::{
    Broadcast, ChangeHandler, StorageArea, ThemeStorage, channel_name, delete_or_warn, read_or_warn, write_or_warn,
};

/// Adapter over a tab-scoped area (`sessionStorage`).
///
/// The platform raises no cross-tab event for this area, so every successful
/// write is also posted on the key's broadcast channel.
pub struct SessionStorage {
    area: Rc<dyn StorageArea>,
    broadcast: Rc<dyn Broadcast>,
}

impl SessionStorage {
    pub fn new(area: Rc<dyn StorageArea>, broadcast: Rc<dyn Broadcast>) -> Self {
        Self { area, broadcast }
    }
}

impl ThemeStorage for SessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        read_or_warn(self.area.as_ref(), key)
    }

    fn set_item(&self, key: &str, value: &str) {
        if !write_or_warn(self.area.as_ref(), key, value) {
            return;
        }
        if let Err(err) = self.broadcast.post(&channel_name(key), value) {
            warn!("theme broadcast failed: key={key} err={err}");
        }
    }

    fn remove_item(&self, key: &str) {
        delete_or_warn(self.area.as_ref(), key);
    }

    fn subscribe(&self, key: &str, on_change: ChangeHandler) -> Option<Cleanup> {
        let on_message: Rc<dyn Fn(String)> = Rc::new(move |message| on_change(Some(message)));
        match self.broadcast.listen(&channel_name(key), on_message) {
            Ok(cleanup) => Some(cleanup),
            Err(err) => {
                warn!("theme broadcast listen failed: key={key} err={err}");
                None
            }
        }
    }
}
