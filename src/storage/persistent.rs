use std::rc::Rc;

use crate::cleanup::Cleanup;
use crate::storage::{ChangeHandler, StorageArea, ThemeStorage, delete_or_warn, read_or_warn, write_or_warn};

/// Adapter over a durable per-origin area (`localStorage`). Cross-tab
/// changes arrive through the area's own change event.
pub struct PersistentStorage {
    area: Rc<dyn StorageArea>,
}

impl PersistentStorage {
    pub fn new(area: Rc<dyn StorageArea>) -> Self {
        Self { area }
    }
}

impl ThemeStorage for PersistentStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        read_or_warn(self.area.as_ref(), key)
    }

    fn set_item(&self, key: &str, value: &str) {
        write_or_warn(self.area.as_ref(), key, value);
    }

    fn remove_item(&self, key: &str) {
        delete_or_warn(self.area.as_ref(), key);
    }

    fn subscribe(&self, key: &str, on_change: ChangeHandler) -> Option<Cleanup> {
        self.area.watch(key, on_change)
    }
}
