//! Where a controller runs: storage backends, preference source, document
//! root, and whether it may touch any of them.

use std::fmt;
use std::rc::Rc;

use crate::config::{BuiltInStorage, ThemeConfig};
use crate::dom::ThemeRoot;
use crate::headless::{ManualPreference, MemoryArea, MemoryBroadcast, MemoryRoot, TaskQueue};
use crate::storage::cookie::{decode_component, parse_cookies};
use crate::storage::{StorageBackends, ThemeStorage};
use crate::system::ColorSchemeSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Access {
    Interactive,
    Prerender,
    PrerenderWithCookies,
}

/// Runtime environment of a theme controller.
#[derive(Clone)]
pub struct ThemeEnv {
    backends: StorageBackends,
    preference: Rc<dyn ColorSchemeSource>,
    root: Rc<dyn ThemeRoot>,
    access: Access,
}

impl ThemeEnv {
    /// Interactive environment over the given seams.
    pub fn new(backends: StorageBackends, preference: Rc<dyn ColorSchemeSource>, root: Rc<dyn ThemeRoot>) -> Self {
        Self { backends, preference, root, access: Access::Interactive }
    }

    /// The current page in a browser build; the prerender environment
    /// everywhere else.
    pub fn browser() -> Self {
        #[cfg(feature = "hydrate")]
        {
            Self::new(
                StorageBackends::browser(),
                Rc::new(crate::system::MediaQueryPreference),
                Rc::new(crate::dom::DocumentRoot),
            )
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Self::prerender()
        }
    }

    /// Server rendering: default theme, light preference, no storage reads,
    /// no DOM writes, no listeners.
    pub fn prerender() -> Self {
        Self::headless(MemoryArea::new(), Access::Prerender)
    }

    /// Server rendering for a request carrying `cookie_header`. A
    /// cookie-backed configuration starts from the request's theme cookie.
    pub fn prerender_with_cookies(cookie_header: &str) -> Self {
        let jar = MemoryArea::new();
        for (name, value) in parse_cookies(cookie_header) {
            jar.seed(&decode_component(name), &value);
        }
        Self::headless(jar, Access::PrerenderWithCookies)
    }

    fn headless(cookies: MemoryArea, access: Access) -> Self {
        let backends = StorageBackends {
            local: Rc::new(MemoryArea::new()),
            session: Rc::new(MemoryArea::new()),
            cookie: Rc::new(cookies),
            broadcast: Rc::new(MemoryBroadcast::new(TaskQueue::default())),
        };
        Self {
            backends,
            preference: Rc::new(ManualPreference::default()),
            root: Rc::new(MemoryRoot::default()),
            access,
        }
    }

    /// Whether the controller may write the DOM, persist, and listen.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.access == Access::Interactive
    }

    /// Whether the initial theme is read from storage for `config`.
    #[must_use]
    pub fn reads_storage(&self, config: &ThemeConfig) -> bool {
        match self.access {
            Access::Interactive => true,
            Access::Prerender => false,
            Access::PrerenderWithCookies => config.storage().built_in() == Some(BuiltInStorage::Cookie),
        }
    }

    /// Storage adapter selected by `config`.
    #[must_use]
    pub fn storage_for(&self, config: &ThemeConfig) -> Rc<dyn ThemeStorage> {
        self.backends.adapter(config.storage())
    }

    #[must_use]
    pub fn preference(&self) -> Rc<dyn ColorSchemeSource> {
        Rc::clone(&self.preference)
    }

    #[must_use]
    pub fn root(&self) -> Rc<dyn ThemeRoot> {
        Rc::clone(&self.root)
    }
}

impl fmt::Debug for ThemeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeEnv").field("access", &self.access).finish_non_exhaustive()
    }
}
