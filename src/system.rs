//! OS color-scheme preference observer.
//!
//! Reads `(prefers-color-scheme: dark)` in the browser. Outside a browser
//! (SSR, native tests) the preference is always [`SystemTheme::Light`] and
//! watching never fires after the initial call.

use std::rc::Rc;

use crate::cleanup::Cleanup;
use crate::theme::SystemTheme;

/// Callback receiving the observed preference.
pub type PreferenceHandler = Rc<dyn Fn(SystemTheme)>;

/// Source of the OS color-scheme preference.
pub trait ColorSchemeSource {
    /// Current preference. Unavailable sources report `Light`.
    fn current(&self) -> SystemTheme;

    /// Attach `on_change`, calling it once immediately with the current
    /// value. Dropping the guard detaches it.
    fn watch(&self, on_change: PreferenceHandler) -> Cleanup;
}

/// The dark-mode media query of the current window.
#[derive(Clone, Copy, Debug, Default)]
pub struct MediaQueryPreference;

#[cfg(feature = "hydrate")]
impl MediaQueryPreference {
    fn media() -> Option<web_sys::MediaQueryList> {
        let window = web_sys::window()?;
        match window.match_media(crate::theme::DARK_MEDIA_QUERY) {
            Ok(media) => media,
            Err(err) => {
                leptos::logging::warn!("color-scheme query failed: {err:?}");
                None
            }
        }
    }
}

impl ColorSchemeSource for MediaQueryPreference {
    fn current(&self) -> SystemTheme {
        #[cfg(feature = "hydrate")]
        {
            Self::media().map_or(SystemTheme::Light, |media| SystemTheme::from_prefers_dark(media.matches()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            SystemTheme::Light
        }
    }

    fn watch(&self, on_change: PreferenceHandler) -> Cleanup {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen::JsCast;
            use wasm_bindgen::closure::Closure;

            let Some(media) = Self::media() else {
                on_change(SystemTheme::Light);
                return Cleanup::noop();
            };
            let handler = Rc::clone(&on_change);
            let listener = Closure::<dyn FnMut(web_sys::MediaQueryListEvent)>::new(
                move |event: web_sys::MediaQueryListEvent| {
                    handler(SystemTheme::from_prefers_dark(event.matches()));
                },
            );
            if let Err(err) = media.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref()) {
                leptos::logging::warn!("color-scheme listener failed: {err:?}");
            }
            on_change(SystemTheme::from_prefers_dark(media.matches()));
            Cleanup::new(move || {
                if let Err(err) =
                    media.remove_event_listener_with_callback("change", listener.as_ref().unchecked_ref())
                {
                    leptos::logging::warn!("color-scheme listener removal failed: {err:?}");
                }
                drop(listener);
            })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            on_change(SystemTheme::Light);
            Cleanup::noop()
        }
    }
}
