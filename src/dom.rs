//! Writing the resolved theme onto the document root.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`apply_theme`] is the single place that turns a theme name into DOM state:
//! class tokens or `data-*` attributes, the native `color-scheme` property,
//! and optional transition suppression around the swap. The root element sits
//! behind [`ThemeRoot`] so the same logic drives the real document and the
//! headless recorder used by tests.
//!
//! Applying is idempotent: the class dimension is cleared before the new token
//! is added, attributes are overwritten, and every suppression style element
//! is removed on the next tick.

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;

use crate::cleanup::Cleanup;
use crate::config::{Attribute, ThemeConfig};
use crate::theme::{SYSTEM_THEME, SystemTheme};

/// Stylesheet that disables CSS transitions while the theme is swapped.
pub const TRANSITION_SUPPRESSION_CSS: &str = "*,*::before,*::after{-webkit-transition:none!important;\
-moz-transition:none!important;-o-transition:none!important;-ms-transition:none!important;\
transition:none!important}";

/// Mutable view of the document root element.
pub trait ThemeRoot {
    fn remove_classes(&self, tokens: &[String]);

    fn add_class(&self, token: &str);

    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);

    /// Set the inline `color-scheme` property, or clear it with `None`.
    fn set_color_scheme(&self, scheme: Option<&str>);

    /// Insert [`TRANSITION_SUPPRESSION_CSS`]. Releasing the guard forces a
    /// restyle and removes the element on the next tick.
    fn suppress_transitions(&self, nonce: Option<&str>) -> Cleanup;
}

/// Apply `theme` to `root`.
///
/// `system` resolves the `system` pseudo-theme when system resolution is
/// enabled; otherwise the name is written as-is. `stale_class` is the token
/// returned by the previous call; it is removed along with the catalog
/// tokens, so names outside the catalog do not accumulate. Returns the class
/// token now on the root.
pub fn apply_theme(
    root: &dyn ThemeRoot,
    theme: &str,
    system: SystemTheme,
    config: &ThemeConfig,
    stale_class: Option<&str>,
) -> Option<String> {
    if theme.is_empty() {
        return stale_class.map(str::to_owned);
    }
    let resolved = if theme == SYSTEM_THEME && config.enable_system() {
        system.as_str()
    } else {
        theme
    };

    let _restore = config
        .disable_transition_on_change()
        .then(|| root.suppress_transitions(config.nonce()));

    let token = config.dom_token(resolved);
    let mut class = None;
    for attribute in config.attributes() {
        match attribute {
            Attribute::Class => {
                let mut tokens = config.class_tokens();
                if let Some(stale) = stale_class.filter(|s| !tokens.iter().any(|t| t == s)) {
                    tokens.push(stale.to_owned());
                }
                root.remove_classes(&tokens);
                if let Some(token) = token {
                    root.add_class(token);
                    class = Some(token.to_owned());
                }
            }
            Attribute::Data(name) => match token {
                Some(token) => root.set_attribute(name, token),
                None => root.remove_attribute(name),
            },
        }
    }

    if config.enable_color_scheme() {
        root.set_color_scheme(config.color_scheme_for(resolved));
    }
    class
}

/// `document.documentElement` of the current window. Requires a browser
/// environment.
#[cfg(feature = "hydrate")]
pub struct DocumentRoot;

#[cfg(feature = "hydrate")]
mod document {
    use leptos::logging::warn;
    use wasm_bindgen::JsCast;

    use super::{DocumentRoot, TRANSITION_SUPPRESSION_CSS, ThemeRoot};
    use crate::cleanup::Cleanup;

    fn root_element() -> Option<web_sys::HtmlElement> {
        web_sys::window()?
            .document()?
            .document_element()?
            .dyn_ref::<web_sys::HtmlElement>()
            .cloned()
    }

    impl ThemeRoot for DocumentRoot {
        fn remove_classes(&self, tokens: &[String]) {
            let Some(el) = root_element() else { return };
            let classes = el.class_list();
            for token in tokens {
                if let Err(err) = classes.remove_1(token) {
                    warn!("theme class removal failed: token={token} err={err:?}");
                }
            }
        }

        fn add_class(&self, token: &str) {
            let Some(el) = root_element() else { return };
            if let Err(err) = el.class_list().add_1(token) {
                warn!("theme class add failed: token={token} err={err:?}");
            }
        }

        fn set_attribute(&self, name: &str, value: &str) {
            let Some(el) = root_element() else { return };
            if let Err(err) = el.set_attribute(name, value) {
                warn!("theme attribute failed: name={name} err={err:?}");
            }
        }

        fn remove_attribute(&self, name: &str) {
            let Some(el) = root_element() else { return };
            if let Err(err) = el.remove_attribute(name) {
                warn!("theme attribute removal failed: name={name} err={err:?}");
            }
        }

        fn set_color_scheme(&self, scheme: Option<&str>) {
            let Some(el) = root_element() else { return };
            let style = el.style();
            let result = match scheme {
                Some(scheme) => style.set_property("color-scheme", scheme),
                None => style.remove_property("color-scheme").map(drop),
            };
            if let Err(err) = result {
                warn!("color-scheme update failed: {err:?}");
            }
        }

        fn suppress_transitions(&self, nonce: Option<&str>) -> Cleanup {
            let Some(window) = web_sys::window() else { return Cleanup::noop() };
            let Some(document) = window.document() else { return Cleanup::noop() };
            let (Some(head), Ok(style)) = (document.head(), document.create_element("style")) else {
                return Cleanup::noop();
            };
            if let Some(nonce) = nonce {
                if let Err(err) = style.set_attribute("nonce", nonce) {
                    warn!("transition style nonce failed: {err:?}");
                }
            }
            style.set_text_content(Some(TRANSITION_SUPPRESSION_CSS));
            if let Err(err) = head.append_child(&style) {
                warn!("transition style insert failed: {err:?}");
                return Cleanup::noop();
            }

            Cleanup::new(move || {
                // Reading computed style flushes the pending style change.
                if let Some(body) = document.body() {
                    if let Err(err) = window.get_computed_style(&body) {
                        warn!("forced restyle failed: {err:?}");
                    }
                }
                gloo_timers::callback::Timeout::new(1, move || style.remove()).forget();
            })
        }
    }
}
