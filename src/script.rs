//! Pre-hydration bootstrap script.
//!
//! SYSTEM CONTEXT
//! ==============
//! Server-rendered markup reaches the browser before the WASM bundle. An
//! inline script in `<head>` applies the persisted theme synchronously so the
//! first paint already has the right attributes and `color-scheme`.
//!
//! DESIGN
//! ======
//! Each built-in backend has a fixed template: a function expression whose
//! only backend-specific part is the synchronous read. The provider
//! configuration is serialized as a JSON argument list and passed to the
//! template with `apply`, so no code is generated from data. After running,
//! the script removes its own element.
//!
//! Resolution mirrors the controller: forced theme, else persisted value,
//! else default; `system` resolved through the media query when enabled.
//! Any exception (blocked storage, missing APIs) skips application.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::collections::BTreeMap;

use leptos::logging::warn;
use serde::Serialize;

use crate::config::{Attribute, BuiltInStorage, ThemeConfig};

/// Template for one backend. Arguments, in order: attribute(s), storage key,
/// default theme, forced theme, catalog, value map, system resolution,
/// color-scheme emulation.
macro_rules! bootstrap_template {
    ($read:literal) => {
        concat!(
            "(function(a,k,d,f,t,v,s,c){",
            "var e=document.documentElement,b=[\"light\",\"dark\"];",
            "function r(){",
            $read,
            "}",
            "function u(n){",
            "var m=v?v[n]:n;",
            "(Array.isArray(a)?a:[a]).forEach(function(x){",
            "if(x===\"class\"){",
            "var l=v?t.map(function(y){return v[y]||y}).concat(Object.values(v)):t;",
            "e.classList.remove.apply(e.classList,l);",
            "if(m)e.classList.add(m)",
            "}else if(m){e.setAttribute(x,m)}else{e.removeAttribute(x)}",
            "});",
            "if(c){e.style.colorScheme=b.indexOf(n)>=0?n:b.indexOf(d)>=0?d:\"\"}",
            "}",
            "try{",
            "var n=f||r()||d;",
            "if(s&&n===\"system\"){n=window.matchMedia(\"(prefers-color-scheme: dark)\").matches?\"dark\":\"light\"}",
            "u(n)",
            "}catch(x){}",
            "})"
        )
    };
}

const LOCAL_STORAGE_TEMPLATE: &str = bootstrap_template!("return localStorage.getItem(k)");

const SESSION_STORAGE_TEMPLATE: &str = bootstrap_template!("return sessionStorage.getItem(k)");

const COOKIE_TEMPLATE: &str = bootstrap_template!(
    "var w=encodeURIComponent(k),p=document.cookie.split(\";\");\
     for(var i=0;i<p.length;i++){var q=p[i].trim(),j=q.indexOf(\"=\");\
     if(j>0&&q.slice(0,j)===w)return decodeURIComponent(q.slice(j+1))}\
     return null"
);

const SELF_REMOVE: &str = ";document.currentScript&&document.currentScript.remove()";

fn template(storage: BuiltInStorage) -> &'static str {
    match storage {
        BuiltInStorage::LocalStorage => LOCAL_STORAGE_TEMPLATE,
        BuiltInStorage::SessionStorage => SESSION_STORAGE_TEMPLATE,
        BuiltInStorage::Cookie => COOKIE_TEMPLATE,
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum AttributeArg<'a> {
    One(&'a Attribute),
    Many(&'a [Attribute]),
}

#[derive(Serialize)]
struct ScriptArgs<'a>(
    AttributeArg<'a>,
    &'a str,
    &'a str,
    Option<&'a str>,
    &'a [String],
    Option<&'a BTreeMap<String, String>>,
    bool,
    bool,
);

impl<'a> ScriptArgs<'a> {
    fn from_config(config: &'a ThemeConfig) -> Self {
        let attribute = match config.attributes() {
            [one] => AttributeArg::One(one),
            many => AttributeArg::Many(many),
        };
        Self(
            attribute,
            config.storage_key(),
            config.default_theme(),
            config.forced_theme(),
            config.themes(),
            config.value(),
            config.enable_system(),
            config.enable_color_scheme(),
        )
    }
}

/// Inline script for one provider configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapScript {
    body: String,
    nonce: Option<String>,
    attributes: BTreeMap<String, String>,
}

/// Build the bootstrap script for `config`, or `None` for a custom storage
/// adapter, which has no synchronous read path.
#[must_use]
pub fn bootstrap_script(config: &ThemeConfig) -> Option<BootstrapScript> {
    let storage = config.storage().built_in()?;
    let args = match serde_json::to_string(&ScriptArgs::from_config(config)) {
        Ok(args) => args,
        Err(err) => {
            warn!("theme script arguments failed to serialize: {err}");
            return None;
        }
    };
    let body = format!(
        "{}.apply(null,{}){SELF_REMOVE}",
        template(storage),
        args.replace('<', "\\u003c")
    );
    Some(BootstrapScript {
        body,
        nonce: config.nonce().map(str::to_owned),
        attributes: config.script_props().clone(),
    })
}

impl BootstrapScript {
    /// Script text for the element's content.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    /// Extra attributes requested for the element.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Complete `<script>` element. Attribute names that are not valid HTML
    /// names are dropped; the configured nonce overrides an extra `nonce`.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<script");
        for (name, value) in &self.attributes {
            if !is_attribute_name(name) || (self.nonce.is_some() && name.eq_ignore_ascii_case("nonce")) {
                continue;
            }
            html.push(' ');
            html.push_str(name);
            html.push_str("=\"");
            html.push_str(&escape_attribute(value));
            html.push('"');
        }
        if let Some(nonce) = &self.nonce {
            html.push_str(" nonce=\"");
            html.push_str(&escape_attribute(nonce));
            html.push('"');
        }
        html.push('>');
        html.push_str(&self.body);
        html.push_str("</script>");
        html
    }
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
