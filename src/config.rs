//! Provider configuration: raw options in, validated configuration out.
//!
//! SYSTEM CONTEXT
//! ==============
//! Host applications describe a provider with [`ThemeOptions`], either through
//! the builder methods or by deserializing JSON with the familiar camelCase
//! option names. [`ThemeOptions::build`] fills in every default and rejects
//! inputs the DOM applier or the bootstrap script could not honor, so the
//! rest of the crate only ever sees a consistent [`ThemeConfig`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::storage::ThemeStorage;
use crate::theme::{SYSTEM_THEME, is_color_scheme};

/// Default storage key for the persisted theme.
pub const DEFAULT_STORAGE_KEY: &str = "theme";

/// Default DOM attribute receiving the theme name.
pub const DEFAULT_ATTRIBUTE: &str = "data-theme";

/// Error returned by [`ThemeOptions::build`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The attribute is neither `class` nor a `data-*` attribute.
    #[error("unsupported theme attribute `{0}`: expected `class` or a `data-*` name")]
    UnsupportedAttribute(String),
    /// An empty attribute list was supplied.
    #[error("at least one theme attribute is required")]
    NoAttributes,
    /// The storage key is empty.
    #[error("storage key must not be empty")]
    EmptyStorageKey,
    /// The theme catalog is empty.
    #[error("theme catalog must not be empty")]
    EmptyCatalog,
    /// The catalog lists the reserved `system` pseudo-theme.
    #[error("`system` is reserved and cannot appear in the theme catalog")]
    ReservedThemeName,
    /// The catalog lists the same theme twice.
    #[error("theme `{0}` appears more than once in the catalog")]
    DuplicateTheme(String),
    /// `system` is the default theme but system resolution is turned off.
    #[error("default theme is `system` but system resolution is disabled")]
    SystemDisabled,
    /// The storage identifier is not one of the built-in backends.
    #[error("unknown storage backend `{0}`")]
    UnknownStorage(String),
    /// The options document could not be parsed.
    #[error("invalid theme options: {0}")]
    Options(#[from] serde_json::Error),
}

/// DOM attribute that carries the active theme.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// The root element's class list.
    Class,
    /// A `data-*` attribute, stored with its full name.
    Data(String),
}

impl Attribute {
    /// Parse an attribute name, accepting `class` and `data-*` only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedAttribute`] for any other name.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        if name == "class" {
            return Ok(Self::Class);
        }
        match name.strip_prefix("data-") {
            Some(rest) if !rest.is_empty() => Ok(Self::Data(name.to_owned())),
            _ => Err(ConfigError::UnsupportedAttribute(name.to_owned())),
        }
    }

    /// Attribute name as written on the element.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Class => "class",
            Self::Data(name) => name,
        }
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One attribute name or a list of them, as accepted by `attribute`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AttributeInput {
    One(String),
    Many(Vec<String>),
}

/// Storage backends with a synchronous bootstrap path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltInStorage {
    /// Durable per-origin store; native cross-tab events.
    #[default]
    #[serde(rename = "localStorage")]
    LocalStorage,
    /// Tab-scoped store; cross-tab sync through a broadcast channel.
    #[serde(rename = "sessionStorage")]
    SessionStorage,
    /// HTTP cookie; readable on the server, no cross-tab sync.
    #[serde(rename = "cookie")]
    Cookie,
}

impl BuiltInStorage {
    /// Identifier used in options documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocalStorage => "localStorage",
            Self::SessionStorage => "sessionStorage",
            Self::Cookie => "cookie",
        }
    }
}

impl FromStr for BuiltInStorage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "localStorage" => Ok(Self::LocalStorage),
            "sessionStorage" => Ok(Self::SessionStorage),
            "cookie" => Ok(Self::Cookie),
            other => Err(ConfigError::UnknownStorage(other.to_owned())),
        }
    }
}

/// Selected storage strategy.
#[derive(Clone)]
pub enum StorageChoice {
    BuiltIn(BuiltInStorage),
    /// Host-supplied adapter. Never gets a bootstrap script.
    Custom(Rc<dyn ThemeStorage>),
}

impl StorageChoice {
    /// The built-in backend, if one is selected.
    #[must_use]
    pub fn built_in(&self) -> Option<BuiltInStorage> {
        match self {
            Self::BuiltIn(kind) => Some(*kind),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Debug for StorageChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn(kind) => f.debug_tuple("BuiltIn").field(kind).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Raw provider options. Every field is optional; see [`ThemeOptions::build`]
/// for the defaults.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThemeOptions {
    pub forced_theme: Option<String>,
    pub disable_transition_on_change: Option<bool>,
    pub enable_system: Option<bool>,
    pub enable_color_scheme: Option<bool>,
    pub storage_key: Option<String>,
    pub themes: Option<Vec<String>>,
    pub default_theme: Option<String>,
    pub attribute: Option<AttributeInput>,
    pub value: Option<BTreeMap<String, String>>,
    pub nonce: Option<String>,
    pub script_props: Option<BTreeMap<String, String>>,
    pub storage: Option<BuiltInStorage>,
    #[serde(skip)]
    custom_storage: Option<Rc<dyn ThemeStorage>>,
}

impl ThemeOptions {
    /// Parse options from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Options`] for malformed JSON, unknown keys or
    /// unknown storage identifiers.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    #[must_use]
    pub fn forced_theme(mut self, theme: impl Into<String>) -> Self {
        self.forced_theme = Some(theme.into());
        self
    }

    #[must_use]
    pub fn disable_transition_on_change(mut self, disable: bool) -> Self {
        self.disable_transition_on_change = Some(disable);
        self
    }

    #[must_use]
    pub fn enable_system(mut self, enable: bool) -> Self {
        self.enable_system = Some(enable);
        self
    }

    #[must_use]
    pub fn enable_color_scheme(mut self, enable: bool) -> Self {
        self.enable_color_scheme = Some(enable);
        self
    }

    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn themes<I, S>(mut self, themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.themes = Some(themes.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn default_theme(mut self, theme: impl Into<String>) -> Self {
        self.default_theme = Some(theme.into());
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = Some(AttributeInput::One(name.into()));
        self
    }

    #[must_use]
    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attribute = Some(AttributeInput::Many(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Map theme names to different DOM tokens.
    #[must_use]
    pub fn value<I, K, V>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.value = Some(mapping.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Extra attribute placed on the bootstrap `<script>` element.
    #[must_use]
    pub fn script_prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.script_props
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: BuiltInStorage) -> Self {
        self.storage = Some(storage);
        self.custom_storage = None;
        self
    }

    /// Use a host-supplied storage adapter instead of a built-in backend.
    #[must_use]
    pub fn custom_storage(mut self, adapter: Rc<dyn ThemeStorage>) -> Self {
        self.custom_storage = Some(adapter);
        self.storage = None;
        self
    }

    /// Apply defaults and validate.
    ///
    /// Defaults: no forced theme, transitions left alone, system resolution
    /// and color-scheme emulation on, key `"theme"`, catalog
    /// `["light", "dark"]`, default theme `"system"` (or `"light"` without
    /// system resolution), attribute `data-theme`, `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid option.
    pub fn build(self) -> Result<ThemeConfig, ConfigError> {
        let enable_system = self.enable_system.unwrap_or(true);

        let attribute_names = match self.attribute {
            None => vec![DEFAULT_ATTRIBUTE.to_owned()],
            Some(AttributeInput::One(name)) => vec![name],
            Some(AttributeInput::Many(names)) => names,
        };
        if attribute_names.is_empty() {
            return Err(ConfigError::NoAttributes);
        }
        let attributes = attribute_names
            .iter()
            .map(String::as_str)
            .map(Attribute::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let storage_key = self.storage_key.unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_owned());
        if storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }

        let themes = self.themes.unwrap_or_else(default_themes);
        validate_catalog(&themes)?;

        let default_theme = self
            .default_theme
            .unwrap_or_else(|| fallback_default(enable_system).to_owned());
        if default_theme == SYSTEM_THEME && !enable_system {
            return Err(ConfigError::SystemDisabled);
        }

        let storage = match self.custom_storage {
            Some(adapter) => StorageChoice::Custom(adapter),
            None => StorageChoice::BuiltIn(self.storage.unwrap_or_default()),
        };

        Ok(ThemeConfig {
            forced_theme: self.forced_theme.filter(|t| !t.is_empty()),
            disable_transition_on_change: self.disable_transition_on_change.unwrap_or(false),
            enable_system,
            enable_color_scheme: self.enable_color_scheme.unwrap_or(true),
            storage_key,
            themes,
            default_theme,
            attributes,
            value: self.value,
            nonce: self.nonce.filter(|n| !n.is_empty()),
            script_props: self.script_props.unwrap_or_default(),
            storage,
        })
    }
}

fn default_themes() -> Vec<String> {
    vec!["light".to_owned(), "dark".to_owned()]
}

fn fallback_default(enable_system: bool) -> &'static str {
    if enable_system { SYSTEM_THEME } else { "light" }
}

fn validate_catalog(themes: &[String]) -> Result<(), ConfigError> {
    if themes.is_empty() {
        return Err(ConfigError::EmptyCatalog);
    }
    for (i, theme) in themes.iter().enumerate() {
        if theme == SYSTEM_THEME {
            return Err(ConfigError::ReservedThemeName);
        }
        if themes[..i].contains(theme) {
            return Err(ConfigError::DuplicateTheme(theme.clone()));
        }
    }
    Ok(())
}

/// Validated, immutable provider configuration.
#[derive(Clone, Debug)]
pub struct ThemeConfig {
    forced_theme: Option<String>,
    disable_transition_on_change: bool,
    enable_system: bool,
    enable_color_scheme: bool,
    storage_key: String,
    themes: Vec<String>,
    default_theme: String,
    attributes: Vec<Attribute>,
    value: Option<BTreeMap<String, String>>,
    nonce: Option<String>,
    script_props: BTreeMap<String, String>,
    storage: StorageChoice,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            forced_theme: None,
            disable_transition_on_change: false,
            enable_system: true,
            enable_color_scheme: true,
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            themes: default_themes(),
            default_theme: SYSTEM_THEME.to_owned(),
            attributes: vec![Attribute::Data(DEFAULT_ATTRIBUTE.to_owned())],
            value: None,
            nonce: None,
            script_props: BTreeMap::new(),
            storage: StorageChoice::BuiltIn(BuiltInStorage::LocalStorage),
        }
    }
}

impl ThemeConfig {
    /// Start from [`ThemeOptions::default`].
    #[must_use]
    pub fn builder() -> ThemeOptions {
        ThemeOptions::default()
    }

    #[must_use]
    pub fn forced_theme(&self) -> Option<&str> {
        self.forced_theme.as_deref()
    }

    #[must_use]
    pub fn disable_transition_on_change(&self) -> bool {
        self.disable_transition_on_change
    }

    #[must_use]
    pub fn enable_system(&self) -> bool {
        self.enable_system
    }

    #[must_use]
    pub fn enable_color_scheme(&self) -> bool {
        self.enable_color_scheme
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Configured catalog, without `system`.
    #[must_use]
    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    #[must_use]
    pub fn default_theme(&self) -> &str {
        &self.default_theme
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn value(&self) -> Option<&BTreeMap<String, String>> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    #[must_use]
    pub fn script_props(&self) -> &BTreeMap<String, String> {
        &self.script_props
    }

    #[must_use]
    pub fn storage(&self) -> &StorageChoice {
        &self.storage
    }

    /// Catalog exposed to consumers: the configured themes, plus `system`
    /// when system resolution is enabled.
    #[must_use]
    pub fn exposed_themes(&self) -> Vec<String> {
        let mut themes = self.themes.clone();
        if self.enable_system {
            themes.push(SYSTEM_THEME.to_owned());
        }
        themes
    }

    /// DOM token written for `theme`. Without a value map this is the theme
    /// name itself; with one, themes missing from the map have no token.
    #[must_use]
    pub fn dom_token<'a>(&'a self, theme: &'a str) -> Option<&'a str> {
        match &self.value {
            None => Some(theme),
            Some(map) => map.get(theme).map(String::as_str),
        }
    }

    /// Every class token this provider may have added to the root element.
    #[must_use]
    pub fn class_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        let mut push = |token: &str| {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_owned());
            }
        };
        match &self.value {
            None => self.themes.iter().for_each(|t| push(t.as_str())),
            Some(map) => {
                for theme in &self.themes {
                    push(map.get(theme).map_or(theme.as_str(), String::as_str));
                }
                map.values().for_each(|t| push(t.as_str()));
            }
        }
        tokens
    }

    /// Value for the `color-scheme` style property when `resolved` is applied.
    #[must_use]
    pub fn color_scheme_for<'a>(&'a self, resolved: &'a str) -> Option<&'a str> {
        if is_color_scheme(resolved) {
            Some(resolved)
        } else if is_color_scheme(&self.default_theme) {
            Some(&self.default_theme)
        } else {
            None
        }
    }
}
