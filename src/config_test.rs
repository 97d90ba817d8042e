use super::*;

use crate::headless::MemoryStorage;

// =============================================================
// Defaults
// =============================================================

#[test]
fn defaults_match_documented_options() {
    let config = ThemeOptions::default().build().expect("defaults are valid");
    assert_eq!(config.forced_theme(), None);
    assert!(!config.disable_transition_on_change());
    assert!(config.enable_system());
    assert!(config.enable_color_scheme());
    assert_eq!(config.storage_key(), "theme");
    assert_eq!(config.themes(), ["light", "dark"]);
    assert_eq!(config.default_theme(), "system");
    assert_eq!(config.attributes(), [Attribute::Data("data-theme".to_owned())]);
    assert!(config.value().is_none());
    assert_eq!(config.storage().built_in(), Some(BuiltInStorage::LocalStorage));
}

#[test]
fn default_impl_agrees_with_built_defaults() {
    let built = ThemeOptions::default().build().expect("defaults are valid");
    let direct = ThemeConfig::default();
    assert_eq!(built.default_theme(), direct.default_theme());
    assert_eq!(built.themes(), direct.themes());
    assert_eq!(built.attributes(), direct.attributes());
    assert_eq!(built.storage_key(), direct.storage_key());
}

#[test]
fn default_theme_falls_back_to_light_without_system() {
    let config = ThemeConfig::builder().enable_system(false).build().expect("valid");
    assert_eq!(config.default_theme(), "light");
    assert_eq!(config.exposed_themes(), ["light", "dark"]);
}

#[test]
fn exposed_themes_append_system_when_enabled() {
    let config = ThemeConfig::builder()
        .themes(["light", "dark", "ocean"])
        .build()
        .expect("valid");
    assert_eq!(config.exposed_themes(), ["light", "dark", "ocean", "system"]);
}

// =============================================================
// Validation
// =============================================================

#[test]
fn rejects_unknown_attribute_kinds() {
    let err = ThemeConfig::builder().attribute("style").build().unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedAttribute(name) if name == "style"));

    let err = ThemeConfig::builder().attribute("data-").build().unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedAttribute(_)));
}

#[test]
fn accepts_class_and_multiple_data_attributes() {
    let config = ThemeConfig::builder()
        .attributes(["class", "data-mode"])
        .build()
        .expect("valid");
    assert_eq!(
        config.attributes(),
        [Attribute::Class, Attribute::Data("data-mode".to_owned())]
    );
}

#[test]
fn rejects_empty_attribute_list() {
    let err = ThemeConfig::builder()
        .attributes(Vec::<String>::new())
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::NoAttributes));
}

#[test]
fn rejects_empty_storage_key() {
    let err = ThemeConfig::builder().storage_key("").build().unwrap_err();
    assert!(matches!(err, ConfigError::EmptyStorageKey));
}

#[test]
fn rejects_bad_catalogs() {
    let err = ThemeConfig::builder()
        .themes(Vec::<String>::new())
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::EmptyCatalog));

    let err = ThemeConfig::builder().themes(["light", "system"]).build().unwrap_err();
    assert!(matches!(err, ConfigError::ReservedThemeName));

    let err = ThemeConfig::builder().themes(["light", "dark", "light"]).build().unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateTheme(name) if name == "light"));
}

#[test]
fn rejects_system_default_when_system_disabled() {
    let err = ThemeConfig::builder()
        .enable_system(false)
        .default_theme("system")
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::SystemDisabled));
}

#[test]
fn empty_forced_theme_and_nonce_are_ignored() {
    let config = ThemeConfig::builder().forced_theme("").nonce("").build().expect("valid");
    assert_eq!(config.forced_theme(), None);
    assert_eq!(config.nonce(), None);
}

// =============================================================
// JSON options
// =============================================================

#[test]
fn parses_camel_case_options() {
    let options = ThemeOptions::from_json(
        r#"{
            "themes": ["light", "dark", "ocean"],
            "defaultTheme": "ocean",
            "attribute": ["class", "data-theme"],
            "storageKey": "app-theme",
            "storage": "sessionStorage",
            "value": {"dark": "theme-dark"},
            "disableTransitionOnChange": true,
            "scriptProps": {"id": "theme-boot"}
        }"#,
    )
    .expect("parse");
    let config = options.build().expect("valid");
    assert_eq!(config.default_theme(), "ocean");
    assert_eq!(config.storage_key(), "app-theme");
    assert_eq!(config.storage().built_in(), Some(BuiltInStorage::SessionStorage));
    assert!(config.disable_transition_on_change());
    assert_eq!(config.attributes().len(), 2);
    assert_eq!(config.script_props().get("id").map(String::as_str), Some("theme-boot"));
}

#[test]
fn rejects_unknown_option_keys() {
    let err = ThemeOptions::from_json(r#"{"darkMode": true}"#).err().expect("unknown key");
    assert!(matches!(err, ConfigError::Options(_)));
}

#[test]
fn rejects_unknown_storage_identifier() {
    assert!(ThemeOptions::from_json(r#"{"storage": "indexedDb"}"#).is_err());
    let err = "indexedDb".parse::<BuiltInStorage>().unwrap_err();
    assert!(matches!(err, ConfigError::UnknownStorage(name) if name == "indexedDb"));
    assert_eq!("cookie".parse::<BuiltInStorage>().expect("known"), BuiltInStorage::Cookie);
}

#[test]
fn custom_storage_replaces_built_in_choice() {
    let adapter: Rc<dyn ThemeStorage> = Rc::new(MemoryStorage::default());
    let config = ThemeConfig::builder()
        .storage(BuiltInStorage::Cookie)
        .custom_storage(adapter)
        .build()
        .expect("valid");
    assert!(matches!(config.storage(), StorageChoice::Custom(_)));
    assert_eq!(config.storage().built_in(), None);
}

// =============================================================
// DOM token helpers
// =============================================================

#[test]
fn dom_token_uses_value_map_when_present() {
    let plain = ThemeConfig::default();
    assert_eq!(plain.dom_token("dark"), Some("dark"));

    let mapped = ThemeConfig::builder()
        .value([("dark", "theme-dark")])
        .build()
        .expect("valid");
    assert_eq!(mapped.dom_token("dark"), Some("theme-dark"));
    assert_eq!(mapped.dom_token("light"), None);
}

#[test]
fn class_tokens_cover_catalog_and_mapped_names() {
    let config = ThemeConfig::builder()
        .themes(["light", "dark"])
        .value([("dark", "theme-dark"), ("high", "contrast")])
        .build()
        .expect("valid");
    assert_eq!(config.class_tokens(), ["light", "theme-dark", "contrast"]);
}

#[test]
fn color_scheme_falls_back_to_base_default_theme() {
    let config = ThemeConfig::builder()
        .themes(["light", "dark", "ocean"])
        .default_theme("dark")
        .build()
        .expect("valid");
    assert_eq!(config.color_scheme_for("light"), Some("light"));
    assert_eq!(config.color_scheme_for("ocean"), Some("dark"));

    let system_default = ThemeConfig::default();
    assert_eq!(system_default.color_scheme_for("ocean"), None);
}
