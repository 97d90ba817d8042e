use super::*;

use crate::config::ThemeOptions;
use crate::headless::HeadlessOrigin;

fn build(options: ThemeOptions) -> ThemeConfig {
    options.build().expect("valid options")
}

// =============================================================
// Provider sentinel
// =============================================================

#[test]
fn nested_provide_reuses_outer_context() {
    let owner = Owner::new();
    owner.with(|| {
        let outer = provide_theme(build(ThemeOptions::default()));
        let nested_config = build(ThemeOptions::default().themes(["ocean"]).default_theme("ocean"));
        let inner = Owner::new().with(|| provide_theme(nested_config));

        assert!(outer.state == inner.state);
        assert_eq!(inner.state().with_untracked(|s| s.theme.clone()), "system");
        assert_eq!(
            inner.state().with_untracked(|s| s.themes.clone()),
            ["light", "dark", "system"]
        );
    });
}

#[test]
fn sibling_owners_get_independent_contexts() {
    let first = Owner::new().with(|| provide_theme(build(ThemeOptions::default())));
    let second = Owner::new().with(|| provide_theme(build(ThemeOptions::default())));

    assert!(first.state != second.state);
}

// =============================================================
// Hook
// =============================================================

#[test]
fn use_theme_outside_provider_is_inert() {
    Owner::new().with(|| {
        let theme = use_theme();
        theme.set_theme("dark");
        theme.update_theme(|_| "dark".to_owned());
        theme.force_theme(Some("dark".to_owned()));

        assert!(!theme.is_provided());
        assert_eq!(theme.theme(), None);
        assert_eq!(theme.resolved_theme(), None);
        assert_eq!(theme.system_theme(), None);
        assert!(theme.themes().is_empty());
    });
}

#[test]
fn use_theme_reads_and_updates_provider_state() {
    let origin = HeadlessOrigin::new();
    let tab = origin.open_tab();
    Owner::new().with(|| {
        provide_theme_with(build(ThemeOptions::default()), &tab.env());
        let theme = use_theme();
        assert_eq!(theme.theme().as_deref(), Some("system"));
        assert_eq!(theme.resolved_theme().as_deref(), Some("light"));

        theme.set_theme("dark");
        assert_eq!(theme.theme().as_deref(), Some("dark"));
        assert_eq!(tab.local_area().peek("theme").as_deref(), Some("dark"));

        theme.update_theme(|previous| if previous == "dark" { "light".to_owned() } else { "dark".to_owned() });
        assert_eq!(theme.resolved_theme().as_deref(), Some("light"));

        theme.force_theme(Some("dark".to_owned()));
        assert_eq!(theme.forced_theme().as_deref(), Some("dark"));
        assert_eq!(tab.root().attribute("data-theme").as_deref(), Some("dark"));
    });
}

#[test]
fn preference_changes_reach_the_signal() {
    let origin = HeadlessOrigin::new();
    let tab = origin.open_tab();
    Owner::new().with(|| {
        provide_theme_with(build(ThemeOptions::default()), &tab.env());
        let theme = use_theme();

        tab.preference().set(SystemTheme::Dark);

        assert_eq!(theme.system_theme(), Some(SystemTheme::Dark));
        assert_eq!(theme.resolved_theme().as_deref(), Some("dark"));
    });
}

// =============================================================
// Teardown
// =============================================================

#[test]
fn owner_cleanup_disposes_controller() {
    let origin = HeadlessOrigin::new();
    let tab = origin.open_tab();
    let owner = Owner::new();
    let context = owner.with(|| provide_theme_with(build(ThemeOptions::default()), &tab.env()));
    assert!(context.controller().is_some());
    assert_eq!(tab.preference().watcher_count(), 1);

    owner.cleanup();

    assert!(context.controller().is_none());
    assert_eq!(tab.preference().watcher_count(), 0);
}

// =============================================================
// Script element
// =============================================================

#[cfg(feature = "ssr")]
#[test]
fn script_element_carries_nonce_and_extra_attributes() {
    let config = build(ThemeOptions::default().nonce("n1").script_prop("id", "theme-script"));
    let html = Owner::new().with(|| view! { <ThemeScript config=config /> }.to_html());

    assert!(html.contains(r#"<script id="theme-script" nonce="n1">(function("#), "{html}");
    assert_eq!(html.matches("</script>").count(), 1, "{html}");
}

#[cfg(feature = "ssr")]
#[test]
fn script_element_is_empty_for_custom_storage() {
    let config = build(ThemeOptions::default().custom_storage(std::rc::Rc::new(crate::headless::MemoryStorage::default())));
    let html = Owner::new().with(|| view! { <ThemeScript config=config /> }.to_html());

    assert!(!html.contains("<script"), "{html}");
}
