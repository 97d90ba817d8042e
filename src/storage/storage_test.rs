use super::*;

use std::cell::RefCell;

use crate::headless::{MemoryArea, MemoryBroadcast, TaskQueue};
use crate::storage::cookie::{
    decode_component, encode_component, expire_cookie_string, parse_cookies, read_cookie, set_cookie_string,
};

fn recorder() -> (Rc<RefCell<Vec<Option<String>>>>, ChangeHandler) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let handler: ChangeHandler = Rc::new(move |value| sink.borrow_mut().push(value));
    (seen, handler)
}

fn backends(queue: &TaskQueue) -> StorageBackends {
    StorageBackends {
        local: Rc::new(MemoryArea::with_events(queue.clone())),
        session: Rc::new(MemoryArea::new()),
        cookie: Rc::new(MemoryArea::new()),
        broadcast: Rc::new(MemoryBroadcast::new(queue.clone())),
    }
}

// =============================================================
// Adapter selection
// =============================================================

#[test]
fn adapter_reads_and_writes_through_selected_area() {
    let queue = TaskQueue::default();
    let backends = backends(&queue);
    for kind in [
        BuiltInStorage::LocalStorage,
        BuiltInStorage::SessionStorage,
        BuiltInStorage::Cookie,
    ] {
        let adapter = backends.adapter(&StorageChoice::BuiltIn(kind));
        assert_eq!(adapter.get_item("theme"), None, "{kind:?}");
        adapter.set_item("theme", "dark");
        assert_eq!(adapter.get_item("theme").as_deref(), Some("dark"), "{kind:?}");
        adapter.remove_item("theme");
        assert_eq!(adapter.get_item("theme"), None, "{kind:?}");
    }
}

#[test]
fn custom_adapter_is_used_as_is() {
    let custom: Rc<dyn ThemeStorage> = Rc::new(crate::headless::MemoryStorage::default());
    custom.set_item("theme", "ocean");
    let backends = backends(&TaskQueue::default());
    let adapter = backends.adapter(&StorageChoice::Custom(Rc::clone(&custom)));
    assert_eq!(adapter.get_item("theme").as_deref(), Some("ocean"));
    assert!(adapter.subscribe("theme", recorder().1).is_none());
}

// =============================================================
// Degradation
// =============================================================

#[test]
fn unavailable_area_degrades_to_no_value() {
    let area = MemoryArea::new();
    area.seed("theme", "dark");
    area.set_available(false);
    let adapter = PersistentStorage::new(Rc::new(area.clone()));

    assert_eq!(adapter.get_item("theme"), None);
    adapter.set_item("theme", "light");
    adapter.remove_item("theme");
    assert_eq!(area.peek("theme").as_deref(), Some("dark"));
}

#[test]
fn session_write_failure_skips_broadcast() {
    let queue = TaskQueue::default();
    let area = MemoryArea::new();
    area.set_available(false);
    let broadcast = MemoryBroadcast::new(queue.clone());
    let (seen, handler) = recorder();
    let listener = SessionStorage::new(Rc::new(MemoryArea::new()), Rc::new(broadcast.view_for_tab(1)));
    let _sub = listener.subscribe("theme", handler).expect("broadcast subscription");

    let writer = SessionStorage::new(Rc::new(area), Rc::new(broadcast.view_for_tab(2)));
    writer.set_item("theme", "dark");
    queue.run_until_idle();
    assert!(seen.borrow().is_empty());
}

// =============================================================
// Cross-tab notification
// =============================================================

#[test]
fn persistent_subscribe_sees_other_tabs_only() {
    let queue = TaskQueue::default();
    let shared = MemoryArea::with_events(queue.clone());
    let tab_a = PersistentStorage::new(Rc::new(shared.view_for_tab(1)));
    let tab_b = PersistentStorage::new(Rc::new(shared.view_for_tab(2)));
    let (seen, handler) = recorder();
    let _sub = tab_a.subscribe("theme", handler).expect("storage events");

    tab_a.set_item("theme", "light");
    tab_b.set_item("theme", "dark");
    tab_b.remove_item("theme");
    queue.run_until_idle();

    assert_eq!(*seen.borrow(), vec![Some("dark".to_owned()), None]);
}

#[test]
fn session_subscribe_uses_prefixed_channel() {
    let queue = TaskQueue::default();
    let broadcast = MemoryBroadcast::new(queue.clone());
    let (seen, handler) = recorder();
    let tab_a = SessionStorage::new(Rc::new(MemoryArea::new()), Rc::new(broadcast.view_for_tab(1)));
    let tab_b = SessionStorage::new(Rc::new(MemoryArea::new()), Rc::new(broadcast.view_for_tab(2)));
    let _sub = tab_a.subscribe("theme", handler).expect("broadcast subscription");
    assert_eq!(broadcast.listener_count("themer:theme"), 1);

    tab_b.set_item("theme", "dark");
    tab_b.set_item("other", "light");
    queue.run_until_idle();

    assert_eq!(*seen.borrow(), vec![Some("dark".to_owned())]);
    assert_eq!(tab_a.get_item("theme"), None, "session areas are per tab");
}

#[test]
fn session_writes_do_not_echo_to_own_listener() {
    let queue = TaskQueue::default();
    let broadcast = MemoryBroadcast::new(queue.clone());
    let (seen, handler) = recorder();
    let tab = SessionStorage::new(Rc::new(MemoryArea::new()), Rc::new(broadcast.view_for_tab(1)));
    let _sub = tab.subscribe("theme", handler).expect("broadcast subscription");

    tab.set_item("theme", "dark");
    tab.set_item("theme", "light");
    queue.run_until_idle();

    assert!(seen.borrow().is_empty());
    assert_eq!(tab.get_item("theme").as_deref(), Some("light"));
}

#[test]
fn dropping_subscription_stops_delivery() {
    let queue = TaskQueue::default();
    let broadcast = MemoryBroadcast::new(queue.clone());
    let (seen, handler) = recorder();
    let tab = SessionStorage::new(Rc::new(MemoryArea::new()), Rc::new(broadcast.view_for_tab(1)));
    let sub = tab.subscribe("theme", handler).expect("broadcast subscription");

    broadcast.post("themer:theme", "dark").expect("post");
    drop(sub);
    queue.run_until_idle();

    assert!(seen.borrow().is_empty());
    assert_eq!(broadcast.listener_count("themer:theme"), 0);
}

#[test]
fn cookie_adapter_never_subscribes() {
    let adapter = CookieStorage::new(Rc::new(MemoryArea::with_events(TaskQueue::default())));
    assert!(adapter.subscribe("theme", recorder().1).is_none());
}

#[test]
fn channel_name_prefixes_key() {
    assert_eq!(channel_name("theme"), "themer:theme");
    assert!(channel_name("app").starts_with(CHANNEL_PREFIX));
}

// =============================================================
// Cookie codec
// =============================================================

#[test]
fn read_cookie_finds_named_value() {
    let header = "session=abc; theme=dark; other=1";
    assert_eq!(read_cookie(header, "theme").as_deref(), Some("dark"));
    assert_eq!(read_cookie(header, "missing"), None);
    assert_eq!(read_cookie("", "theme"), None);
}

#[test]
fn parse_cookies_skips_malformed_pairs() {
    let pairs: Vec<_> = parse_cookies("theme=dark; broken; =x;mode=a%20b").collect();
    assert_eq!(pairs, vec![("theme", "dark".to_owned()), ("mode", "a b".to_owned())]);
}

#[test]
fn cookie_strings_encode_value_and_expiry() {
    assert_eq!(
        set_cookie_string("theme", "high contrast"),
        "theme=high%20contrast; path=/; max-age=31536000; SameSite=Lax"
    );
    assert_eq!(expire_cookie_string("theme"), "theme=; path=/; max-age=0; SameSite=Lax");
}

#[test]
fn component_codec_matches_uri_component_rules() {
    assert_eq!(encode_component("a;b=c"), "a%3Bb%3Dc");
    assert_eq!(encode_component("dark-mode_1.(x)"), "dark-mode_1.(x)");
    assert_eq!(encode_component("é"), "%C3%A9");
    assert_eq!(encode_component("a b\n\u{7f}"), "a%20b%0A%7F");
    assert_eq!(decode_component("%C3%A9"), "é");
    assert_eq!(decode_component("100%"), "100%");
    assert_eq!(decode_component("%zz"), "%zz");
}
