//! Pages that host their own stack.

mod common;

use common::{assert_consistent, Harness};
use folio::adapters::mock::LifecycleEvent::{self, *};
use folio::page::PageRef;

/// Push a host page whose nested stack is seeded with `inner`.
fn push_host(h: &mut Harness) -> PageRef {
    let factory = h.factory("host").with_nested_seed("inner");
    let page = h.engine.push(factory).unwrap();
    h.settle();
    page
}

fn nested_size(page: &PageRef) -> usize {
    page.borrow()
        .core()
        .peek_nested()
        .map_or(0, |nested| nested.size())
}

fn nested_top_focused(page: &PageRef) -> bool {
    let page = page.borrow();
    let Some(nested) = page.core().peek_nested() else {
        return false;
    };
    let top = nested.peek_top().unwrap();
    let focused = top.borrow().core().has_focus();
    focused
}

#[test]
fn test_seeded_nested_stack_comes_up_with_host() {
    let mut h = Harness::new();
    let host = push_host(&mut h);

    assert_eq!(nested_size(&host), 1);
    assert!(nested_top_focused(&host));
    assert_eq!(
        h.log.events_for("inner"),
        vec![Created, Mounted, Visible, Focused]
    );

    let page = host.borrow();
    let nested = page.core().peek_nested().unwrap();
    assert_eq!(nested.nesting(), 1);
    let inner = nested.peek_top().unwrap();
    assert_eq!(inner.borrow().core().nesting(), Some(1));
    assert_consistent(nested);
}

#[test]
fn test_host_phases_reach_nested_top() {
    let mut h = Harness::new();
    let host = push_host(&mut h);
    h.log.clear();

    h.engine.on_pause();
    h.engine.on_stop();
    assert!(!nested_top_focused(&host));
    h.engine.on_start();
    h.engine.on_resume();
    assert!(nested_top_focused(&host));

    assert_eq!(
        h.log.events_for("inner"),
        vec![FocusLost, Invisible, Visible, Focused]
    );
    // Nested pages hear about each host transition before the host's hook.
    let all = h.log.all();
    let position = |name: &str, event: LifecycleEvent| {
        all.iter()
            .position(|(n, e)| n == name && *e == event)
            .unwrap()
    };
    assert!(position("inner", FocusLost) < position("host", FocusLost));
    assert!(position("inner", Focused) < position("host", Focused));
}

#[test]
fn test_nested_push_settles_through_root_tick() {
    let mut h = Harness::new();
    let host = push_host(&mut h);

    host.borrow_mut()
        .core_mut()
        .nested_mut()
        .unwrap()
        .push(h.factory("deeper"))
        .unwrap();
    assert!(!h.engine.is_idle());
    h.settle();

    assert_eq!(nested_size(&host), 2);
    assert!(nested_top_focused(&host));
    assert_eq!(h.log.count("inner", Unmounted), 1);
    assert_eq!(h.observer.count(), 1);
}

#[test]
fn test_nested_stack_survives_host_unmount() {
    let mut h = Harness::new();
    let host = push_host(&mut h);
    host.borrow_mut()
        .core_mut()
        .nested_mut()
        .unwrap()
        .push(h.factory("deeper"))
        .unwrap();
    h.settle();

    h.push("cover");
    assert!(!host.borrow().core().is_mounted());
    assert_eq!(nested_size(&host), 0);
    assert_eq!(h.log.count("inner", Destroyed), 1);
    assert_eq!(h.log.count("deeper", Destroyed), 1);

    h.engine.pop().unwrap();
    h.settle();

    assert_eq!(nested_size(&host), 2);
    assert!(nested_top_focused(&host));
    // Rebuilt from the snapshot rather than seeded again.
    assert_eq!(h.log.count("inner", Created), 2);
    assert_eq!(h.log.count("deeper", Created), 2);
    assert_eq!(h.log.count("deeper", Restored), 1);
}

#[test]
fn test_nested_stack_round_trips_through_root_save() {
    let mut h = Harness::new();
    let host = push_host(&mut h);
    host.borrow_mut()
        .core_mut()
        .nested_mut()
        .unwrap()
        .push(h.factory("deeper"))
        .unwrap();
    h.settle();

    let saved = h.engine.save_state().unwrap();
    let host_id = saved.entries[0].id;
    let nested = saved
        .state(host_id)
        .and_then(|state| state.nested.as_ref())
        .expect("host state carries its nested stack");
    assert_eq!(nested.len(), 2);

    let mut restored = Harness::new();
    restored.engine.restore_state(saved).unwrap();
    let host = restored.engine.peek_top().unwrap();
    assert_eq!(nested_size(&host), 2);
    assert!(nested_top_focused(&host));
    assert_eq!(restored.log.count("inner", Created), 1);
    assert_eq!(restored.log.count("deeper", Focused), 1);
}

#[test]
fn test_nested_navigator_targets_nested_engine() {
    let mut h = Harness::new();
    let host = push_host(&mut h);

    let navigator = {
        let page = host.borrow();
        let nested = page.core().peek_nested().unwrap();
        let inner = nested.peek_top().unwrap();
        let navigator = inner.borrow().core().navigator().unwrap();
        navigator
    };
    assert_eq!(navigator.nesting(), 1);

    navigator.push(h.factory("deeper"));
    h.settle();
    assert_eq!(nested_size(&host), 2);
    assert_eq!(h.engine.size(), 1);
}

#[test]
fn test_nested_pop_of_last_entry_keeps_it() {
    let mut h = Harness::new();
    let host = push_host(&mut h);

    let popped = host
        .borrow_mut()
        .core_mut()
        .nested_mut()
        .unwrap()
        .pop()
        .unwrap();
    assert!(popped.is_none());
    assert_eq!(nested_size(&host), 1);
    assert_eq!(h.empty_signals.get(), 0);
}

#[test]
fn test_destroying_root_destroys_nested_pages() {
    let mut h = Harness::new();
    push_host(&mut h);
    h.engine.on_destroy();

    assert_eq!(h.log.count("inner", Destroyed), 1);
    assert_eq!(h.log.count("host", Destroyed), 1);
    let all = h.log.all();
    let inner = all.iter().position(|(n, e)| n == "inner" && *e == Destroyed);
    let host = all.iter().position(|(n, e)| n == "host" && *e == Destroyed);
    assert!(inner < host);
}
