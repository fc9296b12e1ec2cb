//! Integration tests for binding components to live results.
//!
//! Covers the full lifecycle through the public API: mount, notifications,
//! handle churn across prop updates, update gating and unmount cleanup.

use livebind_connect::{
    bind, count, extract, unique, Binder, BoundProps, Lifecycle, QueryMap, Value, ViewValue,
};
use livebind_reactive::{ChangeSet, LiveCollection, LiveResults, ResultCache};
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

type Live = LiveCollection<String>;

/// Routes library events to the test output; filter with `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Helper to create a live collection with `n` named rows.
fn live_rows(n: usize) -> Rc<Live> {
    Rc::new(LiveCollection::from_vec(
        (0..n).map(|i| format!("row{}", i)).collect(),
    ))
}

fn counter() -> (Rc<Cell<usize>>, impl Fn() + 'static) {
    let renders = Rc::new(Cell::new(0));
    let handle = renders.clone();
    (renders, move || handle.set(handle.get() + 1))
}

fn view_of(input: BoundProps<'_, (), String>, key: &str) -> Option<ViewValue<String>> {
    input.get(key).cloned()
}

#[test]
fn test_list_query_follows_insertions() {
    init_tracing();
    let handle_a = Rc::new(Live::new());
    let a = handle_a.clone();
    let map = QueryMap::new().with("items", move |_: &()| Some(a.clone()));

    let component = bind(map, None)
        .unwrap()
        .wrap(|input: BoundProps<'_, (), String>| view_of(input, "items"))
        .create(|| {});
    component.mount(()).unwrap();

    assert_eq!(component.render(), Some(Some(ViewValue::List(vec![]))));

    handle_a.write(|tx| tx.push("one".to_string()));

    assert_eq!(
        component.render(),
        Some(Some(ViewValue::List(vec!["one".to_string()])))
    );
}

#[test]
fn test_unique_query_from_empty_to_element() {
    let handle_b = Rc::new(Live::new());
    let b = handle_b.clone();
    let map = QueryMap::new().with("first", unique(move |_: &()| Some(b.clone())));

    let component = bind(map, None)
        .unwrap()
        .wrap(|input: BoundProps<'_, (), String>| input.unique("first").cloned())
        .create(|| {});
    component.mount(()).unwrap();

    assert_eq!(component.render(), Some(None));

    handle_b.push("alpha".to_string());
    assert_eq!(component.render(), Some(Some("alpha".to_string())));
}

#[test]
fn test_count_query_follows_deletions() {
    let handle_c = live_rows(3);
    let c = handle_c.clone();
    let map = QueryMap::new().with("total", count(move |_: &()| Some(c.clone())));

    let component = bind(map, None)
        .unwrap()
        .wrap(|input: BoundProps<'_, (), String>| input.count("total"))
        .create(|| {});
    component.mount(()).unwrap();
    assert_eq!(component.render(), Some(Some(3)));

    handle_c.remove(0);
    assert_eq!(component.render(), Some(Some(2)));
}

#[test]
fn test_extract_query_uses_extractor_output() {
    let handle = live_rows(2);
    let h = handle.clone();
    let map = QueryMap::new().with(
        "summary",
        extract(move |_: &()| Some(h.clone()), |live: &Live| live.snapshot().join(",")),
    );

    let component = bind(map, None)
        .unwrap()
        .wrap(|input: BoundProps<'_, (), String>| input.extracted("summary").cloned())
        .create(|| {});
    component.mount(()).unwrap();
    assert_eq!(component.render(), Some(Some(Value::from("row0,row1"))));

    handle.set(1, "last".to_string());
    assert_eq!(component.render(), Some(Some(Value::from("row0,last"))));
}

#[test]
fn test_empty_change_set_triggers_no_merge() {
    let handle = live_rows(1);
    let h = handle.clone();
    let (renders, trigger) = counter();
    let map = QueryMap::new().with("items", move |_: &()| Some(h.clone()));

    let component = bind(map, None)
        .unwrap()
        .wrap(|_: BoundProps<'_, (), String>| ())
        .create(trigger);
    component.mount(()).unwrap();

    handle.notify(&ChangeSet::new());
    handle.write(|_| {});

    assert_eq!(component.revision(), Some(1));
    assert_eq!(renders.get(), 1);
}

#[test]
fn test_handle_churn_through_cache() {
    init_tracing();
    let cache: ResultCache<u32, Live> = ResultCache::new();
    let cache = Rc::new(cache);
    let source = cache.clone();
    let map = QueryMap::new().with("items", move |page: &u32| {
        Some(source.get_or_insert_with(*page, || LiveCollection::from_vec(vec![page.to_string()])))
    });

    let component = bind(map, None)
        .unwrap()
        .wrap(|input: BoundProps<'_, u32, String>| input.list("items").map(<[String]>::to_vec))
        .create(|| {});
    component.mount(1).unwrap();
    let page_one = cache.get(&1).unwrap();
    assert_eq!(page_one.listener_count(), 1);

    // Same parameters resolve to the same cached handle.
    assert_eq!(component.update(1), Ok(0));
    assert_eq!(page_one.listener_count(), 1);

    assert_eq!(component.update(2), Ok(1));
    let page_two = cache.get(&2).unwrap();
    assert_eq!(page_one.listener_count(), 0);
    assert_eq!(page_two.listener_count(), 1);
    assert_eq!(component.render(), Some(Some(vec!["2".to_string()])));

    // Mutations of the released handle no longer reach the component.
    page_one.push("stale".to_string());
    assert_eq!(component.render(), Some(Some(vec!["2".to_string()])));
}

#[test]
fn test_should_update_sees_next_props() {
    let handle = live_rows(0);
    let h = handle.clone();
    let (renders, trigger) = counter();
    let map = QueryMap::new().with("total", count(move |_: &i32| Some(h.clone())));

    let component = Binder::builder(map)
        .should_update(|threshold: &i32| *threshold > 0)
        .build()
        .unwrap()
        .wrap(|input: BoundProps<'_, i32, String>| input.count("total"))
        .create(trigger);

    component.mount(0).unwrap();
    assert_eq!(renders.get(), 0);

    component.update(5).unwrap();
    assert_eq!(renders.get(), 1);

    handle.push("x".to_string());
    assert_eq!(renders.get(), 2);

    component.update(-1).unwrap();
    handle.push("y".to_string());
    assert_eq!(renders.get(), 2);
    assert_eq!(component.render(), Some(Some(2)));
}

#[test]
fn test_unmount_leaves_no_listener_behind() {
    init_tracing();
    let handles: Vec<Rc<Live>> = (0..4).map(live_rows).collect();
    let mut map = QueryMap::new();
    for (i, handle) in handles.iter().enumerate() {
        let h = handle.clone();
        map.insert(format!("q{}", i), move |_: &()| Some(h.clone()));
    }

    let component = bind(map, None)
        .unwrap()
        .wrap(|_: BoundProps<'_, (), String>| ())
        .create(|| {});
    component.mount(()).unwrap();
    assert_eq!(component.subscription_count(), 4);

    component.unmount();

    assert_eq!(component.state(), Lifecycle::Unmounted);
    for handle in &handles {
        assert_eq!(handle.listener_count(), 0);
    }
    assert!(component.render().is_none());
}

#[test]
fn test_many_instances_share_one_binder() {
    let handle = live_rows(2);
    let h = handle.clone();
    let map = QueryMap::new().with("total", count(move |_: &()| Some(h.clone())));
    let connected = bind(map, None)
        .unwrap()
        .wrap(|input: BoundProps<'_, (), String>| input.count("total"));

    let first = connected.create(|| {});
    let second = connected.create(|| {});
    first.mount(()).unwrap();
    second.mount(()).unwrap();
    assert_eq!(handle.listener_count(), 2);

    drop(first);
    assert_eq!(handle.listener_count(), 1);

    handle.push("row2".to_string());
    assert_eq!(second.render(), Some(Some(3)));
}

#[test]
fn test_handle_outlives_component() {
    let handle = live_rows(1);
    {
        let h = handle.clone();
        let map = QueryMap::new().with("items", move |_: &()| Some(h.clone()));
        let component = bind(map, None)
            .unwrap()
            .wrap(|_: BoundProps<'_, (), String>| ())
            .create(|| {});
        component.mount(()).unwrap();
    }

    assert_eq!(handle.listener_count(), 0);
    handle.push("after".to_string());
    assert_eq!(handle.len(), 2);
}
