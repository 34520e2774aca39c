//! Document store tests: CRUD, versioning, compare-and-set writes,
//! field-filtered queries, chunked scans, and snapshot reads.

use serde::{Deserialize, Serialize};
use succession_core::error::EngineError;
use succession_core::store::{Collection, DocStore, FieldFilter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Widget {
    name: String,
    size: i64,
    active: bool,
}

fn store() -> DocStore {
    let store = DocStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn widget(name: &str, size: i64) -> Widget {
    Widget {
        name: name.into(),
        size,
        active: true,
    }
}

#[test]
fn insert_then_fetch_roundtrips() {
    let store = store();
    let body = widget("alpha", 3);
    store
        .insert_document(Collection::CriticalRoles, "acme", "w-1", &body)
        .unwrap();

    let fetched: Widget = store
        .fetch_document(Collection::CriticalRoles, "w-1")
        .unwrap();
    assert_eq!(fetched, body);
    assert_eq!(
        store
            .document_version(Collection::CriticalRoles, "w-1")
            .unwrap(),
        1,
        "fresh documents start at version 1"
    );
}

#[test]
fn fetch_missing_is_not_found() {
    let store = store();
    let err = store
        .fetch_document::<Widget>(Collection::CriticalRoles, "nope")
        .unwrap_err();
    match err {
        EngineError::NotFound { entity, id } => {
            assert_eq!(entity, "critical role");
            assert_eq!(id, "nope");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }

    let missing: Option<Widget> = store
        .try_fetch_document(Collection::CriticalRoles, "nope")
        .unwrap();
    assert!(missing.is_none());
}

#[test]
fn update_bumps_version_and_persists() {
    let store = store();
    store
        .insert_document(Collection::TalentPools, "acme", "w-1", &widget("alpha", 3))
        .unwrap();

    let updated: Widget = store
        .update_document(Collection::TalentPools, "w-1", |w: &mut Widget| {
            w.size = 9;
            Ok(())
        })
        .unwrap();
    assert_eq!(updated.size, 9);

    let fetched: Widget = store.fetch_document(Collection::TalentPools, "w-1").unwrap();
    assert_eq!(fetched.size, 9);
    assert_eq!(
        store
            .document_version(Collection::TalentPools, "w-1")
            .unwrap(),
        2
    );
}

#[test]
fn stale_put_is_rejected() {
    let store = store();
    store
        .insert_document(Collection::TalentPools, "acme", "w-1", &widget("alpha", 3))
        .unwrap();

    // Two readers pick up version 1.
    let seen_version = store
        .document_version(Collection::TalentPools, "w-1")
        .unwrap();

    // First writer lands.
    assert!(store
        .put_if_version(Collection::TalentPools, "w-1", &widget("alpha", 4), seen_version)
        .unwrap());

    // Second writer still holds version 1 and must be rejected.
    assert!(
        !store
            .put_if_version(Collection::TalentPools, "w-1", &widget("alpha", 5), seen_version)
            .unwrap(),
        "a write against a stale version must not land"
    );

    let fetched: Widget = store.fetch_document(Collection::TalentPools, "w-1").unwrap();
    assert_eq!(fetched.size, 4, "the stale write must not have clobbered");
}

#[test]
fn delete_removes_document() {
    let store = store();
    store
        .insert_document(Collection::SuccessionPlans, "acme", "w-1", &widget("alpha", 3))
        .unwrap();
    store
        .delete_document(Collection::SuccessionPlans, "w-1")
        .unwrap();

    let gone: Option<Widget> = store
        .try_fetch_document(Collection::SuccessionPlans, "w-1")
        .unwrap();
    assert!(gone.is_none());

    let err = store
        .delete_document(Collection::SuccessionPlans, "w-1")
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[test]
fn counts_are_scoped_by_company() {
    let store = store();
    for i in 0..3 {
        store
            .insert_document(
                Collection::DevelopmentPlans,
                "acme",
                &format!("w-{i}"),
                &widget("w", i),
            )
            .unwrap();
    }
    store
        .insert_document(Collection::DevelopmentPlans, "globex", "other", &widget("o", 1))
        .unwrap();

    assert_eq!(
        store
            .document_count(Collection::DevelopmentPlans, "acme")
            .unwrap(),
        3
    );
    assert_eq!(
        store
            .document_count(Collection::DevelopmentPlans, "globex")
            .unwrap(),
        1
    );
    assert_eq!(
        store
            .document_count(Collection::DevelopmentPlans, "initech")
            .unwrap(),
        0
    );
}

#[test]
fn query_filters_on_json_fields() {
    let store = store();
    store
        .insert_document(
            Collection::CriticalRoles,
            "acme",
            "w-1",
            &Widget {
                name: "alpha".into(),
                size: 3,
                active: true,
            },
        )
        .unwrap();
    store
        .insert_document(
            Collection::CriticalRoles,
            "acme",
            "w-2",
            &Widget {
                name: "beta".into(),
                size: 3,
                active: false,
            },
        )
        .unwrap();
    store
        .insert_document(
            Collection::CriticalRoles,
            "globex",
            "w-3",
            &Widget {
                name: "alpha".into(),
                size: 3,
                active: true,
            },
        )
        .unwrap();

    // String equality.
    let alphas: Vec<Widget> = store
        .query_documents(
            Collection::CriticalRoles,
            "acme",
            &[FieldFilter::eq("name", "alpha")],
        )
        .unwrap();
    assert_eq!(alphas.len(), 1, "foreign-company docs must not leak in");
    assert_eq!(alphas[0].name, "alpha");

    // Boolean equality.
    let active: Vec<Widget> = store
        .query_documents(
            Collection::CriticalRoles,
            "acme",
            &[FieldFilter::eq("active", true)],
        )
        .unwrap();
    assert_eq!(active.len(), 1);
    assert!(active[0].active);

    // Conjunction of filters.
    let both: Vec<Widget> = store
        .query_documents(
            Collection::CriticalRoles,
            "acme",
            &[FieldFilter::eq("name", "beta"), FieldFilter::eq("size", 3)],
        )
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].name, "beta");

    // No match.
    let none: Vec<Widget> = store
        .query_documents(
            Collection::CriticalRoles,
            "acme",
            &[FieldFilter::eq("name", "gamma")],
        )
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn query_returns_insertion_order() {
    let store = store();
    // Ids deliberately disagree with insertion order: `created_at` ties at
    // one-second resolution, and listings must still come back in the
    // order the documents were written, not in id order.
    for name in ["delta", "alpha", "charlie", "bravo"] {
        store
            .insert_document(
                Collection::CriticalRoles,
                "acme",
                &format!("w-{name}"),
                &widget(name, 1),
            )
            .unwrap();
    }
    let all: Vec<Widget> = store
        .query_documents(Collection::CriticalRoles, "acme", &[])
        .unwrap();
    let names: Vec<&str> = all.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["delta", "alpha", "charlie", "bravo"]);
}

#[test]
fn scan_visits_every_document_across_pages() {
    let store = store();
    // Well past one keyset page, so the scan must paginate.
    for i in 0..450 {
        store
            .insert_document(
                Collection::CriticalRoles,
                "acme",
                &format!("w-{i:04}"),
                &widget("w", i),
            )
            .unwrap();
    }

    let mut visited = 0u32;
    let mut size_sum = 0i64;
    store
        .scan_documents(Collection::CriticalRoles, "acme", &[], |w: Widget| {
            visited += 1;
            size_sum += w.size;
            Ok(())
        })
        .unwrap();
    assert_eq!(visited, 450);
    assert_eq!(size_sum, (0..450).sum::<i64>(), "each doc visited exactly once");
}

#[test]
fn scan_applies_filters() {
    let store = store();
    for i in 0..30 {
        store
            .insert_document(
                Collection::CriticalRoles,
                "acme",
                &format!("w-{i:02}"),
                &Widget {
                    name: "w".into(),
                    size: i,
                    active: i % 2 == 0,
                },
            )
            .unwrap();
    }

    let mut visited = 0u32;
    store
        .scan_documents(
            Collection::CriticalRoles,
            "acme",
            &[FieldFilter::eq("active", true)],
            |w: Widget| {
                assert!(w.active);
                visited += 1;
                Ok(())
            },
        )
        .unwrap();
    assert_eq!(visited, 15);
}

#[test]
fn snapshot_read_leaves_connection_usable() {
    let store = store();
    store
        .insert_document(Collection::CriticalRoles, "acme", "w-1", &widget("a", 1))
        .unwrap();

    let count = store
        .snapshot_read(|s| s.document_count(Collection::CriticalRoles, "acme"))
        .unwrap();
    assert_eq!(count, 1);

    // The transaction must have been closed: writes and a second
    // snapshot must both still work.
    store
        .insert_document(Collection::CriticalRoles, "acme", "w-2", &widget("b", 2))
        .unwrap();
    let count = store
        .snapshot_read(|s| s.document_count(Collection::CriticalRoles, "acme"))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn snapshot_read_propagates_inner_errors() {
    let store = store();
    let err = store
        .snapshot_read(|s| s.fetch_document::<Widget>(Collection::CriticalRoles, "missing"))
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));

    // And the connection is still usable after the rollback.
    store
        .insert_document(Collection::CriticalRoles, "acme", "w-1", &widget("a", 1))
        .unwrap();
}
