//! Index Invariant Tests
//!
//! Tests for the collection/index contract:
//! - Live-document count always matches an unfiltered find_ids
//! - add followed by delete restores the exact index state
//! - Every unwrapped (key, value) pair of a live document is findable
//! - Tombstones keep their slot but lose their postings

use serde_json::json;

use pivotdb::collection::{Collection, CollectionError, Criterion, DocId};
use pivotdb::value::{Document, Scalar};

// =============================================================================
// Helper Functions
// =============================================================================

fn doc(value: serde_json::Value) -> Document {
    Document::from_json(value).unwrap()
}

fn people() -> Collection {
    Collection::new(vec![
        doc(json!({"name": "Thomas Fowler", "born": {"country": "England"}, "age": 232})),
        doc(json!({"name": "Guido van Rossum", "born": {"country": "Netherlands"}, "age": 49})),
        doc(json!({"name": "Anita Borg", "born": {"country": "USA", "city": "Chicago"}, "age": 54})),
        doc(json!({"name": "Kathleen Antonelli", "nick": "Kay", "born": {"country": "USA", "city": null}})),
    ])
}

fn eq(lookup: &str, value: impl Into<pivotdb::value::Value>) -> Criterion {
    Criterion::new(lookup, value, false)
}

/// Full index snapshot: every (key, value, postings) triple
fn index_state(collection: &Collection) -> Vec<(String, Scalar, Vec<DocId>)> {
    let mut state = Vec::new();
    for key in collection.keys() {
        for value in collection.values_for(&key, None) {
            let postings = collection.ids_by(&key, &value).to_vec();
            state.push((key.clone(), value, postings));
        }
    }
    state
}

// =============================================================================
// Count Invariant
// =============================================================================

/// Unfiltered find_ids yields exactly the live documents.
#[test]
fn test_find_ids_matches_live_count() {
    let mut collection = people();
    assert_eq!(collection.find_ids(&[]).unwrap().len(), collection.live_count());

    collection.delete(&[1]).unwrap();
    assert_eq!(collection.find_ids(&[]).unwrap().len(), 3);
    assert_eq!(collection.live_count(), 3);
    // the backing sequence still holds the tombstone
    assert_eq!(collection.len(), 4);
}

// =============================================================================
// Add/Delete Inverse
// =============================================================================

/// add then delete returns the index to its exact prior state.
#[test]
fn test_add_delete_restores_index_state() {
    let mut collection = people();
    let before = index_state(&collection);

    let pk = collection.add(doc(json!({
        "name": "Ada Lovelace",
        "born": {"country": "England", "city": "London"},
        "tags": ["math", "math", "poetry"],
    })));
    assert_ne!(index_state(&collection), before);

    collection.delete(&[pk]).unwrap();
    assert_eq!(index_state(&collection), before);
}

/// Deleting a document removes every posting it contributed, including
/// duplicates from repeated list entries.
#[test]
fn test_delete_removes_duplicate_postings() {
    let mut collection = Collection::new(vec![doc(json!({"tag": ["x", "x", "x"]}))]);
    assert_eq!(collection.ids_by("tag", &Scalar::from("x")), &[0, 0, 0]);

    collection.delete(&[0]).unwrap();
    assert!(collection.ids_by("tag", &Scalar::from("x")).is_empty());
    // the key branch itself was pruned
    assert!(collection.keys().is_empty());
}

// =============================================================================
// Exact Lookup Correctness
// =============================================================================

/// Every scalar field of every live document is findable by exact lookup.
#[test]
fn test_every_scalar_field_is_findable() {
    let collection = people();
    for id in collection.find_ids(&[]).unwrap() {
        let record = collection.fetch_one(id).unwrap().unwrap();
        for (key, value) in record.iter() {
            if let Some(scalar) = value.as_scalar() {
                if scalar.is_null() {
                    continue;
                }
                let ids = collection
                    .find_ids(&[Criterion::new(key.as_str(), scalar.clone(), false)])
                    .unwrap();
                assert!(ids.contains(&id), "id {} not found via {}", id, key);
            }
        }
    }
}

/// Nested fields index under delimiter-joined keys (Scenario C).
#[test]
fn test_nested_field_lookup_and_values() {
    let collection = Collection::new(vec![doc(json!({
        "born": {"country": "USA", "city": "NYC"}
    }))]);

    let ids = collection.find_ids(&[eq("born__country", "USA")]).unwrap();
    assert_eq!(ids, vec![0]);
    assert_eq!(
        collection.values_for("born__city", None),
        vec![Scalar::from("NYC")]
    );
}

// =============================================================================
// Tombstone Semantics (Scenario D)
// =============================================================================

/// Deleting a nonexistent id fails and leaves the collection untouched.
#[test]
fn test_delete_unknown_id_is_out_of_range() {
    let mut collection = people();
    let before = index_state(&collection);

    let err = collection.delete(&[0, 42]).unwrap_err();
    assert_eq!(err, CollectionError::OutOfRange { id: 42, len: 4 });

    assert_eq!(index_state(&collection), before);
    assert_eq!(collection.live_count(), 4);
}

/// Tombstoned slots read as empty but never shift other primary keys.
#[test]
fn test_tombstone_preserves_positions() {
    let mut collection = people();
    collection.delete(&[0]).unwrap();

    assert!(collection.fetch_one(0).unwrap().is_none());
    let anita = collection.fetch_one(2).unwrap().unwrap();
    assert_eq!(
        anita.get("name").and_then(|v| v.as_scalar()),
        Some(&Scalar::from("Anita Borg"))
    );

    // a new add appends after the tombstone rather than filling it
    let pk = collection.add(doc(json!({"name": "New"})));
    assert_eq!(pk, 4);
}

/// fetch_one names the id and the collection size on a bad id.
#[test]
fn test_fetch_one_error_message() {
    let collection = people();
    let err = collection.fetch_one(9).unwrap_err();
    assert_eq!(
        err.to_string(),
        "tried to access item 9 in a collection which contains only 4 items"
    );
}

// =============================================================================
// Deferred Indexing
// =============================================================================

/// add_deferred leaves the index stale until an explicit rebuild.
#[test]
fn test_deferred_add_and_rebuild() {
    let mut collection = people();
    let pk = collection.add_deferred(doc(json!({"name": "Linus Torvalds", "age": 40})));

    // fetchable immediately, not findable yet
    assert!(collection.fetch_one(pk).unwrap().is_some());
    assert!(collection
        .find_ids(&[eq("name", "Linus Torvalds")])
        .unwrap()
        .is_empty());

    collection.rebuild_index();
    assert_eq!(
        collection.find_ids(&[eq("name", "Linus Torvalds")]).unwrap(),
        vec![pk]
    );
}

/// Rebuilding from scratch produces the same index as incremental adds.
#[test]
fn test_rebuild_is_equivalent_to_incremental() {
    let mut incremental = Collection::new(Vec::new());
    for value in [
        json!({"a": 1, "d": {"x": "y"}}),
        json!({"a": 2, "list": [1, 2]}),
    ] {
        incremental.add(doc(value));
    }

    let mut rebuilt = Collection::new(vec![
        doc(json!({"a": 1, "d": {"x": "y"}})),
        doc(json!({"a": 2, "list": [1, 2]})),
    ]);
    rebuilt.rebuild_index();

    assert_eq!(index_state(&incremental), index_state(&rebuilt));
}
