//! Read-only lazy document proxy
//!
//! A view holds (collection, id) and fetches the underlying record once, on
//! first field access. Identity is the id alone: two views of the same id
//! are equal whether or not either has fetched its data.

use std::hash::{Hash, Hasher};

use once_cell::unsync::OnceCell;

use crate::collection::{Collection, DocId};
use crate::value::{Document, Scalar, Value};

/// Lazy read-only handle on one document of a collection
#[derive(Debug, Clone)]
pub struct DocumentView<'a> {
    collection: &'a Collection,
    id: DocId,
    data: OnceCell<Option<&'a Document>>,
}

impl<'a> DocumentView<'a> {
    /// Creates a view. The record itself is not touched until first access.
    pub fn new(collection: &'a Collection, id: DocId) -> Self {
        Self {
            collection,
            id,
            data: OnceCell::new(),
        }
    }

    /// The document's primary key
    pub fn pk(&self) -> DocId {
        self.id
    }

    /// The underlying record; `None` for tombstoned or unknown slots.
    ///
    /// Fetched once and cached for the view's lifetime.
    fn record(&self) -> Option<&'a Document> {
        *self.data.get_or_init(|| self.collection.slot(self.id))
    }

    /// Looks up a top-level field
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.record().and_then(|doc| doc.get(key))
    }

    /// Scalar view of a top-level field, if the field holds a leaf value
    pub fn scalar(&self, key: &str) -> Option<&'a Scalar> {
        self.get(key).and_then(Value::as_scalar)
    }

    /// Returns true if the record carries the field
    pub fn contains(&self, key: &str) -> bool {
        self.record().is_some_and(|doc| doc.contains(key))
    }

    /// Field names of the record, in key order
    pub fn keys(&self) -> Vec<&'a String> {
        self.record()
            .map(|doc| doc.keys().collect())
            .unwrap_or_default()
    }
}

// identity is the id; fetched data never participates
impl PartialEq for DocumentView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DocumentView<'_> {}

impl Hash for DocumentView<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection() -> Collection {
        Collection::new(vec![
            Document::from_json(json!({"name": "john", "age": 30})).unwrap(),
            Document::from_json(json!({"name": "mary"})).unwrap(),
        ])
    }

    #[test]
    fn test_field_access() {
        let coll = collection();
        let view = DocumentView::new(&coll, 0);

        assert_eq!(view.pk(), 0);
        assert_eq!(view.get("name"), Some(&Value::from("john")));
        assert_eq!(view.scalar("age"), Some(&Scalar::Int(30)));
        assert!(view.get("missing").is_none());
        assert!(view.contains("name"));
        assert!(!view.contains("missing"));
    }

    #[test]
    fn test_equality_is_by_id_only() {
        let coll = collection();
        let a = DocumentView::new(&coll, 0);
        let b = DocumentView::new(&coll, 0);
        let c = DocumentView::new(&coll, 1);

        // b has fetched nothing yet; still equal
        a.get("name");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_tombstoned_slot_reads_empty() {
        let mut coll = collection();
        coll.delete(&[1]).unwrap();
        let view = DocumentView::new(&coll, 1);

        assert!(view.get("name").is_none());
        assert!(view.keys().is_empty());
    }
}
