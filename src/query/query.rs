//! Lazy result cursor
//!
//! Construction is cheap: `find`/`exclude` copy criteria into a new query
//! and defer everything else. The id list materializes on first access to
//! the count, an index or the documents, and is memoized for this query
//! instance. Re-querying is the only way to observe later collection
//! changes.

use std::collections::BTreeSet;

use once_cell::unsync::OnceCell;

use crate::collection::{Collection, CollectionResult, Criterion, DocId};
use crate::value::{Scalar, Value};

use super::document::DocumentView;

/// One ordering key with its direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field key to sort by (flattened, delimiter-joined for nested fields)
    pub key: String,
    /// Walk the key's values in descending order
    pub reverse: bool,
}

impl SortKey {
    /// Parses an ordering spec; a leading `-` means descending
    pub fn parse(spec: &str) -> SortKey {
        match spec.strip_prefix('-') {
            Some(key) => SortKey {
                key: key.to_string(),
                reverse: true,
            },
            None => SortKey {
                key: spec.to_string(),
                reverse: false,
            },
        }
    }
}

/// A deferred, memoizing query against one collection
#[derive(Debug, Clone)]
pub struct Query<'a> {
    collection: &'a Collection,
    criteria: Vec<Criterion>,
    order: Vec<SortKey>,
    ids: OnceCell<Vec<DocId>>,
}

impl<'a> Query<'a> {
    /// A query matching every live document of the collection
    pub fn new(collection: &'a Collection) -> Self {
        Self {
            collection,
            criteria: Vec::new(),
            order: Vec::new(),
            ids: OnceCell::new(),
        }
    }

    fn derive(&self, extra: Option<Criterion>, order: Option<Vec<SortKey>>) -> Query<'a> {
        let mut criteria = self.criteria.clone();
        if let Some(criterion) = extra {
            criteria.push(criterion);
        }
        Query {
            collection: self.collection,
            criteria,
            order: order.unwrap_or_else(|| self.order.clone()),
            ids: OnceCell::new(),
        }
    }

    /// Returns a new query with the given criterion added
    pub fn find(&self, lookup: &str, value: impl Into<Value>) -> Query<'a> {
        self.derive(Some(Criterion::new(lookup, value, false)), None)
    }

    /// Returns a new query with the given criterion added, negated
    pub fn exclude(&self, lookup: &str, value: impl Into<Value>) -> Query<'a> {
        self.derive(Some(Criterion::new(lookup, value, true)), None)
    }

    /// Returns a new query with a pre-built criterion added
    pub fn with_criterion(&self, criterion: Criterion) -> Query<'a> {
        self.derive(Some(criterion), None)
    }

    /// Returns a new query ordered by the given keys.
    ///
    /// A leading `-` reverses a key. Later keys break ties of earlier ones;
    /// posting order (ascending id) is the final tiebreak.
    pub fn order_by(&self, keys: &[&str]) -> Query<'a> {
        let order = keys.iter().map(|spec| SortKey::parse(spec)).collect();
        self.derive(None, Some(order))
    }

    /// The collection this query reads
    pub fn collection(&self) -> &'a Collection {
        self.collection
    }

    /// The accumulated criteria
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Resolves (once) and returns the ordered matching ids
    pub fn ids(&self) -> CollectionResult<&[DocId]> {
        let ids = self.ids.get_or_try_init(|| {
            let ids = self.collection.find_ids(&self.criteria)?;
            if self.order.is_empty() {
                Ok(ids)
            } else {
                Ok(self.order_group(ids, &self.order))
            }
        })?;
        Ok(ids.as_slice())
    }

    /// Number of matching documents.
    ///
    /// Cheaper than materializing document views; synonym for the length of
    /// the resolved id list.
    pub fn count(&self) -> CollectionResult<usize> {
        Ok(self.ids()?.len())
    }

    /// The view at the given result position, if any
    pub fn get(&self, index: usize) -> CollectionResult<Option<DocumentView<'a>>> {
        Ok(self
            .ids()?
            .get(index)
            .map(|&id| DocumentView::new(self.collection, id)))
    }

    /// Views over all matching documents, in result order
    pub fn documents(&self) -> CollectionResult<Vec<DocumentView<'a>>> {
        Ok(self
            .ids()?
            .iter()
            .map(|&id| DocumentView::new(self.collection, id))
            .collect())
    }

    /// Sorted distinct values for a key within this query's result set.
    ///
    /// Without criteria this is a direct cached lookup on the collection;
    /// with criteria the query executes first and values are restricted to
    /// the matching ids.
    pub fn values_for(&self, key: &str) -> CollectionResult<Vec<Scalar>> {
        if self.criteria.is_empty() {
            return Ok(self.collection.values_for(key, None));
        }
        let ids = self.ids()?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: BTreeSet<DocId> = ids.iter().copied().collect();
        Ok(self.collection.values_for(key, Some(&ids)))
    }

    /// Orders a group of ids by the given sort keys.
    ///
    /// Walks the distinct indexed values of the first key (reversed for
    /// descending) and collects each value's postings that are still
    /// unclaimed, so every id surfaces exactly once; each value group is
    /// then ordered by the remaining keys. Ids never posted under the key
    /// trail at the end in ascending order.
    fn order_group(&self, ids: Vec<DocId>, keys: &[SortKey]) -> Vec<DocId> {
        let Some((sort_key, rest)) = keys.split_first() else {
            // innermost group keeps posting order
            return ids;
        };

        let mut remaining: BTreeSet<DocId> = ids.iter().copied().collect();
        let mut ordered = Vec::with_capacity(ids.len());
        let values = self.collection.values_for(&sort_key.key, None);

        let walk: Box<dyn Iterator<Item = &Scalar> + '_> = if sort_key.reverse {
            Box::new(values.iter().rev())
        } else {
            Box::new(values.iter())
        };
        for value in walk {
            let mut group = Vec::new();
            for &id in self.collection.ids_by(&sort_key.key, value) {
                if remaining.remove(&id) {
                    group.push(id);
                }
            }
            if !group.is_empty() {
                ordered.extend(self.order_group(group, rest));
            }
        }
        ordered.extend(remaining.iter().copied());
        ordered
    }
}
