//! In-memory document collection with an inverted index
//!
//! The collection owns the backing sequence of documents and the index over
//! their unwrapped fields. Deleted slots are tombstoned (content nulled,
//! position kept) so primary keys stay stable.
//!
//! `find_ids` is the central filter algorithm: each criterion resolves to a
//! posting-list lookup (`exact`) or a walk over the distinct values indexed
//! under its key, and the per-criterion matches combine with AND semantics
//! through an include/exclude set pair.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::observability::Logger;
use crate::query::Query;
use crate::value::{unwrap_document, Document, Scalar, Value};

use super::criterion::{coerce_probe, Criterion, LookupType};
use super::errors::{CollectionError, CollectionResult};
use super::index::{DocId, InvertedIndex};

/// Default delimiter joining nested keys and lookup-type suffixes
pub const DEFAULT_DELIMITER: &str = "__";

/// A queryable set of documents, wholly in memory.
///
/// The index is exclusively owned by the collection; queries only read it.
/// Mutating the collection while derived queries or cached aggregates are
/// alive is unsupported; discard them and re-query.
#[derive(Debug)]
pub struct Collection {
    docs: Vec<Option<Document>>,
    index: InvertedIndex,
    delimiter: String,
    // distinct-values cache, reset on any mutation
    values_cache: RefCell<HashMap<String, Vec<Scalar>>>,
}

impl Collection {
    /// Creates a collection over the given documents and builds the index
    pub fn new(docs: Vec<Document>) -> Self {
        Self::with_delimiter(docs, DEFAULT_DELIMITER)
    }

    /// Creates a collection with a custom key/lookup delimiter
    pub fn with_delimiter(docs: Vec<Document>, delimiter: impl Into<String>) -> Self {
        let mut collection = Self {
            docs: docs.into_iter().map(Some).collect(),
            index: InvertedIndex::new(),
            delimiter: delimiter.into(),
            values_cache: RefCell::new(HashMap::new()),
        };
        collection.rebuild_index();
        collection
    }

    /// The delimiter used for key flattening and lookup suffixes
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Length of the backing sequence, tombstones included
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns true if the backing sequence is empty
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Number of live (non-tombstoned) documents
    pub fn live_count(&self) -> usize {
        self.docs.iter().filter(|slot| slot.is_some()).count()
    }

    //-------------------//
    //  Basic query API  //
    //-------------------//

    /// Appends a document and indexes its fields. Returns the new primary key.
    pub fn add(&mut self, doc: Document) -> DocId {
        let pk = self.docs.len();
        for (key, value) in unwrap_document(&doc, &self.delimiter) {
            self.index.insert(key, value, pk);
        }
        self.docs.push(Some(doc));
        self.values_cache.borrow_mut().clear();
        pk
    }

    /// Appends a document without touching the index.
    ///
    /// Queries against fields of deferred documents read a stale index until
    /// `rebuild_index` runs; that trade-off is the caller's.
    pub fn add_deferred(&mut self, doc: Document) -> DocId {
        let pk = self.docs.len();
        self.docs.push(Some(doc));
        pk
    }

    /// Rebuilds the whole index from the live documents.
    ///
    /// O(total unwrapped fields). Also resets the distinct-values cache.
    pub fn rebuild_index(&mut self) {
        Logger::trace("INDEX_REBUILD", &[("documents", &self.docs.len().to_string())]);
        self.index.clear();
        for (pk, slot) in self.docs.iter().enumerate() {
            if let Some(doc) = slot {
                for (key, value) in unwrap_document(doc, &self.delimiter) {
                    self.index.insert(key, value, pk);
                }
            }
        }
        self.values_cache.borrow_mut().clear();
    }

    /// Tombstones the given documents and removes their index postings.
    ///
    /// Fails without side effects when any id lies outside the backing
    /// sequence. Ids that are already tombstoned are skipped with a logged
    /// advisory. Only document content is removed; the slot (and therefore
    /// every other document's primary key) stays where it was.
    pub fn delete(&mut self, ids: &[DocId]) -> CollectionResult<()> {
        for &id in ids {
            if id >= self.docs.len() {
                return Err(CollectionError::OutOfRange {
                    id,
                    len: self.docs.len(),
                });
            }
        }
        for &id in ids {
            match self.docs[id].take() {
                Some(doc) => {
                    for (key, value) in unwrap_document(&doc, &self.delimiter) {
                        self.index.remove(&key, &value, id);
                    }
                }
                None => {
                    Logger::warn("DELETE_TOMBSTONE", &[("id", &id.to_string())]);
                }
            }
        }
        self.values_cache.borrow_mut().clear();
        Ok(())
    }

    /// Returns the document stored under the given primary key.
    ///
    /// `Ok(None)` marks a tombstoned slot; an id beyond the backing sequence
    /// is an error naming the id and the collection size.
    pub fn fetch_one(&self, id: DocId) -> CollectionResult<Option<&Document>> {
        match self.docs.get(id) {
            Some(slot) => Ok(slot.as_ref()),
            None => Err(CollectionError::OutOfRange {
                id,
                len: self.docs.len(),
            }),
        }
    }

    /// Lazily fetches documents for the given ids, in order
    pub fn fetch<'a>(
        &'a self,
        ids: &'a [DocId],
    ) -> impl Iterator<Item = CollectionResult<Option<&'a Document>>> + 'a {
        ids.iter().map(move |&id| self.fetch_one(id))
    }

    /// Infallible slot access for views built from already-validated ids
    pub(crate) fn slot(&self, id: DocId) -> Option<&Document> {
        self.docs.get(id).and_then(Option::as_ref)
    }

    pub(crate) fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Posting list for an exact (key, value) pair
    pub fn ids_by(&self, key: &str, value: &Scalar) -> &[DocId] {
        self.index.ids_by(key, value)
    }

    /// All indexed keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.index.keys().map(str::to_string).collect()
    }

    /// Counts, per top-level field, how many documents carry a non-null value
    pub fn inspect(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for doc in self.docs.iter().flatten() {
            for (key, value) in doc.iter() {
                if !value.is_null() {
                    *counts.entry(key.clone()).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Sorted distinct values indexed under a key; cached per key.
    ///
    /// With `filter_by`, only values posted for at least one id in the set
    /// are returned: the "existing levels within this sub-population" view
    /// the pivot builder uses.
    pub fn values_for(&self, key: &str, filter_by: Option<&BTreeSet<DocId>>) -> Vec<Scalar> {
        let values = {
            let cache = self.values_cache.borrow();
            cache.get(key).cloned()
        };
        let values = values.unwrap_or_else(|| {
            let fresh: Vec<Scalar> = self.index.values_for(key).cloned().collect();
            self.values_cache
                .borrow_mut()
                .insert(key.to_string(), fresh.clone());
            fresh
        });

        match filter_by {
            None => values,
            Some(ids) => values
                .into_iter()
                .filter(|value| {
                    self.index
                        .ids_by(key, value)
                        .iter()
                        .any(|id| ids.contains(id))
                })
                .collect(),
        }
    }

    /// Ids of all live documents, ascending
    fn live_ids(&self) -> Vec<DocId> {
        self.docs
            .iter()
            .enumerate()
            .filter_map(|(pk, slot)| slot.as_ref().map(|_| pk))
            .collect()
    }

    //------------------------//
    //  The filter algorithm  //
    //------------------------//

    /// Returns ids of documents matching all given criteria, ascending.
    ///
    /// No criteria means all live ids. Each criterion contributes either to
    /// the include set (intersection) or, when negated, to the exclude set
    /// (union). A criterion that matches nothing empties the whole result;
    /// AND semantics, no silent skipping. If no criterion contributed to the
    /// include set, it defaults to all live ids.
    pub fn find_ids(&self, criteria: &[Criterion]) -> CollectionResult<Vec<DocId>> {
        if criteria.is_empty() {
            return Ok(self.live_ids());
        }

        let mut include: Option<BTreeSet<DocId>> = None;
        let mut exclude: BTreeSet<DocId> = BTreeSet::new();

        for criterion in criteria {
            let (key, mut lookup) = criterion.resolve(&self.delimiter);
            let mut value = criterion.value.clone();
            let mut negate = criterion.negate;

            // the index has no null bucket to look up directly; an exact
            // match against null is the same question as "not filled"
            if lookup == LookupType::Exact && value.is_null() {
                lookup = LookupType::Filled;
                value = Value::from(false);
            }

            // `not` is inverted `exact`
            if lookup == LookupType::Not {
                lookup = LookupType::Exact;
                negate = !negate;
            }

            let mut found: Vec<DocId> = Vec::new();
            if lookup == LookupType::Exact {
                // fast direct lookup
                if let Some(scalar) = value.as_scalar() {
                    found.extend_from_slice(self.index.ids_by(&key, scalar));
                }
            } else {
                if matches!(lookup, LookupType::Filled | LookupType::Exists) {
                    // the requested boolean folds into the negation:
                    // "exclude exists=false" means "require exists=true"
                    negate = negate == value.truthy();
                }
                for indexed in self.index.values_for(&key) {
                    let probe = coerce_probe(&value, indexed)?;
                    if lookup.matches(&probe, indexed) {
                        found.extend_from_slice(self.index.ids_by(&key, indexed));
                    }
                }
            }

            if found.is_empty() {
                // a clause with no matches zeroes the whole conjunction
                return Ok(Vec::new());
            }
            if negate {
                exclude.extend(found);
            } else {
                let found: BTreeSet<DocId> = found.into_iter().collect();
                include = Some(match include {
                    Some(current) => current.intersection(&found).copied().collect(),
                    None => found,
                });
            }
        }

        let include = match include {
            Some(ids) => ids,
            None => self.live_ids().into_iter().collect(),
        };
        Ok(include.difference(&exclude).copied().collect())
    }

    //----------------------//
    //  Query construction  //
    //----------------------//

    /// A query over every document in the collection
    pub fn all(&self) -> Query<'_> {
        Query::new(self)
    }

    /// Shorthand for `all().find(lookup, value)`
    pub fn find(&self, lookup: &str, value: impl Into<Value>) -> Query<'_> {
        self.all().find(lookup, value)
    }
}
