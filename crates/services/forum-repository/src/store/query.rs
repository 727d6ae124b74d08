//! Deferred queries over an entity collection.
//!
//! A [`Query`] only describes what to read: filters, sort keys and a
//! skip/take window. Nothing is evaluated until a store runs it through
//! [`EntityStore::fetch`](super::EntityStore::fetch) or
//! [`EntityStore::count`](super::EntityStore::count).

use std::cmp::Ordering;
use std::sync::Arc;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Filter, sort and window description for one entity kind.
pub struct Query<T> {
    filters: Vec<Predicate<T>>,
    order: Vec<Comparator<T>>,
    skip: u64,
    take: Option<u64>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            order: self.order.clone(),
            skip: self.skip,
            take: self.take,
        }
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order: Vec::new(),
            skip: 0,
            take: None,
        }
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("filters", &self.filters.len())
            .field("sort_keys", &self.order.len())
            .field("skip", &self.skip)
            .field("take", &self.take)
            .finish()
    }
}

impl<T: 'static> Query<T> {
    /// Query matching every entity, unordered
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only entities matching `predicate` (filters are AND-ed)
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filters.push(Arc::new(predicate));
        self
    }

    /// Sort ascending by `key`; later calls break ties of earlier ones
    pub fn order_by<K: Ord + 'static>(mut self, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        self.order.push(Arc::new(move |a: &T, b: &T| key(a).cmp(&key(b))));
        self
    }

    /// Sort descending by `key`; later calls break ties of earlier ones
    pub fn order_by_desc<K: Ord + 'static>(mut self, key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        self.order.push(Arc::new(move |a: &T, b: &T| key(b).cmp(&key(a))));
        self
    }

    pub fn skip(mut self, rows: u64) -> Self {
        self.skip = rows;
        self
    }

    pub fn take(mut self, rows: u64) -> Self {
        self.take = Some(rows);
        self
    }
}

impl<T> Query<T> {
    /// Whether `item` passes every filter
    pub fn matches(&self, item: &T) -> bool {
        self.filters.iter().all(|predicate| predicate(item))
    }

    /// Compare two entities by the query's sort keys
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.order
            .iter()
            .map(|cmp| cmp(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable sort by the query's sort keys; a no-op for unordered queries
    pub fn sort(&self, items: &mut [T]) {
        if !self.order.is_empty() {
            items.sort_by(|a, b| self.compare(a, b));
        }
    }

    pub fn is_windowed(&self) -> bool {
        self.skip > 0 || self.take.is_some()
    }

    /// Run the query over a collection: filter, sort, then skip/take
    pub fn evaluate<'a, I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = &'a T>,
        T: Clone + 'a,
    {
        let mut matched: Vec<T> = items.into_iter().filter(|item| self.matches(item)).cloned().collect();
        self.sort(&mut matched);

        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = self
            .take
            .map(|take| usize::try_from(take).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        matched.into_iter().skip(skip).take(take).collect()
    }

    /// Number of entities the query would return, honouring skip/take
    pub fn count_in<'a, I>(&self, items: I) -> u64
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let matched = items.into_iter().filter(|item| self.matches(item)).count() as u64;
        let remaining = matched.saturating_sub(self.skip);
        self.take.map_or(remaining, |take| remaining.min(take))
    }
}
