//! Path tree: values stored at string paths.
//!
//! Used to group filter conditions by their address (`filter1a` lives at
//! `["1", "a"]`) and join chains by table (`posts,comments` lives at
//! `["posts", "comments"]`).

use indexmap::IndexMap;

/// Key that matches any branch in [`PathTree::get`].
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq)]
pub struct PathTree<T> {
    values: Vec<T>,
    branches: IndexMap<String, PathTree<T>>,
}

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            branches: IndexMap::new(),
        }
    }
}

impl<T> PathTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` at `path`, creating intermediate nodes.
    pub fn put(&mut self, path: &[String], value: T) {
        match path.split_first() {
            None => self.values.push(value),
            Some((head, rest)) => self
                .branches
                .entry(head.clone())
                .or_default()
                .put(rest, value),
        }
    }

    /// Create the node at `path` without adding a value.
    pub fn touch(&mut self, path: &[String]) {
        if let Some((head, rest)) = path.split_first() {
            self.branches.entry(head.clone()).or_default().touch(rest);
        }
    }

    /// Child node by key, falling back to the `*` branch.
    pub fn get(&self, key: &str) -> Option<&PathTree<T>> {
        self.branches
            .get(key)
            .or_else(|| self.branches.get(WILDCARD))
    }

    /// Child keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.branches.keys().map(String::as_str)
    }

    /// `(key, child)` pairs in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &PathTree<T>)> {
        self.branches.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.branches.is_empty()
    }
}
