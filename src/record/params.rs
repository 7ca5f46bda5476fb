//! Request parameters: name to list of values, repeated keys allowed.

use indexmap::IndexMap;

/// Query parameters in arrival order.
///
/// `columns` is an older spelling of `include` and is stored under `include`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: IndexMap<String, Vec<String>>,
}

fn canonical(name: &str) -> &str {
    match name {
        "columns" => "include",
        other => other,
    }
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values
            .entry(canonical(name).to_string())
            .or_default()
            .push(value.into());
        self
    }

    /// Builder form of [`Params::add`].
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(canonical(name))
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.values
            .get(canonical(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    pub fn last(&self, name: &str) -> Option<&str> {
        self.get_all(name).last().map(String::as_str)
    }

    /// All `(name, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Parse `key=value` pairs, as given on a command line.
    pub fn parse_pair(pair: &str) -> Option<(String, String)> {
        let (key, value) = pair.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.to_string()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.add(k.as_ref(), v);
        }
        params
    }
}
