use std::collections::HashMap;

use bytes::Bytes;

/// In-memory key-value map, the sole source of truth between `load` and
/// `save`. Rebuilt wholesale on load and fully re-serialized on save; key
/// operations never touch the medium. Enumeration order is unspecified.
#[derive(Debug, Default)]
pub struct Cache {
  entries: HashMap<String, Bytes>,
}

impl Cache {
  pub fn new() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }

  pub fn get(&self, key: &str) -> Option<&Bytes> {
    self.entries.get(key)
  }

  /// Inserts or overwrites. Last write wins.
  pub fn put(&mut self, key: String, value: Bytes) {
    self.entries.insert(key, value);
  }

  /// Removes the key if present and reports whether it was present.
  pub fn delete(&mut self, key: &str) -> bool {
    self.entries.remove(key).is_some()
  }

  pub fn keys(&self) -> Vec<String> {
    self.entries.keys().cloned().collect()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Bytes)> {
    self.entries.iter()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
