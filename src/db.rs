use bytes::Bytes;
use log::warn;

use crate::cache::Cache;
use crate::errors::{Errors, Result};
use crate::medium::Medium;
use crate::option::Options;
use crate::page::{PageManager, HEADER_SIZE};
use crate::record::{Decoded, Record, RecordType, MAX_KEY_SIZE};

/// Outcome of [`Store::load`]. An empty store is a normal outcome, not an
/// error: nothing has ever been saved to the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
  Loaded,
  Empty,
}

/// The storage engine. Key operations work purely against the in-memory
/// cache; only `load` and `save` touch the medium, and `save` rewrites the
/// entire live state into the standby page (compaction).
///
/// A store must be loaded before any other operation; calls on an unloaded
/// store are rejected with [`Errors::StoreNotLoaded`] rather than silently
/// starting from an empty cache.
///
/// A `Store` is single-threaded by design: it holds no locks and makes no
/// thread-safety guarantee. Callers that share an instance across threads
/// must serialize access externally.
pub struct Store {
  options: Options,
  pages: PageManager,
  cache: Cache,
  loaded: bool,
}

impl Store {
  /// Creates a store over the given medium. Fails if the configured geometry
  /// is invalid; the medium is not touched.
  pub fn new(medium: Box<dyn Medium>, options: Options) -> Result<Store> {
    check_options(&options)?;
    Ok(Store {
      pages: PageManager::new(medium, options.clone()),
      options,
      cache: Cache::new(),
      loaded: false,
    })
  }

  /// Scans the active page and rebuilds the cache from its record log.
  /// Records replay in file order, so later upserts and tombstones supersede
  /// earlier ones. A corrupt record truncates the replay at that point — it
  /// can only be the tail of a torn write — and everything before it is
  /// trusted. The cache is replaced wholesale only after an error-free scan.
  pub fn load(&mut self) -> Result<LoadOutcome> {
    let outcome = match self.pages.select_active_on_load()? {
      None => {
        self.cache = Cache::new();
        LoadOutcome::Empty
      }
      Some(page) => {
        let log = self.pages.read_log(page)?;
        self.cache = replay_log(&log);
        LoadOutcome::Loaded
      }
    };
    self.loaded = true;
    Ok(outcome)
  }

  /// Serializes every live cache entry into the standby page and swaps it in,
  /// discarding any superseded history on the medium. On failure the cache
  /// and the previously active page are left untouched.
  pub fn save(&mut self) -> Result<()> {
    if !self.loaded {
      return Err(Errors::StoreNotLoaded);
    }

    let mut records = Vec::with_capacity(self.cache.len());
    let mut remaining = self.options.log_capacity();
    for (key, value) in self.cache.iter() {
      let record = Record::entry(key.clone(), value.clone());
      let encoded = record.encode(remaining)?;
      remaining -= encoded.len();
      records.push(encoded);
    }

    self.pages.compact_and_swap(&records)
  }

  /// Cache lookup. Absence is a normal outcome, never an error.
  pub fn read_key(&self, key: &str) -> Result<Option<Bytes>> {
    if !self.loaded {
      return Err(Errors::StoreNotLoaded);
    }
    Ok(self.cache.get(key).cloned())
  }

  /// Validates the key and value, then upserts into the cache. Does not touch
  /// the medium; a validation failure leaves the cache unchanged.
  pub fn write_key(&mut self, key: &str, value: Bytes) -> Result<()> {
    if !self.loaded {
      return Err(Errors::StoreNotLoaded);
    }
    if key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }
    if key.len() > MAX_KEY_SIZE {
      return Err(Errors::KeyTooLarge);
    }

    let record = Record::entry(key.to_string(), value);
    if record.encoded_len() > self.options.log_capacity() {
      return Err(Errors::ValueTooLarge);
    }

    self.cache.put(record.key, record.value);
    Ok(())
  }

  /// Removes the key from the cache and reports whether it was present.
  /// Erasing an absent key is a no-op, not an error.
  pub fn erase_key(&mut self, key: &str) -> Result<bool> {
    if !self.loaded {
      return Err(Errors::StoreNotLoaded);
    }
    Ok(self.cache.delete(key))
  }

  /// Snapshot of the current keys, in unspecified order.
  pub fn all_keys(&self) -> Result<Vec<String>> {
    if !self.loaded {
      return Err(Errors::StoreNotLoaded);
    }
    Ok(self.cache.keys())
  }
}

fn check_options(options: &Options) -> Result<()> {
  let granule = options.write_granularity;
  if granule == 0 || (granule as usize) < HEADER_SIZE {
    return Err(Errors::InvalidWriteGranularity);
  }
  if options.page_size == 0
    || options.page_size % granule != 0
    || (options.page_size as u64) < granule as u64 * 2
  {
    return Err(Errors::InvalidPageSize);
  }
  if options.base_address % granule != 0 {
    return Err(Errors::InvalidBaseAddress);
  }
  if options.page_size.checked_mul(2) != Some(options.region_size)
    || options.base_address.checked_add(options.region_size).is_none()
  {
    return Err(Errors::InvalidRegionSize);
  }
  Ok(())
}

fn replay_log(log: &[u8]) -> Cache {
  let mut cache = Cache::new();
  let mut offset = 0;
  loop {
    match Record::decode(&log[offset..]) {
      Decoded::Record { record, size } => {
        match record.rec_type {
          RecordType::Entry => cache.put(record.key, record.value),
          RecordType::Tombstone => {
            cache.delete(&record.key);
          }
        }
        offset += size;
      }
      Decoded::EndOfLog => break,
      Decoded::Corrupt => {
        warn!("corrupt record at log offset {}, truncating replay", offset);
        break;
      }
    }
  }
  cache
}
