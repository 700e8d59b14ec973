use std::sync::Arc;

use parking_lot::Mutex;

use super::{Medium, ERASED_BYTE};

/// Volatile medium backed by a shared byte buffer. Clones share the same
/// region, so a handle kept outside the store can observe every write and
/// erase the engine issues, or inject a failure at an exact write call.
#[derive(Clone)]
pub struct MemoryMedium {
  inner: Arc<Mutex<Inner>>,
}

struct Inner {
  data: Vec<u8>,
  write_calls: usize,
  erase_calls: usize,
  erase_targets: Vec<u32>,
  fail_write_at: Option<usize>,
}

impl MemoryMedium {
  pub fn new(size: usize) -> Self {
    Self {
      inner: Arc::new(Mutex::new(Inner {
        data: vec![ERASED_BYTE; size],
        write_calls: 0,
        erase_calls: 0,
        erase_targets: Vec::new(),
        fail_write_at: None,
      })),
    }
  }

  /// Makes the `nth` upcoming write call (1-based) return `false`. The
  /// failure fires once; later writes succeed again.
  pub fn fail_write(&self, nth: usize) {
    let mut inner = self.inner.lock();
    inner.fail_write_at = Some(inner.write_calls + nth);
  }

  pub fn write_calls(&self) -> usize {
    self.inner.lock().write_calls
  }

  pub fn erase_calls(&self) -> usize {
    self.inner.lock().erase_calls
  }

  /// Addresses of every erase issued so far, in order.
  pub fn erase_targets(&self) -> Vec<u32> {
    self.inner.lock().erase_targets.clone()
  }

  pub fn snapshot(&self) -> Vec<u8> {
    self.inner.lock().data.clone()
  }
}

impl Medium for MemoryMedium {
  fn write(&self, address: u32, data: &[u8]) -> bool {
    let mut inner = self.inner.lock();
    inner.write_calls += 1;
    if inner.fail_write_at == Some(inner.write_calls) {
      inner.fail_write_at = None;
      return false;
    }
    let start = address as usize;
    let end = match start.checked_add(data.len()) {
      Some(end) if end <= inner.data.len() => end,
      _ => return false,
    };
    inner.data[start..end].copy_from_slice(data);
    true
  }

  fn read(&self, address: u32, buf: &mut [u8]) -> bool {
    let inner = self.inner.lock();
    let start = address as usize;
    let end = match start.checked_add(buf.len()) {
      Some(end) if end <= inner.data.len() => end,
      _ => return false,
    };
    buf.copy_from_slice(&inner.data[start..end]);
    true
  }

  fn erase(&self, address: u32, len: usize) -> bool {
    let mut inner = self.inner.lock();
    let start = address as usize;
    let end = match start.checked_add(len) {
      Some(end) if end <= inner.data.len() => end,
      _ => return false,
    };
    for b in &mut inner.data[start..end] {
      *b = ERASED_BYTE;
    }
    inner.erase_calls += 1;
    inner.erase_targets.push(address);
    true
  }
}
