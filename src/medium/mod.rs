pub mod file;
pub mod memory;

/// Byte value of erased storage. Freshly erased regions read back as all-ones,
/// and the record log relies on this as its implicit end-of-log sentinel.
pub const ERASED_BYTE: u8 = 0xff;

/// Raw access to an erase-before-write medium, supplied by the embedding
/// application. The engine only issues `write`/`read` at offsets and lengths
/// aligned to the configured write granularity, and `erase` only for a full
/// page at a page-aligned address.
///
/// A `false` return from any operation is surfaced by `load`/`save` as an I/O
/// failure; the engine never retries.
pub trait Medium: Send + Sync {
  fn write(&self, address: u32, data: &[u8]) -> bool;

  fn read(&self, address: u32, buf: &mut [u8]) -> bool;

  fn erase(&self, address: u32, len: usize) -> bool;
}
