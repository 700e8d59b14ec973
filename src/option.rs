/// Geometry of the medium region owned by the store, fixed for the life of
/// the instance. All write/read offsets and lengths the engine issues are
/// aligned to `write_granularity`; erases always cover a full page.
#[derive(Debug, Clone)]
pub struct Options {
  /// Smallest unit the medium can be written in, in bytes.
  pub write_granularity: u32,

  /// Erase granularity of the medium, in bytes. One page per erase.
  pub page_size: u32,

  /// Start of the region owned by the store.
  pub base_address: u32,

  /// Total region size. Must equal twice the page size: the store manages
  /// exactly two pages for ping-pong compaction.
  pub region_size: u32,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      write_granularity: 512,
      page_size: 4096,
      base_address: 0,
      region_size: 8192,
    }
  }
}

impl Options {
  /// Bytes available for the record log on one page. The first write granule
  /// of every page is reserved for the page header.
  pub fn log_capacity(&self) -> usize {
    (self.page_size - self.write_granularity) as usize
  }
}
