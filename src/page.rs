use bytes::{Buf, BufMut, BytesMut};
use log::error;

use crate::errors::{Errors, Result};
use crate::medium::{Medium, ERASED_BYTE};
use crate::option::Options;
use crate::record;

pub const PAGE_MAGIC: &[u8; 4] = b"PKV1";
pub const HEADER_SIZE: usize = 8; // [magic 4][status u32 LE]

const STATUS_PENDING: u32 = 0x474E_4450;
const STATUS_ACTIVE: u32 = 0x5654_4341;
const STATUS_STALE: u32 = 0x4C41_5453;

/// One of the two fixed regions managed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
  A,
  B,
}

impl Page {
  pub fn other(self) -> Page {
    match self {
      Page::A => Page::B,
      Page::B => Page::A,
    }
  }

  pub fn base(self, options: &Options) -> u32 {
    match self {
      Page::A => options.base_address,
      Page::B => options.base_address + options.page_size,
    }
  }
}

/// Lifecycle of a page: `Erased -> Pending -> Active -> Stale -> Erased`.
/// `Pending` covers the window where a new log is being written but has not
/// been promoted; a page found `Pending` on load is garbage from an
/// interrupted save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
  Erased,
  Pending,
  Active,
  Stale,
}

/// Owns the page headers and the compaction/swap protocol. The active page is
/// the only one ever trusted on load; the standby page only becomes
/// authoritative once its promotion header write has completed.
pub struct PageManager {
  medium: Box<dyn Medium>,
  options: Options,
  active: Option<Page>,
}

impl PageManager {
  pub fn new(medium: Box<dyn Medium>, options: Options) -> Self {
    Self {
      medium,
      options,
      active: None,
    }
  }

  pub fn active(&self) -> Option<Page> {
    self.active
  }

  /// Reads the page header (one write granule). Anything without the page
  /// magic or with an unrecognized status word reads as `Erased`.
  pub fn read_status(&self, page: Page) -> Result<PageStatus> {
    let mut header = vec![0u8; self.options.write_granularity as usize];
    if !self.medium.read(page.base(&self.options), &mut header) {
      error!("failed to read page header at {:#x}", page.base(&self.options));
      return Err(Errors::MediumReadFailed);
    }
    Ok(decode_status(&header))
  }

  /// Reads the record log area of a page (everything after the header
  /// granule).
  pub fn read_log(&self, page: Page) -> Result<Vec<u8>> {
    let mut log = vec![0u8; self.options.log_capacity()];
    let address = page.base(&self.options) + self.options.write_granularity;
    if !self.medium.read(address, &mut log) {
      error!("failed to read page log at {:#x}", address);
      return Err(Errors::MediumReadFailed);
    }
    Ok(log)
  }

  /// Picks the authoritative page on load. Exactly one page should be active;
  /// if both are (a swap was interrupted between promotion and erase), the
  /// page whose log parses further without corruption wins and the other is
  /// retired. `None` means the store has never been saved.
  pub fn select_active_on_load(&mut self) -> Result<Option<Page>> {
    let status_a = self.read_status(Page::A)?;
    let status_b = self.read_status(Page::B)?;

    let active = match (status_a, status_b) {
      (PageStatus::Active, PageStatus::Active) => {
        let depth_a = record::valid_prefix_len(&self.read_log(Page::A)?);
        let depth_b = record::valid_prefix_len(&self.read_log(Page::B)?);
        let winner = if depth_b > depth_a { Page::B } else { Page::A };
        self.retire(winner.other())?;
        Some(winner)
      }
      (PageStatus::Active, partner) => {
        if partner != PageStatus::Erased {
          self.erase_page(Page::B)?;
        }
        Some(Page::A)
      }
      (partner, PageStatus::Active) => {
        if partner != PageStatus::Erased {
          self.erase_page(Page::A)?;
        }
        Some(Page::B)
      }
      _ => None,
    };

    self.active = active;
    Ok(active)
  }

  /// Writes the given pre-encoded records into the standby page and swaps it
  /// in. Ordering is the durability contract:
  ///
  /// 1. pending header into the (erased) standby page,
  /// 2. the full record log,
  /// 3. active header — from here the new page is authoritative,
  /// 4. stale header on the old page, then erase it.
  ///
  /// A failure before step 3 leaves the old page canonically active; a
  /// failure after it leaves the old page merely pending erase, retried on
  /// the next save or load.
  pub fn compact_and_swap(&mut self, records: &[Vec<u8>]) -> Result<()> {
    let total: usize = records.iter().map(|r| r.len()).sum();
    let capacity = self.options.log_capacity();
    if total > capacity {
      return Err(Errors::PageFull);
    }

    let target = match self.active {
      Some(page) => page.other(),
      None => Page::A,
    };
    if self.read_status(target)? != PageStatus::Erased {
      self.erase_page(target)?;
    }

    self.write_header(target, STATUS_PENDING)?;

    if total > 0 {
      let granule = self.options.write_granularity as usize;
      let padded = total.div_ceil(granule) * granule;
      let mut log = vec![ERASED_BYTE; padded];
      let mut offset = 0;
      for encoded in records {
        log[offset..offset + encoded.len()].copy_from_slice(encoded);
        offset += encoded.len();
      }
      let address = target.base(&self.options) + self.options.write_granularity;
      if !self.medium.write(address, &log) {
        error!("failed to write page log at {:#x}", address);
        return Err(Errors::MediumWriteFailed);
      }
    }

    self.write_header(target, STATUS_ACTIVE)?;

    let old = self.active.replace(target);
    if let Some(old) = old {
      self.retire(old)?;
    }
    Ok(())
  }

  fn retire(&self, page: Page) -> Result<()> {
    self.write_header(page, STATUS_STALE)?;
    self.erase_page(page)
  }

  fn write_header(&self, page: Page, status: u32) -> Result<()> {
    let granule = self.options.write_granularity as usize;
    let mut header = BytesMut::with_capacity(granule);
    header.put_slice(PAGE_MAGIC);
    header.put_u32_le(status);
    header.resize(granule, ERASED_BYTE);

    if !self.medium.write(page.base(&self.options), &header) {
      error!("failed to write page header at {:#x}", page.base(&self.options));
      return Err(Errors::MediumWriteFailed);
    }
    Ok(())
  }

  fn erase_page(&self, page: Page) -> Result<()> {
    if !self
      .medium
      .erase(page.base(&self.options), self.options.page_size as usize)
    {
      error!("failed to erase page at {:#x}", page.base(&self.options));
      return Err(Errors::MediumEraseFailed);
    }
    Ok(())
  }
}

fn decode_status(header: &[u8]) -> PageStatus {
  if header.len() < HEADER_SIZE || &header[..4] != PAGE_MAGIC {
    return PageStatus::Erased;
  }
  let mut status = &header[4..HEADER_SIZE];
  match status.get_u32_le() {
    STATUS_PENDING => PageStatus::Pending,
    STATUS_ACTIVE => PageStatus::Active,
    STATUS_STALE => PageStatus::Stale,
    _ => PageStatus::Erased,
  }
}
