use std::{
  fs::{File, OpenOptions},
  os::unix::fs::FileExt,
  path::Path,
  sync::Arc,
};

use log::error;
use parking_lot::RwLock;

use crate::errors::{Errors, Result};

use super::{Medium, ERASED_BYTE};

/// File-backed medium for hosted use. The file stands in for the raw region:
/// it is grown to the requested size filled with the erased byte, and `erase`
/// rewrites the range with the erased byte so the region behaves like flash
/// that has just been wiped.
pub struct FileMedium {
  fd: Arc<RwLock<File>>,
}

impl FileMedium {
  pub fn new<P>(file_name: P, size: u32) -> Result<Self>
  where
    P: AsRef<Path>,
  {
    let file = match OpenOptions::new()
      .create(true)
      .read(true)
      .write(true)
      .open(file_name)
    {
      Ok(file) => file,
      Err(e) => {
        error!("failed to open medium file: {}", e);
        return Err(Errors::FailedToOpenMediumFile);
      }
    };

    let len = match file.metadata() {
      Ok(meta) => meta.len(),
      Err(e) => {
        error!("failed to stat medium file: {}", e);
        return Err(Errors::FailedToOpenMediumFile);
      }
    };

    if len < size as u64 {
      let fill = vec![ERASED_BYTE; size as usize - len as usize];
      if let Err(e) = file.write_all_at(&fill, len) {
        error!("failed to grow medium file: {}", e);
        return Err(Errors::FailedToOpenMediumFile);
      }
    }

    Ok(Self {
      fd: Arc::new(RwLock::new(file)),
    })
  }
}

impl Medium for FileMedium {
  fn write(&self, address: u32, data: &[u8]) -> bool {
    let fd = self.fd.write();
    match fd.write_all_at(data, address as u64) {
      Ok(()) => true,
      Err(e) => {
        error!("failed to write medium file: {}", e);
        false
      }
    }
  }

  fn read(&self, address: u32, buf: &mut [u8]) -> bool {
    let fd = self.fd.read();
    match fd.read_exact_at(buf, address as u64) {
      Ok(()) => true,
      Err(e) => {
        error!("failed to read medium file: {}", e);
        false
      }
    }
  }

  fn erase(&self, address: u32, len: usize) -> bool {
    let fill = vec![ERASED_BYTE; len];
    let fd = self.fd.write();
    match fd.write_all_at(&fill, address as u64) {
      Ok(()) => true,
      Err(e) => {
        error!("failed to erase medium file range: {}", e);
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_file_reads_erased() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("medium.bin");

    let medium = FileMedium::new(&path, 1024).expect("failed to open medium");
    let mut buf = [0u8; 1024];
    assert!(medium.read(0, &mut buf));
    assert!(buf.iter().all(|&b| b == ERASED_BYTE));
  }

  #[test]
  fn test_write_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("medium.bin");

    {
      let medium = FileMedium::new(&path, 1024).expect("failed to open medium");
      assert!(medium.write(512, &[9, 8, 7, 6]));
    }

    let medium = FileMedium::new(&path, 1024).expect("failed to reopen medium");
    let mut buf = [0u8; 4];
    assert!(medium.read(512, &mut buf));
    assert_eq!(buf, [9, 8, 7, 6]);
  }

  #[test]
  fn test_erase_restores_fill() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("medium.bin");

    let medium = FileMedium::new(&path, 1024).expect("failed to open medium");
    assert!(medium.write(0, &[0u8; 512]));
    assert!(medium.erase(0, 512));

    let mut buf = [0u8; 512];
    assert!(medium.read(0, &mut buf));
    assert!(buf.iter().all(|&b| b == ERASED_BYTE));
  }
}
