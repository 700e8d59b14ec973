use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Errors {
  #[error("key is empty")]
  KeyIsEmpty,

  #[error("key exceeds the maximum key size")]
  KeyTooLarge,

  #[error("value does not fit within a single page")]
  ValueTooLarge,

  #[error("records exceed the page capacity")]
  PageFull,

  #[error("store has not been loaded")]
  StoreNotLoaded,

  #[error("failed to write to the medium")]
  MediumWriteFailed,

  #[error("failed to read from the medium")]
  MediumReadFailed,

  #[error("failed to erase a page on the medium")]
  MediumEraseFailed,

  #[error("failed to open the medium file")]
  FailedToOpenMediumFile,

  #[error("write granularity is zero or too small for the page header")]
  InvalidWriteGranularity,

  #[error("page size is not a positive multiple of the write granularity")]
  InvalidPageSize,

  #[error("base address is not aligned to the write granularity")]
  InvalidBaseAddress,

  #[error("region size does not equal twice the page size")]
  InvalidRegionSize,
}

pub type Result<T> = std::result::Result<T, Errors>;
