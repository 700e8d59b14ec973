//! PageKV: a power-loss-safe key-value store for raw erase-before-write media.
//!
//! PageKV keeps a string-keyed byte-value map durable on storage that can only
//! be erased in large fixed-size blocks and written in smaller fixed-size
//! granules (flash memory, or anything exposing the same contract). The
//! engine manages exactly two pages: saves compact the entire live state into
//! the standby page and atomically swap it in, so the medium always holds
//! either the pre-save or the post-save state, never a mix.
//!
//! # Features
//!
//! * Atomic, power-loss-safe saves via two-page ping-pong compaction
//! * Checksummed record encoding with torn-write recovery on load
//! * All key operations served from an in-memory cache, no I/O until `save`
//! * Pluggable medium access through a three-method trait
//!
//! # Basic Usage
//!
//! ```
//! use bytes::Bytes;
//! use pagekv::{db::Store, medium::memory::MemoryMedium, option::Options};
//!
//! let opts = Options::default();
//! let medium = MemoryMedium::new(opts.region_size as usize);
//! let mut store = Store::new(Box::new(medium), opts).expect("failed to open store");
//!
//! store.load().expect("failed to load store");
//! store.write_key("hello", Bytes::from(b"world".to_vec())).expect("failed to write");
//! store.save().expect("failed to save store");
//!
//! let value = store.read_key("hello").expect("store not loaded");
//! assert_eq!(value, Some(Bytes::from(b"world".to_vec())));
//! ```

mod cache;
mod page;
mod record;

pub mod db;
pub mod errors;
pub mod medium;
pub mod option;
pub mod util;
