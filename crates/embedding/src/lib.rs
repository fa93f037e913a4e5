//! Static word-embedding table.
//!
//! Loads a GloVe-style text file (`word f1 f2 ... fD` per line) once at startup
//! and answers lookups for the rest of the process lifetime. The table is never
//! mutated after load, so it can be shared behind an `Arc` without locking.
//!
//! ## Out-of-vocabulary words
//!
//! Lookup never fails. A word missing from the table gets the all-zero vector
//! of the table's dimension, so every vector handed downstream has exactly `D`
//! components.
//!
//! ## Quick example
//!
//! ```
//! use embedding::{EmbeddingLookup, EmbeddingStore};
//! use std::io::Cursor;
//!
//! let store = EmbeddingStore::from_reader(Cursor::new("bob 0.5 0.25\n"), None).unwrap();
//! assert_eq!(store.lookup("bob"), &[0.5, 0.25]);
//! assert_eq!(store.lookup("ross"), &[0.0, 0.0]);
//! ```

mod error;
mod store;

pub use crate::error::EmbeddingError;
pub use crate::store::{EmbeddingLookup, EmbeddingStats, EmbeddingStore};
