//! Dictionary sources and the in-memory dictionary store
//!
//! Dictionaries are fetched once per version from a [`DictionarySource`],
//! validated, and then held read-only by a [`DictionaryStore`] that the
//! comparator reads from synchronously.
//!
//! ## Example
//!
//! ```rust,ignore
//! use dictlens_store::{DirectorySource, DictionaryStore};
//!
//! let source = DirectorySource::new("dictionaries");
//! let mut store = DictionaryStore::new();
//! store.load(&source, "0.6c").await?;
//! store.load_code_lists(&source).await?;
//!
//! let dict = store.get_dictionary("0.6c").unwrap();
//! ```

pub mod source;
pub mod directory;
pub mod http;
pub mod mock;
pub mod validate;
pub mod store;

pub use source::{DictionarySource, SourceError};
pub use directory::DirectorySource;
pub use http::HttpSource;
pub use mock::MockSource;
pub use validate::validate;
pub use store::{DictionaryStore, StoreError};
