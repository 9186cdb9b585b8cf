//! # Installed application search
//!
//! Finds installed Windows applications whose display name approximately
//! matches a guess, by reading the uninstall records in the registry.
//!
//! ## How a search works
//!
//! 1. Open the store root once.
//! 2. For each configured subtree (by default the native and the
//!    `WOW6432Node` uninstall keys), list the application keys.
//! 3. For each application key, compare its `DisplayName` value with the
//!    guess using [`fuzzy_match`]: trimmed, case-insensitive substring
//!    containment in either direction.
//! 4. Flatten every matching key into an [`AttributeRecord`].
//!
//! ## Stores
//!
//! The walk runs against any [`ConfigStore`]:
//!
//! - [`MemoryStore`]: an in-memory tree, for tests and embedding
//! - [`HiveStore`]: an offline `regf` hive file, e.g. a `SOFTWARE` hive
//!   copied from a disk image; readable on any platform
//! - `LocalMachine`: the live `HKEY_LOCAL_MACHINE` (Windows only)
//!
//! ## Examples
//!
//! ```no_run
//! use reg_appsearch::{HiveStore, Searcher};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HiveStore::open("SOFTWARE")?;
//! for record in Searcher::new(store).find("notepad")? {
//!     println!("{}", record.display_name().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Hive format support
//!
//! The offline reader handles the base block (signature, checksum, version
//! 1.3 to 1.6), `nk` key nodes, `lf`/`lh`/`li`/`ri` subkey lists, `vk`
//! values with inline, direct and big-data (`db`) storage. Transaction logs
//! are not replayed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bigdata;
pub mod config;
pub mod error;
pub mod header;
pub mod hive;
pub mod key;
pub mod matcher;
pub mod output;
pub mod record;
pub mod search;
pub mod store;
pub mod subkey_list;
pub mod utils;
pub mod value;

pub use config::{KeyErrorPolicy, SearchConfig, UNINSTALL_SUBTREE, WOW64_UNINSTALL_SUBTREE};
pub use error::{RegistryError, Result};
pub use hive::{Hive, HiveKey, HiveValue};
pub use matcher::fuzzy_match;
pub use output::{write_matches, OutputMode};
pub use record::{AttributeRecord, MatchResult};
pub use search::{find_applications, flatten_attributes, search_subtree, Searcher};
#[cfg(windows)]
pub use store::LocalMachine;
pub use store::{Attribute, ConfigStore, HiveStore, MemoryStore, StoreKey};
pub use value::{ValueData, ValueType};

/// Name of the attribute holding an application's human-readable name.
pub const DISPLAY_NAME: &str = "DisplayName";

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
