//! Walking uninstall subtrees for applications matching a name guess.
//!
//! The walk is two levels deep: subtree, then one key per application. A key
//! matches when its `DisplayName` value fuzzy-matches the guess, and is then
//! flattened into an [`AttributeRecord`]. Every key handle opened here is a
//! local owned value, so it is closed when the loop iteration or the function
//! ends, including on early error returns.

use crate::config::{KeyErrorPolicy, SearchConfig};
use crate::error::{RegistryError, Result};
use crate::matcher::{fuzzy_match, is_display_name, normalize};
use crate::record::{AttributeRecord, MatchResult};
use crate::store::{ConfigStore, StoreKey};
use tracing::{debug, info, instrument, warn};

/// Builds the attribute record of an open key.
///
/// Values are applied in enumeration order; if a name repeats, the later
/// value wins.
pub fn flatten_attributes(key: &dyn StoreKey) -> Result<AttributeRecord> {
    Ok(key
        .values()?
        .into_iter()
        .map(|attribute| (attribute.name, attribute.value))
        .collect())
}

/// Checks one application key under `parent` and returns its matches.
///
/// A key yields one record per `DisplayName` value that matches; a well
/// formed key has at most one.
fn search_entry(guess: &str, parent: &dyn StoreKey, name: &str) -> Result<Vec<MatchResult>> {
    let entry = parent.open_subkey(name)?;
    let mut matches = Vec::new();
    for attribute in entry.values()? {
        if is_display_name(&attribute.name) && fuzzy_match(guess, &attribute.value.text()) {
            debug!(key = entry.path(), display_name = %attribute.value, "Matched application");
            matches.push(flatten_attributes(entry.as_ref())?);
        }
    }
    Ok(matches)
}

/// Scans the immediate children of `subtree` below `root`.
///
/// Children are visited in the store's enumeration order. With
/// [`KeyErrorPolicy::Skip`], a child that cannot be opened or read is logged
/// and skipped; with [`KeyErrorPolicy::Abort`] the error is returned and the
/// rest of the subtree is not visited.
#[instrument(skip(root, policy))]
pub fn search_subtree(
    guess: &str,
    root: &dyn StoreKey,
    subtree: &str,
    policy: KeyErrorPolicy,
) -> Result<Vec<MatchResult>> {
    let uninstall = root.open_subkey(subtree)?;
    let names = uninstall.subkey_names()?;
    debug!(entries = names.len(), "Enumerated application keys");

    let mut matches = Vec::new();
    for name in names {
        match search_entry(guess, uninstall.as_ref(), &name) {
            Ok(found) => matches.extend(found),
            Err(e) if policy == KeyErrorPolicy::Skip && !e.is_fatal() => {
                warn!(key = %name, error = %e, "Skipping unreadable application key");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(matches)
}

/// Finds every application whose display name fuzzy-matches `guess`.
///
/// Opens the store root once, then scans each configured subtree in order.
/// Results keep subtree order, then per-subtree enumeration order. A subtree
/// that does not exist is skipped, but if none of them exist the search fails
/// with [`RegistryError::NoSubtrees`]. Failing to open the root is always
/// fatal and returns no partial results.
///
/// # Examples
///
/// ```rust
/// use reg_appsearch::{find_applications, MemoryStore, SearchConfig};
///
/// let store = MemoryStore::new().with_key(
///     r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\Notepad++",
///     [("DisplayName", "Notepad++"), ("DisplayVersion", "8.0")],
/// );
/// let matches = find_applications(&store, "notepad", &SearchConfig::default()).unwrap();
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].display_name().as_deref(), Some("Notepad++"));
/// ```
pub fn find_applications(
    store: &dyn ConfigStore,
    guess: &str,
    config: &SearchConfig,
) -> Result<Vec<MatchResult>> {
    let root = store.open_root()?;

    let mut matches = Vec::new();
    let mut any_present = false;
    for subtree in &config.subtrees {
        match search_subtree(guess, root.as_ref(), subtree, config.on_key_error) {
            Ok(found) => {
                any_present = true;
                matches.extend(found);
            }
            Err(RegistryError::KeyNotFound { path }) if path_is_subtree(&path, subtree) => {
                debug!(subtree = %subtree, "Subtree not present, skipping");
            }
            Err(e) if config.on_key_error == KeyErrorPolicy::Skip && !e.is_fatal() => {
                any_present = true;
                warn!(subtree = %subtree, error = %e, "Skipping unreadable subtree");
            }
            Err(e) => return Err(e),
        }
    }

    // A store holding none of the subtrees is the wrong store, not one
    // without matches.
    if !any_present {
        return Err(RegistryError::NoSubtrees {
            store: store.describe(),
            subtrees: config.subtrees.clone(),
        });
    }

    info!(store = %store.describe(), guess, matches = matches.len(), "Search complete");
    Ok(matches)
}

/// True when a not-found error is about the subtree itself rather than a
/// child that vanished during the walk.
fn path_is_subtree(path: &str, subtree: &str) -> bool {
    normalize(path.trim_matches('\\')) == normalize(subtree.trim_matches('\\'))
}

/// A store paired with the configuration to search it with.
pub struct Searcher<S> {
    store: S,
    config: SearchConfig,
}

impl<S: ConfigStore> Searcher<S> {
    /// Creates a searcher with the default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: SearchConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs [`find_applications`] against the store.
    pub fn find(&self, guess: &str) -> Result<Vec<MatchResult>> {
        find_applications(&self.store, guess, &self.config)
    }
}
