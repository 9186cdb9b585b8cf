//! In-memory registry store.
//!
//! Keeps children and values in insertion order, so walks over it are
//! deterministic. Keys can be marked as failing to exercise error paths, and
//! the store counts live handles.

use super::{join_path, path_components, Attribute, ConfigStore, StoreKey};
use crate::error::{RegistryError, Result};
use crate::value::ValueData;
use std::cell::Cell;
use std::io;

/// Fault injected on a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    /// Opening the key fails with access denied.
    Denied,
    /// Opening succeeds but listing subkeys or values fails.
    Enumeration,
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    values: Vec<Attribute>,
    children: Vec<Node>,
    fault: Option<Fault>,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|child| child.name.eq_ignore_ascii_case(name))
    }

    fn child_mut_or_insert(&mut self, name: &str) -> &mut Node {
        let index = match self
            .children
            .iter()
            .position(|child| child.name.eq_ignore_ascii_case(name))
        {
            Some(index) => index,
            None => {
                self.children.push(Node {
                    name: name.to_string(),
                    ..Node::default()
                });
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }
}

/// A registry tree held in memory.
///
/// # Examples
///
/// ```rust
/// use reg_appsearch::{ConfigStore, MemoryStore};
///
/// let store = MemoryStore::new()
///     .with_key(r"SOFTWARE\Vendor\App", [("DisplayName", "App")]);
/// let root = store.open_root().unwrap();
/// let app = root.open_subkey(r"software\vendor\app").unwrap();
/// assert_eq!(app.values().unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    root: Node,
    unavailable: bool,
    open_handles: Cell<usize>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the key at `path` (and its parents) and appends `values`.
    pub fn with_key<I, K, V>(mut self, path: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ValueData>,
    {
        let node = self.node_mut(path);
        node.values
            .extend(values.into_iter().map(|(name, value)| Attribute::new(name, value)));
        self
    }

    /// Appends one value to the key at `path`, creating the key if needed.
    pub fn add_value(&mut self, path: &str, name: impl Into<String>, value: impl Into<ValueData>) {
        self.node_mut(path).values.push(Attribute::new(name, value));
    }

    /// Makes opening the key at `path` fail with access denied.
    pub fn deny(mut self, path: &str) -> Self {
        self.node_mut(path).fault = Some(Fault::Denied);
        self
    }

    /// Makes enumerating the key at `path` fail.
    pub fn break_enumeration(mut self, path: &str) -> Self {
        self.node_mut(path).fault = Some(Fault::Enumeration);
        self
    }

    /// Makes `open_root` fail, as when the registry cannot be reached.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Number of handles currently open on this store.
    pub fn open_handles(&self) -> usize {
        self.open_handles.get()
    }

    fn node_mut(&mut self, path: &str) -> &mut Node {
        path_components(path).fold(&mut self.root, |node, part| node.child_mut_or_insert(part))
    }

    fn handle<'s>(&'s self, node: &'s Node, path: String) -> MemoryKey<'s> {
        self.open_handles.set(self.open_handles.get() + 1);
        MemoryKey {
            store: self,
            node,
            path,
        }
    }
}

impl ConfigStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn open_root(&self) -> Result<Box<dyn StoreKey + '_>> {
        if self.unavailable {
            return Err(RegistryError::store_unavailable(
                self.describe(),
                io::Error::new(io::ErrorKind::NotConnected, "store marked unavailable"),
            ));
        }
        Ok(Box::new(self.handle(&self.root, String::new())))
    }
}

/// An open key of a [`MemoryStore`].
pub struct MemoryKey<'s> {
    store: &'s MemoryStore,
    node: &'s Node,
    path: String,
}

impl MemoryKey<'_> {
    fn check_enumerable(&self) -> Result<()> {
        match self.node.fault {
            Some(Fault::Enumeration) => Err(RegistryError::key_enumeration(
                &self.path,
                "enumeration failure injected",
            )),
            _ => Ok(()),
        }
    }
}

impl StoreKey for MemoryKey<'_> {
    fn path(&self) -> &str {
        &self.path
    }

    fn subkey_names(&self) -> Result<Vec<String>> {
        self.check_enumerable()?;
        Ok(self.node.children.iter().map(|child| child.name.clone()).collect())
    }

    fn open_subkey(&self, path: &str) -> Result<Box<dyn StoreKey + '_>> {
        let full_path = join_path(&self.path, path);
        let mut node = self.node;
        for part in path_components(path) {
            node = node
                .child(part)
                .ok_or_else(|| RegistryError::key_not_found(&full_path))?;
            if node.fault == Some(Fault::Denied) {
                return Err(RegistryError::key_access(
                    &full_path,
                    io::Error::from(io::ErrorKind::PermissionDenied),
                ));
            }
        }
        Ok(Box::new(self.store.handle(node, full_path)))
    }

    fn values(&self) -> Result<Vec<Attribute>> {
        self.check_enumerable()?;
        Ok(self.node.values.clone())
    }
}

impl Drop for MemoryKey<'_> {
    fn drop(&mut self) {
        self.store.open_handles.set(self.store.open_handles.get() - 1);
    }
}
