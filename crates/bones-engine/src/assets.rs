//! Lookup-or-load asset access.
//!
//! The game asks an [`AssetStore`] for handles by name. A failed load yields
//! `None`, which every consumer treats as "nothing to draw" rather than an
//! error.

use std::collections::{HashMap, HashSet};
use std::fmt;

use bones_core::AssetHandle;

use crate::error::{EngineError, EngineResult};

/// Asset categories the store hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    /// Image data.
    Texture,
    /// Geometry.
    Mesh,
    /// Bone hierarchy for skinned meshes.
    Skeleton,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Texture => write!(f, "texture"),
            Self::Mesh => write!(f, "mesh"),
            Self::Skeleton => write!(f, "skeleton"),
        }
    }
}

/// Named asset lookup. Failures come back as `None`.
pub trait AssetStore: std::fmt::Debug {
    /// Handle for the texture `name`.
    fn get_texture(&mut self, name: &str) -> Option<AssetHandle>;
    /// Handle for the mesh `name`.
    fn get_mesh(&mut self, name: &str) -> Option<AssetHandle>;
    /// Handle for the skeleton `name`.
    fn get_skeleton(&mut self, name: &str) -> Option<AssetHandle>;
    /// Release everything loaded so far.
    fn unload(&mut self) {}
}

/// Loads one asset on a cache miss.
pub trait AssetLoader: std::fmt::Debug {
    /// Load `name`; the cache assigns the handle.
    fn load(&mut self, kind: AssetKind, name: &str) -> EngineResult<()>;
}

/// A loader that succeeds for any name in its catalog and fails otherwise.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    known: Option<HashSet<String>>,
}

impl CatalogLoader {
    /// Accept every name.
    pub fn accept_all() -> Self {
        Self { known: None }
    }

    /// Accept only the listed names.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: Some(names.into_iter().map(Into::into).collect()),
        }
    }
}

impl AssetLoader for CatalogLoader {
    fn load(&mut self, kind: AssetKind, name: &str) -> EngineResult<()> {
        match &self.known {
            Some(known) if !known.contains(name) => Err(EngineError::AssetLoad {
                kind,
                name: name.to_string(),
                reason: "not in catalog".into(),
            }),
            _ => Ok(()),
        }
    }
}

/// Caches handles by kind and name so each asset is loaded at most once.
///
/// Failed loads are cached as `None` and logged once.
#[derive(Debug)]
pub struct AssetCache<L: AssetLoader> {
    loader: L,
    entries: HashMap<(AssetKind, String), Option<AssetHandle>>,
    next_handle: u32,
    loads: usize,
}

impl<L: AssetLoader> AssetCache<L> {
    /// An empty cache over `loader`.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
            next_handle: 1,
            loads: 0,
        }
    }

    /// Cached lookup, loading on a miss.
    pub fn get(&mut self, kind: AssetKind, name: &str) -> Option<AssetHandle> {
        let key = (kind, name.to_string());
        if let Some(entry) = self.entries.get(&key) {
            return *entry;
        }

        self.loads += 1;
        let entry = match self.loader.load(kind, name) {
            Ok(()) => {
                let handle = AssetHandle(self.next_handle);
                self.next_handle += 1;
                Some(handle)
            }
            Err(err) => {
                tracing::warn!(%kind, name, error = %err, "asset unavailable");
                None
            }
        };
        self.entries.insert(key, entry);
        entry
    }

    /// Number of distinct (kind, name) pairs looked up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been looked up.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of times the loader was invoked.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

impl Default for AssetCache<CatalogLoader> {
    fn default() -> Self {
        Self::new(CatalogLoader::accept_all())
    }
}

impl<L: AssetLoader> AssetStore for AssetCache<L> {
    fn get_texture(&mut self, name: &str) -> Option<AssetHandle> {
        self.get(AssetKind::Texture, name)
    }

    fn get_mesh(&mut self, name: &str) -> Option<AssetHandle> {
        self.get(AssetKind::Mesh, name)
    }

    fn get_skeleton(&mut self, name: &str) -> Option<AssetHandle> {
        self.get(AssetKind::Skeleton, name)
    }

    fn unload(&mut self) {
        self.entries.clear();
    }
}
