//! Genetic maps: where an externally hosted recombination map lives and how its per-chromosome
//! files are named. Fetching is left to a [`MapFetcher`]; the [`MapResolver`] guarantees at most
//! one in-flight fetch per map.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rustc_hash::FxHashMap;

use crate::catalog::{CatalogError, EntityKind};
use crate::citation::Citation;

name!(GeneticMapId);

/// The placeholder substituted with a chromosome name in a file pattern.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// The description of an externally hosted genetic map.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "GeneticMapDesc", into = "GeneticMapDesc")]
pub struct GeneticMap {
    id: GeneticMapId,
    url: String,
    file_pattern: String,
    description: String,
    citations: Vec<Citation>,
}

impl GeneticMap {
    /// Creates a new genetic map description.
    ///
    /// Correctness properties:
    ///
    /// - The ID and URL are not blank
    /// - The file pattern contains `{name}`
    pub fn new(
        id: impl Into<GeneticMapId>,
        url: impl Into<String>,
        file_pattern: impl Into<String>,
    ) -> Result<Self, GeneticMapError> {
        let (id, url, file_pattern) = (id.into(), url.into(), file_pattern.into());
        if id.is_blank() {
            return Err(GeneticMapError::EmptyId);
        }
        if url.trim().is_empty() {
            return Err(GeneticMapError::EmptyUrl(id));
        }
        if !file_pattern.contains(NAME_PLACEHOLDER) {
            return Err(GeneticMapError::BadPattern { id, file_pattern });
        }
        Ok(Self {
            id,
            url,
            file_pattern,
            description: String::new(),
            citations: Vec::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    pub fn id(&self) -> &GeneticMapId {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn file_pattern(&self) -> &str {
        &self.file_pattern
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// The file name holding the map of `chromosome`.
    pub fn file_name(&self, chromosome: &str) -> String {
        self.file_pattern.replace(NAME_PLACEHOLDER, chromosome)
    }
}

/// The serialized form of a [`GeneticMap`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GeneticMapDesc {
    pub id: GeneticMapId,
    pub url: String,
    pub file_pattern: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl TryFrom<GeneticMapDesc> for GeneticMap {
    type Error = GeneticMapError;

    fn try_from(desc: GeneticMapDesc) -> Result<Self, Self::Error> {
        Ok(GeneticMap::new(desc.id, desc.url, desc.file_pattern)?
            .with_description(desc.description)
            .with_citations(desc.citations))
    }
}

impl From<GeneticMap> for GeneticMapDesc {
    fn from(map: GeneticMap) -> Self {
        Self {
            id: map.id,
            url: map.url,
            file_pattern: map.file_pattern,
            description: map.description,
            citations: map.citations,
        }
    }
}

/// Genetic map descriptions keyed by ID.
#[derive(Debug, Default, Clone)]
pub struct GeneticMapRegistry {
    maps: FxHashMap<GeneticMapId, Arc<GeneticMap>>,
}

impl GeneticMapRegistry {
    /// Registers a map. Registering an ID twice fails and leaves the first map in place.
    pub fn register(&mut self, map: GeneticMap) -> Result<(), CatalogError> {
        if self.maps.contains_key(map.id()) {
            return Err(CatalogError::duplicate(EntityKind::GeneticMap, map.id()));
        }
        log::debug!("registered genetic map {}", map.id());
        self.maps.insert(map.id.clone(), Arc::new(map));
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Result<&Arc<GeneticMap>, CatalogError> {
        self.maps
            .get(id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::GeneticMap, id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.maps.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<GeneticMap>> + '_ {
        self.maps.values()
    }

    delegate::delegate! {
        to self.maps {
            pub fn len(&self) -> usize;

            pub fn is_empty(&self) -> bool;
        }
    }
}

/// Genetic map description error.
#[derive(Debug, thiserror::Error)]
pub enum GeneticMapError {
    /// The map ID is empty.
    #[error("genetic map ID is empty")]
    EmptyId,

    /// The map has no source URL.
    #[error("genetic map {0} has an empty URL")]
    EmptyUrl(GeneticMapId),

    /// The file pattern lacks the chromosome name placeholder.
    #[error("file pattern {file_pattern:?} of genetic map {id} does not contain {{name}}")]
    BadPattern {
        id: GeneticMapId,
        file_pattern: String,
    },
}

/// A genetic map made available on local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMap {
    pub id: GeneticMapId,
    /// The directory holding the per-chromosome files.
    pub dir: PathBuf,
    pub file_pattern: String,
}

impl ResolvedMap {
    pub fn new(map: &GeneticMap, dir: impl Into<PathBuf>) -> Self {
        Self {
            id: map.id.clone(),
            dir: dir.into(),
            file_pattern: map.file_pattern.clone(),
        }
    }

    /// The local path of the map for `chromosome`.
    pub fn chromosome_path(&self, chromosome: &str) -> PathBuf {
        self.dir
            .join(self.file_pattern.replace(NAME_PLACEHOLDER, chromosome))
    }
}

/// The trait that must be implemented by genetic map fetchers (download, unpack, cache).
pub trait MapFetcher {
    /// Makes `map` available locally.
    fn fetch(&self, map: &GeneticMap) -> Result<ResolvedMap, FetchError>;
}

impl<F: MapFetcher + ?Sized> MapFetcher for &F {
    fn fetch(&self, map: &GeneticMap) -> Result<ResolvedMap, FetchError> {
        (**self).fetch(map)
    }
}

/// Genetic map fetch error.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The map is not available in local storage.
    #[error("genetic map {id} is not cached under {}", dir.display())]
    NotCached { id: GeneticMapId, dir: PathBuf },

    /// The fetcher failed for a reason of its own.
    #[error("failed to fetch genetic map {id}: {reason}")]
    Failed { id: GeneticMapId, reason: String },

    /// Local storage could not be inspected.
    #[error("IO error")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn not_cached(id: &GeneticMapId, dir: &Path) -> Self {
        Self::NotCached {
            id: id.clone(),
            dir: dir.to_path_buf(),
        }
    }
}

type Slot = Arc<Mutex<Option<Arc<ResolvedMap>>>>;

/// Resolves genetic maps through a fetcher, caching successes.
///
/// Each map ID owns a slot guarded by a mutex. A caller holds the slot's lock for the duration of
/// its fetch, so concurrent callers for the same ID wait and then reuse the cached result, while
/// callers for different IDs proceed independently. A failed fetch leaves the slot empty and is
/// reported to its caller only; the next caller fetches again.
#[derive(Debug)]
pub struct MapResolver<F> {
    fetcher: F,
    slots: DashMap<GeneticMapId, Slot>,
}

impl<F: MapFetcher> MapResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            slots: DashMap::new(),
        }
    }

    pub fn resolve(&self, map: &GeneticMap) -> Result<Arc<ResolvedMap>, FetchError> {
        // The shard lock must be released before blocking on the slot.
        let slot = Arc::clone(self.slots.entry(map.id.clone()).or_default().value());
        let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(resolved) = guard.as_ref() {
            return Ok(Arc::clone(resolved));
        }
        let resolved = Arc::new(self.fetcher.fetch(map)?);
        log::info!(
            "resolved genetic map {} to {}",
            map.id,
            resolved.dir.display()
        );
        *guard = Some(Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Returns the cached resolution of `id` without fetching.
    pub fn cached(&self, id: &str) -> Option<Arc<ResolvedMap>> {
        let slot = self.slots.get(id).map(|slot| Arc::clone(slot.value()))?;
        let guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Debug, Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
        fail_first: bool,
    }

    impl MapFetcher for CountingFetcher {
        fn fetch(&self, map: &GeneticMap) -> Result<ResolvedMap, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            if self.fail_first && call == 0 {
                return Err(FetchError::Failed {
                    id: map.id().clone(),
                    reason: "connection reset".into(),
                });
            }
            Ok(ResolvedMap::new(map, format!("/cache/{}", map.id())))
        }
    }

    fn hapmap() -> GeneticMap {
        GeneticMap::new(
            "HapmapII_GRCh37",
            "http://example.org/hapmap.tar.gz",
            "genetic_map_GRCh37_{name}.txt",
        )
        .unwrap()
    }

    #[test]
    fn pattern_without_placeholder_fails() {
        let res = GeneticMap::new("m", "http://example.org/m.tar.gz", "map.txt");
        assert!(matches!(res, Err(GeneticMapError::BadPattern { .. })));
    }

    #[test]
    fn file_name_substitutes_chromosome() {
        assert_eq!(hapmap().file_name("chr1"), "genetic_map_GRCh37_chr1.txt");
        let resolved = ResolvedMap::new(&hapmap(), "/cache/HapmapII_GRCh37");
        assert_eq!(
            resolved.chromosome_path("chr22"),
            PathBuf::from("/cache/HapmapII_GRCh37/genetic_map_GRCh37_chr22.txt")
        );
    }

    #[test]
    fn registry_rejects_duplicates() {
        let mut registry = GeneticMapRegistry::default();
        registry.register(hapmap()).unwrap();
        assert!(matches!(
            registry.register(hapmap()),
            Err(CatalogError::DuplicateId {
                kind: EntityKind::GeneticMap,
                ..
            })
        ));
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("HapmapII_GRCh37").is_ok());
        assert!(matches!(
            registry.lookup("HapmapII_GRCh38"),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn concurrent_resolution_fetches_once() {
        let resolver = MapResolver::new(CountingFetcher::default());
        let map = hapmap();
        let results = std::thread::scope(|s| {
            let handles = (0..8)
                .map(|_| s.spawn(|| resolver.resolve(&map).unwrap()))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert_eq!(resolver.fetcher().calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn failures_are_not_cached() {
        let resolver = MapResolver::new(CountingFetcher {
            fail_first: true,
            ..Default::default()
        });
        let map = hapmap();
        assert!(matches!(
            resolver.resolve(&map),
            Err(FetchError::Failed { .. })
        ));
        assert!(resolver.cached("HapmapII_GRCh37").is_none());
        let resolved = resolver.resolve(&map).unwrap();
        assert_eq!(resolved.dir, PathBuf::from("/cache/HapmapII_GRCh37"));
        assert_eq!(resolver.fetcher().calls.load(Ordering::SeqCst), 2);
        assert!(resolver.cached("HapmapII_GRCh37").is_some());
    }
}
