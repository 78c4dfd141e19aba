use std::path::{Path, PathBuf};

use popcat_core::genetic_map::FetchError;
use popcat_core::{GeneticMap, MapFetcher, ResolvedMap};

/// A [`MapFetcher`] for maps that are already unpacked on local storage: the files of map `id`
/// live in `<cache_dir>/<id>/`.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    cache_dir: PathBuf,
}

impl DirectoryFetcher {
    /// Creates a fetcher rooted at `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// The cache root.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl MapFetcher for DirectoryFetcher {
    fn fetch(&self, map: &GeneticMap) -> Result<ResolvedMap, FetchError> {
        let dir = self.cache_dir.join(map.id().as_str());
        let metadata = match std::fs::metadata(&dir) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::not_cached(map.id(), &dir))
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_dir() {
            return Err(FetchError::not_cached(map.id(), &dir));
        }
        log::debug!("found genetic map {} in {}", map.id(), dir.display());
        Ok(ResolvedMap::new(map, dir))
    }
}
