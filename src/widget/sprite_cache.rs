use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use thiserror::Error;

/// Errors that can occur while resolving a sprite texture
#[derive(Error, Debug)]
pub enum SpriteError {
    #[error("failed to decode sprite {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid sprite dimensions {0}x{1}")]
    InvalidDimensions(usize, usize),
}

type CacheKey = (String, u32, u32);

/// Decoded, already scaled sprites keyed by (texture path, width, height).
pub struct SpriteCache {
    cache: HashMap<CacheKey, Arc<RgbaImage>>,
    /// Tracks when each sprite was last used
    last_used: HashMap<CacheKey, u64>,
    /// Bumped on every lookup for LRU ordering
    tick: u64,
    max_cache_size: usize,
}

impl std::fmt::Debug for SpriteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteCache")
            .field("cached", &self.cache.len())
            .field("max_cache_size", &self.max_cache_size)
            .finish()
    }
}

impl SpriteCache {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            last_used: HashMap::new(),
            tick: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Gets a cached sprite or produces it with `loader`
    pub fn get_or_load<F>(
        &mut self,
        texture: &str,
        w: usize,
        h: usize,
        loader: F,
    ) -> Result<Arc<RgbaImage>, SpriteError>
    where
        F: FnOnce(u32, u32) -> Result<RgbaImage, SpriteError>,
    {
        let (w32, h32) = match (u32::try_from(w), u32::try_from(h)) {
            (Ok(w32), Ok(h32)) if w32 > 0 && h32 > 0 => (w32, h32),
            _ => return Err(SpriteError::InvalidDimensions(w, h)),
        };
        self.tick += 1;
        let key = (texture.to_owned(), w32, h32);

        if let Some(sprite) = self.cache.get(&key) {
            self.last_used.insert(key, self.tick);
            return Ok(Arc::clone(sprite));
        }

        let sprite = Arc::new(loader(w32, h32)?);
        self.cache.insert(key.clone(), Arc::clone(&sprite));
        self.last_used.insert(key, self.tick);
        self.prune_cache_if_needed();

        Ok(sprite)
    }

    /// Decode `texture` under `root` and scale it to `w` x `h`
    pub fn load_from_disk(
        root: &Path,
        texture: &str,
        w: u32,
        h: u32,
    ) -> Result<RgbaImage, SpriteError> {
        let path = root.join(texture);
        let decoded = image::open(&path)
            .map_err(|source| SpriteError::Decode { path: path.clone(), source })?
            .into_rgba8();
        if decoded.dimensions() == (w, h) {
            return Ok(decoded);
        }
        log::debug!(
            "Scaling sprite {} from {:?} to {}x{}",
            path.display(),
            decoded.dimensions(),
            w,
            h
        );
        Ok(imageops::resize(&decoded, w, h, FilterType::Nearest))
    }

    fn prune_cache_if_needed(&mut self) {
        if self.cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(CacheKey, u64)> = self
            .last_used
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by_key(|(_, tick)| *tick);

        let to_remove = entries.len() - self.max_cache_size;
        for (key, _) in entries.into_iter().take(to_remove) {
            self.cache.remove(&key);
            self.last_used.remove(&key);
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.last_used.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    #[cfg(test)]
    fn contains(&self, texture: &str, w: u32, h: u32) -> bool {
        self.cache.contains_key(&(texture.to_owned(), w, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32) -> Result<RgbaImage, SpriteError> {
        Ok(RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 0, 255])))
    }

    #[test]
    fn test_cache_hit() {
        let mut cache = SpriteCache::new(4);
        let first = cache.get_or_load("a.png", 2, 2, solid).unwrap();
        let second = cache
            .get_or_load("a.png", 2, 2, |_, _| panic!("should be cached"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.cache_size(), 1);
    }

    #[test]
    fn test_size_is_part_of_key() {
        let mut cache = SpriteCache::new(4);
        cache.get_or_load("a.png", 2, 2, solid).unwrap();
        let big = cache.get_or_load("a.png", 4, 3, solid).unwrap();
        assert_eq!(big.dimensions(), (4, 3));
        assert_eq!(cache.cache_size(), 2);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = SpriteCache::new(2);
        cache.get_or_load("a.png", 1, 1, solid).unwrap();
        cache.get_or_load("b.png", 1, 1, solid).unwrap();
        cache.get_or_load("a.png", 1, 1, solid).unwrap();
        cache.get_or_load("c.png", 1, 1, solid).unwrap();

        assert_eq!(cache.cache_size(), 2);
        assert!(cache.contains("a.png", 1, 1));
        assert!(!cache.contains("b.png", 1, 1));
        assert!(cache.contains("c.png", 1, 1));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut cache = SpriteCache::new(2);
        let err = cache.get_or_load("a.png", 0, 3, solid).unwrap_err();
        assert!(matches!(err, SpriteError::InvalidDimensions(0, 3)));
    }

    #[test]
    fn test_load_from_disk_scales() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(2, 2, image::Rgba([9, 8, 7, 255]))
            .save(dir.path().join("dot.png"))
            .unwrap();

        let sprite = SpriteCache::load_from_disk(dir.path(), "dot.png", 4, 4).unwrap();
        assert_eq!(sprite.dimensions(), (4, 4));
        assert_eq!(sprite.get_pixel(3, 3).0, [9, 8, 7, 255]);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SpriteCache::load_from_disk(dir.path(), "nope.png", 1, 1).unwrap_err();
        assert!(matches!(err, SpriteError::Decode { .. }));
    }
}
