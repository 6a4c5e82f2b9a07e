use super::types::Skeleton;
use crate::types::{SkeletonId, SkeletonProvider};
use ahash::AHashMap;
use log::info;
use parking_lot::RwLock;
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

/// Skeleton storage in a multithread friendly way.
/// Skeletons are handed out as `Arc` so a sampler keeps its skeleton alive
/// for the length of a step even if it is removed here meanwhile. Lookups
/// happen every step from possibly many threads while inserts are rare, so
/// the map is behind a `parking_lot::RwLock`.
pub struct SkeletonRegistry {
    next_id: AtomicU32,
    skeletons: RwLock<AHashMap<SkeletonId, Arc<Skeleton>>>,
}

impl Default for SkeletonRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SkeletonRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(0),
            // Reserve space to perhaps avoid some realloc/rehash.
            skeletons: RwLock::new(AHashMap::with_capacity(16)),
        }
    }

    /// Stores a skeleton under a newly assigned id
    pub fn insert(&self, skeleton: Skeleton) -> SkeletonId {
        // Skip any ids already taken by `insert_with_id`
        let mut skeletons = self.skeletons.write();
        let id = loop {
            let id = SkeletonId(self.next_id.fetch_add(1, Ordering::Relaxed));
            if !skeletons.contains_key(&id) {
                break id;
            }
        };
        info!("Skeleton {} inserted, joints={}", id.0, skeleton.joints().len());
        skeletons.insert(id, Arc::new(skeleton));
        drop(skeletons);
        id
    }

    /// Stores a skeleton under a known id, returning what was there before
    pub fn insert_with_id(
        &self,
        id: SkeletonId,
        skeleton: Skeleton,
    ) -> Option<Arc<Skeleton>> {
        info!("Skeleton {} inserted, joints={}", id.0, skeleton.joints().len());
        self.skeletons.write().insert(id, Arc::new(skeleton))
    }

    pub fn remove(&self, id: SkeletonId) -> Option<Arc<Skeleton>> {
        self.skeletons.write().remove(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.skeletons.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skeletons.read().is_empty()
    }
}

impl SkeletonProvider for SkeletonRegistry {
    fn resolve(&self, id: SkeletonId) -> Option<Arc<Skeleton>> {
        self.skeletons.read().get(&id).cloned()
    }
}

/// A plain map works as a provider when nothing is shared
impl SkeletonProvider for AHashMap<SkeletonId, Arc<Skeleton>> {
    fn resolve(&self, id: SkeletonId) -> Option<Arc<Skeleton>> {
        self.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_glm as glm;

    fn skeleton() -> Skeleton {
        Skeleton::new(Vec::new(), true, glm::Mat4::identity()).unwrap()
    }

    #[test]
    fn insert_resolve_remove() {
        let registry = SkeletonRegistry::new();
        assert!(registry.is_empty());
        let a = registry.insert(skeleton());
        let b = registry.insert(skeleton());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert!(registry.resolve(a).is_some());
        assert!(registry.remove(a).is_some());
        assert!(registry.resolve(a).is_none());
        assert!(registry.resolve(b).is_some());
    }

    #[test]
    fn insert_skips_taken_ids() {
        let registry = SkeletonRegistry::new();
        assert!(registry.insert_with_id(SkeletonId(0), skeleton()).is_none());
        let id = registry.insert(skeleton());
        assert_eq!(id, SkeletonId(1));
        assert!(registry.insert_with_id(SkeletonId(1), skeleton()).is_some());
    }
}
