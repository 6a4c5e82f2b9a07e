use crate::types::MAX_JOINTS;
use nalgebra_glm as glm;
use std::ops::{Index, IndexMut};

/// Skinning matrices written by a sampler, one per joint. Sized once when
/// created and never reallocated. Slots past the skeleton's joint count keep
/// whatever was last written there, identity to begin with.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette(Vec<glm::Mat4>);

impl Default for Palette {
    fn default() -> Self {
        Self::new(MAX_JOINTS)
    }
}

impl Palette {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self(vec![glm::Mat4::identity(); capacity])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&glm::Mat4> {
        self.0.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[glm::Mat4] {
        &self.0
    }

    /// Raw bytes of the whole palette for copying into a GPU buffer
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.0)
    }

    /// Shader friendly column major arrays for the first `count` joints
    #[must_use]
    pub fn to_arrays(&self, count: usize) -> Vec<[[f32; 4]; 4]> {
        self.0.iter().take(count).map(|m| (*m).into()).collect()
    }

    /// Overwrites each matrix with a linear blend of `from` and `to`. A
    /// `weight` of 0 gives `from` and 1 gives `to`.
    pub fn blend(&mut self, from: &Self, to: &Self, weight: f32) {
        for ((out, a), b) in self.0.iter_mut().zip(&from.0).zip(&to.0) {
            *out = a * (1.0f32 - weight) + b * weight;
        }
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, glm::Mat4> {
        self.0.iter_mut()
    }
}

impl Index<usize> for Palette {
    type Output = glm::Mat4;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}
