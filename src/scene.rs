use crate::{rc_error::RcError, transform::Transform};
use log::{error, trace};
use smallvec::SmallVec;

struct Node {
    transform: Transform,
    parent: Option<usize>,
    children: SmallVec<[usize; 4]>,
}

/// Parent/child hierarchy of transforms. A node can only be added under a
/// node that already exists, so walking in insertion order always reaches a
/// parent before its children.
#[derive(Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a transform, optionally under an existing parent, and returns its
    /// index
    ///
    /// # Errors
    /// Returns `RcError::NoNode` if `parent` is not in the graph
    pub fn add(
        &mut self,
        transform: Transform,
        parent: Option<usize>,
    ) -> Result<usize, RcError> {
        let index = self.nodes.len();
        if let Some(p) = parent {
            let Some(parent_node) = self.nodes.get_mut(p) else {
                error!("parent {} not in scene of {} nodes", p, index);
                return Err(RcError::NoNode(p));
            };
            parent_node.children.push(index);
        }
        self.nodes.push(Node {
            transform,
            parent,
            children: SmallVec::new(),
        });
        Ok(index)
    }

    /// Updates every transform, parents first
    pub fn update(&mut self) {
        for i in 0..self.nodes.len() {
            let (before, after) = self.nodes.split_at_mut(i);
            let node = &mut after[0];
            let parent = node.parent.map(|p| &before[p].transform);
            node.transform.update(parent);
        }
        trace!("scene updated {} nodes", self.nodes.len());
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Transform> {
        self.nodes.get(index).map(|n| &n.transform)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Transform> {
        self.nodes.get_mut(index).map(|n| &mut n.transform)
    }

    #[must_use]
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, index: usize) -> Option<&[usize]> {
        self.nodes.get(index).map(|n| n.children.as_slice())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
