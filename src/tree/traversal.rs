use std::collections::HashMap;

use nalgebra::{allocator::Allocator, DefaultAllocator, DimName};

use crate::{bounding_volume::BoundingVolume, misc::FloatingPoint};

use super::node::Node;

/// Value returned by tree visitors to steer the traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeVisitResult {
    /// Keep visiting the remaining nodes or items
    Continue,
    /// Abort the whole traversal; no further visitor calls are made
    Terminate,
}

/// Read-only view of a single node handed to orthant visitors.
pub struct Orthant<'a, I, T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    node: &'a Node<I, T, D>,
    depth: usize,
}

impl<'a, I, T: FloatingPoint, D: DimName> Orthant<'a, I, T, D>
where
    DefaultAllocator: Allocator<D>,
{
    pub(crate) fn new(node: &'a Node<I, T, D>, depth: usize) -> Self {
        Self { node, depth }
    }

    pub fn volume(&self) -> &'a BoundingVolume<T, D> {
        self.node.volume()
    }

    /// Depth of the node, the root being at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Items stored directly at this node.
    pub fn objects(&self) -> &'a HashMap<I, BoundingVolume<T, D>> {
        self.node.items()
    }

    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }
}
