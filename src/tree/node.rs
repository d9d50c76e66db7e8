use std::collections::HashMap;

use nalgebra::{allocator::Allocator, DefaultAllocator, DimName};

use crate::{bounding_volume::BoundingVolume, misc::FloatingPoint};

slotmap::new_key_type! {
    /// Index of a node in the tree's arena
    pub(crate) struct NodeKey;
}

/// A node of an orthant tree.
///
/// A node is a leaf until it is split, after which it owns exactly 2^D children
/// that partition its volume. Items are stored at the deepest node that holds them.
#[derive(Clone, Debug)]
pub(crate) struct Node<I, T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    volume: BoundingVolume<T, D>,
    /// Items stored at this node, not in descendants
    items: HashMap<I, BoundingVolume<T, D>>,
    children: Option<Box<[NodeKey]>>,
}

impl<I, T: FloatingPoint, D: DimName> Node<I, T, D>
where
    DefaultAllocator: Allocator<D>,
{
    pub fn new(volume: BoundingVolume<T, D>) -> Self {
        Self {
            volume,
            items: HashMap::new(),
            children: None,
        }
    }

    pub fn volume(&self) -> &BoundingVolume<T, D> {
        &self.volume
    }

    pub fn items(&self) -> &HashMap<I, BoundingVolume<T, D>> {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut HashMap<I, BoundingVolume<T, D>> {
        &mut self.items
    }

    pub fn children(&self) -> Option<&[NodeKey]> {
        self.children.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn set_children(&mut self, children: Box<[NodeKey]>) {
        debug_assert!(self.children.is_none());
        self.children = Some(children);
    }

    /// Revert the node to a leaf, handing back the keys of its former children.
    pub fn take_children(&mut self) -> Option<Box<[NodeKey]>> {
        self.children.take()
    }
}
