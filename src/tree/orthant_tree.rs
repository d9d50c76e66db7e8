use std::{collections::HashMap, hash::Hash};

use itertools::Itertools;
use nalgebra::{allocator::Allocator, Const, DefaultAllocator, DimName};
use slotmap::SlotMap;

use crate::{
    bounding_volume::BoundingVolume,
    misc::{FloatingPoint, Ray},
};

use super::{
    node::{Node, NodeKey},
    Orthant, OrthantRaycastResult, OrthantTreeError, RaycastResult, TreeConfiguration,
    TreeVisitResult,
};

/// Location of an item inside the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ItemLocation {
    pub(crate) node: NodeKey,
    /// Insertion serial, used to order raycast hits at equal distances
    pub(crate) order: u64,
}

/// A mutable spatial index over a fixed domain volume in D space.
///
/// Nodes are split at their center into 2^D orthants on demand. Every item is stored
/// at the deepest node whose volume holds it in a single orthant, subject to the
/// configured minimum orthant size. A side index maps each item to its node.
///
/// The tree is single-writer: visitors and queries borrow it immutably, so it cannot
/// be mutated from inside a traversal.
///
/// # Examples
/// ```
/// use nalgebra::{Point3, Vector3};
/// use orthtree::prelude::*;
///
/// let domain = BoundingVolume::new(Vector3::from_element(0.), Vector3::from_element(100.));
/// let mut tree = OctTree::<&str, f64>::try_new(TreeConfiguration::new(domain)).unwrap();
///
/// let crate_volume = BoundingVolume::new(Vector3::new(10., 10., 0.), Vector3::new(20., 20., 10.));
/// assert!(tree.insert("crate", crate_volume.clone()));
/// assert_eq!(tree.volume_for(&"crate"), Ok(&crate_volume));
///
/// let ray = Ray::new(Point3::new(0., 15., 5.), Vector3::x());
/// let hits = tree.raycast(&ray);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].distance(), 10.);
/// ```
#[derive(Clone, Debug)]
pub struct OrthantTree<I, T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    configuration: TreeConfiguration<T, D>,
    pub(crate) nodes: SlotMap<NodeKey, Node<I, T, D>>,
    pub(crate) root: NodeKey,
    pub(crate) index: HashMap<I, ItemLocation>,
    serial: u64,
}

/// Quadtree alias
pub type QuadTree<I, T> = OrthantTree<I, T, Const<2>>;

/// Octree alias
pub type OctTree<I, T> = OrthantTree<I, T, Const<3>>;

impl<I, T: FloatingPoint, D: DimName> OrthantTree<I, T, D>
where
    I: Clone + Eq + Hash,
    DefaultAllocator: Allocator<D>,
{
    /// Create an empty tree.
    /// # Failures
    /// - if the configuration does not validate, see [`TreeConfiguration::validate`]
    pub fn try_new(configuration: TreeConfiguration<T, D>) -> anyhow::Result<Self> {
        configuration.validate()?;

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(configuration.volume().clone()));
        Ok(Self {
            configuration,
            nodes,
            root,
            index: HashMap::new(),
            serial: 0,
        })
    }

    pub fn configuration(&self) -> &TreeConfiguration<T, D> {
        &self.configuration
    }

    /// The domain volume of the tree.
    pub fn bounds(&self) -> &BoundingVolume<T, D> {
        self.configuration.volume()
    }

    /// Number of items in the tree.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, item: &I) -> bool {
        self.index.contains_key(item)
    }

    /// The volume an item was inserted with.
    /// # Failures
    /// - [`OrthantTreeError::ItemNotFound`] if the item is not in the tree
    pub fn volume_for(&self, item: &I) -> Result<&BoundingVolume<T, D>, OrthantTreeError> {
        self.index
            .get(item)
            .and_then(|location| self.nodes.get(location.node))
            .and_then(|node| node.items().get(item))
            .ok_or(OrthantTreeError::ItemNotFound)
    }

    /// Number of structural nodes (orthants), leaves and interior nodes alike.
    pub fn orthant_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest node, the root being at depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((key, d)) = stack.pop() {
            depth = depth.max(d);
            if let Some(children) = self.nodes[key].children() {
                stack.extend(children.iter().map(|child| (*child, d + 1)));
            }
        }
        depth
    }

    /// Insert an item with the given volume.
    ///
    /// Returns `false` without touching the tree if the volume has inverted corners or is
    /// not contained by the domain volume. An item that is already present is moved to its new volume.
    pub fn insert(&mut self, item: I, volume: BoundingVolume<T, D>) -> bool {
        if !volume.is_valid() {
            #[cfg(feature = "log")]
            log::trace!("rejected item volume {:?}: inverted corners", volume);
            return false;
        }
        if !self.bounds().contains(&volume) {
            #[cfg(feature = "log")]
            log::trace!("rejected item volume {:?}: outside of tree bounds", volume);
            return false;
        }

        let order = match self.detach(&item) {
            Some((location, previous)) => {
                if self.configuration.trim_on_remove() {
                    self.trim();
                }
                if previous == volume {
                    location.order
                } else {
                    self.next_serial()
                }
            }
            None => self.next_serial(),
        };

        let node = self.descend(&volume);
        self.nodes[node].items_mut().insert(item.clone(), volume);
        self.index.insert(item, ItemLocation { node, order });
        true
    }

    /// Remove an item. Returns `false` if the item is not in the tree.
    pub fn remove(&mut self, item: &I) -> bool {
        if self.detach(item).is_none() {
            return false;
        }
        if self.configuration.trim_on_remove() {
            self.trim();
        }
        true
    }

    /// Remove every item and collapse the tree to a single empty leaf.
    pub fn clear(&mut self) {
        #[cfg(feature = "log")]
        log::debug!(
            "clearing {} items across {} orthants",
            self.index.len(),
            self.nodes.len()
        );

        let root = Node::new(self.bounds().clone());
        self.nodes.clear();
        self.index.clear();
        self.root = self.nodes.insert(root);
    }

    /// Collapse every subtree that holds no items back into a leaf.
    /// Items are never removed, and the root's own items are left in place.
    pub fn trim(&mut self) {
        #[cfg(feature = "log")]
        let before = self.nodes.len();

        self.trim_node(self.root);

        #[cfg(feature = "log")]
        {
            let removed = before - self.nodes.len();
            if removed > 0 {
                log::debug!("trimmed {} orthants", removed);
            }
        }
    }

    /// Collect every item whose volume is contained by `volume`.
    pub fn contained_by<C: Extend<I>>(&self, volume: &BoundingVolume<T, D>, items: &mut C) {
        self.collect_items(volume, items, |query, item| query.contains(item));
    }

    /// Collect every item whose volume overlaps `volume`.
    pub fn overlapped_by<C: Extend<I>>(&self, volume: &BoundingVolume<T, D>, items: &mut C) {
        self.collect_items(volume, items, |query, item| query.overlaps(item));
    }

    /// Find every item whose volume is hit by the ray, nearest first.
    pub fn raycast(&self, ray: &Ray<T, D>) -> Vec<RaycastResult<I, T, D>> {
        let mut results = vec![];
        let mut stack = vec![self.root];

        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            if ray.intersects(node.volume()).is_none() {
                continue;
            }

            for (item, volume) in node.items() {
                if let Some(hit) = ray.intersects(volume) {
                    let order = self.index[item].order;
                    results.push(RaycastResult::new(
                        item.clone(),
                        hit.entry(),
                        volume.clone(),
                        order,
                    ));
                }
            }

            if let Some(children) = node.children() {
                stack.extend(children.iter().copied());
            }
        }

        results.sort_unstable();
        results
    }

    /// Find every leaf orthant crossed by the ray, nearest first.
    /// Stored items play no part; this walks the spatial grid along the ray's path.
    pub fn raycast_orthants(&self, ray: &Ray<T, D>) -> Vec<OrthantRaycastResult<T, D>> {
        let mut results = vec![];
        let mut stack = vec![self.root];
        let mut visited = 0;

        while let Some(key) = stack.pop() {
            let order = visited;
            visited += 1;

            let node = &self.nodes[key];
            let Some(hit) = ray.intersects(node.volume()) else {
                continue;
            };

            match node.children() {
                Some(children) => stack.extend(children.iter().rev().copied()),
                None => results.push(OrthantRaycastResult::new(
                    node.volume().clone(),
                    hit.entry(),
                    order,
                )),
            }
        }

        results.into_iter().sorted().collect()
    }

    /// Visit every node depth-first, parents before children.
    ///
    /// The visitor receives the traversal context, a view of the node and its depth.
    /// Returning [`TreeVisitResult::Terminate`] stops the whole traversal at once;
    /// the result of the last visitor call is returned.
    pub fn iterate_orthants<C, F>(&self, context: &mut C, mut visitor: F) -> TreeVisitResult
    where
        F: FnMut(&mut C, &Orthant<'_, I, T, D>, usize) -> TreeVisitResult,
    {
        self.visit_orthants(self.root, 0, None, context, &mut visitor)
    }

    /// Like [`Self::iterate_orthants`], but nodes deeper than `max_depth` are not visited.
    pub fn iterate_orthants_to_depth<C, F>(
        &self,
        context: &mut C,
        max_depth: usize,
        mut visitor: F,
    ) -> TreeVisitResult
    where
        F: FnMut(&mut C, &Orthant<'_, I, T, D>, usize) -> TreeVisitResult,
    {
        self.visit_orthants(self.root, 0, Some(max_depth), context, &mut visitor)
    }

    /// Visit every item exactly once.
    /// The order is unspecified but does not change while the tree is not mutated.
    pub fn iterate_objects<C, F>(&self, context: &mut C, mut visitor: F) -> TreeVisitResult
    where
        F: FnMut(&mut C, &I, &BoundingVolume<T, D>) -> TreeVisitResult,
    {
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            for (item, volume) in node.items() {
                if visitor(context, item, volume) == TreeVisitResult::Terminate {
                    return TreeVisitResult::Terminate;
                }
            }
            if let Some(children) = node.children() {
                stack.extend(children.iter().rev().copied());
            }
        }
        TreeVisitResult::Continue
    }

    /// Iterate over every item and its volume.
    pub fn iter(&self) -> impl Iterator<Item = (&I, &BoundingVolume<T, D>)> {
        self.nodes.values().flat_map(|node| node.items().iter())
    }

    /// Build a tree with the same subdivision shape where every item is replaced by
    /// `transform(item, volume)`.
    ///
    /// The transform must map distinct items to distinct items.
    pub fn map<J, F>(&self, mut transform: F) -> OrthantTree<J, T, D>
    where
        J: Clone + Eq + Hash,
        F: FnMut(&I, &BoundingVolume<T, D>) -> J,
    {
        let mut nodes = SlotMap::with_capacity_and_key(self.nodes.len());
        let mut index = HashMap::with_capacity(self.index.len());
        let root = self.map_node(self.root, &mut nodes, &mut index, &mut transform);

        OrthantTree {
            configuration: self.configuration.clone(),
            nodes,
            root,
            index,
            serial: self.serial,
        }
    }

    fn next_serial(&mut self) -> u64 {
        let serial = self.serial;
        self.serial += 1;
        serial
    }

    /// Unlink an item from its node and from the index.
    fn detach(&mut self, item: &I) -> Option<(ItemLocation, BoundingVolume<T, D>)> {
        let location = self.index.remove(item)?;
        let volume = self.nodes[location.node].items_mut().remove(item)?;
        Some((location, volume))
    }

    /// Find the node an item with `volume` belongs to, splitting leaves on the way.
    /// `volume` must be contained by the tree's bounds.
    fn descend(&mut self, volume: &BoundingVolume<T, D>) -> NodeKey {
        let mut current = self.root;
        loop {
            let node = &self.nodes[current];
            let Some(orthant) = node.volume().orthant_containing(volume) else {
                return current;
            };

            current = match node.children() {
                Some(children) => children[orthant],
                None => {
                    if !self.configuration.is_subdividable(node.volume()) {
                        return current;
                    }
                    self.subdivide(current)[orthant]
                }
            };
        }
    }

    fn subdivide(&mut self, key: NodeKey) -> Box<[NodeKey]> {
        let orthants = self.nodes[key].volume().orthants();

        #[cfg(feature = "log")]
        log::trace!("splitting orthant {:?}", self.nodes[key].volume());

        let children: Box<[NodeKey]> = orthants
            .into_iter()
            .map(|volume| self.nodes.insert(Node::new(volume)))
            .collect();
        self.nodes[key].set_children(children.clone());
        children
    }

    /// Returns `true` if the subtree rooted at `key` holds no items.
    fn trim_node(&mut self, key: NodeKey) -> bool {
        let Some(children) = self.nodes[key].children().map(|c| c.to_vec()) else {
            return self.nodes[key].items().is_empty();
        };

        let mut empty = true;
        for child in children.iter() {
            // every child is trimmed, even after a non-empty one was found
            empty &= self.trim_node(*child);
        }

        if empty {
            self.nodes[key].take_children();
            for child in children {
                self.nodes.remove(child);
            }
        }

        empty && self.nodes[key].items().is_empty()
    }

    fn collect_items<C, P>(&self, query: &BoundingVolume<T, D>, items: &mut C, predicate: P)
    where
        C: Extend<I>,
        P: Fn(&BoundingVolume<T, D>, &BoundingVolume<T, D>) -> bool,
    {
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            if !node.volume().overlaps(query) {
                continue;
            }

            items.extend(
                node.items()
                    .iter()
                    .filter(|(_, volume)| predicate(query, volume))
                    .map(|(item, _)| item.clone()),
            );

            if let Some(children) = node.children() {
                stack.extend(children.iter().copied());
            }
        }
    }

    fn visit_orthants<C, F>(
        &self,
        key: NodeKey,
        depth: usize,
        max_depth: Option<usize>,
        context: &mut C,
        visitor: &mut F,
    ) -> TreeVisitResult
    where
        F: FnMut(&mut C, &Orthant<'_, I, T, D>, usize) -> TreeVisitResult,
    {
        let node = &self.nodes[key];
        if visitor(context, &Orthant::new(node, depth), depth) == TreeVisitResult::Terminate {
            return TreeVisitResult::Terminate;
        }

        if max_depth.is_some_and(|max| depth >= max) {
            return TreeVisitResult::Continue;
        }

        if let Some(children) = node.children() {
            for child in children.iter() {
                let result = self.visit_orthants(*child, depth + 1, max_depth, context, visitor);
                if result == TreeVisitResult::Terminate {
                    return TreeVisitResult::Terminate;
                }
            }
        }

        TreeVisitResult::Continue
    }

    fn map_node<J, F>(
        &self,
        key: NodeKey,
        nodes: &mut SlotMap<NodeKey, Node<J, T, D>>,
        index: &mut HashMap<J, ItemLocation>,
        transform: &mut F,
    ) -> NodeKey
    where
        J: Clone + Eq + Hash,
        F: FnMut(&I, &BoundingVolume<T, D>) -> J,
    {
        let node = &self.nodes[key];
        let target = nodes.insert(Node::new(node.volume().clone()));

        if let Some(children) = node.children() {
            let mapped: Box<[NodeKey]> = children
                .iter()
                .map(|child| self.map_node(*child, nodes, index, transform))
                .collect();
            nodes[target].set_children(mapped);
        }

        for (item, volume) in node.items() {
            let mapped = transform(item, volume);
            let order = self.index[item].order;
            let previous = index.insert(
                mapped.clone(),
                ItemLocation {
                    node: target,
                    order,
                },
            );
            debug_assert!(previous.is_none(), "map transform must be injective");
            nodes[target].items_mut().insert(mapped, volume.clone());
        }

        target
    }

    fn node_eq(&self, key: NodeKey, other: &Self, other_key: NodeKey) -> bool {
        let (a, b) = (&self.nodes[key], &other.nodes[other_key]);
        if a.volume() != b.volume() || a.items() != b.items() {
            return false;
        }

        match (a.children(), b.children()) {
            (None, None) => true,
            (Some(xs), Some(ys)) => xs
                .iter()
                .zip(ys.iter())
                .all(|(x, y)| self.node_eq(*x, other, *y)),
            _ => false,
        }
    }
}

impl<I, T: FloatingPoint, D: DimName> PartialEq for OrthantTree<I, T, D>
where
    I: Clone + Eq + Hash,
    DefaultAllocator: Allocator<D>,
{
    /// Two trees are equal if they share a configuration, a subdivision shape and the
    /// items stored at each node.
    fn eq(&self, other: &Self) -> bool {
        self.configuration == other.configuration
            && self.len() == other.len()
            && self.node_eq(self.root, other, other.root)
    }
}
