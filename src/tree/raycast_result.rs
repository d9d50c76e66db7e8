use std::cmp::Ordering;

use nalgebra::{allocator::Allocator, DefaultAllocator, DimName};

use crate::{bounding_volume::BoundingVolume, misc::FloatingPoint};

/// An item hit by a ray.
///
/// Results are ordered by ascending distance. Results at the same distance are ordered
/// by the insertion order of their items, so distinct hits never compare equal and a
/// `BTreeSet` of results keeps every one of them.
#[derive(Clone, Debug)]
pub struct RaycastResult<I, T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    item: I,
    distance: T,
    volume: BoundingVolume<T, D>,
    order: u64,
}

impl<I, T: FloatingPoint, D: DimName> RaycastResult<I, T, D>
where
    DefaultAllocator: Allocator<D>,
{
    pub(crate) fn new(item: I, distance: T, volume: BoundingVolume<T, D>, order: u64) -> Self {
        Self {
            item,
            distance,
            volume,
            order,
        }
    }

    pub fn item(&self) -> &I {
        &self.item
    }

    pub fn into_item(self) -> I {
        self.item
    }

    /// Distance along the ray at which the item's volume is entered,
    /// in multiples of the ray direction's length.
    pub fn distance(&self) -> T {
        self.distance
    }

    pub fn volume(&self) -> &BoundingVolume<T, D> {
        &self.volume
    }
}

impl<I, T: FloatingPoint, D: DimName> Ord for RaycastResult<I, T, D>
where
    DefaultAllocator: Allocator<D>,
{
    fn cmp(&self, other: &Self) -> Ordering {
        compare_distance(self.distance, other.distance).then(self.order.cmp(&other.order))
    }
}

impl<I, T: FloatingPoint, D: DimName> PartialOrd for RaycastResult<I, T, D>
where
    DefaultAllocator: Allocator<D>,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I, T: FloatingPoint, D: DimName> PartialEq for RaycastResult<I, T, D>
where
    DefaultAllocator: Allocator<D>,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<I, T: FloatingPoint, D: DimName> Eq for RaycastResult<I, T, D> where DefaultAllocator: Allocator<D> {}

/// A leaf orthant crossed by a ray.
/// Ordered by ascending distance, then by the pre-order position of the orthant in the tree.
#[derive(Clone, Debug)]
pub struct OrthantRaycastResult<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    volume: BoundingVolume<T, D>,
    distance: T,
    order: u64,
}

impl<T: FloatingPoint, D: DimName> OrthantRaycastResult<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    pub(crate) fn new(volume: BoundingVolume<T, D>, distance: T, order: u64) -> Self {
        Self {
            volume,
            distance,
            order,
        }
    }

    pub fn volume(&self) -> &BoundingVolume<T, D> {
        &self.volume
    }

    pub fn distance(&self) -> T {
        self.distance
    }
}

impl<T: FloatingPoint, D: DimName> Ord for OrthantRaycastResult<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    fn cmp(&self, other: &Self) -> Ordering {
        compare_distance(self.distance, other.distance).then(self.order.cmp(&other.order))
    }
}

impl<T: FloatingPoint, D: DimName> PartialOrd for OrthantRaycastResult<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: FloatingPoint, D: DimName> PartialEq for OrthantRaycastResult<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: FloatingPoint, D: DimName> Eq for OrthantRaycastResult<T, D> where DefaultAllocator: Allocator<D> {}

// distances come from finite slab entries, so NaN never reaches here
fn compare_distance<T: FloatingPoint>(a: T, b: T) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
