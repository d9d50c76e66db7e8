use nalgebra::{allocator::Allocator, Const, DefaultAllocator, DimName, OPoint, OVector};

use crate::{bounding_volume::BoundingVolume, misc::FloatingPoint};

/// Represents a ray in D dimensions.
/// The inverse of the direction is computed once at construction and reused by every slab test.
#[derive(Clone, Debug)]
pub struct Ray<T: FloatingPoint, D>
where
    D: DimName,
    DefaultAllocator: Allocator<D>,
{
    pub(crate) origin: OPoint<T, D>,
    pub(crate) direction: OVector<T, D>,
    pub(crate) direction_inverse: OVector<T, D>,
}

/// 2D ray alias
pub type Ray2D<T> = Ray<T, Const<2>>;

/// 3D ray alias
pub type Ray3D<T> = Ray<T, Const<3>>;

/// Parametric distances at which a ray enters and leaves a volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlabIntersection<T> {
    pub near: T,
    pub far: T,
}

impl<T: FloatingPoint> SlabIntersection<T> {
    /// Distance along the ray at which the volume is entered.
    /// Zero when the ray starts inside the volume.
    pub fn entry(&self) -> T {
        self.near.max(T::zero())
    }
}

impl<T: FloatingPoint, D> Ray<T, D>
where
    D: DimName,
    DefaultAllocator: Allocator<D>,
{
    pub fn new(origin: OPoint<T, D>, direction: OVector<T, D>) -> Self {
        let direction_inverse = direction.map(|v| T::one() / v);
        Self {
            origin,
            direction,
            direction_inverse,
        }
    }

    pub fn origin(&self) -> &OPoint<T, D> {
        &self.origin
    }

    pub fn direction(&self) -> &OVector<T, D> {
        &self.direction
    }

    /// Component-wise inverse of the direction.
    /// Zero components of the direction become infinities.
    pub fn direction_inverse(&self) -> &OVector<T, D> {
        &self.direction_inverse
    }

    pub fn point_at(&self, t: T) -> OPoint<T, D> {
        &self.origin + &self.direction * t
    }

    /// Branchless slab test between the ray and an axis-aligned volume (Kay-Kajiya, after Tavian Barnes).
    ///
    /// Per axis the entry and exit distances are `min`/`max` of the two plane distances,
    /// and the per-axis intervals are intersected. An axis-aligned ray produces infinite
    /// plane distances. A ray parallel to an axis never evaluates `0 * inf`: it is either
    /// inside the slab for its whole length or outside of it, boundary planes included.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::{Point3, Vector3};
    /// use orthtree::prelude::{BoundingVolume, Ray};
    ///
    /// let volume = BoundingVolume::new(Vector3::new(2., -1., -1.), Vector3::new(4., 1., 1.));
    /// let ray = Ray::new(Point3::origin(), Vector3::x());
    /// let hit = ray.intersects(&volume).unwrap();
    /// assert_eq!(hit.near, 2.);
    /// assert_eq!(hit.far, 4.);
    ///
    /// let away = Ray::new(Point3::origin(), -Vector3::x());
    /// assert!(away.intersects(&volume).is_none());
    /// ```
    pub fn intersects(&self, volume: &BoundingVolume<T, D>) -> Option<SlabIntersection<T>> {
        let (mut near, mut far) = self.slab(volume, 0);
        for axis in 1..D::dim() {
            let (t0, t1) = self.slab(volume, axis);
            near = near.max(t0);
            far = far.min(t1);
        }

        let entry = near.max(T::zero());
        if far >= entry && entry.is_finite() {
            Some(SlabIntersection { near, far })
        } else {
            None
        }
    }

    fn slab(&self, volume: &BoundingVolume<T, D>, axis: usize) -> (T, T) {
        if self.direction[axis] == T::zero() {
            let origin = self.origin[axis];
            let unbounded = T::max_value().unwrap();
            return if volume.lower()[axis] <= origin && origin <= volume.upper()[axis] {
                (-unbounded, unbounded)
            } else {
                (unbounded, -unbounded)
            };
        }

        let t0 = (volume.lower()[axis] - self.origin[axis]) * self.direction_inverse[axis];
        let t1 = (volume.upper()[axis] - self.origin[axis]) * self.direction_inverse[axis];
        (t0.min(t1), t0.max(t1))
    }
}
