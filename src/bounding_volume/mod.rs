use std::hash::{Hash, Hasher};

use nalgebra::{allocator::Allocator, Const, DefaultAllocator, DimName, OPoint, OVector};
use simba::scalar::SupersetOf;

use crate::{misc::FloatingPoint, tree::OrthantTreeError};

/// A struct representing an axis-aligned bounding volume in D space.
/// `lower[i] <= upper[i]` holds on every axis.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingVolume<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    lower: OVector<T, D>,
    upper: OVector<T, D>,
}

/// 2D bounding volume (bounding area) alias
pub type BoundingVolume2D<T> = BoundingVolume<T, Const<2>>;

/// 3D bounding volume alias
pub type BoundingVolume3D<T> = BoundingVolume<T, Const<3>>;

/// Number of orthants produced by splitting a volume in D space.
pub fn orthant_count<D: DimName>() -> usize {
    1 << D::dim()
}

impl<T: FloatingPoint, D: DimName> BoundingVolume<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    /// Create a new bounding volume from two corners.
    /// The corners are reordered per axis, so the result is always valid.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::Vector3;
    /// use orthtree::prelude::BoundingVolume;
    ///
    /// let v = BoundingVolume::new(Vector3::new(1., 0., 5.), Vector3::new(0., 1., 2.));
    /// assert_eq!(v.lower(), &Vector3::new(0., 0., 2.));
    /// assert_eq!(v.upper(), &Vector3::new(1., 1., 5.));
    /// ```
    pub fn new(lower: OVector<T, D>, upper: OVector<T, D>) -> Self {
        let tlower = OVector::<T, D>::from_fn(|i, _| lower[i].min(upper[i]));
        let tupper = OVector::<T, D>::from_fn(|i, _| lower[i].max(upper[i]));
        Self {
            lower: tlower,
            upper: tupper,
        }
    }

    /// Try to create a new bounding volume from a lower and an upper corner.
    /// # Failures
    /// - if `lower[i] > upper[i]` on any axis
    /// - if any coordinate is NaN
    ///
    /// # Examples
    /// ```
    /// use nalgebra::Vector2;
    /// use orthtree::prelude::BoundingVolume;
    ///
    /// assert!(BoundingVolume::try_new(Vector2::new(0., 0.), Vector2::new(0., 4.)).is_ok());
    /// assert!(BoundingVolume::try_new(Vector2::new(1., 0.), Vector2::new(0., 4.)).is_err());
    /// ```
    pub fn try_new(lower: OVector<T, D>, upper: OVector<T, D>) -> anyhow::Result<Self> {
        for i in 0..D::dim() {
            anyhow::ensure!(
                lower[i] <= upper[i],
                OrthantTreeError::InvalidVolume(format!(
                    "lower corner {:?} exceeds upper corner {:?} on axis {}",
                    lower[i], upper[i], i
                ))
            );
        }
        Ok(Self { lower, upper })
    }

    /// Create the smallest bounding volume enclosing the given points.
    /// # Failures
    /// - if there are no points, or every point has a NaN coordinate on some axis
    ///
    /// # Examples
    /// ```
    /// use nalgebra::Point2;
    /// use orthtree::prelude::BoundingVolume2D;
    ///
    /// let area = BoundingVolume2D::new_with_points([Point2::new(1., 5.), Point2::new(-2., 3.)]).unwrap();
    /// assert_eq!(area.lower().x, -2.);
    /// assert!(BoundingVolume2D::<f64>::new_with_points([]).is_err());
    /// ```
    pub fn new_with_points<I: IntoIterator<Item = OPoint<T, D>>>(
        iter: I,
    ) -> anyhow::Result<Self> {
        let mut lower = OVector::<T, D>::from_element(T::max_value().unwrap());
        let mut upper = -lower.clone();

        for point in iter {
            for i in 0..D::dim() {
                lower[i] = lower[i].min(point[i]);
                upper[i] = upper[i].max(point[i]);
            }
        }

        Self::try_new(lower, upper)
    }

    /// Check that `lower[i] <= upper[i]` holds on every axis.
    pub fn is_valid(&self) -> bool {
        (0..D::dim()).all(|i| self.lower[i] <= self.upper[i])
    }

    pub fn lower(&self) -> &OVector<T, D> {
        &self.lower
    }

    pub fn upper(&self) -> &OVector<T, D> {
        &self.upper
    }

    pub fn center(&self) -> OVector<T, D> {
        (&self.lower + &self.upper) / T::from_usize(2).unwrap()
    }

    pub fn size(&self) -> OVector<T, D> {
        &self.upper - &self.lower
    }

    /// Check if the volume fully contains another volume.
    /// Both volumes are treated as closed boxes, so shared faces count as contained.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::Vector3;
    /// use orthtree::prelude::BoundingVolume;
    ///
    /// let outer = BoundingVolume::new(Vector3::from_element(0.), Vector3::from_element(10.));
    /// let inner = BoundingVolume::new(Vector3::from_element(0.), Vector3::from_element(5.));
    /// assert!(outer.contains(&inner));
    /// assert!(outer.contains(&outer));
    /// assert!(!inner.contains(&outer));
    /// ```
    pub fn contains(&self, other: &Self) -> bool {
        (0..D::dim()).all(|i| self.lower[i] <= other.lower[i] && other.upper[i] <= self.upper[i])
    }

    /// Check if the volume overlaps another volume.
    /// Volumes that only touch along a face, edge or corner overlap.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::Vector3;
    /// use orthtree::prelude::BoundingVolume;
    ///
    /// let b0 = BoundingVolume::new(Vector3::from_element(0.), Vector3::from_element(1.));
    /// let b1 = BoundingVolume::new(Vector3::from_element(0.5), Vector3::from_element(1.5));
    /// assert!(b0.overlaps(&b1));
    ///
    /// let b2 = BoundingVolume::new(Vector3::from_element(1.), Vector3::from_element(2.));
    /// assert!(b0.overlaps(&b2));
    ///
    /// let b3 = BoundingVolume::new(Vector3::from_element(1. + 1e-6), Vector3::from_element(2.));
    /// assert!(!b0.overlaps(&b3));
    /// ```
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..D::dim()).all(|i| self.lower[i] <= other.upper[i] && other.lower[i] <= self.upper[i])
    }

    /// Check if the volume contains a point.
    /// # Examples
    /// ```
    /// use nalgebra::{Point3, Vector3};
    /// use orthtree::prelude::BoundingVolume;
    /// let bv = BoundingVolume::new(Vector3::from_element(0.), Vector3::from_element(1.));
    /// assert!(bv.contains_point(&Point3::new(0.5, 0.5, 0.5)));
    /// assert!(bv.contains_point(&Point3::new(0., 0.5, 1.0)));
    /// assert!(!bv.contains_point(&Point3::new(-1e-8, 0.5, 0.5)));
    /// ```
    pub fn contains_point(&self, point: &OPoint<T, D>) -> bool {
        (0..D::dim()).all(|i| self.lower[i] <= point[i] && point[i] <= self.upper[i])
    }

    /// Get the orthant `index` produced by splitting the volume at its center on every axis.
    /// Bit `i` of `index` selects the upper half along axis `i`.
    pub fn orthant(&self, index: usize) -> Self {
        let center = self.center();
        let lower = OVector::<T, D>::from_fn(|i, _| {
            if index & (1 << i) == 0 {
                self.lower[i]
            } else {
                center[i]
            }
        });
        let upper = OVector::<T, D>::from_fn(|i, _| {
            if index & (1 << i) == 0 {
                center[i]
            } else {
                self.upper[i]
            }
        });
        Self { lower, upper }
    }

    /// Get all 2^D orthants of the volume, ordered by orthant index.
    pub fn orthants(&self) -> Vec<Self> {
        (0..orthant_count::<D>()).map(|i| self.orthant(i)).collect()
    }

    /// Find the single orthant that holds `other`, if any.
    ///
    /// Orthants are inclusive on their lower side only: along an axis split at `mid`,
    /// the lower half takes volumes with `upper < mid` and the upper half takes volumes
    /// with `lower >= mid`. A volume touching the split plane from below straddles.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::Vector2;
    /// use orthtree::prelude::BoundingVolume;
    ///
    /// let area = BoundingVolume::new(Vector2::new(0., 0.), Vector2::new(100., 100.));
    /// let a = BoundingVolume::new(Vector2::new(1., 1.), Vector2::new(2., 2.));
    /// let b = BoundingVolume::new(Vector2::new(60., 1.), Vector2::new(70., 2.));
    /// let c = BoundingVolume::new(Vector2::new(40., 1.), Vector2::new(50., 2.));
    /// let d = BoundingVolume::new(Vector2::new(50., 50.), Vector2::new(60., 60.));
    /// assert_eq!(area.orthant_containing(&a), Some(0));
    /// assert_eq!(area.orthant_containing(&b), Some(1));
    /// assert_eq!(area.orthant_containing(&c), None);
    /// assert_eq!(area.orthant_containing(&d), Some(3));
    /// ```
    pub fn orthant_containing(&self, other: &Self) -> Option<usize> {
        if !other.is_valid() || !self.contains(other) {
            return None;
        }

        let center = self.center();
        let mut index = 0;
        for i in 0..D::dim() {
            if other.upper[i] < center[i] {
                continue;
            }
            if other.lower[i] >= center[i] {
                index |= 1 << i;
            } else {
                return None;
            }
        }
        Some(index)
    }

    /// Cast the bounding volume to another floating point type
    pub fn cast<F: FloatingPoint + SupersetOf<T>>(&self) -> BoundingVolume<F, D>
    where
        DefaultAllocator: Allocator<D>,
    {
        BoundingVolume {
            lower: self.lower.clone().cast(),
            upper: self.upper.clone().cast(),
        }
    }
}

impl<T: FloatingPoint, D: DimName> Eq for BoundingVolume<T, D> where DefaultAllocator: Allocator<D> {}

impl<T: FloatingPoint, D: DimName> Hash for BoundingVolume<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower
            .iter()
            .chain(self.upper.iter())
            .for_each(|v| v.hash_bits().hash(state));
    }
}

#[cfg(feature = "serde")]
impl<T, D> serde::Serialize for BoundingVolume<T, D>
where
    T: FloatingPoint + serde::Serialize,
    D: DimName,
    DefaultAllocator: Allocator<D>,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("BoundingVolume", 2)?;
        state.serialize_field("lower", self.lower.as_slice())?;
        state.serialize_field("upper", self.upper.as_slice())?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, T, D> serde::Deserialize<'de> for BoundingVolume<T, D>
where
    T: FloatingPoint + serde::Deserialize<'de>,
    D: DimName,
    DefaultAllocator: Allocator<D>,
{
    fn deserialize<S>(deserializer: S) -> Result<Self, S::Error>
    where
        S: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        #[derive(serde::Deserialize)]
        struct Corners<T> {
            lower: Vec<T>,
            upper: Vec<T>,
        }

        let corners = Corners::<T>::deserialize(deserializer)?;
        for corner in [&corners.lower, &corners.upper] {
            if corner.len() != D::dim() {
                return Err(S::Error::invalid_length(
                    corner.len(),
                    &"one coordinate per axis",
                ));
            }
        }

        Self::try_new(
            OVector::<T, D>::from_iterator(corners.lower),
            OVector::<T, D>::from_iterator(corners.upper),
        )
        .map_err(S::Error::custom)
    }
}
