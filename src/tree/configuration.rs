use nalgebra::{allocator::Allocator, convert, DefaultAllocator, DimName, OVector};

use crate::{bounding_volume::BoundingVolume, misc::FloatingPoint};

use super::OrthantTreeError;

/// Smallest minimum orthant size accepted on any axis.
pub const MINIMUM_ORTHANT_SIZE: f64 = 0.0001;

/// Minimum orthant size used on every axis unless configured otherwise.
pub const DEFAULT_MINIMUM_ORTHANT_SIZE: f64 = 2.0;

/// Configuration of an orthant tree.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfiguration<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// The maximum bounding volume of the tree
    volume: BoundingVolume<T, D>,
    /// A node is only split if every resulting orthant is at least this large on every axis
    minimum_size: OVector<T, D>,
    /// Trim empty subtrees every time an item is removed
    trim_on_remove: bool,
}

impl<T: FloatingPoint, D: DimName> TreeConfiguration<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    pub fn new(volume: BoundingVolume<T, D>) -> Self {
        Self {
            volume,
            minimum_size: OVector::<T, D>::from_element(convert(DEFAULT_MINIMUM_ORTHANT_SIZE)),
            trim_on_remove: false,
        }
    }

    pub fn with_minimum_size(mut self, minimum_size: OVector<T, D>) -> Self {
        self.minimum_size = minimum_size;
        self
    }

    /// Use the same minimum orthant size on every axis.
    pub fn with_minimum_size_element(mut self, minimum_size: T) -> Self {
        self.minimum_size = OVector::<T, D>::from_element(minimum_size);
        self
    }

    pub fn with_trim_on_remove(mut self, trim_on_remove: bool) -> Self {
        self.trim_on_remove = trim_on_remove;
        self
    }

    pub fn volume(&self) -> &BoundingVolume<T, D> {
        &self.volume
    }

    pub fn minimum_size(&self) -> &OVector<T, D> {
        &self.minimum_size
    }

    pub fn trim_on_remove(&self) -> bool {
        self.trim_on_remove
    }

    /// Check that the configuration describes a usable tree.
    /// # Failures
    /// - if a minimum orthant size is not finite or below [`MINIMUM_ORTHANT_SIZE`]
    /// - if the domain volume has inverted corners
    pub fn validate(&self) -> anyhow::Result<()> {
        let epsilon: T = convert(MINIMUM_ORTHANT_SIZE);
        for i in 0..D::dim() {
            let size = self.minimum_size[i];
            anyhow::ensure!(
                size.is_finite() && size >= epsilon,
                OrthantTreeError::InvalidConfiguration(format!(
                    "minimum orthant size {:?} on axis {} must be finite and >= {}",
                    size, i, MINIMUM_ORTHANT_SIZE
                ))
            );

            let (lower, upper) = (self.volume.lower()[i], self.volume.upper()[i]);
            anyhow::ensure!(
                lower <= upper,
                OrthantTreeError::InvalidConfiguration(format!(
                    "domain lower corner {:?} exceeds upper corner {:?} on axis {}",
                    lower, upper, i
                ))
            );
        }
        Ok(())
    }

    /// Check if a node covering `volume` may be split into orthants.
    pub(crate) fn is_subdividable(&self, volume: &BoundingVolume<T, D>) -> bool {
        let half = volume.size() / T::from_usize(2).unwrap();
        (0..D::dim()).all(|i| half[i] >= self.minimum_size[i])
    }
}

#[cfg(feature = "serde")]
impl<T, D> serde::Serialize for TreeConfiguration<T, D>
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
        let mut state = serializer.serialize_struct("TreeConfiguration", 3)?;
        state.serialize_field("volume", &self.volume)?;
        state.serialize_field("minimum_size", self.minimum_size.as_slice())?;
        state.serialize_field("trim_on_remove", &self.trim_on_remove)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, T, D> serde::Deserialize<'de> for TreeConfiguration<T, D>
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
        struct Fields<V, T> {
            volume: V,
            minimum_size: Option<Vec<T>>,
            trim_on_remove: Option<bool>,
        }

        let fields = Fields::<BoundingVolume<T, D>, T>::deserialize(deserializer)?;
        let mut configuration =
            Self::new(fields.volume).with_trim_on_remove(fields.trim_on_remove.unwrap_or(false));
        if let Some(minimum_size) = fields.minimum_size {
            if minimum_size.len() != D::dim() {
                return Err(S::Error::invalid_length(
                    minimum_size.len(),
                    &"one minimum size per axis",
                ));
            }
            configuration =
                configuration.with_minimum_size(OVector::<T, D>::from_iterator(minimum_size));
        }
        configuration.validate().map_err(S::Error::custom)?;
        Ok(configuration)
    }
}
