#![allow(clippy::needless_range_loop)]

mod bounding_volume;
mod misc;
mod tree;

pub mod prelude {
    pub use crate::bounding_volume::*;
    pub use crate::misc::*;
    pub use crate::tree::*;
}
