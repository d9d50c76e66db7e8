pub mod configuration;
pub mod error;
mod node;
pub mod orthant_tree;
pub mod raycast_result;
pub mod traversal;

pub use configuration::*;
pub use error::*;
pub use orthant_tree::*;
pub use raycast_result::*;
pub use traversal::*;
