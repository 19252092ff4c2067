//! Rate conversion and effective-rate selection.

pub mod bundle;
pub mod policy;

pub use bundle::{RateBundle, parse_percentage};
pub use policy::RatePolicy;
