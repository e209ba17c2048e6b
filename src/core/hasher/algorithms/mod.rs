//! Hash algorithm implementations.

mod difference;
mod exact;

pub use difference::DifferenceHasher;
pub use exact::ExactHasher;
