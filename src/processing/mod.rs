pub mod caption;
pub mod geometry;
pub mod transform;
