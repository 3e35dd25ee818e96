//! Bounding volumes.

mod aabb;

pub use self::aabb::AABB;
