//! Geometric checks over axis-aligned bounding boxes.

pub mod collision;
pub mod tag_bbox;

pub use collision::{CollisionParams, CollisionResult, find_collisions};
pub use tag_bbox::{TagGeometryCache, reconstruct_real_box};
