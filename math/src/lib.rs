pub mod vector;

pub use self::vector::{Field, Vec3, Vec3f, Vec3i};
