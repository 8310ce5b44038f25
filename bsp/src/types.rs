pub use crate::name::{TextureName, MAX_TEXTURE_NAME_LEN};
use crate::util::node_child;
use math::{Vec3f, Vec3i};

/// One scalar slot in an x/y/z component pool.
pub type Component = f32;

/// A vertex is a triple of indices, one per component pool.
pub type Vertex = Vec3i;

/// Capacity of a polygon's vertex index list.
pub const MAX_POLYGON_VERTS: usize = 32;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Camera {
    pub viewpoint: Vec3f,
    pub viewnormal: Vec3f,
    pub viewangle: i32,
    pub texturelength: i32,
}

/// Splitting plane `normal . p = dist`, from the `A B C D` node fields.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Plane {
    pub normal: Vec3f,
    pub dist: f32,
}

impl Plane {
    pub fn signed_distance(&self, point: &Vec3f) -> f32 {
        self.normal.dot(point) - self.dist
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub plane: Plane,
    pub inid: i32,
    pub outid: i32,
    pub front: i32,
    pub back: i32,
}

impl Node {
    /// Front child as a node index; `None` for leaf markers.
    pub fn front_child(&self) -> Option<usize> {
        node_child(self.front)
    }

    /// Back child as a node index; `None` for leaf markers.
    pub fn back_child(&self) -> Option<usize> {
        node_child(self.back)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    /// Indices into the level's vertex table, at most `MAX_POLYGON_VERTS`.
    pub verts: Vec<i32>,
    pub tname: TextureName,
    pub tu: Vec3f,
    pub tv: Vec3f,
    pub to: Vec3f,
    /// Index of the node whose body introduced this polygon, if any.
    pub node: Option<usize>,
}

impl Polygon {
    pub fn num_verts(&self) -> usize {
        self.verts.len()
    }

    /// Maps a 3D position through the projection basis to a raw `(u, v)`
    /// texture coordinate pair.
    pub fn texture_coords(&self, point: &Vec3f) -> (f32, f32) {
        let offset = *point - self.to;
        (
            offset.dot(&self.tu.normalized()),
            offset.dot(&self.tv.normalized()),
        )
    }
}
