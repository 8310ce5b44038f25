use crate::errors::Result;
use crate::meta::FormatProfile;
use crate::name::TextureName;
use crate::reader::LevelReader;
use crate::types::{Camera, Component, Node, Polygon, Vertex};
use indexmap::IndexMap;
use log::info;
use math::Vec3f;
use std::convert::TryFrom;
use std::path::Path;

/// The fully-decoded contents of one level file. Vertices are triples of
/// indices into the three component pools; polygons and nodes refer to each
/// other by index only, so the struct is plain data all the way down.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Level {
    pub camera: Camera,
    pub xcomponents: Vec<Component>,
    pub ycomponents: Vec<Component>,
    pub zcomponents: Vec<Component>,
    pub vertices: Vec<Vertex>,
    pub polygons: Vec<Polygon>,
    pub nodes: Vec<Node>,
}

impl Level {
    /// Reads a level with the given profile, discarding the diagnostics
    /// (they are still logged as they are found). Use `LevelReader` directly
    /// to inspect them.
    pub fn from_file<P: AsRef<Path>>(path: &P, profile: FormatProfile) -> Result<Level> {
        info!("Loading level from {:?}...", path.as_ref());
        Ok(LevelReader::open(path, profile)?.read()?.level)
    }

    /// Resolves a vertex index to a position by following the component
    /// indirection. `None` when either the vertex index or any of its three
    /// pool indices is out of bounds.
    pub fn vertex(&self, id: i32) -> Option<Vec3f> {
        let vertex = self.vertices.get(usize::try_from(id).ok()?)?;
        Some(Vec3f::new(
            *self.xcomponents.get(usize::try_from(vertex.x).ok()?)?,
            *self.ycomponents.get(usize::try_from(vertex.y).ok()?)?,
            *self.zcomponents.get(usize::try_from(vertex.z).ok()?)?,
        ))
    }

    /// All of a polygon's corners as positions, or `None` if any of them
    /// fails to resolve.
    pub fn polygon_vertices(&self, polygon: &Polygon) -> Option<Vec<Vec3f>> {
        polygon.verts.iter().map(|&id| self.vertex(id)).collect()
    }

    pub fn node_front(&self, node: &Node) -> Option<&Node> {
        self.nodes.get(node.front_child()?)
    }

    pub fn node_back(&self, node: &Node) -> Option<&Node> {
        self.nodes.get(node.back_child()?)
    }

    /// Polygon indices grouped by texture name, in first-use order, for
    /// batching uploads or draw calls by texture. Unnamed polygons are left
    /// out.
    pub fn textures(&self) -> IndexMap<TextureName, Vec<usize>> {
        let mut map = IndexMap::new();
        for (index, polygon) in self.polygons.iter().enumerate() {
            if polygon.tname.is_empty() {
                continue;
            }
            map.entry(polygon.tname)
                .or_insert_with(Vec::new)
                .push(index);
        }
        map
    }
}

#[cfg(test)]
mod test {
    use super::Level;
    use crate::types::{Node, Polygon, TextureName};
    use math::{Vec3f, Vec3i};
    use std::str::FromStr;

    fn pooled_level() -> Level {
        Level {
            xcomponents: vec![1.0, 2.0],
            ycomponents: vec![3.0],
            zcomponents: vec![4.0, 5.0],
            vertices: vec![Vec3i::new(1, 0, 1), Vec3i::new(0, 0, 0)],
            ..Level::default()
        }
    }

    #[test]
    fn test_vertex_resolution_through_pools() {
        let level = pooled_level();
        assert_eq!(level.vertex(0), Some(Vec3f::new(2.0, 3.0, 5.0)));
        assert_eq!(level.vertex(1), Some(Vec3f::new(1.0, 3.0, 4.0)));
    }

    #[test]
    fn test_vertex_resolution_bounds() {
        let mut level = pooled_level();
        assert_eq!(level.vertex(-1), None);
        assert_eq!(level.vertex(2), None);

        level.vertices.push(Vec3i::new(0, 1, 0));
        assert_eq!(level.vertex(2), None, "y pool has no slot 1");
    }

    #[test]
    fn test_polygon_vertices() {
        let level = pooled_level();
        let polygon = Polygon {
            verts: vec![0, 1],
            ..Polygon::default()
        };
        assert_eq!(
            level.polygon_vertices(&polygon),
            Some(vec![Vec3f::new(2.0, 3.0, 5.0), Vec3f::new(1.0, 3.0, 4.0)])
        );

        let broken = Polygon {
            verts: vec![0, 9],
            ..Polygon::default()
        };
        assert_eq!(level.polygon_vertices(&broken), None);
    }

    #[test]
    fn test_node_children() {
        let level = Level {
            nodes: vec![
                Node {
                    front: 1,
                    back: -1,
                    ..Node::default()
                },
                Node::default(),
            ],
            ..Level::default()
        };
        assert!(level.node_front(&level.nodes[0]).is_some());
        assert!(level.node_back(&level.nodes[0]).is_none());
    }

    #[test]
    fn test_textures_group_in_first_use_order() {
        let named = |name: &str| Polygon {
            tname: TextureName::from_str(name).unwrap(),
            ..Polygon::default()
        };
        let level = Level {
            polygons: vec![named("B"), named("A"), named(""), named("B")],
            ..Level::default()
        };

        let groups = level.textures();
        let names: Vec<_> = groups.keys().map(|name| name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(groups[&TextureName::from_str("B").unwrap()], vec![0, 3]);
    }
}
