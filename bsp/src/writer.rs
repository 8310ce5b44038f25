use crate::errors::{ErrorKind, Result, ResultExt};
use crate::level::Level;
use crate::types::Polygon;
use math::Vec3f;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub fn save_level<P: AsRef<Path>>(level: &Level, path: &P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).chain_err(|| ErrorKind::on_file_create(path))?;
    let mut output = BufWriter::new(file);
    write_level(level, &mut output)?;
    output.flush().chain_err(ErrorKind::on_stream_write)
}

/// Serializes a level so that reading it back with the default profile
/// reproduces it, polygon ownership included: every polygon tagged with an
/// owning node is emitted inside that node's body, the rest are emitted at
/// file scope ahead of the tree.
pub fn write_level<W: Write>(level: &Level, output: &mut W) -> Result<()> {
    emit(level, output).chain_err(ErrorKind::on_stream_write)
}

fn emit<W: Write>(level: &Level, out: &mut W) -> io::Result<()> {
    writeln!(out, "CAMERA")?;
    write!(out, "viewpoint ")?;
    write_vec3(out, &level.camera.viewpoint)?;
    writeln!(out)?;
    write!(out, "viewnormal ")?;
    write_vec3(out, &level.camera.viewnormal)?;
    writeln!(out)?;
    writeln!(out, "viewangle {}", level.camera.viewangle)?;
    writeln!(out, "texturelength {}", level.camera.texturelength)?;

    writeln!(out, "STRUCTURE")?;
    let pools = [
        ("xcomponents", &level.xcomponents),
        ("ycomponents", &level.ycomponents),
        ("zcomponents", &level.zcomponents),
    ];
    for &(keyword, pool) in &pools {
        writeln!(out, "{} {}", keyword, pool.len())?;
        for value in pool {
            writeln!(out, "{:.6}", value)?;
        }
    }

    writeln!(out, "numverts {}", level.vertices.len())?;
    for vertex in &level.vertices {
        writeln!(out, "{} {} {}", vertex.x, vertex.y, vertex.z)?;
    }

    writeln!(out, "numpolys {}", level.polygons.len())?;
    for (index, polygon) in level.polygons.iter().enumerate() {
        if polygon.node.is_none() {
            emit_polygon(out, index, polygon)?;
        }
    }

    writeln!(out, "BSPTREE")?;
    writeln!(out, "numnodes {}", level.nodes.len())?;
    for (index, node) in level.nodes.iter().enumerate() {
        writeln!(
            out,
            "node {} A {:.6} B {:.6} C {:.6} D {:.6} inid {} outid {} front {} back {}",
            index,
            node.plane.normal.x,
            node.plane.normal.y,
            node.plane.normal.z,
            node.plane.dist,
            node.inid,
            node.outid,
            node.front,
            node.back,
        )?;
        for (polygon_index, polygon) in level.polygons.iter().enumerate() {
            if polygon.node == Some(index) {
                emit_polygon(out, polygon_index, polygon)?;
            }
        }
    }
    Ok(())
}

fn emit_polygon<W: Write>(out: &mut W, index: usize, polygon: &Polygon) -> io::Result<()> {
    write!(out, "polygon {} verts", index)?;
    for vert in &polygon.verts {
        write!(out, " {}", vert)?;
    }
    // The name field cannot be empty on the wire; `-` is the conventional
    // untextured placeholder.
    let name = if polygon.tname.is_empty() {
        "-"
    } else {
        polygon.tname.as_str()
    };
    write!(out, " tname {} tu ", name)?;
    write_vec3(out, &polygon.tu)?;
    write!(out, " tv ")?;
    write_vec3(out, &polygon.tv)?;
    write!(out, " to ")?;
    write_vec3(out, &polygon.to)?;
    writeln!(out)
}

fn write_vec3<W: Write>(out: &mut W, vector: &Vec3f) -> io::Result<()> {
    write!(out, "{:.6} {:.6} {:.6}", vector.x, vector.y, vector.z)
}

#[cfg(test)]
mod test {
    use super::write_level;
    use crate::level::Level;
    use crate::meta::FormatProfile;
    use crate::reader::{Diagnostic, LevelReader};
    use crate::types::{Camera, Node, Plane, Polygon, TextureName};
    use math::{Vec3f, Vec3i};
    use std::str::FromStr;

    fn sample_level() -> Level {
        Level {
            camera: Camera {
                viewpoint: Vec3f::new(1.0, 2.0, 3.0),
                viewnormal: Vec3f::new(0.0, 0.0, 1.0),
                viewangle: 90,
                texturelength: 64,
            },
            xcomponents: vec![0.0, 10.0],
            ycomponents: vec![0.0, 10.0],
            zcomponents: vec![0.0],
            vertices: vec![
                Vec3i::new(0, 0, 0),
                Vec3i::new(1, 0, 0),
                Vec3i::new(1, 1, 0),
                Vec3i::new(0, 1, 0),
            ],
            polygons: vec![
                Polygon {
                    verts: vec![0, 1, 2, 3],
                    tname: TextureName::from_str("FLOOR").unwrap(),
                    tu: Vec3f::new(1.0, 0.0, 0.0),
                    tv: Vec3f::new(0.0, 1.0, 0.0),
                    to: Vec3f::new(0.0, 0.0, 0.0),
                    node: Some(1),
                },
                Polygon {
                    verts: vec![3, 2, 1, 0],
                    tname: TextureName::from_str("CEIL").unwrap(),
                    tu: Vec3f::new(0.0, 1.0, 0.0),
                    tv: Vec3f::new(1.0, 0.0, 0.0),
                    to: Vec3f::new(0.0, 10.0, 0.0),
                    node: None,
                },
            ],
            nodes: vec![
                Node {
                    plane: Plane {
                        normal: Vec3f::new(1.0, 0.0, 0.0),
                        dist: 5.0,
                    },
                    inid: 1,
                    outid: 2,
                    front: 1,
                    back: -1,
                },
                Node {
                    plane: Plane {
                        normal: Vec3f::new(0.0, 1.0, 0.0),
                        dist: -2.5,
                    },
                    inid: 3,
                    outid: 4,
                    front: -1,
                    back: -1,
                },
            ],
        }
    }

    #[test]
    fn test_write_then_read_reproduces_level() {
        let level = sample_level();
        let mut text = Vec::new();
        write_level(&level, &mut text).expect("test: write failed");

        let loaded = LevelReader::new(&text[..], FormatProfile::default())
            .read()
            .expect("test: reread failed");

        // Section markers are not keywords; they come back as reports, and
        // nothing else should.
        assert!(loaded
            .diagnostics
            .iter()
            .all(|diagnostic| matches!(diagnostic, Diagnostic::UnknownKeyword { .. })));
        assert_eq!(loaded.diagnostics.len(), 3);

        assert_eq!(loaded.level, level);
    }

    #[test]
    fn test_written_polygons_keep_their_owners() {
        let level = sample_level();
        let mut text = Vec::new();
        write_level(&level, &mut text).expect("test: write failed");
        let text = String::from_utf8(text).expect("test: not utf-8");

        let tree_at = text.find("BSPTREE").expect("test: no tree section");
        let unowned_at = text.find("polygon 1 ").expect("test: no polygon 1");
        let owned_at = text.find("polygon 0 ").expect("test: no polygon 0");
        assert!(unowned_at < tree_at, "unowned polygon precedes the tree");
        assert!(owned_at > tree_at, "owned polygon sits inside the tree");
        assert!(
            text[tree_at..owned_at].contains("node 1 "),
            "owned polygon follows its node record"
        );
    }

    #[test]
    fn test_many_node_level_round_trips() {
        let level = Level {
            nodes: vec![Node::default(); 5000],
            ..Level::default()
        };
        let mut text = Vec::new();
        write_level(&level, &mut text).expect("test: write failed");

        let loaded = LevelReader::new(&text[..], FormatProfile::default())
            .read()
            .expect("test: reread failed");
        assert_eq!(loaded.level, level);
    }

    #[test]
    fn test_six_decimal_floats_survive_within_tolerance() {
        let mut level = sample_level();
        level.camera.viewpoint = Vec3f::new(1.0 / 3.0, -2.0 / 7.0, 1e-5);
        let mut text = Vec::new();
        write_level(&level, &mut text).expect("test: write failed");

        let loaded = LevelReader::new(&text[..], FormatProfile::default())
            .read()
            .expect("test: reread failed");
        let reread = loaded.level.camera.viewpoint;
        for axis in 0..3 {
            assert!((reread[axis] - level.camera.viewpoint[axis]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_empty_name_gets_placeholder() {
        let mut level = sample_level();
        level.polygons[1].tname = TextureName::default();
        let mut text = Vec::new();
        write_level(&level, &mut text).expect("test: write failed");
        let text = String::from_utf8(text).expect("test: not utf-8");
        assert!(text.contains("tname - tu"));
    }
}
