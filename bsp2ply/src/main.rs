use crate::errors::{Result, ResultExt};
use bsp::{FormatProfile, Level, LevelReader, LoadedLevel};
use clap::{App, Arg};
use error_chain::bail;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

mod errors {
    use error_chain::error_chain;

    error_chain! {
        links {
            Bsp(bsp::Error, bsp::ErrorKind);
        }
        foreign_links {
            Io(std::io::Error);
        }
    }
}

fn main() {
    env_logger::init();
    if let Err(ref error) = run() {
        eprintln!("error: {}", error);
        for cause in error.iter().skip(1) {
            eprintln!("caused by: {}", cause);
        }
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = App::new("bsp2ply")
        .version("0.1.0")
        .about("Exports a text BSP level to an ASCII PLY mesh.")
        .arg(
            Arg::with_name("INPUT")
                .help("Level file to read")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("FILE")
                .help("Output PLY path (defaults to INPUT with .ply appended)"),
        )
        .arg(
            Arg::with_name("profile")
                .short("p")
                .long("profile")
                .takes_value(true)
                .value_name("FILE")
                .help("TOML format profile controlling parse strictness"),
        )
        .get_matches();

    let input = match matches.value_of("INPUT") {
        Some(path) => PathBuf::from(path),
        None => bail!("no input file given"),
    };
    let profile = match matches.value_of("profile") {
        Some(path) => FormatProfile::from_file(&path)?,
        None => FormatProfile::default(),
    };

    let LoadedLevel { level, diagnostics } = LevelReader::open(&input, profile)?.read()?;
    if !diagnostics.is_empty() {
        warn!(
            "{} irregularities while reading {}",
            diagnostics.len(),
            input.display()
        );
    }

    let output = matches
        .value_of("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut path = input.clone().into_os_string();
            path.push(".ply");
            PathBuf::from(path)
        });

    let file = File::create(&output)
        .chain_err(|| format!("failed to create `{}`", output.display()))?;
    let mut out = BufWriter::new(file);
    write_ply(&level, &mut out)?;
    out.flush()?;

    info!(
        "Wrote {} ({} vertices, {} faces)",
        output.display(),
        level.vertices.len(),
        level.polygons.len()
    );
    Ok(())
}

/// Emits the level mesh as ASCII PLY: positions resolved through the
/// component pools, faces as vertex index lists.
fn write_ply<W: Write>(level: &Level, out: &mut W) -> Result<()> {
    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "comment converted from a BSP level")?;
    writeln!(out, "element vertex {}", level.vertices.len())?;
    writeln!(out, "property float x")?;
    writeln!(out, "property float y")?;
    writeln!(out, "property float z")?;
    writeln!(out, "element face {}", level.polygons.len())?;
    writeln!(out, "property list uchar uint vertex_indices")?;
    writeln!(out, "end_header")?;

    for index in 0..level.vertices.len() {
        let position = match level.vertex(index as i32) {
            Some(position) => position,
            None => bail!(
                "vertex {} does not resolve through the component pools",
                index
            ),
        };
        writeln!(
            out,
            "{:.6} {:.6} {:.6}",
            position.x, position.y, position.z
        )?;
    }

    for polygon in &level.polygons {
        write!(out, "{}", polygon.num_verts())?;
        for vert in &polygon.verts {
            write!(out, " {}", vert)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::write_ply;
    use bsp::{FormatProfile, LevelReader};

    #[test]
    fn test_ply_output() {
        let input = "
            xcomponents 2 0.0 8.0
            ycomponents 1 0.0
            zcomponents 1 4.0
            numverts 2
            0 0 0
            1 0 0
            numpolys 1
            polygon 0 verts 0 1 tname WALL tu 1 0 0 tv 0 1 0 to 0 0 0
        ";
        let loaded = LevelReader::new(input.as_bytes(), FormatProfile::default())
            .read()
            .expect("test: read failed");

        let mut out = Vec::new();
        write_ply(&loaded.level, &mut out).expect("test: ply write failed");
        let text = String::from_utf8(out).expect("test: not utf-8");

        assert!(text.starts_with("ply\nformat ascii 1.0\n"));
        assert!(text.contains("element vertex 2"));
        assert!(text.contains("element face 1"));
        assert!(text.contains("\n0.000000 0.000000 4.000000\n"));
        assert!(text.contains("\n8.000000 0.000000 4.000000\n"));
        assert!(text.ends_with("2 0 1\n"));
    }

    #[test]
    fn test_unresolvable_vertex_is_an_error() {
        let input = "xcomponents 1 0.0 numverts 1 0 0 0";
        let loaded = LevelReader::new(input.as_bytes(), FormatProfile::default())
            .read()
            .expect("test: read failed");
        assert!(write_ply(&loaded.level, &mut Vec::new()).is_err());
    }
}
