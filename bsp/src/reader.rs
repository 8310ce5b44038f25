use crate::errors::{Error, ErrorKind, Result, ResultExt};
use crate::level::Level;
use crate::meta::FormatProfile;
use crate::name::TextureName;
use crate::tokenizer::{Token, Tokenizer, MAX_TOKEN_LEN};
use crate::types::{Node, Polygon, MAX_POLYGON_VERTS};
use error_chain::{bail, ensure};
use log::{info, warn};
use math::{Vec3f, Vec3i};
use std::convert::TryFrom;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Hard ceiling on any declared array size; a count beyond this is treated
/// as a corrupt file rather than an allocation request.
const MAX_DECLARED_COUNT: usize = 1 << 20;

/// Pre-allocation cap for arrays whose bodies follow immediately, so a
/// hostile count cannot reserve memory it never fills.
const PREALLOC_CAP: usize = 4096;

/// A tolerated irregularity in the input, collected in file order. Each of
/// these is something the original parser accepted silently.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
    UnknownKeyword { token: String },
    TruncatedToken { token: String },
    BadNumber { what: &'static str, token: String },
    MissingVerts { polygon: usize },
    DesyncedPolygon {
        polygon: usize,
        expected: &'static str,
        found: String,
    },
    DirtyTextureName { polygon: usize, token: String },
    VertexOutOfBounds { polygon: usize, index: i32 },
    RedeclaredCount { keyword: &'static str },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Diagnostic::UnknownKeyword { ref token } => {
                write!(formatter, "unrecognized keyword `{}` ignored", token)
            }
            Diagnostic::TruncatedToken { ref token } => write!(
                formatter,
                "token truncated to {} bytes: `{}`",
                MAX_TOKEN_LEN, token
            ),
            Diagnostic::BadNumber { what, ref token } => {
                write!(formatter, "invalid number for {}: `{}`, using 0", what, token)
            }
            Diagnostic::MissingVerts { polygon } => {
                write!(formatter, "no verts in polygon {}", polygon)
            }
            Diagnostic::DesyncedPolygon {
                polygon,
                expected,
                ref found,
            } => write!(
                formatter,
                "polygon {}: expected `{}`, found `{}` (token dropped)",
                polygon, expected, found
            ),
            Diagnostic::DirtyTextureName { polygon, ref token } => write!(
                formatter,
                "polygon {}: texture name `{}` needed fixing up",
                polygon, token
            ),
            Diagnostic::VertexOutOfBounds { polygon, index } => write!(
                formatter,
                "polygon {}: vertex index {} out of bounds",
                polygon, index
            ),
            Diagnostic::RedeclaredCount { keyword } => write!(
                formatter,
                "`{}` declared again, previous contents discarded",
                keyword
            ),
        }
    }
}

/// A fully-read level together with every irregularity met along the way.
#[derive(Debug)]
pub struct LoadedLevel {
    pub level: Level,
    pub diagnostics: Vec<Diagnostic>,
}

/// Keyword-dispatch reader for the text level format. Owns the token
/// stream, the level under construction and the diagnostics list, so no
/// parse state lives outside it.
pub struct LevelReader<R: Read> {
    tokens: Tokenizer<R>,
    profile: FormatProfile,
    level: Level,
    diagnostics: Vec<Diagnostic>,
}

impl LevelReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: &P, profile: FormatProfile) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).chain_err(|| ErrorKind::on_file_open(path))?;
        Ok(LevelReader::new(BufReader::new(file), profile))
    }
}

impl<R: Read> LevelReader<R> {
    pub fn new(input: R, profile: FormatProfile) -> LevelReader<R> {
        LevelReader {
            tokens: Tokenizer::new(input, profile.long_tokens),
            profile,
            level: Level::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Drives the tokenizer across the whole stream. Record boundaries are
    /// inferred purely from keyword recognition; anything unrecognized is
    /// reported and skipped, as the original parser does.
    pub fn read(mut self) -> Result<LoadedLevel> {
        while let Some(token) = self.next_token()? {
            match token.as_str() {
                "viewpoint" => {
                    let value = self.read_vec3("viewpoint")?;
                    self.level.camera.viewpoint = value;
                }
                "viewnormal" => {
                    let value = self.read_vec3("viewnormal")?;
                    self.level.camera.viewnormal = value;
                }
                "viewangle" => {
                    let value = self.read_i32("viewangle")?;
                    self.level.camera.viewangle = value;
                }
                "texturelength" => {
                    let value = self.read_i32("texturelength")?;
                    self.level.camera.texturelength = value;
                }
                "xcomponents" => {
                    if !self.level.xcomponents.is_empty() {
                        self.report(Diagnostic::RedeclaredCount {
                            keyword: "xcomponents",
                        });
                    }
                    let pool = self.read_component_pool("xcomponents")?;
                    self.level.xcomponents = pool;
                }
                "ycomponents" => {
                    if !self.level.ycomponents.is_empty() {
                        self.report(Diagnostic::RedeclaredCount {
                            keyword: "ycomponents",
                        });
                    }
                    let pool = self.read_component_pool("ycomponents")?;
                    self.level.ycomponents = pool;
                }
                "zcomponents" => {
                    if !self.level.zcomponents.is_empty() {
                        self.report(Diagnostic::RedeclaredCount {
                            keyword: "zcomponents",
                        });
                    }
                    let pool = self.read_component_pool("zcomponents")?;
                    self.level.zcomponents = pool;
                }
                "numverts" => {
                    if !self.level.vertices.is_empty() {
                        self.report(Diagnostic::RedeclaredCount { keyword: "numverts" });
                    }
                    let count = self.read_count("numverts")?;
                    let mut vertices = Vec::with_capacity(count.min(PREALLOC_CAP));
                    for _ in 0..count {
                        vertices.push(self.read_vec3i("numverts")?);
                    }
                    self.level.vertices = vertices;
                }
                "numnodes" => {
                    if !self.level.nodes.is_empty() {
                        self.report(Diagnostic::RedeclaredCount { keyword: "numnodes" });
                    }
                    let count = self.read_count("numnodes")?;
                    self.level.nodes = vec![Node::default(); count];
                }
                "numpolys" => {
                    if !self.level.polygons.is_empty() {
                        self.report(Diagnostic::RedeclaredCount { keyword: "numpolys" });
                    }
                    let count = self.read_count("numpolys")?;
                    self.level.polygons = vec![Polygon::default(); count];
                }
                "node" => {
                    let index = self.read_slot_index("node", self.level.nodes.len())?;
                    self.read_nodes(index)?;
                }
                "polygon" if self.profile.top_level_polygons => {
                    let index = self.read_slot_index("polygon", self.level.polygons.len())?;
                    self.read_polygon(index, None)?;
                }
                _ => {
                    self.report(Diagnostic::UnknownKeyword {
                        token: token.into_string(),
                    });
                }
            }
        }

        info!("Loaded level:");
        info!("    {:4} xcomponents", self.level.xcomponents.len());
        info!("    {:4} ycomponents", self.level.ycomponents.len());
        info!("    {:4} zcomponents", self.level.zcomponents.len());
        info!("    {:4} vertices", self.level.vertices.len());
        info!("    {:4} polygons", self.level.polygons.len());
        info!("    {:4} nodes", self.level.nodes.len());

        Ok(LoadedLevel {
            level: self.level,
            diagnostics: self.diagnostics,
        })
    }

    /// Reads node bodies from the first `node` keyword to the end of the
    /// stream. The format has no end-of-record marker, so a node body only
    /// ends when the stream does; a nested `node` keyword opens a deeper
    /// node and every field from then on targets it. Because no node ever
    /// closes before the stream runs out, the descent is a single
    /// ever-deepening pass, driven here by one loop and a `current` slot
    /// rather than by recursion, keeping hostile nesting off the stack.
    ///
    /// `seen` catches `node` keyword cycles: since nodes never close,
    /// reopening any index within one pass would be a cycle.
    fn read_nodes(&mut self, first: usize) -> Result<()> {
        let mut seen = vec![false; self.level.nodes.len()];
        let mut depth = 0;
        let mut current = first;
        self.open_node(first, &mut depth, &mut seen)?;

        while let Some(token) = self.next_token()? {
            match token.as_str() {
                "A" => {
                    let value = self.read_f32("A")?;
                    self.level.nodes[current].plane.normal.x = value;
                }
                "B" => {
                    let value = self.read_f32("B")?;
                    self.level.nodes[current].plane.normal.y = value;
                }
                "C" => {
                    let value = self.read_f32("C")?;
                    self.level.nodes[current].plane.normal.z = value;
                }
                "D" => {
                    let value = self.read_f32("D")?;
                    self.level.nodes[current].plane.dist = value;
                }
                "inid" => {
                    let value = self.read_i32("inid")?;
                    self.level.nodes[current].inid = value;
                }
                "outid" => {
                    let value = self.read_i32("outid")?;
                    self.level.nodes[current].outid = value;
                }
                "front" => {
                    let value = self.read_i32("front")?;
                    self.level.nodes[current].front = value;
                }
                "back" => {
                    let value = self.read_i32("back")?;
                    self.level.nodes[current].back = value;
                }
                "polygon" => {
                    let polygon = self.read_slot_index("polygon", self.level.polygons.len())?;
                    self.read_polygon(polygon, Some(current))?;
                }
                "node" => {
                    let child = self.read_slot_index("node", self.level.nodes.len())?;
                    self.open_node(child, &mut depth, &mut seen)?;
                    current = child;
                }
                _ => {
                    self.report(Diagnostic::UnknownKeyword {
                        token: token.into_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn open_node(&mut self, index: usize, depth: &mut usize, seen: &mut [bool]) -> Result<()> {
        ensure!(!seen[index], ErrorKind::node_cycle(index));
        ensure!(
            *depth < self.profile.max_node_depth,
            ErrorKind::node_too_deep(self.profile.max_node_depth)
        );
        seen[index] = true;
        *depth += 1;
        Ok(())
    }

    /// Reads one polygon body into slot `index`. The vertex list has no
    /// count of its own; it ends at the `tname` keyword, which doubles as
    /// the lookahead for the texture name that follows it.
    fn read_polygon(&mut self, index: usize, owner: Option<usize>) -> Result<()> {
        let first = self.require_token("polygon record")?;

        let mut verts = Vec::new();
        if first.is("verts") {
            loop {
                let token = self.require_token("polygon vertex list")?;
                if token.is("tname") {
                    break;
                }
                ensure!(
                    verts.len() < MAX_POLYGON_VERTS,
                    ErrorKind::too_many_polygon_verts(index, MAX_POLYGON_VERTS)
                );
                let value = self.parse_i32("polygon vertex index", &token)?;
                if value < 0 || value as usize >= self.level.vertices.len() {
                    self.report(Diagnostic::VertexOutOfBounds {
                        polygon: index,
                        index: value,
                    });
                }
                verts.push(value);
            }
        } else {
            // The original prints "no verts in polygon" and carries on to
            // the texture name regardless; the mismatched token is gone.
            self.report(Diagnostic::MissingVerts { polygon: index });
        }

        let name_token = self.require_token("texture name")?;
        let tname = self.read_texture_name(index, &name_token)?;

        let mut polygon = Polygon {
            verts,
            tname,
            node: owner,
            ..Polygon::default()
        };
        polygon.tu = self.gate_vec3(index, "tu")?.unwrap_or_else(Vec3f::zero);
        polygon.tv = self.gate_vec3(index, "tv")?.unwrap_or_else(Vec3f::zero);
        polygon.to = self.gate_vec3(index, "to")?.unwrap_or_else(Vec3f::zero);

        self.level.polygons[index] = polygon;
        Ok(())
    }

    /// One conditionally-present projection vector, gated by its keyword.
    /// A mismatched gate token is consumed and dropped, exactly like the
    /// original; at end of stream the vector simply stays at zero.
    fn gate_vec3(&mut self, polygon: usize, keyword: &'static str) -> Result<Option<Vec3f>> {
        match self.next_token()? {
            None => Ok(None),
            Some(ref token) if token.is(keyword) => Ok(Some(self.read_vec3(keyword)?)),
            Some(token) => {
                self.report(Diagnostic::DesyncedPolygon {
                    polygon,
                    expected: keyword,
                    found: token.into_string(),
                });
                Ok(None)
            }
        }
    }

    fn read_texture_name(&mut self, polygon: usize, token: &Token) -> Result<TextureName> {
        if self.profile.lenient_numbers {
            let (name, clean) = TextureName::from_bytes_lossy(token.as_str().as_bytes());
            if !clean {
                self.report(Diagnostic::DirtyTextureName {
                    polygon,
                    token: token.as_str().to_owned(),
                });
            }
            Ok(name)
        } else {
            TextureName::from_bytes(token.as_str().as_bytes())
        }
    }

    fn read_component_pool(&mut self, keyword: &'static str) -> Result<Vec<f32>> {
        let count = self.read_count(keyword)?;
        let mut pool = Vec::with_capacity(count.min(PREALLOC_CAP));
        for _ in 0..count {
            pool.push(self.read_f32(keyword)?);
        }
        Ok(pool)
    }

    fn read_count(&mut self, keyword: &'static str) -> Result<usize> {
        let value = self.read_i32(keyword)?;
        match usize::try_from(value) {
            Ok(count) if count <= MAX_DECLARED_COUNT => Ok(count),
            _ => bail!(ErrorKind::bad_count(keyword, value)),
        }
    }

    fn read_slot_index(&mut self, kind: &'static str, declared: usize) -> Result<usize> {
        let value = self.read_i32(kind)?;
        match usize::try_from(value) {
            Ok(index) if index < declared => Ok(index),
            _ => bail!(ErrorKind::slot_out_of_bounds(kind, value, declared)),
        }
    }

    fn read_vec3(&mut self, what: &'static str) -> Result<Vec3f> {
        Ok(Vec3f::new(
            self.read_f32(what)?,
            self.read_f32(what)?,
            self.read_f32(what)?,
        ))
    }

    fn read_vec3i(&mut self, what: &'static str) -> Result<Vec3i> {
        Ok(Vec3i::new(
            self.read_i32(what)?,
            self.read_i32(what)?,
            self.read_i32(what)?,
        ))
    }

    fn read_i32(&mut self, what: &'static str) -> Result<i32> {
        let token = self.require_token(what)?;
        self.parse_i32(what, &token)
    }

    fn read_f32(&mut self, what: &'static str) -> Result<f32> {
        let token = self.require_token(what)?;
        match token.as_str().parse::<f32>() {
            Ok(value) => Ok(value),
            Err(error) => self.numeric_fallback(what, &token, error),
        }
    }

    fn parse_i32(&mut self, what: &'static str, token: &Token) -> Result<i32> {
        match token.as_str().parse::<i32>() {
            Ok(value) => Ok(value),
            Err(error) => self.numeric_fallback(what, token, error),
        }
    }

    /// The original's `atoi`/`atof` turn malformed text into zero; lenient
    /// profiles keep that, observably.
    fn numeric_fallback<T: Default, E>(
        &mut self,
        what: &'static str,
        token: &Token,
        error: E,
    ) -> Result<T>
    where
        E: std::error::Error + Send + 'static,
    {
        if self.profile.lenient_numbers {
            self.report(Diagnostic::BadNumber {
                what,
                token: token.as_str().to_owned(),
            });
            Ok(T::default())
        } else {
            Err(Error::with_chain(
                error,
                ErrorKind::bad_number(what, token.as_str()),
            ))
        }
    }

    fn require_token(&mut self, what: &'static str) -> Result<Token> {
        match self.next_token()? {
            Some(token) => Ok(token),
            None => bail!(ErrorKind::unexpected_eof(what)),
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        let token = self.tokens.next_token()?;
        if let Some(ref token) = token {
            if token.is_truncated() {
                self.report(Diagnostic::TruncatedToken {
                    token: token.as_str().to_owned(),
                });
            }
        }
        Ok(token)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}
