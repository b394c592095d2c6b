//! A kernel that records requests instead of building B-rep geometry
//!
//! [`RecordingKernel`] keeps just enough state to answer the questions the
//! builders ask: whether joined edges chain end to end, whether the wire
//! closes, and whether a face's boundary is coplanar. Every request is
//! logged as a serialisable [`Request`].

use super::external::ExchangeFormat;
use super::kernel::{GeometryKernel, KernelError};
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Distance under which two points are the same vertex
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Edge handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EdgeId(pub usize);

/// Wire handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WireId(pub usize);

/// Face handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FaceId(pub usize);

/// Solid handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SolidId(pub usize);

/// Handle of a shape read from an exchange file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShapeId(pub usize);

/// One recorded kernel request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Straight edge
    Edge {
        /// Start point
        start: [f64; 3],
        /// End point
        end: [f64; 3],
    },
    /// Arc edge through three points
    Arc {
        /// Start point
        start: [f64; 3],
        /// Intermediate point
        intermediate: [f64; 3],
        /// End point
        end: [f64; 3],
    },
    /// Circle wire
    Circle {
        /// Center
        center: [f64; 3],
        /// Plane normal
        normal: [f64; 3],
        /// Radius
        radius: f64,
    },
    /// Circle wire through three points
    CircleThrough {
        /// The three points
        points: [[f64; 3]; 3],
    },
    /// B-spline edge
    Bspline {
        /// Number of poles
        poles: usize,
        /// Unique knots
        knots: Vec<f64>,
        /// Knot multiplicities
        multiplicities: Vec<u32>,
        /// Degree
        degree: u32,
        /// Periodic flag
        periodic: bool,
    },
    /// Wire from edges
    Wire {
        /// Joined edges in order
        edges: Vec<EdgeId>,
    },
    /// Face from a wire
    Face {
        /// Boundary wire
        wire: WireId,
    },
    /// Boolean cut
    Cut {
        /// Face cut from
        face: FaceId,
        /// Face cut out
        tool: FaceId,
    },
    /// Prism extrusion
    Extrude {
        /// Base face
        face: FaceId,
        /// Extrusion vector
        vector: [f64; 3],
    },
    /// Exchange file read
    ReadExternal {
        /// File path
        path: PathBuf,
        /// Exchange format
        format: ExchangeFormat,
    },
}

#[derive(Debug, Clone)]
struct RecordedEdge {
    start: Point3<f64>,
    end: Point3<f64>,
    points: Vec<Point3<f64>>,
}

#[derive(Debug, Clone)]
struct RecordedWire {
    points: Vec<Point3<f64>>,
    edges: usize,
    closed: bool,
}

#[derive(Debug, Clone)]
struct RecordedFace {
    points: Vec<Point3<f64>>,
    planar: bool,
    holes: usize,
}

#[derive(Debug, Clone)]
struct RecordedSolid {
    face: FaceId,
    vector: Vector3<f64>,
}

/// Geometry kernel that validates and logs requests
#[derive(Debug, Clone)]
pub struct RecordingKernel {
    tolerance: f64,
    requests: Vec<Request>,
    edges: Vec<RecordedEdge>,
    wires: Vec<RecordedWire>,
    faces: Vec<RecordedFace>,
    solids: Vec<RecordedSolid>,
    shapes: Vec<PathBuf>,
}

impl Default for RecordingKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingKernel {
    /// Kernel with [`DEFAULT_TOLERANCE`]
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_TOLERANCE)
    }

    /// Kernel treating points closer than `tolerance` as coincident
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            requests: Vec::new(),
            edges: Vec::new(),
            wires: Vec::new(),
            faces: Vec::new(),
            solids: Vec::new(),
            shapes: Vec::new(),
        }
    }

    /// Requests in the order they were made
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Request log as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.requests)
    }

    /// Number of edges joined into a wire
    pub fn wire_edge_count(&self, wire: WireId) -> Option<usize> {
        self.wires.get(wire.0).map(|w| w.edges)
    }

    /// Number of holes cut into a face
    pub fn face_hole_count(&self, face: FaceId) -> Option<usize> {
        self.faces.get(face.0).map(|f| f.holes)
    }

    /// Points recorded on the boundary of a face, edge by edge
    pub fn face_points(&self, face: FaceId) -> Option<&[Point3<f64>]> {
        self.faces.get(face.0).map(|f| f.points.as_slice())
    }

    /// Extrusion vector of a solid
    pub fn solid_vector(&self, solid: SolidId) -> Option<Vector3<f64>> {
        self.solids.get(solid.0).map(|s| s.vector)
    }

    /// Base face of a solid
    pub fn solid_face(&self, solid: SolidId) -> Option<FaceId> {
        self.solids.get(solid.0).map(|s| s.face)
    }

    /// File a shape was read from
    pub fn shape_path(&self, shape: ShapeId) -> Option<&Path> {
        self.shapes.get(shape.0).map(PathBuf::as_path)
    }

    fn coincident(&self, a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() <= self.tolerance
    }

    fn push_edge(&mut self, edge: RecordedEdge) -> EdgeId {
        self.edges.push(edge);
        EdgeId(self.edges.len() - 1)
    }

    fn push_wire(&mut self, wire: RecordedWire) -> WireId {
        self.wires.push(wire);
        WireId(self.wires.len() - 1)
    }

    fn edge(&self, id: EdgeId) -> Result<&RecordedEdge, KernelError> {
        self.edges.get(id.0).ok_or(KernelError::UnknownHandle {
            kind: "edge",
            id: id.0,
        })
    }

    fn wire(&self, id: WireId) -> Result<&RecordedWire, KernelError> {
        self.wires.get(id.0).ok_or(KernelError::UnknownHandle {
            kind: "wire",
            id: id.0,
        })
    }

    fn face(&self, id: FaceId) -> Result<&RecordedFace, KernelError> {
        self.faces.get(id.0).ok_or(KernelError::UnknownHandle {
            kind: "face",
            id: id.0,
        })
    }

    /// Coplanarity of a point set within tolerance
    fn coplanar(&self, points: &[Point3<f64>]) -> bool {
        let Some(first) = points.first() else {
            return true;
        };
        // Normal from the first non-degenerate triple
        let mut normal = None;
        'search: for (i, a) in points.iter().enumerate().skip(1) {
            for b in points.iter().skip(i + 1) {
                let n = (a - first).cross(&(b - first));
                if n.norm() > self.tolerance {
                    normal = Some(n.normalize());
                    break 'search;
                }
            }
        }
        match normal {
            Some(n) => points
                .iter()
                .all(|p| (p - first).dot(&n).abs() <= self.tolerance),
            None => true,
        }
    }
}

fn coords(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn components(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

impl GeometryKernel for RecordingKernel {
    type Edge = EdgeId;
    type Wire = WireId;
    type Face = FaceId;
    type Solid = SolidId;
    type Shape = ShapeId;

    fn make_edge(&mut self, p1: &Point3<f64>, p2: &Point3<f64>) -> Result<EdgeId, KernelError> {
        self.requests.push(Request::Edge {
            start: coords(p1),
            end: coords(p2),
        });
        if self.coincident(p1, p2) {
            return Err(KernelError::not_done("make_edge", "degenerate edge"));
        }
        Ok(self.push_edge(RecordedEdge {
            start: *p1,
            end: *p2,
            points: vec![*p1, *p2],
        }))
    }

    fn make_arc(
        &mut self,
        start: &Point3<f64>,
        intermediate: &Point3<f64>,
        end: &Point3<f64>,
    ) -> Result<EdgeId, KernelError> {
        self.requests.push(Request::Arc {
            start: coords(start),
            intermediate: coords(intermediate),
            end: coords(end),
        });
        let normal = (intermediate - start).cross(&(end - start));
        if normal.norm() <= self.tolerance {
            return Err(KernelError::not_done("make_arc", "collinear points"));
        }
        Ok(self.push_edge(RecordedEdge {
            start: *start,
            end: *end,
            points: vec![*start, *intermediate, *end],
        }))
    }

    fn make_circle(
        &mut self,
        center: &Point3<f64>,
        normal: &Vector3<f64>,
        radius: f64,
    ) -> Result<WireId, KernelError> {
        self.requests.push(Request::Circle {
            center: coords(center),
            normal: components(normal),
            radius,
        });
        if radius <= self.tolerance {
            return Err(KernelError::not_done("make_circle", "non-positive radius"));
        }
        let n = normal
            .try_normalize(self.tolerance)
            .ok_or_else(|| KernelError::not_done("make_circle", "zero normal"))?;
        // Two in-plane directions spanning the circle
        let helper = if n.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = n.cross(&helper).normalize() * radius;
        let v = n.cross(&u);
        let points = vec![center + u, center + v, center - u, center - v];
        Ok(self.push_wire(RecordedWire {
            points,
            edges: 1,
            closed: true,
        }))
    }

    fn make_circle_through(
        &mut self,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        p3: &Point3<f64>,
    ) -> Result<WireId, KernelError> {
        self.requests.push(Request::CircleThrough {
            points: [coords(p1), coords(p2), coords(p3)],
        });
        if (p2 - p1).cross(&(p3 - p1)).norm() <= self.tolerance {
            return Err(KernelError::not_done(
                "make_circle_through",
                "collinear points",
            ));
        }
        Ok(self.push_wire(RecordedWire {
            points: vec![*p1, *p2, *p3],
            edges: 1,
            closed: true,
        }))
    }

    fn make_bspline(
        &mut self,
        poles: &[Point3<f64>],
        knots: &[f64],
        multiplicities: &[u32],
        degree: u32,
        periodic: bool,
    ) -> Result<EdgeId, KernelError> {
        self.requests.push(Request::Bspline {
            poles: poles.len(),
            knots: knots.to_vec(),
            multiplicities: multiplicities.to_vec(),
            degree,
            periodic,
        });
        if knots.len() != multiplicities.len() {
            return Err(KernelError::not_done(
                "make_bspline",
                "knot and multiplicity counts differ",
            ));
        }
        let (Some(first), Some(last)) = (poles.first(), poles.last()) else {
            return Err(KernelError::not_done("make_bspline", "no poles"));
        };
        // periodic curves wrap their poles, so only open curves are counted
        let total: u32 = multiplicities.iter().sum();
        let expected = poles.len() + degree as usize + 1;
        if !periodic && total as usize != expected {
            return Err(KernelError::not_done(
                "make_bspline",
                format!(
                    "{} poles of degree {} need {} knots, got {}",
                    poles.len(),
                    degree,
                    expected,
                    total
                ),
            ));
        }
        Ok(self.push_edge(RecordedEdge {
            start: *first,
            end: *last,
            points: poles.to_vec(),
        }))
    }

    fn make_wire(&mut self, edges: &[EdgeId]) -> Result<WireId, KernelError> {
        self.requests.push(Request::Wire {
            edges: edges.to_vec(),
        });
        let recorded = edges
            .iter()
            .map(|&e| self.edge(e).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let Some(first) = recorded.first() else {
            return Err(KernelError::not_done("make_wire", "no edges"));
        };

        let (mut chain_start, mut chain_end) = (first.start, first.end);
        let mut points = first.points.clone();
        for (n, edge) in recorded.iter().enumerate().skip(1) {
            if self.coincident(&edge.start, &chain_end) {
                chain_end = edge.end;
            } else if self.coincident(&edge.end, &chain_end) {
                chain_end = edge.start;
            } else if n == 1 && self.coincident(&edge.start, &chain_start) {
                // first edge was given reversed
                chain_start = chain_end;
                chain_end = edge.end;
            } else if n == 1 && self.coincident(&edge.end, &chain_start) {
                chain_start = chain_end;
                chain_end = edge.start;
            } else {
                return Err(KernelError::not_done(
                    "make_wire",
                    format!("edge {} is not connected to edge {}", n + 1, n),
                ));
            }
            points.extend_from_slice(&edge.points);
        }

        let closed = self.coincident(&chain_start, &chain_end);
        Ok(self.push_wire(RecordedWire {
            points,
            edges: recorded.len(),
            closed,
        }))
    }

    fn wire_is_closed(&self, wire: &WireId) -> bool {
        self.wires.get(wire.0).is_some_and(|w| w.closed)
    }

    fn make_face(&mut self, wire: &WireId) -> Result<FaceId, KernelError> {
        self.requests.push(Request::Face { wire: *wire });
        let recorded = self.wire(*wire)?;
        if !recorded.closed {
            return Err(KernelError::not_done("make_face", "wire is not closed"));
        }
        let face = RecordedFace {
            planar: self.coplanar(&recorded.points),
            points: recorded.points.clone(),
            holes: 0,
        };
        self.faces.push(face);
        Ok(FaceId(self.faces.len() - 1))
    }

    fn cut(&mut self, face: &FaceId, tool: &FaceId) -> Result<FaceId, KernelError> {
        self.requests.push(Request::Cut {
            face: *face,
            tool: *tool,
        });
        self.face(*tool)?;
        let mut result = self.face(*face)?.clone();
        result.holes += 1;
        self.faces.push(result);
        Ok(FaceId(self.faces.len() - 1))
    }

    fn is_planar(&self, face: &FaceId) -> bool {
        self.faces.get(face.0).is_some_and(|f| f.planar)
    }

    fn extrude(&mut self, face: &FaceId, vector: &Vector3<f64>) -> Result<SolidId, KernelError> {
        self.requests.push(Request::Extrude {
            face: *face,
            vector: components(vector),
        });
        if !self.face(*face)?.planar {
            return Err(KernelError::not_done("extrude", "base face is not planar"));
        }
        if vector.norm() <= self.tolerance {
            return Err(KernelError::not_done("extrude", "zero extrusion vector"));
        }
        self.solids.push(RecordedSolid {
            face: *face,
            vector: *vector,
        });
        Ok(SolidId(self.solids.len() - 1))
    }

    fn read_external(
        &mut self,
        path: &Path,
        format: ExchangeFormat,
    ) -> Result<ShapeId, KernelError> {
        self.requests.push(Request::ReadExternal {
            path: path.to_path_buf(),
            format,
        });
        if !path.is_file() {
            return Err(KernelError::not_done(
                "read_external",
                format!("{} is not a file", path.display()),
            ));
        }
        self.shapes.push(path.to_path_buf());
        Ok(ShapeId(self.shapes.len() - 1))
    }
}
