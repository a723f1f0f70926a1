//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for polygon meshes, extended with the pieces an interactive editor keeps
//! next to the connectivity: per-vertex selection and visibility flags, and
//! loose "wire" edges that border no face at all.
//!
//! # Structure
//!
//! - Each face edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin**, **next**, **prev**, **origin vertex** and
//!   **incident face**
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//! - Wire edges are stored separately as vertex pairs
//!
//! # Boundary Handling
//!
//! Boundary half-edges have an invalid face ID. An edge whose two half-edges
//! carry one face between them is a boundary edge; a wire edge carries none.
//! Both count as *contour* edges.

use nalgebra::Point3;

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex, in the mesh's local space.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a boundary half-edge.
    /// Invalid for vertices that belong to no face.
    pub halfedge: HalfEdgeId<I>,

    /// Whether the vertex is part of the current selection.
    pub selected: bool,

    /// Whether the vertex is hidden from editing.
    pub hidden: bool,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new unselected, visible vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
            selected: false,
            hidden: false,
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge (pointing in the reverse direction).
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face (clockwise).
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to.
    /// Invalid for boundary half-edges.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }
}

/// A full (undirected) edge together with the number of faces it borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<I: MeshIndex = u32> {
    /// The two end vertices.
    pub vertices: [VertexId<I>; 2],

    /// Number of faces adjacent to the edge: 0 for wire edges, 1 on the
    /// boundary, 2 in the interior.
    pub face_count: usize,
}

impl<I: MeshIndex> Edge<I> {
    /// Whether the edge borders at most one face.
    #[inline]
    pub fn is_contour(&self) -> bool {
        self.face_count <= 1
    }
}

/// A half-edge mesh with selection state and wire edges.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex<I>>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face<I>>,

    /// Edges that border no face.
    pub(crate) wire_edges: Vec<[VertexId<I>; 2]>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            wire_edges: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Closed triangle mesh: HE = 3F. Leave some room for boundary half-edges.
        let num_halfedges = num_faces * 3 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            wire_edges: Vec::new(),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of wire edges.
    #[inline]
    pub fn num_wire_edges(&self) -> usize {
        self.wire_edges.len()
    }

    /// Get the number of full edges, wire edges included.
    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2 + self.wire_edges.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a vertex by ID, or `None` if the ID is out of range.
    #[inline]
    pub fn get_vertex(&self, id: VertexId<I>) -> Option<&Vertex<I>> {
        self.vertices.get(id.index())
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    /// The wire edges, as vertex pairs.
    pub fn wire_edges(&self) -> &[[VertexId<I>; 2]] {
        &self.wire_edges
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(|i| VertexId::new(i))
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId<I>, &Vertex<I>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(|i| HalfEdgeId::new(i))
    }

    /// Iterate over all half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId<I>, &HalfEdge<I>)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(|i| FaceId::new(i))
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Iterate over every full edge once, with its adjacent face count.
    ///
    /// Face edges come first (one per half-edge pair, in half-edge order),
    /// followed by the wire edges.
    pub fn edges(&self) -> impl Iterator<Item = Edge<I>> + '_ {
        let face_edges = self
            .halfedges()
            .filter(|(id, he)| id.index() < he.twin.index())
            .map(move |(id, he)| {
                let twin = self.halfedge(he.twin);
                let face_count = usize::from(!he.is_boundary()) + usize::from(!twin.is_boundary());
                Edge {
                    vertices: [he.origin, self.dest(id)],
                    face_count,
                }
            });

        let wire = self.wire_edges.iter().map(|&vertices| Edge {
            vertices,
            face_count: 0,
        });

        face_edges.chain(wire)
    }

    /// Iterate over the edges that border at most one face.
    pub fn contour_edges(&self) -> impl Iterator<Item = Edge<I>> + '_ {
        self.edges().filter(Edge::is_contour)
    }

    // ==================== Selection ====================

    /// Iterate over the selected vertex IDs.
    pub fn selected_vertices(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices()
            .filter(|(_, v)| v.selected)
            .map(|(id, _)| id)
    }

    /// Number of selected vertices.
    pub fn num_selected(&self) -> usize {
        self.vertices.iter().filter(|v| v.selected).count()
    }

    /// Number of hidden vertices.
    pub fn num_hidden(&self) -> usize {
        self.vertices.iter().filter(|v| v.hidden).count()
    }

    /// Set the selection flag of a vertex.
    #[inline]
    pub fn select_vertex(&mut self, v: VertexId<I>, selected: bool) {
        self.vertex_mut(v).selected = selected;
    }

    /// Set the hidden flag of a vertex.
    #[inline]
    pub fn hide_vertex(&mut self, v: VertexId<I>, hidden: bool) {
        self.vertex_mut(v).hidden = hidden;
    }

    /// Clear the selection flag on every vertex.
    pub fn deselect_all(&mut self) {
        for v in &mut self.vertices {
            v.selected = false;
        }
    }

    /// Select every visible vertex touching a contour edge.
    ///
    /// Returns the number of newly selected vertices.
    pub fn select_contour_vertices(&mut self) -> usize {
        let touched: Vec<VertexId<I>> = self
            .contour_edges()
            .flat_map(|e| e.vertices)
            .collect();

        let mut count = 0;
        for v in touched {
            let vertex = self.vertex_mut(v);
            if !vertex.selected && !vertex.hidden {
                vertex.selected = true;
                count += 1;
            }
        }
        count
    }

    // ==================== Geometry ====================

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;

        let mut min = first.position;
        let mut max = first.position;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        for (vid, v) in self.vertices() {
            if v.halfedge.is_valid() && self.halfedge(v.halfedge).origin != vid {
                return false;
            }
        }

        for (heid, he) in self.halfedges() {
            if !he.twin.is_valid() || self.halfedge(he.twin).twin != heid {
                return false;
            }
            if he.next.is_valid() && self.halfedge(he.next).prev != heid {
                return false;
            }
            if he.prev.is_valid() && self.halfedge(he.prev).next != heid {
                return false;
            }
        }

        if self.faces.iter().any(|f| !f.halfedge.is_valid()) {
            return false;
        }

        self.wire_edges
            .iter()
            .all(|[a, b]| a != b && a.index() < self.vertices.len() && b.index() < self.vertices.len())
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_defaults() {
        let v = Vertex::<u32>::new(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
        assert!(!v.halfedge.is_valid());
        assert!(!v.selected);
        assert!(!v.hidden);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_edges(), 0);
        assert_eq!(mesh.edges().count(), 0);
        assert!(mesh.bounding_box().is_none());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_selection_flags() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));

        mesh.select_vertex(a, true);
        mesh.select_vertex(c, true);
        mesh.hide_vertex(b, true);

        assert_eq!(mesh.selected_vertices().collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(mesh.num_selected(), 2);
        assert_eq!(mesh.num_hidden(), 1);

        mesh.deselect_all();
        assert_eq!(mesh.num_selected(), 0);
    }

    #[test]
    fn test_bounding_box() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        mesh.add_vertex(Point3::new(-1.0, 2.0, 0.5));
        mesh.add_vertex(Point3::new(3.0, -4.0, 1.5));

        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point3::new(-1.0, -4.0, 0.5));
        assert_eq!(max, Point3::new(3.0, 2.0, 1.5));
    }
}
