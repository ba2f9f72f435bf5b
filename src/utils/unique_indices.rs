//! Extraction of the distinct vertex indices referenced by a set of triangles.

use hashbrown::HashSet;

/// The strategy used to deduplicate vertex indices during tree construction.
#[derive(Default, Clone, Debug, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum UniqueIndexStrategy {
    /// Marks visited vertices in a boolean array sized to the vertex count.
    ///
    /// Uses `O(V)` memory for a mesh with `V` vertices, and `O(F)` time for `F` faces.
    #[default]
    Marking,
    /// Tracks visited vertices in a hash-set.
    ///
    /// Uses memory proportional to the number of distinct vertices only.
    HashSet,
}

/// Deduplicates the vertex indices of a subset of triangles.
///
/// Implementors must push each distinct index exactly once, in the order of its first occurrence
/// in `face_indices`. This makes all the implementations interchangeable: they produce the same
/// output, and thus the same floating-point sums downstream.
pub trait UniqueIndexExtractor {
    /// Appends to `out` the distinct elements of `face_indices`.
    ///
    /// `out` is cleared first.
    fn extract(&mut self, face_indices: &[u32], out: &mut Vec<u32>);
}

/// Vertex deduplication based on a marking array.
#[derive(Clone, Debug, Default)]
pub struct MarkingIndexExtractor {
    marks: Vec<bool>,
}

impl MarkingIndexExtractor {
    /// Creates an extractor for meshes with up to `num_vertices` vertices.
    pub fn new(num_vertices: usize) -> Self {
        Self {
            marks: vec![false; num_vertices],
        }
    }

    /// Makes this extractor usable for meshes with up to `num_vertices` vertices.
    pub fn reset(&mut self, num_vertices: usize) {
        self.marks.clear();
        self.marks.resize(num_vertices, false);
    }
}

impl UniqueIndexExtractor for MarkingIndexExtractor {
    fn extract(&mut self, face_indices: &[u32], out: &mut Vec<u32>) {
        out.clear();

        for &vid in face_indices {
            let vid_us = vid as usize;
            if vid_us >= self.marks.len() {
                self.marks.resize(vid_us + 1, false);
            }

            if !self.marks[vid_us] {
                self.marks[vid_us] = true;
                out.push(vid);
            }
        }

        // Only clear what we touched so each call stays linear in the number of faces.
        for &vid in out.iter() {
            self.marks[vid as usize] = false;
        }
    }
}

/// Vertex deduplication based on a hash-set.
#[derive(Clone, Debug, Default)]
pub struct HashSetIndexExtractor {
    seen: HashSet<u32>,
}

impl HashSetIndexExtractor {
    /// Creates an empty extractor.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UniqueIndexExtractor for HashSetIndexExtractor {
    fn extract(&mut self, face_indices: &[u32], out: &mut Vec<u32>) {
        out.clear();
        self.seen.clear();

        for &vid in face_indices {
            if self.seen.insert(vid) {
                out.push(vid);
            }
        }
    }
}
