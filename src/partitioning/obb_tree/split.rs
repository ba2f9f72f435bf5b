use crate::math::{Matrix, Point, Real, Vector};
use crate::shape::Triangle;
use crate::utils;
use ordered_float::OrderedFloat;

/// The rule used to pick the splitting point of a set of triangles along an axis.
///
/// Each triangle is represented by the projection of its centroid on the splitting axis.
/// Triangles with a projection strictly greater than the splitting point go to the second child,
/// the others go to the first child.
#[derive(Default, Clone, Debug, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SplitHeuristic {
    /// Split at the median of the projections.
    #[default]
    Median,
    /// Split at the arithmetic mean of the projections.
    Mean,
    /// Split such that the total triangle area is approximately the same on both sides.
    ///
    /// The splitting point is always snapped between two distinct projections so that neither
    /// side ends up empty, unless all the projections are equal.
    Balanced,
}

/// Temporary buffers used to split a set of triangles.
#[derive(Clone, Debug, Default)]
pub(super) struct SplitWorkspace {
    projections: Vec<Real>,
    weights: Vec<Real>,
    scratch: Vec<Real>,
    sorted: Vec<(Real, Real)>,
}

impl SplitWorkspace {
    fn compute_projections(
        &mut self,
        heuristic: SplitHeuristic,
        axis: &Vector<Real>,
        vertices: &[Point<Real>],
        face_pool: &[u32],
    ) {
        self.projections.clear();
        self.weights.clear();

        for idx in face_pool.chunks_exact(3) {
            let tri = Triangle::new(
                vertices[idx[0] as usize],
                vertices[idx[1] as usize],
                vertices[idx[2] as usize],
            );
            self.projections.push(tri.center().coords.dot(axis));

            if heuristic == SplitHeuristic::Balanced {
                self.weights.push(tri.area());
            }
        }
    }

    fn split_point(&mut self, heuristic: SplitHeuristic) -> Option<Real> {
        let split = match heuristic {
            SplitHeuristic::Median => {
                self.scratch.clear();
                self.scratch.extend_from_slice(&self.projections);
                utils::median(&mut self.scratch)
            }
            SplitHeuristic::Mean => mean(&self.projections),
            SplitHeuristic::Balanced => {
                balanced_split_point(&self.projections, &self.weights, &mut self.sorted)
            }
        }?;

        split.is_finite().then_some(split)
    }
}

fn mean(vals: &[Real]) -> Option<Real> {
    if vals.is_empty() {
        None
    } else {
        Some(vals.iter().sum::<Real>() / vals.len() as Real)
    }
}

/// Finds a splitting point equalizing the weights on both sides.
///
/// Returns `None` if all the projections are equal, in which case no splitting point can
/// produce two non-empty sets.
fn balanced_split_point(
    projections: &[Real],
    weights: &[Real],
    sorted: &mut Vec<(Real, Real)>,
) -> Option<Real> {
    let n = projections.len();
    if n < 2 {
        return None;
    }

    sorted.clear();
    sorted.extend(
        projections
            .iter()
            .zip(weights.iter())
            .map(|(p, w)| (*p, w.max(0.0))),
    );
    sorted.sort_by_key(|e| OrderedFloat(e.0));

    let total: Real = sorted.iter().map(|e| e.1).sum();
    // All the triangles are degenerate: fall back to counting them.
    let uniform = !(total > 0.0);
    let half = if uniform { n as Real / 2.0 } else { total / 2.0 };

    // The first `k` sorted elements go to the first side.
    let mut k = n - 1;
    let mut acc = 0.0;
    for (i, e) in sorted[..n - 1].iter().enumerate() {
        acc += if uniform { 1.0 } else { e.1 };
        if acc >= half {
            k = i + 1;
            break;
        }
    }

    // Snap to the closest boundary between two distinct projections.
    let is_boundary = |j: usize| j >= 1 && j < n && sorted[j - 1].0 < sorted[j].0;
    for offset in 0..n {
        if let Some(j) = k.checked_sub(offset).filter(|j| is_boundary(*j)) {
            return Some(sorted[j - 1].0);
        }
        if is_boundary(k + offset) {
            return Some(sorted[k + offset - 1].0);
        }
    }

    None
}

/// Reorders the given triangles so that the ones with a projection smaller or equal to `split`
/// come first.
///
/// Returns the number of triangles in the first group.
fn partition_faces(
    face_pool: &mut [u32],
    face_ids: &mut [u32],
    projections: &mut [Real],
    split: Real,
) -> usize {
    let mut icurr = 0;
    let mut ilast = face_ids.len();

    // We iterate exactly once per face, so we don't need to test icurr < ilast.
    for _ in 0..face_ids.len() {
        if projections[icurr] > split {
            ilast -= 1;
            swap_faces(face_pool, face_ids, projections, icurr, ilast);
        } else {
            icurr += 1;
        }
    }

    icurr
}

fn swap_faces(
    face_pool: &mut [u32],
    face_ids: &mut [u32],
    projections: &mut [Real],
    a: usize,
    b: usize,
) {
    if a != b {
        for k in 0..3 {
            face_pool.swap(a * 3 + k, b * 3 + k);
        }
        face_ids.swap(a, b);
        projections.swap(a, b);
    }
}

/// Splits a set of triangles into two non-empty groups.
///
/// The axes of `axes` are tried in column order. If none of them can separate the triangles, the
/// set is split in the middle of its current ordering. On success, the triangles are reordered so
/// that the first group comes first, and the size of the first group is returned. Returns `None`
/// only if there are less than two triangles.
pub(super) fn split_faces(
    heuristic: SplitHeuristic,
    axes: &Matrix<Real>,
    vertices: &[Point<Real>],
    face_pool: &mut [u32],
    face_ids: &mut [u32],
    workspace: &mut SplitWorkspace,
) -> Option<usize> {
    let num_faces = face_ids.len();
    if num_faces < 2 {
        return None;
    }

    for i in 0..3 {
        let axis = axes.column(i).into_owned();
        workspace.compute_projections(heuristic, &axis, vertices, face_pool);

        let Some(split) = workspace.split_point(heuristic) else {
            continue;
        };

        let num_first = partition_faces(face_pool, face_ids, &mut workspace.projections, split);
        if num_first > 0 && num_first < num_faces {
            return Some(num_first);
        }
    }

    log::debug!(
        "No split axis could separate {} triangles, splitting them by position.",
        num_faces
    );
    Some(num_faces / 2)
}
