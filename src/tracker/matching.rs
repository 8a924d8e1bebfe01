//! Track-to-observation assignment under a localisation tolerance.
//!
//! Rows of a cost matrix are active tracks in ascending track id order,
//! columns are the current frame's observations in frame-local order.
//! Both policies below share the same contract: a one-to-one assignment
//! that never contains a pair whose distance exceeds the tolerance.

use ndarray::Array2;

/// A committed (track row, observation column) pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub row: usize,
    pub col: usize,
    pub distance: f64,
}

/// A pair eligible for matching: finite distance within tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub row: usize,
    pub col: usize,
    pub distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    pub matches: Vec<Match>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_observations: Vec<usize>,
}

impl AssignmentResult {
    fn all_unmatched(num_rows: usize, num_cols: usize) -> Self {
        Self {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_observations: (0..num_cols).collect(),
        }
    }

    fn from_matches(matches: Vec<Match>, num_rows: usize, num_cols: usize) -> Self {
        let mut row_used = vec![false; num_rows];
        let mut col_used = vec![false; num_cols];
        for m in &matches {
            row_used[m.row] = true;
            col_used[m.col] = true;
        }
        Self {
            matches,
            unmatched_tracks: unused(&row_used),
            unmatched_observations: unused(&col_used),
        }
    }
}

fn unused(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &used)| if used { None } else { Some(i) })
        .collect()
}

/// Collect every pair whose distance is finite and `<= thresh`.
///
/// The result is ordered by distance, then row, then column, which is
/// exactly the order the greedy policy commits pairs in.
pub fn candidate_pairs(cost_matrix: &Array2<f64>, thresh: f64) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = cost_matrix
        .indexed_iter()
        .filter(|(_, d)| d.is_finite() && **d <= thresh)
        .map(|((row, col), &distance)| Candidate { row, col, distance })
        .collect();

    candidates.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.row.cmp(&b.row))
            .then(a.col.cmp(&b.col))
    });
    candidates
}

/// Greedy nearest-first assignment.
///
/// Repeatedly commits the closest remaining candidate and removes both of its
/// endpoints. Equal distances go to the lower row (track id), then the lower
/// column (observation index). Matches are returned in commit order.
pub fn greedy_assignment(cost_matrix: &Array2<f64>, thresh: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::all_unmatched(num_rows, num_cols);
    }

    let mut row_used = vec![false; num_rows];
    let mut col_used = vec![false; num_cols];
    let mut matches = Vec::new();

    for c in candidate_pairs(cost_matrix, thresh) {
        if row_used[c.row] || col_used[c.col] {
            continue;
        }
        row_used[c.row] = true;
        col_used[c.col] = true;
        matches.push(Match {
            row: c.row,
            col: c.col,
            distance: c.distance,
        });
    }

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}

/// Minimum-cost bipartite assignment (Jonker-Volgenant).
///
/// Pairs above `thresh` are priced so that any assignment using one costs
/// more than every assignment avoiding it, so the result first maximises the
/// number of valid matches and then minimises their total distance. Matches
/// are returned in ascending row order.
pub fn optimal_assignment(cost_matrix: &Array2<f64>, thresh: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::all_unmatched(num_rows, num_cols);
    }

    let size = num_rows.max(num_cols);
    let forbidden = (size as f64 + 1.0) * thresh.max(1.0) + 1.0;
    let mut padded = Array2::<f64>::from_elem((size, size), forbidden);

    for ((i, j), &d) in cost_matrix.indexed_iter() {
        if d.is_finite() && d <= thresh {
            padded[[i, j]] = d;
        }
    }

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            let matches = row_to_col
                .iter()
                .enumerate()
                .filter(|&(row, &col)| row < num_rows && col < num_cols)
                .filter_map(|(row, &col)| {
                    let distance = cost_matrix[[row, col]];
                    (distance.is_finite() && distance <= thresh).then_some(Match {
                        row,
                        col,
                        distance,
                    })
                })
                .collect();
            AssignmentResult::from_matches(matches, num_rows, num_cols)
        }
        Err(err) => {
            tracing::warn!(?err, "optimal assignment failed, falling back to greedy");
            greedy_assignment(cost_matrix, thresh)
        }
    }
}
