use nalgebra::Vector3;
use ndarray::Array2;

/// Localised object position in metres, in the common scene frame.
///
/// Supports two input layouts:
/// - XY: planar position, stored with `z = 0`
/// - XYZ: full 3D position
///
/// Distances between a 2D and a 3D position are well defined but a
/// recording is expected to use a single layout throughout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    coords: Vector3<f64>,
    dims: usize,
}

impl Position {
    /// Create a planar position.
    #[inline]
    pub fn from_xy(x: f64, y: f64) -> Self {
        Self {
            coords: Vector3::new(x, y, 0.0),
            dims: 2,
        }
    }

    /// Create a 3D position.
    #[inline]
    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            coords: Vector3::new(x, y, z),
            dims: 3,
        }
    }

    /// Create a position from a coordinate slice of length 2 or 3.
    ///
    /// Returns `None` for any other length or for non-finite components.
    pub fn from_slice(coords: &[f64]) -> Option<Self> {
        if coords.iter().any(|c| !c.is_finite()) {
            return None;
        }
        match *coords {
            [x, y] => Some(Self::from_xy(x, y)),
            [x, y, z] => Some(Self::from_xyz(x, y, z)),
            _ => None,
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.coords.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.coords.y
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.coords.z
    }

    /// Number of coordinates the position was created with (2 or 3).
    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }

    /// Euclidean distance to another position.
    #[inline]
    pub fn distance(&self, other: &Position) -> f64 {
        (self.coords - other.coords).norm()
    }

    /// Coordinates as a vector with the input dimensionality.
    pub fn to_vec(&self) -> Vec<f64> {
        self.coords.iter().take(self.dims).copied().collect()
    }
}

/// Euclidean distance matrix between two sets of positions.
///
/// Returns a matrix of shape (M, N) where M is the length of `rows`
/// and N is the length of `cols`.
pub fn distance_matrix(rows: &[Position], cols: &[Position]) -> Array2<f64> {
    let mut dists = Array2::zeros((rows.len(), cols.len()));
    for (i, a) in rows.iter().enumerate() {
        for (j, b) in cols.iter().enumerate() {
            dists[[i, j]] = a.distance(b);
        }
    }
    dists
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_slice() {
        let p = Position::from_slice(&[1.0, 2.0]).unwrap();
        assert_eq!(p.dims(), 2);
        assert_eq!(p.to_vec(), vec![1.0, 2.0]);

        let p = Position::from_slice(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(p.dims(), 3);
        assert_eq!(p.z(), 3.0);
    }

    #[test]
    fn test_from_slice_rejects_bad_input() {
        assert!(Position::from_slice(&[1.0]).is_none());
        assert!(Position::from_slice(&[1.0, 2.0, 3.0, 4.0]).is_none());
        assert!(Position::from_slice(&[f64::NAN, 2.0]).is_none());
        assert!(Position::from_slice(&[1.0, f64::INFINITY]).is_none());
    }

    #[test]
    fn test_distance() {
        let a = Position::from_xy(0.0, 0.0);
        let b = Position::from_xy(3.0, 4.0);
        assert_relative_eq!(a.distance(&b), 5.0);

        let c = Position::from_xyz(1.0, 2.0, 2.0);
        assert_relative_eq!(Position::from_xyz(0.0, 0.0, 0.0).distance(&c), 3.0);
    }

    #[test]
    fn test_distance_matrix_shape() {
        let rows = [Position::from_xy(0.0, 0.0), Position::from_xy(10.0, 0.0)];
        let cols = [
            Position::from_xy(0.0, 1.0),
            Position::from_xy(10.0, 2.0),
            Position::from_xy(5.0, 0.0),
        ];
        let dists = distance_matrix(&rows, &cols);
        assert_eq!(dists.dim(), (2, 3));
        assert_relative_eq!(dists[[0, 0]], 1.0);
        assert_relative_eq!(dists[[1, 1]], 2.0);
        assert_relative_eq!(dists[[1, 2]], 5.0);
    }

    #[test]
    fn test_distance_matrix_empty() {
        let dists = distance_matrix(&[], &[Position::from_xy(0.0, 0.0)]);
        assert_eq!(dists.dim(), (0, 1));
    }
}
