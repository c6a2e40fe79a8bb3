//! Static particle layout standing in for a simulation.

/// `count` particles on a cubic grid centered at the origin, as stride-4
/// `(x, y, z, 1)` floats. The grid is filled x-first, then y, then z.
pub fn lattice(count: usize, spacing: f32) -> Vec<f32> {
    let side = side_len(count);
    let offset = (side as f32 - 1.0) * 0.5;

    let mut positions = Vec::with_capacity(count * 4);
    for i in 0..count {
        let x = i % side;
        let y = (i / side) % side;
        let z = i / (side * side);
        positions.extend_from_slice(&[
            (x as f32 - offset) * spacing,
            (y as f32 - offset) * spacing,
            (z as f32 - offset) * spacing,
            1.0,
        ]);
    }
    positions
}

/// Half the edge length of the lattice for `count` particles.
pub fn half_extent(count: usize, spacing: f32) -> f32 {
    (side_len(count) as f32 - 1.0) * 0.5 * spacing
}

/// Smallest cube edge (in particles) holding `count` particles.
fn side_len(count: usize) -> usize {
    let mut side = (count as f64).cbrt().round() as usize;
    while side * side * side < count {
        side += 1;
    }
    side.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_covers_count() {
        assert_eq!(side_len(0), 1);
        assert_eq!(side_len(1), 1);
        assert_eq!(side_len(8), 2);
        assert_eq!(side_len(9), 3);
        assert_eq!(side_len(4096), 16);
    }

    #[test]
    fn stride_four_with_unit_w() {
        let positions = lattice(10, 0.5);
        assert_eq!(positions.len(), 40);
        assert!(positions.chunks_exact(4).all(|p| p[3] == 1.0));
    }

    #[test]
    fn full_cube_is_centered() {
        let positions = lattice(27, 1.0);
        let sum = positions
            .chunks_exact(4)
            .fold([0.0f32; 3], |acc, p| [acc[0] + p[0], acc[1] + p[1], acc[2] + p[2]]);
        assert_eq!(sum, [0.0, 0.0, 0.0]);
        assert_eq!(&positions[..4], &[-1.0, -1.0, -1.0, 1.0]);
        assert_eq!(half_extent(27, 1.0), 1.0);
    }

    #[test]
    fn empty_lattice() {
        assert!(lattice(0, 1.0).is_empty());
    }
}
