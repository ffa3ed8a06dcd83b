/// Per-tile field over a wrapping grid (one value per tile, row-major).
///
/// Tiles are addressed either by (x, y), with x wrapping, or directly by the
/// tile index shared with [`HexGrid`](crate::grid::HexGrid).
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap an existing row-major vector. Panics if the length is wrong.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), width * height, "tilemap data does not match {}x{}", width, height);
        Self { width, height, data }
    }

    /// Get the index into the data array, handling horizontal wrapping.
    fn index(&self, x: usize, y: usize) -> usize {
        let x = x % self.width; // Wrap horizontally
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Value at a tile index.
    pub fn at(&self, index: usize) -> &T {
        &self.data[index]
    }

    pub fn set_at(&mut self, index: usize, value: T) {
        self.data[index] = value;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Count cells matching a predicate.
    pub fn count<F: Fn(&T) -> bool>(&self, pred: F) -> usize {
        self.data.iter().filter(|v| pred(v)).count()
    }
}

impl Tilemap<bool> {
    /// Indices of all `true` cells, ascending.
    pub fn true_indices(&self) -> Vec<usize> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| if v { Some(i) } else { None })
            .collect()
    }
}

// =============================================================================
// NEIGHBOR SMOOTHING
// =============================================================================

impl Tilemap<f32> {
    /// Unweighted average of a tile's grid neighbors (own value if it has none).
    pub fn neighbor_average(&self, grid: &crate::grid::HexGrid, index: usize) -> f32 {
        let neighbors = grid.neighbors(index);
        if neighbors.is_empty() {
            return self.data[index];
        }
        let sum: f32 = neighbors.iter().map(|&n| self.data[n]).sum();
        sum / neighbors.len() as f32
    }

    /// Run `passes` smoothing passes. Each pass blends every tile toward the
    /// average of its neighbors' values from the previous pass:
    /// `new = lerp(old, neighbor_avg, strength)`.
    ///
    /// Passes are double-buffered, so the result does not depend on visit order.
    pub fn smoothed(&self, grid: &crate::grid::HexGrid, passes: usize, strength: f32) -> Tilemap<f32> {
        let mut current = self.clone();
        let mut next = self.clone();

        for _ in 0..passes {
            for i in 0..current.len() {
                let own = current.data[i];
                let avg = current.neighbor_average(grid, i);
                next.data[i] = own + (avg - own) * strength;
            }
            std::mem::swap(&mut current, &mut next);
        }

        current
    }

    /// (min, max) over all cells.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_v = f32::MAX;
        let mut max_v = f32::MIN;
        for &v in &self.data {
            if v < min_v { min_v = v; }
            if v > max_v { max_v = v; }
        }
        (min_v, max_v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::HexGrid;

    #[test]
    fn test_wrapping_access() {
        let mut map = Tilemap::new_with(4, 3, 0u8);
        map.set(5, 1, 7);
        assert_eq!(*map.get(1, 1), 7);
        assert_eq!(*map.at(5), 7);
    }

    #[test]
    fn test_smoothing_preserves_constant_field() {
        let grid = HexGrid::new(8, 6).unwrap();
        let map = Tilemap::new_with(8, 6, 0.4f32);
        let smoothed = map.smoothed(&grid, 3, 0.5);
        for i in 0..smoothed.len() {
            assert!((smoothed.at(i) - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_smoothing_spreads_spike_symmetrically() {
        let grid = HexGrid::new(9, 9).unwrap();
        let mut map = Tilemap::new_with(9, 9, 0.0f32);
        let center = grid.index(4, 4);
        map.set_at(center, 1.0);

        let smoothed = map.smoothed(&grid, 1, 1.0);
        // Full-strength single pass: every neighbor sees exactly one spiked neighbor out of six
        for &n in grid.neighbors(center) {
            assert!((smoothed.at(n) - 1.0 / 6.0).abs() < 1e-6);
        }
        assert!(smoothed.at(center).abs() < 1e-6);
    }

    #[test]
    fn test_zero_passes_is_identity() {
        let grid = HexGrid::new(5, 5).unwrap();
        let data: Vec<f32> = (0..25).map(|i| i as f32 / 25.0).collect();
        let map = Tilemap::from_vec(5, 5, data);
        assert_eq!(map.smoothed(&grid, 0, 0.7), map);
    }

    #[test]
    fn test_true_indices() {
        let mut map = Tilemap::new_with(3, 2, false);
        map.set(2, 0, true);
        map.set(0, 1, true);
        assert_eq!(map.true_indices(), vec![2, 3]);
    }
}
