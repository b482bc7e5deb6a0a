//! Dense index mapping for bounded multi-dimensional integer keys.
//!
//! Keys are laid out mixed-radix with dimension 0 varying fastest, so a
//! `Shape<3>` over (x, y, direction) keeps all x of one row next to each other.

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Shape<const N: usize> {
    intervals: [(i32, i32); N],
}

impl<const N: usize> Shape<N> {
    /// Builds a shape from closed `(low, high)` intervals, one per dimension.
    pub fn new(intervals: [(i32, i32); N]) -> Self {
        for (dim, &(low, high)) in intervals.iter().enumerate() {
            assert!(low <= high, "empty interval [{low}, {high}] in dimension {dim}");
        }
        Self { intervals }
    }

    pub fn intervals(&self) -> &[(i32, i32); N] {
        &self.intervals
    }

    /// Maps a key to its array index. Panics when a component is out of range.
    #[inline]
    pub fn map(&self, keys: [i32; N]) -> usize {
        let mut index = 0usize;
        let mut stride = 1usize;
        for (dim, (&(low, high), &key)) in self.intervals.iter().zip(keys.iter()).enumerate() {
            assert!(
                low <= key && key <= high,
                "key {key} outside [{low}, {high}] in dimension {dim}"
            );
            index += (key - low) as usize * stride;
            stride *= (high - low + 1) as usize;
        }
        index
    }

    /// Inverse of [`Shape::map`]. Panics when `index >= self.size()`.
    pub fn unmap(&self, index: usize) -> [i32; N] {
        assert!(index < self.size(), "index {index} outside shape of size {}", self.size());
        let mut rest = index;
        let mut keys = [0i32; N];
        for (key, &(low, high)) in keys.iter_mut().zip(self.intervals.iter()) {
            let range = (high - low + 1) as usize;
            *key = low + (rest % range) as i32;
            rest /= range;
        }
        keys
    }

    /// Volume of the box.
    pub fn size(&self) -> usize {
        self.intervals
            .iter()
            .map(|&(low, high)| (high - low + 1) as usize)
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        let shape = Shape::new([(-2, 2), (-3, 3), (0, 3)]);
        assert_eq!(shape.size(), 5 * 7 * 4);
    }

    #[test]
    fn test_first_dimension_fastest() {
        let shape = Shape::new([(-1, 1), (0, 2)]);
        assert_eq!(shape.map([-1, 0]), 0);
        assert_eq!(shape.map([0, 0]), 1);
        assert_eq!(shape.map([1, 0]), 2);
        assert_eq!(shape.map([-1, 1]), 3);
        assert_eq!(shape.map([1, 2]), 8);
    }

    #[test]
    fn test_map_is_dense_bijection() {
        let shape = Shape::new([(-2, 2), (-3, 3), (0, 3)]);
        let mut seen = vec![false; shape.size()];
        for d in 0..=3 {
            for y in -3..=3 {
                for x in -2..=2 {
                    let index = shape.map([x, y, d]);
                    assert!(!seen[index]);
                    seen[index] = true;
                    assert_eq!(shape.unmap(index), [x, y, d]);
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_one_dimension() {
        let shape = Shape::new([(5, 9)]);
        assert_eq!(shape.size(), 5);
        assert_eq!(shape.map([7]), 2);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_map_out_of_range_panics() {
        let shape = Shape::new([(0, 3), (0, 3)]);
        shape.map([4, 0]);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_map_below_range_panics() {
        let shape = Shape::new([(-1, 1)]);
        shape.map([-2]);
    }
}
