use serde::{Deserialize, Serialize};

/// A dense 2D grid stored row-major (`index = y * width + x`).
///
/// The map is flat: edges clamp rather than wrap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
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

    /// Wrap an already materialised row-major buffer.
    ///
    /// Panics if the buffer length does not match the dimensions.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), width * height, "tilemap buffer size mismatch");
        Self { width, height, data }
    }

    /// Build a map by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Signed lookup, `None` outside the map.
    pub fn get_checked(&self, x: i64, y: i64) -> Option<&T> {
        if self.in_bounds(x, y) {
            Some(&self.data[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying row-major buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }
}

impl Tilemap<f32> {
    /// Minimum and maximum value in the map.
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

    #[test]
    fn test_row_major_layout() {
        let map = Tilemap::from_fn(4, 3, |x, y| (y * 10 + x) as u32);
        assert_eq!(map.as_slice()[2 * 4 + 1], 21);
        assert_eq!(*map.get(3, 2), 23);
        assert_eq!(map.index(1, 2), 9);
    }

    #[test]
    fn test_edges_do_not_wrap() {
        let map = Tilemap::new_with(5, 5, 0u8);
        assert!(map.in_bounds(0, 0));
        assert!(!map.in_bounds(0, -1));
        assert!(map.get_checked(-1, 0).is_none());
        assert!(map.get_checked(5, 0).is_none());
        assert!(map.get_checked(4, 4).is_some());
    }
}
