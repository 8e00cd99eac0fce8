//! Seeded coherent noise primitive shared by every field generator.

use noise::{NoiseFn, Perlin, Seedable};

/// A seeded 2D gradient noise source.
///
/// Instances are immutable after construction, so several of them (elevation,
/// moisture, temperature) can be sampled from worker threads at once.
#[derive(Clone, Copy, Debug)]
pub struct NoiseField {
    noise: Perlin,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        // Perlin takes a 32-bit seed; fold the high half in.
        let folded = (seed ^ (seed >> 32)) as u32;
        Self {
            noise: Perlin::new(1).set_seed(folded),
        }
    }

    /// Raw noise in [-1, 1].
    #[inline]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.noise.get([x, y]).clamp(-1.0, 1.0)
    }

    /// Fractional Brownian Motion - multi-octave noise.
    ///
    /// Each octave doubles the frequency and scales amplitude by `persistence`;
    /// the sum is divided by the total amplitude so the result stays in [-1, 1]
    /// for any octave count.
    pub fn octave_sample(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves.max(1) {
            total += amplitude * self.sample(x * frequency, y * frequency);
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        total / max_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_values() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        for i in 0..50 {
            let x = i as f64 * 0.37;
            let y = i as f64 * 0.11 + 3.0;
            assert_eq!(a.sample(x, y), b.sample(x, y));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        let differs = (0..50).any(|i| {
            let p = i as f64 * 0.731 + 0.5;
            a.sample(p, p * 0.5) != b.sample(p, p * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn test_octave_sample_stays_in_range() {
        let field = NoiseField::new(7);
        for octaves in 1..8 {
            for i in 0..200 {
                let v = field.octave_sample(i as f64 * 0.173, i as f64 * 0.091, octaves, 0.5);
                assert!((-1.0..=1.0).contains(&v), "octaves {} gave {}", octaves, v);
            }
        }
    }

    #[test]
    fn test_continuity() {
        let field = NoiseField::new(99);
        for i in 0..100 {
            let x = i as f64 * 0.29 + 0.13;
            let y = i as f64 * 0.17 + 0.41;
            let d = (field.sample(x, y) - field.sample(x + 1e-4, y + 1e-4)).abs();
            assert!(d < 0.01, "jump of {} at ({}, {})", d, x, y);
        }
    }
}
