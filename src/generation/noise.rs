use noise::{NoiseFn, Perlin};

/// Shift applied per octave so octaves do not sample the same lattice cell
const OCTAVE_SHIFT: f64 = 17.31;

/// Stateless positional noise.
///
/// Every value is a pure function of `x` and the seed. The sampling offsets
/// are derived by hashing the seed, never from the chunk-selection RNG, so
/// replaying height queries can not perturb chunk selection.
#[derive(Clone)]
pub struct PositionalNoise {
    perlin: Perlin,
    offset: f64,
    lane: f64,
    seed: u32,
}

impl PositionalNoise {
    pub fn new(seed: u32) -> Self {
        // Half-integer lane keeps samples off the Perlin lattice, where it is 0
        let offset = (mix_seed(seed, 0x51ED_270B) % 10_000) as f64 + 0.37;
        let lane = (mix_seed(seed, 0xA3C5_9AC3) % 997) as f64 + 0.5;

        Self {
            perlin: Perlin::new(seed),
            offset,
            lane,
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Smooth noise in [-1, 1]
    pub fn smooth_noise_1d(&self, x: f64) -> f64 {
        self.perlin.get([x + self.offset, self.lane]).clamp(-1.0, 1.0)
    }

    /// Weighted octave sum normalized by the total weight
    pub fn fractal_noise(
        &self,
        x: f64,
        frequency: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut freq = frequency;
        let mut total_weight = 0.0;

        for octave in 0..octaves.max(1) {
            value += self.smooth_noise_1d(x * freq + octave as f64 * OCTAVE_SHIFT) * amplitude;
            total_weight += amplitude;
            amplitude *= persistence;
            freq *= lacunarity;
        }

        if total_weight > 0.0 {
            value / total_weight
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for PositionalNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionalNoise")
            .field("seed", &self.seed)
            .field("offset", &self.offset)
            .field("lane", &self.lane)
            .finish()
    }
}

/// Integer avalanche hash of the seed with a salt
pub fn mix_seed(seed: u32, salt: u32) -> u32 {
    let mut h = seed ^ salt;
    h = (h ^ (h >> 16)).wrapping_mul(0x7FEB_352D);
    h = (h ^ (h >> 15)).wrapping_mul(0x846C_A68B);
    h ^ (h >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_positional() {
        let noise = PositionalNoise::new(42);
        let a = noise.smooth_noise_1d(12.5);
        // Unrelated queries in between must not change the answer
        for i in 0..100 {
            noise.smooth_noise_1d(i as f64 * 3.3);
        }
        let b = noise.smooth_noise_1d(12.5);
        assert_eq!(a.to_bits(), b.to_bits());

        let other = PositionalNoise::new(42);
        assert_eq!(a.to_bits(), other.smooth_noise_1d(12.5).to_bits());
    }

    #[test]
    fn test_noise_range_and_variation() {
        let noise = PositionalNoise::new(7);
        let mut min: f64 = 1.0;
        let mut max: f64 = -1.0;
        for i in 0..2000 {
            let v = noise.smooth_noise_1d(i as f64 * 0.37);
            assert!((-1.0..=1.0).contains(&v));
            min = min.min(v);
            max = max.max(v);
        }
        assert!(max - min > 0.2, "noise is nearly constant: [{}, {}]", min, max);
    }

    #[test]
    fn test_fractal_noise_is_normalized() {
        let noise = PositionalNoise::new(99);
        for i in 0..500 {
            let v = noise.fractal_noise(i as f64, 0.02, 4, 0.5, 2.0);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = PositionalNoise::new(1);
        let b = PositionalNoise::new(2);
        let differs = (0..50).any(|i| {
            let x = i as f64 * 1.7;
            (a.smooth_noise_1d(x) - b.smooth_noise_1d(x)).abs() > 1e-6
        });
        assert!(differs);
    }
}
