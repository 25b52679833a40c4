//! Seeded gradient noise.
//!
//! Improved Perlin noise over a 512-entry permutation table. The table is a
//! Fisher–Yates shuffle of `0..256` driven by SplitMix64, so every output is a
//! pure function of the seed and the sample point.

const TABLE: usize = 256;

#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    seed: u64,
    perm: [u8; TABLE * 2],
}

#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn grad2(hash: u8, x: f32, y: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 { y } else { x };
    (if h & 1 != 0 { -u } else { u }) + (if h & 2 != 0 { -v } else { v })
}

#[inline]
fn grad3(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 != 0 { -u } else { u }) + (if h & 2 != 0 { -v } else { v })
}

/// Integer lattice cell (wrapped to the table) and the fractional offset.
#[inline]
fn split(v: f32) -> (usize, f32) {
    let f = v.floor();
    (((f as i64) & 255) as usize, v - f)
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        let mut g = Self {
            seed,
            perm: [0; TABLE * 2],
        };
        g.set_seed(seed);
        g
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        let mut p: [u8; TABLE] = std::array::from_fn(|i| i as u8);
        let mut state = seed;
        for i in (1..TABLE).rev() {
            let j = (splitmix64(&mut state) % (i as u64 + 1)) as usize;
            p.swap(i, j);
        }
        for i in 0..TABLE {
            self.perm[i] = p[i];
            self.perm[TABLE + i] = p[i];
        }
    }

    #[inline]
    fn p(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    /// 2D Perlin noise in `[-1, 1]`.
    pub fn perlin_2d(&self, x: f32, y: f32) -> f32 {
        let (xi, x) = split(x);
        let (yi, y) = split(y);
        let u = fade(x);
        let v = fade(y);
        let a = self.p(xi) + yi;
        let b = self.p(xi + 1) + yi;
        let n = lerp(
            v,
            lerp(
                u,
                grad2(self.perm[a], x, y),
                grad2(self.perm[b], x - 1.0, y),
            ),
            lerp(
                u,
                grad2(self.perm[a + 1], x, y - 1.0),
                grad2(self.perm[b + 1], x - 1.0, y - 1.0),
            ),
        );
        n.clamp(-1.0, 1.0)
    }

    /// 3D Perlin noise in `[-1, 1]`.
    pub fn perlin_3d(&self, x: f32, y: f32, z: f32) -> f32 {
        let (xi, x) = split(x);
        let (yi, y) = split(y);
        let (zi, z) = split(z);
        let u = fade(x);
        let v = fade(y);
        let w = fade(z);
        let a = self.p(xi) + yi;
        let aa = self.p(a) + zi;
        let ab = self.p(a + 1) + zi;
        let b = self.p(xi + 1) + yi;
        let ba = self.p(b) + zi;
        let bb = self.p(b + 1) + zi;
        let pm = &self.perm;
        let n = lerp(
            w,
            lerp(
                v,
                lerp(u, grad3(pm[aa], x, y, z), grad3(pm[ba], x - 1.0, y, z)),
                lerp(
                    u,
                    grad3(pm[ab], x, y - 1.0, z),
                    grad3(pm[bb], x - 1.0, y - 1.0, z),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad3(pm[aa + 1], x, y, z - 1.0),
                    grad3(pm[ba + 1], x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad3(pm[ab + 1], x, y - 1.0, z - 1.0),
                    grad3(pm[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        );
        n.clamp(-1.0, 1.0)
    }

    /// Normalized fBm. Zero octaves yield 0.
    pub fn fractal_2d(&self, x: f32, y: f32, octaves: u32, persistence: f32, lacunarity: f32) -> f32 {
        self.fbm(octaves, persistence, lacunarity, |f| {
            self.perlin_2d(x * f, y * f)
        })
    }

    pub fn fractal_3d(
        &self,
        x: f32,
        y: f32,
        z: f32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
    ) -> f32 {
        self.fbm(octaves, persistence, lacunarity, |f| {
            self.perlin_3d(x * f, y * f, z * f)
        })
    }

    fn fbm(&self, octaves: u32, persistence: f32, lacunarity: f32, sample: impl Fn(f32) -> f32) -> f32 {
        let mut total = 0.0f32;
        let mut frequency = 1.0f32;
        let mut amplitude = 1.0f32;
        let mut max = 0.0f32;
        for _ in 0..octaves {
            total += sample(frequency) * amplitude;
            max += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }
        if max <= 0.0 || !total.is_finite() {
            return 0.0;
        }
        (total / max).clamp(-1.0, 1.0)
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}
