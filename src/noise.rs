//! Coherent gradient noise (Perlin's improved noise) and a fractal octave sum over it.

#[rustfmt::skip]
const PERMUTATION: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225,
    140, 36, 103, 30, 69, 142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148,
    247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219, 203, 117, 35, 11, 32,
    57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122,
    60, 211, 133, 230, 220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54,
    65, 25, 63, 161, 1, 216, 80, 73, 209, 76, 132, 187, 208, 89, 18, 169,
    200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173, 186, 3, 64,
    52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212,
    207, 206, 59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213,
    119, 248, 152, 2, 44, 154, 163, 70, 221, 153, 101, 155, 167, 43, 172, 9,
    129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232, 178, 185, 112, 104,
    218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162, 241,
    81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157,
    184, 84, 204, 176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93,
    222, 114, 67, 29, 24, 72, 243, 141, 128, 195, 78, 66, 215, 61, 156, 180,
];

#[inline]
fn perm(i: usize) -> usize {
    usize::from(PERMUTATION[i & 255])
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    // Low 4 bits pick one of 12 gradient directions.
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Improved Perlin noise at `(x, y, z)`, roughly in `[-1, 1]`.
pub fn perlin(x: f64, y: f64, z: f64) -> f64 {
    let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());
    let xi = (fx as i64 & 255) as usize;
    let yi = (fy as i64 & 255) as usize;
    let zi = (fz as i64 & 255) as usize;
    let (x, y, z) = (x - fx, y - fy, z - fz);
    let (u, v, w) = (fade(x), fade(y), fade(z));

    let a = perm(xi) + yi;
    let aa = perm(a) + zi;
    let ab = perm(a + 1) + zi;
    let b = perm(xi + 1) + yi;
    let ba = perm(b) + zi;
    let bb = perm(b + 1) + zi;

    lerp(
        w,
        lerp(
            v,
            lerp(u, grad(perm(aa), x, y, z), grad(perm(ba), x - 1.0, y, z)),
            lerp(
                u,
                grad(perm(ab), x, y - 1.0, z),
                grad(perm(bb), x - 1.0, y - 1.0, z),
            ),
        ),
        lerp(
            v,
            lerp(
                u,
                grad(perm(aa + 1), x, y, z - 1.0),
                grad(perm(ba + 1), x - 1.0, y, z - 1.0),
            ),
            lerp(
                u,
                grad(perm(ab + 1), x, y - 1.0, z - 1.0),
                grad(perm(bb + 1), x - 1.0, y - 1.0, z - 1.0),
            ),
        ),
    )
}

/// Sums `octaves` layers of [`perlin`], doubling frequency and halving amplitude each time, and
/// normalizes the result into `[0, 1]`. The `z` coordinate of each octave is `depth * frequency`.
pub fn fractal(x: f64, y: f64, depth: f64, octaves: u32) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;
    for _ in 0..octaves.max(1) {
        total += perlin(x * frequency, y * frequency, depth * frequency) * amplitude;
        max_value += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    ((total / max_value) * 0.5 + 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_on_lattice_points() {
        for &(x, y, z) in &[(0.0, 0.0, 0.0), (3.0, 7.0, 1.0), (-2.0, 5.0, 9.0)] {
            let n = perlin(x, y, z);
            if n != 0.0 {
                panic!("perlin({}, {}, {}): got {}, want 0", x, y, z, n);
            }
        }
    }

    #[test]
    fn bounded_and_continuous() {
        let mut prev = perlin(0.0, 0.5, 0.25);
        for i in 1..1000 {
            let x = i as f64 * 0.01;
            let n = perlin(x, 0.5, 0.25);
            assert!((-1.5..=1.5).contains(&n), "perlin({}) = {}", x, n);
            assert!((n - prev).abs() < 0.1, "jump at {}: {} -> {}", x, prev, n);
            prev = n;
        }
    }

    #[test]
    fn fractal_is_normalized() {
        for i in 0..200 {
            let v = fractal(i as f64 * 0.37, i as f64 * 0.11, 4.2, 5);
            assert!((0.0..=1.0).contains(&v), "got {}", v);
        }
        assert_eq!(fractal(0.0, 0.0, 0.0, 3), 0.5);
    }

    #[test]
    fn permutation_is_a_permutation() {
        let mut seen = [false; 256];
        for &p in PERMUTATION.iter() {
            seen[usize::from(p)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
