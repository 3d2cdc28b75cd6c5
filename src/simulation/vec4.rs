use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Point or direction in R⁴.
///
/// Positions on the hypersphere are unit-length `Vec4`s; velocities live in
/// the tangent plane at their position. The layout matches WGSL `vec4<f32>`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Vec4 = Vec4::new(0.0, 0.0, 0.0, 0.0);
    pub const X: Vec4 = Vec4::new(1.0, 0.0, 0.0, 0.0);
    pub const Y: Vec4 = Vec4::new(0.0, 1.0, 0.0, 0.0);
    pub const Z: Vec4 = Vec4::new(0.0, 0.0, 1.0, 0.0);
    pub const W: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_array(a: [f32; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    #[inline]
    pub fn dot(self, other: Vec4) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction.
    ///
    /// A zero vector is returned unchanged rather than producing NaNs, so
    /// callers that need unit length must check for it.
    pub fn normalized(self) -> Vec4 {
        let len = self.length();
        if len == 0.0 {
            return self;
        }
        self / len
    }

    pub fn normalize(&mut self) -> &mut Self {
        *self = self.normalized();
        self
    }

    /// Component of `self` orthogonal to the unit vector `p`.
    #[inline]
    pub fn project_tangent(self, p: Vec4) -> Vec4 {
        self - p * self.dot(p)
    }

    /// Rotate the pair `(self, b)` by `angle` inside the plane they span.
    ///
    /// Returns `(a cos θ + b sin θ, b cos θ - a sin θ)`. Orthonormal inputs
    /// give orthonormal outputs up to rounding.
    pub fn rotate_pair(self, b: Vec4, angle: f32) -> (Vec4, Vec4) {
        let (s, c) = angle.sin_cos();
        (self * c + b * s, b * c - self * s)
    }
}

/// Great-circle angle between two points of the hypersphere, in `[0, π]`.
///
/// Inputs are normalized first. Uses the half-angle chord form
/// `2·atan2(|a − b|, |a + b|)`, which is exactly 0 for equal inputs and
/// stays accurate near 0 and π where `acos` of the dot product does not.
pub fn geodesic_distance(a: Vec4, b: Vec4) -> f32 {
    let (a, b) = (a.normalized(), b.normalized());
    2.0 * (a - b).length().atan2((a + b).length())
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, o: Vec4) -> Vec4 {
        Vec4::new(self.x + o.x, self.y + o.y, self.z + o.z, self.w + o.w)
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    fn sub(self, o: Vec4) -> Vec4 {
        Vec4::new(self.x - o.x, self.y - o.y, self.z - o.z, self.w - o.w)
    }
}

impl Neg for Vec4 {
    type Output = Vec4;
    fn neg(self) -> Vec4 {
        Vec4::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Mul<f32> for Vec4 {
    type Output = Vec4;
    fn mul(self, s: f32) -> Vec4 {
        Vec4::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

/// Panics on a zero divisor. Only `normalized` gets the silent zero policy.
impl Div<f32> for Vec4 {
    type Output = Vec4;
    fn div(self, s: f32) -> Vec4 {
        assert!(s != 0.0, "Vec4 divide by zero");
        self * (1.0 / s)
    }
}

impl AddAssign for Vec4 {
    fn add_assign(&mut self, o: Vec4) {
        *self = *self + o;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, PI};

    const EPS: f32 = 1e-5;

    #[test]
    fn test_size_matches_wgsl_vec4() {
        assert_eq!(std::mem::size_of::<Vec4>(), 16);
    }

    #[test]
    fn test_dot_and_length() {
        let v = Vec4::new(1.0, 2.0, 2.0, 4.0);
        assert_eq!(v.dot(Vec4::X), 1.0);
        assert_eq!(v.length_squared(), 25.0);
        assert_eq!(v.length(), 5.0);
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = Vec4::new(3.0, -1.0, 0.5, 2.0).normalized();
        assert!((v.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_normalize_zero_is_noop() {
        let v = Vec4::ZERO.normalized();
        assert_eq!(v, Vec4::ZERO, "Zero vector should come back unchanged");
    }

    #[test]
    #[should_panic(expected = "divide by zero")]
    fn test_explicit_division_by_zero_panics() {
        let _ = Vec4::new(1.0, 1.0, 1.0, 1.0) / 0.0;
    }

    #[test]
    fn test_project_tangent_is_orthogonal() {
        let p = Vec4::new(1.0, 1.0, 0.0, 0.0).normalized();
        let v = Vec4::new(0.3, 0.9, -0.2, 0.4);
        let t = v.project_tangent(p);
        assert!(t.dot(p).abs() < EPS);
    }

    #[test]
    fn test_rotate_pair_preserves_orthonormality() {
        let a = Vec4::new(1.0, 2.0, 0.0, -1.0).normalized();
        let b = Vec4::new(0.0, 1.0, 3.0, 2.0).project_tangent(a).normalized();
        for angle in [0.0, 0.1, FRAC_PI_3, 2.0, -4.5, 37.0] {
            let (a2, b2) = a.rotate_pair(b, angle);
            assert!((a2.length() - 1.0).abs() < EPS, "|a'| drifted at {}", angle);
            assert!((b2.length() - 1.0).abs() < EPS, "|b'| drifted at {}", angle);
            assert!(a2.dot(b2).abs() < EPS, "a'.b' not zero at {}", angle);
        }
    }

    #[test]
    fn test_rotate_pair_quarter_turn() {
        let (a, b) = Vec4::Z.rotate_pair(Vec4::W, FRAC_PI_2);
        assert!((a - Vec4::W).length() < EPS);
        assert!((b + Vec4::Z).length() < EPS);
    }

    #[test]
    fn test_geodesic_properties() {
        let points = [
            Vec4::X,
            Vec4::new(0.2, -0.4, 0.8, 0.1).normalized(),
            Vec4::new(-1.0, 1.0, 1.0, -1.0).normalized(),
            Vec4::W,
        ];
        for &a in &points {
            assert_eq!(geodesic_distance(a, a), 0.0, "d(a,a) should be 0");
            for &b in &points {
                let d = geodesic_distance(a, b);
                assert!((0.0..=PI).contains(&d));
                assert_eq!(d, geodesic_distance(b, a), "distance must be symmetric");
            }
        }
    }

    #[test]
    fn test_geodesic_self_distance_is_exactly_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let a = Vec4::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
            .normalized();
            assert_eq!(geodesic_distance(a, a), 0.0, "d(a,a) not zero for {:?}", a);
        }
    }

    #[test]
    fn test_geodesic_small_angles_resolved() {
        let a = Vec4::new(0.3, -0.5, 0.6, 0.55).normalized();
        let t = Vec4::new(0.9, 0.1, -0.2, 0.3).project_tangent(a).normalized();
        for angle in [1e-5_f32, 1e-4, 1e-3] {
            let (b, _) = a.rotate_pair(t, angle);
            let d = geodesic_distance(a, b);
            assert!(
                (d - angle).abs() < angle * 0.05,
                "expected {} got {}",
                angle,
                d
            );
        }
    }

    #[test]
    fn test_geodesic_antipodal_is_pi() {
        let a = Vec4::new(0.5, 0.5, -0.5, 0.5);
        assert!((geodesic_distance(a, -a) - PI).abs() < EPS);
    }

    #[test]
    fn test_geodesic_orthogonal_is_half_pi() {
        assert!((geodesic_distance(Vec4::X, Vec4::Y) - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_geodesic_ignores_input_scale() {
        let d = geodesic_distance(Vec4::X * 3.0, Vec4::new(1.0, 1.0, 0.0, 0.0));
        assert!((d - PI / 4.0).abs() < EPS);
    }
}
