use crate::simulation::vec4::Vec4;

/// Camera pose on the hypersphere.
///
/// `position` is a point of S³ and the other three vectors span its tangent
/// space. Every mutation is a paired rotation of two of the four vectors
/// followed by renormalization, so the frame stays orthonormal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationFrame {
    pub position: Vec4,
    pub forward: Vec4,
    pub right: Vec4,
    pub up: Vec4,
}

impl Default for OrientationFrame {
    fn default() -> Self {
        Self {
            position: Vec4::W,
            forward: Vec4::Z,
            right: Vec4::X,
            up: Vec4::Y,
        }
    }
}

impl OrientationFrame {
    /// Travel along the great circle through `position` and `forward`
    pub fn move_forward(&mut self, angle: f32) {
        (self.position, self.forward) = rotate_normalized(self.position, self.forward, angle);
    }

    pub fn move_right(&mut self, angle: f32) {
        (self.position, self.right) = rotate_normalized(self.position, self.right, angle);
    }

    pub fn move_up(&mut self, angle: f32) {
        (self.position, self.up) = rotate_normalized(self.position, self.up, angle);
    }

    pub fn yaw(&mut self, angle: f32) {
        (self.forward, self.right) = rotate_normalized(self.forward, self.right, angle);
    }

    pub fn pitch(&mut self, angle: f32) {
        (self.up, self.forward) = rotate_normalized(self.up, self.forward, angle);
    }

    /// Gram-Schmidt the whole frame in the order position, forward, right, up.
    ///
    /// Per-call renormalization keeps lengths at one but lets the angles
    /// between the vectors drift over a long session.
    pub fn renormalize(&mut self) {
        self.position.normalize();
        self.forward = self.forward.project_tangent(self.position).normalized();
        self.right = (self.right
            - self.position * self.right.dot(self.position)
            - self.forward * self.right.dot(self.forward))
        .normalized();
        self.up = (self.up
            - self.position * self.up.dot(self.position)
            - self.forward * self.up.dot(self.forward)
            - self.right * self.up.dot(self.right))
        .normalized();
    }

    /// Largest deviation of the frame from orthonormality
    pub fn orthonormality_error(&self) -> f32 {
        let basis = [self.position, self.forward, self.right, self.up];
        let mut worst = 0.0f32;
        for (i, a) in basis.iter().enumerate() {
            for (j, b) in basis.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                worst = worst.max((a.dot(*b) - expected).abs());
            }
        }
        worst
    }
}

fn rotate_normalized(a: Vec4, b: Vec4, angle: f32) -> (Vec4, Vec4) {
    let (a, b) = a.rotate_pair(b, angle);
    (a.normalized(), b.normalized())
}
