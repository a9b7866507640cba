//! Input-to-locomotion mapping
//!
//! Keyboard key-state and joystick displacement are reduced to a [`Stride`]:
//! two signed magnitudes the character controller consumes every frame.
//!
//! Sign convention: a negative forward stride moves the character away from
//! the camera, a positive right stride moves it to the camera's left.

use serde::{Deserialize, Serialize};

use crate::config::camera::{FOV_LANDSCAPE_DEG, FOV_PORTRAIT_DEG};
use crate::config::locomotion::MAX_STRIDE;

/// Desired locomotion along the forward and right axes, each in `[-5, 5]`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Stride {
    pub forward: f32,
    pub right: f32,
}

impl Stride {
    pub const ZERO: Self = Self {
        forward: 0.0,
        right: 0.0,
    };

    /// Build a stride, clamping both axes into range
    pub fn new(forward: f32, right: f32) -> Self {
        Self {
            forward: clamp_stride(forward),
            right: clamp_stride(right),
        }
    }

    /// Stride for the set of currently held keys
    ///
    /// `w` beats `s` and `a` beats `d` when both of a pair are held.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (mut w, mut s, mut a, mut d) = (false, false, false, false);
        for key in keys {
            let key = key.as_ref();
            if key.eq_ignore_ascii_case("w") {
                w = true;
            } else if key.eq_ignore_ascii_case("s") {
                s = true;
            } else if key.eq_ignore_ascii_case("a") {
                a = true;
            } else if key.eq_ignore_ascii_case("d") {
                d = true;
            }
        }

        let forward = if w {
            -MAX_STRIDE
        } else if s {
            MAX_STRIDE
        } else {
            0.0
        };

        let right = if a {
            MAX_STRIDE
        } else if d {
            -MAX_STRIDE
        } else {
            0.0
        };

        Self { forward, right }
    }

    /// Stride for a joystick at normalized displacement `(x, y)`
    ///
    /// `y` is positive when the knob is pushed up, so pushing up yields the
    /// same negative forward stride as holding `w`.
    pub fn from_joystick(x: f32, y: f32) -> Self {
        Self::new(-finite_or_zero(y) * MAX_STRIDE, -finite_or_zero(x) * MAX_STRIDE)
    }

    pub fn is_moving(&self) -> bool {
        self.forward != 0.0 || self.right != 0.0
    }

    /// Stride length relative to a full single-axis push, capped at 1
    pub fn intensity(&self) -> f32 {
        (self.forward.hypot(self.right) / MAX_STRIDE).min(1.0)
    }
}

fn clamp_stride(value: f32) -> f32 {
    finite_or_zero(value).clamp(-MAX_STRIDE, MAX_STRIDE)
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Field of view for a viewport: wide when the viewport is taller than it is wide
pub fn camera_fov_degrees(width: u32, height: u32) -> f32 {
    if width > height {
        FOV_LANDSCAPE_DEG
    } else {
        FOV_PORTRAIT_DEG
    }
}
