use image::{ImageBuffer, Luma, RgbImage};
use serde::{Deserialize, Serialize};

/// Rendered visual observation.
pub type Frame = RgbImage;

/// Single channel depth image, values in meters.
pub type DepthImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Camera / agent placement: translation plus a unit quaternion `(w, x, y, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: [f64; 3],
    pub rotation: [f64; 4],
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [1.0, 0.0, 0.0, 0.0],
        }
    }

    pub fn from_translation(translation: [f64; 3]) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    pub fn distance_to(&self, point: [f64; 3]) -> f64 {
        self.translation
            .iter()
            .zip(point)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.translation.iter().chain(&self.rotation).all(|v| v.is_finite())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Record produced by the physics subsystem on every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsState {
    pub distance_to_target: f64,
    /// Engine specific fields the core passes through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PhysicsState {
    pub fn new(distance_to_target: f64) -> Self {
        Self {
            distance_to_target,
            extra: serde_json::Map::new(),
        }
    }
}

/// Depth data as it travels over the worker channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthMap {
    pub width: u32,
    pub height: u32,
    /// Row-major, `width * height` samples.
    pub data: Vec<f32>,
}

impl DepthMap {
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize
    }

    pub fn mean(&self) -> Option<f32> {
        if self.data.is_empty() {
            return None;
        }
        Some(self.data.iter().sum::<f32>() / self.data.len() as f32)
    }
}
