use std::ops::Mul;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const BLACK: Self = Self::monochrome(0.0);
    pub const WHITE: Self = Self::monochrome(1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Self = Self::rgb(1.0, 0.0, 1.0);
    pub const ORANGE: Self = Self::rgb(1.0, 0.5, 0.0);

    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    pub const fn rgba(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self { red, green, blue, alpha }
    }

    pub fn rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        let red = (red as f32) / 255.0;
        let green = (green as f32) / 255.0;
        let blue = (blue as f32) / 255.0;

        Self::rgb(red, green, blue)
    }

    pub const fn monochrome(brightness: f32) -> Self {
        Self::rgb(brightness, brightness, brightness)
    }

    pub fn components_linear(self) -> [f32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

impl From<Color> for Vector3<f32> {
    fn from(color: Color) -> Self {
        Vector3::new(color.red, color.green, color.blue)
    }
}

impl From<Vector3<f32>> for Color {
    fn from(vector: Vector3<f32>) -> Self {
        Color::rgb(vector.x, vector.y, vector.z)
    }
}

impl Mul<f32> for Color {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::rgba(self.red * rhs, self.green * rhs, self.blue * rhs, self.alpha)
    }
}
