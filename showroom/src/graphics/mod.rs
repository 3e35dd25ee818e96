mod camera;
mod color;
mod instruction;
mod texture;

pub use self::camera::{Camera, FixedCamera};
pub use self::color::Color;
pub use self::instruction::{CarInstructions, DebugLineInstruction, ModelInstruction, ShadowInstruction};
pub use self::texture::{Texture, TextureFormat};

/// Pass a car is drawn for. Decides which drawables are emitted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Opaque,
    Transparent,
    Shadow,
    Reflection,
}
