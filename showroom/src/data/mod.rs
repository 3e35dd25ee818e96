//! Queries against the car's data files.
//!
//! Parsing the key/value data files is done elsewhere; the car model only
//! consumes the typed descriptors below and learns about edits through
//! [`DataChangedHandle`](crate::car::DataChangedHandle).

mod descriptors;
mod suspension;
mod wheel;

use std::path::PathBuf;

use cgmath::{Point3, Vector2};

pub use self::descriptors::{
    BlurredObject, ColliderDescriptor, DriverDescription, ExtraCamera, FlameDescriptor, LightAnimationDescriptor, LightDescriptor, LightKind,
    LodDescriptor, SoundEmitterOffsets, WingDescriptor,
};
pub use self::suspension::{Suspension, SuspensionsGroup, SuspensionsPack};
pub use self::wheel::{SuspensionModifiers, WheelDescriptor, WheelPosition};

pub trait CarData: Send + Sync {
    /// Directory holding the data files, watched for edits.
    fn data_directory(&self) -> PathBuf;

    fn wheels(&self, modifiers: &SuspensionModifiers) -> Vec<WheelDescriptor>;

    fn suspensions_pack(&self) -> Option<SuspensionsPack>;

    fn lights(&self) -> Vec<LightDescriptor>;

    fn lights_animations(&self) -> Vec<LightAnimationDescriptor>;

    fn mirror_names(&self) -> Vec<String>;

    fn driver_description(&self) -> Option<DriverDescription>;

    fn extra_cameras(&self) -> Vec<ExtraCamera>;

    /// Steering wheel rotation in degrees at full lock.
    fn steer_lock(&self) -> f32;

    /// Explicit half size of the body shadow. Derived from the bounding box
    /// when missing.
    fn body_shadow_size(&self) -> Option<Vector2<f32>>;

    /// Scale applied to the wheel shadow derived from the wheel size.
    fn wheel_shadow_size(&self) -> Option<Vector2<f32>>;

    fn engine_minimum_rpm(&self) -> f32;

    fn engine_maximum_rpm(&self) -> f32;

    fn fuel_tank_position(&self) -> Option<Point3<f32>>;

    /// Volume in liters.
    fn fuel_tank_volume(&self) -> f32;

    fn blurred_objects(&self) -> Vec<BlurredObject>;

    fn lods(&self) -> Vec<LodDescriptor>;

    fn colliders(&self) -> Vec<ColliderDescriptor> {
        Vec::new()
    }

    fn wings(&self) -> Vec<WingDescriptor> {
        Vec::new()
    }

    fn flames(&self) -> Vec<FlameDescriptor> {
        Vec::new()
    }

    fn sound_emitters(&self) -> SoundEmitterOffsets {
        SoundEmitterOffsets::default()
    }
}
