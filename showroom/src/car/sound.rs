use cgmath::{InnerSpace, Matrix4, Point3, Vector3};
use showroom_util::math::{multiply_matrix4_and_point3, multiply_matrix4_and_vector3};

use crate::data::SoundEmitterOffsets;

/// World space state of one sound emitter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EmitterState {
    pub direction: Vector3<f32>,
    pub position: Point3<f32>,
    pub up: Vector3<f32>,
    pub velocity: Vector3<f32>,
}

/// Audio engine playing the car's sounds. The car only tracks where the
/// emitters are and forwards the engine state.
pub trait CarAudio: Send {
    fn update_engine_position(&mut self, state: &EmitterState);

    fn update_horn_position(&mut self, state: &EmitterState);

    fn update_car_position(&mut self, state: &EmitterState);

    fn engine(&mut self, external: bool, rpm: f32, throttle: f32);

    fn turbo(&mut self, value: Option<f32>);

    fn limiter(&mut self, value: Option<f32>);

    fn horn(&mut self, active: bool);
}

/// Follows a point attached to the car and estimates its velocity.
#[derive(Clone, Debug)]
pub struct EmitterTracker {
    offset: Point3<f32>,
    previous: Option<Point3<f32>>,
    velocity: Vector3<f32>,
}

impl EmitterTracker {
    pub fn new(offset: Point3<f32>) -> Self {
        Self {
            offset,
            previous: None,
            velocity: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn set_offset(&mut self, offset: Point3<f32>) {
        self.offset = offset;
    }

    /// Moves the emitter with the car. The velocity is the finite difference
    /// of the position, smoothed by an exponential filter with the given time
    /// constant.
    pub fn update(&mut self, transform: &Matrix4<f32>, delta_time: f32, time_constant: f32) -> EmitterState {
        let position = multiply_matrix4_and_point3(transform, self.offset);

        if let Some(previous) = self.previous {
            if delta_time > 0.0 {
                let measured = (position - previous) / delta_time;
                let factor = match time_constant > 0.0 {
                    true => 1.0 - (-delta_time / time_constant).exp(),
                    false => 1.0,
                };

                self.velocity += (measured - self.velocity) * factor;
            }
        }

        self.previous = Some(position);

        EmitterState {
            direction: normalized_or(multiply_matrix4_and_vector3(transform, Vector3::unit_z()), Vector3::unit_z()),
            position,
            up: normalized_or(multiply_matrix4_and_vector3(transform, Vector3::unit_y()), Vector3::unit_y()),
            velocity: self.velocity,
        }
    }

    /// Forgets the last position, used after the car was teleported.
    pub fn reset(&mut self) {
        self.previous = None;
        self.velocity = Vector3::new(0.0, 0.0, 0.0);
    }
}

fn normalized_or(vector: Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    match vector.magnitude2() > f32::EPSILON {
        true => vector.normalize(),
        false => fallback,
    }
}

/// Engine, horn and body emitters of a car.
pub struct SoundEmitters {
    engine: EmitterTracker,
    horn: EmitterTracker,
    body: EmitterTracker,
}

impl SoundEmitters {
    pub fn new(offsets: &SoundEmitterOffsets) -> Self {
        Self {
            engine: EmitterTracker::new(offsets.engine),
            horn: EmitterTracker::new(offsets.horn),
            body: EmitterTracker::new(offsets.body),
        }
    }

    pub fn set_offsets(&mut self, offsets: &SoundEmitterOffsets) {
        self.engine.set_offset(offsets.engine);
        self.horn.set_offset(offsets.horn);
        self.body.set_offset(offsets.body);
    }

    pub fn update(&mut self, audio: &mut dyn CarAudio, transform: &Matrix4<f32>, delta_time: f32, time_constant: f32) {
        audio.update_engine_position(&self.engine.update(transform, delta_time, time_constant));
        audio.update_horn_position(&self.horn.update(transform, delta_time, time_constant));
        audio.update_car_position(&self.body.update(transform, delta_time, time_constant));
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.horn.reset();
        self.body.reset();
    }
}

/// Engine state forwarded to the audio engine.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EngineState {
    pub rpm: f32,
    pub throttle: f32,
    pub external: bool,
}

impl EngineState {
    /// Keeps the rpm inside the range the engine can run at.
    pub fn clamped(rpm: f32, throttle: f32, external: bool, minimum_rpm: f32, maximum_rpm: f32) -> Self {
        let (low, high) = match minimum_rpm <= maximum_rpm {
            true => (minimum_rpm, maximum_rpm),
            false => (maximum_rpm, minimum_rpm),
        };

        Self {
            rpm: rpm.clamp(low, high),
            throttle: throttle.clamp(0.0, 1.0),
            external,
        }
    }
}
