mod overlays;

use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, print_debug};

pub use self::overlays::DebugOverlays;

const FILE_NAME: &str = "showroom_settings.ron";

/// Tuning of the steering kinematics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringSettings {
    /// Extra steer angle added to a fully turned wheel to emulate toe-in.
    pub toe_correction_degrees: f32,
    /// Steer angle at which the full toe correction applies.
    pub toe_reference_degrees: f32,
    /// How far the steer axis is extended in both directions when
    /// intersecting it with the wheel plane.
    pub axis_extension: f32,
    /// Steer angle that turns the steering wheel all the way to its lock.
    pub steer_wheel_reference_degrees: f32,
    pub maximum_angle: f32,
    pub step: f32,
}

impl Default for SteeringSettings {
    fn default() -> Self {
        Self {
            toe_correction_degrees: 1.5,
            toe_reference_degrees: 30.0,
            axis_extension: 10.0,
            steer_wheel_reference_degrees: 30.0,
            maximum_angle: 50.0,
            step: 0.1,
        }
    }
}

/// Hand tuned constants of the driver's steering wheel grip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GripSettings {
    /// Fraction of the steering wheel radius where the palms rest.
    pub grip_radius_factor: f32,
    /// Radius used when the steering wheel has no usable bounding box.
    pub fallback_wheel_radius: f32,
    /// Angle between the top of the wheel and each hand.
    pub grip_angle_degrees: f32,
    /// How far the shoulder may lower when the arm is almost stretched.
    pub shoulder_drop: f32,
    /// Fraction of the arm length at which the shoulder starts to lower.
    pub shoulder_drop_start: f32,
    /// Fraction of the arm length after which the reach is eased.
    pub reach_knee: f32,
    /// Angle the hand looks ahead along the rim.
    pub look_ahead_degrees: f32,
    pub curl_minimum: f32,
    pub curl_maximum: f32,
    /// Grip height (0 at the top of the wheel, 1 at the bottom) where the
    /// fingers start curling more.
    pub curl_start: f32,
    pub curl_end: f32,
    /// Rotation of a fully curled finger segment.
    pub finger_curl_degrees: f32,
    pub segment_weights: [f32; 3],
}

impl Default for GripSettings {
    fn default() -> Self {
        Self {
            grip_radius_factor: 0.9,
            fallback_wheel_radius: 0.17,
            grip_angle_degrees: 80.0,
            shoulder_drop: 0.04,
            shoulder_drop_start: 0.85,
            reach_knee: 0.9,
            look_ahead_degrees: 12.0,
            curl_minimum: 0.35,
            curl_maximum: 0.85,
            curl_start: 0.5,
            curl_end: 1.0,
            finger_curl_degrees: 70.0,
            segment_weights: [1.0, 0.8, 0.6],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundTrackingSettings {
    /// Time constant in seconds of the velocity smoothing filter.
    pub velocity_time_constant: f32,
}

impl Default for SoundTrackingSettings {
    fn default() -> Self {
        Self {
            velocity_time_constant: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowroomSettings {
    pub reposition_on_lod_change: bool,
    pub align_wheels_by_data: bool,
    pub async_texture_loading: bool,
    pub scan_for_skins: bool,
    pub shadows_height: f32,
    pub reload_debounce_ms: u64,
    pub debug_overlays: DebugOverlays,
    pub steering: SteeringSettings,
    pub grip: GripSettings,
    pub sound: SoundTrackingSettings,
}

impl Default for ShowroomSettings {
    fn default() -> Self {
        Self {
            reposition_on_lod_change: false,
            align_wheels_by_data: false,
            async_texture_loading: true,
            scan_for_skins: true,
            shadows_height: 0.01,
            reload_debounce_ms: 300,
            debug_overlays: DebugOverlays::empty(),
            steering: SteeringSettings::default(),
            grip: GripSettings::default(),
            sound: SoundTrackingSettings::default(),
        }
    }
}

impl ShowroomSettings {
    pub fn new() -> Self {
        Self::load().unwrap_or_else(|| {
            #[cfg(feature = "debug")]
            print_debug!("failed to load showroom settings from {}", FILE_NAME.magenta());

            Default::default()
        })
    }

    pub fn load() -> Option<Self> {
        Self::load_from(Path::new(FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        #[cfg(feature = "debug")]
        print_debug!("loading showroom settings from {}", path.display().magenta());

        std::fs::read_to_string(path).ok().and_then(|data| ron::from_str(&data).ok())
    }

    pub fn save(&self) {
        self.save_to(Path::new(FILE_NAME));
    }

    pub fn save_to(&self, path: &Path) {
        #[cfg(feature = "debug")]
        print_debug!("saving showroom settings to {}", path.display().magenta());

        let result = ron::ser::to_string_pretty(self, PrettyConfig::new())
            .map_err(|error| error.to_string())
            .and_then(|data| std::fs::write(path, data).map_err(|error| error.to_string()));

        if let Err(_error) = result {
            #[cfg(feature = "debug")]
            print_debug!("[{}] failed to save showroom settings: {}", "error".red(), _error);
        }
    }
}
