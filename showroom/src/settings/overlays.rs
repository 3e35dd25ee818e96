use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Diagnostic line overlays drawn on top of the car.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DebugOverlays: u8 {
        const SUSPENSION = 1 << 0;
        const COLLIDERS = 1 << 1;
        const WHEEL_CONTOURS = 1 << 2;
        const FUEL_TANK = 1 << 3;
        const WINGS = 1 << 4;
        const FLAMES = 1 << 5;
        const CAMERAS = 1 << 6;
    }
}

impl Default for DebugOverlays {
    fn default() -> Self {
        Self::empty()
    }
}
