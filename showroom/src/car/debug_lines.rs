//! Diagnostic line overlays. Every overlay is built in model space the first
//! time it is shown and kept until its data changes.

use std::f32::consts::TAU;

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Vector3};
use hashbrown::HashMap;
use showroom_util::math::multiply_matrix4_and_point3;

use super::reload::Invalidation;
use crate::data::{CarData, ColliderDescriptor, ExtraCamera, FlameDescriptor, SuspensionsPack, WheelDescriptor, WheelPosition, WingDescriptor};
use crate::graphics::{Color, DebugLineInstruction};
use crate::settings::DebugOverlays;

const CONTOUR_SEGMENTS: usize = 16;
const FLAME_LENGTH: f32 = 0.3;
const CAMERA_LOOK_LENGTH: f32 = 0.5;
const CAMERA_UP_LENGTH: f32 = 0.2;

type Line = DebugLineInstruction;

fn line(from: Point3<f32>, to: Point3<f32>, color: Color) -> Line {
    DebugLineInstruction::new(from, to, color)
}

fn transformed(matrix: &Matrix4<f32>, from: Point3<f32>, to: Point3<f32>, color: Color) -> Line {
    line(
        multiply_matrix4_and_point3(matrix, from),
        multiply_matrix4_and_point3(matrix, to),
        color,
    )
}

/// The twelve edges of an axis aligned box.
pub fn box_lines(center: Point3<f32>, half_size: Vector3<f32>, color: Color) -> Vec<Line> {
    let corner = |index: usize| {
        Point3::new(
            center.x + if index & 1 == 0 { -half_size.x } else { half_size.x },
            center.y + if index & 2 == 0 { -half_size.y } else { half_size.y },
            center.z + if index & 4 == 0 { -half_size.z } else { half_size.z },
        )
    };

    (0..8)
        .flat_map(|index| [1, 2, 4].map(|bit| (index, index | bit)))
        .filter(|(from, to)| from != to)
        .map(|(from, to)| line(corner(from), corner(to), color))
        .collect()
}

/// Closed circle in the local YZ plane of `matrix`.
pub fn circle_lines(matrix: &Matrix4<f32>, radius: f32, color: Color) -> Vec<Line> {
    let point = |index: usize| {
        let angle = index as f32 / CONTOUR_SEGMENTS as f32 * TAU;
        Point3::new(0.0, angle.sin() * radius, angle.cos() * radius)
    };

    (0..CONTOUR_SEGMENTS)
        .map(|index| transformed(matrix, point(index), point(index + 1), color))
        .collect()
}

pub fn suspension_lines(pack: &SuspensionsPack, data_to_model: &Matrix4<f32>) -> Vec<Line> {
    let mut lines = Vec::new();

    for position in WheelPosition::ALL {
        let suspension = pack.suspension(position);
        let matrix = *data_to_model * pack.relative_transform(position);

        lines.extend(
            suspension
                .debug_lines
                .iter()
                .map(|(from, to)| transformed(&matrix, *from, *to, Color::CYAN)),
        );

        if let Some((from, to)) = suspension.steer_axis {
            lines.push(transformed(&matrix, from, to, Color::YELLOW));
        }
    }

    lines
}

pub fn collider_lines(colliders: &[ColliderDescriptor], data_to_model: &Matrix4<f32>) -> Vec<Line> {
    colliders
        .iter()
        .flat_map(|collider| box_lines(collider.center, collider.size * 0.5, Color::GREEN))
        .map(|line| transformed(data_to_model, line.from, line.to, line.color))
        .collect()
}

pub fn wheel_contour_lines(wheels: &[WheelDescriptor], suspension_travel: bool, data_to_model: &Matrix4<f32>) -> Vec<Line> {
    wheels
        .iter()
        .flat_map(|wheel| {
            let matrix = *data_to_model * wheel.wheel_matrix(suspension_travel);
            let mut lines = circle_lines(&matrix, wheel.radius, Color::ORANGE);
            lines.extend(circle_lines(&matrix, wheel.rim_radius, Color::YELLOW));
            lines
        })
        .collect()
}

/// Side length of a cube holding `volume` liters.
pub fn fuel_tank_side(volume: f32) -> f32 {
    (volume.max(0.0) / 1000.0).cbrt()
}

pub fn fuel_tank_lines(position: Point3<f32>, volume: f32, data_to_model: &Matrix4<f32>) -> Vec<Line> {
    let half = fuel_tank_side(volume) * 0.5;

    box_lines(position, Vector3::new(half, half, half), Color::MAGENTA)
        .into_iter()
        .map(|line| transformed(data_to_model, line.from, line.to, line.color))
        .collect()
}

/// Outline of a wing, tilted by its angle of attack around the span.
pub fn wing_lines(wings: &[WingDescriptor], data_to_model: &Matrix4<f32>) -> Vec<Line> {
    wings
        .iter()
        .flat_map(|wing| {
            let matrix = *data_to_model
                * Matrix4::from_translation(Vector3::new(wing.position.x, wing.position.y, wing.position.z))
                * Matrix4::from_angle_x(Deg(wing.angle));

            let half_span = wing.span * 0.5;
            let corners = [
                Point3::new(-half_span, 0.0, 0.0),
                Point3::new(half_span, 0.0, 0.0),
                Point3::new(half_span, 0.0, -wing.chord),
                Point3::new(-half_span, 0.0, -wing.chord),
            ];

            (0..4)
                .map(|index| transformed(&matrix, corners[index], corners[(index + 1) % 4], Color::BLUE))
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn flame_lines(flames: &[FlameDescriptor], data_to_model: &Matrix4<f32>) -> Vec<Line> {
    flames
        .iter()
        .filter(|flame| flame.direction.magnitude2() > f32::EPSILON)
        .map(|flame| {
            let to = flame.position + flame.direction.normalize() * FLAME_LENGTH;
            transformed(data_to_model, flame.position, to, Color::RED)
        })
        .collect()
}

pub fn camera_lines(cameras: &[ExtraCamera], data_to_model: &Matrix4<f32>) -> Vec<Line> {
    cameras
        .iter()
        .flat_map(|camera| {
            let mut lines = Vec::with_capacity(2);

            if camera.look.magnitude2() > f32::EPSILON {
                let to = camera.position + camera.look.normalize() * CAMERA_LOOK_LENGTH;
                lines.push(transformed(data_to_model, camera.position, to, Color::WHITE));
            }

            if camera.up.magnitude2() > f32::EPSILON {
                let to = camera.position + camera.up.normalize() * CAMERA_UP_LENGTH;
                lines.push(transformed(data_to_model, camera.position, to, Color::GREEN));
            }

            lines
        })
        .collect()
}

/// What the overlays are built from.
pub struct DebugSource<'a> {
    pub data: &'a dyn CarData,
    pub pack: Option<&'a SuspensionsPack>,
    pub wheels: &'a [WheelDescriptor],
    pub suspension_travel: bool,
    pub data_to_model: Matrix4<f32>,
}

/// Overlay affected by a cache invalidation.
fn overlays_for(invalidation: Invalidation) -> DebugOverlays {
    [
        (Invalidation::SUSPENSION_LINES, DebugOverlays::SUSPENSION),
        (Invalidation::COLLIDER_LINES, DebugOverlays::COLLIDERS),
        (Invalidation::WHEEL_CONTOUR_LINES, DebugOverlays::WHEEL_CONTOURS),
        (Invalidation::FUEL_TANK_LINES, DebugOverlays::FUEL_TANK),
        (Invalidation::WING_LINES, DebugOverlays::WINGS),
        (Invalidation::FLAME_LINES, DebugOverlays::FLAMES),
        (Invalidation::CAMERAS, DebugOverlays::CAMERAS),
    ]
    .into_iter()
    .filter(|(flag, _)| invalidation.contains(*flag))
    .fold(DebugOverlays::empty(), |overlays, (_, overlay)| overlays | overlay)
}

#[derive(Default)]
pub struct DebugLines {
    cache: HashMap<DebugOverlays, Vec<Line>>,
    #[cfg(test)]
    builds: usize,
}

impl DebugLines {
    /// Number of overlays built so far.
    #[cfg(test)]
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn invalidate(&mut self, invalidation: Invalidation) {
        let overlays = overlays_for(invalidation);
        self.cache.retain(|overlay, _| !overlays.contains(*overlay));
    }

    /// Drops overlays that depend on the wheel placement, used when the
    /// suspension travel or modifiers change.
    pub fn invalidate_wheels(&mut self) {
        self.cache.remove(&DebugOverlays::WHEEL_CONTOURS);
    }

    fn build(overlay: DebugOverlays, source: &DebugSource) -> Vec<Line> {
        let matrix = &source.data_to_model;

        match overlay {
            DebugOverlays::SUSPENSION => source.pack.map(|pack| suspension_lines(pack, matrix)).unwrap_or_default(),
            DebugOverlays::COLLIDERS => collider_lines(&source.data.colliders(), matrix),
            DebugOverlays::WHEEL_CONTOURS => wheel_contour_lines(source.wheels, source.suspension_travel, matrix),
            DebugOverlays::FUEL_TANK => source
                .data
                .fuel_tank_position()
                .map(|position| fuel_tank_lines(position, source.data.fuel_tank_volume(), matrix))
                .unwrap_or_default(),
            DebugOverlays::WINGS => wing_lines(&source.data.wings(), matrix),
            DebugOverlays::FLAMES => flame_lines(&source.data.flames(), matrix),
            DebugOverlays::CAMERAS => camera_lines(&source.data.extra_cameras(), matrix),
            _ => Vec::new(),
        }
    }

    /// Appends the enabled overlays in world space.
    pub fn emit(&mut self, overlays: DebugOverlays, source: &DebugSource, transform: &Matrix4<f32>, output: &mut Vec<DebugLineInstruction>) {
        for overlay in overlays.iter() {
            let lines = self.cache.entry(overlay).or_insert_with(|| {
                #[cfg(test)]
                {
                    self.builds += 1;
                }

                Self::build(overlay, source)
            });

            output.extend(lines.iter().map(|line| transformed(transform, line.from, line.to, line.color)));
        }
    }
}
