//! In-memory car used by the tests of the car subsystems.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use cgmath::{Matrix4, Point3, SquareMatrix, Vector2, Vector3};
use hashbrown::HashMap;

use crate::car::sound::{CarAudio, EmitterState};
use crate::data::{
    BlurredObject, CarData, ColliderDescriptor, DriverDescription, ExtraCamera, FlameDescriptor, LightAnimationDescriptor, LightDescriptor,
    LightKind, LodDescriptor, Suspension, SuspensionModifiers, SuspensionsGroup, SuspensionsPack, WheelDescriptor, WheelPosition,
    WingDescriptor,
};
use crate::graphics::Color;
use crate::loaders::{
    Animator, AnimatorFactory, HierarchyData, LoadError, MaterialData, MeshFlags, MeshGeometry, MeshSource, MeshVertex, ModelData, SourceNode,
};
use crate::scene::SceneTree;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(x, y, z))
}

pub fn box_geometry(min: Point3<f32>, max: Point3<f32>) -> MeshGeometry {
    let vertices = (0..8)
        .map(|corner| {
            let position = Point3::new(
                if corner & 1 == 0 { min.x } else { max.x },
                if corner & 2 == 0 { min.y } else { max.y },
                if corner & 4 == 0 { min.z } else { max.z },
            );

            MeshVertex::new(position, Vector3::unit_y(), Vector2::new(0.0, 0.0))
        })
        .collect();

    let indices = vec![
        0, 1, 3, 0, 3, 2, 4, 6, 7, 4, 7, 5, 0, 4, 5, 0, 5, 1, 2, 3, 7, 2, 7, 6, 0, 2, 6, 0, 6, 4, 1, 5, 7, 1, 7, 3,
    ];

    MeshGeometry {
        vertices,
        indices,
        bones: Vec::new(),
    }
}

fn centered_box(half_size: Vector3<f32>) -> MeshGeometry {
    box_geometry(Point3::new(-half_size.x, -half_size.y, -half_size.z), Point3::new(half_size.x, half_size.y, half_size.z))
}

pub fn wheel_center(position: WheelPosition) -> Point3<f32> {
    match position {
        WheelPosition::LeftFront => Point3::new(0.8, 0.25, 1.3),
        WheelPosition::RightFront => Point3::new(-0.8, 0.25, 1.3),
        WheelPosition::LeftRear => Point3::new(0.8, 0.25, -1.3),
        WheelPosition::RightRear => Point3::new(-0.8, 0.25, -1.3),
    }
}

fn wheel_nodes(position: WheelPosition) -> Vec<SourceNode> {
    let suffix = position.suffix();
    let center = wheel_center(position);
    let placement = translation(center.x, center.y, center.z);

    let mut wheel_children = vec![SourceNode::mesh(
        format!("TYRE_{suffix}"),
        Matrix4::identity(),
        0,
        centered_box(Vector3::new(0.12, 0.3, 0.3)),
    )];

    if position == WheelPosition::LeftFront {
        wheel_children.push(SourceNode::mesh(
            "RIM_LF",
            Matrix4::identity(),
            0,
            centered_box(Vector3::new(0.1, 0.2, 0.2)),
        ));
        wheel_children.push(
            SourceNode::mesh("RIM_BLUR_LF", Matrix4::identity(), 0, centered_box(Vector3::new(0.1, 0.2, 0.2)))
                .with_flags(MeshFlags::VISIBLE | MeshFlags::RENDERABLE | MeshFlags::TRANSPARENT),
        );
    }

    vec![
        SourceNode::group(format!("WHEEL_{suffix}"), placement).with_children(wheel_children),
        SourceNode::group(format!("SUSP_{suffix}"), placement),
        SourceNode::group(format!("HUB_{suffix}"), placement),
        SourceNode::group(format!("DISC_{suffix}"), placement),
    ]
}

/// A box shaped car. Without wheels the lowest point is the bottom of the
/// body at 0.1.
pub fn fixture_source(with_wheels: bool) -> SourceNode {
    let mut children = vec![
        SourceNode::mesh(
            "BODY",
            Matrix4::identity(),
            0,
            box_geometry(Point3::new(-0.9, 0.1, -2.2), Point3::new(0.9, 1.2, 2.2)),
        ),
        SourceNode::mesh("GLASS", translation(0.0, 1.1, 0.6), 1, centered_box(Vector3::new(0.7, 0.05, 0.4)))
            .with_flags(MeshFlags::default() | MeshFlags::TRANSPARENT),
        SourceNode::group("STEER_HR", translation(0.35, 0.8, 0.55)).with_children(vec![SourceNode::mesh(
            "STEER_HR_RING",
            Matrix4::identity(),
            0,
            centered_box(Vector3::new(0.18, 0.18, 0.02)),
        )]),
        SourceNode::group("STEER_LR", translation(0.35, 0.8, 0.55)),
        SourceNode::mesh("COCKPIT_HR", translation(0.0, 0.6, 0.4), 0, centered_box(Vector3::new(0.5, 0.1, 0.3))),
        SourceNode::mesh("COCKPIT_LR", translation(0.0, 0.6, 0.4), 0, centered_box(Vector3::new(0.5, 0.1, 0.3))),
        SourceNode::mesh("CINTURE_ON", translation(0.35, 0.7, 0.2), 0, centered_box(Vector3::new(0.1, 0.2, 0.02))),
        SourceNode::mesh("CINTURE_OFF", translation(0.55, 0.7, 0.2), 0, centered_box(Vector3::new(0.02, 0.2, 0.02)))
            .with_flags(MeshFlags::VISIBLE | MeshFlags::RENDERABLE),
        SourceNode::mesh("LIGHT_HEAD", translation(0.6, 0.6, 2.15), 0, centered_box(Vector3::new(0.15, 0.05, 0.05))),
        SourceNode::mesh("MIRROR_L", translation(0.95, 0.9, 0.8), 0, centered_box(Vector3::new(0.05, 0.04, 0.01))),
    ];

    if with_wheels {
        children.extend(WheelPosition::ALL.into_iter().flat_map(wheel_nodes));
    }

    SourceNode::group("car", Matrix4::identity()).with_children(children)
}

pub fn png_bytes(rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut bytes = Vec::new();

    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    bytes
}

pub fn fixture_model(with_wheels: bool) -> ModelData {
    let mut model = ModelData::new(fixture_source(with_wheels));

    model.materials = vec![
        MaterialData {
            name: "paint".to_owned(),
            shader: "ksPerPixel".to_owned(),
            textures: vec!["paint.png".to_owned()],
            alpha_blend: false,
        },
        MaterialData {
            name: "glass".to_owned(),
            shader: "ksPerPixelAlpha".to_owned(),
            textures: Vec::new(),
            alpha_blend: true,
        },
    ];
    model.textures.insert("paint.png".to_owned(), Arc::new(png_bytes([200, 20, 20, 255])));

    model
}

pub fn wheel_descriptors() -> Vec<WheelDescriptor> {
    WheelPosition::ALL
        .into_iter()
        .map(|position| {
            let center = wheel_center(position);

            WheelDescriptor {
                position,
                radius: 0.3,
                rim_radius: 0.2,
                width: 0.24,
                center_at_ride_height: center,
                center_at_suspension_travel: Point3::new(center.x, 0.2, center.z),
                camber: 0.0,
                toe: 0.0,
            }
        })
        .collect()
}

fn suspension(steer_axis: Option<(Point3<f32>, Point3<f32>)>) -> Suspension {
    Suspension {
        steer_axis,
        debug_lines: vec![(Point3::new(0.3, 0.2, 1.3), Point3::new(0.7, 0.25, 1.3))],
        transform: Matrix4::identity(),
    }
}

pub fn suspensions_pack() -> SuspensionsPack {
    SuspensionsPack {
        front: SuspensionsGroup::Independent {
            left: suspension(Some((Point3::new(0.7, 0.0, 1.3), Point3::new(0.68, 0.6, 1.32)))),
            right: suspension(Some((Point3::new(-0.7, 0.0, 1.3), Point3::new(-0.68, 0.6, 1.32)))),
        },
        rear: SuspensionsGroup::Dependent { both: suspension(None) },
    }
}

fn arm_nodes(sign: f32, suffix: &str) -> SourceNode {
    let fingers = [("Index", 0.03), ("Middle", 0.01), ("Ring", -0.01), ("Pinkie", -0.03)]
        .into_iter()
        .map(|(finger, offset)| {
            SourceNode::group(format!("HAND_{suffix}_{finger}1"), translation(sign * offset, 0.0, 0.08)).with_children(vec![
                SourceNode::group(format!("HAND_{suffix}_{finger}2"), translation(0.0, 0.0, 0.03))
                    .with_children(vec![SourceNode::group(format!("HAND_{suffix}_{finger}3"), translation(0.0, 0.0, 0.02))]),
            ])
        })
        .collect();

    let hand = SourceNode::group(format!("RIG_HAND_{suffix}"), translation(0.0, 0.0, 0.12)).with_children(fingers);
    let forearm_end = SourceNode::group(format!("RIG_ForeArm_END_{suffix}"), translation(0.0, 0.0, 0.12)).with_children(vec![hand]);
    let forearm = SourceNode::group(format!("RIG_ForeArm_{suffix}"), translation(0.0, -0.28, 0.0)).with_children(vec![forearm_end]);
    let arm = SourceNode::group(format!("RIG_Arm_{suffix}"), translation(sign * 0.05, 0.0, 0.0)).with_children(vec![forearm]);

    SourceNode::group(format!("RIG_Shoulder_{suffix}"), translation(sign * 0.18, 0.55, 0.0)).with_children(vec![arm])
}

pub fn driver_source() -> SourceNode {
    SourceNode::group("driver", Matrix4::identity()).with_children(vec![
        SourceNode::mesh("DRIVER_BODY", translation(0.0, 0.4, 0.0), 0, centered_box(Vector3::new(0.2, 0.3, 0.15))),
        arm_nodes(1.0, "L"),
        arm_nodes(-1.0, "R"),
    ])
}

fn crew_source(name: &str, half_size: Vector3<f32>) -> SourceNode {
    SourceNode::group(name, Matrix4::identity()).with_children(vec![SourceNode::mesh(
        format!("{name}_mesh"),
        translation(0.0, half_size.y, 0.0),
        0,
        centered_box(half_size),
    )])
}

/// Car data with every optional feature present.
pub struct FixtureData {
    pub car_directory: PathBuf,
    pub content_root: PathBuf,
    pub driver_name: String,
    pub lods: Vec<LodDescriptor>,
    pub lights: Vec<LightDescriptor>,
    pub light_animations: Vec<LightAnimationDescriptor>,
    pub mirrors: Vec<String>,
    pub blurred: Vec<BlurredObject>,
    pub suspensions: Option<SuspensionsPack>,
    pub wheel_queries: AtomicUsize,
    pub light_queries: AtomicUsize,
}

impl Default for FixtureData {
    fn default() -> Self {
        let root = std::env::temp_dir().join(format!("showroom-fixture-{}", std::process::id()));

        Self {
            car_directory: root.join("car"),
            content_root: root.join("content"),
            driver_name: "driver".to_owned(),
            lods: vec![
                LodDescriptor::new(String::new(), 0.0, 15.0),
                LodDescriptor::new("car_lod_b.kn5".to_owned(), 15.0, 60.0),
                LodDescriptor::new("car_lod_c.kn5".to_owned(), 60.0, 1000.0),
            ],
            lights: vec![LightDescriptor::new(
                "LIGHT_HEAD".to_owned(),
                Some(Color::rgb(1.0, 1.0, 0.8)),
                None,
            )],
            light_animations: vec![LightAnimationDescriptor::new("lights.ksanim".to_owned(), 1.0, LightKind::Headlight)],
            mirrors: vec!["MIRROR_L".to_owned()],
            blurred: vec![
                BlurredObject::new("RIM_LF".to_owned(), 0, 0.0, 40.0),
                BlurredObject::new("RIM_BLUR_LF".to_owned(), 0, 40.0, 1000.0),
            ],
            suspensions: Some(suspensions_pack()),
            wheel_queries: AtomicUsize::new(0),
            light_queries: AtomicUsize::new(0),
        }
    }
}

impl FixtureData {
    pub fn car_directory(&self) -> &Path {
        &self.car_directory
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn wheel_queries(&self) -> usize {
        self.wheel_queries.load(Ordering::SeqCst)
    }

    pub fn light_queries(&self) -> usize {
        self.light_queries.load(Ordering::SeqCst)
    }
}

impl CarData for FixtureData {
    fn data_directory(&self) -> PathBuf {
        self.car_directory.join("data")
    }

    fn wheels(&self, _modifiers: &SuspensionModifiers) -> Vec<WheelDescriptor> {
        self.wheel_queries.fetch_add(1, Ordering::SeqCst);
        wheel_descriptors()
    }

    fn suspensions_pack(&self) -> Option<SuspensionsPack> {
        self.suspensions.clone()
    }

    fn lights(&self) -> Vec<LightDescriptor> {
        self.light_queries.fetch_add(1, Ordering::SeqCst);
        self.lights.clone()
    }

    fn lights_animations(&self) -> Vec<LightAnimationDescriptor> {
        self.light_animations.clone()
    }

    fn mirror_names(&self) -> Vec<String> {
        self.mirrors.clone()
    }

    fn driver_description(&self) -> Option<DriverDescription> {
        Some(DriverDescription::new(
            self.driver_name.clone(),
            translation(0.35, 0.3, 0.2),
            Some(PathBuf::from("driver_base_pos.knh")),
        ))
    }

    fn extra_cameras(&self) -> Vec<ExtraCamera> {
        vec![ExtraCamera::new(
            "hood".to_owned(),
            Point3::new(0.0, 1.3, 0.5),
            Vector3::unit_z(),
            Vector3::unit_y(),
            56.0,
        )]
    }

    fn steer_lock(&self) -> f32 {
        450.0
    }

    fn body_shadow_size(&self) -> Option<Vector2<f32>> {
        None
    }

    fn wheel_shadow_size(&self) -> Option<Vector2<f32>> {
        None
    }

    fn engine_minimum_rpm(&self) -> f32 {
        900.0
    }

    fn engine_maximum_rpm(&self) -> f32 {
        8000.0
    }

    fn fuel_tank_position(&self) -> Option<Point3<f32>> {
        Some(Point3::new(0.0, 0.3, -0.5))
    }

    fn fuel_tank_volume(&self) -> f32 {
        64.0
    }

    fn blurred_objects(&self) -> Vec<BlurredObject> {
        self.blurred.clone()
    }

    fn lods(&self) -> Vec<LodDescriptor> {
        self.lods.clone()
    }

    fn colliders(&self) -> Vec<ColliderDescriptor> {
        vec![ColliderDescriptor::new(Point3::new(0.0, 0.6, 0.0), Vector3::new(1.8, 1.0, 4.4))]
    }

    fn wings(&self) -> Vec<WingDescriptor> {
        vec![WingDescriptor::new("REAR".to_owned(), Point3::new(0.0, 1.2, -2.0), 0.3, 1.4, 8.0)]
    }

    fn flames(&self) -> Vec<FlameDescriptor> {
        vec![FlameDescriptor::new(Point3::new(0.4, 0.3, -2.2), -Vector3::unit_z())]
    }
}

/// Serves models by file name and counts every request.
pub struct FixtureMeshSource {
    models: HashMap<String, Arc<ModelData>>,
    hidden: Mutex<Vec<String>>,
    loads: AtomicUsize,
}

impl Default for FixtureMeshSource {
    fn default() -> Self {
        let mut models = HashMap::new();

        let mut lod_b = fixture_model(true);
        lod_b.root.name = "car_lod_b".to_owned();
        lod_b.root.transform = translation(0.0, -0.1, 0.0);

        models.insert("driver.kn5".to_owned(), Arc::new(ModelData::new(driver_source())));
        models.insert("car_lod_b.kn5".to_owned(), Arc::new(lod_b));
        models.insert("car_lod_c.kn5".to_owned(), Arc::new(fixture_model(false)));
        models.insert(
            "pitcrew.kn5".to_owned(),
            Arc::new(ModelData::new(crew_source("pitcrew", Vector3::new(0.25, 0.9, 0.15)))),
        );
        models.insert(
            "pitcrew_helmet.kn5".to_owned(),
            Arc::new(ModelData::new(crew_source("helmet", Vector3::new(0.12, 0.12, 0.12)))),
        );

        Self {
            models,
            hidden: Mutex::default(),
            loads: AtomicUsize::new(0),
        }
    }
}

impl FixtureMeshSource {
    pub fn without(self, file_name: &str) -> Self {
        lock(&self.hidden).push(file_name.to_owned());
        self
    }

    /// Makes a file hidden by [`Self::without`] readable again.
    pub fn restore(&self, file_name: &str) {
        lock(&self.hidden).retain(|name| name != file_name);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl MeshSource for FixtureMeshSource {
    fn load_model(&self, path: &Path) -> Result<Arc<ModelData>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        let file_name = path.file_name().map(|name| name.to_string_lossy().to_ascii_lowercase()).unwrap_or_default();

        if lock(&self.hidden).contains(&file_name) {
            return Err(LoadError::file(path, "no such file"));
        }

        self.models
            .get(&file_name)
            .cloned()
            .ok_or_else(|| LoadError::file(path, "no such file"))
    }

    fn load_hierarchy(&self, path: &Path) -> Result<HierarchyData, LoadError> {
        match path.file_name().is_some_and(|name| name == "driver_base_pos.knh") {
            true => Ok(HierarchyData::default()),
            false => Err(LoadError::file(path, "no such file")),
        }
    }
}

#[derive(Default)]
pub struct AnimatorLog {
    pub created: Vec<PathBuf>,
    pub targets: Vec<f32>,
    pub immediate: Vec<f32>,
}

struct FixtureAnimator {
    position: f32,
    target: f32,
    duration: f32,
    log: Arc<Mutex<AnimatorLog>>,
}

impl Animator for FixtureAnimator {
    fn set_target(&mut self, position: f32) {
        self.target = position;
        lock(&self.log).targets.push(position);
    }

    fn set_immediate(&mut self, position: f32) {
        self.position = position;
        self.target = position;
        lock(&self.log).immediate.push(position);
    }

    fn play_loop(&mut self) {}

    fn position(&self) -> f32 {
        self.position
    }

    fn update(&mut self, _tree: &mut SceneTree, delta_time: f32) -> bool {
        let step = delta_time / self.duration.max(f32::EPSILON);
        let previous = self.position;

        self.position = match self.position < self.target {
            true => (self.position + step).min(self.target),
            false => (self.position - step).max(self.target),
        };

        self.position != previous
    }
}

/// Creates animators for every clip except those whose file name starts with
/// `missing`.
#[derive(Clone, Default)]
pub struct FixtureAnimatorFactory {
    log: Arc<Mutex<AnimatorLog>>,
}

impl FixtureAnimatorFactory {
    pub fn log(&self) -> MutexGuard<'_, AnimatorLog> {
        lock(&self.log)
    }
}

impl AnimatorFactory for FixtureAnimatorFactory {
    fn create_animator(&self, path: &Path, duration: f32, _clamp: bool, _skip_fixed: bool) -> Option<Box<dyn Animator>> {
        if path.file_name().is_some_and(|name| name.to_string_lossy().starts_with("missing")) {
            return None;
        }

        lock(&self.log).created.push(path.to_path_buf());

        Some(Box::new(FixtureAnimator {
            position: 0.0,
            target: 0.0,
            duration,
            log: self.log.clone(),
        }))
    }
}

#[derive(Default)]
pub struct AudioLog {
    pub position_updates: usize,
    pub car: Option<EmitterState>,
    pub engine: Option<(bool, f32, f32)>,
    pub turbo: Option<Option<f32>>,
    pub limiter: Option<Option<f32>>,
    pub horn: Option<bool>,
}

#[derive(Clone, Default)]
pub struct FixtureAudio {
    log: Arc<Mutex<AudioLog>>,
}

impl FixtureAudio {
    pub fn log(&self) -> MutexGuard<'_, AudioLog> {
        lock(&self.log)
    }
}

impl CarAudio for FixtureAudio {
    fn update_engine_position(&mut self, _state: &EmitterState) {
        lock(&self.log).position_updates += 1;
    }

    fn update_horn_position(&mut self, _state: &EmitterState) {
        lock(&self.log).position_updates += 1;
    }

    fn update_car_position(&mut self, state: &EmitterState) {
        let mut log = lock(&self.log);
        log.position_updates += 1;
        log.car = Some(*state);
    }

    fn engine(&mut self, external: bool, rpm: f32, throttle: f32) {
        lock(&self.log).engine = Some((external, rpm, throttle));
    }

    fn turbo(&mut self, value: Option<f32>) {
        lock(&self.log).turbo = Some(value);
    }

    fn limiter(&mut self, value: Option<f32>) {
        lock(&self.log).limiter = Some(value);
    }

    fn horn(&mut self, active: bool) {
        lock(&self.log).horn = Some(active);
    }
}

/// Unique scratch directory, removed again when dropped.
pub struct ScratchDirectory {
    path: PathBuf,
}

impl ScratchDirectory {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("showroom-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDirectory {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
