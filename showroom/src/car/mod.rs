//! The car model: one loaded car with its levels of detail, skins and every
//! procedurally animated part.

mod crew;
mod debug_lines;
mod driver;
#[cfg(test)]
mod fixtures;
mod lights;
mod lod;
mod reload;
mod shadows;
mod skins;
mod sound;
mod steering;
mod watcher;
mod wheels;

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cgmath::{Matrix4, SquareMatrix, Vector2, Vector3};
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, Timer, print_debug};
use showroom_util::collision::AABB;
use showroom_util::container::ResourceState;
use showroom_util::math::{look_rotation, matrix_translation};

pub use self::crew::crew_placements;
pub use self::driver::{ArmPose, DriverGripSolver, GripInput, HandSide, HeuristicGripSolver, NoGripSolver};
pub use self::reload::{DataChangedHandle, Invalidation, ReloadCounters, invalidation_for};
pub use self::sound::{CarAudio, EmitterState, EngineState};
pub use self::watcher::WatchTarget;
use self::crew::CrewState;
use self::debug_lines::{DebugLines, DebugSource};
use self::driver::DriverState;
use self::lights::{LightsSource, LightsState};
use self::lod::{LodScene, LodTable};
use self::reload::{ReloadDebouncer, ReloadRequest};
use self::shadows::{AmbientShadows, ShadowFrame};
use self::skins::SkinSet;
use self::sound::SoundEmitters;
use self::steering::{SteeringState, apply_steering_wheel, steering_wheel_degrees};
use self::watcher::ReloadWatcher;
use self::wheels::{WheelPlacement, WheelsState, apply_blurred_objects, ground_offset};
use crate::data::{BlurredObject, CarData, ExtraCamera, LightKind, SuspensionModifiers, SuspensionsPack, WheelDescriptor};
use crate::graphics::{Camera, CarInstructions, DrawMode, ModelInstruction, Texture};
use crate::loaders::{AnimatorFactory, IconCache, LoadError, MeshSource, ModelData, TextureLoader};
use crate::materials::{MaterialsProvider, TextureOverride, TexturesProvider};
use crate::scene::{DrawableFlags, NodeRole, SceneTree};
use crate::settings::{DebugOverlays, ShowroomSettings};

#[derive(Clone, Debug, PartialEq)]
pub enum CarModelError {
    InvalidLod { index: usize, available: usize },
    Load(LoadError),
}

impl Display for CarModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CarModelError::InvalidLod { index, available } => {
                write!(f, "level of detail {index} does not exist ({available} available)")
            }
            CarModelError::Load(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for CarModelError {}

impl From<LoadError> for CarModelError {
    fn from(error: LoadError) -> Self {
        Self::Load(error)
    }
}

/// Per instance construction flags.
#[derive(Clone, Debug)]
pub struct CarModelOptions {
    pub car_directory: PathBuf,
    pub content_root: PathBuf,
    /// Defaults to the `skins` directory of the car.
    pub skins_root: Option<PathBuf>,
    pub scan_for_skins: bool,
    pub async_textures: bool,
    pub shadows_height: f32,
    /// Skin selected after the first scan. An unknown or missing id selects
    /// the first skin.
    pub initial_skin: Option<String>,
    /// Arms file watchers for the skins and data directories on first draw.
    pub watch_files: bool,
}

impl CarModelOptions {
    pub fn new(car_directory: PathBuf, content_root: PathBuf, settings: &ShowroomSettings) -> Self {
        Self {
            car_directory,
            content_root,
            skins_root: None,
            scan_for_skins: settings.scan_for_skins,
            async_textures: settings.async_texture_loading,
            shadows_height: settings.shadows_height,
            initial_skin: None,
            watch_files: true,
        }
    }
}

/// External collaborators of a car model.
pub struct CarModelDependencies {
    pub data: Arc<dyn CarData>,
    pub mesh_source: Arc<dyn MeshSource>,
    pub animators: Arc<dyn AnimatorFactory>,
    pub audio: Option<Box<dyn CarAudio>>,
    pub texture_loader: Arc<TextureLoader>,
    pub icon_cache: Option<Arc<IconCache>>,
    pub grip_solver: Box<dyn DriverGripSolver>,
}

fn build_scene(model: &ModelData, mirrors: &[String]) -> LodScene {
    let mut tree = SceneTree::from_source(&model.root);

    for name in mirrors {
        if let Some(key) = tree.find(name) {
            tree.set_mirror(key);
        }
    }

    LodScene::new(tree)
}

/// Everything read from the car data that is kept until the data changes.
#[derive(Default)]
struct DataCache {
    wheels: Option<Vec<WheelDescriptor>>,
    suspensions: Option<Option<SuspensionsPack>>,
    steer_lock: Option<f32>,
    blurred: Option<Vec<BlurredObject>>,
    cameras: Option<Vec<ExtraCamera>>,
    shadow_sizes: Option<(Option<Vector2<f32>>, Option<Vector2<f32>>)>,
    engine_range: Option<(f32, f32)>,
}

impl DataCache {
    fn fill(&mut self, data: &dyn CarData, modifiers: &SuspensionModifiers) {
        if self.wheels.is_none() {
            self.wheels = Some(data.wheels(modifiers));
        }

        if self.suspensions.is_none() {
            self.suspensions = Some(data.suspensions_pack());
        }

        if self.steer_lock.is_none() {
            self.steer_lock = Some(data.steer_lock());
        }

        if self.blurred.is_none() {
            self.blurred = Some(data.blurred_objects());
        }

        if self.cameras.is_none() {
            self.cameras = Some(data.extra_cameras());
        }

        if self.shadow_sizes.is_none() {
            self.shadow_sizes = Some((data.body_shadow_size(), data.wheel_shadow_size()));
        }

        if self.engine_range.is_none() {
            self.engine_range = Some((data.engine_minimum_rpm(), data.engine_maximum_rpm()));
        }
    }

    fn wheels(&self) -> &[WheelDescriptor] {
        self.wheels.as_deref().unwrap_or_default()
    }

    fn suspensions(&self) -> Option<&SuspensionsPack> {
        self.suspensions.as_ref().and_then(Option::as_ref)
    }

    fn invalidate(&mut self, invalidation: Invalidation) {
        if invalidation.contains(Invalidation::WHEELS) {
            self.wheels = None;
        }

        if invalidation.contains(Invalidation::SUSPENSIONS) {
            self.suspensions = None;
        }

        if invalidation.contains(Invalidation::STEER_LOCK) {
            self.steer_lock = None;
        }

        if invalidation.contains(Invalidation::BLURRED_OBJECTS) {
            self.blurred = None;
        }

        if invalidation.contains(Invalidation::CAMERAS) {
            self.cameras = None;
        }

        if invalidation.contains(Invalidation::AMBIENT_SHADOWS) {
            self.shadow_sizes = None;
        }

        if invalidation.contains(Invalidation::ENGINE) {
            self.engine_range = None;
        }
    }
}

pub struct CarModel {
    data: Arc<dyn CarData>,
    mesh_source: Arc<dyn MeshSource>,
    animators: Arc<dyn AnimatorFactory>,
    audio: Option<Box<dyn CarAudio>>,
    texture_loader: Arc<TextureLoader>,
    icon_cache: Option<Arc<IconCache>>,
    car_directory: PathBuf,
    content_root: PathBuf,
    settings: ShowroomSettings,
    shadows_height: f32,
    scene: LodScene,
    lods: LodTable,
    transform: Matrix4<f32>,
    ground_offset: f32,
    data_to_model: Matrix4<f32>,
    mirrors: Vec<String>,
    cache: DataCache,
    skins: SkinSet,
    skin_pending: bool,
    textures: TexturesProvider,
    suspension_modifiers: SuspensionModifiers,
    show_suspension_travel: bool,
    steering: SteeringState,
    rolling: WheelsState,
    cockpit_lr: bool,
    seatbelt_on: Option<bool>,
    lights: LightsState,
    shadows: AmbientShadows,
    debug_lines: DebugLines,
    driver: DriverState,
    crew: CrewState,
    sound: SoundEmitters,
    debouncer: Arc<ReloadDebouncer>,
    watch_files: bool,
    skins_watcher: ResourceState<ReloadWatcher, notify::Error>,
    data_watcher: ResourceState<ReloadWatcher, notify::Error>,
    counters: ReloadCounters,
}

impl CarModel {
    /// Creates a car from its initially loaded tree, which becomes the first
    /// level of detail. The car is lifted so that its wheels touch the
    /// ground.
    pub fn new(
        model: Arc<ModelData>,
        transform: Matrix4<f32>,
        options: CarModelOptions,
        dependencies: CarModelDependencies,
        settings: ShowroomSettings,
    ) -> Self {
        #[cfg(feature = "debug")]
        let timer = Timer::new_dynamic(format!("create car model {}", options.car_directory.display().magenta()));

        let CarModelDependencies {
            data,
            mesh_source,
            animators,
            audio,
            texture_loader,
            icon_cache,
            grip_solver,
        } = dependencies;

        let mirrors = data.mirror_names();
        let scene = build_scene(&model, &mirrors);
        let lods = LodTable::new(data.lods(), model);

        let skins_root = options.skins_root.clone().unwrap_or_else(|| options.car_directory.join("skins"));
        let mut skins = SkinSet::new(skins_root);

        if options.scan_for_skins {
            skins.scan();
            skins.select(Some(options.initial_skin.as_deref().unwrap_or_default()));
        }

        let debouncer = Arc::new(ReloadDebouncer::new(Duration::from_millis(settings.reload_debounce_ms)));
        let sound = SoundEmitters::new(&data.sound_emitters());
        let offset = ground_offset(&scene.tree);

        let mut car = Self {
            textures: TexturesProvider::new(texture_loader.clone(), options.async_textures),
            shadows: AmbientShadows::new(options.car_directory.clone()),
            data,
            mesh_source,
            animators,
            audio,
            texture_loader,
            icon_cache,
            car_directory: options.car_directory,
            content_root: options.content_root,
            settings,
            shadows_height: options.shadows_height,
            scene,
            lods,
            transform,
            ground_offset: offset,
            data_to_model: Matrix4::identity(),
            mirrors,
            cache: DataCache::default(),
            skins,
            skin_pending: true,
            suspension_modifiers: SuspensionModifiers::default(),
            show_suspension_travel: false,
            steering: SteeringState::default(),
            rolling: WheelsState::default(),
            cockpit_lr: false,
            seatbelt_on: None,
            lights: LightsState::default(),
            debug_lines: DebugLines::default(),
            driver: DriverState::new(grip_solver),
            crew: CrewState::default(),
            sound,
            debouncer,
            watch_files: options.watch_files,
            skins_watcher: ResourceState::Unloaded,
            data_watcher: ResourceState::Unloaded,
            counters: ReloadCounters::default(),
        };

        car.attach_scene(false);

        #[cfg(feature = "debug")]
        timer.stop();

        car
    }

    /// Rebinds every subsystem after the active tree changed.
    fn attach_scene(&mut self, reposition: bool) {
        if reposition {
            self.ground_offset = ground_offset(&self.scene.tree);
        }

        let root = self.scene.tree.root();
        self.data_to_model = self.scene.tree.model_matrix(root);
        self.debug_lines.invalidate(Invalidation::all());
        self.apply_transform();
        self.lights.apply(&mut self.scene.tree);
        self.refresh_pose();
    }

    fn apply_transform(&mut self) {
        let lift = Matrix4::from_translation(Vector3::new(0.0, self.ground_offset, 0.0));
        self.scene.tree.set_transform(self.transform * lift);
    }

    fn placement(&self) -> WheelPlacement<'_> {
        WheelPlacement {
            wheels: self.cache.wheels(),
            steering: &self.steering,
            rolling: &self.rolling,
            align_by_data: self.settings.align_wheels_by_data,
            suspension_travel: self.show_suspension_travel,
            data_to_model: self.data_to_model,
        }
    }

    /// Moves every procedurally placed node to match the current state.
    fn refresh_pose(&mut self) {
        self.cache.fill(self.data.as_ref(), &self.suspension_modifiers);

        let centers = self.placement().front_centers(&self.scene.tree);
        self.steering
            .solve(self.cache.suspensions(), &self.data_to_model, centers, &self.settings.steering);

        let placement = WheelPlacement {
            wheels: self.cache.wheels(),
            steering: &self.steering,
            rolling: &self.rolling,
            align_by_data: self.settings.align_wheels_by_data,
            suspension_travel: self.show_suspension_travel,
            data_to_model: self.data_to_model,
        };
        placement.apply(&mut self.scene.tree);

        let degrees = steering_wheel_degrees(
            self.steering.angle(),
            self.cache.steer_lock.unwrap_or_default(),
            &self.settings.steering,
        );
        apply_steering_wheel(&mut self.scene.tree, degrees);

        let speed = self.settings.align_wheels_by_data.then_some(self.rolling.speed());
        apply_blurred_objects(&mut self.scene.tree, self.cache.blurred.as_deref().unwrap_or_default(), speed);

        self.apply_switches();
        self.pose_attachments();
    }

    fn apply_switches(&mut self) {
        let tree = &mut self.scene.tree;

        for (high, low) in [
            (NodeRole::CockpitHr, NodeRole::CockpitLr),
            (NodeRole::SteerWheelHr, NodeRole::SteerWheelLr),
        ] {
            if let (Some(high), Some(low)) = (tree.role(high), tree.role(low)) {
                tree.set_enabled(high, !self.cockpit_lr);
                tree.set_enabled(low, self.cockpit_lr);
            }
        }

        if let Some(on) = self.seatbelt_on {
            if let Some(key) = tree.role(NodeRole::SeatbeltOn) {
                tree.set_enabled(key, on);
            }

            if let Some(key) = tree.role(NodeRole::SeatbeltOff) {
                tree.set_enabled(key, !on);
            }
        }
    }

    fn pose_attachments(&mut self) {
        self.driver
            .ensure_loaded(self.data.as_ref(), self.mesh_source.as_ref(), &self.car_directory, &self.content_root);
        self.driver.attach(&mut self.scene.tree, &mut self.scene.attachments.driver);
        self.driver.update_grip(
            &mut self.scene.tree,
            self.scene.attachments.driver,
            self.cockpit_lr,
            &self.settings.grip,
        );

        self.crew.ensure_loaded(self.mesh_source.as_ref(), &self.content_root);
        self.crew.attach(&mut self.scene.tree, &mut self.scene.attachments.crew);
    }

    fn arm_watchers(&mut self) {
        if !self.watch_files {
            return;
        }

        if self.skins_watcher.is_unloaded() && !self.skins.is_empty() {
            let result = ReloadWatcher::new(self.skins.root(), WatchTarget::Skins, self.debouncer.clone());

            if let Err(_error) = &result {
                #[cfg(feature = "debug")]
                print_debug!("[{}] failed to watch skins: {}", "error".red(), _error);
            }

            self.skins_watcher.finish(result);
        }

        let data_directory = self.data.data_directory();

        if self.data_watcher.is_unloaded() && data_directory.is_dir() {
            let result = ReloadWatcher::new(&data_directory, WatchTarget::Data, self.debouncer.clone());

            if let Err(_error) = &result {
                #[cfg(feature = "debug")]
                print_debug!("[{}] failed to watch data: {}", "error".red(), _error);
            }

            self.data_watcher.finish(result);
        }
    }

    /// Appends the instructions of one pass. The first draw after a skin
    /// change switches the texture overrides.
    pub fn draw(&mut self, camera: &dyn Camera, mode: DrawMode, instructions: &mut CarInstructions) {
        if std::mem::take(&mut self.skin_pending) {
            self.textures.set_override_directory(self.skins.override_directory());
        }

        self.textures.poll();
        self.arm_watchers();
        self.cache.fill(self.data.as_ref(), &self.suspension_modifiers);

        instructions.mode = Some(mode);

        let tree = &self.scene.tree;
        let lod_distance = camera.distance_to(matrix_translation(&tree.transform()));
        let materials = self.lods.materials(&self.texture_loader);
        let provider = &mut self.textures;
        let models = &mut instructions.models;

        tree.visit_drawables(|key, drawable| {
            let mirror = drawable.flags.contains(DrawableFlags::MIRROR);
            let material = match mirror {
                true => materials.map(MaterialsProvider::mirror_material),
                false => materials.and_then(|materials| materials.material(drawable.material_id)),
            };

            let transparent = drawable.flags.contains(DrawableFlags::TRANSPARENT) || material.is_some_and(|material| material.transparent);

            let included = match mode {
                DrawMode::Opaque => !transparent,
                DrawMode::Transparent => transparent,
                DrawMode::Shadow => drawable.flags.contains(DrawableFlags::CASTS_SHADOW),
                DrawMode::Reflection => drawable.flags.contains(DrawableFlags::REFLECTABLE) && !mirror,
            };

            if !included || !drawable.in_lod_range(lod_distance) {
                return;
            }

            let model_matrix = tree.world_matrix(key);
            let textures = material
                .map(|material| material.textures.iter().map(|name| provider.resolve(name, materials)).collect())
                .unwrap_or_default();

            let bone_matrices = match drawable.is_skinned() {
                true => tree.bone_matrices(key),
                false => Vec::new(),
            };

            models.push(ModelInstruction {
                model_matrix,
                node: key,
                material_id: drawable.material_id,
                textures,
                bone_matrices,
                emissive: drawable.emissive,
                distance: camera.distance_to(matrix_translation(&model_matrix)),
                transparent,
                mirror,
            });
        });

        match mode {
            DrawMode::Transparent => {
                let (body_size, wheel_size) = self.cache.shadow_sizes.unwrap_or_default();
                let frame = ShadowFrame {
                    tree: &self.scene.tree,
                    bounds: self.scene.body_bounds(),
                    wheels: self.cache.wheels(),
                    steering: &self.steering,
                    body_size,
                    wheel_size,
                    height: self.shadows_height,
                };

                self.shadows.emit(&frame, &self.texture_loader, &mut instructions.shadows);
            }
            DrawMode::Opaque if !self.settings.debug_overlays.is_empty() => {
                let source = DebugSource {
                    data: self.data.as_ref(),
                    pack: self.cache.suspensions(),
                    wheels: self.cache.wheels(),
                    suspension_travel: self.show_suspension_travel,
                    data_to_model: self.data_to_model,
                };

                self.debug_lines.emit(
                    self.settings.debug_overlays,
                    &source,
                    &self.scene.tree.transform(),
                    &mut instructions.debug_lines,
                );
            }
            _ => {}
        }
    }

    /// Per frame update. Runs due reloads, advances animations and wheel
    /// rolling, and forwards the emitter positions to the audio engine.
    pub fn update(&mut self, delta_time: f32, now: Instant) {
        for request in self.debouncer.take_due(now) {
            match request {
                ReloadRequest::Data(file_name) => self.on_data_changed(file_name.as_deref()),
                ReloadRequest::Skins => self.rescan_skins(),
            }
        }

        self.textures.poll();
        self.lights.update(&mut self.scene.tree, delta_time);

        if self.settings.align_wheels_by_data && self.rolling.speed() != 0.0 {
            self.rolling.advance(self.cache.wheels(), delta_time);
            self.refresh_pose();
        } else if self.driver.is_visible() || self.crew.is_visible() {
            self.pose_attachments();
        }

        if let Some(audio) = self.audio.as_mut() {
            self.sound.update(
                audio.as_mut(),
                &self.scene.tree.transform(),
                delta_time,
                self.settings.sound.velocity_time_constant,
            );
        }
    }

    fn rescan_skins(&mut self) {
        self.skins.scan();
        self.textures.reload_overrides();
        self.skin_pending = true;
    }

    /// Selects a skin by id, ignoring case. [`None`] disables the skin
    /// override. The textures switch on the next draw.
    pub fn select_skin(&mut self, id: Option<&str>) {
        if self.skins.select(id) {
            self.skin_pending = true;
        }
    }

    pub fn selected_skin(&self) -> Option<&str> {
        self.skins.selected_id()
    }

    pub fn skins(&self) -> &[String] {
        self.skins.ids()
    }

    /// Directory the skin textures are currently read from.
    pub fn texture_override_directory(&self) -> Option<&Path> {
        self.textures.override_directory()
    }

    pub fn set_lod(&mut self, index: usize) -> Result<(), CarModelError> {
        let available = self.lods.count();

        if index >= available {
            return Err(CarModelError::InvalidLod { index, available });
        }

        if index == self.lods.current() {
            return Ok(());
        }

        let scene = match self.lods.take_parked(index) {
            Some(scene) => scene,
            None => {
                let model = self
                    .lods
                    .load(index, self.mesh_source.as_ref(), &self.car_directory)
                    .ok_or(CarModelError::InvalidLod { index, available })??;

                build_scene(&model, &self.mirrors)
            }
        };

        #[cfg(feature = "debug")]
        print_debug!("switching to level of detail {}", index.to_string().magenta());

        let previous = std::mem::replace(&mut self.scene, scene);
        self.lods.switch(index, previous);
        self.attach_scene(self.settings.reposition_on_lod_change);

        Ok(())
    }

    pub fn current_lod(&self) -> usize {
        self.lods.current()
    }

    pub fn lods_count(&self) -> usize {
        self.lods.count()
    }

    pub fn set_steer_angle(&mut self, degrees: f32) {
        if self.steering.set_angle(degrees, &self.settings.steering) {
            self.refresh_pose();
        }
    }

    pub fn steer_angle(&self) -> f32 {
        self.steering.angle()
    }

    /// Number of times the steering kinematics were recomputed.
    pub fn steering_updates(&self) -> u64 {
        self.steering.updates()
    }

    /// Sets the speed the wheels roll at. Only has an effect while the wheels
    /// are aligned by data.
    pub fn set_wheels_speed(&mut self, speed_kph: f32) {
        if self.rolling.speed() == speed_kph {
            return;
        }

        self.rolling.set_speed(speed_kph);

        if self.settings.align_wheels_by_data {
            self.refresh_pose();
        }
    }

    pub fn set_align_wheels_by_data(&mut self, align: bool) {
        if self.settings.align_wheels_by_data == align {
            return;
        }

        self.settings.align_wheels_by_data = align;

        if !align {
            self.rolling.reset();
        }

        self.refresh_pose();
    }

    pub fn set_reposition_on_lod_change(&mut self, reposition: bool) {
        self.settings.reposition_on_lod_change = reposition;
    }

    fn set_light(&mut self, kind: LightKind, enabled: bool) {
        let source = LightsSource {
            data: self.data.as_ref(),
            animators: self.animators.as_ref(),
            car_directory: &self.car_directory,
        };

        if self.lights.set(kind, enabled, &source) {
            self.lights.apply(&mut self.scene.tree);
        }
    }

    pub fn set_headlights(&mut self, enabled: bool) {
        self.set_light(LightKind::Headlight, enabled);
    }

    pub fn set_brake_lights(&mut self, enabled: bool) {
        self.set_light(LightKind::Brake, enabled);
    }

    pub fn set_cockpit_lr_active(&mut self, active: bool) {
        if self.cockpit_lr != active {
            self.cockpit_lr = active;
            self.refresh_pose();
        }
    }

    pub fn set_seatbelt_on(&mut self, on: bool) {
        if self.seatbelt_on != Some(on) {
            self.seatbelt_on = Some(on);
            self.apply_switches();
        }
    }

    pub fn set_driver_visible(&mut self, visible: bool) {
        if self.driver.is_visible() != visible {
            self.driver.set_visible(visible);
            self.pose_attachments();
        }
    }

    pub fn set_crew_visible(&mut self, visible: bool) {
        if self.crew.is_visible() != visible {
            self.crew.set_visible(visible);
            self.pose_attachments();
        }
    }

    pub fn set_suspension_modifiers(&mut self, modifiers: SuspensionModifiers) {
        if self.suspension_modifiers == modifiers {
            return;
        }

        self.suspension_modifiers = modifiers;
        self.cache.invalidate(Invalidation::WHEELS);
        self.debug_lines.invalidate_wheels();
        self.refresh_pose();
    }

    pub fn set_show_suspension_travel(&mut self, show: bool) {
        if self.show_suspension_travel != show {
            self.show_suspension_travel = show;
            self.debug_lines.invalidate_wheels();
            self.refresh_pose();
        }
    }

    pub fn set_debug_overlays(&mut self, overlays: DebugOverlays) {
        self.settings.debug_overlays = overlays;
    }

    /// Places the car in the world. The ground offset is applied on top.
    /// The move is treated as a jump, so sound emitters start tracking their
    /// velocity again from rest.
    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
        self.apply_transform();
        self.sound.reset();
    }

    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    /// Rebuilds what was derived from a changed data file. [`None`] rebuilds
    /// everything.
    pub fn on_data_changed(&mut self, file_name: Option<&str>) {
        let invalidation = invalidation_for(file_name);

        #[cfg(feature = "debug")]
        print_debug!(
            "data file {} changed, invalidating {:?}",
            file_name.unwrap_or("*").magenta(),
            invalidation
        );

        if invalidation.is_empty() {
            return;
        }

        self.counters.record(invalidation);
        self.cache.invalidate(invalidation);
        self.debug_lines.invalidate(invalidation);

        if invalidation.contains(Invalidation::SUSPENSIONS) {
            self.steering.reset_reports();
        }

        if invalidation.contains(Invalidation::AMBIENT_SHADOWS) {
            self.shadows.reset();
        }

        if invalidation.intersects(Invalidation::LIGHTS | Invalidation::LIGHT_ANIMATIONS) {
            self.lights.invalidate(
                invalidation.contains(Invalidation::LIGHTS),
                invalidation.contains(Invalidation::LIGHT_ANIMATIONS),
            );

            let source = LightsSource {
                data: self.data.as_ref(),
                animators: self.animators.as_ref(),
                car_directory: &self.car_directory,
            };

            self.lights.ensure_loaded(&source);
            self.lights.apply(&mut self.scene.tree);
        }

        if invalidation.contains(Invalidation::DRIVER) {
            self.driver.reset();
            DriverState::detach(&mut self.scene.tree, &mut self.scene.attachments.driver);

            for scene in self.lods.parked_mut() {
                DriverState::detach(&mut scene.tree, &mut scene.attachments.driver);
            }
        }

        if invalidation.contains(Invalidation::CREW) {
            self.crew.reset();
            CrewState::detach(&mut self.scene.tree, &mut self.scene.attachments.crew);

            for scene in self.lods.parked_mut() {
                CrewState::detach(&mut scene.tree, &mut scene.attachments.crew);
            }
        }

        if invalidation.contains(Invalidation::MIRRORS) {
            self.mirrors = self.data.mirror_names();

            for name in &self.mirrors {
                if let Some(key) = self.scene.tree.find(name) {
                    self.scene.tree.set_mirror(key);
                }
            }
        }

        if invalidation.contains(Invalidation::ENGINE) {
            self.sound.set_offsets(&self.data.sound_emitters());
        }

        if invalidation.contains(Invalidation::LODS) {
            if let Some(target) = self.lods.reload(self.data.lods()) {
                self.reload_current_lod(target);
            }
        }

        self.refresh_pose();
    }

    /// Replaces the active tree after the level of detail list changed. Falls
    /// back to the initial tree if the level can not be read.
    fn reload_current_lod(&mut self, target: usize) {
        let scene = match self.lods.load(target, self.mesh_source.as_ref(), &self.car_directory) {
            Some(Ok(model)) => build_scene(&model, &self.mirrors),
            _ => {
                self.lods.force_current(0);

                match self.lods.take_parked(0) {
                    Some(scene) => scene,
                    None => match self.lods.load(0, self.mesh_source.as_ref(), &self.car_directory) {
                        Some(Ok(model)) => build_scene(&model, &self.mirrors),
                        _ => return,
                    },
                }
            }
        };

        self.scene = scene;
        self.attach_scene(self.settings.reposition_on_lod_change);
    }

    /// Handle that lets other threads report changed data files. The reload
    /// runs on the next [`update`](Self::update) once the debounce delay
    /// passed.
    pub fn data_changed_handle(&self) -> DataChangedHandle {
        DataChangedHandle::new(self.debouncer.clone())
    }

    pub fn invalidation_counters(&self) -> &ReloadCounters {
        &self.counters
    }

    /// World transform of an extra camera. The camera looks along its local Z
    /// axis.
    pub fn camera_matrix(&mut self, index: usize) -> Option<Matrix4<f32>> {
        self.cache.fill(self.data.as_ref(), &self.suspension_modifiers);

        let camera = self.cache.cameras.as_ref()?.get(index)?;
        let rotation = look_rotation(camera.look, camera.up)?;
        let local = Matrix4::from_translation(Vector3::new(camera.position.x, camera.position.y, camera.position.z)) * Matrix4::from(rotation);

        Some(self.scene.tree.transform() * self.data_to_model * local)
    }

    pub fn set_engine_state(&mut self, rpm: f32, throttle: f32, external: bool) {
        self.cache.fill(self.data.as_ref(), &self.suspension_modifiers);

        let (minimum, maximum) = self.cache.engine_range.unwrap_or((0.0, f32::MAX));
        let state = EngineState::clamped(rpm, throttle, external, minimum, maximum);

        if let Some(audio) = self.audio.as_mut() {
            audio.engine(state.external, state.rpm, state.throttle);
        }
    }

    pub fn set_turbo(&mut self, value: Option<f32>) {
        if let Some(audio) = self.audio.as_mut() {
            audio.turbo(value);
        }
    }

    pub fn set_limiter(&mut self, value: Option<f32>) {
        if let Some(audio) = self.audio.as_mut() {
            audio.limiter(value);
        }
    }

    pub fn set_horn(&mut self, active: bool) {
        if let Some(audio) = self.audio.as_mut() {
            audio.horn(active);
        }
    }

    /// Texture as it would be drawn right now, including skin and procedural
    /// overrides.
    pub fn get_texture(&mut self, name: &str) -> Option<Arc<Texture>> {
        let materials = self.lods.materials(&self.texture_loader);
        self.textures.resolve(name, materials)
    }

    /// Replaces a texture until the procedural overrides are cleared. Encoded
    /// bytes are decoded first.
    pub fn override_texture(&mut self, name: &str, texture: TextureOverride) -> Result<(), CarModelError> {
        let texture = match texture {
            TextureOverride::Bytes(bytes) => self.texture_loader.decode(name, &bytes)?,
            TextureOverride::View(texture) => texture,
        };

        self.textures.override_texture(name, texture);
        Ok(())
    }

    pub fn clear_procedural_overrides(&mut self) {
        self.textures.clear_procedural_overrides();
    }

    /// Brand badge of the car from the shared icon cache. Returns [`None`]
    /// until the icon is decoded.
    pub fn badge_icon(&self) -> Option<Arc<Texture>> {
        let icon_cache = self.icon_cache.as_ref()?;
        icon_cache.request(&self.car_directory.join("ui").join("badge.png"))
    }

    /// Model space bounds of the active tree.
    pub fn root_bounding_box(&self) -> AABB {
        self.scene.tree.root_bounding_box()
    }

    /// Height the model is lifted by so that its wheels touch the ground.
    pub fn ground_offset(&self) -> f32 {
        self.ground_offset
    }

    pub fn scene(&self) -> &SceneTree {
        &self.scene.tree
    }

    pub fn set_grip_solver(&mut self, solver: Box<dyn DriverGripSolver>) {
        self.driver.set_solver(solver);
        self.pose_attachments();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use cgmath::{Matrix4, Point3, SquareMatrix, Vector3, assert_relative_eq};
    use showroom_util::math::matrix_translation;

    use crate::car::fixtures::{
        FixtureAnimatorFactory, FixtureAudio, FixtureData, FixtureMeshSource, ScratchDirectory, fixture_model,
    };
    use crate::car::{CarModel, CarModelDependencies, CarModelError, CarModelOptions, Invalidation, NoGripSolver};
    use crate::graphics::{CarInstructions, DrawMode, FixedCamera, Texture};
    use crate::loaders::TextureLoader;
    use crate::materials::TextureOverride;
    use crate::scene::SceneTree;
    use crate::settings::{DebugOverlays, ShowroomSettings};

    struct Fixture {
        car: CarModel,
        data: Arc<FixtureData>,
        meshes: Arc<FixtureMeshSource>,
        audio: FixtureAudio,
    }

    fn fixture_with(data: FixtureData, meshes: FixtureMeshSource, settings: ShowroomSettings) -> Fixture {
        let data = Arc::new(data);
        let meshes = Arc::new(meshes);
        let audio = FixtureAudio::default();

        let mut options = CarModelOptions::new(data.car_directory().to_path_buf(), data.content_root().to_path_buf(), &settings);
        options.async_textures = false;
        options.watch_files = false;

        let dependencies = CarModelDependencies {
            data: data.clone(),
            mesh_source: meshes.clone(),
            animators: Arc::new(FixtureAnimatorFactory::default()),
            audio: Some(Box::new(audio.clone())),
            texture_loader: Arc::new(TextureLoader::new(1).unwrap()),
            icon_cache: None,
            grip_solver: Box::new(NoGripSolver),
        };

        let car = CarModel::new(Arc::new(fixture_model(true)), Matrix4::identity(), options, dependencies, settings);

        Fixture { car, data, meshes, audio }
    }

    fn fixture() -> Fixture {
        fixture_with(FixtureData::default(), FixtureMeshSource::default(), ShowroomSettings::default())
    }

    fn camera() -> FixedCamera {
        FixedCamera::new(Point3::new(0.0, 1.0, 6.0), Matrix4::identity(), Matrix4::identity())
    }

    fn drawn_names(car: &mut CarModel, mode: DrawMode) -> Vec<String> {
        let mut instructions = CarInstructions::default();
        car.draw(&camera(), mode, &mut instructions);

        instructions
            .models
            .iter()
            .map(|model| car.scene().get(model.node).unwrap().name().to_owned())
            .collect()
    }

    fn world_minimum_y(car: &CarModel) -> f32 {
        car.root_bounding_box().transformed(&car.scene().transform()).min().y
    }

    fn wheel_model(tree: &SceneTree) -> Matrix4<f32> {
        tree.model_matrix(tree.find("WHEEL_LF").unwrap())
    }

    #[test]
    fn test_car_rests_on_its_wheels() {
        let fixture = fixture();

        assert_relative_eq!(fixture.car.ground_offset(), 0.05, epsilon = 1e-5);
        assert_relative_eq!(world_minimum_y(&fixture.car), 0.0, epsilon = 1e-5);
        assert_eq!(fixture.car.lods_count(), 3);
        assert_eq!(fixture.car.current_lod(), 0);
    }

    #[test]
    fn test_steering_is_idempotent() {
        let mut fixture = fixture();
        let straight = wheel_model(fixture.car.scene());

        fixture.car.set_steer_angle(12.34);
        assert_eq!(fixture.car.steering_updates(), 1);
        assert_relative_eq!(fixture.car.steer_angle(), 12.3, epsilon = 1e-4);

        let steered = wheel_model(fixture.car.scene());
        assert!(steered != straight);

        fixture.car.set_steer_angle(12.3);
        assert_eq!(fixture.car.steering_updates(), 1);
        assert_relative_eq!(wheel_model(fixture.car.scene()), steered);

        fixture.car.set_steer_angle(60.0);
        fixture.car.set_steer_angle(70.0);
        assert_eq!(fixture.car.steering_updates(), 2);
        assert_relative_eq!(fixture.car.steer_angle(), 50.0, epsilon = 1e-4);

        fixture.car.set_steer_angle(0.0);
        assert_relative_eq!(wheel_model(fixture.car.scene()), straight, epsilon = 1e-5);
    }

    #[test]
    fn test_lod_switch_preserves_placement() {
        let mut fixture = fixture();
        let placement = fixture.car.scene().transform();

        fixture.car.set_lod(1).unwrap();

        assert_eq!(fixture.car.current_lod(), 1);
        assert!(fixture.car.scene().root_bounding_box().is_valid());
        assert_relative_eq!(fixture.car.scene().transform(), placement);
        assert!(world_minimum_y(&fixture.car) < -0.05);

        fixture.car.set_lod(0).unwrap();
        assert_eq!(fixture.meshes.loads(), 1);

        fixture.car.set_lod(1).unwrap();
        assert_eq!(fixture.meshes.loads(), 1);
    }

    #[test]
    fn test_lod_switch_repositions() {
        let settings = ShowroomSettings {
            reposition_on_lod_change: true,
            ..ShowroomSettings::default()
        };
        let mut fixture = fixture_with(FixtureData::default(), FixtureMeshSource::default(), settings);

        fixture.car.set_lod(1).unwrap();
        assert_relative_eq!(fixture.car.ground_offset(), 0.15, epsilon = 1e-5);
        assert!(world_minimum_y(&fixture.car) >= -1e-5);

        // The last level of detail has no wheel nodes.
        fixture.car.set_lod(2).unwrap();
        assert!(fixture.car.scene().find("WHEEL_LF").is_none());
        assert_relative_eq!(fixture.car.ground_offset(), -0.1, epsilon = 1e-5);
        assert!(world_minimum_y(&fixture.car) >= -1e-5);
    }

    #[test]
    fn test_invalid_lod_is_an_error() {
        let mut fixture = fixture_with(
            FixtureData::default(),
            FixtureMeshSource::default().without("car_lod_b.kn5"),
            ShowroomSettings::default(),
        );

        assert_eq!(
            fixture.car.set_lod(3),
            Err(CarModelError::InvalidLod { index: 3, available: 3 })
        );
        assert!(matches!(fixture.car.set_lod(1), Err(CarModelError::Load(_))));
        assert_eq!(fixture.car.current_lod(), 0);
    }

    #[test]
    fn test_skin_round_trip() {
        let directory = ScratchDirectory::new("car-skins");
        let car_directory = directory.path().join("car");

        for skin in ["red", "blue"] {
            std::fs::create_dir_all(car_directory.join("skins").join(skin)).unwrap();
        }

        let data = FixtureData {
            car_directory: car_directory.clone(),
            ..FixtureData::default()
        };
        let mut fixture = fixture_with(data, FixtureMeshSource::default(), ShowroomSettings::default());
        let skins = car_directory.join("skins");

        assert_eq!(fixture.car.skins(), ["blue".to_owned(), "red".to_owned()]);
        assert_eq!(fixture.car.selected_skin(), Some("blue"));
        assert_eq!(fixture.car.texture_override_directory(), None);

        fixture.car.select_skin(Some("RED"));
        drawn_names(&mut fixture.car, DrawMode::Opaque);
        let first = fixture.car.texture_override_directory().map(|path| path.to_path_buf());
        assert_eq!(first, Some(skins.join("red")));

        fixture.car.select_skin(Some("blue"));
        drawn_names(&mut fixture.car, DrawMode::Opaque);
        assert_eq!(fixture.car.texture_override_directory(), Some(skins.join("blue").as_path()));

        fixture.car.select_skin(Some("red"));
        drawn_names(&mut fixture.car, DrawMode::Opaque);
        assert_eq!(fixture.car.texture_override_directory().map(|path| path.to_path_buf()), first);

        fixture.car.select_skin(Some("unknown"));
        assert_eq!(fixture.car.selected_skin(), Some("red"));

        fixture.car.select_skin(None);
        drawn_names(&mut fixture.car, DrawMode::Opaque);
        assert_eq!(fixture.car.texture_override_directory(), None);
    }

    #[test]
    fn test_draw_modes_filter_drawables() {
        let mut fixture = fixture();

        let opaque = drawn_names(&mut fixture.car, DrawMode::Opaque);
        assert!(opaque.contains(&"BODY".to_owned()));
        assert!(opaque.contains(&"MIRROR_L".to_owned()));
        assert!(!opaque.contains(&"GLASS".to_owned()));
        assert!(!opaque.contains(&"RIM_BLUR_LF".to_owned()));
        assert!(!opaque.contains(&"COCKPIT_LR".to_owned()));

        let transparent = drawn_names(&mut fixture.car, DrawMode::Transparent);
        assert_eq!(transparent, vec!["GLASS".to_owned()]);

        let reflection = drawn_names(&mut fixture.car, DrawMode::Reflection);
        assert!(reflection.contains(&"BODY".to_owned()));
        assert!(!reflection.contains(&"MIRROR_L".to_owned()));

        let mut instructions = CarInstructions::default();
        fixture.car.draw(&camera(), DrawMode::Opaque, &mut instructions);

        let mirror = instructions
            .models
            .iter()
            .find(|model| fixture.car.scene().get(model.node).unwrap().name() == "MIRROR_L")
            .unwrap();
        assert!(mirror.mirror);
        assert!(mirror.textures.is_empty());

        let body = instructions
            .models
            .iter()
            .find(|model| fixture.car.scene().get(model.node).unwrap().name() == "BODY")
            .unwrap();
        assert_eq!(body.textures.len(), 1);
        assert!(body.textures[0].is_some());
        assert_eq!(instructions.mode, Some(DrawMode::Opaque));
        assert!(instructions.debug_lines.is_empty());
    }

    #[test]
    fn test_debug_overlays_are_drawn() {
        let mut fixture = fixture();
        fixture.car.set_debug_overlays(DebugOverlays::FUEL_TANK | DebugOverlays::COLLIDERS);

        let mut instructions = CarInstructions::default();
        fixture.car.draw(&camera(), DrawMode::Opaque, &mut instructions);
        assert_eq!(instructions.debug_lines.len(), 24);

        instructions.clear();
        fixture.car.draw(&camera(), DrawMode::Transparent, &mut instructions);
        assert!(instructions.debug_lines.is_empty());
    }

    #[test]
    fn test_lights_reload_leaves_wheels_alone() {
        let mut fixture = fixture();
        fixture.car.set_headlights(true);

        let wheel_queries = fixture.data.wheel_queries();
        fixture.car.on_data_changed(Some("lights.ini"));

        let counters = fixture.car.invalidation_counters();
        assert_eq!(counters.get(Invalidation::LIGHTS), 1);
        assert_eq!(counters.get(Invalidation::LIGHT_ANIMATIONS), 1);
        assert_eq!(counters.get(Invalidation::SUSPENSIONS), 0);
        assert_eq!(counters.get(Invalidation::WHEELS), 0);
        assert_eq!(fixture.data.wheel_queries(), wheel_queries);
        assert_eq!(fixture.data.light_queries(), 2);

        fixture.car.on_data_changed(None);

        let counters = fixture.car.invalidation_counters();
        assert_eq!(counters.get(Invalidation::LIGHTS), 2);
        assert_eq!(counters.get(Invalidation::SUSPENSIONS), 1);
        assert_eq!(counters.get(Invalidation::WHEELS), 1);
        assert_eq!(counters.get(Invalidation::LODS), 1);
        assert_eq!(fixture.data.wheel_queries(), wheel_queries + 1);

        fixture.car.on_data_changed(Some("readme.txt"));
        assert_eq!(fixture.car.invalidation_counters().get(Invalidation::LIGHTS), 2);
    }

    #[test]
    fn test_data_changes_are_debounced() {
        let mut fixture = fixture();
        let handle = fixture.car.data_changed_handle();

        handle.notify(Some("suspensions.ini"));
        handle.notify(Some("suspensions.ini"));
        fixture.car.update(0.016, Instant::now());
        assert_eq!(fixture.car.invalidation_counters().get(Invalidation::SUSPENSIONS), 0);

        fixture.car.update(0.016, Instant::now() + Duration::from_secs(1));
        assert_eq!(fixture.car.invalidation_counters().get(Invalidation::SUSPENSIONS), 1);
        assert_eq!(fixture.car.invalidation_counters().get(Invalidation::LIGHTS), 0);
    }

    #[test]
    fn test_blurred_rims_follow_speed() {
        let mut fixture = fixture();
        let tree = fixture.car.scene();
        let (rim, blurred) = (tree.find("RIM_LF").unwrap(), tree.find("RIM_BLUR_LF").unwrap());

        fixture.car.set_wheels_speed(80.0);
        assert!(fixture.car.scene().is_enabled(rim));

        fixture.car.set_align_wheels_by_data(true);
        assert!(!fixture.car.scene().is_enabled(rim));
        assert!(fixture.car.scene().is_enabled(blurred));

        fixture.car.set_wheels_speed(20.0);
        assert!(fixture.car.scene().is_enabled(rim));
        assert!(!fixture.car.scene().is_enabled(blurred));

        let before = wheel_model(fixture.car.scene());
        fixture.car.update(0.1, Instant::now());
        assert!(wheel_model(fixture.car.scene()) != before);

        fixture.car.set_align_wheels_by_data(false);
        assert!(fixture.car.scene().is_enabled(rim));
        assert!(!fixture.car.scene().is_enabled(blurred));
    }

    #[test]
    fn test_cockpit_and_seatbelt_switches() {
        let mut fixture = fixture();
        let tree = fixture.car.scene();
        let (high, low) = (tree.find("COCKPIT_HR").unwrap(), tree.find("COCKPIT_LR").unwrap());
        let (on, off) = (tree.find("CINTURE_ON").unwrap(), tree.find("CINTURE_OFF").unwrap());

        assert!(tree.is_enabled(high));
        assert!(!tree.is_enabled(low));

        fixture.car.set_cockpit_lr_active(true);
        assert!(!fixture.car.scene().is_enabled(high));
        assert!(fixture.car.scene().is_enabled(low));

        fixture.car.set_seatbelt_on(false);
        assert!(!fixture.car.scene().is_enabled(on));
        assert!(fixture.car.scene().is_enabled(off));
    }

    #[test]
    fn test_full_reload_retries_missing_crew() {
        let mut fixture = fixture_with(
            FixtureData::default(),
            FixtureMeshSource::default().without("pitcrew.kn5"),
            ShowroomSettings::default(),
        );

        fixture.car.set_crew_visible(true);
        assert!(fixture.car.scene().find("CREW:pitcrew").is_none());

        fixture.car.set_lod(1).unwrap();
        fixture.meshes.restore("pitcrew.kn5");
        fixture.car.on_data_changed(Some("lights.ini"));
        assert!(fixture.car.scene().find("CREW:pitcrew").is_none());

        fixture.car.on_data_changed(None);
        assert!(fixture.car.scene().find("CREW:pitcrew").is_some());

        fixture.car.set_lod(0).unwrap();
        assert!(fixture.car.scene().find("CREW:pitcrew").is_some());
        assert!(fixture.car.scene().find("CREW:helmet").is_some());
    }

    #[test]
    fn test_driver_and_crew_follow_lod() {
        let mut fixture = fixture();

        fixture.car.set_driver_visible(true);
        fixture.car.set_crew_visible(true);
        assert!(fixture.car.scene().find("DRIVER:RIG_HAND_L").is_some());
        assert!(fixture.car.scene().find("CREW:pitcrew").is_some());

        fixture.car.set_lod(1).unwrap();
        assert!(fixture.car.scene().find("DRIVER:RIG_HAND_L").is_some());
        assert!(fixture.car.scene().find("CREW:pitcrew").is_some());

        let driver = fixture.car.scene().find("DRIVER:driver").unwrap();
        fixture.car.set_driver_visible(false);
        assert!(!fixture.car.scene().is_enabled(driver));

        fixture.car.on_data_changed(Some("driver3d.ini"));
        assert!(fixture.car.scene().find("DRIVER:driver").is_none());
    }

    #[test]
    fn test_engine_state_is_forwarded() {
        let mut fixture = fixture();

        fixture.car.set_engine_state(12000.0, 1.5, true);
        fixture.car.set_turbo(Some(0.4));
        fixture.car.set_horn(true);
        fixture.car.update(0.1, Instant::now());

        let log = fixture.audio.log();
        assert_eq!(log.engine, Some((true, 8000.0, 1.0)));
        assert_eq!(log.turbo, Some(Some(0.4)));
        assert_eq!(log.horn, Some(true));
        assert_eq!(log.position_updates, 3);
    }

    #[test]
    fn test_moved_car_does_not_report_velocity() {
        let mut fixture = fixture();
        let start = Instant::now();

        fixture.car.update(0.1, start);
        fixture.car.set_transform(Matrix4::from_translation(Vector3::new(500.0, 0.0, 0.0)));
        fixture.car.update(0.1, start + Duration::from_millis(100));

        let car = fixture.audio.log().car.unwrap();
        assert_relative_eq!(car.velocity, Vector3::new(0.0, 0.0, 0.0));
        assert!(car.position.x > 400.0);
    }

    #[test]
    fn test_camera_matrix() {
        let mut fixture = fixture();
        fixture.car.set_transform(Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0)));

        let camera = fixture.car.camera_matrix(0).unwrap();
        assert_relative_eq!(matrix_translation(&camera), Point3::new(2.0, 1.35, 0.5), epsilon = 1e-5);
        assert_relative_eq!(camera.z.truncate(), Vector3::unit_z(), epsilon = 1e-5);
        assert!(fixture.car.camera_matrix(1).is_none());
    }

    #[test]
    fn test_procedural_overrides() {
        let mut fixture = fixture();
        let red = Arc::new(Texture::solid("red", [255, 0, 0, 255]));

        let base = fixture.car.get_texture("paint.png").unwrap();

        fixture
            .car
            .override_texture("PAINT.png", TextureOverride::View(red.clone()))
            .unwrap();
        assert!(Arc::ptr_eq(&fixture.car.get_texture("paint.png").unwrap(), &red));

        fixture.car.clear_procedural_overrides();
        assert!(Arc::ptr_eq(&fixture.car.get_texture("paint.png").unwrap(), &base));

        assert!(matches!(
            fixture.car.override_texture("paint.png", TextureOverride::Bytes(vec![1, 2, 3])),
            Err(CarModelError::Load(_))
        ));
        assert!(fixture.car.badge_icon().is_none());
    }
}
