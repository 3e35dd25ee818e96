//! Maps edited data files to the cached state derived from them.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use bitflags::bitflags;
use hashbrown::HashMap;

bitflags! {
    /// Cached state of a car that is rebuilt after a data file changed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Invalidation: u32 {
        const SUSPENSIONS = 1 << 0;
        const WHEELS = 1 << 1;
        const SUSPENSION_LINES = 1 << 2;
        const WHEEL_CONTOUR_LINES = 1 << 3;
        const AMBIENT_SHADOWS = 1 << 4;
        const LIGHTS = 1 << 5;
        const LIGHT_ANIMATIONS = 1 << 6;
        const FUEL_TANK_LINES = 1 << 7;
        const STEER_LOCK = 1 << 8;
        const CAMERAS = 1 << 9;
        const COLLIDER_LINES = 1 << 10;
        const WING_LINES = 1 << 11;
        const FLAME_LINES = 1 << 12;
        const DRIVER = 1 << 13;
        const BLURRED_OBJECTS = 1 << 14;
        const MIRRORS = 1 << 15;
        const LODS = 1 << 16;
        const ENGINE = 1 << 17;
        /// No data file describes the crew, so only a full reload reads it
        /// again.
        const CREW = 1 << 18;
    }
}

const FILE_TABLE: &[(&str, Invalidation)] = &[
    (
        "suspensions.ini",
        Invalidation::SUSPENSIONS
            .union(Invalidation::WHEELS)
            .union(Invalidation::SUSPENSION_LINES)
            .union(Invalidation::WHEEL_CONTOUR_LINES)
            .union(Invalidation::AMBIENT_SHADOWS),
    ),
    (
        "tyres.ini",
        Invalidation::SUSPENSIONS
            .union(Invalidation::WHEELS)
            .union(Invalidation::SUSPENSION_LINES)
            .union(Invalidation::WHEEL_CONTOUR_LINES)
            .union(Invalidation::AMBIENT_SHADOWS),
    ),
    ("lights.ini", Invalidation::LIGHTS.union(Invalidation::LIGHT_ANIMATIONS)),
    (
        "car.ini",
        Invalidation::FUEL_TANK_LINES
            .union(Invalidation::WHEEL_CONTOUR_LINES)
            .union(Invalidation::STEER_LOCK)
            .union(Invalidation::CAMERAS),
    ),
    ("cameras.ini", Invalidation::CAMERAS),
    ("colliders.ini", Invalidation::COLLIDER_LINES),
    ("aero.ini", Invalidation::WING_LINES),
    ("flames.ini", Invalidation::FLAME_LINES),
    ("driver3d.ini", Invalidation::DRIVER),
    ("blurred_objects.ini", Invalidation::BLURRED_OBJECTS),
    ("mirrors.ini", Invalidation::MIRRORS),
    ("ambient_shadows.ini", Invalidation::AMBIENT_SHADOWS),
    ("lods.ini", Invalidation::LODS),
    ("engine.ini", Invalidation::ENGINE),
    ("sounds.ini", Invalidation::ENGINE),
];

/// Returns what has to be rebuilt after the given file changed. [`None`]
/// stands for "everything changed". Directories in the name are ignored and
/// unknown files invalidate nothing.
pub fn invalidation_for(file_name: Option<&str>) -> Invalidation {
    let Some(file_name) = file_name else {
        return Invalidation::all();
    };

    let file_name = Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    FILE_TABLE
        .iter()
        .filter(|(name, _)| *name == file_name)
        .fold(Invalidation::empty(), |invalidation, (_, flags)| invalidation | *flags)
}

/// Counts how often each cache was invalidated.
#[derive(Clone, Debug, Default)]
pub struct ReloadCounters {
    counts: HashMap<Invalidation, u32>,
}

impl ReloadCounters {
    pub fn record(&mut self, invalidation: Invalidation) {
        for flag in invalidation.iter() {
            *self.counts.entry(flag).or_default() += 1;
        }
    }

    /// Number of invalidations of a single cache.
    pub fn get(&self, flag: Invalidation) -> u32 {
        self.counts.get(&flag).copied().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReloadRequest {
    /// A data file changed. [`None`] reloads everything.
    Data(Option<String>),
    /// The skins directory changed.
    Skins,
}

#[derive(Default)]
struct DebounceState {
    requests: Vec<ReloadRequest>,
    deadline: Option<Instant>,
}

/// Collects reload requests from watcher threads. Requests become due once
/// no new request arrived for the configured delay.
pub struct ReloadDebouncer {
    delay: Duration,
    state: Mutex<DebounceState>,
}

impl ReloadDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: Mutex::new(DebounceState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DebounceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, request: ReloadRequest, now: Instant) {
        let mut state = self.lock();

        if !state.requests.contains(&request) {
            state.requests.push(request);
        }

        state.deadline = Some(now + self.delay);
    }

    pub fn take_due(&self, now: Instant) -> Vec<ReloadRequest> {
        let mut state = self.lock();

        match state.deadline {
            Some(deadline) if now >= deadline => {
                state.deadline = None;
                std::mem::take(&mut state.requests)
            }
            _ => Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        !self.lock().requests.is_empty()
    }
}

/// Handle through which the data provider reports edited files. Cheap to
/// clone and safe to use from any thread.
#[derive(Clone)]
pub struct DataChangedHandle {
    debouncer: Arc<ReloadDebouncer>,
}

impl DataChangedHandle {
    pub(crate) fn new(debouncer: Arc<ReloadDebouncer>) -> Self {
        Self { debouncer }
    }

    pub fn notify(&self, file_name: Option<&str>) {
        self.debouncer.push(ReloadRequest::Data(file_name.map(str::to_owned)), Instant::now());
    }
}
