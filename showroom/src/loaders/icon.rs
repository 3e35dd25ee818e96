use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, print_debug};
use showroom_util::container::Lru;

use super::LoadError;
use crate::graphics::Texture;

enum IconStatus {
    Loading,
    Ready(Arc<Texture>),
    Failed,
}

struct IconCacheState {
    entries: Lru<PathBuf, IconStatus>,
    generation: u64,
}

/// Decoded brand badges, flags and upgrade icons shared by every car in the
/// process. Holds at most `capacity` icons and evicts the least recently used
/// one. Decoding happens on a worker thread; a request for an icon that is not
/// ready yet returns [`None`].
pub struct IconCache {
    state: Arc<Mutex<IconCacheState>>,
    thread_pool: ThreadPool,
}

fn lock(state: &Mutex<IconCacheState>) -> MutexGuard<'_, IconCacheState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl IconCache {
    pub fn new(capacity: usize) -> Result<Self, ThreadPoolBuildError> {
        let thread_pool = ThreadPoolBuilder::new()
            .thread_name(|number| format!("icon loader thread {number}"))
            .num_threads(1)
            .build()?;

        let capacity = NonZeroU32::new(u32::try_from(capacity).unwrap_or(u32::MAX)).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            state: Arc::new(Mutex::new(IconCacheState {
                entries: Lru::new(capacity),
                generation: 0,
            })),
            thread_pool,
        })
    }

    pub fn request(&self, path: &Path) -> Option<Arc<Texture>> {
        let mut state = lock(&self.state);

        if let Some(status) = state.entries.get(path) {
            return match status {
                IconStatus::Ready(texture) => Some(texture.clone()),
                IconStatus::Loading | IconStatus::Failed => None,
            };
        }

        if state.entries.is_full() {
            let _evicted = state.entries.pop();

            #[cfg(feature = "debug")]
            if let Some((path, _)) = &_evicted {
                print_debug!("evicted icon {}", path.display().magenta());
            }
        }

        state.entries.put(path.to_path_buf(), IconStatus::Loading, 0);

        let generation = state.generation;
        let shared_state = Arc::clone(&self.state);
        let path = path.to_path_buf();

        self.thread_pool.spawn(move || {
            let result = std::fs::read(&path)
                .map_err(|error| LoadError::file(&path, error))
                .and_then(|bytes| super::decode_texture(&path.to_string_lossy(), &bytes));

            let mut state = lock(&shared_state);

            if state.generation != generation || !state.entries.contains(path.as_path()) {
                return;
            }

            // Finishing a load counts as a use of the icon.
            match result {
                Ok(texture) => {
                    let size = texture.data().len();
                    state.entries.put(path, IconStatus::Ready(Arc::new(texture)), size);
                }
                Err(_error) => {
                    #[cfg(feature = "debug")]
                    print_debug!("[{}] failed to load icon {}: {}", "error".red(), path.display().magenta(), _error);

                    state.entries.put(path, IconStatus::Failed, 0);
                }
            }
        });

        None
    }

    /// Drops every icon. Loads that are still running are discarded.
    pub fn invalidate_all(&self) {
        let mut state = lock(&self.state);
        state.entries.clear();
        state.generation += 1;

        #[cfg(feature = "debug")]
        print_debug!("invalidated {}", "icon cache".magenta());
    }

    pub fn len(&self) -> usize {
        lock(&self.state).entries.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of decoded pixel data held by the cache.
    pub fn memory_usage(&self) -> usize {
        lock(&self.state).entries.size()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state)
            .entries
            .values()
            .any(|status| matches!(status, IconStatus::Loading))
    }
}
