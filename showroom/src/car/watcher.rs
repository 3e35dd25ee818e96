use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, print_debug};

use super::reload::{ReloadDebouncer, ReloadRequest};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WatchTarget {
    /// The skins directory; any change rescans the skins.
    Skins,
    /// The data directory; changes are reported by file name.
    Data,
}

/// Watches a directory and forwards changes to a [`ReloadDebouncer`]. The
/// callback runs on the watcher's own thread and never touches the car.
pub struct ReloadWatcher {
    _watcher: RecommendedWatcher,
}

impl ReloadWatcher {
    pub fn new(directory: &Path, target: WatchTarget, debouncer: Arc<ReloadDebouncer>) -> notify::Result<Self> {
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
            Ok(event) => {
                if matches!(event.kind, EventKind::Access(_)) {
                    return;
                }

                let now = Instant::now();

                match target {
                    WatchTarget::Skins => debouncer.push(ReloadRequest::Skins, now),
                    WatchTarget::Data => {
                        for path in &event.paths {
                            let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned());
                            debouncer.push(ReloadRequest::Data(file_name), now);
                        }
                    }
                }
            }
            Err(_error) => {
                #[cfg(feature = "debug")]
                print_debug!("[{}] watcher error: {}", "error".red(), _error);
            }
        })?;

        let mode = match target {
            WatchTarget::Skins => RecursiveMode::Recursive,
            WatchTarget::Data => RecursiveMode::NonRecursive,
        };

        watcher.watch(directory, mode)?;

        #[cfg(feature = "debug")]
        print_debug!("watching {}", directory.display().magenta());

        Ok(Self { _watcher: watcher })
    }
}
