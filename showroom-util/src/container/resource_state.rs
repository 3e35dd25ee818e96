//! Lifecycle of a lazily created resource.

/// State of a resource that is created on first use and may fail to load.
///
/// A failed resource stays failed until it is explicitly [`reset`] (for
/// example after the data it was created from changed on disk), so a broken
/// asset is not retried every frame.
///
/// [`reset`]: ResourceState::reset
#[derive(Debug)]
pub enum ResourceState<T, E> {
    /// Never requested or reset.
    Unloaded,
    /// A background task is creating the resource.
    Loading,
    /// The resource is available.
    Ready(T),
    /// Creating the resource failed.
    Failed(E),
}

impl<T, E> Default for ResourceState<T, E> {
    fn default() -> Self {
        Self::Unloaded
    }
}

impl<T, E> ResourceState<T, E> {
    /// Returns true if the resource is available.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns true if a background load is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if the last load failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns true if the resource was never requested since the last reset.
    pub fn is_unloaded(&self) -> bool {
        matches!(self, Self::Unloaded)
    }

    /// Returns the resource if it is available.
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the resource mutably if it is available.
    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the error of the last load, if it failed.
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Synchronously creates the resource if it was not requested yet and
    /// returns it if it is available.
    pub fn get_or_load(&mut self, load: impl FnOnce() -> Result<T, E>) -> Option<&mut T> {
        if let Self::Unloaded = self {
            *self = match load() {
                Ok(value) => Self::Ready(value),
                Err(error) => Self::Failed(error),
            };
        }

        self.ready_mut()
    }

    /// Moves an unloaded resource into the loading state. Returns false if the
    /// resource was already requested, so the caller does not start a second
    /// load.
    pub fn begin_loading(&mut self) -> bool {
        match self {
            Self::Unloaded => {
                *self = Self::Loading;
                true
            }
            _ => false,
        }
    }

    /// Stores the result of a load.
    pub fn finish(&mut self, result: Result<T, E>) {
        *self = match result {
            Ok(value) => Self::Ready(value),
            Err(error) => Self::Failed(error),
        };
    }

    /// Drops the resource (or the failure) so the next access loads again.
    pub fn reset(&mut self) {
        *self = Self::Unloaded;
    }

    /// Takes the resource out, leaving the state unloaded.
    pub fn take(&mut self) -> Option<T> {
        match std::mem::take(self) {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::container::ResourceState;

    #[test]
    fn test_get_or_load_once() {
        let mut state: ResourceState<u32, String> = ResourceState::Unloaded;
        let mut calls = 0;

        for _ in 0..3 {
            let value = state.get_or_load(|| {
                calls += 1;
                Ok(5)
            });
            assert_eq!(value.copied(), Some(5));
        }

        assert_eq!(calls, 1);
    }

    #[test]
    fn test_failure_is_sticky_until_reset() {
        let mut state: ResourceState<u32, String> = ResourceState::Unloaded;

        assert!(state.get_or_load(|| Err("missing".to_owned())).is_none());
        assert!(state.get_or_load(|| Ok(1)).is_none());
        assert_eq!(state.error().map(String::as_str), Some("missing"));

        state.reset();

        assert_eq!(state.get_or_load(|| Ok(1)).copied(), Some(1));
    }

    #[test]
    fn test_begin_loading() {
        let mut state: ResourceState<u32, ()> = ResourceState::default();

        assert!(state.begin_loading());
        assert!(!state.begin_loading());
        assert!(state.is_loading());

        state.finish(Ok(3));

        assert!(state.is_ready());
        assert_eq!(state.take(), Some(3));
        assert!(state.is_unloaded());
    }
}
