//! Implements some useful containers.

/// Easily creates typed keys for a generational slab.
#[macro_export]
macro_rules! create_generational_key {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Ord, Eq, Hash)]
        pub struct $name {
            key: u32,
            generation: core::num::NonZeroU32,
        }

        impl $crate::container::GenerationalKey for $name {
            fn new(key: u32, generation: core::num::NonZeroU32) -> Self {
                Self { key, generation }
            }

            fn key(&self) -> u32 {
                self.key
            }

            fn generation(&self) -> core::num::NonZeroU32 {
                self.generation
            }
        }
    };
    ($name:ident) => {
        $crate::create_generational_key!($name, "no documentation");
    };
}

mod generational_slab;
mod lru;
mod resource_state;

pub use generational_slab::{GenerationalIter, GenerationalKey, GenerationalSlab};
pub use lru::Lru;
pub use resource_state::ResourceState;
