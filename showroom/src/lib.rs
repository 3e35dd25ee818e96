//! Scene graph and procedural animation engine used to preview racing
//! simulation cars.
//!
//! A [`CarModel`](car::CarModel) takes a parsed mesh tree together with the
//! data files describing the car and turns it into a steerable,
//! skin-swappable object that reacts to runtime parameters and to edits of
//! its data files. Drawing produces instruction lists that an external GPU
//! layer consumes.

pub mod car;
pub mod data;
pub mod graphics;
pub mod loaders;
pub mod materials;
pub mod scene;
pub mod settings;
