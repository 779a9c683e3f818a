//! Scene graph record collection and slot resolution

pub mod resolver;

pub use resolver::{SceneGraphResolver, TransformRecord};
