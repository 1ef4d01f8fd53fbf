//! Model loading and inference components

pub mod artifact;
pub mod inference;
pub mod linear;
pub mod loader;

pub use artifact::LoadStrategy;
pub use inference::InferenceEngine;
pub use linear::{LinearRegression, Regressor};
pub use loader::{LoadedModel, ModelLoader};
