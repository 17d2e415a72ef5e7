//! Model loading and saving functionality
//!
//! Provides high-level operations for loading and saving data models and
//! tree snapshots using storage backends.

pub mod loader;
pub mod saver;

pub use loader::{FileFailure, LoadedFile, ModelLoadResult, ModelLoader};
pub use saver::{ModelFormat, ModelSaver};
