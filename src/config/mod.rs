//! Configuration module for Folio.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    ChunkingSettings, GeneralSettings, LoaderSettings, RetrievalSettings, Settings,
    StoreSettings,
};
