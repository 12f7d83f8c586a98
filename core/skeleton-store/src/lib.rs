//! FILENAME: core/skeleton-store/src/lib.rs
//! DemoLens Skeleton Store
//!
//! Owns captured skeletons and scenarios, persists them as a JSON file through
//! a background writer, and packs scenarios into shareable ZIP bundles.

mod bundle;
mod error;
mod events;
mod library;
mod model;
mod storage;
mod sync;

pub use bundle::{
    export_bundle, import_bundle, read_bundle, write_bundle, BundleManifest, ScenarioBundle,
    BUNDLE_FORMAT, BUNDLE_VERSION,
};
pub use error::StoreError;
pub use events::{EventBus, StoreEvent};
pub use library::SkeletonLibrary;
pub use model::{
    LibrarySnapshot, Product, QueryCapture, Scenario, Skeleton, SkeletonSummary, STORAGE_VERSION,
};
pub use storage::JsonStorage;
pub use sync::SyncQueue;
