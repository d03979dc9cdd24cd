pub mod app;
pub mod device;

// Re-export commonly used types
pub use app::{
    App, BuildUseCase, DEFAULT_BUILD_USE_CASE, FuzzingInfo, Language, UNKNOWN_APP_NAME,
    VariantInfo, container_name_for,
};
pub use device::{ALL_TARGETS, Device, DeviceProfile, Target};
