//! Configuration management for ledgerdev

mod settings;

// Re-export main types
pub use settings::{
    ALT_CONFIG_FILE, AppSettings, CONFIG_FILE, Config, DEFAULT_DOCKER_IMAGE,
    DEFAULT_ONBOARDING_PIN, DEFAULT_ONBOARDING_SEED, DOCKER_IMAGE_ENV,
};
