pub mod error;
pub mod languages;
pub mod settings;
pub mod types;
