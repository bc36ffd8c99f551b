pub mod manifest;

pub use manifest::Config;
