pub mod geo;
pub mod oem;
pub mod query;
