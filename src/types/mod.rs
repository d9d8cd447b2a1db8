// src/types/mod.rs

pub mod radius;

pub use radius::RadiusOption;
