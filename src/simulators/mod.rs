// src/simulators/mod.rs

pub mod price_model;
pub mod uniform_walk;

pub use price_model::PriceModel;
pub use uniform_walk::{UniformWalk, apply_change};
