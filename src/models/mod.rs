// src/models/mod.rs

pub mod attempt;
pub mod quiz;
pub mod summary;
pub mod user;
