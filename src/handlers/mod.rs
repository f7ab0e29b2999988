// src/handlers/mod.rs

pub mod profile;
pub mod quiz;
pub mod social;
