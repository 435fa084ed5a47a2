//! ECS resources made available to systems.
//!
//! Overview
//! - `animationstore` – validated animations shared by name
//! - `cachesweep` – bookkeeping for the periodic cache sweep
//! - `pawnregistry` – every live pawn in spawn order, plus the movement API
//! - `simconfig` – INI-backed settings
//! - `stage` – static level hitboxes
//! - `worldtime` – simulation time and delta
pub mod animationstore;
pub mod cachesweep;
pub mod pawnregistry;
pub mod simconfig;
pub mod stage;
pub mod worldtime;
