//! Exact probability distributions for a tabletop wargame attack sequence:
//! attacks, hits, wounds, saves and damage.

pub mod cli;
pub mod combat;
pub mod config;
pub mod data;
pub mod dice;
pub mod error;
pub mod parallel;
pub mod probability;
pub mod server;

pub use error::{MathhammerError, Result};
