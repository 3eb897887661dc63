//! CLI command implementations.

pub mod common;
pub mod config;
pub mod devices;
pub mod encode;
pub mod generate;
pub mod keygen;
pub mod listen;
pub mod obfuscate;
pub mod transmit;
pub mod validate;
