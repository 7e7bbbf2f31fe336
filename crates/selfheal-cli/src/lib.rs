//! Library side of the `selfheal` command: configuration files, the
//! file-backed slug store, logging and output rendering.

#![deny(unsafe_code)]

pub mod config;
pub mod logging;
pub mod render;
pub mod store;
