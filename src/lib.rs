//! An LSIF indexer for every language: walks one or more interdependent
//! compilation units through a shared type-checker façade and emits a
//! Language Server Index Format dump.

pub mod cli;
pub mod config;
pub mod configs;
pub mod data_manager;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod facade;
pub mod indexer;
pub mod moniker;
pub mod protocol;
pub mod reporter;
pub mod source_control;

pub use anyhow::{anyhow as error, bail as ret_error, Error, Result};
