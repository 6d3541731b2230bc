//! Bundlekeeper - resumable installer and tracker for asset bundles
//!
//! Bundles are gzip-compressed TAR containers whose entries are grouped in
//! hash-named directories holding an `asset`, an `asset.meta` companion and a
//! `pathname` marker. Bundlekeeper reads a bundle's file list straight from
//! the container, snapshots the project before and after an external
//! importer runs, and records exactly which files the import produced so the
//! bundle can later be uninstalled cleanly.
//!
//! The install is crash-recoverable: the pre-install snapshot is persisted
//! before the importer is triggered, and [`install::Installer::resume`]
//! finishes the install from that durable session after a restart.

pub mod cli;
pub mod commands;
pub mod container;
pub mod error;
pub mod extractor;
pub mod hash;
pub mod install;
pub mod manifest;
pub mod overlap;
pub mod path_utils;
pub mod project;
pub mod session;
pub mod snapshot;
pub mod transaction;
pub mod uninstall;
pub mod vcs;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{BundleError, Result};
