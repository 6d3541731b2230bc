//! Command implementations for the bundlekeeper CLI

pub mod abort;
pub mod completions;
pub mod helpers;
pub mod inspect;
pub mod install;
pub mod list;
pub mod resume;
pub mod show;
pub mod status;
pub mod uninstall;
