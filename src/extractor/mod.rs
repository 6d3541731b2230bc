//! Extraction collaborators
//!
//! The core never writes payload bytes itself: it hands the container to an
//! [`Extractor`] and learns the outcome from the returned
//! [`ExtractionEvent`]. An extractor that only launches the work reports
//! [`ExtractionEvent::Started`]; the install then stays pending until it is
//! resumed.

pub mod command;
pub mod unpack;

use std::path::Path;

use crate::project::Project;

pub use command::CommandExtractor;
pub use unpack::UnpackExtractor;

/// Outcome reported by an extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionEvent {
    /// Extraction runs on; completion arrives later
    Started,
    Completed,
    Failed(String),
    Cancelled,
}

/// Opaque archive-content import step
pub trait Extractor {
    /// Extractor name for messages
    fn name(&self) -> &str;

    /// Import `container` into the project
    fn extract(&self, container: &Path, interactive: bool) -> ExtractionEvent;
}

/// Extractor selected by the project configuration
pub fn for_project(project: &Project) -> Box<dyn Extractor> {
    let config = &project.config.extractor;
    match &config.command {
        Some(program) => Box::new(
            CommandExtractor::new(program.clone(), config.args.clone())
                .detached(config.detach)
                .in_dir(&project.root),
        ),
        None => Box::new(UnpackExtractor::new(
            &project.root,
            project.config.meta_extension.clone(),
        )),
    }
}
