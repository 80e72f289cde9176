pub mod condition;
pub mod error;
#[macro_use]
pub mod metadata;
pub mod defaults;
pub mod emitter;
pub mod loader;
pub mod model;
pub mod writer;

pub use defaults::resolve_default;
pub use emitter::emit;
pub use error::{ProjectError, Result};
pub use loader::{Diagnostic, ProjectLoader, load_project};
pub use model::{
    Category, Configuration, CustomBuildRule, FileConfigurationInfo, FileInfo, GradleSettings, Keyword, Language, Project,
    ProjectKind,
};
pub use writer::{SaveOutcome, save};
