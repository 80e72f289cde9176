//! Error type shared by the loader, emitter, default resolver and writer.

use std::path::PathBuf;

use thiserror::Error;

/// Every fatal condition raised while loading, emitting or saving a project.
///
/// Nothing here is retried: project files and builder input are static data, so a
/// failure always points at an offending declaration.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("XML Error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a project file: root element is <{root}>")]
    NotAProjectFile { root: String },

    #[error("Malformed condition '{condition}': {reason}")]
    MalformedCondition { condition: String, reason: String },

    #[error("Malformed configuration key '{0}', expected '<Name>|<Platform>'")]
    MalformedConfigurationKey(String),

    #[error("Unknown field '{field}' in {context}")]
    UnknownField { field: String, context: String },

    #[error("Invalid value '{value}' for field '{field}' ({configuration}) in project '{project}'")]
    InvalidValue {
        field: String,
        value: String,
        configuration: String,
        project: String,
    },

    #[error(
        "Field '{field}' has no default for '{configuration}' in project '{project}' and must be set explicitly"
    )]
    UnresolvableDefault {
        field: String,
        configuration: String,
        project: String,
    },

    #[error("Project '{project}' location was not specified")]
    MissingLocation { project: String },

    #[error("Configuration '{configuration}' not found in project '{project}'")]
    UnknownConfiguration {
        configuration: String,
        project: String,
    },

    #[error("Configuration '{configuration}' declared twice in project '{project}'")]
    DuplicateConfiguration {
        configuration: String,
        project: String,
    },

    #[error("Platform '{platform}' is not supported by keyword '{keyword}' (project '{project}')")]
    UnsupportedPlatform {
        platform: String,
        keyword: String,
        project: String,
    },

    #[error("{what} of project '{project}' has {found} configuration slots, expected {expected}")]
    ConfigurationCountMismatch {
        what: String,
        found: usize,
        expected: usize,
        project: String,
    },

    #[error("Invalid project host guid '{0}'")]
    InvalidHostGuid(String),

    #[error("Project '{0}' is a solution folder and has no project file")]
    FolderHasNoProjectFile(String),

    #[error("File '{path}' not found in project '{project}'")]
    UnknownFile { path: String, project: String },
}

pub type Result<T, E = ProjectError> = std::result::Result<T, E>;
