use thiserror::Error;

/// Fatal configuration problems detected before any input is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Missing required args. Got SRC='{source_path}', TGT='{target_path}'. \
         Please pass --SOURCE/--TARGET or --source/--target."
    )]
    MissingPaths { source_path: String, target_path: String },

    #[error("unsupported storage location '{location}': only local paths and file:// are supported")]
    UnsupportedScheme { location: String },
}

impl ConfigError {
    pub fn missing_paths(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::MissingPaths { source_path: source.into(), target_path: target.into() }
    }

    pub fn unsupported_scheme(location: impl Into<String>) -> Self {
        Self::UnsupportedScheme { location: location.into() }
    }
}
