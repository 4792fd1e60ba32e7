use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from:   PathBuf,
        to:     PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read metadata of {path}: {source}")]
    Metadata {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is a directory")]
    IsDirectory { path: PathBuf },
}

impl Error {
    /// The path the failed operation was acting on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Error::CreateDir { path, .. }
            | Error::Write { path, .. }
            | Error::Remove { path, .. }
            | Error::Metadata { path, .. }
            | Error::IsDirectory { path } => path,
            Error::Rename { to, .. } => to,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
