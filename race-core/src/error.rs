use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum TrackError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    MissingAsset(PathBuf),
    Invalid(String),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            TrackError::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            TrackError::MissingAsset(path) => {
                write!(f, "image file '{}' not found", path.display())
            }
            TrackError::Invalid(message) => write!(f, "invalid track: {message}"),
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackError::Io { source, .. } => Some(source),
            TrackError::Parse { source, .. } => Some(source),
            TrackError::MissingAsset(_) | TrackError::Invalid(_) => None,
        }
    }
}
