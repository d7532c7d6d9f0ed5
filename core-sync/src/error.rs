use bridge_traits::error::BridgeError;
use core_library::LibraryError;
use std::fmt;
use thiserror::Error;

/// Entity a resolution or persistence step was working on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Playlist,
    Artist,
    Album,
    Release,
    Track,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playlist => "playlist",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Release => "release",
            Self::Track => "track",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag carried by every [`SyncError`], inspected instead of the variant itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed catalog track; skipped
    Validation,
    /// Master catalog could not supply artist or album identity; skipped
    Resolution,
    /// Remote catalog lookup failed; skipped
    Fetch,
    /// Local storage read or write failed; skipped
    Persist,
    /// Playlist missing; fatal for the run
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Resolution => "resolution",
            Self::Fetch => "fetch",
            Self::Persist => "persist",
            Self::NotFound => "not_found",
        }
    }

    /// Only a missing playlist aborts a run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid track {track_id}: {message}")]
    Validation { track_id: String, message: String },

    #[error("Cannot resolve master data for track {track_id}: {message}")]
    Resolution { track_id: String, message: String },

    #[error("Failed to fetch {entity} {external_id} from catalog: {source}")]
    Fetch {
        entity: EntityKind,
        external_id: String,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to store {entity} {id}: {source}")]
    Persist {
        entity: EntityKind,
        id: String,
        #[source]
        source: LibraryError,
    },

    #[error("Playlist {playlist_id} not found")]
    NotFound { playlist_id: String },
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Resolution { .. } => ErrorKind::Resolution,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Persist { .. } => ErrorKind::Persist,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    pub(crate) fn fetch(entity: EntityKind, external_id: &str, source: BridgeError) -> Self {
        Self::Fetch {
            entity,
            external_id: external_id.to_string(),
            source,
        }
    }

    pub(crate) fn persist(entity: EntityKind, id: &str, source: LibraryError) -> Self {
        Self::Persist {
            entity,
            id: id.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_every_variant() {
        let fetch = SyncError::fetch(
            EntityKind::Artist,
            "artist-1",
            BridgeError::OperationFailed("timeout".to_string()),
        );
        assert_eq!(fetch.kind(), ErrorKind::Fetch);
        assert_eq!(
            fetch.to_string(),
            "Failed to fetch artist artist-1 from catalog: Bridge operation failed: timeout"
        );

        let persist = SyncError::persist(
            EntityKind::Track,
            "track-1",
            LibraryError::Migration("locked".to_string()),
        );
        assert_eq!(persist.kind(), ErrorKind::Persist);
        assert!(!persist.kind().is_fatal());

        let missing = SyncError::NotFound {
            playlist_id: "p1".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert!(missing.kind().is_fatal());
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let err = SyncError::fetch(
            EntityKind::Album,
            "album-1",
            BridgeError::NotFound("Album album-1".to_string()),
        );
        assert!(err.source().is_some());
    }
}
