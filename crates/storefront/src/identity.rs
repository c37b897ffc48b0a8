//! Local user identity.
//!
//! The backend partitions carts and wishlists by an opaque user id. There is
//! no authentication: the id is generated once and persisted in a local file.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use greenhouse_core::UserId;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors loading or persisting the identity file.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity file {path} is not accessible: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of the current user id.
pub trait IdentityProvider: Send + Sync + Debug {
    /// The id every cart and wishlist request is keyed by.
    fn current_user_id(&self) -> UserId;
}

/// Generate a fresh random identity (`user-<32 hex chars>`).
#[must_use]
pub fn generate_user_id() -> UserId {
    UserId::new(format!("user-{}", Uuid::new_v4().simple()))
}

// =============================================================================
// FileIdentity
// =============================================================================

/// Identity persisted in a file; stable for as long as the file exists.
#[derive(Debug, Clone)]
pub struct FileIdentity {
    path: PathBuf,
    user_id: UserId,
}

impl FileIdentity {
    /// Read the identity at `path`, generating and writing one if the file
    /// is missing or blank.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Io` if the file cannot be read or written.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self, IdentityError> {
        let path = path.into();

        match std::fs::read_to_string(&path) {
            Ok(contents) if !contents.trim().is_empty() => {
                let user_id = UserId::new(contents.trim());
                debug!(path = %path.display(), user = %user_id, "Loaded identity");
                return Ok(Self { path, user_id });
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(IdentityError::Io { path, source }),
        }

        let user_id = generate_user_id();
        write_identity(&path, &user_id)?;
        info!(path = %path.display(), user = %user_id, "Created new identity");

        Ok(Self { path, user_id })
    }

    /// Where the identity is stored.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityProvider for FileIdentity {
    fn current_user_id(&self) -> UserId {
        self.user_id.clone()
    }
}

fn write_identity(path: &Path, user_id: &UserId) -> Result<(), IdentityError> {
    let io_err = |source| IdentityError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, user_id.as_str()).map_err(io_err)
}

// =============================================================================
// StaticIdentity
// =============================================================================

/// A fixed identity, for tests and for callers that manage ids themselves.
#[derive(Debug, Clone)]
pub struct StaticIdentity(UserId);

impl StaticIdentity {
    #[must_use]
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self(user_id.into())
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> UserId {
        self.0.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("greenhouse-identity-test-{}", Uuid::new_v4().simple()))
            .join(name)
    }

    #[test]
    fn test_generated_ids_have_prefix_and_differ() {
        let a = generate_user_id();
        let b = generate_user_id();
        assert!(a.as_str().starts_with("user-"));
        assert_eq!(a.as_str().len(), "user-".len() + 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_identity_is_stable_across_loads() {
        let path = temp_path("identity");
        let first = FileIdentity::load_or_create(&path).unwrap();
        let second = FileIdentity::load_or_create(&path).unwrap();
        assert_eq!(first.current_user_id(), second.current_user_id());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            first.current_user_id().as_str()
        );
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_blank_file_gets_new_identity() {
        let path = temp_path("identity");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "  \n").unwrap();

        let identity = FileIdentity::load_or_create(&path).unwrap();
        assert!(identity.current_user_id().as_str().starts_with("user-"));
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_existing_identity_is_trimmed() {
        let path = temp_path("identity");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "user-abc\n").unwrap();

        let identity = FileIdentity::load_or_create(&path).unwrap();
        assert_eq!(identity.current_user_id(), UserId::new("user-abc"));
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_static_identity() {
        let identity = StaticIdentity::new("user-fixed");
        assert_eq!(identity.current_user_id().as_str(), "user-fixed");
    }
}
