//! Platform-specific facts about a post file: who owns it and when it was
//! created. The store only talks to the [`FileMetadata`] trait.

use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::models::Person;

pub trait FileMetadata: Send + Sync {
    /// The post author. An empty [`Person`] when the owner cannot be resolved.
    fn owner(&self, path: &Path, metadata: &Metadata) -> Person;

    fn created_at(&self, path: &Path, metadata: &Metadata) -> DateTime<Utc>;
}

/// Reads ownership and creation time from the operating system. Owners are
/// resolved through the system user database, so NSS sources such as LDAP
/// are honoured.
#[derive(Debug, Clone, Default)]
pub struct SystemMetadata;

impl FileMetadata for SystemMetadata {
    #[cfg(unix)]
    fn owner(&self, path: &Path, metadata: &Metadata) -> Person {
        use nix::unistd::{Uid, User};
        use std::os::unix::fs::MetadataExt;

        match User::from_uid(Uid::from_raw(metadata.uid())) {
            Ok(Some(user)) => person_from(&user.name, &user.gecos.to_string_lossy()),
            Ok(None) => {
                tracing::debug!("No user entry for the owner of {:?}", path);
                Person::default()
            }
            Err(e) => {
                tracing::debug!("Owner lookup failed for {:?}: {}", path, e);
                Person::default()
            }
        }
    }

    #[cfg(not(unix))]
    fn owner(&self, _path: &Path, _metadata: &Metadata) -> Person {
        Person::default()
    }

    fn created_at(&self, _path: &Path, metadata: &Metadata) -> DateTime<Utc> {
        let created = metadata.created().ok().or_else(|| fallback_created(metadata));
        created.map(DateTime::<Utc>::from).unwrap_or_default()
    }
}

#[cfg(unix)]
fn fallback_created(metadata: &Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;

    DateTime::<Utc>::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32)
        .map(SystemTime::from)
}

#[cfg(not(unix))]
fn fallback_created(metadata: &Metadata) -> Option<SystemTime> {
    metadata.modified().ok()
}

/// The first GECOS field is the full name; the login name stands in when it
/// is empty.
#[cfg(unix)]
fn person_from(login: &str, gecos: &str) -> Person {
    let full_name = gecos.split(',').next().unwrap_or("").trim();
    let name = if full_name.is_empty() { login } else { full_name };
    Person {
        name: name.to_string(),
        email: String::new(),
    }
}
