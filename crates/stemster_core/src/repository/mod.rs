//! Track repository: canonical storage layout, listing, deletion, and
//! cached archives.

mod archive;
mod tracks;
mod types;

pub use archive::ArchiveCache;
pub use tracks::{TrackRepository, ACCEPTED_UPLOAD_EXTENSIONS};
pub(crate) use tracks::track_lock_name;
pub use types::{archive_path, RepositoryError, RepositoryResult, Track};
