//! Job orchestration: composes the separation runner, progress mapper,
//! output locator, repository and converter into one supervised job.

mod errors;
mod job;

pub use errors::{JobError, JobResult};
pub use job::{JobOrchestrator, ProgressCallback};
