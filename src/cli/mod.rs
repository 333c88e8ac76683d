//! Programmatic entry points behind the command line

pub mod options;
pub mod orchestration;

pub use options::ReleaseOptions;
pub use orchestration::{run_release_workflow, WorkflowResult};
