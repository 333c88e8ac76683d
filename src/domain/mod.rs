//! Domain model - history units the release engine reasons about

pub mod change;
pub mod commit;
pub mod release;

pub use change::{Change, ChangeKind};
pub use commit::{Commit, PullRequest};
pub use release::Release;
