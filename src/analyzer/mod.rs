//! Resolution of the current and next release versions

pub mod version_resolver;

pub use version_resolver::{
    calculate_current_version, calculate_next_version, clean_tag_name, infer_bump,
};
