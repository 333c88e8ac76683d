/// Pointer to the most recently published release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag_name: String,
    pub commit_sha: String,
}

impl Release {
    pub fn new(tag_name: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        Release {
            tag_name: tag_name.into(),
            commit_sha: commit_sha.into(),
        }
    }
}
