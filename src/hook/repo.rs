use crate::schema::FileStatus;

/// Repository facts the synthesizer cannot learn from the command text.
///
/// The hook runs before the command, so these describe the working tree
/// as it is about to be committed or pushed.
pub trait RepoState {
    /// Checked-out branch name, without `refs/heads/`. Empty if unknown.
    fn current_branch(&self) -> String;
    fn author(&self) -> String;
    /// Files staged for the next commit.
    fn staged_files(&self) -> Vec<FileStatus>;
}

/// Fixed answers, for callers that already know them (and for tests).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticRepoState {
    pub branch: String,
    pub author: String,
    pub files: Vec<FileStatus>,
}

impl StaticRepoState {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_files(mut self, files: Vec<FileStatus>) -> Self {
        self.files = files;
        self
    }
}

impl RepoState for StaticRepoState {
    fn current_branch(&self) -> String {
        self.branch.clone()
    }

    fn author(&self) -> String {
        self.author.clone()
    }

    fn staged_files(&self) -> Vec<FileStatus> {
        self.files.clone()
    }
}
