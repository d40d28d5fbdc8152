use std::fmt::{Display, Formatter};

/// Orchestrator state, observable while a download runs.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum DownloadStatus {
    #[default]
    None,
    Initializing,
    Planning,
    Running,
    Completed,
    Failed,
}

impl DownloadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadStatus::Completed | DownloadStatus::Failed)
    }
}

impl Display for DownloadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadStatus::None => write!(f, "None"),
            DownloadStatus::Initializing => write!(f, "Initializing"),
            DownloadStatus::Planning => write!(f, "Planning"),
            DownloadStatus::Running => write!(f, "Running"),
            DownloadStatus::Completed => write!(f, "Completed"),
            DownloadStatus::Failed => write!(f, "Failed"),
        }
    }
}
