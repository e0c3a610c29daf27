use std::path::PathBuf;

/// A resolved subcommand. `None` fields are asked for interactively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Backup {
        uri: Option<String>,
    },
    Restore {
        uri: Option<String>,
    },
    Purge {
        uri: Option<String>,
    },
    Decrypt {
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    },
}

impl Command {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Backup { .. } => "backup",
            Self::Restore { .. } => "restore",
            Self::Purge { .. } => "purge",
            Self::Decrypt { .. } => "decrypt",
        }
    }
}
