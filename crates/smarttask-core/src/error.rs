use std::fmt;

/// Machine-readable error codes shared by the core and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    EmptyTitle,
    InvalidStateTransition,
    InvalidEnumValue,
    TaskNotFound,
    InvalidDeadline,
    ConfirmationRequired,
    CorruptSnapshot,
    StorageReadFailed,
    StorageWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::EmptyTitle => "E2001",
            Self::InvalidStateTransition => "E2002",
            Self::InvalidEnumValue => "E2003",
            Self::TaskNotFound => "E2004",
            Self::InvalidDeadline => "E2005",
            Self::ConfirmationRequired => "E2006",
            Self::CorruptSnapshot => "E3001",
            Self::StorageReadFailed => "E5001",
            Self::StorageWriteFailed => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::EmptyTitle => "Task title is empty",
            Self::InvalidStateTransition => "Invalid status transition",
            Self::InvalidEnumValue => "Invalid status or filter value",
            Self::TaskNotFound => "Task not found",
            Self::InvalidDeadline => "Deadline could not be parsed",
            Self::ConfirmationRequired => "Destructive command needs confirmation",
            Self::CorruptSnapshot => "Corrupt task snapshot",
            Self::StorageReadFailed => "Storage read failed",
            Self::StorageWriteFailed => "Storage write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `st init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .smarttask/config.toml and retry."),
            Self::EmptyTitle => Some("Add a title to the task."),
            Self::InvalidStateTransition => {
                Some("Follow valid transitions: pending -> in_progress -> done -> pending.")
            }
            Self::InvalidEnumValue => Some("Use one of: all, pending, in_progress, done."),
            Self::TaskNotFound => Some("Run `st list` to see task ids."),
            Self::InvalidDeadline => {
                Some("Use RFC 3339, YYYY-MM-DDTHH:MM, YYYY-MM-DD HH:MM, or YYYY-MM-DD.")
            }
            Self::ConfirmationRequired => Some("Re-run with --yes to confirm."),
            Self::CorruptSnapshot => None,
            Self::StorageReadFailed | Self::StorageWriteFailed => {
                Some("Check disk space and write permissions for .smarttask/.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::NotInitialized,
            ErrorCode::ConfigParseError,
            ErrorCode::EmptyTitle,
            ErrorCode::InvalidStateTransition,
            ErrorCode::InvalidEnumValue,
            ErrorCode::TaskNotFound,
            ErrorCode::InvalidDeadline,
            ErrorCode::ConfirmationRequired,
            ErrorCode::CorruptSnapshot,
            ErrorCode::StorageReadFailed,
            ErrorCode::StorageWriteFailed,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::InvalidStateTransition.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }
}
