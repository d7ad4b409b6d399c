//! Error taxonomy
//!
//! Every failure the registries, the folder loader and the dispatcher can
//! produce is tagged with one of these codes. A code carries its default
//! message, severity and whether it should reach the log.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered severity of a taxonomy entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(label)
    }
}

/// Closed set of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    UnknownError,
    ActionIdentifierAlreadyExists,
    ActionDisabled,
    ActionNotFound,
    ActionWithoutCallback,
    EventIdentifierAlreadyExists,
    EventNotFound,
    EventDisabled,
    EventWithoutCallback,
    UnsupportedInteractionType,
    FileNotFound,
    InvalidFileType,
    NoDefaultExport,
    FolderNotFound,
    InvalidFolderType,
}

impl ErrorCode {
    /// All codes, in taxonomy order
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::UnknownError,
        ErrorCode::ActionIdentifierAlreadyExists,
        ErrorCode::ActionDisabled,
        ErrorCode::ActionNotFound,
        ErrorCode::ActionWithoutCallback,
        ErrorCode::EventIdentifierAlreadyExists,
        ErrorCode::EventNotFound,
        ErrorCode::EventDisabled,
        ErrorCode::EventWithoutCallback,
        ErrorCode::UnsupportedInteractionType,
        ErrorCode::FileNotFound,
        ErrorCode::InvalidFileType,
        ErrorCode::NoDefaultExport,
        ErrorCode::FolderNotFound,
        ErrorCode::InvalidFolderType,
    ];

    /// Message used when nothing more specific is available
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::UnknownError => "An unknown error occurred.",
            ErrorCode::ActionIdentifierAlreadyExists => {
                "An action with this identifier already exists."
            }
            ErrorCode::ActionDisabled => "This action is disabled.",
            ErrorCode::ActionNotFound => "This action could not be found.",
            ErrorCode::ActionWithoutCallback => "This action has no callback.",
            ErrorCode::EventIdentifierAlreadyExists => {
                "An event with this identifier already exists."
            }
            ErrorCode::EventNotFound => "This event could not be found.",
            ErrorCode::EventDisabled => "This event is disabled.",
            ErrorCode::EventWithoutCallback => "This event has no callback.",
            ErrorCode::UnsupportedInteractionType => "This interaction type is not supported.",
            ErrorCode::FileNotFound => "The file could not be found.",
            ErrorCode::InvalidFileType => "The file type is not supported.",
            ErrorCode::NoDefaultExport => "The file does not define a handler.",
            ErrorCode::FolderNotFound => "The folder could not be found.",
            ErrorCode::InvalidFolderType => "The path is not a folder.",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            ErrorCode::UnknownError
            | ErrorCode::ActionNotFound
            | ErrorCode::ActionWithoutCallback
            | ErrorCode::EventNotFound
            | ErrorCode::EventWithoutCallback
            | ErrorCode::FileNotFound
            | ErrorCode::NoDefaultExport
            | ErrorCode::FolderNotFound => Severity::High,
            ErrorCode::ActionIdentifierAlreadyExists
            | ErrorCode::ActionDisabled
            | ErrorCode::EventIdentifierAlreadyExists
            | ErrorCode::EventDisabled
            | ErrorCode::UnsupportedInteractionType
            | ErrorCode::InvalidFileType
            | ErrorCode::InvalidFolderType => Severity::Medium,
        }
    }

    /// Whether failures with this code are written to the log
    pub fn loggable(self) -> bool {
        true
    }

    /// Stable name, identical to the variant name
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnknownError => "UnknownError",
            ErrorCode::ActionIdentifierAlreadyExists => "ActionIdentifierAlreadyExists",
            ErrorCode::ActionDisabled => "ActionDisabled",
            ErrorCode::ActionNotFound => "ActionNotFound",
            ErrorCode::ActionWithoutCallback => "ActionWithoutCallback",
            ErrorCode::EventIdentifierAlreadyExists => "EventIdentifierAlreadyExists",
            ErrorCode::EventNotFound => "EventNotFound",
            ErrorCode::EventDisabled => "EventDisabled",
            ErrorCode::EventWithoutCallback => "EventWithoutCallback",
            ErrorCode::UnsupportedInteractionType => "UnsupportedInteractionType",
            ErrorCode::FileNotFound => "FileNotFound",
            ErrorCode::InvalidFileType => "InvalidFileType",
            ErrorCode::NoDefaultExport => "NoDefaultExport",
            ErrorCode::FolderNotFound => "FolderNotFound",
            ErrorCode::InvalidFolderType => "InvalidFolderType",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
