//! CLI error types and exit codes

use devgroup_core::{DirectoryError, Failure, FailureKind};
use thiserror::Error;

use crate::config::ConfigError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The Graph session could not be opened.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The run ended in `Failed`.
    #[error("{0}")]
    Workflow(Failure),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Every failure exits with 1.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(ConfigError::MissingVar(_)) => Some(
                "Set DEVGROUP_TENANT_ID, DEVGROUP_CLIENT_ID and DEVGROUP_CLIENT_SECRET, or put them in a .env file.",
            ),
            CliError::Connection(_) => {
                Some("Check the tenant id, the client credentials and access to the login endpoint.")
            }
            CliError::Workflow(failure) => match &failure.kind {
                FailureKind::NoDevices(_) => {
                    Some("Check the search text or try another search mode.")
                }
                FailureKind::NoIdentityObject { .. } => {
                    Some("The device may not be joined to Entra ID yet, or its record is stale.")
                }
                FailureKind::NoEligibleGroup { .. } => Some(
                    "Devices can only be added to security-enabled, non-mail groups with assigned membership.",
                ),
                FailureKind::Query(DirectoryError::PermissionDenied(_)) => Some(
                    "The app registration needs DeviceManagementManagedDevices.Read.All, Device.Read.All and Group.Read.All.",
                ),
                FailureKind::Mutation(DirectoryError::PermissionDenied(_)) => {
                    Some("The app registration needs GroupMember.ReadWrite.All.")
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<Failure> for CliError {
    fn from(failure: Failure) -> Self {
        CliError::Workflow(failure)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}
