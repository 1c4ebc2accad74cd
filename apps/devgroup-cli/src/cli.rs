//! Command-line arguments.

use clap::{ArgAction, ArgGroup, Parser};
use devgroup_core::{CoordinatorOptions, DeviceSelector};

/// Add a managed device to a security group
///
/// Without a search flag the tool asks how to find the device. Without
/// --group it asks for the group name.
#[derive(Debug, Parser)]
#[command(name = "devgroup")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("selector")
        .args(["owner", "name", "device_id"])
        .multiple(false)
))]
pub struct Cli {
    /// Find devices by owner principal name
    #[arg(long, value_name = "UPN")]
    pub owner: Option<String>,

    /// Find devices whose name contains this text
    #[arg(long, value_name = "SUBSTR")]
    pub name: Option<String>,

    /// Use this Intune device identifier
    #[arg(long = "device-id", value_name = "ID")]
    pub device_id: Option<String>,

    /// Display name of the target group
    #[arg(long, value_name = "NAME")]
    pub group: Option<String>,

    /// Skip the confirmation question
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Stop before changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Give up after this many rejected answers to one question
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The device lookup given on the command line, if any.
    pub fn selector(&self) -> Option<DeviceSelector> {
        if let Some(owner) = &self.owner {
            Some(DeviceSelector::Owner(owner.clone()))
        } else if let Some(name) = &self.name {
            Some(DeviceSelector::Name(name.clone()))
        } else {
            self.device_id.clone().map(DeviceSelector::Identifier)
        }
    }

    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            selector: self.selector(),
            group_name: self.group.clone(),
            assume_yes: self.yes,
            dry_run: self.dry_run,
            max_attempts: self.max_attempts,
        }
    }
}

/// Exit code for an argument error: 0 for `--help`/`--version`, 1 otherwise.
pub fn parse_error_exit_code(error: &clap::Error) -> i32 {
    if error.use_stderr() {
        1
    } else {
        0
    }
}
