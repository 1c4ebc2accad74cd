//! Core workflow for linking a managed device to an access group.
//!
//! The workflow spans two directories: a device-management inventory, which
//! tracks managed endpoints, and an identity directory, which holds the
//! device and group objects used for access control. One run:
//!
//! 1. resolves candidate inventory devices by owner, name or identifier,
//! 2. translates the chosen device into its identity-directory object,
//! 3. finds the eligible (static, security-enabled, non-mail) groups by name,
//! 4. adds the device object to the chosen group, exactly once.
//!
//! Every remote call goes through the [`DirectoryClient`] trait and every
//! operator interaction goes through the [`Console`] trait, so the workflow
//! itself holds no session, no terminal and no state between runs.
//!
//! # Example
//!
//! ```no_run
//! use devgroup_core::{Console, Coordinator, CoordinatorOptions, DeviceSelector, DirectoryClient};
//!
//! # async fn example(directory: &dyn DirectoryClient, console: &mut dyn Console) {
//! let options = CoordinatorOptions {
//!     selector: Some(DeviceSelector::Owner("alice@example.com".into())),
//!     group_name: Some("Secure-Laptops".into()),
//!     ..Default::default()
//! };
//!
//! let report = Coordinator::new(directory, console, options).run().await;
//! std::process::exit(report.outcome.exit_code());
//! # }
//! ```

pub mod console;
pub mod coordinator;
pub mod directory;
pub mod error;
pub mod filter;
pub mod groups;
pub mod mock;
pub mod model;
pub mod mutator;
pub mod resolver;
pub mod translator;

pub use console::Console;
pub use coordinator::{
    Completion, Coordinator, CoordinatorOptions, Failure, FailureKind, Outcome, RunReport, Stage,
};
pub use directory::DirectoryClient;
pub use error::{DirectoryError, DirectoryResult};
pub use groups::{GroupEligibilityFilter, GroupLookup, Ineligibility, RejectedGroup};
pub use model::{
    DeviceRecord, DeviceSelector, GroupCandidate, IdentityDeviceObject, MembershipRequest,
    SelectionMode,
};
pub use mutator::MembershipMutator;
pub use resolver::DeviceResolver;
pub use translator::{IdentifierTranslator, Translation};
