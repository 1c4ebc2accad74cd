//! Group eligibility filtering.
//!
//! Groups are fetched by exact display name and then filtered locally. A
//! device can only be added to a group that is security-enabled, not
//! mail-enabled and has assigned (not dynamic) membership.

use serde::Serialize;
use std::fmt;
use tracing::{debug, instrument};

use crate::directory::DirectoryClient;
use crate::error::DirectoryResult;
use crate::filter;
use crate::model::GroupCandidate;

/// A rule a group fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ineligibility {
    NotSecurityEnabled,
    MailEnabled,
    DynamicMembership,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotSecurityEnabled => "not security-enabled",
            Self::MailEnabled => "mail-enabled",
            Self::DynamicMembership => "dynamic membership",
        })
    }
}

/// Every rule `group` fails; empty when it is eligible.
pub fn ineligibility(group: &GroupCandidate) -> Vec<Ineligibility> {
    let mut reasons = Vec::new();
    if !group.security_enabled {
        reasons.push(Ineligibility::NotSecurityEnabled);
    }
    if group.mail_enabled {
        reasons.push(Ineligibility::MailEnabled);
    }
    if group.is_dynamic() {
        reasons.push(Ineligibility::DynamicMembership);
    }
    reasons
}

pub fn is_eligible(group: &GroupCandidate) -> bool {
    ineligibility(group).is_empty()
}

/// A group that matched by name but was filtered out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedGroup {
    pub group: GroupCandidate,
    pub reasons: Vec<Ineligibility>,
}

impl fmt::Display for RejectedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self.reasons.iter().map(ToString::to_string).collect();
        write!(f, "{} ({})", self.group.object_id, reasons.join(", "))
    }
}

/// Result of a group lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLookup {
    /// At least one eligible group; never empty.
    Eligible(Vec<GroupCandidate>),
    /// No group has this display name.
    NoMatch,
    /// Groups have this name, but none is eligible.
    NoneEligible(Vec<RejectedGroup>),
}

pub struct GroupEligibilityFilter<'a> {
    directory: &'a dyn DirectoryClient,
}

impl<'a> GroupEligibilityFilter<'a> {
    pub fn new(directory: &'a dyn DirectoryClient) -> Self {
        Self { directory }
    }

    /// Finds the eligible groups named `display_name`.
    #[instrument(skip(self))]
    pub async fn find_eligible(&self, display_name: &str) -> DirectoryResult<GroupLookup> {
        let filter = filter::eq(filter::DISPLAY_NAME, display_name);
        let raw = self.directory.find_groups(&filter).await?;

        if raw.is_empty() {
            return Ok(GroupLookup::NoMatch);
        }

        let total = raw.len();
        let mut eligible = Vec::new();
        let mut rejected = Vec::new();
        for group in raw {
            let reasons = ineligibility(&group);
            if reasons.is_empty() {
                eligible.push(group);
            } else {
                debug!("Group {} rejected: {:?}", group.object_id, reasons);
                rejected.push(RejectedGroup { group, reasons });
            }
        }

        debug!("{} of {} group(s) eligible", eligible.len(), total);

        if eligible.is_empty() {
            Ok(GroupLookup::NoneEligible(rejected))
        } else {
            Ok(GroupLookup::Eligible(eligible))
        }
    }
}
