//! In-memory test doubles.
//!
//! [`InMemoryDirectory`] evaluates the simple OData filters the workflow
//! builds (`p eq 'v'` and `contains(p,'v')`) against seeded records and
//! records every call. [`ScriptedConsole`] answers prompts from a script and
//! records what it was shown and asked.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::{Mutex, PoisonError};

use crate::console::Console;
use crate::directory::DirectoryClient;
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter;
use crate::model::{DeviceRecord, GroupCandidate, IdentityDeviceObject};

/// Failure injection for [`InMemoryDirectory`].
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Normal operation.
    #[default]
    Normal,
    /// Every read fails with this error.
    FailQueries(DirectoryError),
    /// Only the membership add fails with this error.
    FailAdd(DirectoryError),
}

/// A call received by [`InMemoryDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    FindManagedDevices(String),
    GetManagedDevice(String),
    FindDeviceObjects(String),
    FindGroups(String),
    AddGroupMember {
        group_id: String,
        member_object_id: String,
    },
}

/// In-memory [`DirectoryClient`].
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    devices: Vec<DeviceRecord>,
    device_objects: Vec<IdentityDeviceObject>,
    groups: Vec<GroupCandidate>,
    behavior: MockBehavior,
    calls: Mutex<Vec<DirectoryCall>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: DeviceRecord) -> Self {
        self.devices.push(device);
        self
    }

    pub fn with_device_object(mut self, object: IdentityDeviceObject) -> Self {
        self.device_objects.push(object);
        self
    }

    pub fn with_group(mut self, group: GroupCandidate) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of membership adds received.
    pub fn add_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DirectoryCall::AddGroupMember { .. }))
            .count()
    }

    fn record(&self, call: DirectoryCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn check_reads(&self) -> DirectoryResult<()> {
        match &self.behavior {
            MockBehavior::FailQueries(e) => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn find_managed_devices(&self, filter: &str) -> DirectoryResult<Vec<DeviceRecord>> {
        self.record(DirectoryCall::FindManagedDevices(filter.to_string()));
        self.check_reads()?;
        let predicate = Predicate::parse(filter)?;

        let mut matched = Vec::new();
        for device in &self.devices {
            let value = match predicate.property() {
                filter::OWNER_PRINCIPAL_NAME => device.owner_principal_name.as_deref(),
                filter::DEVICE_NAME => device.display_name.as_deref(),
                other => return Err(unknown_property(other)),
            };
            if predicate.matches(value) {
                matched.push(device.clone());
            }
        }
        Ok(matched)
    }

    async fn get_managed_device(
        &self,
        inventory_id: &str,
    ) -> DirectoryResult<Option<DeviceRecord>> {
        self.record(DirectoryCall::GetManagedDevice(inventory_id.to_string()));
        self.check_reads()?;
        Ok(self
            .devices
            .iter()
            .find(|d| d.inventory_id.eq_ignore_ascii_case(inventory_id))
            .cloned())
    }

    async fn find_device_objects(
        &self,
        filter: &str,
    ) -> DirectoryResult<Vec<IdentityDeviceObject>> {
        self.record(DirectoryCall::FindDeviceObjects(filter.to_string()));
        self.check_reads()?;
        let predicate = Predicate::parse(filter)?;
        if predicate.property() != filter::DEVICE_ID {
            return Err(unknown_property(predicate.property()));
        }
        Ok(self
            .device_objects
            .iter()
            .filter(|o| predicate.matches(Some(&o.device_id)))
            .cloned()
            .collect())
    }

    async fn find_groups(&self, filter: &str) -> DirectoryResult<Vec<GroupCandidate>> {
        self.record(DirectoryCall::FindGroups(filter.to_string()));
        self.check_reads()?;
        let predicate = Predicate::parse(filter)?;
        if predicate.property() != filter::DISPLAY_NAME {
            return Err(unknown_property(predicate.property()));
        }
        Ok(self
            .groups
            .iter()
            .filter(|g| predicate.matches(Some(&g.display_name)))
            .cloned()
            .collect())
    }

    async fn add_group_member(
        &self,
        group_id: &str,
        member_object_id: &str,
    ) -> DirectoryResult<()> {
        self.record(DirectoryCall::AddGroupMember {
            group_id: group_id.to_string(),
            member_object_id: member_object_id.to_string(),
        });
        match &self.behavior {
            MockBehavior::FailAdd(e) => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

fn unknown_property(property: &str) -> DirectoryError {
    DirectoryError::service(400, "BadRequest", format!("unsupported property '{property}'"))
}

/// The two filter shapes the workflow emits. Matching is case-insensitive,
/// as in the directory service.
#[derive(Debug)]
enum Predicate {
    Eq(String, String),
    Contains(String, String),
}

impl Predicate {
    fn parse(expression: &str) -> DirectoryResult<Self> {
        let invalid = || DirectoryError::service(400, "BadRequest", format!("invalid filter: {expression}"));

        if let Some(rest) = expression.strip_prefix("contains(") {
            let body = rest.strip_suffix("')").ok_or_else(invalid)?;
            let (property, literal) = body.split_once(",'").ok_or_else(invalid)?;
            let literal = unescape(literal).ok_or_else(invalid)?;
            return Ok(Self::Contains(property.to_string(), literal));
        }

        let (property, rest) = expression.split_once(" eq '").ok_or_else(invalid)?;
        let literal = rest.strip_suffix('\'').ok_or_else(invalid)?;
        let literal = unescape(literal).ok_or_else(invalid)?;
        Ok(Self::Eq(property.to_string(), literal))
    }

    fn property(&self) -> &str {
        match self {
            Self::Eq(p, _) | Self::Contains(p, _) => p,
        }
    }

    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Self::Eq(_, literal) => value.eq_ignore_ascii_case(literal),
            Self::Contains(_, literal) => value.to_lowercase().contains(&literal.to_lowercase()),
        }
    }
}

/// Reverses quote doubling. `None` if a lone quote would end the literal early.
fn unescape(literal: &str) -> Option<String> {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.next() != Some('\'') {
                return None;
            }
        }
        out.push(c);
    }
    Some(out)
}

/// [`Console`] driven by a fixed list of answers.
///
/// Running out of answers reads as end of input.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    /// Every prompt passed to `ask`, in order.
    pub prompts: Vec<String>,
    /// Every notice shown, in order.
    pub notices: Vec<String>,
    /// Device tables shown, as inventory identifiers.
    pub device_tables: Vec<Vec<String>>,
    /// Group tables shown, as object identifiers.
    pub group_tables: Vec<Vec<String>>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Console for ScriptedConsole {
    fn show_devices(&mut self, devices: &[DeviceRecord]) {
        self.device_tables
            .push(devices.iter().map(|d| d.inventory_id.clone()).collect());
    }

    fn show_groups(&mut self, groups: &[GroupCandidate]) {
        self.group_tables
            .push(groups.iter().map(|g| g.object_id.clone()).collect());
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
