//! Selection state machine.
//!
//! A run moves strictly forward through
//! `ModeSelect → DeviceQuery → DeviceDisambiguate → IdentifierTranslate →
//! GroupQuery → GroupDisambiguate → Confirm → Mutate → Done`, and any stage
//! can end in `Failed`. The only repeats are answer prompts that reject a
//! value and ask again without leaving their stage.
//!
//! Device selection always prompts, even for a single candidate, because the
//! operator must name the inventory identifier. Group selection skips the
//! prompt when exactly one eligible group exists.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::console::Console;
use crate::directory::DirectoryClient;
use crate::error::DirectoryError;
use crate::groups::{GroupEligibilityFilter, GroupLookup, RejectedGroup};
use crate::model::{
    DeviceRecord, DeviceSelector, GroupCandidate, IdentityDeviceObject, MembershipRequest,
    SelectionMode,
};
use crate::mutator::MembershipMutator;
use crate::resolver::DeviceResolver;
use crate::translator::{IdentifierTranslator, Translation};

pub const DEVICE_PROMPT: &str = "Inventory identifier of the device to add";
pub const GROUP_PROMPT: &str = "Object identifier of the group";
pub const GROUP_NAME_PROMPT: &str = "Group display name";
pub const MODE_PROMPT: &str = "Choose 1, 2 or 3";
pub const CONFIRM_PROMPT: &str = "Add the device to this group? [y/N]";

/// Stages of a run, including the two terminal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ModeSelect,
    DeviceQuery,
    DeviceDisambiguate,
    IdentifierTranslate,
    GroupQuery,
    GroupDisambiguate,
    Confirm,
    Mutate,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ModeSelect => "mode selection",
            Self::DeviceQuery => "device query",
            Self::DeviceDisambiguate => "device selection",
            Self::IdentifierTranslate => "identifier translation",
            Self::GroupQuery => "group query",
            Self::GroupDisambiguate => "group selection",
            Self::Confirm => "confirmation",
            Self::Mutate => "membership add",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Why a run failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no managed device matched {0}")]
    NoDevices(DeviceSelector),

    #[error("no identity object exists for device '{device}' (cross-directory id: {cross_directory_id})")]
    NoIdentityObject {
        device: String,
        cross_directory_id: String,
    },

    #[error("no group named '{0}'")]
    NoGroup(String),

    #[error("no eligible group named '{name}'; rejected: {}", join_rejected(.rejected))]
    NoEligibleGroup {
        name: String,
        rejected: Vec<RejectedGroup>,
    },

    #[error("invalid selection exhausted after {0} attempt(s)")]
    SelectionExhausted(u32),

    #[error("input closed before a selection was made")]
    InputClosed,

    #[error("cancelled by operator")]
    Cancelled,

    #[error("console error: {0}")]
    Console(String),

    #[error("directory query failed: {0}")]
    Query(#[source] DirectoryError),

    #[error("membership add failed: {0}")]
    Mutation(#[source] DirectoryError),
}

fn join_rejected(rejected: &[RejectedGroup]) -> String {
    rejected
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A failed run: the stage it failed in and why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage}: {kind}")]
pub struct Failure {
    pub stage: Stage,
    pub kind: FailureKind,
}

impl Failure {
    pub fn new(stage: Stage, kind: FailureKind) -> Self {
        Self { stage, kind }
    }
}

/// What a successful run selected and whether the change was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub device: DeviceRecord,
    pub device_object: IdentityDeviceObject,
    pub group: GroupCandidate,
    pub request: MembershipRequest,
    /// False for dry runs.
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done(Completion),
    Failed(Failure),
}

impl Outcome {
    /// Process exit code: 0 for `Done`, 1 for `Failed`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Done(_) => 0,
            Self::Failed(_) => 1,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(f) => Some(f),
            Self::Done(_) => None,
        }
    }
}

/// Final outcome plus every stage entered, in order. A stage that
/// re-prompted still appears once.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: Outcome,
    pub path: Vec<Stage>,
}

/// Inputs known before the run starts.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorOptions {
    /// Device lookup; asked for interactively when `None`.
    pub selector: Option<DeviceSelector>,
    /// Target group display name; asked for interactively when `None`.
    pub group_name: Option<String>,
    /// Skip the confirmation question.
    pub assume_yes: bool,
    /// Stop after confirmation without changing anything.
    pub dry_run: bool,
    /// Rejected answers allowed per prompt; unlimited when `None`.
    pub max_attempts: Option<u32>,
}

#[derive(Debug)]
struct Target {
    device: DeviceRecord,
    object: IdentityDeviceObject,
}

#[derive(Debug)]
struct Selection {
    target: Target,
    group: GroupCandidate,
}

impl Selection {
    fn complete(self, request: MembershipRequest, applied: bool) -> Completion {
        Completion {
            device: self.target.device,
            device_object: self.target.object,
            group: self.group,
            request,
            applied,
        }
    }
}

#[derive(Debug)]
enum State {
    ModeSelect,
    DeviceQuery(DeviceSelector),
    DeviceDisambiguate(Vec<DeviceRecord>),
    IdentifierTranslate(DeviceRecord),
    GroupQuery(Target),
    GroupDisambiguate(Target, Vec<GroupCandidate>),
    Confirm(Selection),
    Mutate(Selection, MembershipRequest),
    Done(Completion),
    Failed(Failure),
}

impl State {
    fn stage(&self) -> Stage {
        match self {
            Self::ModeSelect => Stage::ModeSelect,
            Self::DeviceQuery(_) => Stage::DeviceQuery,
            Self::DeviceDisambiguate(_) => Stage::DeviceDisambiguate,
            Self::IdentifierTranslate(_) => Stage::IdentifierTranslate,
            Self::GroupQuery(_) => Stage::GroupQuery,
            Self::GroupDisambiguate(..) => Stage::GroupDisambiguate,
            Self::Confirm(_) => Stage::Confirm,
            Self::Mutate(..) => Stage::Mutate,
            Self::Done(_) => Stage::Done,
            Self::Failed(_) => Stage::Failed,
        }
    }
}

/// Drives one run from mode selection to a terminal state.
pub struct Coordinator<'d, 'c> {
    directory: &'d dyn DirectoryClient,
    console: &'c mut dyn Console,
    options: CoordinatorOptions,
}

impl<'d, 'c> Coordinator<'d, 'c> {
    pub fn new(
        directory: &'d dyn DirectoryClient,
        console: &'c mut dyn Console,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            directory,
            console,
            options,
        }
    }

    /// Runs the state machine to completion.
    pub async fn run(mut self) -> RunReport {
        let mut path = Vec::new();
        let mut state = State::ModeSelect;

        let outcome = loop {
            let stage = state.stage();
            debug!(%stage, "Entering stage");
            path.push(stage);

            let next = match state {
                State::Done(completion) => break Outcome::Done(completion),
                State::Failed(failure) => {
                    warn!(stage = %failure.stage, "Run failed: {}", failure.kind);
                    break Outcome::Failed(failure);
                }
                State::ModeSelect => self.select_mode(),
                State::DeviceQuery(selector) => self.query_devices(selector).await,
                State::DeviceDisambiguate(candidates) => self.select_device(candidates),
                State::IdentifierTranslate(device) => self.translate(device).await,
                State::GroupQuery(target) => self.query_groups(target).await,
                State::GroupDisambiguate(target, groups) => self.select_group(target, groups),
                State::Confirm(selection) => self.confirm(selection),
                State::Mutate(selection, request) => self.mutate(selection, request).await,
            };
            state = next.unwrap_or_else(State::Failed);
        };

        RunReport { outcome, path }
    }

    fn select_mode(&mut self) -> Result<State, Failure> {
        if let Some(selector) = self.options.selector.take() {
            let criterion = selector.criterion().trim();
            if criterion.is_empty() {
                return Err(Failure::new(
                    Stage::ModeSelect,
                    FailureKind::InvalidInput(format!(
                        "{} must not be blank",
                        selector.mode().criterion_prompt()
                    )),
                ));
            }
            return Ok(State::DeviceQuery(DeviceSelector::new(
                selector.mode(),
                criterion,
            )));
        }

        let menu: Vec<String> = SelectionMode::ALL
            .iter()
            .enumerate()
            .map(|(i, mode)| format!("  {}) {}", i + 1, mode.label()))
            .collect();
        self.console
            .notice(&format!("How should the device be found?\n{}", menu.join("\n")));

        let mode = self.ask_until(Stage::ModeSelect, MODE_PROMPT, |answer| {
            SelectionMode::from_menu_choice(answer)
                .ok_or_else(|| format!("'{answer}' is not an option; enter 1, 2 or 3"))
        })?;
        let criterion = self.ask_until(Stage::ModeSelect, mode.criterion_prompt(), non_blank)?;

        Ok(State::DeviceQuery(DeviceSelector::new(mode, criterion)))
    }

    #[instrument(skip(self))]
    async fn query_devices(&mut self, selector: DeviceSelector) -> Result<State, Failure> {
        let devices = DeviceResolver::new(self.directory)
            .resolve(&selector)
            .await
            .map_err(|e| Failure::new(Stage::DeviceQuery, FailureKind::Query(e)))?;

        if devices.is_empty() {
            return Err(Failure::new(
                Stage::DeviceQuery,
                FailureKind::NoDevices(selector),
            ));
        }

        info!("{} device(s) found for {}", devices.len(), selector);
        Ok(State::DeviceDisambiguate(devices))
    }

    fn select_device(&mut self, mut candidates: Vec<DeviceRecord>) -> Result<State, Failure> {
        self.console.show_devices(&candidates);

        let index = self.ask_until(Stage::DeviceDisambiguate, DEVICE_PROMPT, |answer| {
            candidates
                .iter()
                .position(|d| d.inventory_id.eq_ignore_ascii_case(answer))
                .ok_or_else(|| format!("'{answer}' is not one of the listed devices"))
        })?;

        Ok(State::IdentifierTranslate(candidates.swap_remove(index)))
    }

    async fn translate(&mut self, device: DeviceRecord) -> Result<State, Failure> {
        let cross_directory_id = device.cross_directory_id.clone().unwrap_or_default();

        match IdentifierTranslator::new(self.directory)
            .translate(&cross_directory_id)
            .await
        {
            Translation::Found(object) => {
                self.console.notice(&format!(
                    "Identity object {} found for {}",
                    object.object_id,
                    device.label()
                ));
                Ok(State::GroupQuery(Target { device, object }))
            }
            Translation::NotFound => Err(Failure::new(
                Stage::IdentifierTranslate,
                FailureKind::NoIdentityObject {
                    device: device.label().to_string(),
                    cross_directory_id: if cross_directory_id.trim().is_empty() {
                        "none".to_string()
                    } else {
                        cross_directory_id
                    },
                },
            )),
            Translation::Failed(e) => Err(Failure::new(
                Stage::IdentifierTranslate,
                FailureKind::Query(e),
            )),
        }
    }

    async fn query_groups(&mut self, target: Target) -> Result<State, Failure> {
        let name = match self.options.group_name.take() {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            Some(_) => {
                return Err(Failure::new(
                    Stage::GroupQuery,
                    FailureKind::InvalidInput("group name must not be blank".into()),
                ))
            }
            None => self.ask_until(Stage::GroupQuery, GROUP_NAME_PROMPT, non_blank)?,
        };

        let lookup = GroupEligibilityFilter::new(self.directory)
            .find_eligible(&name)
            .await
            .map_err(|e| Failure::new(Stage::GroupQuery, FailureKind::Query(e)))?;

        match lookup {
            GroupLookup::Eligible(groups) => Ok(State::GroupDisambiguate(target, groups)),
            GroupLookup::NoMatch => Err(Failure::new(Stage::GroupQuery, FailureKind::NoGroup(name))),
            GroupLookup::NoneEligible(rejected) => Err(Failure::new(
                Stage::GroupQuery,
                FailureKind::NoEligibleGroup { name, rejected },
            )),
        }
    }

    fn select_group(
        &mut self,
        target: Target,
        groups: Vec<GroupCandidate>,
    ) -> Result<State, Failure> {
        let mut groups = match <[GroupCandidate; 1]>::try_from(groups) {
            Ok([group]) => {
                self.console.notice(&format!(
                    "Only one eligible group: {} ({}), selected automatically",
                    group.display_name, group.object_id
                ));
                return Ok(State::Confirm(Selection { target, group }));
            }
            Err(groups) => groups,
        };

        self.console.show_groups(&groups);

        let index = self.ask_until(Stage::GroupDisambiguate, GROUP_PROMPT, |answer| {
            groups
                .iter()
                .position(|g| g.object_id.eq_ignore_ascii_case(answer))
                .ok_or_else(|| format!("'{answer}' is not one of the listed groups"))
        })?;

        Ok(State::Confirm(Selection {
            target,
            group: groups.swap_remove(index),
        }))
    }

    fn confirm(&mut self, selection: Selection) -> Result<State, Failure> {
        let request = MembershipRequest::new(&selection.group, &selection.target.object);

        self.console.notice(&format!(
            "Device: {} ({})\nObject: {}\nGroup:  {} ({})",
            selection.target.device.label(),
            selection.target.device.inventory_id,
            request.member_object_id,
            selection.group.display_name,
            request.group_id,
        ));

        if !self.options.assume_yes {
            let proceed = self.ask_until(Stage::Confirm, CONFIRM_PROMPT, parse_yes_no)?;
            if !proceed {
                return Err(Failure::new(Stage::Confirm, FailureKind::Cancelled));
            }
        }

        if self.options.dry_run {
            self.console.notice("Dry run: no membership was changed");
            return Ok(State::Done(selection.complete(request, false)));
        }

        Ok(State::Mutate(selection, request))
    }

    async fn mutate(
        &mut self,
        selection: Selection,
        request: MembershipRequest,
    ) -> Result<State, Failure> {
        MembershipMutator::new(self.directory)
            .add_member(&request)
            .await
            .map_err(|e| Failure::new(Stage::Mutate, FailureKind::Mutation(e)))?;

        Ok(State::Done(selection.complete(request, true)))
    }

    /// Asks until `parse` accepts the trimmed answer.
    ///
    /// Rejections are shown as notices and the same prompt is asked again.
    /// End of input, a console error or running out of attempts fails the
    /// current stage.
    fn ask_until<T, F>(&mut self, stage: Stage, prompt: &str, mut parse: F) -> Result<T, Failure>
    where
        F: FnMut(&str) -> Result<T, String>,
    {
        let mut rejected = 0u32;
        loop {
            let answer = self
                .console
                .ask(prompt)
                .map_err(|e| Failure::new(stage, FailureKind::Console(e.to_string())))?
                .ok_or_else(|| Failure::new(stage, FailureKind::InputClosed))?;

            match parse(answer.trim()) {
                Ok(value) => return Ok(value),
                Err(message) => {
                    rejected += 1;
                    debug!(%stage, rejected, "Answer rejected");
                    if self.options.max_attempts.is_some_and(|max| rejected >= max) {
                        return Err(Failure::new(
                            stage,
                            FailureKind::SelectionExhausted(rejected),
                        ));
                    }
                    self.console.notice(&message);
                }
            }
        }
    }
}

fn non_blank(answer: &str) -> Result<String, String> {
    if answer.is_empty() {
        Err("a value is required".to_string())
    } else {
        Ok(answer.to_string())
    }
}

fn parse_yes_no(answer: &str) -> Result<bool, String> {
    match answer.to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "" | "n" | "no" => Ok(false),
        _ => Err(format!("'{answer}' is not y or n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DirectoryCall, InMemoryDirectory, MockBehavior, ScriptedConsole};

    fn device(id: &str, name: &str, owner: &str, cross: &str) -> DeviceRecord {
        DeviceRecord {
            managed_device_name: Some(format!("{owner}_{name}")),
            display_name: Some(name.into()),
            manufacturer: Some("Contoso".into()),
            cross_directory_id: Some(cross.into()),
            owner_principal_name: Some(owner.into()),
            owner_id: Some(format!("user-{owner}")),
            ..DeviceRecord::new(id)
        }
    }

    fn object(object_id: &str, device_id: &str) -> IdentityDeviceObject {
        IdentityDeviceObject {
            object_id: object_id.into(),
            device_id: device_id.into(),
            display_name: None,
        }
    }

    fn group(id: &str, name: &str) -> GroupCandidate {
        GroupCandidate {
            object_id: id.into(),
            display_name: name.into(),
            description: None,
            group_types: vec![],
            mail_enabled: false,
            security_enabled: true,
        }
    }

    /// Two devices for alice, one for bob (unjoined), three groups named
    /// Secure-Laptops of which only g-ok is eligible.
    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with_device(device("inv-1", "LAPTOP-A1", "alice@example.com", "aad-1"))
            .with_device(device("inv-2", "LAPTOP-A2", "alice@example.com", "aad-2"))
            .with_device(device("inv-9", "STALE-PC", "bob@example.com", "aad-9"))
            .with_device_object(object("obj-1", "aad-1"))
            .with_device_object(object("obj-2", "aad-2"))
            .with_group(GroupCandidate {
                mail_enabled: true,
                ..group("g-mail", "Secure-Laptops")
            })
            .with_group(group("g-ok", "Secure-Laptops"))
            .with_group(GroupCandidate {
                group_types: vec!["DynamicMembership".into()],
                ..group("g-dyn", "Secure-Laptops")
            })
            .with_group(group("k-1", "Kiosks"))
            .with_group(group("k-2", "Kiosks"))
            .with_group(GroupCandidate {
                security_enabled: false,
                ..group("m-1", "Marketing")
            })
    }

    fn options(selector: DeviceSelector, group_name: &str) -> CoordinatorOptions {
        CoordinatorOptions {
            selector: Some(selector),
            group_name: Some(group_name.into()),
            ..Default::default()
        }
    }

    fn failure(report: &RunReport) -> &Failure {
        report.outcome.failure().expect("run should have failed")
    }

    #[tokio::test]
    async fn test_owner_with_two_devices_selects_second_and_adds() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["inv-2", "y"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            options(
                DeviceSelector::Owner("alice@example.com".into()),
                "Secure-Laptops",
            ),
        )
        .run()
        .await;

        assert_eq!(report.outcome.exit_code(), 0);
        match &report.outcome {
            Outcome::Done(completion) => {
                assert_eq!(completion.device.inventory_id, "inv-2");
                assert_eq!(completion.device_object.object_id, "obj-2");
                assert_eq!(completion.group.object_id, "g-ok");
                assert!(completion.applied);
            }
            other => panic!("expected Done, got {other:?}"),
        }
        assert_eq!(
            directory.calls().last(),
            Some(&DirectoryCall::AddGroupMember {
                group_id: "g-ok".into(),
                member_object_id: "obj-2".into(),
            })
        );
        assert_eq!(
            report.path,
            vec![
                Stage::ModeSelect,
                Stage::DeviceQuery,
                Stage::DeviceDisambiguate,
                Stage::IdentifierTranslate,
                Stage::GroupQuery,
                Stage::GroupDisambiguate,
                Stage::Confirm,
                Stage::Mutate,
                Stage::Done,
            ]
        );
        assert_eq!(console.device_tables, vec![vec!["inv-1", "inv-2"]]);
    }

    #[tokio::test]
    async fn test_identifier_without_identity_object_fails_before_mutation() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["inv-9"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            options(DeviceSelector::Identifier("inv-9".into()), "Secure-Laptops"),
        )
        .run()
        .await;

        assert_eq!(report.outcome.exit_code(), 1);
        let failure = failure(&report);
        assert_eq!(failure.stage, Stage::IdentifierTranslate);
        assert!(matches!(
            failure.kind,
            FailureKind::NoIdentityObject { ref cross_directory_id, .. } if cross_directory_id == "aad-9"
        ));
        assert!(failure.to_string().contains("no identity object"));
        assert_eq!(directory.add_count(), 0);
        assert!(!directory
            .calls()
            .iter()
            .any(|c| matches!(c, DirectoryCall::FindGroups(_))));
    }

    #[tokio::test]
    async fn test_single_eligible_group_is_auto_selected() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["inv-1"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            CoordinatorOptions {
                assume_yes: true,
                ..options(
                    DeviceSelector::Owner("alice@example.com".into()),
                    "Secure-Laptops",
                )
            },
        )
        .run()
        .await;

        assert!(report.outcome.is_done());
        assert!(console.group_tables.is_empty());
        assert!(!console.prompts.iter().any(|p| p == GROUP_PROMPT));
        assert_eq!(
            directory.calls().last(),
            Some(&DirectoryCall::AddGroupMember {
                group_id: "g-ok".into(),
                member_object_id: "obj-1".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_single_device_still_prompts() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["inv-9"]);
        let _ = Coordinator::new(
            &directory,
            &mut console,
            options(DeviceSelector::Owner("bob@example.com".into()), "Secure-Laptops"),
        )
        .run()
        .await;

        assert_eq!(console.device_tables, vec![vec!["inv-9"]]);
        assert_eq!(console.prompts.first().map(String::as_str), Some(DEVICE_PROMPT));
    }

    #[tokio::test]
    async fn test_zero_matches_fail_without_translation_for_every_mode() {
        for selector in [
            DeviceSelector::Owner("nobody@example.com".into()),
            DeviceSelector::Name("NO-SUCH-HOST".into()),
            DeviceSelector::Identifier("inv-404".into()),
        ] {
            let directory = directory();
            let mut console = ScriptedConsole::default();
            let report = Coordinator::new(
                &directory,
                &mut console,
                options(selector.clone(), "Secure-Laptops"),
            )
            .run()
            .await;

            let failure = failure(&report);
            assert_eq!(failure.stage, Stage::DeviceQuery);
            assert_eq!(failure.kind, FailureKind::NoDevices(selector));
            assert!(!report.path.contains(&Stage::IdentifierTranslate));
            assert_eq!(directory.calls().len(), 1);
            assert!(console.prompts.is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_device_id_is_rejected_and_reprompted() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["inv-9", "inv-1", "y"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            options(
                DeviceSelector::Owner("alice@example.com".into()),
                "Secure-Laptops",
            ),
        )
        .run()
        .await;

        assert!(report.outcome.is_done());
        assert_eq!(
            console.prompts.iter().filter(|p| *p == DEVICE_PROMPT).count(),
            2
        );
        assert!(console
            .notices
            .iter()
            .any(|n| n.contains("'inv-9' is not one of the listed devices")));
    }

    #[tokio::test]
    async fn test_rejected_device_id_never_advances() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["bogus", "also-bogus"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            options(
                DeviceSelector::Owner("alice@example.com".into()),
                "Secure-Laptops",
            ),
        )
        .run()
        .await;

        let failure = failure(&report);
        assert_eq!(failure.stage, Stage::DeviceDisambiguate);
        assert_eq!(failure.kind, FailureKind::InputClosed);
        assert!(!report.path.contains(&Stage::IdentifierTranslate));
        assert!(!directory
            .calls()
            .iter()
            .any(|c| matches!(c, DirectoryCall::FindDeviceObjects(_))));
    }

    #[tokio::test]
    async fn test_max_attempts_bounds_reprompting() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["x", "y", "z", "inv-1"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            CoordinatorOptions {
                max_attempts: Some(3),
                ..options(
                    DeviceSelector::Owner("alice@example.com".into()),
                    "Secure-Laptops",
                )
            },
        )
        .run()
        .await;

        assert_eq!(
            failure(&report).kind,
            FailureKind::SelectionExhausted(3)
        );
        assert_eq!(console.remaining(), 1);
    }

    #[tokio::test]
    async fn test_multiple_eligible_groups_prompt_and_validate() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["inv-1", "g-ok", "k-2", "yes"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            options(DeviceSelector::Owner("alice@example.com".into()), "Kiosks"),
        )
        .run()
        .await;

        assert!(report.outcome.is_done());
        assert_eq!(console.group_tables, vec![vec!["k-1", "k-2"]]);
        assert_eq!(
            console.prompts.iter().filter(|p| *p == GROUP_PROMPT).count(),
            2
        );
        assert_eq!(
            directory.calls().last(),
            Some(&DirectoryCall::AddGroupMember {
                group_id: "k-2".into(),
                member_object_id: "obj-1".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_no_group_and_no_eligible_group_are_reported_differently() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["inv-1"]);
        let missing = Coordinator::new(
            &directory,
            &mut console,
            options(DeviceSelector::Owner("alice@example.com".into()), "Nope"),
        )
        .run()
        .await;

        let mut console = ScriptedConsole::new(["inv-1"]);
        let ineligible = Coordinator::new(
            &directory,
            &mut console,
            options(DeviceSelector::Owner("alice@example.com".into()), "Marketing"),
        )
        .run()
        .await;

        assert_eq!(failure(&missing).kind, FailureKind::NoGroup("Nope".into()));
        let failure = failure(&ineligible);
        assert_eq!(failure.stage, Stage::GroupQuery);
        assert!(matches!(failure.kind, FailureKind::NoEligibleGroup { .. }));
        assert!(failure.to_string().contains("m-1 (not security-enabled)"));
        assert_eq!(directory.add_count(), 0);
    }

    #[tokio::test]
    async fn test_interactive_mode_menu_loops_until_valid() {
        let directory = directory();
        let mut console =
            ScriptedConsole::new(["9", "owner", "2", "", "LAPTOP-A2", "inv-2", "", "Secure-Laptops", "y"]);
        let report = Coordinator::new(&directory, &mut console, CoordinatorOptions::default())
            .run()
            .await;

        assert!(report.outcome.is_done(), "{:?}", report.outcome);
        assert_eq!(
            console.prompts.iter().filter(|p| *p == MODE_PROMPT).count(),
            3
        );
        assert_eq!(
            directory.calls().first(),
            Some(&DirectoryCall::FindManagedDevices(
                "contains(deviceName,'LAPTOP-A2')".into()
            ))
        );
        assert!(console.prompts.iter().any(|p| p == GROUP_NAME_PROMPT));
    }

    #[tokio::test]
    async fn test_declined_confirmation_cancels_without_mutation() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["inv-1", "maybe", "n"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            options(
                DeviceSelector::Owner("alice@example.com".into()),
                "Secure-Laptops",
            ),
        )
        .run()
        .await;

        let failure = failure(&report);
        assert_eq!(failure.stage, Stage::Confirm);
        assert_eq!(failure.kind, FailureKind::Cancelled);
        assert_eq!(directory.add_count(), 0);
    }

    #[tokio::test]
    async fn test_dry_run_reaches_done_without_mutation() {
        let directory = directory();
        let mut console = ScriptedConsole::new(["inv-1"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            CoordinatorOptions {
                assume_yes: true,
                dry_run: true,
                ..options(
                    DeviceSelector::Owner("alice@example.com".into()),
                    "Secure-Laptops",
                )
            },
        )
        .run()
        .await;

        match report.outcome {
            Outcome::Done(ref completion) => assert!(!completion.applied),
            ref other => panic!("expected Done, got {other:?}"),
        }
        assert_eq!(report.outcome.exit_code(), 0);
        assert!(!report.path.contains(&Stage::Mutate));
        assert_eq!(directory.add_count(), 0);
    }

    #[tokio::test]
    async fn test_mutation_failure_is_reported_once() {
        let error = DirectoryError::service(403, "Authorization_RequestDenied", "Insufficient privileges");
        let directory = directory().with_behavior(MockBehavior::FailAdd(error.clone()));
        let mut console = ScriptedConsole::new(["inv-1"]);
        let report = Coordinator::new(
            &directory,
            &mut console,
            CoordinatorOptions {
                assume_yes: true,
                ..options(
                    DeviceSelector::Owner("alice@example.com".into()),
                    "Secure-Laptops",
                )
            },
        )
        .run()
        .await;

        let failure = failure(&report);
        assert_eq!(failure.stage, Stage::Mutate);
        assert_eq!(failure.kind, FailureKind::Mutation(error));
        assert!(failure.to_string().contains("Insufficient privileges"));
        assert_eq!(directory.add_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_query_error_is_fatal() {
        let error = DirectoryError::Connection("dns failure".into());
        let directory = directory().with_behavior(MockBehavior::FailQueries(error.clone()));
        let mut console = ScriptedConsole::default();
        let report = Coordinator::new(
            &directory,
            &mut console,
            options(
                DeviceSelector::Owner("alice@example.com".into()),
                "Secure-Laptops",
            ),
        )
        .run()
        .await;

        let failure = failure(&report);
        assert_eq!(failure.stage, Stage::DeviceQuery);
        assert_eq!(failure.kind, FailureKind::Query(error));
    }

    #[tokio::test]
    async fn test_blank_upfront_criterion_fails_at_mode_select() {
        let directory = directory();
        let mut console = ScriptedConsole::default();
        let report = Coordinator::new(
            &directory,
            &mut console,
            options(DeviceSelector::Name("  ".into()), "Secure-Laptops"),
        )
        .run()
        .await;

        let failure = failure(&report);
        assert_eq!(failure.stage, Stage::ModeSelect);
        assert!(matches!(failure.kind, FailureKind::InvalidInput(_)));
        assert!(directory.calls().is_empty());
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("Y"), Ok(true));
        assert_eq!(parse_yes_no("yes"), Ok(true));
        assert_eq!(parse_yes_no(""), Ok(false));
        assert_eq!(parse_yes_no("No"), Ok(false));
        assert!(parse_yes_no("sure").is_err());
    }
}
