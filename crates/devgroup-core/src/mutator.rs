//! Membership mutation.

use tracing::{info, instrument};

use crate::directory::DirectoryClient;
use crate::error::DirectoryResult;
use crate::model::MembershipRequest;

/// Performs the single membership add of a run.
///
/// The call is made once. Whatever the service answers is the outcome,
/// including an error for a device that is already a member.
pub struct MembershipMutator<'a> {
    directory: &'a dyn DirectoryClient,
}

impl<'a> MembershipMutator<'a> {
    pub fn new(directory: &'a dyn DirectoryClient) -> Self {
        Self { directory }
    }

    #[instrument(skip(self), fields(group_id = %request.group_id, member = %request.member_object_id))]
    pub async fn add_member(&self, request: &MembershipRequest) -> DirectoryResult<()> {
        info!(
            "Adding {} to group {}",
            request.member_object_id, request.group_id
        );

        self.directory
            .add_group_member(&request.group_id, &request.member_object_id)
            .await?;

        info!("Membership added");
        Ok(())
    }
}
