//! Groups and their members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::endpoint::Endpoint;
use crate::options::RequestOption;
use crate::types::{string_or_number, Group, GroupMemberRole, Identifier, User};
use crate::{Client, Response, Result};

/// A membership: one user in one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupUser {
    /// Id of the membership itself.
    pub id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub role: GroupMemberRole,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub group: Option<Group>,
    pub user: Option<User>,
}

/// Filter and paging for group and member listings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListGroupsRequest {
    /// Only memberships with this role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<GroupMemberRole>,

    /// Rows to skip; pages hold 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Query for [`GroupService::members`].
pub type ListMembersRequest = ListGroupsRequest;

/// Body for [`GroupService::update_member`].
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMemberRequest {
    pub role: GroupMemberRole,
}

/// Result of [`GroupService::remove_member`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemovedMember {
    /// The removed user, sent as a string or a number.
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
}

/// Group endpoints. Obtain one with [`Client::groups`].
#[derive(Debug, Clone, Copy)]
pub struct GroupService<'a> {
    client: &'a Client,
}

impl<'a> GroupService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Lists the groups a user belongs to.
    pub async fn list_for_user(
        &self,
        cancel: &CancellationToken,
        user: impl Into<Identifier>,
        request: &ListGroupsRequest,
        opts: &[RequestOption],
    ) -> Result<Response<Vec<Group>>> {
        let endpoint = Endpoint::get(format!("users/{}/groups", user.into())).with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Lists the members of a group.
    pub async fn members(
        &self,
        cancel: &CancellationToken,
        group: impl Into<Identifier>,
        request: &ListMembersRequest,
        opts: &[RequestOption],
    ) -> Result<Response<Vec<GroupUser>>> {
        let endpoint = Endpoint::get(format!("groups/{}/users", group.into())).with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Changes a member's role, adding the user if needed.
    pub async fn update_member(
        &self,
        cancel: &CancellationToken,
        group: impl Into<Identifier>,
        user: impl Into<Identifier>,
        request: &UpdateMemberRequest,
        opts: &[RequestOption],
    ) -> Result<Response<GroupUser>> {
        let endpoint = Endpoint::put(format!("groups/{}/users/{}", group.into(), user.into()))
            .with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Removes a member from a group.
    pub async fn remove_member(
        &self,
        cancel: &CancellationToken,
        group: impl Into<Identifier>,
        user: impl Into<Identifier>,
        opts: &[RequestOption],
    ) -> Result<Response<RemovedMember>> {
        let endpoint = Endpoint::delete(format!("groups/{}/users/{}", group.into(), user.into()))
            .with_options(opts);
        self.client.call::<(), _>(&endpoint, None, cancel).await
    }
}
