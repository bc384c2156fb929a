//! Role snapshots from the IAM API.

use std::collections::BTreeMap;

use aws_sdk_iam::types::Role;
use aws_sdk_iam::Client as IamClient;
use serde_json::Value;

use crate::aws::documents::{decode_policy_document, parse_policy_document};
use crate::aws::tags::{self, Tag};
use crate::aws::{found, AwsResult};
use crate::error::E2eResult;
use crate::wait::{wait_for_presence, Presence, WaitOptions};

/// The Role record, or `None` if no such Role exists.
pub async fn get(client: &IamClient, role_name: &str) -> AwsResult<Option<Role>> {
    let response = client.get_role().role_name(role_name).send().await;
    Ok(found(response, &format!("GetRole({role_name})"))?.and_then(|output| output.role))
}

/// ARNs of the managed policies attached to the Role.
pub async fn get_attached_policy_arns(
    client: &IamClient,
    role_name: &str,
) -> AwsResult<Option<Vec<String>>> {
    let response = client
        .list_attached_role_policies()
        .role_name(role_name)
        .send()
        .await;
    Ok(
        found(response, &format!("ListAttachedRolePolicies({role_name})"))?.map(|output| {
            output
                .attached_policies
                .unwrap_or_default()
                .into_iter()
                .filter_map(|p| p.policy_arn)
                .collect()
        }),
    )
}

pub async fn get_tags(client: &IamClient, role_name: &str) -> AwsResult<Option<Vec<Tag>>> {
    let response = client.list_role_tags().role_name(role_name).send().await;
    Ok(found(response, &format!("ListRoleTags({role_name})"))?.map(|output| tags::from_sdk(output.tags)))
}

/// Inline policy name → decoded policy document text.
pub async fn get_inline_policies(
    client: &IamClient,
    role_name: &str,
) -> AwsResult<Option<BTreeMap<String, String>>> {
    let response = client.list_role_policies().role_name(role_name).send().await;
    let Some(listing) = found(response, &format!("ListRolePolicies({role_name})"))? else {
        return Ok(None);
    };

    let mut policies = BTreeMap::new();
    for policy_name in listing.policy_names {
        let response = client
            .get_role_policy()
            .role_name(role_name)
            .policy_name(&policy_name)
            .send()
            .await;
        let Some(output) = found(response, &format!("GetRolePolicy({role_name}, {policy_name})"))?
        else {
            // Role deleted between the two calls.
            return Ok(None);
        };
        policies.insert(policy_name, decode_policy_document(&output.policy_document)?);
    }
    Ok(Some(policies))
}

/// The Role's trust policy, parsed.
pub async fn get_assume_role_policy(
    client: &IamClient,
    role_name: &str,
) -> AwsResult<Option<Value>> {
    let Some(role) = get(client, role_name).await? else {
        return Ok(None);
    };
    role.assume_role_policy_document
        .as_deref()
        .map(parse_policy_document)
        .transpose()
}

pub async fn wait_until_exists(
    client: &IamClient,
    role_name: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence("Role", role_name, Presence::Exists, options, || {
        get(client, role_name)
    })
    .await
}

pub async fn wait_until_deleted(
    client: &IamClient,
    role_name: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence("Role", role_name, Presence::Deleted, options, || {
        get(client, role_name)
    })
    .await
}
