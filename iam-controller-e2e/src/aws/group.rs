//! Group snapshots from the IAM API.

use aws_sdk_iam::types::Group;
use aws_sdk_iam::Client as IamClient;

use crate::aws::{found, AwsResult};
use crate::error::E2eResult;
use crate::wait::{wait_for_presence, Presence, WaitOptions};

pub async fn get(client: &IamClient, group_name: &str) -> AwsResult<Option<Group>> {
    let response = client.get_group().group_name(group_name).send().await;
    Ok(found(response, &format!("GetGroup({group_name})"))?.and_then(|output| output.group))
}

pub async fn get_attached_policy_arns(
    client: &IamClient,
    group_name: &str,
) -> AwsResult<Option<Vec<String>>> {
    let response = client
        .list_attached_group_policies()
        .group_name(group_name)
        .send()
        .await;
    Ok(
        found(response, &format!("ListAttachedGroupPolicies({group_name})"))?.map(|output| {
            output
                .attached_policies
                .unwrap_or_default()
                .into_iter()
                .filter_map(|p| p.policy_arn)
                .collect()
        }),
    )
}

/// Names of the group's members, across every page of `GetGroup`.
pub async fn get_user_names(
    client: &IamClient,
    group_name: &str,
) -> AwsResult<Option<Vec<String>>> {
    let mut pages = client
        .get_group()
        .group_name(group_name)
        .into_paginator()
        .send();

    let mut names = Vec::new();
    while let Some(page) = pages.next().await {
        let Some(page) = found(page, &format!("GetGroup({group_name})"))? else {
            return Ok(None);
        };
        names.extend(page.users.into_iter().map(|u| u.user_name));
    }
    Ok(Some(names))
}

pub async fn wait_until_exists(
    client: &IamClient,
    group_name: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence("Group", group_name, Presence::Exists, options, || {
        get(client, group_name)
    })
    .await
}

pub async fn wait_until_deleted(
    client: &IamClient,
    group_name: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence("Group", group_name, Presence::Deleted, options, || {
        get(client, group_name)
    })
    .await
}
