//! User snapshots from the IAM API.

use aws_sdk_iam::types::User;
use aws_sdk_iam::Client as IamClient;

use crate::aws::tags::{self, Tag};
use crate::aws::{found, AwsResult};
use crate::error::E2eResult;
use crate::wait::{wait_for_presence, Presence, WaitOptions};

pub async fn get(client: &IamClient, user_name: &str) -> AwsResult<Option<User>> {
    let response = client.get_user().user_name(user_name).send().await;
    Ok(found(response, &format!("GetUser({user_name})"))?.and_then(|output| output.user))
}

pub async fn get_attached_policy_arns(
    client: &IamClient,
    user_name: &str,
) -> AwsResult<Option<Vec<String>>> {
    let response = client
        .list_attached_user_policies()
        .user_name(user_name)
        .send()
        .await;
    Ok(
        found(response, &format!("ListAttachedUserPolicies({user_name})"))?.map(|output| {
            output
                .attached_policies
                .unwrap_or_default()
                .into_iter()
                .filter_map(|p| p.policy_arn)
                .collect()
        }),
    )
}

pub async fn get_tags(client: &IamClient, user_name: &str) -> AwsResult<Option<Vec<Tag>>> {
    let response = client.list_user_tags().user_name(user_name).send().await;
    Ok(found(response, &format!("ListUserTags({user_name})"))?.map(|output| tags::from_sdk(output.tags)))
}

pub async fn wait_until_exists(
    client: &IamClient,
    user_name: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence("User", user_name, Presence::Exists, options, || {
        get(client, user_name)
    })
    .await
}

pub async fn wait_until_deleted(
    client: &IamClient,
    user_name: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence("User", user_name, Presence::Deleted, options, || {
        get(client, user_name)
    })
    .await
}
