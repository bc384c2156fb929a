//! Managed policy snapshots from the IAM API, addressed by ARN.

use aws_sdk_iam::types::{Policy, PolicyVersion};
use aws_sdk_iam::Client as IamClient;
use serde_json::Value;

use crate::aws::documents::parse_policy_document;
use crate::aws::tags::{self, Tag};
use crate::aws::{found, AwsResult};
use crate::error::E2eResult;
use crate::wait::{wait_for_presence, Presence, WaitOptions};

pub async fn get(client: &IamClient, policy_arn: &str) -> AwsResult<Option<Policy>> {
    let response = client.get_policy().policy_arn(policy_arn).send().await;
    Ok(found(response, &format!("GetPolicy({policy_arn})"))?.and_then(|output| output.policy))
}

pub async fn get_tags(client: &IamClient, policy_arn: &str) -> AwsResult<Option<Vec<Tag>>> {
    let response = client.list_policy_tags().policy_arn(policy_arn).send().await;
    Ok(found(response, &format!("ListPolicyTags({policy_arn})"))?
        .map(|output| tags::from_sdk(output.tags)))
}

/// A specific version of the policy, e.g. `"v1"`.
pub async fn get_version(
    client: &IamClient,
    policy_arn: &str,
    version_id: &str,
) -> AwsResult<Option<PolicyVersion>> {
    let response = client
        .get_policy_version()
        .policy_arn(policy_arn)
        .version_id(version_id)
        .send()
        .await;
    Ok(
        found(response, &format!("GetPolicyVersion({policy_arn}, {version_id})"))?
            .and_then(|output| output.policy_version),
    )
}

/// The parsed document of a specific policy version.
pub async fn get_version_document(
    client: &IamClient,
    policy_arn: &str,
    version_id: &str,
) -> AwsResult<Option<Value>> {
    let Some(version) = get_version(client, policy_arn, version_id).await? else {
        return Ok(None);
    };
    version.document.as_deref().map(parse_policy_document).transpose()
}

pub async fn wait_until_exists(
    client: &IamClient,
    policy_arn: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence("Policy", policy_arn, Presence::Exists, options, || {
        get(client, policy_arn)
    })
    .await
}

pub async fn wait_until_deleted(
    client: &IamClient,
    policy_arn: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence("Policy", policy_arn, Presence::Deleted, options, || {
        get(client, policy_arn)
    })
    .await
}
