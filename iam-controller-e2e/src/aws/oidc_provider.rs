//! OpenID Connect provider snapshots from the IAM API, addressed by ARN.

use aws_sdk_iam::operation::get_open_id_connect_provider::GetOpenIdConnectProviderOutput;
use aws_sdk_iam::Client as IamClient;

use crate::aws::tags::{self, Tag};
use crate::aws::{found, AwsResult};
use crate::error::E2eResult;
use crate::wait::{wait_for_presence, Presence, WaitOptions};

pub async fn get(
    client: &IamClient,
    provider_arn: &str,
) -> AwsResult<Option<GetOpenIdConnectProviderOutput>> {
    let response = client
        .get_open_id_connect_provider()
        .open_id_connect_provider_arn(provider_arn)
        .send()
        .await;
    found(response, &format!("GetOpenIDConnectProvider({provider_arn})"))
}

pub async fn get_tags(client: &IamClient, provider_arn: &str) -> AwsResult<Option<Vec<Tag>>> {
    let response = client
        .list_open_id_connect_provider_tags()
        .open_id_connect_provider_arn(provider_arn)
        .send()
        .await;
    Ok(
        found(response, &format!("ListOpenIDConnectProviderTags({provider_arn})"))?
            .map(|output| tags::from_sdk(output.tags)),
    )
}

/// IAM stores provider URLs without the `https://` scheme.
pub fn url_matches(actual: &str, expected: &str) -> bool {
    if actual.starts_with("https://") {
        actual == expected
    } else {
        format!("https://{actual}") == expected
    }
}

pub async fn wait_until_exists(
    client: &IamClient,
    provider_arn: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence(
        "OpenIdConnectProvider",
        provider_arn,
        Presence::Exists,
        options,
        || get(client, provider_arn),
    )
    .await
}

pub async fn wait_until_deleted(
    client: &IamClient,
    provider_arn: &str,
    options: WaitOptions,
) -> E2eResult<()> {
    wait_for_presence(
        "OpenIdConnectProvider",
        provider_arn,
        Presence::Deleted,
        options,
        || get(client, provider_arn),
    )
    .await
}
