//! Instance profile snapshots from the IAM API.

use aws_sdk_iam::types::InstanceProfile;
use aws_sdk_iam::Client as IamClient;

use crate::aws::tags::{self, Tag};
use crate::aws::{found, AwsResult};

pub async fn get(
    client: &IamClient,
    instance_profile_name: &str,
) -> AwsResult<Option<InstanceProfile>> {
    let response = client
        .get_instance_profile()
        .instance_profile_name(instance_profile_name)
        .send()
        .await;
    Ok(
        found(response, &format!("GetInstanceProfile({instance_profile_name})"))?
            .and_then(|output| output.instance_profile),
    )
}

pub async fn get_tags(
    client: &IamClient,
    instance_profile_name: &str,
) -> AwsResult<Option<Vec<Tag>>> {
    let response = client
        .list_instance_profile_tags()
        .instance_profile_name(instance_profile_name)
        .send()
        .await;
    Ok(
        found(response, &format!("ListInstanceProfileTags({instance_profile_name})"))?
            .map(|output| tags::from_sdk(output.tags)),
    )
}

/// Names of the roles attached to the instance profile.
pub fn role_names(profile: &InstanceProfile) -> Vec<&str> {
    profile.roles.iter().map(|r| r.role_name.as_str()).collect()
}
