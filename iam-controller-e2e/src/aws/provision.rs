//! Provisioning of the ephemeral principals scenarios adopt.
//!
//! Everything here mutates IAM and is only used by bootstrap and cleanup,
//! never by the pollers.

use aws_sdk_iam::Client as IamClient;
use serde_json::{json, Value};

use crate::aws::{found, AwsError, AwsResult};

/// Trust policy allowing `service` (e.g. `eks.amazonaws.com`) to assume a role.
pub fn trust_policy_for_service(service: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": {"Service": [service]},
            "Action": ["sts:AssumeRole"]
        }]
    })
}

pub struct IamProvisioner {
    client: IamClient,
}

impl IamProvisioner {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }

    /// Create a role assumable by `service`; returns its ARN.
    pub async fn create_role(&self, role_name: &str, service: &str) -> AwsResult<String> {
        let trust_json = serde_json::to_string(&trust_policy_for_service(service))
            .map_err(|e| AwsError::PolicyError(format!("Failed to serialize trust policy: {e}")))?;

        let response = self
            .client
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(trust_json)
            .description("Bootstrapped for IAM controller e2e adoption tests")
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!("Failed to create role '{role_name}': {e:?}"))
            })?;

        let arn = response
            .role
            .map(|r| r.arn)
            .ok_or_else(|| AwsError::IamError(format!("CreateRole({role_name}) returned no role")))?;
        log::info!("Created role {} ({})", role_name, arn);
        Ok(arn)
    }

    pub async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> AwsResult<()> {
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!(
                    "Failed to attach policy '{policy_arn}' to role '{role_name}': {e}"
                ))
            })?;
        Ok(())
    }

    /// Create a customer managed policy; returns its ARN.
    pub async fn create_policy(&self, policy_name: &str, document: &Value) -> AwsResult<String> {
        let policy_json = serde_json::to_string(document)
            .map_err(|e| AwsError::PolicyError(format!("Failed to serialize policy: {e}")))?;

        let response = self
            .client
            .create_policy()
            .policy_name(policy_name)
            .policy_document(policy_json)
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!("Failed to create policy '{policy_name}': {e:?}"))
            })?;

        let arn = response.policy.and_then(|p| p.arn).ok_or_else(|| {
            AwsError::IamError(format!("CreatePolicy({policy_name}) returned no ARN"))
        })?;
        log::info!("Created policy {} ({})", policy_name, arn);
        Ok(arn)
    }

    /// Detach every managed policy, drop every inline policy, then delete the
    /// role. A role that is already gone is not an error.
    pub async fn delete_role(&self, role_name: &str) -> AwsResult<()> {
        let attached = self
            .client
            .list_attached_role_policies()
            .role_name(role_name)
            .send()
            .await;
        let Some(attached) = found(attached, &format!("ListAttachedRolePolicies({role_name})"))?
        else {
            log::info!("Role {} already deleted", role_name);
            return Ok(());
        };
        for policy_arn in attached
            .attached_policies
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.policy_arn)
        {
            let response = self
                .client
                .detach_role_policy()
                .role_name(role_name)
                .policy_arn(&policy_arn)
                .send()
                .await;
            found(response, &format!("DetachRolePolicy({role_name}, {policy_arn})"))?;
        }

        let inline = self.client.list_role_policies().role_name(role_name).send().await;
        if let Some(inline) = found(inline, &format!("ListRolePolicies({role_name})"))? {
            for policy_name in inline.policy_names {
                let response = self
                    .client
                    .delete_role_policy()
                    .role_name(role_name)
                    .policy_name(&policy_name)
                    .send()
                    .await;
                found(response, &format!("DeleteRolePolicy({role_name}, {policy_name})"))?;
            }
        }

        let response = self.client.delete_role().role_name(role_name).send().await;
        found(response, &format!("DeleteRole({role_name})"))?;
        log::info!("Deleted role {}", role_name);
        Ok(())
    }

    /// Delete a managed policy along with its non-default versions. A policy
    /// that is already gone is not an error.
    pub async fn delete_policy(&self, policy_arn: &str) -> AwsResult<()> {
        let versions = self
            .client
            .list_policy_versions()
            .policy_arn(policy_arn)
            .send()
            .await;
        let Some(versions) = found(versions, &format!("ListPolicyVersions({policy_arn})"))? else {
            log::info!("Policy {} already deleted", policy_arn);
            return Ok(());
        };
        for version in versions.versions.unwrap_or_default() {
            if version.is_default_version {
                continue;
            }
            let Some(version_id) = version.version_id else {
                continue;
            };
            let response = self
                .client
                .delete_policy_version()
                .policy_arn(policy_arn)
                .version_id(&version_id)
                .send()
                .await;
            found(response, &format!("DeletePolicyVersion({policy_arn}, {version_id})"))?;
        }

        let response = self.client.delete_policy().policy_arn(policy_arn).send().await;
        found(response, &format!("DeletePolicy({policy_arn})"))?;
        log::info!("Deleted policy {}", policy_arn);
        Ok(())
    }
}
