//! Resources that must exist before the scenarios run.
//!
//! `bootstrap` creates a Role and a customer managed Policy that adoption
//! scenarios take over, and records them in a YAML file so later runs (and
//! `cleanup`) can find them again.

use std::path::Path;

use aws_sdk_iam::Client as IamClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::aws::provision::IamProvisioner;
use crate::error::{E2eError, E2eResult};
use crate::resources::random_suffix_name;

pub const ADOPTED_ROLE_PREFIX: &str = "adopted-role";
pub const ADOPTED_ROLE_SERVICE: &str = "eks.amazonaws.com";
pub const ADOPTED_ROLE_MANAGED_POLICIES: [&str; 2] = [
    "arn:aws:iam::aws:policy/AmazonSQSFullAccess",
    "arn:aws:iam::aws:policy/AmazonEC2FullAccess",
];
pub const ADOPTED_POLICY_PREFIX: &str = "adopted-policies";

const NAME_MAX_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrappedRole {
    pub name: String,
    pub arn: String,
    pub principal_service: String,
    pub managed_policies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrappedPolicies {
    pub names: Vec<String>,
    pub arns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResources {
    pub created_at: DateTime<Utc>,
    pub adopted_role: BootstrappedRole,
    pub adopted_policies: BootstrappedPolicies,
}

/// The document attached to each bootstrapped policy.
pub fn sample_policy_document() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": ["s3:ListBucket"],
            "Resource": "*"
        }]
    })
}

/// Create the adoptable Role and Policy.
///
/// When a step fails after the Role was created, the Role is removed again
/// before the error is returned.
pub async fn bootstrap(iam: &IamClient) -> E2eResult<BootstrapResources> {
    let provisioner = IamProvisioner::new(iam.clone());

    let role_name = random_suffix_name(ADOPTED_ROLE_PREFIX, NAME_MAX_LENGTH)?;
    let role_arn = provisioner
        .create_role(&role_name, ADOPTED_ROLE_SERVICE)
        .await?;

    match finish_bootstrap(&provisioner, &role_name).await {
        Ok(adopted_policies) => {
            let resources = BootstrapResources {
                created_at: Utc::now(),
                adopted_role: BootstrappedRole {
                    name: role_name,
                    arn: role_arn,
                    principal_service: ADOPTED_ROLE_SERVICE.to_string(),
                    managed_policies: ADOPTED_ROLE_MANAGED_POLICIES
                        .iter()
                        .map(|arn| arn.to_string())
                        .collect(),
                },
                adopted_policies,
            };
            log::info!(
                "Bootstrapped role {} and {} policies",
                resources.adopted_role.name,
                resources.adopted_policies.arns.len()
            );
            Ok(resources)
        }
        Err(e) => {
            log::warn!("Bootstrap failed, removing role {}: {}", role_name, e);
            if let Err(cleanup_err) = provisioner.delete_role(&role_name).await {
                log::error!("Failed to remove role {}: {}", role_name, cleanup_err);
            }
            Err(e)
        }
    }
}

async fn finish_bootstrap(
    provisioner: &IamProvisioner,
    role_name: &str,
) -> E2eResult<BootstrappedPolicies> {
    for policy_arn in ADOPTED_ROLE_MANAGED_POLICIES {
        provisioner.attach_role_policy(role_name, policy_arn).await?;
    }

    let policy_name = random_suffix_name(ADOPTED_POLICY_PREFIX, NAME_MAX_LENGTH)?;
    let policy_arn = provisioner
        .create_policy(&policy_name, &sample_policy_document())
        .await?;
    Ok(BootstrappedPolicies {
        names: vec![policy_name],
        arns: vec![policy_arn],
    })
}

impl BootstrapResources {
    /// Delete everything `bootstrap` created. Resources already gone are skipped.
    pub async fn cleanup(&self, iam: &IamClient) -> E2eResult<()> {
        let provisioner = IamProvisioner::new(iam.clone());
        provisioner.delete_role(&self.adopted_role.name).await?;
        for policy_arn in &self.adopted_policies.arns {
            provisioner.delete_policy(policy_arn).await?;
        }
        log::info!("Cleaned up bootstrap resources created at {}", self.created_at);
        Ok(())
    }

    pub fn write_to(&self, path: &Path) -> E2eResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        log::info!("Wrote bootstrap resources to {}", path.display());
        Ok(())
    }

    pub fn read_from(path: &Path) -> E2eResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            E2eError::bootstrap(format!(
                "cannot read bootstrap file {}: {e}",
                path.display()
            ))
        })?;
        Ok(serde_yaml::from_str(&yaml)?)
    }
}
