//! Custom resource operations against the Kubernetes API.
//!
//! Resources are handled as untyped [`DynamicObject`]s and handed back to the
//! scenarios as `serde_json::Value`, so assertions can probe `spec` and
//! `status` fields without a typed mirror of every CRD.

pub mod condition;

use std::fmt;
use std::time::Duration;

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, Patch, PatchParams, PostParams};
use kube::Client;
use serde_json::Value;

use crate::error::{E2eError, E2eResult};
use crate::wait::{poll_until, WaitOptions};

pub const CRD_GROUP: &str = "iam.services.k8s.aws";
pub const CRD_VERSION: &str = "v1alpha1";

pub const CONSUMED_WAIT_PERIODS: u32 = 3;
pub const CONSUMED_PERIOD_LENGTH: Duration = Duration::from_secs(5);
pub const DELETE_WAIT_PERIODS: u32 = 3;
pub const DELETE_PERIOD_LENGTH: Duration = Duration::from_secs(10);

/// Custom resource kinds served by the IAM controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Role,
    Policy,
    Group,
    User,
    InstanceProfile,
    OpenIdConnectProvider,
    ServiceLinkedRole,
}

impl ResourceKind {
    pub fn kind(self) -> &'static str {
        match self {
            Self::Role => "Role",
            Self::Policy => "Policy",
            Self::Group => "Group",
            Self::User => "User",
            Self::InstanceProfile => "InstanceProfile",
            Self::OpenIdConnectProvider => "OpenIDConnectProvider",
            Self::ServiceLinkedRole => "ServiceLinkedRole",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Role => "roles",
            Self::Policy => "policies",
            Self::Group => "groups",
            Self::User => "users",
            Self::InstanceProfile => "instanceprofiles",
            Self::OpenIdConnectProvider => "openidconnectproviders",
            Self::ServiceLinkedRole => "servicelinkedroles",
        }
    }
}

/// Identifies one custom resource instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomResourceReference {
    pub group: String,
    pub version: String,
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
}

impl CustomResourceReference {
    pub fn new(kind: ResourceKind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            group: CRD_GROUP.to_string(),
            version: CRD_VERSION.to_string(),
            kind,
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: format!("{}/{}", self.group, self.version),
            kind: self.kind.kind().to_string(),
            plural: self.kind.plural().to_string(),
        }
    }
}

impl fmt::Display for CustomResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}/{} {}/{}",
            self.kind.plural(),
            self.group,
            self.version,
            self.namespace,
            self.name
        )
    }
}

/// Thin client for the custom resource lifecycle a scenario drives.
#[derive(Clone)]
pub struct CustomResourceClient {
    client: Client,
}

impl CustomResourceClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, reference: &CustomResourceReference) -> Api<DynamicObject> {
        Api::namespaced_with(
            self.client.clone(),
            &reference.namespace,
            &reference.api_resource(),
        )
    }

    pub async fn create_custom_resource(
        &self,
        reference: &CustomResourceReference,
        data: &Value,
    ) -> E2eResult<Value> {
        let object: DynamicObject = serde_json::from_value(data.clone())?;
        let created = self
            .api(reference)
            .create(&PostParams::default(), &object)
            .await?;
        log::info!("Created custom resource {}", reference);
        Ok(serde_json::to_value(created)?)
    }

    pub async fn get_resource(&self, reference: &CustomResourceReference) -> E2eResult<Option<Value>> {
        match self.api(reference).get_opt(&reference.name).await? {
            Some(object) => Ok(Some(serde_json::to_value(object)?)),
            None => Ok(None),
        }
    }

    pub async fn get_resource_exists(&self, reference: &CustomResourceReference) -> E2eResult<bool> {
        Ok(self.api(reference).get_opt(&reference.name).await?.is_some())
    }

    /// JSON merge patch; a `null` field removes it from the resource.
    pub async fn patch_custom_resource(
        &self,
        reference: &CustomResourceReference,
        updates: &Value,
    ) -> E2eResult<Value> {
        let patched = self
            .api(reference)
            .patch(&reference.name, &PatchParams::default(), &Patch::Merge(updates))
            .await?;
        log::info!("Patched custom resource {}", reference);
        Ok(serde_json::to_value(patched)?)
    }

    /// Wait until the controller has written a `status` block, returning the
    /// resource as last observed.
    pub async fn wait_resource_consumed_by_controller(
        &self,
        reference: &CustomResourceReference,
        wait_periods: u32,
        period_length: Duration,
    ) -> E2eResult<Value> {
        let description = format!("{reference} to be consumed by the controller");
        poll_until(
            &description,
            WaitOptions::periods(wait_periods, period_length),
            || async {
                let resource = self.get_resource(reference).await?;
                Ok::<_, E2eError>(resource.filter(|r| r.get("status").is_some()))
            },
        )
        .await
    }

    /// Delete the resource and wait for it to disappear.
    ///
    /// Returns the resource as it was before deletion and whether it is gone.
    /// A resource still present after the wait yields `false`, not an error.
    pub async fn delete_custom_resource(
        &self,
        reference: &CustomResourceReference,
        wait_periods: u32,
        period_length: Duration,
    ) -> E2eResult<(Option<Value>, bool)> {
        let before = self.get_resource(reference).await?;
        match self
            .api(reference)
            .delete(&reference.name, &DeleteParams::default())
            .await
        {
            Ok(_) => log::info!("Deleted custom resource {}", reference),
            Err(kube::Error::Api(e)) if e.code == 404 => return Ok((before, true)),
            Err(e) => return Err(e.into()),
        }

        let description = format!("{reference} to be deleted");
        let result = poll_until(
            &description,
            WaitOptions::periods(wait_periods, period_length),
            || async {
                let exists = self.get_resource_exists(reference).await?;
                Ok::<_, E2eError>((!exists).then_some(()))
            },
        )
        .await;

        match result {
            Ok(()) => Ok((before, true)),
            Err(e) if e.is_timeout() => {
                log::warn!("{}", e);
                Ok((before, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Create a namespace; an existing one is left as is.
    pub async fn create_namespace(&self, name: &str) -> E2eResult<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        match namespaces.create(&PostParams::default(), &namespace).await {
            Ok(_) => {
                log::info!("Created namespace {}", name);
                Ok(())
            }
            Err(kube::Error::Api(e)) if e.code == 409 => Ok(()),
            Err(e) => Err(E2eError::Kube(e)),
        }
    }
}
