//! Clients and settings shared by every scenario.

use aws_sdk_iam::Client as IamClient;

use crate::bootstrap::BootstrapResources;
use crate::config::HarnessConfig;
use crate::error::{E2eError, E2eResult};
use crate::k8s::{CustomResourceClient, CustomResourceReference, ResourceKind};

pub struct E2eContext {
    pub iam: IamClient,
    pub kube: kube::Client,
    pub config: HarnessConfig,
    /// Present when the bootstrap file named in `config` exists.
    pub bootstrap: Option<BootstrapResources>,
}

impl E2eContext {
    /// Build clients from the default AWS credential chain and the default
    /// kubeconfig (or in-cluster config).
    pub async fn new() -> E2eResult<Self> {
        Self::with_config(HarnessConfig::from_env()).await
    }

    pub async fn with_config(config: HarnessConfig) -> E2eResult<Self> {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let kube = kube::Client::try_default().await?;

        let bootstrap = if config.bootstrap_file.exists() {
            Some(BootstrapResources::read_from(&config.bootstrap_file)?)
        } else {
            log::debug!(
                "No bootstrap file at {}, adoption scenarios are unavailable",
                config.bootstrap_file.display()
            );
            None
        };

        Ok(Self {
            iam: IamClient::new(&aws_config),
            kube,
            config,
            bootstrap,
        })
    }

    pub fn custom_resources(&self) -> CustomResourceClient {
        CustomResourceClient::new(self.kube.clone())
    }

    /// Reference to `name` in the configured namespace.
    pub fn reference(&self, kind: ResourceKind, name: &str) -> CustomResourceReference {
        CustomResourceReference::new(kind, name, &self.config.namespace)
    }

    /// The bootstrapped resources, or an error naming the missing file.
    pub fn require_bootstrap(&self) -> E2eResult<&BootstrapResources> {
        self.bootstrap.as_ref().ok_or_else(|| {
            E2eError::bootstrap(format!(
                "{} not found; run `iam-controller-e2e bootstrap` first",
                self.config.bootstrap_file.display()
            ))
        })
    }
}
