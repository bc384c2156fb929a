//! End-to-end harness for the Kubernetes controller that manages AWS IAM.
//!
//! - An eventual-consistency poller ([`wait`]) that bridges the delay between
//!   a control-plane write and its visibility through read APIs
//! - Per-kind IAM snapshot accessors ([`aws`]) with not-found folded into `None`
//! - A custom resource client ([`k8s`]) and YAML resource templates ([`resources`])
//! - Bootstrap of adoptable IAM principals ([`bootstrap`])
//!
//! The live scenarios under `tests/` are gated behind the `integ-test` feature.

pub mod aws;
pub mod bootstrap;
pub mod config;
pub mod context;
mod error;
pub mod k8s;
pub mod resources;
pub mod wait;

pub use aws::tags::Tag;
pub use aws::{AwsError, AwsResult};
pub use bootstrap::BootstrapResources;
pub use config::HarnessConfig;
pub use context::E2eContext;
pub use error::{E2eError, E2eResult};
pub use k8s::{CustomResourceClient, CustomResourceReference, ResourceKind};
pub use resources::{load_resource, random_suffix_name, replacements};
pub use wait::{Presence, WaitOptions, DEFAULT_WAIT_INTERVAL, DEFAULT_WAIT_TIMEOUT};
