//! Shared fixtures for the live scenarios.
//!
//! Every scenario creates uniquely named custom resources through a
//! [`Scenario`], which deletes whatever the scenario left behind once its body
//! returns, fails or panics.

#![allow(dead_code)]

use std::future::Future;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use serde_json::Value;
use tokio::sync::Mutex;

use iam_controller_e2e::k8s::{
    CONSUMED_PERIOD_LENGTH, CONSUMED_WAIT_PERIODS, DELETE_PERIOD_LENGTH, DELETE_WAIT_PERIODS,
};
use iam_controller_e2e::resources::Replacements;
use iam_controller_e2e::{
    load_resource, random_suffix_name, CustomResourceReference, E2eContext, ResourceKind, Tag,
};

/// Maximum length of generated resource names.
pub const NAME_MAX_LENGTH: usize = 24;

pub const CHECK_WAIT_AFTER: Duration = Duration::from_secs(10);
pub const MODIFY_WAIT_AFTER: Duration = Duration::from_secs(10);
pub const DELETE_WAIT_AFTER: Duration = Duration::from_secs(10);

pub async fn context() -> anyhow::Result<E2eContext> {
    E2eContext::new()
        .await
        .context("failed to build e2e context from AWS and kubeconfig defaults")
}

/// A custom resource created by a scenario.
pub struct Fixture {
    pub name: String,
    pub reference: CustomResourceReference,
    /// The resource as first observed with a `status` block.
    pub resource: Value,
}

/// Handle given to a scenario body. Records every custom resource it creates
/// so [`run_scenario`] can remove them afterwards.
#[derive(Clone)]
pub struct Scenario {
    ctx: Arc<E2eContext>,
    created: Arc<Mutex<Vec<CustomResourceReference>>>,
}

impl Scenario {
    pub fn context(&self) -> &E2eContext {
        &self.ctx
    }

    /// Render `template` with `values`, create it under `name` and wait for
    /// the controller to pick it up.
    pub async fn create_fixture(
        &self,
        kind: ResourceKind,
        template: &str,
        name: &str,
        values: &Replacements,
    ) -> anyhow::Result<Fixture> {
        let reference = self.ctx.reference(kind, name);
        self.create_fixture_in(reference, template, values).await
    }

    pub async fn create_fixture_in(
        &self,
        reference: CustomResourceReference,
        template: &str,
        values: &Replacements,
    ) -> anyhow::Result<Fixture> {
        let crs = self.ctx.custom_resources();
        let data = load_resource(template, values)?;
        crs.create_custom_resource(&reference, &data)
            .await
            .with_context(|| format!("creating {reference}"))?;
        self.created.lock().await.push(reference.clone());

        let resource = crs
            .wait_resource_consumed_by_controller(
                &reference,
                CONSUMED_WAIT_PERIODS,
                CONSUMED_PERIOD_LENGTH,
            )
            .await?;
        Ok(Fixture {
            name: reference.name.clone(),
            reference,
            resource,
        })
    }
}

/// Run `body` against a fresh context, then delete every fixture it created.
pub async fn run_scenario<F, Fut>(body: F) -> anyhow::Result<()>
where
    F: FnOnce(Scenario) -> Fut,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let scenario = Scenario {
        ctx: Arc::new(context().await?),
        created: Arc::default(),
    };
    let body = body(scenario.clone());
    guarded(body, || async move {
        let created = std::mem::take(&mut *scenario.created.lock().await);
        teardown(&scenario.ctx, created).await
    })
    .await
}

/// Run `body` on its own task and always run `cleanup` afterwards.
///
/// The body's error wins over a cleanup error. A body panic is resumed once
/// cleanup has finished.
pub async fn guarded<Fut, C, CFut>(body: Fut, cleanup: C) -> anyhow::Result<()>
where
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    C: FnOnce() -> CFut,
    CFut: Future<Output = anyhow::Result<()>>,
{
    let outcome = tokio::spawn(body).await;
    let cleaned = cleanup().await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) if e.is_panic() => {
            if let Err(cleanup_err) = &cleaned {
                log::error!("Cleanup after panic failed: {:#}", cleanup_err);
            }
            panic::resume_unwind(e.into_panic());
        }
        Err(e) => Err(anyhow!("scenario task did not finish: {e}")),
    };

    match (result, cleaned) {
        (Ok(()), cleaned) => cleaned,
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup_err)) => {
            log::error!("Cleanup after failure failed: {:#}", cleanup_err);
            Err(e)
        }
    }
}

/// Delete `created` newest first. Resources whose deletion is blocked by a
/// still-present dependent get a second pass once the others are gone.
async fn teardown(ctx: &E2eContext, mut created: Vec<CustomResourceReference>) -> anyhow::Result<()> {
    created.reverse();
    for pass in 1..=2 {
        let mut remaining = Vec::new();
        for reference in created {
            if let Err(e) = delete_fixture(ctx, &reference).await {
                log::warn!("Teardown pass {}: {:#}", pass, e);
                remaining.push(reference);
            }
        }
        if remaining.is_empty() {
            return Ok(());
        }
        created = remaining;
    }
    let names: Vec<String> = created.iter().map(ToString::to_string).collect();
    bail!("teardown left behind {}", names.join(", "))
}

/// Delete the custom resource and fail unless it disappears.
pub async fn delete_fixture(ctx: &E2eContext, reference: &CustomResourceReference) -> anyhow::Result<()> {
    let (_, deleted) = ctx
        .custom_resources()
        .delete_custom_resource(reference, DELETE_WAIT_PERIODS, DELETE_PERIOD_LENGTH)
        .await?;
    if !deleted {
        bail!("{reference} was not deleted");
    }
    Ok(())
}

pub fn random_name(prefix: &str) -> anyhow::Result<String> {
    Ok(random_suffix_name(prefix, NAME_MAX_LENGTH)?)
}

/// Latest copy of the resource; missing resources are an error.
pub async fn latest(ctx: &E2eContext, reference: &CustomResourceReference) -> anyhow::Result<Value> {
    ctx.custom_resources()
        .get_resource(reference)
        .await?
        .with_context(|| format!("{reference} not found"))
}

/// `status.ackResourceMetadata.arn` of the resource.
pub fn resource_arn(resource: &Value) -> anyhow::Result<String> {
    resource
        .pointer("/status/ackResourceMetadata/arn")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("resource has no status.ackResourceMetadata.arn")
}

/// Tags in the shape used by custom resource specs.
pub fn spec_tags(tags: &[(&str, &str)]) -> Value {
    tags.iter()
        .map(|(key, value)| serde_json::json!({"key": key, "value": value}))
        .collect()
}

pub fn tags(pairs: &[(&str, &str)]) -> Vec<Tag> {
    pairs.iter().map(|(k, v)| Tag::new(*k, *v)).collect()
}

pub fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

pub async fn settle(delay: Duration) {
    log::debug!("Sleeping {:?} for the controller to reconcile", delay);
    tokio::time::sleep(delay).await;
}
