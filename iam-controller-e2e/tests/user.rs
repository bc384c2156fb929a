//! User lifecycle against a live controller.

#![cfg(feature = "integ-test")]

mod common;

use anyhow::Context;
use serde_json::json;
use serial_test::serial;

use iam_controller_e2e::aws::{tags, user};
use iam_controller_e2e::k8s::condition;
use iam_controller_e2e::{replacements, ResourceKind, WaitOptions};

use common::{settle, Scenario, CHECK_WAIT_AFTER, MODIFY_WAIT_AFTER};

const S3_READ_ONLY: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";

#[test_log::test(tokio::test)]
#[serial]
async fn test_user_crud() -> anyhow::Result<()> {
    common::run_scenario(user_crud).await
}

async fn user_crud(scenario: Scenario) -> anyhow::Result<()> {
    let ctx = scenario.context();
    let crs = ctx.custom_resources();

    let user_name = common::random_name("my-simple-user")?;
    let values = replacements([("USER_NAME", user_name.as_str())]);
    let fixture = scenario
        .create_fixture(ResourceKind::User, "user_simple", &user_name, &values)
        .await?;
    let reference = &fixture.reference;

    user::wait_until_exists(&ctx.iam, &user_name, WaitOptions::default()).await?;

    settle(CHECK_WAIT_AFTER).await;
    condition::assert_synced(&crs, reference).await?;

    let latest = user::get(&ctx.iam, &user_name)
        .await?
        .context("user missing")?;
    assert_eq!(latest.user_name, user_name);
    let attached = user::get_attached_policy_arns(&ctx.iam, &user_name)
        .await?
        .context("user missing")?;
    assert!(attached.is_empty());

    // Managed policies, path and permissions boundary
    let new_path = "/engineering/";
    crs.patch_custom_resource(
        reference,
        &json!({"spec": {
            "policies": [S3_READ_ONLY],
            "path": new_path,
            "permissionsBoundary": S3_READ_ONLY,
        }}),
    )
    .await?;
    settle(MODIFY_WAIT_AFTER).await;

    assert_eq!(
        user::get_attached_policy_arns(&ctx.iam, &user_name).await?,
        Some(vec![S3_READ_ONLY.to_string()])
    );
    let latest = user::get(&ctx.iam, &user_name)
        .await?
        .context("user missing")?;
    assert_eq!(latest.path, new_path);
    let boundary = latest
        .permissions_boundary
        .and_then(|b| b.permissions_boundary_arn);
    assert_eq!(boundary.as_deref(), Some(S3_READ_ONLY));

    // Tags
    let current = user::get_tags(&ctx.iam, &user_name)
        .await?
        .context("user missing")?;
    assert_eq!(tags::cleaned(&current), common::tags(&[("tag1", "val1")]));

    crs.patch_custom_resource(
        reference,
        &json!({"spec": {"tags": common::spec_tags(&[("tag2", "val2")])}}),
    )
    .await?;
    settle(MODIFY_WAIT_AFTER).await;

    let current = user::get_tags(&ctx.iam, &user_name)
        .await?
        .context("user missing")?;
    assert_eq!(tags::cleaned(&current), common::tags(&[("tag2", "val2")]));

    common::delete_fixture(&ctx, reference).await?;
    user::wait_until_deleted(&ctx.iam, &user_name, WaitOptions::default()).await?;
    Ok(())
}
