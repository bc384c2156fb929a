//! OpenID Connect provider lifecycle against a live controller.

#![cfg(feature = "integ-test")]

mod common;

use std::time::Duration;

use anyhow::Context;
use serde_json::json;
use serial_test::serial;

use iam_controller_e2e::aws::{oidc_provider, tags};
use iam_controller_e2e::k8s::condition;
use iam_controller_e2e::{replacements, ResourceKind, WaitOptions};

use common::{settle, Scenario, MODIFY_WAIT_AFTER};

const CHECK_WAIT_AFTER: Duration = Duration::from_secs(5);

const PROVIDER_URL: &str = "https://example.com";
// Thumbprints are exactly 40 hex characters.
const THUMBPRINT: &str = "0123456789012345678901234567890123456789";
const NEW_THUMBPRINT: &str = "9876543210987654321098765432109876543210";

#[test_log::test(tokio::test)]
#[serial]
async fn test_open_id_connect_provider_crud() -> anyhow::Result<()> {
    common::run_scenario(open_id_connect_provider_crud).await
}

async fn open_id_connect_provider_crud(scenario: Scenario) -> anyhow::Result<()> {
    let ctx = scenario.context();
    let crs = ctx.custom_resources();

    let provider_name = common::random_name("oidc-provider-ack-test")?;
    let values = replacements([
        ("OPEN_ID_CONNECT_PROVIDER_NAME", provider_name.as_str()),
        ("URL", PROVIDER_URL),
        ("CLIENT_ID", "phippy"),
        ("THUMBPRINT", THUMBPRINT),
        ("TAG_KEY", "tag1"),
        ("TAG_VALUE", "val1"),
    ]);
    let fixture = scenario
        .create_fixture(
            ResourceKind::OpenIdConnectProvider,
            "open_id_connect_provider_simple",
            &provider_name,
            &values,
        )
        .await?;
    let reference = &fixture.reference;

    let cr = common::latest(&ctx, reference).await?;
    let provider_arn = common::resource_arn(&cr)?;
    log::debug!("OpenIDConnectProvider ARN: {}", provider_arn);

    oidc_provider::wait_until_exists(&ctx.iam, &provider_arn, WaitOptions::default()).await?;

    settle(CHECK_WAIT_AFTER).await;
    condition::assert_synced(&crs, reference).await?;

    let latest = oidc_provider::get(&ctx.iam, &provider_arn)
        .await?
        .context("provider missing")?;
    assert_eq!(latest.thumbprint_list.as_deref().map(<[String]>::len), Some(1));
    let url = latest.url.as_deref().context("provider has no URL")?;
    assert!(oidc_provider::url_matches(url, PROVIDER_URL), "{url}");

    crs.patch_custom_resource(
        reference,
        &json!({"spec": {
            "thumbprints": [NEW_THUMBPRINT],
            "tags": common::spec_tags(&[("key2", "val2")]),
        }}),
    )
    .await?;
    settle(MODIFY_WAIT_AFTER).await;

    let latest = oidc_provider::get(&ctx.iam, &provider_arn)
        .await?
        .context("provider missing")?;
    assert_eq!(
        latest.thumbprint_list.unwrap_or_default(),
        vec![NEW_THUMBPRINT.to_string()]
    );

    let current = oidc_provider::get_tags(&ctx.iam, &provider_arn)
        .await?
        .context("provider missing")?;
    assert_eq!(tags::cleaned(&current), common::tags(&[("key2", "val2")]));

    common::delete_fixture(&ctx, reference).await?;
    oidc_provider::wait_until_deleted(&ctx.iam, &provider_arn, WaitOptions::default()).await?;
    Ok(())
}
