//! AWS SDK integration: read-only IAM snapshot accessors per resource kind,
//! tag and policy-document helpers, and provisioning of bootstrap principals.

pub mod documents;
pub mod group;
pub mod instance_profile;
pub mod oidc_provider;
pub mod policy;
pub mod provision;
pub mod role;
pub mod tags;
pub mod user;

use aws_sdk_iam::error::SdkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS configuration error: {0}")]
    ConfigError(String),
    #[error("IAM client error: {0}")]
    IamError(String),
    #[error("Policy document error: {0}")]
    PolicyError(String),
}

pub type AwsResult<T> = Result<T, AwsError>;

/// Fold IAM's `NoSuchEntity` into `Ok(None)`; every other fault stays an error.
///
/// `context` names the call for the error message, e.g. `"GetRole(my-role)"`.
pub(crate) fn found<T, E, R>(result: Result<T, SdkError<E, R>>, context: &str) -> AwsResult<Option<T>>
where
    aws_sdk_iam::Error: From<SdkError<E, R>>,
{
    match result {
        Ok(output) => Ok(Some(output)),
        Err(e) => match aws_sdk_iam::Error::from(e) {
            aws_sdk_iam::Error::NoSuchEntityException(_) => Ok(None),
            other => Err(AwsError::IamError(format!("{context} failed: {other}"))),
        },
    }
}
