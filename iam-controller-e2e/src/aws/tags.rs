//! Resource tags as observed through IAM.

use serde::{Deserialize, Serialize};

/// Key prefix of the tags the controller adds to every resource it manages.
pub const SYSTEM_TAG_PREFIX: &str = "services.k8s.aws/";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.key.starts_with(SYSTEM_TAG_PREFIX)
    }
}

impl From<aws_sdk_iam::types::Tag> for Tag {
    fn from(tag: aws_sdk_iam::types::Tag) -> Self {
        Self {
            key: tag.key,
            value: tag.value,
        }
    }
}

pub(crate) fn from_sdk(tags: Vec<aws_sdk_iam::types::Tag>) -> Vec<Tag> {
    tags.into_iter().map(Tag::from).collect()
}

/// Tags with the controller's system tags removed, order preserved.
pub fn cleaned(tags: &[Tag]) -> Vec<Tag> {
    tags.iter().filter(|t| !t.is_system()).cloned().collect()
}
