//! Custom resource templates and fixture naming.
//!
//! Templates live in `resources/*.yaml` and are embedded at compile time. They
//! carry `$KEY` placeholders that are substituted before the YAML is parsed.

use std::collections::BTreeMap;

use regex::Regex;
use rust_embed::RustEmbed;
use serde_json::Value;

use crate::error::{E2eError, E2eResult};
use crate::k8s::{CRD_GROUP, CRD_VERSION};

/// Embedded custom resource templates
#[derive(RustEmbed)]
#[folder = "resources/"]
#[include = "*.yaml"]
struct Templates;

pub type Replacements = BTreeMap<String, String>;

/// Values every template may reference.
pub fn default_replacements() -> Replacements {
    Replacements::from([
        ("CRD_GROUP".to_string(), CRD_GROUP.to_string()),
        ("CRD_VERSION".to_string(), CRD_VERSION.to_string()),
    ])
}

/// `default_replacements()` extended with `extra`; `extra` wins on conflicts.
pub fn replacements<I, K, V>(extra: I) -> Replacements
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut values = default_replacements();
    values.extend(extra.into_iter().map(|(k, v)| (k.into(), v.into())));
    values
}

/// Substitute `$KEY` placeholders. Longer keys go first so `$POLICY_NAME`
/// never eats the prefix of `$POLICY_NAMESPACE`.
pub fn substitute(template: &str, replacements: &Replacements) -> String {
    let mut keys: Vec<&String> = replacements.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut rendered = template.to_string();
    for key in keys {
        rendered = rendered.replace(&format!("${key}"), &replacements[key]);
    }
    rendered
}

/// Names of all embedded templates, without the `.yaml` extension.
pub fn template_names() -> Vec<String> {
    let mut names: Vec<String> = Templates::iter()
        .filter_map(|path| path.strip_suffix(".yaml").map(str::to_string))
        .collect();
    names.sort();
    names
}

/// Render the template `name` and parse it as a resource manifest.
pub fn load_resource(name: &str, replacements: &Replacements) -> E2eResult<Value> {
    let file = Templates::get(&format!("{name}.yaml"))
        .ok_or_else(|| E2eError::template(format!("no resource template named '{name}'")))?;
    let template = std::str::from_utf8(&file.data)
        .map_err(|e| E2eError::template(format!("template '{name}' is not UTF-8: {e}")))?;

    let rendered = substitute(template, replacements);

    let placeholder = Regex::new(r"\$[A-Z][A-Z0-9_]*")
        .map_err(|e| E2eError::template(format!("invalid placeholder pattern: {e}")))?;
    if let Some(unresolved) = placeholder.find(&rendered) {
        return Err(E2eError::template(format!(
            "template '{name}' has no value for {}",
            unresolved.as_str()
        )));
    }

    let resource: Value = serde_yaml::from_str(&rendered)?;
    log::debug!("Loaded resource template {}", name);
    Ok(resource)
}

/// `prefix` plus a delimiter and random lowercase alphanumerics, `max_length`
/// characters in total.
pub fn random_suffix_name(prefix: &str, max_length: usize) -> E2eResult<String> {
    let suffix_length = max_length
        .checked_sub(prefix.len() + 1)
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            E2eError::template(format!(
                "'{prefix}' leaves no room for a random suffix within {max_length} characters"
            ))
        })?;

    let mut suffix = String::with_capacity(suffix_length);
    while suffix.len() < suffix_length {
        suffix.push_str(&uuid::Uuid::new_v4().simple().to_string());
    }
    suffix.truncate(suffix_length);
    Ok(format!("{prefix}-{suffix}"))
}
