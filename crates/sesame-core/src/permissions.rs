//! Permission set evaluation.
//!
//! Permissions are opaque strings of the form `resource:action[:scope]`.
//! A granted entry satisfies a requirement when it equals the requirement
//! exactly or refines it with further `:`-separated segments: a grant of
//! `employee:read:team` satisfies `employee` and `employee:read`, but not
//! `employee:read:own`.

use serde::{Deserialize, Serialize};

/// The flat set of permission strings granted to a user.
///
/// Order and duplicates are irrelevant to evaluation. The empty set denies
/// everything, which is also the effective set of an unauthenticated client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<String>);

/// Check whether a single granted entry satisfies a requirement.
fn satisfies(granted: &str, required: &str) -> bool {
    match granted.strip_prefix(required) {
        Some("") => true,
        Some(rest) => rest.starts_with(':'),
        None => false,
    }
}

impl PermissionSet {
    /// Create a permission set from granted entries.
    pub fn new<I, S>(granted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(granted.into_iter().map(Into::into).collect())
    }

    /// Returns true iff some granted entry satisfies `required`.
    pub fn has(&self, required: &str) -> bool {
        self.0.iter().any(|granted| satisfies(granted, required))
    }

    /// Returns true iff at least one entry of `required` is satisfied.
    ///
    /// An empty requirement list is vacuously false.
    pub fn has_any<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        required.into_iter().any(|r| self.has(r.as_ref()))
    }

    /// Returns true iff every entry of `required` is satisfied.
    ///
    /// An empty requirement list is vacuously true. Note the deliberate
    /// asymmetry with [`PermissionSet::has_any`].
    pub fn has_all<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        required.into_iter().all(|r| self.has(r.as_ref()))
    }

    /// Returns true if no permissions are granted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of granted entries (duplicates included).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the granted entries.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for PermissionSet {
    fn from(granted: Vec<String>) -> Self {
        Self(granted)
    }
}

impl FromIterator<String> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
