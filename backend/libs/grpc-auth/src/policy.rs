//! Access policy: which operations may be called without a credential

use std::collections::HashSet;

/// Operations that are publicly callable out of the box
pub const DEFAULT_PUBLIC_OPERATIONS: &[&str] = &[
    "/user.UserService/Login",
    "/user.UserService/CreateUser",
    "/post.PostService/GetPosts",
];

/// Static mapping from operation identifier to "requires credential".
///
/// Only the public operations are stored; everything else, including the
/// empty string and operations the gateway has never heard of, requires a
/// credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    public_operations: HashSet<String>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_OPERATIONS.iter().copied())
    }
}

impl AccessPolicy {
    /// Policy whose public set is exactly `public_operations`
    pub fn new<I, S>(public_operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public_operations: public_operations.into_iter().map(Into::into).collect(),
        }
    }

    /// Default public operations plus `extra`
    pub fn with_public<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut policy = Self::default();
        policy
            .public_operations
            .extend(extra.into_iter().map(Into::into));
        policy
    }

    pub fn requires_auth(&self, operation: &str) -> bool {
        !self.public_operations.contains(operation)
    }

    pub fn is_public(&self, operation: &str) -> bool {
        !self.requires_auth(operation)
    }

    /// Public operations in sorted order (for startup logging)
    pub fn public_operations(&self) -> Vec<&str> {
        let mut ops: Vec<&str> = self.public_operations.iter().map(String::as_str).collect();
        ops.sort_unstable();
        ops
    }
}
