//! The bucket policy document and the prefix-scoped policy engine.
//!
//! [`BucketPolicy`] holds an ordered statement list and translates
//! between it and the declarative [`PolicyKind`] for an object-key
//! prefix:
//!
//! - [`BucketPolicy::set_policy`] removes the statements currently
//!   serving a prefix (preserving bucket-level actions still needed by
//!   other prefixes) and appends freshly generated ones;
//! - [`BucketPolicy::get_policy`] answers what access a prefix has,
//!   requiring both the bucket-level and object-level halves of a grant;
//! - [`BucketPolicy::get_policies`] enumerates every prefix the document
//!   mentions.
//!
//! Parsing tolerates statements that are invalid under the simplified
//! model (non-wildcard principals, foreign resources); they are carried
//! through untouched and ignored by the engine's logic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::{
    common_bucket_actions, read_only_bucket_actions, read_only_object_actions,
    read_write_object_actions, write_only_bucket_actions, write_only_object_actions,
};
use crate::condition::{ConditionKeyMap, ConditionMap};
use crate::error::PolicyError;
use crate::resource::{AWS_RESOURCE_PREFIX, ResourceSet};
use crate::set::StringSet;
use crate::statement::{EFFECT_ALLOW, Statement, append_statements};

/// The policy document version every generated document carries.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The condition operator used for prefix scoping.
const STRING_EQUALS: &str = "StringEquals";

/// The condition key used for prefix scoping.
const S3_PREFIX: &str = "s3:prefix";

/// Declarative access level for a prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicyKind {
    /// No anonymous access.
    #[default]
    None,
    /// Anonymous download and listing.
    ReadOnly,
    /// Anonymous upload without listing objects.
    WriteOnly,
    /// Both.
    ReadWrite,
}

impl PolicyKind {
    /// Whether this kind grants read access.
    #[must_use]
    pub fn is_read(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    /// Whether this kind grants write access.
    #[must_use]
    pub fn is_write(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }

    /// Canonical name, as used in user-facing output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ReadOnly => "readonly",
            Self::WriteOnly => "writeonly",
            Self::ReadWrite => "readwrite",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An IAM-style bucket policy document bound to a bucket name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketPolicy {
    /// Document version; always `2012-10-17`.
    #[serde(rename = "Version")]
    pub version: String,

    /// The ordered statement list.
    #[serde(rename = "Statement", default)]
    pub statements: Vec<Statement>,

    /// The bucket the document belongs to. Not part of the wire form.
    #[serde(skip)]
    pub bucket_name: String,
}

impl BucketPolicy {
    /// Create an empty policy for a bucket.
    #[must_use]
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            version: POLICY_VERSION.to_owned(),
            statements: Vec::new(),
            bucket_name: bucket_name.into(),
        }
    }

    /// Parse a policy document from JSON and bind it to a bucket.
    ///
    /// Structurally invalid JSON is an error; statements that are invalid
    /// under the simplified model parse fine and are carried through.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Json`] when the document is malformed.
    pub fn from_json(data: &[u8], bucket_name: &str) -> Result<Self, PolicyError> {
        let mut policy: BucketPolicy = serde_json::from_slice(data)?;
        policy.bucket_name = bucket_name.to_owned();
        if policy.version.is_empty() {
            policy.version = POLICY_VERSION.to_owned();
        }
        Ok(policy)
    }

    /// Serialize the policy document to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether the document grants nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// The bucket's ARN.
    #[must_use]
    pub fn bucket_resource(&self) -> String {
        format!("{AWS_RESOURCE_PREFIX}{}", self.bucket_name)
    }

    /// The object resource pattern for a prefix: `bucketARN/prefix*`.
    #[must_use]
    pub fn object_resource(&self, prefix: &str) -> String {
        format!("{AWS_RESOURCE_PREFIX}{}/{prefix}*", self.bucket_name)
    }

    // -----------------------------------------------------------------------
    // set_policy
    // -----------------------------------------------------------------------

    /// Rewrite the statements serving `prefix` to grant `kind`.
    ///
    /// Existing statements scoped to the prefix are removed first -
    /// bucket-level actions shared with other prefixes survive - then
    /// freshly generated statements are appended with merge
    /// deduplication. Setting [`PolicyKind::None`] on an empty document
    /// is a no-op.
    pub fn set_policy(&mut self, kind: PolicyKind, prefix: &str) {
        debug!(bucket = %self.bucket_name, %kind, prefix, "rewriting bucket policy");
        self.remove_statements(prefix);
        let new = self.new_statements(kind, prefix);
        append_statements(&mut self.statements, new);
    }

    /// Generate the statements granting `kind` on `prefix`.
    fn new_statements(&self, kind: PolicyKind, prefix: &str) -> Vec<Statement> {
        if kind == PolicyKind::None || self.bucket_name.is_empty() {
            return Vec::new();
        }

        let bucket_resource = ResourceSet::of(self.bucket_resource());
        let mut out = Vec::new();

        // The common bucket action every grant carries.
        out.push(Statement::allow(
            common_bucket_actions(),
            bucket_resource.clone(),
        ));

        if kind.is_read() {
            let mut stmt = Statement::allow(read_only_bucket_actions(), bucket_resource.clone());
            if !prefix.is_empty() {
                stmt.conditions =
                    ConditionMap::of(STRING_EQUALS, ConditionKeyMap::of(S3_PREFIX, prefix));
            }
            out.push(stmt);
        }

        if kind.is_write() {
            out.push(Statement::allow(
                write_only_bucket_actions(),
                bucket_resource,
            ));
        }

        let object_actions = match kind {
            PolicyKind::ReadOnly => read_only_object_actions(),
            PolicyKind::WriteOnly => write_only_object_actions(),
            PolicyKind::ReadWrite => read_write_object_actions(),
            PolicyKind::None => unreachable!("handled above"),
        };
        out.push(Statement::allow(
            object_actions,
            ResourceSet::of(self.object_resource(prefix)),
        ));

        out
    }

    /// Remove the statements scoped to `prefix`.
    ///
    /// Object-level removal drops the prefix's resource from each
    /// statement (the statement survives if it serves other resources).
    /// Bucket-level removal strips only the actions whose justification
    /// came from this prefix: a conditioned `ListBucket` loses the
    /// prefix's condition value, and the shared unconditioned actions are
    /// stripped only when no other prefix still needs them.
    fn remove_statements(&mut self, prefix: &str) {
        let bucket_resource = self.bucket_resource();
        let object_resource = self.object_resource(prefix);
        let bucket_name = self.bucket_name.clone();
        let (read_in_use, write_in_use, any_in_use) = self.other_prefix_usage(prefix);

        let mut kept = Vec::with_capacity(self.statements.len());
        for mut statement in self.statements.drain(..) {
            if !statement.is_valid(&bucket_name) {
                // Foreign statements pass through untouched.
                kept.push(statement);
                continue;
            }

            if statement.resources.contains(&object_resource) {
                statement.resources.remove(&object_resource);
                if statement.resources.is_empty() {
                    // No resources left: the statement grants nothing.
                    continue;
                }
            }

            if statement.resources.contains(&bucket_resource) {
                Self::scrub_bucket_statement(
                    &mut statement,
                    prefix,
                    read_in_use,
                    write_in_use,
                    any_in_use,
                );
                if statement.actions.is_empty() {
                    continue;
                }
            }

            kept.push(statement);
        }
        self.statements = kept;
    }

    /// Strip the bucket-level actions justified only by `prefix`.
    fn scrub_bucket_statement(
        statement: &mut Statement,
        prefix: &str,
        read_in_use: bool,
        write_in_use: bool,
        any_in_use: bool,
    ) {
        let prefix_values = statement
            .conditions
            .get(STRING_EQUALS)
            .and_then(|keys| keys.get(S3_PREFIX));

        if let Some(values) = prefix_values {
            // A conditioned ListBucket statement: take this prefix out of
            // its scope, dropping the action once no prefix remains.
            if !values.contains(prefix) {
                return;
            }
            let removal = StringSet::of(prefix);
            if let Some(keys) = statement.conditions.get_mut(STRING_EQUALS) {
                keys.remove(S3_PREFIX, &removal);
                if keys.is_empty() {
                    statement.conditions.remove_operator(STRING_EQUALS);
                }
            }
            if statement.conditions.is_empty() {
                statement.actions.difference_with(&read_only_bucket_actions());
            }
            return;
        }

        if !statement.conditions.is_empty() {
            // Conditions the engine does not understand: leave the
            // statement alone.
            return;
        }

        // Unconditioned bucket statement: the root-prefix read grant and
        // the shared write/common actions live here.
        if prefix.is_empty() {
            statement.actions.difference_with(&read_only_bucket_actions());
        }
        if !write_in_use {
            statement
                .actions
                .difference_with(&write_only_bucket_actions());
        }
        if !any_in_use {
            statement.actions.difference_with(&common_bucket_actions());
        }
    }

    /// What other prefixes still rely on bucket-level support.
    ///
    /// Scans the valid object-level statements whose resources fall under
    /// the bucket but are not the given prefix's resource: `read`/`write`
    /// report whether such a statement carries the read/write object
    /// action sets, `any` whether one exists at all.
    fn other_prefix_usage(&self, prefix: &str) -> (bool, bool, bool) {
        let resource_prefix = format!("{AWS_RESOURCE_PREFIX}{}/", self.bucket_name);
        let object_resource = self.object_resource(prefix);

        let mut read = false;
        let mut write = false;
        let mut any = false;

        for statement in &self.statements {
            if !statement.is_valid(&self.bucket_name) {
                continue;
            }
            let under_bucket = statement.resources.starts_with(&resource_prefix);
            let other = under_bucket
                .iter()
                .any(|resource| resource != object_resource);
            if !other {
                continue;
            }
            any = true;
            if statement.actions.is_superset(&read_only_object_actions()) {
                read = true;
            }
            if statement.actions.is_superset(&write_only_object_actions()) {
                write = true;
            }
            if read && write {
                break;
            }
        }

        (read, write, any)
    }

    // -----------------------------------------------------------------------
    // get_policy
    // -----------------------------------------------------------------------

    /// The access level currently granted to `prefix`.
    ///
    /// Read access needs both a bucket-level `ListBucket` grant whose
    /// `s3:prefix` condition admits the prefix (an empty prefix demands
    /// an unconditioned grant) and an object-level read grant matching
    /// `bucketARN/prefix*`. Write access needs
    /// `ListBucketMultipartUploads` at bucket level plus the write object
    /// actions at object level.
    #[must_use]
    pub fn get_policy(&self, prefix: &str) -> PolicyKind {
        let bucket_resource = self.bucket_resource();
        let object_resource = self.object_resource(prefix);

        let mut bucket_read = false;
        let mut bucket_write = false;

        // Longest-match bookkeeping for object-level statements: a more
        // specific resource pattern overrides a broader one.
        let mut matched_resource = String::new();
        let mut object_read = false;
        let mut object_write = false;

        for statement in &self.statements {
            if statement.effect != EFFECT_ALLOW || !statement.principal.is_wildcard() {
                continue;
            }

            let matched = if statement.resources.contains(&object_resource) {
                ResourceSet::of(object_resource.clone())
            } else {
                statement.resources.matches(&object_resource)
            };
            if !matched.is_empty() && statement.conditions.is_empty() {
                let read = statement.actions.is_superset(&read_only_object_actions());
                let write = statement.actions.is_superset(&write_only_object_actions());
                for resource in matched.iter() {
                    if matched_resource.len() < resource.len() {
                        object_read = read;
                        object_write = write;
                        matched_resource = resource.to_owned();
                    } else if matched_resource.len() == resource.len() {
                        object_read = object_read || read;
                        object_write = object_write || write;
                    }
                }
            }

            if statement.resources.contains(&bucket_resource) {
                if statement.actions.is_superset(&read_only_bucket_actions())
                    && bucket_read_applies(statement, prefix)
                {
                    bucket_read = true;
                }
                if statement.actions.is_superset(&write_only_bucket_actions())
                    && statement.conditions.is_empty()
                {
                    bucket_write = true;
                }
            }
        }

        match (bucket_read && object_read, bucket_write && object_write) {
            (true, true) => PolicyKind::ReadWrite,
            (true, false) => PolicyKind::ReadOnly,
            (false, true) => PolicyKind::WriteOnly,
            (false, false) => PolicyKind::None,
        }
    }

    /// Every prefix the document mentions, with its access level.
    ///
    /// Enumerates the distinct object resources under the bucket, strips
    /// the ARN prefix and trailing glob, and computes
    /// [`BucketPolicy::get_policy`] for each.
    #[must_use]
    pub fn get_policies(&self) -> BTreeMap<String, PolicyKind> {
        let resource_prefix = format!("{AWS_RESOURCE_PREFIX}{}/", self.bucket_name);

        let mut prefixes = BTreeSet::new();
        for statement in &self.statements {
            for resource in statement.resources.iter() {
                if let Some(rest) = resource.strip_prefix(&resource_prefix) {
                    prefixes.insert(rest.trim_end_matches('*').to_owned());
                }
            }
        }

        prefixes
            .into_iter()
            .map(|prefix| {
                let kind = self.get_policy(&prefix);
                (prefix, kind)
            })
            .collect()
    }
}

/// Whether a bucket-level read statement's conditions admit `prefix`.
fn bucket_read_applies(statement: &Statement, prefix: &str) -> bool {
    if statement.conditions.is_empty() {
        return true;
    }
    if prefix.is_empty() {
        // The root prefix demands an unconditioned grant.
        return false;
    }
    // Exactly one operator with exactly the s3:prefix key; anything else
    // is a condition the engine cannot vouch for.
    if statement.conditions.len() != 1 {
        return false;
    }
    let Some(keys) = statement.conditions.get(STRING_EQUALS) else {
        return false;
    };
    if keys.len() != 1 {
        return false;
    }
    keys.get(S3_PREFIX)
        .is_some_and(|values| values.contains(prefix))
}
