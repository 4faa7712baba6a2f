//! Bucket policy engine for Tidewater.
//!
//! S3-compatible services express anonymous bucket access as IAM-style
//! JSON policy documents: ordered lists of statements granting actions on
//! resources, optionally gated by conditions. This crate models those
//! documents as a set-algebra and translates between them and the
//! declarative [`PolicyKind`] (none / read-only / write-only /
//! read-write) scoped to an object-key prefix.
//!
//! # Overview
//!
//! - [`ResourceSet`] and [`StringSet`] are the set primitives: glob-aware
//!   resource patterns and plain string sets with union/superset algebra.
//! - [`ConditionMap`] models the two-level condition structure
//!   (operator → condition key → value set) with explicit merge laws.
//! - [`Statement`] is one Allow rule; appending statements deduplicates
//!   through a three-case merge contract.
//! - [`BucketPolicy`] ties it together: `set_policy` rewrites the
//!   statement list for a prefix, `get_policy` answers what access a
//!   prefix currently has, and `get_policies` enumerates every prefix
//!   mentioned by the document.
//!
//! # Example
//!
//! ```
//! use tidewater_policy::{BucketPolicy, PolicyKind};
//!
//! let mut policy = BucketPolicy::new("mybucket");
//! policy.set_policy(PolicyKind::ReadOnly, "");
//! assert_eq!(policy.get_policy(""), PolicyKind::ReadOnly);
//! ```

pub mod actions;
pub mod condition;
pub mod error;
pub mod policy;
pub mod resource;
pub mod set;
pub mod statement;

pub use condition::{ConditionKeyMap, ConditionMap};
pub use error::PolicyError;
pub use policy::{BucketPolicy, PolicyKind};
pub use resource::{AWS_RESOURCE_PREFIX, ResourceSet};
pub use set::StringSet;
pub use statement::{Principal, Statement};
