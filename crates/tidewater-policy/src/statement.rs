//! Policy statements and the append/merge contract.
//!
//! A [`Statement`] is one Allow rule: principal + actions + resources,
//! optionally gated by conditions. Appending a statement to a list goes
//! through a three-case merge so equivalent grants collapse instead of
//! duplicating:
//!
//! 1. same effect/principal/conditions, existing actions ⊇ new actions:
//!    the new resources are unioned into the existing statement;
//! 2. same effect/principal/conditions, identical resources, new actions
//!    ⊇ existing actions: the existing statement's actions grow to the
//!    union;
//! 3. same effect/principal, existing resources ⊇ new resources, existing
//!    actions ⊇ new actions, existing conditions cover the new ones: the
//!    new statement is already implied and is dropped.
//!
//! Anything else appends as a distinct statement. Note that two
//! statements on the same resource with incomparable action sets stay
//! separate; the generated bucket statements rely on that.

use serde::{Deserialize, Serialize};

use crate::actions::valid_actions;
use crate::condition::ConditionMap;
use crate::resource::{AWS_RESOURCE_PREFIX, ResourceSet};
use crate::set::StringSet;

/// The effect string for granting statements.
pub const EFFECT_ALLOW: &str = "Allow";

/// The effect string for denying statements.
pub const EFFECT_DENY: &str = "Deny";

/// The statement principal: who the grant applies to.
///
/// The simplified bucket-policy model only generates the wildcard
/// (everyone) principal, but parsing preserves whatever the document
/// carries. The wire form is either the bare string `"*"` or
/// `{"AWS": [...]}`; serialization always uses the latter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    /// The AWS principal ARNs, or `*` for everyone.
    pub aws: StringSet,
}

impl Principal {
    /// The wildcard (everyone) principal.
    #[must_use]
    pub fn wildcard() -> Self {
        Self {
            aws: StringSet::of("*"),
        }
    }

    /// Whether this principal is exactly the wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.aws.len() == 1 && self.aws.contains("*")
    }
}

impl Serialize for Principal {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("AWS", &self.aws)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PrincipalVisitor;

        impl<'de> serde::de::Visitor<'de> for PrincipalVisitor {
            type Value = Principal;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("\"*\" or a map with an AWS entry")
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Principal {
                    aws: StringSet::of(value),
                })
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut map: A,
            ) -> Result<Self::Value, A::Error> {
                let mut aws = StringSet::new();
                while let Some(key) = map.next_key::<String>()? {
                    let values = map.next_value::<StringSet>()?;
                    if key == "AWS" {
                        aws.union_with(&values);
                    }
                }
                Ok(Principal { aws })
            }
        }

        deserializer.deserialize_any(PrincipalVisitor)
    }
}

/// One rule within a bucket policy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement identifier; often empty.
    #[serde(rename = "Sid", default, skip_serializing_if = "String::is_empty")]
    pub sid: String,

    /// `Allow` or `Deny`.
    #[serde(rename = "Effect")]
    pub effect: String,

    /// Who the statement applies to.
    #[serde(rename = "Principal")]
    pub principal: Principal,

    /// The actions granted or denied.
    #[serde(rename = "Action")]
    pub actions: StringSet,

    /// The resource patterns the statement covers.
    #[serde(rename = "Resource")]
    pub resources: ResourceSet,

    /// Conditions gating the statement; empty means unconditional.
    #[serde(
        rename = "Condition",
        default,
        skip_serializing_if = "ConditionMap::is_empty"
    )]
    pub conditions: ConditionMap,
}

impl Statement {
    /// Create an unconditional Allow statement for the wildcard principal.
    #[must_use]
    pub fn allow(actions: StringSet, resources: ResourceSet) -> Self {
        Self {
            sid: String::new(),
            effect: EFFECT_ALLOW.to_owned(),
            principal: Principal::wildcard(),
            actions,
            resources,
            conditions: ConditionMap::new(),
        }
    }

    /// Whether this statement is well-formed for the given bucket under
    /// the simplified bucket-policy model.
    ///
    /// Valid means: the bucket name is non-empty, the effect is `Allow`,
    /// the principal is exactly the wildcard, the actions are non-empty
    /// with at least one inside the known vocabulary, and every resource
    /// is the bucket ARN or falls under `bucketARN/`.
    #[must_use]
    pub fn is_valid(&self, bucket_name: &str) -> bool {
        if bucket_name.is_empty() {
            return false;
        }
        if self.effect != EFFECT_ALLOW {
            return false;
        }
        if !self.principal.is_wildcard() {
            return false;
        }
        if self.actions.is_empty() || self.actions.intersection(&valid_actions()).is_empty() {
            return false;
        }
        if self.resources.is_empty() {
            return false;
        }

        let bucket_resource = format!("{AWS_RESOURCE_PREFIX}{bucket_name}");
        let object_prefix = format!("{bucket_resource}/");
        self.resources
            .iter()
            .all(|r| r == bucket_resource || r.starts_with(&object_prefix))
    }
}

/// Whether a statement conditioned by `outer` applies at least whenever a
/// statement conditioned by `inner` would.
///
/// Conditions narrow a grant, so covering means `outer` is the weaker
/// constraint: every operator/key `outer` requires must also be required
/// by `inner`, with `inner`'s value set a subset of `outer`'s (read under
/// `StringEquals` semantics, the only operator the engine generates). An
/// unconditional `outer` covers anything; a conditioned `outer` never
/// covers an unconditional `inner`.
fn conditions_cover(outer: &ConditionMap, inner: &ConditionMap) -> bool {
    outer.iter().all(|(operator, outer_keys)| {
        inner.get(operator).is_some_and(|inner_keys| {
            outer_keys.iter().all(|(key, outer_values)| {
                inner_keys
                    .get(key)
                    .is_some_and(|inner_values| inner_values.is_subset(outer_values))
            })
        })
    })
}

/// Append a statement to a list, merging with an equivalent grant when
/// possible (see the module docs for the three merge cases).
pub fn append_statement(statements: &mut Vec<Statement>, new: Statement) {
    for existing in statements.iter_mut() {
        if existing.effect == new.effect && existing.principal == new.principal {
            if existing.conditions == new.conditions {
                if existing.actions.is_superset(&new.actions) {
                    existing.resources.union_with(&new.resources);
                    return;
                }
                if existing.resources == new.resources && new.actions.is_superset(&existing.actions)
                {
                    existing.actions.union_with(&new.actions);
                    return;
                }
            }
            if existing.resources.is_superset(&new.resources)
                && existing.actions.is_superset(&new.actions)
                && conditions_cover(&existing.conditions, &new.conditions)
            {
                return;
            }
        }
    }

    if !new.actions.is_empty() && !new.resources.is_empty() {
        statements.push(new);
    }
}

/// Append several statements in order, merging each.
pub fn append_statements(statements: &mut Vec<Statement>, new: Vec<Statement>) {
    for statement in new {
        append_statement(statements, statement);
    }
}
