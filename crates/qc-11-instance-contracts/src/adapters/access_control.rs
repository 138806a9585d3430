//! # Access-Control Adapters
//!
//! A rule-based policy (rule -> authorized identities), its decoding factory,
//! and the resolver that loads policies stored as instances in the page.

use crate::domain::value_objects::{AccessControlId, Identity, Payload, Rule};
use crate::errors::{AccessError, EncodingError};
use crate::ports::outbound::{AccessControl, AccessControlFactory, AccessControlResolver, Page};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// RULE ACCESS CONTROL
// =============================================================================

/// Policy granting each rule to an explicit set of identities (hex).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAccessControl {
    rules: BTreeMap<String, BTreeSet<String>>,
}

impl RuleAccessControl {
    /// Creates a policy granting nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants the rule to the identity.
    #[must_use]
    pub fn allow(mut self, rule: Rule, identity: &Identity) -> Self {
        self.grant(rule, identity);
        self
    }

    /// Grants the rule to the identity in place.
    pub fn grant(&mut self, rule: Rule, identity: &Identity) {
        self.rules
            .entry(rule.as_str().to_string())
            .or_default()
            .insert(identity.to_hex());
    }

    /// Encodes the policy as an instance value.
    pub fn to_payload(&self) -> Result<Payload, EncodingError> {
        Payload::from_serializable(self)
    }
}

impl AccessControl for RuleAccessControl {
    fn match_rule(&self, rule: &Rule, identity: &Identity) -> Result<(), AccessError> {
        let granted = self
            .rules
            .get(rule.as_str())
            .ok_or_else(|| AccessError::RuleNotFound(rule.clone()))?;

        if granted.contains(&identity.to_hex()) {
            Ok(())
        } else {
            Err(AccessError::Refused {
                identity: identity.to_string(),
            })
        }
    }
}

impl fmt::Display for RuleAccessControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rules{{")?;
        for (i, (rule, identities)) in self.rules.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{rule}: [")?;
            for (j, identity) in identities.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{identity}")?;
            }
            write!(f, "]")?;
        }
        write!(f, "}}")
    }
}

/// Decodes `RuleAccessControl` policies.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleAccessControlFactory;

impl AccessControlFactory for RuleAccessControlFactory {
    fn decode(&self, payload: &Payload) -> Result<Box<dyn AccessControl>, AccessError> {
        let policy: RuleAccessControl = payload
            .decode()
            .map_err(|e| AccessError::Malformed(e.to_string()))?;
        Ok(Box::new(policy))
    }
}

// =============================================================================
// PAGE RESOLVER
// =============================================================================

/// Resolves policies stored in the page at their access-control id.
pub struct PageAccessResolver {
    factory: Box<dyn AccessControlFactory>,
}

impl PageAccessResolver {
    /// Creates a resolver decoding policies with the factory.
    #[must_use]
    pub fn new(factory: Box<dyn AccessControlFactory>) -> Self {
        Self { factory }
    }
}

impl Default for PageAccessResolver {
    fn default() -> Self {
        Self::new(Box::new(RuleAccessControlFactory))
    }
}

impl AccessControlResolver for PageAccessResolver {
    fn resolve(
        &self,
        page: &dyn Page,
        id: &AccessControlId,
    ) -> Result<Box<dyn AccessControl>, AccessError> {
        let stored = page.read(&id.as_key()).map_err(|e| {
            if e.is_not_found() {
                AccessError::NotFound
            } else {
                AccessError::Storage(e)
            }
        })?;

        self.factory.decode(&stored.value)
    }
}

impl fmt::Debug for PageAccessResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageAccessResolver").finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================
