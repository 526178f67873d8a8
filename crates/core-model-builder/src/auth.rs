// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Decoding of `@auth(rules: [...])`.
//!
//! Unlike the other directives, a bad rule does not fail the whole schema: it is skipped with a
//! warning and the remaining rules are kept.

use serde_json::Value;

use core_model::auth::{AuthOperation, AuthRule, AuthStrategy};

use crate::diagnostics::Diagnostics;

const DEFAULT_OWNER_FIELD: &str = "owner";
const DEFAULT_IDENTITY_CLAIM: &str = "username";
const DEFAULT_GROUP_CLAIM: &str = "cognito:groups";

pub fn process_auth_rules(
    rules: Option<&Value>,
    model: &str,
    field: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> Vec<AuthRule> {
    let rules = match rules {
        Some(Value::Array(rules)) => rules,
        Some(other) => {
            diagnostics.warn(
                model,
                field,
                format!("Ignoring @auth with non-list rules argument: {other}"),
            );
            return vec![];
        }
        None => return vec![],
    };

    rules
        .iter()
        .filter_map(|rule| match serde_json::from_value::<AuthRule>(rule.clone()) {
            Ok(rule) => Some(with_defaults(rule)),
            Err(e) => {
                diagnostics.warn(
                    model,
                    field,
                    format!("Unsupported auth strategy or malformed rule {rule}: {e}. Skipping it."),
                );
                None
            }
        })
        .collect()
}

fn with_defaults(mut rule: AuthRule) -> AuthRule {
    if rule.operations.is_empty() {
        rule.operations = AuthOperation::DEFAULTS.to_vec();
    }

    if rule.provider.is_none() {
        rule.provider = Some(
            match rule.allow {
                AuthStrategy::Owner | AuthStrategy::Groups | AuthStrategy::Private => "userPools",
                AuthStrategy::Public => "apiKey",
                AuthStrategy::Custom => "function",
            }
            .to_string(),
        );
    }

    match rule.allow {
        AuthStrategy::Owner => {
            rule.owner_field
                .get_or_insert_with(|| DEFAULT_OWNER_FIELD.to_string());
            rule.identity_claim
                .get_or_insert_with(|| DEFAULT_IDENTITY_CLAIM.to_string());
        }
        AuthStrategy::Groups => {
            rule.group_claim
                .get_or_insert_with(|| DEFAULT_GROUP_CLAIM.to_string());
        }
        _ => {}
    }

    rule
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiplatform_test::multiplatform_test;
    use serde_json::json;

    #[multiplatform_test]
    fn applies_defaults() {
        let mut diagnostics = Diagnostics::default();
        let rules = process_auth_rules(
            Some(&json!([{ "allow": "owner" }, { "allow": "groups", "groups": ["Admin"] }])),
            "Post",
            None,
            &mut diagnostics,
        );

        assert!(diagnostics.warnings().is_empty());
        assert_eq!(rules.len(), 2);

        assert_eq!(rules[0].owner_field.as_deref(), Some("owner"));
        assert_eq!(rules[0].identity_claim.as_deref(), Some("username"));
        assert_eq!(rules[0].provider.as_deref(), Some("userPools"));
        assert_eq!(rules[0].operations, AuthOperation::DEFAULTS.to_vec());

        assert_eq!(rules[1].group_claim.as_deref(), Some("cognito:groups"));
        assert_eq!(rules[1].groups, vec!["Admin"]);
    }

    #[multiplatform_test]
    fn skips_unsupported_strategy() {
        let mut diagnostics = Diagnostics::default();
        let rules = process_auth_rules(
            Some(&json!([
                { "allow": "everyone" },
                { "allow": "public", "operations": ["read"] }
            ])),
            "Post",
            Some("title"),
            &mut diagnostics,
        );

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].allow, AuthStrategy::Public);
        assert_eq!(rules[0].provider.as_deref(), Some("apiKey"));
        assert_eq!(rules[0].operations, vec![AuthOperation::Read]);

        let warnings = diagnostics.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].model, "Post");
        assert_eq!(warnings[0].field.as_deref(), Some("title"));
        assert!(warnings[0].message.starts_with("Unsupported auth strategy"));
    }
}
