// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Build the initial model graph from GraphQL SDL.
//!
//! Object types annotated with `@model` become models, other object types become non-model
//! types, and enums are collected as is. Root operation types and types declared alongside the
//! directive definitions are skipped. Every model is normalized (primary key, timestamps, field
//! order) as soon as it is ingested.

use std::collections::HashSet;

use async_graphql_parser::{
    Positioned, parse_schema,
    types::{
        BaseType, ConstDirective, EnumType as AstEnumType, FieldDefinition, ServiceDocument, Type,
        TypeDefinition, TypeKind, TypeSystemDefinition,
    },
};
use async_graphql_value::ConstValue;
use heck::{ToShoutySnakeCase, ToUpperCamelCase};
use serde_json::{Map, Value};

use core_model::{
    directive::{AUTH, AuthArgs, Directive},
    graph::ModelGraph,
    types::{EnumType, Field, Model, ModelKind},
};

use crate::{
    auth::process_auth_rules, config::GeneratorConfig, diagnostics::Diagnostics,
    error::ModelBuildingError, normalization::normalize_model,
};

const DEFAULT_ROOT_TYPES: [&str; 3] = ["Query", "Mutation", "Subscription"];

pub fn build(
    schema: &str,
    directive_definitions: Option<&str>,
    config: &GeneratorConfig,
    diagnostics: &mut Diagnostics,
) -> Result<ModelGraph, ModelBuildingError> {
    let document = parse_schema(schema)?;

    let mut types_to_skip = root_type_names(&document);
    if let Some(directive_definitions) = directive_definitions {
        let definitions = parse_schema(directive_definitions)?;
        types_to_skip.extend(defined_type_names(&definitions));
    }

    let mut graph = ModelGraph::default();
    let mut errors = Vec::new();

    for definition in document.definitions.iter() {
        let TypeSystemDefinition::Type(typ) = definition else {
            continue;
        };
        let type_name = typ.node.name.node.as_str();
        if types_to_skip.contains(type_name) {
            continue;
        }

        match &typ.node.kind {
            TypeKind::Object(object) => {
                let Some(mut model) =
                    build_object_type(&typ.node, &object.fields, diagnostics, &mut errors)
                else {
                    continue;
                };

                if model.kind == ModelKind::Model {
                    normalize_model(&mut model, config)?;
                    tracing::debug!(model = %model.name, "ingested model");
                    graph.models.add(type_name, model);
                } else {
                    graph.non_models.add(type_name, model);
                }
            }
            TypeKind::Enum(enum_type) => {
                graph.enums.add(type_name, build_enum_type(type_name, enum_type));
            }
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(graph)
    } else {
        Err(ModelBuildingError::Diagnosis(errors))
    }
}

fn root_type_names(document: &ServiceDocument) -> HashSet<String> {
    let schema_definition = document.definitions.iter().find_map(|d| match d {
        TypeSystemDefinition::Schema(schema) => Some(&schema.node),
        _ => None,
    });

    match schema_definition {
        Some(schema) => [&schema.query, &schema.mutation, &schema.subscription]
            .into_iter()
            .flatten()
            .map(|name| name.node.to_string())
            .collect(),
        None => DEFAULT_ROOT_TYPES.iter().map(|n| n.to_string()).collect(),
    }
}

fn defined_type_names(document: &ServiceDocument) -> impl Iterator<Item = String> + '_ {
    document.definitions.iter().filter_map(|d| match d {
        TypeSystemDefinition::Type(typ) => Some(typ.node.name.node.to_string()),
        _ => None,
    })
}

/// Returns `None` (after recording the problems in `errors`) if any directive could not be
/// decoded.
fn build_object_type(
    typ: &TypeDefinition,
    fields: &[Positioned<FieldDefinition>],
    diagnostics: &mut Diagnostics,
    errors: &mut Vec<String>,
) -> Option<Model> {
    let name = typ.name.node.as_str();
    let errors_before = errors.len();

    let directives = build_directives(&typ.directives, name, None, diagnostics, errors);
    let kind = if directives.iter().any(|d| matches!(d, Directive::Model(_))) {
        ModelKind::Model
    } else {
        ModelKind::NonModel
    };

    let fields = fields
        .iter()
        .map(|field| build_field(&field.node, name, diagnostics, errors))
        .collect();

    (errors.len() == errors_before).then(|| Model {
        name: name.to_string(),
        kind,
        directives,
        fields,
    })
}

fn build_field(
    field: &FieldDefinition,
    model_name: &str,
    diagnostics: &mut Diagnostics,
    errors: &mut Vec<String>,
) -> Field {
    let name = field.name.node.as_str();
    let TypeInfo {
        type_name,
        is_list,
        is_nullable,
        is_list_nullable,
    } = type_info(&field.ty.node);

    Field {
        is_list,
        is_list_nullable,
        directives: build_directives(&field.directives, model_name, Some(name), diagnostics, errors),
        ..Field::scalar(name, type_name, is_nullable)
    }
}

struct TypeInfo {
    type_name: String,
    is_list: bool,
    is_nullable: bool,
    is_list_nullable: bool,
}

fn type_info(ty: &Type) -> TypeInfo {
    match &ty.base {
        BaseType::Named(name) => TypeInfo {
            type_name: name.to_string(),
            is_list: false,
            is_nullable: ty.nullable,
            is_list_nullable: false,
        },
        BaseType::List(element) => TypeInfo {
            type_name: innermost_type_name(element),
            is_list: true,
            is_nullable: element.nullable,
            is_list_nullable: ty.nullable,
        },
    }
}

fn innermost_type_name(ty: &Type) -> String {
    match &ty.base {
        BaseType::Named(name) => name.to_string(),
        BaseType::List(underlying) => innermost_type_name(underlying),
    }
}

fn build_directives(
    directives: &[Positioned<ConstDirective>],
    model_name: &str,
    field_name: Option<&str>,
    diagnostics: &mut Diagnostics,
    errors: &mut Vec<String>,
) -> Vec<Directive> {
    directives
        .iter()
        .filter_map(|directive| {
            let name = directive.node.name.node.as_str();
            let arguments: Map<String, Value> = directive
                .node
                .arguments
                .iter()
                .map(|(arg_name, value)| (arg_name.node.to_string(), to_json(&value.node)))
                .collect();

            if name == AUTH {
                let rules = process_auth_rules(arguments.get("rules"), model_name, field_name, diagnostics);
                return Some(Directive::Auth(AuthArgs { rules }));
            }

            match Directive::decode(name, arguments) {
                Ok(decoded) => Some(decoded),
                Err(source) => {
                    let location = match field_name {
                        Some(field_name) => format!("{model_name}.{field_name}"),
                        None => model_name.to_string(),
                    };
                    let pos = directive.pos;
                    let error = ModelBuildingError::InvalidDirective {
                        directive: name.to_string(),
                        location: format!("{location} (line {}, column {})", pos.line, pos.column),
                        source,
                    };
                    errors.push(error.to_string());
                    None
                }
            }
        })
        .collect()
}

fn to_json(value: &ConstValue) -> Value {
    match value {
        ConstValue::Null => Value::Null,
        ConstValue::Number(n) => Value::Number(n.clone()),
        ConstValue::String(s) => Value::String(s.clone()),
        ConstValue::Boolean(b) => Value::Bool(*b),
        ConstValue::Binary(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ConstValue::Enum(name) => Value::String(name.to_string()),
        ConstValue::List(values) => Value::Array(values.iter().map(to_json).collect()),
        ConstValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), to_json(value)))
                .collect(),
        ),
    }
}

fn build_enum_type(name: &str, enum_type: &AstEnumType) -> EnumType {
    EnumType {
        name: name.to_upper_camel_case(),
        values: enum_type
            .values
            .iter()
            .map(|value| {
                let literal = value.node.value.node.to_string();
                (literal.to_shouty_snake_case(), literal)
            })
            .collect(),
    }
}
