// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolution of the legacy `@connection` directive.

use core_model::{
    connection::{BelongsToConnection, ConnectionInfo, HasManyConnection, HasOneConnection},
    directive::ConnectionArgs,
    graph::ModelGraph,
    types::{Field, ID_FIELD, ID_TYPE, Model},
};

use super::{ConnectionResolver, Resolution, connected_model};
use crate::{config::GeneratorConfig, error::ModelBuildingError, naming::connection_attribute_name};

pub struct LegacyConnectionResolver {
    is_data_store_enabled: bool,
}

impl LegacyConnectionResolver {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            is_data_store_enabled: config.is_data_store_enabled,
        }
    }
}

/// The field on the other side of a connection.
enum ConnectedField<'a> {
    Declared(&'a Field),
    /// Implicit foreign key the backend adds for an unnamed connection.
    Implicit(Field),
}

impl ConnectionResolver for LegacyConnectionResolver {
    fn resolve(
        &self,
        field: &Field,
        model: &Model,
        graph: &ModelGraph,
    ) -> Result<Option<Resolution>, ModelBuildingError> {
        let Some(args) = field.connection_args() else {
            return Ok(None);
        };

        let other_side = connected_model(field, model, graph)?;
        let other_side_field = connected_field(field, args, model, other_side)?;
        let is_connecting_field_auto_created = args.fields.is_empty();
        let target_name = || {
            args.fields
                .first()
                .cloned()
                .unwrap_or_else(|| connection_attribute_name(&model.name, &field.name, ID_FIELD))
        };

        let resolution = match other_side_field {
            ConnectedField::Declared(other) => match (field.is_list, other.is_list) {
                // Many to one
                (true, false) => Resolution::new(ConnectionInfo::HasMany(HasManyConnection {
                    connected_model: other_side.name.clone(),
                    associated_with: other.name.clone(),
                    associated_with_fields: vec![],
                    is_connecting_field_auto_created,
                })),
                // One to many
                (false, true) => {
                    single_key_field(args)?;
                    belongs_to(other_side, target_name(), is_connecting_field_auto_created)
                }
                (false, false) => {
                    if !field.is_nullable && other.is_nullable {
                        belongs_to(other_side, target_name(), is_connecting_field_auto_created)
                    } else if (field.is_nullable && !other.is_nullable) || !self.is_data_store_enabled {
                        Resolution::new(ConnectionInfo::HasOne(HasOneConnection {
                            connected_model: other_side.name.clone(),
                            associated_with: other.name.clone(),
                            associated_with_fields: vec![],
                            is_connecting_field_auto_created,
                            target_name: target_name(),
                            target_names: vec![],
                        }))
                    } else {
                        return Err(ModelBuildingError::Generic(format!(
                            "DataStore does not support 1 to 1 connection with both sides of connection as optional field: {}.{}",
                            model.name, field.name
                        )));
                    }
                }
                // Many to many through @connection has no representation
                (true, true) => return Ok(None),
            },
            ConnectedField::Implicit(implicit) => {
                if field.is_list {
                    let mut resolution = Resolution::new(ConnectionInfo::HasMany(HasManyConnection {
                        connected_model: other_side.name.clone(),
                        associated_with: implicit.name.clone(),
                        associated_with_fields: vec![],
                        is_connecting_field_auto_created,
                    }));
                    resolution
                        .synthesized_fields
                        .push((other_side.name.clone(), implicit));
                    resolution
                } else {
                    single_key_field(args)?;
                    belongs_to(other_side, target_name(), is_connecting_field_auto_created)
                }
            }
        };

        Ok(Some(resolution))
    }

    fn unconnected_warning(&self, model: &Model, field: &Field) -> String {
        format!(
            "Model {} has field {} of type {} but its not connected. Add a @connection directive if want to connect them.",
            model.name, field.name, field.type_name
        )
    }
}

fn belongs_to(other_side: &Model, target_name: String, is_connecting_field_auto_created: bool) -> Resolution {
    let mut resolution = Resolution::new(ConnectionInfo::BelongsTo(BelongsToConnection {
        connected_model: other_side.name.clone(),
        target_name: target_name.clone(),
        target_names: vec![],
        is_connecting_field_auto_created,
        is_using_references: false,
    }));
    resolution.removed_fields.push(target_name);
    resolution
}

fn single_key_field(args: &ConnectionArgs) -> Result<(), ModelBuildingError> {
    if args.fields.len() > 1 {
        Err(ModelBuildingError::Generic(
            "DataStore only support one key in field".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Locate the field on `other_side` that `field` connects to:
///
/// - with `fields`, the field keyed by the first field of the `keyName` key (or of the primary
///   key), preferring a connection field that uses it;
/// - with `name`, the other field carrying a connection of the same name;
/// - otherwise the implicit `<model><Field>Id` foreign key, declared or not.
fn connected_field<'a>(
    field: &Field,
    args: &ConnectionArgs,
    model: &Model,
    other_side: &'a Model,
) -> Result<ConnectedField<'a>, ModelBuildingError> {
    if !args.fields.is_empty() {
        let key = match &args.key_name {
            Some(key_name) => Some(other_side.named_key_directive(key_name).ok_or_else(|| {
                ModelBuildingError::Generic(format!(
                    "Error processing @connection directive on {}.{}, @key directive with name {key_name} was not found in connected model {}",
                    model.name, field.name, other_side.name
                ))
            })?),
            None => other_side.primary_key_directive(),
        };
        let key_field_name = key
            .and_then(|key| key.fields.first())
            .map(String::as_str)
            .unwrap_or(ID_FIELD);

        let using_key_field = other_side.fields.iter().find(|f| {
            f.connection_args()
                .is_some_and(|c| c.fields.first().is_some_and(|first| first == key_field_name))
        });

        return using_key_field
            .or_else(|| other_side.field(key_field_name))
            .map(ConnectedField::Declared)
            .ok_or_else(|| {
                ModelBuildingError::Generic(format!(
                    "Can not find key field {key_field_name} in {}",
                    other_side.name
                ))
            });
    }

    if let Some(name) = &args.name {
        return other_side
            .fields
            .iter()
            .find(|f| {
                !std::ptr::eq(*f, field)
                    && f.connection_args().is_some_and(|c| c.name.as_ref() == Some(name))
            })
            .map(ConnectedField::Declared)
            .ok_or_else(|| {
                ModelBuildingError::Generic(format!(
                    "Can not find key field with connection name {name} in {}",
                    other_side.name
                ))
            });
    }

    let implicit_name = connection_attribute_name(&model.name, &field.name, ID_FIELD);
    Ok(match other_side.field(&implicit_name) {
        Some(declared) => ConnectedField::Declared(declared),
        None => ConnectedField::Implicit(Field::scalar(implicit_name, ID_TYPE, true)),
    })
}
