// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::graph::ModelGraph;

use crate::{connection::ConnectionResolver, diagnostics::Diagnostics};

/// Drop fields typed as another model that did not resolve to a relationship, warning about each.
pub fn validate(
    graph: &mut ModelGraph,
    resolver: &dyn ConnectionResolver,
    diagnostics: &mut Diagnostics,
) {
    for id in graph.model_ids() {
        let model = &graph.models[id];
        let unconnected: Vec<(String, String)> = model
            .fields
            .iter()
            .filter(|f| f.connection_info.is_none() && graph.is_model(&f.type_name))
            .map(|f| (f.name.clone(), resolver.unconnected_warning(model, f)))
            .collect();

        for (field_name, warning) in unconnected {
            let model = &mut graph.models[id];
            diagnostics.warn(&model.name, Some(&field_name), warning);
            model.remove_field(&field_name);
        }
    }
}
