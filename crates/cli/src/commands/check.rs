// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use anyhow::{Result, anyhow};
use clap::{ArgMatches, Command};
use colored::Colorize;

use core_model_builder::{ModelBuildingError, Warning};

use super::{
    command::{CommandDefinition, config_arg, directives_arg, generator_args, schema_file_arg},
    util::SchemaInput,
};

pub struct CheckCommandDefinition {}

impl CommandDefinition for CheckCommandDefinition {
    fn command(&self) -> Command {
        Command::new("check")
            .about("Check that the relationships of a schema resolve, reporting any warnings")
            .arg(schema_file_arg())
            .arg(directives_arg())
            .arg(config_arg())
            .args(generator_args())
    }

    fn execute(&self, matches: &ArgMatches) -> Result<()> {
        let input = SchemaInput::from_matches(matches)?;
        let schema_path = input.schema_path.display();

        match input.build() {
            Ok(resolved) => {
                for warning in &resolved.warnings {
                    eprintln!("{} {}", "warning:".yellow().bold(), format_warning(warning));
                }

                if resolved.warnings.is_empty() {
                    println!("{} {schema_path}", "No issues found in".green());
                } else {
                    println!(
                        "{} {schema_path}",
                        format!("{} warning(s) in", resolved.warnings.len()).yellow()
                    );
                }
                Ok(())
            }
            Err(ModelBuildingError::Diagnosis(errors)) => {
                for error in &errors {
                    eprintln!("{} {error}", "error:".red().bold());
                }
                Err(anyhow!("Could not resolve '{schema_path}'"))
            }
            Err(e) => {
                eprintln!("{} {e}", "error:".red().bold());
                Err(anyhow!("Could not resolve '{schema_path}'"))
            }
        }
    }
}

fn format_warning(warning: &Warning) -> String {
    match &warning.field {
        Some(field) => format!("{}.{}: {}", warning.model, field, warning.message),
        None => format!("{}: {}", warning.model, warning.message),
    }
}
