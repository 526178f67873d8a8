// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{ArgMatches, Command};
use colored::Colorize;

use super::{
    command::{
        CommandDefinition, config_arg, directives_arg, generator_args, get, output_arg,
        schema_file_arg,
    },
    util::SchemaInput,
};

pub struct ResolveCommandDefinition {}

impl CommandDefinition for ResolveCommandDefinition {
    fn command(&self) -> Command {
        Command::new("resolve")
            .about("Resolve the relationships of a schema and print the model graph as JSON")
            .arg(schema_file_arg())
            .arg(directives_arg())
            .arg(config_arg())
            .arg(output_arg())
            .args(generator_args())
    }

    fn execute(&self, matches: &ArgMatches) -> Result<()> {
        let input = SchemaInput::from_matches(matches)?;
        let output: Option<PathBuf> = get(matches, "output");

        let resolved = input
            .build()
            .with_context(|| format!("Could not resolve '{}'", input.schema_path.display()))?;

        match &output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create file '{}'", path.display()))?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &resolved)?;
                writeln!(writer)?;
                writer.flush()?;
                eprintln!("Model graph written to {}", path.display().to_string().blue());
            }
            None => {
                let stdout = std::io::stdout();
                let mut writer = stdout.lock();
                serde_json::to_writer_pretty(&mut writer, &resolved)?;
                writeln!(writer)?;
            }
        }

        if !resolved.warnings.is_empty() {
            eprintln!(
                "{}",
                format!("{} warning(s) reported", resolved.warnings.len()).yellow()
            );
        }

        Ok(())
    }
}
