use log::{info, warn};

use crate::{conformance, database::Database, errors::Error};

/// Run a `.command` typed at the prompt. Returns `false` when the REPL
/// should stop.
pub fn run_meta_command(buffer: &str, db: &Database) -> Result<bool, Error> {
    // remove \r
    let input: String = buffer.trim().chars().filter(|x| !x.is_control()).collect();
    let mut parts = input.split_whitespace();

    match (parts.next().unwrap_or_default(), parts.next()) {
        (".exit", _) => return Ok(false),
        (".tables", _) => {
            for table in db.table_names()? {
                info!("{}", table);
            }
        }
        (".schema", Some(table)) => match db.schema(table)? {
            Some(schema) => info!("{}", schema),
            None => warn!("no such table: {}", table),
        },
        (".schema", None) => {
            for table in db.table_names()? {
                if let Some(schema) = db.schema(&table)? {
                    info!("{}", schema);
                }
            }
        }
        (".check", _) => {
            let report = conformance::run_suite(db);
            info!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            warn!("Unknown Command: {}", input.escape_debug());
        }
    }

    Ok(true)
}
