use crate::errors::{DBResult, Error};
use crate::structure::{Record, Table, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TableData {
    pub schema: Table,
    /// Insertion order, which is also the order of unfiltered reads.
    pub rows: Vec<Record>,
}

impl TableData {
    pub fn new(schema: Table) -> Self {
        Self {
            schema,
            rows: vec![],
        }
    }

    /// Next value for the auto-increment key: max existing + 1, from 1.
    pub fn next_key(&self) -> i64 {
        let Some(idx) = self.schema.primary_key else {
            return 1;
        };

        self.rows
            .iter()
            .filter_map(|row| match row.0.get(idx) {
                Some(Value::Integer(key)) => Some(*key),
                _ => None,
            })
            .max()
            .map_or(1, |key| key.saturating_add(1))
    }
}

/// Every table the engine knows about, keyed by lowercase name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Catalog {
    tables: BTreeMap<String, TableData>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table: &str) -> Option<&TableData> {
        self.tables.get(table)
    }

    pub fn get_mut(&mut self, table: &str) -> Option<&mut TableData> {
        self.tables.get_mut(table)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn create(&mut self, schema: Table) -> DBResult<()> {
        if self.tables.contains_key(&schema.table) {
            return Err(Error::SchemaConflict(format!(
                "table {} already exists",
                schema.table
            )));
        }

        self.tables
            .insert(schema.table.clone(), TableData::new(schema));

        Ok(())
    }

    /// Returns whether a table was removed.
    pub fn drop_table(&mut self, table: &str) -> bool {
        self.tables.remove(table).is_some()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn snapshot(&self) -> DBResult<Vec<u8>> {
        let config = bincode::config::standard();

        Ok(bincode::serde::encode_to_vec(&self.tables, config)?)
    }

    pub fn restore(&mut self, snapshot: &[u8]) -> DBResult<()> {
        let config = bincode::config::standard();

        let (tables, _): (BTreeMap<String, TableData>, usize) =
            bincode::serde::decode_from_slice(snapshot, config)?;
        self.tables = tables;

        Ok(())
    }
}
