use super::bind::BoundStatement;
use crate::catalog::Catalog;
use crate::errors::{DBResult, Error};
use crate::result::{Meta, QueryResult};
use crate::sql::{ColumnData, Filter, Statement};
use crate::structure::{Col, Record, Table, Value};
use log::{debug, info};
use std::time::Instant;

/// What the engine hands back for one statement before any formatting.
#[derive(Debug, Default, PartialEq)]
pub struct RawRows {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
    pub changes: usize,
    pub last_row_id: i64,
    pub rows_read: usize,
}

/// Run one statement against the catalog. A statement either applies
/// all of its effect or none of it.
pub fn execute_statement(statement: &BoundStatement, catalog: &mut Catalog) -> DBResult<RawRows> {
    let prepared = statement.prepared();

    debug!(
        "executing {} on {}",
        prepared.statement().kind(),
        prepared.statement().table().unwrap_or("-")
    );

    match prepared.statement() {
        Statement::DropTable { table, if_exists } => {
            if catalog.drop_table(table) {
                info!("dropped table {}", table);
            } else if !if_exists {
                return Err(Error::Schema(format!("no such table: {}", table)));
            }

            Ok(RawRows::default())
        }
        Statement::Create {
            primary_key,
            table,
            cols,
        } => {
            create_table(table, cols, *primary_key, catalog)?;
            info!("created table {}", table);

            Ok(RawRows::default())
        }
        Statement::Insert { cols, rows, table } => insert(statement, table, cols, rows, catalog),
        Statement::SelectLiteral { label, value } => Ok(RawRows {
            columns: vec![label.to_owned()],
            rows: vec![Record(vec![value.clone()])],
            ..RawRows::default()
        }),
        Statement::Select {
            table,
            columns,
            filter,
        } => select(statement, table, columns, filter.as_ref(), catalog),
    }
}

/// Execute and time a statement, producing the formatted result.
pub fn run_statement(
    statement: &BoundStatement,
    catalog: &mut Catalog,
    served_by: &str,
) -> DBResult<QueryResult> {
    let start = Instant::now();

    let raw = execute_statement(statement, catalog)?;

    let meta = Meta {
        duration: start.elapsed().as_secs_f64() * 1000.0,
        served_by: served_by.to_owned(),
        changes: raw.changes,
        last_row_id: raw.last_row_id,
        rows_read: raw.rows_read,
        rows_written: raw.changes,
    };

    Ok(QueryResult::new(raw.columns, raw.rows, meta))
}

fn create_table(
    table: &str,
    cols: &[Col],
    primary_key: Option<usize>,
    catalog: &mut Catalog,
) -> DBResult<()> {
    for (idx, col) in cols.iter().enumerate() {
        if cols[..idx].iter().any(|prev| prev.name == col.name) {
            return Err(Error::Schema(format!("duplicate column name: {}", col.name)));
        }
    }

    catalog.create(Table {
        table: table.to_owned(),
        cols: cols.to_vec(),
        primary_key,
    })
}

fn no_such_table(table: &str) -> Error {
    Error::Schema(format!("no such table: {}", table))
}

fn insert(
    statement: &BoundStatement,
    table: &str,
    cols: &[String],
    rows: &[Vec<ColumnData>],
    catalog: &mut Catalog,
) -> DBResult<RawRows> {
    let data = catalog.get_mut(table).ok_or_else(|| no_such_table(table))?;
    let schema = &data.schema;

    // positions in the table for each value of a tuple
    let targets: Vec<usize> = match cols.is_empty() {
        true => (0..schema.cols.len()).collect(),
        false => cols
            .iter()
            .map(|name| {
                schema.col_index(name).ok_or_else(|| {
                    Error::Schema(format!("table {} has no column named {}", table, name))
                })
            })
            .collect::<DBResult<Vec<usize>>>()?,
    };

    for (idx, target) in targets.iter().enumerate() {
        if targets[..idx].contains(target) {
            return Err(Error::Schema(format!(
                "column {} specified more than once",
                schema.cols[*target].name
            )));
        }
    }

    let mut next_key = data.next_key();
    let mut last_row_id = 0;
    let mut new_rows: Vec<Record> = Vec::with_capacity(rows.len());

    for tuple in rows {
        if tuple.len() != targets.len() {
            return Err(Error::Schema(format!(
                "table {} has {} columns but {} values were supplied",
                table,
                targets.len(),
                tuple.len()
            )));
        }

        let mut record: Vec<Value> = schema
            .cols
            .iter()
            .map(|col| col.default_value.clone().unwrap_or(Value::Null))
            .collect();

        for (target, value) in targets.iter().zip(tuple) {
            record[*target] = statement.resolve(value)?;
        }

        for (idx, col) in schema.cols.iter().enumerate() {
            let value = std::mem::replace(&mut record[idx], Value::Null);
            let kind = value.kind();

            let mut value = col.data_type.accept(value).ok_or_else(|| {
                Error::Type(format!(
                    "cannot store {} value in {} column {}.{}",
                    kind, col.data_type, table, col.name
                ))
            })?;

            if Some(idx) == schema.primary_key {
                if let Value::Null = value {
                    value = Value::Integer(next_key);
                }
                if let Value::Integer(key) = value {
                    next_key = next_key.max(key.saturating_add(1));
                    last_row_id = key;
                }
            }

            if value.is_null() && !col.nullable {
                return Err(Error::Type(format!(
                    "NOT NULL constraint failed: {}.{}",
                    table, col.name
                )));
            }

            if col.unique
                && data
                    .rows
                    .iter()
                    .chain(new_rows.iter())
                    .any(|row| row.0[idx].sql_eq(&value))
            {
                return Err(Error::SchemaConflict(format!(
                    "UNIQUE constraint failed: {}.{}",
                    table, col.name
                )));
            }

            record[idx] = value;
        }

        new_rows.push(Record(record));
    }

    let changes = new_rows.len();
    data.rows.extend(new_rows);

    Ok(RawRows {
        changes,
        last_row_id,
        ..RawRows::default()
    })
}

fn select(
    statement: &BoundStatement,
    table: &str,
    selected: &[String],
    filter: Option<&Filter>,
    catalog: &Catalog,
) -> DBResult<RawRows> {
    let data = catalog.get(table).ok_or_else(|| no_such_table(table))?;

    // `*` reads the table as it is now, not as it was when prepared
    let columns = match selected.is_empty() {
        true => data.schema.col_names(),
        false => selected.to_vec(),
    };

    for (idx, name) in columns.iter().enumerate() {
        if columns[..idx].contains(name) {
            return Err(Error::Schema(format!("column {} selected more than once", name)));
        }
    }

    let idxs = columns
        .iter()
        .map(|name| {
            data.schema
                .col_index(name)
                .ok_or_else(|| Error::Schema(format!("no such column: {}", name)))
        })
        .collect::<DBResult<Vec<usize>>>()?;

    let filter = match filter {
        Some(Filter { column, value }) => {
            let idx = data
                .schema
                .col_index(column)
                .ok_or_else(|| Error::Schema(format!("no such column: {}", column)))?;
            Some((idx, statement.resolve(value)?))
        }
        None => None,
    };

    let rows = data
        .rows
        .iter()
        .filter(|row| match &filter {
            Some((idx, value)) => row.0[*idx].sql_eq(value),
            None => true,
        })
        .map(|row| Record(row.get_with(&idxs)))
        .collect::<Vec<Record>>();

    Ok(RawRows {
        columns,
        rows,
        rows_read: data.rows.len(),
        ..RawRows::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::prepare::prepare_statement;

    fn run(sql: &str, values: Vec<Value>, catalog: &mut Catalog) -> DBResult<RawRows> {
        let bound = prepare_statement(sql, catalog)?.bind(values)?;
        execute_statement(&bound, catalog)
    }

    fn seeded() -> Catalog {
        let mut catalog = Catalog::new();
        run(
            "CREATE TABLE users ( user_id INTEGER PRIMARY KEY, name TEXT, home TEXT, features TEXT);",
            vec![],
            &mut catalog,
        )
        .unwrap();
        run(
            "INSERT INTO users (name, home, features) VALUES
                ('Albert Ross', 'sky', 'wingspan'),
                ('Al Dente', 'bowl', 'mouthfeel');",
            vec![],
            &mut catalog,
        )
        .unwrap();
        catalog
    }

    #[test]
    fn test_auto_increment() {
        let mut catalog = seeded();

        let raw = run("select user_id, name from users", vec![], &mut catalog).unwrap();
        assert_eq!(
            raw.rows,
            vec![
                Record(vec![Value::Integer(1), Value::Text("Albert Ross".into())]),
                Record(vec![Value::Integer(2), Value::Text("Al Dente".into())]),
            ]
        );
        assert_eq!(raw.rows_read, 2);
    }

    #[test]
    fn test_insert_reports_changes() {
        let mut catalog = seeded();

        let raw = run(
            "insert into users (user_id, name) values (10, ?), (?, ?)",
            vec!["a".into(), Value::Null, "b".into()],
            &mut catalog,
        )
        .unwrap();

        assert_eq!(raw.changes, 2);
        assert_eq!(raw.last_row_id, 11);
    }

    #[test]
    fn test_where_filter() {
        let mut catalog = seeded();

        let raw = run(
            "select * from users where user_id = ?",
            vec![Value::Integer(2)],
            &mut catalog,
        )
        .unwrap();
        assert_eq!(raw.rows.len(), 1);
        assert_eq!(raw.rows[0].0[1], Value::Text("Al Dente".into()));

        let none = run(
            "select * from users where user_id = ?",
            vec![Value::Integer(9)],
            &mut catalog,
        )
        .unwrap();
        assert!(none.rows.is_empty());

        let null = run(
            "select * from users where home = ?",
            vec![Value::Null],
            &mut catalog,
        )
        .unwrap();
        assert!(null.rows.is_empty());
    }

    #[test]
    fn test_drop_is_idempotent() {
        let mut catalog = seeded();

        run("DROP TABLE IF EXISTS users;", vec![], &mut catalog).unwrap();
        run("DROP TABLE IF EXISTS users;", vec![], &mut catalog).unwrap();
        assert!(!catalog.contains("users"));

        let err = run("drop table users", vec![], &mut catalog).unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
    }

    #[test]
    fn test_select_same_column_twice() {
        let mut catalog = seeded();

        let err = run("select name, name from users", vec![], &mut catalog).unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
    }

    #[test]
    fn test_select_star_reads_current_schema() {
        let mut catalog = seeded();
        let stmt = prepare_statement("select * from users", &catalog).unwrap();

        run("drop table users", vec![], &mut catalog).unwrap();
        run("create table users (id integer primary key, v text)", vec![], &mut catalog).unwrap();
        run("insert into users (v) values ('a')", vec![], &mut catalog).unwrap();

        let raw = execute_statement(&stmt.bind(vec![]).unwrap(), &mut catalog).unwrap();
        assert_eq!(raw.columns, vec!["id".to_string(), "v".to_string()]);
        assert_eq!(
            raw.rows,
            vec![Record(vec![Value::Integer(1), Value::Text("a".into())])]
        );
    }

    #[test]
    fn test_create_existing() {
        let mut catalog = seeded();

        let err = run("create table users (id integer)", vec![], &mut catalog).unwrap_err();
        assert_eq!(err.kind(), "SchemaConflictError");
    }

    #[test]
    fn test_unknown_column() {
        let mut catalog = seeded();

        let err = run("insert into users (nope) values (1)", vec![], &mut catalog).unwrap_err();
        assert_eq!(err.kind(), "SchemaError");

        let err = run("select nope from users", vec![], &mut catalog).unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
    }

    #[test]
    fn test_text_into_integer_key() {
        let mut catalog = seeded();

        let err = run(
            "insert into users (user_id, name) values (?, 'x')",
            vec!["abc".into()],
            &mut catalog,
        )
        .unwrap_err();

        assert_eq!(err.kind(), "TypeError");
    }

    #[test]
    fn test_failed_insert_leaves_no_rows() {
        let mut catalog = seeded();

        // second tuple reuses key 1
        let err = run(
            "insert into users (user_id, name) values (5, 'x'), (1, 'y')",
            vec![],
            &mut catalog,
        )
        .unwrap_err();

        assert_eq!(err.kind(), "SchemaConflictError");
        assert_eq!(catalog.get("users").unwrap().rows.len(), 2);
    }

    #[test]
    fn test_literal_select() {
        let mut catalog = Catalog::new();

        let raw = run("select 1;", vec![], &mut catalog).unwrap();
        assert_eq!(raw.columns, vec!["1".to_string()]);
        assert_eq!(raw.rows, vec![Record(vec![Value::Integer(1)])]);
    }
}
