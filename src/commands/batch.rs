use super::bind::BoundStatement;
use super::execute::run_statement;
use super::prepare::{prepare_statement, PreparedStatement};
use crate::catalog::Catalog;
use crate::errors::{DBResult, Error};
use crate::result::{ExecResult, QueryResult};
use log::{debug, error, warn};

/// Catalog image taken before the first write of a batch or script, put
/// back if anything after it fails.
#[derive(Default)]
struct Rollback {
    snapshot: Option<Vec<u8>>,
}

impl Rollback {
    fn before(&mut self, statement: &PreparedStatement, catalog: &Catalog) -> DBResult<()> {
        if self.snapshot.is_none() && statement.is_mutation() {
            self.snapshot = Some(catalog.snapshot()?);
        }

        Ok(())
    }

    /// Put the snapshot back, then hand back the error that caused it.
    fn undo(self, catalog: &mut Catalog, cause: Error) -> Error {
        if let Some(snapshot) = self.snapshot {
            if let Err(err) = catalog.restore(&snapshot) {
                error!("failed to roll back after \"{}\": {}", cause, err);
            }
        }

        cause
    }
}

/// Run bound statements in order, each seeing the effects of the ones
/// before it. Either every statement applies or none do.
pub fn run_batch(
    statements: &[BoundStatement],
    catalog: &mut Catalog,
    served_by: &str,
) -> DBResult<Vec<QueryResult>> {
    let mut rollback = Rollback::default();
    let mut results = Vec::with_capacity(statements.len());

    for (idx, statement) in statements.iter().enumerate() {
        let outcome = rollback
            .before(statement.prepared(), catalog)
            .and_then(|_| run_statement(statement, catalog, served_by));

        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                warn!("batch statement {} failed, rolling back: {}", idx, err);
                return Err(rollback.undo(catalog, err));
            }
        }
    }

    debug!("batch of {} statements committed", results.len());

    Ok(results)
}

/// Split a script on the semicolons that end statements, skipping those
/// inside quotes. Blank fragments are dropped.
pub fn split_script(script: &str) -> Vec<&str> {
    let mut fragments = vec![];
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, char) in script.char_indices() {
        match (quote, char) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '\"') => quote = Some(char),
            (None, ';') => {
                fragments.push(&script[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    fragments.push(&script[start..]);

    fragments
        .into_iter()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// Run a semicolon separated script without parameters. Reports how many
/// statements ran and their summed duration; any failure undoes the
/// whole script.
pub fn exec_script(script: &str, catalog: &mut Catalog, served_by: &str) -> DBResult<ExecResult> {
    let mut rollback = Rollback::default();
    let mut count = 0;
    let mut duration = 0.0;

    for fragment in split_script(script) {
        let outcome = prepare_statement(fragment, catalog)
            .and_then(|prepared| {
                rollback.before(&prepared, catalog)?;
                prepared.bind(vec![])
            })
            .and_then(|bound| run_statement(&bound, catalog, served_by));

        match outcome {
            Ok(result) => {
                count += 1;
                duration += result.meta().duration;
            }
            Err(err) => {
                warn!("script statement {} failed, rolling back: {}", count, err);
                return Err(rollback.undo(catalog, err));
            }
        }
    }

    Ok(ExecResult { count, duration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Value;

    const SERVED_BY: &str = "test";

    fn seeded() -> Catalog {
        let mut catalog = Catalog::new();
        exec_script(
            "DROP TABLE IF EXISTS users;
             CREATE TABLE users ( user_id INTEGER PRIMARY KEY, name TEXT, home TEXT, features TEXT);
             INSERT INTO users (name, home, features) VALUES
                ('Albert Ross', 'sky', 'wingspan'),
                ('Al Dente', 'bowl', 'mouthfeel');",
            &mut catalog,
            SERVED_BY,
        )
        .unwrap();
        catalog
    }

    #[test]
    fn test_split_script() {
        assert_eq!(split_script("select 1;;  ;select 1;"), vec!["select 1", "select 1"]);
        assert_eq!(
            split_script("insert into t (a) values ('x;y'); select 1"),
            vec!["insert into t (a) values ('x;y')", "select 1"]
        );
        assert!(split_script("  ;\n ; ").is_empty());
    }

    #[test]
    fn test_exec_counts_statements() {
        let mut catalog = seeded();

        let result = exec_script(
            "
            select 1;
            select * from users;
        ",
            &mut catalog,
            SERVED_BY,
        )
        .unwrap();

        assert_eq!(result.count, 2);
        assert!(result.duration >= 0.0);

        let result = exec_script("select 1;;  ;select 1;", &mut catalog, SERVED_BY).unwrap();
        assert_eq!(result.count, 2);
    }

    #[test]
    fn test_exec_rolls_back() {
        let mut catalog = seeded();
        let before = catalog.snapshot().unwrap();

        let err = exec_script(
            "insert into users (name) values ('x'); select * from missing;",
            &mut catalog,
            SERVED_BY,
        )
        .unwrap_err();

        assert_eq!(err.kind(), "SchemaError");
        assert_eq!(catalog.snapshot().unwrap(), before);
    }

    #[test]
    fn test_exec_rejects_placeholders() {
        let mut catalog = seeded();

        let err = exec_script("select * from users where user_id = ?", &mut catalog, SERVED_BY)
            .unwrap_err();
        assert_eq!(err.kind(), "ArityError");
    }

    #[test]
    fn test_batch_results_in_order() {
        let mut catalog = seeded();

        let stmt = prepare_statement("select *from users where user_id = ?;", &catalog).unwrap();
        let results = run_batch(
            &[
                stmt.bind(vec![Value::Integer(1)]).unwrap(),
                stmt.bind(vec![Value::Integer(2)]).unwrap(),
            ],
            &mut catalog,
            SERVED_BY,
        )
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].first_column("name"),
            Some(Value::Text("Albert Ross".into()))
        );
        assert_eq!(
            results[1].first_column("name"),
            Some(Value::Text("Al Dente".into()))
        );
    }

    #[test]
    fn test_batch_sees_earlier_statements() {
        let mut catalog = Catalog::new();

        let create = prepare_statement("create table t (id integer primary key, v text)", &catalog)
            .unwrap();
        let insert = prepare_statement("insert into t (v) values (?)", &catalog).unwrap();
        let select = prepare_statement("select v from t", &catalog).unwrap();

        let results = run_batch(
            &[
                create.bind(vec![]).unwrap(),
                insert.bind(vec!["a".into()]).unwrap(),
                select.bind(vec![]).unwrap(),
            ],
            &mut catalog,
            SERVED_BY,
        )
        .unwrap();

        assert_eq!(results[2].raw(), vec![vec![Value::Text("a".into())]]);
    }

    #[test]
    fn test_batch_select_star_after_recreate() {
        let mut catalog = seeded();

        let select = prepare_statement("select * from users", &catalog).unwrap();
        let drop = prepare_statement("drop table users", &catalog).unwrap();
        let create = prepare_statement("create table users (id integer primary key, v text)", &catalog)
            .unwrap();
        let insert = prepare_statement("insert into users (v) values ('a')", &catalog).unwrap();

        let results = run_batch(
            &[
                drop.bind(vec![]).unwrap(),
                create.bind(vec![]).unwrap(),
                insert.bind(vec![]).unwrap(),
                select.bind(vec![]).unwrap(),
            ],
            &mut catalog,
            SERVED_BY,
        )
        .unwrap();

        assert_eq!(results[3].columns(), &["id".to_string(), "v".to_string()][..]);
        assert_eq!(
            results[3].raw(),
            vec![vec![Value::Integer(1), Value::Text("a".into())]]
        );
    }

    #[test]
    fn test_rollback_keeps_statement_error() {
        let mut catalog = seeded();
        let before = catalog.snapshot().unwrap();

        let rollback = Rollback {
            snapshot: Some(before.clone()),
        };
        catalog.drop_table("users");

        let err = rollback.undo(&mut catalog, Error::Type("bad value".into()));
        assert_eq!(err.kind(), "TypeError");
        assert_eq!(catalog.snapshot().unwrap(), before);

        // an unreadable snapshot still reports the statement error
        let rollback = Rollback {
            snapshot: Some(vec![]),
        };
        let err = rollback.undo(&mut catalog, Error::Schema("no such table: x".into()));
        assert_eq!(err.kind(), "SchemaError");
    }

    #[test]
    fn test_batch_is_atomic() {
        let mut catalog = seeded();
        let before = catalog.snapshot().unwrap();

        let insert = prepare_statement("insert into users (name) values (?)", &catalog).unwrap();
        let bad = prepare_statement("insert into users (user_id) values (?)", &catalog).unwrap();

        let err = run_batch(
            &[
                insert.bind(vec!["Anne Chovy".into()]).unwrap(),
                bad.bind(vec!["not a key".into()]).unwrap(),
                insert.bind(vec!["Never Run".into()]).unwrap(),
            ],
            &mut catalog,
            SERVED_BY,
        )
        .unwrap_err();

        assert_eq!(err.kind(), "TypeError");
        assert_eq!(catalog.snapshot().unwrap(), before);
    }
}
