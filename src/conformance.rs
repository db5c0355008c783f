//! The D1 API checks, runnable against any [`Database`].
//!
//! Each check reports `"ok"` or `"error: <message>"` under its own name;
//! a failing check never stops the others.

use crate::database::Database;
use crate::errors::{DBResult, Error};
use crate::result::QueryResult;
use crate::structure::Value;
use log::warn;
use serde_json::{json, Value as Json};
use std::collections::BTreeMap;

type Check = fn(&Database) -> DBResult<()>;

pub type Report = Vec<BTreeMap<String, String>>;

const CHECKS: [(&str, Check); 5] = [
    ("test_d1_select_1", select_1),
    ("test_d1_select_all", select_all),
    ("test_d1_select_one", select_one),
    ("test_d1_batch", batch),
    ("test_d1_exec", exec),
];

const SELECT_BY_ID: &str = "select *from users where user_id = ?;";

fn user(id: i64) -> Json {
    match id {
        1 => json!({ "user_id": 1, "name": "Albert Ross", "home": "sky", "features": "wingspan" }),
        _ => json!({ "user_id": 2, "name": "Al Dente", "home": "bowl", "features": "mouthfeel" }),
    }
}

/// Column values of a mock row, in column order.
fn user_values(id: i64) -> Json {
    match user(id) {
        Json::Object(map) => Json::Array(map.into_iter().map(|(_, value)| value).collect()),
        other => other,
    }
}

fn ensure_eq<T: PartialEq + std::fmt::Debug>(actual: T, expected: T, what: &str) -> DBResult<()> {
    if actual != expected {
        return Err(Error::Mismatch(format!(
            "{}: expected {:?}, got {:?}",
            what, expected, actual
        )));
    }

    Ok(())
}

fn raw_json(result: &QueryResult) -> Json {
    Json::Array(
        result
            .raw()
            .iter()
            .map(|row| Json::Array(row.iter().map(Value::to_json).collect()))
            .collect(),
    )
}

/// `all()` must carry exactly these rows plus sane metadata.
fn ensure_all(db: &Database, result: &QueryResult, expected: Json) -> DBResult<()> {
    let all = result.all();

    ensure_eq(serde_json::to_value(&all.results)?, expected, "results")?;
    ensure_eq(all.success, true, "success")?;
    ensure_eq(all.meta.served_by.as_str(), db.served_by(), "meta.served_by")?;
    if all.meta.duration.is_nan() || all.meta.duration < 0.0 {
        return Err(Error::Mismatch(format!(
            "meta.duration: expected >= 0, got {}",
            all.meta.duration
        )));
    }

    Ok(())
}

/// `raw()`, `first()` and `first(column)` of a single-row result.
fn ensure_first(result: &QueryResult, column: &str, id: i64) -> DBResult<()> {
    let expected = user(id);

    ensure_eq(raw_json(result), json!([user_values(id)]), "raw")?;
    ensure_eq(
        result.first().map(serde_json::to_value).transpose()?,
        Some(expected.clone()),
        "first()",
    )?;
    ensure_eq(
        result.first_column(column).map(|value| value.to_json()),
        expected.get(column).cloned(),
        "first(column)",
    )
}

pub fn init(db: &Database) -> DBResult<()> {
    db.batch(&[
        db.prepare("DROP TABLE IF EXISTS users;")?.bind(vec![])?,
        db.prepare(
            "CREATE TABLE users ( user_id INTEGER PRIMARY KEY, name TEXT, home TEXT, features TEXT);",
        )?
        .bind(vec![])?,
        db.prepare(
            "INSERT INTO users (name, home, features) VALUES
                 ('Albert Ross', 'sky', 'wingspan'),
                 ('Al Dente', 'bowl', 'mouthfeel')
            ;",
        )?
        .bind(vec![])?,
    ])?;

    Ok(())
}

fn select_1(db: &Database) -> DBResult<()> {
    let result = db.query(&db.prepare("select 1;")?)?;

    ensure_eq(raw_json(&result), json!([[1]]), "raw")?;
    ensure_eq(
        result.first().map(serde_json::to_value).transpose()?,
        Some(json!({ "1": 1 })),
        "first()",
    )?;
    ensure_eq(result.first_column("1"), Some(Value::Integer(1)), "first('1')")
}

fn select_all(db: &Database) -> DBResult<()> {
    let result = db.query(&db.prepare("select *from users;")?)?;

    ensure_all(db, &result, json!([user(1), user(2)]))?;
    ensure_eq(
        raw_json(&result),
        json!([user_values(1), user_values(2)]),
        "raw",
    )?;
    ensure_eq(
        result.first().map(serde_json::to_value).transpose()?,
        Some(user(1)),
        "first()",
    )?;
    ensure_eq(
        result.first_column("features"),
        Some(Value::Text("wingspan".into())),
        "first('features')",
    )
}

fn select_one(db: &Database) -> DBResult<()> {
    let with_param = db.prepare(SELECT_BY_ID)?;

    for (id, column) in [(1, "home"), (2, "name")] {
        let result = db.execute(&with_param.bind(vec![Value::Integer(id)])?)?;

        ensure_all(db, &result, json!([user(id)]))?;
        ensure_first(&result, column, id)?;
    }

    Ok(())
}

fn batch(db: &Database) -> DBResult<()> {
    let with_param = db.prepare(SELECT_BY_ID)?;

    let response = db.batch(&[
        with_param.bind(vec![Value::Integer(1)])?,
        with_param.bind(vec![Value::Integer(2)])?,
    ])?;

    ensure_eq(response.len(), 2, "batch length")?;
    ensure_all(db, &response[0], json!([user(1)]))?;
    ensure_all(db, &response[1], json!([user(2)]))
}

fn exec(db: &Database) -> DBResult<()> {
    let response = db.exec(
        "
			select 1;
			select * from users;
		",
    )?;

    ensure_eq(response.count, 2, "count")?;
    if response.duration.is_nan() || response.duration < 0.0 {
        return Err(Error::Mismatch(format!(
            "duration: expected >= 0, got {}",
            response.duration
        )));
    }

    Ok(())
}

fn outcome(name: &str, check: Check, db: &Database) -> BTreeMap<String, String> {
    let status = match check(db) {
        Ok(()) => "ok".to_string(),
        Err(err) => {
            warn!("{} failed: {}", name, err);
            format!("error: {}", err)
        }
    };

    BTreeMap::from([(name.to_string(), status)])
}

/// Seed the `users` table, then run every check against it.
pub fn run_suite(db: &Database) -> Report {
    let mut report = vec![outcome("init", init, db)];

    report.extend(CHECKS.iter().map(|(name, check)| outcome(name, *check, db)));

    report
}
