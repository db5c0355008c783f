//! An embedded, in-memory SQL engine with the D1 statement API: prepare,
//! bind, execute, batch and script execution over a single catalog.
//!
//! ```
//! use d1_engine::{Database, Value};
//!
//! let db = Database::new("local");
//! db.exec("create table users (user_id integer primary key, name text);
//!          insert into users (name) values ('Albert Ross'), ('Al Dente');")?;
//!
//! let stmt = db.prepare("select * from users where user_id = ?")?;
//! let result = db.execute(&stmt.bind(vec![Value::Integer(2)])?)?;
//! assert_eq!(result.first_column("name"), Some(Value::Text("Al Dente".into())));
//! # Ok::<(), d1_engine::errors::Error>(())
//! ```

pub mod catalog;
pub mod commands;
pub mod conformance;
pub mod controllers;
pub mod database;
pub mod errors;
pub mod logger;
pub mod result;
pub mod sql;
pub mod structure;

pub use commands::bind::BoundStatement;
pub use commands::prepare::PreparedStatement;
pub use database::Database;
pub use errors::Error;
pub use result::{D1Response, ExecResult, Meta, QueryResult, Row};
pub use structure::Value;
