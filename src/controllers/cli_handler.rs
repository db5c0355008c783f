use crate::{
    commands::{batch::split_script, meta},
    database::Database,
    errors::Error,
    result::QueryResult,
};
use log::{error, info};
use std::io::{stdin, stdout, Write};

fn print_rows(result: &QueryResult) {
    if result.columns().is_empty() {
        info!(
            "Ok ({} changed, {:.3}ms)",
            result.meta().changes,
            result.meta().duration
        );
        return;
    }

    println!(" {} |", result.columns().join(" | "));
    for row in result.raw() {
        for value in row {
            print!(" {} |", value);
        }
        println!();
    }
}

fn run_request(value: &str, db: &Database) -> Result<(), Error> {
    let fragments = split_script(value);

    match fragments.as_slice() {
        [] => Ok(()),
        [statement] => {
            let result = db.query(&db.prepare(statement)?)?;
            print_rows(&result);
            Ok(())
        }
        _ => {
            let result = db.exec(value)?;
            info!(
                "Ok ({} statements, {:.3}ms)",
                result.count, result.duration
            );
            Ok(())
        }
    }
}

pub fn handle_cli(db: Database) -> Result<(), Error> {
    let mut input = String::new();

    loop {
        input.clear();
        print!("> ");
        stdout().flush()?;

        if stdin().read_line(&mut input)? == 0 {
            return Ok(());
        }

        if input.starts_with('.') {
            match meta::run_meta_command(&input, &db) {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(err) => error!("{}", err),
            }
            continue;
        }

        if let Err(e) = run_request(&input, &db) {
            error!("{}: {}", e.kind(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_request() {
        let db = Database::default();

        run_request("create table t (id integer primary key, v text);", &db).unwrap();
        run_request("insert into t (v) values ('a'); insert into t (v) values ('b');", &db)
            .unwrap();
        run_request("select * from t", &db).unwrap();
        run_request("   ", &db).unwrap();

        assert!(run_request("select * from missing", &db).is_err());
    }
}
