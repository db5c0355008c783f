use crate::catalog::Catalog;
use crate::errors::DBResult;
use crate::sql::{interperter::interpect, tokenizer::tokenizer, Statement};
use std::sync::Arc;

#[derive(Debug)]
struct Prepared {
    sql: String,
    statement: Statement,
    columns: Option<Vec<String>>,
    placeholders: usize,
}

/// A compiled statement. Immutable and cheap to clone, so one prepared
/// statement can be bound any number of times from any thread.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    inner: Arc<Prepared>,
}

impl PreparedStatement {
    pub fn sql(&self) -> &str {
        &self.inner.sql
    }

    pub fn statement(&self) -> &Statement {
        &self.inner.statement
    }

    /// Output columns as seen when the statement was prepared. `None` for
    /// `select *` against a table that did not exist yet. Execution of
    /// `select *` always reads the current table.
    pub fn columns(&self) -> Option<&[String]> {
        self.inner.columns.as_deref()
    }

    pub fn placeholder_count(&self) -> usize {
        self.inner.placeholders
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(
            self.inner.statement,
            Statement::Select { .. } | Statement::SelectLiteral { .. }
        )
    }
}

/// Parse one statement without looking at any table.
pub fn compile(buffer: &str) -> DBResult<Statement> {
    let tokens = tokenizer(buffer)?;

    let value = interpect(tokens)?;

    Ok(value)
}

pub fn prepare_statement(buffer: &str, catalog: &Catalog) -> DBResult<PreparedStatement> {
    let statement = compile(buffer)?;

    let columns = match &statement {
        Statement::SelectLiteral { label, .. } => Some(vec![label.to_owned()]),
        Statement::Select { columns, .. } if !columns.is_empty() => Some(columns.to_owned()),
        Statement::Select { table, .. } => catalog.get(table).map(|data| data.schema.col_names()),
        _ => Some(vec![]),
    };

    Ok(PreparedStatement {
        inner: Arc::new(Prepared {
            sql: buffer.trim().to_owned(),
            placeholders: statement.placeholder_count(),
            statement,
            columns,
        }),
    })
}
