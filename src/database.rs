use crate::catalog::Catalog;
use crate::commands::batch::{exec_script, run_batch};
use crate::commands::bind::BoundStatement;
use crate::commands::execute::run_statement;
use crate::commands::prepare::{prepare_statement, PreparedStatement};
use crate::errors::{DBResult, Error};
use crate::result::{D1Response, ExecResult, QueryResult};
use crate::structure::Table;
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle to one catalog. Clones share the same tables; every execution
/// takes the catalog lock for its full duration, so callers never see a
/// half applied statement, batch or script.
#[derive(Debug, Clone)]
pub struct Database {
    catalog: Arc<Mutex<Catalog>>,
    served_by: Arc<str>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new("d1_engine")
    }
}

impl Database {
    pub fn new(served_by: &str) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(Catalog::new())),
            served_by: Arc::from(served_by),
        }
    }

    pub fn served_by(&self) -> &str {
        &self.served_by
    }

    fn lock(&self) -> DBResult<MutexGuard<'_, Catalog>> {
        self.catalog
            .lock()
            .map_err(|_| Error::Unexpexted("Failed to lock catalog"))
    }

    pub fn prepare(&self, sql: &str) -> DBResult<PreparedStatement> {
        let catalog = self.lock()?;

        prepare_statement(sql, &catalog)
    }

    pub fn execute(&self, statement: &BoundStatement) -> DBResult<QueryResult> {
        let mut catalog = self.lock()?;

        run_statement(statement, &mut catalog, &self.served_by)
    }

    /// Execute a statement that takes no parameters.
    pub fn query(&self, statement: &PreparedStatement) -> DBResult<QueryResult> {
        self.execute(&BoundStatement::try_from(statement)?)
    }

    pub fn run(&self, statement: &BoundStatement) -> DBResult<D1Response> {
        Ok(self.execute(statement)?.all())
    }

    pub fn batch(&self, statements: &[BoundStatement]) -> DBResult<Vec<QueryResult>> {
        let mut catalog = self.lock()?;

        run_batch(statements, &mut catalog, &self.served_by)
    }

    pub fn exec(&self, script: &str) -> DBResult<ExecResult> {
        let mut catalog = self.lock()?;

        exec_script(script, &mut catalog, &self.served_by)
    }

    pub fn table_names(&self) -> DBResult<Vec<String>> {
        Ok(self.lock()?.table_names())
    }

    pub fn schema(&self, table: &str) -> DBResult<Option<Table>> {
        Ok(self
            .lock()?
            .get(&table.to_lowercase())
            .map(|data| data.schema.clone()))
    }

    pub fn snapshot(&self) -> DBResult<Vec<u8>> {
        self.lock()?.snapshot()
    }
}
