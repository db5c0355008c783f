use super::prepare::PreparedStatement;
use crate::errors::{DBResult, Error};
use crate::sql::ColumnData;
use crate::structure::Value;

/// A prepared statement together with one value per placeholder.
#[derive(Debug, Clone)]
pub struct BoundStatement {
    prepared: PreparedStatement,
    values: Vec<Value>,
}

impl BoundStatement {
    pub fn prepared(&self) -> &PreparedStatement {
        &self.prepared
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn resolve(&self, data: &ColumnData) -> DBResult<Value> {
        match data {
            ColumnData::Literal(value) => Ok(value.clone()),
            ColumnData::Placeholder(idx) => {
                self.values.get(*idx).cloned().ok_or(Error::Arity {
                    expected: self.prepared.placeholder_count(),
                    got: self.values.len(),
                })
            }
        }
    }
}

impl PreparedStatement {
    /// Attach values to the placeholders, left to right. The prepared
    /// statement itself is untouched.
    pub fn bind(&self, values: Vec<Value>) -> DBResult<BoundStatement> {
        if values.len() != self.placeholder_count() {
            return Err(Error::Arity {
                expected: self.placeholder_count(),
                got: values.len(),
            });
        }

        Ok(BoundStatement {
            prepared: self.clone(),
            values,
        })
    }
}

impl TryFrom<&PreparedStatement> for BoundStatement {
    type Error = Error;

    fn try_from(value: &PreparedStatement) -> Result<Self, Self::Error> {
        value.bind(vec![])
    }
}
