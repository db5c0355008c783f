use crate::structure::{Col, Value};

pub mod error;
pub mod interperter;
pub mod tokenizer;

/// A value slot inside a statement: either written in the text or
/// filled in by the binder.
#[derive(Debug, PartialEq, Clone)]
pub enum ColumnData {
    Literal(Value),
    /// Zero based position across the whole statement.
    Placeholder(usize),
}

/// `WHERE <column> = <value>`
#[derive(Debug, PartialEq, Clone)]
pub struct Filter {
    pub column: String,
    pub value: ColumnData,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    /// drop table [if exists] {TABLE}
    DropTable { table: String, if_exists: bool },
    /// create table {TABLE} ({COLUMN-NAME} {TYPE} {CONSTRAINT*}(,))
    Create {
        primary_key: Option<usize>,
        table: String,
        cols: Vec<Col>,
    },
    /// insert into {TABLE} {COLLUMN-NAME?(,)} VALUES (expr?(,))(,)
    Insert {
        cols: Vec<String>,
        rows: Vec<Vec<ColumnData>>,
        table: String,
    },
    /// select {* | COLUMN-NAME(,)} from {TABLE} [where {COLUMN} = {VALUE}]
    Select {
        table: String,
        columns: Vec<String>,
        filter: Option<Filter>,
    },
    /// select {LITERAL}, used as a connectivity probe
    SelectLiteral { label: String, value: Value },
}

impl Statement {
    pub fn placeholder_count(&self) -> usize {
        match self {
            Self::Insert { rows, .. } => rows
                .iter()
                .flatten()
                .filter(|data| matches!(data, ColumnData::Placeholder(_)))
                .count(),
            Self::Select {
                filter: Some(Filter {
                    value: ColumnData::Placeholder(_),
                    ..
                }),
                ..
            } => 1,
            _ => 0,
        }
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            Self::DropTable { table, .. }
            | Self::Create { table, .. }
            | Self::Insert { table, .. }
            | Self::Select { table, .. } => Some(table),
            Self::SelectLiteral { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::DropTable { .. } => "drop",
            Self::Create { .. } => "create",
            Self::Insert { .. } => "insert",
            Self::Select { .. } | Self::SelectLiteral { .. } => "select",
        }
    }
}
