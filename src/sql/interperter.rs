use super::error::Error;
use super::tokenizer::Token;
use super::{ColumnData, Filter, Statement};
use crate::structure::{Col, DataType, Value};

type TokenIter<'a> = std::iter::Peekable<std::slice::Iter<'a, Token>>;

macro_rules! next_token {
    ($tokens:ident) => {
        $tokens
            .next()
            .ok_or_else(|| Error::Systax("Did not expect EOL"))?
    };
}

macro_rules! peek_next {
    ($tokens:ident) => {
        $tokens
            .peek()
            .ok_or_else(|| Error::Systax("Did not expext EOL"))?
    };
}

pub fn interpect(buffer: Vec<Token>) -> Result<Statement, Error> {
    let mut list = buffer.iter().peekable();

    let index = list.next().ok_or_else(|| Error::Systax("Empty statement"))?;

    let statement = match index {
        Token::Ident(value) => match value.to_lowercase().as_str() {
            "insert" => parse_insert(&mut list),
            "create" => parse_create_table(&mut list),
            "select" => parse_select(&mut list),
            "drop" => parse_drop_table(&mut list),
            _ => Err(Error::Systax("Expected insert,create,drop or select")),
        },
        _ => Err(Error::Systax("Expected identifer")),
    }?;

    parse_end(&mut list)?;

    Ok(statement)
}

/// The trailing semicolon is optional, anything after it is not.
fn parse_end(tokens: &mut TokenIter<'_>) -> Result<(), Error> {
    if let Some(Token::SemiComma) = tokens.peek() {
        tokens.next();
    }

    match tokens.next() {
        None => Ok(()),
        Some(_) => Err(Error::Systax("Unexpected token after end of statement")),
    }
}

fn parse_number(value: &str) -> Result<Value, Error> {
    if value.contains('.') {
        return value
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| Error::Number(value.to_owned()));
    }

    value
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| Error::Number(value.to_owned()))
}

fn parse_value(token: &Token, placeholders: &mut usize) -> Result<ColumnData, Error> {
    match token {
        Token::Placeholder => {
            let idx = *placeholders;
            *placeholders += 1;
            Ok(ColumnData::Placeholder(idx))
        }
        Token::Ident(value) if value.eq_ignore_ascii_case("null") => {
            Ok(ColumnData::Literal(Value::Null))
        }
        Token::Number(value) => Ok(ColumnData::Literal(parse_number(value)?)),
        Token::String(value) => Ok(ColumnData::Literal(Value::Text(value.to_owned()))),
        _ => Err(Error::Systax("Expected a literal or '?'")),
    }
}

/// Parses `name, name, ...)` after the opening pren has been consumed.
fn parse_ident_list(tokens: &mut TokenIter<'_>) -> Result<Vec<String>, Error> {
    let mut cols: Vec<String> = vec![];
    let mut commas: usize = 0;
    while let Some(value) = tokens.next() {
        match value {
            Token::Ident(ident) => {
                if cols.len() != commas {
                    return Err(Error::Systax("Expected an comma"));
                }

                cols.push(ident.to_lowercase());
            }
            Token::Comma => commas += 1,
            Token::RightPren => {
                if cols.len() != commas + 1 {
                    return Err(Error::Systax("Expected a column name"));
                }
                return Ok(cols);
            }
            _ => return Err(Error::Systax("Invaild token")),
        }
    }

    Err(Error::Systax("Expected ')'"))
}

/// Parses `value, value, ...)` after the opening pren has been consumed.
fn parse_tuple(
    tokens: &mut TokenIter<'_>,
    placeholders: &mut usize,
) -> Result<Vec<ColumnData>, Error> {
    let mut data: Vec<ColumnData> = vec![];
    let mut commas: usize = 0;
    while let Some(value) = tokens.next() {
        match value {
            Token::Comma => commas += 1,
            Token::RightPren => {
                if data.len() != commas + 1 {
                    return Err(Error::Systax("Expected a value"));
                }
                return Ok(data);
            }
            token => {
                if data.len() != commas {
                    return Err(Error::Systax("Expected an comma"));
                }

                data.push(parse_value(token, placeholders)?);
            }
        }
    }

    Err(Error::Systax("Expected ')'"))
}

fn parse_drop_table(tokens: &mut TokenIter<'_>) -> Result<Statement, Error> {
    if !next_token!(tokens).is_keyword("table") {
        return Err(Error::Systax("Expected keyword 'table' after 'drop'"));
    }

    let mut if_exists = false;
    if peek_next!(tokens).is_keyword("if") {
        tokens.next();
        if !next_token!(tokens).is_keyword("exists") {
            return Err(Error::Systax("Expected keyword 'exists' after 'if'"));
        }
        if_exists = true;
    }

    let table = next_token!(tokens)
        .get_identifer()
        .ok_or(Error::Systax("Invaild systax: Expected a table name"))?;

    Ok(Statement::DropTable { table, if_exists })
}

fn is_constraint_start(token: &Token) -> bool {
    ["primary", "not", "null", "unique", "default"]
        .iter()
        .any(|keyword| token.is_keyword(keyword))
}

fn parse_create_table(tokens: &mut TokenIter<'_>) -> Result<Statement, Error> {
    let mut table_cols: Vec<Col> = vec![];

    if !next_token!(tokens).is_keyword("table") {
        return Err(Error::Systax(
            "Invaild systax: Expected 'table'|'index'|'trigger'|'view'| after 'create'",
        ));
    }

    let table_name = match next_token!(tokens).get_identifer() {
        Some(ident) => ident,
        None => return Err(Error::Systax("Invaild systax: Expected a table name")),
    };

    if !next_token!(tokens).is_token(&Token::LeftPren) {
        return Err(Error::Systax("Invaild token"));
    }

    let mut primary_key_idx: Option<usize> = None;
    let mut has_primary_key = false;
    let mut closed = false;
    let mut commas = 0;
    while let Some(value) = tokens.next() {
        match value {
            Token::Ident(ident) => {
                if table_cols.len() != commas {
                    return Err(Error::Systax("Expected a ','"));
                }

                // the type name is optional, `any` affinity when absent
                let data_type = match tokens.peek().copied() {
                    Some(token) if !is_constraint_start(token) => match token {
                        Token::Ident(type_name) => {
                            tokens.next();
                            DataType::from(type_name)
                        }
                        _ => DataType::Any,
                    },
                    _ => DataType::Any,
                };

                // VARCHAR(255), DECIMAL(10, 2)
                if let Some(Token::LeftPren) = tokens.peek() {
                    tokens.next();
                    loop {
                        match next_token!(tokens) {
                            Token::Number(_) | Token::Comma => {}
                            Token::RightPren => break,
                            _ => return Err(Error::Systax("Invaild type size")),
                        }
                    }
                }

                let mut col = Col::new(ident.to_lowercase(), data_type);
                while let Some(v) = tokens.peek() {
                    if v == &&Token::Comma || v == &&Token::RightPren {
                        break;
                    }
                    match parse_column_constraint(tokens)? {
                        ColumnConstraint::PrimaryKey(_autoincrement) => {
                            if has_primary_key {
                                return Err(Error::Systax("Table has more than one primary key"));
                            }
                            has_primary_key = true;
                            col.unique = true;
                            col.primary_key = true;
                            // an integer key auto-fills, any other key must be given
                            match data_type {
                                DataType::Integer => primary_key_idx = Some(table_cols.len()),
                                _ => col.nullable = false,
                            }
                        }
                        ColumnConstraint::NotNull => col.nullable = false,
                        ColumnConstraint::Null => col.nullable = true,
                        ColumnConstraint::Unique => col.unique = true,
                        ColumnConstraint::Default(value) => col.default_value = Some(value),
                    };
                }

                table_cols.push(col);
            }
            Token::Comma => commas += 1,
            Token::RightPren => {
                closed = true;
                break;
            }
            _ => {
                return Err(Error::Systax(
                    "Invaild token: Expected a comma or right pren.",
                ));
            }
        }
    }

    if !closed {
        return Err(Error::Systax("Expected ')'"));
    }

    if table_cols.is_empty() || table_cols.len() != commas + 1 {
        return Err(Error::Systax("Expected a column definition"));
    }

    Ok(Statement::Create {
        primary_key: primary_key_idx,
        table: table_name,
        cols: table_cols,
    })
}

fn parse_insert(tokens: &mut TokenIter<'_>) -> Result<Statement, Error> {
    let mut cols: Vec<String> = vec![];
    let mut rows: Vec<Vec<ColumnData>> = vec![];
    let mut placeholders: usize = 0;

    if !next_token!(tokens).is_keyword("into") {
        return Err(Error::Systax("Expected keyword 'into'."));
    }

    let table_name = match next_token!(tokens).get_identifer() {
        Some(i) => i,
        _ => return Err(Error::Systax("Invaild token")),
    };

    // parse
    // TABLE (id,name,user) values
    // or
    // TABLE values
    match next_token!(tokens) {
        Token::LeftPren => {
            cols = parse_ident_list(tokens)?;

            if !next_token!(tokens).is_keyword("values") {
                return Err(Error::Systax("Expected keyword 'values'"));
            }
        }
        Token::Ident(value) => {
            if !value.eq_ignore_ascii_case("values") {
                return Err(Error::Systax("Expected keyword 'values'"));
            }
        }

        _ => return Err(Error::Systax("Expected keyword 'values' or '('")),
    }

    // (..), (..), ...
    loop {
        if !next_token!(tokens).is_token(&Token::LeftPren) {
            return Err(Error::Systax("Expected '('"));
        }

        let tuple = parse_tuple(tokens, &mut placeholders)?;
        if !cols.is_empty() && tuple.len() != cols.len() {
            return Err(Error::Systax("Values count does not match column count"));
        }
        if let Some(first) = rows.first() {
            if first.len() != tuple.len() {
                return Err(Error::Systax("All VALUES must have the same number of terms"));
            }
        }
        rows.push(tuple);

        match tokens.peek().copied() {
            Some(Token::Comma) => {
                tokens.next();
            }
            _ => break,
        }
    }

    Ok(Statement::Insert {
        table: table_name,
        cols,
        rows,
    })
}

fn parse_select(tokens: &mut TokenIter<'_>) -> Result<Statement, Error> {
    // select 1;
    let label = match peek_next!(tokens) {
        Token::Number(value) => Some(value.to_owned()),
        Token::String(value) => Some(format!("'{}'", value)),
        Token::Ident(value) if value.eq_ignore_ascii_case("null") => Some("NULL".to_string()),
        _ => None,
    };

    if let Some(label) = label {
        let mut placeholders = 0;
        let value = match parse_value(next_token!(tokens), &mut placeholders)? {
            ColumnData::Literal(value) => value,
            ColumnData::Placeholder(_) => return Err(Error::Systax("Expected a literal")),
        };

        return Ok(Statement::SelectLiteral { label, value });
    }

    let mut cols = vec![];

    match next_token!(tokens) {
        Token::Star => {}
        Token::Ident(ident) => {
            cols.push(ident.to_lowercase());
            while let Some(Token::Comma) = tokens.peek() {
                tokens.next();
                match next_token!(tokens).get_identifer() {
                    Some(ident) => cols.push(ident),
                    None => return Err(Error::Systax("Expected an column name")),
                }
            }
        }
        _ => return Err(Error::Systax("Expected '*' or a column name")),
    }

    if !next_token!(tokens).is_keyword("from") {
        return Err(Error::Systax("Expected keyword 'from'"));
    }

    let table_name = match next_token!(tokens).get_identifer() {
        Some(i) => i,
        None => return Err(Error::Systax("Invaild token")),
    };

    let mut filter = None;
    if let Some(token) = tokens.peek().copied() {
        if token.is_keyword("where") {
            tokens.next();

            let column = next_token!(tokens)
                .get_identifer()
                .ok_or(Error::Systax("Expected an column name after 'where'"))?;

            if !next_token!(tokens).is_token(&Token::Equals) {
                return Err(Error::Systax("Expected '='"));
            }

            let mut placeholders = 0;
            let value = parse_value(next_token!(tokens), &mut placeholders)?;

            filter = Some(Filter { column, value });
        }
    }

    Ok(Statement::Select {
        table: table_name,
        columns: cols,
        filter,
    })
}

#[derive(Debug, PartialEq)]
pub enum ColumnConstraint {
    /// Carries whether AUTOINCREMENT was written.
    PrimaryKey(bool),
    NotNull,
    Null,
    Unique,
    Default(Value),
}

/// Handle parseing column constraints
/// see - https://www.sqlite.org/syntax/column-constraint.html for flow chart.
///
/// Handles the following
///
/// PRIMARY KEY (ASC|DESC)? (AUTOINCREMENT)?
/// NOT NULL
/// NULL
/// UNIQUE
/// DEFAULT literal-value|signed-number
fn parse_column_constraint(tokens: &mut TokenIter<'_>) -> Result<ColumnConstraint, Error> {
    match next_token!(tokens) {
        Token::Ident(item) => match item.to_lowercase().as_str() {
            "primary" => {
                if !next_token!(tokens).is_keyword("key") {
                    return Err(Error::Systax("Expected keyworld 'key' after 'primary'"));
                }

                // ordering only matters for index layout, accepted and ignored
                if let Some(token) = tokens.peek().copied() {
                    if token.is_keyword("asc") || token.is_keyword("desc") {
                        tokens.next();
                    }
                }

                let autoint = match tokens.peek().copied() {
                    Some(token) if token.is_keyword("autoincrement") => {
                        tokens.next();
                        true
                    }
                    _ => false,
                };

                Ok(ColumnConstraint::PrimaryKey(autoint))
            }
            "not" => {
                if !next_token!(tokens).is_keyword("null") {
                    return Err(Error::Systax("Expected keyworld 'null' after 'not'"));
                }
                Ok(ColumnConstraint::NotNull)
            }
            "null" => Ok(ColumnConstraint::Null),
            "unique" => Ok(ColumnConstraint::Unique),
            "default" => {
                let mut placeholders = 0;
                match parse_value(next_token!(tokens), &mut placeholders)? {
                    ColumnData::Literal(value) => Ok(ColumnConstraint::Default(value)),
                    ColumnData::Placeholder(_) => Err(Error::Systax("Invaild data")),
                }
            }
            _ => Err(Error::Systax("Unknown column constraint")),
        },
        _ => Err(Error::Systax("Expected a column constraint")),
    }
}
