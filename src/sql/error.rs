use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("{0}")]
    UnknownChar(String),
    #[error("{0}")]
    Systax(&'static str),
    #[error("Invaild number literal: {0}")]
    Number(String),
}
