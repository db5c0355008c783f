pub mod args;
pub mod batch;
pub mod bind;
pub mod execute;
pub mod meta;
pub mod prepare;
