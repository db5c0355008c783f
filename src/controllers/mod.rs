pub mod cli_handler;
pub mod tcp_handler;
