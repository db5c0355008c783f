use std::{env, ffi::OsString};

use crate::errors::{DBResult, Error};

#[derive(Debug, PartialEq)]
pub struct Config {
    pub tcp: bool,
    pub address: String,
    pub port: u16,
    pub served_by: String,
    pub log_level: log::LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp: true,
            address: String::from("127.0.0.1"),
            port: 8080,
            served_by: String::from("d1_engine"),
            log_level: log::LevelFilter::Info,
        }
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> DBResult<String> {
    args.next()
        .and_then(|value| value.into_string().ok())
        .ok_or_else(|| Error::Argument(format!("{} expects a value", flag)))
}

pub fn parse_from(args: impl IntoIterator<Item = OsString>) -> DBResult<Config> {
    let mut config = Config::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.to_str().unwrap_or_default() {
            "--host" => {
                config.address = next_value(&mut args, "--host")?;
            }
            "--port" => {
                let value = next_value(&mut args, "--port")?;
                config.port = value
                    .parse()
                    .map_err(|_| Error::Argument(format!("invalid port: {}", value)))?;
            }
            "--served-by" => {
                config.served_by = next_value(&mut args, "--served-by")?;
            }
            "--log" => {
                let value = next_value(&mut args, "--log")?;
                config.log_level = value
                    .parse()
                    .map_err(|_| Error::Argument(format!("invalid log level: {}", value)))?;
            }
            "--repl" => {
                config.tcp = false;
            }
            _ => {}
        }
    }

    Ok(config)
}

pub fn parse_args() -> DBResult<Config> {
    parse_from(env::args_os().skip(1))
}
