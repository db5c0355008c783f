use d1_engine::commands::args;
use d1_engine::controllers::{cli_handler, tcp_handler};
use d1_engine::{logger, Database};
use std::io;

fn main() -> io::Result<()> {
    let config = args::parse_args()
        .map_err(|x| io::Error::new(io::ErrorKind::InvalidInput, x.to_string()))?;

    logger::init(config.log_level)
        .map_err(|x| io::Error::new(io::ErrorKind::Other, x.to_string()))?;

    let db = Database::new(&config.served_by);

    let result = match config.tcp {
        true => tcp_handler::handle_tcp(&config.address, config.port, db),
        false => cli_handler::handle_cli(db),
    };

    result.map_err(|x| io::Error::new(io::ErrorKind::Other, x.to_string()))
}
