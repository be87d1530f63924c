use galena::config::Config;
use galena::logging;
use galena::server::GalenaServer;
use log::info;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init_logger()?;

    let server = GalenaServer::bind(Config::default())?;
    info!("Listening on {}", server.local_addr()?);

    server.run();

    Ok(())
}
