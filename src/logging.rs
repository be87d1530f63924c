use log::LevelFilter;
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::error::Error;

#[cfg(debug_assertions)]
const LEVEL_FILTER: LevelFilter = LevelFilter::Debug;
#[cfg(not(debug_assertions))]
const LEVEL_FILTER: LevelFilter = LevelFilter::Info;

/// Configures the log4rs crate to write to the console and to `logs/latest.log`. Messages are in
/// the form `[HH:MM:SS Level]: message`. If debug assertions are off, then logging events on the
/// debug level are blocked.
pub fn init_logger() -> Result<(), Box<dyn Error>> {
    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("[{d(%H:%M:%S)} {l}]: {m}\n")))
        .build();

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("[{d(%H:%M:%S)} {l}]: {m}\n")))
        .build("logs/latest.log")?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("console")
                .appender("logfile")
                .build(LEVEL_FILTER),
        )?;

    log4rs::init_config(config)?;

    Ok(())
}
