//! Process lifecycle helpers: logging init and shutdown signaling.

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates a `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log(development: bool) {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term_level = if development {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let term = simplelog::TermLogger::new(
        term_level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!();
        log::warn!("interrupt received, shutting down");
        shutdown();
        std::process::exit(0);
    });
}

/// Global interrupt flag checked by long-running loops (gravity tickers,
/// the pub/sub subscribe loop) so they can wind down on shutdown.
#[cfg(feature = "server")]
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

#[cfg(feature = "server")]
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
}

#[cfg(not(feature = "server"))]
pub fn interrupted() -> bool {
    false
}

/// Mark the process as shutting down. Idempotent.
#[cfg(feature = "server")]
pub fn shutdown() {
    INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
}
