use anyhow::Context;
use clap::Parser;

use folio::bookmarks::JsonBookmarkStore;
use folio::cli::{self, Cli};
use folio::config::{self, Paths};
use folio::document::TextLoader;
use folio::error;
use folio::logging::Logger;
use folio::settings::Settings;
use folio::{TuiApplication, Viewer};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logger = Logger::new(cli.log_level()).without_stderr();
    if let Some(path) = &cli.log_file {
        logger = logger.with_file_output(path);
    }
    logger.install().context("installing logger")?;
    error::setup_panic_handler();

    if let Some(window) = &cli.reparent {
        log::info!("reparenting to window {} is not supported by the terminal frontend", window);
    }

    let paths = Paths::resolve(cli.config_dir.as_deref(), cli.data_dir.as_deref());
    if let Err(err) = paths.ensure_dirs() {
        log::warn!("{}", err);
    }

    let mut viewer = match Viewer::new(
        Settings::default(),
        Box::new(TextLoader),
        Box::new(JsonBookmarkStore::new(paths.bookmarks_file())),
    ) {
        Ok(viewer) => viewer,
        Err(err) => error::handle_fatal_error(&err, "viewer initialization"),
    };
    config::load_config(&mut viewer, &paths);

    // 標準入力の一時ファイルは終了まで残す
    let source = match cli.file.as_deref() {
        Some(file) => Some(cli::resolve_source(file).context("reading input")?),
        None => None,
    };
    if let Some(source) = &source {
        if let Err(err) = viewer.open_document(&source.path(), cli.password.as_deref()) {
            viewer.notify_error(&err);
        }
    }

    let mut app = TuiApplication::new(viewer);
    if let Err(err) = app.run() {
        error::handle_fatal_error(&err, "event loop");
    }
    Ok(())
}
