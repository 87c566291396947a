//! `yolocam` command line: live grid watcher, headless canvas renders,
//! layer sheets and layer maintenance against a capture server.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::error::Error;
    use std::io::{self, BufRead, Write};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use clap::{Parser, Subcommand};

    use yolocam::actions::CaptureControls;
    use yolocam::api::HttpBackend;
    use yolocam::config::AppConfig;
    use yolocam::grid::UniformGridGeometry;
    use yolocam::image_loader::load_dataset_image;
    use yolocam::library::LibraryView;
    use yolocam::palette::load_palette;
    use yolocam::poller::LivePoller;
    use yolocam::raster::{pixmap_from_rgba, PixmapSurface};
    use yolocam::sheet::{compose_layer, SheetSpec, SheetWatcher};
    use yolocam::AnnotationSession;

    type CliResult = Result<(), Box<dyn Error>>;

    #[derive(Parser, Debug)]
    #[command(name = "yolocam", about = "Capture grid, annotation and sheet client")]
    struct Cli {
        /// Configuration file (defaults to the per-user config directory).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Capture server root URL; overrides the configuration file.
        #[arg(long, env = "YOLOCAM_BASE_URL")]
        base_url: Option<String>,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Poll the live state and log grid changes until capture stops.
        Watch,
        /// Render a dataset image with its boxes to PNG.
        Render {
            #[arg(long, default_value = "train")]
            split: String,
            #[arg(long)]
            image: String,
            #[arg(long)]
            out: PathBuf,
        },
        /// Compose the sheet of a layer to PNG.
        Sheet {
            #[arg(long)]
            layer: u32,
            #[arg(long)]
            out: PathBuf,
            /// Keep recomposing whenever the layer changes.
            #[arg(long)]
            watch: bool,
        },
        /// Print the class palette.
        Classes,
        /// Print the effective configuration.
        Config {
            /// Also write it to the configuration file.
            #[arg(long)]
            save: bool,
        },
        /// Delete every capture of a layer.
        DeleteLayer {
            #[arg(long)]
            layer: u32,
            #[arg(long)]
            delete_files: bool,
            /// Skip the confirmation prompt.
            #[arg(long)]
            yes: bool,
        },
    }

    fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn Error>> {
        match path {
            Some(path) => Ok(AppConfig::load_from_path(path)?),
            None => Ok(AppConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    pub async fn run() -> CliResult {
        let cli = Cli::parse();
        let mut config = load_config(cli.config.as_deref())?;
        if let Some(base_url) = cli.base_url {
            config.backend.base_url = base_url;
        }

        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .init();
        log::debug!("backend {}", config.backend.base_url);

        let backend = Arc::new(HttpBackend::new(&config.backend.base_url, config.backend.timeout())?);
        match cli.command {
            Command::Watch => watch(&config, backend).await,
            Command::Render { split, image, out } => render(&config, backend.as_ref(), &split, &image, &out).await,
            Command::Sheet { layer, out, watch } => sheet(&config, backend, layer, &out, watch).await,
            Command::Classes => classes(backend.as_ref()).await,
            Command::Config { save } => show_config(&config, cli.config.as_deref(), save),
            Command::DeleteLayer {
                layer,
                delete_files,
                yes,
            } => delete_layer(&config, backend, layer, delete_files, yes).await,
        }
    }

    fn poller(config: &AppConfig, backend: Arc<HttpBackend>) -> Arc<LivePoller<HttpBackend, UniformGridGeometry>> {
        let geometry = UniformGridGeometry::new(config.filmstrip.thumb_width, config.filmstrip.thumb_width * 0.75, 8.0);
        LivePoller::new(backend, geometry, config.poller.interval(), config.poller.cells)
    }

    async fn watch(config: &AppConfig, backend: Arc<HttpBackend>) -> CliResult {
        let poller = poller(config, backend);
        let mut rx = poller.subscribe();
        poller.boot_if_needed();
        loop {
            tokio::time::sleep(config.poller.interval()).await;
            if rx.has_changed()? {
                let snapshot = rx.borrow_and_update().clone();
                let filled = snapshot.cells.iter().filter(|c| !c.is_slot()).count();
                match snapshot.active {
                    Some(active) => log::info!("{} captures, scanning slot {}", filled, active + 1),
                    None => log::info!("{} captures, idle", filled),
                }
            }
            if !poller.is_watching() {
                log::info!("capture stopped");
                return Ok(());
            }
        }
    }

    async fn render(config: &AppConfig, backend: &HttpBackend, split: &str, image: &str, out: &Path) -> CliResult {
        let palette = load_palette(backend).await;
        let mut session = AnnotationSession::new(split, config.canvas.size(), palette).with_style(config.canvas.style());
        let ticket = session.begin_load(image);
        let loaded = load_dataset_image(backend, split, ticket).await?;
        if !session.commit_loaded(&loaded) {
            let dims = loaded.dimensions;
            return Err(format!("{} has no usable size ({}x{})", image, dims.width, dims.height).into());
        }

        let mut surface = PixmapSurface::new(config.canvas.width, config.canvas.height)?;
        let pixmap = pixmap_from_rgba(&loaded.pixels);
        session.render(&mut surface, pixmap.as_ref());
        surface.save_png(out)?;
        println!("{}", session.hud_text());
        Ok(())
    }

    async fn sheet(config: &AppConfig, backend: Arc<HttpBackend>, layer: u32, out: &Path, watch: bool) -> CliResult {
        let spec = SheetSpec {
            layer,
            limit: config.library.limit,
            columns: config.sheet.columns,
            tile_width: config.sheet.tile_width,
            tile_height: config.sheet.tile_height,
        };
        if !watch {
            compose_layer(backend.as_ref(), &spec).await?.save(out)?;
            println!("{}", out.display());
            return Ok(());
        }

        let watcher = SheetWatcher::new(backend, spec, config.sheet.watch_interval());
        let mut rx = watcher.subscribe();
        watcher.start();
        while rx.changed().await.is_ok() {
            let sheet = rx.borrow_and_update().clone();
            if let Some(sheet) = sheet {
                sheet.save(out)?;
                println!("{}", out.display());
            }
        }
        Ok(())
    }

    async fn classes(backend: &HttpBackend) -> CliResult {
        let palette = load_palette(backend).await;
        for (i, entry) in palette.entries().iter().enumerate() {
            println!("{}\t{}\t{}", i, entry.name, entry.color);
        }
        Ok(())
    }

    fn show_config(config: &AppConfig, path: Option<&Path>, save: bool) -> CliResult {
        println!("{}", config.to_json()?);
        if save {
            match path {
                Some(path) => config.save_to_path(path)?,
                None => config.save_to_default_path()?,
            }
        }
        Ok(())
    }

    fn ask(prompt: &str) -> bool {
        print!("{} [s/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "s" | "si" | "sí" | "y" | "yes")
    }

    async fn delete_layer(
        config: &AppConfig,
        backend: Arc<HttpBackend>,
        layer: u32,
        delete_files: bool,
        yes: bool,
    ) -> CliResult {
        let poller = poller(config, Arc::clone(&backend));
        let mut controls = CaptureControls::new(backend, poller, LibraryView::new(config.library.limit));
        controls.refresh_layers().await?;
        if !controls.filter.select(layer) {
            return Err(format!("la capa {} no existe (total {})", layer, controls.layers.total).into());
        }
        controls.delete_files = delete_files;

        let report = if yes {
            controls.delete_layer(&|_: &str| true).await?
        } else {
            controls.delete_layer(&ask).await?
        };
        println!("{}", report);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
