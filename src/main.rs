use clap::{Parser, Subcommand};
use folio::{
    ActionOrchestrator, DesktopHost, Document, ExportConfig, ExportError, ExportTarget,
    LopdfRasterizer, ToolbarView,
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Export a portfolio CV document to PDF.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Export settings (camelCase JSON). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the document and save it under the configured filename.
    Export {
        document: PathBuf,
        /// Directory the PDF is written to.
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Render the document to a temporary file and open it in the system viewer.
    Preview {
        document: PathBuf,
        /// Write the preview without launching a viewer.
        #[arg(long)]
        no_open: bool,
    },
}

impl Command {
    fn document(&self) -> &PathBuf {
        match self {
            Command::Export { document, .. } | Command::Preview { document, .. } => document,
        }
    }
}

fn main() -> Result<(), ExportError> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExportConfig::from_file(path)?,
        None => ExportConfig::default(),
    };
    let options = config.export_options()?;

    info!("Loading document from {}", cli.command.document().display());
    let document = Document::from_file(cli.command.document())?;

    let out_dir = match &cli.command {
        Command::Export { out, .. } => out.clone(),
        _ => PathBuf::from("."),
    };
    let launch_viewer = !matches!(cli.command, Command::Preview { no_open: true, .. });
    let host = DesktopHost::new(out_dir, config.page_address.clone()).with_viewer(launch_viewer);
    let orchestrator = ActionOrchestrator::new(
        Arc::new(ExportTarget::new(document)),
        host,
        Arc::new(LopdfRasterizer::new()),
        options,
        config.orchestrator_config(),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let outcome = runtime.block_on(async {
        match &cli.command {
            Command::Export { .. } => orchestrator
                .download()
                .await
                .map(|path| format!("Saved {}", path.display())),
            Command::Preview { .. } => orchestrator.open_preview().await.map(|locator| {
                // The viewer reads the file after this process exits.
                let file = orchestrator.host().detach_preview().unwrap_or_default();
                format!("Preview {} written to {}", locator, file.display())
            }),
        }
    });

    println!("{}", ToolbarView::reflect(&orchestrator.state()));
    let message = outcome?;
    println!("{}", message);
    Ok(())
}
