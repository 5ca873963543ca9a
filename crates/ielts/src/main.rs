use std::path::PathBuf;

use crate::prelude::*;
use clap::Parser;

mod clock;
mod error;
mod extract;
mod generate;
mod llm;
mod prefs;
mod prelude;
mod render;
mod status;
mod take;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Turn IELTS reading-test PDFs into interactive, timed, self-scoring tests"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Preferences file
    #[clap(long, env = "IELTS_PREFS", global = true)]
    prefs: Option<PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "IELTS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Print the plain text reconstructed from a PDF
    Extract(crate::extract::ExtractOptions),

    /// Print the reading passage as HTML
    Passage(crate::extract::PdfArgs),

    /// Print the parsed questions as JSON
    Questions(crate::extract::PdfArgs),

    /// Build passage HTML and graded questions with an LLM
    Generate(crate::generate::GenerateOptions),

    /// Render the test as a standalone HTML page
    Render(crate::render::RenderOptions),

    /// Take the test in the terminal against the clock
    Take(crate::take::TakeOptions),

    /// Show or change persisted preferences
    Prefs(crate::prefs::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Extract(options) => crate::extract::run_extract(options, app.global).await,
        SubCommands::Passage(args) => crate::extract::run_passage(args, app.global).await,
        SubCommands::Questions(args) => crate::extract::run_questions(args, app.global).await,
        SubCommands::Generate(options) => crate::generate::run(options, app.global).await,
        SubCommands::Render(options) => crate::render::run(options, app.global).await,
        SubCommands::Take(options) => crate::take::run(options, app.global).await,
        SubCommands::Prefs(sub_app) => crate::prefs::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
