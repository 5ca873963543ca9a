use std::path::PathBuf;

use ielts_core::render;

use crate::generate::{prepare_session, SourceArgs};
use crate::prefs::PreferenceStore;
use crate::prelude::{eprintln, println, *};
use crate::status::Activity;

#[derive(Debug, Clone, clap::Args)]
pub struct RenderOptions {
    #[clap(flatten)]
    pub source: SourceArgs,

    /// HTML layout containing #passage-text, #questions-container and #progress-container
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Output file; prints to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run(options: RenderOptions, global: crate::Global) -> Result<()> {
    let activity = Activity::new();
    let session = prepare_session(&options.source, &global, &activity).await;
    activity.report(global.verbose);
    let session = session?;

    let html = match &options.template {
        Some(path) => {
            let template = std::fs::read_to_string(path)
                .wrap_err_with(|| f!("Failed to read template {}", path.display()))?;
            render::inject(&template, &session.passage_html, &session.questions)?
        }
        None => {
            let prefs = PreferenceStore::resolve(global.prefs.clone())?.load();
            render::render_page(&session.passage_html, &session.questions, prefs.dark_mode)?
        }
    };

    match &options.output {
        Some(path) => {
            std::fs::write(path, html).wrap_err_with(|| f!("Failed to write {}", path.display()))?;
            if global.verbose {
                eprintln!("Wrote {}", path.display());
            }
        }
        None => println!("{html}"),
    }
    Ok(())
}
