//! Commands that stop at the heuristic pipeline: plain text, passage HTML
//! and parsed questions.

use std::path::{Path, PathBuf};

use ielts_core::{passage, questions};
use pdf::{ExtractedText, Extractor, ExtractorOptions};

use crate::prelude::{eprintln, println, *};
use crate::status::Activity;

#[derive(Debug, Clone, clap::Args)]
pub struct PdfArgs {
    /// Path to the PDF file
    pub path: PathBuf,

    /// Maximum vertical distance between fragments of one line
    #[arg(long, default_value_t = pdf::layout::ROW_TOLERANCE)]
    pub row_tolerance: f32,

    /// Keep fragment text exactly as decoded
    #[arg(long)]
    pub no_normalize: bool,
}

impl PdfArgs {
    pub fn extractor(&self) -> Extractor {
        Extractor::new(ExtractorOptions {
            row_tolerance: self.row_tolerance,
            normalize_text: !self.no_normalize,
        })
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct ExtractOptions {
    #[clap(flatten)]
    pub pdf: PdfArgs,

    /// Print the reconstructed lines as JSON
    #[arg(long)]
    pub lines: bool,
}

/// Read and extract `path`, holding the busy flag for the duration.
pub fn load_text(extractor: &Extractor, path: &Path, activity: &Activity) -> std::result::Result<ExtractedText, Error> {
    let _guard = activity.begin();

    let result = extractor.extract_file(path).map_err(Error::from);
    match &result {
        Ok(extracted) => log::info!(
            "{}: {} pages, {} lines",
            path.display(),
            extracted.page_count,
            extracted.lines.len()
        ),
        Err(err) => activity.record_error(err.to_string()),
    }
    result
}

fn load(args: &PdfArgs, global: &crate::Global, activity: &Activity) -> Result<ExtractedText> {
    if global.verbose {
        eprintln!("Extracting {}", args.path.display());
    }
    Ok(load_text(&args.extractor(), &args.path, activity)?)
}

pub async fn run_extract(options: ExtractOptions, global: crate::Global) -> Result<()> {
    let activity = Activity::new();
    let extracted = load(&options.pdf, &global, &activity);
    activity.report(global.verbose);
    let extracted = extracted?;

    if options.lines {
        println!("{}", serde_json::to_string_pretty(&extracted.lines)?);
    } else {
        println!("{}", extracted.text);
    }
    Ok(())
}

pub async fn run_passage(args: PdfArgs, global: crate::Global) -> Result<()> {
    let activity = Activity::new();
    let extracted = load(&args, &global, &activity);
    activity.report(global.verbose);

    println!("{}", passage::format_passage(&extracted?.text));
    Ok(())
}

pub async fn run_questions(args: PdfArgs, global: crate::Global) -> Result<()> {
    let activity = Activity::new();
    let extracted = load(&args, &global, &activity);
    activity.report(global.verbose);

    let parsed = questions::parse_questions(&extracted?.text);
    if global.verbose {
        eprintln!("Parsed {} questions", parsed.len());
    }
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_a_decode_error_and_clears_busy() {
        let activity = Activity::new();
        let err = load_text(&Extractor::default(), Path::new("/no/such/file.pdf"), &activity).unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
        assert!(!activity.is_busy());
        assert!(activity.last_error().is_some());
    }

    #[test]
    fn test_garbage_bytes_are_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 not really").unwrap();

        let activity = Activity::new();
        let err = load_text(&Extractor::default(), &path, &activity).unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
        assert!(!activity.is_busy());
    }

    #[test]
    fn test_pdf_args_build_the_extractor() {
        let args = PdfArgs {
            path: PathBuf::from("x.pdf"),
            row_tolerance: 4.0,
            no_normalize: true,
        };
        let options = *args.extractor().options();
        assert_eq!(options.row_tolerance, 4.0);
        assert!(!options.normalize_text);
    }
}
