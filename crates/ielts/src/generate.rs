//! Model-backed generation and the shared "PDF to loaded test" step.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use ielts_core::llm::LlmResult;
use ielts_core::session::Session;
use ielts_core::{passage, questions};

use crate::extract::{load_text, PdfArgs};
use crate::llm::{LlmBridge, LlmOptions};
use crate::prelude::{eprintln, println, *};
use crate::status::Activity;

#[derive(Debug, Clone, clap::Args)]
pub struct GenerateOptions {
    #[clap(flatten)]
    pub pdf: PdfArgs,

    #[clap(flatten)]
    pub llm: LlmOptions,
}

/// Where the passage and questions of a test come from.
#[derive(Debug, Clone, clap::Args)]
pub struct SourceArgs {
    #[clap(flatten)]
    pub pdf: PdfArgs,

    /// Build passage and questions with the model instead of the heuristics
    #[arg(long)]
    pub llm: bool,

    #[clap(flatten)]
    pub llm_options: LlmOptions,
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Run the bridge over `raw_text` behind a spinner.
pub async fn generate_with_spinner(options: LlmOptions, raw_text: &str, activity: &Activity) -> Result<LlmResult> {
    let bridge = LlmBridge::with_activity(options.into(), activity.clone())?;

    let spinner = spinner("Generating passage and questions...")?;
    let result = bridge.try_generate(raw_text).await;
    spinner.finish_and_clear();

    Ok(result?)
}

/// Extract the PDF and load its passage and questions into a new session.
pub async fn prepare_session(source: &SourceArgs, global: &crate::Global, activity: &Activity) -> Result<Session> {
    if global.verbose {
        eprintln!("Extracting {}", source.pdf.path.display());
    }
    let extracted = load_text(&source.pdf.extractor(), &source.pdf.path, activity)?;

    let mut session = Session::new();
    if source.llm {
        let result = generate_with_spinner(source.llm_options.clone(), &extracted.text, activity).await?;
        session.load(result.passage_html, result.questions);
    } else {
        session.load(
            passage::format_passage(&extracted.text),
            questions::parse_questions(&extracted.text),
        );
    }

    if global.verbose {
        eprintln!("Loaded {} questions", session.questions.len());
    }
    Ok(session)
}

async fn generate(options: GenerateOptions, global: &crate::Global, activity: &Activity) -> Result<LlmResult> {
    if global.verbose {
        eprintln!("Extracting {}", options.pdf.path.display());
    }
    let extracted = load_text(&options.pdf.extractor(), &options.pdf.path, activity)?;
    generate_with_spinner(options.llm, &extracted.text, activity).await
}

pub async fn run(options: GenerateOptions, global: crate::Global) -> Result<()> {
    let activity = Activity::new();
    let result = generate(options, &global, &activity).await;
    activity.report(global.verbose);

    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use ielts_core::QuestionType;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    use super::*;
    use crate::llm::DEFAULT_ENDPOINT;

    /// Write a one-page PDF with one Helvetica line per `(text, y)` run.
    fn write_pdf(path: &Path, runs: &[(&str, i64)]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = Vec::new();
        for (text, y) in runs {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(11)],
            ));
            operations.push(Operation::new("Td", vec![Object::Integer(72), Object::Integer(*y)]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc.save(path).unwrap();
    }

    fn source(path: PathBuf, llm: bool) -> SourceArgs {
        SourceArgs {
            pdf: PdfArgs {
                path,
                row_tolerance: pdf::layout::ROW_TOLERANCE,
                no_normalize: false,
            },
            llm,
            llm_options: LlmOptions {
                api_key: None,
                endpoint: DEFAULT_ENDPOINT.to_string(),
                model: ielts_core::llm::DEFAULT_MODEL.to_string(),
                timeout: 5,
            },
        }
    }

    fn global() -> crate::Global {
        crate::Global {
            prefs: None,
            verbose: false,
        }
    }

    fn sample_pdf(dir: &Path) -> PathBuf {
        let path = dir.join("test.pdf");
        write_pdf(
            &path,
            &[
                ("Glass", 780),
                ("Questions 1-2", 740),
                ("1. Glass is old. TRUE FALSE NOT GIVEN", 720),
                ("2. It is made of ____.", 700),
            ],
        );
        path
    }

    #[tokio::test]
    async fn test_heuristic_path_loads_passage_and_questions() {
        let dir = tempfile::tempdir().unwrap();
        let activity = Activity::new();

        let session = prepare_session(&source(sample_pdf(dir.path()), false), &global(), &activity)
            .await
            .unwrap();

        assert_eq!(session.passage_html, "<h2>Glass</h2>");
        assert_eq!(session.questions.len(), 2);
        assert_eq!(session.questions[0].kind, QuestionType::TrueFalse);
        assert_eq!(session.questions[0].text, "Glass is old.");
        assert_eq!(session.questions[1].kind, QuestionType::FillBlank);

        let ids: Vec<u32> = session.questions.iter().map(|q| q.id).collect();
        let keys: Vec<u32> = session.answers().keys().copied().collect();
        assert_eq!(keys, ids);
        assert!(session.answers().values().all(String::is_empty));

        assert!(!activity.is_busy());
        assert_eq!(activity.last_error(), None);
    }

    #[tokio::test]
    async fn test_llm_path_without_key_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let activity = Activity::new();

        let err = prepare_session(&source(sample_pdf(dir.path()), true), &global(), &activity)
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Configuration(_))));
        assert!(activity
            .last_error()
            .is_some_and(|m| m.starts_with("OpenRouter API key is missing")));
        assert!(!activity.is_busy());
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_recorded() {
        let activity = Activity::new();

        let err = prepare_session(&source(PathBuf::from("/no/such/test.pdf"), false), &global(), &activity)
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Decode(_))));
        assert!(activity.last_error().is_some());
        assert!(!activity.is_busy());
    }
}
