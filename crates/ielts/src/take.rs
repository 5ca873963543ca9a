//! Interactive, timed test in the terminal.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use colored::Colorize;
use ielts_core::session::{Session, TestResult};
use ielts_core::timer::DEFAULT_DURATION_SECS;
use ielts_core::{Question, QuestionType};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::clock::{wait_expired, TimerHandle};
use crate::generate::{prepare_session, SourceArgs};
use crate::prelude::{eprintln, println, *};
use crate::status::Activity;

#[derive(Debug, Clone, clap::Args)]
pub struct TakeOptions {
    #[clap(flatten)]
    pub source: SourceArgs,

    /// JSON object mapping question ids to correct answers
    #[arg(long)]
    pub answers: Option<PathBuf>,

    /// Time allowed, in seconds
    #[arg(long, env = "IELTS_DURATION", default_value_t = DEFAULT_DURATION_SECS)]
    pub duration: u32,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

fn block_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</(?:p|h[1-6]|div)>|<br\s*/?>").unwrap())
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

/// Readable text of passage markup: one block per line, tags dropped,
/// entities decoded.
pub fn passage_text(html: &str) -> String {
    let text = block_end().replace_all(html, "\n");
    let text = any_tag().replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Map what was typed to the value the question is scored against.
///
/// Verdicts accept `t`, `f`, `ng` and any casing; option letters are matched
/// case-insensitively. Fill-blank answers are kept as typed.
pub fn interpret_answer(question: &Question, input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }

    match question.kind {
        QuestionType::TrueFalse => {
            let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
            match normalized.as_str() {
                "T" | "TRUE" => "TRUE".to_string(),
                "F" | "FALSE" => "FALSE".to_string(),
                "N" | "NG" | "NOT GIVEN" => "NOT GIVEN".to_string(),
                _ => normalized,
            }
        }
        QuestionType::MultipleChoice => question
            .options
            .iter()
            .flatten()
            .find(|option| option.value.eq_ignore_ascii_case(input))
            .map(|option| option.value.clone())
            .unwrap_or_else(|| input.to_string()),
        QuestionType::FillBlank => input.to_string(),
    }
}

/// Fill in correct answers from an id → answer map. Returns how many
/// questions received a key.
pub fn apply_answer_key(questions: &mut [Question], key: &BTreeMap<u32, String>) -> usize {
    let mut applied = 0;
    for question in questions.iter_mut() {
        if let Some(answer) = key.get(&question.id) {
            question.correct_answer = answer.clone();
            applied += 1;
        }
    }
    applied
}

fn read_answer_key(path: &Path) -> Result<BTreeMap<u32, String>> {
    let raw = std::fs::read_to_string(path).wrap_err_with(|| f!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| f!("Invalid answer key {}", path.display()))
}

fn print_question(question: &Question) {
    println!();
    if let Some(instructions) = &question.instructions {
        println!("{}", instructions.italic());
    }
    println!("{} {}", f!("{}.", question.id).bold().cyan(), question.text);

    match (question.kind, &question.options) {
        (QuestionType::TrueFalse, _) => println!("   {}", "TRUE / FALSE / NOT GIVEN".dimmed()),
        (QuestionType::MultipleChoice, Some(options)) => {
            for option in options {
                println!("   {}. {}", option.value.bold(), option.text);
            }
        }
        _ => println!("   {}", question.placeholder.as_deref().unwrap_or("(type your answer)").dimmed()),
    }
}

fn prompt(timer: &TimerHandle) -> Result<()> {
    anstream::print!("{} > ", f!("[{}]", timer.formatted()).yellow());
    std::io::stdout().flush()?;
    Ok(())
}

fn result_label(question: &Question, result: &TestResult) -> &'static str {
    if question.correct_answer.is_empty() {
        "ungraded"
    } else if result.is_correct(question.id) {
        "correct"
    } else {
        "wrong"
    }
}

fn print_result(session: &Session, result: &TestResult) {
    let mut table = new_table();
    table.add_row(prettytable::row!["#", "Type", "Your answer", "Correct answer", "Result"]);

    for question in &session.questions {
        let given = result.answers.get(&question.id).map(String::as_str).unwrap_or_default();
        table.add_row(prettytable::row![
            question.id,
            question.kind,
            given,
            question.correct_answer,
            result_label(question, result)
        ]);
    }

    println!();
    table.printstd();
    println!();
    println!(
        "{} {}/{} ({} answered)",
        "Score:".bold(),
        result.score.to_string().green().bold(),
        result.total_questions,
        session.completed_count()
    );
}

pub async fn run(options: TakeOptions, global: crate::Global) -> Result<()> {
    let activity = Activity::new();
    let session = prepare_session(&options.source, &global, &activity).await;
    activity.report(global.verbose);
    let mut session = session?;

    if let Some(path) = &options.answers {
        let key = read_answer_key(path)?;
        let applied = apply_answer_key(&mut session.questions, &key);
        if global.verbose {
            eprintln!("Answer key covers {applied} of {} questions", session.questions.len());
        }
    }

    if session.questions.is_empty() {
        return Err(eyre!("No questions found in {}", options.source.pdf.path.display()));
    }

    println!("{}\n", "== Reading Passage ==".bold().cyan());
    println!("{}", passage_text(&session.passage_html));
    println!("\n{}", "== Questions ==".bold().cyan());

    let timer = TimerHandle::start(options.duration);
    let mut expired = timer.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let questions = session.questions.clone();

    for question in &questions {
        print_question(question);
        prompt(&timer)?;

        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => session.answer(question.id, interpret_answer(question, &line))?,
                None => break,
            },
            _ = wait_expired(&mut expired) => {
                println!();
                println!("{}", "Time is up!".red().bold());
                break;
            }
        }
    }

    timer.pause();
    let result = session.score();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&session, &result);
        println!("{} {}", "Time left:".bold(), timer.formatted());
    }
    Ok(())
}
