//! Core library for ielts
//!
//! This crate is the **Functional Core** of the ielts reading-test tool. It
//! takes the plain text produced by the `pdf` crate (or the model output of
//! the LLM bridge) and turns it into a renderable, scorable test. Nothing in
//! here touches the filesystem, the network or the clock.
//!
//! # Architecture Overview
//!
//! - **`pdf`**: PDF decoding and line reconstruction
//! - **`ielts_core`** (this crate): Pure transformations over extracted text
//! - **`ielts`**: I/O, HTTP, timers and the command line (the Imperative Shell)
//!
//! # Module Organization
//!
//! - [`passage`]: Passage text to `<h2>`/`<p>` blocks
//! - [`questions`]: Heuristic question parsing and classification
//! - [`llm`]: Chat request construction and model response cleanup
//! - [`session`]: Answers and scoring for a loaded test
//! - [`timer`]: Countdown state, ticked by the caller
//! - [`render`]: Injection of passage and questions into a page layout
//! - [`prefs`]: The persisted preference document
//!
//! # Example Usage
//!
//! ```rust
//! use ielts_core::{passage, questions};
//!
//! let text = "TITLE\nQuestions 1-1\n1. The capital is ____.";
//!
//! assert_eq!(passage::format_passage(text), "<h2>TITLE</h2>");
//! assert_eq!(questions::parse_questions(text).len(), 1);
//! ```

pub mod llm;
pub mod passage;
pub mod prefs;
pub mod questions;
pub mod render;
pub mod session;
pub mod timer;
pub mod types;

pub use types::{Question, QuestionOption, QuestionType};
