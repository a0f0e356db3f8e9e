//! Interactive answer collection.
//!
//! A flow is an ordered list of [`PromptSpec`]s. [`collect`] asks each one in
//! turn through an [`InputSource`], re-asking the same prompt until its
//! validator accepts the value, and only hands back an [`AnswerRecord`] once
//! every prompt has passed.

use std::collections::VecDeque;
use std::fmt;

use log::debug;

use crate::error::CollectError;

/// Validation hook: receives the candidate value and the answers gathered so far.
pub type Validator = Box<dyn Fn(&str, &AnswerRecord) -> Result<(), String>>;

/// How a prompt reads its value from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Plain,
    /// Input is never echoed back.
    Masked,
}

/// One question in an interactive flow.
pub struct PromptSpec {
    field: String,
    message: String,
    mode: InputMode,
    validate: Validator,
}

impl PromptSpec {
    pub fn plain(field: &str, message: &str) -> Self {
        Self::new(field, message, InputMode::Plain)
    }

    pub fn masked(field: &str, message: &str) -> Self {
        Self::new(field, message, InputMode::Masked)
    }

    fn new(field: &str, message: &str, mode: InputMode) -> Self {
        PromptSpec {
            field: field.to_string(),
            message: message.to_string(),
            mode,
            validate: Box::new(|_, _| Ok(())),
        }
    }

    /// Replace the validator (the default accepts anything).
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &AnswerRecord) -> Result<(), String> + 'static,
    {
        self.validate = Box::new(f);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn check(&self, value: &str, answers: &AnswerRecord) -> Result<(), String> {
        (self.validate)(value, answers)
    }
}

impl fmt::Debug for PromptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptSpec")
            .field("field", &self.field)
            .field("message", &self.message)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Validated answers keyed by field name, in prompt order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerRecord {
    entries: Vec<(String, String)>,
}

impl AnswerRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn insert(&mut self, field: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field.to_string(), value)),
        }
    }
}

/// Where prompt answers come from.
pub trait InputSource {
    /// Show the prompt and read one value.
    fn read(&mut self, spec: &PromptSpec) -> Result<String, CollectError>;

    /// Tell the operator why the last value for `spec` was refused.
    fn reject(&mut self, spec: &PromptSpec, reason: &str);
}

/// Run `specs` in order against `input`.
pub fn collect<I>(specs: &[PromptSpec], input: &mut I) -> Result<AnswerRecord, CollectError>
where
    I: InputSource + ?Sized,
{
    let mut answers = AnswerRecord::default();
    for spec in specs {
        loop {
            let value = input.read(spec)?;
            match spec.check(&value, &answers) {
                Ok(()) => {
                    answers.insert(spec.field(), value);
                    break;
                }
                Err(reason) => {
                    debug!("prompt '{}' rejected input: {}", spec.field(), reason);
                    input.reject(spec, &reason);
                }
            }
        }
    }
    Ok(answers)
}

/// Canned answers for non-interactive runs and tests.
///
/// Running out of answers behaves like the operator closing stdin.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    asked: Vec<String>,
    rejections: Vec<(String, String)>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedInput {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Field names in the order they were prompted (repeats included).
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// `(field, reason)` for every refused value.
    pub fn rejections(&self) -> &[(String, String)] {
        &self.rejections
    }
}

impl InputSource for ScriptedInput {
    fn read(&mut self, spec: &PromptSpec) -> Result<String, CollectError> {
        self.asked.push(spec.field().to_string());
        self.answers.pop_front().ok_or(CollectError::Aborted)
    }

    fn reject(&mut self, spec: &PromptSpec, reason: &str) {
        self.rejections.push((spec.field().to_string(), reason.to_string()));
    }
}
