//! Operator interaction, behind a trait so flows can run against scripted answers.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use zeroize::Zeroizing;

use super::util::{parse_choice, parse_confirm, parse_selection};
use crate::catalog::Choice;
use crate::errors::BackupError;

pub trait Prompter {
    /// Free text; an empty answer yields `default` when given.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, BackupError>;

    /// Hidden input.
    fn password(&mut self, message: &str) -> Result<Zeroizing<String>, BackupError>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, BackupError>;

    /// Pick one of `options`; returns its index.
    fn select(&mut self, message: &str, options: &[&str], default: usize) -> Result<usize, BackupError>;

    /// Pick any number of `choices`; returns their indices ascending.
    fn multi_select(&mut self, message: &str, choices: &[Choice]) -> Result<Vec<usize>, BackupError>;

    /// Show a line of output to the operator.
    fn say(&mut self, line: &str);
}

/// Prompts on stderr, answers from stdin, messages on stdout.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, BackupError> {
        let mut err = io::stderr();
        write!(err, "? {prompt} ")?;
        err.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(BackupError::Prompt("input closed".into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, BackupError> {
        let prompt = match default {
            Some(d) => format!("{message} ({d})"),
            None => message.to_string(),
        };
        let answer = self.read_line(&prompt)?;
        Ok(match default {
            Some(d) if answer.trim().is_empty() => d.to_string(),
            _ => answer.trim().to_string(),
        })
    }

    fn password(&mut self, message: &str) -> Result<Zeroizing<String>, BackupError> {
        rpassword::prompt_password(format!("? {message} "))
            .map(Zeroizing::new)
            .map_err(|e| BackupError::Prompt(format!("password input: {e}")))
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, BackupError> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            if let Some(answer) = parse_confirm(&self.read_line(&format!("{message} ({hint})"))?, default) {
                return Ok(answer);
            }
            eprintln!("  please answer y or n");
        }
    }

    fn select(&mut self, message: &str, options: &[&str], default: usize) -> Result<usize, BackupError> {
        eprintln!("? {message}");
        for (i, option) in options.iter().enumerate() {
            eprintln!("  {}) {option}", i + 1);
        }
        loop {
            let answer = self.read_line(&format!("choose 1-{} ({})", options.len(), default + 1))?;
            if let Some(i) = parse_choice(&answer, options.len(), default) {
                return Ok(i);
            }
            eprintln!("  enter a number between 1 and {}", options.len());
        }
    }

    fn multi_select(&mut self, message: &str, choices: &[Choice]) -> Result<Vec<usize>, BackupError> {
        eprintln!("? {message}");
        for (i, c) in choices.iter().enumerate() {
            let mark = match (c.disabled, c.checked) {
                (true, _) => "-",
                (false, true) => "x",
                (false, false) => " ",
            };
            let note = if c.disabled { " (not selectable)" } else { "" };
            eprintln!("  {}) [{mark}] {}{note}", i + 1, c.name);
        }
        loop {
            let answer = self.read_line("numbers separated by commas, 'all', 'none', or enter for [x]")?;
            match parse_selection(&answer, choices) {
                Ok(picked) => return Ok(picked),
                Err(msg) => eprintln!("  {msg}"),
            }
        }
    }

    fn say(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Replays queued answers, recording every prompt and message.
///
/// Each prompt consumes one answer; an answer the real terminal would
/// re-ask for is an error here.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
    pub output: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { answers: answers.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<String, BackupError> {
        self.asked.push(message.to_string());
        self.answers.pop_front().ok_or_else(|| BackupError::Prompt(format!("no scripted answer for: {message}")))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, BackupError> {
        let answer = self.next(message)?;
        Ok(match default {
            Some(d) if answer.trim().is_empty() => d.to_string(),
            _ => answer.trim().to_string(),
        })
    }

    fn password(&mut self, message: &str) -> Result<Zeroizing<String>, BackupError> {
        self.next(message).map(Zeroizing::new)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, BackupError> {
        let answer = self.next(message)?;
        parse_confirm(&answer, default).ok_or_else(|| BackupError::Prompt(format!("not a yes/no answer: {answer:?}")))
    }

    fn select(&mut self, message: &str, options: &[&str], default: usize) -> Result<usize, BackupError> {
        let answer = self.next(message)?;
        parse_choice(&answer, options.len(), default)
            .ok_or_else(|| BackupError::Prompt(format!("not a valid choice: {answer:?}")))
    }

    fn multi_select(&mut self, message: &str, choices: &[Choice]) -> Result<Vec<usize>, BackupError> {
        let answer = self.next(message)?;
        parse_selection(&answer, choices).map_err(BackupError::Prompt)
    }

    fn say(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}
