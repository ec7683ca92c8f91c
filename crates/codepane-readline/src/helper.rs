use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};

use crate::commands::COMMANDS;

/// Completion, highlighting and hints for slash commands and model names.
pub struct CliHelper {
    commands: Vec<&'static str>,
    models: Vec<&'static str>,
}

impl CliHelper {
    pub fn new(models: Vec<&'static str>) -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| *name).collect(),
            models,
        }
    }

    fn candidates(&self, line: &str) -> (usize, Vec<&'static str>) {
        if let Some(prefix) = line.strip_prefix("/model ") {
            let start = line.len() - prefix.len();
            let models = self
                .models
                .iter()
                .copied()
                .filter(|model| model.starts_with(prefix.trim_start()))
                .collect();
            return (start, models);
        }

        if line.starts_with('/') && !line.contains(' ') {
            let commands = self
                .commands
                .iter()
                .copied()
                .filter(|cmd| cmd.starts_with(line))
                .collect();
            return (0, commands);
        }

        (0, Vec::new())
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.candidates(&line[..pos]);
        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.to_string(),
                replacement: candidate.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        let (start, candidates) = self.candidates(line);
        let typed = &line[start..];

        candidates
            .into_iter()
            .find(|candidate| candidate.len() > typed.len())
            .map(|candidate| candidate[typed.len()..].to_string())
    }
}

impl Validator for CliHelper {}
