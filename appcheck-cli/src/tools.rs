//! Process adapters for the default checker (`tsc`) and linter (`eslint`).

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use appcheck_compile::{
    validate::{Diagnostic, LintMessage, LintOutcome},
    Checker, Error, Linter,
};
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::Deserialize;
use tokio::{io::AsyncWriteExt, process::Command};

use crate::util::{CheckerConfig, LinterConfig};

lazy_static! {
    static ref TSC_DIAGNOSTIC_RE: Regex =
        Regex::new(r"^(.+)\((\d+),(\d+)\): error (TS\d+: .*)$").unwrap();
}

pub struct TscChecker {
    command: String,
    args: Vec<String>,
}

impl TscChecker {
    pub fn new(config: &CheckerConfig) -> Self {
        TscChecker {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

#[async_trait]
impl Checker for TscChecker {
    async fn check(&self, files: &[PathBuf], config: &Path) -> Result<Vec<Diagnostic>, Error> {
        debug!("running {} over {} files", self.command, files.len());
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg("-p")
            .arg(config)
            .arg("--pretty")
            .arg("false")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| Error::Checker(format!("could not run {}: {}", self.command, err)))?;

        let diagnostics = parse_tsc_output(&String::from_utf8_lossy(&output.stdout));
        if !output.status.success() && diagnostics.is_empty() {
            return Err(Error::Checker(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(diagnostics)
    }
}

/// Parses `file(line,col): error TSxxxx: message` lines. Indented lines continue the
/// previous message.
pub fn parse_tsc_output(output: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in output.lines() {
        if let Some(caps) = TSC_DIAGNOSTIC_RE.captures(line) {
            diagnostics.push(Diagnostic {
                file: PathBuf::from(&caps[1]),
                line: caps[2].parse().unwrap_or_default(),
                column: caps[3].parse().unwrap_or_default(),
                message: caps[4].to_string(),
            });
        } else if line.starts_with(' ') {
            if let Some(last) = diagnostics.last_mut() {
                last.message.push('\n');
                last.message.push_str(line.trim_end());
            }
        }
    }

    diagnostics
}

pub struct EslintLinter {
    command: String,
    args: Vec<String>,
}

impl EslintLinter {
    pub fn new(config: &LinterConfig) -> Self {
        EslintLinter {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

#[async_trait]
impl Linter for EslintLinter {
    async fn lint(&self, source: &str, config: &Path, label: &str) -> Result<LintOutcome, Error> {
        let failed = |message: String| Error::Linter {
            label: label.to_string(),
            message,
        };

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg("--no-eslintrc")
            .arg("-c")
            .arg(config)
            .arg("--fix-dry-run")
            .arg("--format")
            .arg("json")
            .arg("--stdin")
            .arg("--stdin-filename")
            .arg(format!("{}.js", label))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| failed(format!("could not run {}: {}", self.command, err)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .await
                .map_err(|err| failed(format!("could not write source: {}", err)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|err| failed(err.to_string()))?;

        // exit code 1 only means problems were found
        if !matches!(output.status.code(), Some(0) | Some(1)) {
            return Err(failed(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_eslint_output(&String::from_utf8_lossy(&output.stdout), source).map_err(failed)
    }
}

#[derive(Deserialize)]
struct EslintResult {
    #[serde(default)]
    messages: Vec<EslintMessage>,
    output: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintMessage {
    rule_id: Option<String>,
    message: String,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

/// Reads eslint's json report for a single stdin source.
pub fn parse_eslint_output(output: &str, source: &str) -> Result<LintOutcome, String> {
    let results: Vec<EslintResult> =
        serde_json::from_str(output).map_err(|err| format!("unreadable report: {}", err))?;
    let result = match results.into_iter().next() {
        Some(result) => result,
        None => return Err("report is empty".to_string()),
    };

    let messages = result
        .messages
        .into_iter()
        .map(|message| LintMessage {
            line: message.line,
            column: message.column,
            rule: message.rule_id,
            message: message.message,
        })
        .collect();

    Ok(match result.output {
        Some(output) if output != source => LintOutcome {
            output,
            fixed: true,
            messages,
        },
        _ => LintOutcome {
            output: source.to_string(),
            fixed: false,
            messages,
        },
    })
}
