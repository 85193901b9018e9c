//! Rules backed by external linters and formatters.
//!
//! Each tool is invoked synchronously; the run blocks until the tool exits. Content is
//! passed on stdin or through a scratch file, output is captured on reader threads so
//! a chatty tool can never fill a pipe and stall.

mod coffeelint;
mod jalopy;
mod pep8;
mod phpcs;
mod puppet;
mod pyflakes;
mod pythontidy;

pub use coffeelint::Coffeelint;
pub use jalopy::Jalopy;
pub use pep8::Pep8;
pub use phpcs::Phpcs;
pub use puppet::PuppetParser;
pub use pyflakes::Pyflakes;
pub use pythontidy::PythonTidy;

use crate::rule::RuleError;
use std::ffi::{OsStr, OsString};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;

/// Result of executing a tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `-1` when the tool was killed by a signal
    pub exit_code: i32,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Builder for one external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    input: Option<Vec<u8>>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            envs: Vec::new(),
            input: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Content written to the tool's stdin
    pub fn stdin(mut self, input: &[u8]) -> Self {
        self.input = Some(input.to_vec());
        self
    }

    fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    pub fn run(self) -> Result<ToolOutput, RuleError> {
        let tool_name = self.display_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(self.envs.iter().map(|(k, v)| (k, v)));
        cmd.stdin(if self.input.is_some() { Stdio::piped() } else { Stdio::null() });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        log::debug!("Running {tool_name} {:?}", self.args);
        let mut child = cmd
            .spawn()
            .map_err(|e| RuleError::Execution(format!("failed to run '{tool_name}': {e}")))?;

        let stdout_handle = child
            .stdout
            .take()
            .map(|stdout| thread::spawn(move || read_pipe_to_string(stdout)));
        let stderr_handle = child
            .stderr
            .take()
            .map(|stderr| thread::spawn(move || read_pipe_to_string(stderr)));

        if let Some(input) = &self.input
            && let Some(mut stdin) = child.stdin.take()
        {
            // A tool may exit without reading its input; that surfaces through its exit code.
            if let Err(e) = stdin.write_all(input) {
                log::debug!("Failed to write to stdin of '{tool_name}': {e}");
            }
        }

        let status = child
            .wait()
            .map_err(|e| RuleError::Execution(format!("failed to wait for '{tool_name}': {e}")))?;
        let stdout = join_reader(stdout_handle).map_err(RuleError::Execution)?;
        let stderr = join_reader(stderr_handle).map_err(RuleError::Execution)?;

        Ok(ToolOutput {
            stdout,
            stderr,
            exit_code: status.code().unwrap_or(-1),
        })
    }
}

fn read_pipe_to_string<R: Read>(mut pipe: R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn join_reader(handle: Option<thread::JoinHandle<std::io::Result<String>>>) -> Result<String, String> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(res) => res.map_err(|e| format!("Failed to read output: {e}")),
            Err(_) => Err("Output reader thread panicked".to_string()),
        },
        None => Ok(String::new()),
    }
}

/// A `path:line[:column]: message` diagnostic as printed by most linters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedMessage {
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: String,
}

/// Parse one diagnostic line; the leading path may itself contain no colon.
pub fn parse_located_line(line: &str) -> Option<LocatedMessage> {
    let mut parts = line.splitn(4, ':');
    let _path = parts.next()?;
    let line_no = parts.next()?.trim().parse::<usize>().ok()?;
    let third = parts.next()?;
    match third.trim().parse::<usize>() {
        Ok(column) => Some(LocatedMessage {
            line: Some(line_no),
            column: Some(column),
            message: parts.next().unwrap_or("").trim().to_string(),
        }),
        Err(_) => {
            let mut message = third.to_string();
            if let Some(rest) = parts.next() {
                message.push(':');
                message.push_str(rest);
            }
            Some(LocatedMessage {
                line: Some(line_no),
                column: None,
                message: message.trim().to_string(),
            })
        }
    }
}

/// Split one CSV record. Fields may be quoted; inside quotes a backslash escapes the
/// next character (phpcs writes its reports this way).
pub fn split_csv_record(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    field.push(escaped);
                }
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_located_line_with_column() {
        assert_eq!(
            parse_located_line("stdin:12:80: E501 line too long (95 > 79 characters)"),
            Some(LocatedMessage {
                line: Some(12),
                column: Some(80),
                message: "E501 line too long (95 > 79 characters)".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_located_line_without_column() {
        assert_eq!(
            parse_located_line("<stdin>:3: 'os' imported but unused"),
            Some(LocatedMessage {
                line: Some(3),
                column: None,
                message: "'os' imported but unused".to_string(),
            })
        );
        assert_eq!(parse_located_line("garbage"), None);
    }

    #[test]
    fn test_split_csv_record() {
        assert_eq!(
            split_csv_record(r#""STDIN",4,1,error,"Missing \"doc\" comment, see PSR",PEAR.Commenting"#),
            vec!["STDIN", "4", "1", "error", "Missing \"doc\" comment, see PSR", "PEAR.Commenting"]
        );
        assert_eq!(split_csv_record("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_missing_tool_is_an_execution_error() {
        let err = ToolCommand::new("/nonexistent/tool-for-codevalidator").run().unwrap_err();
        assert!(matches!(err, RuleError::Execution(_)));
        assert!(err.to_string().starts_with("ExecutionError: failed to run"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_and_stdout_are_wired() {
        let output = ToolCommand::new("cat").stdin(b"hello").run().unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "hello");
    }
}
