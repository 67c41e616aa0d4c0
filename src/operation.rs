//! Text-producing operations that guards wrap
//!
//! An operation takes no arguments and yields a string, or fails. Guards
//! only ever invoke it; they never hold mutable access to it.

use std::process::{Command, Stdio};

use crate::error::{GuardError, Result};

/// A zero-argument, string-producing capability
pub trait Operation {
    /// Produce one output
    fn invoke(&self) -> Result<String>;
}

impl<O: Operation + ?Sized> Operation for &O {
    fn invoke(&self) -> Result<String> {
        (**self).invoke()
    }
}

impl<O: Operation + ?Sized> Operation for Box<O> {
    fn invoke(&self) -> Result<String> {
        (**self).invoke()
    }
}

/// Operation backed by a closure, see [`from_fn`]
#[derive(Clone)]
pub struct FnOperation<F> {
    f: F,
}

/// Wrap a closure as an [`Operation`]
///
/// Example: `from_fn(|| Ok("hello".to_string()))`
pub fn from_fn<F>(f: F) -> FnOperation<F>
where
    F: Fn() -> Result<String>,
{
    FnOperation { f }
}

impl<F> Operation for FnOperation<F>
where
    F: Fn() -> Result<String>,
{
    fn invoke(&self) -> Result<String> {
        (self.f)()
    }
}

/// Runs a shell command and yields its stdout
#[derive(Debug, Clone)]
pub struct CommandOperation {
    command: String,
    shell: String,
}

impl CommandOperation {
    /// Create an operation running `command` through `sh -c`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            shell: "sh".to_string(),
        }
    }

    /// Use a different shell
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Operation for CommandOperation {
    fn invoke(&self) -> Result<String> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .output()
            .map_err(GuardError::operation)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GuardError::operation(format!(
                "command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim_end_matches(['\n', '\r']).to_string())
    }
}
