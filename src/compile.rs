//! The external DSL compiler boundary.
//!
//! The DSL itself is opaque to this engine: text goes in, intermediate
//! deck XML comes out, or a compile error whose message is passed
//! through verbatim. [`CommandCompiler`] wraps the external executable;
//! [`PassthroughCompiler`] serves inputs that are already XML.

use crate::error::PipelineError;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Compiles DSL text into intermediate deck XML.
pub trait DeckCompiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<String, PipelineError>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Treats the input as already-compiled XML.
#[derive(Debug, Default)]
pub struct PassthroughCompiler;

impl DeckCompiler for PassthroughCompiler {
    fn compile(&self, source: &str) -> Result<String, PipelineError> {
        Ok(source.to_string())
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

/// Invokes an external compiler executable: DSL on stdin, XML on
/// stdout. A non-zero exit turns stderr into the compile error, verbatim.
#[derive(Debug)]
pub struct CommandCompiler {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandCompiler {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl DeckCompiler for CommandCompiler {
    fn compile(&self, source: &str) -> Result<String, PipelineError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PipelineError::Compile(format!("failed to start {}: {}", self.program.display(), e))
            })?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| PipelineError::Compile(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| PipelineError::Compile(e.to_string()))?;

        if !output.status.success() {
            return Err(PipelineError::Compile(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| PipelineError::Compile(format!("compiler produced invalid UTF-8: {}", e)))
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_returns_input() {
        let xml = "<deck><slide/></deck>";
        assert_eq!(PassthroughCompiler.compile(xml).unwrap(), xml);
    }

    #[test]
    fn test_command_compiler_missing_program_is_compile_error() {
        let compiler = CommandCompiler::new("/definitely/not/a/compiler");
        let err = compiler.compile("box").unwrap_err();
        assert!(matches!(err, PipelineError::Compile(_)));
    }
}
