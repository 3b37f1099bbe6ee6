//! External compiler invocation.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Result};
use tplc_cache::{CompileError, Compiler};
use tracing::debug;

/// Placeholder replaced with the absolute source path.
const SOURCE_PLACEHOLDER: &str = "{source}";

/// Placeholder replaced with the temporary output path.
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Runs a configured command line to compile one report.
///
/// A zero exit status means the output file was fully written; anything else
/// is a compile failure carrying the command's stderr.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    argv: Vec<String>,
}

impl CommandCompiler {
    /// Creates a compiler from an argv template. The template must mention
    /// `{output}` somewhere, otherwise the compiler could never produce the
    /// artifact.
    pub fn new(argv: &[String]) -> Result<Self> {
        let Some(program) = argv.first() else {
            bail!("compiler.command is empty");
        };
        if program.is_empty() {
            bail!("compiler.command has an empty program name");
        }
        if !argv.iter().any(|arg| arg.contains(OUTPUT_PLACEHOLDER)) {
            bail!("compiler.command must contain the {OUTPUT_PLACEHOLDER} placeholder");
        }
        Ok(Self {
            argv: argv.to_vec(),
        })
    }

    /// Substitutes the placeholders for one invocation.
    fn render(&self, source: &Path, dest: &Path) -> Vec<String> {
        let source = source.to_string_lossy();
        let dest = dest.to_string_lossy();
        self.argv
            .iter()
            .map(|arg| {
                arg.replace(SOURCE_PLACEHOLDER, &source)
                    .replace(OUTPUT_PLACEHOLDER, &dest)
            })
            .collect()
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, source: &Path, dest: &Path) -> Result<(), CompileError> {
        let argv = self.render(source, dest);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CompileError::new("compiler.command is empty"))?;
        debug!(command = ?argv, "running compiler");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| CompileError::with_cause(format!("failed to run {program}"), e))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(CompileError::new(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }
}
