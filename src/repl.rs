//! Interactive read-eval-print loop.

use crate::Interpreter;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use starlark::environment::Module;

/// Read chunks of Starlark from the terminal and evaluate them into `module`.
///
/// Non-`None` results are printed with `repr`; errors are printed and the loop goes on.
/// Ctrl-C discards a half-typed block (or leaves when there is none), Ctrl-D leaves.
pub fn run(interp: &Interpreter, module: &Module) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut chunk = ChunkReader::default();

    loop {
        let prompt = if chunk.is_empty() { ">>> " } else { "... " };
        match rl.readline(prompt) {
            Ok(line) => {
                let Some(source) = chunk.push(&line) else {
                    continue;
                };
                rl.add_history_entry(source.trim_end())?;
                match interp.exec("<stdin>", source, module) {
                    Ok(Some(repr)) => println!("{repr}"),
                    Ok(None) => {}
                    Err(e) => eprintln!("{e:?}"),
                }
            }
            Err(ReadlineError::Interrupted) if !chunk.is_empty() => chunk.clear(),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Groups input lines into complete chunks.
///
/// A line ending in `:` opens a block that an empty line closes. Unbalanced brackets
/// keep the chunk open until they are closed.
#[derive(Debug, Default)]
pub struct ChunkReader {
    lines: Vec<String>,
    in_block: bool,
}

impl ChunkReader {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.in_block = false;
    }

    /// Feed one line. Returns the chunk's source once it is complete.
    pub fn push(&mut self, line: &str) -> Option<String> {
        let blank = line.trim().is_empty();
        if self.lines.is_empty() && blank {
            return None;
        }
        self.lines.push(line.to_string());

        if line.trim_end().ends_with(':') {
            self.in_block = true;
        }
        let complete = if self.in_block {
            blank
        } else {
            bracket_depth(&self.lines) <= 0
        };
        if !complete {
            return None;
        }

        let mut source = self.lines.join("\n");
        source.push('\n');
        self.clear();
        Some(source)
    }
}

/// Net count of open brackets, ignoring quoted text and comments.
fn bracket_depth(lines: &[String]) -> i32 {
    let mut depth = 0;
    for line in lines {
        let mut quote: Option<char> = None;
        let mut chars = line.chars();
        while let Some(c) = chars.next() {
            match (quote, c) {
                (Some(_), '\\') => {
                    chars.next();
                }
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '#') => break,
                (None, '(' | '[' | '{') => depth += 1,
                (None, ')' | ']' | '}') => depth -= 1,
                (None, _) => {}
            }
        }
    }
    depth
}
