use crate::error::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Step(u32), // Step N instructions
  Print,
  Quit,
  Continue,
}

/// Parse one line of step-mode input
pub fn parse_command(line: &str) -> std::result::Result<Command, String> {
  let trimmed = line.trim();

  // Empty input: step once
  if trimmed.is_empty() {
    return Ok(Command::Step(1));
  }

  if let Some(num_str) = trimmed.strip_prefix("si") {
    let num_str = num_str.trim();
    if num_str.is_empty() {
      return Err("'si' requires a number, e.g., 'si 10'".to_string());
    }
    return match num_str.parse::<u32>() {
      Ok(n) if n > 0 => Ok(Command::Step(n)),
      Ok(_) => Err("step count must be greater than 0".to_string()),
      Err(e) => Err(format!("invalid number '{}': {}", num_str, e)),
    };
  }

  match trimmed {
    "q" => Ok(Command::Quit),
    "c" => Ok(Command::Continue),
    "p" => Ok(Command::Print),
    _ => Err(format!(
      "Unknown command: '{}'. Use Enter to step, 'si 10' to step N times, 'p' to print state, 'c' to continue, 'q' to quit",
      trimmed
    )),
  }
}

pub struct Shell {
  editor: DefaultEditor,
}

impl Shell {
  pub fn new() -> Result<Self> {
    Ok(Self {
      editor: DefaultEditor::new()?,
    })
  }

  pub fn read_command(&mut self) -> Result<Command> {
    loop {
      match self.editor.readline("(cfu) ") {
        Ok(line) => {
          let trimmed = line.trim();
          if !trimmed.is_empty() {
            let _ = self.editor.add_history_entry(trimmed);
          }
          match parse_command(trimmed) {
            Ok(cmd) => return Ok(cmd),
            Err(msg) => eprintln!("Error: {}", msg),
          }
        },
        // Ctrl-C / Ctrl-D: quit
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(Command::Quit),
        Err(err) => return Err(err.into()),
      }
    }
  }
}
