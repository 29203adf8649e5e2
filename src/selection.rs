use crate::error::ImportError;
use inquire::{InquireError, Text};

pub const SKIP_TOKEN: &str = "skip";

#[derive(Debug, PartialEq, Eq)]
pub enum Selection {
    Skip,
    /// Zero-based index into the ranked candidates.
    Pick(usize),
}

pub fn parse_selection(input: &str, count: usize) -> Result<Selection, ImportError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case(SKIP_TOKEN) {
        return Ok(Selection::Skip);
    }

    let choice: i64 = input
        .parse()
        .map_err(|_| ImportError::InvalidSelection(input.to_string()))?;

    if choice < 1 || choice as u64 > count as u64 {
        return Err(ImportError::OutOfRange { choice, count });
    }

    Ok(Selection::Pick(choice as usize - 1))
}

/// Where the operator's answer comes from.
pub trait SelectionSource {
    fn read_choice(&mut self) -> Result<String, ImportError>;
}

pub struct ConsolePrompt;

impl SelectionSource for ConsolePrompt {
    fn read_choice(&mut self) -> Result<String, ImportError> {
        let answer = Text::new("Select a number (or 'skip' to skip this title):")
            .with_help_message("[Esc] to skip")
            .prompt();

        match answer {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationCanceled) => Ok(SKIP_TOKEN.to_string()),
            Err(e) => Err(e.into()),
        }
    }
}
