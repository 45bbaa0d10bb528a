//! Yes/no confirmations

use inquire::{Confirm, InquireError};

use crate::error::Result;

/// A yes/no question with a stated default answer
pub trait Prompt {
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Interactive prompt on the terminal.
///
/// With `assume_yes` every question is answered with yes without asking.
/// Without a terminal to ask on, the stated default is taken.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquirePrompt {
    pub assume_yes: bool,
}

impl InquirePrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompt for InquirePrompt {
    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let help = if default { "Y/n" } else { "y/N" };
        match Confirm::new(message)
            .with_default(default)
            .with_help_message(help)
            .prompt()
        {
            Ok(answer) => Ok(answer),
            Err(InquireError::NotTTY) => {
                tracing::debug!("No terminal for '{}', taking default {}", message, default);
                Ok(default)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Prompt answering from a fixed script, recording every question asked
#[cfg(test)]
pub struct ScriptedPrompt {
    answers: std::cell::RefCell<std::collections::VecDeque<bool>>,
    asked: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl ScriptedPrompt {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: std::cell::RefCell::new(answers.iter().copied().collect()),
            asked: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

#[cfg(test)]
impl Prompt for ScriptedPrompt {
    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        self.asked.borrow_mut().push(message.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or(default))
    }
}
