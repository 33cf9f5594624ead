//! Interactive prompts for values given as `-ask` on the command line.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

use crate::error::{DriveError, Result};

/// Asks the user for a value, offering a default.
///
/// An empty default means the answer is required.
pub trait Prompter {
    fn ask(&self, prompt: &str, default: &str) -> Result<String>;
}

/// Terminal prompt backed by dialoguer.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&self, prompt: &str, default: &str) -> Result<String> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        input
            .interact_text()
            .map_err(|e| DriveError::PromptError(e.to_string()))
    }
}
