//! User interface implementations

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use tapdeploy_runtime::deps::{MessageStyle, ProgressIndicator, UserInterface};

/// Production UI implementation using indicatif
pub struct RealUserInterface;

impl UserInterface for RealUserInterface {
    fn create_spinner(&self) -> Box<dyn ProgressIndicator> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        Box::new(RealProgressIndicator { pb })
    }

    fn print(&self, message: &str) {
        println!("{message}");
    }

    fn print_styled(&self, message: &str, msg_style: MessageStyle) {
        let styled = match msg_style {
            MessageStyle::Bold => style(message).bold().to_string(),
            MessageStyle::Cyan => style(message).cyan().to_string(),
            MessageStyle::Green => style(message).green().to_string(),
            MessageStyle::Red => style(message).red().to_string(),
            MessageStyle::Yellow => style(message).yellow().to_string(),
            MessageStyle::Warning => style(message).yellow().bold().to_string(),
            MessageStyle::Error => style(message).red().bold().to_string(),
            MessageStyle::Success => style(message).green().bold().to_string(),
        };
        println!("{styled}");
    }

    fn is_interactive(&self) -> bool {
        atty::is(atty::Stream::Stdin)
    }

    fn prompt_input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        use dialoguer::{theme::ColorfulTheme, Input};

        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt);

        if let Some(default_val) = default {
            input = input.default(default_val.to_string());
        }

        input
            .interact_text()
            .map_err(|e| anyhow::anyhow!("Failed to get input: {}", e))
    }

    fn prompt_password(&self, prompt: &str) -> Result<String> {
        use dialoguer::{theme::ColorfulTheme, Password};

        Password::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to get password: {}", e))
    }
}

struct RealProgressIndicator {
    pb: ProgressBar,
}

impl ProgressIndicator for RealProgressIndicator {
    fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }

    fn enable_steady_tick(&self, duration: Duration) {
        self.pb.enable_steady_tick(duration);
    }

    fn finish_with_message(&self, message: String) {
        self.pb.finish_with_message(message);
    }
}

// Test implementations for mocking

/// Test UI implementation that captures output and answers prompts with
/// canned values
pub struct TestUserInterface {
    /// Plain messages passed to `print` and `print_styled`
    pub output: Arc<Mutex<Vec<String>>>,
    /// Styled messages with their style
    pub styled_output: Arc<Mutex<Vec<(String, MessageStyle)>>>,
    /// Answer returned by `prompt_password`
    pub password: Arc<Mutex<String>>,
}

impl Default for TestUserInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl TestUserInterface {
    /// Create a capture UI with empty canned answers.
    pub fn new() -> Self {
        Self {
            output: Arc::new(Mutex::new(Vec::new())),
            styled_output: Arc::new(Mutex::new(Vec::new())),
            password: Arc::new(Mutex::new(String::new())),
        }
    }

    /// Everything printed so far.
    pub fn get_output(&self) -> Vec<String> {
        self.output.lock().unwrap().clone()
    }

    /// Styled messages printed so far.
    pub fn get_styled_output(&self) -> Vec<(String, MessageStyle)> {
        self.styled_output.lock().unwrap().clone()
    }

    /// Set the answer `prompt_password` returns.
    pub fn set_password(&self, value: &str) {
        *self.password.lock().unwrap() = value.to_string();
    }
}

impl UserInterface for TestUserInterface {
    fn create_spinner(&self) -> Box<dyn ProgressIndicator> {
        Box::new(TestProgressIndicator)
    }

    fn print(&self, message: &str) {
        self.output.lock().unwrap().push(message.to_string());
    }

    fn print_styled(&self, message: &str, style: MessageStyle) {
        self.styled_output
            .lock()
            .unwrap()
            .push((message.to_string(), style));
        self.output.lock().unwrap().push(message.to_string());
    }

    fn is_interactive(&self) -> bool {
        false
    }

    fn prompt_input(&self, _prompt: &str, default: Option<&str>) -> Result<String> {
        Ok(default.unwrap_or("test-value").to_string())
    }

    fn prompt_password(&self, _prompt: &str) -> Result<String> {
        Ok(self.password.lock().unwrap().clone())
    }
}

struct TestProgressIndicator;

impl ProgressIndicator for TestProgressIndicator {
    fn set_message(&self, _message: &str) {}

    fn finish_and_clear(&self) {}

    fn enable_steady_tick(&self, _duration: Duration) {}

    fn finish_with_message(&self, _message: String) {}
}

#[cfg(test)]
#[path = "ui_tests.rs"]
mod tests;
