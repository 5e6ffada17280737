//! Console notification sink

use colored::*;

use gantry_engine::NotificationSink;

/// Prints engine notifications to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn toast(&self, message: &str) {
        println!("{} {}", "•".cyan(), message);
    }

    fn indicator(&self, text: &str) {
        println!("  {}", text.dimmed());
    }

    fn indicator_done(&self) {}
}
