//! Console rendering for the setup flow.

mod spinner;

pub use spinner::{with_spinner, Spinner};

use colored::Colorize;

use crate::auth::DeviceCodePrompt;

const BOX_WIDTH: usize = 63;

/// Boxed banner line.
pub fn banner(title: &str) {
    let width = BOX_WIDTH;
    println!("╔{}╗", "═".repeat(width));
    println!("║{title:^width$}║");
    println!("╚{}╝\n", "═".repeat(width));
}

/// Numbered step header.
pub fn step(number: usize, title: &str) {
    println!("📋 Step {number}: {title}...");
}

pub fn success(message: &str) {
    println!("{}\n", format!("✅ {message}").green());
}

pub fn failure(message: &str) {
    println!("{}", format!("❌ {message}").red());
}

/// Render the device-code sign-in instructions.
pub fn render_device_code_prompt(prompt: &DeviceCodePrompt) {
    println!("\n🔐 Starting Microsoft 365 authentication...\n");
    println!("┌{}┐", "─".repeat(BOX_WIDTH));
    box_line("Please sign in with your Microsoft 365 account");
    println!("├{}┤", "─".repeat(BOX_WIDTH));
    box_line("1. Open your browser and visit:");
    box_line(&format!("   {}", prompt.verification_uri));
    box_line("");
    box_line("2. Enter this code:");
    box_line(&format!("   {}", prompt.user_code));
    box_line("");
    box_line(&format!(
        "The code expires in {} seconds",
        prompt.expires_in_secs
    ));
    println!("└{}┘\n", "─".repeat(BOX_WIDTH));
}

fn box_line(text: &str) {
    let width = BOX_WIDTH - 2;
    println!("│ {text:<width$} │");
}
