//! Terminal output for the REPL.

use colored::Colorize;
use docchat_core::conversation::ChatEvent;
use docchat_core::document::Document;
use docchat_core::error::DocchatError;
use serde_json::Value;

pub fn report_error(operation: &str, err: &DocchatError) {
    if err.is_notice() {
        println!("{}", err.to_string().yellow());
    } else {
        eprintln!("{}", format!("Error ({}): {}", operation, err).red());
    }
}

pub fn success(message: impl AsRef<str>) {
    println!("{}", message.as_ref().green());
}

pub fn info(message: impl AsRef<str>) {
    println!("{}", message.as_ref().bright_black());
}

pub fn documents(docs: &[Document]) {
    if docs.is_empty() {
        info("No documents available.");
        return;
    }
    for (index, doc) in docs.iter().enumerate() {
        println!("  {} {}", format!("[{}]", index).bright_magenta(), doc.key());
    }
}

pub fn json(value: &Value) {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

pub fn chat_event(event: &ChatEvent) {
    match (event.role(), event.text()) {
        (Some(role), Some(text)) => {
            println!("{}", format!("[{}]", role).bright_magenta());
            for line in text.lines() {
                println!("{}", line.bright_blue());
            }
        }
        _ => json(&event.0),
    }
}
