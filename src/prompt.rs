//! Interactive prompts for picking a destination and a message.

use anyhow::{Result, bail};
use dialoguer::{FuzzySelect, Input, theme::ColorfulTheme};

use slackit::DirectoryEntry;

/// Let the user pick one entry by name. `page_size` rows are visible at once.
pub fn select_destination<'a>(
    entries: &[&'a DirectoryEntry],
    page_size: usize,
) -> Result<&'a DirectoryEntry> {
    if entries.is_empty() {
        bail!("no channels or users to choose from; try --all or --force");
    }

    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    let selection = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select Channel")
        .items(&names)
        .default(0)
        .max_length(page_size.max(1))
        .interact()?;

    Ok(entries[selection])
}

pub fn message() -> Result<String> {
    let text: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Message text introducing the file")
        .allow_empty(true)
        .interact_text()?;
    Ok(text)
}
