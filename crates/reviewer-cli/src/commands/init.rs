//! Init command implementation.

use anyhow::Result;
use colored::Colorize;
use reviewer_core::ReviewerConfig;
use reviewer_git::GitRepository;
use std::path::PathBuf;

/// Write the default configuration at the repository root.
pub fn run(path: PathBuf) -> Result<()> {
    let root = GitRepository::open(&path)?.root();
    let config_path = ReviewerConfig::path(&root);

    if ReviewerConfig::init(&root)? {
        println!("{} Created {}", "✓".green(), config_path.display());
    } else {
        println!(
            "{} {} already exists, leaving it unchanged",
            "→".blue(),
            config_path.display()
        );
    }

    Ok(())
}
