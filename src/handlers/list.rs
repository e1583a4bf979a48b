use anyhow::Result;
use colored::*;
use std::env;

use crate::config::load_config;

pub fn handle_list() -> Result<()> {
    let current_dir = env::current_dir()?;
    let config = load_config(&current_dir)?;

    if let Some(p) = &config.project {
        let name = p.metadata.name.as_deref().unwrap_or("Unnamed Project");
        match &p.metadata.version {
            Some(version) => println!("{} {} {}", "🎨".green(), name.bold(), version.dimmed()),
            None => println!("{} {}", "🎨".green(), name.bold()),
        }
        if let Some(desc) = &p.metadata.description {
            println!("   {}", desc.italic());
        }
        if let Some(authors) = &p.metadata.authors {
            println!("   {}", authors.join(", ").dimmed());
        }
    }
    println!();

    println!("{}", "Configured Locations:".bold().underline());

    let mut max_len = 0;
    for location in &config.build.locations {
        let len = location.source.display().to_string().len();
        if len > max_len {
            max_len = len;
        }
    }

    for location in &config.build.locations {
        let source = location.source.display().to_string();
        let padding = " ".repeat(max_len - source.len() + 2);
        println!(
            "  {}{}{} {}",
            source.cyan(),
            padding,
            "→".dimmed(),
            location.target.display()
        );
    }

    println!();
    println!("Compiler: {}", config.compiler.command.yellow());
    println!("Output:   {}", config.build.directory.display());

    Ok(())
}
