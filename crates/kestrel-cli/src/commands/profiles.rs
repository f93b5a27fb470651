//! Profile data-directory management.
//!
//! Profiles accumulate browser state (cookies, extensions, caches) under
//! `~/.kestrel/profiles/<name>`. These commands list, inspect, and delete
//! those directories; the `default` profile is protected against
//! accidental deletion.

use anyhow::{Result, anyhow};
use kestrel_browser::ProfileDir;
use std::fs;
use std::io::{self, Write};

/// List all profile data directories
pub fn list() -> Result<()> {
    let root = ProfileDir::root_dir()?;

    if !root.exists() {
        println!(
            "No profiles found. Profiles will be created in: {}",
            root.display()
        );
        return Ok(());
    }

    let mut profiles = Vec::new();

    for entry in fs::read_dir(&root)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow!("Invalid profile name"))?
                .to_string();

            let dir = ProfileDir::persistent(path.clone())?;
            let size = dir.size().unwrap_or(0);

            profiles.push((name, path, size));
        }
    }

    if profiles.is_empty() {
        println!("No profiles found.");
        return Ok(());
    }

    profiles.sort_by(|a, b| a.0.cmp(&b.0));

    println!("Available profiles:");
    println!();

    for (name, path, size) in profiles {
        let marker = if name == "default" { "* " } else { "  " };
        let size_mb = size as f64 / 1_048_576.0;

        println!("{}{:<20} {:>8.1} MB    {}", marker, name, size_mb, path.display());
    }

    Ok(())
}

/// Show detailed information about a profile
pub fn info(name: &str) -> Result<()> {
    let path = ProfileDir::root_dir()?.join(name);

    if !path.exists() {
        return Err(anyhow!("Profile '{}' not found", name));
    }

    let dir = ProfileDir::persistent(path.clone())?;
    let size = dir.size()?;
    let size_mb = size as f64 / 1_048_576.0;

    let has_cookies = path.join("Cookies").exists();

    println!("Profile: {}", name);
    println!("Path: {}", path.display());
    println!("Size: {:.1} MB ({} bytes)", size_mb, size);
    println!("Cookies: {}", if has_cookies { "Yes" } else { "No" });

    Ok(())
}

/// Delete a profile's data directory
pub fn delete(name: &str, force: bool) -> Result<()> {
    let path = ProfileDir::root_dir()?.join(name);

    if !path.exists() {
        return Err(anyhow!("Profile '{}' not found", name));
    }

    // Protect the default profile unless force is used
    if name == "default" && !force {
        return Err(anyhow!(
            "Cannot delete 'default' profile without --force flag.\n\
             The default profile is used when a request names no profile.\n\
             Use: kestrel profiles delete default --force"
        ));
    }

    // Require confirmation
    if !force {
        print!(
            "⚠️  This will permanently delete profile '{}' and all its data.\nType '{}' to confirm: ",
            name, name
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim() != name {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    fs::remove_dir_all(&path)?;
    println!("✅ Profile '{}' deleted", name);

    Ok(())
}
