//! Release helper for sovran-syncstore.
//!
//! Bumps the package version in Cargo.toml, records the commits since the last
//! tag as a dated CHANGELOG.md entry, then tags, pushes and optionally
//! publishes. Every outward step asks for confirmation first.
//!
//! Run with: cargo run --features release --bin release

use chrono::Local;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;
use toml_edit::{value, DocumentMut};

type BoxResult<T> = Result<T, Box<dyn Error>>;

const MANIFEST: &str = "Cargo.toml";
const CHANGELOG: &str = "CHANGELOG.md";

fn git(args: &[&str]) -> BoxResult<Option<String>> {
    let output = Command::new("git").args(args).output()?;
    if !output.status.success() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8(output.stdout)?.trim().to_string()))
}

/// The most recent tag, or `None` for a repository that was never released
fn previous_tag() -> BoxResult<Option<String>> {
    git(&["describe", "--tags", "--abbrev=0"])
}

fn commits_since(tag: Option<&str>) -> BoxResult<Vec<String>> {
    let range = tag.map(|t| format!("{}..HEAD", t));
    let mut args = vec!["log", "--pretty=format:%s"];
    if let Some(range) = range.as_deref() {
        args.push(range);
    }
    let log = git(&args)?.unwrap_or_default();
    Ok(log
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(message: &str) -> io::Result<bool> {
    Ok(prompt(&format!("{} (y/n): ", message))?.eq_ignore_ascii_case("y"))
}

fn read_manifest() -> BoxResult<DocumentMut> {
    Ok(fs::read_to_string(MANIFEST)?.parse::<DocumentMut>()?)
}

fn current_version(doc: &DocumentMut) -> BoxResult<String> {
    doc.get("package")
        .and_then(|package| package.get("version"))
        .and_then(|version| version.as_str())
        .map(str::to_string)
        .ok_or_else(|| format!("no package.version in {}", MANIFEST).into())
}

/// Accepts `major.minor.patch` with numeric parts only
fn validate_version(version: &str) -> BoxResult<()> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.parse::<u64>().is_err()) {
        return Err(format!("'{}' is not a major.minor.patch version", version).into());
    }
    Ok(())
}

fn changelog_entry(version: &str, commits: &[String]) -> String {
    let mut entry = format!("## {} - {}\n\n", version, Local::now().format("%Y-%m-%d"));
    if commits.is_empty() {
        entry.push_str("- No changes recorded\n");
    }
    for commit in commits {
        entry.push_str(&format!("- {}\n", commit));
    }
    entry.push('\n');
    entry
}

fn prepend_changelog(entry: &str) -> BoxResult<()> {
    let existing = if Path::new(CHANGELOG).exists() {
        fs::read_to_string(CHANGELOG)?
    } else {
        String::new()
    };
    let body = existing.strip_prefix("# Changelog\n\n").unwrap_or(&existing);
    fs::write(CHANGELOG, format!("# Changelog\n\n{}{}", entry, body))?;
    Ok(())
}

fn run(program: &str, args: &[&str]) -> BoxResult<()> {
    println!("Executing: {} {}", program, args.join(" "));
    let status = Command::new(program).args(args).status()?;
    if !status.success() {
        return Err(format!("'{} {}' failed with {}", program, args.join(" "), status).into());
    }
    Ok(())
}

fn main() -> BoxResult<()> {
    let mut doc = read_manifest()?;
    let current = current_version(&doc)?;

    println!("Current version is: {}", current);
    let new_version = prompt("Enter new version: ")?;
    validate_version(&new_version)?;
    if new_version == current {
        return Err("New version matches the current one".into());
    }

    let tag = previous_tag()?;
    let commits = commits_since(tag.as_deref())?;
    println!("Previous tag: {}", tag.as_deref().unwrap_or("None"));
    println!("{} commit(s) since then", commits.len());
    for commit in &commits {
        println!("  - {}", commit);
    }

    if !confirm(&format!("Ready to release version {}?", new_version))? {
        println!("Release aborted.");
        return Ok(());
    }

    doc["package"]["version"] = value(new_version.as_str());
    fs::write(MANIFEST, doc.to_string())?;
    println!("Updated {} to {}", MANIFEST, new_version);

    let entry = changelog_entry(&new_version, &commits);
    prepend_changelog(&entry)?;
    println!("Added {} entry", CHANGELOG);

    // Refresh Cargo.lock for the new version
    run("cargo", &["check"])?;

    let tag_name = format!("v{}", new_version);
    let message = format!("Release {}", new_version);
    run("git", &["add", MANIFEST, "Cargo.lock", CHANGELOG])?;
    run("git", &["commit", "-m", &message])?;
    run("git", &["tag", "-a", &tag_name, "-m", &message])?;

    if confirm("Push commit and tag?")? {
        run("git", &["push"])?;
        run("git", &["push", "--tags"])?;
    } else {
        println!("Skipping push; the tag exists locally only.");
    }

    if confirm("Publish to crates.io?")? {
        run("cargo", &["publish"])?;
    } else {
        println!("Skipping crates.io publishing.");
    }

    if confirm("Create GitHub release?")? {
        run("gh", &["release", "create", &tag_name, "--title", &tag_name, "--notes", &entry])?;
    } else {
        println!("Skipping GitHub release creation.");
    }

    println!("Released {}", new_version);
    Ok(())
}
