//! Draft editing commands.
//!
//! Every subcommand loads the saved draft, applies one or more
//! [`EditorEvent`]s and saves it again.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use crate::cli::common::{draft_store, load_config, print_json, CliError, CliResult};
use crate::models::{CallToAction, ImageSource};
use crate::services::editor::{apply_all, MoveDirection, PackageEdit};
use crate::services::live::fetch_live;
use crate::services::{apply, EditorEvent, EditorState};

/// Edit the local draft
#[derive(Args, Debug)]
pub struct DraftArgs {
    #[command(subcommand)]
    command: DraftCommand,
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    /// Show the current draft
    Show(ShowArgs),
    /// Load hero, packages and (if empty) the gallery from the live site
    Load(LoadArgs),
    /// Edit the hero section
    Hero(HeroArgs),
    /// Add photos to the gallery
    Add(AddArgs),
    /// Remove a gallery item
    Remove(RemoveArgs),
    /// Set the alt text of a gallery item
    Alt(AltArgs),
    /// Edit packages
    Package(PackageArgs),
    /// Discard gallery changes and the pending hero background
    Clear,
}

/// Show the current draft
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Load from the live site
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// URL or path of the live content (defaults to site.live_content)
    #[arg(long, value_name = "LOCATION")]
    from: Option<String>,
}

/// Edit the hero section
#[derive(Args, Debug)]
pub struct HeroArgs {
    /// Headline
    #[arg(long)]
    title: Option<String>,
    /// Sub-headline
    #[arg(long)]
    subtitle: Option<String>,
    /// Primary button label
    #[arg(long)]
    primary_label: Option<String>,
    /// Primary button link
    #[arg(long)]
    primary_href: Option<String>,
    /// Secondary button label
    #[arg(long)]
    secondary_label: Option<String>,
    /// Secondary button link
    #[arg(long)]
    secondary_href: Option<String>,
    /// Background image to upload on next publish
    #[arg(long, value_name = "FILE", conflicts_with = "clear_background")]
    background: Option<PathBuf>,
    /// Drop the pending background image
    #[arg(long)]
    clear_background: bool,
}

/// Add photos
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Image files (non-images are skipped)
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

/// Remove a gallery item
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Gallery index (as shown by `draft show`)
    index: usize,
}

/// Set alt text
#[derive(Args, Debug)]
pub struct AltArgs {
    /// Gallery index
    index: usize,
    /// New alt text
    alt: String,
}

/// Edit packages
#[derive(Args, Debug)]
pub struct PackageArgs {
    #[command(subcommand)]
    command: PackageCommand,
}

#[derive(Subcommand, Debug)]
enum PackageCommand {
    /// Append a package with default values
    Add,
    /// Delete a package
    Remove {
        /// Package index
        index: usize,
    },
    /// Move a package one step
    Move {
        /// Package index
        index: usize,
        /// Direction
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Update package fields
    Set(PackageSetArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
        }
    }
}

/// Update package fields
#[derive(Args, Debug)]
pub struct PackageSetArgs {
    /// Package index
    index: usize,
    /// Name
    #[arg(long)]
    name: Option<String>,
    /// Price text (e.g. "£120")
    #[arg(long)]
    price: Option<String>,
    /// Detail line
    #[arg(long)]
    detail: Option<String>,
    /// Badge text
    #[arg(long)]
    badge: Option<String>,
    /// Highlight this package
    #[arg(long)]
    featured: Option<bool>,
    /// Features, one per line
    #[arg(long)]
    features: Option<String>,
}

// ============================================================================
// Output
// ============================================================================

#[derive(Serialize, Debug)]
struct GalleryRow {
    index: usize,
    name: String,
    src: String,
    alt: String,
    pending: bool,
}

#[derive(Serialize, Debug)]
struct DraftOutput<'a> {
    hero: &'a crate::services::editor::HeroForm,
    hero_background: Option<String>,
    packages: &'a [crate::models::Package],
    gallery: Vec<GalleryRow>,
    removed: Vec<&'a str>,
}

fn draft_output(state: &EditorState) -> DraftOutput<'_> {
    DraftOutput {
        hero: &state.hero,
        hero_background: state
            .hero_background
            .as_ref()
            .map(|bg| bg.path.display().to_string()),
        packages: &state.packages,
        gallery: state
            .gallery
            .iter()
            .enumerate()
            .map(|(index, item)| GalleryRow {
                index,
                name: item.name.clone(),
                src: item.src(),
                alt: item.alt.clone(),
                pending: matches!(item.source, ImageSource::Upload { .. }),
            })
            .collect(),
        removed: state.removed.iter().collect(),
    }
}

fn print_human(state: &EditorState) {
    println!("Hero");
    println!("  title:     {}", state.hero.title);
    println!("  subtitle:  {}", state.hero.subtitle);
    println!(
        "  primary:   {} -> {}",
        state.hero.cta_primary.label, state.hero.cta_primary.href
    );
    println!(
        "  secondary: {} -> {}",
        state.hero.cta_secondary.label, state.hero.cta_secondary.href
    );
    if let Some(bg) = &state.hero_background {
        println!("  background: {} (pending: {})", bg.name, bg.path.display());
    }

    println!();
    println!("Packages ({})", state.packages.len());
    for (i, p) in state.packages.iter().enumerate() {
        let star = if p.featured { " *" } else { "" };
        println!("  [{i}] {} {}{star}", p.name, p.price);
    }

    println!();
    println!("Gallery ({})", state.gallery.len());
    for (i, item) in state.gallery.iter().enumerate() {
        let marker = if item.upload_path().is_some() { "+" } else { " " };
        println!("  {marker}[{i}] {} \"{}\"", item.src(), item.alt);
    }

    if !state.removed.is_empty() {
        println!();
        println!("Removed on next publish ({})", state.removed.len());
        for src in state.removed.iter() {
            println!("  - {src}");
        }
    }
}

// ============================================================================
// Execution
// ============================================================================

fn absolute(path: &Path) -> CliResult<PathBuf> {
    std::fs::canonicalize(path)
        .map_err(|e| CliError::validation(format!("Cannot read {}: {e}", path.display())))
}

fn update<F>(f: F) -> CliResult<EditorState>
where
    F: FnOnce(EditorState) -> CliResult<EditorState>,
{
    let store = draft_store()?;
    let state = f(store.load()?)?;
    store.save(&state)?;
    Ok(state)
}

fn check_index(index: usize, len: usize, what: &str) -> CliResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(CliError::validation(format!(
            "No {what} at index {index} (have {len})"
        )))
    }
}

impl DraftArgs {
    /// Execute draft subcommand
    pub async fn execute(&self) -> CliResult<()> {
        match &self.command {
            DraftCommand::Show(args) => {
                let state = draft_store()?.load()?;
                if args.json {
                    print_json(&draft_output(&state))
                } else {
                    print_human(&state);
                    Ok(())
                }
            }
            DraftCommand::Load(args) => {
                let location = match &args.from {
                    Some(from) => from.clone(),
                    None => load_config()?.site.live_content,
                };
                let live = fetch_live(&location).await?;
                let state = update(|s| Ok(apply(s, EditorEvent::LiveLoaded(live))))?;
                println!(
                    "Loaded live content from {location} ({} gallery item(s) in draft)",
                    state.gallery.len()
                );
                Ok(())
            }
            DraftCommand::Hero(args) => args.execute(),
            DraftCommand::Add(args) => {
                let files = args
                    .files
                    .iter()
                    .map(|f| absolute(f))
                    .collect::<CliResult<Vec<_>>>()?;
                let before = draft_store()?.load()?.gallery.len();
                let state = update(|s| Ok(apply(s, EditorEvent::PhotosAdded(files))))?;
                for item in &state.gallery[before..] {
                    println!("Added {}", item.src());
                }
                let skipped = args.files.len() - (state.gallery.len() - before);
                if skipped > 0 {
                    println!("Skipped {skipped} file(s) (not an image or gallery full)");
                }
                Ok(())
            }
            DraftCommand::Remove(args) => {
                update(|s| {
                    check_index(args.index, s.gallery.len(), "gallery item")?;
                    Ok(apply(s, EditorEvent::PhotoRemoved(args.index)))
                })?;
                println!("Removed gallery item {}", args.index);
                Ok(())
            }
            DraftCommand::Alt(args) => {
                update(|s| {
                    check_index(args.index, s.gallery.len(), "gallery item")?;
                    Ok(apply(
                        s,
                        EditorEvent::AltChanged {
                            index: args.index,
                            alt: args.alt.clone(),
                        },
                    ))
                })?;
                Ok(())
            }
            DraftCommand::Package(args) => args.execute(),
            DraftCommand::Clear => {
                update(|s| Ok(apply(s, EditorEvent::Cleared)))?;
                println!("Draft cleared.");
                Ok(())
            }
        }
    }
}

impl HeroArgs {
    fn execute(&self) -> CliResult<()> {
        let background = self.background.as_deref().map(absolute).transpose()?;

        update(|s| {
            let mut events = Vec::new();
            if let Some(title) = &self.title {
                events.push(EditorEvent::HeroTitleChanged(title.clone()));
            }
            if let Some(subtitle) = &self.subtitle {
                events.push(EditorEvent::HeroSubtitleChanged(subtitle.clone()));
            }
            if self.primary_label.is_some() || self.primary_href.is_some() {
                let current = &s.hero.cta_primary;
                events.push(EditorEvent::PrimaryCtaChanged(CallToAction::new(
                    self.primary_label.clone().unwrap_or_else(|| current.label.clone()),
                    self.primary_href.clone().unwrap_or_else(|| current.href.clone()),
                )));
            }
            if self.secondary_label.is_some() || self.secondary_href.is_some() {
                let current = &s.hero.cta_secondary;
                events.push(EditorEvent::SecondaryCtaChanged(CallToAction::new(
                    self.secondary_label.clone().unwrap_or_else(|| current.label.clone()),
                    self.secondary_href.clone().unwrap_or_else(|| current.href.clone()),
                )));
            }
            if let Some(path) = background {
                events.push(EditorEvent::HeroBackgroundPicked(path));
            }
            if self.clear_background {
                events.push(EditorEvent::HeroBackgroundCleared);
            }
            if events.is_empty() {
                return Err(CliError::validation("Nothing to change: pass at least one hero option"));
            }
            Ok(apply_all(s, events))
        })?;

        println!("Hero updated.");
        Ok(())
    }
}

impl PackageArgs {
    fn execute(&self) -> CliResult<()> {
        let state = update(|s| match &self.command {
            PackageCommand::Add => Ok(apply(s, EditorEvent::PackageAdded)),
            PackageCommand::Remove { index } => {
                check_index(*index, s.packages.len(), "package")?;
                Ok(apply(s, EditorEvent::PackageRemoved(*index)))
            }
            PackageCommand::Move { index, direction } => {
                check_index(*index, s.packages.len(), "package")?;
                Ok(apply(
                    s,
                    EditorEvent::PackageMoved {
                        index: *index,
                        direction: (*direction).into(),
                    },
                ))
            }
            PackageCommand::Set(args) => {
                check_index(args.index, s.packages.len(), "package")?;
                let edits = args.edits();
                if edits.is_empty() {
                    return Err(CliError::validation("Nothing to change: pass at least one field"));
                }
                let events = edits.into_iter().map(|edit| EditorEvent::PackageEdited {
                    index: args.index,
                    edit,
                });
                Ok(apply_all(s, events))
            }
        })?;

        println!("{} package(s) in draft.", state.packages.len());
        Ok(())
    }
}

impl PackageSetArgs {
    fn edits(&self) -> Vec<PackageEdit> {
        let mut edits = Vec::new();
        if let Some(v) = &self.name {
            edits.push(PackageEdit::Name(v.clone()));
        }
        if let Some(v) = &self.price {
            edits.push(PackageEdit::Price(v.clone()));
        }
        if let Some(v) = &self.detail {
            edits.push(PackageEdit::Detail(v.clone()));
        }
        if let Some(v) = &self.badge {
            edits.push(PackageEdit::Badge(v.clone()));
        }
        if let Some(v) = self.featured {
            edits.push(PackageEdit::Featured(v));
        }
        if let Some(v) = &self.features {
            edits.push(PackageEdit::Features(v.clone()));
        }
        edits
    }
}
