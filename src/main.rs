use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

use podgen::{
    NoopReporter, PodcastFeedGenerator, ProgressEvent, ProgressReporter, ReqwestClient, Settings,
    SharedHttpClient, SharedProgressReporter, ShowId, naming,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static NOTE: Emoji<'_, '_> = Emoji("📝 ", "[i] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");

/// Write podcast feeds for shows in the broadcast archive
#[derive(Parser, Debug)]
#[command(name = "podgen")]
#[command(about = "Generate podcast RSS feeds from the broadcast archive")]
#[command(version)]
struct Args {
    /// Directory which the feeds should be saved in
    target_dir: PathBuf,

    /// How to name the resulting feeds: %T = Title, %t = title, %i = show ID,
    /// %% = literal percent
    naming_scheme: String,

    /// Shows to generate feeds for, by numeric ID or by name.
    /// Leave it out to generate for all known shows.
    shows: Vec<String>,

    /// Generate feeds for all shows EXCEPT the ones named on the command line
    #[arg(short = 'x', long)]
    exclude: bool,

    /// Create target_dir if it doesn't exist already
    #[arg(short = 'd', long)]
    create_directory: bool,

    /// Also write the combined feed containing every episode
    #[arg(long)]
    all_episodes: bool,

    /// Write pretty, human-readable XML instead of minified XML
    #[arg(short, long)]
    pretty: bool,

    /// Disable progress messages and notices
    #[arg(short, long)]
    quiet: bool,

    /// Path to the JSON settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,
}

/// Progress reporter rendering pipeline events on a single spinner line
struct CliReporter {
    spinner: ProgressBar,
}

impl CliReporter {
    fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} {wide_msg}")
            .unwrap();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));

        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingCatalog { url } => {
                self.spinner
                    .set_message(format!("{SEARCH}Fetching show catalog: {}", url.cyan()));
            }

            ProgressEvent::BatchPrefetch => {
                self.spinner.set_message(
                    "Downloading episode metadata, this could take a while...".to_string(),
                );
            }

            ProgressEvent::ShowStarting {
                title,
                index,
                total,
            } => {
                self.spinner.set_message(format!(
                    "{} ({:03}/{:03})",
                    title.bold(),
                    index,
                    total
                ));
            }

            ProgressEvent::FindingShowMetadata { title } => {
                self.spinner
                    .set_message(format!("Finding metadata for {}...", title.bold()));
            }

            ProgressEvent::EpisodePopulating { index, total } => {
                self.spinner
                    .set_message(format!("Populating episode {index} out of {total}"));
            }

            ProgressEvent::EpisodeSkipped {
                episode_title,
                sound_url,
                source_id,
                reason,
            } => {
                self.spinner.println(format!(
                    "{NOTE}{} {}\n    URL: \"{}\"\n    Caused by {}: {}",
                    "Skipping episode".yellow(),
                    episode_title.bold(),
                    sound_url.dimmed(),
                    source_id,
                    reason
                ));
            }
        }
    }
}

/// Write a feed atomically: to a partial file first, then rename into place
fn save_feed(path: &Path, feed: &[u8]) -> Result<()> {
    let partial = PathBuf::from(format!("{}.partial", path.display()));
    std::fs::write(&partial, feed)
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    std::fs::rename(&partial, path)
        .with_context(|| format!("Failed to move feed into place at {}", path.display()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "podgen".bold().magenta(),
            "- Podcast Feed Generator".dimmed()
        );
    }

    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if !naming::scheme_is_unique(&args.naming_scheme) {
        bail!(
            "naming_scheme must contain %t, %i, %T or a combination in order to \
             generate unique filenames for each show"
        );
    }

    if !args.target_dir.is_dir() {
        if args.create_directory {
            std::fs::create_dir_all(&args.target_dir).with_context(|| {
                format!("Failed to create directory {}", args.target_dir.display())
            })?;
        } else {
            bail!(
                "target_dir {} does not exist and the --create-directory flag is not set",
                args.target_dir.display()
            );
        }
    }

    let client: SharedHttpClient =
        Arc::new(ReqwestClient::new().context("Failed to build HTTP client")?);

    let cli_reporter = (!args.quiet).then(|| Arc::new(CliReporter::new()));
    let reporter: SharedProgressReporter = match &cli_reporter {
        Some(reporter) => reporter.clone(),
        None => NoopReporter::shared(),
    };

    let all_episodes_title = settings.all_episodes_title.clone();
    let mut generator = PodcastFeedGenerator::new(client, settings, args.pretty, reporter)
        .await
        .context("Failed to load the show catalog")?;

    // Resolve the selection to show ids
    let known: BTreeSet<ShowId> = generator.shows().keys().copied().collect();
    let mut selected = BTreeSet::new();
    for selector in &args.shows {
        let id = match selector.parse::<ShowId>() {
            Ok(id) if known.contains(&id) => id,
            Ok(id) => bail!("Unrecognized show ID {id}"),
            Err(_) => generator
                .get_show_id_by_name(selector)
                .with_context(|| format!("Unrecognized show '{selector}'"))?,
        };
        selected.insert(id);
    }

    let chosen: Vec<ShowId> = if selected.is_empty() {
        known.iter().copied().collect()
    } else if args.exclude {
        known.difference(&selected).copied().collect()
    } else {
        selected.iter().copied().collect()
    };

    if chosen.is_empty() {
        bail!("No shows matched");
    }

    // Filenames come from the catalog titles, before any override rewrites
    let titles: HashMap<ShowId, String> = generator
        .shows()
        .iter()
        .map(|(&id, show)| (id, show.title.clone()))
        .collect();

    let feeds = generator.generate_feeds_sequence(&chosen).await?;

    if !args.quiet {
        println!("Writing feeds to files...");
    }
    for (show_id, feed) in &feeds {
        let filename = naming::filename_for(&args.naming_scheme, &titles[show_id], *show_id);
        save_feed(&args.target_dir.join(filename), feed)?;
    }

    if args.all_episodes {
        let feed = generator.generate_feed_with_all_episodes(None).await?;
        let filename = naming::filename_for(&args.naming_scheme, &all_episodes_title, 0);
        save_feed(&args.target_dir.join(filename), &feed)?;
    }

    if let Some(reporter) = &cli_reporter {
        reporter.finish();
    }

    if !args.quiet {
        let skipped = chosen.len() - feeds.len();
        println!(
            "\n{SUCCESS}{} {} written, {} skipped",
            "Done:".bold().green(),
            format!("{} feeds", feeds.len()).green().bold(),
            skipped.to_string().yellow()
        );
        println!(
            "{FOLDER}Output: {}\n",
            args.target_dir.display().to_string().cyan()
        );
    }

    Ok(())
}
