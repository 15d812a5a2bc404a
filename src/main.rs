use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Select};
use std::time::Duration;

mod app;
mod config;
mod gita;
mod guide;
mod handler;
mod selection;
mod tui;
mod ui;

use app::App;
use config::Config;
use gita::GitaDb;

/// Tick rate for the TUI; short enough to drive the loading animation.
const TICK_RATE: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "gita")]
#[command(about = "Bhagavad Gita dashboard: verses, chant videos, and a keyword guide")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a single verse
    Show {
        /// Chapter number
        chapter: String,
        /// Verse number
        verse: String,
    },
    /// List chapters and their verse counts
    List,
    /// Browse verses interactively
    Browse,
    /// Ask the guide a question
    Ask {
        /// Your question
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    let db = load_corpus(&config).await?;

    match cli.command {
        None => run_dashboard(db, &config).await?,
        Some(Commands::Show { chapter, verse }) => show_verse(&db, &chapter, &verse)?,
        Some(Commands::List) => list_chapters(&db),
        Some(Commands::Browse) => browse_interactive(&db)?,
        Some(Commands::Ask { question }) => ask_guide(&question),
    }

    Ok(())
}

async fn load_corpus(config: &Config) -> Result<GitaDb> {
    match &config.corpus_path {
        Some(path) => GitaDb::load_from_json(path).await,
        None => GitaDb::bundled(),
    }
}

async fn run_dashboard(db: GitaDb, config: &Config) -> Result<()> {
    tui::install_panic_hook();

    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new(TICK_RATE);
    let mut app = App::new(db, config);

    let result = run_loop(&mut app, &mut terminal, &mut events).await;

    app.abort_pending_reply();
    tui::restore()?;
    result
}

async fn run_loop(
    app: &mut App,
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;
        app.poll_reply().await;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

fn show_verse(db: &GitaDb, chapter: &str, verse: &str) -> Result<()> {
    let Some(tuple) = db.lookup(chapter, verse) else {
        bail!("chapter {} verse {} not found in the corpus", chapter, verse);
    };

    println!(
        "\n{}",
        format!("📜 Chapter {} • Verse {}", chapter, verse).bold().green()
    );
    println!("{}", "=".repeat(50).dimmed());
    println!("\n{}", tuple.sanskrit.yellow());
    println!("\n{}", tuple.english);
    println!("\n{}", "=".repeat(50).dimmed());
    println!(
        "{} {}   {} {}",
        "page".dimmed(),
        tuple.start_page.bold(),
        "pdf".dimmed(),
        tuple.pdf_link
    );

    Ok(())
}

fn list_chapters(db: &GitaDb) {
    println!(
        "\n{} {}",
        "📚 Bhagavad Gita".bold().blue(),
        format!("({} chapters)", db.chapter_count()).dimmed()
    );
    println!("{}", "=".repeat(40).dimmed());

    for chapter in db.chapter_keys() {
        println!(
            "  • Chapter {} ({} verses)",
            chapter.bold(),
            db.verse_count(chapter).to_string().dimmed()
        );
    }
}

fn browse_interactive(db: &GitaDb) -> Result<()> {
    loop {
        println!("\n{}", "📖 Verse Browser".bold().blue());

        let chapter_options: Vec<String> = db
            .chapter_keys()
            .iter()
            .map(|c| format!("Chapter {}", c))
            .collect();

        let chapter_selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select a chapter")
            .items(&chapter_options)
            .default(0)
            .interact()?;

        let selected_chapter = &db.chapter_keys()[chapter_selection];

        let verses = db.verse_keys(selected_chapter);
        if verses.is_empty() {
            println!("{}", "No verses found for this chapter".red());
            continue;
        }

        let verse_options: Vec<String> =
            verses.iter().map(|v| format!("Verse {}", v)).collect();

        let verse_selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(&format!("Select a verse from chapter {}", selected_chapter))
            .items(&verse_options)
            .default(0)
            .interact()?;

        show_verse(db, selected_chapter, &verses[verse_selection])?;

        let continue_browsing = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&["Browse another verse", "Exit"])
            .default(0)
            .interact()?;

        if continue_browsing == 1 {
            break;
        }
    }

    Ok(())
}

fn ask_guide(question: &str) {
    println!("\n{}", "🪷 Gita Guide".bold().magenta());
    println!("{}", "=".repeat(30).dimmed());
    println!("\n{} {}", "You:".bold().cyan(), question);
    println!("\n{} {}", "Guide:".bold().yellow(), guide::respond(question));
}
