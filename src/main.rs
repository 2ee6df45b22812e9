mod app;
mod book;
mod config;
mod export;
mod fasm_lang;
mod glossary;
mod highlight;
mod input;
mod markdown;
mod storage;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fasmbook", version)]
#[command(about = "Read FASM tutorial e-books in the terminal, or export them to HTML")]
struct Args {
    /// Book directory containing chapter-*.md files and glossary.json
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Export the book as a static HTML site into DIR and exit
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Create a sample book directory with the given name and exit
    #[arg(long, value_name = "NAME")]
    init: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(name) = args.init {
        book::create_sample_book(&name)?;
        println!("Created sample book in '{}'", name);
        println!("Read it with: fasmbook {}", name);
        return Ok(());
    }

    if let Some(out_dir) = args.export {
        let config = config::Config::load()?;
        let book = book::Book::open(&args.path)?;
        let (mut glossary, glossary_error) = book.load_glossary();
        if let Some(err) = glossary_error {
            eprintln!("warning: {}; exporting with built-in glossary", err);
        }
        book.scan_usages(&mut glossary);
        let site = export::export_book(&book, &glossary, &config.export, &out_dir)?;
        println!(
            "Exported {} pages to {}",
            site.pages.len(),
            out_dir.display()
        );
        return Ok(());
    }

    let mut app = App::new(&args.path)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore the terminal even when the loop errored.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;
        input::poll_and_handle(app)?;
    }
    Ok(())
}
