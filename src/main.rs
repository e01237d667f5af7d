//! spanish-practice command line
//!
//! Subcommands cover the whole workflow: extract questions from transcripts,
//! index them, generate new practice items from an example conversation,
//! take the quiz, and read handwriting off images.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::{debug, error, info};
use rand::seq::SliceRandom;
use spanish_practice::index::{Embedder, QuestionIndex};
use spanish_practice::questions::library;
use spanish_practice::quiz::{terminal, QuizSession};
use spanish_practice::state::config::Config;
use spanish_practice::state::AppState;
use spanish_practice::PracticeError;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "spanish-practice")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spanish listening comprehension and writing practice")]
struct Cli {
    /// Config file (default ~/.spanish-practice.cfg)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write debug logs to spanish-practice.log
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate practice items from an example conversation
    Generate(GenerateArgs),

    /// Take a quiz over generated items
    Quiz {
        /// Items file (default from config)
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// List the example conversations in the index
    Conversations(IndexChoice),

    /// Manage the question index
    #[command(subcommand)]
    Index(IndexCommand),

    /// Extract questions from a listening-test transcript
    Extract {
        transcript: PathBuf,

        /// Where to write the extracted JSON
        #[arg(long, value_name = "FILE", default_value = "questions.json")]
        out: PathBuf,

        /// Also add the extracted questions to the index
        #[arg(long)]
        index: bool,

        #[command(flatten)]
        choice: IndexChoice,
    },

    /// Read and translate Spanish text from an image (png, jpg, jpeg)
    Ocr { image: PathBuf },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// File holding the example conversation
    #[arg(long, value_name = "FILE", conflicts_with = "pick")]
    example: Option<PathBuf>,

    /// Use the nth indexed conversation (1-based) instead of a random one
    #[arg(long, value_name = "N")]
    pick: Option<usize>,

    /// Number of items to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Use offline scripted model and speech
    #[arg(long)]
    dry_run: bool,

    /// Print the items without adding them to the items file
    #[arg(long)]
    no_save: bool,

    #[command(flatten)]
    choice: IndexChoice,
}

#[derive(Args, Debug, Clone, Copy)]
struct IndexChoice {
    /// Use the Gemini-embedded index instead of the local hashing one
    #[arg(long)]
    gemini: bool,
}

#[derive(Subcommand, Debug)]
enum IndexCommand {
    /// Add questions from an extracted JSON file
    Add {
        file: PathBuf,
        #[command(flatten)]
        choice: IndexChoice,
    },

    /// Find indexed questions similar to a query
    Search {
        query: String,

        /// Number of results
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,

        #[command(flatten)]
        choice: IndexChoice,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger
    if cli.debug {
        // Debug mode: write to spanish-practice.log
        match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("spanish-practice.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!(
                    "Warning: Failed to open spanish-practice.log for debug logging: {}",
                    e
                );
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }
        info!(
            "{} version {} starting (debug mode)",
            spanish_practice::APP_NAME,
            spanish_practice::VERSION
        );
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .init();
    }

    if let Err(e) = run(cli) {
        if let Some(PracticeError::MissingCredentials(message)) =
            e.downcast_ref::<PracticeError>()
        {
            eprintln!("Error: no API key configured. {}", message);
            process::exit(1);
        }
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;
    debug!("Config loaded from {:?}", config.path());

    match cli.command {
        Command::Generate(args) => generate(config, args),
        Command::Quiz { file } => quiz(&AppState::new(config), file),
        Command::Conversations(choice) => {
            let state = AppState::new(config);
            let conversations = with_index(&state, choice, |index| Ok(index.all_conversations()))?;
            if conversations.is_empty() {
                println!("The index is empty. Add questions with `index add`.");
            }
            for (i, conversation) in conversations.iter().enumerate() {
                println!("{}. {}", i + 1, conversation);
            }
            Ok(())
        }
        Command::Index(IndexCommand::Add { file, choice }) => {
            let state = AppState::new(config);
            let added = with_index(&state, choice, |index| index.add_questions(&file))
                .with_context(|| format!("indexing {}", file.display()))?;
            println!("Added {} questions", added);
            Ok(())
        }
        Command::Index(IndexCommand::Search {
            query,
            count,
            choice,
        }) => {
            let state = AppState::new(config);
            let hits = with_index(&state, choice, |index| index.similar(&query, count))?;
            for hit in hits {
                println!("[{:.3}] {}", hit.score, hit.record.question);
                println!("        {}", hit.record.conversation);
                println!("        Answer: {}", hit.record.answer);
            }
            Ok(())
        }
        Command::Extract {
            transcript,
            out,
            index,
            choice,
        } => {
            let state = AppState::new(config);
            let mut extractor = state.transcript_extractor()?;
            let text = extractor
                .read_transcript(&transcript)
                .with_context(|| format!("reading {}", transcript.display()))?;
            let questions = extractor.extract_questions(&text)?;
            extractor.save_questions(&questions, &out)?;
            println!("Saved questions to {}", out.display());
            if index {
                let added = with_index(&state, choice, |index| index.add_questions(&out))?;
                println!("Added {} questions to the index", added);
            }
            Ok(())
        }
        Command::Ocr { image } => {
            let state = AppState::new(config);
            let mut assistant = state.writing_assistant()?;
            let text = assistant
                .process_file(&image)
                .with_context(|| format!("processing {}", image.display()))?;
            println!("{}", text);
            Ok(())
        }
    }
}

/// Run `f` against the local or the Gemini-embedded index
fn with_index<T>(
    state: &AppState,
    choice: IndexChoice,
    f: impl FnOnce(&mut dyn IndexOps) -> spanish_practice::Result<T>,
) -> anyhow::Result<T> {
    if choice.gemini {
        let mut index = state.gemini_index()?;
        Ok(f(&mut index)?)
    } else {
        let mut index = state.local_index()?;
        Ok(f(&mut index)?)
    }
}

/// The index operations the CLI needs, independent of the embedder
trait IndexOps {
    fn add_questions(&mut self, path: &std::path::Path) -> spanish_practice::Result<usize>;
    fn similar(
        &self,
        query: &str,
        n: usize,
    ) -> spanish_practice::Result<Vec<spanish_practice::index::SearchHit>>;
    fn all_conversations(&self) -> Vec<String>;
}

impl<E: Embedder> IndexOps for QuestionIndex<E> {
    fn add_questions(&mut self, path: &std::path::Path) -> spanish_practice::Result<usize> {
        QuestionIndex::add_questions(self, path)
    }

    fn similar(
        &self,
        query: &str,
        n: usize,
    ) -> spanish_practice::Result<Vec<spanish_practice::index::SearchHit>> {
        QuestionIndex::similar(self, query, n)
    }

    fn all_conversations(&self) -> Vec<String> {
        QuestionIndex::all_conversations(self)
    }
}

fn generate(config: Config, args: GenerateArgs) -> anyhow::Result<()> {
    let state = AppState::new(config).with_dry_run(args.dry_run);

    let example = match &args.example {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading example {}", path.display()))?,
        None if args.dry_run => "[A]: Hola\n[B]: Buenos días".to_string(),
        None => {
            let conversations = with_index(&state, args.choice, |index| {
                Ok(index.all_conversations())
            })?;
            if conversations.is_empty() {
                bail!("No example conversations indexed. Use --example or `index add` first.");
            }
            match args.pick {
                Some(n) => conversations
                    .get(n.wrapping_sub(1))
                    .cloned()
                    .with_context(|| {
                        format!("--pick must be between 1 and {}", conversations.len())
                    })?,
                None => conversations
                    .choose(&mut rand::thread_rng())
                    .cloned()
                    .context("no conversation to pick")?,
            }
        }
    };
    println!("Example conversation:\n{}\n", example);

    let items = if args.dry_run {
        state
            .memory_generator()?
            .generate_questions(&example, args.count)?
    } else {
        state.generator()?.generate_questions(&example, args.count)?
    };

    for (i, item) in items.iter().enumerate() {
        println!("Item {}", i + 1);
        println!("{}", item.conversation);
        println!("Question: {}", item.question);
        for choice in item.choices() {
            println!("  - {}", choice);
        }
        println!("Conversation audio: {}", item.conversation_audio);
        println!();
    }

    if !args.no_save && !args.dry_run {
        let path = state.config.questions_file();
        let total = library::append_items(&items, &path)
            .with_context(|| format!("saving items to {}", path.display()))?;
        println!("Saved {} items ({} total) to {}", items.len(), total, path.display());
    }
    Ok(())
}

fn quiz(state: &AppState, file: Option<PathBuf>) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(|| state.config.questions_file());
    let items = library::load_items(&path)
        .with_context(|| format!("loading items from {}", path.display()))?;
    info!("Loaded {} items from {:?}", items.len(), path);

    let mut session = QuizSession::new(items, &mut rand::thread_rng());
    let stdin = io::stdin();
    terminal::run(&mut session, stdin.lock(), io::stdout())?;
    Ok(())
}
