//! arco-persona command-line entry point
//!
//! Drives the persona library from a terminal. The persisted persona lives in
//! an on-disk cookie jar so consecutive invocations behave like page loads.

mod cli;

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use serde_json::{Map, Value};
use tracing::debug;

use arco_persona::config::{self, SiteConfig};
use arco_persona::content::ContentAssembler;
use arco_persona::error::{Error, Result};
use arco_persona::logging;
use arco_persona::persona::{FileBackend, PersonaClassifier, PersonaState, PersonaStore, PersonaTag};

use crate::cli::{Cli, Commands, ConfigSubcommand, PersonaSubcommand};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that must work without a loadable configuration
    match &cli.command {
        Commands::Version => {
            print_version();
            return Ok(());
        }
        Commands::Config {
            subcommand: ConfigSubcommand::Init { path, force },
        } => {
            let created = config::init_config(path.as_deref(), *force)?;
            println!("Configuration written to {}", created.display());
            return Ok(());
        }
        _ => {}
    }

    let config = SiteConfig::load(cli.config.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Classify { answers, persist, jar } => {
            run_classify(&config, &answers, persist, jar, cli.verbose)
        }
        Commands::Persona { subcommand } => handle_persona_command(&config, subcommand),
        Commands::Compose {
            page_type,
            persona,
            base,
            jar,
        } => run_compose(&config, &page_type, persona, base, jar),
        Commands::Quiz => print_quiz(&config),
        Commands::Variants { persona } => print_variants(&config, persona),
        Commands::Config { subcommand } => handle_config_command(&config, subcommand),
        Commands::Version => Ok(()),
    }
}

fn print_version() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}

/// Store over the jar named on the command line, or the configured one.
fn open_store(config: &SiteConfig, jar: Option<String>) -> PersonaStore<FileBackend> {
    let path = jar.map(PathBuf::from).unwrap_or_else(|| config.jar_path());
    debug!(jar = %path.display(), "Opening cookie jar");
    PersonaStore::new(FileBackend::new(path))
}

/// Strict persona parsing for commands that write or emit a persona.
fn parse_tag(tag: &str) -> Result<PersonaTag> {
    tag.parse::<PersonaTag>()
}

fn run_classify(
    config: &SiteConfig,
    answers: &[i32],
    persist: bool,
    jar: Option<String>,
    verbose: u8,
) -> Result<()> {
    let classifier = PersonaClassifier::new(config.load_quiz()?.matrix());
    let result = classifier.classify_detailed(answers);

    println!("{}", result.tag);
    if verbose > 0 {
        println!("scores: {}", result.scores);
        println!("answered: {}", result.answered);
    }

    if persist {
        open_store(config, jar).persist(result.tag);
    }

    Ok(())
}

fn handle_persona_command(config: &SiteConfig, subcommand: PersonaSubcommand) -> Result<()> {
    match subcommand {
        PersonaSubcommand::Show { jar } => {
            let store = open_store(config, jar);
            let now = Utc::now();
            match store.state_at(now) {
                PersonaState::Persisted(tag) => {
                    println!("persona: {} ({})", tag, tag.display_name());
                    if let Some(record) = store.record_at(now) {
                        println!("expires: {}", record.expires_at.to_rfc3339());
                    }
                }
                PersonaState::Expired => println!("persona: none (expired)"),
                PersonaState::Unknown | PersonaState::Classified(_) => println!("persona: none"),
            }
            match store.read_legacy_at(now) {
                Some(style) => println!("legacy: {}", style),
                None => println!("legacy: none"),
            }
        }
        PersonaSubcommand::Set { tag, jar } => {
            let tag = parse_tag(&tag)?;
            let store = open_store(config, jar);
            store.persist(tag);
            println!("{}", tag);
        }
        PersonaSubcommand::Clear { jar } => {
            let store = open_store(config, jar);
            store.clear()?;
            println!("Persona cleared.");
        }
        PersonaSubcommand::Headers { tag } => {
            let tag = parse_tag(&tag)?;
            for header in PersonaStore::<FileBackend>::set_cookie_headers(tag, Utc::now()) {
                println!("Set-Cookie: {}", header);
            }
        }
    }

    Ok(())
}

fn read_base_content(path: Option<&str>) -> Result<Map<String, Value>> {
    let Some(path) = path else {
        return Ok(Map::new());
    };

    let path = PathBuf::from(path);
    let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
        path: path.clone(),
        source: e,
    })?;

    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::ContentMalformed {
            message: format!(
                "{}: base content must be a JSON object, found {}",
                path.display(),
                json_kind(&other)
            ),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn run_compose(
    config: &SiteConfig,
    page_type: &str,
    persona: Option<String>,
    base: Option<String>,
    jar: Option<String>,
) -> Result<()> {
    let registry = config.load_registry()?;
    let base = read_base_content(base.as_deref())?;
    let store = open_store(config, jar);

    let assembler =
        ContentAssembler::new(&registry, &store).with_limits(config.assembly_limits());
    let assembled = assembler.compose_str(page_type, persona.as_deref(), &base);

    println!("{}", serde_json::to_string_pretty(&assembled)?);
    Ok(())
}

fn print_quiz(config: &SiteConfig) -> Result<()> {
    let quiz = config.load_quiz()?;

    println!("Quiz v{}", quiz.version);
    for (q, question) in quiz.questions.iter().enumerate() {
        println!();
        println!("{}. {}", q + 1, question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            println!("   [{}] {}", i, option.label);
        }
    }

    Ok(())
}

fn print_variants(config: &SiteConfig, persona: Option<String>) -> Result<()> {
    let registry = config.load_registry()?;
    let tag = persona.as_deref().and_then(PersonaTag::parse_lenient);
    let limits = config.assembly_limits();

    let set = registry.variant_set(tag, limits.products, limits.articles);
    println!("{}", serde_json::to_string_pretty(&set)?);
    Ok(())
}

fn handle_config_command(config: &SiteConfig, subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            println!("{}", toml::to_string_pretty(config)?);
        }
        ConfigSubcommand::Validate => {
            // Loading checks data files as well as the settings themselves
            config.load_quiz()?;
            config.load_registry()?;
            println!("Configuration is valid.");
        }
        ConfigSubcommand::Init { .. } => {}
    }

    Ok(())
}
