//! CLI argument parsing using clap v4
//!
//! Operator surface for the persona pipeline: classify quiz answers, manage the
//! persisted persona in a cookie jar, and compose persona-aware pages.

use clap::{Parser, Subcommand};

/// Arco persona toolkit
///
/// Classifies quiz answers into a visitor persona, persists it as cookies, and
/// assembles persona-specific page content.
#[derive(Parser, Debug)]
#[command(name = "arco-persona")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "ARCO_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a set of quiz answers (zero-based option indices, -1 = unanswered)
    Classify {
        /// One answer per question, in question order
        #[arg(allow_negative_numbers = true, num_args = 0..)]
        answers: Vec<i32>,

        /// Persist the resulting persona to the cookie jar
        #[arg(long)]
        persist: bool,

        /// Cookie jar path (overrides storage.jar_path)
        #[arg(long)]
        jar: Option<String>,
    },

    /// Inspect or modify the persisted persona
    Persona {
        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },

    /// Compose page content for a persona
    Compose {
        /// Page type: homepage, product-detail, guide, article, experience, tool, bundle
        page_type: String,

        /// Persona tag (falls back to the persisted persona)
        #[arg(short, long)]
        persona: Option<String>,

        /// Base content JSON file (empty object if omitted)
        #[arg(short, long)]
        base: Option<String>,

        /// Cookie jar path (overrides storage.jar_path)
        #[arg(long)]
        jar: Option<String>,
    },

    /// Print the quiz questions and options
    Quiz,

    /// Print the resolved content variants for a persona
    Variants {
        /// Persona tag (defaults when omitted or unknown)
        #[arg(short, long)]
        persona: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version information
    Version,
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonaSubcommand {
    /// Show the persisted persona and its cookie state
    Show {
        /// Cookie jar path (overrides storage.jar_path)
        #[arg(long)]
        jar: Option<String>,
    },

    /// Persist a persona directly
    Set {
        /// Persona tag, e.g. craft-barista
        tag: String,

        /// Cookie jar path (overrides storage.jar_path)
        #[arg(long)]
        jar: Option<String>,
    },

    /// Remove both persona cookies
    Clear {
        /// Cookie jar path (overrides storage.jar_path)
        #[arg(long)]
        jar: Option<String>,
    },

    /// Print the Set-Cookie headers persisting a persona would emit
    Headers {
        /// Persona tag, e.g. craft-barista
        tag: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration and its data files
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_about_from_doc_comment() {
        let about = Cli::command().get_about().map(|a| a.to_string());
        assert_eq!(about.as_deref(), Some("Arco persona toolkit"));
    }

    #[test]
    fn test_classify_answers() {
        let cli = Cli::parse_from(["arco-persona", "classify", "0", "2", "1", "3"]);
        match cli.command {
            Commands::Classify { answers, persist, jar } => {
                assert_eq!(answers, vec![0, 2, 1, 3]);
                assert!(!persist);
                assert!(jar.is_none());
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_classify_negative_answers() {
        let cli = Cli::parse_from(["arco-persona", "classify", "-1", "3", "-1"]);
        match cli.command {
            Commands::Classify { answers, .. } => assert_eq!(answers, vec![-1, 3, -1]),
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_classify_no_answers() {
        let cli = Cli::parse_from(["arco-persona", "classify", "--persist"]);
        match cli.command {
            Commands::Classify { answers, persist, .. } => {
                assert!(answers.is_empty());
                assert!(persist);
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_persona_set() {
        let cli = Cli::parse_from([
            "arco-persona",
            "persona",
            "set",
            "traveller",
            "--jar",
            "j.json",
        ]);
        match cli.command {
            Commands::Persona {
                subcommand: PersonaSubcommand::Set { tag, jar },
            } => {
                assert_eq!(tag, "traveller");
                assert_eq!(jar.as_deref(), Some("j.json"));
            }
            _ => panic!("Expected Persona Set command"),
        }
    }

    #[test]
    fn test_compose_options() {
        let cli = Cli::parse_from([
            "arco-persona",
            "compose",
            "product-detail",
            "--persona",
            "upgrader",
            "--base",
            "page.json",
        ]);
        match cli.command {
            Commands::Compose {
                page_type,
                persona,
                base,
                jar,
            } => {
                assert_eq!(page_type, "product-detail");
                assert_eq!(persona.as_deref(), Some("upgrader"));
                assert_eq!(base.as_deref(), Some("page.json"));
                assert!(jar.is_none());
            }
            _ => panic!("Expected Compose command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["arco-persona", "-vv", "quiz", "--config", "arco.toml"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert_eq!(cli.config.as_deref(), Some("arco.toml"));
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["arco-persona", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
