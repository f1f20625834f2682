//! perchfeed - normalize feed payloads and thread comments from the command line
#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use perchfeed::{Config, NormalizeOptions, emoji, error, models::truncate_forest};

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match parse_args()? {
        Command::Normalize { input, user } => normalize_cli(&input, user),
        Command::Thread { input, depth } => thread_cli(&input, depth),
        Command::Encode { text } => {
            println!("{}", emoji::encode_entities(&text));
            Ok(())
        }
        Command::Decode { text } => {
            println!("{}", emoji::decode_content(&text));
            Ok(())
        }
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    }
}

/// CLI commands
enum Command {
    Normalize { input: PathBuf, user: Option<String> },
    Thread { input: PathBuf, depth: Option<usize> },
    Encode { text: String },
    Decode { text: String },
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return Ok(Command::Help);
    }

    let flag_value = |names: &[&str]| {
        args.iter()
            .position(|a| names.contains(&a.as_str()))
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),

        "normalize" | "posts" => {
            let input = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing input file (use - for stdin)"))?;
            Ok(Command::Normalize {
                input: PathBuf::from(input),
                user: flag_value(&["--user", "-u"]),
            })
        }

        "thread" | "comments" => {
            let input = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing input file (use - for stdin)"))?;
            let depth = flag_value(&["--depth", "-d"])
                .map(|d| d.parse::<usize>().context("--depth expects a number"))
                .transpose()?;
            Ok(Command::Thread {
                input: PathBuf::from(input),
                depth,
            })
        }

        "encode" => {
            let text = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing text to encode"))?
                .clone();
            Ok(Command::Encode { text })
        }

        "decode" => {
            let text = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing text to decode"))?
                .clone();
            Ok(Command::Decode { text })
        }

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'perchfeed --help' for usage"
        )),
    }
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!("Using default config: {e:#}");
        Config::default()
    })
}

fn normalize_cli(input: &Path, user: Option<String>) -> Result<()> {
    let mut options = NormalizeOptions::from_config(&load_config());
    if user.is_some() {
        options.current_user_id = user;
    }

    let raws = error::load_posts_json(input)?;
    let posts = perchfeed::normalize_posts(&raws, &options);

    let json = serde_json::to_string_pretty(&posts).context("Failed to serialize posts")?;
    println!("{json}");
    Ok(())
}

fn thread_cli(input: &Path, depth: Option<usize>) -> Result<()> {
    let config = load_config();
    let depth = depth.unwrap_or(config.reply_depth);

    let raws = error::load_comments_json(input)?;
    let mut tree = perchfeed::thread_comments(&raws);
    truncate_forest(&mut tree, depth);

    let json = serde_json::to_string_pretty(&tree).context("Failed to serialize comments")?;
    println!("{json}");
    Ok(())
}

fn print_help() {
    let config_path = perchfeed::paths::config_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"perchfeed - feed normalization and comment threading

USAGE:
    perchfeed [COMMAND]

COMMANDS:
    normalize <file|-> [OPTIONS]       Normalize a posts response
      Options:
        -u, --user <id>                Current user id (default: from config)
      Examples:
        perchfeed normalize posts.json --user 42
        curl -s $API/posts | perchfeed normalize -

    thread <file|-> [OPTIONS]          Thread a comments response
      Options:
        -d, --depth <n>                Levels to render (default: from config)

    encode <text>                      Encode emoji as HTML entities
    decode <text>                      Decode entity or \u{{...}} emoji

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

CONFIG:
    {}
"#,
        config_path
    );
}

fn print_version() {
    println!("perchfeed {}", perchfeed::VERSION);
}
