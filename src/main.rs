use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser};
use miette::{IntoDiagnostic, Result};
use topic_review_core::{TopicReviewConfig, TopicReviewError};
use topic_review_gerrit::labeler::ReviewOptions;
use topic_review_gerrit::pipeline::{self, RunSettings};
use topic_review_gerrit::runner::{
    CommandOutput, CommandRunner, CommandSpec, Connection, SystemRunner,
};
use topic_review_gerrit::topics::resolve_topics;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = ".topic-review.toml";

#[derive(Parser)]
#[command(
    name = "topic-review",
    version,
    about = "Label Gerrit patches",
    long_about = "Apply a review label to every change under one or more Gerrit topics.\n\n\
                   Queries each topic over the Gerrit SSH interface and runs\n\
                   `gerrit review` once per change, on its current patch set.\n\
                   A failed review is reported and the run continues.\n\n\
                   Examples:\n  \
                     topic-review -t feature-x -s review.example.com --label Verified --score +1\n  \
                     topic-review -t a,b --server host --label Code-Review --score -1 --message 'needs work'\n  \
                     topic-review --init                      Create a .topic-review.toml"
)]
struct Cli {
    /// You can assign multiple topics by putting comma between them
    #[arg(
        short = 't',
        long,
        required_unless_present_any = ["init", "completions"],
        value_parser = clap::builder::NonEmptyStringValueParser::new()
    )]
    topic: Option<String>,

    /// Gerrit server
    #[arg(short = 's', long)]
    server: Option<String>,

    /// Git remote name (default: gerrit)
    #[arg(short = 'r', long)]
    remote: Option<String>,

    /// SSH port (default: 29418)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Label to apply (e.g., Code-Review, Verified)
    #[arg(long)]
    label: Option<String>,

    /// Score to apply (e.g., +1, +2, -1, -2, 0)
    #[arg(long, allow_hyphen_values = true)]
    score: Option<String>,

    /// Message for the review
    #[arg(long)]
    message: Option<String>,

    /// Path to configuration file (default: .topic-review.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,

    /// Create a default .topic-review.toml configuration file
    #[arg(long, conflicts_with = "topic")]
    init: bool,

    /// Generate shell completion scripts
    #[arg(long, hide = true, value_enum)]
    completions: Option<clap_complete::Shell>,
}

/// Shows a spinner on stderr while a topic query runs.
struct ProgressRunner<R> {
    inner: R,
}

fn is_query(spec: &CommandSpec) -> bool {
    spec.args.get(4).map(String::as_str) == Some("query")
}

impl<R: CommandRunner> CommandRunner for ProgressRunner<R> {
    fn run(&self, spec: &CommandSpec) -> std::result::Result<CommandOutput, TopicReviewError> {
        if !is_query(spec) {
            return self.inner.run(spec);
        }
        let spinner = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
        {
            spinner.set_style(style);
        }
        spinner.set_message(spec.args.get(3..5).map_or_else(
            || spec.program.clone(),
            |sub| sub.join(" "),
        ));
        spinner.enable_steady_tick(Duration::from_millis(120));
        let result = self.inner.run(spec);
        spinner.finish_and_clear();
        result
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> std::result::Result<TopicReviewConfig, TopicReviewError> {
    match path {
        Some(path) => TopicReviewConfig::from_file(path),
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                TopicReviewConfig::from_file(default_path)
            } else {
                Ok(TopicReviewConfig::default())
            }
        }
    }
}

/// Merge CLI flags over the config file.
fn resolve_settings(cli: &Cli, config: TopicReviewConfig) -> Result<RunSettings> {
    let Some(server) = cli.server.clone().or(config.gerrit.server) else {
        tracing::error!("No Gerrit server configured");
        miette::bail!(miette::miette!(
            help = format!("Pass --server <host> or set server under [gerrit] in {CONFIG_FILE}"),
            "No Gerrit server configured"
        ));
    };

    Ok(RunSettings {
        connection: Connection::new(
            config.gerrit.ssh_program,
            server,
            cli.port.unwrap_or(config.gerrit.port),
        ),
        remote: cli.remote.clone().unwrap_or(config.gerrit.remote),
        review: ReviewOptions {
            label: cli.label.clone().or(config.review.label),
            score: cli.score.clone().or(config.review.score),
            message: cli.message.clone().or(config.review.message),
        },
    })
}

const DEFAULT_CONFIG: &str = r#"# topic-review configuration
# Command-line flags take precedence over these values.

[gerrit]
# server = "review.example.com"
# port = 29418
# remote = "gerrit"
# ssh_program = "ssh"

[review]
# label = "Verified"
# score = "+1"
# message = "Verified by CI"
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "topic-review", &mut std::io::stdout());
        return Ok(());
    }

    if cli.init {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            miette::bail!("{CONFIG_FILE} already exists");
        }
        std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
        println!("Created {CONFIG_FILE} with default configuration");
        return Ok(());
    }

    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref()).inspect_err(|e| tracing::error!("{e}"))?;
    let settings = resolve_settings(&cli, config)?;
    if let Err(e) = settings.review.validate() {
        tracing::error!("{e}");
        miette::bail!(miette::miette!(
            help = "Pass --score together with --label, e.g. --label Verified --score +1",
            "{e}"
        ));
    }

    let Some(raw_topics) = cli.topic.as_deref() else {
        miette::bail!("--topic is required");
    };
    let topics = resolve_topics(raw_topics);
    tracing::debug!("Resolved topics: {topics:?}");

    let summary = if std::io::stderr().is_terminal() {
        pipeline::run(&ProgressRunner { inner: SystemRunner }, &settings, &topics)?
    } else {
        pipeline::run(&SystemRunner, &settings, &topics)?
    };

    println!("{summary}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use topic_review_core::Topic;
    use topic_review_gerrit::query::build_query_command;

    #[test]
    fn spinner_only_wraps_queries() {
        let conn = Connection::new("ssh", "host", 29418);
        let query = build_query_command(&conn, "gerrit", &Topic::new("T"));
        let review = conn.command(["gerrit", "review", "--project", "demo", "123,2"]);
        assert!(is_query(&query));
        assert!(!is_query(&review));
    }
}
