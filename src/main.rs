use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::control::set_override as set_color_override;
use tracing::{error, info, warn};

use focstest::backend::{Backend, OcamlBackend, DEFAULT_TIMEOUT};
use focstest::engine::run_suites;
use focstest::fetch::{default_cache_dir, fetch_page, infer_url};
use focstest::report::{print_fatal, print_human};
use focstest::suite::load_suites;
use focstest::types::SuiteFilter;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Run OCaml \"doctests\" scraped from a homework page against a solution file.",
    after_help = "Submit bugs to <https://github.com/olin/focstest/issues/>."
)]
struct Cli {
    /// The OCaml file to test against
    #[arg(value_name = "OCAML_FILE")]
    ocaml_file: PathBuf,

    /// A url to scrape tests from (usually guessed from the file name)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Increase test output verbosity
    #[arg(short, long)]
    verbose: bool,

    /// Refetch the page even when a cached copy exists
    #[arg(short = 'U', long = "update-cache")]
    update_cache: bool,

    /// Test suites to use exclusively, indexed from 1
    #[arg(
        short = 'u',
        long = "use-suites",
        value_name = "N",
        num_args = 1..,
        conflicts_with = "skip_suites"
    )]
    use_suites: Vec<usize>,

    /// Test suites to skip, indexed from 1
    #[arg(short = 's', long = "skip-suites", value_name = "N", num_args = 1..)]
    skip_suites: Vec<usize>,

    /// Seconds to wait for each interpreter session
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Toplevel command used to evaluate the tests
    #[arg(long, value_name = "CMD", default_value = "ocaml")]
    interpreter: String,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn resolve_interpreter(cmd: &str) -> String {
    if cmd.contains(std::path::MAIN_SEPARATOR) || cmd.starts_with("./") {
        return cmd.to_string();
    }
    match which::which(cmd) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => cmd.to_string(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "focstest=info".to_string())
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "focstest=warn".to_string())
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.no_color {
        set_color_override(false);
    }

    let url = match cli.url.clone() {
        Some(url) => url,
        None => match infer_url(&cli.ocaml_file) {
            Some(url) => url,
            None => {
                error!(
                    file = %cli.ocaml_file.display(),
                    "could not infer url from filename; pass one manually with --url"
                );
                std::process::exit(2);
            }
        },
    };

    let html = match fetch_page(&url, &default_cache_dir(), cli.update_cache) {
        Ok(html) => html,
        Err(e) => {
            error!("{e:#}");
            std::process::exit(2);
        }
    };

    let suites = load_suites(&html);
    let num_tests: usize = suites.iter().map(|s| s.cases.len()).sum();
    info!(
        suites = suites.len(),
        tests = num_tests,
        "found test suites"
    );

    if !cli.ocaml_file.exists() {
        error!(file = %cli.ocaml_file.display(), "file does not exist");
        std::process::exit(2);
    }

    let suite_filter = SuiteFilter::from_args(&cli.use_suites, &cli.skip_suites);
    for &requested in cli.use_suites.iter().chain(cli.skip_suites.iter()) {
        if !suites.iter().any(|s| s.index == requested) {
            warn!(suite = requested, "no such suite");
        }
    }
    let (selected, deselected_cases) = suite_filter.apply(suites);

    let backend = OcamlBackend::new(cli.interpreter.clone(), Duration::from_secs(cli.timeout));
    if let Err(e) = backend.validate() {
        error!("{e:#}");
        std::process::exit(2);
    }
    if cli.verbose {
        info!(interpreter = %resolve_interpreter(&cli.interpreter), "using interpreter");
    }

    let preload = vec![cli.ocaml_file.to_string_lossy().into_owned()];

    println!("Starting tests");
    match run_suites(&backend, &selected, &preload) {
        Ok(mut summary) => {
            summary.skipped += deselected_cases;
            println!("Finished testing");
            print_human(&summary, cli.verbose);
            if summary.failed > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(err) => {
            print_fatal(&err);
            std::process::exit(2);
        }
    }
}
