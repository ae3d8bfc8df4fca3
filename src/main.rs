use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use pr_dash::dashboard::{reduce, Action, Command, DashboardState};
use pr_dash::filter::{FilterSpec, StatusFilter};
use pr_dash::github::FetchError;
use pr_dash::tui::{App, FetchContext};

const EXIT_SUCCESS: i32 = 0;
const EXIT_API: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_RATE_LIMIT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Only show PRs in this state
    #[arg(long, default_value = "all")]
    status: StatusFilter,

    /// Only show PRs opened on or after this date (YYYY-MM-DD)
    #[arg(long)]
    after: Option<String>,

    /// Only show PRs opened on or before this date (YYYY-MM-DD)
    #[arg(long)]
    before: Option<String>,

    /// Only show open PRs older than the at-risk threshold
    #[arg(long)]
    at_risk: bool,

    /// Page of the filtered list to show (1-based, clamped)
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive dashboard (default if no subcommand)
    Tui,
    /// Print one page of filtered PRs and exit
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Open a PR in the browser by its row number on the listed page
    Open {
        /// Row number as shown by `list` (1-based)
        index: usize,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pr-dash")]
#[command(about = "Browse and filter a GitHub repository's pull requests", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/pr-dash/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Repository to load, as owner/name (defaults to the configured one)
    #[arg(short, long, global = true)]
    repo: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn exit_code(error: &FetchError) -> i32 {
    match error {
        FetchError::Network(_) => EXIT_NETWORK,
        FetchError::RateLimited { .. } => EXIT_RATE_LIMIT,
        FetchError::Api { .. } | FetchError::Decode(_) => EXIT_API,
        FetchError::InvalidRepository(_) => EXIT_CONFIG,
    }
}

fn filter_spec(repository: Option<String>, args: Option<&FilterArgs>) -> FilterSpec {
    let mut spec = FilterSpec {
        repository: repository.unwrap_or_default(),
        ..FilterSpec::default()
    };
    if let Some(args) = args {
        spec.status = args.status;
        spec.opened_after = args.after.clone().unwrap_or_default();
        spec.opened_before = args.before.clone().unwrap_or_default();
        spec.at_risk = args.at_risk;
    }
    spec
}

#[tokio::main]
async fn main() {
    pr_dash::github::install_crypto_provider();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);
    let start_time = Instant::now();

    if let Err(e) = pr_dash::logger::init(cli.verbose) {
        eprintln!("{}", e);
    }

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match pr_dash::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = pr_dash::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let (settings, request_timeout) = match (config.dashboard_settings(), config.request_timeout())
    {
        (Ok(settings), Ok(timeout)) => (settings, timeout),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    log::debug!(
        "Using {} ({} per page, up to {} pages, {:?} pagination)",
        config.api_url,
        config.per_page,
        config.max_pages,
        config.pagination
    );

    let client = match pr_dash::github::create_client(&config.api_url, request_timeout, config.enrich)
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create GitHub client: {:#}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    let ctx = FetchContext {
        client,
        options: config.fetch_options(),
        // Every listing page gets the full request timeout, plus one for slack
        timeout: request_timeout.saturating_mul(config.max_pages.saturating_add(1)),
    };

    match command {
        Commands::Tui => {
            let (state, initial) =
                DashboardState::start(settings, filter_spec(cli.repo, None));
            let app = App::new(state);
            if let Err(e) = pr_dash::tui::run_tui(app, initial, ctx).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_API);
            }
        }
        Commands::List { filters, tsv } => {
            let state = load_page(settings, filter_spec(cli.repo, Some(&filters)), &filters, &ctx).await;
            let view = state.view(chrono::Utc::now());

            if tsv {
                let output = pr_dash::output::format_tsv(&view.rows);
                if !output.is_empty() {
                    println!("{}", output);
                }
            } else {
                let use_colors = pr_dash::output::should_use_colors();
                println!(
                    "{}",
                    pr_dash::output::format_pr_table(
                        &view.rows,
                        chrono::Utc::now(),
                        state.settings.at_risk_after,
                        use_colors
                    )
                );
                println!();
                println!("{}", pr_dash::output::format_summary(&view));
            }

            log::debug!(
                "Listed {} PRs from {} in {:?}",
                view.rows.len(),
                state.effective_repository(),
                start_time.elapsed()
            );
        }
        Commands::Open { index, filters } => {
            let state = load_page(settings, filter_spec(cli.repo, Some(&filters)), &filters, &ctx).await;
            let view = state.view(chrono::Utc::now());

            // Validate index bounds (1-based)
            if index < 1 || index > view.rows.len() {
                eprintln!(
                    "Invalid index {}. Must be between 1 and {}.",
                    index,
                    view.rows.len()
                );
                std::process::exit(EXIT_CONFIG);
            }

            let pr = view.rows[index - 1];
            if let Err(e) = pr_dash::browser::open_pull_request(pr) {
                eprintln!("Failed to open browser: {:#}", e);
                std::process::exit(EXIT_NETWORK);
            }

            println!("Opening PR #{} in browser: {}", pr.number, pr.url);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Fetch the repository once and move to the requested page. Exits the
/// process on fetch failure.
async fn load_page(
    settings: pr_dash::dashboard::DashboardSettings,
    spec: FilterSpec,
    args: &FilterArgs,
    ctx: &FetchContext,
) -> DashboardState {
    let (state, Command::Fetch {
        generation,
        repository,
    }) = DashboardState::start(settings, spec);

    let action = pr_dash::tui::fetch_action(ctx, generation, repository).await;
    if let Action::FetchFailed { error, .. } = &action {
        eprintln!("{}", error);
        std::process::exit(exit_code(error));
    }

    let (mut state, _) = reduce(state, action);
    state.requested_page = args.page.max(1);
    state
}
