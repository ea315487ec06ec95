use certsplit::{CertSplit, CertSplitError, Cli, OutputFormatter, OutputMode, UserFriendlyError};
use clap::Parser;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let certsplit = match CertSplit::from_cli(&cli) {
        Ok(certsplit) => certsplit,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    let logger = match certsplit.logger(cli.verbosity_level()) {
        Ok(logger) => logger,
        Err(e) => {
            certsplit.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    logger.in_scope(|| {
        tracing::info!(version = certsplit::version_info(), "certsplit starting");

        if cli.dry_run {
            return handle_dry_run(&certsplit);
        }

        match certsplit.run() {
            Ok(report) if report.has_failures() => 2,
            Ok(_) => 0,
            Err(e) => {
                tracing::error!(error = %e, "run aborted");
                certsplit.handle_error(&e);
                exit_code_for(&e)
            }
        }
    })
}

fn exit_code_for(error: &CertSplitError) -> i32 {
    match error {
        CertSplitError::Cancelled => 130,
        CertSplitError::RosterNotFound { .. } => 3,
        CertSplitError::MissingColumn { .. }
        | CertSplitError::EmptyRoster { .. }
        | CertSplitError::Csv { .. } => 4,
        CertSplitError::OutputDirectoryExists { .. }
        | CertSplitError::OutputOverlapsInput { .. } => 5,
        CertSplitError::Permission { .. } => 6,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "certsplit.toml".to_string());

    match CertSplit::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  certsplit --config {}", config_path);
            println!("\nEdit the file to match your roster columns and folder names.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(certsplit: &CertSplit) -> i32 {
    let formatter = certsplit.output_formatter();
    formatter.info("DRY RUN MODE - No files will be written");

    match certsplit.plan() {
        Ok(plan) => {
            formatter.print_plan(&plan);
            if certsplit.config().output.force_overwrite {
                formatter.warning("Force mode enabled - existing result folders would be replaced");
            }
            formatter.success("Dry run completed successfully");
            0
        }
        Err(e) => {
            certsplit.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &CertSplitError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_error(error);
}
