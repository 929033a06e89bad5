use clap::Parser;
use legislator_finance::adapters::{export, render};
use legislator_finance::app::legislators::US_STATES;
use legislator_finance::utils::error::ErrorSeverity;
use legislator_finance::utils::{logger, validation::Validate};
use legislator_finance::{
    AppConfig, AppError, CandidateView, Cli, Command, FileStore, LegislatorsView,
    OpenSecretsClient, Route,
};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI args: {:?}", cli.command);

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    match &cli.command {
        Command::States => {
            for (code, name) in US_STATES {
                println!("{}  {}", code, name);
            }
            Ok(())
        }
        Command::Legislators { state } => {
            let config = load_config(cli)?;
            show_legislators(&config, state.as_deref()).await
        }
        Command::Candidate { cid, json, export } => {
            let config = load_config(cli)?;
            show_candidate(&config, cid, *json, export.as_deref()).await
        }
        Command::Open { path } => {
            let route = Route::parse(path)?;
            let config = load_config(cli)?;
            tracing::info!("Opening {}", route);
            match route {
                Route::Legislators => show_legislators(&config, None).await,
                Route::Candidate { cid } => show_candidate(&config, &cid, false, None).await,
            }
        }
    }
}

async fn show_legislators(config: &AppConfig, state: Option<&str>) -> Result<(), AppError> {
    let client = OpenSecretsClient::from_config(config)?;
    let store = FileStore::new(config.storage.selection_path.clone());
    let mut view = LegislatorsView::new(client, store);

    let code = match state {
        Some(code) => code.to_string(),
        None => view
            .restore_selection()
            .await?
            .ok_or_else(|| AppError::MissingConfigError {
                field: "state (no saved selection yet)".to_string(),
            })?,
    };

    view.select_state(&code).await?;
    if let Some(list) = view.current() {
        print!("{}", render::render_legislators(list));
    }
    Ok(())
}

async fn show_candidate(
    config: &AppConfig,
    cid: &str,
    json: bool,
    export_path: Option<&Path>,
) -> Result<(), AppError> {
    // reuse route validation for the id
    let route = Route::parse(&format!("/candidate/{}", cid))?;
    tracing::debug!("Candidate route {}", route);

    let client = OpenSecretsClient::from_config(config)?;
    let mut view = CandidateView::new(client, config.api.cycle);
    view.open(cid).await?;

    let Some(profile) = view.current() else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
    } else {
        print!("{}", render::render_candidate(profile, config.display.chart_width));
    }

    if let Some(path) = export_path {
        export::export_profile_csv(profile, path)?;
        println!("📁 Chart data saved to: {}", path.display());
    }
    Ok(())
}
