use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gss_explorer::data::loader::GSS_2018_URL;
use gss_explorer::{
    gss_2018, DashboardState, FileSource, HttpSource, Page, Survey, SurveyCache, ViewSpec,
};

/// Derive GSS 2018 dashboard views as JSON.
#[derive(Parser, Debug)]
#[command(name = "gss-explorer", version, about)]
struct Cli {
    /// Read the survey from a local CSV instead of downloading it
    #[arg(long, global = true, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Validate the download's TLS certificate
    #[arg(long, global = true)]
    strict_tls: bool,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Row count and missing values per column
    Overview,
    /// Average income, prestige, SEI and education by sex
    Summary,
    /// Agreement with the male breadwinner statement by sex
    Breadwinner,
    /// Prestige vs income points with per-sex trendlines
    PrestigeIncome,
    /// Income and prestige distributions by sex
    Boxplots,
    /// Income distributions by prestige range and sex
    PrestigeBins,
    /// An attitude question broken down by a demographic group
    Explore {
        #[arg(long, default_value = "satjob")]
        feature: String,
        #[arg(long, default_value = "sex")]
        group: String,
    },
    /// List the available pages
    Pages,
}

fn load(cli: &Cli) -> Result<Arc<Survey>> {
    let survey = match (&cli.csv, cli.strict_tls) {
        (Some(path), _) => SurveyCache::new(FileSource::new(path)).get(),
        (None, true) => SurveyCache::new(HttpSource::new(GSS_2018_URL)).get(),
        (None, false) => gss_2018(),
    };
    survey.context("loading the GSS 2018 survey")
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let page = match &cli.command {
        Command::Pages => {
            for page in Page::ALL {
                println!("{:<16} {}", page.slug(), page.title());
            }
            return Ok(());
        }
        Command::Overview => Page::Overview,
        Command::Summary => Page::Summary,
        Command::Breadwinner => Page::Breadwinner,
        Command::PrestigeIncome => Page::PrestigeIncome,
        Command::Boxplots => Page::Boxplots,
        Command::PrestigeBins => Page::PrestigeBins,
        Command::Explore { .. } => Page::Explore,
    };

    // Reject a bad selection before paying for the download.
    let selection = match &cli.command {
        Command::Explore { feature, group } => Some(ViewSpec::from_names(feature, group)?),
        _ => None,
    };

    let mut state = DashboardState::new(load(&cli)?);
    let view = match selection {
        Some(spec) => state.select(spec.feature, spec.group),
        None => state.navigate(page),
    };

    let json = if cli.pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    println!("{json}");
    Ok(())
}
