use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crxscan::client::{self, CrxcavatorClient, SubmitStatus};
use crxscan::config::{self, Settings};
use crxscan::output::{export, terminal};
use crxscan::pacing::{Pacer, TokioPacer};
use crxscan::{input, inventory, report, reputation};

#[derive(Parser, Debug)]
#[command(name = "crxscan")]
#[command(about = "Inventory installed Chrome extensions and check them against CRXcavator")]
#[command(version)]
struct Args {
    /// Submit an extension by ID for processing
    #[arg(short = 's', long, value_name = "id")]
    submit: Option<String>,

    /// Submit every installed (or --input listed) extension
    #[arg(long)]
    submit_all: bool,

    /// Get an extension's report by ID
    #[arg(short = 'r', long, value_name = "id")]
    report: Option<String>,

    /// Get a report for every installed (or --input listed) extension
    #[arg(long)]
    report_all: bool,

    /// Write the report to a file (a directory with --report-all)
    #[arg(long, value_name = "path")]
    export: Option<PathBuf>,

    /// List installed extensions
    #[arg(short = 'e', long)]
    extensions: bool,

    /// Check a report's externally contacted hosts against VirusTotal
    #[arg(long, value_name = "id")]
    virustotal: Option<String>,

    /// Set the CRXcavator API key
    #[arg(long, value_name = "key")]
    crxcavator_key: Option<String>,

    /// Set the CRXcavator API URI
    #[arg(long, value_name = "uri")]
    crxcavator_uri: Option<String>,

    /// Set the VirusTotal API key
    #[arg(long, value_name = "key")]
    virustotal_key: Option<String>,

    /// Test the configured CRXcavator API key
    #[arg(long)]
    test_crxcavator_key: bool,

    /// Test the configured CRXcavator API URI
    #[arg(long)]
    test_crxcavator_uri: bool,

    /// Set the local extension install path
    #[arg(long, value_name = "path")]
    extension_path: Option<String>,

    /// Newline-delimited file of extension IDs to use instead of scanning
    #[arg(long, value_name = "file")]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if let Err(err) = run(args).await {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config_file = config::config_path();
    let mut settings = Settings::load(&config_file)?;

    // Configuration setters persist and return; everything below them talks
    // to the network with the settings as loaded.
    if let Some(ref key) = args.crxcavator_key {
        settings.set_crxcavator_key(key)?;
        settings.save(&config_file)?;
        println!("The CRXcavator API key was set successfully!");
        return Ok(());
    }

    if let Some(ref uri) = args.crxcavator_uri {
        settings.set_crxcavator_uri(uri)?;
        settings.save(&config_file)?;
        println!("The CRXcavator API URI was set successfully!");
        return Ok(());
    }

    if let Some(ref key) = args.virustotal_key {
        settings.set_virustotal_key(key)?;
        settings.save(&config_file)?;
        println!("The VirusTotal API key was set successfully!");
        return Ok(());
    }

    if let Some(ref path) = args.extension_path {
        settings.set_extension_path(path)?;
        settings.save(&config_file)?;
        println!("The extension path was set successfully!");
        return Ok(());
    }

    if args.extensions {
        let mut records = inventory::scan(&settings.extension_root())?;
        records.sort_by(|a, b| a.id.cmp(&b.id));
        terminal::print_extension_list(&records);
        return Ok(());
    }

    let pacer: Arc<dyn Pacer> = Arc::new(TokioPacer);
    let remote = CrxcavatorClient::new(
        &settings.crxcavator_api_uri,
        settings.crxcavator_api_key.clone(),
        pacer.clone(),
    );

    if args.test_crxcavator_uri {
        if client::test_api_uri(&remote).await? {
            println!("The CRXcavator API URI was successfully tested!");
        } else {
            anyhow::bail!("The CRXcavator API URI returned an unexpected result");
        }
        return Ok(());
    }

    if args.test_crxcavator_key {
        settings.require_crxcavator_key()?;
        client::test_api_key(&remote).await?;
        println!("The CRXcavator API key was successfully tested!");
        return Ok(());
    }

    if let Some(ref id) = args.submit {
        let id = input::validate_extension_id(id)?;
        submit_one(&remote, id).await?;
        return Ok(());
    }

    if args.submit_all {
        let ids = bulk_ids(&args, &settings)?;
        submit_all(&remote, &ids).await;
        return Ok(());
    }

    if let Some(ref id) = args.report {
        let id = input::validate_extension_id(id)?;
        report_one(&remote, id, args.export.as_deref()).await?;
        return Ok(());
    }

    if args.report_all {
        let ids = bulk_ids(&args, &settings)?;
        report_all(&remote, &ids, args.export.as_deref()).await?;
        return Ok(());
    }

    if let Some(ref id) = args.virustotal {
        let id = input::validate_extension_id(id)?;
        let vt_key = settings.require_virustotal_key()?.to_string();
        virustotal_run(&remote, pacer.as_ref(), &vt_key, id).await?;
        return Ok(());
    }

    Args::command().print_help()?;
    Ok(())
}

/// Bulk operations take their identifier list from a batch file when one is
/// given, and from a live scan otherwise.
fn bulk_ids(args: &Args, settings: &Settings) -> Result<Vec<String>> {
    match &args.input {
        Some(path) => input::read_batch_file(path),
        None => {
            let records = inventory::scan(&settings.extension_root())?;
            Ok(records.into_iter().map(|record| record.id).collect())
        }
    }
}

async fn submit_one(remote: &CrxcavatorClient, id: &str) -> Result<()> {
    match client::submit_extension(remote, id).await? {
        SubmitStatus::Accepted => {
            println!("You've successfully submitted {} to CRXcavator.", id);
            Ok(())
        }
        SubmitStatus::UnknownExtension => {
            // First-party extensions routinely come back unknown; the
            // unknown-extension code is suppressed for them on submission
            // only, nowhere else.
            if inventory::FIRST_PARTY_EXTENSIONS.contains(&id) {
                Ok(())
            } else {
                anyhow::bail!("{} is not a valid extension. Please check your input.", id)
            }
        }
    }
}

async fn submit_all(remote: &CrxcavatorClient, ids: &[String]) {
    let mut failures = 0;

    for id in ids {
        if let Err(err) = submit_one(remote, id).await {
            failures += 1;
            eprintln!("{} {:#}", "warning:".yellow(), err);
        }
    }

    println!(
        "Submitted {} extension(s), {} failure(s).",
        ids.len() - failures,
        failures
    );
}

async fn report_one(remote: &CrxcavatorClient, id: &str, export_path: Option<&Path>) -> Result<()> {
    let snapshots = client::fetch_report(remote, id).await?;
    let summary = report::summarize(&snapshots)?;

    match export_path {
        Some(path) => {
            export::export_summary(&summary, path)?;
            println!("Report for {} written to {}", id, path.display());
        }
        None => terminal::print_summary(&summary),
    }

    Ok(())
}

async fn report_all(
    remote: &CrxcavatorClient,
    ids: &[String],
    export_dir: Option<&Path>,
) -> Result<()> {
    if let Some(dir) = export_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut failures = 0;

    for id in ids {
        let result = match export_dir {
            Some(dir) => report_one(remote, id, Some(&dir.join(format!("{}.txt", id)))).await,
            None => report_one(remote, id, None).await,
        };
        if let Err(err) = result {
            failures += 1;
            eprintln!("{} {:#}", "warning:".yellow(), err);
        }
    }

    println!(
        "Generated {} report(s), {} failure(s).",
        ids.len() - failures,
        failures
    );
    Ok(())
}

async fn virustotal_run(
    remote: &CrxcavatorClient,
    pacer: &dyn Pacer,
    vt_key: &str,
    id: &str,
) -> Result<()> {
    let snapshots = client::fetch_report(remote, id).await?;
    let summary = report::summarize(&snapshots)?;
    let hosts = reputation::hostnames(&summary.external_calls);

    if hosts.is_empty() {
        anyhow::bail!("No external calls were found to check");
    }

    let groups = reputation::group_count(hosts.len());
    println!(
        "Checking {} host(s) in {} group(s); this will take approximately {}.",
        hosts.len(),
        groups,
        reputation::format_duration(reputation::estimate_seconds(groups))
    );

    let results = reputation::correlate(remote, pacer, vt_key, &hosts).await?;
    terminal::print_reputation_results(&results);
    Ok(())
}
