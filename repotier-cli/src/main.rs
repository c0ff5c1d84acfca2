#![deny(missing_docs)]
//! Repotier command-line interface.
//!
//! Scores repository maturity through a Repotier server, or offline from a
//! saved repository snapshot.

mod client;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
#[cfg(not(test))]
use client::ReqwestAnalyzeClient;
use client::{AnalyzeClient, DEFAULT_SERVER_URL};
use repotier_core::{
    AnalysisReport, AnalysisResult, RepoAnalysis, RepoSnapshot, analyze_snapshot,
    language_shares, render_analysis_markdown, render_json,
};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "repotier", version, about = "Repository maturity scorer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(&["file", "url"])
))]
struct RepoSourceArgs {
    /// File containing repository URLs (one per line).
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Single repository URL to analyze.
    #[arg(long)]
    url: Option<String>,
}

#[derive(Args, Clone)]
struct ServerArgs {
    /// Base URL of the Repotier server.
    #[arg(long, env = "REPOTIER_API_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    /// Maximum number of concurrent analyses.
    #[arg(short = 'j', long, default_value_t = 5)]
    concurrency: usize,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze repositories from a URL or a file of URLs.
    Analyze {
        #[command(flatten)]
        source: RepoSourceArgs,
        #[command(flatten)]
        server: ServerArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Score a repository snapshot JSON file without network access.
    Score {
        /// Snapshot file holding repository metadata.
        #[arg(long)]
        snapshot: PathBuf,
        #[command(flatten)]
        report: OutputArgs,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            server,
            report,
        } => {
            let source = resolve_source_args(&source)?;
            let client = Arc::new(ReqwestAnalyzeClient::new(&server.server_url)?);
            run_analyze(source, client, server.concurrency, report).await?
        }
        Commands::Score { snapshot, report } => run_score(&snapshot, report).await?,
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

enum AnalyzeSource {
    File(PathBuf),
    Url(String),
}

fn resolve_source_args(source: &RepoSourceArgs) -> CliResult<AnalyzeSource> {
    if let Some(file) = source.file.clone() {
        return Ok(AnalyzeSource::File(file));
    }
    if let Some(url) = source.url.clone() {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err("url cannot be empty".into());
        }
        return Ok(AnalyzeSource::Url(trimmed.to_string()));
    }
    Err("no repository source provided".into())
}

async fn load_repo_urls(path: &Path) -> CliResult<Vec<String>> {
    let contents = tokio::fs::read_to_string(path).await?;
    let urls = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    Ok(urls)
}

async fn load_sources(source: AnalyzeSource) -> CliResult<Vec<String>> {
    match source {
        AnalyzeSource::File(file) => load_repo_urls(&file).await,
        AnalyzeSource::Url(url) => Ok(vec![url]),
    }
}

async fn run_analyze<C: AnalyzeClient + 'static>(
    source: AnalyzeSource,
    client: Arc<C>,
    concurrency: usize,
    report: OutputArgs,
) -> CliResult<()> {
    let urls = load_sources(source).await?;
    if urls.is_empty() {
        println!("No repositories found to analyze.");
        return Ok(());
    }

    let analyses = collect_analyses(urls, client, concurrency).await?;
    emit_analyses(&analyses, &report).await
}

/// Analyze every URL with bounded concurrency, keeping input order.
async fn collect_analyses<C: AnalyzeClient + 'static>(
    urls: Vec<String>,
    client: Arc<C>,
    concurrency: usize,
) -> CliResult<Vec<RepoAnalysis>> {
    let concurrency = if concurrency == 0 { 1 } else { concurrency };
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();

    for (index, url) in urls.iter().cloned().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let client = client.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let analysis = match client.analyze(&url).await {
                Ok(report) => RepoAnalysis::new(url, report),
                Err(err) => {
                    log::warn!("request for {url} failed: {err}");
                    RepoAnalysis::failed(url, err)
                }
            };
            (index, analysis)
        });
    }

    let mut slots: Vec<Option<RepoAnalysis>> = vec![None; urls.len()];
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok((index, analysis)) => slots[index] = Some(analysis),
            Err(err) => log::error!("analysis task failed: {err}"),
        }
    }

    Ok(slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| RepoAnalysis::failed(url, "analysis task did not complete"))
        })
        .collect())
}

#[cfg_attr(test, allow(dead_code))]
async fn run_score(snapshot_path: &Path, report: OutputArgs) -> CliResult<()> {
    let analysis = score_snapshot_file(snapshot_path).await?;
    emit_analyses(&[analysis], &report).await
}

async fn score_snapshot_file(path: &Path) -> CliResult<RepoAnalysis> {
    let contents = tokio::fs::read_to_string(path).await?;
    let snapshot: RepoSnapshot = serde_json::from_str(&contents)
        .map_err(|err| format!("invalid snapshot {}: {err}", path.display()))?;
    let result = analyze_snapshot(&snapshot);
    Ok(RepoAnalysis::new(
        path.display().to_string(),
        AnalysisReport::Success(Box::new(result)),
    ))
}

async fn emit_analyses(analyses: &[RepoAnalysis], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_analysis_text(analyses),
        OutputFormat::Markdown => render_analysis_markdown(analyses),
        OutputFormat::Json => render_json(analyses)?,
    };
    emit_output(output, contents).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_analysis_text(analyses: &[RepoAnalysis]) -> String {
    let mut output = String::new();
    for analysis in analyses {
        let _ = writeln!(output, "Source: {}", analysis.source);
        match &analysis.report {
            AnalysisReport::Success(result) => render_result_text(&mut output, result),
            AnalysisReport::Failed(failure) => {
                let _ = writeln!(output, "Status: error ({})", failure.error);
            }
        }
        let _ = writeln!(output);
    }
    output
}

fn render_result_text(output: &mut String, result: &AnalysisResult) {
    let _ = writeln!(output, "Status: success");
    let _ = writeln!(output, "Score: {}/100", result.score);
    let _ = writeln!(
        output,
        "Tier: {} ({:.1}% match)",
        result.tier, result.tier_similarity
    );
    let _ = writeln!(output, "Summary: {}", result.summary);

    let _ = writeln!(output, "Signals:");
    for (dimension, score) in result.profile.iter() {
        let gap = result.gaps.get(dimension);
        let rationale = repotier_core::report::rationale(result, dimension);
        if gap > 0 {
            let _ = writeln!(
                output,
                "- {}: {score}/20 (gap {gap}) {rationale}",
                dimension.label()
            );
        } else {
            let _ = writeln!(output, "- {}: {score}/20 {rationale}", dimension.label());
        }
    }

    let shares = language_shares(&result.languages);
    if shares.is_empty() {
        let _ = writeln!(output, "Languages: none detected");
    } else {
        let _ = writeln!(output, "Languages:");
        for (language, percent) in shares {
            let _ = writeln!(output, "- {language}: {percent:.2}%");
        }
    }

    let _ = writeln!(output, "Roadmap:");
    for (index, step) in result.roadmap.iter().enumerate() {
        let _ = writeln!(output, "{}. {step}", index + 1);
    }
}
