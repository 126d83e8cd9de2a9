// CLI commands driving the kata library
use anyhow::{bail, Context, Result};
use kata_common::catalog::{GraphqlCatalog, ProblemCatalog};
use kata_common::config::Config;
use kata_common::coordinator::{self, PollOutcome};
use kata_common::harness::{self, CaseRecord};
use kata_common::judge0::Judge0Client;
use kata_common::metadata;
use kata_common::starter;
use kata_common::testcase;
use kata_common::types::{JobStatus, Language, SubmissionJob, SubmissionRequest};
use std::fs;
use std::path::Path;
use tracing::debug;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn parse_language(name: &str) -> Result<Language> {
    match Language::from_str(name) {
        Some(language) => Ok(language),
        None => bail!("Unknown language '{}'. Expected typescript, python or java", name),
    }
}

/// Render starter code from a metadata file or a catalog lookup
pub async fn starter(metadata_path: Option<&Path>, slug: Option<&str>, language: &str) -> Result<()> {
    let language = parse_language(language)?;

    let signature = match (metadata_path, slug) {
        (Some(path), _) => metadata::decode_signature(&read(path)?)?,
        (None, Some(slug)) => {
            let config = Config::from_env().context("Invalid configuration")?;
            let catalog = GraphqlCatalog::new(config.catalog_url);
            let question = catalog
                .question(slug)
                .await?
                .with_context(|| format!("Problem '{}' not found in catalog", slug))?;
            match question.into_problem().signature {
                Some(signature) => signature,
                None => bail!("Problem '{}' has no usable signature metadata", slug),
            }
        }
        (None, None) => bail!("Pass either --metadata or --slug"),
    };

    print!("{}", starter::render(&signature, language));
    Ok(())
}

/// Group example text into cases and print them as a JSON array
pub fn cases(path: &Path, arity: usize, strict: bool) -> Result<()> {
    let raw = read(path)?;
    let cases = if strict {
        testcase::parse_strict(&raw, arity)?
    } else {
        testcase::parse(&raw, arity)?
    };
    println!("{}", serde_json::to_string_pretty(&cases)?);
    Ok(())
}

/// Print the harness program for a solution
pub fn harness(source: &Path, metadata_path: &Path, cases_path: &Path, language: &str) -> Result<()> {
    let language = parse_language(language)?;
    let signature = metadata::decode(&read(metadata_path)?)?;
    let cases = harness::example_cases(&signature, &read(cases_path)?)?;
    let program = harness::synthesize(&read(source)?, &signature, &cases, language)?;
    print!("{}", program.source);
    Ok(())
}

/// Submission built from CLI inputs
#[derive(Debug)]
struct PreparedRun {
    request: SubmissionRequest,
    harness: bool,
}

fn prepare(
    source: String,
    language: Language,
    metadata_text: Option<String>,
    cases_text: Option<String>,
    stdin: Option<String>,
) -> Result<PreparedRun> {
    let (source_code, harness) = match metadata_text {
        Some(_) if language == Language::Java => {
            bail!("{} has no harness target; run it without --metadata and --cases", language)
        }
        Some(metadata_text) => {
            let signature = metadata::decode(&metadata_text)?;
            if cases_text.is_none() && !signature.params.is_empty() {
                bail!("'{}' takes parameters; pass --cases", signature.name);
            }
            let cases = harness::example_cases(&signature, cases_text.as_deref().unwrap_or_default())?;
            (harness::synthesize(&source, &signature, &cases, language)?.source, true)
        }
        None => (source, false),
    };

    Ok(PreparedRun {
        request: SubmissionRequest {
            source_code,
            language_id: language.judge0_id(),
            stdin: Some(stdin.unwrap_or_default()),
        },
        harness,
    })
}

fn record_line(record: &CaseRecord) -> String {
    let arguments = record
        .arguments
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect::<Vec<_>>()
        .join(", ");
    format!("  case {}: {} -> {}", record.index, arguments, record.result)
}

/// Human readable report of a finished job
fn report(job: &SubmissionJob, harness: bool) -> String {
    let mut lines = vec![format!(
        "Status: {} ({})",
        job.description,
        match job.status {
            JobStatus::Finished => "finished",
            JobStatus::Error => "error",
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
        }
    )];
    if let Some(time) = &job.time {
        lines.push(format!("Time: {}s", time));
    }
    if let Some(memory) = job.memory {
        lines.push(format!("Memory: {} KB", memory));
    }

    let stdout = job.stdout.as_deref().unwrap_or_default();
    if harness {
        let records = harness::parse_records(stdout);
        lines.push(format!("Results ({}):", records.len()));
        lines.extend(records.iter().map(record_line));
    } else if !stdout.is_empty() {
        lines.push("Output:".to_string());
        lines.push(stdout.trim_end().to_string());
    }

    for (label, text) in [("Compile output", &job.compile_output), ("Stderr", &job.stderr)] {
        if let Some(text) = text.as_deref().filter(|t| !t.trim().is_empty()) {
            lines.push(format!("{}:", label));
            lines.push(text.trim_end().to_string());
        }
    }
    lines.join("\n")
}

/// Submit a solution and poll until it finishes
pub async fn run(
    source: &Path,
    language: &str,
    metadata_path: Option<&Path>,
    cases_path: Option<&Path>,
    stdin_path: Option<&Path>,
) -> Result<()> {
    let language = parse_language(language)?;
    let prepared = prepare(
        read(source)?,
        language,
        metadata_path.map(read).transpose()?,
        cases_path.map(read).transpose()?,
        stdin_path.map(read).transpose()?,
    )?;

    let config = Config::from_env().context("Invalid configuration")?;
    let client = Judge0Client::new(&config);

    debug!(harness = prepared.harness, language = %language, "Submitting");
    println!("🚀 Submitting {} solution to {}", language, config.judge0_url);

    let (token, outcome) = coordinator::submit_and_wait(&client, &prepared.request, config.poll)
        .await
        .context("Submission failed")?;
    println!("🎫 Token: {}", token);

    match outcome {
        PollOutcome::Completed(job) => {
            println!("{}", report(&job, prepared.harness));
            if job.status == JobStatus::Error {
                bail!("Job ended with an error: {}", job.description);
            }
            Ok(())
        }
        PollOutcome::Exhausted { last, attempts } => {
            println!("{}", report(&last, prepared.harness));
            bail!(
                "Job {} still {} after {} polls; check it later with GET /run?token={}",
                token,
                last.description,
                attempts,
                token
            );
        }
    }
}
