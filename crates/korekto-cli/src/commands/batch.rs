//! The `korekto batch` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use korekto_core::{BaseType, Cardinality, Operand};

use super::{connect, OutputFormat};

#[derive(Debug, Deserialize)]
struct BatchFile {
    #[serde(default)]
    responses: Vec<BatchEntry>,
}

/// One response to score. A missing `response` is sent as NULL.
#[derive(Debug, Clone, Deserialize)]
struct BatchEntry {
    item: String,
    #[serde(default)]
    response: Option<String>,
    #[serde(default = "default_base_type")]
    base_type: BaseType,
    #[serde(default = "default_cardinality")]
    cardinality: Cardinality,
}

fn default_base_type() -> BaseType {
    BaseType::String
}

fn default_cardinality() -> Cardinality {
    Cardinality::Single
}

impl BatchEntry {
    fn operand(&self) -> Operand {
        match &self.response {
            Some(content) => Operand::new(self.cardinality, self.base_type, content.clone()),
            None => Operand::null(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchOutcome {
    item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn parse_batch_file(path: &Path) -> Result<Vec<BatchEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file: {}", path.display()))?;
    let file: BatchFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse batch file: {}", path.display()))?;
    Ok(file.responses)
}

pub async fn execute(
    input: PathBuf,
    parallelism: usize,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    if parallelism == 0 {
        anyhow::bail!("parallelism must be at least 1");
    }

    let entries = parse_batch_file(&input)?;
    if entries.is_empty() {
        println!("No responses found in {}.", input.display());
        return Ok(());
    }

    let (operator, endpoint) = connect(config_path.as_deref())?;
    let operator = Arc::new(operator);
    let endpoint = Arc::new(endpoint);
    let semaphore = Arc::new(Semaphore::new(parallelism));
    let start = Instant::now();

    eprintln!(
        "Scoring {} response(s) against {}",
        entries.len(),
        endpoint.score_item_url()
    );

    let mut futures = FuturesUnordered::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let operator = Arc::clone(&operator);
        let endpoint = Arc::clone(&endpoint);
        let semaphore = Arc::clone(&semaphore);

        futures.push(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => operator
                    .evaluate(&[entry.operand()], &entry.item, &endpoint)
                    .await
                    .map(|result| result.score)
                    .map_err(|e| format!("{:#}", anyhow::Error::from(e))),
                Err(_) => Err("semaphore closed".to_string()),
            };
            (index, entry.item, outcome)
        });
    }

    let mut outcomes = Vec::new();
    while let Some((index, item, outcome)) = futures.next().await {
        if let Err(e) = &outcome {
            eprintln!("  ERROR: {item}: {e}");
        }
        let (score, error) = match outcome {
            Ok(score) => (Some(score), None),
            Err(e) => (None, Some(e)),
        };
        outcomes.push((index, BatchOutcome { item, score, error }));
    }
    outcomes.sort_by_key(|(index, _)| *index);
    let outcomes: Vec<BatchOutcome> = outcomes.into_iter().map(|(_, o)| o).collect();

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    match format {
        OutputFormat::Text => print_summary(&outcomes),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
    }

    eprintln!(
        "\nComplete: {}/{} scored, {failed} failed ({:.1}s)",
        outcomes.len() - failed,
        outcomes.len(),
        start.elapsed().as_secs_f64()
    );

    if failed > 0 {
        anyhow::bail!("{failed} of {} responses could not be scored", outcomes.len());
    }

    Ok(())
}

fn print_summary(outcomes: &[BatchOutcome]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Item", "Score", "Error"]);

    for (i, outcome) in outcomes.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&outcome.item),
            Cell::new(outcome.score.map(|s| s.to_string()).unwrap_or_default()),
            Cell::new(outcome.error.as_deref().unwrap_or("")),
        ]);
    }

    println!("{table}");
}
