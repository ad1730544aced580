//! The `korekto score` command.

use std::path::PathBuf;

use anyhow::Result;

use korekto_core::codec::build_request_body;
use korekto_core::operator::validate_operands;
use korekto_core::{BaseType, Cardinality, Operand};

use super::{connect, OutputFormat};

pub struct ScoreArgs {
    pub item: String,
    /// `None` sends a QTI NULL.
    pub response: Option<String>,
    pub base_type: BaseType,
    pub cardinality: Cardinality,
    pub dry_run: bool,
    pub format: String,
}

pub async fn execute(args: ScoreArgs, config_path: Option<PathBuf>) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;
    let operand = match args.response {
        Some(content) => Operand::new(args.cardinality, args.base_type, content),
        None => Operand::null(),
    };
    let operands = [operand];

    if args.dry_run {
        let response = validate_operands(&operands)?;
        println!("{}", build_request_body(&args.item, response));
        return Ok(());
    }

    let (operator, endpoint) = connect(config_path.as_deref())?;
    let result = operator.evaluate(&operands, &args.item, &endpoint).await?;

    match format {
        OutputFormat::Text => println!("{result}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "item": args.item, "score": result.score })
        ),
    }

    Ok(())
}
