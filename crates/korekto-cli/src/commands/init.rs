//! The `korekto init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("korekto.toml").exists() {
        println!("korekto.toml already exists, skipping.");
    } else {
        std::fs::write("korekto.toml", SAMPLE_CONFIG)?;
        println!("Created korekto.toml");
    }

    let batch_path = std::path::Path::new("responses.toml");
    if batch_path.exists() {
        println!("responses.toml already exists, skipping.");
    } else {
        std::fs::write(batch_path, EXAMPLE_BATCH)?;
        println!("Created responses.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit korekto.toml with your scoring service URL and credentials");
    println!("  2. Run: korekto check-config");
    println!("  3. Run: korekto batch --input responses.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# korekto configuration

[service]
endpoint = "https://scoring.example.org/korekto"
timeout = 30
user = "${KOREKTO_USER}"
password = "${KOREKTO_PASSWORD}"
"#;

const EXAMPLE_BATCH: &str = r#"# Responses to score with `korekto batch --input responses.toml`

[[responses]]
item = "capital-of-france"
response = "Paris"

[[responses]]
item = "choice-interaction-1"
response = "ChoiceA"
base_type = "identifier"

# An entry without `response` is sent as a NULL (empty) answer.
[[responses]]
item = "essay-1"
"#;
