use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Result};

#[test]
fn test_cli_replays_the_sample_session() -> Result<()> {
    let binary_path = env!("CARGO_BIN_EXE_pocketbank");
    let sample_path = Path::new("samples").join("sample.csv");

    let output = Command::new(binary_path).arg(sample_path).output()?;

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let mut lines = stdout.lines();

    assert_eq!(lines.next(), Some("user,balance,transactions,notifications"));

    let mut results = HashMap::new();

    for line in lines {
        let fields: Vec<&str> = line.split(',').collect();

        assert_eq!(fields.len(), 4);

        results.insert(
            fields[0].to_string(),
            (fields[1].to_string(), fields[2].to_string(), fields[3].to_string()),
        );
    }

    let alice = results
        .get("11111111-1111-4111-8111-111111111111")
        .ok_or_else(|| anyhow!("first account missing from summary"))?;

    assert_eq!(alice.0, "1100.00");
    assert_eq!(alice.1, "3");
    assert_eq!(alice.2, "3");

    let bob = results
        .get("22222222-2222-4222-8222-222222222222")
        .ok_or_else(|| anyhow!("second account missing from summary"))?;

    assert_eq!(bob.0, "1050.00");
    assert_eq!(bob.1, "1");
    assert_eq!(bob.2, "1");

    Ok(())
}

#[test]
fn test_cli_requires_an_input_path() -> Result<()> {
    let binary_path = env!("CARGO_BIN_EXE_pocketbank");

    let output = Command::new(binary_path).output()?;

    assert!(!output.status.success());

    Ok(())
}
