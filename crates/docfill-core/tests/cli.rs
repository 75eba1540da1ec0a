//! `docfill` binary against real files.

use docfill_document::DocxContainer;
use docfill_test_utils::{safe_template, DocxBuilder};
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn docfill(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docfill"))
        .args(args)
        .env("DOCFILL_LLM_API_KEY_ENV", "DOCFILL_CLI_TEST_KEY_NEVER_SET")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn docfill_with_input(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_docfill"))
        .args(args)
        .env("DOCFILL_LLM_API_KEY_ENV", "DOCFILL_CLI_TEST_KEY_NEVER_SET")
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn inspect_json_lists_fields() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("safe.docx");
    std::fs::write(&template, safe_template()).unwrap();

    let output = docfill(&["inspect", template.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["metadata"]["document_type"], "safe");
    let fields = report["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[2]["placeholder"], "purchase_amount");
    assert_eq!(fields[2]["type"], "currency");
}

#[test]
fn render_writes_filled_document() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("safe.docx");
    let values = dir.path().join("values.json");
    let out = dir.path().join("out.docx");
    std::fs::write(&template, safe_template()).unwrap();
    std::fs::write(
        &values,
        r#"{"company_name": "Acme Inc.", "investor_name": "John Doe", "purchase_amount": "$100,000"}"#,
    )
    .unwrap();

    let output = docfill(&[
        "render",
        template.to_str().unwrap(),
        "--values",
        values.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = DocxContainer::from_bytes(&std::fs::read(&out).unwrap())
        .unwrap()
        .extract_text()
        .unwrap();
    assert!(text.contains("Acme Inc."));
}

#[test]
fn render_with_missing_values_fails() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("safe.docx");
    let values = dir.path().join("values.json");
    std::fs::write(&template, safe_template()).unwrap();
    std::fs::write(&values, r#"{"company_name": "Acme Inc."}"#).unwrap();

    let output = docfill(&[
        "render",
        template.to_str().unwrap(),
        "--values",
        values.to_str().unwrap(),
        "--out",
        dir.path().join("out.docx").to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("investor_name"));
    assert!(!dir.path().join("out.docx").exists());
}

#[test]
fn fill_writes_confirmed_answers() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("safe.docx");
    let out = dir.path().join("out.docx");
    std::fs::write(&template, safe_template()).unwrap();

    let output = docfill_with_input(
        &["fill", template.to_str().unwrap(), "--out", out.to_str().unwrap()],
        "Acme Inc.\nJohn Doe\n$100,000\nconfirm\n",
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(out.exists());
}

#[test]
fn fill_refuses_answers_that_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("dated.docx");
    let out = dir.path().join("out.docx");
    let buffer = DocxBuilder::new()
        .paragraph("{company_name} dated {effective_date}")
        .build();
    std::fs::write(&template, buffer).unwrap();

    let output = docfill_with_input(
        &["fill", template.to_str().unwrap(), "--out", out.to_str().unwrap()],
        "Acme Inc.\nsometime in 2024\nconfirm\n",
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: effective_date"), "{stderr}");
    assert!(!out.exists());
}
