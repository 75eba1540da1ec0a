//! Upload-to-document flow through the session manager.

use docfill_ai::NoopLlm;
use docfill_core::prelude::*;
use docfill_core::{value_map, InMemorySessionStore, READY_MESSAGE};
use docfill_document::{generate, DocxContainer};
use docfill_test_utils::{safe_template, DocxBuilder};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn manager() -> SessionManager {
    SessionManager::new(
        DocfillConfig::default(),
        Arc::new(NoopLlm),
        Arc::new(InMemorySessionStore::new()),
    )
}

#[tokio::test]
async fn safe_template_is_filled_confirmed_and_generated() {
    let m = manager();
    let started = m.start_session(safe_template()).await.unwrap();
    let id = started.session_id;

    m.handle_message(&id, "Acme Inc.").await.unwrap();
    m.handle_message(&id, "John Doe").await.unwrap();
    let summary = m.handle_message(&id, "$100,000").await.unwrap();

    let session = m.session(&id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Review);
    assert!(summary.contains("- company name: Acme Inc."));
    assert!(summary.contains("- investor name: John Doe"));

    let reply = m.handle_message(&id, "confirm").await.unwrap();
    assert_eq!(reply, READY_MESSAGE);
    let session = m.session(&id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Complete);

    let first = m.export(&id, None).await.unwrap();
    assert!(!first.buffer.is_empty());
    let second = m.export(&id, None).await.unwrap();
    assert_eq!(first.metadata.checksum, second.metadata.checksum);

    let direct = generate(&safe_template(), &value_map(&session), &GenerateOptions::default()).unwrap();
    assert_eq!(direct.metadata.checksum, first.metadata.checksum);

    let text = DocxContainer::from_bytes(&first.buffer)
        .unwrap()
        .extract_text()
        .unwrap();
    assert!(text.contains("This SAFE is issued by Acme Inc. to John Doe."));
    assert!(text.contains("Purchase Amount: $100,000"));

    let audit = first.audit_log.unwrap();
    assert_eq!(audit.len(), 4);
}

#[tokio::test]
async fn rejected_answers_do_not_advance() {
    let m = manager();
    let id = m.start_session(safe_template()).await.unwrap().session_id;
    m.handle_message(&id, "Acme Inc.").await.unwrap();
    m.handle_message(&id, "John Doe").await.unwrap();

    let before = m.session(&id).await.unwrap();
    let reply = m.handle_message(&id, "0").await.unwrap();
    let after = m.session(&id).await.unwrap();

    assert!(reply.contains("greater than zero"));
    assert_eq!(after.active_index, before.active_index);
    assert_eq!(after.filled.len(), before.filled.len());

    m.handle_message(&id, "100000").await.unwrap();
    let after = m.session(&id).await.unwrap();
    assert_eq!(after.filled.len(), before.filled.len() + 1);
    assert_eq!(after.status, SessionStatus::Review);
}

#[tokio::test]
async fn sessions_are_independent() {
    let m = manager();
    let a = m.start_session(safe_template()).await.unwrap().session_id;
    let b = m.start_session(safe_template()).await.unwrap().session_id;

    let (ra, rb) = tokio::join!(m.handle_message(&a, "Acme Inc."), m.handle_message(&b, "Beta LLC"));
    ra.unwrap();
    rb.unwrap();

    let a = m.session(&a).await.unwrap();
    let b = m.session(&b).await.unwrap();
    assert_eq!(a.filled.get("company_name"), Some("Acme Inc."));
    assert_eq!(b.filled.get("company_name"), Some("Beta LLC"));
}

#[tokio::test]
async fn ended_sessions_are_gone() {
    let m = manager();
    let id = m.start_session(safe_template()).await.unwrap().session_id;
    assert!(m.end_session(&id).await);

    let err = m.handle_message(&id, "Acme Inc.").await.unwrap_err();
    assert_eq!(err.code(), "SESSION_NOT_FOUND");
    assert!(!err.is_user_recoverable());
}

#[tokio::test]
async fn merged_label_variants_are_all_filled() {
    let template = DocxBuilder::new()
        .paragraph("[Investor Name] agrees. Signed: [investor name]")
        .build();
    let m = manager();
    let started = m.start_session(template).await.unwrap();
    let labels: Vec<&str> = started.fields.iter().map(|f| f.placeholder.as_str()).collect();
    assert_eq!(labels, vec!["Investor Name"]);

    let id = started.session_id;
    m.handle_message(&id, "Jane Roe").await.unwrap();
    assert_eq!(m.handle_message(&id, "confirm").await.unwrap(), READY_MESSAGE);

    let document = m.export(&id, None).await.unwrap();
    let text = DocxContainer::from_bytes(&document.buffer)
        .unwrap()
        .extract_text()
        .unwrap();
    assert_eq!(text, "Jane Roe agrees. Signed: Jane Roe");
}
