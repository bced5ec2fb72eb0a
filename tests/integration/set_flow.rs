//! Status application through the CLI route against a stub Slack Web API

use crate::integration::test_utils::{write_store, StubSlack};
use slack_status::cli::{Commands, RunContext, SetArgs};
use slack_status::error::ApiError;
use slack_status::store::WorkspaceCredential;
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

fn three_workspaces() -> Vec<WorkspaceCredential> {
    vec![
        WorkspaceCredential::new("w1", Some("U1".to_string()), "t1").with_groups(["eng"]),
        WorkspaceCredential::new("w2", Some("U2".to_string()), "t2").with_groups(["ops"]),
        WorkspaceCredential::new("w3", None, "t3").with_groups(["eng", "ops"]),
    ]
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

#[test]
fn group_filter_applies_only_to_members() {
    let dir = TempDir::new().unwrap();
    let stub = StubSlack::start();
    let store = write_store(
        dir.path(),
        vec![
            WorkspaceCredential::new("W1", None, "t1").with_groups(["eng"]),
            WorkspaceCredential::new("W2", None, "t2").with_groups(["ops"]),
        ],
    );
    let ctx = RunContext::with_config(stub.app_config(), &store);

    let out = ctx
        .execute(&Commands::Set(SetArgs {
            message: "Lunch".to_string(),
            group: Some("eng".to_string()),
            ..SetArgs::default()
        }))
        .unwrap();

    assert_eq!(out, "Successfully applied status to 1 workspace(s)");
    assert_eq!(stub.tokens_contacted(), vec!["t1"]);
    let methods: Vec<String> = stub.calls().into_iter().map(|c| c.method).collect();
    assert_eq!(
        methods,
        vec!["users.setPresence", "users.profile.set", "dnd.setSnooze"]
    );
}

#[test]
fn empty_message_clears_status_and_still_uploads_picture() {
    let dir = TempDir::new().unwrap();
    let picture = dir.path().join("me.png");
    std::fs::write(&picture, b"\x89PNG\r\n\x1a\nfake").unwrap();
    let stub = StubSlack::start();
    let store = write_store(dir.path(), three_workspaces());
    let ctx = RunContext::with_config(stub.app_config(), &store);

    ctx.execute(&Commands::Set(SetArgs {
        workspace: Some("w2".to_string()),
        profile_pic: Some(picture),
        ..SetArgs::default()
    }))
    .unwrap();

    let calls = stub.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|c| c.token() == Some("t2")));

    assert_eq!(calls[0].method, "users.setPresence");
    assert_eq!(calls[0].body, "presence=auto");

    assert_eq!(calls[1].method, "users.profile.set");
    let profile: serde_json::Value = serde_json::from_str(&calls[1].body).unwrap();
    assert_eq!(profile["profile"]["status_text"], "");
    assert_eq!(profile["profile"]["status_emoji"], "");
    assert_eq!(profile["profile"]["status_expiration"], 0);

    assert_eq!(calls[2].method, "dnd.setSnooze");
    assert_eq!(calls[2].body, "num_minutes=0");

    assert_eq!(calls[3].method, "users.setPhoto");
    assert!(calls[3].body.contains("name=\"image\""));
    assert!(calls[3].body.contains("filename=\"me.png\""));
}

#[test]
fn ninety_minutes_with_dnd_snoozes_and_expires() {
    let dir = TempDir::new().unwrap();
    let stub = StubSlack::start();
    let store = write_store(dir.path(), three_workspaces());
    let ctx = RunContext::with_config(stub.app_config(), &store);

    let before = now_epoch();
    ctx.execute(&Commands::Set(SetArgs {
        message: "Deep work".to_string(),
        emoji: ":headphones:".to_string(),
        duration: Some("90m".to_string()),
        dnd: true,
        away: true,
        workspace: Some("w1".to_string()),
        ..SetArgs::default()
    }))
    .unwrap();
    let after = now_epoch();

    let calls = stub.calls();
    assert_eq!(calls[0].body, "presence=away");

    let profile: serde_json::Value = serde_json::from_str(&calls[1].body).unwrap();
    assert_eq!(profile["profile"]["status_text"], "Deep work");
    assert_eq!(profile["profile"]["status_emoji"], ":headphones:");
    let expiry = profile["profile"]["status_expiration"].as_i64().unwrap();
    assert!(expiry >= before + 90 * 60 && expiry <= after + 90 * 60);

    assert_eq!(calls[2].body, "num_minutes=90");
}

#[test]
fn failure_stops_run_and_reports_applied_count() {
    let dir = TempDir::new().unwrap();
    let stub = StubSlack::start();
    stub.fail("t2", "users.profile.set", "invalid_auth");
    let store = write_store(dir.path(), three_workspaces());
    let ctx = RunContext::with_config(stub.app_config(), &store);

    let err = ctx
        .execute(&Commands::Set(SetArgs {
            message: "Travelling".to_string(),
            ..SetArgs::default()
        }))
        .unwrap_err();

    match &err {
        ApiError::ApplyFailed(apply) => {
            assert_eq!(apply.applied, 1);
            assert_eq!(apply.failure.workspace, "w2");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.to_string().contains("w2"));
    assert_eq!(stub.tokens_contacted(), vec!["t1", "t2"]);
}

#[test]
fn invalid_input_fails_before_any_call() {
    let dir = TempDir::new().unwrap();
    let stub = StubSlack::start();
    let store = write_store(dir.path(), three_workspaces());
    let ctx = RunContext::with_config(stub.app_config(), &store);

    let dnd_without_duration = SetArgs {
        dnd: true,
        ..SetArgs::default()
    };
    assert!(matches!(
        ctx.execute(&Commands::Set(dnd_without_duration)),
        Err(ApiError::InvalidInput(_))
    ));

    let short = SetArgs {
        duration: Some("30s".to_string()),
        ..SetArgs::default()
    };
    assert!(matches!(
        ctx.execute(&Commands::Set(short)),
        Err(ApiError::InvalidInput(_))
    ));

    let bad_picture = SetArgs {
        profile_pic: Some(dir.path().join("me.bmp")),
        ..SetArgs::default()
    };
    assert!(ctx.execute(&Commands::Set(bad_picture)).is_err());

    assert!(stub.calls().is_empty());
}

#[test]
fn missing_store_is_an_error_without_calls() {
    let dir = TempDir::new().unwrap();
    let stub = StubSlack::start();
    let ctx = RunContext::with_config(stub.app_config(), &dir.path().join("absent"));

    let err = ctx.execute(&Commands::Set(SetArgs::default())).unwrap_err();
    assert!(matches!(err, ApiError::StoreError(ref e) if e.is_not_found()));
    assert!(stub.calls().is_empty());
}

#[test]
fn store_with_empty_token_fails_closed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.toml");
    std::fs::write(
        &path,
        r#"
version = 1

[[workspaces]]
name = "good"
accessToken = "t1"
groups = []

[[workspaces]]
name = "bad"
accessToken = ""
groups = []
"#,
    )
    .unwrap();
    let stub = StubSlack::start();
    let ctx = RunContext::with_config(stub.app_config(), &path);

    assert!(ctx.execute(&Commands::Set(SetArgs::default())).is_err());
    assert!(stub.calls().is_empty());
}

#[test]
fn workspaces_listing_never_prints_tokens() {
    let dir = TempDir::new().unwrap();
    let store = write_store(
        dir.path(),
        vec![
            WorkspaceCredential::new("acme", Some("U1".to_string()), "xoxp-secret-1")
                .with_groups(["eng", "ops"]),
            WorkspaceCredential::new("globex", None, "xoxp-secret-2"),
        ],
    );
    let ctx = RunContext::with_config(Default::default(), &store);

    let out = ctx.execute(&Commands::Workspaces).unwrap();
    assert!(out.contains("acme"));
    assert!(out.contains("globex"));
    assert!(out.contains("eng, ops"));
    assert!(!out.contains("xoxp-secret"));
}
