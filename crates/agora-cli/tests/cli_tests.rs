//! End-to-end handler tests over a dataset file in a temp directory

use agora_cli::{Cli, CliContext, CliHandler};
use agora_core::{ContentDocument, ContentId, ContentKind, PhysicalTime, UserId};
use agora_effects::{Dataset, UserRecord};
use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NOW_MS: u64 = 1_700_000_000_000;

fn user(seed: u8) -> UserId {
    UserId::new_from_entropy([seed; 32])
}

fn document(seed: u8, kind: ContentKind, author: UserId, visibility: &str) -> ContentDocument {
    ContentDocument {
        id: ContentId::from_bytes([seed; 32]),
        kind,
        author_id: author,
        created_at: PhysicalTime::from_millis(NOW_MS - u64::from(seed) * 1_000),
        visibility: Some(visibility.to_string()),
        allow_list: Vec::new(),
        exclude_list: Vec::new(),
        audience_ids: Vec::new(),
        expires_at: (kind == ContentKind::Story)
            .then(|| PhysicalTime::from_millis(NOW_MS + 60_000)),
        viewers: Vec::new(),
        view_count: 0,
        reactions: Vec::new(),
        archived: false,
        highlighted: false,
    }
}

/// Dataset: user 1 follows user 2; user 2 has a followers-only post and a
/// public story; user 3 has a followers-only post nobody can see.
fn write_dataset(dir: &Path) -> PathBuf {
    let dataset = Dataset {
        users: vec![
            UserRecord {
                id: user(1),
                following: vec![user(2)],
                close_friends: Vec::new(),
            },
            UserRecord {
                id: user(2),
                following: Vec::new(),
                close_friends: Vec::new(),
            },
        ],
        items: vec![
            document(1, ContentKind::Post, user(2), "followers"),
            document(2, ContentKind::Story, user(2), "all"),
            document(3, ContentKind::Post, user(3), "followers"),
        ],
        ..Dataset::default()
    };
    let path = dir.join("dataset.json");
    dataset.save(&path).unwrap();
    path
}

async fn run_at(dir: &Path, now_ms: u64, args: &[String]) -> anyhow::Result<serde_json::Value> {
    let mut argv = vec![
        "agora".to_string(),
        "--config".to_string(),
        dir.join("agora.toml").display().to_string(),
        "--data".to_string(),
        dir.join("dataset.json").display().to_string(),
        "--now-ms".to_string(),
        now_ms.to_string(),
    ];
    argv.extend(args.iter().cloned());
    let cli = Cli::try_parse_from(argv)?;
    let context = CliContext::load(&cli.config, &cli.data, cli.now_ms).await?;
    CliHandler::new(context).handle(&cli.command).await
}

async fn run(dir: &Path, args: &[String]) -> anyhow::Result<serde_json::Value> {
    run_at(dir, NOW_MS, args).await
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_feed_shows_only_visible_items() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());

    let output = run(dir.path(), &args(&["feed", "--viewer", &user(1).to_string()]))
        .await
        .unwrap();

    let items = output["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(output["next"].is_null());
    assert_eq!(output["examined"], 3);
}

#[tokio::test]
async fn test_unreadable_item_does_not_block_commands() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(dir.path());
    let mut dataset = Dataset::load(&data).unwrap();
    dataset.unreadable.push(serde_json::json!({
        "id": ContentId::from_bytes([9u8; 32]).0.to_string(),
        "visibility": "public"
    }));
    dataset.save(&data).unwrap();

    let output = run(dir.path(), &args(&["feed", "--viewer", &user(1).to_string()]))
        .await
        .unwrap();
    assert_eq!(output["items"].as_array().unwrap().len(), 2);

    let story = ContentId::from_bytes([2u8; 32]).to_string();
    run(
        dir.path(),
        &args(&["story", "view", "--viewer", &user(1).to_string(), &story]),
    )
    .await
    .unwrap();

    let stored = Dataset::load(&data).unwrap();
    assert_eq!(stored.items.len(), 3);
    assert_eq!(stored.unreadable, dataset.unreadable);
}

#[tokio::test]
async fn test_item_forbidden_surfaces_as_error() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let hidden = ContentId::from_bytes([3u8; 32]).to_string();

    let err = run(
        dir.path(),
        &args(&["item", "--viewer", &user(1).to_string(), &hidden]),
    )
    .await
    .unwrap_err();

    let core = err.downcast_ref::<agora_core::AgoraError>().unwrap();
    assert!(matches!(core, agora_core::AgoraError::Forbidden { .. }));
}

#[tokio::test]
async fn test_story_view_is_persisted() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(dir.path());
    let story = ContentId::from_bytes([2u8; 32]).to_string();
    let view = args(&["story", "view", "--viewer", &user(1).to_string(), &story]);

    let first = run(dir.path(), &view).await.unwrap();
    assert_eq!(first["recorded"]["view_count"], 1);
    let second = run(dir.path(), &view).await.unwrap();
    assert_eq!(second["already_recorded"]["view_count"], 1);

    let stored = Dataset::load(&data).unwrap();
    let doc = stored
        .items
        .iter()
        .find(|doc| doc.id == ContentId::from_bytes([2u8; 32]))
        .unwrap();
    assert_eq!(doc.viewers, vec![user(1)]);

    let viewers = run(
        dir.path(),
        &args(&["story", "viewers", "--requester", &user(2).to_string(), &story]),
    )
    .await
    .unwrap();
    assert_eq!(viewers["count"], 1);
}

#[tokio::test]
async fn test_now_override_expires_story() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let story = ContentId::from_bytes([2u8; 32]).to_string();

    let err = run_at(
        dir.path(),
        NOW_MS + 120_000,
        &args(&["item", "--viewer", &user(1).to_string(), &story]),
    )
    .await
    .unwrap_err();
    let core = err.downcast_ref::<agora_core::AgoraError>().unwrap();
    assert!(matches!(core, agora_core::AgoraError::NotFound { .. }));
}

#[tokio::test]
async fn test_config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    std::fs::write(
        dir.path().join("agora.toml"),
        "[feed]\nmax_page_size = 1\ndefault_page_size = 1\n",
    )
    .unwrap();

    let err = run(
        dir.path(),
        &args(&["feed", "--viewer", &user(1).to_string(), "--page-size", "2"]),
    )
    .await
    .unwrap_err();
    let core = err.downcast_ref::<agora_core::AgoraError>().unwrap();
    assert!(matches!(core, agora_core::AgoraError::Validation { .. }));
}
