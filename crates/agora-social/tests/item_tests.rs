//! Single-item lookup against the in-memory effect system

use agora_core::{AgoraError, Audience, ContentId, UnknownVisibilityPolicy};
use agora_social::ItemLookup;
use agora_testkit::{test_time, test_user, PostBuilder, StoryBuilder, TestEffects};
use assert_matches::assert_matches;

#[tokio::test]
async fn test_public_item_needs_no_graph_reads() {
    let effects = TestEffects::new();
    let item = PostBuilder::new(test_user(1)).build();
    effects.seed(&item).await;

    let found = ItemLookup::default()
        .get_item(&effects, &item.id, &test_user(2))
        .await
        .unwrap();

    assert_eq!(found, item);
    assert_eq!(effects.counters().graph_reads(), 0);
}

#[tokio::test]
async fn test_followers_item_is_forbidden_to_non_follower() {
    let effects = TestEffects::new();
    let (author, viewer) = (test_user(1), test_user(2));
    let item = PostBuilder::new(author).audience(Audience::Followers).build();
    effects.seed(&item).await;
    let lookup = ItemLookup::default();

    assert_matches!(
        lookup.get_item(&effects, &item.id, &viewer).await,
        Err(AgoraError::Forbidden { .. })
    );

    effects.graph().follow(viewer, author).await;
    assert!(lookup.get_item(&effects, &item.id, &viewer).await.is_ok());
}

#[tokio::test]
async fn test_mutuals_item_needs_both_directions() {
    let effects = TestEffects::new();
    let (author, viewer) = (test_user(1), test_user(2));
    let item = PostBuilder::new(author).audience(Audience::Mutuals).build();
    effects.seed(&item).await;
    let lookup = ItemLookup::default();

    effects.graph().follow(viewer, author).await;
    assert_matches!(
        lookup.get_item(&effects, &item.id, &viewer).await,
        Err(AgoraError::Forbidden { .. })
    );

    effects.graph().follow(author, viewer).await;
    assert!(lookup.get_item(&effects, &item.id, &viewer).await.is_ok());
}

#[tokio::test]
async fn test_close_friends_item_reads_only_author_list() {
    let effects = TestEffects::new();
    let (author, viewer) = (test_user(1), test_user(2));
    effects.graph().set_close_friends(author, [viewer]).await;
    let item = PostBuilder::new(author)
        .audience(Audience::CloseFriends)
        .build();
    effects.seed(&item).await;

    assert!(ItemLookup::default()
        .get_item(&effects, &item.id, &viewer)
        .await
        .is_ok());
    assert_eq!(effects.counters().close_friend_reads(), 1);
    assert_eq!(effects.counters().following_reads(), 0);
}

#[tokio::test]
async fn test_custom_exclude_beats_allow() {
    let effects = TestEffects::new();
    let (author, viewer) = (test_user(1), test_user(2));
    let item = PostBuilder::new(author).custom([viewer], [viewer]).build();
    effects.seed(&item).await;

    assert_matches!(
        ItemLookup::default()
            .get_item(&effects, &item.id, &viewer)
            .await,
        Err(AgoraError::Forbidden { .. })
    );
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let effects = TestEffects::new();
    assert_matches!(
        ItemLookup::default()
            .get_item(&effects, &ContentId::new(), &test_user(1))
            .await,
        Err(AgoraError::NotFound { .. })
    );
}

#[tokio::test]
async fn test_malformed_item_is_validation_error() {
    let effects = TestEffects::new();
    let mut doc = PostBuilder::new(test_user(1)).document();
    doc.visibility = Some("everyone_but_bob".to_string());
    let id = doc.id;
    effects.seed_document(doc).await;

    assert_matches!(
        ItemLookup::default()
            .get_item(&effects, &id, &test_user(2))
            .await,
        Err(AgoraError::Validation { .. })
    );
    assert!(ItemLookup::new(UnknownVisibilityPolicy::TreatAsPublic)
        .get_item(&effects, &id, &test_user(2))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_expired_story_is_not_found_except_for_author() {
    let effects = TestEffects::new();
    let (author, viewer) = (test_user(1), test_user(2));
    let story = StoryBuilder::new(author)
        .created_at(test_time())
        .expires_at(test_time().plus_secs(60))
        .build();
    effects.seed(&story).await;
    let lookup = ItemLookup::default();

    assert!(lookup.get_item(&effects, &story.id, &viewer).await.is_ok());

    effects.clock().advance_secs(60);
    assert_matches!(
        lookup.get_item(&effects, &story.id, &viewer).await,
        Err(AgoraError::NotFound { .. })
    );
    assert_eq!(
        lookup.get_item(&effects, &story.id, &author).await.unwrap(),
        story
    );
}

#[tokio::test]
async fn test_graph_failure_is_not_treated_as_denial() {
    let effects = TestEffects::new();
    let item = PostBuilder::new(test_user(1))
        .audience(Audience::Followers)
        .build();
    effects.seed(&item).await;
    effects.fail_graph(true);

    let err = ItemLookup::default()
        .get_item(&effects, &item.id, &test_user(2))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}
