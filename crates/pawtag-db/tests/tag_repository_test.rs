//! Integration tests for the Tag repository using in-memory SurrealDB.

use pawtag_core::error::PawtagError;
use pawtag_core::models::tag::{CreateTag, TagStatus, UpdateTag};
use pawtag_core::repository::{Pagination, TagRepository};
use pawtag_db::repository::SurrealTagRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> SurrealTagRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    pawtag_db::run_migrations(&db).await.unwrap();
    SurrealTagRepository::new(db)
}

#[tokio::test]
async fn create_and_get_tag() {
    let repo = setup().await;

    let tag = repo
        .create(CreateTag {
            code: "a1b2c3".into(),
            notes: Some("batch 7".into()),
        })
        .await
        .unwrap();

    assert_eq!(tag.code, "a1b2c3");
    assert_eq!(tag.status, TagStatus::Unassigned);
    assert!(tag.owner_id.is_none());
    assert!(tag.pet_id.is_none());
    assert!(tag.activated_at.is_none());
    assert!(!tag.is_active());
    assert!(!tag.is_claimed());

    let fetched = repo.get_by_id(tag.id).await.unwrap();
    assert_eq!(fetched.id, tag.id);
    assert_eq!(fetched.code, "a1b2c3");

    let by_code = repo.get_by_code("a1b2c3").await.unwrap();
    assert_eq!(by_code.id, tag.id);
}

#[tokio::test]
async fn get_by_code_unknown_is_not_found() {
    let repo = setup().await;

    let err = repo.get_by_code("zzzzzz").await.unwrap_err();
    assert!(matches!(err, PawtagError::NotFound { .. }));
}

#[tokio::test]
async fn duplicate_code_is_rejected() {
    let repo = setup().await;

    repo.create(CreateTag {
        code: "dup123".into(),
        notes: None,
    })
    .await
    .unwrap();

    let err = repo
        .create(CreateTag {
            code: "dup123".into(),
            notes: None,
        })
        .await
        .unwrap_err();

    // A refused write is a query failure, not a migration problem.
    assert!(matches!(err, PawtagError::Database(_)));
    assert!(
        !err.to_string().contains("Migration"),
        "CRUD failures must not surface as migration errors, got: {err}"
    );
}

#[tokio::test]
async fn claim_sets_owner_status_and_activation() {
    let repo = setup().await;
    let tag = repo
        .create(CreateTag {
            code: "cl4imx".into(),
            notes: None,
        })
        .await
        .unwrap();
    let user = Uuid::new_v4();

    let claimed = repo.claim(tag.id, user).await.unwrap().unwrap();

    assert_eq!(claimed.owner_id, Some(user));
    assert_eq!(claimed.status, TagStatus::Active);
    assert!(claimed.activated_at.is_some());
    assert!(claimed.is_active());
}

#[tokio::test]
async fn claim_of_owned_tag_is_refused_without_write() {
    let repo = setup().await;
    let tag = repo
        .create(CreateTag {
            code: "own3dx".into(),
            notes: None,
        })
        .await
        .unwrap();

    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    repo.claim(tag.id, first).await.unwrap().unwrap();
    let refused = repo.claim(tag.id, second).await.unwrap();
    assert!(refused.is_none());

    let current = repo.get_by_id(tag.id).await.unwrap();
    assert_eq!(current.owner_id, Some(first), "owner must be unchanged");
}

#[tokio::test]
async fn claim_of_inactive_tag_is_refused_without_write() {
    let repo = setup().await;
    let tag = repo
        .create(CreateTag {
            code: "in4ctv".into(),
            notes: None,
        })
        .await
        .unwrap();
    repo.update(
        tag.id,
        UpdateTag {
            status: Some(TagStatus::Inactive),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let refused = repo.claim(tag.id, Uuid::new_v4()).await.unwrap();
    assert!(refused.is_none());

    let current = repo.get_by_id(tag.id).await.unwrap();
    assert!(current.owner_id.is_none());
    assert!(current.activated_at.is_none());
    assert_eq!(current.status, TagStatus::Inactive);
}

#[tokio::test]
async fn concurrent_claims_have_exactly_one_winner() {
    let repo = setup().await;
    let tag = repo
        .create(CreateTag {
            code: "r4cex1".into(),
            notes: None,
        })
        .await
        .unwrap();

    let u1 = Uuid::new_v4();
    let u2 = Uuid::new_v4();

    let (a, b) = tokio::join!(repo.claim(tag.id, u1), repo.claim(tag.id, u2));
    let a = a.unwrap();
    let b = b.unwrap();

    assert!(
        a.is_some() ^ b.is_some(),
        "exactly one concurrent claim must win"
    );

    let winner = if a.is_some() { u1 } else { u2 };
    let current = repo.get_by_id(tag.id).await.unwrap();
    assert_eq!(current.owner_id, Some(winner));
}

#[tokio::test]
async fn link_requires_matching_owner() {
    let repo = setup().await;
    let tag = repo
        .create(CreateTag {
            code: "l1nkme".into(),
            notes: None,
        })
        .await
        .unwrap();
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let pet = Uuid::new_v4();

    repo.claim(tag.id, owner).await.unwrap().unwrap();

    // Non-owner link is refused and writes nothing.
    let refused = repo.link(tag.id, stranger, pet).await.unwrap();
    assert!(refused.is_none());
    assert!(repo.get_by_id(tag.id).await.unwrap().pet_id.is_none());

    // Owner link lands.
    let linked = repo.link(tag.id, owner, pet).await.unwrap().unwrap();
    assert_eq!(linked.pet_id, Some(pet));
}

#[tokio::test]
async fn relink_overwrites_previous_pet() {
    let repo = setup().await;
    let tag = repo
        .create(CreateTag {
            code: "rel1nk".into(),
            notes: None,
        })
        .await
        .unwrap();
    let owner = Uuid::new_v4();
    let first_pet = Uuid::new_v4();
    let second_pet = Uuid::new_v4();

    repo.claim(tag.id, owner).await.unwrap().unwrap();
    repo.link(tag.id, owner, first_pet).await.unwrap().unwrap();
    let relinked = repo.link(tag.id, owner, second_pet).await.unwrap().unwrap();

    assert_eq!(relinked.pet_id, Some(second_pet));
}

#[tokio::test]
async fn release_reverts_to_unassigned() {
    let repo = setup().await;
    let tag = repo
        .create(CreateTag {
            code: "rel3as".into(),
            notes: None,
        })
        .await
        .unwrap();
    let owner = Uuid::new_v4();

    repo.claim(tag.id, owner).await.unwrap().unwrap();
    repo.link(tag.id, owner, Uuid::new_v4()).await.unwrap().unwrap();

    let released = repo.release(tag.id).await.unwrap();
    assert_eq!(released.status, TagStatus::Unassigned);
    assert!(released.owner_id.is_none());
    assert!(released.pet_id.is_none());
    assert!(released.activated_at.is_none());

    // A released tag is claimable again.
    let reclaimed = repo.claim(tag.id, Uuid::new_v4()).await.unwrap();
    assert!(reclaimed.is_some());
}

#[tokio::test]
async fn update_changes_status_and_notes() {
    let repo = setup().await;
    let tag = repo
        .create(CreateTag {
            code: "upd4te".into(),
            notes: None,
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            tag.id,
            UpdateTag {
                status: Some(TagStatus::Inactive),
                notes: Some("lost in shipping".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, TagStatus::Inactive);
    assert_eq!(updated.notes.as_deref(), Some("lost in shipping"));
}

#[tokio::test]
async fn delete_removes_tag() {
    let repo = setup().await;
    let tag = repo
        .create(CreateTag {
            code: "del3te".into(),
            notes: None,
        })
        .await
        .unwrap();

    repo.delete(tag.id).await.unwrap();

    let err = repo.get_by_id(tag.id).await.unwrap_err();
    assert!(matches!(err, PawtagError::NotFound { .. }));
}

#[tokio::test]
async fn list_paginates_in_creation_order() {
    let repo = setup().await;
    for i in 0..5 {
        repo.create(CreateTag {
            code: format!("list{i}x"),
            notes: None,
        })
        .await
        .unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 3);

    let rest = repo
        .list(Pagination {
            offset: 3,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 2);
}
