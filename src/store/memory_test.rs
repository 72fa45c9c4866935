use super::*;
use crate::models::{NewTool, Tool};
use crate::record::now;

fn tool(id: i64, name: &str) -> Tool {
    Tool {
        id,
        name: name.into(),
        description: String::new(),
        category: "bidding".into(),
        url: String::new(),
        icon: None,
        tags: vec![],
        likes: 0,
        dislikes: 0,
        votes: Vec::new(),
    }
}

fn builder(name: &str) -> Builder<Tool> {
    let draft = NewTool {
        name: name.into(),
        description: String::new(),
        category: String::new(),
        url: String::new(),
        icon: None,
        tags: vec![],
    };
    Box::new(move |id| Tool::from_draft(id, now(), draft))
}

#[test]
fn allocate_id_starts_at_one() {
    let mut store = CollectionStore::<Tool>::new();
    assert_eq!(store.allocate_id(), 1);
    assert_eq!(store.allocate_id(), 2);
}

#[test]
fn allocate_id_follows_fixture_max() {
    let mut store = CollectionStore::seeded(vec![tool(4, "a"), tool(9, "b")]).unwrap();
    assert_eq!(store.allocate_id(), 10);
}

#[test]
fn seeded_rejects_duplicate_ids() {
    let err = CollectionStore::seeded(vec![tool(1, "a"), tool(1, "b")]).unwrap_err();
    assert!(matches!(err, FixtureError::DuplicateId { collection: "tools", id: 1 }));
}

#[tokio::test]
async fn ids_never_reused_after_deleting_max() {
    let repo = MemoryRepository::<Tool>::seeded(vec![]).unwrap();
    let first = repo.insert(builder("a")).await.unwrap();
    let second = repo.insert(builder("b")).await.unwrap();
    assert_eq!((first.id, second.id), (1, 2));

    repo.remove(second.id).await.unwrap();
    let third = repo.insert(builder("c")).await.unwrap();
    assert_eq!(third.id, 3);
}

#[tokio::test]
async fn rejected_build_does_not_consume_id() {
    let repo = MemoryRepository::<Tool>::seeded(vec![]).unwrap();
    let err = repo.insert(builder("  ")).await;
    assert!(err.is_err());
    let ok = repo.insert(builder("Semrush")).await.unwrap();
    assert_eq!(ok.id, 1);
    assert_eq!(repo.all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_mutation_leaves_record_untouched() {
    let repo = MemoryRepository::seeded(vec![tool(1, "Optmyzr")]).unwrap();
    let result = repo
        .mutate(
            1,
            Box::new(|t: &mut Tool| {
                t.name = "changed".into();
                Err(ServiceError::validation("nope"))
            }),
        )
        .await;
    assert!(result.is_err());
    assert_eq!(repo.get(1).await.unwrap().unwrap().name, "Optmyzr");
}

#[tokio::test]
async fn mutate_missing_returns_none() {
    let repo = MemoryRepository::<Tool>::seeded(vec![]).unwrap();
    let result = repo.mutate(5, Box::new(|_| Ok(()))).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn all_returns_id_order_copies() {
    let repo = MemoryRepository::seeded(vec![tool(3, "c"), tool(1, "a")]).unwrap();
    let mut all = repo.all().await.unwrap();
    assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);

    all[0].name = "local edit".into();
    assert_eq!(repo.get(1).await.unwrap().unwrap().name, "a");
}

#[tokio::test]
async fn concurrent_inserts_get_distinct_ids() {
    let repo = std::sync::Arc::new(MemoryRepository::<Tool>::seeded(vec![]).unwrap());
    let mut handles = Vec::new();
    for n in 0..16 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move { repo.insert(builder(&format!("tool-{n}"))).await.unwrap().id }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=16).collect::<Vec<_>>());
}
