//! Behaviour of the hierarchy manager over the in-memory record store.

use std::sync::Arc;

use assert_matches::assert_matches;
use tapeshelf_core::error::CoreError;
use tapeshelf_core::types::{new_id, now, EntityId};
use tapeshelf_core::validation::ValidationError;
use tapeshelf_db::models::cabinet::{Cabinet, CreateCabinet};
use tapeshelf_db::models::cassette::{Cassette, CassetteSearch, CreateCassette, UpdateCassette};
use tapeshelf_db::{MemoryRecordStore, RecordStore, StoreTx};
use tapeshelf_hierarchy::HierarchyManager;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn manager() -> HierarchyManager {
    HierarchyManager::new(Arc::new(MemoryRecordStore::new()))
}

async fn cabinet(mgr: &HierarchyManager, letter: &str) -> EntityId {
    mgr.create_cabinet(&CreateCabinet {
        letter: letter.to_string(),
    })
    .await
    .unwrap()
    .id
}

fn cassette_in(cabinet_id: EntityId, shelf: i32, title: &str) -> CreateCassette {
    CreateCassette {
        cabinet_id: Some(cabinet_id),
        cabinet_letter: None,
        shelf,
        movie_title_en: title.to_string(),
        release_year: 2010,
        director: None,
    }
}

fn inception(cabinet_id: EntityId) -> CreateCassette {
    CreateCassette {
        director: Some("Christopher Nolan".to_string()),
        ..cassette_in(cabinet_id, 2, "Inception")
    }
}

fn replacement(cabinet_id: EntityId, shelf: i32, title: &str) -> UpdateCassette {
    UpdateCassette {
        cabinet_id,
        shelf,
        movie_title_en: title.to_string(),
        release_year: 1995,
        director: Some("Michael Mann".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Cabinets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_cabinet_reports_four_empty_shelves() {
    let mgr = manager();
    for letter in ["a", "M", "z"] {
        let summary = mgr
            .create_cabinet(&CreateCabinet {
                letter: letter.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(summary.letter, letter.to_uppercase());
        assert_eq!(summary.shelves.len(), 4);
        assert!(summary.shelves.iter().all(|s| s.cassette_count == 0));
    }
}

#[tokio::test]
async fn create_cabinet_rejects_bad_letters() {
    let mgr = manager();
    for bad in ["", "AB", "7"] {
        let err = mgr
            .create_cabinet(&CreateCabinet {
                letter: bad.to_string(),
            })
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(ValidationError::InvalidLetter(_)));
    }
    assert!(mgr.list_cabinets().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_cabinets_groups_cassettes_by_shelf() {
    let mgr = manager();
    let a = cabinet(&mgr, "A").await;
    let b = cabinet(&mgr, "B").await;
    let heat = mgr.add_cassette(&cassette_in(a, 1, "Heat")).await.unwrap();
    let ronin = mgr.add_cassette(&cassette_in(a, 1, "Ronin")).await.unwrap();
    let alien = mgr.add_cassette(&cassette_in(b, 4, "Alien")).await.unwrap();

    let all = mgr.list_cabinets().await.unwrap();
    assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![a, b]);
    assert_eq!(all[0].shelf(1).unwrap().cassette_ids, vec![heat.id, ronin.id]);
    assert_eq!(all[0].shelf(1).unwrap().cassette_count, 2);
    assert_eq!(all[1].shelf(4).unwrap().cassette_ids, vec![alien.id]);
    assert_eq!(all[1].shelf(1).unwrap().cassette_count, 0);
}

#[tokio::test]
async fn get_cabinet_unknown_id_is_not_found() {
    let mgr = manager();
    let missing = new_id();
    assert_matches!(
        mgr.get_cabinet(missing).await,
        Err(CoreError::NotFound { entity: "Cabinet", id }) if id == missing
    );
}

#[tokio::test]
async fn cabinets_by_letter_returns_every_match() {
    let mgr = manager();
    let first = cabinet(&mgr, "C").await;
    cabinet(&mgr, "D").await;
    let second = cabinet(&mgr, "c").await;

    let found = mgr.get_cabinets_by_letter("c").await.unwrap();
    assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first, second]);

    assert_matches!(
        mgr.get_cabinets_by_letter("Q").await,
        Err(CoreError::LetterNotFound { letter: 'Q' })
    );
    assert_matches!(
        mgr.get_cabinets_by_letter("QQ").await,
        Err(CoreError::Validation(_))
    );
}

#[tokio::test]
async fn delete_non_empty_cabinet_conflicts_until_emptied() {
    let mgr = manager();
    let id = cabinet(&mgr, "A").await;
    let tape = mgr.add_cassette(&cassette_in(id, 3, "Heat")).await.unwrap();

    assert_matches!(mgr.delete_cabinet(id).await, Err(CoreError::Conflict(_)));
    assert!(mgr.get_cabinet(id).await.is_ok());

    mgr.delete_cassette(tape.id).await.unwrap();
    let deleted = mgr.delete_cabinet(id).await.unwrap();
    assert_eq!(deleted.id, id);

    assert_matches!(mgr.get_cabinet(id).await, Err(CoreError::NotFound { .. }));
    assert_matches!(mgr.delete_cabinet(id).await, Err(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Cassettes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_then_get_returns_identical_record() {
    let mgr = manager();
    let id = cabinet(&mgr, "A").await;
    let added = mgr.add_cassette(&inception(id)).await.unwrap();

    let fetched = mgr.get_cassette(added.id).await.unwrap();
    assert_eq!(fetched, added);
    assert_eq!(fetched.cabinet_id, id);
    assert_eq!(fetched.shelf, 2);
    assert_eq!(fetched.movie_title_en, "Inception");
    assert_eq!(fetched.release_year, 2010);
    assert_eq!(fetched.director.as_deref(), Some("Christopher Nolan"));
}

#[tokio::test]
async fn add_by_letter_binds_first_matching_cabinet() {
    let mgr = manager();
    let first = cabinet(&mgr, "K").await;
    cabinet(&mgr, "K").await;

    let added = mgr
        .add_cassette(&CreateCassette {
            cabinet_id: None,
            cabinet_letter: Some("k".to_string()),
            ..cassette_in(new_id(), 1, "Fargo")
        })
        .await
        .unwrap();
    assert_eq!(added.cabinet_id, first);
}

#[tokio::test]
async fn add_by_letter_without_cabinet_is_precondition_failure() {
    let mgr = manager();
    let err = mgr
        .add_cassette(&CreateCassette {
            cabinet_id: None,
            cabinet_letter: Some("B".to_string()),
            ..cassette_in(new_id(), 1, "Fargo")
        })
        .await
        .unwrap_err();
    assert_matches!(
        err,
        CoreError::PreconditionFailed(msg) if msg.contains("create a cabinet first")
    );
}

#[tokio::test]
async fn add_without_parent_is_bad_request() {
    let mgr = manager();
    let err = mgr
        .add_cassette(&CreateCassette {
            cabinet_id: None,
            cabinet_letter: None,
            ..cassette_in(new_id(), 1, "Fargo")
        })
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::BadRequest(_));
}

#[tokio::test]
async fn add_to_unknown_cabinet_is_not_found() {
    let mgr = manager();
    let err = mgr
        .add_cassette(&cassette_in(new_id(), 1, "Fargo"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Cabinet", .. });
}

#[tokio::test]
async fn add_rejects_invalid_fields() {
    let mgr = manager();
    let id = cabinet(&mgr, "A").await;

    let err = mgr
        .add_cassette(&cassette_in(id, 5, "Inception"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Shelf must be between 1 and 4");

    let err = mgr
        .add_cassette(&cassette_in(id, 1, "Амели"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(ValidationError::InvalidText(_)));

    let err = mgr
        .add_cassette(&CreateCassette {
            release_year: 1887,
            ..cassette_in(id, 1, "Roundhay Garden Scene")
        })
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(ValidationError::InvalidYear(_)));

    let err = mgr
        .add_cassette(&CreateCassette {
            director: Some("Jean-Pierre Jeunet ©".to_string()),
            ..cassette_in(id, 1, "Delicatessen")
        })
        .await
        .unwrap_err();
    assert_matches!(
        err,
        CoreError::Validation(ValidationError::InvalidText(msg)) if msg.starts_with("Director")
    );

    assert!(mgr.list_cassettes().await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_director_is_stored_as_absent() {
    let mgr = manager();
    let id = cabinet(&mgr, "A").await;
    let added = mgr
        .add_cassette(&CreateCassette {
            director: Some(String::new()),
            ..cassette_in(id, 1, "Heat")
        })
        .await
        .unwrap();
    assert_eq!(added.director, None);
}

#[tokio::test]
async fn update_moves_cassette_between_cabinets() {
    let mgr = manager();
    let from = cabinet(&mgr, "A").await;
    let to = cabinet(&mgr, "B").await;
    let added = mgr.add_cassette(&cassette_in(from, 1, "Heat")).await.unwrap();

    let updated = mgr
        .update_cassette(added.id, &replacement(to, 3, "Heat"))
        .await
        .unwrap();
    assert_eq!(updated.id, added.id);
    assert_eq!(updated.created_at, added.created_at);
    assert_eq!(updated.release_year, 1995);

    let from_view = mgr.view_cabinet(from).await.unwrap();
    assert_eq!(from_view.total_cassettes, 0);
    let to_view = mgr.view_cabinet(to).await.unwrap();
    assert_eq!(to_view.shelf(3).unwrap().cassettes[0].id, added.id);
}

#[tokio::test]
async fn update_failures_leave_record_untouched() {
    let mgr = manager();
    let id = cabinet(&mgr, "A").await;
    let added = mgr.add_cassette(&cassette_in(id, 1, "Heat")).await.unwrap();

    assert_matches!(
        mgr.update_cassette(new_id(), &replacement(id, 1, "Heat")).await,
        Err(CoreError::NotFound { entity: "Cassette", .. })
    );
    assert_matches!(
        mgr.update_cassette(added.id, &replacement(new_id(), 1, "Heat")).await,
        Err(CoreError::NotFound { entity: "Cabinet", .. })
    );
    assert_matches!(
        mgr.update_cassette(added.id, &replacement(id, 0, "Heat")).await,
        Err(CoreError::Validation(ValidationError::InvalidShelf(_)))
    );

    assert_eq!(mgr.get_cassette(added.id).await.unwrap(), added);
}

#[tokio::test]
async fn delete_cassette_is_permanent() {
    let mgr = manager();
    let id = cabinet(&mgr, "A").await;
    let added = mgr.add_cassette(&cassette_in(id, 1, "Heat")).await.unwrap();

    let deleted = mgr.delete_cassette(added.id).await.unwrap();
    assert_eq!(deleted.id, added.id);
    assert_matches!(mgr.get_cassette(added.id).await, Err(CoreError::NotFound { .. }));
    assert_matches!(mgr.delete_cassette(added.id).await, Err(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_requires_a_filter() {
    let mgr = manager();
    assert_matches!(
        mgr.search_cassettes(&CassetteSearch::default()).await,
        Err(CoreError::BadRequest(_))
    );
    assert_matches!(
        mgr.search_cassettes(&CassetteSearch {
            title: Some("  ".into()),
            director: None,
        })
        .await,
        Err(CoreError::BadRequest(_))
    );
}

#[tokio::test]
async fn search_matches_both_filters_and_attaches_letter() {
    let mgr = manager();
    let a = cabinet(&mgr, "A").await;
    let b = cabinet(&mgr, "B").await;
    mgr.add_cassette(&inception(a)).await.unwrap();
    mgr.add_cassette(&CreateCassette {
        director: Some("Christopher Nolan".into()),
        ..cassette_in(b, 1, "Interstellar")
    })
    .await
    .unwrap();
    mgr.add_cassette(&cassette_in(b, 1, "Inside Out")).await.unwrap();

    let hits = mgr
        .search_cassettes(&CassetteSearch {
            title: Some("incep".into()),
            director: None,
        })
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].cabinet_letter, "A");

    let hits = mgr
        .search_cassettes(&CassetteSearch {
            title: Some("in".into()),
            director: Some("NOLAN".into()),
        })
        .await
        .unwrap();
    let letters: Vec<_> = hits.iter().map(|h| h.cabinet_letter.as_str()).collect();
    assert_eq!(letters, vec!["A", "B"]);
}

#[tokio::test]
async fn search_reports_unknown_letter_for_dangling_reference() {
    let store = Arc::new(MemoryRecordStore::new());
    let orphan = Cassette {
        id: new_id(),
        cabinet_id: new_id(),
        shelf: 1,
        movie_title_en: "Ghost".to_string(),
        release_year: 1990,
        director: None,
        created_at: now(),
    };
    let mut tx = store.begin().await.unwrap();
    tx.insert_cassette(&orphan).await.unwrap();
    tx.commit().await.unwrap();

    let mgr = HierarchyManager::new(store);
    let hits = mgr
        .search_cassettes(&CassetteSearch {
            title: Some("ghost".into()),
            director: None,
        })
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].cabinet_letter, "Unknown");
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shelf_view_lists_added_cassette() {
    let mgr = manager();
    let c1 = cabinet(&mgr, "A").await;
    let m1 = mgr.add_cassette(&inception(c1)).await.unwrap();

    let shelf = mgr.view_shelf(c1, 2).await.unwrap();
    assert_eq!(shelf.cassette_count, 1);
    assert_eq!(shelf.cabinet_letter, "A");
    assert_eq!(shelf.cassettes[0].id, m1.id);
    assert_eq!(shelf.cassettes[0].movie_title_en, "Inception");
    assert_eq!(shelf.cassettes[0].release_year, 2010);
    assert_eq!(shelf.cassettes[0].director.as_deref(), Some("Christopher Nolan"));

    let view = mgr.view_cabinet(c1).await.unwrap();
    assert_eq!(view.shelf(2).unwrap().cassette_count, 1);
    assert_eq!(view.shelf(1).unwrap().cassette_count, 0);
}

#[tokio::test]
async fn shelf_view_validates_cabinet_then_shelf() {
    let mgr = manager();
    let id = cabinet(&mgr, "A").await;

    assert_matches!(
        mgr.view_shelf(new_id(), 9).await,
        Err(CoreError::NotFound { .. })
    );
    assert_matches!(
        mgr.view_shelf(id, 9).await,
        Err(CoreError::Validation(ValidationError::InvalidShelf(_)))
    );
    assert_eq!(mgr.view_shelf(id, 4).await.unwrap().cassette_count, 0);
}

#[tokio::test]
async fn letter_view_wraps_every_cabinet() {
    let mgr = manager();
    let first = cabinet(&mgr, "V").await;
    let second = cabinet(&mgr, "V").await;
    mgr.add_cassette(&cassette_in(second, 4, "Vertigo"))
        .await
        .unwrap();

    let view = mgr.view_cabinets_by_letter("v").await.unwrap();
    assert_eq!(view.letter, "V");
    assert_eq!(view.cabinet_count, 2);
    assert_eq!(view.cabinets[0].id, first);
    assert_eq!(view.cabinets[1].shelf(4).unwrap().cassettes[0].movie_title_en, "Vertigo");

    assert_matches!(
        mgr.view_cabinets_by_letter("W").await,
        Err(CoreError::LetterNotFound { letter: 'W' })
    );
}

// ---------------------------------------------------------------------------
// Atomicity
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_add_and_delete_never_leave_dangling_cassettes() {
    for _ in 0..20 {
        let mgr = manager();
        let id = cabinet(&mgr, "R").await;

        let adder = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.add_cassette(&cassette_in(id, 1, "Ronin")).await })
        };
        let deleter = {
            let mgr = mgr.clone();
            tokio::spawn(async move { mgr.delete_cabinet(id).await })
        };
        let added = adder.await.unwrap();
        let deleted = deleter.await.unwrap();

        match (added, deleted) {
            (Ok(_), Err(CoreError::Conflict(_))) => {
                assert_eq!(mgr.view_cabinet(id).await.unwrap().total_cassettes, 1);
            }
            (Err(CoreError::NotFound { .. }), Ok(_)) => {
                assert!(mgr.list_cassettes().await.unwrap().is_empty());
            }
            other => panic!("unexpected interleaving: {other:?}"),
        }
    }
}

#[tokio::test]
async fn store_rejects_reused_ids() {
    let store = Arc::new(MemoryRecordStore::new());
    let cabinet = Cabinet {
        id: new_id(),
        letter: "A".to_string(),
        created_at: now(),
    };
    let mut tx = store.begin().await.unwrap();
    tx.insert_cabinet(&cabinet).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let err = tx.insert_cabinet(&cabinet).await.unwrap_err();
    assert_matches!(CoreError::from(err), CoreError::Conflict(_));
}
