//! Resolver and upserter against SQLite, one transaction per scenario

mod helpers;

use bdns_organos::store::{OrganoStore, SqliteStore};
use bdns_organos::{normalize, NodeType, Resolver, UpsertOutcome, Upserter};
use helpers::log_capture::LogCapture;
use helpers::{count_nodes, create_test_db, id, node};
use tracing::Level;

#[test]
fn test_normalize_equalizes_accents_and_case() {
    assert_eq!(
        normalize(Some("Ayuntamiento de Córdoba")),
        normalize(Some("AYUNTAMIENTO DE CORDOBA"))
    );

    for text in ["  Consellería   de  Sanidade ", "Dirección General , Tributos", "Ñandú"] {
        let once = normalize(Some(text));
        assert_eq!(normalize(once.as_deref()), once);
    }
}

#[tokio::test]
async fn test_root_ministry_body_then_resolve() {
    let (_dir, pool) = create_test_db().await.unwrap();
    let upserter = Upserter::default();

    let mut tx = pool.begin().await.unwrap();
    {
        let mut store = SqliteStore::new(&mut *tx);
        let nodes = [
            node("G0", None, "ESTADO", NodeType::Geographic, &[]),
            node("C3", Some("G0"), "MINISTERIO X", NodeType::Central, &["ESTADO", "MINISTERIO X"]),
            node(
                "C3_1",
                Some("C3"),
                "DIRECCION GENERAL Y",
                NodeType::Central,
                &["ESTADO", "MINISTERIO X", "DIRECCION GENERAL Y"],
            ),
        ];
        for n in nodes {
            let expected = n.id().clone();
            assert_eq!(upserter.insert_or_resolve(&mut store, n).await.unwrap(), expected);
        }
    }
    tx.commit().await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let mut store = SqliteStore::new(&mut conn);
    let found = Resolver::new()
        .resolve(
            &mut store,
            "ESTADO",
            Some("MINISTERIO X"),
            Some("DIRECCION GENERAL Y"),
        )
        .await
        .unwrap();
    assert_eq!(found, Some(id("C3_1")));
}

#[tokio::test]
async fn test_conflicting_reinsert_creates_one_variant() {
    let (_dir, pool) = create_test_db().await.unwrap();
    let upserter = Upserter::default();

    let mut conn = pool.acquire().await.unwrap();
    let mut store = SqliteStore::new(&mut conn);
    upserter
        .upsert(&mut store, node("G0", None, "ESTADO", NodeType::Geographic, &[]))
        .await
        .unwrap();

    let x = node("C3", Some("G0"), "MINISTERIO X", NodeType::Central, &["ESTADO", "MINISTERIO X"]);
    let z = node("C3", Some("G0"), "MINISTERIO Z", NodeType::Central, &["ESTADO", "MINISTERIO X"]);

    let first = upserter.insert_or_resolve(&mut store, x.clone()).await.unwrap();
    let again = upserter.insert_or_resolve(&mut store, x.clone()).await.unwrap();
    assert_eq!(first, again);
    assert_eq!(store.count().await.unwrap(), 2);

    let outcome = upserter.upsert(&mut store, z).await.unwrap();
    assert_eq!(
        outcome,
        UpsertOutcome::Disambiguated {
            original: id("C3"),
            id: id("C3_1"),
        }
    );
    assert_eq!(store.count().await.unwrap(), 3);
    assert_eq!(store.get(&id("C3")).await.unwrap().unwrap(), x);
    assert_eq!(store.get(&id("C3_1")).await.unwrap().unwrap().name(), "MINISTERIO Z");
}

#[tokio::test]
async fn test_conflict_is_logged_with_every_differing_field() {
    let (logs, _guard) = LogCapture::install();
    let (_dir, pool) = create_test_db().await.unwrap();
    let upserter = Upserter::default();

    let mut conn = pool.acquire().await.unwrap();
    let mut store = SqliteStore::new(&mut conn);
    upserter
        .upsert(&mut store, node("G0", None, "ESTADO", NodeType::Geographic, &[]))
        .await
        .unwrap();
    let x = node("C3", Some("G0"), "MINISTERIO X", NodeType::Central, &["ESTADO", "MINISTERIO X"]);
    upserter.upsert(&mut store, x.clone()).await.unwrap();
    upserter.upsert(&mut store, x).await.unwrap();

    // An identical re-insert is not a conflict
    assert!(logs.matching(Level::WARN, "Conflicting node data").is_empty());

    let z = node("C3", Some("G0"), "MINISTERIO Z", NodeType::Central, &["ESTADO", "MINISTERIO Z"]);
    upserter.upsert(&mut store, z).await.unwrap();

    let warnings = logs.matching(Level::WARN, "Conflicting node data");
    assert_eq!(warnings.len(), 1, "all records: {:?}", logs.records());
    assert_eq!(warnings[0].field("id"), Some("C3"));
    assert_eq!(
        warnings[0].field("changes"),
        Some(r#"name: "MINISTERIO X" -> "MINISTERIO Z"; level2: "MINISTERIO X" -> "MINISTERIO Z""#)
    );
}

#[tokio::test]
async fn test_dangling_parent_aborts_without_writing() {
    let (_dir, pool) = create_test_db().await.unwrap();
    let upserter = Upserter::default();

    let mut tx = pool.begin().await.unwrap();
    let result = {
        let mut store = SqliteStore::new(&mut *tx);
        upserter
            .upsert(&mut store, node("G0", None, "ESTADO", NodeType::Geographic, &[]))
            .await
            .unwrap();
        upserter
            .upsert(
                &mut store,
                node("A12", Some("G12"), "CONSELLERIA", NodeType::Regional, &["GALICIA"]),
            )
            .await
    };

    let err = result.unwrap_err();
    assert!(err.is_invariant_violation());

    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organo WHERE id = 'A12'")
        .fetch_one(&mut *tx)
        .await
        .unwrap();
    assert_eq!(orphans, 0);

    // The violating node was never written; the caller drops the batch
    drop(tx);
    assert_eq!(count_nodes(&pool).await, 0);
}
