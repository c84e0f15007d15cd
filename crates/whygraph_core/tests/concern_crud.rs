use rusqlite::Connection;
use whygraph_core::db::migrations::latest_version;
use whygraph_core::db::open_db_in_memory;
use whygraph_core::{
    ConcernCategory, ConcernRepository, ConcernService, ContentError, NodeDraft, NodeRepository,
    NodeType, RepoError, SqliteConcernRepository, SqliteNodeRepository,
};

const ALICE: i64 = 1;
const BOB: i64 = 2;

#[test]
fn create_and_get_roundtrip_trims_content() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteConcernRepository::try_new(&conn).unwrap();

    let id = repo
        .create_concern(ALICE, "  why is the build late  ", ConcernCategory::Analysis)
        .unwrap();

    let loaded = repo.get_concern(ALICE, id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.owner_id, ALICE);
    assert_eq!(loaded.content, "why is the build late");
    assert_eq!(loaded.category, ConcernCategory::Analysis);
    assert!(loaded.created_at > 0);
}

#[test]
fn list_is_owner_scoped_and_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteConcernRepository::try_new(&conn).unwrap();

    let old_id = repo
        .create_concern(ALICE, "older", ConcernCategory::Analysis)
        .unwrap();
    let new_id = repo
        .create_concern(ALICE, "newer", ConcernCategory::GoalSetting)
        .unwrap();
    repo.create_concern(BOB, "someone else's", ConcernCategory::Analysis)
        .unwrap();

    conn.execute(
        "UPDATE concerns SET created_at = 1000 WHERE id = ?1;",
        [old_id],
    )
    .unwrap();
    conn.execute(
        "UPDATE concerns SET created_at = 2000 WHERE id = ?1;",
        [new_id],
    )
    .unwrap();

    let listed = repo.list_concerns(ALICE).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, new_id);
    assert_eq!(listed[1].id, old_id);
}

#[test]
fn update_existing_concern() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteConcernRepository::try_new(&conn).unwrap();

    let id = repo
        .create_concern(ALICE, "draft", ConcernCategory::Analysis)
        .unwrap();
    repo.update_concern(ALICE, id, "ship faster", ConcernCategory::GoalSetting)
        .unwrap();

    let loaded = repo.get_concern(ALICE, id).unwrap().unwrap();
    assert_eq!(loaded.content, "ship faster");
    assert_eq!(loaded.category, ConcernCategory::GoalSetting);
}

#[test]
fn foreign_owned_concern_is_indistinguishable_from_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteConcernRepository::try_new(&conn).unwrap();

    let id = repo
        .create_concern(ALICE, "private", ConcernCategory::Analysis)
        .unwrap();

    assert!(repo.get_concern(BOB, id).unwrap().is_none());

    let update_err = repo
        .update_concern(BOB, id, "hijack", ConcernCategory::Analysis)
        .unwrap_err();
    assert!(matches!(update_err, RepoError::ConcernNotFound(err_id) if err_id == id));

    let delete_err = repo.delete_concern(BOB, id).unwrap_err();
    assert!(matches!(delete_err, RepoError::ConcernNotFound(err_id) if err_id == id));

    // still there for the real owner
    assert!(repo.get_concern(ALICE, id).unwrap().is_some());
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteConcernRepository::try_new(&conn).unwrap();

    let blank_err = repo
        .create_concern(ALICE, "   ", ConcernCategory::Analysis)
        .unwrap_err();
    assert!(matches!(
        blank_err,
        RepoError::Validation(ContentError::Blank)
    ));

    let over_limit = "x".repeat(41);
    let long_err = repo
        .create_concern(ALICE, &over_limit, ConcernCategory::Analysis)
        .unwrap_err();
    assert!(matches!(
        long_err,
        RepoError::Validation(ContentError::TooLong { max: 40, actual: 41 })
    ));

    let id = repo
        .create_concern(ALICE, "valid", ConcernCategory::Analysis)
        .unwrap();
    let update_err = repo
        .update_concern(ALICE, id, &over_limit, ConcernCategory::Analysis)
        .unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
    assert_eq!(repo.get_concern(ALICE, id).unwrap().unwrap().content, "valid");
}

#[test]
fn delete_concern_cascades_to_nodes_and_links() {
    let conn = open_db_in_memory().unwrap();
    let concerns = SqliteConcernRepository::try_new(&conn).unwrap();
    let nodes = SqliteNodeRepository::try_new(&conn).unwrap();

    let concern_id = concerns
        .create_concern(ALICE, "doomed", ConcernCategory::Analysis)
        .unwrap();
    let first = nodes
        .create_node(
            ALICE,
            concern_id,
            &NodeDraft {
                content: "a".to_string(),
                node_type: NodeType::Statement,
                to_root: true,
                targets: Vec::new(),
            },
        )
        .unwrap();
    nodes
        .create_node(
            ALICE,
            concern_id,
            &NodeDraft {
                content: "b".to_string(),
                node_type: NodeType::Factor,
                to_root: false,
                targets: vec![first],
            },
        )
        .unwrap();

    concerns.delete_concern(ALICE, concern_id).unwrap();

    let node_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM nodes;", [], |row| row.get(0))
        .unwrap();
    let link_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM node_links;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(node_count, 0);
    assert_eq!(link_count, 0);
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteConcernRepository::try_new(&conn).unwrap();
    let service = ConcernService::new(repo);

    let id = service
        .create_concern(ALICE, "from service", ConcernCategory::GoalSetting)
        .unwrap();
    let fetched = service.get_concern(ALICE, id).unwrap().unwrap();
    assert_eq!(fetched.content, "from service");

    service.delete_concern(ALICE, id).unwrap();
    assert!(service.get_concern(ALICE, id).unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteConcernRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteConcernRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("concerns"))
    ));
}
