use whygraph_core::db::open_db_in_memory;
use whygraph_core::{
    ConcernCategory, ConcernId, ConcernRepository, GraphService, NodeDraft, NodeRepository,
    NodeType, RepoError, SqliteConcernRepository, SqliteNodeRepository, ROOT_LOCAL_ID,
};

const ALICE: i64 = 1;
const BOB: i64 = 2;

fn graph_service(
    conn: &rusqlite::Connection,
) -> GraphService<SqliteConcernRepository<'_>, SqliteNodeRepository<'_>> {
    GraphService::new(
        SqliteConcernRepository::try_new(conn).unwrap(),
        SqliteNodeRepository::try_new(conn).unwrap(),
    )
}

fn analysis_concern(conn: &rusqlite::Connection, content: &str) -> ConcernId {
    SqliteConcernRepository::try_new(conn)
        .unwrap()
        .create_concern(ALICE, content, ConcernCategory::Analysis)
        .unwrap()
}

#[test]
fn export_has_n_plus_one_descriptors_with_root_first() {
    let conn = open_db_in_memory().unwrap();
    let nodes = SqliteNodeRepository::try_new(&conn).unwrap();
    let concern_id = analysis_concern(&conn, "why is x late?");

    for content in ["a", "b", "c"] {
        nodes
            .create_node(
                ALICE,
                concern_id,
                &NodeDraft::new(content, NodeType::Statement),
            )
            .unwrap();
    }

    let export = graph_service(&conn).export(ALICE, concern_id).unwrap();
    assert_eq!(export.nodes.len(), 4);

    let root = &export.nodes[0];
    assert_eq!(root.id, ROOT_LOCAL_ID);
    assert!(root.is_root);
    assert_eq!(root.node_type, 0);
    assert_eq!(root.content, "why is x late?");
    assert_eq!(root.nid, None);

    for (rank, descriptor) in export.nodes[1..].iter().enumerate() {
        assert_eq!(descriptor.id, rank as i64 + 1);
        assert!(!descriptor.is_root);
        assert!(descriptor.nid.is_some());
    }
}

#[test]
fn export_matches_the_two_node_worked_example() {
    let conn = open_db_in_memory().unwrap();
    let nodes = SqliteNodeRepository::try_new(&conn).unwrap();
    let concern_id = analysis_concern(&conn, "why is x late?");

    let a = nodes
        .create_node(
            ALICE,
            concern_id,
            &NodeDraft {
                content: "A".to_string(),
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
                content: "B".to_string(),
                node_type: NodeType::Factor,
                to_root: false,
                targets: vec![a],
            },
        )
        .unwrap();

    let export = graph_service(&conn).export(ALICE, concern_id).unwrap();

    let contents: Vec<_> = export
        .nodes
        .iter()
        .map(|node| (node.id, node.content.as_str(), node.is_root))
        .collect();
    assert_eq!(
        contents,
        vec![(0, "why is x late?", true), (1, "A", false), (2, "B", false)]
    );

    let links: Vec<_> = export
        .links
        .iter()
        .map(|link| (link.source, link.target, link.node_type))
        .collect();
    assert_eq!(links, vec![(1, 0, 0), (2, 1, NodeType::Factor.code())]);
}

#[test]
fn export_is_deterministic_across_calls() {
    let conn = open_db_in_memory().unwrap();
    let nodes = SqliteNodeRepository::try_new(&conn).unwrap();
    let concern_id = analysis_concern(&conn, "stable");

    let first = nodes
        .create_node(ALICE, concern_id, &NodeDraft::new("one", NodeType::Memo))
        .unwrap();
    nodes
        .create_node(
            ALICE,
            concern_id,
            &NodeDraft {
                content: "two".to_string(),
                node_type: NodeType::Action,
                to_root: true,
                targets: vec![first],
            },
        )
        .unwrap();

    let service = graph_service(&conn);
    let export_a = service.export(ALICE, concern_id).unwrap();
    let export_b = service.export(ALICE, concern_id).unwrap();
    assert_eq!(export_a, export_b);
}

#[test]
fn to_root_links_are_type_zero_regardless_of_node_type() {
    let conn = open_db_in_memory().unwrap();
    let nodes = SqliteNodeRepository::try_new(&conn).unwrap();
    let concern_id = analysis_concern(&conn, "root links");

    for node_type in [
        NodeType::Statement,
        NodeType::Factor,
        NodeType::Action,
        NodeType::Memo,
    ] {
        nodes
            .create_node(
                ALICE,
                concern_id,
                &NodeDraft {
                    content: format!("type {}", node_type.code()),
                    node_type,
                    to_root: true,
                    targets: Vec::new(),
                },
            )
            .unwrap();
    }

    let export = graph_service(&conn).export(ALICE, concern_id).unwrap();
    assert_eq!(export.links.len(), 4);
    for link in &export.links {
        assert_eq!(link.target, ROOT_LOCAL_ID);
        assert_eq!(link.node_type, 0);
    }
}

#[test]
fn a_node_can_be_root_connected_and_targeted_at_once() {
    let conn = open_db_in_memory().unwrap();
    let nodes = SqliteNodeRepository::try_new(&conn).unwrap();
    let concern_id = analysis_concern(&conn, "both");

    let hub = nodes
        .create_node(
            ALICE,
            concern_id,
            &NodeDraft {
                content: "hub".to_string(),
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
                content: "feeder".to_string(),
                node_type: NodeType::Factor,
                to_root: false,
                targets: vec![hub],
            },
        )
        .unwrap();

    let export = graph_service(&conn).export(ALICE, concern_id).unwrap();
    // hub -> root plus feeder -> hub
    assert_eq!(export.links.len(), 2);
    assert!(export
        .links
        .iter()
        .any(|link| link.source == 1 && link.target == 0 && link.node_type == 0));
    assert!(export
        .links
        .iter()
        .any(|link| link.source == 2 && link.target == 1));
}

#[test]
fn every_link_endpoint_is_a_listed_descriptor() {
    let conn = open_db_in_memory().unwrap();
    let nodes = SqliteNodeRepository::try_new(&conn).unwrap();
    let concern_id = analysis_concern(&conn, "closed world");

    let a = nodes
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
    let b = nodes
        .create_node(
            ALICE,
            concern_id,
            &NodeDraft {
                content: "b".to_string(),
                node_type: NodeType::Factor,
                to_root: false,
                targets: vec![a],
            },
        )
        .unwrap();
    nodes.set_node_targets(ALICE, a, &[b]).unwrap(); // cycle on purpose

    let export = graph_service(&conn).export(ALICE, concern_id).unwrap();
    let ids: Vec<i64> = export.nodes.iter().map(|node| node.id).collect();
    for link in &export.links {
        assert!(ids.contains(&link.source));
        assert!(ids.contains(&link.target));
    }
}

#[test]
fn missing_or_foreign_concern_fails_with_not_found() {
    let conn = open_db_in_memory().unwrap();
    let concern_id = analysis_concern(&conn, "private");
    let service = graph_service(&conn);

    let missing = service.export(ALICE, 9999).unwrap_err();
    assert!(matches!(missing, RepoError::ConcernNotFound(9999)));

    let foreign = service.export(BOB, concern_id).unwrap_err();
    assert!(matches!(foreign, RepoError::ConcernNotFound(id) if id == concern_id));
}

#[test]
fn json_payload_matches_the_wire_shape() {
    let conn = open_db_in_memory().unwrap();
    let nodes = SqliteNodeRepository::try_new(&conn).unwrap();
    let concern_id = analysis_concern(&conn, "wire shape");

    let native_id = nodes
        .create_node(
            ALICE,
            concern_id,
            &NodeDraft {
                content: "leaf".to_string(),
                node_type: NodeType::Factor,
                to_root: true,
                targets: Vec::new(),
            },
        )
        .unwrap();

    let export = graph_service(&conn).export(ALICE, concern_id).unwrap();
    let value = serde_json::to_value(&export).unwrap();

    let root = &value["nodes"][0];
    assert_eq!(root["id"], 0);
    assert_eq!(root["is_root"], true);
    assert_eq!(root["node_type"], 0);
    // nid is omitted for the root, not serialized as null
    assert!(root.as_object().unwrap().get("nid").is_none());

    let leaf = &value["nodes"][1];
    assert_eq!(leaf["id"], 1);
    assert_eq!(leaf["content"], "leaf");
    assert_eq!(leaf["is_root"], false);
    assert_eq!(leaf["node_type"], 2);
    assert_eq!(leaf["nid"], native_id);

    let link = &value["links"][0];
    assert_eq!(link["source"], 1);
    assert_eq!(link["target"], 0);
    assert_eq!(link["node_type"], 0);
}
