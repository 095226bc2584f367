use pace::graph::{self, Direction, TreeNode, TreeOptions};
use pace::service::TaskService;
use pace::sqlite::SqliteStore;
use pace::store::TaskStore;
use pace::task::{Status, Task};
use pace::Error;

fn service() -> TaskService<SqliteStore> {
    let store = SqliteStore::open_in_memory().expect("store");
    TaskService::with_prefix(store, "t")
}

fn ready_ids(service: &TaskService<SqliteStore>) -> Vec<String> {
    service
        .ready_tasks()
        .expect("ready")
        .into_iter()
        .map(|task| task.id)
        .collect()
}

#[test]
fn ready_set_follows_blocker_completion() {
    let service = service();
    service
        .create(&Task::new("t1", "Write spec").with_priority(2))
        .expect("t1");
    service
        .create(&Task::new("t2", "Review").with_priority(1))
        .expect("t2");
    service.add_dependency("t1", "t2").expect("dep");

    assert_eq!(ready_ids(&service), vec!["t1"]);

    let mut t1 = service.get("t1").expect("get");
    t1.status = Status::Done;
    service.update(&t1).expect("update");

    assert_eq!(ready_ids(&service), vec!["t2"]);
}

#[test]
fn delete_cascades_edges_in_both_directions() {
    let service = service();
    for id in ["a", "b", "c"] {
        service.create(&Task::new(id, id.to_uppercase())).expect("create");
    }
    service.add_dependency("a", "b").expect("a->b");
    service.add_dependency("b", "c").expect("b->c");

    service.delete("b").expect("delete");

    for task in service.load_all().expect("load") {
        assert!(!task.blocked_by().contains(&"b".to_string()), "{}", task.id);
        assert!(!task.blocks().contains(&"b".to_string()), "{}", task.id);
    }
    assert!(matches!(service.get("b"), Err(Error::TaskNotFound(_))));
}

#[test]
fn add_dependency_requires_both_tasks() {
    let service = service();
    service.create(&Task::new("a", "A")).expect("create");
    let err = service.add_dependency("a", "missing").unwrap_err();
    assert!(err.is_not_found());
    let err = service.add_dependency("missing", "a").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn validation_happens_before_persistence() {
    let service = service();
    assert!(matches!(
        service.create(&Task::new("a", "")),
        Err(Error::EmptyTitle)
    ));
    assert!(matches!(
        service.create(&Task::new("b", "B").with_link("ftp://example.com")),
        Err(Error::InvalidLink(_))
    ));
    assert!(service.load_all().expect("load").is_empty());
}

#[test]
fn dangling_blocker_does_not_block() {
    let mut task = Task::new("a", "A");
    task.add_blocked_by("ghost");
    let tasks = vec![task];
    let index = graph::index(&tasks);
    assert!(graph::is_ready(&tasks[0], &index));

    let done = Task::new("d", "D").with_status(Status::Done);
    assert!(!graph::is_ready(&done, &index));
}

#[test]
fn persisted_cycle_renders_with_marker() {
    let service = service();
    service.create(&Task::new("a", "A")).expect("a");
    service.create(&Task::new("b", "B")).expect("b");
    service.add_dependency("a", "b").expect("a->b");
    service.add_dependency("b", "a").expect("b->a");

    let tasks = service.load_all().expect("load");
    let index = graph::index(&tasks);
    let root = index["a"];
    let tree = graph::dependency_tree(
        root,
        &index,
        TreeOptions {
            direction: Direction::Down,
            status: None,
            max_depth: 10,
        },
    );

    let blocks = tree.blocks.as_ref().expect("down section");
    assert_eq!(blocks.len(), 1);
    match &blocks[0] {
        TreeNode::Task { id, children, .. } => {
            assert_eq!(id, "b");
            assert!(matches!(&children[..], [TreeNode::Cycle { id, .. }] if id == "a"));
        }
        other => panic!("unexpected node {other:?}"),
    }
    assert!(tree.render().iter().any(|line| line.ends_with("(cycle)")));
}

#[test]
fn search_is_case_insensitive_over_description() {
    let service = service();
    service
        .create(&Task::new("a", "Refactor").with_description("touches the PARSER"))
        .expect("a");
    service.create(&Task::new("b", "Docs")).expect("b");

    let hits = service.search("parser").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "a");
}

#[test]
fn labels_survive_hydration() {
    let service = service();
    service
        .create(&Task::new("a", "A").with_labels(["ui", "urgent"]))
        .expect("create");
    service.remove_label("a", "ui").expect("remove");
    let task = service.get("a").expect("get");
    assert_eq!(task.labels(), ["urgent".to_string()]);
}

#[test]
fn prefix_is_persisted_on_first_use() {
    let store = SqliteStore::open_in_memory().expect("store");
    let service = TaskService::new(store).expect("service");
    let prefix = service.prefix().to_string();
    assert!(!prefix.is_empty());
    assert_eq!(service.store().get_config("id_prefix").expect("config"), prefix);
    assert!(service.generate_id().starts_with(&format!("{prefix}-")));
}
