mod support;

use predicates::str::contains;
use serde_json::Value;

use support::{create_task, pace_cmd, pace_json, TestDir};

#[test]
fn help_lists_command_groups() {
    let dir = TestDir::new();
    pace_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("pace - local task tracker"))
        .stdout(contains("Kanban board"));

    for cmd in ["task", "config", "init", "info", "tui"] {
        pace_cmd(&dir).arg(cmd).arg("--help").assert().success();
    }
}

#[test]
fn create_then_get_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    let id = create_task(
        &dir,
        "Write spec",
        &[
            "--priority",
            "2",
            "--type",
            "feature",
            "--label",
            "docs",
            "--url",
            "example.com/spec",
        ],
    )?;

    let task = pace_json(&dir, &["task", "get", &id])?;
    assert_eq!(task["title"], "Write spec");
    assert_eq!(task["status"], "todo");
    assert_eq!(task["type"], "feature");
    assert_eq!(task["priority"], 2);
    assert_eq!(task["labels"], serde_json::json!(["docs"]));
    assert_eq!(task["link"], "https://example.com/spec");
    assert!(task.get("blocked_by").is_none());
    assert!(task.get("description").is_none());
    Ok(())
}

#[test]
fn create_requires_title() {
    let dir = TestDir::new();
    pace_cmd(&dir)
        .args(["task", "create"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("title is required"));
}

#[test]
fn invalid_link_is_rejected() {
    let dir = TestDir::new();
    pace_cmd(&dir)
        .args(["task", "create", "--title", "Bad", "--url", "ftp://example.com"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn missing_task_is_not_found() {
    let dir = TestDir::new();
    pace_cmd(&dir)
        .args(["task", "get", "nope-123"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("nope-123"));
}

#[test]
fn ready_tracks_dependencies() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    let t1 = create_task(&dir, "Write spec", &["--priority", "2"])?;
    let t2 = create_task(&dir, "Review", &["--priority", "1"])?;
    pace_cmd(&dir)
        .args(["task", "dep", "add", &t1, &t2])
        .assert()
        .success();

    let ready = pace_json(&dir, &["task", "ready"])?;
    assert_eq!(ready["count"], 1);
    assert_eq!(ready["tasks"][0]["id"], Value::String(t1.clone()));

    pace_cmd(&dir)
        .args(["task", "update", &t1, "--status", "done"])
        .assert()
        .success();
    let ready = pace_json(&dir, &["task", "ready"])?;
    assert_eq!(ready["count"], 1);
    assert_eq!(ready["tasks"][0]["id"], Value::String(t2));
    Ok(())
}

#[test]
fn list_filters_and_sorts_by_priority() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    create_task(&dir, "Low bug", &["--type", "bug", "--priority", "4"])?;
    create_task(&dir, "Urgent bug", &["--type", "bug", "--priority", "1"])?;
    create_task(&dir, "Feature", &["--type", "feature"])?;

    let list = pace_json(&dir, &["task", "list", "--filter", "type=bug"])?;
    assert_eq!(list["count"], 2);
    assert_eq!(list["tasks"][0]["title"], "Urgent bug");
    assert_eq!(list["tasks"][1]["title"], "Low bug");

    pace_cmd(&dir)
        .args(["task", "list", "--filter", "priority=5"])
        .assert()
        .failure()
        .code(2);
    pace_cmd(&dir)
        .args(["task", "list", "--filter", "status=todo", "--filter", "status=done"])
        .assert()
        .failure()
        .stderr(contains("status"));

    pace_cmd(&dir)
        .args(["task", "list", "--pretty"])
        .assert()
        .success()
        .stdout(contains("[B] P1 Urgent bug"))
        .stdout(contains("Status: ○ todo"));
    Ok(())
}

#[test]
fn filtered_update_dry_run_then_apply() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    let a = create_task(&dir, "A", &["--type", "bug"])?;
    create_task(&dir, "B", &["--type", "bug"])?;
    create_task(&dir, "C", &["--type", "chore"])?;

    let preview = pace_json(
        &dir,
        &["task", "update", "--filter", "type=bug", "--set", "status=done", "--dry-run"],
    )?;
    assert_eq!(preview["matched"], 2);
    assert_eq!(preview["tasks"][0]["status"], "todo -> done");
    let unchanged = pace_json(&dir, &["task", "get", &a])?;
    assert_eq!(unchanged["status"], "todo");

    let result = pace_json(
        &dir,
        &["task", "update", "--filter", "type=bug", "--set", "status=done"],
    )?;
    assert_eq!(result["total"], 2);
    assert_eq!(result["succeeded"].as_array().map(Vec::len), Some(2));

    let done = pace_json(&dir, &["task", "list", "--filter", "status=done"])?;
    assert_eq!(done["count"], 2);

    pace_cmd(&dir)
        .args(["task", "update", "--filter", "type=bug", "--title", "nope"])
        .assert()
        .failure()
        .code(2);
    Ok(())
}

#[test]
fn delete_cascades_dependencies() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    let a = create_task(&dir, "A", &[])?;
    let b = create_task(&dir, "B", &[])?;
    let c = create_task(&dir, "C", &[])?;
    pace_cmd(&dir)
        .args(["task", "dep", "chain", &a, &b, &c])
        .assert()
        .success();

    pace_cmd(&dir)
        .args(["task", "delete", &b])
        .assert()
        .success();

    let deps = pace_json(&dir, &["task", "dep", "list", &a])?;
    assert_eq!(deps["blocks"], serde_json::json!([]));
    let deps = pace_json(&dir, &["task", "dep", "list", &c])?;
    assert_eq!(deps["blocked_by"], serde_json::json!([]));
    Ok(())
}

#[test]
fn dep_tree_renders_sections() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    let a = create_task(&dir, "Design", &[])?;
    let b = create_task(&dir, "Build", &[])?;
    pace_cmd(&dir)
        .args(["task", "dep", "add", &a, &b])
        .assert()
        .success();

    pace_cmd(&dir)
        .args(["task", "dep", "tree", &b])
        .assert()
        .success()
        .stdout(contains("BLOCKED BY:"))
        .stdout(contains(format!("{a}: Design [READY]")));

    pace_cmd(&dir)
        .args(["task", "dep", "tree", &a, "--direction", "down"])
        .assert()
        .success()
        .stdout(contains("BLOCKS:"))
        .stdout(contains(format!("{b}: Build")));

    let lonely = create_task(&dir, "Alone", &[])?;
    pace_cmd(&dir)
        .args(["task", "dep", "tree", &lonely])
        .assert()
        .success()
        .stdout(contains("No dependencies found."));
    Ok(())
}

#[test]
fn bulk_create_from_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    pace_cmd(&dir)
        .args(["task", "create", "--bulk", "-", "--json"])
        .write_stdin(r#"[{"title": "One"}, {"title": "Two", "type": "bug"}]"#)
        .assert()
        .success()
        .stdout(contains("\"total\": 2"));

    let list = pace_json(&dir, &["task", "list"])?;
    assert_eq!(list["count"], 2);

    pace_cmd(&dir)
        .args(["task", "create", "--bulk", "-", "--json"])
        .write_stdin(r#"[{"title": "Three"}, {"title": "Bad", "priority": -1}]"#)
        .assert()
        .success()
        .stdout(contains("invalid task"));
    let list = pace_json(&dir, &["task", "list"])?;
    assert_eq!(list["count"], 3);

    pace_cmd(&dir)
        .args(["task", "create", "--bulk", "[]"])
        .assert()
        .failure()
        .stderr(contains("no tasks provided"));
    Ok(())
}

#[test]
fn labels_and_search() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    let id = create_task(&dir, "Refactor parser", &["--description", "Tokenizer cleanup"])?;
    pace_cmd(&dir)
        .args(["task", "label", "add", &id, "tech-debt"])
        .assert()
        .success();

    let tagged = pace_json(&dir, &["task", "list", "--filter", "label=tech-debt"])?;
    assert_eq!(tagged["count"], 1);

    let hits = pace_json(&dir, &["task", "search", "TOKENIZER"])?;
    assert_eq!(hits["count"], 1);

    pace_cmd(&dir)
        .args(["task", "label", "remove", &id, "tech-debt"])
        .assert()
        .success();
    let tagged = pace_json(&dir, &["task", "list", "--filter", "label=tech-debt"])?;
    assert_eq!(tagged["count"], 0);
    Ok(())
}

#[test]
fn config_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    pace_cmd(&dir)
        .args(["config", "set", "id_prefix", "web"])
        .assert()
        .success();
    pace_cmd(&dir)
        .args(["config", "get", "id_prefix"])
        .assert()
        .success()
        .stdout(contains("id_prefix = web"));

    let id = create_task(&dir, "Prefixed", &[])?;
    assert!(id.starts_with("web-"), "{id}");

    pace_cmd(&dir)
        .args(["config", "unset", "missing-key"])
        .assert()
        .failure()
        .code(2);
    Ok(())
}

#[test]
fn file_config_supplies_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    dir.write_config("[tasks]\ndefault_priority = 1\ndefault_type = \"chore\"\n")?;
    let id = create_task(&dir, "Defaults", &[])?;
    let task = pace_json(&dir, &["task", "get", &id])?;
    assert_eq!(task["priority"], 1);
    assert_eq!(task["type"], "chore");

    dir.write_config("[tasks]\ndefault_priority = 9\n")?;
    pace_cmd(&dir)
        .args(["task", "list"])
        .assert()
        .failure()
        .code(2);
    Ok(())
}

#[test]
fn json_errors_use_envelope() {
    let dir = TestDir::new();
    pace_cmd(&dir)
        .args(["task", "get", "ghost", "--json"])
        .assert()
        .failure()
        .stdout(contains("\"status\": \"error\""))
        .stdout(contains("\"kind\": \"user_error\""));
}
