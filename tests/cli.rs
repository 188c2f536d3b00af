use std::error::Error;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::{tempdir, TempDir};

/// Questions in the bundled sample sheet.
const SAMPLE_QUESTIONS: usize = 11;

struct Env {
    dir: TempDir,
    db: PathBuf,
}

impl Env {
    fn new() -> Result<Self, Box<dyn Error>> {
        let dir = tempdir()?;
        let db = dir.path().join("data").join("qsheet.db");
        Ok(Self { dir, db })
    }

    fn cmd(&self) -> Result<Command, Box<dyn Error>> {
        let mut cmd = Command::cargo_bin("qsheet")?;
        cmd.env("QSHEET_DB", &self.db)
            .env("QSHEET_ACTOR", "tester")
            .env("HOME", self.dir.path())
            .env_remove("QSHEET_TEST_DB")
            .env_remove("QSHEET_API_BASE")
            .env_remove("RUST_LOG")
            .current_dir(self.dir.path());
        Ok(cmd)
    }

    /// Run a command expected to succeed and parse its JSON stdout.
    fn json(&self, args: &[&str]) -> Result<Value, Box<dyn Error>> {
        let output = self.cmd()?.args(args).arg("--json").assert().success().get_output().clone();
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    fn init(&self) -> Result<Value, Box<dyn Error>> {
        self.json(&["init"])
    }
}

fn topic_id(list: &Value, title: &str) -> String {
    list["topics"]
        .as_array()
        .and_then(|ts| ts.iter().find(|t| t["topic"]["title"] == title))
        .and_then(|t| t["topic"]["id"].as_str())
        .unwrap_or_default()
        .to_string()
}

/// Collect every object key containing an underscore, except the raw `_id`.
fn snake_keys(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key.contains('_') && key != "_id" {
                    found.push(key.clone());
                }
                snake_keys(child, found);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| snake_keys(item, found)),
        _ => {}
    }
}

fn error_code(stderr: &[u8]) -> Value {
    serde_json::from_slice::<Value>(stderr).map_or(Value::Null, |v| v["error"]["code"].clone())
}

/// Verifies init seeds the bundled sample and the list shows all of it.
#[test]
fn init_seeds_bundled_sheet() -> Result<(), Box<dyn Error>> {
    let env = Env::new()?;

    let init = env.init()?;
    assert_eq!(init["seeded"], true);
    assert_eq!(init["questions"], SAMPLE_QUESTIONS);
    assert_eq!(init["topics"], 4);
    assert!(env.db.exists());

    let list = env.json(&["list"])?;
    assert_eq!(list["filtered"], false);
    assert_eq!(list["visibleQuestions"], SAMPLE_QUESTIONS);
    assert_eq!(list["progress"]["total"], SAMPLE_QUESTIONS);
    assert_eq!(list["progress"]["done"], 0);
    assert_eq!(list["topics"][0]["topic"]["title"], "Arrays");

    // A second init without --force is refused
    let output = env.cmd()?.args(["init", "--json"]).assert().code(2).get_output().clone();
    assert_eq!(error_code(&output.stderr), "ALREADY_INITIALIZED");
    Ok(())
}

/// Verifies commands on a missing database exit with the not-initialized code.
#[test]
fn commands_require_init() -> Result<(), Box<dyn Error>> {
    let env = Env::new()?;

    let output = env.cmd()?.args(["list", "--json"]).assert().code(2).get_output().clone();
    assert_eq!(error_code(&output.stderr), "NOT_INITIALIZED");
    assert!(!env.db.exists());
    Ok(())
}

/// Verifies topic/question creation, status changes and the status filter.
#[test]
fn add_and_solve_questions() -> Result<(), Box<dyn Error>> {
    let env = Env::new()?;
    env.init()?;

    let topic = env.json(&["topic", "add", "Dynamic Programming"])?;
    let dp_id = topic["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(topic["position"], 4);

    let question = env.json(&[
        "question",
        "add",
        &dp_id,
        "Climbing Stairs",
        "-d",
        "e",
        "--platform",
        "leetcode",
        "--tags",
        "dp,recursion",
    ])?;
    let question_id = question["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(question["difficulty"], "easy");
    assert_eq!(question["status"], "todo");
    assert_eq!(question["topic"], "Dynamic Programming");
    assert_eq!(question["tags"], serde_json::json!(["dp", "recursion"]));

    let done = env.json(&["question", "done", &question_id, "sample-q-001"])?;
    assert_eq!(done["status"], "done");
    assert_eq!(done["updated"].as_array().map(Vec::len), Some(2));

    let solved = env.json(&["list", "--status", "solved"])?;
    assert_eq!(solved["filtered"], true);
    assert_eq!(solved["visibleQuestions"], 2);
    assert_eq!(solved["topics"].as_array().map(Vec::len), Some(2));
    assert_eq!(dp_id, topic_id(&solved, "Dynamic Programming"));

    let stats = env.json(&["stats"])?;
    assert_eq!(stats["total"], SAMPLE_QUESTIONS + 1);
    assert_eq!(stats["solved"], 2);

    let history = env.json(&["history", "--id", &question_id])?;
    let types: Vec<&str> = history["events"]
        .as_array()
        .map(|es| es.iter().filter_map(|e| e["eventType"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(types, ["question_updated", "question_created"]);
    Ok(())
}

/// Verifies unknown IDs and invalid values map to their exit codes.
#[test]
fn errors_map_to_exit_codes() -> Result<(), Box<dyn Error>> {
    let env = Env::new()?;
    env.init()?;

    let output = env
        .cmd()?
        .args(["question", "done", "no-such-question", "--json"])
        .assert()
        .code(3)
        .get_output()
        .clone();
    assert_eq!(error_code(&output.stderr), "QUESTION_NOT_FOUND");

    let output = env
        .cmd()?
        .args(["question", "edit", "sample-q-001", "--status", "someday", "--json"])
        .assert()
        .code(4)
        .get_output()
        .clone();
    assert_eq!(error_code(&output.stderr), "INVALID_STATUS");

    let list = env.json(&["list"])?;
    let arrays = topic_id(&list, "Arrays");
    let output = env
        .cmd()?
        .args(["topic", "move", &arrays, "--to", "9", "--json"])
        .assert()
        .code(4)
        .get_output()
        .clone();
    assert_eq!(error_code(&output.stderr), "INDEX_OUT_OF_RANGE");
    Ok(())
}

/// Verifies deleting a topic cascades and leaves a consistent sheet.
#[test]
fn delete_topic_cascades() -> Result<(), Box<dyn Error>> {
    let env = Env::new()?;
    env.init()?;

    let list = env.json(&["list"])?;
    let graphs = topic_id(&list, "Graphs");

    let deleted = env.json(&["topic", "delete", &graphs])?;
    assert_eq!(deleted["deletedSubTopics"], 2);
    assert_eq!(deleted["deletedQuestions"], 3);

    let check = env.json(&["check"])?;
    assert_eq!(check["ok"], true);

    let list = env.json(&["list"])?;
    assert_eq!(list["visibleQuestions"], SAMPLE_QUESTIONS - 3);
    assert_eq!(list["topics"].as_array().map(Vec::len), Some(3));
    Ok(())
}

/// Verifies the active question and expansion toggles survive between runs.
#[test]
fn ui_state_persists_between_runs() -> Result<(), Box<dyn Error>> {
    let env = Env::new()?;
    env.init()?;

    env.json(&["question", "focus", "sample-q-003"])?;
    let shown = env.json(&["question", "show"])?;
    assert_eq!(shown["id"], "sample-q-003");
    assert_eq!(shown["active"], true);
    assert_eq!(shown["subTopic"], "Two Pointers");

    let list = env.json(&["list"])?;
    let strings = topic_id(&list, "Strings");
    let expanded = env.json(&["list", "--expand", &strings])?;
    let topic = expanded["topics"]
        .as_array()
        .and_then(|ts| ts.iter().find(|t| t["topic"]["title"] == "Strings"))
        .cloned()
        .unwrap_or_default();
    assert_eq!(topic["expanded"], true);

    let again = env.json(&["list"])?;
    assert_eq!(again["activeQuestionId"], "sample-q-003");
    Ok(())
}

/// Verifies CSV export to stdout and to a file, and import of a JSON export.
#[test]
fn export_and_import_round_trip() -> Result<(), Box<dyn Error>> {
    let env = Env::new()?;
    env.init()?;

    let output = env.cmd()?.args(["export", "csv", "--stdout"]).assert().success().get_output().clone();
    let csv = String::from_utf8(output.stdout)?;
    let mut lines = csv.lines();
    assert_eq!(lines.next().map(|l| l.starts_with("\"Title\",\"Status\"")), Some(true));
    assert_eq!(lines.count(), SAMPLE_QUESTIONS);

    let stats = env.json(&["export", "json"])?;
    let exported = Path::new(stats["path"].as_str().unwrap_or_default());
    let exported = env.dir.path().join(exported);
    assert!(exported.exists());

    env.json(&["clear"])?;
    assert_eq!(env.json(&["list"])?["visibleQuestions"], 0);

    let imported = env.json(&["import", exported.to_str().unwrap_or_default()])?;
    assert_eq!(imported["questions"], SAMPLE_QUESTIONS);
    assert_eq!(env.json(&["check"])?["ok"], true);
    Ok(())
}

/// Verifies every JSON document the CLI prints uses camelCase keys.
#[test]
fn json_output_uses_camel_case_keys() -> Result<(), Box<dyn Error>> {
    let env = Env::new()?;
    let mut documents = vec![env.init()?];

    env.json(&["question", "focus", "sample-q-003"])?;
    env.json(&["question", "done", "sample-q-003"])?;
    documents.push(env.json(&["question", "show"])?);
    documents.push(env.json(&["list", "--expand-all"])?);
    documents.push(env.json(&["stats"])?);
    documents.push(env.json(&["history"])?);

    let list = env.json(&["list"])?;
    documents.push(env.json(&["topic", "delete", &topic_id(&list, "Graphs")])?);
    documents.push(env.json(&["clear"])?);

    let output = env
        .cmd()?
        .args(["question", "show", "no-such-question", "--json"])
        .assert()
        .code(3)
        .get_output()
        .clone();
    documents.push(serde_json::from_slice(&output.stderr)?);

    let mut found = Vec::new();
    for document in &documents {
        snake_keys(document, &mut found);
    }
    assert!(found.is_empty(), "snake_case keys: {found:?}");

    assert_eq!(documents[1]["subTopic"], "Two Pointers");
    assert_eq!(documents[1]["parentType"], "subTopic");
    assert_eq!(documents[2]["topics"][0]["subTopics"].as_array().map(Vec::is_empty), Some(false));
    Ok(())
}
