//! CLI integration tests for the odm-openapi binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("odm-openapi"))
}

// Helper to create a temp model file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// Two models, one embedding a sub-schema and one referencing the other
const MODELS: &str = r#"{
    "schemas": { "address": { "city": { "type": "String", "required": true }, "_id": false } },
    "models": {
        "person": {
            "schema": {
                "name": { "type": "String", "required": true },
                "age": "Number",
                "home": { "$embed": "address" }
            }
        },
        "story": {
            "schema": {
                "title": { "type": "String", "required": true },
                "author": { "type": "ObjectId", "ref": "person" }
            }
        }
    }
}"#;

// === Generate Command Tests ===

mod generate_command {
    use super::*;

    #[test]
    fn generates_document() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);

        cmd()
            .args(["generate", models.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""openapi":"3.0.3""#))
            .stdout(predicate::str::contains(r#""/api/v1/story/{id}/shallow""#))
            .stdout(predicate::str::contains(r#""operationId":"getPersonCount""#));
    }

    #[test]
    fn title_and_version_override_base() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);
        let base = write_temp_file(
            &dir,
            "base.json",
            r#"{"info":{"title":"Base","version":"0.1.0"},"servers":[{"url":"/"}]}"#,
        );
        let output = dir.path().join("openapi.json");

        cmd()
            .args([
                "generate",
                models.to_str().unwrap(),
                "--base",
                base.to_str().unwrap(),
                "--title",
                "Stories",
                "--api-version",
                "2.0.0",
                "--output",
                output.to_str().unwrap(),
                "--pretty",
            ])
            .assert()
            .success();

        let written = fs::read_to_string(&output).unwrap();
        let document: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(document["info"]["title"], "Stories");
        assert_eq!(document["info"]["version"], "2.0.0");
        assert_eq!(document["servers"][0]["url"], "/");
        assert!(written.contains('\n'));
    }

    #[test]
    fn default_info_when_no_base() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);

        cmd()
            .args(["generate", models.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""title":"API""#));
    }

    #[test]
    fn invalid_base_document() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);
        let base = write_temp_file(&dir, "base.json", "[]");

        cmd()
            .args([
                "generate",
                models.to_str().unwrap(),
                "--base",
                base.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid base document"));
    }
}

// === Schema Command Tests ===

mod schema_command {
    use super::*;

    #[test]
    fn prints_entity_schema() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);

        cmd()
            .args(["schema", models.to_str().unwrap(), "--model", "person"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""required":["name"]"#))
            .stdout(predicate::str::contains(
                r#""home":{"type":"object","properties":{"city":{"type":"string"}},"required":["city"]}"#,
            ))
            .stdout(predicate::str::contains("__v").not());
    }

    #[test]
    fn unknown_model() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);

        cmd()
            .args(["schema", models.to_str().unwrap(), "--model", "ghost"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unknown model \"ghost\""));
    }

    #[test]
    fn cyclic_embed() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(
            &dir,
            "models.json",
            r#"{
                "schemas": { "node": { "child": { "$embed": "node" } } },
                "models": { "tree": { "schema": { "root": { "$embed": "node" } } } }
            }"#,
        );

        cmd()
            .args(["schema", models.to_str().unwrap(), "--model", "tree"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("cyclic embedded schema: node -> node"));
    }

    #[test]
    fn verbose_logs_to_stderr() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);

        cmd()
            .env_remove("RUST_LOG")
            .args(["-v", "schema", models.to_str().unwrap(), "--model", "story"])
            .assert()
            .success()
            .stderr(predicate::str::contains("assembled entity schema"));
    }
}

// === Validate Command Tests ===

mod validate_command {
    use super::*;

    #[test]
    fn valid_payload() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);
        let payload = write_temp_file(
            &dir,
            "payload.json",
            r#"{"title": "Flatland", "author": "5f1b0c"}"#,
        );

        cmd()
            .args([
                "validate",
                payload.to_str().unwrap(),
                "--models",
                models.to_str().unwrap(),
                "--model",
                "story",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn invalid_payload() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);
        let payload = write_temp_file(&dir, "payload.json", r#"{"name": "Ada", "age": "old"}"#);

        cmd()
            .args([
                "validate",
                payload.to_str().unwrap(),
                "--models",
                models.to_str().unwrap(),
                "--model",
                "person",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Validation failed"))
            .stderr(predicate::str::contains("/age"));
    }

    #[test]
    fn json_output_invalid() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);
        let payload = write_temp_file(&dir, "payload.json", r#"{}"#);

        cmd()
            .args([
                "validate",
                payload.to_str().unwrap(),
                "--models",
                models.to_str().unwrap(),
                "--model",
                "story",
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""errors""#));
    }

    #[test]
    fn json_output_missing_payload() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", MODELS);

        cmd()
            .args([
                "validate",
                "/nonexistent/payload.json",
                "--models",
                models.to_str().unwrap(),
                "--model",
                "story",
                "--json",
            ])
            .assert()
            .code(3)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains("loading payload"));
    }
}

// === Lint Command Tests ===

mod lint_command {
    use super::*;

    #[test]
    fn clean_directory() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "models.json", MODELS);

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 files checked, all passed"));
    }

    #[test]
    fn warnings_fail_only_in_strict_mode() {
        let dir = TempDir::new().unwrap();
        let file = write_temp_file(
            &dir,
            "models.json",
            r#"{"models": {"story": {"schema": {"author": {"type": "ObjectId", "ref": "ghost"}}}}}"#,
        );

        cmd()
            .args(["lint", file.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("W001"));

        cmd()
            .args(["lint", file.to_str().unwrap(), "--strict"])
            .assert()
            .code(1);
    }

    #[test]
    fn json_format() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "broken.json", "{ not json }");

        cmd()
            .args(["lint", dir.path().to_str().unwrap(), "--format", "json"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""code": "E001""#))
            .stdout(predicate::str::contains(r#""failed": 1"#));
    }

    #[test]
    fn missing_path() {
        cmd()
            .args(["lint", "/nonexistent/models"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("path not found"));
    }
}

// === Error Handling Tests ===

mod errors {
    use super::*;

    #[test]
    fn file_not_found() {
        cmd()
            .args(["generate", "/nonexistent/models.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn invalid_json() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(&dir, "models.json", "{ nope");

        cmd()
            .args(["generate", models.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn invalid_declaration() {
        let dir = TempDir::new().unwrap();
        let models = write_temp_file(
            &dir,
            "models.json",
            r#"{"models": {"person": {"schema": {"age": 12}}}}"#,
        );

        cmd()
            .args(["generate", models.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("/models/person/schema/age"));
    }

    #[test]
    fn missing_model_flag() {
        cmd()
            .args(["schema", "models.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--model"));
    }

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("generate"))
            .stdout(predicate::str::contains("lint"));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("odm-openapi"));
    }
}
