//! Integration tests for the mysql2pg binary.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn mysql2pg() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mysql2pg"))
}

const USERS_DUMP: &str = r#"-- MySQL dump 10.13  Distrib 5.5.40
/*!40101 SET @OLD_CHARACTER_SET_CLIENT=@@CHARACTER_SET_CLIENT */;
DROP TABLE IF EXISTS `users`;
CREATE TABLE `users` (
  `id` int(11) NOT NULL,
  `admin` tinyint(1) NOT NULL DEFAULT '0',
  `name` varchar(120) DEFAULT NULL,
  PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=latin1;
LOCK TABLES `users` WRITE;
INSERT INTO `users` VALUES (1,1,'Ann'),(2,0,'Bob\'s'),(3,0,NULL);
UNLOCK TABLES;
"#;

const TEAMS_DUMP: &str = r#"CREATE TABLE `teams` (
  `id` int(11) NOT NULL,
  `city` varchar(40) NOT NULL,
  KEY `city` (`city`)
) ENGINE=InnoDB DEFAULT CHARSET=latin1;
INSERT INTO `teams` VALUES (1,'Oslo'),(2,'Bergen, NO');
"#;

fn write_dump(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn convert(dir: &TempDir, inputs: &[&str], extra: &[&str]) -> std::process::Output {
    let out = dir.path().join("out");
    let schema = out.join("schema.sql");
    mysql2pg()
        .args(inputs)
        .args([
            "-o",
            out.to_str().unwrap(),
            "-s",
            schema.to_str().unwrap(),
        ])
        .args(extra)
        .output()
        .unwrap()
}

#[test]
fn test_end_to_end_single_table() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(dir.path(), "users.sql", USERS_DUMP);

    let output = convert(&dir, &[&input], &["-q"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let schema = fs::read_to_string(dir.path().join("out/schema.sql")).unwrap();
    let lines: Vec<&str> = schema.lines().collect();
    assert_eq!(
        lines,
        vec![
            "-- MySQL dump 10.13 Distrib 5.5.40",
            "DROP TABLE IF EXISTS users;",
            "CREATE TABLE users (",
            " id INTEGER NOT NULL,",
            " admin BOOLEAN NOT NULL DEFAULT '0',",
            " name TEXT DEFAULT NULL",
            ");",
            "CREATE UNIQUE INDEX users_id_idx ON users (id);",
        ]
    );
    assert_eq!(schema.matches("CREATE UNIQUE INDEX").count(), 1);

    let data = fs::read_to_string(dir.path().join("out/data_for_users.sql")).unwrap();
    assert_eq!(
        data,
        "INSERT INTO users VALUES (1,true,e'Ann'),(2,false,e'Bob''s'),(3,false,NULL);\n"
    );
}

#[test]
fn test_schema_accumulates_across_files() {
    let dir = TempDir::new().unwrap();
    let users = write_dump(dir.path(), "users.sql", USERS_DUMP);
    let teams = write_dump(dir.path(), "teams.sql", TEAMS_DUMP);

    let output = convert(&dir, &[&users, &teams], &["-q"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let schema = fs::read_to_string(dir.path().join("out/schema.sql")).unwrap();
    let users_at = schema.find("CREATE TABLE users (").unwrap();
    let teams_at = schema.find("CREATE TABLE teams (").unwrap();
    assert!(users_at < teams_at);
    assert!(schema.contains("CREATE INDEX teams_city_idx ON teams (city);"));

    let teams_data = fs::read_to_string(dir.path().join("out/data_for_teams.sql")).unwrap();
    assert_eq!(
        teams_data,
        "INSERT INTO teams VALUES (1,e'Oslo'),(2,e'Bergen, NO');\n"
    );
    assert!(dir.path().join("out/data_for_users.sql").exists());
}

#[test]
fn test_schema_file_recreated_each_run() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(dir.path(), "teams.sql", TEAMS_DUMP);

    assert!(convert(&dir, &[&input], &["-q"]).status.success());
    assert!(convert(&dir, &[&input], &["-q"]).status.success());

    let schema = fs::read_to_string(dir.path().join("out/schema.sql")).unwrap();
    assert_eq!(schema.matches("CREATE TABLE teams (").count(), 1);
    let data = fs::read_to_string(dir.path().join("out/data_for_teams.sql")).unwrap();
    assert_eq!(data.lines().count(), 1);
}

#[test]
fn test_glob_input() {
    let dir = TempDir::new().unwrap();
    let dumps = dir.path().join("dumps");
    fs::create_dir(&dumps).unwrap();
    write_dump(&dumps, "a_users.sql", USERS_DUMP);
    write_dump(&dumps, "b_teams.sql", TEAMS_DUMP);
    let pattern = dumps.join("*.sql");

    let output = convert(&dir, &[pattern.to_str().unwrap()], &["-q"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(dir.path().join("out/data_for_users.sql").exists());
    assert!(dir.path().join("out/data_for_teams.sql").exists());
}

#[test]
fn test_gzip_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("teams.sql.gz");
    let mut encoder = flate2::write::GzEncoder::new(
        fs::File::create(&path).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(TEAMS_DUMP.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let output = convert(&dir, &[path.to_str().unwrap()], &["-q"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let data = fs::read_to_string(dir.path().join("out/data_for_teams.sql")).unwrap();
    assert!(data.starts_with("INSERT INTO teams VALUES (1,e'Oslo')"));
}

#[test]
fn test_batch_size_flag() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(dir.path(), "users.sql", USERS_DUMP);

    let output = convert(&dir, &[&input], &["-q", "--batch-size", "2"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let data = fs::read_to_string(dir.path().join("out/data_for_users.sql")).unwrap();
    assert_eq!(data.lines().count(), 2);

    let output = convert(&dir, &[&input], &["-q", "--batch-size", "0"]);
    assert!(!output.status.success());
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    let users = write_dump(dir.path(), "users.sql", USERS_DUMP);
    let teams = write_dump(dir.path(), "teams.sql", TEAMS_DUMP);

    let output = convert(&dir, &[&users, &teams], &["-q", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["files"], 2);
    assert_eq!(json["tables"], 2);
    assert_eq!(json["indexes"], 2);
    assert_eq!(json["data"]["tuples"], 5);
    assert_eq!(json["data"]["tables"]["users"], 3);
    assert_eq!(json["data"]["tables"]["teams"], 2);
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(dir.path(), "users.sql", USERS_DUMP);

    let output = convert(&dir, &[&input], &["--dry-run", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(!dir.path().join("out").exists());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["tuples"], 3);
}

#[test]
fn test_announces_tables_on_stderr() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(dir.path(), "users.sql", USERS_DUMP);

    let output = convert(&dir, &[&input], &[]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Writing the data for the users table"));
}

#[test]
fn test_custom_dialect_config() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(
        dir.path(),
        "seasons.sql",
        "CREATE TABLE `seasons` (\n  `year` year(4) NOT NULL\n);\nINSERT INTO `seasons` VALUES (2024);\n",
    );
    let config = write_dump(dir.path(), "rules.yaml", "types:\n  \"year(4)\": INTEGER\n");

    let output = convert(&dir, &[&input], &["-q", "-c", &config]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let schema = fs::read_to_string(dir.path().join("out/schema.sql")).unwrap();
    assert!(schema.contains(" year INTEGER NOT NULL"));
}

#[test]
fn test_unknown_table_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(
        dir.path(),
        "broken.sql",
        "INSERT INTO `missing` VALUES (1,2);\n",
    );

    let output = convert(&dir, &[&input], &["-q"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing"), "stderr: {}", stderr);
}

#[test]
fn test_malformed_create_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_dump(
        dir.path(),
        "broken.sql",
        "CREATE TABLE `t` (\n  `id` int(11),\n  `broken`\n);\n",
    );

    let output = convert(&dir, &[&input], &["-q"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.sql");

    let output = convert(&dir, &[missing.to_str().unwrap()], &["-q"]);
    assert!(!output.status.success());
}
