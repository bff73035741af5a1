mod common;

use mdd_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

fn posts_fixture() -> std::io::Result<tempfile::TempDir> {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("about.md"), "---\ntitle: foo\n---\nbar1")?;
	std::fs::create_dir_all(tmp.path().join("posts"))?;
	std::fs::write(tmp.path().join("posts/one.md"), "first post")?;
	std::fs::write(tmp.path().join("posts/two.md"), "second post")?;
	Ok(tmp)
}

#[test]
fn parse_directory_prints_a_content_map() -> AnyEmptyResult {
	let tmp = posts_fixture()?;

	let mut cmd = common::mdd_cmd();
	let assert = cmd.arg("parse").arg(tmp.path()).assert().success();

	let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
	let map: Value = serde_json::from_str(&stdout)?;
	assert_eq!(map.as_object().map(serde_json::Map::len), Some(3));
	assert_eq!(map["about"]["data"]["title"], Value::String("foo".into()));
	assert_eq!(
		map["about"]["content"],
		Value::String("<p>bar1</p>\n".into())
	);

	Ok(())
}

#[test]
fn parse_single_file_prints_one_document() -> AnyEmptyResult {
	let tmp = posts_fixture()?;

	let mut cmd = common::mdd_cmd();
	let _ = cmd
		.arg("parse")
		.arg(tmp.path().join("about.md"))
		.assert()
		.success()
		.stdout(predicates::str::contains("bar1").and(predicates::str::contains("foo")));

	Ok(())
}

#[test]
fn extensions_flag_keeps_extensions_in_keys() -> AnyEmptyResult {
	let tmp = posts_fixture()?;

	let mut cmd = common::mdd_cmd();
	let _ = cmd
		.arg("parse")
		.arg(tmp.path())
		.arg("--extensions")
		.assert()
		.success()
		.stdout(predicates::str::contains("\"about.md\""));

	Ok(())
}

#[test]
fn ignore_flag_excludes_files() -> AnyEmptyResult {
	let tmp = posts_fixture()?;

	let mut cmd = common::mdd_cmd();
	let assert = cmd
		.arg("parse")
		.arg(tmp.path())
		.arg("--ignore")
		.arg("**/two.md")
		.assert()
		.success();

	let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
	let map: Value = serde_json::from_str(&stdout)?;
	assert_eq!(map.as_object().map(serde_json::Map::len), Some(2));
	assert!(map.get("two").is_none());

	Ok(())
}

#[test]
fn missing_directory_fails_with_a_diagnostic() {
	let mut cmd = common::mdd_cmd();
	let _ = cmd
		.arg("parse")
		.arg("./definitely-not-here")
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("failed to read directory"));
}
