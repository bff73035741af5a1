use std::path::Path;
use std::sync::Arc;

use rstest::rstest;
use serde_json::Value;
use similar_asserts::assert_eq;

use super::*;

fn write_file(root: &Path, relative: &str, contents: impl AsRef<[u8]>) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, contents)
}

/// A directory with three markdown documents and one non-markdown file.
fn posts_fixture() -> AnyResult<tempfile::TempDir> {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "about.md", "---\ntitle: foo\n---\nbar1")?;
	write_file(tmp.path(), "posts/one.md", "---\ntitle: one\n---\nfirst post")?;
	write_file(tmp.path(), "posts/two.md", "---\ntitle: two\n---\nsecond post")?;
	write_file(tmp.path(), "notes.txt", "not markdown")?;
	Ok(tmp)
}

#[rstest]
#[case::default("posts/one.md", false, false, "one")]
#[case::extensions("posts/one.md", true, false, "one.md")]
#[case::dirnames("posts/one.md", false, true, "posts/one")]
#[case::both("posts/one.md", true, true, "posts/one.md")]
#[case::top_level("one.md", false, false, "one")]
#[case::nested("a/b/c/deep.md", false, true, "a/b/c/deep")]
#[case::dotfile(".gitignore", false, false, ".gitignore")]
#[case::multiple_dots("post.draft.md", false, false, "post.draft")]
fn derives_content_map_keys(
	#[case] relative_path: &str,
	#[case] extensions: bool,
	#[case] dirnames: bool,
	#[case] expected: &str,
) {
	assert_eq!(derive_key(relative_path, extensions, dirnames), expected);
}

#[test]
fn extracts_yaml_frontmatter() -> MddResult<()> {
	let extracted = YamlFrontmatter.extract("---\ntitle: foo\ndraft: true\n---\nbar1")?;
	assert_eq!(extracted.data["title"], Value::String("foo".to_string()));
	assert_eq!(extracted.data["draft"], Value::Bool(true));
	assert_eq!(extracted.body, "bar1");

	Ok(())
}

#[test]
fn file_without_header_has_empty_data() -> MddResult<()> {
	let extracted = YamlFrontmatter.extract("just a body\n")?;
	assert!(extracted.data.is_empty());
	assert_eq!(extracted.body, "just a body\n");

	Ok(())
}

#[test]
fn empty_header_is_allowed() -> MddResult<()> {
	let extracted = YamlFrontmatter.extract("---\n---\nbody")?;
	assert!(extracted.data.is_empty());
	assert_eq!(extracted.body, "body");

	Ok(())
}

#[test]
fn unterminated_header_is_an_extraction_error() {
	let result = YamlFrontmatter.extract("---\ntitle: foo\nbar1");
	assert!(matches!(result, Err(MddError::Frontmatter(_))));
}

#[test]
fn non_mapping_header_is_an_extraction_error() {
	let result = YamlFrontmatter.extract("---\n42\n---\nbody");
	assert!(matches!(result, Err(MddError::Frontmatter(_))));
}

#[test]
fn renders_commonmark_with_trailing_newline() -> MddResult<()> {
	assert_eq!(CommonmarkRenderer.render("bar1")?, "<p>bar1</p>\n");
	assert_eq!(CommonmarkRenderer.render("")?, "");

	Ok(())
}

#[test]
fn parses_a_single_file() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let document = parse_file_sync(tmp.path().join("about.md"), &ParseOptions::default())?;

	assert_eq!(document.data["title"], Value::String("foo".to_string()));
	assert_eq!(document.content, "<p>bar1</p>\n");
	assert_eq!(document.orig, None);

	Ok(())
}

#[test]
fn original_option_keeps_pristine_text() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions {
		original: true,
		..ParseOptions::default()
	};
	let document = parse_file_sync(tmp.path().join("about.md"), &options)?;

	assert_eq!(document.orig.as_deref(), Some("---\ntitle: foo\n---\nbar1"));

	Ok(())
}

#[test]
fn orig_is_absent_from_serialized_output_when_stripped() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let document = parse_file_sync(tmp.path().join("about.md"), &ParseOptions::default())?;
	let value = serde_json::to_value(&document)?;

	assert!(value.get("orig").is_none());

	Ok(())
}

#[test]
fn parses_a_directory_into_a_content_map() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let contents = parse_dir_sync(tmp.path(), &ParseOptions::default())?;

	assert_eq!(contents.len(), 3);
	let keys: Vec<&str> = contents.keys().map(String::as_str).collect();
	assert_eq!(keys, vec!["about", "one", "two"]);
	assert_eq!(contents["about"].content, "<p>bar1</p>\n");

	Ok(())
}

#[tokio::test]
async fn async_directory_parse_equals_sync() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions::default();

	let sync_map = parse_dir_sync(tmp.path(), &options)?;
	let async_map = parse_dir(tmp.path(), &options).await?;
	assert_eq!(async_map, sync_map);

	Ok(())
}

#[tokio::test]
async fn async_file_parse_equals_sync() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions::default();
	let path = tmp.path().join("about.md");

	let sync_document = parse_file_sync(&path, &options)?;
	let async_document = parse_file(&path, &options).await?;
	assert_eq!(async_document, sync_document);

	Ok(())
}

#[test]
fn parsing_is_idempotent() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions::default();

	let first = parse_dir_sync(tmp.path(), &options)?;
	let second = parse_dir_sync(tmp.path(), &options)?;
	assert_eq!(first, second);

	Ok(())
}

#[test]
fn colliding_keys_keep_the_later_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "a/post.md", "from a")?;
	write_file(tmp.path(), "b/post.md", "from b")?;

	let contents = parse_dir_sync(tmp.path(), &ParseOptions::default())?;

	// Both files derive the key `post`; sorted traversal makes `b/post.md`
	// the later one, so it wins.
	assert_eq!(contents.len(), 1);
	assert_eq!(contents["post"].content, "<p>from b</p>\n");

	Ok(())
}

#[test]
fn filter_narrows_the_result_set() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions {
		filter: "posts/*.md".to_string(),
		..ParseOptions::default()
	};

	let contents = parse_dir_sync(tmp.path(), &options)?;
	assert_eq!(contents.len(), 2);
	assert!(contents.contains_key("one"));
	assert!(contents.contains_key("two"));

	Ok(())
}

#[test]
fn ignore_patterns_exclude_files() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions {
		ignore: vec!["**/two.md".to_string()],
		..ParseOptions::default()
	};

	let contents = parse_dir_sync(tmp.path(), &options)?;
	assert_eq!(contents.len(), 2);
	assert!(!contents.contains_key("two"));

	Ok(())
}

#[test]
fn user_transform_is_applied_to_every_entry() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions {
		transform: Some(Arc::new(transform_fn(|mut document: Document| {
			document
				.data
				.insert("custom".to_string(), Value::String("baz".to_string()));
			Ok(document)
		}))),
		..ParseOptions::default()
	};

	let contents = parse_dir_sync(tmp.path(), &options)?;
	assert_eq!(contents.len(), 3);
	for document in contents.values() {
		assert_eq!(document.data["custom"], Value::String("baz".to_string()));
	}

	Ok(())
}

#[test]
fn user_transform_failure_propagates() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions {
		transform: Some(Arc::new(transform_fn(|_: Document| {
			Err(MddError::Transform("boom".to_string()))
		}))),
		..ParseOptions::default()
	};

	let result = parse_dir_sync(tmp.path(), &options);
	assert!(matches!(result, Err(MddError::Transform(_))));

	Ok(())
}

#[test]
fn custom_renderer_is_substitutable() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions {
		md: Arc::new(render_fn(|input: &str| Ok(input.to_uppercase()))),
		..ParseOptions::default()
	};

	let document = parse_file_sync(tmp.path().join("about.md"), &options)?;
	assert_eq!(document.content, "BAR1");

	Ok(())
}

#[test]
fn custom_renderer_failure_propagates() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions {
		md: Arc::new(render_fn(|_: &str| {
			Err(MddError::Render("bad markup".to_string()))
		})),
		..ParseOptions::default()
	};

	let result = parse_dir_sync(tmp.path(), &options);
	assert!(matches!(result, Err(MddError::Render(_))));

	Ok(())
}

#[test]
fn custom_extractor_is_substitutable() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions {
		frontmatter: Arc::new(extract_fn(|input: &str| {
			Ok(Extracted {
				data: serde_json::Map::new(),
				body: input.to_string(),
			})
		})),
		..ParseOptions::default()
	};

	let document = parse_file_sync(tmp.path().join("about.md"), &options)?;
	assert!(document.data.is_empty());
	assert!(document.content.contains("title: foo"));

	Ok(())
}

#[test]
fn missing_directory_is_a_directory_read_error() {
	let result = parse_dir_sync(Path::new("./does-not-exist"), &ParseOptions::default());
	assert!(matches!(result, Err(MddError::DirectoryRead { .. })));
}

#[test]
fn invalid_filter_glob_is_rejected() -> AnyEmptyResult {
	let tmp = posts_fixture()?;
	let options = ParseOptions {
		filter: "a{".to_string(),
		..ParseOptions::default()
	};

	let result = parse_dir_sync(tmp.path(), &options);
	assert!(matches!(result, Err(MddError::InvalidGlob { .. })));

	Ok(())
}

#[test]
fn strict_utf8_rejects_invalid_bytes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "bad.md", [0xff_u8, 0xfe, 0x68, 0x69])?;

	let result = parse_dir_sync(tmp.path(), &ParseOptions::default());
	assert!(matches!(result, Err(MddError::Encoding { .. })));

	let options = ParseOptions {
		encoding: Encoding::Utf8Lossy,
		..ParseOptions::default()
	};
	let contents = parse_dir_sync(tmp.path(), &options)?;
	assert_eq!(contents.len(), 1);

	Ok(())
}

mod scanner {
	use similar_asserts::assert_eq;

	use super::*;

	#[test]
	fn finds_namespace_bound_calls() {
		let source = "var md = require('mdd');\nvar contents = md.parseDirSync('./posts');\n";
		let calls = scan_source(source, "mdd");

		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].entry, EntryPoint::DirSync);
		assert!(matches!(
			&calls[0].resolution,
			Resolution::Resolved { path, callback: None, .. } if path == "./posts"
		));
	}

	#[test]
	fn finds_destructured_and_renamed_bindings() {
		let source =
			"const { parseFileSync: pfs, parseDir } = require('mdd');\nconst doc = \
			 pfs('./post.md');\nparseDir('./posts', function (err, contents) {});\n";
		let calls = scan_source(source, "mdd");

		assert_eq!(calls.len(), 2);
		assert_eq!(calls[0].entry, EntryPoint::FileSync);
		assert_eq!(calls[1].entry, EntryPoint::DirAsync);
		assert!(matches!(
			&calls[1].resolution,
			Resolution::Resolved {
				callback: Some(_),
				..
			}
		));
	}

	#[test]
	fn resolves_literal_options_objects() {
		let source = "var md = require('mdd');\nmd.parseDirSync('./posts', { extensions: true, \
		              filter: '**/*.md', ignore: ['drafts/**', 'tmp/**'] });\n";
		let calls = scan_source(source, "mdd");

		assert_eq!(calls.len(), 1);
		let Resolution::Resolved { options, .. } = &calls[0].resolution else {
			panic!("expected resolved call");
		};
		assert_eq!(options.extensions, Some(true));
		assert_eq!(options.filter.as_deref(), Some("**/*.md"));
		assert_eq!(options.ignore, vec!["drafts/**", "tmp/**"]);
	}

	#[test]
	fn non_literal_path_is_unresolved() {
		let source = "var md = require('mdd');\nmd.parseDirSync(someDir);\n";
		let calls = scan_source(source, "mdd");

		assert_eq!(calls.len(), 1);
		assert!(matches!(
			&calls[0].resolution,
			Resolution::Unresolved { .. }
		));
	}

	#[test]
	fn function_valued_options_are_unresolved() {
		let source = "var md = require('mdd');\nmd.parseDirSync('./posts', { transform: \
		              function (d) { return d; } });\n";
		let calls = scan_source(source, "mdd");

		assert_eq!(calls.len(), 1);
		assert!(matches!(
			&calls[0].resolution,
			Resolution::Unresolved { .. }
		));
	}

	#[test]
	fn other_modules_are_not_scanned() {
		let source = "var md = require('other-module');\nmd.parseDirSync('./posts');\n";
		assert!(scan_source(source, "mdd").is_empty());
	}

	#[test]
	fn calls_inside_strings_and_comments_are_ignored() {
		let source = "var md = require('mdd');\nvar s = \"md.parseDirSync('./x')\";\n// \
		              md.parseDirSync('./y')\n/* md.parseFile('./z', cb) */\n";
		assert!(scan_source(source, "mdd").is_empty());
	}

	#[test]
	fn foreign_methods_on_the_binding_are_ignored() {
		let source = "var md = require('mdd');\nmd.somethingElse('./posts');\n";
		assert!(scan_source(source, "mdd").is_empty());
	}
}

mod rewrite {
	use similar_asserts::assert_eq;

	use super::*;

	fn hello_fixture() -> AnyResult<tempfile::TempDir> {
		let tmp = tempfile::tempdir()?;
		write_file(tmp.path(), "posts/hello.md", "hello world")?;
		Ok(tmp)
	}

	#[test]
	fn inlines_sync_directory_calls_as_json_literals() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source = "var md = require('mdd');\nvar contents = md.parseDirSync('./posts');\n";

		let output = inline_source(
			source,
			&tmp.path().join("app.js"),
			&InlineOptions::default(),
		)?;

		assert!(output.contains("hello world"));
		assert!(!output.contains("parseDirSync("));
		// The splice is a valid JSON literal in expression position.
		let start = output.find("var contents = ").unwrap() + "var contents = ".len();
		let end = output[start..].find(";\n").unwrap() + start;
		let map: ContentMap = serde_json::from_str(&output[start..end])?;
		assert_eq!(map["hello"].content, "<p>hello world</p>\n");

		Ok(())
	}

	#[test]
	fn inlines_async_calls_as_deferred_callbacks() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source = "var md = require('mdd');\nmd.parseDir('./posts', function (err, contents) \
		              {\n  console.log(contents);\n});\n";

		let output = inline_source(
			source,
			&tmp.path().join("app.js"),
			&InlineOptions::default(),
		)?;

		assert!(output.contains("hello world"));
		assert!(output.contains("process.nextTick(function(){(function (err, contents)"));
		assert!(output.contains(")(null,{"));

		Ok(())
	}

	#[test]
	fn inlines_single_file_calls() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source =
			"var md = require('mdd');\nvar doc = md.parseFileSync('./posts/hello.md');\n";

		let output = inline_source(
			source,
			&tmp.path().join("app.js"),
			&InlineOptions::default(),
		)?;

		assert!(output.contains("<p>hello world</p>"));
		assert!(!output.contains("parseFileSync("));

		Ok(())
	}

	#[test]
	fn relative_paths_resolve_against_the_source_file() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		std::fs::create_dir_all(tmp.path().join("src"))?;
		let source = "var md = require('mdd');\nvar contents = md.parseDirSync('../posts');\n";

		let output = inline_source(
			source,
			&tmp.path().join("src/app.js"),
			&InlineOptions::default(),
		)?;

		assert!(output.contains("hello world"));

		Ok(())
	}

	#[test]
	fn literal_options_are_honored_at_rewrite_time() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source = "var md = require('mdd');\nvar contents = md.parseDirSync('./posts', { \
		              extensions: true });\n";

		let output = inline_source(
			source,
			&tmp.path().join("app.js"),
			&InlineOptions::default(),
		)?;

		assert!(output.contains("\"hello.md\""));

		Ok(())
	}

	#[test]
	fn excluded_files_pass_through_byte_identical() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source = "{ \"md\": \"require('mdd')\" }\n";

		let output = inline_source(
			source,
			&tmp.path().join("data.json"),
			&InlineOptions::default(),
		)?;
		assert_eq!(output, source);

		Ok(())
	}

	#[test]
	fn sources_without_bindings_pass_through() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source = "console.log('no calls here');\n";

		let output = inline_source(
			source,
			&tmp.path().join("app.js"),
			&InlineOptions::default(),
		)?;
		assert_eq!(output, source);

		Ok(())
	}

	#[test]
	fn unresolved_call_sites_are_left_untouched() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source = "var md = require('mdd');\nvar contents = md.parseDirSync(dynamicDir);\n";

		let output = inline_source(
			source,
			&tmp.path().join("app.js"),
			&InlineOptions::default(),
		)?;
		assert_eq!(output, source);

		Ok(())
	}

	#[test]
	fn fail_on_unresolved_aborts_the_rewrite() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source = "var md = require('mdd');\nvar contents = md.parseDirSync(dynamicDir);\n";
		let options = InlineOptions {
			fail_on_unresolved: true,
			..InlineOptions::default()
		};

		let result = inline_source(source, &tmp.path().join("app.js"), &options);
		assert!(matches!(result, Err(MddError::UnresolvedCall { .. })));

		Ok(())
	}

	#[test]
	fn execution_failure_aborts_the_rewrite() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source = "var md = require('mdd');\nvar contents = md.parseDirSync('./missing');\n";

		let result = inline_source(
			source,
			&tmp.path().join("app.js"),
			&InlineOptions::default(),
		);
		assert!(matches!(result, Err(MddError::DirectoryRead { .. })));

		Ok(())
	}

	#[test]
	fn rewrites_multiple_call_sites_in_order() -> AnyEmptyResult {
		let tmp = hello_fixture()?;
		let source = "var md = require('mdd');\nvar a = md.parseDirSync('./posts');\nvar b = \
		              md.parseFileSync('./posts/hello.md');\n";

		let output = inline_source(
			source,
			&tmp.path().join("app.js"),
			&InlineOptions::default(),
		)?;

		assert!(!output.contains("parseDirSync("));
		assert!(!output.contains("parseFileSync("));
		assert_eq!(output.matches("hello world").count(), 2);

		Ok(())
	}
}
