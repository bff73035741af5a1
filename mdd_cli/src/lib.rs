use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Convert directories of markdown with frontmatter into JSON content maps, at run \
	         time or at bundle time.",
	long_about = "mdd (markdown directory) reads a directory tree of markdown documents — each \
	              an optional frontmatter header plus a markdown body — and produces a JSON \
	              mapping from derived keys to parsed documents.\n\nQuick start:\n  mdd parse \
	              ./posts          Print the content map for a directory\n  mdd parse \
	              ./post.md        Print one parsed document\n  mdd inline bundle.js       \
	              Rewrite file-API call sites into literals"
)]
pub struct MddCli {
	#[command(subcommand)]
	pub command: Commands,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Parse a directory (or single file) of markdown documents to JSON.
	///
	/// Directory targets produce a content map keyed by derived file names;
	/// file targets produce a single parsed document. Frontmatter becomes
	/// the `data` field and the rendered body the `content` field.
	Parse {
		/// Directory or file to parse.
		path: PathBuf,

		/// Glob selecting which files to parse in directory mode.
		#[arg(long, default_value = mdd_core::DEFAULT_FILTER)]
		filter: String,

		/// Glob excluding files in directory mode. Repeatable.
		#[arg(long)]
		ignore: Vec<String>,

		/// Keep file extensions in content-map keys.
		#[arg(long, default_value_t = false)]
		extensions: bool,

		/// Keep subdirectory prefixes in content-map keys.
		#[arg(long, default_value_t = false)]
		dirnames: bool,

		/// Include the pristine pre-render text as `orig` in each document.
		#[arg(long, default_value_t = false)]
		original: bool,

		/// Pretty-print the JSON output.
		#[arg(long, default_value_t = false)]
		pretty: bool,
	},
	/// Rewrite a source file, replacing file-API call sites with their
	/// precomputed results.
	///
	/// Statically resolvable calls to parseDir, parseDirSync, parseFile,
	/// and parseFileSync execute at transform time; sync call sites become
	/// JSON literals and async call sites defer their original callback to
	/// the next task-queue turn. The rewritten source needs no filesystem
	/// access at those sites, so a bundler can register this command as a
	/// transform hook for browser delivery.
	Inline {
		/// The source file to rewrite.
		file: PathBuf,

		/// Module specifier whose bindings mark call sites for rewriting.
		#[arg(long, default_value = mdd_core::DEFAULT_MODULE)]
		module: String,

		/// File-name glob excluded from rewriting entirely. Repeatable.
		/// Defaults to `*.json`.
		#[arg(long)]
		exclude: Vec<String>,

		/// Fail instead of passing through call sites whose arguments
		/// cannot be statically resolved.
		#[arg(long, default_value_t = false)]
		fail_on_unresolved: bool,

		/// Rewrite the file in place instead of printing to stdout.
		#[arg(long, default_value_t = false)]
		write: bool,
	},
}
