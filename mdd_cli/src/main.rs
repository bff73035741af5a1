use std::path::Path;
use std::process;

use clap::Parser;
use mdd_cli::Commands;
use mdd_cli::MddCli;
use mdd_core::AnyEmptyResult;
use mdd_core::InlineOptions;
use mdd_core::ParseOptions;
use mdd_core::inline_file;
use mdd_core::parse_dir_sync;
use mdd_core::parse_file_sync;

fn main() {
	let args = MddCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	if args.verbose {
		tracing_subscriber::fmt()
			.with_env_filter(
				tracing_subscriber::EnvFilter::try_from_default_env()
					.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mdd_core=debug")),
			)
			.with_writer(std::io::stderr)
			.init();
	}

	let result = match args.command {
		Commands::Parse {
			path,
			filter,
			ignore,
			extensions,
			dirnames,
			original,
			pretty,
		} => run_parse(
			&path, filter, ignore, extensions, dirnames, original, pretty,
		),
		Commands::Inline {
			file,
			module,
			exclude,
			fail_on_unresolved,
			write,
		} => run_inline(&file, module, exclude, fail_on_unresolved, write),
	};

	if let Err(e) = result {
		// Render through miette for rich diagnostics with help text and
		// error codes where possible.
		match e.downcast::<mdd_core::MddError>() {
			Ok(mdd_err) => {
				let report: miette::Report = (*mdd_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("error: {e}");
			}
		}
		process::exit(2);
	}
}

#[allow(clippy::fn_params_excessive_bools)]
fn run_parse(
	path: &Path,
	filter: String,
	ignore: Vec<String>,
	extensions: bool,
	dirnames: bool,
	original: bool,
	pretty: bool,
) -> AnyEmptyResult {
	let options = ParseOptions {
		filter,
		ignore,
		extensions,
		dirnames,
		original,
		..ParseOptions::default()
	};

	let json = if path.is_file() {
		let document = parse_file_sync(path, &options)?;
		to_json(&document, pretty)?
	} else {
		let contents = parse_dir_sync(path, &options)?;
		to_json(&contents, pretty)?
	};

	println!("{json}");
	Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
	if pretty {
		serde_json::to_string_pretty(value)
	} else {
		serde_json::to_string(value)
	}
}

fn run_inline(
	file: &Path,
	module: String,
	exclude: Vec<String>,
	fail_on_unresolved: bool,
	write: bool,
) -> AnyEmptyResult {
	let defaults = InlineOptions::default();
	let options = InlineOptions {
		module,
		exclude: if exclude.is_empty() {
			defaults.exclude
		} else {
			exclude
		},
		fail_on_unresolved,
	};

	let output = inline_file(file, &options)?;

	if write {
		std::fs::write(file, output)?;
	} else {
		print!("{output}");
	}

	Ok(())
}
