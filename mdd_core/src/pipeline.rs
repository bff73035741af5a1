use std::sync::Arc;

use crate::Document;
use crate::MddResult;
use crate::RawDocument;
use crate::frontmatter::Extractor;
use crate::options::DocumentTransform;
use crate::options::ParseOptions;
use crate::render::Renderer;

/// A single stage of the transform chain.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Stage {
	/// Split raw text into frontmatter data and body.
	ExtractFrontmatter,
	/// Replace the body with its rendered form.
	RenderContent,
	/// Drop the pristine original text. Once dropped it is never
	/// reintroduced by a later stage.
	StripOriginal,
	/// Apply the caller-supplied transform.
	UserTransform,
}

/// The fixed-order transform chain applied to one raw document.
///
/// Built once per invocation from [`ParseOptions`] and applied left-to-right:
/// extract frontmatter, render content, then conditionally strip the
/// original text and apply the user transform. Stages are pure functions of
/// their input; failures propagate unchanged.
pub struct Pipeline {
	stages: Vec<Stage>,
	md: Arc<dyn Renderer>,
	frontmatter: Arc<dyn Extractor>,
	transform: Option<Arc<dyn DocumentTransform>>,
}

impl Pipeline {
	pub fn new(options: &ParseOptions) -> Self {
		let mut stages = vec![Stage::ExtractFrontmatter, Stage::RenderContent];

		if !options.original {
			stages.push(Stage::StripOriginal);
		}

		if options.transform.is_some() {
			stages.push(Stage::UserTransform);
		}

		Self {
			stages,
			md: Arc::clone(&options.md),
			frontmatter: Arc::clone(&options.frontmatter),
			transform: options.transform.clone(),
		}
	}

	/// Run the chain over a raw document, consuming it.
	pub fn apply(&self, raw: RawDocument) -> MddResult<Document> {
		tracing::trace!(source = %raw.source, stages = self.stages.len(), "applying pipeline");

		let mut document = Document::from_raw(raw.text);

		for stage in &self.stages {
			document = match stage {
				Stage::ExtractFrontmatter => self.extract(document)?,
				Stage::RenderContent => self.render(document)?,
				Stage::StripOriginal => strip_original(document),
				Stage::UserTransform => self.user_transform(document)?,
			};
		}

		Ok(document)
	}

	fn extract(&self, mut document: Document) -> MddResult<Document> {
		let extracted = self.frontmatter.extract(&document.content)?;
		document.data = extracted.data;
		document.content = extracted.body;
		Ok(document)
	}

	fn render(&self, mut document: Document) -> MddResult<Document> {
		document.content = self.md.render(&document.content)?;
		Ok(document)
	}

	fn user_transform(&self, document: Document) -> MddResult<Document> {
		match &self.transform {
			Some(transform) => transform.transform(document),
			None => Ok(document),
		}
	}
}

fn strip_original(mut document: Document) -> Document {
	document.orig = None;
	document
}
