use crate::MddError;
use crate::MddResult;

/// Renders body text into final output text.
///
/// Any conforming implementation is substitutable via
/// [`ParseOptions::md`](crate::ParseOptions). Use [`render_fn`] to adapt a
/// plain closure.
pub trait Renderer: Send + Sync {
	fn render(&self, input: &str) -> MddResult<String>;
}

/// Adapter returned by [`render_fn`].
pub struct RenderFn<F>(F);

/// Adapt a closure into a [`Renderer`].
pub fn render_fn<F>(render: F) -> RenderFn<F>
where
	F: Fn(&str) -> MddResult<String> + Send + Sync,
{
	RenderFn(render)
}

impl<F> Renderer for RenderFn<F>
where
	F: Fn(&str) -> MddResult<String> + Send + Sync,
{
	fn render(&self, input: &str) -> MddResult<String> {
		(self.0)(input)
	}
}

/// The default renderer: commonmark to HTML via the `markdown` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonmarkRenderer;

impl Renderer for CommonmarkRenderer {
	fn render(&self, input: &str) -> MddResult<String> {
		let mut html = markdown::to_html_with_options(input, &markdown::Options::default())
			.map_err(|message| MddError::Render(message.to_string()))?;

		// Reference commonmark renderers terminate the final block with a
		// newline; normalize so output is stable across renderer versions.
		if !html.is_empty() && !html.ends_with('\n') {
			html.push('\n');
		}

		Ok(html)
	}
}
