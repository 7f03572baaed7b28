use std::collections::HashMap;

use pulldown_cmark::{html, Options, Parser};
use tera::Value;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// Renders Markdown to HTML.
pub fn markdown_to_html(text: &str) -> String {
	let mut options = Options::empty();
	options.insert(Options::ENABLE_TABLES);
	options.insert(Options::ENABLE_FOOTNOTES);
	options.insert(Options::ENABLE_STRIKETHROUGH);

	let mut output = String::with_capacity(text.len() * 3 / 2);
	html::push_html(&mut output, Parser::new_ext(text, options));

	output
}

fn tag_name(tag: &str) -> &str {
	let end = tag
		.find(|c: char| c.is_whitespace() || c == '>' || c == '/')
		.unwrap_or(tag.len());

	&tag[..end]
}

/// Updates the stack of open elements with a single tag like `<p>` or `</em>`.
fn track<'a>(tag: &'a str, open: &mut Vec<&'a str>) {
	if tag.starts_with("<!") || tag.starts_with("<?") || tag.ends_with("/>") {
		return;
	}

	if let Some(closing) = tag.strip_prefix("</") {
		let name = tag_name(closing);

		if let Some(position) = open.iter().rposition(|element| element.eq_ignore_ascii_case(name)) {
			open.truncate(position);
		}

		return;
	}

	let name = tag_name(&tag[1..]);
	let void = VOID_ELEMENTS
		.iter()
		.any(|element| element.eq_ignore_ascii_case(name));

	if !name.is_empty() && !void {
		open.push(name);
	}
}

/// Keeps the first `count` words of an HTML fragment.
///
/// Tags do not count as words. When words are dropped, ` …` is appended
/// and every element still open at the cut is closed.
pub fn truncate_words_html(html: &str, count: usize) -> String {
	if count == 0 {
		return String::new();
	}

	let mut output = String::with_capacity(html.len());
	let mut open = Vec::new();
	let mut words = 0;
	let mut rest = html;

	while !rest.is_empty() {
		if rest.starts_with('<') {
			let end = rest.find('>').map_or(rest.len(), |i| i + 1);
			let (tag, tail) = rest.split_at(end);

			track(tag, &mut open);
			output.push_str(tag);
			rest = tail;

			continue;
		}

		let end = rest.find('<').unwrap_or(rest.len());
		let (text, tail) = rest.split_at(end);
		let mut in_word = false;

		for (i, c) in text.char_indices() {
			if c.is_whitespace() {
				in_word = false;
				continue;
			}

			if in_word {
				continue;
			}

			in_word = true;
			words += 1;

			if words > count {
				output.push_str(text[..i].trim_end());
				output.push_str(" …");

				for name in open.iter().rev() {
					output.push_str("</");
					output.push_str(name);
					output.push('>');
				}

				return output;
			}
		}

		output.push_str(text);
		rest = tail;
	}

	output
}

/// `{{ post.body | markdown | safe }}`
pub fn markdown(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
	match value.as_str() {
		Some(text) => Ok(Value::String(markdown_to_html(text))),
		None => Ok(value.clone()),
	}
}

/// `{{ html | truncatewords_html(count=30) | safe }}`
pub fn truncatewords_html(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
	let count = args
		.get("count")
		.and_then(Value::as_u64)
		.ok_or_else(|| tera::Error::msg("truncatewords_html requires a `count` argument"))?;

	match value.as_str() {
		Some(html) => Ok(Value::String(truncate_words_html(
			html,
			usize::try_from(count).unwrap_or(usize::MAX),
		))),
		None => Ok(value.clone()),
	}
}
