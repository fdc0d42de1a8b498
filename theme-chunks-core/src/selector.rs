//! Textual selector prefixing.
//!
//! Every selector that precedes a rule body (directly, or through a comma
//! list) is prefixed with a theme scope, e.g. `.box {` becomes
//! `#pfx_dark .box {`. Segments starting with `@` (at-rules) or `/`
//! (comments) are left as they are. There is no CSS parser here: nesting
//! depth is not tracked, so rules inside an at-rule body are prefixed like
//! any other rule while the at-rule line itself is not.

use encoding_rs::Encoding;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

/// indent, selector, trailing whitespace, then `,` or `{`.
static SELECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s*)([^\r\n,{}]+)\s*(,|\s*\{)").expect("selector pattern compiles")
});

/// Decode `contents`, prefix its selectors, and re-encode with the same encoding.
///
/// Encodings that `encoding_rs` can only decode (UTF-16LE/BE, `replacement`)
/// would come back out as UTF-8, so their bytes are returned unchanged.
pub fn inject_selector_prefix(contents: &[u8], prefix: &str, encoding: &'static Encoding) -> Vec<u8> {
    if encoding.output_encoding() != encoding {
        debug!(encoding = encoding.name(), "Encoding cannot be written back, skipping prefix injection");
        return contents.to_vec();
    }
    let text = encoding.decode_without_bom_handling(contents).0;
    match prefix_selectors(&text, prefix) {
        Cow::Borrowed(_) => contents.to_vec(),
        Cow::Owned(rewritten) => encoding.encode(&rewritten).0.into_owned(),
    }
}

/// Prefix every rule selector in `text` with `prefix` followed by a space.
pub fn prefix_selectors<'t>(text: &'t str, prefix: &str) -> Cow<'t, str> {
    let mut out: Option<String> = None;
    let mut last = 0;

    for caps in SELECTOR_RE.captures_iter(text) {
        let (Some(whole), Some(indent), Some(selector), Some(terminator)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };

        // A comma only counts when a `{` opens before any `}` closes.
        if terminator.as_str() == "," && !opens_rule_body(&text[whole.end()..]) {
            continue;
        }
        let selector = selector.as_str();
        if selector.starts_with('@') || selector.starts_with('/') {
            continue;
        }

        let buf = out.get_or_insert_with(|| String::with_capacity(text.len() + prefix.len() * 8));
        buf.push_str(&text[last..whole.start()]);
        buf.push_str(indent.as_str());
        buf.push_str(prefix);
        buf.push(' ');
        buf.push_str(selector);
        buf.push_str(terminator.as_str());
        last = whole.end();
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&text[last..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(text),
    }
}

fn opens_rule_body(rest: &str) -> bool {
    rest.find(['{', '}'])
        .is_some_and(|idx| rest.as_bytes()[idx] == b'{')
}
