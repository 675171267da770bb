//! Hugo shortcode rewriting
//!
//! Shortcodes are rewritten by an ordered list of rules. Each rule pairs a
//! pattern with a rewrite function and is applied to the whole body before
//! the next rule runs, so paired forms come before loose ones and the more
//! specific argument shapes of a shortcode come before the looser shapes.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;

use crate::stats::RunStats;

/// Number of unconverted shortcodes listed in a warning
const PREVIEW_LEN: usize = 3;

type RewriteFn = fn(&Captures) -> String;

/// A single shortcode rewrite rule
#[derive(Debug, Clone)]
pub struct ShortcodeRule {
    name: String,
    pattern: Regex,
    rewrite: RewriteFn,
}

impl ShortcodeRule {
    fn new(name: &str, pattern: &str, rewrite: RewriteFn) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            pattern: Regex::new(pattern)?,
            rewrite,
        })
    }

    /// Rule deleting a presentational shortcode (and its closing tag, if any)
    fn removal(name: &str) -> Result<Self, regex::Error> {
        let pattern = format!(r"\{{\{{<\s*/?\s*{}(?:\s+[^>]*)?\s*>\}}\}}", regex::escape(name));
        Self::new(name, &pattern, |_| String::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rewrite every occurrence of this rule's shortcode in `text`
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern
            .replace_all(text, |caps: &Captures| (self.rewrite)(caps))
    }
}

/// Wrap a link so it stands as its own paragraph
fn paragraph(text: String) -> String {
    format!("\n\n{}\n\n", text)
}

/// Fenced `:::kind` directive block with an optional title
fn callout(kind: &str, caps: &Captures) -> String {
    let inner = caps[2].trim_matches(|c: char| c == '\n' || c == '\r');
    match caps.get(1) {
        Some(title) => format!(":::{}{{title=\"{}\"}}\n{}\n:::", kind, title.as_str(), inner),
        None => format!(":::{}\n{}\n:::", kind, inner),
    }
}

fn blockquote(text: &str) -> String {
    text.trim()
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn builtin_rules() -> Result<Vec<ShortcodeRule>, regex::Error> {
    Ok(vec![
        ShortcodeRule::new("youtube", r"\{\{<\s*youtube\s+([^\s>]+)\s*>\}\}", |c| {
            paragraph(format!(
                "[Watch on YouTube](https://www.youtube.com/watch?v={})",
                &c[1]
            ))
        })?,
        ShortcodeRule::new("gist", r"\{\{<\s*gist\s+(\S+)\s+([^\s>]+)\s*>\}\}", |c| {
            paragraph(format!("[View Gist](https://gist.github.com/{}/{})", &c[1], &c[2]))
        })?,
        // Both keyword orders; the user-first alternative is tried first
        ShortcodeRule::new(
            "x",
            r#"\{\{<\s*x\s+(?:user="(?P<u1>[^"]+)"\s+id="(?P<i1>[^"]+)"|id="(?P<i2>[^"]+)"\s+user="(?P<u2>[^"]+)")\s*>\}\}"#,
            |c| {
                let user = c.name("u1").or_else(|| c.name("u2")).map_or("", |m| m.as_str());
                let id = c.name("i1").or_else(|| c.name("i2")).map_or("", |m| m.as_str());
                format!("[View post by @{}](https://x.com/{}/status/{})", user, user, id)
            },
        )?,
        ShortcodeRule::new("x", r#"\{\{<\s*x\s+id="([^"]+)"\s*>\}\}"#, |c| {
            format!("[View post](https://x.com/i/status/{})", &c[1])
        })?,
        ShortcodeRule::new("x", r#"\{\{<\s*x(?:\s+user="[^"]*")?\s*>\}\}"#, |_| String::new())?,
        ShortcodeRule::new("twitter", r"\{\{<\s*twitter\s+([^\s>]+)\s*>\}\}", |c| {
            format!("[View post](https://twitter.com/i/web/status/{})", &c[1])
        })?,
        ShortcodeRule::new(
            "tip",
            r#"(?s)\{\{<\s*tip(?:\s+title="([^"]+)")?\s*>\}\}(.*?)\{\{<\s*/\s*tip\s*>\}\}"#,
            |c| callout("tip", c),
        )?,
        ShortcodeRule::new(
            "note",
            r#"(?s)\{\{<\s*note(?:\s+title="([^"]+)")?\s*>\}\}(.*?)\{\{<\s*/\s*note\s*>\}\}"#,
            |c| callout("note", c),
        )?,
        ShortcodeRule::new(
            "quote",
            r"(?s)\{\{<\s*quote(?:\s+[^>]*)?\s*>\}\}(.*?)\{\{<\s*/\s*quote\s*>\}\}",
            |c| blockquote(&c[1]),
        )?,
        ShortcodeRule::new("i", r#"\{\{<\s*i\s+"?fa-[^\s">]+"?\s*>\}\}"#, |_| String::new())?,
        ShortcodeRule::new("line-break", r"\{\{<\s*line-break\s*>\}\}", |_| {
            "\n\n".to_string()
        })?,
        ShortcodeRule::new("blazor-repl", r#"\{\{<\s*blazor-repl\s+id="([^"]+)"\s*>\}\}"#, |c| {
            paragraph(format!(
                "**Interactive Demo**: [View on Blazor REPL](https://blazorrepl.telerik.com/repl/{})",
                &c[1]
            ))
        })?,
        ShortcodeRule::new(
            "codepen",
            r#"\{\{<\s*codepen\s+id="([^"]+)"(?:\s+height="[^"]+")?\s*>\}\}"#,
            |c| paragraph(format!("[View on CodePen](https://codepen.io/pen/{})", &c[1])),
        )?,
        ShortcodeRule::new("codepen", r"\{\{<\s*codepen\s*>\}\}", |_| String::new())?,
        ShortcodeRule::new(
            "yt-comment",
            r#"(?s)\{\{<\s*yt-comment\s+href="([^"]+)"\s+name="([^"]+)"\s*>\}\}(.*?)\{\{<\s*/\s*yt-comment\s*>\}\}"#,
            |c| {
                paragraph(format!(
                    "**{}** [commented]({}):\n{}",
                    &c[2],
                    &c[1],
                    blockquote(&c[3])
                ))
            },
        )?,
        ShortcodeRule::new(
            "img-post",
            r#"\{\{<\s*(?:img-post|clickable-image)\s+path="([^"]+)"\s+file="([^"]+)"\s+alt="([^"]+)"[^>]*>\}\}"#,
            |c| format!("![{}]({}/{})", &c[3], c[1].trim_end_matches('/'), &c[2]),
        )?,
        // A link whose target is an internal reference keeps only its text
        ShortcodeRule::new(
            "url-link",
            r#"\{\{<\s*url-link\s+"([^"]+)"\s+"\{\{<\s*(?:rel)?ref\s+"[^"]*"\s*>\}\}"\s*>\}\}"#,
            |c| c[1].to_string(),
        )?,
        ShortcodeRule::new(
            "url-link",
            r#"\{\{<\s*url-link\s+"([^"]+)"\s+"([^"]+)"\s*>\}\}"#,
            |c| format!("[{}]({})", &c[1], &c[2]),
        )?,
        ShortcodeRule::new("relref", r#"\{\{<\s*(?:rel)?ref\s+"[^"]+"\s*>\}\}"#, |_| {
            String::new()
        })?,
        ShortcodeRule::new("video", r#"\{\{<\s*video\s+src="([^"]+)"[^>]*>\}\}"#, |c| {
            format!("<video controls src=\"{}\"></video>", &c[1])
        })?,
    ])
}

lazy_static! {
    static ref BUILTIN_RULES: Vec<ShortcodeRule> =
        builtin_rules().expect("built-in shortcode patterns are valid");
    static ref ANY_SHORTCODE: Regex =
        Regex::new(r"(?s)\{\{[<%].*?[>%]\}\}").expect("shortcode pattern is valid");
}

/// Rewrites the shortcode catalog in post bodies
#[derive(Debug, Clone)]
pub struct ShortcodeRewriter {
    rules: Vec<ShortcodeRule>,
}

impl ShortcodeRewriter {
    /// Built-in catalog followed by a removal rule for each name in `removed`
    pub fn new<S: AsRef<str>>(removed: &[S]) -> Result<Self, regex::Error> {
        let mut rules = BUILTIN_RULES.clone();
        for name in removed {
            rules.push(ShortcodeRule::removal(name.as_ref())?);
        }
        Ok(Self { rules })
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[ShortcodeRule] {
        &self.rules
    }

    /// Apply every rule in order
    pub fn rewrite(&self, body: &str) -> String {
        let mut text = body.to_string();
        for rule in &self.rules {
            let rewritten = match rule.apply(&text) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(rewritten) => rewritten,
            };
            text = rewritten;
        }
        text
    }

    /// Rewrite `body` and record a warning for shortcodes left behind
    pub fn rewrite_post(&self, body: &str, filename: &str, stats: &mut RunStats) -> String {
        let converted = self.rewrite(body);

        let leftovers = unconverted(&converted);
        if !leftovers.is_empty() {
            let preview = leftovers
                .iter()
                .take(PREVIEW_LEN)
                .copied()
                .collect::<Vec<_>>()
                .join(", ");
            let more = if leftovers.len() > PREVIEW_LEN {
                format!(" and {} more", leftovers.len() - PREVIEW_LEN)
            } else {
                String::new()
            };
            tracing::warn!("Unconverted shortcodes in {}: {}{}", filename, preview, more);
            stats.warn(format!(
                "Unconverted shortcodes in {}: {}{}",
                filename, preview, more
            ));
        }

        converted
    }
}

/// Distinct shortcodes remaining in `text`, in order of first appearance
pub fn unconverted(text: &str) -> IndexSet<&str> {
    ANY_SHORTCODE.find_iter(text).map(|m| m.as_str()).collect()
}
