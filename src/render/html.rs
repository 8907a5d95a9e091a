//! HTML renderer — one page per source file plus an index page, styled
//! by an external stylesheet.

use crate::codebase::{CodeBase, RefScope};
use crate::model::{ClassDoc, FileDoc, FunctionDoc, ModuleDoc, ParamDoc};
use regex::Regex;
use std::sync::LazyLock;

static RE_PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Wrap rendered body content in a full HTML page referencing the
/// bundled stylesheet.
pub fn build_html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n\
         <link rel=\"stylesheet\" type=\"text/css\" href=\"jsdoc.css\">\n\
         </head>\n<body>\n{}</body>\n</html>\n",
        html_escape(title),
        body
    )
}

/// The first sentence of a doc body: everything up to and including the
/// first period that is followed by whitespace or the end of the text.
pub fn first_sentence(text: &str) -> &str {
    let bytes = text.as_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        if *byte == b'.' {
            match bytes.get(i + 1) {
                None => return text,
                Some(next) if next.is_ascii_whitespace() => return &text[..=i],
                _ => {}
            }
        }
    }
    text
}

/// Split text on blank lines and wrap each chunk in a paragraph tag.
pub fn htmlize_paragraphs(text: &str) -> String {
    RE_PARAGRAPH_BREAK
        .split(text)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| format!("<p>{}</p>\n", chunk.trim()))
        .collect()
}

/// Doc body ready for the page: `{@link}` references resolved, then
/// paragraphs wrapped.
pub fn printable(codebase: &CodeBase, text: &str, scope: Option<&RefScope>) -> String {
    htmlize_paragraphs(&codebase.translate_links(text, scope))
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// An index list: each entry is a linked name with its first-sentence
/// summary.
fn make_index(css_class: &str, entries: &[(String, String, String)]) -> String {
    let mut out = format!("<ul class=\"{}\">\n", css_class);
    for (name, url, summary) in entries {
        out.push_str(&format!(
            "  <li><a href=\"{}\">{}</a> - {}</li>\n",
            url,
            html_escape(name),
            html_escape(summary)
        ));
    }
    out.push_str("</ul>\n");
    out
}

fn visible<'a>(
    codebase: &CodeBase,
    funcs: impl Iterator<Item = &'a FunctionDoc>,
) -> Vec<&'a FunctionDoc> {
    funcs
        .filter(|f| codebase.include_private || !f.is_private)
        .collect()
}

/// The top-level index page: every file, its standalone functions, and
/// its classes.
pub fn codebase_index(codebase: &CodeBase) -> String {
    let mut body = String::from("<h1>Module index</h1>\n");
    for (key, file) in codebase.iter() {
        body.push_str(&format!(
            "<h2><a href=\"{}\">{}</a></h2>\n",
            file.url(),
            html_escape(key)
        ));
        let summary = first_sentence(&file.module().tags.doc);
        if !summary.is_empty() {
            body.push_str(&format!("<p>{}</p>\n", html_escape(summary)));
        }

        let functions: Vec<(String, String, String)> = visible(codebase, file.functions())
            .iter()
            .map(|f| {
                (
                    f.name.clone(),
                    format!("{}#{}", file.url(), f.name),
                    first_sentence(&f.tags.doc).to_string(),
                )
            })
            .collect();
        if !functions.is_empty() {
            body.push_str("<h3>Functions</h3>\n");
            body.push_str(&make_index("function_index", &functions));
        }

        let classes: Vec<(String, String, String)> = file
            .classes()
            .map(|c| {
                (
                    c.name.clone(),
                    format!("{}#{}", file.url(), c.name),
                    first_sentence(&c.tags.doc).to_string(),
                )
            })
            .collect();
        if !classes.is_empty() {
            body.push_str("<h3>Classes</h3>\n");
            body.push_str(&make_index("class_index", &classes));
        }
    }
    build_html_page("Module index", &body)
}

/// The documentation page for one source file.
pub fn file_to_html(codebase: &CodeBase, file: &FileDoc) -> String {
    let mut body = format!("<h1>{}</h1>\n", html_escape(&file.name));
    body.push_str(&module_to_html(codebase, file.module()));

    let functions = visible(codebase, file.functions());
    if !functions.is_empty() {
        body.push_str("<h2>Functions</h2>\n");
        for func in functions {
            body.push_str(&function_to_html(codebase, func, "h3"));
        }
    }

    let classes: Vec<&ClassDoc> = file.classes().collect();
    if !classes.is_empty() {
        body.push_str("<h2>Classes</h2>\n");
        for class in classes {
            body.push_str(&class_to_html(codebase, file, class));
        }
    }

    build_html_page(&file.name, &body)
}

fn module_to_html(codebase: &CodeBase, module: &ModuleDoc) -> String {
    let mut out = printable(codebase, &module.tags.doc, None);
    let mut fields = String::new();
    let authors = module.authors();
    if !authors.is_empty() {
        fields.push_str(&format!(
            "  <dt>Author</dt><dd>{}</dd>\n",
            html_escape(&authors.join(", "))
        ));
    }
    for (label, value) in [
        ("Organization", module.organization()),
        ("License", module.license()),
        ("Version", module.version()),
    ] {
        if !value.is_empty() {
            fields.push_str(&format!(
                "  <dt>{}</dt><dd>{}</dd>\n",
                label,
                html_escape(value)
            ));
        }
    }
    let dependencies = module.dependencies();
    if !dependencies.is_empty() {
        fields.push_str(&format!(
            "  <dt>Dependencies</dt><dd>{}</dd>\n",
            html_escape(&dependencies.join(", "))
        ));
    }
    if !fields.is_empty() {
        out.push_str(&format!("<dl class=\"module_info\">\n{}</dl>\n", fields));
    }
    out.push_str(&see_also_html(codebase, &module.tags.get_list("see"), None));
    out
}

/// One function or method section. Methods render under their class with
/// a smaller heading.
fn function_to_html(codebase: &CodeBase, func: &FunctionDoc, heading: &str) -> String {
    let scope = RefScope::Method(func);
    let mut out = format!(
        "<{0} id=\"{1}\">{1}({2})</{0}>\n",
        heading,
        html_escape(&func.name),
        html_escape(
            &func
                .params
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    );
    out.push_str(&printable(codebase, &func.tags.doc, Some(&scope)));

    out.push_str(&param_list_html("Parameters", &func.params));
    out.push_str(&param_list_html("Options", &func.options));
    if !func.return_val.type_.is_empty() || !func.return_val.doc.is_empty() {
        out.push_str(&format!(
            "<h4>Returns</h4>\n<p>{}{}</p>\n",
            type_prefix(&func.return_val.type_),
            html_escape(&func.return_val.doc)
        ));
    }
    if !func.exceptions.is_empty() {
        out.push_str("<h4>Throws</h4>\n<ul>\n");
        for exc in &func.exceptions {
            out.push_str(&format!(
                "  <li>{}{}</li>\n",
                type_prefix(&exc.type_),
                html_escape(&exc.doc)
            ));
        }
        out.push_str("</ul>\n");
    }

    for example in &func.tags.examples {
        if !example.desc.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", html_escape(&example.desc)));
        }
        if !example.before.is_empty() {
            out.push_str(&format!(
                "<pre class=\"before\"><code>{}</code></pre>\n",
                html_escape(&example.before)
            ));
        }
        out.push_str(&format!(
            "<pre><code>{}</code></pre>\n",
            html_escape(&example.code)
        ));
        if !example.result.is_empty() {
            out.push_str(&format!(
                "<pre class=\"result\"><code>{}</code></pre>\n",
                html_escape(&example.result)
            ));
        }
        if !example.after.is_empty() {
            out.push_str(&format!(
                "<pre class=\"after\"><code>{}</code></pre>\n",
                html_escape(&example.after)
            ));
        }
    }

    out.push_str(&see_also_html(
        codebase,
        &func.tags.get_list("see"),
        Some(&scope),
    ));
    out
}

fn param_list_html(label: &str, params: &[ParamDoc]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let mut out = format!("<h4>{}</h4>\n<dl>\n", label);
    for param in params {
        out.push_str(&format!(
            "  <dt>{}{}</dt><dd>{}</dd>\n",
            type_prefix(&param.type_),
            html_escape(&param.name),
            html_escape(&param.doc)
        ));
    }
    out.push_str("</dl>\n");
    out
}

fn type_prefix(type_: &str) -> String {
    if type_.is_empty() {
        String::new()
    } else {
        format!("<code>{{{}}}</code> ", html_escape(type_))
    }
}

fn class_to_html(codebase: &CodeBase, file: &FileDoc, class: &ClassDoc) -> String {
    let scope = RefScope::Class(class);
    let mut out = format!(
        "<h3 id=\"{0}\">{0}</h3>\n",
        html_escape(&class.name)
    );
    if !class.all_superclasses.is_empty() {
        let chain: Vec<String> = class
            .all_superclasses
            .iter()
            .map(|name| {
                let url = codebase.resolve_ref(name, None);
                if url.is_empty() {
                    html_escape(name)
                } else {
                    format!("<a href=\"{}\">{}</a>", url, html_escape(name))
                }
            })
            .collect();
        out.push_str(&format!("<p>Extends {}</p>\n", chain.join(" &rarr; ")));
    }
    out.push_str(&printable(codebase, &class.tags.doc, Some(&scope)));

    let methods = visible(codebase, file.methods_of(class));
    if !methods.is_empty() {
        out.push_str("<h4>Methods</h4>\n");
        for method in methods {
            out.push_str(&function_to_html(codebase, method, "h5"));
        }
    }

    out.push_str(&see_also_html(
        codebase,
        &class.tags.get_list("see"),
        Some(&scope),
    ));
    out
}

/// A `See also` list. Unresolvable references render as plain text
/// rather than dead anchors.
fn see_also_html(codebase: &CodeBase, refs: &[String], scope: Option<&RefScope>) -> String {
    if refs.is_empty() {
        return String::new();
    }
    let mut out = String::from("<h4>See also</h4>\n<ul>\n");
    for reference in refs {
        let url = codebase.resolve_ref(reference, scope);
        if url.is_empty() {
            out.push_str(&format!("  <li>{}</li>\n", html_escape(reference)));
        } else {
            out.push_str(&format!(
                "  <li><a href=\"{}\">{}</a></li>\n",
                url,
                html_escape(reference)
            ));
        }
    }
    out.push_str("</ul>\n");
    out
}
