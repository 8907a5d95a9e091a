//! Data model for parsed documentation — format-agnostic.
//!
//! A [`FileDoc`] owns every entity parsed from one source file (arena
//! style); classes refer to their methods, and subclasses to their
//! superclasses, by name only. Cross-file fields (`all_dependencies`,
//! `all_superclasses`) are filled in later by the codebase index.

use crate::extract::{get_doc_comments, strip_stars};
use crate::split::split_delimited_char;
use crate::tags::{parse_comment, TagMap};
use std::collections::HashMap;

/// A parameter, option, return value, or exception: anything with a
/// name, a type, and a description. Return values and exceptions use an
/// empty name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamDoc {
    pub name: String,
    pub type_: String,
    pub doc: String,
}

impl ParamDoc {
    /// Parse a tag body of the form `{Type} name description`. If the
    /// first token is not brace-wrapped there is no type and the first
    /// token is the name. Malformed bodies degrade to empty fields.
    pub fn parse(text: &str) -> ParamDoc {
        let parts: Vec<&str> = split_delimited_char("{}", ' ', text).collect();
        let first = parts[0];
        if first.len() >= 2 && first.starts_with('{') && first.ends_with('}') {
            ParamDoc {
                type_: first[1..first.len() - 1].to_string(),
                name: parts.get(1).copied().unwrap_or("").to_string(),
                doc: parts.get(2..).unwrap_or(&[]).join(" "),
            }
        } else {
            ParamDoc {
                type_: String::new(),
                name: first.to_string(),
                doc: parts[1..].join(" "),
            }
        }
    }
}

/// The per-file overview entity, holding file-level metadata and the
/// declared dependency list.
#[derive(Debug, Clone, Default)]
pub struct ModuleDoc {
    pub tags: TagMap,
    /// Topologically ordered transitive dependency closure, ending with
    /// the owning file itself. Populated by the codebase index.
    pub all_dependencies: Vec<String>,
}

impl ModuleDoc {
    /// Module overviews always answer to the same name.
    pub const NAME: &'static str = "file_overview";

    pub fn new(tags: TagMap) -> ModuleDoc {
        ModuleDoc {
            tags,
            all_dependencies: Vec::new(),
        }
    }

    pub fn authors(&self) -> Vec<String> {
        self.tags.get_list("author")
    }

    pub fn organization(&self) -> &str {
        self.tags.get_str("organization")
    }

    pub fn license(&self) -> &str {
        self.tags.get_str("license")
    }

    pub fn version(&self) -> &str {
        self.tags.get_str("version")
    }

    /// Immediate dependencies in declaration order. Duplicates are kept;
    /// deduplication is the caller's responsibility.
    pub fn dependencies(&self) -> Vec<String> {
        self.tags.get_list("dependency")
    }
}

/// A documented function or method.
#[derive(Debug, Clone, Default)]
pub struct FunctionDoc {
    pub tags: TagMap,
    pub name: String,
    pub params: Vec<ParamDoc>,
    pub options: Vec<ParamDoc>,
    pub return_val: ParamDoc,
    pub exceptions: Vec<ParamDoc>,
    /// Owning class name for methods; empty for standalone functions.
    pub member: String,
    pub is_private: bool,
    pub is_constructor: bool,
}

impl FunctionDoc {
    pub fn from_tags(tags: TagMap) -> FunctionDoc {
        let name = if !tags.get_str("function").is_empty() {
            tags.get_str("function").to_string()
        } else {
            tags.guessed_function.clone().unwrap_or_default()
        };
        let params = reconcile_params(&tags);
        let options = tags
            .get_list("option")
            .iter()
            .map(|text| ParamDoc::parse(text))
            .collect();
        let return_val = resolve_return(&tags);
        let exceptions = tags
            .get_list("throws")
            .into_iter()
            .chain(tags.get_list("exception"))
            .map(|text| exception_param(&text))
            .collect();
        let member = tags.get_str("member").to_string();
        let is_private = tags.has("private");
        let is_constructor = tags.has("constructor");
        FunctionDoc {
            tags,
            name,
            params,
            options,
            return_val,
            exceptions,
            member,
            is_private,
            is_constructor,
        }
    }
}

/// Explicit `@param`/`@argument` tags in declared order; when parameter
/// names were guessed from the signature, re-order by guessed-name order
/// and synthesize placeholders for undeclared names.
fn reconcile_params(tags: &TagMap) -> Vec<ParamDoc> {
    let declared: Vec<ParamDoc> = tags
        .get_list("param")
        .into_iter()
        .chain(tags.get_list("argument"))
        .map(|text| ParamDoc::parse(&text))
        .collect();
    match &tags.guessed_params {
        Some(guessed) if !guessed.is_empty() => {
            let mut by_name: HashMap<String, ParamDoc> =
                declared.into_iter().map(|p| (p.name.clone(), p)).collect();
            guessed
                .iter()
                .map(|name| {
                    by_name.remove(name).unwrap_or_else(|| ParamDoc {
                        name: name.clone(),
                        ..ParamDoc::default()
                    })
                })
                .collect()
        }
        _ => declared,
    }
}

/// Return-value resolution: a `{type}`-prefixed `@return` body wins;
/// else a separate `@type` tag supplies the type; else the body is a
/// bare description.
fn resolve_return(tags: &TagMap) -> ParamDoc {
    let body = if tags.get_str("return").is_empty() {
        tags.get_str("returns").to_string()
    } else {
        tags.get_str("return").to_string()
    };
    let type_tag = tags.get_str("type");
    if body.contains('{') && body.contains('}') {
        // Force the name slot empty so the rest parses as description.
        let normalized = if body.contains("}  ") {
            body
        } else {
            body.replace("} ", "}  ")
        };
        ParamDoc::parse(&normalized)
    } else if !body.is_empty() && !type_tag.is_empty() {
        ParamDoc::parse(&format!("{{{}}}  {}", type_tag, body))
    } else {
        ParamDoc::parse(&body)
    }
}

/// Exception descriptor: brace-typed bodies parse like parameters with
/// the name forced empty; the legacy format treats the first token as
/// the type.
fn exception_param(text: &str) -> ParamDoc {
    if text.contains('{') && text.contains('}') {
        let parts: Vec<&str> = split_delimited_char("{}", ' ', text).collect();
        let first = parts[0];
        if first.len() >= 2 && first.starts_with('{') && first.ends_with('}') {
            let rest = if parts.get(1) == Some(&"") {
                parts.get(2..).unwrap_or(&[])
            } else {
                &parts[1..]
            };
            return ParamDoc {
                type_: first[1..first.len() - 1].to_string(),
                name: String::new(),
                doc: rest.join(" "),
            };
        }
        ParamDoc::parse(text)
    } else {
        let mut words = text.split_whitespace();
        let type_ = words.next().unwrap_or("").to_string();
        ParamDoc {
            type_,
            name: String::new(),
            doc: words.collect::<Vec<_>>().join(" "),
        }
    }
}

/// A documented class. Methods are linked by name after parsing; the
/// superclass chain is resolved by the codebase index.
#[derive(Debug, Clone, Default)]
pub struct ClassDoc {
    pub tags: TagMap,
    pub name: String,
    /// Immediate superclass name (`@extends`/`@base`), or empty.
    pub superclass: String,
    /// Method names in linkage order; resolved against the owning
    /// file's entities.
    pub methods: Vec<String>,
    /// Ancestor class names, nearest first. Populated by the codebase
    /// index; empty until then.
    pub all_superclasses: Vec<String>,
}

impl ClassDoc {
    pub fn from_tags(tags: TagMap) -> ClassDoc {
        let name = if !tags.get_str("class").is_empty() {
            tags.get_str("class").to_string()
        } else {
            tags.get_str("constructor").to_string()
        };
        let superclass = if !tags.get_str("extends").is_empty() {
            tags.get_str("extends").to_string()
        } else {
            tags.get_str("base").to_string()
        };
        ClassDoc {
            tags,
            name,
            superclass,
            methods: Vec::new(),
            all_superclasses: Vec::new(),
        }
    }

    pub fn has_method(&self, method_name: &str) -> bool {
        self.methods.iter().any(|m| m == method_name)
    }
}

/// One parsed documentation entity.
#[derive(Debug, Clone)]
pub enum Entity {
    Module(ModuleDoc),
    Function(FunctionDoc),
    Class(ClassDoc),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Module(_) => ModuleDoc::NAME,
            Entity::Function(f) => &f.name,
            Entity::Class(c) => &c.name,
        }
    }

    pub fn doc(&self) -> &str {
        match self {
            Entity::Module(m) => &m.tags.doc,
            Entity::Function(f) => &f.tags.doc,
            Entity::Class(c) => &c.tags.doc,
        }
    }

    pub fn see(&self) -> Vec<String> {
        match self {
            Entity::Module(m) => m.tags.get_list("see"),
            Entity::Function(f) => f.tags.get_list("see"),
            Entity::Class(c) => c.tags.get_list("see"),
        }
    }

    /// In-page anchor URL.
    pub fn url(&self) -> String {
        format!("#{}", self.name())
    }
}

/// Decide what a parsed comment documents. The priority order is
/// load-bearing: `@fileoverview` wins; then an explicit or guessed
/// function name; then a `@class` tag; the very first comment in a file
/// falls back to the module overview; anything else is skipped.
pub fn classify(tags: TagMap, is_first: bool) -> Option<Entity> {
    if tags.has("fileoverview") {
        Some(Entity::Module(ModuleDoc::new(tags)))
    } else if !tags.get_str("function").is_empty() || tags.guessed_function.is_some() {
        Some(Entity::Function(FunctionDoc::from_tags(tags)))
    } else if tags.has("class") {
        Some(Entity::Class(ClassDoc::from_tags(tags)))
    } else if is_first {
        Some(Entity::Module(ModuleDoc::new(tags)))
    } else {
        None
    }
}

/// Trim a trailing `.js` extension, if present.
pub fn trim_js_ext(filename: &str) -> &str {
    filename.strip_suffix(".js").unwrap_or(filename)
}

/// Documentation for one source file: every entity parsed from its
/// text, in source-appearance order.
#[derive(Debug, Clone)]
pub struct FileDoc {
    pub name: String,
    order: Vec<String>,
    entities: HashMap<String, Entity>,
}

impl FileDoc {
    /// Parse `file_text` into a FileDoc. Parsing and class→method
    /// linkage both happen here, once; nothing is lazy.
    pub fn new(file_name: &str, file_text: &str) -> FileDoc {
        let mut doc = FileDoc {
            name: file_name.to_string(),
            order: Vec::new(),
            entities: HashMap::new(),
        };
        // Every file carries a module overview, defaulted when no
        // file-level comment exists.
        doc.entities.insert(
            ModuleDoc::NAME.to_string(),
            Entity::Module(ModuleDoc::new(TagMap::default())),
        );

        let mut is_first = true;
        for (comment, next_line) in get_doc_comments(file_text) {
            let raw = parse_comment(&strip_stars(&comment), &next_line);
            if let Some(entity) = classify(raw, is_first) {
                let name = entity.name().to_string();
                if doc.order.contains(&name) {
                    // Duplicate names: last write wins, but the order
                    // list keeps a single entry.
                    eprintln!(
                        "warning: duplicate comment name {} in {}, keeping the later one",
                        name, file_name
                    );
                } else {
                    doc.order.push(name.clone());
                }
                doc.entities.insert(name, entity);
            }
            is_first = false;
        }

        doc.link_methods();
        doc
    }

    /// Append each method to its owning class's method list, matched by
    /// exact name within this file. Methods naming a missing or
    /// non-class member are dropped from linkage with a warning.
    fn link_methods(&mut self) {
        let links: Vec<(String, String)> = self
            .methods()
            .map(|m| (m.name.clone(), m.member.clone()))
            .collect();
        for (method_name, member) in links {
            match self.entities.get_mut(&member) {
                Some(Entity::Class(class)) => class.methods.push(method_name),
                _ => eprintln!(
                    "warning: member {} of {} is not a class",
                    member, method_name
                ),
            }
        }
    }

    /// Entity names in source order.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    /// All entities in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|name| self.entities.get(name))
    }

    pub fn module(&self) -> &ModuleDoc {
        match self.entities.get(ModuleDoc::NAME) {
            Some(Entity::Module(m)) => m,
            _ => unreachable!("FileDoc always owns a module overview"),
        }
    }

    pub fn module_mut(&mut self) -> &mut ModuleDoc {
        match self.entities.get_mut(ModuleDoc::NAME) {
            Some(Entity::Module(m)) => m,
            _ => unreachable!("FileDoc always owns a module overview"),
        }
    }

    pub fn set_all_dependencies(&mut self, dependencies: Vec<String>) {
        self.module_mut().all_dependencies = dependencies;
    }

    /// Standalone functions, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDoc> {
        self.iter().filter_map(|e| match e {
            Entity::Function(f) if f.member.is_empty() => Some(f),
            _ => None,
        })
    }

    /// Member functions (methods), in source order.
    pub fn methods(&self) -> impl Iterator<Item = &FunctionDoc> {
        self.iter().filter_map(|e| match e {
            Entity::Function(f) if !f.member.is_empty() => Some(f),
            _ => None,
        })
    }

    /// Classes, in source order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDoc> {
        self.iter().filter_map(|e| match e {
            Entity::Class(c) => Some(c),
            _ => None,
        })
    }

    /// Resolve a method of `class` by name within this file.
    pub fn get_method(&self, class: &ClassDoc, method_name: &str) -> Option<&FunctionDoc> {
        if !class.has_method(method_name) {
            return None;
        }
        match self.entities.get(method_name) {
            Some(Entity::Function(f)) => Some(f),
            _ => None,
        }
    }

    /// Methods of `class`, in linkage order.
    pub fn methods_of<'a>(&'a self, class: &'a ClassDoc) -> impl Iterator<Item = &'a FunctionDoc> {
        class
            .methods
            .iter()
            .filter_map(|name| match self.entities.get(name) {
                Some(Entity::Function(f)) => Some(f),
                _ => None,
            })
    }

    /// Page URL for this file's documentation.
    pub fn url(&self) -> String {
        format!("{}.html", trim_js_ext(&self.name))
    }
}
