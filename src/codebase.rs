//! Codebase index — documentation for a whole file set.
//!
//! Owns a file-key → [`FileDoc`] map and runs the cross-file passes:
//! transitive dependency ordering, superclass chain resolution, and
//! `@see`/`{@link}` reference resolution. Files are parsed once at
//! population time; cross-linking mutates the already-built entities.

use crate::deps::{find_dependencies, DependencyLookup};
use crate::model::{ClassDoc, Entity, FileDoc, FunctionDoc};
use anyhow::{Context, Result};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static RE_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{@link ([\w#]+)\}").unwrap());

/// True for files worth documenting: `.js` extension and neither a
/// packed nor a minified variant.
pub fn is_doc_file(filename: &str) -> bool {
    filename.ends_with(".js") && !filename.contains(".pack") && !filename.contains(".min")
}

/// All documentable files under `dir`, recursively, in sorted order.
pub fn list_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if is_doc_file(name) {
                files.push(path);
            }
        }
    }
    Ok(())
}

/// The entity a reference is being resolved from, for scope-aware
/// `#method` lookups.
pub enum RefScope<'a> {
    Method(&'a FunctionDoc),
    Class(&'a ClassDoc),
}

/// Documentation index for an entire codebase.
pub struct CodeBase {
    files: BTreeMap<String, FileDoc>,
    pub include_private: bool,
}

impl CodeBase {
    /// Build a codebase by recursively scanning `root_paths`. File keys
    /// are paths relative to the matching root. Read failures abort
    /// construction.
    pub fn from_roots(root_paths: &[PathBuf], include_private: bool) -> Result<CodeBase> {
        let mut sources = Vec::new();
        for root in root_paths {
            for path in list_source_files(root)? {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                sources.push((key_name(&path, root_paths), text));
            }
        }
        Ok(CodeBase::from_sources(sources, include_private))
    }

    /// Build a codebase from in-memory `(file_key, file_text)` pairs.
    pub fn from_sources(sources: Vec<(String, String)>, include_private: bool) -> CodeBase {
        let mut codebase = CodeBase {
            files: BTreeMap::new(),
            include_private,
        };
        for (name, text) in sources {
            let doc = FileDoc::new(&name, &text);
            codebase.files.insert(name, doc);
        }
        codebase.build_dependencies();
        codebase.build_superclass_lists();
        codebase
    }

    pub fn get(&self, key: &str) -> Option<&FileDoc> {
        self.files.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    /// File keys in deterministic (sorted) order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.files.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileDoc)> {
        self.files.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Fill in every module's `all_dependencies`. Graph errors (cycles,
    /// missing names) degrade that file to an empty closure with a
    /// warning; the explicit dependency-listing operation re-runs the
    /// sort and surfaces the error properly.
    fn build_dependencies(&mut self) {
        let keys: Vec<String> = self.files.keys().cloned().collect();
        for key in keys {
            match find_dependencies(std::slice::from_ref(&key), self) {
                Ok(order) => {
                    if let Some(file) = self.files.get_mut(&key) {
                        file.set_all_dependencies(order);
                    }
                }
                Err(err) => eprintln!("warning: dependencies of {}: {}", key, err),
            }
        }
    }

    /// Resolve each class's superclass chain into `all_superclasses`
    /// (nearest ancestor first). Unknown names warn and stop the chain;
    /// so does a repeated ancestor, which would otherwise loop forever.
    fn build_superclass_lists(&mut self) {
        let mut superclass_of: HashMap<String, String> = HashMap::new();
        for file in self.files.values() {
            for class in file.classes() {
                superclass_of.insert(class.name.clone(), class.superclass.clone());
            }
        }

        for file in self.files.values_mut() {
            let class_names: Vec<String> = file.classes().map(|c| c.name.clone()).collect();
            for name in class_names {
                let mut chain = Vec::new();
                let mut current = superclass_of.get(&name).cloned().unwrap_or_default();
                while !current.is_empty() {
                    if !superclass_of.contains_key(&current) {
                        eprintln!("warning: missing superclass: {}", current);
                        break;
                    }
                    if current == name || chain.contains(&current) {
                        eprintln!("warning: superclass cycle at {}", current);
                        break;
                    }
                    chain.push(current.clone());
                    current = superclass_of.get(&current).cloned().unwrap_or_default();
                }
                if let Some(Entity::Class(class)) = file.get_mut(&name) {
                    class.all_superclasses = chain;
                }
            }
        }
    }

    /// Find a class anywhere in the codebase, first match in key order.
    pub fn find_class(&self, class_name: &str) -> Option<(&FileDoc, &ClassDoc)> {
        self.files.values().find_map(|file| {
            file.classes()
                .find(|c| c.name == class_name)
                .map(|c| (file, c))
        })
    }

    /// Translate an `@see` or `{@link}` reference into a URL.
    ///
    /// `#method` searches the referencing entity's owning class first
    /// (same-page hash link), then all standalone functions codebase-
    /// wide. `Class#method` and bare `Class` search all files in key
    /// order. An unresolvable reference yields an empty string.
    pub fn resolve_ref(&self, reference: &str, scope: Option<&RefScope>) -> String {
        if let Some(method_name) = reference.strip_prefix('#') {
            let owning_class = match scope {
                Some(RefScope::Method(f)) if !f.member.is_empty() => {
                    self.find_class(&f.member).map(|(_, c)| c)
                }
                Some(RefScope::Class(c)) => Some(*c),
                _ => None,
            };
            if let Some(class) = owning_class {
                if class.has_method(method_name) {
                    return format!("#{}", method_name);
                }
            }
            for file in self.files.values() {
                if file.functions().any(|f| f.name == method_name) {
                    return format!("{}#{}", file.url(), method_name);
                }
            }
            String::new()
        } else if let Some((class_name, method_name)) = reference.split_once('#') {
            for file in self.files.values() {
                for class in file.classes() {
                    if class.name == class_name && class.has_method(method_name) {
                        return format!("{}#{}", file.url(), method_name);
                    }
                }
            }
            String::new()
        } else {
            match self.find_class(reference) {
                Some((file, class)) => format!("{}#{}", file.url(), class.name),
                None => String::new(),
            }
        }
    }

    /// Turn every `{@link X}` in `text` into an HTML anchor.
    pub fn translate_links(&self, text: &str, scope: Option<&RefScope>) -> String {
        RE_LINK
            .replace_all(text, |caps: &Captures| {
                let reference = &caps[1];
                format!(
                    "<a href = \"{}\">{}</a>",
                    self.resolve_ref(reference, scope),
                    reference
                )
            })
            .to_string()
    }
}

impl DependencyLookup for CodeBase {
    fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    fn dependencies_of(&self, key: &str) -> Vec<String> {
        self.files
            .get(key)
            .map(|file| file.module().dependencies())
            .unwrap_or_default()
    }
}

/// Map an on-disk path to its file key: the path relative to the first
/// matching root, else the bare file name.
fn key_name(path: &Path, roots: &[PathBuf]) -> String {
    for root in roots {
        if let Ok(relative) = path.strip_prefix(root) {
            return relative.to_string_lossy().replace('\\', "/");
        }
    }
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect()
    }

    const MODULE_JS: &str = "/**\n * Base module.\n * @fileoverview\n */\n\n/**\n * A standalone function.\n */\nfunction make_class(members) {\n}\n";

    const CLASS_JS: &str = "/**\n * Class module.\n * @fileoverview\n * @dependency module.js\n */\n\n/**\n * The class.\n * @class MyClass\n */\nvar MyClass = make_class({\n\n/**\n * A public method.\n * @member MyClass\n */\nfirst_method: function(arg) {\n},\n});\n";

    const SUBCLASS_JS: &str = "/**\n * Subclass module.\n * @fileoverview\n * @dependency module.js\n * @dependency class.js\n */\n\n/**\n * The subclass.\n * @class MySubClass\n * @extends MyClass\n */\nvar MySubClass = make_class({\n\n/**\n * A subclass method.\n * @member MySubClass\n */\nsub_method: function() {\n},\n});\n";

    fn codebase() -> CodeBase {
        CodeBase::from_sources(
            sources(&[
                ("module.js", MODULE_JS),
                ("class.js", CLASS_JS),
                ("subclass.js", SUBCLASS_JS),
            ]),
            false,
        )
    }

    #[test]
    fn doc_file_predicate() {
        assert!(is_doc_file("ui.combobox.js"));
        assert!(!is_doc_file("jquery.min.js"));
        assert!(!is_doc_file("jquery.pack.js"));
        assert!(!is_doc_file("foo.json"));
    }

    #[test]
    fn all_dependencies_end_to_end() {
        let docs = codebase();
        assert_eq!(
            docs.get("subclass.js").unwrap().module().all_dependencies,
            vec!["module.js", "class.js", "subclass.js"]
        );
    }

    #[test]
    fn all_dependencies_include_self_last() {
        let docs = codebase();
        assert_eq!(
            docs.get("module.js").unwrap().module().all_dependencies,
            vec!["module.js"]
        );
    }

    #[test]
    fn superclass_chain_resolved() {
        let docs = codebase();
        let file = docs.get("subclass.js").unwrap();
        let class = file.classes().next().unwrap();
        assert_eq!(class.all_superclasses, vec!["MyClass"]);
    }

    #[test]
    fn unresolved_superclass_degrades_to_empty_chain() {
        let docs = CodeBase::from_sources(
            sources(&[(
                "orphan.js",
                "/**\n * @fileoverview\n */\n\n/**\n * @class Orphan\n * @extends Nowhere\n */\nvar Orphan = make_class({\n",
            )]),
            false,
        );
        let class = docs.get("orphan.js").unwrap().classes().next().unwrap();
        assert!(class.all_superclasses.is_empty());
    }

    #[test]
    fn superclass_cycle_stops_chain() {
        let docs = CodeBase::from_sources(
            sources(&[(
                "cycle.js",
                "/**\n * @fileoverview\n */\n\n/**\n * @class A\n * @extends B\n */\nvar A = make_class({\n\n/**\n * @class B\n * @extends A\n */\nvar B = make_class({\n",
            )]),
            false,
        );
        let file = docs.get("cycle.js").unwrap();
        let a = file.classes().next().unwrap();
        assert_eq!(a.all_superclasses, vec!["B"]);
    }

    #[test]
    fn resolve_local_method_ref() {
        let docs = codebase();
        let (_, class) = docs.find_class("MyClass").unwrap();
        assert_eq!(
            docs.resolve_ref("#first_method", Some(&RefScope::Class(class))),
            "#first_method"
        );
    }

    #[test]
    fn resolve_method_ref_from_sibling_method() {
        let docs = codebase();
        let file = docs.get("class.js").unwrap();
        let method = file.methods().next().unwrap();
        assert_eq!(
            docs.resolve_ref("#first_method", Some(&RefScope::Method(method))),
            "#first_method"
        );
    }

    #[test]
    fn resolve_global_function_ref() {
        let docs = codebase();
        assert_eq!(
            docs.resolve_ref("#make_class", None),
            "module.html#make_class"
        );
    }

    #[test]
    fn resolve_class_method_ref() {
        let docs = codebase();
        assert_eq!(
            docs.resolve_ref("MyClass#first_method", None),
            "class.html#first_method"
        );
    }

    #[test]
    fn resolve_bare_class_ref() {
        let docs = codebase();
        assert_eq!(docs.resolve_ref("MyClass", None), "class.html#MyClass");
    }

    #[test]
    fn unresolvable_ref_is_empty() {
        let docs = codebase();
        assert_eq!(docs.resolve_ref("NoSuchThing", None), "");
        assert_eq!(docs.resolve_ref("#no_such_fn", None), "");
    }

    #[test]
    fn link_translation() {
        let docs = codebase();
        assert_eq!(
            docs.translate_links("See {@link MyClass} for details.", None),
            "See <a href = \"class.html#MyClass\">MyClass</a> for details."
        );
    }

    #[test]
    fn missing_dependency_degrades_with_warning() {
        let docs = CodeBase::from_sources(
            sources(&[(
                "lonely.js",
                "/**\n * @fileoverview\n * @dependency absent.js\n */\n",
            )]),
            false,
        );
        assert!(docs
            .get("lonely.js")
            .unwrap()
            .module()
            .all_dependencies
            .is_empty());
    }

    #[test]
    fn key_name_strips_root_prefix() {
        let roots = vec![PathBuf::from("examples")];
        assert_eq!(
            key_name(Path::new("examples/sub/module.js"), &roots),
            "sub/module.js"
        );
        assert_eq!(key_name(Path::new("elsewhere/module.js"), &roots), "module.js");
    }
}
