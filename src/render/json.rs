//! JSON renderer — the whole codebase as one tree, keyed by file.
//!
//! Field names follow the tag vocabulary so the output stays stable for
//! downstream tooling even if the internal model shifts.

use crate::codebase::CodeBase;
use crate::model::{ClassDoc, FileDoc, FunctionDoc, ModuleDoc, ParamDoc};
use crate::tags::ExampleDoc;
use serde_json::{json, Map, Value};

/// Serialize the whole codebase, honoring the private-visibility flag.
pub fn codebase_json(codebase: &CodeBase) -> Value {
    let mut files = Map::new();
    for (key, file) in codebase.iter() {
        files.insert(key.clone(), file_json(codebase, file));
    }
    Value::Object(files)
}

pub fn to_json_string(codebase: &CodeBase) -> String {
    let mut out = serde_json::to_string_pretty(&codebase_json(codebase))
        .unwrap_or_else(|_| String::from("{}"));
    out.push('\n');
    out
}

fn file_json(codebase: &CodeBase, file: &FileDoc) -> Value {
    let functions: Vec<Value> = file
        .functions()
        .filter(|f| codebase.include_private || !f.is_private)
        .map(function_json)
        .collect();
    let classes: Vec<Value> = file
        .classes()
        .map(|class| class_json(codebase, file, class))
        .collect();
    json!({
        "name": file.name,
        "module": module_json(file.module()),
        "functions": functions,
        "classes": classes,
    })
}

fn module_json(module: &ModuleDoc) -> Value {
    json!({
        "doc": module.tags.doc,
        "authors": module.authors(),
        "organization": module.organization(),
        "license": module.license(),
        "version": module.version(),
        "dependencies": module.dependencies(),
        "all_dependencies": module.all_dependencies,
        "see": module.tags.get_list("see"),
    })
}

fn function_json(func: &FunctionDoc) -> Value {
    json!({
        "name": func.name,
        "doc": func.tags.doc,
        "params": params_json(&func.params),
        "options": params_json(&func.options),
        "return": param_json(&func.return_val),
        "exceptions": params_json(&func.exceptions),
        "member": func.member,
        "is_private": func.is_private,
        "is_constructor": func.is_constructor,
        "examples": func.tags.examples.iter().map(example_json).collect::<Vec<_>>(),
        "see": func.tags.get_list("see"),
    })
}

fn class_json(codebase: &CodeBase, file: &FileDoc, class: &ClassDoc) -> Value {
    let methods: Vec<Value> = file
        .methods_of(class)
        .filter(|m| codebase.include_private || !m.is_private)
        .map(function_json)
        .collect();
    json!({
        "name": class.name,
        "doc": class.tags.doc,
        "superclass": class.superclass,
        "all_superclasses": class.all_superclasses,
        "methods": methods,
        "see": class.tags.get_list("see"),
    })
}

fn params_json(params: &[ParamDoc]) -> Vec<Value> {
    params.iter().map(param_json).collect()
}

fn param_json(param: &ParamDoc) -> Value {
    json!({
        "name": param.name,
        "type": param.type_,
        "doc": param.doc,
    })
}

fn example_json(example: &ExampleDoc) -> Value {
    json!({
        "code": example.code,
        "desc": example.desc,
        "before": example.before,
        "after": example.after,
        "result": example.result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codebase(entries: &[(&str, &str)], include_private: bool) -> CodeBase {
        CodeBase::from_sources(
            entries
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
            include_private,
        )
    }

    const MODULE_JS: &str = "/**\n * Overview.\n * @fileoverview\n * @author Jane Doe\n * @version 0.3\n */\n\n/**\n * Adds.\n * @param {Int} a Left.\n * @param {Int} b Right.\n * @return {Int} The sum.\n */\nfunction add(a, b) {\n}\n\n/**\n * Hidden.\n * @private\n */\nfunction secret() {\n}\n";

    #[test]
    fn file_tree_shape() {
        let docs = codebase(&[("m.js", MODULE_JS)], false);
        let tree = codebase_json(&docs);
        let file = &tree["m.js"];
        assert_eq!(file["name"], "m.js");
        assert_eq!(file["module"]["authors"][0], "Jane Doe");
        assert_eq!(file["module"]["version"], "0.3");
        assert_eq!(file["module"]["all_dependencies"][0], "m.js");
    }

    #[test]
    fn function_fields_serialized() {
        let docs = codebase(&[("m.js", MODULE_JS)], false);
        let tree = codebase_json(&docs);
        let func = &tree["m.js"]["functions"][0];
        assert_eq!(func["name"], "add");
        assert_eq!(func["params"][0]["name"], "a");
        assert_eq!(func["params"][0]["type"], "Int");
        assert_eq!(func["params"][1]["doc"], "Right.");
        assert_eq!(func["return"]["type"], "Int");
        assert_eq!(func["return"]["doc"], "The sum.");
    }

    #[test]
    fn private_functions_respect_visibility_flag() {
        let docs = codebase(&[("m.js", MODULE_JS)], false);
        let tree = codebase_json(&docs);
        assert_eq!(tree["m.js"]["functions"].as_array().unwrap().len(), 1);

        let docs = codebase(&[("m.js", MODULE_JS)], true);
        let tree = codebase_json(&docs);
        assert_eq!(tree["m.js"]["functions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn class_methods_expanded_inline() {
        let docs = codebase(
            &[(
                "c.js",
                "/**\n * @fileoverview\n */\n\n/**\n * The class.\n * @class Box\n */\nvar Box = make_class({\n\n/**\n * Opens.\n * @member Box\n */\nopen: function() {\n},\n",
            )],
            false,
        );
        let tree = codebase_json(&docs);
        let class = &tree["c.js"]["classes"][0];
        assert_eq!(class["name"], "Box");
        assert_eq!(class["methods"][0]["name"], "open");
        assert_eq!(class["methods"][0]["member"], "Box");
    }

    #[test]
    fn output_is_valid_json_text() {
        let docs = codebase(&[("m.js", MODULE_JS)], false);
        let text = to_json_string(&docs);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert!(parsed.is_object());
    }
}
