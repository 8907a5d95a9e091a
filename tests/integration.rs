use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_jsdox")))
}

fn write_source(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

const FILE1_JS: &str = "/**\n * The base module.\n * @fileoverview\n * @author Jane Doe\n */\n\n/**\n * Makes a class.\n */\nfunction make_class(members) {\n}\n";

const FILE2_JS: &str = "/**\n * The middle module.\n * @fileoverview\n * @dependency file1.js\n */\n\n/**\n * The class.\n * @class Widget\n */\nvar Widget = make_class({\n\n/**\n * Draws the widget.\n * @member Widget\n * @param {DOM} elem The target element.\n */\ndraw: function(elem) {\n},\n});\n";

const FILE3_JS: &str = "/**\n * The top module.\n * @fileoverview\n * @dependency file1.js\n * @dependency file2.js\n */\n\n/**\n * Entry point.\n * @return {Widget} A fresh widget.\n */\nfunction main_widget() {\n}\n\n/**\n * Internal helper.\n * @private\n */\nfunction internal_helper() {\n}\n";

fn three_file_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_source(dir.path(), "file1.js", FILE1_JS);
    write_source(dir.path(), "file2.js", FILE2_JS);
    write_source(dir.path(), "file3.js", FILE3_JS);
    dir
}

// -- dependency mode --

#[test]
fn dependency_mode_orders_transitively() {
    let dir = three_file_tree();
    cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-d")
        .arg("file3.js")
        .assert()
        .success()
        .stdout("file1.js\nfile2.js\nfile3.js\n");
}

#[test]
fn dependency_mode_single_file_is_itself() {
    let dir = three_file_tree();
    cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-d")
        .arg("file1.js")
        .assert()
        .success()
        .stdout("file1.js\n");
}

#[test]
fn dependency_cycle_reported_without_failing() {
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "a.js",
        "/**\n * @fileoverview\n * @dependency b.js\n */\n",
    );
    write_source(
        dir.path(),
        "b.js",
        "/**\n * @fileoverview\n * @dependency a.js\n */\n",
    );
    cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-d")
        .arg("a.js")
        .assert()
        .success()
        .stderr(predicate::str::contains("result in a cycle"))
        .stderr(predicate::str::contains("a.js"))
        .stderr(predicate::str::contains("b.js"));
}

#[test]
fn missing_dependency_reported_without_failing() {
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "a.js",
        "/**\n * @fileoverview\n * @dependency absent.js\n */\n",
    );
    cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-d")
        .arg("a.js")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "couldn't find dependency absent.js when processing a.js",
        ));
}

#[test]
fn unknown_file_argument_warns() {
    let dir = three_file_tree();
    cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-d")
        .arg("nosuch.js")
        .assert()
        .success()
        .stderr(predicate::str::contains("File nosuch.js does not exist"));
}

// -- JSON mode --

#[test]
fn json_mode_emits_full_tree() {
    let dir = three_file_tree();
    let assert = cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-j")
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let tree: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(tree["file1.js"]["module"]["authors"][0], "Jane Doe");
    assert_eq!(
        tree["file3.js"]["module"]["all_dependencies"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
    assert_eq!(tree["file2.js"]["classes"][0]["name"], "Widget");
    assert_eq!(
        tree["file2.js"]["classes"][0]["methods"][0]["name"],
        "draw"
    );
}

#[test]
fn json_mode_hides_private_by_default() {
    let dir = three_file_tree();
    let assert = cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-j")
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(!output.contains("internal_helper"));

    let assert = cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-j")
        .arg("--private")
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(output.contains("internal_helper"));
}

// -- HTML mode --

#[test]
fn html_mode_writes_pages_index_and_stylesheet() {
    let dir = three_file_tree();
    let out = TempDir::new().unwrap();
    cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();

    assert!(out.path().join("index.html").exists());
    assert!(out.path().join("jsdoc.css").exists());
    for page in ["file1.html", "file2.html", "file3.html"] {
        assert!(out.path().join(page).exists(), "missing {}", page);
    }

    let index = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(index.contains("<a href=\"file1.html\">file1.js</a>"));
    assert!(index.contains("make_class"));

    let page = fs::read_to_string(out.path().join("file2.html")).unwrap();
    assert!(page.contains("Widget"));
    assert!(page.contains("draw"));
    assert!(page.contains("<code>{DOM}</code> elem"));
}

#[test]
fn html_mode_filters_private_functions() {
    let dir = three_file_tree();
    let out = TempDir::new().unwrap();
    cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();
    let page = fs::read_to_string(out.path().join("file3.html")).unwrap();
    assert!(!page.contains("internal_helper"));

    cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-o")
        .arg(out.path())
        .arg("--private")
        .assert()
        .success();
    let page = fs::read_to_string(out.path().join("file3.html")).unwrap();
    assert!(page.contains("internal_helper"));
}

#[test]
fn single_file_without_output_renders_in_place() {
    let dir = three_file_tree();
    let work = TempDir::new().unwrap();
    cmd()
        .current_dir(work.path())
        .arg("-p")
        .arg(dir.path())
        .arg("file1.js")
        .assert()
        .success();
    assert!(work.path().join("file1.html").exists());
    assert!(work.path().join("jsdoc.css").exists());
    assert!(!work.path().join("index.html").exists());
}

#[test]
fn minified_and_packed_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    write_source(dir.path(), "lib.js", FILE1_JS);
    write_source(dir.path(), "lib.min.js", FILE1_JS);
    write_source(dir.path(), "lib.pack.js", FILE1_JS);
    let assert = cmd()
        .arg("-p")
        .arg(dir.path())
        .arg("-j")
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let tree: serde_json::Value = serde_json::from_str(&output).unwrap();
    let keys: Vec<&String> = tree.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["lib.js"]);
}
