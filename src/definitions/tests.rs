use std::fs;

use crate::definitions::{
    DefinitionTable, ExternalBinding, MethodSignature, Parameter, DECLARATION_SUFFIX,
};
use crate::test_utils::{create_test_definition_dir, write_declaration};

fn param(name: &str, type_name: &str) -> Parameter {
    Parameter {
        name: name.into(),
        type_name: Some(type_name.into()),
    }
}

#[test]
fn canvas_static_method_with_binding() {
    let text = "\
type Canvas {
    type def create(w: int, h: int): Canvas
    // maps to: gfx::make_canvas
}
";

    let table = DefinitionTable::from_document(text, "canvas.d.coi");

    let canvas = table.type_def("Canvas").expect("Canvas should be declared");
    assert_eq!(canvas.source_id, "canvas.d.coi");
    assert!(canvas.instance_methods.is_empty());
    assert_eq!(
        canvas.static_methods,
        vec![MethodSignature {
            name: "create".into(),
            params: vec![param("w", "int"), param("h", "int")],
            return_type: "Canvas".into(),
            is_static: true,
            external_binding: Some(ExternalBinding {
                module: "gfx".into(),
                function: "make_canvas".into(),
            }),
        }]
    );
}

#[test]
fn instance_methods_and_parent() {
    let text = "\
type Button extends Element {
    def setLabel(text: string): void
    def size(): int
}
";

    let table = DefinitionTable::from_document(text, "ui.d.coi");
    let button = table.type_def("Button").unwrap();

    assert_eq!(button.parent.as_deref(), Some("Element"));
    assert_eq!(button.header(), "type Button extends Element");
    assert_eq!(button.method_count(), 2);

    let set_label = button.instance_method("setLabel").unwrap();
    assert!(!set_label.is_static);
    assert_eq!(set_label.params, vec![param("text", "string")]);
    assert_eq!(button.instance_method("size").unwrap().params, vec![]);
}

#[test]
fn namespace_functions_are_static() {
    let text = "\
namespace Math {
    def sqrt(x: float): float
    // maps to: std::sqrt
    type def pi(): float
}
";

    let table = DefinitionTable::from_document(text, "math.d.coi");
    let math = table.namespace("Math").unwrap();

    assert_eq!(math.functions.len(), 2);
    assert!(math.functions.iter().all(|f| f.is_static));
    assert_eq!(
        math.function("sqrt").unwrap().external_binding,
        Some(ExternalBinding {
            module: "std".into(),
            function: "sqrt".into(),
        })
    );
    assert_eq!(math.function("pi").unwrap().external_binding, None);
    assert!(table.type_def("Math").is_none());
}

#[test]
fn binding_before_any_method_attaches_to_nothing() {
    let text = "\
type Audio {
    // maps to: snd::init
    def play(): void
}
";

    let table = DefinitionTable::from_document(text, "audio.d.coi");
    let play = table.type_def("Audio").unwrap().instance_method("play").unwrap();

    assert_eq!(play.external_binding, None);
}

#[test]
fn binding_after_block_close_attaches_to_nothing() {
    let text = "\
type Audio {
    def play(): void
}
// maps to: snd::play

namespace Empty {
    // maps to: snd::stop
}
";

    let table = DefinitionTable::from_document(text, "audio.d.coi");

    let play = table.type_def("Audio").unwrap().instance_method("play").unwrap();
    assert_eq!(play.external_binding, None);
    assert!(table.namespace("Empty").unwrap().functions.is_empty());
}

#[test]
fn binding_follows_most_recent_method() {
    let text = "\
type Storage {
    def get(key: string): string
    type def open(name: string): Storage
    // maps to: kv::open
}
";

    let table = DefinitionTable::from_document(text, "storage.d.coi");
    let storage = table.type_def("Storage").unwrap();

    assert_eq!(storage.instance_method("get").unwrap().external_binding, None);
    assert_eq!(
        storage
            .static_method("open")
            .unwrap()
            .external_binding
            .as_ref()
            .map(ToString::to_string),
        Some("kv::open".to_string())
    );
}

#[test]
fn nested_body_braces_do_not_close_block_early() {
    let text = "\
type Timer {
    def start(ms: int): void {
        if (ms > 0) { schedule(ms); }
        {
        }
    }
    def stop(): void
}
def outside(): void
";

    let table = DefinitionTable::from_document(text, "timer.d.coi");
    let timer = table.type_def("Timer").unwrap();

    let names: Vec<_> = timer.instance_methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["start", "stop"]);
}

#[test]
fn unterminated_block_is_discarded() {
    let text = "\
type Done {
    def ok(): bool
}
type Partial {
    def lost(): void
";

    let table = DefinitionTable::from_document(text, "partial.d.coi");

    assert!(table.type_def("Done").is_some());
    assert!(table.type_def("Partial").is_none());
}

#[test]
fn commented_opener_is_skipped() {
    let text = "\
// type Ghost {
// }
type Real {
}
";

    let table = DefinitionTable::from_document(text, "ghost.d.coi");

    assert!(table.type_def("Ghost").is_none());
    assert!(table.type_def("Real").is_some());
}

#[test]
fn single_line_block_closes_immediately() {
    let table = DefinitionTable::from_document("namespace Nothing {}\ntype Unit {}\n", "a.d.coi");

    assert!(table.namespace("Nothing").is_some());
    assert!(table.type_def("Unit").is_some());
}

#[test]
fn later_declaration_wins_within_document() {
    let text = "\
type Point {
    def x(): int
}
type Point {
    def y(): int
}
";

    let table = DefinitionTable::from_document(text, "point.d.coi");
    let point = table.type_def("Point").unwrap();

    assert!(point.instance_method("x").is_none());
    assert!(point.instance_method("y").is_some());
    assert_eq!(table.type_count(), 1);
}

#[test]
fn last_overload_wins_on_lookup() {
    let text = "\
type Vec2 {
    def scale(f: float): Vec2
    def scale(x: float, y: float): Vec2
}
";

    let table = DefinitionTable::from_document(text, "vec.d.coi");
    let vec2 = table.type_def("Vec2").unwrap();

    assert_eq!(vec2.instance_methods.len(), 2);
    assert_eq!(vec2.instance_method("scale").unwrap().params.len(), 2);
}

#[test]
fn ancestors_follow_parent_names() {
    let text = "\
type Node {
}
type Element extends Node {
}
type Button extends Element {
}
type Loop extends Loop {
}
type Orphan extends Missing {
}
";

    let table = DefinitionTable::from_document(text, "tree.d.coi");

    let chain: Vec<_> = table
        .type_def("Button")
        .unwrap()
        .ancestors(&table)
        .into_iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(chain, vec!["Element", "Node"]);
    assert!(table.type_def("Loop").unwrap().ancestors(&table).is_empty());
    assert!(table.type_def("Orphan").unwrap().ancestors(&table).is_empty());
}

#[test]
fn method_signature_labels() {
    let table = DefinitionTable::from_document(
        "type Canvas {\n    type def create(w: int, h: int): Canvas\n}\n",
        "canvas.d.coi",
    );
    let create = table.type_def("Canvas").unwrap().static_method("create").unwrap();

    assert_eq!(create.label(), "create(w: int, h: int): Canvas");
    assert_eq!(create.snippet(), "create(${1:w}, ${2:h})");
}

#[test]
fn load_directory_missing_gives_empty_table() {
    let (temp_dir, _) = create_test_definition_dir();

    let table = DefinitionTable::load_directory(&temp_dir.path().join("nope"));

    assert!(table.is_empty());
}

#[test]
fn load_directory_reads_only_declaration_documents() {
    let (_temp_dir, def_dir) = create_test_definition_dir();
    write_declaration(&def_dir, "dom", "type Element {\n    def id(): string\n}\n");
    write_declaration(&def_dir, "math", "namespace Math {\n    def abs(x: int): int\n}\n");
    fs::write(def_dir.join("notes.coi"), "type Ignored {\n}\n").unwrap();
    fs::create_dir(def_dir.join("nested")).unwrap();
    fs::write(
        def_dir.join("nested").join(format!("deep{}", DECLARATION_SUFFIX)),
        "type Deep {\n}\n",
    )
    .unwrap();

    let table = DefinitionTable::load_directory(&def_dir);

    assert_eq!(table.type_count(), 1);
    assert_eq!(table.namespace_count(), 1);
    assert_eq!(table.type_def("Element").unwrap().source_id, "dom.d.coi");
    assert!(table.type_def("Ignored").is_none());
    assert!(table.type_def("Deep").is_none());
}

#[cfg(unix)]
#[test]
fn load_directory_skips_entries_that_are_not_readable_files() {
    let (_temp_dir, def_dir) = create_test_definition_dir();
    write_declaration(&def_dir, "dom", "type Element {\n}\n");
    std::os::unix::fs::symlink(
        def_dir.join("missing.d.coi"),
        def_dir.join(format!("dangling{}", DECLARATION_SUFFIX)),
    )
    .unwrap();
    fs::create_dir(def_dir.join(format!("folder{}", DECLARATION_SUFFIX))).unwrap();

    let table = DefinitionTable::load_directory(&def_dir);

    assert_eq!(table.type_count(), 1);
    assert!(table.type_def("Element").is_some());
}

#[test]
fn load_directory_later_file_wins() {
    let (_temp_dir, def_dir) = create_test_definition_dir();
    write_declaration(&def_dir, "a_first", "type Shared {\n    def old(): int\n}\n");
    write_declaration(&def_dir, "b_second", "type Shared {\n    def new(): int\n}\n");

    let table = DefinitionTable::load_directory(&def_dir);
    let shared = table.type_def("Shared").unwrap();

    assert_eq!(shared.source_id, "b_second.d.coi");
    assert!(shared.instance_method("new").is_some());
    assert!(shared.instance_method("old").is_none());
}

#[test]
fn types_iterate_in_name_order() {
    let table = DefinitionTable::from_document(
        "type Zeta {\n}\ntype Alpha {\n}\ntype Mid {\n}\n",
        "order.d.coi",
    );

    let names: Vec<_> = table.types().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
}
