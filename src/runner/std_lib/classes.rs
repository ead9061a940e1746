//! Built-in class schemas.
//!
//! The six classes the file manager is assembled from. Field lists are closed:
//! each class only ever namespaces the suffixes listed here.

use crate::runner::ds::schema::{ClassSchema, FieldSpec};

lazy_static! {
    static ref CORE_CLASSES: Vec<ClassSchema> = vec![
        archivelist(),
        filelist(),
        menu(),
        menubar(),
        statusbar(),
        msgbroker(),
    ];
}

/// All built-in class schemas.
pub fn core_classes() -> &'static [ClassSchema] {
    &CORE_CLASSES
}

/// Browsable listing of an archive's contents.
fn archivelist() -> ClassSchema {
    ClassSchema::new("archivelist", "__ARCHIVELIST__").with_fields(vec![
        FieldSpec::assoc("properties"),
        FieldSpec::array("all_entries"),
        FieldSpec::array("files"),
        FieldSpec::array("types"),
        FieldSpec::array("sizes"),
        FieldSpec::array("times"),
        FieldSpec::array("full_paths"),
    ])
}

/// Directory listing of one panel, with one index per sort order.
fn filelist() -> ClassSchema {
    let mut fields = vec![
        FieldSpec::assoc("properties"),
        FieldSpec::array("files"),
        FieldSpec::array("types"),
        FieldSpec::array("sizes"),
        FieldSpec::array("times"),
        FieldSpec::array("execs"),
        FieldSpec::assoc("marked"),
        FieldSpec::assoc("link_targets"),
        FieldSpec::array("rendered_rows"),
    ];
    for key in &["name", "date", "size", "ext"] {
        for order in &["asc", "desc"] {
            fields.push(FieldSpec::array(format!("index_{}_{}", key, order)));
        }
    }
    ClassSchema::new("filelist", "__FILELIST__").with_fields(fields)
}

fn menu() -> ClassSchema {
    ClassSchema::new("menu", "__MENU__").with_fields(vec![
        FieldSpec::assoc("properties"),
        FieldSpec::array("menu_names"),
        FieldSpec::assoc("menu_items"),
        FieldSpec::array("menu_positions"),
    ])
}

fn menubar() -> ClassSchema {
    ClassSchema::new("menubar", "__MENUBAR__")
}

fn statusbar() -> ClassSchema {
    ClassSchema::new("statusbar", "__STATUSBAR__")
}

/// Publish/subscribe hub; only the subscriber table is instance state.
fn msgbroker() -> ClassSchema {
    ClassSchema::new("msgbroker", "__MSGBROKER__").with_field(FieldSpec::assoc("subscribers"))
}
