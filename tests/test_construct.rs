//! Construction of instances from class templates.
//!
//! Covers naming, initial state, atomic failure and the collision rules.

extern crate hackfm_classes;


use engine_util::{
    assert_no_trace, bound_names, config_engine, shipped_engine, shipped_templates, temp_engine,
    write_templates,
};
use hackfm_classes::parser::ast::FieldKind;
use hackfm_classes::runner::ds::env::ReconstructPolicy;
use hackfm_classes::runner::ds::error::ConstructionError;
use hackfm_classes::runner::ds::stage::ConstructionStage;
use hackfm_classes::runner::ds::value::Value;
use std::fs;

const FILELIST_FIELDS: [&str; 17] = [
    "properties",
    "files",
    "types",
    "sizes",
    "times",
    "execs",
    "marked",
    "link_targets",
    "rendered_rows",
    "index_name_asc",
    "index_name_desc",
    "index_date_asc",
    "index_date_desc",
    "index_size_asc",
    "index_size_desc",
    "index_ext_asc",
    "index_ext_desc",
];

fn shipped(class: &str) -> String {
    fs::read_to_string(shipped_templates().join(format!("{}.class", class))).unwrap()
}

#[test]
fn test_filelist_left_panel_list() {
    let mut engine = shipped_engine();
    let id = engine.construct("filelist", "left_panel.list").unwrap();
    let env = engine.env();

    for field in FILELIST_FIELDS.iter() {
        let name = format!("left_panel_list_{}", field);
        assert!(env.has_container(&name), "missing {}", name);
    }
    assert_eq!(env.container_names().len(), FILELIST_FIELDS.len());
    assert!(env.container_names().iter().all(|n| !n.contains('.')));

    let instance = env.instance(id).unwrap();
    assert_eq!(instance.name, "left_panel.list");
    assert_eq!(instance.sanitized, "left_panel_list");
    assert!(env.has_function("left_panel.list.reset"));
    assert_eq!(engine.last_stage(), Some(ConstructionStage::Activated));
}

#[test]
fn test_containers_start_at_template_defaults() {
    let mut engine = shipped_engine();
    engine.construct("filelist", "left_panel.list").unwrap();
    let env = engine.env();

    for field in FILELIST_FIELDS.iter().skip(1) {
        let container = env.container(&format!("left_panel_list_{}", field)).unwrap();
        assert!(container.value.is_empty(), "{} is not empty", container.name);
        assert_eq!(container.value, container.default);
    }

    let props = env.container("left_panel_list_properties").unwrap();
    assert_eq!(props.kind, FieldKind::Assoc);
    match &props.value {
        Value::Map(m) => {
            assert_eq!(m.get("path"), Some(&Value::from("")));
            assert_eq!(m.get("cursor"), Some(&Value::Integer(0)));
            assert_eq!(m.get("sort"), Some(&Value::from("name_asc")));
            assert_eq!(m.get("show_hidden"), Some(&Value::Boolean(false)));
        }
        other => panic!("properties is {:?}", other),
    }
}

#[test]
fn test_every_shipped_class_constructs() {
    let mut engine = shipped_engine();
    engine.construct("archivelist", "right_panel.archive").unwrap();
    engine.construct("filelist", "right_panel.list").unwrap();
    engine.construct("menu", "menus.file").unwrap();
    engine.construct("menubar", "top.bar").unwrap();
    engine.construct("statusbar", "bottom.status").unwrap();
    engine.construct("msgbroker", "app.broker").unwrap();

    let env = engine.env();
    assert_eq!(env.instances().len(), 6);
    assert!(env.has_container("right_panel_archive_full_paths"));
    assert!(env.has_container("menus_file_menu_positions"));
    assert!(env.has_container("app_broker_subscribers"));
    assert!(env.container_names().iter().all(|n| !n.contains('.')));
}

#[test]
fn test_placeholder_only_classes() {
    let mut engine = shipped_engine();
    let bar = engine.construct("menubar", "top.bar").unwrap();
    let status = engine.construct("statusbar", "bottom.status").unwrap();
    let env = engine.env();

    assert!(env.instance(bar).unwrap().containers.is_empty());
    assert!(env.instance(status).unwrap().containers.is_empty());
    assert!(env.container_names().is_empty());
    assert!(env.has_function("top.bar.name"));
    assert!(env.has_function("bottom.status.class"));
}

#[test]
fn test_reconstruct_reseats_with_same_shape() {
    let mut engine = shipped_engine();
    let first = engine.construct("filelist", "left_panel.list").unwrap();
    let (containers, functions) = bound_names(engine.env());
    let activation = engine.env().instance(first).unwrap().activation;

    engine
        .call("left_panel.list.add_file", vec![Value::from("README")])
        .unwrap();
    assert!(!engine
        .env()
        .container("left_panel_list_files")
        .unwrap()
        .value
        .is_empty());

    let second = engine.construct("filelist", "left_panel.list").unwrap();
    assert_eq!(first, second);
    assert_eq!(bound_names(engine.env()), (containers, functions));
    assert_eq!(engine.env().instances().len(), 1);
    assert!(engine
        .env()
        .container("left_panel_list_files")
        .unwrap()
        .value
        .is_empty());
    assert_ne!(engine.env().instance(second).unwrap().activation, activation);
}

#[test]
fn test_reconstruct_rejected_by_policy() {
    let root = write_templates(&[("menu", shipped("menu").as_str())]);
    let mut engine = config_engine("on_reconstruct = \"reject\"", &root);
    assert_eq!(engine.env().policy(), ReconstructPolicy::Reject);

    engine.construct("menu", "menus.file").unwrap();
    engine
        .call("menus.file.add_name", vec![Value::from("Open")])
        .unwrap();

    let err = engine.construct("menu", "menus.file").unwrap_err();
    assert!(matches!(err, ConstructionError::NameCollision { .. }));
    // the live instance keeps its state
    assert_eq!(
        engine.env().container("menus_file_menu_names").unwrap().value,
        Value::List(vec![Value::from("Open")])
    );
}

#[test]
fn test_sanitized_alias_is_rejected() {
    let mut engine = shipped_engine();
    engine.construct("filelist", "left_panel.list").unwrap();
    let before = bound_names(engine.env());

    let err = engine.construct("filelist", "left_panel_list").unwrap_err();
    match err {
        ConstructionError::NameCollision {
            instance,
            namespace,
            owner,
        } => {
            assert_eq!(instance, "left_panel_list");
            assert_eq!(namespace, "left_panel_list");
            assert_eq!(owner, "left_panel.list");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(bound_names(engine.env()), before);
    assert_eq!(engine.last_stage(), Some(ConstructionStage::Failed));
}

#[test]
fn test_other_separators_alias_too() {
    let mut engine = shipped_engine();
    engine.construct("msgbroker", "app/broker").unwrap();
    assert!(engine.env().has_container("app_broker_subscribers"));
    assert!(matches!(
        engine.construct("msgbroker", "app:broker"),
        Err(ConstructionError::NameCollision { .. })
    ));
}

#[test]
fn test_same_name_other_class_is_rejected() {
    let mut engine = shipped_engine();
    engine.construct("menu", "panel").unwrap();
    let err = engine.construct("msgbroker", "panel").unwrap_err();
    assert!(matches!(err, ConstructionError::NameCollision { .. }));
    assert!(!engine.env().has_container("panel_subscribers"));
}

#[test]
fn test_container_owned_by_other_instance_is_rejected() {
    let probe = "class probe for __PROBE__ { array __PROBE___b_files }";
    let root = write_templates(&[("probe", probe), ("filelist", shipped("filelist").as_str())]);
    let mut engine = config_engine(
        "[[class]]\nname = \"probe\"\nfields = [ { name = \"b_files\", kind = \"array\" } ]\n",
        &root,
    );

    engine.construct("probe", "a").unwrap();
    assert!(engine.env().has_container("a_b_files"));

    let err = engine.construct("filelist", "a.b").unwrap_err();
    match err {
        ConstructionError::NameCollision {
            namespace, owner, ..
        } => {
            assert_eq!(namespace, "a_b_files");
            assert_eq!(owner, "a");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_no_trace(engine.env(), "a_b");
}

#[test]
fn test_unknown_class_leaves_no_state() {
    let mut engine = shipped_engine();
    engine.construct("menu", "menus.file").unwrap();
    let before = bound_names(engine.env());

    let err = engine.construct("treeview", "left.tree").unwrap_err();
    match err {
        ConstructionError::TemplateNotFound { class, location } => {
            assert_eq!(class, "treeview");
            assert!(location.ends_with("treeview.class"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(bound_names(engine.env()), before);
    assert_no_trace(engine.env(), "left_tree");
}

#[test]
fn test_broken_template_is_bad_instantiation() {
    let broken = "class menu for __MENU__ {
        assoc __MENU___properties
        array __MENU___menu_names
        assoc __MENU___menu_items
        array __MENU___menu_positions
        fn __MENU__.draw = screen.draw(__MENU___menu_names)
    }";
    let (_dir, mut engine) = temp_engine(&[("menu", broken)]);

    let err = engine.construct("menu", "menus.file").unwrap_err();
    match err {
        ConstructionError::BadInstantiation { reason, .. } => {
            assert!(reason.contains("screen.draw"))
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_no_trace(engine.env(), "menus_file");
    assert!(!engine.env().has_function("menus.file.draw"));
}

#[test]
fn test_template_missing_a_field_is_bad_instantiation() {
    let short = "class msgbroker for __MSGBROKER__ {}";
    let (_dir, mut engine) = temp_engine(&[("msgbroker", short)]);
    assert!(matches!(
        engine.construct("msgbroker", "bus"),
        Err(ConstructionError::BadInstantiation { .. })
    ));
    assert!(engine.env().instances().is_empty());
}

#[test]
fn test_instance_name_illegal_in_source() {
    let mut engine = shipped_engine();
    let err = engine.construct("msgbroker", "app broker").unwrap_err();
    assert!(matches!(err, ConstructionError::BadInstantiation { .. }));
    let err = engine.construct("msgbroker", "").unwrap_err();
    assert!(matches!(err, ConstructionError::BadInstantiation { .. }));
    assert!(engine.env().instances().is_empty());
}

#[test]
fn test_instance_name_is_inserted_literally() {
    let mut engine = shipped_engine();
    engine.construct("menu", "__MENU__x").unwrap();
    assert!(engine.env().has_container("__MENU__x_menu_names"));
    assert!(engine.env().has_function("__MENU__x.reset"));
}

#[test]
fn test_leading_digit_is_prefixed() {
    let mut engine = shipped_engine();
    engine.construct("msgbroker", "2nd.bus").unwrap();
    assert!(engine.env().has_container("_2nd_bus_subscribers"));
    assert!(engine.env().has_function("2nd.bus.subscribe"));
}

#[test]
fn test_leading_digit_with_prefix_sharing_fields() {
    let tally = "class tally for __TALLY__ {
        array __TALLY___sizes
        scalar __TALLY___sizes_total = 0
        fn __TALLY__.total = state.get(__TALLY___sizes_total)
    }";
    let root = write_templates(&[("tally", tally)]);
    let mut engine = config_engine(
        "[[class]]\nname = \"tally\"\nfields = [\n\
         { name = \"sizes\", kind = \"array\" },\n\
         { name = \"sizes_total\", kind = \"scalar\" },\n]\n",
        &root,
    );

    engine.construct("tally", "2nd").unwrap();
    let env = engine.env();
    assert!(env.has_container("_2nd_sizes"));
    assert!(env.has_container("_2nd_sizes_total"));
    assert!(!env.has_container("__2nd_sizes_total"));
    assert_eq!(engine.call("2nd.total", vec![]), Ok(Value::Integer(0)));
}

#[test]
fn test_cached_store_serves_repeat_constructions() {
    let root = write_templates(&[("msgbroker", shipped("msgbroker").as_str())]);
    let mut engine = config_engine("cache_templates = true", &root);
    engine.construct("msgbroker", "one").unwrap();
    fs::remove_file(root.path().join("msgbroker.class")).unwrap();
    engine.construct("msgbroker", "two").unwrap();
    assert!(engine.env().has_container("two_subscribers"));
}

#[test]
fn test_dry_run_reports_without_binding() {
    let engine = shipped_engine();
    let expanded = engine.dry_run("filelist", "left_panel.list").unwrap();
    assert_eq!(expanded.sanitized, "left_panel_list");
    assert!(expanded.source.contains("array left_panel_list_index_ext_desc"));
    assert!(expanded.source.contains("fn left_panel.list.reset"));
    assert!(engine.env().instances().is_empty());
}
