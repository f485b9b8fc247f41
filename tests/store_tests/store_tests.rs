//! Store Tests
//!
//! Tests for the in-memory tree behind the reference server.

use conftree::store::{path_components, ConfigStore, UNKNOWN_ACTION};
use conftree::{Action, ConfTreeError, Request, Value, ValueType};

const NODE_MISSING: &str = "Node doesn't exist. Operations are only allowed on existing data.";

// =============================================================================
// Path Tests
// =============================================================================

#[test]
fn test_path_components() {
    assert_eq!(path_components("/"), Some(vec![]));
    assert_eq!(path_components("/a/"), Some(vec!["a"]));
    assert_eq!(path_components("/a/b/"), Some(vec!["a", "b"]));
}

#[test]
fn test_invalid_paths() {
    for path in ["", "a/", "/a", "//", "/a//b/", "/a/b"] {
        assert_eq!(path_components(path), None, "path {:?}", path);
    }
}

// =============================================================================
// Local Edit Tests
// =============================================================================

#[test]
fn test_set_creates_nodes() {
    let store = ConfigStore::new();
    store.set("/a/b/", "k", Value::Int(1)).unwrap();

    assert!(store.node_exists("/a/"));
    assert!(store.node_exists("/a/b/"));
    assert_eq!(store.value("/a/b/", "k", ValueType::Int), Some(Value::Int(1)));
}

#[test]
fn test_set_replaces_same_type_only() {
    let store = ConfigStore::new();
    store.set("/", "k", Value::Int(1)).unwrap();
    store.set("/", "k", Value::Int(2)).unwrap();
    store.set("/", "k", Value::Bool(true)).unwrap();

    assert_eq!(store.value("/", "k", ValueType::Int), Some(Value::Int(2)));
    assert_eq!(store.value("/", "k", ValueType::Bool), Some(Value::Bool(true)));
}

#[test]
fn test_invalid_path_is_config_error() {
    let store = ConfigStore::new();

    assert!(matches!(store.create_node("nope"), Err(ConfTreeError::Config(_))));
    assert!(matches!(
        store.set("/a", "k", Value::Int(1)),
        Err(ConfTreeError::Config(_))
    ));
}

#[test]
fn test_clones_share_tree() {
    let store = ConfigStore::new();
    let other = store.clone();

    other.create_node("/shared/").unwrap();
    assert!(store.node_exists("/shared/"));
}

#[test]
fn test_parse_seed() {
    let (path, key, value) = ConfigStore::parse_seed("/sensor/:exposure:int=5000").unwrap();

    assert_eq!(path, "/sensor/");
    assert_eq!(key, "exposure");
    assert_eq!(value, Value::Int(5000));
}

#[test]
fn test_parse_seed_value_may_contain_separators() {
    let (path, key, value) = ConfigStore::parse_seed("/:url:string=http://host:80/").unwrap();

    assert_eq!(path, "/");
    assert_eq!(key, "url");
    assert_eq!(value, Value::String("http://host:80/".to_string()));
}

#[test]
fn test_parse_seed_errors() {
    assert!(matches!(ConfigStore::parse_seed("/:k:int"), Err(ConfTreeError::Config(_))));
    assert!(matches!(ConfigStore::parse_seed("k:int=1"), Err(ConfTreeError::Config(_))));
    assert!(matches!(ConfigStore::parse_seed("/:k:blob=1"), Err(ConfTreeError::Config(_))));
    assert!(matches!(
        ConfigStore::parse_seed("/:k:int=x"),
        Err(ConfTreeError::ValueFormat { .. })
    ));
}

// =============================================================================
// Request Handling Tests
// =============================================================================

#[test]
fn test_handle_node_exists() {
    let store = ConfigStore::demo();

    let yes = store.handle(&Request::node_exists("/camera/roi/"));
    assert_eq!(yes.action, Action::NodeExists);
    assert_eq!(yes.value_type, ValueType::Bool);
    assert_eq!(yes.message, "true");

    let no = store.handle(&Request::node_exists("/camera/lens/"));
    assert_eq!(no.message, "false");
}

#[test]
fn test_handle_attr_exists() {
    let store = ConfigStore::demo();

    assert!(store.handle(&Request::attr_exists("/sensor/", "gain", ValueType::Float)).as_bool());
    assert!(!store.handle(&Request::attr_exists("/sensor/", "gain", ValueType::Double)).as_bool());

    let missing = store.handle(&Request::attr_exists("/lens/", "gain", ValueType::Float));
    assert!(missing.is_error());
    assert_eq!(missing.message, NODE_MISSING);
}

#[test]
fn test_handle_get() {
    let store = ConfigStore::demo();

    let response = store.handle(&Request::get("/camera/", "name", ValueType::String));
    assert_eq!(response.action, Action::Get);
    assert_eq!(response.value_type, ValueType::String);
    assert_eq!(response.message, "cam0");

    let wrong_type = store.handle(&Request::get("/camera/", "name", ValueType::Int));
    assert!(wrong_type.is_error());
    assert!(wrong_type.message.starts_with("Attribute of given type doesn't exist."));
}

#[test]
fn test_handle_put() {
    let store = ConfigStore::demo();

    let response = store.handle(&Request::put("/camera/", "fps", ValueType::Short, "60"));
    assert_eq!(response.action, Action::Put);
    assert_eq!(store.value("/camera/", "fps", ValueType::Short), Some(Value::Short(60)));

    let out_of_range = store.handle(&Request::put("/camera/", "fps", ValueType::Short, "70000"));
    assert!(out_of_range.is_error());
    assert_eq!(out_of_range.message, "Impossible to convert value according to type.");
    assert_eq!(store.value("/camera/", "fps", ValueType::Short), Some(Value::Short(60)));
}

#[test]
fn test_handle_put_does_not_create() {
    let store = ConfigStore::demo();

    let response = store.handle(&Request::put("/camera/", "zoom", ValueType::Int, "2"));
    assert!(response.is_error());
    assert_eq!(store.value("/camera/", "zoom", ValueType::Int), None);

    let response = store.handle(&Request::put("/lens/", "zoom", ValueType::Int, "2"));
    assert_eq!(response.message, NODE_MISSING);
    assert!(!store.node_exists("/lens/"));
}

#[test]
fn test_handle_listings() {
    let store = ConfigStore::demo();

    let children = store.handle(&Request::get_children("/"));
    assert_eq!(children.value_type, ValueType::String);
    assert_eq!(children.names(), vec!["sensor", "camera"]);

    let attributes = store.handle(&Request::get_attributes("/camera/"));
    assert_eq!(attributes.names(), vec!["fps", "name", "timestamp", "scale"]);

    let types = store.handle(&Request::get_types("/", "logLevel"));
    assert_eq!(types.names(), vec!["byte"]);
}

#[test]
fn test_handle_listing_errors() {
    let store = ConfigStore::demo();

    assert_eq!(
        store.handle(&Request::get_children("/camera/roi/")).message,
        "Node has no children."
    );
    assert_eq!(
        store.handle(&Request::get_types("/", "missing")).message,
        "Node has no attributes with specified key."
    );

    store.create_node("/empty/").unwrap();
    assert_eq!(
        store.handle(&Request::get_attributes("/empty/")).message,
        "Node has no attributes."
    );
}

#[test]
fn test_handle_attribute_keys_are_distinct() {
    let store = ConfigStore::new();
    store.set("/", "k", Value::Int(1)).unwrap();
    store.set("/", "j", Value::Int(1)).unwrap();
    store.set("/", "k", Value::String("s".to_string())).unwrap();

    let attributes = store.handle(&Request::get_attributes("/"));
    assert_eq!(attributes.names(), vec!["k", "j"]);

    let types = store.handle(&Request::get_types("/", "k"));
    assert_eq!(types.names(), vec!["int", "string"]);
}

#[test]
fn test_handle_error_action() {
    let store = ConfigStore::demo();
    let request = Request {
        action: Action::Error,
        node_path: Some("/".to_string()),
        key: None,
        value_type: None,
        value: None,
    };

    let response = store.handle(&request);

    assert!(response.is_error());
    assert_eq!(response.message, UNKNOWN_ACTION);
    assert_eq!(response.message, "Unknown action.");
}

#[test]
fn test_demo_store_is_fully_seeded() {
    let store = ConfigStore::demo();

    for node in ["/", "/sensor/", "/camera/", "/camera/roi/"] {
        assert!(store.node_exists(node), "missing {}", node);
    }
    assert_eq!(store.value("/", "logLevel", ValueType::Byte), Some(Value::Byte(5)));
    assert_eq!(store.value("/sensor/", "autoExposure", ValueType::Bool), Some(Value::Bool(true)));
    assert_eq!(store.value("/camera/", "scale", ValueType::Double), Some(Value::Double(0.25)));
    assert_eq!(store.value("/camera/roi/", "y", ValueType::Int), Some(Value::Int(0)));
}
