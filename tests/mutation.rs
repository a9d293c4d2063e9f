use chisel_dom::errors::DomError;
use chisel_dom::{Document, JsonValue, Kind};

const MEMBERS: &str = r#"{
    "member1" : 12345,
    "member2" : [1, 2, 3, 4, 5],
    "member3" : {
        "sub1" : 1.234,
        "sub2" : true,
        "sub3" : null
    },
    "member4" : "rapidjson is awesome!"
}"#;

#[test]
fn should_apply_setters_in_place() {
    let mut doc: Document = MEMBERS.parse().unwrap();
    let mut root = doc.value_mut();
    root.get_member_mut("member1").unwrap().set_int(54321);
    root.get_member_mut("member2").unwrap().append(6).unwrap();
    root.get_member_mut("member3")
        .unwrap()
        .add_member("sub4", false)
        .unwrap();
    assert_eq!(
        doc.to_json_string(),
        r#"{"member1":54321,"member2":[1,2,3,4,5,6],"member3":{"sub1":1.234,"sub2":true,"sub3":null,"sub4":false},"member4":"rapidjson is awesome!"}"#
    );
}

#[test]
fn should_remove_members_elements_and_paths() {
    let mut doc: Document = MEMBERS.parse().unwrap();
    let mut root = doc.value_mut();
    assert_eq!(root.remove_member("member1"), Ok(true));
    root.get_member_mut("member2")
        .unwrap()
        .array_remove(2)
        .unwrap();
    assert_eq!(root.remove_path("member3.sub3"), Ok(true));
    assert_eq!(root.remove_path("member3.sub3"), Ok(false));
    assert_eq!(root.remove_member("member1"), Ok(false));
    assert_eq!(
        doc.to_json_string(),
        r#"{"member2":[1,2,4,5],"member3":{"sub1":1.234,"sub2":true},"member4":"rapidjson is awesome!"}"#
    );
}

#[test]
fn member_count_should_track_adds_and_removes() {
    let mut doc = Document::new();
    let mut root = doc.value_mut();
    root.init_object();
    for (index, key) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        root.add_member(key, index as i32).unwrap();
    }
    assert_eq!(root.remove_member("b"), Ok(true));
    assert_eq!(root.remove_member("d"), Ok(true));
    assert_eq!(root.remove_member("missing"), Ok(false));
    assert_eq!(root.view().member_count(), Ok(3));
    assert_eq!(root.view().member_names(), Ok(vec!["a", "c", "e"]));
}

#[test]
fn array_removal_should_preserve_order() {
    let mut doc = Document::new();
    let mut root = doc.value_mut();
    root.init_array();
    for value in 1..=3 {
        root.append(value).unwrap();
    }
    root.array_remove(1).unwrap();
    assert_eq!(root.view().array_size(), Ok(2));
    assert_eq!(root.view().to_json_string(), "[1,3]");
    assert_eq!(
        root.array_remove(2),
        Err(DomError::IndexOutOfBounds { index: 2, len: 2 })
    );
}

#[test]
fn sixty_four_bit_integers_should_serialize_exactly() {
    let mut doc = Document::new();
    doc.value_mut().set_int64(9007199254740993);
    assert_eq!(doc.to_json_string(), "9007199254740993");
    assert!(doc.value().is_int64());
}

#[test]
fn set_string_should_copy_the_input() {
    let mut doc = Document::new();
    {
        let transient = String::from("copied into the document");
        doc.value_mut().set_string(&transient);
    }
    assert_eq!(doc.value().get_string(), Ok("copied into the document"));
    let before = doc.arena_stats().string_bytes;
    doc.value_mut().set_string("again");
    assert_eq!(doc.arena_stats().string_bytes, before + 5);
}

#[test]
fn setters_should_replace_the_kind() {
    let mut doc: Document = "[1,2,3]".parse().unwrap();
    let mut root = doc.value_mut();
    root.set_double(2.5);
    assert_eq!(root.view().kind(), Kind::Double);
    root.set_bool(false);
    assert_eq!(root.view().type_code(), 1);
    root.init_object();
    assert_eq!(root.view().member_count(), Ok(0));
    root.set_null();
    assert!(root.view().is_null());
}

#[test]
fn mutations_on_the_wrong_kind_should_fail() {
    let mut doc: Document = r#"{"s":"text"}"#.parse().unwrap();
    let mut root = doc.value_mut();
    assert_eq!(
        root.append(1),
        Err(DomError::TypeMismatch {
            expected: Kind::Array,
            found: Kind::Object
        })
    );
    let mut s = root.get_member_mut("s").unwrap();
    assert_eq!(
        s.add_member("k", true),
        Err(DomError::TypeMismatch {
            expected: Kind::Object,
            found: Kind::String
        })
    );
    assert!(s.remove_member("k").is_err());
    assert_eq!(
        root.get_member_mut("missing").unwrap_err(),
        DomError::MemberNotFound("missing".to_string())
    );
    assert_eq!(doc.to_json_string(), r#"{"s":"text"}"#);
}

#[test]
fn set_value_should_deep_copy() {
    let mut doc: Document = r#"{"source":{"list":[1,2]},"target":null}"#.parse().unwrap();
    let source = doc.value().get_member("source").unwrap().id();
    doc.value_mut()
        .get_member_mut("target")
        .unwrap()
        .set_value(source)
        .unwrap();
    doc.value_mut()
        .get_path_mut("source.list")
        .unwrap()
        .append(3)
        .unwrap();
    assert_eq!(
        doc.to_json_string(),
        r#"{"source":{"list":[1,2,3]},"target":{"list":[1,2]}}"#
    );
}

#[test]
fn values_should_copy_between_documents() {
    let mut target = Document::new();
    target.value_mut().init_array();
    {
        let source: Document = r#"{"name":"moved","tags":["a","b"]}"#.parse().unwrap();
        target.value_mut().append(source.value()).unwrap();
        target
            .value_mut()
            .append(source.value().get_member("tags").unwrap())
            .unwrap();
    }
    assert_eq!(
        target.to_json_string(),
        r#"[{"name":"moved","tags":["a","b"]},["a","b"]]"#
    );
    assert_eq!(
        target.value().get_path("0.tags").unwrap().string_array(),
        Ok(vec!["a", "b"])
    );
}

#[test]
fn foreign_handles_should_be_rejected() {
    let mut first: Document = "[1]".parse().unwrap();
    let second: Document = "{}".parse().unwrap();
    let handle = second.value().id();
    assert_eq!(
        first.value_mut().append(handle),
        Err(DomError::ForeignHandle)
    );
    assert_eq!(first.to_json_string(), "[1]");
}

#[test]
fn freestanding_values_should_be_importable() {
    let mut doc = Document::new();
    let value = JsonValue::Object(vec![
        ("id".to_string(), JsonValue::Integer64(1 << 40)),
        ("tags".to_string(), JsonValue::Array(vec!["x".into(), 0.5.into()])),
    ]);
    let imported = doc.import(&value);
    assert_eq!(doc.get(imported).unwrap(), value);
    doc.set_root(value.clone()).unwrap();
    assert_eq!(doc.value().to_value(), value);
}

#[test]
fn detached_nodes_should_be_built_then_attached() {
    let mut doc = Document::new();
    doc.value_mut().init_object();
    let list = doc.create_array();
    {
        let mut list = doc.get_mut(list).unwrap();
        list.append("first").unwrap();
        list.append(JsonValue::Null).unwrap();
    }
    let empty = doc.create_value();
    doc.value_mut().add_member("list", list).unwrap();
    doc.value_mut().add_member("empty", empty).unwrap();
    assert_eq!(doc.to_json_string(), r#"{"list":["first",null],"empty":null}"#);
}

#[test]
fn set_member_should_replace_or_append() {
    let mut doc: Document = r#"{"a":1,"a":2}"#.parse().unwrap();
    let mut root = doc.value_mut();
    root.set_member("a", "replaced").unwrap();
    root.set_member("b", 3).unwrap();
    assert_eq!(
        doc.to_json_string(),
        r#"{"a":"replaced","a":2,"b":3}"#
    );
}

#[test]
fn paths_should_be_created_on_demand() {
    let mut doc = Document::new();
    let mut root = doc.value_mut();
    root.init_object();
    root.set_path("config.server.port", 8080).unwrap();
    root.set_path("config.server.host", "localhost").unwrap();
    root.get_path_or_create("config.client").unwrap();
    root.set_path("config.server.port", 9090).unwrap();
    assert_eq!(
        doc.to_json_string(),
        r#"{"config":{"server":{"port":9090,"host":"localhost"},"client":{}}}"#
    );
}

#[test]
fn path_creation_should_index_existing_arrays() {
    let mut doc: Document = r#"{"list":[{"a":1}]}"#.parse().unwrap();
    let mut root = doc.value_mut();
    root.set_path("list.0.b", true).unwrap();
    assert_eq!(
        root.set_path("list.3.b", true),
        Err(DomError::IndexOutOfBounds { index: 3, len: 1 })
    );
    assert_eq!(root.remove_path("list.0"), Ok(true));
    assert_eq!(root.remove_path("list.0"), Ok(false));
    assert_eq!(doc.to_json_string(), r#"{"list":[]}"#);
}
