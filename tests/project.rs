use serde_json::{json, Value};
use serde_json_query::JsonPath;

fn exclude(expr: &str, data: &Value) -> Value {
    JsonPath::parse(expr)
        .expect("valid expression")
        .exclude(data)
        .expect("evaluates")
}

fn include(expr: &str, data: &Value) -> Value {
    JsonPath::parse(expr)
        .expect("valid expression")
        .include(data)
        .expect("evaluates")
}

#[test]
fn exclude_descendant_fields() {
    assert_eq!(
        exclude(
            "$..bar",
            &json!({"outs": {"bar": 1, "ins": {"bar": 9}}, "outs2": {"bar": 2}}),
        ),
        json!({"outs": {"ins": {}}, "outs2": {}}),
    );
}

#[test]
fn exclude_object_member() {
    assert_eq!(
        exclude("foo.bar", &json!({"foo": {"bar": 1, "baz": 2}})),
        json!({"foo": {"baz": 2}}),
    );
}

#[test]
fn exclude_array_elements_preserves_order() {
    assert_eq!(exclude("[1]", &json!([10, 20, 30])), json!([10, 30]));
    assert_eq!(
        exclude("foo.[0]", &json!({"foo": [1, 2, 3]})),
        json!({"foo": [2, 3]}),
    );
    assert_eq!(exclude("[*]", &json!([10, 20, 30])), json!([]));
    assert_eq!(exclude("[1:]", &json!([10, 20, 30])), json!([10]));
}

#[test]
fn exclude_root_yields_null() {
    assert_eq!(exclude("$", &json!({"foo": 1})), json!(null));
    assert_eq!(exclude("`this`", &json!([1, 2])), json!(null));
}

#[test]
fn exclude_missing_location_is_a_no_op() {
    let data = json!({"foo": {"bar": 1}});
    assert_eq!(exclude("foo.missing", &data), data);
    assert_eq!(exclude("nope", &data), data);
}

#[test]
fn exclude_retains_emptied_containers() {
    assert_eq!(
        exclude("foo.bar", &json!({"foo": {"bar": 1}})),
        json!({"foo": {}}),
    );
}

#[test]
fn exclude_wildcard_members() {
    assert_eq!(
        exclude("foo.*", &json!({"foo": {"a": 1, "b": 2}, "bar": 3})),
        json!({"foo": {}, "bar": 3}),
    );
}

#[test]
fn include_keeps_matched_ancestry() {
    assert_eq!(
        include("foo.bar", &json!({"foo": {"bar": 1, "baz": 2}, "other": 3})),
        json!({"foo": {"bar": 1}}),
    );
}

#[test]
fn include_keeps_whole_sub_values_at_the_leaf() {
    assert_eq!(
        include("foo", &json!({"foo": {"bar": {"deep": 1}}, "other": 2})),
        json!({"foo": {"bar": {"deep": 1}}}),
    );
}

#[test]
fn include_array_elements() {
    assert_eq!(
        include("foo.[1]", &json!({"foo": [10, 20, 30]})),
        json!({"foo": [20]}),
    );
}

#[test]
fn include_union_keeps_both_branches() {
    assert_eq!(
        include("a.x|b", &json!({"a": {"x": 1, "y": 2}, "b": 3, "c": 4})),
        json!({"a": {"x": 1}, "b": 3}),
    );
}

#[test]
fn include_of_root_keeps_everything() {
    let data = json!({"foo": 1, "bar": [1, 2]});
    assert_eq!(include("$", &data), data);
}

#[test]
fn include_with_no_matches_empties_the_document() {
    assert_eq!(include("missing", &json!({"foo": 1})), json!({}));
    assert_eq!(include("missing", &json!([1, 2])), json!([]));
    assert_eq!(include("missing", &json!(42)), json!(null));
}

#[test]
fn include_where_keeps_the_subject() {
    // The retained location is the `where` subject, not the predicate's
    // witness
    assert_eq!(
        include(
            "* where flag",
            &json!({"foo": {"flag": 1, "data": 2}, "bar": {"data": 3}}),
        ),
        json!({"foo": {"flag": 1, "data": 2}}),
    );
}

#[test]
fn include_descendants() {
    assert_eq!(
        include(
            "$..bar",
            &json!({"outs": {"bar": 1, "ins": {"bar": 9}}, "other": 2}),
        ),
        json!({"outs": {"bar": 1, "ins": {"bar": 9}}}),
    );
}

#[test]
fn include_is_idempotent_on_field_paths() {
    let data = json!({"foo": {"bar": 1, "baz": 2}, "other": [1, 2]});
    for expr in ["foo.bar", "foo", "foo.bar|other"] {
        let once = include(expr, &data);
        let twice = include(expr, &once);
        assert_eq!(once, twice, "include({expr:?})");
    }
}

#[test]
fn exclude_after_include_removes_all_matches() {
    let data = json!({
        "outs": {"bar": 1, "ins": {"bar": 9}},
        "outs2": {"bar": 2},
        "other": true,
    });
    for expr in ["$..bar", "outs.bar", "outs.*"] {
        let path = JsonPath::parse(expr).expect("valid expression");
        let included = path.include(&data).expect("includes");
        let excluded = path.exclude(&included).expect("excludes");
        assert!(
            path.find(&excluded).expect("evaluates").is_empty(),
            "matches of {expr:?} survived exclusion: {excluded}",
        );
    }
}
