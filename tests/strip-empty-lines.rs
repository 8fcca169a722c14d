use serde_json::json;
use tangular::Tangular;

#[test]
fn test_blank_lines_are_stripped() {
    let mut reg = Tangular::new();
    reg.register_template_string(
        "t",
        "first\n\n{{if show}}\nshown\n{{fi}}\n\nlast",
    )
    .unwrap();

    let rendered = reg.render("t", &json!({"show": true})).unwrap();
    assert_eq!(rendered, "first\nshown\nlast");
}

#[test]
fn test_lines_emptied_by_directives_disappear() {
    let reg = Tangular::new();
    let rendered = reg
        .render_template(
            "{{foreach m in items}}\n{{m}}\n{{end}}\n",
            &json!({"items": ["a", "b"]}),
        )
        .unwrap();
    assert_eq!(rendered, "a\nb\n");
}

#[test]
fn test_whitespace_only_lines_are_blank() {
    let reg = Tangular::new();
    let rendered = reg
        .render_template("a\n   \t\nb", &json!({}))
        .unwrap();
    assert_eq!(rendered, "a\nb");
}
