use serde_json::json;
use tangular::Tangular;

#[test]
fn test_escape_by_default() {
    let mut reg = Tangular::new();
    reg.register_template_string("t", "{{data}}").unwrap();

    assert_eq!(
        reg.render("t", &json!({"data": "<script>alert(1)</script>"}))
            .unwrap(),
        "&lt;script&gt;alert(1)&lt;/script&gt;"
    );
    assert_eq!(
        reg.render("t", &json!({"data": "a \"quoted\" & plain"})).unwrap(),
        "a &quot;quoted&quot; &amp; plain"
    );
}

#[test]
fn test_raw_disables_escape() {
    let reg = Tangular::new();

    assert_eq!(
        reg.render_template("{{data|raw}}", &json!({"data": "<b>bold</b>"}))
            .unwrap(),
        "<b>bold</b>"
    );
}

#[test]
fn test_raw_only_counts_as_final_stage() {
    let mut reg = Tangular::new();
    fn shout(
        value: &serde_json::Value,
        _: &[serde_json::Value],
    ) -> Result<serde_json::Value, tangular::RenderError> {
        Ok(json!(format!("{}!", value.as_str().unwrap_or(""))))
    }
    reg.register_helper("shout", Box::new(shout));

    assert_eq!(
        reg.render_template("{{data|raw|shout}}", &json!({"data": "<b>"}))
            .unwrap(),
        "&lt;b&gt;!"
    );
}

#[test]
fn test_non_strings_pass_through() {
    let reg = Tangular::new();
    assert_eq!(
        reg.render_template("{{a}} {{b}} {{c}}", &json!({"a": 3, "b": true, "c": 1.5}))
            .unwrap(),
        "3 true 1.5"
    );
}
