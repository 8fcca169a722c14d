use serde_json::value::Value as Json;

use crate::error::RenderError;
use crate::helpers::HelperDef;

/// Identity helper. As the final stage of a chain it also suppresses the
/// implicit html-escape, so `{{value|raw}}` emits the value verbatim.
#[derive(Clone, Copy)]
pub struct RawHelper;

impl HelperDef for RawHelper {
    fn call(&self, value: &Json, _: &[Json]) -> Result<Json, RenderError> {
        Ok(value.clone())
    }
}

pub static RAW_HELPER: RawHelper = RawHelper;

#[cfg(test)]
mod test {
    use serde_json::json;

    use crate::registry::Registry;

    #[test]
    fn test_raw_passes_markup_through() {
        let registry = Registry::new();
        let result = registry
            .render_template("{{markup|raw}}", &json!({"markup": "<i>em</i>"}))
            .unwrap();
        assert_eq!(result, "<i>em</i>");
    }
}
