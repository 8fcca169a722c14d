use serde_json::value::Value as Json;

use crate::error::RenderError;

pub use self::helper_encode::ENCODE_HELPER;
pub use self::helper_raw::RAW_HELPER;

/// Helper definition, one stage of a pipe chain.
///
/// `value` is the running value produced by the previous stage and
/// `params` are the parenthesized arguments, passed verbatim as strings
/// for the helper to interpret.
pub trait HelperDef: Send + Sync {
    fn call(&self, value: &Json, params: &[Json]) -> Result<Json, RenderError>;
}

/// Implement `HelperDef` for bare functions and closures.
impl<F> HelperDef for F
where
    F: Fn(&Json, &[Json]) -> Result<Json, RenderError> + Send + Sync,
{
    fn call(&self, value: &Json, params: &[Json]) -> Result<Json, RenderError> {
        (*self)(value, params)
    }
}

mod helper_encode;
mod helper_raw;

#[cfg(test)]
mod test {
    use serde_json::json;
    use serde_json::value::Value as Json;

    use crate::error::RenderError;
    use crate::registry::Registry;

    #[test]
    fn test_helper_as_function() {
        fn upper(value: &Json, _: &[Json]) -> Result<Json, RenderError> {
            match *value {
                Json::String(ref s) => Ok(Json::String(s.to_uppercase())),
                _ => Ok(value.clone()),
            }
        }

        let mut registry = Registry::new();
        registry.register_helper("upper", Box::new(upper));

        let result = registry
            .render_template("{{name|upper}}", &json!({"name": "tangular"}))
            .unwrap();
        assert_eq!(result, "TANGULAR");
    }

    #[test]
    fn test_helper_with_params() {
        fn plus(value: &Json, params: &[Json]) -> Result<Json, RenderError> {
            let base = value.as_f64().unwrap_or(0.0);
            let step = params
                .first()
                .and_then(|p| p.as_str())
                .and_then(|p| p.trim().parse::<f64>().ok())
                .unwrap_or(1.0);
            Ok(json!(base + step))
        }

        let mut registry = Registry::new();
        registry.register_helper("plus", Box::new(plus));

        let result = registry
            .render_template("{{ count | plus | plus(2) | plus | plus(3) }}", &json!({"count": 0}))
            .unwrap();
        assert_eq!(result, "7");
    }
}
