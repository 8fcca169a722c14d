use serde_json::value::Value as Json;

use crate::error::RenderError;
use crate::helpers::HelperDef;
use crate::support::str::html_escape;

/// Html-escape helper, appended implicitly to every output chain that
/// does not end in `raw`. Only strings are escaped; other values pass
/// through untouched.
#[derive(Clone, Copy)]
pub struct EncodeHelper;

impl HelperDef for EncodeHelper {
    fn call(&self, value: &Json, _: &[Json]) -> Result<Json, RenderError> {
        match *value {
            Json::String(ref s) => Ok(Json::String(html_escape(s))),
            _ => Ok(value.clone()),
        }
    }
}

pub static ENCODE_HELPER: EncodeHelper = EncodeHelper;
