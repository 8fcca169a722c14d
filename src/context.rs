use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::value::{to_value, Map, Value as Json};

use crate::error::RenderError;

pub type Object = BTreeMap<String, Json>;

/// The context wraps the data you render your templates with.
///
/// A dotted path such as `order.customer.name` navigates objects by key
/// and arrays by numeric index. A path that leads nowhere resolves to
/// `None`, never to an error; it contributes an empty value to the
/// surrounding expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    data: Json,
}

/// Overlay `addition` onto a copy of `base`. The base is untouched, so
/// bindings never leak into the enclosing payload.
pub fn merge_json(base: &Json, addition: &Object) -> Json {
    let mut base_map = match *base {
        Json::Object(ref m) => m.clone(),
        _ => Map::new(),
    };

    for (k, v) in addition.iter() {
        base_map.insert(k.clone(), v.clone());
    }

    Json::Object(base_map)
}

impl Context {
    /// Create a context with null data
    pub fn null() -> Context {
        Context { data: Json::Null }
    }

    /// Create a context from any serializable data
    pub fn wraps<T: Serialize>(e: &T) -> Result<Context, RenderError> {
        to_value(e)
            .map_err(RenderError::with)
            .map(|d| Context { data: d })
    }

    /// Resolve a dotted path against the wrapped data.
    pub fn navigate(&self, path: &str) -> Option<&Json> {
        let mut data = Some(&self.data);
        for seg in path.split('.') {
            data = match data {
                Some(&Json::Object(ref m)) => m.get(seg),
                Some(&Json::Array(ref l)) => seg.parse::<usize>().ok().and_then(|idx| l.get(idx)),
                _ => None,
            };
            if data.is_none() {
                break;
            }
        }
        data
    }

    /// Derive the scope one loop iteration runs in: the outer payload with
    /// the loop variable and `$index` merged on top.
    pub fn derive_with(&self, bindings: &Object) -> Context {
        Context {
            data: merge_json(&self.data, bindings),
        }
    }

    pub fn data(&self) -> &Json {
        &self.data
    }
}
