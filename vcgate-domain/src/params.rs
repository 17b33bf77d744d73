//! Request parameters and their per-command typed decoding.
//!
//! The request body is an untyped JSON object. Commands that need
//! parameters decode exactly the keys they use through [`FromParams`];
//! values are always string-encoded on the wire.

use serde_json::Value;

use super::error::{Result, VcError};

/// Untyped request parameters.
pub type Params = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// decode_body
// ---------------------------------------------------------------------------

/// Decode an optional JSON request body.
///
/// An empty (or whitespace-only) body and a literal `null` both yield an
/// empty map. Anything that is not a JSON object is a `BadRequest`.
pub fn decode_body(body: &[u8]) -> Result<Params> {
    // ---
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Params::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Params::new()),
        Ok(other) => Err(VcError::BadRequest(format!(
            "expected a JSON object body, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(VcError::BadRequest(format!("invalid JSON body: {e}"))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// FromParams
// ---------------------------------------------------------------------------

/// Typed view of the parameters one command needs.
pub trait FromParams: Sized {
    fn from_params(params: &Params) -> Result<Self>;
}

// ---

fn string_param<'a>(params: &'a Params, key: &str) -> Result<&'a str> {
    // ---
    match params.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(VcError::Handler(format!("{key} must be a string"))),
        None => Err(VcError::Handler(format!(
            "failed to find {key} in request body"
        ))),
    }
}

fn i32_param(params: &Params, key: &str) -> Result<i32> {
    // ---
    let raw = string_param(params, key)?;
    raw.parse::<i32>()
        .map_err(|e| VcError::Handler(format!("failed to parse {key} {raw:?} as integer: {e}")))
}

// ---------------------------------------------------------------------------
// Parameter structs
// ---------------------------------------------------------------------------

/// `set_charging_amps` — `{"charging_amps": "16"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargingAmps {
    pub amps: i32,
}

impl FromParams for ChargingAmps {
    fn from_params(params: &Params) -> Result<Self> {
        Ok(Self {
            amps: i32_param(params, "charging_amps")?,
        })
    }
}

/// `set_soc_limit` — `{"soc_limit": "80"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocLimit {
    pub percent: i32,
}

impl FromParams for SocLimit {
    fn from_params(params: &Params) -> Result<Self> {
        Ok(Self {
            percent: i32_param(params, "soc_limit")?,
        })
    }
}

/// `charge` — `{"enable": "true"}`. Any string other than `"true"` disables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeEnable {
    pub enable: bool,
}

impl FromParams for ChargeEnable {
    fn from_params(params: &Params) -> Result<Self> {
        Ok(Self {
            enable: string_param(params, "enable")? == "true",
        })
    }
}

// ---

#[cfg(test)]
mod tests {
    // ---
    use serde_json::json;

    use super::{decode_body, ChargeEnable, ChargingAmps, FromParams, Params, SocLimit};
    use crate::VcError;

    fn params(v: serde_json::Value) -> Params {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_and_null_bodies_are_no_parameters() {
        // ---
        assert!(decode_body(b"").unwrap().is_empty());
        assert!(decode_body(b"  \n").unwrap().is_empty());
        assert!(decode_body(b"null").unwrap().is_empty());
    }

    #[test]
    fn non_object_and_malformed_bodies_are_bad_requests() {
        // ---
        for body in [&b"[1,2]"[..], b"\"x\"", b"{\"a\":", b"not json"] {
            assert!(
                matches!(decode_body(body), Err(VcError::BadRequest(_))),
                "{:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn charging_amps_parses_string_integer() {
        // ---
        let p = params(json!({ "charging_amps": "16" }));
        assert_eq!(ChargingAmps::from_params(&p).unwrap().amps, 16);
    }

    #[test]
    fn charging_amps_rejects_words_numbers_and_missing_key() {
        // ---
        for v in [
            json!({ "charging_amps": "sixteen" }),
            json!({ "charging_amps": 16 }),
            json!({ "charging_amps": "99999999999" }),
            json!({}),
        ] {
            let err = ChargingAmps::from_params(&params(v.clone())).unwrap_err();
            assert!(matches!(err, VcError::Handler(_)), "{v}: {err:?}");
        }
    }

    #[test]
    fn soc_limit_uses_its_own_key() {
        // ---
        let p = params(json!({ "soc_limit": "80", "charging_amps": "16" }));
        assert_eq!(SocLimit::from_params(&p).unwrap().percent, 80);
        assert!(SocLimit::from_params(&params(json!({ "charging_amps": "80" }))).is_err());
    }

    #[test]
    fn charge_enable_only_true_string_enables() {
        // ---
        let on = params(json!({ "enable": "true" }));
        let off = params(json!({ "enable": "TRUE" }));
        assert!(ChargeEnable::from_params(&on).unwrap().enable);
        assert!(!ChargeEnable::from_params(&off).unwrap().enable);
        assert!(ChargeEnable::from_params(&params(json!({ "enable": true }))).is_err());
    }
}
