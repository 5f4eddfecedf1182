//! LocalStorage wire protocol
//!
//! Every frame is an [`Envelope`]. Inbound envelopes are parsed into a closed
//! [`Command`] set; outbound ones are rendered from a [`Reply`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RelayError;

/// Module name carried by every LocalStorage envelope
pub const MODULE_NAME: &str = "LocalStorage";

/// Tagged frame exchanged over the storage socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub module: String,
    pub tag: String,
    #[serde(default)]
    pub args: Value,
}

impl Envelope {
    pub fn new(tag: &str, args: Value) -> Self {
        Self {
            module: MODULE_NAME.to_string(),
            tag: tag.to_string(),
            args,
        }
    }
}

/// Scope of a `clear` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearTarget {
    /// Remove every key
    All,
    /// Remove keys starting with the prefix
    Prefix(String),
    /// Truthy but non-text argument: nothing is removed
    Ignored,
}

impl ClearTarget {
    /// Interpret `clear` args with JavaScript truthiness: falsy clears
    /// everything, a string clears by prefix, anything else is ignored.
    pub fn from_args(args: &Value) -> Self {
        match args {
            Value::Null | Value::Bool(false) => ClearTarget::All,
            Value::String(s) if s.is_empty() => ClearTarget::All,
            Value::String(s) => ClearTarget::Prefix(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => ClearTarget::All,
            _ => ClearTarget::Ignored,
        }
    }
}

/// Commands understood by the storage adapter.
///
/// `None` marks a field missing from `args`, which differs from an explicit
/// `null`: missing echoed fields are left out of the reply, and a `put`
/// without a value is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Get {
        label: Option<Value>,
        key: Option<Value>,
    },
    Put {
        key: Option<Value>,
        value: Option<Value>,
    },
    ListKeys {
        label: Option<Value>,
        prefix: Option<Value>,
    },
    Clear(ClearTarget),
}

impl Command {
    pub fn tag(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Put { .. } => "put",
            Command::ListKeys { .. } => "listkeys",
            Command::Clear(_) => "clear",
        }
    }
}

impl TryFrom<Envelope> for Command {
    type Error = RelayError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        if envelope.module != MODULE_NAME {
            return Err(RelayError::UnknownModule {
                module: envelope.module,
            });
        }

        let args = envelope.args;
        match envelope.tag.as_str() {
            "get" => Ok(Command::Get {
                label: field(&args, "label"),
                key: field(&args, "key"),
            }),
            "put" => Ok(Command::Put {
                key: field(&args, "key"),
                value: field(&args, "value"),
            }),
            "listkeys" => Ok(Command::ListKeys {
                label: field(&args, "label"),
                prefix: field(&args, "prefix"),
            }),
            "clear" => Ok(Command::Clear(ClearTarget::from_args(&args))),
            _ => Err(RelayError::UnknownCommand { tag: envelope.tag }),
        }
    }
}

fn field(args: &Value, name: &str) -> Option<Value> {
    args.get(name).cloned()
}

/// Replies emitted by the storage adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Sent once when the storage socket opens
    Startup,
    Got {
        label: Option<Value>,
        key: Option<Value>,
        value: Value,
    },
    Keys {
        label: Option<Value>,
        prefix: Option<Value>,
        keys: Vec<String>,
    },
}

impl Reply {
    pub fn tag(&self) -> &'static str {
        match self {
            Reply::Startup => "startup",
            Reply::Got { .. } => "got",
            Reply::Keys { .. } => "keys",
        }
    }

    pub fn into_envelope(self) -> Envelope {
        let tag = self.tag();
        let args = match self {
            Reply::Startup => Value::Null,
            Reply::Got { label, key, value } => {
                let mut args = Map::new();
                echo(&mut args, "label", label);
                echo(&mut args, "key", key);
                args.insert("value".to_string(), value);
                Value::Object(args)
            }
            Reply::Keys {
                label,
                prefix,
                keys,
            } => {
                let mut args = Map::new();
                echo(&mut args, "label", label);
                echo(&mut args, "prefix", prefix);
                args.insert("keys".to_string(), keys.into());
                Value::Object(args)
            }
        };
        Envelope::new(tag, args)
    }
}

fn echo(args: &mut Map<String, Value>, name: &str, value: Option<Value>) {
    if let Some(value) = value {
        args.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &str) -> Result<Command, RelayError> {
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        Command::try_from(envelope)
    }

    #[test]
    fn test_parse_get_and_listkeys() {
        let cmd = parse(r#"{"module":"LocalStorage","tag":"get","args":{"label":"l","key":"k"}}"#)
            .unwrap();
        assert_eq!(
            cmd,
            Command::Get {
                label: Some(json!("l")),
                key: Some(json!("k"))
            }
        );

        let cmd = parse(r#"{"module":"LocalStorage","tag":"listkeys","args":{"prefix":"a."}}"#)
            .unwrap();
        assert_eq!(
            cmd,
            Command::ListKeys {
                label: None,
                prefix: Some(json!("a."))
            }
        );
        assert_eq!(cmd.tag(), "listkeys");
    }

    #[test]
    fn test_parse_put_distinguishes_missing_and_null_value() {
        let cmd = parse(r#"{"module":"LocalStorage","tag":"put","args":{"key":"k"}}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Put {
                key: Some(json!("k")),
                value: None
            }
        );

        let cmd = parse(r#"{"module":"LocalStorage","tag":"put","args":{"key":"k","value":null}}"#)
            .unwrap();
        assert_eq!(
            cmd,
            Command::Put {
                key: Some(json!("k")),
                value: Some(Value::Null)
            }
        );
    }

    #[test]
    fn test_parse_clear_without_args_clears_all() {
        let cmd = parse(r#"{"module":"LocalStorage","tag":"clear"}"#).unwrap();
        assert_eq!(cmd, Command::Clear(ClearTarget::All));
    }

    #[test]
    fn test_clear_target_truthiness() {
        assert_eq!(ClearTarget::from_args(&Value::Null), ClearTarget::All);
        assert_eq!(ClearTarget::from_args(&json!(false)), ClearTarget::All);
        assert_eq!(ClearTarget::from_args(&json!("")), ClearTarget::All);
        assert_eq!(ClearTarget::from_args(&json!(0)), ClearTarget::All);
        assert_eq!(
            ClearTarget::from_args(&json!("user.")),
            ClearTarget::Prefix("user.".to_string())
        );
        assert_eq!(ClearTarget::from_args(&json!(true)), ClearTarget::Ignored);
        assert_eq!(ClearTarget::from_args(&json!(7)), ClearTarget::Ignored);
        assert_eq!(
            ClearTarget::from_args(&json!({"prefix": "x"})),
            ClearTarget::Ignored
        );
    }

    #[test]
    fn test_parse_rejects_foreign_module_and_unknown_tag() {
        let err = parse(r#"{"module":"WebSocket","tag":"get","args":null}"#).unwrap_err();
        assert!(matches!(err, RelayError::UnknownModule { ref module } if module == "WebSocket"));

        let err = parse(r#"{"module":"LocalStorage","tag":"drop","args":null}"#).unwrap_err();
        assert!(matches!(err, RelayError::UnknownCommand { ref tag } if tag == "drop"));
    }

    #[test]
    fn test_startup_envelope_has_null_args() {
        let text = serde_json::to_string(&Reply::Startup.into_envelope()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({"module": "LocalStorage", "tag": "startup", "args": null})
        );
    }

    #[test]
    fn test_keys_envelope_shape() {
        let envelope = Reply::Keys {
            label: Some(json!("lbl")),
            prefix: Some(json!("p")),
            keys: vec!["p1".to_string(), "p2".to_string()],
        }
        .into_envelope();

        assert_eq!(envelope.tag, "keys");
        assert_eq!(
            envelope.args,
            json!({"label": "lbl", "prefix": "p", "keys": ["p1", "p2"]})
        );
    }

    #[test]
    fn test_missing_echo_fields_are_omitted() {
        let envelope = Reply::Got {
            label: None,
            key: Some(json!("k")),
            value: json!(1),
        }
        .into_envelope();
        assert_eq!(envelope.args, json!({"key": "k", "value": 1}));

        let envelope = Reply::Keys {
            label: Some(Value::Null),
            prefix: None,
            keys: vec![],
        }
        .into_envelope();
        assert_eq!(envelope.args, json!({"label": null, "keys": []}));
    }
}
