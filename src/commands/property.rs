//! Property commands: `get`, `set`, `remove`, `has`, `dump`, `load`.

use super::CommandContext;
use crate::cli::{GetArgs, LoadArgs, NameArgs, SetArgs};
use serde_json::Value;
use sharedfile::error::{Result, SharedError};
use std::io::Read;

/// Parse a command line value: JSON if possible, plain string otherwise.
pub(crate) fn parse_value(input: &str, raw: bool) -> Value {
    if raw {
        return Value::String(input.to_string());
    }
    serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_string()))
}

fn render(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SharedError::UserError(format!("failed to render value: {}", e)))
}

/// Execute the `get` command.
pub fn cmd_get(ctx: &CommandContext, args: GetArgs) -> Result<()> {
    let default = args
        .default
        .as_deref()
        .map(|d| parse_value(d, false))
        .unwrap_or(Value::Null);

    let value = ctx.shared_state().get_or(&args.name, default)?;
    println!("{}", render(&value)?);
    Ok(())
}

/// Execute the `set` command.
pub fn cmd_set(ctx: &CommandContext, args: SetArgs) -> Result<()> {
    let value = parse_value(&args.value, args.raw);
    let stored = ctx.shared_state().set(&args.name, value)?;
    log::info!("set '{}' in '{}'", args.name, ctx.file().display());
    println!("{}", render(&stored)?);
    Ok(())
}

/// Execute the `remove` command.
pub fn cmd_remove(ctx: &CommandContext, args: NameArgs) -> Result<()> {
    ctx.shared_state().remove(&args.name)?;
    log::info!("removed '{}' from '{}'", args.name, ctx.file().display());
    Ok(())
}

/// Execute the `has` command.
pub fn cmd_has(ctx: &CommandContext, args: NameArgs) -> Result<()> {
    println!("{}", ctx.shared_state().has(&args.name)?);
    Ok(())
}

/// Execute the `dump` command.
pub fn cmd_dump(ctx: &CommandContext) -> Result<()> {
    let data = ctx.shared_state().data()?;
    println!("{}", render(&Value::Object(data))?);
    Ok(())
}

/// Execute the `load` command.
///
/// The input must hold a JSON object; it replaces every property at once.
pub fn cmd_load(ctx: &CommandContext, args: LoadArgs) -> Result<()> {
    let content = if args.input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| SharedError::UserError(format!("failed to read stdin: {}", e)))?;
        buf
    } else {
        std::fs::read_to_string(&args.input).map_err(|e| {
            SharedError::UserError(format!("failed to read '{}': {}", args.input, e))
        })?
    };

    let data = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(SharedError::UserError(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            )));
        }
        Err(e) => {
            return Err(SharedError::UserError(format!("invalid JSON input: {}", e)));
        }
    };

    let count = data.len();
    ctx.shared_state().set_data(data)?;
    log::info!("loaded {} properties into '{}'", count, ctx.file().display());
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_context;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn parse_value_prefers_json() {
        assert_eq!(parse_value("42", false), json!(42));
        assert_eq!(parse_value("true", false), json!(true));
        assert_eq!(parse_value("{\"a\":[1]}", false), json!({"a": [1]}));
        assert_eq!(parse_value("\"quoted\"", false), json!("quoted"));
        assert_eq!(parse_value("null", false), json!(null));
    }

    #[test]
    fn parse_value_falls_back_to_string() {
        assert_eq!(parse_value("world", false), json!("world"));
        assert_eq!(parse_value("{broken", false), json!("{broken"));
        assert_eq!(parse_value("42", true), json!("42"));
    }

    #[test]
    fn set_remove_round_trip() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(&dir.path().join("cli.sync"));

        cmd_set(
            &ctx,
            SetArgs {
                name: "hello".to_string(),
                value: "world".to_string(),
                raw: false,
            },
        )
        .unwrap();
        assert_eq!(ctx.shared_state().get("hello").unwrap(), Some(json!("world")));

        cmd_remove(
            &ctx,
            NameArgs {
                name: "hello".to_string(),
            },
        )
        .unwrap();
        assert!(!ctx.shared_state().has("hello").unwrap());
    }

    #[test]
    fn load_replaces_all_properties() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(&dir.path().join("cli.sync"));
        ctx.shared_state().set("old", json!(1)).unwrap();

        let input = dir.path().join("input.json");
        std::fs::write(&input, r#"{"a": 1, "b": "two"}"#).unwrap();
        cmd_load(
            &ctx,
            LoadArgs {
                input: input.to_string_lossy().to_string(),
            },
        )
        .unwrap();

        let data = ctx.shared_state().data().unwrap();
        assert_eq!(Value::Object(data), json!({"a": 1, "b": "two"}));
    }

    #[test]
    fn load_rejects_non_objects() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(&dir.path().join("cli.sync"));
        let input = dir.path().join("input.json");
        std::fs::write(&input, "[1, 2]").unwrap();

        let err = cmd_load(
            &ctx,
            LoadArgs {
                input: input.to_string_lossy().to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "expected a JSON object, found an array");
        assert!(!ctx.file().exists());
    }
}
