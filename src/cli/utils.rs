use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data) = data {
                response["data"] = data;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print `key: value` lines for the text output of a JSON object
pub fn print_fields(value: &Value) {
    if let Some(object) = value.as_object() {
        for (key, field) in object {
            match field {
                Value::String(s) => println!("  {}: {}", key, s),
                Value::Null => println!("  {}: -", key),
                other => println!("  {}: {}", key, other),
            }
        }
    }
}
