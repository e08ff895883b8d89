use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str, error_code: Option<&str>) {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", response);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
}

/// One line of a text listing, truncated to `width` characters
pub fn summary_line(order: Option<i64>, title: &str, width: usize) -> String {
    let title: String = if title.chars().count() > width {
        let cut: String = title.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        title.to_string()
    };
    match order {
        Some(order) => format!("{:>4}  {}", order, title),
        None => format!("   -  {}", title),
    }
}
