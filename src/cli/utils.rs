use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::menu::MenuItem;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(extra)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(extra);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output menu items as a table or a JSON array
pub fn output_items(output_format: &OutputFormat, items: &[MenuItem]) -> anyhow::Result<()> {
    if items.is_empty() {
        return output_empty_collection(output_format, "items", "No menu items found");
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "items": items }))?);
        }
        OutputFormat::Text => {
            println!(
                "{:<20} {:<24} {:<15} {:>5}  {:<13} {}",
                "MENU ID", "LABEL", "CATEGORY", "ORDER", "ROLE", "ENABLED"
            );
            for item in items {
                println!(
                    "{:<20} {:<24} {:<15} {:>5}  {:<13} {}",
                    item.menu_id,
                    truncate(&item.label, 24),
                    item.category,
                    item.order,
                    item.required_role,
                    if item.is_enabled { "yes" } else { "no" }
                );
            }
        }
    }
    Ok(())
}

/// Output a single menu item in the appropriate format
pub fn output_item(output_format: &OutputFormat, item: &MenuItem) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item)?);
        }
        OutputFormat::Text => {
            println!("Menu ID:  {}", item.menu_id);
            println!("Label:    {}", item.label);
            println!("Path:     {}", item.path);
            println!("Category: {}", item.category);
            println!("Order:    {}", item.order);
            println!("Role:     {}", item.required_role);
            println!("Enabled:  {}", item.is_enabled);
            println!("Updated:  {}", item.updated_at.to_rfc3339());
        }
    }
    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_values() {
        assert_eq!(truncate("Dashboard", 24), "Dashboard");
    }

    #[test]
    fn test_truncate_marks_cut_values() {
        let cut = truncate("Business Glossary and Terms", 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('…'));
    }
}
