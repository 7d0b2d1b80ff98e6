//! Whole-document reload: load every document of the stream with serde_yaml
//! and print it back, for comparison with the event trace.
//!
//! Aliases are expanded by the loader, so an anchored value shows up in full
//! wherever it is referenced.

use serde::Deserialize;

/// Load each document of `input` and return their emitted YAML, one after
/// another.
pub fn render(input: &str) -> Result<String, String> {
    let mut rendered = String::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        let value = serde_yaml::Value::deserialize(document)
            .map_err(|e| format!("YAML parse error: {}", e))?;
        let text =
            serde_yaml::to_string(&value).map_err(|e| format!("YAML encode error: {}", e))?;
        rendered.push_str(&text);
    }
    Ok(rendered)
}
