use sha2::{Digest, Sha256};

/// SHA-256 of the normalized or raw source text
pub fn calculate_text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of any serializable configuration (via its JSON form)
pub fn calculate_config_hash<T: serde::Serialize>(config: &T) -> Result<String, serde_json::Error> {
    let config_json = serde_json::to_string(config)?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
