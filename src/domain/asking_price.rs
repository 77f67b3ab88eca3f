#[derive(Debug, Clone, PartialEq)]
pub struct AskingPrice {
    raw: String,
}

impl AskingPrice {
    /// Accepts a decimal amount greater than zero. The error is the message
    /// shown to the client.
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err("Price is required".to_string()),
        };

        let amount: f64 = match raw.parse() {
            Ok(amount) if f64::is_finite(amount) => amount,
            _ => return Err("Invalid price format".to_string()),
        };

        if amount <= 0.0 {
            return Err("Price must be greater than 0".to_string());
        }

        Ok(AskingPrice {
            raw: raw.to_string(),
        })
    }

    /// The price as the client typed it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}
