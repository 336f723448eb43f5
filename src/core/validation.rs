//! Validation helpers shared by settings loading and CLI parsing

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// Require a count to be at least 1
pub fn require_at_least_one(field: &str, value: usize) -> Result<usize, String> {
    if value < 1 {
        Err(format!("{} must be at least 1 (got {})", field, value))
    } else {
        Ok(value)
    }
}

/// Require a ratio strictly between 0.0 and 1.0
pub fn require_open_unit_interval(field: &str, value: f64) -> Result<f64, String> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "{} must be between 0.0 and 1.0 exclusive (got {})",
            field, value
        ))
    }
}

/// Require a multiplier strictly greater than 1.0
pub fn require_growth_factor(field: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 1.0 {
        Ok(value)
    } else {
        Err(format!("{} must be greater than 1.0 (got {})", field, value))
    }
}
