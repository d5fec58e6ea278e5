use crate::error::{AppError, AppResult};

/// Account display name, 20-60 characters.
pub fn validate_user_name(name: &str) -> AppResult<()> {
    let len = name.chars().count();
    if !(20..=60).contains(&len) {
        return Err(AppError::BadRequest(
            "Name must be between 20 and 60 characters.".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    };
    if !well_formed {
        return Err(AppError::BadRequest("Email must be valid.".into()));
    }
    Ok(())
}

/// 8-16 characters with at least one uppercase letter and one special character.
pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if !(8..=16).contains(&len) {
        return Err(AppError::BadRequest(
            "Password must be 8-16 characters.".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::BadRequest(
            "Password must contain at least one uppercase letter.".into(),
        ));
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err(AppError::BadRequest(
            "Password must contain at least one special character.".into(),
        ));
    }
    Ok(())
}

pub fn validate_user_address(address: &str) -> AppResult<()> {
    if address.chars().count() > 400 {
        return Err(AppError::BadRequest(
            "Address must be at most 400 characters.".into(),
        ));
    }
    Ok(())
}

pub fn validate_store_name(name: &str) -> AppResult<()> {
    let len = name.chars().count();
    if !(1..=100).contains(&len) {
        return Err(AppError::BadRequest(
            "Store name must be between 1 and 100 characters.".into(),
        ));
    }
    Ok(())
}

pub fn validate_store_address(address: &str) -> AppResult<()> {
    let len = address.chars().count();
    if !(1..=400).contains(&len) {
        return Err(AppError::BadRequest(
            "Address is required and must be at most 400 characters.".into(),
        ));
    }
    Ok(())
}

pub fn validate_rating_value(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest(
            "Rating must be an integer between 1 and 5.".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_name_bounds() {
        assert!(validate_user_name("short name").is_err());
        assert!(validate_user_name("a perfectly reasonable name").is_ok());
        assert!(validate_user_name(&"x".repeat(61)).is_err());
        assert!(validate_user_name(&"x".repeat(20)).is_ok());
        assert!(validate_user_name(&"x".repeat(60)).is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user @example.com").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Valid#123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("nouppercase#1").is_err());
        assert!(validate_password("NoSpecial123").is_err());
        assert!(validate_password(&format!("A#{}", "a".repeat(20))).is_err());
    }

    #[test]
    fn store_fields() {
        assert!(validate_store_name("").is_err());
        assert!(validate_store_name("Corner Shop").is_ok());
        assert!(validate_store_address("").is_err());
        assert!(validate_store_address("1 Main St").is_ok());
        assert!(validate_store_address(&"x".repeat(401)).is_err());
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating_value(0).is_err());
        assert!(validate_rating_value(1).is_ok());
        assert!(validate_rating_value(5).is_ok());
        assert!(validate_rating_value(6).is_err());
    }
}
