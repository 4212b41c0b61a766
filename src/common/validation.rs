// src/common/validation.rs

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

// ---
// Validações customizadas usadas nos `#[validate(custom(...))]`
// ---
pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("El valor no puede ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

/// Comissão em porcentagem: 0 a 100.
pub fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    if *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &100.0);
        err.message = Some("La comisión debe estar entre 0 y 100.".into());
        return Err(err);
    }
    Ok(())
}

/// Monta um `ValidationErrors` de um campo só (regras que o derive não cobre).
pub fn field_error(field: &'static str, code: &'static str, message: String) -> ValidationErrors {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_bounds() {
        assert!(validate_percentage(&Decimal::ZERO).is_ok());
        assert!(validate_percentage(&Decimal::from(100)).is_ok());
        assert!(validate_percentage(&Decimal::new(255, 1)).is_ok());
        assert!(validate_percentage(&Decimal::from(101)).is_err());
        assert!(validate_percentage(&Decimal::from(-1)).is_err());
    }

    #[test]
    fn field_error_reports_the_field() {
        let errors = field_error("nichos", "unknown_reference", "Nicho 9 no existe".into());
        let fields = errors.field_errors();
        assert!(fields.keys().any(|k| k.to_string() == "nichos"));
    }
}
