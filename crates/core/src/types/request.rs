//! Customer vehicle requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::RequestId;
use super::vehicle::VehicleRequest;

/// Maximum length of an email address (RFC 5321).
const MAX_EMAIL_LENGTH: usize = 254;

/// Errors raised when a submitted request fails client-side validation.
///
/// Validation happens before any store call is issued.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The customer name is empty.
    #[error("customer name is required")]
    MissingName,
    /// The requested vehicle is empty.
    #[error("requested vehicle is required")]
    MissingVehicleRequest,
    /// The email address is present but malformed.
    #[error("invalid email address: {0}")]
    InvalidEmail(&'static str),
}

/// A stored customer request, as returned by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct CustomerRequest {
    /// Store-assigned identifier.
    pub id: RequestId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    /// Free text, "Year Make Model...".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vehicle_request: String,
    /// Store-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl CustomerRequest {
    /// Decompose the free-text vehicle request into year, make and model.
    #[must_use]
    pub fn vehicle(&self) -> VehicleRequest {
        VehicleRequest::parse(&self.vehicle_request)
    }
}

/// Fields submitted from the request form.
///
/// `name` and `vehicle_request` are required; `email` and `phone` may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub vehicle_request: String,
}

impl NewCustomerRequest {
    /// Trim every field and check the required ones.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name or vehicle request is empty,
    /// or if a non-empty email is not shaped like an address.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let request = Self {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            vehicle_request: self.vehicle_request.trim().to_owned(),
        };

        if request.name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if request.vehicle_request.is_empty() {
            return Err(ValidationError::MissingVehicleRequest);
        }
        if !request.email.is_empty() {
            check_email(&request.email)?;
        }

        Ok(request)
    }
}

/// Structural email check: local part, one `@`, non-empty domain.
fn check_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail("too long"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail("missing @ symbol"));
    };
    if local.is_empty() {
        return Err(ValidationError::InvalidEmail("empty local part"));
    }
    if domain.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail("invalid domain"));
    }
    Ok(())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, vehicle: &str) -> NewCustomerRequest {
        NewCustomerRequest {
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            vehicle_request: vehicle.to_string(),
        }
    }

    #[test]
    fn test_validated_trims_fields() {
        let request = form("  Jane Doe ", " jane@example.com ", " 1967 Ford Mustang ")
            .validated()
            .unwrap();
        assert_eq!(request.name, "Jane Doe");
        assert_eq!(request.email, "jane@example.com");
        assert_eq!(request.vehicle_request, "1967 Ford Mustang");
    }

    #[test]
    fn test_validated_rejects_empty_name() {
        assert_eq!(
            form("   ", "", "1967 Ford Mustang").validated(),
            Err(ValidationError::MissingName)
        );
    }

    #[test]
    fn test_validated_rejects_empty_vehicle() {
        assert_eq!(
            form("Jane", "", "").validated(),
            Err(ValidationError::MissingVehicleRequest)
        );
    }

    #[test]
    fn test_email_and_phone_are_optional() {
        assert!(form("Jane", "", "1967 Ford Mustang").validated().is_ok());
    }

    #[test]
    fn test_validated_rejects_malformed_email() {
        assert!(matches!(
            form("Jane", "jane.example.com", "1967 Ford Mustang").validated(),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            form("Jane", "@example.com", "1967 Ford Mustang").validated(),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            form("Jane", "jane@", "1967 Ford Mustang").validated(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_customer_request_tolerates_null_contact_fields() {
        let json = r#"{
            "id": 7,
            "name": "Jane",
            "email": null,
            "phone": null,
            "vehicle_request": "1967 Ford Mustang",
            "created_at": "2025-04-01T12:00:00+00:00"
        }"#;
        let request: CustomerRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.id.as_str(), "7");
        assert_eq!(request.email, "");
        assert_eq!(request.vehicle().make, "Ford");
    }
}
