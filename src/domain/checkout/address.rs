//! Delivery address selection and validation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::cart::AddressId;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0|\+84)[0-9]{9}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Please choose a saved address or enter a delivery address.")]
    MissingAddress,
    #[error("Please choose either a saved address or a new address, not both.")]
    ConflictingAddress,
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("Phone number {0} is not valid.")]
    InvalidPhone(String),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManualAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
}

impl ManualAddress {
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("Full name", &self.full_name),
            ("Address", &self.address),
            ("City", &self.city),
            ("Phone", &self.phone),
            ("Email", &self.email),
        ];
        if let Some(&(field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AddressError::MissingField(field));
        }

        if !PHONE_RE.is_match(self.phone.trim()) {
            return Err(AddressError::InvalidPhone(self.phone.clone()));
        }

        Ok(())
    }

    fn trimmed(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_owned(),
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            email: self.email.trim().to_owned(),
        }
    }
}

/// Exactly one of a saved address or a manually entered one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSelection {
    Saved(AddressId),
    Manual(ManualAddress),
}

/// The checkout form as filled in, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    pub address_id: Option<AddressId>,
    pub manual: Option<ManualAddress>,
}

impl TryFrom<AddressForm> for AddressSelection {
    type Error = AddressError;

    fn try_from(form: AddressForm) -> Result<Self, Self::Error> {
        match (form.address_id, form.manual) {
            (Some(_), Some(_)) => Err(AddressError::ConflictingAddress),
            (Some(address_id), None) => Ok(AddressSelection::Saved(address_id)),
            (None, Some(manual)) => {
                manual.validate()?;
                Ok(AddressSelection::Manual(manual.trimmed()))
            }
            (None, None) => Err(AddressError::MissingAddress),
        }
    }
}
