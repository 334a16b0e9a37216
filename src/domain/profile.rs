use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// The signed-in caller as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddressType {
    #[default]
    Home,
    Work,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "type", default)]
    pub kind: AddressType,
    pub line1: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub zip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Address {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.line1.trim().is_empty() || self.city.trim().is_empty() || self.zip.trim().is_empty()
        {
            return Err(DomainError::InvalidInput(
                "address line, city and pincode are required".to_string(),
            ));
        }
        match &self.phone {
            Some(phone) if !is_valid_phone(phone) => Err(DomainError::InvalidPhone),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl UserProfile {
    /// A profile with nothing saved yet, seeded from the identity.
    pub fn from_identity(identity: &Identity) -> Self {
        UserProfile {
            user_id: identity.user_id.clone(),
            name: identity.display_name.clone(),
            email: identity.email.clone(),
            phone: None,
            addresses: Vec::new(),
        }
    }

    pub fn update_contact(&mut self, name: &str, phone: &str) -> Result<(), DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("name is required".to_string()));
        }
        if !is_valid_phone(phone) {
            return Err(DomainError::InvalidPhone);
        }
        self.name = Some(name.to_string());
        self.phone = Some(phone.to_string());
        Ok(())
    }

    pub fn add_address(&mut self, address: Address) -> Result<(), DomainError> {
        address.validate()?;
        self.addresses.push(address);
        Ok(())
    }

    pub fn remove_address(&mut self, index: usize) -> Result<Address, DomainError> {
        if index >= self.addresses.len() {
            return Err(DomainError::NotFound);
        }
        Ok(self.addresses.remove(index))
    }

    /// Name recorded on orders: saved profile name, then identity name.
    pub fn order_name(&self, identity: &Identity) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| identity.display_name.clone())
            .unwrap_or_else(|| "User".to_string())
    }
}

/// Exactly ten ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}
