//! The extraction schema and its post-processing.
//!
//! Models do not always honour the requested shape: numbers come back as
//! numbers, single values as lists, the address as one string, or the whole
//! record nested under `main_entity` / `company_info`. Every field here
//! accepts those variations and post-processing reduces them to plain
//! strings.

use std::collections::HashSet;

use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;
use serde_json::Value;

use crate::config::{MAX_FIELD_CHARS, MAX_JOINED_LIST_ITEMS};
use crate::models::ImprintFields;
use crate::utils::truncate_chars;

/// Literal replies that mean "not found".
const NULL_LIKE: &[&str] = &["null", "none", "n/a", "-"];

/// A value that may arrive as string, number, bool, list, or null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Loose(Vec<String>);

impl Loose {
    fn from_value(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Null => {}
            Value::String(s) => out.push(s.clone()),
            Value::Number(n) => out.push(n.to_string()),
            Value::Bool(b) => out.push(b.to_string()),
            Value::Array(items) => items.iter().for_each(|v| Self::from_value(v, out)),
            Value::Object(map) => map.values().for_each(|v| Self::from_value(v, out)),
        }
    }

    /// Cleaned, non-empty entries in order.
    fn entries(&self) -> impl Iterator<Item = String> + '_ {
        self.0.iter().map(|s| clean(s)).filter(|s| !s.is_empty())
    }

    /// All entries joined into one value.
    fn scalar(&self) -> String {
        bounded(&self.entries().collect::<Vec<_>>().join("; "))
    }

    /// Entries deduplicated case-insensitively, optionally limited, joined with `"; "`.
    fn joined(&self, limit: Option<usize>) -> String {
        let mut seen = HashSet::new();
        let entries = self
            .0
            .iter()
            .flat_map(|s| s.split(';'))
            .map(clean)
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.to_lowercase()))
            .take(limit.unwrap_or(usize::MAX))
            .collect::<Vec<_>>();
        bounded(&entries.join("; "))
    }
}

impl<'de> Deserialize<'de> for Loose {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let mut out = Vec::new();
        Loose::from_value(&value, &mut out);
        Ok(Loose(out))
    }
}

/// A nested object that may instead arrive as text or something unusable.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Nested<T> {
    Parsed(T),
    Text(String),
    Ignored(IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AddressSchema {
    street: Loose,
    city: Loose,
    postal_code: Loose,
    country: Loose,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RegistrationSchema {
    registration_number: Loose,
}

/// The reply object the field-extraction prompt asks for, plus the
/// alternative keys models are known to use instead.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ImprintSchema {
    company_name: Loose,
    organization_name: Loose,
    name: Loose,
    company: Loose,
    entity_name: Loose,
    business_name: Loose,

    managing_directors: Loose,

    business_address: Option<Nested<AddressSchema>>,
    address: Option<Nested<AddressSchema>>,

    phone_numbers: Loose,
    phone: Loose,
    email_addresses: Loose,
    email: Loose,
    website_url: Loose,
    website: Loose,

    registration_details: Option<Nested<RegistrationSchema>>,
    registration_number: Loose,
    vat_id: Loose,

    main_entity: Option<Nested<Box<ImprintSchema>>>,
    company_info: Option<Nested<Box<ImprintSchema>>>,
}

impl ImprintSchema {
    /// Reduces the decoded reply to the eleven post-processed fields.
    ///
    /// Top-level values win; fields still empty are filled from
    /// `main_entity`, then `company_info`.
    pub(crate) fn into_fields(self) -> ImprintFields {
        let (street, city, postal_code, country) = match self.business_address.or(self.address) {
            Some(Nested::Parsed(a)) => (
                a.street.scalar(),
                a.city.scalar(),
                a.postal_code.scalar(),
                a.country.scalar(),
            ),
            // A one-line address lands in `street` rather than being guessed apart
            Some(Nested::Text(text)) => (
                bounded(&clean(&text)),
                String::new(),
                String::new(),
                String::new(),
            ),
            _ => Default::default(),
        };

        let registration_number = match self.registration_details {
            Some(Nested::Parsed(r)) => r.registration_number.scalar(),
            Some(Nested::Text(text)) => bounded(&clean(&text)),
            _ => String::new(),
        };

        let mut fields = ImprintFields {
            company_name: first_non_empty([
                &self.company_name,
                &self.organization_name,
                &self.name,
                &self.company,
                &self.entity_name,
                &self.business_name,
            ]),
            managing_directors: self.managing_directors.joined(None),
            street,
            city,
            postal_code,
            country,
            phone: or_else(
                self.phone_numbers.joined(Some(MAX_JOINED_LIST_ITEMS)),
                || self.phone.joined(Some(MAX_JOINED_LIST_ITEMS)),
            ),
            email: or_else(
                self.email_addresses.joined(Some(MAX_JOINED_LIST_ITEMS)),
                || self.email.joined(Some(MAX_JOINED_LIST_ITEMS)),
            ),
            website: or_else(self.website_url.scalar(), || self.website.scalar()),
            registration_number: or_else(registration_number, || {
                self.registration_number.scalar()
            }),
            vat_id: self.vat_id.scalar(),
        };

        for nested in [self.main_entity, self.company_info].into_iter().flatten() {
            if let Nested::Parsed(inner) = nested {
                fill_missing(&mut fields, inner.into_fields());
            }
        }
        fields
    }
}

fn first_non_empty<const N: usize>(candidates: [&Loose; N]) -> String {
    candidates
        .iter()
        .map(|l| l.scalar())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn or_else(value: String, fallback: impl FnOnce() -> String) -> String {
    if value.is_empty() {
        fallback()
    } else {
        value
    }
}

fn fill_missing(fields: &mut ImprintFields, other: ImprintFields) {
    let pairs = [
        (&mut fields.company_name, other.company_name),
        (&mut fields.managing_directors, other.managing_directors),
        (&mut fields.street, other.street),
        (&mut fields.city, other.city),
        (&mut fields.postal_code, other.postal_code),
        (&mut fields.country, other.country),
        (&mut fields.phone, other.phone),
        (&mut fields.email, other.email),
        (&mut fields.website, other.website),
        (&mut fields.registration_number, other.registration_number),
        (&mut fields.vat_id, other.vat_id),
    ];
    for (slot, value) in pairs {
        if slot.is_empty() {
            *slot = value;
        }
    }
}

/// Trims, collapses inner whitespace, and maps null-like literals to `""`.
fn clean(value: &str) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if NULL_LIKE
        .iter()
        .any(|n| collapsed.eq_ignore_ascii_case(n))
    {
        String::new()
    } else {
        collapsed
    }
}

fn bounded(value: &str) -> String {
    truncate_chars(value, MAX_FIELD_CHARS).trim_end().to_string()
}
