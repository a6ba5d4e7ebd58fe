use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

mod numeric;

pub use numeric::Numeric;

/// Administrative region (read-only, fetched wholesale)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: u64,
    pub name: String,
}

/// City belonging to a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub region_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

/// Listing agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u64,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub avatar: String,
}

impl Agent {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Real-estate listing as served by the API and kept in the mirror
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estate {
    pub id: u64,
    pub address: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Numeric,
    #[serde(default)]
    pub area: Numeric,
    /// `None` when the payload carries no usable count
    #[serde(default, deserialize_with = "count")]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub image: String,
    pub city_id: u64,
    #[serde(default)]
    pub agent_id: Option<u64>,
    #[serde(default, deserialize_with = "flag")]
    pub is_rental: bool,
    /// Resolved city, embedded by the API in list responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<City>,
}

impl Estate {
    pub fn region_id(&self) -> Option<u64> {
        self.city.as_ref().map(|city| city.region_id)
    }

    pub fn deal_kind(&self) -> &'static str {
        if self.is_rental {
            "rent"
        } else {
            "sale"
        }
    }
}

/// The API sends `is_rental` as 0/1; older payloads use booleans or strings.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().map(|v| v != 0.0).unwrap_or(false)),
        Value::String(s) => match s.trim() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(D::Error::custom(format!("invalid rental flag: {other:?}"))),
        },
        other => Err(D::Error::custom(format!("invalid rental flag: {other}"))),
    }
}

/// Bedroom counts arrive as numbers or numeric strings; anything else is unknown.
fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A binary part of a multipart submission
#[derive(Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read an image from disk, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::new(file_name, content_type_for(path), bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Server reply to a creation write
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRecord {
    pub id: u64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Payload for creating a listing
#[derive(Debug, Clone)]
pub struct NewEstate {
    pub address: String,
    pub zip_code: String,
    pub description: String,
    pub price: i64,
    pub area: f64,
    pub bedrooms: u32,
    pub region_id: u64,
    pub city_id: u64,
    pub agent_id: u64,
    pub is_rental: bool,
    pub image: Option<Attachment>,
}

impl NewEstate {
    /// Text parts of the multipart form, in submission order
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("price", self.price.to_string()),
            ("zip_code", self.zip_code.clone()),
            ("description", self.description.clone()),
            ("area", self.area.to_string()),
            ("city_id", self.city_id.to_string()),
            ("address", self.address.clone()),
            ("agent_id", self.agent_id.to_string()),
            ("bedrooms", self.bedrooms.to_string()),
            ("is_rental", if self.is_rental { "1" } else { "0" }.to_string()),
            ("region_id", self.region_id.to_string()),
        ]
    }

    /// First required field left blank, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.address.trim().is_empty() {
            Some("address")
        } else if self.zip_code.trim().is_empty() {
            Some("zip_code")
        } else if self.description.trim().is_empty() {
            Some("description")
        } else if self.image.as_ref().map_or(true, Attachment::is_empty) {
            Some("image")
        } else {
            None
        }
    }

    /// The record the server now holds: submitted fields plus its id
    pub fn to_estate(&self, created: &CreatedRecord, city: Option<City>) -> Estate {
        Estate {
            id: created.id,
            address: self.address.clone(),
            zip_code: self.zip_code.clone(),
            description: self.description.clone(),
            price: Numeric::from(self.price),
            area: Numeric::from(self.area),
            bedrooms: Some(self.bedrooms),
            image: created.image.clone().unwrap_or_default(),
            city_id: self.city_id,
            agent_id: Some(self.agent_id),
            is_rental: self.is_rental,
            city,
        }
    }
}

/// Payload for registering an agent
#[derive(Debug, Clone, Default)]
pub struct NewAgent {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<Attachment>,
}

impl NewAgent {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("surname", self.surname.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
        ]
    }

    /// First required field left blank, if any. All five are required.
    pub fn missing_field(&self) -> Option<&'static str> {
        self.form_fields()
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .or_else(|| {
                self.avatar
                    .as_ref()
                    .map_or(true, Attachment::is_empty)
                    .then_some("avatar")
            })
    }

    pub fn to_agent(&self, created: &CreatedRecord) -> Agent {
        Agent {
            id: created.id,
            name: self.name.clone(),
            surname: self.surname.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            avatar: created.avatar.clone().unwrap_or_default(),
        }
    }
}
