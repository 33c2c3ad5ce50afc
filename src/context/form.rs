//! Form bodies: `application/x-www-form-urlencoded` and `multipart/form-data`.

use bytes::Bytes;
use serde_json::{json, Map, Value};

use crate::error::RouteError;

/// An uploaded file inside a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

impl FormValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            FormValue::File(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            FormValue::Text(s) => Value::String(s.clone()),
            FormValue::File(f) => json!({
                "filename": f.filename,
                "contentType": f.content_type,
                "size": f.bytes.len(),
            }),
        }
    }
}

/// Ordered form fields. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: FormValue) {
        self.entries.push((name.into(), value));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FormValue::as_text)
    }

    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&FormValue> {
        self.entries
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON view. Repeated keys become arrays; files are described, not inlined.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.entries {
            let v = value.to_value();
            match map.get_mut(name) {
                Some(Value::Array(items)) => items.push(v),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, v]);
                }
                None => {
                    map.insert(name.clone(), v);
                }
            }
        }
        Value::Object(map)
    }
}

pub(crate) fn parse_urlencoded(body: &[u8]) -> FormData {
    FormData {
        entries: url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), FormValue::Text(v.into_owned())))
            .collect(),
    }
}

fn malformed(detail: impl std::fmt::Display) -> RouteError {
    RouteError::unprocessable(format!("Malformed multipart body: {detail}"))
}

/// Parse a `multipart/form-data` body. `content_type` is the full header
/// value carrying the `boundary` parameter.
///
/// Parts with a `filename` become [`FormValue::File`]; all other parts must
/// be UTF-8 text. Framing (preamble, transport padding after a delimiter,
/// part headers) is handled by `multer`.
pub(crate) async fn parse_multipart(body: Bytes, content_type: &str) -> Result<FormData, RouteError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| RouteError::unprocessable("Multipart body without a boundary parameter"))?;
    let stream = futures::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = FormData::new();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field
            .name()
            .map(ToOwned::to_owned)
            .ok_or_else(|| malformed("part without a field name"))?;
        let filename = field.file_name().map(ToOwned::to_owned);
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field.bytes().await.map_err(malformed)?;

        let value = match filename {
            Some(filename) => FormValue::File(FilePart {
                filename,
                content_type,
                bytes,
            }),
            None => FormValue::Text(
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| malformed("text field is not UTF-8"))?,
            ),
        };
        form.append(name, value);
    }
    Ok(form)
}
