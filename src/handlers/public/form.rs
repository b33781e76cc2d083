// handlers/public/form.rs - form body extractor shared by /register and /login

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};

use crate::error::ApiError;

/// Text fields from a urlencoded, multipart, or JSON body.
///
/// The login page posts `FormData`, so multipart has to work; scripted
/// clients tend to send urlencoded or JSON.
#[derive(Debug, Default)]
pub struct FormFields(pub HashMap<String, String>);

impl FormFields {
    /// Missing fields read as empty, like an unfilled input
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?;

            let mut fields = HashMap::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?
            {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?;
                fields.insert(name, value);
            }
            return Ok(Self(fields));
        }

        if content_type.starts_with("application/json") {
            let Json(fields) = Json::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;
            return Ok(Self(fields));
        }

        let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?;
        Ok(Self(fields))
    }
}
