//! reqwest-backed `Transport`.
//!
//! POST bodies go out as multipart forms, one part per field, so text fields
//! and file uploads travel the same way. GET calls carry their fields in the
//! query string and cannot upload files; such a request is rejected before
//! any I/O happens.

use async_trait::async_trait;
use reqwest::multipart::{Form as MultipartForm, Part};

use crate::error::TransportError;
use crate::http::{Form, FormValue, HttpMethod, HttpRequest, HttpResponse};
use crate::retry::Transport;

/// Sends requests with a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client, e.g. one with custom timeouts or a proxy.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn prepare(&self, request: &HttpRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let url = request.url();
        match request.method {
            HttpMethod::Get => {
                let mut query = Vec::new();
                for (name, value) in request.body.iter().flatten() {
                    let text = value.as_text().ok_or_else(|| {
                        TransportError::Issue(format!("field `{name}` uploads a file and needs POST"))
                    })?;
                    query.push((name.as_str(), text));
                }
                Ok(self.client.get(url).query(&query))
            }
            HttpMethod::Post => {
                let builder = self.client.post(url);
                match &request.body {
                    Some(form) => Ok(builder.multipart(to_multipart(form)?)),
                    None => Ok(builder),
                }
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let builder = self.prepare(request)?;
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

fn to_multipart(form: &Form) -> Result<MultipartForm, TransportError> {
    let mut multipart = MultipartForm::new();
    for (name, value) in form {
        let part = match value {
            FormValue::File(file) => {
                let part = Part::stream_with_length(file.bytes.clone(), file.bytes.len() as u64)
                    .file_name(file.file_name.clone());
                match &file.mime_type {
                    Some(mime) => part.mime_str(mime).map_err(|e| {
                        TransportError::Issue(format!("invalid mime type `{mime}` for `{name}`: {e}"))
                    })?,
                    None => part,
                }
            }
            // as_text is Some for every non-file value
            other => Part::text(other.as_text().unwrap_or_default()),
        };
        multipart = multipart.part(name.clone(), part);
    }
    Ok(multipart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::InputFile;

    fn request(method: HttpMethod, body: Option<Form>) -> HttpRequest {
        HttpRequest {
            method,
            base_url: "http://127.0.0.1:9/bottest".to_string(),
            path: "sendPhoto".to_string(),
            body,
        }
    }

    #[test]
    fn get_with_file_is_rejected_before_sending() {
        let mut form = Form::new();
        form.insert("photo".to_string(), FormValue::File(InputFile::from_bytes("a.jpg", vec![1])));
        let err = HttpTransport::new()
            .prepare(&request(HttpMethod::Get, Some(form)))
            .unwrap_err();
        assert!(matches!(err, TransportError::Issue(msg) if msg.contains("photo")));
    }

    #[test]
    fn get_puts_fields_in_query() {
        let mut form = Form::new();
        form.insert("offset".to_string(), FormValue::Integer(10));
        let built = HttpTransport::new()
            .prepare(&request(HttpMethod::Get, Some(form)))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(built.method(), reqwest::Method::GET);
        assert_eq!(built.url().query(), Some("offset=10"));
    }

    #[test]
    fn post_without_body_has_no_content() {
        let built = HttpTransport::new()
            .prepare(&request(HttpMethod::Post, None))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(built.method(), reqwest::Method::POST);
        assert!(built.body().is_none());
    }

    #[test]
    fn post_with_fields_is_multipart() {
        let mut form = Form::new();
        form.insert("chat_id".to_string(), FormValue::Integer(1));
        form.insert(
            "photo".to_string(),
            FormValue::File(InputFile::from_bytes("a.jpg", vec![1, 2]).mime_type("image/jpeg")),
        );
        let built = HttpTransport::new()
            .prepare(&request(HttpMethod::Post, Some(form)))
            .unwrap()
            .build()
            .unwrap();
        let content_type = built.headers()[reqwest::header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[test]
    fn bad_mime_type_is_an_issue() {
        let mut form = Form::new();
        form.insert(
            "document".to_string(),
            FormValue::File(InputFile::from_bytes("a.txt", vec![1]).mime_type("not a mime")),
        );
        let err = to_multipart(&form).unwrap_err();
        assert!(matches!(err, TransportError::Issue(_)));
    }
}
