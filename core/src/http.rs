//! Request descriptors: plain data describing one HTTP call before dispatch.
//!
//! # Design
//! A `RequestDescriptor` is built once by the client and then only read: the
//! transport sees the exact header set and form parameters the caller
//! supplied, with nothing merged in from other calls. Bodies are always
//! `application/x-www-form-urlencoded`; there is no JSON body support.

use std::collections::BTreeMap;
use std::fmt;

/// Content type sent with every form body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Literal header name/value pairs.
pub type Headers = BTreeMap<String, String>;

/// Form parameters, encoded into the request body.
pub type Params = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: HttpMethod,
    url: String,
    headers: Headers,
    params: Params,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: impl Into<String>, headers: Headers, params: Params) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            params,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The url-encoded form body, if this request carries one.
    ///
    /// GET never has a body, and neither does any request without params.
    pub fn form_body(&self) -> Option<String> {
        if self.method == HttpMethod::Get || self.params.is_empty() {
            return None;
        }
        // Encoding string pairs cannot fail.
        serde_urlencoded::to_string(&self.params).ok()
    }

    /// Whether the caller already chose a content type.
    pub fn has_content_type(&self) -> bool {
        self.headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case("content-type"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn get_has_no_body_even_with_params() {
        let req = RequestDescriptor::new(
            HttpMethod::Get,
            "http://host/users",
            Headers::new(),
            pairs(&[("x", "1")]),
        );
        assert!(req.form_body().is_none());
    }

    #[test]
    fn empty_params_have_no_body() {
        let req = RequestDescriptor::new(HttpMethod::Post, "http://host/items", Headers::new(), Params::new());
        assert!(req.form_body().is_none());
    }

    #[test]
    fn post_params_are_form_encoded() {
        let req = RequestDescriptor::new(
            HttpMethod::Post,
            "http://host/items",
            Headers::new(),
            pairs(&[("x", "1"), ("name", "a b&c")]),
        );
        assert_eq!(req.form_body().as_deref(), Some("name=a+b%26c&x=1"));
    }

    #[test]
    fn delete_carries_form_body() {
        let req = RequestDescriptor::new(
            HttpMethod::Delete,
            "http://host/items/1",
            Headers::new(),
            pairs(&[("reason", "dup")]),
        );
        assert_eq!(req.form_body().as_deref(), Some("reason=dup"));
    }

    #[test]
    fn content_type_detection_ignores_case() {
        let req = RequestDescriptor::new(
            HttpMethod::Put,
            "http://host/items/1",
            pairs(&[("Content-Type", "text/plain")]),
            Params::new(),
        );
        assert!(req.has_content_type());

        let req = RequestDescriptor::new(
            HttpMethod::Put,
            "http://host/items/1",
            pairs(&[("accept", "application/json")]),
            Params::new(),
        );
        assert!(!req.has_content_type());
    }

    #[test]
    fn accessors_return_supplied_values() {
        let headers = pairs(&[("A", "1")]);
        let params = pairs(&[("x", "1")]);
        let req = RequestDescriptor::new(HttpMethod::Patch, "http://host/p", headers.clone(), params.clone());
        assert_eq!(req.method(), HttpMethod::Patch);
        assert_eq!(req.url(), "http://host/p");
        assert_eq!(req.headers(), &headers);
        assert_eq!(req.params(), &params);
    }
}
