//! Outgoing request description and payload conversion.

use http::Method;
use serde::Serialize;
use serde_json::Value;

/// Ordered form parameters, sent in insertion order.
pub type Params = Vec<(String, String)>;

/// A single logical request against the API.
///
/// The `path` is relative to the client's base URL and doubles as the cache
/// key, so it is never rewritten once the request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    path: String,
    params: Option<Params>,
}

impl Request {
    /// Creates a new `Request` with the given method and path and no parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: None,
        }
    }

    /// Attaches form parameters to the request.
    ///
    /// An empty list still counts as supplied data; only a request built without
    /// this call is treated as having no payload.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The relative resource path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The form parameters, if any were supplied.
    pub fn params(&self) -> Option<&[(String, String)]> {
        self.params.as_deref()
    }

    /// Returns `true` if the request must declare `Content-Length: 0`.
    ///
    /// Some servers reject a PUT whose content length is ambiguous, so a PUT
    /// built without parameters announces an empty body explicitly.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitbucket_rest::request::Request;
    /// use http::Method;
    ///
    /// assert!(Request::new(Method::PUT, "repositories/acme/widget").is_zero_length());
    /// assert!(!Request::new(Method::GET, "repositories/acme/widget").is_zero_length());
    /// ```
    pub fn is_zero_length(&self) -> bool {
        self.method == Method::PUT && self.params.is_none()
    }

    /// Returns `true` if parameters belong in the body rather than the query string.
    pub(crate) fn has_form_body(&self) -> bool {
        matches!(self.method, Method::PUT | Method::POST) && self.params.is_some()
    }
}

/// Converts a serializable payload into ordered form parameters.
///
/// The payload must serialize to a JSON object. Pairs come out in the order
/// the payload serializes its fields. Fields that are `null` are dropped,
/// strings are sent as-is, and other scalars use their JSON text. Nested
/// objects and arrays are sent as their JSON text as well.
///
/// # Examples
///
/// ```
/// use bitbucket_rest::request::to_params;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct NewIssue {
///     title: String,
///     priority: Option<String>,
///     votes: u32,
/// }
///
/// let params = to_params(&NewIssue {
///     title: "Crash on start".to_string(),
///     priority: None,
///     votes: 2,
/// })
/// .unwrap();
///
/// assert_eq!(
///     params,
///     vec![
///         ("title".to_string(), "Crash on start".to_string()),
///         ("votes".to_string(), "2".to_string()),
///     ]
/// );
/// ```
pub fn to_params<D>(data: &D) -> crate::Result<Params>
where
    D: Serialize + ?Sized,
{
    let value =
        serde_json::to_value(data).map_err(|e| crate::Error::SerializationFailed(e.to_string()))?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(crate::Error::SerializationFailed(format!(
                "expected a JSON object, got {}",
                other
            )))
        }
    };

    Ok(object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_without_params_is_zero_length() {
        let request = Request::new(Method::PUT, "repositories/acme/widget");
        assert!(request.is_zero_length());
        assert!(!request.has_form_body());
    }

    #[test]
    fn test_put_with_empty_params_is_not_zero_length() {
        let request = Request::new(Method::PUT, "repositories/acme/widget").with_params(vec![]);
        assert!(!request.is_zero_length());
        assert!(request.has_form_body());
    }

    #[test]
    fn test_get_params_are_not_a_body() {
        let request = Request::new(Method::GET, "users/alice")
            .with_params(vec![("start".to_string(), "10".to_string())]);
        assert!(!request.has_form_body());
        assert_eq!(request.params().unwrap().len(), 1);
    }

    #[test]
    fn test_to_params_follows_field_order_and_drops_nulls() {
        #[derive(Serialize)]
        struct Payload {
            zeta: &'static str,
            alpha: bool,
            missing: Option<u8>,
        }

        let params = to_params(&Payload {
            zeta: "z",
            alpha: true,
            missing: None,
        })
        .unwrap();

        assert_eq!(
            params,
            vec![
                ("zeta".to_string(), "z".to_string()),
                ("alpha".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_to_params_rejects_non_objects() {
        let result = to_params(&vec![1, 2, 3]);
        assert!(matches!(result, Err(crate::Error::SerializationFailed(_))));
    }
}
