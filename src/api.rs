// API client module: builds the authenticated PhotoVerify request, sends it
// with a small blocking HTTP client and decodes the JSON answer. Exactly one
// request is made per run, so everything here is synchronous.

use crate::config::Config;
use crate::error::VerifyError;
use crate::image::EncodedImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::{Body, Client, Request};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::{Deserialize, Deserializer, Serialize};

/// Base64 of `id:secret`, the credential half of a Basic auth header.
pub fn basic_auth(app_id: &str, app_secret: &str) -> String {
    STANDARD.encode(format!("{}:{}", app_id, app_secret))
}

/// JSON body of a verification call. `liveimage2` is left out entirely
/// when no second live image was given.
#[derive(Serialize, Debug)]
pub struct VerificationRequest {
    pub idphoto: EncodedImage,
    pub liveimage1: EncodedImage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveimage2: Option<EncodedImage>,
}

/// Response of the PhotoVerify endpoint. Only `Success` is mandatory, the
/// service omits or nulls the rest on some failures.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct VerificationResult {
    pub success: bool,
    #[serde(rename = "JobID", default, deserialize_with = "null_as_default")]
    pub job_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accuracy_level: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub samples: Vec<Sample>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Sample {
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<SampleError>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub eye_centers: EyeCenters,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SampleError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct EyeCenters {
    #[serde(default, deserialize_with = "null_as_default")]
    pub right_eye_x: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub right_eye_y: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub left_eye_x: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub left_eye_y: f64,
}

/// An explicit `null` reads the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Status code and raw body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportOutcome {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Something that can execute a built request. The pipeline only talks to
/// the network through this.
pub trait Transport {
    fn execute(&self, request: Request) -> Result<TransportOutcome, VerifyError>;
}

/// Build the POST request carrying `payload` to `config.endpoint`.
pub fn build_request(config: &Config, payload: &VerificationRequest) -> Result<Request, VerifyError> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| VerifyError::RequestConstruction(format!("invalid endpoint {}: {}", config.endpoint, e)))?;
    let body = serde_json::to_vec(payload).map_err(|e| VerifyError::RequestConstruction(e.to_string()))?;

    let credential = format!("Basic {}", basic_auth(&config.app_id, &config.app_secret));
    let auth = HeaderValue::from_str(&credential)
        .map_err(|e| VerifyError::RequestConstruction(format!("invalid credentials: {}", e)))?;

    let mut request = Request::new(Method::POST, url);
    let headers = request.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json;charset=utf-8"));
    headers.insert(AUTHORIZATION, auth);
    *request.body_mut() = Some(Body::from(body));
    Ok(request)
}

/// Parse a verification response. Anything but 200 is a failure and the
/// body is not looked at.
pub fn decode_response(outcome: &TransportOutcome) -> Result<VerificationResult, VerifyError> {
    if outcome.status != 200 {
        return Err(VerifyError::HttpStatus(outcome.status));
    }
    serde_json::from_slice(&outcome.body).map_err(VerifyError::MalformedResponse)
}

/// Blocking HTTP client talking to the verification service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a client whose every call is bounded by `config.timeout`.
    pub fn new(config: &Config) -> Result<Self, VerifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VerifyError::RequestConstruction(format!("failed to build HTTP client: {}", e)))?;
        Ok(ApiClient { client })
    }
}

impl Transport for ApiClient {
    fn execute(&self, request: Request) -> Result<TransportOutcome, VerifyError> {
        log::info!("POST {}", request.url());
        let res = self.client.execute(request).map_err(VerifyError::Transport)?;
        let status = res.status().as_u16();
        let body = res.bytes().map_err(VerifyError::Transport)?;
        log::debug!("response {}: {}", status, String::from_utf8_lossy(&body));
        Ok(TransportOutcome {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageMime;
    use serde_json::Value;

    fn config() -> Config {
        Config::new("app", "secret", "photo.jpg", "live1.jpg", "").unwrap()
    }

    fn image(byte: u8) -> EncodedImage {
        EncodedImage::from_bytes(&[byte], ImageMime::Png)
    }

    fn ok(body: &str) -> TransportOutcome {
        TransportOutcome {
            status: 200,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn basic_auth_is_base64_of_id_and_secret() {
        assert_eq!(basic_auth("app", "secret"), "YXBwOnNlY3JldA==");
        assert_eq!(basic_auth("app", "secret"), basic_auth("app", "secret"));
        assert_ne!(basic_auth("app", "secret"), basic_auth("app", "secreT"));
    }

    #[test]
    fn second_live_image_is_omitted_when_absent() {
        let payload = VerificationRequest {
            idphoto: image(1),
            liveimage1: image(2),
            liveimage2: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(!obj.contains_key("liveimage2"));
        assert_eq!(obj["idphoto"], Value::from("data:image/png;base64,AQ=="));
    }

    #[test]
    fn second_live_image_is_included_when_present() {
        let payload = VerificationRequest {
            idphoto: image(1),
            liveimage1: image(2),
            liveimage2: Some(image(3)),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["liveimage2"], Value::from("data:image/png;base64,Aw=="));
    }

    #[test]
    fn request_carries_headers_and_json_body() {
        let payload = VerificationRequest {
            idphoto: image(1),
            liveimage1: image(2),
            liveimage2: None,
        };
        let request = build_request(&config(), &payload).unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), crate::config::DEFAULT_ENDPOINT);
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json;charset=utf-8");
        assert_eq!(request.headers()[AUTHORIZATION], "Basic YXBwOnNlY3JldA==");

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["liveimage1"], Value::from("data:image/png;base64,Ag=="));
    }

    #[test]
    fn bad_endpoint_fails_request_construction() {
        let mut cfg = config();
        cfg.endpoint = "not a url".into();
        let payload = VerificationRequest {
            idphoto: image(1),
            liveimage1: image(2),
            liveimage2: None,
        };
        let err = build_request(&cfg, &payload).unwrap_err();
        assert!(matches!(err, VerifyError::RequestConstruction(_)));
    }

    #[test]
    fn decodes_successful_response_without_samples() {
        let result = decode_response(&ok(r#"{"Success":true,"AccuracyLevel":199,"Samples":[]}"#)).unwrap();
        assert!(result.success);
        assert_eq!(result.accuracy_level, 199);
        assert!(result.samples.is_empty());
        assert_eq!(result.job_id, "");
    }

    #[test]
    fn decodes_sample_errors_and_eye_centers() {
        let body = r#"{
            "Success": false,
            "JobID": "a1b2",
            "AccuracyLevel": 50,
            "State": "Failed",
            "Samples": [
                {"Errors": [{"Code": "E1", "Message": "low quality", "Details": "blur"}]},
                {"Errors": [], "EyeCenters": {"RightEyeX": 1.5, "RightEyeY": 2.0, "LeftEyeX": 3.25, "LeftEyeY": 4.0}}
            ]
        }"#;
        let result = decode_response(&ok(body)).unwrap();

        assert!(!result.success);
        assert_eq!(result.job_id, "a1b2");
        assert_eq!(result.state, "Failed");
        assert_eq!(result.samples.len(), 2);
        assert_eq!(
            result.samples[0].errors,
            vec![SampleError {
                code: "E1".into(),
                message: "low quality".into(),
                details: "blur".into(),
            }]
        );
        assert_eq!(result.samples[0].eye_centers, EyeCenters::default());
        assert_eq!(result.samples[1].eye_centers.left_eye_x, 3.25);
    }

    #[test]
    fn null_optional_fields_read_as_defaults() {
        let result = decode_response(&ok(r#"{"Success":true,"AccuracyLevel":199,"Samples":null}"#)).unwrap();
        assert!(result.success);
        assert_eq!(result.accuracy_level, 199);
        assert!(result.samples.is_empty());

        let body = r#"{
            "Success": false,
            "JobID": null,
            "AccuracyLevel": null,
            "State": null,
            "Samples": [
                {"Errors": null, "EyeCenters": null},
                {"Errors": [{"Code": "E2", "Message": null, "Details": null}],
                 "EyeCenters": {"RightEyeX": null, "RightEyeY": 2.5, "LeftEyeX": null, "LeftEyeY": null}}
            ]
        }"#;
        let result = decode_response(&ok(body)).unwrap();
        assert!(!result.success);
        assert_eq!(result.job_id, "");
        assert_eq!(result.accuracy_level, 0);
        assert_eq!(result.state, "");
        assert_eq!(result.samples[0], Sample::default());
        assert_eq!(result.samples[1].errors[0].code, "E2");
        assert_eq!(result.samples[1].errors[0].message, "");
        assert_eq!(result.samples[1].eye_centers.right_eye_y, 2.5);
        assert_eq!(result.samples[1].eye_centers.left_eye_x, 0.0);
    }

    #[test]
    fn null_success_is_still_malformed() {
        let err = decode_response(&ok(r#"{"Success":null,"AccuracyLevel":1}"#)).unwrap_err();
        assert!(matches!(err, VerifyError::MalformedResponse(_)));
    }

    #[test]
    fn non_200_is_a_status_error_even_with_valid_json() {
        let outcome = TransportOutcome {
            status: 500,
            body: br#"{"Success":true,"AccuracyLevel":5}"#.to_vec(),
        };
        assert!(matches!(decode_response(&outcome), Err(VerifyError::HttpStatus(500))));
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        for body in ["<html>oops</html>", "[]", r#"{"Success":"yes"}"#, r#"{"AccuracyLevel":3}"#] {
            let err = decode_response(&ok(body)).unwrap_err();
            assert!(matches!(err, VerifyError::MalformedResponse(_)), "body {}", body);
        }
    }
}
