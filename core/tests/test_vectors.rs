//! Verify `RequestDescriptor::build` against JSON test vectors in `test-vectors/`.
//!
//! Each case gives a descriptor, an optional origin override and the exact
//! wire request expected, header order included.

use signal_http::{HttpConfig, HttpRequest, RequestDescriptor};

fn opt_str(value: &serde_json::Value) -> Option<&str> {
    value.as_str()
}

fn expected_request(value: &serde_json::Value) -> HttpRequest {
    let headers = value["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let pair = h.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect();
    HttpRequest {
        method: value["method"].as_str().unwrap().to_string(),
        url: value["url"].as_str().unwrap().to_string(),
        headers,
        body: opt_str(&value["body"]).map(str::to_string),
    }
}

#[test]
fn build_test_vectors() {
    let raw = include_str!("../../test-vectors/build.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];

        let mut config = HttpConfig::default();
        if let Some(origin) = opt_str(&case["origin"]) {
            config.origin = origin.to_string();
        }

        let mut desc = RequestDescriptor::new(
            input["method"].as_str().unwrap(),
            input["url"].as_str().unwrap(),
            opt_str(&input["body"]),
        )
        .unwrap();
        if let Some(content_type) = opt_str(&input["content_type"]) {
            desc.set_content_type(content_type);
        }

        let built = desc.build(&config);
        let expected = expected_request(&case["expected_request"]);
        assert_eq!(built.method, expected.method, "{name}: method");
        assert_eq!(built.url, expected.url, "{name}: url");
        assert_eq!(built.headers, expected.headers, "{name}: headers");
        assert_eq!(built.body, expected.body, "{name}: body");
    }
}

#[test]
fn build_is_deterministic() {
    let desc = RequestDescriptor::new("POST", "https://appr.tc/join/1", Some("{}")).unwrap();
    let config = HttpConfig::default();
    assert_eq!(desc.build(&config), desc.build(&config));
}
