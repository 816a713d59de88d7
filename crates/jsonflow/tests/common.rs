#![allow(missing_docs, dead_code)]
#![allow(clippy::needless_raw_string_hashes)]

pub const ORIGINAL: &str = r#"
[
    {
        "id": "call_1",
        "name": "search",
        "arguments": {
            "query": "rust json",
            "limit": 5
        }
    },
    {
        "id": "call_2",
        "name": "fetch",
        "arguments": {
            "url": "https://example.com/a?b=c",
            "headers": {
                "accept": "text/html"
            },
            "retries": null
        }
    },
    {
        "id": "call_3",
        "name": "summarize",
        "arguments": {
            "text": "café ☕",
            "ratio": 0.25,
            "bullets": [
                true,
                false
            ],
            "sections": [
                [
                    "intro"
                ],
                []
            ]
        }
    }
]"#;

// A model streaming an array of tool calls. Chunks are cut inside keys,
// string values, literals and numbers, and on container seams.
#[rustfmt::skip]
pub const STREAM: [&str; 13] = [
    r#"[{"id":"ca"#,                                                  // inside a string value
    r#"ll_1","name":"sea"#,                                           // inside a string value
    r#"rch","arguments":{"query":"rust json","lim"#,                  // inside a key
    r#"it":5}},{"id":"call_2""#,                                      // '}}' closes the first element
    r#","name":"fetch","arguments":{"url":"https://exa"#,             // inside a URL
    r#"mple.com/a?b=c","headers":{"accept":"text/html"}"#,            // ends on an object close
    r#","retries":nu"#,                                               // inside a literal
    r#"ll}},{"id":"call_3","name":"summarize","#,                     // second element closes, third opens
    r#""arguments":{"text":"café ☕","ratio":0."#,                    // inside a number, after the point
    r#"25,"bullets":[true,fal"#,                                      // inside a literal
    r#"se],"sections":[["intro"],["#,                                 // inside an empty array
    r#"]]}}"#,                                                        // third element closes
    r#"]"#,                                                           // root array closes
];

#[test]
fn assert_stream_example() {
    let streamed = STREAM.join("");

    let value: serde_json::Value = serde_json::from_str(ORIGINAL).unwrap();
    let original = serde_json::to_string(&value).unwrap();

    assert_eq!(streamed, original);
}
