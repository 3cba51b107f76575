use crate::doc::*;
use crate::errors::DocError;
use crate::providers::*;

/// The default blob the host stores when a post has never been edited.
static DEFAULT_BLOB: &str =
    r#"{"lat":53.5629478,"lng":9.9561024,"zoom":13,"markers":[],"address":"","layers":["OpenStreetMap"]}"#;

#[test]
fn decode_empty_yields_defaults() {
    let doc = MarkerDocument::decode("").unwrap();
    assert_eq!(doc, MarkerDocument::default());
    let doc = MarkerDocument::decode("   ").unwrap();
    assert_eq!(doc, MarkerDocument::default());
}

#[test]
fn default_encodes_to_canonical_blob() {
    assert_eq!(MarkerDocument::default().encode(), DEFAULT_BLOB);
}

#[test]
fn decode_rejects_garbage() {
    match MarkerDocument::decode("{not json") {
        Err(DocError::Json(_)) => {},
        other => panic!("expected Json error, got {:?}", other.map(|d| d.encode()))
    }
    match MarkerDocument::decode("[1, 2, 3]") {
        Err(DocError::NotAnObject) => {},
        other => panic!("expected NotAnObject, got {:?}", other.map(|d| d.encode()))
    }
}

#[test]
fn decode_fills_missing_fields() {
    let doc = MarkerDocument::decode(r#"{"zoom":7}"#).unwrap();
    assert_eq!(doc.zoom, 7);
    assert_eq!(doc.lat, 53.5629478);
    assert_eq!(doc.lng, 9.9561024);
    assert_eq!(doc.address, "");
    assert_eq!(doc.layers, vec!["OpenStreetMap".to_string()]);
    assert!(doc.markers.is_empty());
}

#[test]
fn decode_ignores_wrong_typed_fields() {
    let doc = MarkerDocument::decode(r#"{"lat":"north","zoom":"far","markers":{"lat":1}}"#).unwrap();
    assert_eq!(doc, MarkerDocument::default());
}

#[test]
fn decode_skips_bad_marker_entries() {
    let doc = MarkerDocument::decode(r#"{"markers":[{"lat":1,"lng":2},{"lat":"x"}]}"#).unwrap();
    assert_eq!(doc.markers, vec![Marker { lat: 1.0, lng: 2.0, label: None }]);

    let doc = MarkerDocument::decode(
        r#"{"markers":[42,{"lng":3.5},{"lat":1,"lng":2,"label":"home"},{"lat":4,"lng":5,"label":7}]}"#
    ).unwrap();
    assert_eq!(doc.markers, vec![
        Marker { lat: 1.0, lng: 2.0, label: Some("home".into()) },
        Marker { lat: 4.0, lng: 5.0, label: None }
    ]);
}

#[test]
fn round_trip() {
    let raw = r#"{"lat":48.2,"lng":16.37,"zoom":11,"address":"Wien",
                  "layers":["OpenStreetMap","OpenTopoMap"],
                  "markers":[{"lat":48.20,"lng":16.37,"label":"Stephansplatz"},
                             {"lat":48.18,"lng":16.30}],
                  "unknown_key":true}"#;
    let doc = MarkerDocument::decode(raw).unwrap();
    let doc2 = MarkerDocument::decode(&doc.encode()).unwrap();
    assert_eq!(doc, doc2);
}

#[test]
fn encode_key_order_is_canonical() {
    let doc = MarkerDocument {
        markers: vec![Marker { lat: 1.0, lng: 2.0, label: Some("x".into()) }],
        address: "somewhere".into(),
        ..Default::default()
    };
    let enc = doc.encode();
    let order: Vec<usize> = ["\"lat\"", "\"lng\"", "\"zoom\"", "\"markers\"", "\"address\"", "\"layers\""]
        .iter()
        .map(|k| enc.find(k).unwrap())
        .collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn markers_without_label_encode_without_null() {
    let doc = MarkerDocument {
        markers: vec![Marker { lat: 1.0, lng: 2.0, label: None }],
        ..Default::default()
    };
    assert!(!doc.encode().contains("label"));
}

#[test]
fn annotate_attaches_post_identity() {
    let m = Marker { lat: 1.0, lng: 2.0, label: Some("pin".into()) };
    let am = m.annotate(42, "http://example.org/thumb.png", "http://example.org/post/42");
    assert_eq!(am.id, 42);
    assert_eq!(am.img, "http://example.org/thumb.png");
    assert_eq!(am.link, "http://example.org/post/42");
    assert_eq!(am.label.as_deref(), Some("pin"));
}

#[test]
fn parse_bundled_provider_catalog() {
    let catalog = ProviderCatalog::bundled().unwrap();
    let names = catalog.names();
    assert!(names.iter().any(|n| n == "OpenStreetMap"));
    assert!(names.iter().any(|n| n == "OpenStreetMap.HOT"));
    assert!(names.iter().any(|n| n == "Thunderforest.OpenCycleMap"));
    assert!(names.iter().any(|n| n == "CartoDB.Positron"));
}

#[test]
fn osm_layer_codes() {
    let iframe = osm_layers(LayerContext::Iframe);
    assert_eq!(iframe.iter().find(|(k, _)| *k == "mapnik").unwrap().1, "OpenStreetMap");
    let link = osm_layers(LayerContext::Link);
    assert_eq!(link.iter().find(|(k, _)| *k == "H").unwrap().1, "OpenStreetMap.HOT");
}
