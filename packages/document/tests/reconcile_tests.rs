//! Load-time reconciliation between `editor_json` and legacy content

use folio_document::{
    reconcile, DocumentSource, EditorDocument, FlowNode, NodeType, PersistedPost,
};
use serde_json::{json, Value};

fn legacy_list() -> Value {
    json!({
        "type": "doc",
        "content": [{
            "type": "bulletList",
            "content": [{
                "type": "listItem",
                "content": [{
                    "type": "paragraph",
                    "content": [
                        { "type": "text", "text": "one" },
                        { "type": "hardBreak" },
                        { "type": "text", "text": "two" }
                    ]
                }]
            }]
        }]
    })
}

fn editor_json_with_blocks() -> Value {
    json!({
        "meta": { "canvasWidth": 800, "canvasPadding": 40, "version": 1 },
        "flow": { "type": "doc", "content": [
            { "type": "paragraph", "content": [{ "type": "text", "text": "new" }] }
        ]},
        "floating": [{
            "id": "img-1", "type": "image", "src": "https://cdn.example/a.png",
            "x": 10, "y": 20, "width": 200, "height": 100, "zIndex": 1
        }]
    })
}

#[test]
fn test_prefers_editor_json_with_content() {
    let post = PersistedPost {
        content: Some(legacy_list()),
        editor_json: Some(editor_json_with_blocks()),
    };

    let result = reconcile(&post);
    assert_eq!(result.source, DocumentSource::EditorJson);
    assert_eq!(result.document.flow.plain_text(), "new");
    assert_eq!(result.document.floating.len(), 1);
}

#[test]
fn test_empty_editor_json_falls_back_to_legacy() {
    let post = PersistedPost {
        content: Some(legacy_list()),
        editor_json: Some(json!({
            "meta": { "canvasWidth": 800, "canvasPadding": 40, "version": 1 },
            "flow": { "type": "doc", "content": [] },
            "floating": []
        })),
    };

    let result = reconcile(&post);
    assert_eq!(result.source, DocumentSource::Legacy);
    assert!(result.document.floating.is_empty());
    assert_eq!(result.document.flow.plain_text(), "one\ntwo");
}

#[test]
fn test_empty_editor_json_wins_when_legacy_is_empty() {
    let mut editor_json = editor_json_with_blocks();
    editor_json["flow"] = json!({ "type": "doc", "content": [] });

    let post = PersistedPost {
        content: Some(json!({ "type": "doc", "content": [] })),
        editor_json: Some(editor_json),
    };

    let result = reconcile(&post);
    assert_eq!(result.source, DocumentSource::EditorJson);
    assert_eq!(result.document.floating.len(), 1);
}

#[test]
fn test_legacy_names_are_normalized() {
    let post = PersistedPost {
        content: Some(legacy_list()),
        editor_json: None,
    };

    let doc = reconcile(&post).document;
    let list = &doc.flow.children()[0];
    assert_eq!(list.node_type, NodeType::BulletList);
    assert_eq!(list.children()[0].node_type, NodeType::ListItem);

    let paragraph = &list.children()[0].children()[0];
    assert_eq!(paragraph.children()[1].node_type, NodeType::HardBreak);

    let value = serde_json::to_value(&doc.flow).unwrap();
    assert_eq!(value["content"][0]["type"], "bullet_list");
    assert_eq!(value["content"][0]["content"][0]["type"], "list_item");
}

#[test]
fn test_double_encoded_legacy_content() {
    let encoded = Value::String(legacy_list().to_string());
    let post = PersistedPost {
        content: Some(Value::String(encoded.to_string())),
        editor_json: None,
    };

    let result = reconcile(&post);
    assert_eq!(result.source, DocumentSource::Legacy);
    assert_eq!(result.document.flow.children()[0].node_type, NodeType::BulletList);
}

#[test]
fn test_double_encoded_editor_json() {
    let post = PersistedPost {
        content: None,
        editor_json: Some(Value::String(editor_json_with_blocks().to_string())),
    };

    let result = reconcile(&post);
    assert_eq!(result.source, DocumentSource::EditorJson);
}

#[test]
fn test_malformed_everything_yields_empty_document() {
    let post = PersistedPost {
        content: Some(json!("{ broken")),
        editor_json: Some(json!({ "meta": {} })),
    };

    let result = reconcile(&post);
    assert_eq!(result.source, DocumentSource::Empty);
    assert_eq!(result.document, EditorDocument::new());
}

#[test]
fn test_missing_fields_yield_empty_document() {
    let result = reconcile(&PersistedPost::default());
    assert_eq!(result.source, DocumentSource::Empty);
    assert_eq!(result.document.flow, FlowNode::default());
}

#[test]
fn test_out_of_bounds_items_are_clamped_on_load() {
    let mut editor_json = editor_json_with_blocks();
    editor_json["floating"][0]["x"] = json!(-30);
    editor_json["floating"][0]["width"] = json!(5000);

    let post = PersistedPost {
        content: None,
        editor_json: Some(editor_json),
    };

    let doc = reconcile(&post).document;
    let item = &doc.floating[0];
    assert_eq!(item.x, 0.0);
    assert_eq!(item.width, doc.canvas_inner_width());
}

#[test]
fn test_persisted_post_deserializes_from_api_shape() {
    let post: PersistedPost = serde_json::from_value(json!({
        "content": legacy_list(),
        "editor_json": null
    }))
    .unwrap();

    assert!(post.content.is_some());
    assert_eq!(reconcile(&post).source, DocumentSource::Legacy);
}

#[test]
fn test_unreadable_floating_item_keeps_flow_and_other_items() {
    let post = PersistedPost {
        content: None,
        editor_json: Some(json!({
            "flow": { "type": "doc", "content": [
                { "type": "paragraph", "content": [{ "type": "text", "text": "kept" }] }
            ]},
            "floating": [
                { "id": "no-src", "x": 0, "y": 0, "width": 100, "height": 100 },
                { "id": "bad-x", "src": "https://cdn.example/b.png", "x": "left",
                  "y": 0, "width": 100, "height": 100 },
                { "id": "ok", "type": "image", "src": "https://cdn.example/a.png",
                  "x": 0, "y": 0, "width": 100, "height": 100, "zIndex": 1 }
            ]
        })),
    };

    let result = reconcile(&post);
    assert_eq!(result.source, DocumentSource::EditorJson);
    assert_eq!(result.document.flow.plain_text(), "kept");
    let ids: Vec<&str> = result.document.floating.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["ok"]);
}

#[test]
fn test_non_array_floating_layer_is_dropped() {
    let doc = EditorDocument::from_value(&json!({
        "flow": { "type": "doc", "content": [{ "type": "paragraph" }] },
        "floating": "broken"
    }))
    .unwrap();

    assert!(doc.floating.is_empty());
    assert!(doc.flow.has_children());
}

#[test]
fn test_legacy_root_names_are_not_double_wrapped() {
    for root in ["root", "document"] {
        let post = PersistedPost {
            content: Some(json!({
                "type": root,
                "content": [
                    { "type": "paragraph", "content": [{ "type": "text", "text": "hi" }] }
                ]
            })),
            editor_json: None,
        };

        let flow = reconcile(&post).document.flow;
        assert_eq!(flow.node_type, NodeType::Doc);
        assert_eq!(flow.children().len(), 1);
        assert_eq!(flow.children()[0].node_type, NodeType::Paragraph);
    }
}
