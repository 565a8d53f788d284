//! Property tests for the public renderer acting as a sanitizer

use folio_compiler_html::{render, RenderMode};
use folio_document::{FlowNode, Mark, MarkType, NodeType};
use proptest::prelude::*;
use serde_json::json;

const GENERATED_TAGS: &[&str] = &[
    "<p>", "<p ", "</p>", "<h1>", "</h1>", "<h2>", "</h2>", "<h3>", "</h3>", "<h4>", "</h4>",
    "<h5>", "</h5>", "<h6>", "</h6>", "<ul>", "</ul>", "<ol>", "<ol ", "</ol>", "<li>", "</li>",
    "<blockquote>", "</blockquote>", "<pre>", "</pre>", "<code>", "<code ", "</code>", "<hr>",
    "<br>", "<strong>", "</strong>", "<em>", "</em>", "<u>", "</u>", "<s>", "</s>", "<a ", "</a>",
    "<span ", "</span>", "<img ",
];

fn url() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("javascript:alert(1)".to_string()),
        Just("JaVaScRiPt:alert(1)".to_string()),
        Just("  javascript:alert(1)".to_string()),
        Just("vbscript:msgbox".to_string()),
        Just("data:text/html;base64,PHNjcmlwdD4=".to_string()),
        Just("https://ok.example/\"><script>alert(1)</script>".to_string()),
        Just("https://cdn.example/a.png".to_string()),
        Just("data:image/png;base64,AAAA".to_string()),
        "[a-z<>\"'./]{0,12}",
    ]
}

fn color() -> impl Strategy<Value = String> {
    prop_oneof![
        "#[0-9a-fA-F]{3,6}",
        Just("red".to_string()),
        Just("#fff\" onmouseover=\"x".to_string()),
        "[a-z#();<>\" ]{0,10}",
    ]
}

fn mark() -> impl Strategy<Value = Mark> {
    prop_oneof![
        Just(Mark::new(MarkType::Bold)),
        Just(Mark::new(MarkType::Italic)),
        Just(Mark::new(MarkType::Underline)),
        Just(Mark::new(MarkType::Strike)),
        Just(Mark::new(MarkType::Code)),
        Just(Mark::new(MarkType::Unknown("onclick".to_string()))),
        url().prop_map(Mark::link),
        color().prop_map(Mark::text_color),
        color().prop_map(Mark::background_color),
    ]
}

fn leaf() -> impl Strategy<Value = FlowNode> {
    prop_oneof![
        (
            "[a-zA-Z <>&\"'/=]{0,16}",
            prop::collection::vec(mark(), 0..4)
        )
            .prop_map(|(text, marks)| FlowNode::marked_text(text, marks)),
        Just(FlowNode::new(NodeType::HardBreak)),
        Just(FlowNode::new(NodeType::HorizontalRule)),
        url().prop_map(|src| FlowNode::image(src, Some("<img onerror=x>"))),
        "x-[a-z]{1,8}".prop_map(|name| FlowNode::new(NodeType::Unknown(name))),
    ]
}

fn block_kind() -> impl Strategy<Value = NodeType> {
    prop_oneof![
        Just(NodeType::Paragraph),
        Just(NodeType::Heading),
        Just(NodeType::BulletList),
        Just(NodeType::OrderedList),
        Just(NodeType::ListItem),
        Just(NodeType::Blockquote),
        Just(NodeType::CodeBlock),
        Just(NodeType::Unknown("script".to_string())),
    ]
}

fn flow_tree() -> impl Strategy<Value = FlowNode> {
    leaf()
        .prop_recursive(4, 64, 6, |inner| {
            (
                block_kind(),
                prop::collection::vec(inner, 0..6),
                any::<i8>(),
                "[a-z\"<> ]{0,8}",
            )
                .prop_map(|(kind, children, number, language)| {
                    FlowNode::with_content(kind, children)
                        .with_attr("level", json!(number))
                        .with_attr("start", json!(number))
                        .with_attr("language", json!(language))
                        .with_attr("textAlign", json!(language))
                })
        })
        .prop_map(|node| FlowNode::doc(vec![node]))
}

/// Every `<` opens a generated tag and every tag closes exactly once
fn assert_only_generated_markup(html: &str) {
    for (index, _) in html.match_indices('<') {
        let rest = &html[index..];
        assert!(
            GENERATED_TAGS.iter().any(|tag| rest.starts_with(tag)),
            "unexpected markup at {}: {}",
            index,
            &rest[..rest.len().min(40)]
        );
    }
    assert_eq!(html.matches('<').count(), html.matches('>').count());
}

proptest! {
    #[test]
    fn prop_public_render_is_deterministic(tree in flow_tree()) {
        prop_assert_eq!(render(&tree, RenderMode::Public), render(&tree, RenderMode::Public));
    }

    #[test]
    fn prop_public_render_never_emits_script(tree in flow_tree()) {
        let html = render(&tree, RenderMode::Public);
        let lower = html.to_lowercase();

        prop_assert!(!lower.contains("javascript:"));
        prop_assert!(!lower.contains("vbscript:"));
        prop_assert!(!lower.contains("<script"));
        prop_assert!(!lower.contains("<img"));
        assert_only_generated_markup(&html);
    }

    #[test]
    fn prop_trusted_render_escapes_user_text(tree in flow_tree()) {
        let html = render(&tree, RenderMode::Trusted);

        prop_assert!(!html.to_lowercase().contains("<script"));
        prop_assert!(!html.to_lowercase().contains("javascript:"));
        assert_only_generated_markup(&html);
    }

    #[test]
    fn prop_serialized_tree_renders_identically(tree in flow_tree()) {
        let value = serde_json::to_value(&tree).unwrap();
        let reparsed: FlowNode = serde_json::from_value(value).unwrap();

        prop_assert_eq!(
            render(&tree, RenderMode::Public),
            render(&reparsed, RenderMode::Public)
        );
    }
}
