use folio_document::{Document, Media, Node, Rule, Ruleset, Style};
use folio_types::ColorValue;

pub const FRAME_CLASSES: [&str; 2] = ["max-w-[850px]", "mx-auto"];

fn color(value: &str) -> ColorValue {
    value.parse().expect("fixture colour parses")
}

fn text(tag: &str, content: &str) -> Node {
    Node::new(tag).with_text(content)
}

/// A section of exactly `height` px built from padding alone.
pub fn block(height: f32) -> Node {
    Node::new("section")
        .with_class("pdf-no-break")
        .with_style(Style {
            padding: Some(height / 2.0),
            ..Default::default()
        })
}

/// Three atomic blocks; the middle one straddles the first page boundary
/// once the export padding is applied.
pub fn straddling_document() -> Document {
    Document::new(Node::new("article").with_children(vec![block(700.0), block(600.0), block(100.0)]))
}

/// The viewer's theme: perceptual colours only a browser can resolve.
pub fn theme_ruleset() -> Ruleset {
    let rule = |selector: &str, style: Style| Rule::new(selector, style).expect("fixture selector parses");
    Ruleset {
        id: "theme".to_string(),
        media: Media::All,
        important: false,
        rules: vec![
            rule(
                ".bg-bg-primary",
                Style {
                    background: Some(color("oklch(0.21 0.02 265)")),
                    color: Some(color("oklch(0.97 0.01 265)")),
                    ..Default::default()
                },
            ),
            rule(
                ".bg-bg-secondary",
                Style {
                    background: Some(color("oklch(0.27 0.02 265)")),
                    box_shadow: Some("0 1px 3px rgba(0,0,0,0.3)".to_string()),
                    ..Default::default()
                },
            ),
            rule(
                ".text-text-secondary",
                Style {
                    color: Some(color("oklch(0.75 0.02 265)")),
                    ..Default::default()
                },
            ),
        ],
    }
}

pub fn print_variant() -> Ruleset {
    Ruleset {
        id: "print".to_string(),
        media: Media::Print,
        important: false,
        rules: vec![
            Rule::new(
                ".bg-bg-primary",
                Style {
                    background: Some(ColorValue::WHITE),
                    color: Some(ColorValue::BLACK),
                    ..Default::default()
                },
            )
            .expect("fixture selector parses"),
        ],
    }
}

fn experience(role: &str, company: &str, lines: &[&str]) -> Node {
    let mut children = vec![
        text("h3", role),
        text("p", company).with_class("text-text-secondary"),
    ];
    children.extend(lines.iter().map(|line| text("li", line)));
    Node::new("div")
        .with_class("pdf-no-break")
        .with_class("bg-bg-secondary")
        .with_style(Style {
            padding: Some(16.0),
            margin_bottom: Some(12.0),
            ..Default::default()
        })
        .with_children(children)
}

/// A themed resume as the viewer shows it on screen.
pub fn resume_document() -> Document {
    let header = Node::new("header")
        .with_style(Style {
            margin_bottom: Some(24.0),
            ..Default::default()
        })
        .with_children(vec![
            text("h1", "Alex Morgan").with_style(Style {
                font_size: Some(32.0),
                font_weight: Some(folio_document::FontWeight::Bold),
                ..Default::default()
            }),
            text("p", "Systems engineer. Rust, storage engines, distributed queues.")
                .with_class("text-text-secondary"),
        ]);

    let jobs: Vec<Node> = (0..6)
        .map(|i| {
            experience(
                &format!("Senior Engineer {}", i + 1),
                "Northwind Logistics",
                &[
                    "Designed a write-ahead log that cut recovery time from minutes to seconds.",
                    "Led the migration of the event pipeline to a partitioned queue with exactly-once delivery.",
                    "Mentored four engineers and ran the on-call rotation for the storage team.",
                ],
            )
        })
        .collect();

    let sidebar = Node::new("aside").with_children(vec![
        text("h2", "Skills"),
        Node::new("div")
            .with_style(Style {
                display: Some(folio_document::Display::Flow),
                gap: Some(6.0),
                ..Default::default()
            })
            .with_children(
                ["Rust", "Tokio", "PostgreSQL", "Kafka", "gRPC"]
                    .iter()
                    .map(|skill| text("span", skill).with_class("bg-bg-secondary"))
                    .collect(),
            ),
    ]);

    let body = Node::new("div")
        .with_class("grid")
        .with_children(vec![Node::new("main").with_children(jobs), sidebar]);

    let mut doc = Document::new(
        Node::new("article")
            .with_class("bg-bg-primary")
            .with_children(vec![header, body]),
    );
    doc.frame_classes = FRAME_CLASSES.iter().map(|c| c.to_string()).collect();
    doc.rulesets.push(theme_ruleset());
    doc.print_variant = Some(print_variant());
    doc
}
