//! Lays a styled tree out on a single tall canvas.
//!
//! Boxes are sized and positioned by taffy. Block containers are flex
//! columns, so sibling margins add up instead of collapsing. Grids map onto
//! CSS grid and inline flows onto wrapping flex rows. A node's own text is an
//! anonymous leaf ahead of its children, measured by [`text::wrap`].
//! Pagination spacers become top margins.

use crate::config::LayoutConfig;
use crate::elements::{LayoutElement, PositionedElement, TextElement};
use crate::fonts::{self, FontFace};
use crate::{LayoutError, text};
use folio_document::{BreakInside, ComputedStyle, Display, StyledNode, Track};
use folio_types::{Color, ColorValue, Rect};
use std::collections::BTreeMap;
use taffy::geometry::{Point, Size};
use taffy::prelude::{NodeId, TaffyTree, fr, length};
use taffy::style::{
    AlignItems, AvailableSpace, Dimension, FlexDirection, FlexWrap, LengthPercentage, LengthPercentageAuto,
    Style as BoxStyle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BreakKind {
    /// Must not be split across pages.
    Avoid,
    /// Must start at the top of a page.
    Before,
}

/// Extent of a node that pagination has to place with care.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AtomicBlock {
    /// Pre-order index of the node in the styled tree.
    pub ordinal: usize,
    pub tag: String,
    pub rect: Rect,
    pub kind: BreakKind,
}

#[derive(Debug, Default)]
pub(crate) struct Canvas {
    pub elements: Vec<PositionedElement>,
    pub atomic_blocks: Vec<AtomicBlock>,
    pub height: f32,
}

/// Lays out `root` with a vertical spacer inserted before every node whose
/// ordinal appears in `spacers`.
pub(crate) fn lay_out(
    root: &StyledNode,
    config: &LayoutConfig,
    spacers: &BTreeMap<usize, f32>,
) -> Result<Canvas, LayoutError> {
    fonts::ensure_loaded()?;
    let mut taffy = TaffyTree::<TextRun>::new();
    taffy.disable_rounding();

    let mut builder = TreeBuilder {
        config,
        spacers,
        taffy: &mut taffy,
        next_ordinal: 0,
    };
    let root_box = builder.build(root)?;

    let page = BoxStyle {
        flex_direction: FlexDirection::Column,
        align_items: Some(AlignItems::Stretch),
        size: Size {
            width: Dimension::length(config.canvas_width),
            height: Dimension::auto(),
        },
        ..BoxStyle::default()
    };
    let top_level: Vec<NodeId> = root_box.iter().map(|b| b.id).collect();
    let page = taffy.new_with_children(page, &top_level).map_err(engine)?;

    taffy
        .compute_layout_with_measure(
            page,
            Size {
                width: AvailableSpace::Definite(config.canvas_width),
                height: AvailableSpace::MaxContent,
            },
            |known, available, _node, run, _style| measure_text(known, available, run.as_deref()),
        )
        .map_err(engine)?;

    let mut canvas = Canvas {
        height: taffy.layout(page).map_err(engine)?.size.height,
        ..Canvas::default()
    };
    if let Some(root_box) = &root_box {
        paint(&taffy, root_box, Point { x: 0.0, y: 0.0 }, &mut canvas)?;
    }
    canvas.atomic_blocks.sort_by_key(|b| b.ordinal);
    Ok(canvas)
}

/// A node's own text, carried as the context of its anonymous leaf.
#[derive(Debug, Clone)]
struct TextRun {
    content: String,
    font_size: f32,
    bold: bool,
    line_height: f32,
    color: Option<Color>,
}

impl TextRun {
    fn lines(&self, max_width: f32) -> Vec<String> {
        text::wrap(&self.content, self.font_size, self.bold, max_width)
    }

    fn width_of(&self, line: &str) -> f32 {
        text::measure(line, self.font_size, self.bold)
    }

    /// Distance from the top of a line box to the baseline.
    fn baseline(&self) -> f32 {
        let (ascent, descent) = FontFace::for_weight(self.bold).vertical_metrics();
        let half_leading = (self.line_height - (ascent + descent) * self.font_size) / 2.0;
        half_leading + ascent * self.font_size
    }
}

fn measure_text(known: Size<Option<f32>>, available: Size<AvailableSpace>, run: Option<&TextRun>) -> Size<f32> {
    let Some(run) = run else {
        return Size::ZERO;
    };
    let limit = known.width.unwrap_or(match available.width {
        AvailableSpace::Definite(width) => width,
        AvailableSpace::MinContent => text::min_content_width(&run.content, run.font_size, run.bold),
        AvailableSpace::MaxContent => f32::INFINITY,
    });
    let lines = run.lines(limit);
    Size {
        width: known
            .width
            .unwrap_or_else(|| lines.iter().map(|l| run.width_of(l)).fold(0.0, f32::max)),
        height: known.height.unwrap_or(lines.len() as f32 * run.line_height),
    }
}

/// A visible node and the taffy boxes standing for it.
struct LaidOutBox<'a> {
    ordinal: usize,
    node: &'a StyledNode,
    id: NodeId,
    text: Option<NodeId>,
    /// Grid or flow container between the node and its children.
    content: Option<NodeId>,
    children: Vec<LaidOutBox<'a>>,
    fill: Option<Color>,
    border: Option<Color>,
    kind: Option<BreakKind>,
}

struct TreeBuilder<'a, 't> {
    config: &'a LayoutConfig,
    spacers: &'a BTreeMap<usize, f32>,
    taffy: &'t mut TaffyTree<TextRun>,
    next_ordinal: usize,
}

impl<'a> TreeBuilder<'a, '_> {
    fn build(&mut self, node: &'a StyledNode) -> Result<Option<LaidOutBox<'a>>, LayoutError> {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        let style = &node.style;

        if style.display == Display::None {
            self.next_ordinal += descendant_count(node);
            return Ok(None);
        }

        let fill = fill_color(node)?;
        let mut boxes = Vec::new();

        let text = match &node.text {
            Some(content) => {
                let color = exact(&style.color, "text", node)?.filter(|_| !style.color.is_transparent());
                let run = TextRun {
                    content: text::printable(content),
                    font_size: style.font_size,
                    bold: style.font_weight.is_bold(),
                    line_height: style.font_size * style.line_height,
                    color,
                };
                let leaf = self
                    .taffy
                    .new_leaf_with_context(BoxStyle::default(), run)
                    .map_err(engine)?;
                boxes.push(leaf);
                Some(leaf)
            }
            None => None,
        };

        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            if let Some(laid_out) = self.build(child)? {
                children.push(laid_out);
            }
        }
        let child_ids: Vec<NodeId> = children.iter().map(|c| c.id).collect();

        let content = match style.display {
            Display::Grid | Display::Flow => {
                let container = self
                    .taffy
                    .new_with_children(content_style(style), &child_ids)
                    .map_err(engine)?;
                boxes.push(container);
                Some(container)
            }
            Display::Block | Display::None => {
                boxes.extend(child_ids);
                None
            }
        };

        let border = border_color(node)?;
        let spacer = self.spacers.get(&ordinal).copied().unwrap_or(0.0);
        let id = self
            .taffy
            .new_with_children(box_style(style, spacer), &boxes)
            .map_err(engine)?;

        Ok(Some(LaidOutBox {
            ordinal,
            node,
            id,
            text,
            content,
            children,
            fill,
            border,
            kind: break_kind(self.config, node),
        }))
    }
}

/// The node's own box: a flex column holding its text and children.
fn box_style(style: &ComputedStyle, spacer: f32) -> BoxStyle {
    let padding = LengthPercentage::length(style.padding);
    BoxStyle {
        flex_direction: FlexDirection::Column,
        align_items: Some(AlignItems::Stretch),
        flex_shrink: 0.0,
        size: Size {
            width: style.width.map_or(Dimension::auto(), Dimension::length),
            height: Dimension::auto(),
        },
        max_size: Size {
            width: style.max_width.map_or(Dimension::percent(1.0), Dimension::length),
            height: Dimension::auto(),
        },
        padding: taffy::geometry::Rect {
            left: padding,
            right: padding,
            top: padding,
            bottom: padding,
        },
        margin: taffy::geometry::Rect {
            left: LengthPercentageAuto::length(0.0),
            right: LengthPercentageAuto::length(0.0),
            top: LengthPercentageAuto::length(spacer),
            bottom: LengthPercentageAuto::length(style.margin_bottom),
        },
        ..BoxStyle::default()
    }
}

fn content_style(style: &ComputedStyle) -> BoxStyle {
    let gap = Size {
        width: LengthPercentage::length(style.gap),
        height: LengthPercentage::length(style.gap),
    };
    match style.display {
        Display::Grid => {
            let tracks = style.grid_columns.tracks();
            BoxStyle {
                display: taffy::style::Display::Grid,
                grid_template_columns: if tracks.is_empty() {
                    vec![fr(1.0)]
                } else {
                    tracks
                        .iter()
                        .map(|track| match *track {
                            Track::Px(px) => length(px),
                            Track::Fr(share) => fr(share),
                        })
                        .collect()
                },
                align_items: Some(AlignItems::Start),
                gap,
                ..BoxStyle::default()
            }
        }
        _ => BoxStyle {
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Wrap,
            align_items: Some(AlignItems::FlexStart),
            gap,
            ..BoxStyle::default()
        },
    }
}

/// Emits paint elements in document order: fill, text, children, border.
fn paint(
    taffy: &TaffyTree<TextRun>,
    laid_out: &LaidOutBox<'_>,
    origin: Point<f32>,
    canvas: &mut Canvas,
) -> Result<(), LayoutError> {
    let layout = taffy.layout(laid_out.id).map_err(engine)?;
    let x = origin.x + layout.location.x;
    let y = origin.y + layout.location.y;
    let rect = Rect::new(x, y, layout.size.width, layout.size.height);

    if let Some(color) = laid_out.fill {
        canvas.elements.push(PositionedElement {
            rect,
            element: LayoutElement::Fill(color),
        });
    }

    if let Some(leaf) = laid_out.text {
        let leaf_layout = taffy.layout(leaf).map_err(engine)?;
        if let Some((run, color)) = taffy.get_node_context(leaf).and_then(|run| Some((run, run.color?))) {
            let (line_x, line_y) = (x + leaf_layout.location.x, y + leaf_layout.location.y);
            let baseline = run.baseline();
            for (i, line) in run.lines(leaf_layout.size.width).into_iter().enumerate() {
                canvas.elements.push(PositionedElement {
                    rect: Rect::new(
                        line_x,
                        line_y + i as f32 * run.line_height,
                        run.width_of(&line),
                        run.line_height,
                    ),
                    element: LayoutElement::Text(TextElement {
                        content: line,
                        font_size: run.font_size,
                        bold: run.bold,
                        baseline,
                        color,
                    }),
                });
            }
        }
    }

    let child_origin = match laid_out.content {
        Some(container) => {
            let location = taffy.layout(container).map_err(engine)?.location;
            Point {
                x: x + location.x,
                y: y + location.y,
            }
        }
        None => Point { x, y },
    };
    for child in &laid_out.children {
        paint(taffy, child, child_origin, canvas)?;
    }

    if let Some(color) = laid_out.border {
        let stroke = laid_out.node.style.border_bottom_width;
        canvas.elements.push(PositionedElement {
            rect: Rect::new(rect.x, rect.bottom() - stroke, rect.width, stroke),
            element: LayoutElement::Rule(color),
        });
    }

    if let Some(kind) = laid_out.kind {
        canvas.atomic_blocks.push(AtomicBlock {
            ordinal: laid_out.ordinal,
            tag: laid_out.node.tag.clone(),
            rect,
            kind,
        });
    }
    Ok(())
}

fn fill_color(node: &StyledNode) -> Result<Option<Color>, LayoutError> {
    let background = &node.style.background;
    if background.is_transparent() {
        return Ok(None);
    }
    let Some(color) = exact(background, "background", node)? else {
        return Ok(None);
    };
    if !color.is_opaque() {
        return Err(LayoutError::TranslucentBackground {
            value: background.to_string(),
            tag: node.tag.clone(),
        });
    }
    Ok(Some(color))
}

fn border_color(node: &StyledNode) -> Result<Option<Color>, LayoutError> {
    let style = &node.style;
    if style.border_bottom_width <= 0.0 || style.border_color.is_transparent() {
        return Ok(None);
    }
    exact(&style.border_color, "border", node)
}

fn break_kind(config: &LayoutConfig, node: &StyledNode) -> Option<BreakKind> {
    if config.break_before_classes.iter().any(|c| node.has_class(c)) {
        Some(BreakKind::Before)
    } else if (config.respect_break_inside && node.style.break_inside == BreakInside::Avoid)
        || config.avoid_classes.iter().any(|c| node.has_class(c))
    {
        Some(BreakKind::Avoid)
    } else {
        None
    }
}

fn exact(value: &ColorValue, property: &'static str, node: &StyledNode) -> Result<Option<Color>, LayoutError> {
    match value {
        ColorValue::Srgb(color) => Ok(Some(*color)),
        ColorValue::Transparent => Ok(None),
        ColorValue::Oklch { .. } => Err(LayoutError::UnsupportedColor {
            property,
            value: value.to_string(),
            tag: node.tag.clone(),
        }),
    }
}

fn engine(err: impl std::fmt::Debug) -> LayoutError {
    LayoutError::Engine(format!("{:?}", err))
}

fn descendant_count(node: &StyledNode) -> usize {
    node.children.iter().map(|c| 1 + descendant_count(c)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_document::{Document, GridTemplate, Media, Node, Style};

    fn styled(root: Node) -> StyledNode {
        Document::new(root).styled_tree(Media::Screen)
    }

    fn block(height: f32) -> Node {
        Node::new("section").with_style(Style {
            width: Some(100.0),
            padding: Some(height / 2.0),
            ..Default::default()
        })
    }

    fn filled(node: Node) -> Node {
        let mut node = node;
        node.style.background = Some("#eeeeee".parse().unwrap());
        node
    }

    fn fills(canvas: &Canvas) -> Vec<Rect> {
        canvas
            .elements
            .iter()
            .filter(|e| matches!(e.element, LayoutElement::Fill(_)))
            .map(|e| e.rect)
            .collect()
    }

    #[test]
    fn stacks_children_with_margins() {
        let mut first = block(50.0);
        first.style.margin_bottom = Some(10.0);
        let root = styled(Node::new("div").with_children(vec![first, block(30.0)]));
        let canvas = lay_out(&root, &LayoutConfig::default(), &BTreeMap::new()).unwrap();
        assert_eq!(canvas.height, 90.0);
    }

    #[test]
    fn grid_splits_fractional_and_fixed_tracks() {
        let grid = Node::new("div")
            .with_style(Style {
                display: Some(Display::Grid),
                grid_columns: Some(GridTemplate::parse("1fr 240px").unwrap()),
                gap: Some(28.0),
                ..Default::default()
            })
            .with_children(vec![filled(Node::new("main")), filled(Node::new("aside"))]);
        let config = LayoutConfig {
            canvas_width: 714.0,
            ..LayoutConfig::default()
        };
        let canvas = lay_out(&styled(grid), &config, &BTreeMap::new()).unwrap();
        let cells = fills(&canvas);
        assert_eq!((cells[0].x, cells[0].width), (0.0, 446.0));
        assert_eq!((cells[1].x, cells[1].width), (474.0, 240.0));
    }

    #[test]
    fn grid_rows_take_the_tallest_cell() {
        let grid = Node::new("div")
            .with_style(Style {
                display: Some(Display::Grid),
                grid_columns: Some(GridTemplate::parse("1fr 1fr").unwrap()),
                ..Default::default()
            })
            .with_children(vec![block(40.0), block(80.0), block(10.0)]);
        let canvas = lay_out(&styled(grid), &LayoutConfig::default(), &BTreeMap::new()).unwrap();
        assert_eq!(canvas.height, 90.0);
    }

    #[test]
    fn grid_cells_keep_their_own_height() {
        let grid = Node::new("div")
            .with_style(Style {
                display: Some(Display::Grid),
                grid_columns: Some(GridTemplate::parse("1fr 1fr").unwrap()),
                ..Default::default()
            })
            .with_children(vec![filled(block(40.0)), filled(block(80.0))]);
        let canvas = lay_out(&styled(grid), &LayoutConfig::default(), &BTreeMap::new()).unwrap();
        let heights: Vec<f32> = fills(&canvas).iter().map(|r| r.height).collect();
        assert_eq!(heights, vec![40.0, 80.0]);
    }

    #[test]
    fn chips_wrap_onto_new_lines() {
        let chip = || {
            filled(Node::new("span").with_text("Kafka").with_style(Style {
                padding: Some(4.0),
                ..Default::default()
            }))
        };
        let flow = Node::new("div")
            .with_style(Style {
                display: Some(Display::Flow),
                gap: Some(8.0),
                width: Some(200.0),
                ..Default::default()
            })
            .with_children((0..10).map(|_| chip()).collect());
        let canvas = lay_out(&styled(flow), &LayoutConfig::default(), &BTreeMap::new()).unwrap();

        let chips = fills(&canvas);
        assert_eq!(chips.len(), 10);
        let chip_width = text::measure("Kafka", 16.0, false) + 8.0;
        assert!((chips[0].width - chip_width).abs() < 0.01);
        assert_eq!((chips[0].x, chips[0].y), (0.0, 0.0));
        assert!(chips.iter().all(|c| c.right() <= 200.01));
        let rows: std::collections::BTreeSet<i64> = chips.iter().map(|c| c.y.round() as i64).collect();
        assert!(rows.len() >= 3, "rows at {:?}", rows);
    }

    #[test]
    fn paragraph_height_follows_line_count() {
        let content = "Designed a write-ahead log that cut crash recovery from minutes to seconds";
        let paragraph = Node::new("p").with_text(content).with_style(Style {
            width: Some(180.0),
            ..Default::default()
        });
        let canvas = lay_out(&styled(paragraph), &LayoutConfig::default(), &BTreeMap::new()).unwrap();

        let expected = text::wrap(content, 16.0, false, 180.0).len();
        assert!(expected > 1);
        let lines: Vec<&PositionedElement> = canvas
            .elements
            .iter()
            .filter(|e| matches!(e.element, LayoutElement::Text(_)))
            .collect();
        assert_eq!(lines.len(), expected);
        assert_eq!(canvas.height, expected as f32 * 24.0);
        assert!(lines.iter().all(|l| l.rect.width <= 180.01));
    }

    #[test]
    fn text_sits_above_the_children_of_its_node() {
        let node = Node::new("section")
            .with_text("Experience")
            .with_children(vec![filled(block(20.0))]);
        let canvas = lay_out(&styled(node), &LayoutConfig::default(), &BTreeMap::new()).unwrap();
        assert_eq!(fills(&canvas)[0].y, 24.0);
        assert_eq!(canvas.height, 44.0);
    }

    #[test]
    fn spacer_pushes_the_node_and_what_follows() {
        let root = styled(Node::new("div").with_children(vec![block(50.0), block(50.0)]));
        let spacers = BTreeMap::from([(2, 25.0)]);
        let canvas = lay_out(&root, &LayoutConfig::default(), &spacers).unwrap();
        assert_eq!(canvas.height, 125.0);
    }

    #[test]
    fn oklch_background_is_rejected() {
        let root = styled(Node::new("div").with_style(Style {
            background: Some("oklch(0.98 0.01 250)".parse().unwrap()),
            ..Default::default()
        }));
        let err = lay_out(&root, &LayoutConfig::default(), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, LayoutError::UnsupportedColor { property: "background", .. }));
    }

    #[test]
    fn translucent_background_is_rejected() {
        let root = styled(Node::new("div").with_style(Style {
            background: Some("rgba(0, 0, 0, 0.3)".parse().unwrap()),
            ..Default::default()
        }));
        let err = lay_out(&root, &LayoutConfig::default(), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, LayoutError::TranslucentBackground { .. }));
    }

    #[test]
    fn hidden_nodes_take_no_space() {
        let mut hidden = block(500.0);
        hidden.style.display = Some(Display::None);
        let root = styled(Node::new("div").with_children(vec![hidden, block(20.0)]));
        let canvas = lay_out(&root, &LayoutConfig::default(), &BTreeMap::new()).unwrap();
        assert_eq!(canvas.height, 20.0);
    }
}
