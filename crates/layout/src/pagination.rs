//! Splits the tall canvas into pages without cutting through atomic blocks.
//!
//! Nodes marked as forced breaks are pushed to the top of the next page. A
//! block marked as atomic that would straddle a page boundary gets a spacer
//! inserted before it, pushing it (and everything after it) to the top of the
//! next page. The document is re-laid out after every insertion, so a spacer
//! always sees the positions produced by the previous ones. Blocks taller than
//! one page cannot be helped and are sliced like any other content.

use crate::config::LayoutConfig;
use crate::elements::PositionedElement;
use crate::flow::{self, AtomicBlock, BreakKind, Canvas};
use crate::LayoutError;
use folio_document::StyledNode;
use folio_types::Rect;
use log::debug;
use std::collections::BTreeMap;

const EPSILON: f32 = 0.01;

/// Where an atomic block ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPlacement {
    pub ordinal: usize,
    pub tag: String,
    /// Canvas rect after spacers were applied.
    pub rect: Rect,
    pub first_page: usize,
    pub last_page: usize,
}

impl BlockPlacement {
    pub fn is_split(&self) -> bool {
        self.first_page != self.last_page
    }
}

/// Elements of one page, positioned relative to the page's printable area.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaidOutPage {
    pub index: usize,
    pub elements: Vec<PositionedElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedLayout {
    pub pages: Vec<LaidOutPage>,
    pub page_height: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub blocks: Vec<BlockPlacement>,
    /// Spacer heights keyed by node ordinal.
    pub spacers: BTreeMap<usize, f32>,
}

impl PaginatedLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

pub fn paginate(root: &StyledNode, config: &LayoutConfig) -> Result<PaginatedLayout, LayoutError> {
    config.validate()?;
    let page_height = config.page_height;
    let mut spacers = BTreeMap::new();

    let canvas = loop {
        let canvas = flow::lay_out(root, config, &spacers)?;
        let next = canvas
            .atomic_blocks
            .iter()
            .filter(|block| !spacers.contains_key(&block.ordinal))
            .find_map(|block| required_offset(block, page_height).map(|gap| (block, gap)));

        match next {
            Some((block, gap)) => {
                debug!(
                    "Moving <{}> #{} down {:.1}px to the next page boundary",
                    block.tag, block.ordinal, gap
                );
                spacers.insert(block.ordinal, gap);
            }
            None => break canvas,
        }
    };

    Ok(slice(canvas, config, spacers))
}

/// Distance to push `block` down so it starts on the next page, if it needs
/// to move at all.
fn required_offset(block: &AtomicBlock, page_height: f32) -> Option<f32> {
    let rect = block.rect;
    let first = page_of(rect.y, page_height);
    let to_next_page = (first + 1) as f32 * page_height - rect.y;

    if block.kind == BreakKind::Before {
        let into_page = rect.y - first as f32 * page_height;
        return (into_page > EPSILON && rect.y > EPSILON).then_some(to_next_page);
    }

    if rect.height > page_height + EPSILON {
        debug!(
            "<{}> #{} is taller than a page ({:.1}px > {:.1}px) and will be sliced",
            block.tag, block.ordinal, rect.height, page_height
        );
        return None;
    }
    let last = page_of(rect.bottom() - EPSILON, page_height);
    if first == last {
        return None;
    }
    (to_next_page > EPSILON).then_some(to_next_page)
}

fn page_of(y: f32, page_height: f32) -> usize {
    (y.max(0.0) / page_height).floor() as usize
}

fn slice(canvas: Canvas, config: &LayoutConfig, spacers: BTreeMap<usize, f32>) -> PaginatedLayout {
    let page_height = config.page_height;
    let page_count = ((canvas.height - EPSILON) / page_height).ceil().max(1.0) as usize;
    let mut pages: Vec<LaidOutPage> = (0..page_count)
        .map(|index| LaidOutPage {
            index,
            elements: Vec::new(),
        })
        .collect();
    let last_page = page_count - 1;

    for element in canvas.elements {
        let rect = element.rect;
        if element.element.is_sliceable() {
            let first = page_of(rect.y, page_height).min(last_page);
            let last = page_of(rect.bottom() - EPSILON, page_height).min(last_page);
            for (index, page) in pages.iter_mut().enumerate().take(last + 1).skip(first) {
                let page_top = index as f32 * page_height;
                let top = rect.y.max(page_top);
                let bottom = rect.bottom().min(page_top + page_height);
                if bottom - top <= EPSILON {
                    continue;
                }
                page.elements.push(PositionedElement {
                    rect: Rect::new(rect.x, top - page_top, rect.width, bottom - top),
                    element: element.element.clone(),
                });
            }
        } else {
            // Lines go to the page holding their midpoint.
            let index = page_of(rect.y + rect.height / 2.0, page_height).min(last_page);
            let page_top = index as f32 * page_height;
            pages[index].elements.push(PositionedElement {
                rect: rect.translate_y(-page_top),
                element: element.element,
            });
        }
    }

    let blocks = canvas
        .atomic_blocks
        .into_iter()
        .map(|block| BlockPlacement {
            first_page: page_of(block.rect.y, page_height).min(last_page),
            last_page: page_of(block.rect.bottom() - EPSILON, page_height).min(last_page),
            ordinal: block.ordinal,
            tag: block.tag,
            rect: block.rect,
        })
        .collect();

    PaginatedLayout {
        pages,
        page_height,
        canvas_width: config.canvas_width,
        canvas_height: canvas.height,
        blocks,
        spacers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutElement;
    use folio_document::{BreakInside, Document, Media, Node, Style};

    fn config(page_height: f32) -> LayoutConfig {
        LayoutConfig {
            canvas_width: 400.0,
            page_height,
            ..LayoutConfig::default()
        }
    }

    fn atomic(height: f32) -> Node {
        Node::new("section")
            .with_class("pdf-no-break")
            .with_style(Style {
                padding: Some(height / 2.0),
                background: Some("#eeeeee".parse().unwrap()),
                ..Default::default()
            })
    }

    fn plain(height: f32) -> Node {
        Node::new("div").with_style(Style {
            padding: Some(height / 2.0),
            ..Default::default()
        })
    }

    fn styled(children: Vec<Node>) -> StyledNode {
        Document::new(Node::new("article").with_children(children)).styled_tree(Media::Screen)
    }

    #[test]
    fn straddling_block_moves_to_next_page() {
        let root = styled(vec![plain(60.0), atomic(60.0), plain(10.0)]);
        let layout = paginate(&root, &config(100.0)).unwrap();

        assert_eq!(layout.page_count(), 2);
        let block = &layout.blocks[0];
        assert_eq!(block.rect.y, 100.0);
        assert_eq!((block.first_page, block.last_page), (1, 1));
        assert_eq!(layout.spacers.get(&2), Some(&40.0));
        assert_eq!(layout.canvas_height, 170.0);
    }

    #[test]
    fn block_taller_than_a_page_is_sliced() {
        let root = styled(vec![plain(30.0), atomic(150.0)]);
        let layout = paginate(&root, &config(100.0)).unwrap();

        assert!(layout.spacers.is_empty());
        assert!(layout.blocks[0].is_split());
        let fills: Vec<f32> = layout
            .pages
            .iter()
            .flat_map(|p| &p.elements)
            .filter(|e| matches!(e.element, LayoutElement::Fill(_)))
            .map(|e| e.rect.height)
            .collect();
        assert_eq!(fills, vec![70.0, 80.0]);
    }

    #[test]
    fn block_ending_exactly_on_boundary_stays() {
        let root = styled(vec![plain(40.0), atomic(60.0), atomic(20.0)]);
        let layout = paginate(&root, &config(100.0)).unwrap();
        assert!(layout.spacers.is_empty());
        assert_eq!(layout.blocks[0].last_page, 0);
        assert_eq!(layout.blocks[1].first_page, 1);
    }

    #[test]
    fn break_inside_avoid_is_honored_only_when_enabled() {
        let avoid = plain(60.0).with_style(Style {
            padding: Some(30.0),
            break_inside: Some(BreakInside::Avoid),
            ..Default::default()
        });
        let root = styled(vec![plain(60.0), avoid]);

        let layout = paginate(&root, &config(100.0)).unwrap();
        assert_eq!(layout.spacers.len(), 1);

        let legacy_only = LayoutConfig {
            respect_break_inside: false,
            ..config(100.0)
        };
        let layout = paginate(&root, &legacy_only).unwrap();
        assert!(layout.spacers.is_empty());
    }

    #[test]
    fn nested_blocks_move_with_their_parent() {
        let outer = atomic(0.0).with_children(vec![atomic(30.0), atomic(30.0)]);
        let root = styled(vec![plain(70.0), outer]);
        let layout = paginate(&root, &config(100.0)).unwrap();

        assert_eq!(layout.spacers.len(), 1);
        assert!(layout.blocks.iter().all(|b| b.first_page == 1 && !b.is_split()));
    }

    #[test]
    fn forced_break_starts_a_new_page() {
        let root = styled(vec![plain(20.0), plain(10.0).with_class("html2pdf__page-break")]);
        let config = LayoutConfig {
            break_before_classes: vec!["html2pdf__page-break".to_string()],
            ..config(100.0)
        };
        let layout = paginate(&root, &config).unwrap();
        assert_eq!(layout.spacers.get(&2), Some(&80.0));
        assert_eq!(layout.page_count(), 2);
    }

    #[test]
    fn pagination_is_deterministic() {
        let root = styled(vec![plain(80.0), atomic(50.0), plain(90.0), atomic(70.0)]);
        let a = paginate(&root, &config(100.0)).unwrap();
        let b = paginate(&root, &config(100.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_non_positive_page_height() {
        let root = styled(vec![]);
        assert!(matches!(
            paginate(&root, &config(0.0)),
            Err(LayoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_document_has_one_page() {
        let layout = paginate(&styled(vec![]), &config(100.0)).unwrap();
        assert_eq!(layout.page_count(), 1);
    }
}
