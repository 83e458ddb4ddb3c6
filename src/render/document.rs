//! Two-page PDF map document.

use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon};
use pdf_writer::{Content, Finish, Name, Pdf, Rect as PdfRect, Ref, Str, TextStr};
use std::sync::Arc;
use tracing::debug;

use super::layout::{expand, union, Frame, Viewport, MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
use super::text::{approx_width, encode_winansi};
use crate::config::RenderConfig;
use crate::error::{MapError, MapResult};
use crate::geodesy::{AzimuthalEquidistant, Projection};
use crate::models::{FillColor, MapRequest, Region};
use crate::selection::Selection;

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");

const BORDER_GRAY: FillColor = FillColor::rgb(0xdd, 0xdd, 0xdd);
const LABEL_GRAY: FillColor = FillColor::rgb(0x66, 0x66, 0x66);
const BLACK: FillColor = FillColor::rgb(0, 0, 0);
const WHITE: FillColor = FillColor::rgb(0xff, 0xff, 0xff);
const CIRCLE_BLUE: FillColor = FillColor::rgb(0, 0, 0xff);
const CENTER_RED: FillColor = FillColor::rgb(0xff, 0, 0);

const TITLE_SIZE: f32 = 13.0;
const HEADING_SIZE: f32 = 9.0;
const LIST_SIZE: f32 = 6.5;
const LIST_LINE: f32 = 9.0;
const INCLUDED_LABEL_SIZE: f32 = 6.5;
const BORDERING_LABEL_SIZE: f32 = 5.5;

/// Renders selections into PDF bytes.
#[derive(Debug, Clone)]
pub struct MapRenderer {
    config: RenderConfig,
}

impl MapRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Build the overview and detail pages for one request.
    ///
    /// `regions` is every loaded region, drawn as outlines on the overview.
    pub fn render(
        &self,
        request: &MapRequest,
        selection: &Selection,
        regions: &[Arc<Region>],
    ) -> MapResult<Vec<u8>> {
        let plane = PlaneGeometry::new(selection, regions);

        let overview = self.overview_page(request, selection, &plane)?;
        let detail = self.detail_page(request, selection, &plane)?;

        let title = format!("Geographic analysis from {}", request.place);
        let bytes = assemble(&title, vec![overview, detail]);
        debug!("Rendered {} byte document", bytes.len());
        Ok(bytes)
    }

    fn overview_page(
        &self,
        request: &MapRequest,
        selection: &Selection,
        plane: &PlaneGeometry,
    ) -> MapResult<Vec<u8>> {
        let mut content = Content::new();

        let title = format!("Geographic analysis from {}", request.place);
        draw_text(&mut content, FONT_BOLD, TITLE_SIZE, BLACK, MARGIN, PAGE_HEIGHT - MARGIN - TITLE_SIZE, &title);
        let subtitle = format!("{} - radius {} km - overview", request.admin1, request.radius_km);
        draw_text(&mut content, FONT_REGULAR, HEADING_SIZE, LABEL_GRAY, MARGIN, PAGE_HEIGHT - MARGIN - TITLE_SIZE - 14.0, &subtitle);

        let map_frame = Frame::new(MARGIN, MARGIN, 520.0, PAGE_HEIGHT - 2.0 * MARGIN - 40.0);
        let bounds = plane
            .overview_bounds()
            .ok_or_else(|| MapError::Render("nothing to draw".to_string()))?;
        let viewport = Viewport::fit(bounds, map_frame);

        for region in &plane.all {
            draw_polygons(&mut content, &viewport, region, None, BLACK, 0.5);
        }
        for region in &plane.included {
            draw_polygons(&mut content, &viewport, &region.shape, Some(request.color), BLACK, 0.5);
        }
        draw_ring(&mut content, &viewport, selection.circle.planar().exterior(), CIRCLE_BLUE, 1.0);
        draw_dot(&mut content, viewport.to_page(plane.center), 1.5, CENTER_RED, None);

        let panel = Frame::new(580.0, MARGIN, PAGE_WIDTH - 580.0 - MARGIN, map_frame.height);
        draw_region_list(&mut content, panel, &selection.included_names());

        Ok(content.finish())
    }

    fn detail_page(
        &self,
        request: &MapRequest,
        selection: &Selection,
        plane: &PlaneGeometry,
    ) -> MapResult<Vec<u8>> {
        let mut content = Content::new();

        let title = format!("{} km around {}", request.radius_km, request.place);
        draw_text(&mut content, FONT_BOLD, TITLE_SIZE, BLACK, MARGIN, PAGE_HEIGHT - MARGIN - TITLE_SIZE, &title);
        let subtitle = format!(
            "{} included, {} bordering",
            selection.included.len(),
            selection.bordering.len()
        );
        draw_text(&mut content, FONT_REGULAR, HEADING_SIZE, LABEL_GRAY, MARGIN, PAGE_HEIGHT - MARGIN - TITLE_SIZE - 14.0, &subtitle);

        let frame = Frame::new(MARGIN, MARGIN, PAGE_WIDTH - 2.0 * MARGIN, PAGE_HEIGHT - 2.0 * MARGIN - 40.0);
        let circle_bounds = selection
            .circle
            .planar()
            .bounding_rect()
            .ok_or_else(|| MapError::Render("empty circle".to_string()))?;
        let bounds = expand(circle_bounds, self.config.detail_margin_km.max(0.0) * 1000.0);
        let viewport = Viewport::fit(bounds, frame);

        content.save_state();
        content
            .rect(frame.x, frame.y, frame.width, frame.height)
            .clip_nonzero()
            .end_path();

        for region in &plane.bordering {
            draw_polygons(&mut content, &viewport, &region.shape, Some(BORDER_GRAY), BLACK, 0.4);
        }
        for region in &plane.included {
            draw_polygons(&mut content, &viewport, &region.shape, Some(request.color), BLACK, 0.6);
        }
        draw_ring(&mut content, &viewport, selection.circle.planar().exterior(), CIRCLE_BLUE, 1.0);
        draw_dot(&mut content, viewport.to_page(plane.center), 2.5, CENTER_RED, Some(WHITE));

        for region in &plane.included {
            draw_label(&mut content, &viewport, frame, region, INCLUDED_LABEL_SIZE, BLACK);
        }
        for region in &plane.bordering {
            draw_label(&mut content, &viewport, frame, region, BORDERING_LABEL_SIZE, LABEL_GRAY);
        }
        content.restore_state();

        Ok(content.finish())
    }
}

/// A classified region projected into the equidistant plane.
struct PlaneRegion {
    name: String,
    shape: MultiPolygon<f64>,
    centroid: Coord<f64>,
}

/// Everything the pages draw, in the circle's azimuthal-equidistant plane.
struct PlaneGeometry {
    center: Coord<f64>,
    all: Vec<MultiPolygon<f64>>,
    included: Vec<PlaneRegion>,
    bordering: Vec<PlaneRegion>,
    circle_bounds: Option<geo::Rect<f64>>,
}

impl PlaneGeometry {
    fn new(selection: &Selection, regions: &[Arc<Region>]) -> Self {
        let aeqd: &AzimuthalEquidistant = selection.circle.projection();
        let project = |classified: &crate::models::ClassifiedRegion| PlaneRegion {
            name: classified.name().to_string(),
            shape: aeqd.project(&classified.region.geometry),
            centroid: aeqd.forward(classified.centroid.0),
        };

        Self {
            center: aeqd.forward(selection.center().0),
            all: regions.iter().map(|r| aeqd.project(&r.geometry)).collect(),
            included: selection.included.iter().map(project).collect(),
            bordering: selection.bordering.iter().map(project).collect(),
            circle_bounds: selection.circle.planar().bounding_rect(),
        }
    }

    fn overview_bounds(&self) -> Option<geo::Rect<f64>> {
        self.all
            .iter()
            .filter_map(|shape| shape.bounding_rect())
            .chain(self.circle_bounds)
            .reduce(union)
    }
}

fn set_fill(content: &mut Content, color: FillColor) {
    let (r, g, b) = color.components();
    content.set_fill_rgb(r, g, b);
}

fn set_stroke(content: &mut Content, color: FillColor) {
    let (r, g, b) = color.components();
    content.set_stroke_rgb(r, g, b);
}

fn trace_ring(content: &mut Content, viewport: &Viewport, ring: &LineString<f64>) {
    let mut coords = ring.coords();
    if let Some(first) = coords.next() {
        let (x, y) = viewport.to_page(*first);
        content.move_to(x, y);
        for coord in coords {
            let (x, y) = viewport.to_page(*coord);
            content.line_to(x, y);
        }
        content.close_path();
    }
}

fn trace_polygon(content: &mut Content, viewport: &Viewport, polygon: &Polygon<f64>) {
    trace_ring(content, viewport, polygon.exterior());
    for hole in polygon.interiors() {
        trace_ring(content, viewport, hole);
    }
}

fn draw_polygons(
    content: &mut Content,
    viewport: &Viewport,
    shape: &MultiPolygon<f64>,
    fill: Option<FillColor>,
    stroke: FillColor,
    line_width: f32,
) {
    if shape.0.is_empty() {
        return;
    }
    content.set_line_width(line_width);
    set_stroke(content, stroke);
    for polygon in &shape.0 {
        trace_polygon(content, viewport, polygon);
    }
    match fill {
        Some(color) => {
            set_fill(content, color);
            content.fill_even_odd_and_stroke();
        }
        None => {
            content.stroke();
        }
    }
}

fn draw_ring(
    content: &mut Content,
    viewport: &Viewport,
    ring: &LineString<f64>,
    color: FillColor,
    line_width: f32,
) {
    content.set_line_width(line_width);
    set_stroke(content, color);
    trace_ring(content, viewport, ring);
    content.stroke();
}

/// Filled marker approximated by a 16-gon.
fn draw_dot(
    content: &mut Content,
    (cx, cy): (f32, f32),
    radius: f32,
    fill: FillColor,
    outline: Option<FillColor>,
) {
    for i in 0..16 {
        let theta = std::f32::consts::TAU * i as f32 / 16.0;
        let (x, y) = (cx + radius * theta.cos(), cy + radius * theta.sin());
        if i == 0 {
            content.move_to(x, y);
        } else {
            content.line_to(x, y);
        }
    }
    content.close_path();
    set_fill(content, fill);
    match outline {
        Some(color) => {
            content.set_line_width(1.0);
            set_stroke(content, color);
            content.fill_nonzero_and_stroke();
        }
        None => {
            content.fill_nonzero();
        }
    }
}

fn draw_text(
    content: &mut Content,
    font: Name,
    size: f32,
    color: FillColor,
    x: f32,
    y: f32,
    text: &str,
) {
    let encoded = encode_winansi(text);
    content.begin_text();
    content.set_font(font, size);
    set_fill(content, color);
    content.next_line(x, y);
    content.show(Str(&encoded));
    content.end_text();
}

fn draw_label(
    content: &mut Content,
    viewport: &Viewport,
    frame: Frame,
    region: &PlaneRegion,
    size: f32,
    color: FillColor,
) {
    let (x, y) = viewport.to_page(region.centroid);
    if !frame.contains(x, y) {
        return;
    }
    let width = approx_width(&region.name, size);
    draw_text(content, FONT_REGULAR, size, color, x - width / 2.0, y - size / 3.0, &region.name);
}

/// Sorted name list; cut off with an ellipsis when the panel is full.
fn draw_region_list(content: &mut Content, panel: Frame, names: &[String]) {
    let heading_y = panel.top() - HEADING_SIZE;
    let heading = "Included regions";
    let heading_x = panel.x + (panel.width - approx_width(heading, HEADING_SIZE)) / 2.0;
    draw_text(content, FONT_BOLD, HEADING_SIZE, BLACK, heading_x, heading_y, heading);

    let mut y = heading_y - 2.0 * LIST_LINE;
    for name in names {
        if y < panel.y + LIST_LINE {
            draw_text(content, FONT_REGULAR, LIST_SIZE + 0.5, BLACK, panel.x + 4.0, y, "…");
            return;
        }
        draw_text(content, FONT_REGULAR, LIST_SIZE, BLACK, panel.x + 4.0, y, &format!("• {}", name));
        y -= LIST_LINE;
    }
    if names.is_empty() {
        draw_text(content, FONT_REGULAR, LIST_SIZE, LABEL_GRAY, panel.x + 4.0, y, "No regions");
    }
}

/// Wrap page content streams into a complete PDF file.
fn assemble(title: &str, pages: Vec<Vec<u8>>) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let regular_id = Ref::new(3);
    let bold_id = Ref::new(4);
    let info_id = Ref::new(5);
    let mut next = 6;

    let mut pdf = Pdf::new();
    let page_ids: Vec<(Ref, Ref)> = pages
        .iter()
        .map(|_| {
            let ids = (Ref::new(next), Ref::new(next + 1));
            next += 2;
            ids
        })
        .collect();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);

    for ((page_id, content_id), stream) in page_ids.iter().zip(pages) {
        let mut page = pdf.page(*page_id);
        page.media_box(PdfRect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(page_tree_id);
        page.contents(*content_id);
        page.resources()
            .fonts()
            .pair(FONT_REGULAR, regular_id)
            .pair(FONT_BOLD, bold_id);
        page.finish();
        pdf.stream(*content_id, &stream);
    }

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr("georadius"));

    pdf.finish()
}
