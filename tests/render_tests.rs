//! End-to-end rendering contracts across the three backends.

mod common;

use common::{test_pipeline, HELLO_DECK, SHAPES_DECK};
use easel::{OutputFormat, PipelineError, RenderError, RenderOptions};

#[test]
fn test_svg_contains_root_tags_and_text() {
    let pipeline = test_pipeline();
    let bytes = pipeline
        .render(HELLO_DECK, OutputFormat::Svg, &RenderOptions::default())
        .unwrap();
    let svg = String::from_utf8(bytes).unwrap();

    assert!(svg.contains("<svg"));
    assert!(svg.contains("</svg>"));
    assert!(svg.contains("Hello World"));
}

#[test]
fn test_svg_hello_world_anchor_position() {
    // 792x612 canvas, xp=50 yp=50: the anchor must land on device
    // (396, 306) with a middle text-anchor.
    let pipeline = test_pipeline();
    let bytes = pipeline
        .render(HELLO_DECK, OutputFormat::Svg, &RenderOptions::default())
        .unwrap();
    let svg = String::from_utf8(bytes).unwrap();

    assert!(svg.contains(r#"x="396""#), "svg was: {svg}");
    assert!(svg.contains(r#"y="306""#));
    assert!(svg.contains(r#"text-anchor="middle""#));
}

#[test]
fn test_rect_default_color_and_geometry() {
    // Rect at 75/75, 20x15 percent on 792x612: centered at (594, 153),
    // 158.4 x 91.8, default gray fill.
    let deck = r#"<deck><canvas width="792" height="612"/><slide>
        <rect xp="75" yp="75" wp="20" hp="15"/>
    </slide></deck>"#;
    let pipeline = test_pipeline();
    let bytes = pipeline
        .render(deck, OutputFormat::Svg, &RenderOptions::default())
        .unwrap();
    let svg = String::from_utf8(bytes).unwrap();

    let w: f64 = 20.0 / 100.0 * 792.0;
    let h: f64 = 15.0 / 100.0 * 612.0;
    let x: f64 = 75.0 / 100.0 * 792.0 - w / 2.0;
    let y: f64 = 612.0 * (100.0 - 75.0) / 100.0 - h / 2.0;
    assert!((x + w / 2.0 - 594.0).abs() < 1e-9);
    assert!((y + h / 2.0 - 153.0).abs() < 1e-9);

    let expected = format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="rgb(128,128,128)" />"#,
        x, y, w, h
    );
    assert!(svg.contains(&expected), "missing `{expected}` in: {svg}");
}

#[test]
fn test_all_backends_render_all_shape_kinds() {
    let pipeline = test_pipeline();
    for format in [OutputFormat::Svg, OutputFormat::Png, OutputFormat::Pdf] {
        let bytes = pipeline
            .render(SHAPES_DECK, format, &RenderOptions::default())
            .unwrap_or_else(|e| panic!("{format} backend failed: {e}"));
        assert!(!bytes.is_empty(), "{format} produced no bytes");
    }
}

#[test]
fn test_unsupported_format_is_rejected() {
    let pipeline = test_pipeline();
    let err = pipeline
        .render_named(HELLO_DECK, "webp", &RenderOptions::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedFormat(name) if name == "webp"));
}

#[test]
fn test_slide_index_out_of_range() {
    let pipeline = test_pipeline();
    let options = RenderOptions { slide: 5, ..RenderOptions::default() };
    let err = pipeline
        .render(HELLO_DECK, OutputFormat::Svg, &options)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Render(RenderError::SlideIndex { index: 5, count: 1 })
    ));
}

#[test]
fn test_xml_format_passes_compiled_bytes_through() {
    let pipeline = test_pipeline();
    let bytes = pipeline
        .render(HELLO_DECK, OutputFormat::Xml, &RenderOptions::default())
        .unwrap();
    assert_eq!(bytes, HELLO_DECK.as_bytes());
}

#[test]
fn test_list_items_render_in_order() {
    let deck = r#"<deck><slide>
        <list xp="10" yp="80" sp="2" type="number">
            <li>first</li><li>second</li><li>third</li>
        </list>
    </slide></deck>"#;
    let pipeline = test_pipeline();
    let bytes = pipeline
        .render(deck, OutputFormat::Svg, &RenderOptions::default())
        .unwrap();
    let svg = String::from_utf8(bytes).unwrap();

    let first = svg.find("1. first").expect("first item missing");
    let second = svg.find("2. second").expect("second item missing");
    let third = svg.find("3. third").expect("third item missing");
    assert!(first < second && second < third);
}

#[test]
fn test_list_marker_styles_keep_item_count() {
    let pipeline = test_pipeline();
    for kind in ["none", "bullet", "number"] {
        let deck = format!(
            r#"<deck><slide><list xp="10" yp="80" sp="2" type="{kind}">
                <li>one</li><li>two</li><li>three</li>
            </list></slide></deck>"#
        );
        let bytes = pipeline
            .render(&deck, OutputFormat::Svg, &RenderOptions::default())
            .unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert_eq!(svg.matches("<text ").count(), 3, "kind {kind}");
    }
}

#[test]
fn test_text_only_layer_subset() {
    // Reordered/omitted layers must not error; only text is painted.
    let options = RenderOptions {
        layers: "text".to_string(),
        ..RenderOptions::default()
    };
    let pipeline = test_pipeline();
    let bytes = pipeline
        .render(SHAPES_DECK, OutputFormat::Svg, &options)
        .unwrap();
    let svg = String::from_utf8(bytes).unwrap();
    assert!(svg.contains("All shapes"));
    assert!(!svg.contains("<ellipse"));
    assert!(!svg.contains("<polygon"));
}

#[test]
fn test_unknown_layer_names_are_skipped() {
    let options = RenderOptions {
        layers: "sparkles:text:doodads".to_string(),
        ..RenderOptions::default()
    };
    let pipeline = test_pipeline();
    let bytes = pipeline
        .render(HELLO_DECK, OutputFormat::Svg, &options)
        .unwrap();
    assert!(String::from_utf8(bytes).unwrap().contains("Hello World"));
}

#[test]
fn test_grid_overlay_draws_lines() {
    let options = RenderOptions { grid_pct: 10.0, ..RenderOptions::default() };
    let pipeline = test_pipeline();
    let bytes = pipeline
        .render(HELLO_DECK, OutputFormat::Svg, &options)
        .unwrap();
    let svg = String::from_utf8(bytes).unwrap();
    // Nine vertical plus nine horizontal lines at each 10% step.
    assert_eq!(svg.matches("<line ").count(), 18);
}

#[test]
fn test_title_metadata_in_svg() {
    let options = RenderOptions {
        title: Some("Quarterly".to_string()),
        ..RenderOptions::default()
    };
    let pipeline = test_pipeline();
    let bytes = pipeline
        .render(HELLO_DECK, OutputFormat::Svg, &options)
        .unwrap();
    assert!(String::from_utf8(bytes).unwrap().contains("<title>Quarterly</title>"));
}

#[test]
fn test_render_is_deterministic_per_backend() {
    let pipeline = test_pipeline();
    for format in [OutputFormat::Svg, OutputFormat::Png, OutputFormat::Pdf] {
        let a = pipeline
            .render(SHAPES_DECK, format, &RenderOptions::default())
            .unwrap();
        let b = pipeline
            .render(SHAPES_DECK, format, &RenderOptions::default())
            .unwrap();
        assert_eq!(a, b, "{format} output not byte-identical across runs");
    }
}
