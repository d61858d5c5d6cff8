use super::*;

fn composition() -> Composition {
    Composition {
        name: Some("demo".into()),
        version: Some("5.7.4".into()),
        canvas: Canvas::new(300, 300),
        range: FrameRange::new(0.0, 180.0).unwrap(),
        frame_rate: 60.0,
        layers: Vec::new(),
        assets: HashMap::new(),
        markers: vec![
            Marker {
                name: "Intro".into(),
                start_frame: 30.0,
                duration_frames: 45.0,
            },
            Marker {
                name: "Outro".into(),
                start_frame: 120.0,
                duration_frames: 10.0,
            },
        ],
        fonts: HashMap::new(),
        characters: HashMap::new(),
        warnings: Vec::new(),
    }
}

#[test]
fn duration_comes_from_range_and_frame_rate() {
    let comp = composition();
    assert_eq!(comp.duration_ms(), 3000.0);
}

#[test]
fn zero_frame_rate_reports_zero_duration() {
    let mut comp = composition();
    comp.frame_rate = 0.0;
    assert_eq!(comp.duration_ms(), 0.0);
}

#[test]
fn progress_maps_to_frames_and_back() {
    let comp = composition();
    assert_eq!(comp.frame_for_progress(0.5), 90.0);
    assert_eq!(comp.progress_for_frame(90.0), 0.5);
    assert_eq!(comp.frame_for_progress(0.0), 0.0);
    assert_eq!(comp.frame_for_progress(1.0), 180.0);
}

#[test]
fn marker_lookup_is_exact_and_case_sensitive() {
    let comp = composition();
    let marker = comp.marker("Intro").unwrap();
    assert_eq!(marker.start_frame, 30.0);
    assert_eq!(marker.end_frame(), 75.0);
    assert!(comp.marker("intro").is_none());
    assert!(comp.marker("INTRO").is_none());
    assert!(comp.marker("missing").is_none());
}

#[test]
fn marker_spans_derive_their_end_frame() {
    let comp = composition();
    let marker = comp.marker("Outro").unwrap();
    assert_eq!(marker.start_frame, 120.0);
    assert_eq!(marker.end_frame(), 130.0);
}

#[test]
fn blend_mode_indices_cover_the_documented_range() {
    assert_eq!(BlendMode::from_index(0), Some(BlendMode::Normal));
    assert_eq!(BlendMode::from_index(1), Some(BlendMode::Multiply));
    assert_eq!(BlendMode::from_index(16), Some(BlendMode::Add));
    assert_eq!(BlendMode::from_index(99), None);
}

#[test]
fn matte_type_indices_map_alpha_and_luma() {
    assert_eq!(MatteType::from_index(1), Some(MatteType::Alpha));
    assert_eq!(MatteType::from_index(2), Some(MatteType::AlphaInverted));
    assert_eq!(MatteType::from_index(3), Some(MatteType::Luma));
    assert_eq!(MatteType::from_index(4), Some(MatteType::LumaInverted));
    assert_eq!(MatteType::from_index(0), None);
}

#[test]
fn stroke_style_indices_default_sensibly() {
    assert_eq!(LineCap::from_index(1), LineCap::Butt);
    assert_eq!(LineCap::from_index(2), LineCap::Round);
    assert_eq!(LineCap::from_index(3), LineCap::Square);
    assert_eq!(LineCap::from_index(7), LineCap::Butt);
    assert_eq!(LineJoin::from_index(1), LineJoin::Miter);
    assert_eq!(LineJoin::from_index(2), LineJoin::Round);
    assert_eq!(LineJoin::from_index(3), LineJoin::Bevel);
}

#[test]
fn merge_mode_indices_map_booleans() {
    assert_eq!(MergeMode::from_index(1), Some(MergeMode::Merge));
    assert_eq!(MergeMode::from_index(3), Some(MergeMode::Subtract));
    assert_eq!(MergeMode::from_index(5), Some(MergeMode::ExcludeIntersections));
    assert_eq!(MergeMode::from_index(6), None);
}

#[test]
fn text_documents_step_instead_of_blending() {
    use crate::animation::value::Interpolate;

    let a = TextDocument {
        text: "hello".into(),
        font: "Inter".into(),
        size: 24.0,
        fill: Rgba::opaque(1.0, 1.0, 1.0),
        stroke: None,
        stroke_width: 0.0,
        line_height: 28.0,
        tracking: 0.0,
        justify: Justify::Left,
    };
    let b = TextDocument {
        text: "world".into(),
        ..a.clone()
    };
    let mid = TextDocument::interpolate(&a, &b, 0.5);
    assert_eq!(mid, a);
}
