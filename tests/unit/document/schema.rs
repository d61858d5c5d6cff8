use super::*;

#[test]
fn minimal_document_parses_with_defaults() {
    let doc: RawDocument = serde_json::from_str(
        r#"{"v":"5.7.4","ip":0,"op":180,"fr":60,"w":300,"h":300,"futureKey":{"x":1}}"#,
    )
    .unwrap();
    assert_eq!(doc.fr, 60.0);
    assert_eq!((doc.w, doc.h), (300, 300));
    assert!(doc.layers.is_empty());
    assert!(doc.assets.is_empty());
    assert!(doc.markers.is_empty());
}

#[test]
fn missing_frame_range_is_a_parse_error() {
    let err = serde_json::from_str::<RawDocument>(r#"{"fr":30,"w":10,"h":10}"#);
    assert!(err.is_err());
}

#[test]
fn shape_items_discriminate_on_their_type_tag() {
    let shapes: Vec<RawShape> = serde_json::from_str(
        r#"[
            {"ty":"el","p":{"a":0,"k":[0,0]},"s":{"a":0,"k":[10,10]}},
            {"ty":"fl","c":{"a":0,"k":[1,0,0,1]},"o":{"a":0,"k":100}},
            {"ty":"tm","s":{"a":0,"k":0},"e":{"a":0,"k":50},"o":{"a":0,"k":0}},
            {"ty":"zz","whatever":true}
        ]"#,
    )
    .unwrap();
    assert!(matches!(shapes[0], RawShape::Ellipse { .. }));
    assert!(matches!(shapes[1], RawShape::Fill { .. }));
    assert!(matches!(shapes[2], RawShape::Trim { m: 1, .. }));
    assert!(matches!(shapes[3], RawShape::Unknown));
}

#[test]
fn groups_nest_items_and_carry_a_transform() {
    let shape: RawShape = serde_json::from_str(
        r#"{"ty":"gr","nm":"wrap","it":[
            {"ty":"rc","p":{"a":0,"k":[0,0]},"s":{"a":0,"k":[4,4]},"r":{"a":0,"k":0}},
            {"ty":"tr","p":{"a":0,"k":[5,5]},"o":{"a":0,"k":100}}
        ]}"#,
    )
    .unwrap();
    let RawShape::Group { nm, it, .. } = shape else {
        panic!("expected a group");
    };
    assert_eq!(nm.as_deref(), Some("wrap"));
    assert_eq!(it.len(), 2);
    assert!(matches!(it[0], RawShape::Rectangle { .. }));
    assert!(matches!(it[1], RawShape::Transform(_)));
}

#[test]
fn position_splits_into_axis_tracks_when_marked() {
    let split: RawPosition =
        serde_json::from_str(r#"{"s":true,"x":{"a":0,"k":3},"y":{"a":0,"k":4}}"#).unwrap();
    assert!(matches!(split, RawPosition::Split { .. }));

    let unified: RawPosition = serde_json::from_str(r#"{"a":0,"k":[3,4]}"#).unwrap();
    assert!(matches!(unified, RawPosition::Value(_)));
}

#[test]
fn keyframe_entries_keep_easing_and_spatial_handles() {
    let kf: RawKeyframe = serde_json::from_str(
        r#"{"t":12,"s":[0,0],"e":[100,50],
            "i":{"x":[0.5,0.6],"y":[1,1]},"o":{"x":0.2,"y":0},
            "to":[10,0],"ti":[-10,0]}"#,
    )
    .unwrap();
    assert_eq!(kf.t, 12.0);
    assert_eq!(kf.i.as_ref().unwrap().x.dim(1), Some(0.6));
    assert_eq!(kf.i.as_ref().unwrap().x.dim(5), Some(0.5));
    assert_eq!(kf.o.as_ref().unwrap().x.dim(1), Some(0.2));
    assert_eq!(kf.to.as_deref(), Some(&[10.0, 0.0][..]));
}

#[test]
fn layers_carry_matte_and_mask_metadata() {
    let layer: RawLayer = serde_json::from_str(
        r#"{"ty":4,"ind":2,"parent":1,"tt":1,"ip":0,"op":60,"st":0,
            "masksProperties":[{"mode":"a","pt":{"a":0,"k":{"c":true,"v":[],"i":[],"o":[]}},"inv":true}],
            "ks":{"o":{"a":0,"k":100}}}"#,
    )
    .unwrap();
    assert_eq!(layer.ty, 4);
    assert_eq!(layer.parent, Some(1));
    assert_eq!(layer.tt, Some(1));
    assert_eq!(layer.sr, 1.0);
    assert_eq!(layer.masks.len(), 1);
    assert!(layer.masks[0].inv);
}

#[test]
fn gradient_stops_declare_their_count() {
    let RawShape::GradientFill { g, t, .. } = serde_json::from_str(
        r#"{"ty":"gf","t":1,
            "g":{"p":2,"k":{"a":0,"k":[0,1,0,0,1,0,0,1]}},
            "s":{"a":0,"k":[0,0]},"e":{"a":0,"k":[100,0]}}"#,
    )
    .unwrap() else {
        panic!("expected a gradient fill");
    };
    assert_eq!(t, 1);
    assert_eq!(g.p, 2);
}

#[test]
fn markers_and_fonts_parse() {
    let doc: RawDocument = serde_json::from_str(
        r#"{"ip":0,"op":90,"fr":30,"w":100,"h":100,
            "markers":[{"cm":"intro","tm":30,"dr":45}],
            "fonts":{"list":[{"fName":"Inter-Bold","fFamily":"Inter","fStyle":"Bold","ascent":72.5}]}}"#,
    )
    .unwrap();
    assert_eq!(doc.markers[0].cm, "intro");
    assert_eq!(doc.markers[0].dr, 45.0);
    let fonts = doc.fonts.unwrap();
    assert_eq!(fonts.list[0].name, "Inter-Bold");
}
