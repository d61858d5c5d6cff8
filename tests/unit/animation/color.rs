use std::sync::Arc;

use super::*;
use crate::animation::keyframe::{Easing, bind_track};
use crate::foundation::core::FrameRange;

fn color_keys(from: Rgba, to: Rgba) -> Arc<Vec<Keyframe<Rgba>>> {
    let mut keys = vec![
        Keyframe::new(from, Some(to), 0.0, Easing::Linear),
        Keyframe::new(to, None, 100.0, Easing::Linear),
    ];
    bind_track(&mut keys, FrameRange::new(0.0, 100.0).unwrap());
    Arc::new(keys)
}

#[test]
fn straight_mix_is_per_channel_linear() {
    let a = Rgba::new(0.0, 0.2, 1.0, 1.0);
    let b = Rgba::new(1.0, 0.8, 0.0, 0.0);
    assert_eq!(ColorMixing::Straight.mix(a, b, 0.0), a);
    assert_eq!(ColorMixing::Straight.mix(a, b, 1.0), b);
    let mid = ColorMixing::Straight.mix(a, b, 0.5);
    assert_eq!(mid, Rgba::new(0.5, 0.5, 0.5, 0.5));
}

#[test]
fn gamma_mix_brightens_the_midpoint() {
    let black = Rgba::opaque(0.0, 0.0, 0.0);
    let white = Rgba::opaque(1.0, 1.0, 1.0);
    let mid = ColorMixing::Gamma.mix(black, white, 0.5);
    // Linear-light midpoint of black and white re-encodes well above 0.5.
    assert!(mid.r > 0.7, "got {}", mid.r);
    assert!((mid.r - mid.g).abs() < 1e-6);

    let start = ColorMixing::Gamma.mix(black, white, 0.0);
    let end = ColorMixing::Gamma.mix(black, white, 1.0);
    assert!(start.r.abs() < 1e-5);
    assert!((end.r - 1.0).abs() < 1e-5);
}

#[test]
fn gamma_mix_keeps_alpha_straight() {
    let a = Rgba::new(1.0, 0.0, 0.0, 0.0);
    let b = Rgba::new(0.0, 0.0, 1.0, 1.0);
    let mid = ColorMixing::Gamma.mix(a, b, 0.5);
    assert_eq!(mid.a, 0.5);
}

#[test]
fn transfer_functions_round_trip() {
    for u in [0.0f32, 0.02, 0.04045, 0.1, 0.5, 0.7354, 1.0] {
        let back = linear_to_srgb(srgb_to_linear(u));
        assert!((back - u).abs() < 1e-5, "round trip drifted for {u}: {back}");
    }
}

#[test]
fn gradient_mix_is_idempotent_for_equal_endpoints() {
    let g = GradientColor::new(
        vec![0.0, 0.4, 1.0],
        vec![
            Rgba::opaque(1.0, 0.0, 0.0),
            Rgba::opaque(0.0, 1.0, 0.0),
            Rgba::opaque(0.0, 0.0, 1.0),
        ],
    );
    for t in [0.0, 0.25, 0.5, 1.0] {
        assert_eq!(GradientColor::mix(ColorMixing::Straight, &g, &g, t), g);
    }
}

#[test]
fn gradient_offsets_stay_pinned_to_the_first_ramp() {
    let a = GradientColor::new(
        vec![0.0, 0.5, 1.0],
        vec![Rgba::TRANSPARENT, Rgba::TRANSPARENT, Rgba::TRANSPARENT],
    );
    let b = GradientColor::new(
        vec![0.0, 0.9, 1.0],
        vec![
            Rgba::opaque(1.0, 1.0, 1.0),
            Rgba::opaque(1.0, 1.0, 1.0),
            Rgba::opaque(1.0, 1.0, 1.0),
        ],
    );
    let mixed = GradientColor::mix(ColorMixing::Straight, &a, &b, 0.75);
    assert_eq!(mixed.positions, vec![0.0, 0.5, 1.0]);
    assert_eq!(mixed.colors[1].r, 0.75);
}

#[test]
fn gradient_sample_clamps_and_blends() {
    let g = GradientColor::new(
        vec![0.2, 0.8],
        vec![Rgba::opaque(1.0, 0.0, 0.0), Rgba::opaque(0.0, 0.0, 1.0)],
    );
    assert_eq!(g.sample(0.0), Rgba::opaque(1.0, 0.0, 0.0));
    assert_eq!(g.sample(1.0), Rgba::opaque(0.0, 0.0, 1.0));
    let mid = g.sample(0.5);
    assert_eq!(mid.r, 0.5);
    assert_eq!(mid.b, 0.5);
}

#[test]
fn color_animator_mixing_spaces_diverge_between_endpoints() {
    let keys = color_keys(Rgba::opaque(0.0, 0.0, 0.0), Rgba::opaque(1.0, 1.0, 1.0));
    let mut straight = ColorAnimator::new(Arc::clone(&keys), ColorMixing::Straight).unwrap();
    let mut gamma = ColorAnimator::new(keys, ColorMixing::Gamma).unwrap();

    straight.set_progress(0.5);
    gamma.set_progress(0.5);
    let s = straight.value();
    let g = gamma.value();
    assert_eq!(s.r, 0.5);
    assert!(g.r > s.r);

    straight.set_progress(1.0);
    gamma.set_progress(1.0);
    assert_eq!(straight.value(), Rgba::opaque(1.0, 1.0, 1.0));
    assert!((gamma.value().r - 1.0).abs() < 1e-5);
}

#[test]
fn color_animator_callback_bypasses_mixing() {
    let keys = color_keys(Rgba::opaque(0.0, 0.0, 0.0), Rgba::opaque(1.0, 1.0, 1.0));
    let mut anim = ColorAnimator::new(keys, ColorMixing::Gamma).unwrap();
    anim.set_callback(Some(Box::new(|_| Rgba::opaque(0.0, 1.0, 0.0))));
    anim.set_progress(0.5);
    assert_eq!(anim.value(), Rgba::opaque(0.0, 1.0, 0.0));
}
