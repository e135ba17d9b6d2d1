//! Anchor algebra properties over a spread of sizes, angles and drags.

use glam::DVec2;
use reform::form::{
    Anchor, CircleForm, Form, FormBehavior, FormId, PointId, ReadView, RectangleForm, Side,
    WriteView,
};
use reform::Runtime;
use reform::procedure::Library;
use reform::runtime::DefaultRuntime;
use reform::types::{Angle, Length, rotate};

const TOLERANCE: f64 = 1e-9;

const ANGLES: [f64; 6] = [0.0, 30.0, 90.0, 135.0, -60.0, 200.0];
const DELTAS: [(f64, f64); 5] = [(2.0, 0.0), (0.0, 3.0), (-1.5, 2.5), (7.0, -3.0), (-20.0, -20.0)];

fn close(a: DVec2, b: DVec2) -> bool {
    (a - b).length() < TOLERANCE
}

/// Run `check` against a rectangle set directly through its views
fn with_rect(
    center: DVec2,
    width: f64,
    height: f64,
    degrees: f64,
    check: impl FnOnce(&mut DefaultRuntime, &RectangleForm),
) {
    let rect = RectangleForm::new(FormId::next(), "R");
    let mut rt = DefaultRuntime::new(Library::default());
    rt.run(100.0, 100.0, |rt| {
        rt.declare(&Form::from(rect.clone()));
        rect.center().set(rt, center);
        rect.width().set(rt, Length(width));
        rect.height().set(rt, Length(height));
        rect.angle().set(rt, Angle::from_degrees(degrees));
        check(rt, &rect);
    });
}

#[test]
fn center_anchor_is_stored_center() {
    with_rect(DVec2::new(3.0, -7.0), 10.0, 4.0, 30.0, |rt, rect| {
        let center = rect.point(PointId::Center).unwrap();
        assert_eq!(center.position(rt), rect.center().get(rt));
    });
}

#[test]
fn corner_drag_keeps_opposite_corner() {
    for degrees in ANGLES {
        for side in Side::CORNERS {
            for (dx, dy) in DELTAS {
                with_rect(DVec2::new(5.0, 2.0), 10.0, 4.0, degrees, |rt, rect| {
                    let opposite = rect.anchor(side.opposite());
                    let before = opposite.position(rt).unwrap();

                    rect.anchor(side).translate(rt, DVec2::new(dx, dy));

                    let after = opposite.position(rt).unwrap();
                    assert!(
                        close(before, after),
                        "{side:?} at {degrees}deg by ({dx}, {dy}): \
                         opposite moved {before:?} -> {after:?}"
                    );
                });
            }
        }
    }
}

#[test]
fn corner_drag_lands_on_target() {
    for degrees in ANGLES {
        for side in Side::CORNERS {
            with_rect(DVec2::ZERO, 6.0, 2.0, degrees, |rt, rect| {
                let anchor = rect.anchor(side);
                let target = anchor.position(rt).unwrap() + DVec2::new(1.0, 2.0);
                anchor.translate(rt, DVec2::new(1.0, 2.0));
                let now = anchor.position(rt).unwrap();
                assert!(close(now, target), "{side:?} at {degrees}deg: {now:?} != {target:?}");
            });
        }
    }
}

#[test]
fn edge_drag_ignores_motion_along_the_edge() {
    for degrees in ANGLES {
        for side in Side::EDGES {
            with_rect(DVec2::new(1.0, 1.0), 10.0, 4.0, degrees, |rt, rect| {
                let width = rect.width().get(rt).unwrap();
                let height = rect.height().get(rt).unwrap();
                let center = rect.center().get(rt).unwrap();

                // parallel to the edge in the rectangle's own frame
                let local = if side.x() == 0 { DVec2::new(3.0, 0.0) } else { DVec2::new(0.0, 3.0) };
                rect.anchor(side).translate(rt, rotate(local, Angle::from_degrees(degrees)));

                let new_width = rect.width().get(rt).unwrap();
                let new_height = rect.height().get(rt).unwrap();
                assert!((new_width.0 - width.0).abs() < TOLERANCE, "{side:?} width");
                assert!((new_height.0 - height.0).abs() < TOLERANCE, "{side:?} height");
                assert!(close(rect.center().get(rt).unwrap(), center), "{side:?} center");
            });
        }
    }
}

#[test]
fn edge_drag_keeps_opposite_edge_and_other_dimension() {
    for degrees in ANGLES {
        for side in Side::EDGES {
            for (dx, dy) in DELTAS {
                with_rect(DVec2::new(5.0, 2.0), 10.0, 4.0, degrees, |rt, rect| {
                    let opposite = rect.anchor(side.opposite());
                    let before = opposite.position(rt).unwrap();
                    let untouched = if side.x() == 0 { rect.width() } else { rect.height() };
                    let kept = untouched.get(rt).unwrap();

                    rect.anchor(side).translate(rt, DVec2::new(dx, dy));

                    let after = opposite.position(rt).unwrap();
                    assert!(close(before, after), "{side:?} at {degrees}deg");
                    assert_eq!(untouched.get(rt), Some(kept), "{side:?} at {degrees}deg");
                });
            }
        }
    }
}

#[test]
fn edge_drag_on_collapsed_box_is_ignored() {
    with_rect(DVec2::new(5.0, 5.0), 0.0, 0.0, 0.0, |rt, rect| {
        rect.anchor(Side::Top).translate(rt, DVec2::new(0.0, -3.0));
        assert_eq!(rect.height().get(rt), Some(Length(0.0)));
        assert_eq!(rect.center().get(rt), Some(DVec2::new(5.0, 5.0)));
    });
}

#[test]
fn anchors_rotate_with_the_box() {
    let center = DVec2::new(4.0, -2.0);
    for degrees in ANGLES {
        let mut unrotated = Vec::new();
        with_rect(center, 8.0, 3.0, 0.0, |rt, rect| {
            for side in Side::ALL {
                unrotated.push(rect.anchor(side).position(rt).unwrap());
            }
        });
        with_rect(center, 8.0, 3.0, degrees, |rt, rect| {
            for (side, flat) in Side::ALL.into_iter().zip(&unrotated) {
                let expected = center + rotate(*flat - center, Angle::from_degrees(degrees));
                let actual = rect.anchor(side).position(rt).unwrap();
                assert!(
                    close(actual, expected),
                    "{side:?} at {degrees}deg: {actual:?} != {expected:?}"
                );
            }
        });
    }
}

#[test]
fn top_right_scenario() {
    let rect = RectangleForm::new(FormId::next(), "R");
    let mut rt = DefaultRuntime::new(Library::default());
    rt.run(100.0, 100.0, |rt| {
        rt.declare(&Form::from(rect.clone()));
        rect.init(rt, DVec2::new(0.0, 0.0), DVec2::new(10.0, 4.0));

        assert_eq!(rect.center().get(rt), Some(DVec2::new(5.0, 2.0)));
        assert_eq!(rect.width().get(rt), Some(Length(10.0)));
        assert_eq!(rect.height().get(rt), Some(Length(4.0)));
        assert_eq!(rect.angle().get(rt), Some(Angle::ZERO));

        rect.anchor(Side::TopRight).translate(rt, DVec2::new(2.0, 0.0));

        assert_eq!(rect.width().get(rt), Some(Length(12.0)));
        assert_eq!(rect.height().get(rt), Some(Length(4.0)));
        assert_eq!(rect.center().get(rt), Some(DVec2::new(6.0, 2.0)));
        assert_eq!(rect.anchor(Side::BottomLeft).position(rt), Some(DVec2::new(0.0, 4.0)));
    });
}

#[test]
fn undeclared_rectangle_has_no_anchors() {
    let rect = RectangleForm::new(FormId::next(), "R");
    let mut rt = DefaultRuntime::new(Library::default());
    rt.run(100.0, 100.0, |rt| {
        for side in Side::ALL {
            assert_eq!(rect.anchor(side).position(rt), None);
            // dragging an absent anchor is a no-op, not a panic
            rect.anchor(side).translate(rt, DVec2::ONE);
        }
        assert!(rt.get_forms().is_empty());
    });
}

#[test]
fn circle_radius_anchors_keep_center() {
    let circle = CircleForm::new(FormId::next(), "C");
    let mut rt = DefaultRuntime::new(Library::default());
    rt.run(100.0, 100.0, |rt| {
        rt.declare(&Form::from(circle.clone()));
        circle.init(rt, DVec2::new(10.0, 10.0), DVec2::new(14.0, 10.0));

        for side in Side::EDGES {
            let anchor = circle.anchor(side);
            let before = circle.radius().get(rt).unwrap();
            let outward = anchor.position(rt).unwrap() - DVec2::new(10.0, 10.0);
            anchor.translate(rt, outward.normalize());

            let after = circle.radius().get(rt).unwrap();
            assert!((after.0 - before.0 - 1.0).abs() < TOLERANCE, "{side:?}: {before} -> {after}");
            assert_eq!(circle.center().get(rt), Some(DVec2::new(10.0, 10.0)));
        }
    });
}
