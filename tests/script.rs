//! End-to-end: scripts through parsing, lowering, evaluation and output.

use miette::Diagnostic;
use reform::graphics::{Background, Stroke};
use reform::runtime::MAX_REPEAT;
use reform::{RuntimeErrorKind, render};

fn paths(source: &str) -> Vec<String> {
    let rendered = render(source).unwrap();
    assert!(rendered.errors.is_empty(), "{:?}", rendered.errors);
    rendered.picture.shapes.iter().map(|s| s.area.to_string()).collect()
}

fn code(source: &str) -> String {
    let err = render(source).unwrap_err();
    err.code().map(|c| c.to_string()).unwrap_or_default()
}

#[test]
fn guides_construct_but_do_not_draw() {
    let shapes = paths(
        "drawing main 100 x 100 {
            G = guide rect from (0, 0) to (40, 20)
            L = line from G.top_left to G.bottom_right
        }",
    );
    insta::assert_snapshot!(shapes.join("\n"), @"M 0 0 L 40 20");
}

#[test]
fn morph_corner_then_rotate_about_center() {
    let shapes = paths(
        "drawing main 100 x 100 {
            A = rect from (0, 0) to (2, 2)
            morph A.bottom_right by (2, 0)
            rotate A by 90 deg around A.center
        }",
    );
    insta::assert_snapshot!(shapes.join("\n"), @"M 3 -1 L 3 3 L 1 3 L 1 -1 Z");
}

#[test]
fn repeated_moves_accumulate() {
    let shapes = paths(
        "drawing main 100 x 100 {
            A = rect from (0, 0) to (2, 2)
            repeat 3 { move A by (1, 0) }
        }",
    );
    insta::assert_snapshot!(shapes.join("\n"), @"M 3 0 L 5 0 L 5 2 L 3 2 Z");
}

#[test]
fn forms_created_in_a_repeat_are_drawn_each_iteration() {
    let rendered = render(
        "drawing main 100 x 100 {
            A = guide rect from (0, 0) to (10, 10)
            repeat 4 {
                S = line from A.center to A.right
                move A by (10, 0)
            }
        }",
    )
    .unwrap();
    assert!(rendered.errors.is_empty());
    let lines: Vec<String> = rendered.picture.shapes.iter().map(|s| s.area.to_string()).collect();
    assert_eq!(lines, ["M 5 5 L 10 5", "M 15 5 L 20 5", "M 25 5 L 30 5", "M 35 5 L 40 5"]);
}

#[test]
fn inner_scopes_are_captured_before_outer_ones() {
    let shapes = paths(
        "drawing main 100 x 100 {
            A = line from (0, 0) to (1, 0)
            group { B = line from (0, 1) to (1, 1) }
        }",
    );
    assert_eq!(shapes, ["M 0 1 L 1 1", "M 0 0 L 1 0"]);
}

#[test]
fn fit_scales_the_native_canvas_into_the_frame() {
    let shapes = paths(
        "drawing main 100 x 100 {
            P = picture of tile fit from (0, 0) to (40, 20)
        }
        drawing tile 10 x 10 {
            R = rect from (0, 0) to (10, 10)
        }",
    );
    // frame first, then the content scaled by 2 about the frame center
    assert_eq!(shapes, ["M 0 0 L 40 0 L 40 20 L 0 20 Z", "M 10 0 L 30 0 L 30 20 L 10 20 Z"]);
}

#[test]
fn without_fit_the_drawing_sees_the_frame_as_its_canvas() {
    let shapes = paths(
        "drawing main 100 x 100 {
            P = picture of tile from (0, 0) to (40, 20)
        }
        drawing tile 10 x 10 {
            R = rect from canvas.top_left to canvas.bottom_right
        }",
    );
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0], shapes[1]);
    assert_eq!(shapes[1], "M 0 0 L 40 0 L 40 20 L 0 20 Z");
}

#[test]
fn picture_data_drives_the_embedded_drawing() {
    let rendered = render(
        "drawing main 100 x 100 {
            P = picture of dots from (0, 0) to (50, 50) with { n = 3 }
        }
        drawing dots 50 x 50 {
            repeat n { C = circle from (25, 25) to (30, 25) }
        }",
    )
    .unwrap();
    assert!(rendered.errors.is_empty(), "{:?}", rendered.errors);
    let circles = rendered
        .picture
        .shapes
        .iter()
        .filter(|s| matches!(s.background, Background::Fill(_)))
        .count();
    assert_eq!(circles, 3);
}

#[test]
fn missing_data_is_reported_and_skipped() {
    let rendered = render(
        "drawing main 100 x 100 {
            P = picture of dots from (0, 0) to (50, 50)
        }
        drawing dots 50 x 50 {
            repeat n { C = circle from (25, 25) to (30, 25) }
        }",
    )
    .unwrap();
    assert_eq!(rendered.picture.len(), 1);
    assert_eq!(rendered.errors.len(), 1);
    assert_eq!(rendered.errors[0].kind, RuntimeErrorKind::UnknownDataKey("n".into()));
}

#[test]
fn oversized_repeats_are_reported_and_skipped() {
    let rendered = render(
        "drawing main 100 x 100 {
            P = picture of dots from (0, 0) to (50, 50) with { n = 1e300 }
        }
        drawing dots 50 x 50 {
            repeat n { C = circle from (25, 25) to (30, 25) }
        }",
    )
    .unwrap();
    assert_eq!(rendered.picture.len(), 1, "only the frame is drawn");
    assert_eq!(
        rendered.errors.iter().map(|e| e.kind.clone()).collect::<Vec<_>>(),
        [RuntimeErrorKind::RepeatLimit { requested: 1e300, limit: MAX_REPEAT }]
    );

    let rendered = render(
        "drawing main 100 x 100 {
            repeat 1000000 { A = line from (0, 0) to (1, 1) }
        }",
    )
    .unwrap();
    assert!(rendered.picture.is_empty());
    assert_eq!(
        rendered.errors[0].kind,
        RuntimeErrorKind::RepeatLimit { requested: 1e6, limit: MAX_REPEAT }
    );
}

#[test]
fn shapes_carry_path_data_and_style() {
    let rendered = render("drawing main 20 x 10 { A = line from (0, 0) to (20, 10) }").unwrap();
    assert_eq!(rendered.picture.canvas.width, 20.0);
    assert_eq!(rendered.picture.canvas.height, 10.0);

    let [line] = rendered.picture.shapes.as_slice() else {
        panic!("expected one shape, got {:?}", rendered.picture.shapes);
    };
    assert_eq!(line.area.to_string(), "M 0 0 L 20 10");
    assert_eq!(line.background, Background::None);
    assert!(matches!(line.stroke, Stroke::Solid { width, .. } if width == 1.0));
}

#[test]
fn script_errors_carry_codes() {
    assert_eq!(code("drawing main 10 x 10 { A = rect from (0, 0) }"), "reform::parse::syntax");
    assert_eq!(
        code("drawing main 10 x 10 { morph A.top by (1, 0) }"),
        "reform::parse::unknown_form"
    );
    assert_eq!(
        code("drawing main 10 x 10 { A = line from (0, 0) to (1, 1) morph A.top_left by (1, 0) }"),
        "reform::parse::unknown_point"
    );
    assert_eq!(
        code("drawing main 10 x 10 { A = line from (0,0) to (1,1) A = line from (0,0) to (1,1) }"),
        "reform::parse::duplicate_form"
    );
    assert_eq!(
        code("drawing main 10 x 10 { P = picture of nowhere from (0, 0) to (1, 1) }"),
        "reform::parse::unknown_drawing"
    );
    assert_eq!(code("# nothing here\n"), "reform::parse::empty_document");
}

#[test]
fn names_do_not_leak_out_of_blocks() {
    assert_eq!(
        code(
            "drawing main 10 x 10 {
                group { B = line from (0, 0) to (1, 1) }
                move B by (1, 1)
            }"
        ),
        "reform::parse::unknown_form"
    );
}
