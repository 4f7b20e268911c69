use proptest::prelude::*;

use super::*;

const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

fn engine() -> GridLayoutEngine {
    GridLayoutEngine::new(GridParams::default())
}

fn windows(sizes: &[(i32, i32)]) -> Vec<LayoutWindow> {
    let params = GridParams::default();
    sizes
        .iter()
        .map(|&(w, h)| LayoutWindow::new(Size::new(w, h), &params))
        .collect()
}

/// Groups the cells into rows by their y coordinate, keeping the input order.
fn rows(rects: &[Rect]) -> Vec<Vec<Rect>> {
    let mut rows: Vec<Vec<Rect>> = Vec::new();
    for rect in rects {
        match rows.last_mut() {
            Some(row) if row[0].y == rect.y => row.push(*rect),
            _ => rows.push(vec![*rect]),
        }
    }
    rows
}

#[track_caller]
fn check_layout(bounds: Rect, rects: &[Rect]) {
    let usable = engine().usable_bounds(bounds);

    for rect in rects {
        assert!(
            bounds.contains_rect(*rect),
            "{rect:?} is outside of {bounds:?}"
        );
        assert!(rect.x >= usable.x && rect.right() <= usable.right());
    }

    for row in rows(rects) {
        let height = row[0].h;
        for pair in row.windows(2) {
            assert_eq!(pair[1].h, height);
            assert!(pair[0].right() <= pair[1].x, "{pair:?} overlap");
        }
        let width: i32 = row.iter().map(|r| r.w).sum();
        assert!(width <= usable.w);
    }

    let top = rects.iter().map(|r| r.y).min().unwrap();
    let bottom = rects.iter().map(|r| r.bottom()).max().unwrap();
    assert!(
        ((top + bottom) - (bounds.y + bounds.bottom())).abs() <= 1,
        "block {top}..{bottom} is not centered in {bounds:?}"
    );
}

#[test]
fn usable_bounds_default_insets() {
    assert_eq!(engine().usable_bounds(SCREEN), Rect::new(49, 146, 1822, 788));
}

#[test]
fn no_windows() {
    assert!(engine().layout(SCREEN, &[]).is_empty());
}

#[test]
fn three_windows() {
    let rects = engine().layout(SCREEN, &windows(&[(800, 600), (800, 600), (400, 300)]));
    assert_eq!(rects.len(), 3);

    let rects: Vec<_> = rects.into_iter().map(Option::unwrap).collect();
    check_layout(SCREEN, &rects);

    // The small window is scaled up to the row height as well.
    assert_eq!(
        rects,
        [
            Rect::new(49, 291, 607, 498),
            Rect::new(656, 291, 607, 498),
            Rect::new(1263, 291, 607, 498),
        ]
    );
}

#[test]
fn single_window_uses_max_row_height() {
    let rects = engine().layout(SCREEN, &windows(&[(800, 600)]));
    // 512 plus the margins, centered vertically.
    assert_eq!(rects, [Some(Rect::new(49, 279, 639, 522))]);
}

#[test]
fn four_windows_make_two_balanced_rows() {
    let rects: Vec<_> = engine()
        .layout(SCREEN, &windows(&[(800, 600); 4]))
        .into_iter()
        .map(Option::unwrap)
        .collect();
    check_layout(SCREEN, &rects);

    let rows = rows(&rects);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[1].len(), 2);
}

#[test]
fn ignored_window_keeps_its_slot() {
    let mut input = windows(&[(800, 600), (800, 600), (800, 600)]);
    input[1].ignored = true;

    let rects = engine().layout(SCREEN, &input);
    assert_eq!(
        rects,
        [
            Some(Rect::new(49, 279, 639, 522)),
            None,
            Some(Rect::new(688, 279, 639, 522)),
        ]
    );
}

#[test]
fn all_ignored() {
    let input = windows(&[(800, 600)]);
    let rects = engine().layout(SCREEN, &[input[0].ignored(true)]);
    assert_eq!(rects, [None]);
}

#[test]
fn letterboxed_window_gets_fixed_aspect() {
    let input = windows(&[(2000, 300), (800, 600)]);
    assert_eq!(input[0].fill_mode, FillMode::Letterboxed);

    let rects = engine().layout(SCREEN, &input);
    let first = rects[0].unwrap();
    assert_eq!(first.w, 2 * first.h);
}

#[test]
fn fill_modes() {
    assert_eq!(FillMode::for_size(Size::new(400, 300), 2.), FillMode::Normal);
    assert_eq!(FillMode::for_size(Size::new(900, 300), 2.), FillMode::Letterboxed);
    assert_eq!(FillMode::for_size(Size::new(100, 300), 2.), FillMode::Pillarboxed);
    // Exactly at the threshold is still normal.
    assert_eq!(FillMode::for_size(Size::new(600, 300), 2.), FillMode::Normal);
}

#[test]
fn item_width_has_margins_and_minimum() {
    let engine = engine();
    let window = windows(&[(800, 600)])[0];
    // (100 - 10 - 40) / 600 of 800, floored, plus both margins.
    assert_eq!(engine.item_width(&window, 100), 66 + 10);

    let normal = |w, h| LayoutWindow {
        size: Size::new(w, h),
        fill_mode: FillMode::Normal,
        ignored: false,
    };
    assert_eq!(engine.item_width(&normal(0, 600), 100), 10);
    assert_eq!(engine.item_scale(&normal(300, 0), 100), 0.);
    // Too short for the header, the content disappears.
    assert_eq!(engine.item_width(&normal(800, 600), 40), 10);
}

#[test]
fn too_many_windows_overflow_instead_of_failing() {
    let bounds = Rect::new(0, 0, 300, 200);
    let rects = engine().layout(bounds, &windows(&[(800, 600); 1000]));

    assert_eq!(rects.len(), 1000);
    assert!(rects.iter().all(Option::is_some));

    // Rows continue past the bottom at the minimum height.
    let last = rects[999].unwrap();
    assert_eq!(last.h, 10);
    assert!(last.bottom() > bounds.bottom());
}

#[test]
fn layout_is_deterministic() {
    let input = windows(&[(1200, 800), (640, 480), (300, 900), (1920, 400), (800, 600)]);
    let a = engine().layout(SCREEN, &input);
    let b = engine().layout(SCREEN, &input);
    assert_eq!(a, b);
}

fn arbitrary_bounds() -> impl Strategy<Value = Rect> {
    (-2000..2000, -2000..2000, 800..2560, 600..1600).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn arbitrary_sizes() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((1..2000, 1..2000), 1..12)
}

proptest! {
    #[test]
    fn layout_covers_every_window(bounds in arbitrary_bounds(), sizes in arbitrary_sizes()) {
        let rects = engine().layout(bounds, &windows(&sizes));
        prop_assert_eq!(rects.len(), sizes.len());
        prop_assert!(rects.iter().all(Option::is_some));

        let rects: Vec<_> = rects.into_iter().flatten().collect();
        check_layout(bounds, &rects);
    }

    #[test]
    fn ignored_windows_get_no_cell(
        bounds in arbitrary_bounds(),
        sizes in arbitrary_sizes(),
        ignored in any::<prop::sample::Index>(),
    ) {
        let mut input = windows(&sizes);
        let ignored = ignored.index(input.len());
        input[ignored].ignored = true;

        let rects = engine().layout(bounds, &input);
        for (idx, rect) in rects.iter().enumerate() {
            prop_assert_eq!(rect.is_none(), idx == ignored);
        }

        let rects: Vec<_> = rects.into_iter().flatten().collect();
        if !rects.is_empty() {
            check_layout(bounds, &rects);
        }
    }
}
