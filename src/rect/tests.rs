use crate::rect::{Rect, RegionBuilder};

#[test]
fn sized_rects() {
    let r = Rect::new_sized_saturating(1, 2, 3, 4);
    assert_eq!((r.x1(), r.y1(), r.width(), r.height()), (1, 2, 3, 4));
    assert!(r.contains(1, 2));
    assert!(!r.contains(4, 2));
    assert!(Rect::new_sized_saturating(0, 0, -1, 1).is_empty());
    let r = Rect::new_sized_saturating(i32::MAX - 1, 0, 10, -3);
    assert_eq!(r.width(), 1);
    assert!(r.is_empty());
}

#[test]
fn region_ops_apply_in_order() {
    let mut builder = RegionBuilder::default();
    builder.add(Rect::new_sized_saturating(0, 0, 10, 10));
    builder.sub(Rect::new_sized_saturating(0, 0, 5, 5));
    builder.add(Rect::new_sized_saturating(2, 2, 1, 1));
    let region = builder.get();
    assert!(region.contains(7, 7));
    assert!(!region.contains(1, 1));
    assert!(region.contains(2, 2));
    assert!(!region.contains(10, 10));
    assert!(!region.is_empty());
    assert!(RegionBuilder::default().get().is_empty());
}
