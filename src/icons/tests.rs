use crate::icons::{IconsError, placeholder_icon};

#[test]
fn icon_has_frame_and_holes() {
    let icon = placeholder_icon(100).unwrap();
    // Inside the frame border.
    assert_eq!(icon.pixel(12, 50).unwrap().alpha(), 255);
    // Inside the window body.
    assert_eq!(icon.pixel(70, 40).unwrap().alpha(), 0);
    // The title bar buttons are holes.
    assert_eq!(icon.pixel(32, 23).unwrap().alpha(), 0);
    // Outside.
    assert_eq!(icon.pixel(2, 2).unwrap().alpha(), 0);
}

#[test]
fn empty_icon_is_an_error() {
    assert!(matches!(placeholder_icon(0), Err(IconsError::CreatePixmap)));
}
