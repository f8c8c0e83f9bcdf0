//! Synthetic user input.
//!
//! Reactive frameworks on the target site listen for the full pointer
//! sequence and read coordinates off the events, so a bare `click()` is not
//! enough.

use crate::page::Page;
use parley_common::error::DomError;
use parley_common::protocol::{
    ElementHandle, KeyEvent, KeyEventKind, MouseButton, PointerEvent, PointerEventKind,
};

const CLICK_SEQUENCE: [PointerEventKind; 3] = [
    PointerEventKind::MouseDown,
    PointerEventKind::MouseUp,
    PointerEventKind::Click,
];

/// Press, release and click at the element's current visual centre.
pub async fn simulate_click<P: Page + ?Sized>(
    page: &mut P,
    el: ElementHandle,
) -> Result<(), DomError> {
    let info = page.describe(el).await?;
    let (client_x, client_y) = info.rect.center();

    for kind in CLICK_SEQUENCE {
        page.dispatch_pointer(
            el,
            PointerEvent {
                kind,
                client_x,
                client_y,
                button: MouseButton::Left,
            },
        )
        .await?;
    }
    Ok(())
}

/// Enter keydown followed by keyup.
pub async fn press_enter<P: Page + ?Sized>(
    page: &mut P,
    el: ElementHandle,
) -> Result<(), DomError> {
    page.dispatch_key(el, KeyEvent::enter(KeyEventKind::KeyDown))
        .await?;
    page.dispatch_key(el, KeyEvent::enter(KeyEventKind::KeyUp))
        .await
}
