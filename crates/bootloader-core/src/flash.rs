//! Fixed flash layout policy for the application window.
//!
//! The core only ever issues writes inside the application window; the
//! concrete flash peripheral behind [`crate::BootBus`] enforces nothing.

/// Byte address at which the installed application image begins.
pub const APPLICATION_START: u32 = 0x0800_8000;

/// Maximum accepted application image size in bytes (1 MiB).
pub const MAX_IMAGE_BYTES: u32 = 1024 * 1024;

/// Exclusive end address of the application window.
pub const APPLICATION_END: u32 = APPLICATION_START + MAX_IMAGE_BYTES;

const _: () = assert_application_window();

const fn assert_application_window() {
    assert!(
        APPLICATION_START % 2 == 0,
        "application window must start on an even address"
    );
    assert!(
        APPLICATION_END > APPLICATION_START,
        "application window cannot be empty"
    );
    assert!(
        APPLICATION_END - APPLICATION_START == MAX_IMAGE_BYTES,
        "application window must span exactly the image ceiling"
    );
}

/// Returns `true` when a declared session size fits the application window.
#[must_use]
pub const fn image_size_valid(size: u32) -> bool {
    size > 0 && size <= MAX_IMAGE_BYTES
}

/// Returns `true` when the byte range `addr..addr + len` stays inside the
/// application window.
#[must_use]
pub const fn write_range_valid(addr: u32, len: u32) -> bool {
    if addr < APPLICATION_START {
        return false;
    }
    match addr.checked_add(len) {
        Some(end) => end <= APPLICATION_END,
        None => false,
    }
}
