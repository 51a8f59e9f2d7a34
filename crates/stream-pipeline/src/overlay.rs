//! Overlay text output

/// Receives the label text shown over the video
pub trait OverlaySink {
    fn set_text(&self, text: &str);
}

impl<T: OverlaySink + ?Sized> OverlaySink for &T {
    fn set_text(&self, text: &str) {
        (**self).set_text(text)
    }
}
