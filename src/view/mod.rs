mod notch_view;

pub use notch_view::{install_overlay, with_overlay, NotchView};
