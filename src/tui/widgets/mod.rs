//! Editing and scrolling primitives the screens are composed from.
//!
//! - `TextInput`: single-line field with placeholder and char limit
//! - `Textarea`: multi-line soft-wrapping editor
//! - `Viewport`: scrollable window over pre-styled lines

pub mod text_input;
pub mod textarea;
pub mod viewport;

pub use text_input::TextInput;
pub use textarea::Textarea;
pub use viewport::Viewport;
