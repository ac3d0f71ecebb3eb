use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components hold their own presentation state and render into a `Frame`
/// within a given `Rect`.
///
/// # Mutability
///
/// The `render` method takes `&mut self` to allow components to:
/// 1. Update internal caches (e.g. the lines fed to a viewport).
/// 2. Manage presentation state (e.g. scroll offsets) during rendering.
///
/// This aligns with Ratatui's `StatefulWidget` pattern.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that handles key events.
///
/// State transitions happen entirely inside `handle_key`; nothing is
/// observable until it returns. Side effects the component cannot perform
/// itself are returned as high-level events for the host to apply.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a key press and optionally return a high-level event.
    fn handle_key(&mut self, key: &KeyEvent) -> Option<Self::Event>;
}
