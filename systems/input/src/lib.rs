#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pointer input channel with one typed subscriber list per event kind.
//!
//! Handlers capture whatever context they need when they are registered and
//! translate a [`PointerEvent`] into an optional action of type `A`. Actions
//! are queued during dispatch and drained by the game loop on its next update,
//! which keeps input handling on the simulation's own schedule.

use std::fmt;

use canvas_td_core::{Vector2D, VectorError};
use thiserror::Error;

/// Pointer events the channel understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputEventKind {
    /// Press followed by release on the same spot.
    Click,
    /// Pointer pressed. Touch starts map here.
    MouseDown,
    /// Pointer released. Touch ends map here.
    MouseUp,
}

impl InputEventKind {
    /// Resolves a host event name, accepting touch aliases.
    pub fn from_name(name: &str) -> Result<Self, InputError> {
        match name {
            "click" => Ok(Self::Click),
            "mousedown" | "touchstart" => Ok(Self::MouseDown),
            "mouseup" | "touchend" => Ok(Self::MouseUp),
            _ => Err(InputError::UnknownEvent {
                name: name.to_owned(),
            }),
        }
    }

    /// Canonical host event name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
        }
    }
}

/// Errors raised while wiring input.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InputError {
    /// No channel exists for the event name.
    #[error("event not set: {name}")]
    UnknownEvent {
        /// Name that was requested.
        name: String,
    },
    /// The device scale ratio must be finite and positive.
    #[error("scale ratio must be finite and positive (received {ratio})")]
    InvalidScaleRatio {
        /// Ratio that was supplied.
        ratio: f64,
    },
}

/// Event delivered to handlers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    kind: InputEventKind,
    position: Vector2D,
}

impl PointerEvent {
    /// Kind of event.
    #[must_use]
    pub const fn kind(&self) -> InputEventKind {
        self.kind
    }

    /// Pointer position in simulation coordinates.
    #[must_use]
    pub const fn position(&self) -> Vector2D {
        self.position
    }
}

type Handler<A> = Box<dyn FnMut(&PointerEvent) -> Option<A>>;

/// Input channel producing actions of type `A`.
pub struct Input<A> {
    click: Vec<Handler<A>>,
    mouse_down: Vec<Handler<A>>,
    mouse_up: Vec<Handler<A>>,
    mouse_position: Vector2D,
    scale_ratio: f64,
    actions: Vec<A>,
}

impl<A> Input<A> {
    /// Creates a channel that scales raw pointer coordinates by `scale_ratio`.
    pub fn new(scale_ratio: f64) -> Result<Self, InputError> {
        validate_scale_ratio(scale_ratio)?;
        Ok(Self {
            click: Vec::new(),
            mouse_down: Vec::new(),
            mouse_up: Vec::new(),
            mouse_position: Vector2D::ZERO,
            scale_ratio,
            actions: Vec::new(),
        })
    }

    /// Registers `handler` for the named host event.
    pub fn add_event<F>(&mut self, name: &str, handler: F) -> Result<(), InputError>
    where
        F: FnMut(&PointerEvent) -> Option<A> + 'static,
    {
        let kind = InputEventKind::from_name(name)?;
        self.subscribe(kind, handler);
        Ok(())
    }

    /// Registers `handler` for `kind`.
    pub fn subscribe<F>(&mut self, kind: InputEventKind, handler: F)
    where
        F: FnMut(&PointerEvent) -> Option<A> + 'static,
    {
        tracing::debug!(event = kind.name(), "input handler registered");
        self.channel_mut(kind).push(Box::new(handler));
    }

    /// Number of handlers registered for `kind`.
    #[must_use]
    pub fn handler_count(&self, kind: InputEventKind) -> usize {
        match kind {
            InputEventKind::Click => self.click.len(),
            InputEventKind::MouseDown => self.mouse_down.len(),
            InputEventKind::MouseUp => self.mouse_up.len(),
        }
    }

    /// Latest pointer position in simulation coordinates.
    #[must_use]
    pub const fn mouse_position(&self) -> Vector2D {
        self.mouse_position
    }

    /// Ratio between simulation and raw host coordinates.
    #[must_use]
    pub const fn scale_ratio(&self) -> f64 {
        self.scale_ratio
    }

    /// Replaces the scale ratio, typically after the host window was resized.
    pub fn set_scale_ratio(&mut self, scale_ratio: f64) -> Result<(), InputError> {
        validate_scale_ratio(scale_ratio)?;
        self.scale_ratio = scale_ratio;
        Ok(())
    }

    /// Records a pointer move given in raw host coordinates.
    ///
    /// `offset` is the top-left corner of the drawing surface in the same
    /// coordinates. Moves that would produce a non-finite position are ignored.
    pub fn pointer_moved(&mut self, raw: Vector2D, offset: Vector2D) {
        match self.scaled(raw, offset) {
            Ok(position) => self.mouse_position = position,
            Err(error) => tracing::warn!(%error, "ignoring pointer move"),
        }
    }

    /// Delivers `kind` at the current pointer position to every handler.
    pub fn dispatch(&mut self, kind: InputEventKind) {
        let event = PointerEvent {
            kind,
            position: self.mouse_position,
        };
        let mut produced = Vec::new();
        for handler in self.channel_mut(kind).iter_mut() {
            if let Some(action) = handler(&event) {
                produced.push(action);
            }
        }
        self.actions.extend(produced);
    }

    /// Delivers the named host event.
    pub fn dispatch_named(&mut self, name: &str) -> Result<(), InputError> {
        let kind = InputEventKind::from_name(name)?;
        self.dispatch(kind);
        Ok(())
    }

    /// Takes every queued action in dispatch order.
    pub fn drain_actions(&mut self) -> Vec<A> {
        std::mem::take(&mut self.actions)
    }

    fn scaled(&self, raw: Vector2D, offset: Vector2D) -> Result<Vector2D, VectorError> {
        (raw - offset).multiply_scalar(self.scale_ratio)
    }

    fn channel_mut(&mut self, kind: InputEventKind) -> &mut Vec<Handler<A>> {
        match kind {
            InputEventKind::Click => &mut self.click,
            InputEventKind::MouseDown => &mut self.mouse_down,
            InputEventKind::MouseUp => &mut self.mouse_up,
        }
    }
}

fn validate_scale_ratio(ratio: f64) -> Result<(), InputError> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(())
    } else {
        Err(InputError::InvalidScaleRatio { ratio })
    }
}

impl<A> fmt::Debug for Input<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("click_handlers", &self.click.len())
            .field("mouse_down_handlers", &self.mouse_down.len())
            .field("mouse_up_handlers", &self.mouse_up.len())
            .field("mouse_position", &self.mouse_position)
            .field("scale_ratio", &self.scale_ratio)
            .field("queued_actions", &self.actions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_names_alias_mouse_events() {
        assert_eq!(
            InputEventKind::from_name("touchstart"),
            Ok(InputEventKind::MouseDown)
        );
        assert_eq!(
            InputEventKind::from_name("touchend"),
            Ok(InputEventKind::MouseUp)
        );
        assert_eq!(InputEventKind::MouseUp.name(), "mouseup");
    }

    #[test]
    fn rejects_degenerate_scale_ratios() {
        assert!(Input::<()>::new(0.0).is_err());
        assert!(Input::<()>::new(f64::NAN).is_err());
        assert!(Input::<()>::new(1.5).is_ok());
    }

    #[test]
    fn resizing_keeps_the_previous_ratio_on_error() {
        let mut input = Input::<()>::new(1.0).expect("valid ratio");
        assert!(input.set_scale_ratio(-2.0).is_err());
        assert_eq!(input.scale_ratio(), 1.0);
        assert!(input.set_scale_ratio(2.0).is_ok());
        assert_eq!(input.scale_ratio(), 2.0);
    }
}
