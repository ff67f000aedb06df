//! Keyboard and mouse state collected from winit events.
//!
//! The frame driver feeds window and device events into [`InputState`];
//! behaviours read it through the behaviour context. [`KeyPressWatcher`]s
//! turn held keys into one-shot [`KeyAction`]s on the press edge.

use std::collections::HashSet;

use winit::{
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    mouse_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.set_key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if state.is_pressed() {
                    self.buttons.insert(*button);
                } else {
                    self.buttons.remove(button);
                }
            }
            WindowEvent::Focused(false) => {
                // releases are lost while unfocused
                self.keys.clear();
                self.buttons.clear();
            }
            _ => {}
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.mouse_delta.0 += *dx as f32;
            self.mouse_delta.1 += *dy as f32;
        }
    }

    pub fn set_key(&mut self, key: KeyCode, down: bool) {
        if down {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    pub fn set_button(&mut self, button: MouseButton, down: bool) {
        if down {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Mouse motion accumulated since the last [`InputState::end_frame`].
    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    pub fn end_frame(&mut self) {
        self.mouse_delta = (0.0, 0.0);
    }

    /// +1 when `positive` is held, -1 for `negative`, 0 for both or neither.
    pub fn axis(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.is_key_down(positive) {
            value += 1.0;
        }
        if self.is_key_down(negative) {
            value -= 1.0;
        }
        value
    }
}

/// Scene actions bound to keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    ToggleOrtho,
    NextControllable,
    PreviousControllable,
    ToggleRelative,
}

/// Fires its action once per press of `key`.
#[derive(Clone, Debug)]
pub struct KeyPressWatcher {
    pub key: KeyCode,
    pub action: KeyAction,
    was_down: bool,
}

impl KeyPressWatcher {
    pub fn new(key: KeyCode, action: KeyAction) -> Self {
        Self {
            key,
            action,
            was_down: false,
        }
    }

    pub fn poll(&mut self, input: &InputState) -> Option<KeyAction> {
        let down = input.is_key_down(self.key);
        let fired = down && !self.was_down;
        self.was_down = down;
        fired.then_some(self.action)
    }
}

/// T toggles the projection, numpad +/- cycle the controllable object and
/// Y toggles relative movement.
pub fn default_watchers() -> Vec<KeyPressWatcher> {
    vec![
        KeyPressWatcher::new(KeyCode::KeyT, KeyAction::ToggleOrtho),
        KeyPressWatcher::new(KeyCode::NumpadAdd, KeyAction::NextControllable),
        KeyPressWatcher::new(KeyCode::NumpadSubtract, KeyAction::PreviousControllable),
        KeyPressWatcher::new(KeyCode::KeyY, KeyAction::ToggleRelative),
    ]
}
